use crate::events::{ActivitySignal, InboundEvent, SignalHandler};
use crate::ids::{GuildId, UserId};
use crate::platform::GuildPlatform;
use crate::ranks::{RankAssigner, RankReport, RankTable};
use crate::state::ActivityStore;
use crate::storage::PersistenceManager;
use crate::tracking::{
    InviteUsageDetector, VoiceCredit, VoiceSessionTracker, VoiceStateChange, VoiceTransition,
};
use chrono::{DateTime, Utc};

/// The activity and rank progression engine.
///
/// Owns every piece of mutable state and processes one event or timer tick at
/// a time. Handlers that call the platform suspend at each call; nothing they
/// read before a call is reused after it. Counters are re-read from the store
/// once the call resumes.
pub struct ActivityEngine<P: GuildPlatform> {
    platform: P,
    ranks: RankTable,
    assigner: RankAssigner,
    store: ActivityStore,
    voice: VoiceSessionTracker,
    invites: InviteUsageDetector,
    persistence: PersistenceManager,
    bot_user_id: Option<UserId>,
    signal_handlers: Vec<Box<dyn SignalHandler + Send + Sync>>,
}

impl<P: GuildPlatform> ActivityEngine<P> {
    /// Build an engine, loading whatever the persistence file holds.
    pub fn new(platform: P, ranks: RankTable, persistence: PersistenceManager) -> Self {
        let store = persistence.load();
        Self::with_store(platform, ranks, persistence, store)
    }

    pub fn with_store(
        platform: P,
        ranks: RankTable,
        persistence: PersistenceManager,
        store: ActivityStore,
    ) -> Self {
        Self {
            platform,
            assigner: RankAssigner::new(&ranks),
            ranks,
            store,
            voice: VoiceSessionTracker::new(),
            invites: InviteUsageDetector::new(),
            persistence,
            bot_user_id: None,
            signal_handlers: Vec::new(),
        }
    }

    /// Ignore voice state changes for the engine's own account.
    pub fn with_bot_user(mut self, bot: Option<UserId>) -> Self {
        self.bot_user_id = bot;
        self
    }

    pub fn add_signal_handler(&mut self, handler: Box<dyn SignalHandler + Send + Sync>) {
        self.signal_handlers.push(handler);
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn ranks(&self) -> &RankTable {
        &self.ranks
    }

    pub fn store(&self) -> &ActivityStore {
        &self.store
    }

    pub fn voice(&self) -> &VoiceSessionTracker {
        &self.voice
    }

    pub fn invites(&self) -> &InviteUsageDetector {
        &self.invites
    }

    pub fn persistence(&self) -> &PersistenceManager {
        &self.persistence
    }

    /// Route one inbound event. Only rank queries produce a value.
    pub async fn handle(&mut self, event: InboundEvent, now: DateTime<Utc>) -> Option<RankReport> {
        match event {
            InboundEvent::MessageReceived {
                guild_id,
                user_id,
                is_from_automated_account,
            } => {
                if !is_from_automated_account {
                    self.on_message(guild_id, user_id).await;
                }
                None
            }
            InboundEvent::VoiceStateChanged(change) => {
                self.on_voice_state(&change, now).await;
                None
            }
            InboundEvent::MemberJoined { guild_id, user_id } => {
                self.on_member_joined(guild_id, user_id).await;
                None
            }
            InboundEvent::RankCommandInvoked { guild_id, user_id } => {
                Some(self.rank_report(guild_id, user_id))
            }
        }
    }

    /// Count a message, then sync the author's rank role.
    ///
    /// Suspends inside the role sync.
    pub async fn on_message(&mut self, guild: GuildId, user: UserId) {
        let record = self.store.increment_messages(guild, user);
        tracing::debug!(%guild, %user, total = record.messages, "Counted message");

        let mut signals = vec![ActivitySignal::MessageCounted {
            guild_id: guild,
            user_id: user,
            total: record.messages,
        }];
        self.apply_rank(guild, user, &mut signals).await;
        self.dispatch(&signals);
    }

    /// Move a user's voice session and credit any whole minutes owed.
    ///
    /// The session change happens before the first suspension, so a later
    /// event for the same user always sees the new channel.
    pub async fn on_voice_state(&mut self, change: &VoiceStateChange, now: DateTime<Utc>) {
        if self.bot_user_id == Some(change.user_id) {
            return;
        }

        let update = self.voice.handle_state_change(&mut self.store, change, now);
        let (guild, user) = (change.guild_id, change.user_id);
        let mut signals = Vec::new();

        match update.transition {
            VoiceTransition::Joined { channel_id } => {
                tracing::info!(%guild, %user, channel = %channel_id, "Voice session started");
                signals.push(ActivitySignal::VoiceSessionStarted {
                    guild_id: guild,
                    user_id: user,
                    channel_id,
                    timestamp: now,
                });
            }
            VoiceTransition::Switched { from, to } => {
                tracing::debug!(%guild, %user, %from, %to, "Voice session moved");
            }
            VoiceTransition::Left {
                channel_id,
                discarded_millis,
            } => {
                tracing::info!(%guild, %user, channel = %channel_id, discarded_millis, "Voice session ended");
                signals.push(ActivitySignal::VoiceSessionEnded {
                    guild_id: guild,
                    user_id: user,
                    channel_id,
                    discarded_millis,
                    timestamp: now,
                });
            }
            VoiceTransition::Unchanged => {}
        }

        if let Some(credit) = update.credit {
            self.credit_voice(credit, &mut signals).await;
        }
        self.dispatch(&signals);
    }

    /// Attribute a join to an inviter by diffing invite usage.
    ///
    /// Suspends on the invite fetch and again inside the inviter's role sync.
    /// The snapshot is replaced as soon as the fetch resumes, so two joins
    /// racing through this handler diff against different baselines.
    pub async fn on_member_joined(&mut self, guild: GuildId, member: UserId) {
        let fetched = match self.platform.fetch_invites(guild).await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(%guild, %member, error = %e, "Invite fetch failed, join not attributed");
                return;
            }
        };
        if fetched.is_empty() {
            tracing::debug!(%guild, %member, "Guild has no invites");
        }

        let Some(attribution) = self.invites.detect(guild, &fetched) else {
            tracing::debug!(%guild, %member, "No invite usage change found");
            return;
        };
        let Some(inviter) = attribution.inviter_id else {
            tracing::info!(%guild, %member, code = %attribution.code, "Used invite has no inviter");
            return;
        };

        let record = self.store.increment_invites(guild, inviter);
        tracing::info!(
            %guild,
            %member,
            %inviter,
            code = %attribution.code,
            total = record.invites,
            "Attributed join to inviter"
        );

        let mut signals = vec![ActivitySignal::InviteAttributed {
            guild_id: guild,
            inviter_id: inviter,
            invitee_id: member,
            code: attribution.code,
        }];
        self.apply_rank(guild, inviter, &mut signals).await;
        self.dispatch(&signals);
    }

    /// Current and next rank for a user. Never registers a record.
    pub fn rank_report(&self, guild: GuildId, user: UserId) -> RankReport {
        RankReport::build(&self.ranks, guild, user, self.store.peek(guild, user))
    }

    /// Periodic accrual pass over every open voice session.
    ///
    /// All credits land in the store before the first role sync suspends.
    pub async fn voice_tick(&mut self, now: DateTime<Utc>) -> usize {
        let credits = self.voice.accrue_all(&mut self.store, now);
        let mut signals = Vec::new();
        for credit in &credits {
            self.credit_voice(*credit, &mut signals).await;
        }
        self.dispatch(&signals);
        credits.len()
    }

    /// Write a snapshot of the store. Returns the record count on success.
    ///
    /// The snapshot is taken before the write suspends; increments made while
    /// it is in flight go out with the next one.
    pub async fn persist(&mut self, now: DateTime<Utc>) -> Option<usize> {
        let snapshot = self.store.snapshot();
        match self.persistence.save(&snapshot).await {
            Ok(records) => {
                tracing::info!(records, path = ?self.persistence.path(), "Persisted activity data");
                self.dispatch(&[ActivitySignal::SnapshotPersisted {
                    records,
                    timestamp: now,
                }]);
                Some(records)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist activity data");
                None
            }
        }
    }

    /// Seed invite snapshots so the first join after startup diffs correctly.
    pub async fn prime_invites(&mut self, guilds: &[GuildId]) -> usize {
        let mut primed = 0;
        for &guild in guilds {
            match self.platform.fetch_invites(guild).await {
                Ok(invites) => {
                    tracing::debug!(%guild, count = invites.len(), "Primed invite snapshot");
                    self.invites.prime(guild, &invites);
                    primed += 1;
                }
                Err(e) => tracing::warn!(%guild, error = %e, "Failed to prime invites"),
            }
        }
        primed
    }

    /// Final accrual pass and snapshot before the engine is dropped.
    pub async fn shutdown(&mut self, now: DateTime<Utc>) -> Option<usize> {
        self.voice_tick(now).await;
        self.persist(now).await
    }

    async fn credit_voice(&mut self, credit: VoiceCredit, signals: &mut Vec<ActivitySignal>) {
        signals.push(ActivitySignal::VoiceCredited {
            guild_id: credit.guild_id,
            user_id: credit.user_id,
            minutes: credit.minutes,
            total: credit.total_minutes,
        });
        self.apply_rank(credit.guild_id, credit.user_id, signals).await;
    }

    /// Resolve from the counters as they are now and sync the member's role.
    async fn apply_rank(
        &mut self,
        guild: GuildId,
        user: UserId,
        signals: &mut Vec<ActivitySignal>,
    ) {
        let Some(record) = self.store.peek(guild, user) else {
            return;
        };
        let Some(rank) = self.ranks.resolve(&record).map(|tier| tier.name.clone()) else {
            return;
        };

        match self
            .assigner
            .sync(&self.platform, guild, user, Some(&rank))
            .await
        {
            Ok(outcome) if !outcome.is_noop() => {
                signals.push(ActivitySignal::RankChanged {
                    guild_id: guild,
                    user_id: user,
                    rank,
                    removed: outcome.removed.into_iter().map(|role| role.name).collect(),
                });
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(%guild, %user, %rank, error = %e, "Rank sync failed"),
        }
    }

    fn dispatch(&mut self, signals: &[ActivitySignal]) {
        if signals.is_empty() {
            return;
        }
        for handler in &mut self.signal_handlers {
            handler.handle_signals(signals);
        }
    }
}
