//! Offline replay of a timestamped JSON-lines event log.
//!
//! Each line is `{"at": <RFC 3339>, "event": {...}}`. Events are either
//! inbound platform events or fixture actions that change the in-memory
//! platform (for example an invite being used just before a join). The voice
//! accrual clock follows the event timestamps.

use chrono::{DateTime, Duration, Utc};
use rankline_core::{ActivityEngine, GuildId, InMemoryPlatform, InboundEvent, RankReport};
use serde::Deserialize;
use std::io::BufRead;
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayLine {
    pub at: DateTime<Utc>,
    pub event: ReplayEvent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReplayEvent {
    Fixture(FixtureAction),
    Inbound(InboundEvent),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FixtureAction {
    /// Bump an invite's use count.
    InviteUsed { guild_id: GuildId, code: String },
}

#[derive(Debug, Default)]
pub struct ReplayOutcome {
    pub events: usize,
    pub voice_ticks: usize,
    pub reports: Vec<RankReport>,
    pub finished_at: Option<DateTime<Utc>>,
}

pub fn parse_line(line: &str) -> Result<ReplayLine, String> {
    serde_json::from_str(line).map_err(|e| e.to_string())
}

/// Feed every line of `reader` through the engine.
///
/// Voice accrual runs at each multiple of `voice_tick` after the first
/// timestamp, before any later event is handled. Blank lines and lines
/// starting with `#` are skipped.
pub async fn replay<R: BufRead>(
    engine: &mut ActivityEngine<Arc<InMemoryPlatform>>,
    reader: R,
    voice_tick: std::time::Duration,
) -> Result<ReplayOutcome, String> {
    let tick = Duration::from_std(voice_tick).map_err(|e| e.to_string())?;
    let mut outcome = ReplayOutcome::default();
    let mut next_tick: Option<DateTime<Utc>> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| e.to_string())?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let ReplayLine { at, event } =
            parse_line(line).map_err(|e| format!("line {}: {}", idx + 1, e))?;

        let due = next_tick.get_or_insert(at + tick);
        while *due <= at {
            engine.voice_tick(*due).await;
            outcome.voice_ticks += 1;
            *due += tick;
        }

        match event {
            ReplayEvent::Fixture(FixtureAction::InviteUsed { guild_id, code }) => {
                if !engine.platform().record_invite_use(guild_id, &code) {
                    tracing::warn!(guild = %guild_id, %code, "Unknown invite in replay");
                }
            }
            ReplayEvent::Inbound(event) => {
                if let Some(report) = engine.handle(event, at).await {
                    outcome.reports.push(report);
                }
                outcome.events += 1;
            }
        }
        outcome.finished_at = Some(at);
    }

    if let Some(end) = outcome.finished_at {
        engine.voice_tick(end).await;
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankline_core::platform::PlatformFixture;
    use rankline_core::{PersistenceManager, RankTable, RankTier, UserId};

    const FIXTURE: &str = r#"{
        "guilds": [{
            "id": 1,
            "roles": ["Bronze", "Silver"],
            "members": [10, 11],
            "invites": [
                {"code": "a", "uses": 5, "inviter_id": 10},
                {"code": "b", "uses": 2, "inviter_id": 11}
            ]
        }]
    }"#;

    const EVENTS: &str = r#"
# alice chats, then sits in voice for two and a half minutes
{"at": "2024-03-01T20:00:00Z", "event": {"type": "message_received", "guild_id": 1, "user_id": 10}}
{"at": "2024-03-01T20:00:05Z", "event": {"type": "message_received", "guild_id": 1, "user_id": 99, "is_from_automated_account": true}}
{"at": "2024-03-01T20:00:10Z", "event": {"type": "voice_state_changed", "guild_id": 1, "user_id": 10, "new_channel_id": 500}}
{"at": "2024-03-01T20:01:00Z", "event": {"type": "invite_used", "guild_id": 1, "code": "b"}}
{"at": "2024-03-01T20:01:01Z", "event": {"type": "member_joined", "guild_id": 1, "user_id": 12}}
{"at": "2024-03-01T20:02:40Z", "event": {"type": "voice_state_changed", "guild_id": 1, "user_id": 10, "previous_channel_id": 500}}
{"at": "2024-03-01T20:03:00Z", "event": {"type": "rank_command_invoked", "guild_id": 1, "user_id": 10}}
"#;

    fn engine(dir: &tempfile::TempDir) -> ActivityEngine<Arc<InMemoryPlatform>> {
        let fixture: PlatformFixture = serde_json::from_str(FIXTURE).unwrap();
        let table = RankTable::new(vec![
            RankTier::new("Bronze", 0, 1, 0),
            RankTier::new("Silver", 2, 1, 0),
        ])
        .unwrap();
        ActivityEngine::new(
            Arc::new(InMemoryPlatform::from_fixture(&fixture)),
            table,
            PersistenceManager::new(dir.path().join("activity.json")),
        )
    }

    #[test]
    fn test_parse_fixture_and_inbound_lines() {
        let line = parse_line(
            r#"{"at": "2024-03-01T20:01:00Z", "event": {"type": "invite_used", "guild_id": 1, "code": "b"}}"#,
        )
        .unwrap();
        assert!(matches!(line.event, ReplayEvent::Fixture(_)));

        let line = parse_line(
            r#"{"at": "2024-03-01T20:01:01Z", "event": {"type": "member_joined", "guild_id": 1, "user_id": 12}}"#,
        )
        .unwrap();
        assert!(matches!(
            line.event,
            ReplayEvent::Inbound(InboundEvent::MemberJoined { .. })
        ));
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let err = parse_line(r#"{"at": "2024-03-01T20:00:00Z", "event": {"type": "reaction_added"}}"#);
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_replay_drives_engine() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(&dir);
        let guild = GuildId(1);
        engine.prime_invites(&[guild]).await;

        let outcome = replay(&mut engine, EVENTS.as_bytes(), std::time::Duration::from_secs(15))
            .await
            .unwrap();

        assert_eq!(outcome.events, 6);
        assert!(outcome.voice_ticks > 0);

        let alice = engine.store().peek(guild, UserId(10)).unwrap();
        assert_eq!(alice.messages, 1);
        assert_eq!(alice.voice_minutes, 2);
        assert!(engine.store().peek(guild, UserId(99)).is_none());
        assert_eq!(engine.store().peek(guild, UserId(11)).unwrap().invites, 1);

        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.reports[0].current_name(), Some("Silver"));
        assert_eq!(
            engine.platform().member_role_names(guild, UserId(10)),
            vec!["Silver"]
        );
    }

    #[tokio::test]
    async fn test_bad_line_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(&dir);
        let input = "{\"at\": \"2024-03-01T20:00:00Z\", \"event\": {\"type\": \"member_joined\", \"guild_id\": 1, \"user_id\": 12}}\nnot json\n";

        let err = replay(&mut engine, input.as_bytes(), std::time::Duration::from_secs(15))
            .await
            .unwrap_err();
        assert!(err.starts_with("line 2:"));
    }
}
