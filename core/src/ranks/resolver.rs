use super::{RankTable, RankTier};
use crate::ids::{GuildId, UserId};
use crate::state::UserActivityRecord;

impl RankTable {
    /// Strongest tier whose thresholds the record fully meets.
    pub fn resolve(&self, record: &UserActivityRecord) -> Option<&RankTier> {
        self.resolve_index(record).map(|idx| &self.tiers()[idx])
    }

    /// Tier to aim for next: the first tier when none is held, `None` at the top.
    pub fn next_rank(&self, record: &UserActivityRecord) -> Option<&RankTier> {
        match self.resolve_index(record) {
            None => self.get(0),
            Some(idx) => self.get(idx + 1),
        }
    }

    fn resolve_index(&self, record: &UserActivityRecord) -> Option<usize> {
        let mut highest = None;
        for (idx, tier) in self.tiers().iter().enumerate() {
            if tier.is_satisfied_by(record) {
                highest = Some(idx);
            }
        }
        highest
    }
}

/// Read-only answer to a rank query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankReport {
    pub guild_id: GuildId,
    pub user_id: UserId,
    /// False when no activity has ever been recorded for the user.
    pub tracked: bool,
    pub current: Option<RankTier>,
    pub next: Option<RankTier>,
    pub record: UserActivityRecord,
}

impl RankReport {
    pub fn build(
        table: &RankTable,
        guild_id: GuildId,
        user_id: UserId,
        record: Option<UserActivityRecord>,
    ) -> Self {
        let tracked = record.is_some();
        let record = record.unwrap_or_default();
        Self {
            guild_id,
            user_id,
            tracked,
            current: table.resolve(&record).cloned(),
            next: table.next_rank(&record).cloned(),
            record,
        }
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_ref().map(|t| t.name.as_str())
    }

    pub fn at_max_rank(&self) -> bool {
        self.next.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glossary_table() -> RankTable {
        RankTable::new(vec![
            RankTier::new("Rang•E", 60, 10, 1),
            RankTier::new("Rang•D", 300, 20, 2),
            RankTier::new("Rang•C", 600, 80, 3),
            RankTier::new("Rang•B", 900, 100, 5),
            RankTier::new("Rang•A", 1200, 120, 7),
            RankTier::new("Rang•S", 1560, 160, 11),
            RankTier::new("Rang•Nation", 1660, 330, 20),
        ])
        .unwrap()
    }

    fn record(voice: u64, messages: u64, invites: u64) -> UserActivityRecord {
        UserActivityRecord {
            messages,
            voice_minutes: voice,
            invites,
        }
    }

    #[test]
    fn test_resolve_exact_thresholds() {
        let table = glossary_table();
        let tier = table.resolve(&record(600, 80, 3)).unwrap();
        assert_eq!(tier.name, "Rang•C");
    }

    #[test]
    fn test_one_unmet_dimension_drops_a_tier() {
        let table = glossary_table();
        let tier = table.resolve(&record(600, 79, 3)).unwrap();
        assert_eq!(tier.name, "Rang•D");
    }

    #[test]
    fn test_below_weakest_tier_resolves_none() {
        let table = glossary_table();
        assert!(table.resolve(&record(59, 1000, 100)).is_none());
        assert!(table.resolve(&UserActivityRecord::default()).is_none());
    }

    #[test]
    fn test_next_rank_below_every_tier_is_first() {
        let table = glossary_table();
        let next = table.next_rank(&UserActivityRecord::default()).unwrap();
        assert_eq!(next.name, "Rang•E");
    }

    #[test]
    fn test_next_rank_at_max_is_none() {
        let table = glossary_table();
        let top = record(5000, 5000, 50);
        assert_eq!(table.resolve(&top).unwrap().name, "Rang•Nation");
        assert!(table.next_rank(&top).is_none());
    }

    #[test]
    fn test_next_rank_follows_current() {
        let table = glossary_table();
        let next = table.next_rank(&record(600, 80, 3)).unwrap();
        assert_eq!(next.name, "Rang•B");
    }

    #[test]
    fn test_empty_table_resolves_nothing() {
        let table = RankTable::default();
        assert!(table.resolve(&record(1, 1, 1)).is_none());
        assert!(table.next_rank(&record(1, 1, 1)).is_none());
    }

    #[test]
    fn test_report_for_untracked_user() {
        let table = glossary_table();
        let report = RankReport::build(&table, GuildId(1), UserId(2), None);
        assert!(!report.tracked);
        assert_eq!(report.current_name(), None);
        assert_eq!(report.next.as_ref().map(|t| t.name.as_str()), Some("Rang•E"));
        assert_eq!(report.record, UserActivityRecord::default());
    }

    #[test]
    fn test_report_at_max_rank() {
        let table = glossary_table();
        let report = RankReport::build(&table, GuildId(1), UserId(2), Some(record(2000, 400, 25)));
        assert!(report.tracked);
        assert_eq!(report.current_name(), Some("Rang•Nation"));
        assert!(report.at_max_rank());
    }
}
