use serde::{Deserialize, Serialize};

/// One rank tier as written in the config file.
///
/// `voice` is in whole minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTierConfig {
    pub name: String,
    pub voice: u64,
    pub messages: u64,
    pub invites: u64,
}

impl RankTierConfig {
    pub fn new(name: impl Into<String>, voice: u64, messages: u64, invites: u64) -> Self {
        Self {
            name: name.into(),
            voice,
            messages,
            invites,
        }
    }
}

/// Engine settings. Missing keys fall back to [`EngineConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Activity snapshot location (JSON).
    pub data_file: String,
    /// Seconds between voice accrual passes.
    pub voice_tick_secs: u64,
    /// Seconds between activity snapshots.
    pub persist_interval_secs: u64,
    /// The bot's own user id; its voice presence is never tracked.
    pub bot_user_id: Option<u64>,
    /// Rank tiers, weakest first.
    pub ranks: Vec<RankTierConfig>,
}

impl ::std::default::Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_file: "activity.json".to_string(),
            voice_tick_secs: 15,
            persist_interval_secs: 30,
            bot_user_id: None,
            ranks: default_ranks(),
        }
    }
}

/// The stock seven-tier table.
pub fn default_ranks() -> Vec<RankTierConfig> {
    vec![
        RankTierConfig::new("🥋| Rang•E", 60, 10, 1),
        RankTierConfig::new("🛡️| Rang•D", 300, 20, 2),
        RankTierConfig::new("⚔️| Rang•C", 600, 80, 3),
        RankTierConfig::new("🏹| Rang•B", 900, 100, 5),
        RankTierConfig::new("🗡️| Rang•A", 1200, 120, 7),
        RankTierConfig::new("🍷| Rang•S", 1560, 160, 11),
        RankTierConfig::new("👑| Rang•Nation", 1660, 330, 20),
    ]
}
