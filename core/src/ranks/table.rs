use crate::state::UserActivityRecord;
use rankline_types::RankTierConfig;
use std::collections::HashSet;
use thiserror::Error;

/// A named threshold over (voice minutes, messages, invites).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankTier {
    pub name: String,
    pub voice_threshold: u64,
    pub message_threshold: u64,
    pub invite_threshold: u64,
}

impl RankTier {
    pub fn new(name: impl Into<String>, voice: u64, messages: u64, invites: u64) -> Self {
        Self {
            name: name.into(),
            voice_threshold: voice,
            message_threshold: messages,
            invite_threshold: invites,
        }
    }

    /// True when every dimension meets its threshold.
    pub fn is_satisfied_by(&self, record: &UserActivityRecord) -> bool {
        record.voice_minutes >= self.voice_threshold
            && record.messages >= self.message_threshold
            && record.invites >= self.invite_threshold
    }
}

impl From<&RankTierConfig> for RankTier {
    fn from(config: &RankTierConfig) -> Self {
        Self::new(
            config.name.clone(),
            config.voice,
            config.messages,
            config.invites,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankTableError {
    #[error("rank name `{0}` appears more than once")]
    DuplicateName(String),
    #[error("rank `{tier}` lowers the {dimension} threshold set by `{previous}`")]
    Decreasing {
        tier: String,
        previous: String,
        dimension: &'static str,
    },
}

/// Rank tiers ordered weakest first.
///
/// Thresholds never decrease from one tier to the next in any dimension,
/// which keeps "highest satisfied tier" well defined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankTable {
    tiers: Vec<RankTier>,
}

impl RankTable {
    pub fn new(tiers: Vec<RankTier>) -> Result<Self, RankTableError> {
        let mut seen = HashSet::new();
        for tier in &tiers {
            if !seen.insert(tier.name.as_str()) {
                return Err(RankTableError::DuplicateName(tier.name.clone()));
            }
        }

        for pair in tiers.windows(2) {
            let (previous, tier) = (&pair[0], &pair[1]);
            let dimension = if tier.voice_threshold < previous.voice_threshold {
                Some("voice")
            } else if tier.message_threshold < previous.message_threshold {
                Some("message")
            } else if tier.invite_threshold < previous.invite_threshold {
                Some("invite")
            } else {
                None
            };
            if let Some(dimension) = dimension {
                return Err(RankTableError::Decreasing {
                    tier: tier.name.clone(),
                    previous: previous.name.clone(),
                    dimension,
                });
            }
        }

        Ok(Self { tiers })
    }

    pub fn from_config(configs: &[RankTierConfig]) -> Result<Self, RankTableError> {
        Self::new(configs.iter().map(RankTier::from).collect())
    }

    pub fn tiers(&self) -> &[RankTier] {
        &self.tiers
    }

    pub fn get(&self, index: usize) -> Option<&RankTier> {
        self.tiers.get(index)
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.tiers.iter().position(|t| t.name == name)
    }
}
