use serde::{Deserialize, Serialize};

use crate::blend::FULL_CONFIDENCE_HANDS;
use crate::classify::{MIN_SAMPLE, PlayerTag, classify};
use crate::stats::{PlayerRecord, PlayerStats};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProfileConfidence {
    Low,
    Medium,
    High,
}

impl ProfileConfidence {
    pub fn for_sample(sample_size: u32) -> Self {
        if sample_size < MIN_SAMPLE {
            ProfileConfidence::Low
        } else if sample_size < FULL_CONFIDENCE_HANDS {
            ProfileConfidence::Medium
        } else {
            ProfileConfidence::High
        }
    }
}

/// Ratios as shown on the HUD; `None` until the denominator is non-zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StatLine {
    pub vpip: Option<f32>,
    pub pfr: Option<f32>,
    pub af: Option<f32>,
    pub fold_to_cbet: Option<f32>,
    pub fold_to_3bet: Option<f32>,
    pub wtsd: Option<f32>,
    pub sample_size: u32,
}

impl From<&PlayerStats> for StatLine {
    fn from(stats: &PlayerStats) -> Self {
        Self {
            vpip: stats.vpip.ratio(),
            pfr: stats.pfr.ratio(),
            af: stats.aggression.factor(),
            fold_to_cbet: stats.fold_to_cbet.ratio(),
            fold_to_3bet: stats.fold_to_three_bet.ratio(),
            wtsd: stats.went_to_showdown.ratio(),
            sample_size: stats.sample_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerProfile {
    pub id: String,
    pub name: String,
    pub hands_seen: u32,
    pub tag: PlayerTag,
    pub stats: StatLine,
    pub confidence: ProfileConfidence,
}

impl PlayerProfile {
    /// Profile for an id nobody has registered.
    pub fn unknown(player_id: &str) -> Self {
        Self {
            id: player_id.to_string(),
            name: "Unknown".to_string(),
            hands_seen: 0,
            tag: PlayerTag::Unknown,
            stats: StatLine::default(),
            confidence: ProfileConfidence::Low,
        }
    }
}

impl From<PlayerRecord> for PlayerProfile {
    fn from(record: PlayerRecord) -> Self {
        let sample = record.stats.sample_size();
        Self {
            tag: classify(&record.stats),
            stats: StatLine::from(&record.stats),
            confidence: ProfileConfidence::for_sample(sample),
            id: record.id,
            name: record.name,
            hands_seen: record.hands_seen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Counter;

    #[test]
    fn confidence_buckets() {
        assert_eq!(ProfileConfidence::for_sample(4), ProfileConfidence::Low);
        assert_eq!(ProfileConfidence::for_sample(5), ProfileConfidence::Medium);
        assert_eq!(ProfileConfidence::for_sample(29), ProfileConfidence::Medium);
        assert_eq!(ProfileConfidence::for_sample(30), ProfileConfidence::High);
    }

    #[test]
    fn record_becomes_profile() {
        let record = PlayerRecord {
            id: "p1".into(),
            name: "Alice".into(),
            hands_seen: 12,
            stats: PlayerStats {
                vpip: Counter::new(6, 10),
                pfr: Counter::new(4, 10),
                ..PlayerStats::default()
            },
        };
        let profile = PlayerProfile::from(record);
        assert_eq!(profile.tag, PlayerTag::Maniac);
        assert_eq!(profile.confidence, ProfileConfidence::Medium);
        assert_eq!(profile.stats.vpip, Some(0.6));
        assert_eq!(profile.stats.af, None);
    }
}
