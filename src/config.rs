//! Explicit leveling configuration.
//!
//! The schema is deliberately closed: every recognized option is a named field,
//! unknown keys are rejected at parse time, and [`LevelingConfig::validate`]
//! refuses to start with thresholds or formula parameters that would make the
//! accrual math meaningless. There are no fallback values for the
//! safety-relevant knobs (amounts, cooldowns, formula); only `enabled` flags
//! default, to `true`, matching how operators usually leave sections on.

use itertools::Itertools;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config at `{field}`: {problem}")]
    Invalid {
        field: &'static str,
        problem: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelingConfig {
    pub xp: XpConfig,
    pub level_formula: LevelFormula,
    pub milestones: MilestoneConfig,
    pub streaks: StreakConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct XpConfig {
    pub message: MessageXpConfig,
    pub voice: VoiceXpConfig,
    pub counting: CountingXpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageXpConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Base XP per granted message.
    pub amount: u64,
    /// Minimum seconds between two XP-granting messages from the same user.
    pub cooldown_seconds: u64,
    #[serde(default)]
    pub attachment_bonus: Option<AttachmentBonus>,
    #[serde(default)]
    pub length_bonus: Option<LengthBonus>,
}

/// Extra XP when a message carries an image or video attachment.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttachmentBonus {
    pub amount: u64,
}

/// Extra XP proportional to message length, capped at `max_bonus`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LengthBonus {
    pub chars_per_bonus_xp: u64,
    pub max_bonus: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoiceXpConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub amount_per_minute: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CountingXpConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// XP per successfully completed counting round.
    pub amount: u64,
}

/// `level = floor(sqrt(xp / k))`. Larger `k` means slower leveling.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelFormula {
    pub k: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MilestoneConfig {
    /// Total-message thresholds, strictly increasing.
    #[serde(default)]
    pub message_count: Vec<u64>,
    /// Counting-round thresholds, strictly increasing.
    #[serde(default)]
    pub counting_rounds: Vec<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreakConfig {
    pub enabled: bool,
    #[serde(default)]
    pub reset_policy: StreakResetPolicy,
}

/// When a streak is considered broken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreakResetPolicy {
    /// Broken after a full calendar day (UTC) without qualifying activity.
    #[default]
    CalendarDay,
    /// Additionally broken once `hours` pass without qualifying activity,
    /// even when the calendar-day rule alone would keep the streak alive.
    InactiveHours { hours: u32 },
}

fn enabled_by_default() -> bool {
    true
}

impl LevelingConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: LevelingConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Fail-fast sanity checks, run once before the engine starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.level_formula.k.is_finite() || self.level_formula.k <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "level_formula.k",
                problem: format!("must be finite and positive, got {}", self.level_formula.k),
            });
        }
        if let Some(bonus) = &self.xp.message.length_bonus {
            if bonus.chars_per_bonus_xp == 0 {
                return Err(ConfigError::Invalid {
                    field: "xp.message.length_bonus.chars_per_bonus_xp",
                    problem: "must be at least 1".to_owned(),
                });
            }
        }
        validate_thresholds("milestones.message_count", &self.milestones.message_count)?;
        validate_thresholds("milestones.counting_rounds", &self.milestones.counting_rounds)?;
        if let StreakResetPolicy::InactiveHours { hours } = self.streaks.reset_policy {
            if hours == 0 {
                return Err(ConfigError::Invalid {
                    field: "streaks.reset_policy.hours",
                    problem: "must be at least 1".to_owned(),
                });
            }
        }
        Ok(())
    }
}

fn validate_thresholds(field: &'static str, thresholds: &[u64]) -> Result<(), ConfigError> {
    if thresholds.first().is_some_and(|&t| t == 0) {
        return Err(ConfigError::Invalid {
            field,
            problem: "thresholds must be positive".to_owned(),
        });
    }
    for (left, right) in thresholds.iter().tuple_windows() {
        if left >= right {
            return Err(ConfigError::Invalid {
                field,
                problem: format!("thresholds must be strictly increasing ({left} >= {right})"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"{
        "xp": {
            "message": {
                "amount": 10,
                "cooldown_seconds": 10,
                "attachment_bonus": { "amount": 5 },
                "length_bonus": { "chars_per_bonus_xp": 50, "max_bonus": 4 }
            },
            "voice": { "amount_per_minute": 2 },
            "counting": { "amount": 5 }
        },
        "level_formula": { "k": 100.0 },
        "milestones": {
            "message_count": [100, 500],
            "counting_rounds": [10, 50]
        },
        "streaks": { "enabled": true, "reset_policy": { "type": "calendar_day" } }
    }"#;

    #[test]
    fn example_config_parses() {
        let cfg = LevelingConfig::from_json_str(EXAMPLE).unwrap();
        assert!(cfg.xp.message.enabled);
        assert_eq!(cfg.xp.message.amount, 10);
        assert_eq!(cfg.milestones.message_count, vec![100, 500]);
        assert_eq!(cfg.streaks.reset_policy, StreakResetPolicy::CalendarDay);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let raw = EXAMPLE.replace(r#""amount": 10"#, r#""amount": 10, "xp_boost": 2"#);
        assert!(matches!(
            LevelingConfig::from_json_str(&raw),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_amount_is_rejected() {
        let raw = EXAMPLE.replace(r#""amount": 10,"#, "");
        assert!(matches!(
            LevelingConfig::from_json_str(&raw),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn non_positive_k_is_rejected() {
        let raw = EXAMPLE.replace(r#""k": 100.0"#, r#""k": 0.0"#);
        let err = LevelingConfig::from_json_str(&raw).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "level_formula.k",
                ..
            }
        ));
    }

    #[test]
    fn unsorted_thresholds_are_rejected() {
        let raw = EXAMPLE.replace("[100, 500]", "[500, 100]");
        assert!(LevelingConfig::from_json_str(&raw).is_err());
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let raw = EXAMPLE.replace("[10, 50]", "[0, 50]");
        assert!(LevelingConfig::from_json_str(&raw).is_err());
    }

    #[test]
    fn inactive_hours_policy_parses() {
        let raw = EXAMPLE.replace(
            r#"{ "type": "calendar_day" }"#,
            r#"{ "type": "inactive_hours", "hours": 48 }"#,
        );
        let cfg = LevelingConfig::from_json_str(&raw).unwrap();
        assert_eq!(
            cfg.streaks.reset_policy,
            StreakResetPolicy::InactiveHours { hours: 48 }
        );
    }
}
