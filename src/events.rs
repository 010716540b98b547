//! Events the core emits for external collaborators (announcers, role
//! granters). The core itself never delivers anything; it only reports what
//! happened as part of an [`Outcome`](crate::Outcome).

use core::fmt;
use core::str::FromStr;

use crate::ids::UserKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MilestoneKind {
    Messages,
    CountingRounds,
}

impl MilestoneKind {
    fn tag(self) -> &'static str {
        match self {
            MilestoneKind::Messages => "messages",
            MilestoneKind::CountingRounds => "counting",
        }
    }
}

/// A configured threshold whose first crossing is awarded exactly once.
///
/// Serialized as `"messages:100"` / `"counting:50"` inside the per-user
/// awarded set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MilestoneId {
    pub kind: MilestoneKind,
    pub threshold: u64,
}

impl fmt::Display for MilestoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.tag(), self.threshold)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Malformed milestone id: {0:?}")]
pub struct ParseMilestoneIdError(String);

impl FromStr for MilestoneId {
    type Err = ParseMilestoneIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseMilestoneIdError(s.to_owned());
        let (tag, threshold) = s.split_once(':').ok_or_else(malformed)?;
        let kind = match tag {
            "messages" => MilestoneKind::Messages,
            "counting" => MilestoneKind::CountingRounds,
            _ => return Err(malformed()),
        };
        let threshold: u64 = threshold.parse().map_err(|_| malformed())?;
        Ok(MilestoneId { kind, threshold })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelingEvent {
    LevelUp {
        user: UserKey,
        old_level: u32,
        new_level: u32,
    },
    MilestoneReached {
        user: UserKey,
        milestone: MilestoneId,
    },
    StreakBroken {
        user: UserKey,
        previous_streak: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestone_id_round_trip() {
        let id = MilestoneId {
            kind: MilestoneKind::Messages,
            threshold: 100,
        };
        assert_eq!(id.to_string(), "messages:100");
        assert_eq!("messages:100".parse::<MilestoneId>().unwrap(), id);
        assert_eq!(
            "counting:50".parse::<MilestoneId>().unwrap(),
            MilestoneId {
                kind: MilestoneKind::CountingRounds,
                threshold: 50
            }
        );
    }

    #[test]
    fn malformed_milestone_ids_fail() {
        for raw in ["", "messages", "messages:", "messages:x", "xp:100"] {
            assert!(raw.parse::<MilestoneId>().is_err(), "accepted {raw:?}");
        }
    }
}
