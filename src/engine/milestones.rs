//! Idempotent threshold detection.
//!
//! The awarded set is the single source of truth: a milestone is emitted iff
//! its counter has reached the threshold and the id is not in the set yet.
//! Re-processing an event after the set was persisted therefore emits nothing.

use std::collections::BTreeSet;

use crate::events::{MilestoneId, MilestoneKind};

/// Returns the milestones newly earned at `count`, ascending by threshold,
/// and records them in `awarded`. Thresholds are validated to be sorted, so a
/// single jump over several of them yields all of them in order.
pub(super) fn award_crossed(
    kind: MilestoneKind,
    thresholds: &[u64],
    count: u64,
    awarded: &mut BTreeSet<MilestoneId>,
) -> Vec<MilestoneId> {
    thresholds
        .iter()
        .take_while(|&&threshold| threshold <= count)
        .map(|&threshold| MilestoneId { kind, threshold })
        .filter(|id| awarded.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: &[u64] = &[100, 500];

    #[test]
    fn crossing_awards_once() {
        let mut awarded = BTreeSet::new();
        let earned = award_crossed(MilestoneKind::Messages, THRESHOLDS, 110, &mut awarded);
        assert_eq!(
            earned,
            vec![MilestoneId {
                kind: MilestoneKind::Messages,
                threshold: 100
            }]
        );

        // Re-reading the same counter later must not re-emit.
        let again = award_crossed(MilestoneKind::Messages, THRESHOLDS, 110, &mut awarded);
        assert!(again.is_empty());
    }

    #[test]
    fn jump_over_several_thresholds_emits_all_ascending() {
        let mut awarded = BTreeSet::new();
        let earned = award_crossed(MilestoneKind::Messages, THRESHOLDS, 600, &mut awarded);
        let thresholds: Vec<u64> = earned.iter().map(|id| id.threshold).collect();
        assert_eq!(thresholds, vec![100, 500]);
    }

    #[test]
    fn below_first_threshold_awards_nothing() {
        let mut awarded = BTreeSet::new();
        assert!(award_crossed(MilestoneKind::Messages, THRESHOLDS, 99, &mut awarded).is_empty());
        assert!(awarded.is_empty());
    }

    #[test]
    fn kinds_do_not_collide() {
        let mut awarded = BTreeSet::new();
        award_crossed(MilestoneKind::Messages, &[10], 10, &mut awarded);
        let counting = award_crossed(MilestoneKind::CountingRounds, &[10], 10, &mut awarded);
        assert_eq!(counting.len(), 1);
        assert_eq!(awarded.len(), 2);
    }
}
