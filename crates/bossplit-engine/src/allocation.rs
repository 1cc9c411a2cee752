use std::collections::BTreeMap;

use bossplit_types::{BossGroup, DistributionMethod, EPSILON};
use tracing::warn;

/// Normalize a boss group's distribution settings into per-member fractions.
///
/// Returns `None` when the group has no participants (nothing to distribute
/// over). Otherwise the fractions sum to 1, except in the all-zero case:
/// custom shares summing to 0 yield all-zero fractions, which the settlement
/// step treats as "fall back to an even split".
///
/// Custom shares are entered as percentages and may not sum to 100; a
/// positive sum other than 100 is rescaled proportionally rather than
/// rejected.
pub fn normalized_shares(group: &BossGroup) -> Option<BTreeMap<String, f64>> {
    // Duplicated roster entries must not count twice.
    let members = group.unique_participants();
    if members.is_empty() {
        return None;
    }

    let mut fractions = BTreeMap::new();
    match group.method {
        DistributionMethod::Average => {
            let per = 1.0 / members.len() as f64;
            for member in &members {
                fractions.insert((*member).to_string(), per);
            }
        }
        DistributionMethod::Custom => {
            let total: f64 = members
                .iter()
                .map(|m| group.custom_shares.get(*m).copied().unwrap_or(0.0))
                .sum();

            if total > EPSILON {
                if (total - 100.0).abs() > EPSILON {
                    warn!(
                        boss = %group.boss_name,
                        total,
                        "custom shares do not sum to 100%, rescaling proportionally"
                    );
                }
                for member in &members {
                    let raw = group.custom_shares.get(*member).copied().unwrap_or(0.0);
                    fractions.insert((*member).to_string(), raw / total);
                }
            } else {
                // Indeterminate: every share zero until the user fixes them.
                for member in &members {
                    fractions.insert((*member).to_string(), 0.0);
                }
            }
        }
    }
    Some(fractions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bossplit_types::BossGroup;

    fn custom_group(shares: &[(&str, f64)]) -> BossGroup {
        let mut group = BossGroup::new("Zakum");
        group.method = DistributionMethod::Custom;
        for (name, share) in shares {
            group.participants.push((*name).into());
            group.custom_shares.insert((*name).into(), *share);
        }
        group
    }

    #[test]
    fn empty_group_has_no_shares() {
        let group = BossGroup::new("Zakum");
        assert!(normalized_shares(&group).is_none());
    }

    #[test]
    fn average_split_is_even() {
        let mut group = BossGroup::new("Zakum");
        group.participants = vec!["Alice".into(), "Bob".into(), "Cara".into(), "Dan".into()];
        let shares = normalized_shares(&group).unwrap();
        for member in &group.participants {
            assert!((shares[member] - 0.25).abs() < EPSILON);
        }
    }

    #[test]
    fn custom_shares_summing_to_100_divide_by_100() {
        let group = custom_group(&[("Alice", 50.0), ("Bob", 30.0), ("Cara", 20.0)]);
        let shares = normalized_shares(&group).unwrap();
        assert!((shares["Alice"] - 0.5).abs() < EPSILON);
        assert!((shares["Bob"] - 0.3).abs() < EPSILON);
        assert!((shares["Cara"] - 0.2).abs() < EPSILON);
    }

    #[test]
    fn custom_shares_off_100_rescale_proportionally() {
        let group = custom_group(&[("Alice", 10.0), ("Bob", 10.0)]);
        let shares = normalized_shares(&group).unwrap();
        assert!((shares["Alice"] - 0.5).abs() < EPSILON);
        assert!((shares["Bob"] - 0.5).abs() < EPSILON);
    }

    #[test]
    fn all_zero_shares_stay_zero() {
        let group = custom_group(&[("Alice", 0.0), ("Bob", 0.0)]);
        let shares = normalized_shares(&group).unwrap();
        assert_eq!(shares["Alice"], 0.0);
        assert_eq!(shares["Bob"], 0.0);
    }

    #[test]
    fn missing_share_entry_counts_as_zero() {
        let mut group = custom_group(&[("Alice", 75.0)]);
        group.participants.push("Bob".into()); // no entry for Bob
        let shares = normalized_shares(&group).unwrap();
        assert!((shares["Alice"] - 1.0).abs() < EPSILON);
        assert_eq!(shares["Bob"], 0.0);
    }

    #[test]
    fn duplicate_roster_entries_share_once() {
        let mut group = BossGroup::new("Zakum");
        group.participants = vec!["Alice".into(), "Alice".into(), "Bob".into()];
        let shares = normalized_shares(&group).unwrap();
        assert_eq!(shares.len(), 2);
        assert!((shares["Alice"] - 0.5).abs() < EPSILON);
        assert!((shares["Bob"] - 0.5).abs() < EPSILON);
    }

    #[test]
    fn normalization_is_idempotent_on_same_input() {
        let group = custom_group(&[("Alice", 60.0), ("Bob", 60.0)]);
        assert_eq!(normalized_shares(&group), normalized_shares(&group));
    }
}
