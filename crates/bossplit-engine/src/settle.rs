use std::collections::BTreeMap;

use bossplit_types::{BossGroup, DistributionMethod, ItemValue, SessionState, EPSILON};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::allocation::normalized_shares;

/// A single payer-to-receiver instruction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: String,
    pub to: String,
    pub amount: f64,
}

/// The full settlement result for one session snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SettlementReport {
    /// Net position per roster member: positive = over-collected (owes),
    /// negative = under-collected (is owed). Sums to zero within epsilon.
    pub balances: BTreeMap<String, f64>,
    /// Minimized transfer list that zeroes every balance. May be empty when
    /// everyone already holds exactly their share.
    pub transfers: Vec<Transfer>,
    /// Advisory notices collected along the way (unset owners etc.).
    pub warnings: Vec<String>,
}

/// Outcome of a settlement computation.
///
/// "Nothing to compute" is a distinct terminal state from "settled with no
/// transfers needed": the former means no boss group produced any revenue,
/// the latter means revenue existed but everyone already holds their share.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SettlementOutcome {
    NoData { warnings: Vec<String> },
    Settled(SettlementReport),
}

impl SettlementOutcome {
    pub fn warnings(&self) -> &[String] {
        match self {
            SettlementOutcome::NoData { warnings } => warnings,
            SettlementOutcome::Settled(report) => &report.warnings,
        }
    }
}

/// Run the settlement engine over a session snapshot.
///
/// Pure and deterministic: the same state always yields the same outcome.
/// Boss groups with no participants or no revenue contribute nothing;
/// roster members untouched by any group still appear in the balances at 0.
pub fn compute_settlement(state: &SessionState) -> SettlementOutcome {
    let mut balances: BTreeMap<String, f64> = BTreeMap::new();
    let mut warnings: Vec<String> = Vec::new();
    let mut any_data = false;

    for group in &state.groups {
        if group.participants.is_empty() {
            continue;
        }
        if settle_group(group, &mut balances, &mut warnings) {
            any_data = true;
        }
    }

    // Roster members never touched by a group settle at zero.
    for name in state.named_members() {
        balances.entry(name.to_string()).or_insert(0.0);
    }

    if !any_data {
        return SettlementOutcome::NoData { warnings };
    }

    let transfers = minimize_transfers(&balances);
    debug!(
        members = balances.len(),
        transfers = transfers.len(),
        "settlement computed"
    );

    SettlementOutcome::Settled(SettlementReport {
        balances,
        transfers,
        warnings,
    })
}

/// Settle one boss group into the running balances.
/// Returns whether the group produced any revenue.
fn settle_group(
    group: &BossGroup,
    balances: &mut BTreeMap<String, f64>,
    warnings: &mut Vec<String>,
) -> bool {
    let boss_label = if group.boss_name.trim().is_empty() {
        "unselected boss"
    } else {
        group.boss_name.as_str()
    };

    // Fee rate is a fraction in [0, 1].
    let fee_rate = group.fee_rate.clamp(0.0, 1.0);

    // Duplicated roster entries would double-count received value against a
    // single expected share, breaking balance conservation.
    let members = group.unique_participants();
    if members.is_empty() {
        return false;
    }

    let mut net_total = 0.0;
    let mut received: BTreeMap<&str, f64> = BTreeMap::new();

    for item in &group.items {
        let net = match item.value {
            ItemValue::Neso { amount } => {
                if amount <= 0.0 {
                    continue;
                }
                amount
            }
            ItemValue::Sellable { price } => {
                // NaN and non-positive prices are silently ignored.
                let Some(price) = price.filter(|p| *p > 0.0) else {
                    continue;
                };
                price * (1.0 - fee_rate)
            }
        };

        let Some(owner) = item.owner_name() else {
            warnings.push(match item.value {
                ItemValue::Neso { amount } => {
                    format!("\"{}\": NESO amount {} has no owner", boss_label, amount)
                }
                ItemValue::Sellable { .. } => {
                    format!("\"{}\": item \"{}\" has no owner", boss_label, item.name)
                }
            });
            continue;
        };

        // An owner outside the group's participant set would leak value out
        // of the balance conservation, so it is treated as unset.
        if !members.contains(&owner) {
            warnings.push(format!(
                "\"{}\": item \"{}\" is owned by \"{}\", who is not in this group",
                boss_label, item.name, owner
            ));
            continue;
        }

        net_total += net;
        *received.entry(owner).or_insert(0.0) += net;
    }

    if net_total <= EPSILON {
        return false;
    }

    let shares = match normalized_shares(group) {
        Some(shares) => shares,
        None => return false,
    };

    // Degenerate custom shares (all zero) fall back to an even split.
    let share_sum: f64 = shares.values().sum();
    let even = 1.0 / members.len() as f64;
    let use_even = group.method == DistributionMethod::Average || share_sum <= EPSILON;
    if use_even && group.method == DistributionMethod::Custom {
        warn!(boss = %group.boss_name, "custom shares sum to zero, splitting evenly");
    }

    for member in &members {
        let fraction = if use_even {
            even
        } else {
            shares.get(*member).copied().unwrap_or(0.0)
        };
        let expected = net_total * fraction;
        let got = received.get(*member).copied().unwrap_or(0.0);
        *balances.entry((*member).to_string()).or_insert(0.0) += got - expected;
    }

    true
}

/// Reduce a balance vector to a short transfer list.
///
/// Greedy largest-first matching: repeatedly pair the biggest remaining
/// payer with the biggest remaining receiver. Not provably minimal in
/// transfer count, but deterministic and always zeroes every balance
/// (payer and receiver sums are equal by conservation).
pub fn minimize_transfers(balances: &BTreeMap<String, f64>) -> Vec<Transfer> {
    let mut payers: Vec<(&str, f64)> = Vec::new();
    let mut receivers: Vec<(&str, f64)> = Vec::new();
    for (name, amount) in balances {
        if amount.abs() < EPSILON {
            continue;
        }
        if *amount > 0.0 {
            payers.push((name, *amount));
        } else {
            receivers.push((name, -amount));
        }
    }

    // Stable sort; ties keep roster (alphabetical) order.
    payers.sort_by(|a, b| b.1.total_cmp(&a.1));
    receivers.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut transfers = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < payers.len() && j < receivers.len() {
        let amount = payers[i].1.min(receivers[j].1);
        transfers.push(Transfer {
            from: payers[i].0.to_string(),
            to: receivers[j].0.to_string(),
            amount,
        });
        payers[i].1 -= amount;
        receivers[j].1 -= amount;
        if payers[i].1 <= EPSILON {
            i += 1;
        }
        if receivers[j].1 <= EPSILON {
            j += 1;
        }
    }
    transfers
}
