use bossplit_types::{ItemValue, SessionState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the NESO summary table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NesoOwnerTotal {
    pub owner: String,
    pub amount: f64,
}

/// NESO totals across every boss group.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NesoSummary {
    /// Grand total of all positive NESO amounts, owned or not.
    pub total: f64,
    /// Per-owner totals, largest first.
    pub per_owner: Vec<NesoOwnerTotal>,
}

impl NesoSummary {
    pub fn is_empty(&self) -> bool {
        self.per_owner.is_empty()
    }
}

/// Aggregate NESO amounts across all boss groups.
///
/// Amounts without an owner still count toward the grand total; only owned
/// amounts produce per-owner rows.
pub fn neso_summary(state: &SessionState) -> NesoSummary {
    let mut total = 0.0;
    let mut per_owner: BTreeMap<&str, f64> = BTreeMap::new();

    for group in &state.groups {
        for item in &group.items {
            let ItemValue::Neso { amount } = item.value else {
                continue;
            };
            if amount <= 0.0 {
                continue;
            }
            total += amount;
            if let Some(owner) = item.owner_name() {
                *per_owner.entry(owner).or_insert(0.0) += amount;
            }
        }
    }

    let mut rows: Vec<NesoOwnerTotal> = per_owner
        .into_iter()
        .map(|(owner, amount)| NesoOwnerTotal {
            owner: owner.to_string(),
            amount,
        })
        .collect();
    rows.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    NesoSummary {
        total,
        per_owner: rows,
    }
}
