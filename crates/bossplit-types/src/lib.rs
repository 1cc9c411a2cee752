//! bossplit data model.
//!
//! Plain-data types shared by the catalog, engine, and codec crates:
//!
//! - [`Participant`] -- a named member with an optional wallet address
//! - [`BossGroup`] -- one settlement unit for a single boss kill
//! - [`LootItem`] / [`ItemValue`] -- a drop with either a sell price
//!   (fee-deducted) or a raw NESO amount (fee-exempt)
//! - [`SessionState`] -- the full session snapshot the engine and the
//!   share-link codec operate on
//!
//! The model is rebuilt from scratch on every recompute; nothing here keeps
//! mutation history.

#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tolerance for treating a floating-point balance or share sum as zero.
pub const EPSILON: f64 = 1e-9;

/// Fixed NESO slots rendered per boss, independent of the catalog.
pub const NESO_SLOT_COUNT: usize = 3;

/// Default sale fee applied to a fresh boss group (5%).
pub const DEFAULT_FEE_RATE: f64 = 0.05;

/// Strip characters outside the allowed member-name charset
/// (ASCII alphanumerics, space, underscore, hyphen).
pub fn sanitize_member_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect()
}

/// A session member. Identity is the name string.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub wallet: String,
}

impl Participant {
    pub fn new(name: impl Into<String>, wallet: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wallet: wallet.into(),
        }
    }

    /// Whether the member has a usable (non-blank) name.
    pub fn is_named(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// How a boss group's proceeds are split.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionMethod {
    #[default]
    Average,
    Custom,
}

/// The value side of a loot item.
///
/// NESO is never fee-deducted; sellable items lose `fee_rate` of their price
/// on sale. An unpriced sellable item carries `price: None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemValue {
    Neso { amount: f64 },
    Sellable { price: Option<f64> },
}

/// One drop within a boss group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LootItem {
    pub name: String,
    /// Owning member name; `None` (or blank) means nobody collected it yet.
    pub owner: Option<String>,
    pub value: ItemValue,
}

impl LootItem {
    pub fn sellable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: None,
            value: ItemValue::Sellable { price: None },
        }
    }

    pub fn neso(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            owner: None,
            value: ItemValue::Neso { amount },
        }
    }

    /// Owner name, if present and non-blank.
    pub fn owner_name(&self) -> Option<&str> {
        self.owner.as_deref().map(str::trim).filter(|o| !o.is_empty())
    }

    /// Whether the item carries a positive value (price or NESO amount).
    pub fn has_value(&self) -> bool {
        match self.value {
            ItemValue::Neso { amount } => amount > 0.0,
            ItemValue::Sellable { price } => price.is_some_and(|p| p > 0.0),
        }
    }

    /// An item counts toward settlement only when it has both an owner and a
    /// positive value. Everything else is "unset" and ignored.
    pub fn is_set(&self) -> bool {
        self.owner_name().is_some() && self.has_value()
    }
}

/// One settlement unit corresponding to a single boss kill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossGroup {
    pub boss_name: String,
    /// Member names taking part in this kill (subset of the session roster).
    pub participants: Vec<String>,
    pub method: DistributionMethod,
    /// Raw per-member share values as entered, in percent. Only meaningful
    /// when `method` is `Custom`; the engine normalizes these to fractions.
    pub custom_shares: BTreeMap<String, f64>,
    /// Sale fee in [0, 1] applied to sellable items.
    pub fee_rate: f64,
    pub items: Vec<LootItem>,
    /// Presentation-only: hide items that are not set.
    #[serde(default)]
    pub hide_unset: bool,
}

impl BossGroup {
    /// Non-blank participant names, deduplicated, first appearance wins.
    ///
    /// The participant list is a set by intent; hand-written session JSON
    /// can carry duplicates, and every engine computation must go through
    /// this view so a repeated name never counts twice.
    pub fn unique_participants(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for name in &self.participants {
            let name = name.trim();
            if !name.is_empty() && !seen.contains(&name) {
                seen.push(name);
            }
        }
        seen
    }

    /// A fresh group with the default fee and the fixed NESO slots.
    pub fn new(boss_name: impl Into<String>) -> Self {
        Self {
            boss_name: boss_name.into(),
            participants: Vec::new(),
            method: DistributionMethod::Average,
            custom_shares: BTreeMap::new(),
            fee_rate: DEFAULT_FEE_RATE,
            items: neso_slots(),
            hide_unset: false,
        }
    }
}

/// The fixed NESO 1..=3 slots every boss carries, zeroed and unowned.
pub fn neso_slots() -> Vec<LootItem> {
    (1..=NESO_SLOT_COUNT)
        .map(|i| LootItem::neso(format!("NESO {}", i), 0.0))
        .collect()
}

/// Full session snapshot: the roster plus every boss group.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub members: Vec<Participant>,
    pub groups: Vec<BossGroup>,
}

impl SessionState {
    /// The state a fresh session begins with: one blank member and one blank
    /// boss group. Used when no share token is present or it fails to decode.
    pub fn starter() -> Self {
        Self {
            members: vec![Participant::default()],
            groups: vec![BossGroup::new("")],
        }
    }

    /// Non-blank roster names, deduplicated, first appearance wins.
    pub fn named_members(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for member in &self.members {
            let name = member.name.trim();
            if !name.is_empty() && !seen.contains(&name) {
                seen.push(name);
            }
        }
        seen
    }
}
