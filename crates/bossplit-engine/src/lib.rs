//! # bossplit-engine
//!
//! The settlement core:
//!
//! - **Allocation normalizer** -- turns a boss group's distribution settings
//!   into per-member fractions summing to 1 (or all zero when shares are
//!   indeterminate)
//! - **Settlement engine** -- nets received-vs-expected value per member
//!   across all boss groups and reduces the result to a short list of
//!   pairwise transfers
//! - **NESO summary** -- per-owner totals of the fee-exempt currency items
//!
//! Everything is a pure function over a [`bossplit_types::SessionState`]
//! snapshot; recomputation is "rebuild state, call again". Balances always
//! sum to zero before transfer generation, and applying every generated
//! transfer drives each balance to zero within
//! [`bossplit_types::EPSILON`].

#![deny(unsafe_code)]

pub mod allocation;
pub mod settle;
pub mod summary;

pub use allocation::normalized_shares;
pub use settle::{compute_settlement, SettlementOutcome, SettlementReport, Transfer};
pub use summary::{neso_summary, NesoOwnerTotal, NesoSummary};
