//! # split-settle
//!
//! Shared expense splitting across currencies.
//!
//! Given a group of participants, exchange rates relative to a base
//! currency, and a list of expenses each paid upfront by one participant,
//! this crate computes who owes whom, netted pairwise and expressed in a
//! chosen settlement currency.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: participants, currencies, transactions, errors
//! - **settlement** — The settlement engine and the net debt table it produces
//! - **session** — Validated working set, configuration and JSON snapshots
//! - **simulation** — Random session generation for benchmarks

pub mod core;
pub mod session;
pub mod settlement;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::currency::{CurrencyCode, CurrencyRate, CurrencyTable};
    pub use crate::core::errors::{InvalidInput, SettlementError};
    pub use crate::core::participant::{Participant, Roster};
    pub use crate::core::transaction::{Transaction, TransactionLog};
    pub use crate::session::config::SessionConfig;
    pub use crate::session::snapshot::{SessionSnapshot, SnapshotError};
    pub use crate::session::state::Session;
    pub use crate::settlement::debt_table::{round_for_display, Debt, NetDebtTable};
    pub use crate::settlement::engine::{ParticipantBalance, SettlementEngine};
}
