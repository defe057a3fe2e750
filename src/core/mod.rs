//! Foundational types: participants, currencies, transactions and errors.

pub mod currency;
pub mod errors;
pub mod participant;
pub mod transaction;
