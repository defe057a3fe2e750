//! Settlement: split expenses, accumulate directional debts, net them pairwise.

pub mod debt_table;
pub mod engine;
