//! Random session generation.
//!
//! Builds valid sessions of arbitrary size to exercise the settlement
//! engine under load.

use crate::core::errors::SettlementError;
use crate::session::config::SessionConfig;
use crate::session::state::Session;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

/// Configuration for generating a random session.
#[derive(Debug, Clone)]
pub struct SessionGenConfig {
    /// Number of participants.
    pub participant_count: usize,
    /// Number of transactions to log.
    pub transaction_count: usize,
    /// Extra currencies besides the base currency.
    pub currencies: Vec<String>,
    /// Range of rates drawn for extra currencies (units per base unit).
    pub min_rate: f64,
    pub max_rate: f64,
    /// Range of transaction amounts, in the transaction's own currency.
    pub min_amount: f64,
    pub max_amount: f64,
    /// Fixed seed for reproducible sessions.
    pub seed: Option<u64>,
}

impl Default for SessionGenConfig {
    fn default() -> Self {
        Self {
            participant_count: 5,
            transaction_count: 20,
            currencies: vec!["KRW".to_string(), "USD".to_string()],
            min_rate: 0.1,
            max_rate: 250.0,
            min_amount: 1.0,
            max_amount: 5_000.0,
            seed: None,
        }
    }
}

fn random_decimal(rng: &mut StdRng, min: f64, max: f64, dp: u32) -> Decimal {
    let value = if max > min { rng.gen_range(min..max) } else { min };
    Decimal::from_f64_retain(value)
        .unwrap_or(Decimal::ONE)
        .round_dp(dp)
}

/// Generate a random, fully valid session.
pub fn generate_random_session(config: &SessionGenConfig) -> Result<Session, SettlementError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut session = Session::new(SessionConfig::default());

    let participants: Vec<String> = (0..config.participant_count)
        .map(|i| format!("P{:03}", i))
        .collect();
    for name in &participants {
        session.add_participant(name.as_str())?;
    }

    for code in &config.currencies {
        let mut rate = random_decimal(&mut rng, config.min_rate, config.max_rate, 4);
        if rate <= Decimal::ZERO {
            rate = Decimal::ONE;
        }
        session.add_currency(code.as_str(), rate)?;
    }

    if participants.is_empty() {
        return Ok(session);
    }

    let currencies = session.currencies().currencies();
    for i in 0..config.transaction_count {
        let payer = &participants[rng.gen_range(0..participants.len())];
        let currency = &currencies[rng.gen_range(0..currencies.len())];
        let mut amount = random_decimal(&mut rng, config.min_amount, config.max_amount, 2);
        if amount <= Decimal::ZERO {
            amount = Decimal::ONE;
        }
        session.add_transaction(
            format!("expense #{}", i + 1),
            amount,
            currency.as_str(),
            payer.as_str(),
        )?;
    }

    Ok(session)
}
