use crate::core::currency::{CurrencyCode, CurrencyTable};
use crate::core::errors::{InvalidInput, SettlementError};
use crate::core::participant::{Participant, Roster};
use crate::core::transaction::{Transaction, TransactionLog};
use crate::session::config::SessionConfig;
use crate::settlement::debt_table::NetDebtTable;
use crate::settlement::engine::{ParticipantBalance, SettlementEngine};
use log::info;
use rust_decimal::Decimal;
use uuid::Uuid;

/// The working set of one expense-splitting session.
///
/// Every mutation is validated on the spot, so a session always holds a
/// consistent set of inputs: transactions reference known participants and
/// currencies, and the settlement currency is always known.
///
/// # Examples
///
/// ```
/// use split_settle::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let mut session = Session::default();
/// session.add_participant("Alice").unwrap();
/// session.add_participant("Bob").unwrap();
/// session.add_transaction("Dinner", dec!(200), "CNY", "Alice").unwrap();
///
/// let table = session.settle().unwrap();
/// assert_eq!(
///     table.amount(&Participant::new("Bob"), &Participant::new("Alice")),
///     dec!(100)
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    roster: Roster,
    currencies: CurrencyTable,
    transactions: TransactionLog,
    settlement_currency: CurrencyCode,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    /// An empty session using the configured base currency.
    pub fn new(config: SessionConfig) -> Self {
        let base = config.base_currency.clone();
        Self {
            config,
            roster: Roster::new(),
            currencies: CurrencyTable::new(base.clone()),
            transactions: TransactionLog::new(),
            settlement_currency: base,
        }
    }

    /// Assemble a session from existing collections, checking that every
    /// transaction and the settlement currency refer to known entries.
    pub fn from_parts(
        config: SessionConfig,
        roster: Roster,
        currencies: CurrencyTable,
        transactions: TransactionLog,
        settlement_currency: CurrencyCode,
    ) -> Result<Self, SettlementError> {
        for transaction in &transactions {
            check_transaction(&roster, &currencies, transaction)?;
        }
        check_currency(&currencies, &settlement_currency)?;
        Ok(Self {
            config,
            roster,
            currencies,
            transactions,
            settlement_currency,
        })
    }

    // --- Accessors ---

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn currencies(&self) -> &CurrencyTable {
        &self.currencies
    }

    pub fn base_currency(&self) -> &CurrencyCode {
        self.currencies.base_currency()
    }

    pub fn transactions(&self) -> &TransactionLog {
        &self.transactions
    }

    pub fn settlement_currency(&self) -> &CurrencyCode {
        &self.settlement_currency
    }

    // --- Participants ---

    pub fn add_participant(&mut self, name: impl Into<String>) -> Result<(), SettlementError> {
        let participant = Participant::new(name);
        self.roster.add(participant.clone())?;
        info!("added participant {}", participant);
        Ok(())
    }

    /// Remove a participant who has not paid for any logged transaction.
    pub fn remove_participant(&mut self, name: &str) -> Result<(), SettlementError> {
        let participant = Participant::new(name);
        if !self.roster.contains(&participant) {
            return Err(SettlementError::UnknownPayer { payer: participant });
        }
        if self.transactions.has_payer(&participant) {
            return Err(InvalidInput::ParticipantHasTransactions(participant).into());
        }
        self.roster.remove(&participant);
        info!("removed participant {}", participant);
        Ok(())
    }

    // --- Currencies ---

    /// Rename the base currency. Transactions and the settlement currency
    /// denominated in the old name follow the rename.
    pub fn rename_base_currency(&mut self, code: impl Into<String>) -> Result<(), SettlementError> {
        let new_base = CurrencyCode::new(code);
        let old_base = self.currencies.base_currency().clone();
        if new_base == old_base {
            return Ok(());
        }
        self.currencies.rename_base(new_base.clone())?;
        self.transactions.rename_currency(&old_base, &new_base);
        if self.settlement_currency == old_base {
            self.settlement_currency = new_base.clone();
        }
        info!("renamed base currency {} -> {}", old_base, new_base);
        Ok(())
    }

    /// Register a currency at `rate` units per one base unit.
    pub fn add_currency(
        &mut self,
        code: impl Into<String>,
        rate: Decimal,
    ) -> Result<(), SettlementError> {
        let code = CurrencyCode::new(code);
        self.currencies.add_currency(code.clone(), rate)?;
        info!("1 {} = {} {}", self.currencies.base_currency(), rate, code);
        Ok(())
    }

    pub fn update_rate(&mut self, code: &str, rate: Decimal) -> Result<(), SettlementError> {
        let code = CurrencyCode::new(code);
        self.currencies.update_rate(&code, rate)?;
        info!("1 {} = {} {} (updated)", self.currencies.base_currency(), rate, code);
        Ok(())
    }

    pub fn set_settlement_currency(&mut self, code: &str) -> Result<(), SettlementError> {
        let code = CurrencyCode::new(code);
        check_currency(&self.currencies, &code)?;
        self.settlement_currency = code;
        Ok(())
    }

    // --- Transactions ---

    /// Log an expense and return its id.
    pub fn add_transaction(
        &mut self,
        description: impl Into<String>,
        amount: Decimal,
        currency: &str,
        payer: &str,
    ) -> Result<Uuid, SettlementError> {
        let transaction = Transaction::new(
            description,
            amount,
            CurrencyCode::new(currency),
            Participant::new(payer),
        )?;
        check_transaction(&self.roster, &self.currencies, &transaction)?;
        let id = transaction.id();
        info!(
            "logged {:?}: {} {} paid by {}",
            transaction.description(),
            transaction.amount(),
            transaction.currency(),
            transaction.payer()
        );
        self.transactions.add(transaction);
        Ok(id)
    }

    pub fn remove_transaction(&mut self, id: Uuid) -> Option<Transaction> {
        self.transactions.remove(id)
    }

    /// Drop everything and start over with the configured defaults.
    pub fn clear(&mut self) {
        *self = Self::new(self.config.clone());
        info!("session cleared");
    }

    // --- Settlement ---

    /// Net debt table in the selected settlement currency.
    pub fn settle(&self) -> Result<NetDebtTable, SettlementError> {
        SettlementEngine::settle(
            &self.roster,
            &self.currencies,
            self.transactions.transactions(),
            &self.settlement_currency,
        )
    }

    /// Per-participant balances in the selected settlement currency.
    pub fn balances(&self) -> Result<Vec<ParticipantBalance>, SettlementError> {
        SettlementEngine::balances(
            &self.roster,
            &self.currencies,
            self.transactions.transactions(),
            &self.settlement_currency,
        )
    }
}

fn check_currency(currencies: &CurrencyTable, code: &CurrencyCode) -> Result<(), SettlementError> {
    if currencies.is_known(code) {
        Ok(())
    } else {
        Err(SettlementError::UnknownCurrencyReference {
            currency: code.clone(),
        })
    }
}

fn check_transaction(
    roster: &Roster,
    currencies: &CurrencyTable,
    transaction: &Transaction,
) -> Result<(), SettlementError> {
    check_currency(currencies, transaction.currency())?;
    if !roster.contains(transaction.payer()) {
        return Err(SettlementError::UnknownPayer {
            payer: transaction.payer().clone(),
        });
    }
    Ok(())
}
