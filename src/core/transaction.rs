use crate::core::currency::CurrencyCode;
use crate::core::errors::{InvalidInput, SettlementError};
use crate::core::participant::Participant;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One shared expense, paid upfront by `payer` and split evenly across
/// every participant, the payer included.
///
/// Transactions are immutable once created. Construction checks the fields
/// that can be judged in isolation (description, amount); whether the
/// currency and payer exist is checked against a session or at settlement.
///
/// # Examples
///
/// ```
/// use split_settle::core::currency::CurrencyCode;
/// use split_settle::core::participant::Participant;
/// use split_settle::core::transaction::Transaction;
/// use rust_decimal_macros::dec;
///
/// let dinner = Transaction::new(
///     "Dinner",
///     dec!(300),
///     CurrencyCode::new("CNY"),
///     Participant::new("Alice"),
/// )
/// .unwrap();
///
/// assert_eq!(dinner.amount(), dec!(300));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TransactionRecord")]
pub struct Transaction {
    id: Uuid,
    description: String,
    /// Always positive.
    amount: Decimal,
    currency: CurrencyCode,
    payer: Participant,
}

/// Wire shape of a transaction before validation.
#[derive(Deserialize)]
struct TransactionRecord {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    description: String,
    amount: Decimal,
    currency: CurrencyCode,
    payer: Participant,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = SettlementError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        Transaction::with_id(
            record.id,
            record.description,
            record.amount,
            record.currency,
            record.payer,
        )
    }
}

impl Transaction {
    /// Create a transaction with a fresh id.
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
        currency: CurrencyCode,
        payer: Participant,
    ) -> Result<Self, SettlementError> {
        Self::with_id(Uuid::new_v4(), description, amount, currency, payer)
    }

    /// Create a transaction with a caller-chosen id.
    pub fn with_id(
        id: Uuid,
        description: impl Into<String>,
        amount: Decimal,
        currency: CurrencyCode,
        payer: Participant,
    ) -> Result<Self, SettlementError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(InvalidInput::EmptyDescription.into());
        }
        if amount <= Decimal::ZERO {
            return Err(InvalidInput::NonPositiveAmount(amount).into());
        }
        Ok(Self {
            id,
            description,
            amount,
            currency,
            payer,
        })
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn payer(&self) -> &Participant {
        &self.payer
    }

    /// Copy of this transaction denominated in another currency name.
    /// Used when the base currency is renamed.
    pub(crate) fn with_currency(&self, currency: CurrencyCode) -> Self {
        Self {
            currency,
            ..self.clone()
        }
    }
}

/// Ordered log of transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionLog {
    transactions: Vec<Transaction>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
        }
    }

    pub fn add(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// Remove the transaction with the given id, if any.
    pub fn remove(&mut self, id: Uuid) -> Option<Transaction> {
        let index = self.transactions.iter().position(|t| t.id() == id)?;
        Some(self.transactions.remove(index))
    }

    pub fn get(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id() == id)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// True if `participant` paid for at least one transaction.
    pub fn has_payer(&self, participant: &Participant) -> bool {
        self.transactions.iter().any(|t| t.payer() == participant)
    }

    /// Re-denominate every transaction in `from` as `to`.
    pub(crate) fn rename_currency(&mut self, from: &CurrencyCode, to: &CurrencyCode) {
        for transaction in &mut self.transactions {
            if transaction.currency() == from {
                *transaction = transaction.with_currency(to.clone());
            }
        }
    }

    /// All unique currencies referenced in this log.
    pub fn currencies(&self) -> Vec<CurrencyCode> {
        let mut currencies: Vec<CurrencyCode> = self
            .transactions
            .iter()
            .map(|t| t.currency().clone())
            .collect();
        currencies.sort();
        currencies.dedup();
        currencies
    }
}

impl FromIterator<Transaction> for TransactionLog {
    fn from_iter<T: IntoIterator<Item = Transaction>>(iter: T) -> Self {
        Self {
            transactions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TransactionLog {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}
