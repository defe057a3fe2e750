use crate::core::currency::{CurrencyCode, CurrencyTable};
use crate::core::errors::{InvalidInput, SettlementError};
use crate::core::participant::Participant;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places shown for settlement amounts.
pub const DISPLAY_DECIMALS: u32 = 2;

/// Round an amount for presentation: two decimals, halves away from zero.
///
/// This is the only place amounts are rounded; the table itself keeps full
/// precision.
pub fn round_for_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// One line of the settlement: `payer` must pay `receiver` `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub payer: Participant,
    pub receiver: Participant,
    /// Full-precision amount in the table's settlement currency. Always positive.
    pub amount: Decimal,
}

impl Debt {
    /// The amount as it should be shown to a user.
    pub fn display_amount(&self) -> Decimal {
        round_for_display(self.amount)
    }
}

/// Square participant × participant table of who owes whom.
///
/// Holds both the raw directional totals accumulated from transactions and
/// the pairwise-netted result. Cell `[i][j]` is what participant `i` owes
/// participant `j`, indices following roster order. After netting at most
/// one of `[i][j]` and `[j][i]` is positive and the diagonal is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NetDebtTableRecord")]
pub struct NetDebtTable {
    participants: Vec<Participant>,
    settlement_currency: CurrencyCode,
    raw: Vec<Vec<Decimal>>,
    net: Vec<Vec<Decimal>>,
}

#[derive(Deserialize)]
struct NetDebtTableRecord {
    participants: Vec<Participant>,
    settlement_currency: CurrencyCode,
    raw: Vec<Vec<Decimal>>,
    net: Vec<Vec<Decimal>>,
}

impl TryFrom<NetDebtTableRecord> for NetDebtTable {
    type Error = SettlementError;

    fn try_from(record: NetDebtTableRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.participants,
            record.settlement_currency,
            record.raw,
            record.net,
        )
    }
}

impl NetDebtTable {
    /// Fails with [`InvalidInput::AmountOutOfRange`] if either matrix sums
    /// past the `Decimal` range, so the totals below cannot overflow.
    pub(crate) fn new(
        participants: Vec<Participant>,
        settlement_currency: CurrencyCode,
        raw: Vec<Vec<Decimal>>,
        net: Vec<Vec<Decimal>>,
    ) -> Result<Self, SettlementError> {
        checked_total(&raw).ok_or(InvalidInput::AmountOutOfRange)?;
        checked_total(&net).ok_or(InvalidInput::AmountOutOfRange)?;
        Ok(Self {
            participants,
            settlement_currency,
            raw,
            net,
        })
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn settlement_currency(&self) -> &CurrencyCode {
        &self.settlement_currency
    }

    fn index_of(&self, participant: &Participant) -> Option<usize> {
        self.participants.iter().position(|p| p == participant)
    }

    fn lookup(matrix: &[Vec<Decimal>], debtor: Option<usize>, creditor: Option<usize>) -> Decimal {
        match (debtor, creditor) {
            (Some(i), Some(j)) => matrix[i][j],
            _ => Decimal::ZERO,
        }
    }

    /// Net amount `debtor` owes `creditor`. Zero for unknown participants.
    pub fn amount(&self, debtor: &Participant, creditor: &Participant) -> Decimal {
        Self::lookup(&self.net, self.index_of(debtor), self.index_of(creditor))
    }

    /// Pre-netting amount accumulated from `debtor` towards `creditor`.
    pub fn raw_amount(&self, debtor: &Participant, creditor: &Participant) -> Decimal {
        Self::lookup(&self.raw, self.index_of(debtor), self.index_of(creditor))
    }

    /// Every strictly positive net debt, debtor-major in roster order.
    pub fn debts(&self) -> Vec<Debt> {
        let mut debts = Vec::new();
        for (i, payer) in self.participants.iter().enumerate() {
            for (j, receiver) in self.participants.iter().enumerate() {
                let amount = self.net[i][j];
                if amount > Decimal::ZERO {
                    debts.push(Debt {
                        payer: payer.clone(),
                        receiver: receiver.clone(),
                        amount,
                    });
                }
            }
        }
        debts
    }

    /// Debts that remain non-zero after display rounding.
    pub fn displayable_debts(&self) -> Vec<Debt> {
        self.debts()
            .into_iter()
            .filter(|d| d.display_amount() > Decimal::ZERO)
            .collect()
    }

    /// Total net amount owed to `participant`.
    pub fn total_receivable(&self, participant: &Participant) -> Decimal {
        match self.index_of(participant) {
            Some(j) => self.net.iter().map(|row| row[j]).sum(),
            None => Decimal::ZERO,
        }
    }

    /// Total net amount `participant` owes.
    pub fn total_payable(&self, participant: &Participant) -> Decimal {
        match self.index_of(participant) {
            Some(i) => self.net[i].iter().copied().sum(),
            None => Decimal::ZERO,
        }
    }

    /// Sum of all net debts: the money that actually has to change hands.
    pub fn total_transfer(&self) -> Decimal {
        self.net.iter().flatten().copied().sum()
    }

    /// Sum of all raw debts before netting.
    pub fn gross_total(&self) -> Decimal {
        self.raw.iter().flatten().copied().sum()
    }

    /// Re-express the whole table in another known currency.
    pub fn convert_to(
        &self,
        currencies: &CurrencyTable,
        target: &CurrencyCode,
    ) -> Result<NetDebtTable, SettlementError> {
        let factor = currencies
            .rate_to_base(target)?
            .checked_div(currencies.rate_to_base(&self.settlement_currency)?)
            .ok_or(InvalidInput::AmountOutOfRange)?;
        let scale = |matrix: &[Vec<Decimal>]| -> Result<Vec<Vec<Decimal>>, SettlementError> {
            matrix
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|v| v.checked_mul(factor))
                        .collect::<Option<Vec<Decimal>>>()
                        .ok_or(SettlementError::from(InvalidInput::AmountOutOfRange))
                })
                .collect()
        };
        NetDebtTable::new(
            self.participants.clone(),
            target.clone(),
            scale(&self.raw)?,
            scale(&self.net)?,
        )
    }
}

fn checked_total(matrix: &[Vec<Decimal>]) -> Option<Decimal> {
    matrix
        .iter()
        .flatten()
        .try_fold(Decimal::ZERO, |total, v| total.checked_add(*v))
}

impl fmt::Display for NetDebtTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Settlement ({}) ===", self.settlement_currency)?;
        let debts = self.displayable_debts();
        if debts.is_empty() {
            return writeln!(f, "Nobody owes anything.");
        }
        let width = self
            .participants
            .iter()
            .map(|p| p.as_str().chars().count())
            .max()
            .unwrap_or(0);
        for debt in &debts {
            writeln!(
                f,
                "{:<width$} → {:<width$} {:>12.2} {}",
                debt.payer.as_str(),
                debt.receiver.as_str(),
                debt.display_amount(),
                self.settlement_currency,
                width = width
            )?;
        }
        writeln!(
            f,
            "Total to transfer: {:.2} {}",
            round_for_display(self.total_transfer()),
            self.settlement_currency
        )
    }
}
