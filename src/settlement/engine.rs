use crate::core::currency::{CurrencyCode, CurrencyTable};
use crate::core::errors::{InvalidInput, SettlementError};
use crate::core::participant::{Participant, Roster};
use crate::core::transaction::Transaction;
use crate::settlement::debt_table::NetDebtTable;
use log::{debug, trace};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What one participant paid, what their fair share was, and the difference.
///
/// A positive `net` means the group owes this participant money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantBalance {
    pub participant: Participant,
    /// Total of the transactions this participant paid for.
    pub paid: Decimal,
    /// This participant's even share of every transaction.
    pub share: Decimal,
    /// `paid - share`.
    pub net: Decimal,
}

/// The settlement engine.
///
/// Stateless: every call reads its inputs, never mutates them, and returns
/// a freshly computed result.
pub struct SettlementEngine;

impl SettlementEngine {
    /// Compute the pairwise-netted debt table, in `settlement_currency`.
    ///
    /// # Algorithm
    ///
    /// 1. Validate: non-empty roster, known payers, known currencies. Amounts
    ///    that leave the `Decimal` range fail with
    ///    [`InvalidInput::AmountOutOfRange`].
    /// 2. For each transaction, convert the amount to base currency, split it
    ///    evenly across all participants, and convert the share into the
    ///    settlement currency.
    /// 3. Every participant except the payer accrues that share as owed to
    ///    the payer (`raw[debtor][payer]`).
    /// 4. For each unordered pair, keep only the difference of the two
    ///    directions, owed by whichever side had the larger raw total.
    ///
    /// Nothing is rounded here; see
    /// [`round_for_display`](crate::settlement::debt_table::round_for_display).
    pub fn settle(
        participants: &Roster,
        currencies: &CurrencyTable,
        transactions: &[Transaction],
        settlement_currency: &CurrencyCode,
    ) -> Result<NetDebtTable, SettlementError> {
        let shares =
            Self::split_shares(participants, currencies, transactions, settlement_currency)?;

        let n = participants.len();
        let mut raw = vec![vec![Decimal::ZERO; n]; n];
        for (payer_idx, share) in shares {
            for (debtor_idx, row) in raw.iter_mut().enumerate() {
                if debtor_idx != payer_idx {
                    row[payer_idx] = row[payer_idx]
                        .checked_add(share)
                        .ok_or(InvalidInput::AmountOutOfRange)?;
                }
            }
        }

        let net = net_pairwise(&raw);
        let table = NetDebtTable::new(
            participants.members().to_vec(),
            settlement_currency.clone(),
            raw,
            net,
        )?;
        debug!(
            "settled {} transactions among {} participants in {}: gross {}, net {}",
            transactions.len(),
            n,
            settlement_currency,
            table.gross_total(),
            table.total_transfer()
        );
        Ok(table)
    }

    /// Per-participant paid/share/net totals, in `settlement_currency`,
    /// in roster order.
    pub fn balances(
        participants: &Roster,
        currencies: &CurrencyTable,
        transactions: &[Transaction],
        settlement_currency: &CurrencyCode,
    ) -> Result<Vec<ParticipantBalance>, SettlementError> {
        let shares =
            Self::split_shares(participants, currencies, transactions, settlement_currency)?;

        let n = participants.len();
        let count = Decimal::from(n);
        let mut paid = vec![Decimal::ZERO; n];
        let mut share_total = Decimal::ZERO;
        for (payer_idx, share) in shares {
            // The payer fronted the whole amount, i.e. n shares.
            let so_far = paid[payer_idx];
            paid[payer_idx] = share
                .checked_mul(count)
                .and_then(|fronted| so_far.checked_add(fronted))
                .ok_or(InvalidInput::AmountOutOfRange)?;
            share_total = share_total
                .checked_add(share)
                .ok_or(InvalidInput::AmountOutOfRange)?;
        }

        Ok(participants
            .iter()
            .zip(paid)
            .map(|(participant, paid)| ParticipantBalance {
                participant: participant.clone(),
                paid,
                share: share_total,
                net: paid - share_total,
            })
            .collect())
    }

    /// Validate the inputs and return, per transaction, the payer's roster
    /// index and one participant's share in the settlement currency.
    fn split_shares(
        participants: &Roster,
        currencies: &CurrencyTable,
        transactions: &[Transaction],
        settlement_currency: &CurrencyCode,
    ) -> Result<Vec<(usize, Decimal)>, SettlementError> {
        if participants.is_empty() {
            return Err(InvalidInput::EmptyRoster.into());
        }
        let settle_rate = currencies.rate_to_base(settlement_currency)?;
        let count = Decimal::from(participants.len());

        transactions
            .iter()
            .map(|transaction| -> Result<(usize, Decimal), SettlementError> {
                let payer_idx = participants.index_of(transaction.payer()).ok_or_else(|| {
                    SettlementError::UnknownPayer {
                        payer: transaction.payer().clone(),
                    }
                })?;
                let rate = currencies.rate_to_base(transaction.currency())?;
                let share = transaction
                    .amount()
                    .checked_div(rate)
                    .and_then(|in_base| in_base.checked_div(count))
                    .and_then(|per_head| per_head.checked_mul(settle_rate))
                    .ok_or(InvalidInput::AmountOutOfRange)?;
                trace!(
                    "{:?}: {} {} paid by {}, share {} {}",
                    transaction.description(),
                    transaction.amount(),
                    transaction.currency(),
                    transaction.payer(),
                    share,
                    settlement_currency
                );
                Ok((payer_idx, share))
            })
            .collect()
    }
}

/// Offset opposite-direction debts, once per unordered pair.
///
/// If `raw[a][b]` exceeds `raw[b][a]` the difference stays on `[a][b]` and
/// `[b][a]` becomes zero, and vice versa. Equal amounts cancel completely.
pub fn net_pairwise(raw: &[Vec<Decimal>]) -> Vec<Vec<Decimal>> {
    let n = raw.len();
    let mut net = vec![vec![Decimal::ZERO; n]; n];
    for a in 0..n {
        for b in (a + 1)..n {
            let a_to_b = raw[a][b];
            let b_to_a = raw[b][a];
            if a_to_b > b_to_a {
                net[a][b] = a_to_b - b_to_a;
            } else if b_to_a > a_to_b {
                net[b][a] = b_to_a - a_to_b;
            }
        }
    }
    net
}
