use crate::core::currency::CurrencyCode;
use crate::core::participant::Participant;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while validating or settling a set of expenses.
///
/// Every variant is a caller error: nothing here is transient, so none of
/// them are worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
    #[error("unknown currency: {currency}")]
    UnknownCurrencyReference { currency: CurrencyCode },
    #[error("unknown payer: {payer}")]
    UnknownPayer { payer: Participant },
}

/// The specific reason an input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("at least one participant is required")]
    EmptyRoster,
    #[error("participant name must not be blank")]
    BlankParticipantName,
    #[error("participant {0} already exists")]
    DuplicateParticipant(Participant),
    #[error("participant {0} paid for logged transactions")]
    ParticipantHasTransactions(Participant),
    #[error("transaction amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("transaction description must not be empty")]
    EmptyDescription,
    #[error("currency name must not be blank")]
    BlankCurrencyName,
    #[error("exchange rate must be positive, got {rate} for {currency}")]
    NonPositiveRate { currency: CurrencyCode, rate: Decimal },
    #[error("currency {0} already exists")]
    DuplicateCurrency(CurrencyCode),
    #[error("amount exceeds the representable decimal range")]
    AmountOutOfRange,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_messages() {
        let err = SettlementError::from(InvalidInput::NonPositiveRate {
            currency: CurrencyCode::new("KRW"),
            rate: dec!(-1),
        });
        assert_eq!(
            err.to_string(),
            "invalid input: exchange rate must be positive, got -1 for KRW"
        );

        let err = SettlementError::UnknownPayer {
            payer: Participant::new("Mallory"),
        };
        assert_eq!(err.to_string(), "unknown payer: Mallory");

        let err = SettlementError::from(InvalidInput::AmountOutOfRange);
        assert_eq!(
            err.to_string(),
            "invalid input: amount exceeds the representable decimal range"
        );
    }
}
