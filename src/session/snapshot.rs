//! Serialized form of a [`Session`].
//!
//! A snapshot is an opaque record of the session's collections plus the time
//! it was taken. Restoring revalidates everything and refuses snapshots
//! older than the configured TTL.

use crate::core::currency::{CurrencyCode, CurrencyRate, CurrencyTable};
use crate::core::errors::SettlementError;
use crate::core::participant::Roster;
use crate::core::transaction::TransactionLog;
use crate::session::config::SessionConfig;
use crate::session::state::Session;
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors arising from loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot saved at {saved_at} is older than {ttl_days} days")]
    Expired {
        saved_at: DateTime<Utc>,
        ttl_days: i64,
    },
    #[error("inconsistent snapshot: {0}")]
    Invalid(#[from] SettlementError),
}

/// Persisted session record.
///
/// Field names are camelCase on the wire:
///
/// ```json
/// {
///   "participants": ["Alice", "Bob"],
///   "transactions": [
///     { "id": "…", "description": "Dinner", "amount": "300", "currency": "CNY", "payer": "Alice" }
///   ],
///   "currencies": [{ "name": "KRW", "rate": "200" }],
///   "baseCurrency": "CNY",
///   "settleCurrency": "CNY",
///   "savedAt": "2025-01-01T00:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(default)]
    pub participants: Roster,
    #[serde(default)]
    pub transactions: TransactionLog,
    #[serde(default)]
    pub currencies: Vec<CurrencyRate>,
    pub base_currency: CurrencyCode,
    pub settle_currency: CurrencyCode,
    pub saved_at: DateTime<Utc>,
}

impl SessionSnapshot {
    /// Capture the current state of a session.
    pub fn capture(session: &Session, now: DateTime<Utc>) -> Self {
        Self {
            participants: session.roster().clone(),
            transactions: session.transactions().clone(),
            currencies: session.currencies().entries(),
            base_currency: session.base_currency().clone(),
            settle_currency: session.settlement_currency().clone(),
            saved_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.saved_at > ttl
    }

    /// Rebuild a session, checking freshness and consistency.
    pub fn restore(
        self,
        now: DateTime<Utc>,
        config: SessionConfig,
    ) -> Result<Session, SnapshotError> {
        if self.is_expired(now, config.snapshot_ttl) {
            warn!("discarding snapshot saved at {}", self.saved_at);
            return Err(SnapshotError::Expired {
                saved_at: self.saved_at,
                ttl_days: config.snapshot_ttl.num_days(),
            });
        }
        self.restore_unchecked_age(config)
    }

    /// Rebuild a session regardless of the snapshot's age.
    pub fn restore_unchecked_age(self, config: SessionConfig) -> Result<Session, SnapshotError> {
        let currencies = CurrencyTable::from_rates(self.base_currency, self.currencies)?;
        let session = Session::from_parts(
            config,
            self.participants,
            currencies,
            self.transactions,
            self.settle_currency,
        )?;
        debug!(
            "restored session: {} participants, {} transactions",
            session.roster().len(),
            session.transactions().len()
        );
        Ok(session)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Session {
    /// Shorthand for [`SessionSnapshot::capture`].
    pub fn snapshot(&self, now: DateTime<Utc>) -> SessionSnapshot {
        SessionSnapshot::capture(self, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn saved_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn session() -> Session {
        let mut session = Session::default();
        session.add_participant("Alice").unwrap();
        session.add_participant("Bob").unwrap();
        session.add_currency("KRW", dec!(200)).unwrap();
        session
            .add_transaction("Dinner", dec!(20000), "KRW", "Bob")
            .unwrap();
        session.set_settlement_currency("KRW").unwrap();
        session
    }

    #[test]
    fn test_snapshot_wire_names() {
        let json = session().snapshot(saved_at()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["participants"][1], "Bob");
        assert_eq!(value["baseCurrency"], "CNY");
        assert_eq!(value["settleCurrency"], "KRW");
        assert_eq!(value["currencies"][0]["name"], "KRW");
        assert_eq!(value["transactions"][0]["payer"], "Bob");
        assert!(value.get("savedAt").is_some());
    }

    #[test]
    fn test_restore_keeps_settlement() {
        let original = session();
        let json = original.snapshot(saved_at()).to_json().unwrap();
        let restored = SessionSnapshot::from_json(&json)
            .unwrap()
            .restore(saved_at() + Duration::days(1), SessionConfig::default())
            .unwrap();

        assert_eq!(restored.roster(), original.roster());
        assert_eq!(restored.transactions(), original.transactions());
        assert_eq!(restored.settle().unwrap(), original.settle().unwrap());
    }

    #[test]
    fn test_expired_snapshot_refused() {
        let snapshot = session().snapshot(saved_at());
        let later = saved_at() + Duration::days(16);
        assert!(snapshot.is_expired(later, Duration::days(15)));

        let err = snapshot
            .clone()
            .restore(later, SessionConfig::default())
            .unwrap_err();
        assert!(matches!(err, SnapshotError::Expired { ttl_days: 15, .. }));

        assert!(snapshot.restore_unchecked_age(SessionConfig::default()).is_ok());
    }

    #[test]
    fn test_unknown_currency_in_snapshot() {
        let json = r#"{
            "participants": ["Alice", "Bob"],
            "transactions": [
                {"description": "Sushi", "amount": "5000", "currency": "JPY", "payer": "Alice"}
            ],
            "currencies": [],
            "baseCurrency": "CNY",
            "settleCurrency": "CNY",
            "savedAt": "2025-03-01T12:00:00Z"
        }"#;
        let err = SessionSnapshot::from_json(json)
            .unwrap()
            .restore(saved_at(), SessionConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::Invalid(SettlementError::UnknownCurrencyReference { .. })
        ));
    }

    #[test]
    fn test_duplicate_currency_in_snapshot() {
        let json = r#"{
            "participants": ["Alice"],
            "currencies": [{"name": "KRW", "rate": "200"}, {"name": "KRW", "rate": "190"}],
            "baseCurrency": "CNY",
            "settleCurrency": "CNY",
            "savedAt": "2025-03-01T12:00:00Z"
        }"#;
        let err = SessionSnapshot::from_json(json)
            .unwrap()
            .restore(saved_at(), SessionConfig::default())
            .unwrap_err();
        assert!(matches!(err, SnapshotError::Invalid(SettlementError::InvalidInput(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SessionSnapshot::from_json("{\"participants\": 3}"),
            Err(SnapshotError::Json(_))
        ));
    }
}
