use crate::core::currency::CurrencyCode;
use chrono::Duration;

/// Base currency of a fresh session.
pub const DEFAULT_BASE_CURRENCY: &str = "CNY";

/// How long a saved snapshot stays usable.
pub const DEFAULT_SNAPSHOT_TTL_DAYS: i64 = 15;

/// Defaults applied when a session is created, cleared or restored.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base currency for new and cleared sessions.
    pub base_currency: CurrencyCode,
    /// Snapshots older than this are refused on restore.
    pub snapshot_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_currency: CurrencyCode::new(DEFAULT_BASE_CURRENCY),
            snapshot_ttl: Duration::days(DEFAULT_SNAPSHOT_TTL_DAYS),
        }
    }
}
