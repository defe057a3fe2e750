use crate::core::errors::{InvalidInput, SettlementError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Name of a currency, e.g. `CNY`, `KRW`.
///
/// Names are user-chosen and compared exactly; nothing restricts them to
/// ISO 4217 codes.
///
/// # Examples
///
/// ```
/// use split_settle::core::currency::CurrencyCode;
///
/// let cny = CurrencyCode::new("CNY");
/// let krw = CurrencyCode::new("KRW");
/// assert_ne!(cny, krw);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One entry of the rate table: 1 unit of base currency = `rate` units of `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub name: CurrencyCode,
    pub rate: Decimal,
}

/// Exchange rates of every known currency relative to a base currency.
///
/// The base currency is implicitly at rate 1 and never stored as an entry.
/// Lookups of unknown currencies fail with
/// [`SettlementError::UnknownCurrencyReference`] instead of falling back to
/// a default rate.
///
/// # Examples
///
/// ```
/// use split_settle::core::currency::{CurrencyCode, CurrencyTable};
/// use rust_decimal_macros::dec;
///
/// let mut table = CurrencyTable::new(CurrencyCode::new("CNY"));
/// table.add_currency(CurrencyCode::new("KRW"), dec!(200)).unwrap();
///
/// let converted = table
///     .convert(dec!(20000), &CurrencyCode::new("KRW"), &CurrencyCode::new("CNY"))
///     .unwrap();
/// assert_eq!(converted, dec!(100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyTable {
    base_currency: CurrencyCode,
    /// Currency name -> units per one unit of base currency.
    rates: HashMap<CurrencyCode, Decimal>,
}

impl CurrencyTable {
    /// Create an empty table around the given base currency.
    pub fn new(base_currency: CurrencyCode) -> Self {
        Self {
            base_currency,
            rates: HashMap::new(),
        }
    }

    /// Build a table from rate entries, applying the same checks as
    /// [`CurrencyTable::add_currency`] to each one.
    pub fn from_rates(
        base_currency: CurrencyCode,
        entries: impl IntoIterator<Item = CurrencyRate>,
    ) -> Result<Self, SettlementError> {
        let mut table = Self::new(base_currency);
        for entry in entries {
            table.add_currency(entry.name, entry.rate)?;
        }
        Ok(table)
    }

    pub fn base_currency(&self) -> &CurrencyCode {
        &self.base_currency
    }

    /// Register a new currency. Re-adding a known name is rejected, not merged.
    pub fn add_currency(
        &mut self,
        name: CurrencyCode,
        rate: Decimal,
    ) -> Result<(), SettlementError> {
        if name.is_blank() {
            return Err(InvalidInput::BlankCurrencyName.into());
        }
        if self.is_known(&name) {
            return Err(InvalidInput::DuplicateCurrency(name).into());
        }
        check_rate(&name, rate)?;
        self.rates.insert(name, rate);
        Ok(())
    }

    /// Change the rate of an already registered currency.
    pub fn update_rate(
        &mut self,
        name: &CurrencyCode,
        rate: Decimal,
    ) -> Result<(), SettlementError> {
        check_rate(name, rate)?;
        match self.rates.get_mut(name) {
            Some(current) => {
                *current = rate;
                Ok(())
            }
            None => Err(SettlementError::UnknownCurrencyReference {
                currency: name.clone(),
            }),
        }
    }

    /// Rename the base currency. The new name must not collide with a rate entry.
    pub fn rename_base(&mut self, name: CurrencyCode) -> Result<(), SettlementError> {
        if name.is_blank() {
            return Err(InvalidInput::BlankCurrencyName.into());
        }
        if self.rates.contains_key(&name) {
            return Err(InvalidInput::DuplicateCurrency(name).into());
        }
        self.base_currency = name;
        Ok(())
    }

    /// True for the base currency and every registered currency.
    pub fn is_known(&self, currency: &CurrencyCode) -> bool {
        *currency == self.base_currency || self.rates.contains_key(currency)
    }

    /// Units of `currency` per one unit of base currency.
    pub fn rate_to_base(&self, currency: &CurrencyCode) -> Result<Decimal, SettlementError> {
        if *currency == self.base_currency {
            return Ok(Decimal::ONE);
        }
        self.rates
            .get(currency)
            .copied()
            .ok_or_else(|| SettlementError::UnknownCurrencyReference {
                currency: currency.clone(),
            })
    }

    /// Convert an amount between two known currencies through the base.
    pub fn convert(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Decimal, SettlementError> {
        let from_rate = self.rate_to_base(from)?;
        let to_rate = self.rate_to_base(to)?;
        if from == to {
            return Ok(amount);
        }
        amount
            .checked_div(from_rate)
            .and_then(|in_base| in_base.checked_mul(to_rate))
            .ok_or_else(|| InvalidInput::AmountOutOfRange.into())
    }

    /// Rate entries sorted by currency name, base currency excluded.
    pub fn entries(&self) -> Vec<CurrencyRate> {
        let mut entries: Vec<CurrencyRate> = self
            .rates
            .iter()
            .map(|(name, rate)| CurrencyRate {
                name: name.clone(),
                rate: *rate,
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// Base currency first, then every registered currency by name.
    pub fn currencies(&self) -> Vec<CurrencyCode> {
        std::iter::once(self.base_currency.clone())
            .chain(self.entries().into_iter().map(|e| e.name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

fn check_rate(currency: &CurrencyCode, rate: Decimal) -> Result<(), SettlementError> {
    if rate <= Decimal::ZERO {
        return Err(InvalidInput::NonPositiveRate {
            currency: currency.clone(),
            rate,
        }
        .into());
    }
    Ok(())
}
