use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Currency a user can pick for display and input.
///
/// All purchases are stored as a RUB-baseline amount together with the
/// exchange-rate snapshot of their date, so converting to any supported
/// currency is a division through RUB as the common base.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Rub,
    Usd,
    Eur,
    Cny,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Rub => "RUB",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Cny => "CNY",
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    /// Narrows a textual code to a [`Currency`].
    ///
    /// Unknown codes are an error, never a silent default.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "RUB" => Ok(Currency::Rub),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "CNY" => Ok(Currency::Cny),
            other => Err(EngineError::InvalidCurrency(other.to_string())),
        }
    }
}

/// Exchange-rate snapshot: how many rubles one unit of each foreign
/// currency costs. Captured once per purchase and never updated, so
/// historical reports stay currency-stable regardless of later rates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateToRub {
    pub usd: f64,
    pub eur: f64,
    pub cny: f64,
}

impl RateToRub {
    /// RUB per one unit of `currency`. RUB itself is the base: rate 1.
    #[must_use]
    pub fn rate_for(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Rub => 1.0,
            Currency::Usd => self.usd,
            Currency::Eur => self.eur,
            Currency::Cny => self.cny,
        }
    }
}

/// Converts an amount expressed in `currency` into rubles.
#[must_use]
pub fn to_rub(amount: f64, currency: Currency, rates: &RateToRub) -> f64 {
    amount * rates.rate_for(currency)
}

/// Converts a ruble amount into `currency` using the given snapshot.
#[must_use]
pub fn from_rub(amount_rub: f64, currency: Currency, rates: &RateToRub) -> f64 {
    amount_rub / rates.rate_for(currency)
}
