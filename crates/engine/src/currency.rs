use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO currency code a group keeps its ledger in.
///
/// Every group is mono-currency: all of its expenses, balances and
/// settlements are expressed in the group currency. Cross-group views
/// (see [`payments_overview`](crate::payments_overview)) keep totals split by
/// currency instead of converting.
///
/// ## Minor units
///
/// The engine stores monetary values as an `i64` number of **minor units**
/// (see [`Money`](crate::Money)). Every supported currency uses 2 fraction
/// digits, so `10.50 USD` ⇄ `1050`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Mxn,
    Ars,
    Cop,
    Pen,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Mxn => "MXN",
            Currency::Ars => "ARS",
            Currency::Cop => "COP",
            Currency::Pen => "PEN",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        2
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    /// Parses a currency code; an empty code falls back to the default.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "" => Ok(Currency::default()),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "MXN" => Ok(Currency::Mxn),
            "ARS" => Ok(Currency::Ars),
            "COP" => Ok(Currency::Cop),
            "PEN" => Ok(Currency::Pen),
            other => Err(EngineError::UnknownCurrency(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Currency::try_from("eur").unwrap(), Currency::Eur);
        assert_eq!(Currency::try_from(" Mxn ").unwrap(), Currency::Mxn);
    }

    #[test]
    fn empty_code_defaults_to_usd() {
        assert_eq!(Currency::try_from("  ").unwrap(), Currency::Usd);
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_eq!(
            Currency::try_from("xyz"),
            Err(EngineError::UnknownCurrency("XYZ".to_string()))
        );
    }
}
