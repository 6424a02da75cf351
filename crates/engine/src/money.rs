use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError};

/// Signed money amount represented as **integer minor units** (cents).
///
/// Use this type for **all** stored and derived monetary values (expense
/// amounts, balances, settlements) to avoid floating-point drift.
///
/// The value is signed:
/// - positive = the member is owed money
/// - negative = the member owes money
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Arithmetic saturates at the `i64` bounds instead of wrapping or panicking.
///
/// Receipt files go through the strict [`FromStr`] parser:
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
/// assert_eq!("10,5".parse::<Money>().unwrap().minor(), 1050);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Converts a major-unit float (e.g. `12.5`) with [`round2`].
    ///
    /// Out of range input saturates the way `as` casts do (`NaN` becomes
    /// zero). Use [`Money::try_from_major`] for user input.
    #[must_use]
    pub fn from_major(value: f64) -> Self {
        Self((round2(value) * 100.0).round() as i64)
    }

    /// Like [`Money::from_major`], but `None` for values that are not finite
    /// or do not fit in `i64` cents.
    #[must_use]
    pub fn try_from_major(value: f64) -> Option<Self> {
        let cents = (round2(value) * 100.0).round();
        (i64::MIN as f64..i64::MAX as f64)
            .contains(&cents)
            .then(|| Self(cents as i64))
    }

    /// Returns the amount in major units.
    #[must_use]
    pub fn to_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `Money(i64::MIN).abs()` is `Money(i64::MAX)`.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }
}

/// Rounds a major-unit value to 2 decimals, half away from zero.
///
/// `f64::EPSILON` is added first so that values sitting just below a `.xx5`
/// boundary because of binary representation (e.g. `1.005`) are not pulled
/// down by the representation error alone.
#[must_use]
pub fn round2(value: f64) -> f64 {
    ((value + f64::EPSILON) * 100.0).round() / 100.0
}

/// Lenient parser for free-text amounts typed by users.
///
/// Everything but digits, `.`, `,` and `-` is dropped. When both separators
/// appear, the last one is the decimal separator. When a single separator
/// kind appears once and is followed by one or two digits it is decimal,
/// otherwise it groups thousands (`1.500` is fifteen hundred). Input that
/// still does not form a number, or is too large for [`Money`], yields
/// [`Money::ZERO`].
///
/// ```rust
/// use engine::{Money, parse_amount};
///
/// assert_eq!(parse_amount("$ 1.234,56"), Money::new(123_456));
/// assert_eq!(parse_amount("12,5"), Money::new(1_250));
/// assert_eq!(parse_amount("abc"), Money::ZERO);
/// ```
#[must_use]
pub fn parse_amount(input: &str) -> Money {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    let has_comma = cleaned.contains(',');
    let has_dot = cleaned.contains('.');

    let normalized = if has_comma && has_dot {
        match cleaned.rfind([',', '.']) {
            Some(decimal_index) => {
                let integer_part: String = cleaned[..decimal_index]
                    .chars()
                    .filter(|c| !matches!(c, '.' | ','))
                    .collect();
                format!("{integer_part}.{}", &cleaned[decimal_index + 1..])
            }
            None => cleaned,
        }
    } else if has_comma || has_dot {
        let separator = if has_comma { ',' } else { '.' };
        let parts: Vec<&str> = cleaned.split(separator).collect();
        match parts.as_slice() {
            [integer_part, decimal_part]
                if !decimal_part.is_empty() && decimal_part.len() <= 2 =>
            {
                format!("{integer_part}.{decimal_part}")
            }
            _ => parts.concat(),
        }
    } else {
        cleaned
    };

    normalized
        .parse::<f64>()
        .ok()
        .and_then(Money::try_from_major)
        .unwrap_or(Money::ZERO)
}

/// Renders an amount for display as `"<CODE> <major>.<minor>"`.
#[must_use]
pub fn format_money(amount: Money, currency: Currency) -> String {
    format!("{} {amount}", currency.code())
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let major = abs / 100;
        let minor = abs % 100;
        write!(f, "{sign}{major}.{minor:02}")
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(self.0.saturating_neg())
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses `[+-]major[(.|,)minor]` with at most two fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| EngineError::InvalidAmount(format!("{reason}: {s:?}"));

        let trimmed = s.trim();
        let (negative, digits) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, trimmed[1..].trim_start()),
            Some(b'+') => (false, trimmed[1..].trim_start()),
            _ => (false, trimmed),
        };
        if digits.is_empty() {
            return Err(invalid("empty amount"));
        }

        let (major, fraction) = digits.split_once(['.', ',']).unwrap_or((digits, ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if major.is_empty() || !all_digits(major) || !all_digits(fraction) {
            return Err(invalid("invalid amount"));
        }
        let cents_part = match fraction.len() {
            0 => 0,
            1 => i64::from(fraction.as_bytes()[0] - b'0') * 10,
            2 => fraction.parse::<i64>().map_err(|_| invalid("invalid amount"))?,
            _ => return Err(invalid("too many decimals")),
        };

        let cents = major
            .parse::<i64>()
            .ok()
            .and_then(|major| major.checked_mul(100))
            .and_then(|cents| cents.checked_add(cents_part))
            .ok_or_else(|| invalid("amount too large"))?;
        Ok(Money(if negative { -cents } else { cents }))
    }
}
