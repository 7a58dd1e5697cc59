//! Money type for representing monetary values.
//!
//! Amounts are held in the smallest currency unit. Decimal inputs and
//! discount arithmetic go through micro-unit integers so that half-up
//! rounding to the cent is exact for every value a backend can send.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Micro-units per major unit used when snapping decimals.
const MICROS_PER_UNIT: i128 = 1_000_000;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    INR,
    JPY,
    CAD,
    AUD,
}

impl Currency {
    /// Get the currency code (e.g., "USD").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::INR => "INR",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
        }
    }

    /// Get the currency symbol (e.g., "$").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::INR => "\u{20b9}",
            Currency::JPY => "\u{00a5}",
            Currency::CAD => "CA$",
            Currency::AUD => "A$",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Minor units per major unit (100 for cents).
    pub fn minor_per_major(&self) -> i64 {
        10_i64.pow(self.decimal_places())
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "INR" => Some(Currency::INR),
            "JPY" => Some(Currency::JPY),
            "CAD" => Some(Currency::CAD),
            "AUD" => Some(Currency::AUD),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit (e.g., cents).
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from cents.
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Create a Money value from a decimal amount, rounding half-up to the
    /// smallest unit.
    ///
    /// ```
    /// use course_commerce::money::{Money, Currency};
    /// assert_eq!(Money::from_decimal(49.99, Currency::USD).amount_cents, 4999);
    /// assert_eq!(Money::from_decimal(1.005, Currency::USD).amount_cents, 101);
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        let minor = i128::from(currency.minor_per_major());
        let micros = to_micros(amount);
        let cents = div_round_half_up(micros.saturating_mul(minor), MICROS_PER_UNIT);
        Self::new(clamp_i64(cents), currency)
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount_cents > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Clamp negative amounts to zero.
    pub fn non_negative(&self) -> Self {
        Self::new(self.amount_cents.max(0), self.currency)
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        self.amount_cents as f64 / self.currency.minor_per_major() as f64
    }

    /// Format as a display string (e.g., "$49.99").
    pub fn display(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.display_amount())
    }

    /// Format as a display string without symbol (e.g., "49.99").
    pub fn display_amount(&self) -> String {
        let places = self.currency.decimal_places() as usize;
        format!("{:.places$}", self.to_decimal())
    }

    /// Try to add another Money value, returning None if currencies don't
    /// match or the sum overflows.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount_cents
            .checked_add(other.amount_cents)
            .map(|sum| Money::new(sum, self.currency))
    }

    /// Try to subtract another Money value.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount_cents
            .checked_sub(other.amount_cents)
            .map(|diff| Money::new(diff, self.currency))
    }

    /// Take `percent` off this amount, rounding half-up to the smallest unit.
    ///
    /// `percent` is expected in `[0, 100]`; callers validate it first.
    pub fn percent_off(&self, percent: f64) -> Money {
        let hundred = 100 * MICROS_PER_UNIT;
        let kept = hundred.saturating_sub(to_micros(percent));
        let cents = div_round_half_up(i128::from(self.amount_cents).saturating_mul(kept), hundred);
        Money::new(clamp_i64(cents), self.currency)
    }

    /// Subtract a decimal amount and round half-up to the smallest unit,
    /// flooring the result at zero.
    pub fn minus_decimal_floored(&self, amount: f64) -> Money {
        let minor = i128::from(self.currency.minor_per_major());
        let base_micros = i128::from(self.amount_cents) * MICROS_PER_UNIT;
        let diff = base_micros.saturating_sub(to_micros(amount).saturating_mul(minor));
        if diff <= 0 {
            return Money::zero(self.currency);
        }
        Money::new(clamp_i64(div_round_half_up(diff, MICROS_PER_UNIT)), self.currency)
    }

    /// Sum an iterator of Money values, returning None on overflow or mixed
    /// currencies.
    pub fn try_sum<'a>(
        mut iter: impl Iterator<Item = &'a Money>,
        currency: Currency,
    ) -> Option<Money> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }
}

impl Add for Money {
    type Output = Option<Money>;

    fn add(self, other: Money) -> Option<Money> {
        self.try_add(&other)
    }
}

impl Sub for Money {
    type Output = Option<Money>;

    fn sub(self, other: Money) -> Option<Money> {
        self.try_subtract(&other)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Integer division of a non-negative numerator rounding halves up.
///
/// Negative numerators round half away from zero. Saturates at the `i128`
/// bounds.
pub(crate) fn div_round_half_up(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        numerator.saturating_add(half) / denominator
    } else {
        -(numerator.saturating_neg().saturating_add(half) / denominator)
    }
}

/// Snap a decimal to micro-units. Binary float noise below 1e-6 is discarded.
fn to_micros(value: f64) -> i128 {
    if !value.is_finite() {
        return 0;
    }
    (value * MICROS_PER_UNIT as f64).round() as i128
}

fn clamp_i64(value: i128) -> i64 {
    value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Serde adapter storing a [`Money`] as a bare decimal number, as device-local
/// stores and the REST backend do. Reads numbers and numeric strings.
pub mod decimal {
    use super::{Currency, Money};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(money.to_decimal())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let amount = crate::parse::decimal_from_value(&value).into_inner();
        Ok(Money::from_decimal(amount.unwrap_or(0.0), Currency::default()))
    }
}
