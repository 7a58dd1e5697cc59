//! Effective price for a single course.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Course, CourseDiscount, DiscountKind};
use crate::catalog::course::validate_value;
use crate::money::{div_round_half_up, Money};

/// The price a user should be shown for a course.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceResult {
    /// List price, never negative.
    pub base_price: Money,
    /// Price after any active discount. `0 <= final_price <= base_price`.
    pub final_price: Money,
    /// Percentage off: the configured value for percent discounts, the
    /// rounded effective rate for fixed discounts, 0 otherwise.
    pub discount_percent: f64,
    /// Whether a discount applies right now.
    pub has_discount: bool,
}

impl PriceResult {
    /// A result with no discount applied.
    pub fn undiscounted(base_price: Money) -> Self {
        Self {
            base_price,
            final_price: base_price,
            discount_percent: 0.0,
            has_discount: false,
        }
    }

    /// Amount saved by the discount.
    pub fn savings(&self) -> Money {
        self.base_price
            .try_subtract(&self.final_price)
            .unwrap_or_else(|| Money::zero(self.base_price.currency))
    }

    /// Check if the user pays nothing, whether list price or discount.
    pub fn is_zero(&self) -> bool {
        self.final_price.is_zero()
    }
}

/// Resolve the effective price of `course` at `now`.
///
/// Total: malformed or missing discount data prices as "no discount".
pub fn resolve_price(course: &Course, now: DateTime<Utc>) -> PriceResult {
    let base_price = course.base_price.non_negative();

    let (kind, value, window) = match &course.discount {
        CourseDiscount::Percent { percent, window } => (DiscountKind::Percent, *percent, window),
        CourseDiscount::Fixed { amount, window } => (DiscountKind::Fixed, *amount, window),
        CourseDiscount::None | CourseDiscount::Invalid { .. } => {
            return PriceResult::undiscounted(base_price)
        }
    };

    // Courses built in code skip wire validation; re-check here.
    if validate_value(kind, value).is_some() || !window.contains(now) {
        return PriceResult::undiscounted(base_price);
    }

    match kind {
        DiscountKind::Percent => {
            let final_price = base_price.percent_off(value).non_negative();
            PriceResult {
                base_price,
                final_price: cap_at(final_price, base_price),
                discount_percent: value,
                has_discount: true,
            }
        }
        DiscountKind::Fixed => {
            let final_price = cap_at(base_price.minus_decimal_floored(value), base_price);
            let discount_percent = if base_price.is_positive() {
                let saved = i128::from(base_price.amount_cents - final_price.amount_cents);
                div_round_half_up(saved * 100, i128::from(base_price.amount_cents)) as f64
            } else {
                0.0
            };
            PriceResult {
                base_price,
                final_price,
                discount_percent,
                has_discount: true,
            }
        }
    }
}

/// Resolve the effective price of `course` against the system clock.
pub fn resolve_price_now(course: &Course) -> PriceResult {
    resolve_price(course, Utc::now())
}

fn cap_at(price: Money, ceiling: Money) -> Money {
    if price.amount_cents > ceiling.amount_cents {
        ceiling
    } else {
        price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DiscountWindow, RawDiscount};
    use crate::money::Currency;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::USD)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_percent_discount_scenario() {
        let course = Course::new("a", "A", usd(10000)).with_discount(CourseDiscount::percent(20.0));
        let price = resolve_price(&course, now());

        assert!(price.has_discount);
        assert_eq!(price.final_price.amount_cents, 8000);
        assert_eq!(price.discount_percent, 20.0);
        assert_eq!(price.final_price.display(), "$80.00");
    }

    #[test]
    fn test_fixed_discount_exceeding_price() {
        let course = Course::new("b", "B", usd(5000)).with_discount(CourseDiscount::fixed(70.0));
        let price = resolve_price(&course, now());

        assert!(price.has_discount);
        assert_eq!(price.final_price.amount_cents, 0);
        assert_eq!(price.discount_percent, 100.0);
    }

    #[test]
    fn test_fixed_discount_percent_is_rounded() {
        // 30 - 10 = 20; saved 10/30 = 33.33% -> 33
        let course = Course::new("c", "C", usd(3000)).with_discount(CourseDiscount::fixed(10.0));
        let price = resolve_price(&course, now());

        assert_eq!(price.final_price.amount_cents, 2000);
        assert_eq!(price.discount_percent, 33.0);
        assert_eq!(price.savings().amount_cents, 1000);
    }

    #[test]
    fn test_future_start_means_no_discount() {
        let tomorrow = now() + Duration::days(1);
        let course = Course::new("e", "E", usd(4000)).with_discount(
            CourseDiscount::percent(50.0).within(DiscountWindow::new(Some(tomorrow), None)),
        );
        let price = resolve_price(&course, now());

        assert!(!price.has_discount);
        assert_eq!(price.final_price, price.base_price);
        assert_eq!(price.discount_percent, 0.0);
    }

    #[test]
    fn test_expired_window_means_no_discount() {
        let yesterday = now() - Duration::days(1);
        let course = Course::new("e", "E", usd(4000)).with_discount(
            CourseDiscount::fixed(5.0).within(DiscountWindow::new(None, Some(yesterday))),
        );
        assert!(!resolve_price(&course, now()).has_discount);
    }

    #[test]
    fn test_window_edges_are_inclusive() {
        let course = Course::new("w", "W", usd(1000)).with_discount(
            CourseDiscount::percent(10.0).within(DiscountWindow::new(Some(now()), Some(now()))),
        );
        let price = resolve_price(&course, now());
        assert!(price.has_discount);
        assert_eq!(price.final_price.amount_cents, 900);
    }

    #[test]
    fn test_invalid_discount_prices_as_base() {
        let discount = CourseDiscount::from_raw(RawDiscount {
            active: true,
            kind: Some("percent"),
            value: Some(-10.0),
            starts_at: None,
            ends_at: None,
        });
        let course = Course::new("v", "V", usd(2500)).with_discount(discount);
        assert_eq!(resolve_price(&course, now()), PriceResult::undiscounted(usd(2500)));
    }

    #[test]
    fn test_code_built_out_of_range_percent_is_ignored() {
        let course = Course::new("v", "V", usd(2500)).with_discount(CourseDiscount::percent(150.0));
        assert!(!resolve_price(&course, now()).has_discount);
    }

    #[test]
    fn test_zero_base_fixed_discount() {
        let course = Course::new("z", "Z", usd(0)).with_discount(CourseDiscount::fixed(5.0));
        let price = resolve_price(&course, now());
        assert_eq!(price.final_price.amount_cents, 0);
        assert_eq!(price.discount_percent, 0.0);
    }

    #[test]
    fn test_huge_fixed_discount_is_free() {
        let course = Course::new("h", "H", usd(5000)).with_discount(CourseDiscount::fixed(1e35));
        let price = resolve_price(&course, now());
        assert!(price.has_discount);
        assert_eq!(price.final_price.amount_cents, 0);
        assert_eq!(price.discount_percent, 100.0);
    }

    #[test]
    fn test_huge_base_price_is_priced() {
        let base = Money::from_decimal(1e35, Currency::USD);
        let course = Course::new("b", "B", base).with_discount(CourseDiscount::fixed(1e35));
        let price = resolve_price(&course, now());
        assert_eq!(price.base_price.amount_cents, i64::MAX);
        assert_eq!(price.final_price.amount_cents, 0);

        let course = Course::new("b", "B", base).with_discount(CourseDiscount::percent(50.0));
        let price = resolve_price(&course, now());
        assert!(price.final_price.amount_cents <= price.base_price.amount_cents);
        assert!(price.final_price.is_positive());
    }

    proptest! {
        #[test]
        fn prop_percent_never_exceeds_base(cents in 0i64..10_000_000, percent in 0.0f64..=100.0) {
            let course = Course::new("p", "P", usd(cents))
                .with_discount(CourseDiscount::percent(percent));
            let price = resolve_price(&course, now());

            prop_assert!(price.final_price.amount_cents <= price.base_price.amount_cents);
            prop_assert!(price.final_price.amount_cents >= 0);
            let expected = (cents as f64 * (1.0 - percent / 100.0)).round() as i64;
            prop_assert!((price.final_price.amount_cents - expected).abs() <= 1);
        }

        #[test]
        fn prop_fixed_is_floored_subtraction(cents in 0i64..10_000_000, off in 0i64..20_000_000) {
            let course = Course::new("f", "F", usd(cents))
                .with_discount(CourseDiscount::fixed(off as f64 / 100.0));
            let price = resolve_price(&course, now());

            prop_assert_eq!(price.final_price.amount_cents, (cents - off).max(0));
        }
    }
}
