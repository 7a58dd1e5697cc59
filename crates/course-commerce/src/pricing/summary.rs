//! Cart-level price totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Course;
use crate::error::CommerceError;
use crate::ids::CourseId;
use crate::money::{Currency, Money};
use crate::pricing::{resolve_price, PriceResult};

/// Complete pricing breakdown for a cart of courses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartSummary {
    /// Sum of list prices.
    pub subtotal: Money,
    /// Sum of discounts currently in effect.
    pub discount_total: Money,
    /// What the user pays.
    pub grand_total: Money,
    /// Per-course breakdown, in cart order.
    pub lines: Vec<LinePricing>,
}

/// Pricing for one course in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinePricing {
    pub course_id: CourseId,
    pub price: PriceResult,
}

impl CartSummary {
    /// Price every course at `now` and total the results.
    ///
    /// Returns an error if courses are priced in different currencies or a
    /// total overflows.
    pub fn calculate<'a>(
        courses: impl IntoIterator<Item = &'a Course>,
        currency: Currency,
        now: DateTime<Utc>,
    ) -> Result<Self, CommerceError> {
        let lines: Vec<LinePricing> = courses
            .into_iter()
            .map(|course| LinePricing {
                course_id: course.id.clone(),
                price: resolve_price(course, now),
            })
            .collect();

        let subtotal = Money::try_sum(lines.iter().map(|l| &l.price.base_price), currency)
            .ok_or_else(|| mixed_currency(currency))?;
        let grand_total = Money::try_sum(lines.iter().map(|l| &l.price.final_price), currency)
            .ok_or_else(|| mixed_currency(currency))?;
        let discount_total = subtotal
            .try_subtract(&grand_total)
            .ok_or_else(|| mixed_currency(currency))?;

        Ok(Self {
            subtotal,
            discount_total,
            grand_total,
            lines,
        })
    }

    /// Calculate the savings from discounts.
    pub fn savings(&self) -> Money {
        self.discount_total
    }

    /// Check if any discounts are applied.
    pub fn has_discounts(&self) -> bool {
        self.discount_total.amount_cents > 0
    }

    /// Get discount percentage of subtotal.
    pub fn discount_percentage(&self) -> f64 {
        if self.subtotal.amount_cents == 0 {
            return 0.0;
        }
        (self.discount_total.amount_cents as f64 / self.subtotal.amount_cents as f64) * 100.0
    }
}

fn mixed_currency(currency: Currency) -> CommerceError {
    CommerceError::Validation(format!("cart totals must all be in {currency}"))
}
