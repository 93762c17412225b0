use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};

/// fixed periodic payment calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnuityCalculator;

impl AnnuityCalculator {
    /// payment that retires `principal` over `period_count` periods at `periodic_rate`
    ///
    /// Total over its domain: a non-positive period count yields zero, a zero
    /// rate falls back to straight-line repayment, and a compound factor too
    /// large for `Decimal` yields the perpetuity limit `principal * rate`.
    pub fn payment(principal: Money, period_count: i64, periodic_rate: Rate) -> Money {
        if period_count <= 0 {
            return Money::ZERO;
        }

        let r = periodic_rate.as_decimal();

        if r.is_zero() {
            return principal / Decimal::from(period_count);
        }

        // EMI = P * r * (1 + r)^n / ((1 + r)^n - 1)
        let Some(compound) = compound_factor(r, period_count) else {
            return perpetuity(principal, r);
        };

        let denominator = compound - Decimal::ONE;
        if denominator.is_zero() {
            return principal / Decimal::from(period_count);
        }

        match principal
            .as_decimal()
            .checked_mul(r)
            .and_then(|interest| interest.checked_mul(compound))
        {
            Some(numerator) => Money::from_decimal(numerator / denominator),
            None => perpetuity(principal, r),
        }
    }
}

/// P * r, saturating at the largest representable amount
fn perpetuity(principal: Money, r: Decimal) -> Money {
    Money::from_decimal(principal.as_decimal().checked_mul(r).unwrap_or(Decimal::MAX))
}

/// (1 + r)^n, `None` on overflow
fn compound_factor(r: Decimal, n: i64) -> Option<Decimal> {
    let base = Decimal::ONE + r;
    let mut compound = Decimal::ONE;
    for _ in 0..n {
        compound = compound.checked_mul(base)?;
    }
    Some(compound)
}
