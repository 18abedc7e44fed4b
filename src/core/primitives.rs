//! Amortization and compounding building blocks shared by every simulator.
//!
//! Rates passed here are per-period fractions (0.01 is 1% per month). Zero
//! rates and zero terms take explicit linear branches instead of feeding the
//! annuity formulas a division by zero.

pub const MAX_PERIODS: u32 = 600;

pub const MONTHS_PER_YEAR: u32 = 12;

const RATE_EPSILON: f64 = 1e-12;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ContributionTiming {
    /// Deposit at the end of each period; it earns nothing that period.
    Ordinary,
    /// Deposit at the start of each period; it compounds for the full period.
    Due,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AmortizationStep {
    pub interest: f64,
    pub principal: f64,
    pub payment: f64,
    pub balance: f64,
}

pub fn is_zero_rate(rate: f64) -> bool {
    rate.abs() < RATE_EPSILON
}

pub fn monthly_rate(annual_percent: f64) -> f64 {
    annual_percent / 100.0 / MONTHS_PER_YEAR as f64
}

pub fn amortized_payment(principal: f64, rate: f64, periods: u32) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }
    if periods == 0 {
        return principal;
    }
    let n = periods as f64;
    if is_zero_rate(rate) {
        return principal / n;
    }
    principal * rate / (1.0 - (1.0 + rate).powf(-n))
}

/// One period of amortization. Principal never exceeds the balance, so the
/// balance bottoms out at zero and the final payment shrinks to fit.
pub fn amortize_step(balance: f64, rate: f64, payment: f64) -> AmortizationStep {
    let balance = balance.max(0.0);
    let interest = balance * rate;
    let principal = (payment - interest).max(0.0).min(balance);
    AmortizationStep {
        interest,
        principal,
        payment: interest + principal,
        balance: (balance - principal).max(0.0),
    }
}

pub fn compound(principal: f64, rate: f64, periods: u32) -> f64 {
    principal * (1.0 + rate).powf(periods as f64)
}

pub fn annuity_future_value(
    contribution: f64,
    rate: f64,
    periods: u32,
    timing: ContributionTiming,
) -> f64 {
    if periods == 0 {
        return 0.0;
    }
    let n = periods as f64;
    if is_zero_rate(rate) {
        return contribution * n;
    }
    let ordinary = contribution * ((1.0 + rate).powf(n) - 1.0) / rate;
    match timing {
        ContributionTiming::Ordinary => ordinary,
        ContributionTiming::Due => ordinary * (1.0 + rate),
    }
}

/// Periodic contribution that grows to exactly `shortfall` after `periods`.
/// Inverse of [`annuity_future_value`]; zero when nothing is missing.
pub fn required_contribution(
    shortfall: f64,
    rate: f64,
    periods: u32,
    timing: ContributionTiming,
) -> f64 {
    if shortfall <= 0.0 {
        return 0.0;
    }
    if periods == 0 {
        return shortfall;
    }
    let n = periods as f64;
    if is_zero_rate(rate) {
        return shortfall / n;
    }
    let ordinary = shortfall * rate / ((1.0 + rate).powf(n) - 1.0);
    match timing {
        ContributionTiming::Ordinary => ordinary,
        ContributionTiming::Due => ordinary / (1.0 + rate),
    }
}

pub fn deflate(amount: f64, annual_inflation: f64, years: u32) -> f64 {
    amount / (1.0 + annual_inflation).powf(years as f64)
}
