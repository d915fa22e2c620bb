use log::{debug, warn};

use super::types::{EquityParameters, EquitySeries};

const MONTHS_PER_YEAR: f64 = 12.0;

pub fn run_model(params: &EquityParameters) -> EquitySeries {
    let months = params.months();
    let monthly_rate = params.monthly_rate();
    let payment = monthly_payment(monthly_rate, months, params.initial_debt());
    debug!(
        "running equity model: months={months}, monthly_rate={monthly_rate}, payment={payment}"
    );

    let years = year_axis(months);
    let debt = debt_schedule(payment, monthly_rate, months);
    let base_equity = base_equity(&debt);
    let appreciation = appreciation_schedule(params.market().annual_appreciation_rate, months);
    let equity = combine_equity(&base_equity, &appreciation);
    let real_equity = deflate(&equity, params.market().annual_inflation_rate);
    let loan_to_value = loan_to_value(&base_equity, &appreciation);

    let rate_of_return = instantaneous_rate_of_return(&equity);
    let cagr = cagr(&equity, params.down_payment_fraction());
    let real_cagr = real_cagr(&cagr, params.market().annual_inflation_rate);

    let undefined_ror = count_non_finite(&rate_of_return);
    let undefined_cagr = count_non_finite(&cagr);
    if undefined_ror > 0 || undefined_cagr > 0 {
        warn!(
            "equity reached zero or below: {undefined_ror} rate-of-return and \
             {undefined_cagr} CAGR points are undefined"
        );
    }

    EquitySeries {
        months,
        monthly_payment: payment,
        rate_of_return_years: midpoints(&years),
        cagr_years: years[1..].to_vec(),
        years,
        debt,
        base_equity,
        appreciation,
        equity,
        real_equity,
        loan_to_value,
        rate_of_return,
        cagr,
        real_cagr,
    }
}

pub fn monthly_payment(rate: f64, months: usize, principal: f64) -> f64 {
    if rate == 0.0 {
        return principal / months as f64;
    }
    principal * rate / (1.0 - (1.0 + rate).powf(-(months as f64)))
}

pub fn remaining_balance(payment: f64, rate: f64, months_remaining: usize) -> f64 {
    if rate == 0.0 {
        return payment * months_remaining as f64;
    }
    (payment / rate) * (1.0 - (1.0 + rate).powf(-(months_remaining as f64)))
}

pub fn year_axis(months: usize) -> Vec<f64> {
    (0..=months).map(|i| i as f64 / MONTHS_PER_YEAR).collect()
}

pub fn debt_schedule(payment: f64, rate: f64, months: usize) -> Vec<f64> {
    (0..=months)
        .map(|i| remaining_balance(payment, rate, months - i))
        .collect()
}

pub fn base_equity(debt: &[f64]) -> Vec<f64> {
    debt.iter().map(|d| 1.0 - d).collect()
}

pub fn appreciation_schedule(annual_rate: f64, months: usize) -> Vec<f64> {
    (0..=months)
        .map(|i| (1.0 + annual_rate).powf(i as f64 / MONTHS_PER_YEAR) - 1.0)
        .collect()
}

// Paydown and appreciation are added, not compounded against each other.
pub fn combine_equity(base_equity: &[f64], appreciation: &[f64]) -> Vec<f64> {
    base_equity
        .iter()
        .zip(appreciation)
        .map(|(base, gain)| base + gain)
        .collect()
}

pub fn deflate(values: &[f64], annual_inflation_rate: f64) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| v / (1.0 + annual_inflation_rate).powf(i as f64 / MONTHS_PER_YEAR))
        .collect()
}

pub fn loan_to_value(base_equity: &[f64], appreciation: &[f64]) -> Vec<f64> {
    base_equity
        .iter()
        .zip(appreciation)
        .map(|(base, gain)| (gain + base) / (gain + 1.0))
        .collect()
}

pub fn period_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|pair| {
            if pair[0] == 0.0 {
                f64::NAN
            } else {
                (pair[1] - pair[0]) / pair[0]
            }
        })
        .collect()
}

pub fn annualize(monthly_rates: &[f64]) -> Vec<f64> {
    monthly_rates
        .iter()
        .map(|r| (1.0 + r).powi(12) - 1.0)
        .collect()
}

pub fn instantaneous_rate_of_return(equity: &[f64]) -> Vec<f64> {
    annualize(&period_returns(equity))
}

pub fn cagr(equity: &[f64], down_payment_fraction: f64) -> Vec<f64> {
    equity
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, value)| {
            // Negative equity has no real-valued root.
            if *value < 0.0 {
                return f64::NAN;
            }
            let elapsed_years = i as f64 / MONTHS_PER_YEAR;
            (value / down_payment_fraction).powf(1.0 / elapsed_years) - 1.0
        })
        .collect()
}

pub fn real_cagr(cagr: &[f64], annual_inflation_rate: f64) -> Vec<f64> {
    cagr.iter().map(|r| r - annual_inflation_rate).collect()
}

pub fn midpoints(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|pair| (pair[1] + pair[0]) / 2.0)
        .collect()
}

fn count_non_finite(values: &[f64]) -> usize {
    values.iter().filter(|v| !v.is_finite()).count()
}
