use serde::Serialize;

use super::error::{ModelError, ModelResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanParameters {
    pub down_payment_fraction: f64,
    pub annual_interest_rate: f64,
    pub term_years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketParameters {
    pub annual_appreciation_rate: f64,
    pub annual_inflation_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityParameters {
    loan: LoanParameters,
    market: MarketParameters,
}

impl EquityParameters {
    pub fn new(loan: LoanParameters, market: MarketParameters) -> ModelResult<Self> {
        let down = loan.down_payment_fraction;
        if !down.is_finite() || down <= 0.0 || down >= 1.0 {
            return Err(ModelError::invalid(
                "down_payment_fraction",
                down,
                "must be strictly between 0 and 1",
            ));
        }

        let interest = loan.annual_interest_rate;
        if !interest.is_finite() || interest < 0.0 {
            return Err(ModelError::invalid(
                "annual_interest_rate",
                interest,
                "must be finite and >= 0",
            ));
        }

        if loan.term_years == 0 {
            return Err(ModelError::invalid("term_years", 0.0, "must be > 0"));
        }

        for (name, rate) in [
            ("annual_appreciation_rate", market.annual_appreciation_rate),
            ("annual_inflation_rate", market.annual_inflation_rate),
        ] {
            if !rate.is_finite() || rate <= -1.0 {
                return Err(ModelError::invalid(name, rate, "must be finite and > -1"));
            }
        }

        Ok(Self { loan, market })
    }

    pub fn loan(&self) -> &LoanParameters {
        &self.loan
    }

    pub fn market(&self) -> &MarketParameters {
        &self.market
    }

    pub fn down_payment_fraction(&self) -> f64 {
        self.loan.down_payment_fraction
    }

    pub fn months(&self) -> usize {
        self.loan.term_years as usize * 12
    }

    pub fn monthly_rate(&self) -> f64 {
        self.loan.annual_interest_rate / 12.0
    }

    pub fn initial_debt(&self) -> f64 {
        1.0 - self.loan.down_payment_fraction
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquitySeries {
    pub months: usize,
    pub monthly_payment: f64,
    pub years: Vec<f64>,
    pub debt: Vec<f64>,
    pub base_equity: Vec<f64>,
    pub appreciation: Vec<f64>,
    pub equity: Vec<f64>,
    pub real_equity: Vec<f64>,
    pub loan_to_value: Vec<f64>,
    pub rate_of_return_years: Vec<f64>,
    pub rate_of_return: Vec<f64>,
    pub cagr_years: Vec<f64>,
    pub cagr: Vec<f64>,
    pub real_cagr: Vec<f64>,
}
