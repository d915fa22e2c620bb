mod engine;
mod error;
mod types;

pub use engine::{
    annualize, appreciation_schedule, base_equity, cagr, combine_equity, debt_schedule, deflate,
    instantaneous_rate_of_return, loan_to_value, midpoints, monthly_payment, period_returns,
    real_cagr, remaining_balance, run_model, year_axis,
};
pub use error::{ModelError, ModelResult};
pub use types::{EquityParameters, EquitySeries, LoanParameters, MarketParameters};
