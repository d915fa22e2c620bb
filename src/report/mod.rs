mod svg;

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;
use thiserror::Error;

use crate::core::{EquityParameters, EquitySeries};

pub use svg::render_svg;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub name: &'static str,
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub series: Vec<ChartSeries>,
    pub y_range: Option<(f64, f64)>,
    pub y_ticks: Option<Vec<f64>>,
}

impl ChartSpec {
    fn new(name: &'static str, title: &str, y_label: &'static str) -> Self {
        Self {
            name,
            title: title.to_string(),
            x_label: "Year",
            y_label,
            series: Vec::new(),
            y_range: None,
            y_ticks: None,
        }
    }

    fn with_series(mut self, label: &str, x: &[f64], y: Vec<f64>) -> Self {
        self.series.push(ChartSeries {
            label: label.to_string(),
            x: x.to_vec(),
            y,
        });
        self
    }

    fn with_y_ticks(mut self, step: f64, count: usize) -> Self {
        self.y_ticks = Some((0..count).map(|i| step * i as f64).collect());
        self
    }

    fn with_y_range(mut self, low: f64, high: f64) -> Self {
        self.y_range = Some((low, high));
        self
    }
}

pub const CHART_NAMES: [&str; 6] = [
    "equity",
    "down_payments",
    "LTV",
    "rate_of_return",
    "CAGR_auto",
    "CAGR_fixed",
];

/// `{:?}` prints the shortest round-trip form and keeps a trailing `.0`.
pub fn chart_title(params: &EquityParameters) -> String {
    let loan = params.loan();
    let market = params.market();
    format!(
        "interest: {:?}% term: {}yr down: {:?}%\nappreciation: {:?}% inflation: {:?}%",
        100.0 * loan.annual_interest_rate,
        loan.term_years,
        100.0 * loan.down_payment_fraction,
        100.0 * market.annual_appreciation_rate,
        100.0 * market.annual_inflation_rate,
    )
}

pub fn build_charts(params: &EquityParameters, series: &EquitySeries) -> Vec<ChartSpec> {
    let title = chart_title(params);
    let down = params.down_payment_fraction();
    let in_down_payments = |values: &[f64]| values.iter().map(|v| v / down).collect::<Vec<_>>();

    let cagr_auto = ChartSpec::new("CAGR_auto", &title, "Compound Annual Growth Rate [%]")
        .with_series("nominal", &series.cagr_years, percent(&series.cagr))
        .with_series("real", &series.cagr_years, percent(&series.real_cagr));
    let cagr_fixed = ChartSpec {
        name: "CAGR_fixed",
        ..cagr_auto.clone()
    }
    .with_y_range(0.0, 50.0)
    .with_y_ticks(5.0, 11);

    vec![
        ChartSpec::new("equity", &title, "Equity [Purchase Price %]")
            .with_series("nominal", &series.years, percent(&series.equity))
            .with_series("real", &series.years, percent(&series.real_equity)),
        ChartSpec::new("down_payments", &title, "Equity [Down Payments]")
            .with_series("nominal", &series.years, in_down_payments(&series.equity))
            .with_series("real", &series.years, in_down_payments(&series.real_equity)),
        ChartSpec::new("LTV", &title, "Loan to Value [%]")
            .with_series("LTV", &series.years, percent(&series.loan_to_value))
            .with_y_ticks(5.0, 21),
        ChartSpec::new("rate_of_return", &title, "Instantaneous Rate of Return [%]").with_series(
            "rate of return",
            &series.rate_of_return_years,
            percent(&series.rate_of_return),
        ),
        cagr_auto,
        cagr_fixed,
    ]
}

pub fn find_chart(charts: Vec<ChartSpec>, name: &str) -> Option<ChartSpec> {
    charts.into_iter().find(|chart| chart.name == name)
}

pub fn write_charts(dir: &Path, charts: &[ChartSpec]) -> Result<Vec<PathBuf>, ReportError> {
    fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(charts.len());
    for chart in charts {
        let path = dir.join(format!("{}.svg", chart.name));
        fs::write(&path, render_svg(chart)).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
        info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn percent(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| 100.0 * v).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LoanParameters, MarketParameters, run_model};

    fn sample_params() -> EquityParameters {
        EquityParameters::new(
            LoanParameters {
                down_payment_fraction: 0.03,
                annual_interest_rate: 0.04,
                term_years: 30,
            },
            MarketParameters {
                annual_appreciation_rate: 0.02,
                annual_inflation_rate: 0.02,
            },
        )
        .expect("valid parameters")
    }

    #[test]
    fn title_prints_percentages_like_the_chart_legend() {
        assert_eq!(
            chart_title(&sample_params()),
            "interest: 4.0% term: 30yr down: 3.0%\nappreciation: 2.0% inflation: 2.0%"
        );
    }

    #[test]
    fn builds_all_charts_in_order() {
        let params = sample_params();
        let charts = build_charts(&params, &run_model(&params));
        let names: Vec<_> = charts.iter().map(|c| c.name).collect();
        assert_eq!(names, CHART_NAMES);
        for chart in &charts {
            assert_eq!(chart.x_label, "Year");
            for s in &chart.series {
                assert_eq!(s.x.len(), s.y.len());
            }
        }
    }

    #[test]
    fn chart_values_are_scaled_for_display() {
        let params = sample_params();
        let series = run_model(&params);
        let charts = build_charts(&params, &series);

        let equity = &charts[0].series[0];
        assert!((equity.y[0] - 3.0).abs() < 1e-9);
        let down_payments = &charts[1].series[0];
        assert!((down_payments.y[0] - 1.0).abs() < 1e-9);
        let ror = &charts[3];
        assert_eq!(ror.series.len(), 1);
        assert_eq!(ror.series[0].x, series.rate_of_return_years);
    }

    #[test]
    fn fixed_cagr_chart_pins_axis_and_auto_does_not() {
        let params = sample_params();
        let charts = build_charts(&params, &run_model(&params));
        let auto = find_chart(charts.clone(), "CAGR_auto").expect("auto chart");
        let fixed = find_chart(charts.clone(), "CAGR_fixed").expect("fixed chart");

        assert_eq!(auto.y_range, None);
        assert_eq!(fixed.y_range, Some((0.0, 50.0)));
        assert_eq!(fixed.y_ticks.as_ref().map(Vec::len), Some(11));
        assert_eq!(auto.series, fixed.series);

        let ltv = find_chart(charts, "LTV").expect("ltv chart");
        assert_eq!(ltv.y_ticks.as_ref().and_then(|t| t.last().copied()), Some(100.0));
    }

    #[test]
    fn write_charts_creates_one_svg_per_chart() {
        let dir = tempfile::tempdir().expect("temp dir");
        let out = dir.path().join("charts");
        let params = sample_params();
        let charts = build_charts(&params, &run_model(&params));

        let written = write_charts(&out, &charts).expect("charts written");
        assert_eq!(written.len(), CHART_NAMES.len());
        for (path, name) in written.iter().zip(CHART_NAMES) {
            assert_eq!(path.file_name().and_then(|f| f.to_str()), Some(&*format!("{name}.svg")));
            let body = fs::read_to_string(path).expect("readable svg");
            assert!(body.starts_with("<svg"));
        }
    }

    #[test]
    fn write_charts_reports_unwritable_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let blocker = dir.path().join("file");
        fs::write(&blocker, "not a directory").expect("write blocker");

        let err = write_charts(&blocker.join("charts"), &[]).expect_err("must fail");
        assert!(err.to_string().contains("failed to write"));
    }
}
