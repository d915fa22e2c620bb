use axum::{
    Router,
    extract::{
        Json, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use log::info;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use crate::core::{
    EquityParameters, EquitySeries, LoanParameters, MarketParameters, ModelError, run_model,
};
use crate::report::{ChartSpec, build_charts, chart_title, find_chart, render_svg, write_charts};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

pub const MAX_TERM_YEARS: u32 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EquityPayload {
    down_payment: Option<f64>,
    interest_rate: Option<f64>,
    term: Option<u32>,
    appreciation_rate: Option<f64>,
    inflation_rate: Option<f64>,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "equity",
    about = "Leveraged home-equity growth over the life of a fixed-rate mortgage"
)]
pub struct Cli {
    #[arg(long, default_value_t = 3.0, help = "Down payment in percent of purchase price")]
    down_payment: f64,
    #[arg(long, default_value_t = 4.0, help = "Annual loan interest rate in percent")]
    interest_rate: f64,
    #[arg(long, default_value_t = 30, help = "Loan term in years")]
    term: u32,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Annual property appreciation rate in percent"
    )]
    appreciation_rate: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Annual inflation rate in percent, typically the same as appreciation"
    )]
    inflation_rate: f64,
    #[arg(long, default_value = ".", help = "Directory the chart SVGs are written to")]
    output_dir: PathBuf,
    #[arg(long, help = "Print the computed series as JSON instead of writing charts")]
    json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EquityResponse {
    title: String,
    parameters: EquityParameters,
    series: EquitySeries,
    charts: Vec<ChartSpec>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn flag_for(err: &ModelError) -> &'static str {
    match err.parameter_name() {
        "down_payment_fraction" => "--down-payment",
        "annual_interest_rate" => "--interest-rate",
        "term_years" => "--term",
        "annual_appreciation_rate" => "--appreciation-rate",
        "annual_inflation_rate" => "--inflation-rate",
        _ => "parameter",
    }
}

fn build_parameters(cli: &Cli) -> Result<EquityParameters, String> {
    if cli.term > MAX_TERM_YEARS {
        return Err(format!("--term must be <= {MAX_TERM_YEARS}"));
    }

    EquityParameters::new(
        LoanParameters {
            down_payment_fraction: cli.down_payment / 100.0,
            annual_interest_rate: cli.interest_rate / 100.0,
            term_years: cli.term,
        },
        MarketParameters {
            annual_appreciation_rate: cli.appreciation_rate / 100.0,
            annual_inflation_rate: cli.inflation_rate / 100.0,
        },
    )
    .map_err(|e| format!("{}: {e}", flag_for(&e)))
}

pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    let params = build_parameters(&cli)?;
    let series = run_model(&params);

    if cli.json {
        let json = serde_json::to_string_pretty(&series)
            .map_err(|e| format!("Failed to serialize series: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    let charts = build_charts(&params, &series);
    let written = write_charts(&cli.output_dir, &charts).map_err(|e| e.to_string())?;
    info!(
        "wrote {} charts to {}",
        written.len(),
        cli.output_dir.display()
    );
    Ok(())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Equity HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, router()).await
}

fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/equity",
            get(equity_get_handler).post(equity_post_handler),
        )
        .route("/api/charts/:name", get(chart_handler))
        .fallback(not_found_handler)
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn equity_get_handler(query: Result<Query<EquityPayload>, QueryRejection>) -> Response {
    match query {
        Ok(Query(payload)) => equity_response(payload),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e.body_text()),
    }
}

async fn equity_post_handler(body: Result<Json<EquityPayload>, JsonRejection>) -> Response {
    match body {
        Ok(Json(payload)) => equity_response(payload),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e.body_text()),
    }
}

async fn chart_handler(
    Path(name): Path<String>,
    query: Result<Query<EquityPayload>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(payload)) => chart_response(payload, &name),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e.body_text()),
    }
}

fn equity_response(payload: EquityPayload) -> Response {
    let params = match parameters_from_payload(payload) {
        Ok(params) => params,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    json_response(StatusCode::OK, build_equity_response(params))
}

fn chart_response(payload: EquityPayload, name: &str) -> Response {
    let params = match parameters_from_payload(payload) {
        Ok(params) => params,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let series = run_model(&params);
    let Some(chart) = find_chart(build_charts(&params, &series), name) else {
        return error_response(StatusCode::NOT_FOUND, &format!("Unknown chart: {name}"));
    };

    with_cache_control((
        [(header::CONTENT_TYPE, "image/svg+xml")],
        render_svg(&chart),
    ))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn parameters_from_json(json: &str) -> Result<EquityParameters, String> {
    let payload = serde_json::from_str::<EquityPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    parameters_from_payload(payload)
}

fn parameters_from_payload(payload: EquityPayload) -> Result<EquityParameters, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.down_payment {
        cli.down_payment = v;
    }
    if let Some(v) = payload.interest_rate {
        cli.interest_rate = v;
    }
    if let Some(v) = payload.term {
        cli.term = v;
    }
    if let Some(v) = payload.appreciation_rate {
        cli.appreciation_rate = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }

    build_parameters(&cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        down_payment: 3.0,
        interest_rate: 4.0,
        term: 30,
        appreciation_rate: 2.0,
        inflation_rate: 2.0,
        output_dir: PathBuf::from("."),
        json: false,
    }
}

fn build_equity_response(params: EquityParameters) -> EquityResponse {
    let series = run_model(&params);
    EquityResponse {
        title: chart_title(&params),
        charts: build_charts(&params, &series),
        parameters: params,
        series,
    }
}
