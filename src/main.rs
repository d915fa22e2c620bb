use std::env;

use env_logger::Env;
use log::error;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let port = raw_args
            .get(2)
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        if let Err(e) = equity::api::run_http_server(port).await {
            error!("Server error: {e}");
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = equity::api::run_cli() {
        error!("{e}");
        std::process::exit(1);
    }
}
