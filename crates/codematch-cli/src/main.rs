use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod templates;

use cli::args::Cli;
use cli::commands::{dispatch, exit_codes};

fn init_logging(json: bool) {
    let level = std::env::var("CODEMATCH_LOG").unwrap_or_else(|_| "warn".to_string());
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_writer(std::io::stderr);

    let _ = if json {
        builder
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .try_init()
    } else {
        builder.try_init()
    };
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.global.log_json);

    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            if let Some(diag) = codematch_core::errors::try_map_error(&e) {
                eprintln!("{}", diag);
            } else {
                eprintln!("fatal: {e:?}");
            }
            exit_codes::CONFIG_ERROR
        }
    };
    std::process::exit(code);
}
