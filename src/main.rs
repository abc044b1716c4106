//! `dsir`: how many days since it rained at an address.
//!
//! Reads its configuration from the environment (`GMAPSKEY` is required) and prints
//! either a sentence or, with `--json`, the same summary object a web front end serves.

use argh::FromArgs;
use dsir::{daily_history_link, Config, DaysSinceResolver, DsirError, ResolutionResult};
use serde_json::json;
use std::error::Error;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[derive(FromArgs)]
/// Days since it rained at an address
struct Args {
    /// free-text address, e.g. "1600 Pennsylvania Ave NW, Washington, DC"
    #[argh(positional)]
    address: String,

    /// only count days with more precipitation than this many inches
    #[argh(option, short = 't', default = "dsir::DEFAULT_THRESHOLD")]
    threshold: f64,

    /// print the result as a JSON object
    #[argh(switch)]
    json: bool,
}

async fn run(args: &Args, cancel: &CancellationToken) -> Result<ResolutionResult, DsirError> {
    let config = Config::from_env()?;
    let resolver = DaysSinceResolver::from_config(&config)?;
    resolver
        .resolve()
        .address(&args.address)
        .threshold(args.threshold)
        .cancellation(cancel)
        .call()
        .await
}

fn report_error(err: &DsirError, json: bool) {
    if json {
        println!(
            "{}",
            json!({ "status": "error", "message": err.kind().message() })
        );
        return;
    }
    eprintln!("Error: {}", err);
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let env = env_logger::Env::default().default_filter_or("warn");
    env_logger::init_from_env(env);

    let args: Args = argh::from_env();

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("Received Ctrl+C, cancelling...");
                cancel.cancel();
            }
        }
    });

    match run(&args, &cancel).await {
        Ok(result) if args.json => match serde_json::to_string(&result.summary()) {
            Ok(summary) => {
                println!("{}", summary);
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("Error: failed to encode result: {}", err);
                ExitCode::FAILURE
            }
        },
        Ok(result) => {
            let record = &result.matched_record;
            println!(
                "It last rained {} days ago near {}: {:.2} in on {}.",
                result.days_ago, result.location.address, record.precipitation, record.date
            );
            println!("{}", daily_history_link(&result.station, record.date));
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_error(&err, args.json);
            ExitCode::FAILURE
        }
    }
}
