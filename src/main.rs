//! trascan CLI
//!
//! Extracts company, VRN, receipt number, date and total from TRA receipt
//! verification pages listed in a text file.

use clap::{CommandFactory, Parser};
use trascan::scan::{run_scan, ScanArgs};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "trascan")]
#[command(version)]
#[command(about = "Extract TRA receipt data from verification URLs into CSV")]
#[command(long_about = "Reads one verify.tra.go.tz receipt URL per line from INPUT, fetches each page\nand writes Results-<INPUT>.csv and Errors-<INPUT> into OUTPUT_DIR.")]
struct Cli {
    #[command(flatten)]
    scan: ScanArgs,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(err) = run_scan(cli.scan).await {
        eprintln!("{}", Cli::command().render_usage());
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
