use anyhow::Context;
use clap::Parser;
use rekopy::commands::{self, RunReport};
use rekopy::config::Cli;
use rekopy::report::{format_report, format_status};
use rekopy::Config;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Convert CLI args to Config - this validates immediately
    let config = Config::try_from(cli)?;
    let json = config.json;

    let report = commands::run(config)?;

    if json {
        let rendered = serde_json::to_string_pretty(&report).context("serializing report")?;
        println!("{}", rendered);
    } else {
        match &report {
            RunReport::Session(session) => println!("{}", format_report(session)),
            RunReport::Status(status) => println!("{}", format_status(status)),
        }
    }

    Ok(())
}

/// Logs go to stderr so they never mix with `--json` output.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Level used when `RUST_LOG` is unset. Failed files are already printed by
/// the progress display, so per-file warnings need `-v`.
fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "error",
        1 => "info",
        _ => "debug",
    }
}
