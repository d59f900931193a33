use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Level used for this crate when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_DIRECTIVE: &str = "bank_offers_scraper=info";

/// Scrape bank card offer pages and replace the offers tab of a Google Sheet.
#[derive(Debug, Parser)]
#[command(name = "bank_offers_scraper", version)]
pub struct Args {
    /// Print the harvested offers as JSON lines instead of publishing them
    #[arg(long)]
    pub dry_run: bool,
}

/// The filter given by `rust_log`, or [`DEFAULT_LOG_DIRECTIVE`].
pub fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}
