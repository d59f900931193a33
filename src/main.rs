use bank_offers_scraper::cli::{log_filter, Args};
use bank_offers_scraper::record::HEADER;
use bank_offers_scraper::{Aggregator, Config, GoogleSheets, HttpFetcher, Publisher};
use clap::Parser;
use eyre::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .init();

    let config = Config::from_env(args.dry_run)?;

    let fetcher = HttpFetcher::new(config.fetch_timeout)?;
    let aggregator = Aggregator::new(fetcher, config.sources);
    let harvest = aggregator.harvest().await;

    let Some(publish) = config.publish else {
        for record in &harvest.records {
            println!("{}", serde_json::to_string(record)?);
        }
        info!(records = harvest.records.len(), "dry run, nothing published");
        return Ok(());
    };

    if harvest.records.is_empty() {
        println!("⚠️ No offers found or scraping failed.");
        return Ok(());
    }

    let sheets = GoogleSheets::new(publish.key)?;
    sheets
        .replace(&publish.destination, &HEADER, &harvest.records)
        .await?;
    println!("✅ {} offers updated successfully!", harvest.records.len());
    Ok(())
}
