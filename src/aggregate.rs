use chrono::{DateTime, Local};
use scraper::Html;
use tracing::{info, warn};

use crate::config::Source;
use crate::extract::Extractor;
use crate::fetch::PageFetcher;
use crate::locate::Locator;
use crate::record::OfferRecord;

/// A source whose page could not be fetched during a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailedSource {
    pub url: String,
    pub error: String,
}

/// Outcome of one pass over every configured source.
#[derive(Clone, Debug, Default)]
pub struct Harvest {
    pub records: Vec<OfferRecord>,
    pub failed: Vec<FailedSource>,
}

/// Runs the locator and extractor over every source, in order.
///
/// Sources are fetched one after another. A source that fails to fetch is
/// logged and contributes no records; the others are unaffected. Records keep
/// source order and, within a source, page order. Nothing is deduplicated.
pub struct Aggregator<F> {
    fetcher: F,
    sources: Vec<Source>,
    locator: Locator,
    extractor: Extractor,
}

impl<F: PageFetcher> Aggregator<F> {
    pub fn new(fetcher: F, sources: Vec<Source>) -> Self {
        Aggregator {
            fetcher,
            sources,
            locator: Locator::default(),
            extractor: Extractor::default(),
        }
    }

    pub fn with_locator(mut self, locator: Locator) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub async fn aggregate(&self) -> Vec<OfferRecord> {
        self.harvest().await.records
    }

    pub async fn aggregate_at(&self, captured_at: DateTime<Local>) -> Vec<OfferRecord> {
        self.harvest_at(captured_at).await.records
    }

    /// Harvests every source, stamping records with the current time.
    pub async fn harvest(&self) -> Harvest {
        self.harvest_at(Local::now()).await
    }

    pub async fn harvest_at(&self, captured_at: DateTime<Local>) -> Harvest {
        let mut harvest = Harvest::default();
        for source in &self.sources {
            match self.fetcher.fetch(&source.url).await {
                Ok(body) => {
                    let records = self.extract_page(&body, source, captured_at);
                    harvest.records.extend(records);
                }
                Err(e) => {
                    warn!(url = %source.url, error = %e, "skipping source");
                    harvest.failed.push(FailedSource {
                        url: source.url.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
        if harvest.records.is_empty() {
            warn!(
                sources = self.sources.len(),
                failed_sources = harvest.failed.len(),
                "no offers found"
            );
        } else {
            info!(records = harvest.records.len(), "harvest complete");
        }
        harvest
    }

    /// Records found in one page's markup.
    pub fn extract_page(
        &self,
        body: &str,
        source: &Source,
        captured_at: DateTime<Local>,
    ) -> Vec<OfferRecord> {
        let document = Html::parse_document(body);
        let Some((strategy, blocks)) = self.locator.locate_with_strategy(&document) else {
            info!(url = %source.url, category = %source.category, "no offer blocks found");
            return Vec::new();
        };
        info!(
            url = %source.url,
            category = %source.category,
            blocks = blocks.len(),
            ?strategy,
            "located offer blocks"
        );
        blocks
            .iter()
            .map(|block| {
                OfferRecord::new(
                    self.extractor.extract(block),
                    &source.category,
                    source.card_type,
                    source.url.as_str(),
                    captured_at,
                )
            })
            .collect()
    }
}
