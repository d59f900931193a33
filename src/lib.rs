//! Scrape bank card offer pages and publish them to a Google Sheet.
//!
//! An [`Aggregator`] walks a list of [`Source`] pages, finds the offer blocks
//! on each with a [`Locator`], turns every block into an [`OfferRecord`] with
//! an [`Extractor`], and hands the result to a [`Publisher`] which replaces
//! the contents of a spreadsheet tab.
//!
//! Extraction is best effort: fields that cannot be recovered from a block are
//! filled with [`record::UNKNOWN`] rather than left out.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod locate;
pub mod publish;
pub mod record;

pub use aggregate::{Aggregator, Harvest};
pub use config::{Config, Destination, Source};
pub use error::{ConfigError, FetchError, PublishError};
pub use extract::{Extractor, OfferFields};
pub use fetch::{HttpFetcher, PageFetcher};
pub use locate::{Block, Locator, LocatorStrategy};
pub use publish::{GoogleSheets, Publisher};
pub use record::{CardType, OfferRecord};
pub use url::Url;
