use std::time::Duration;

use tracing::info;
use url::Url;

use crate::error::ConfigError;
use crate::fetch::DEFAULT_TIMEOUT;
use crate::publish::ServiceAccountKey;
use crate::record::CardType;

pub const CREDIT_CARD_BASE: &str = "https://www.riyadbank.com/personal-banking/credit-cards/offers/";
pub const CREDIT_CARD_CATEGORIES: [&str; 7] = [
    "fashion",
    "lifestyle",
    "dining",
    "travel",
    "health",
    "entertainment",
    "hotels",
];
pub const DEBIT_CARD_URL: &str = "https://www.riyadbank.com/personal-banking/debit-card/offers";
pub const DEBIT_CARD_CATEGORY: &str = "All";
pub const DEFAULT_TAB_NAME: &str = "Offers";

/// One offer page and the labels stamped on everything found there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Source {
    pub url: Url,
    pub category: String,
    pub card_type: CardType,
}

impl Source {
    pub fn new(url: Url, category: impl Into<String>, card_type: CardType) -> Self {
        Source {
            url,
            category: category.into(),
            card_type,
        }
    }
}

/// The credit card category pages in order, followed by the debit card page.
pub fn default_sources() -> Result<Vec<Source>, ConfigError> {
    let base = Url::parse(CREDIT_CARD_BASE)?;
    let mut sources = CREDIT_CARD_CATEGORIES
        .iter()
        .map(|slug| -> Result<Source, ConfigError> {
            Ok(Source::new(
                base.join(slug)?,
                title_case(slug),
                CardType::CreditCard,
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;
    sources.push(Source::new(
        Url::parse(DEBIT_CARD_URL)?,
        DEBIT_CARD_CATEGORY,
        CardType::MadaDebit,
    ));
    Ok(sources)
}

/// Uppercases the first letter of every word and lowercases the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Where the offers are published.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Destination {
    pub spreadsheet_id: String,
    pub tab_name: String,
}

/// Publishing credentials and target, required unless running dry.
#[derive(Clone)]
pub struct PublishConfig {
    pub destination: Destination,
    pub key: ServiceAccountKey,
}

/// Everything a run needs, resolved up front.
#[derive(Clone)]
pub struct Config {
    pub sources: Vec<Source>,
    pub fetch_timeout: Duration,
    /// `None` for a dry run.
    pub publish: Option<PublishConfig>,
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env(dry_run: bool) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok(), dry_run)
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F, dry_run: bool) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let publish = if dry_run {
            None
        } else {
            let credentials =
                var("GOOGLE_CREDENTIALS_JSON").ok_or(ConfigError::Missing("GOOGLE_CREDENTIALS_JSON"))?;
            let spreadsheet_id = var("GOOGLE_SHEET_ID").ok_or(ConfigError::Missing("GOOGLE_SHEET_ID"))?;
            let key: ServiceAccountKey = serde_json::from_str(&credentials)?;
            let tab_name = var("OFFERS_SHEET_NAME").unwrap_or_else(|| DEFAULT_TAB_NAME.into());
            Some(PublishConfig {
                destination: Destination {
                    spreadsheet_id,
                    tab_name,
                },
                key,
            })
        };

        let fetch_timeout = match var("OFFERS_FETCH_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidNumber {
                    name: "OFFERS_FETCH_TIMEOUT_SECS",
                    value,
                })?,
            None => DEFAULT_TIMEOUT,
        };

        let config = Config {
            sources: default_sources()?,
            fetch_timeout,
            publish,
        };
        config.log_summary();
        Ok(config)
    }

    fn log_summary(&self) {
        match &self.publish {
            Some(publish) => info!(
                sources = self.sources.len(),
                spreadsheet = %publish.destination.spreadsheet_id,
                tab = %publish.destination.tab_name,
                service_account = %publish.key.client_email,
                "configuration loaded"
            ),
            None => info!(sources = self.sources.len(), "configuration loaded (dry run)"),
        }
    }
}
