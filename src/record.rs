use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::extract::OfferFields;

/// Placeholder for a field the extractor could not derive.
pub const UNKNOWN: &str = "N/A";

/// Column titles of the published sheet, in row order.
pub const HEADER: [&str; 9] = [
    "Category",
    "Merchant",
    "Offer",
    "Valid Until",
    "Description",
    "Card Type",
    "Learn More",
    "Source URL",
    "Last Updated",
];

/// Format of the `Last Updated` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// The kind of card an offer page applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardType {
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Mada Debit")]
    MadaDebit,
}

impl CardType {
    pub fn label(self) -> &'static str {
        match self {
            CardType::CreditCard => "Credit Card",
            CardType::MadaDebit => "Mada Debit",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One offer as it is written to the sheet.
///
/// Built once by the aggregator from the extracted [`OfferFields`] of a block
/// and the source it came from. Every field is always populated, unknown values
/// carry [`UNKNOWN`] instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OfferRecord {
    /// Title-cased category of the source page, `All` for the debit card page.
    pub category: String,
    /// Best-effort merchant name.
    pub merchant: String,
    /// Discount phrase, or a shortened copy of the block text.
    pub offer: String,
    /// Date-like token following `Valid until`.
    pub valid_until: String,
    /// Full flattened text of the offer block.
    pub description: String,
    pub card_type: CardType,
    /// Link found in the block, as written in the markup. May be empty.
    pub learn_more: String,
    #[serde(rename = "SourceURL")]
    pub source_url: String,
    /// Capture time of the run, shared by all records of that run.
    pub last_updated: DateTime<Local>,
}

impl OfferRecord {
    pub fn new(
        fields: OfferFields,
        category: &str,
        card_type: CardType,
        source_url: &str,
        last_updated: DateTime<Local>,
    ) -> Self {
        OfferRecord {
            category: category.to_owned(),
            merchant: fields.merchant,
            offer: fields.offer,
            valid_until: fields.valid_until,
            description: fields.description,
            card_type,
            learn_more: fields.learn_more,
            source_url: source_url.to_owned(),
            last_updated,
        }
    }

    /// The record's cells in [`HEADER`] order.
    pub fn to_row(&self) -> [String; 9] {
        [
            self.category.clone(),
            self.merchant.clone(),
            self.offer.clone(),
            self.valid_until.clone(),
            self.description.clone(),
            self.card_type.label().to_owned(),
            self.learn_more.clone(),
            self.source_url.clone(),
            self.last_updated.format(TIMESTAMP_FORMAT).to_string(),
        ]
    }
}
