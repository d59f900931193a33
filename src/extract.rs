//! Field extraction from the free text of an offer block.
//!
//! The page markup carries no schema, so every field is recovered with its own
//! pattern over the flattened block text. The rules live in [`RULES`] as data:
//! each names the field it fills, the pattern whose first match is taken, and
//! what to use when the pattern finds nothing. Rules never interact, a miss on
//! one field leaves the others untouched.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::locate::Block;
use crate::record::UNKNOWN;

/// Number of characters of block text kept when no offer phrase is found.
pub const OFFER_FALLBACK_CHARS: usize = 60;
pub const ELLIPSIS: &str = "...";
pub const MERCHANT_MIN_CHARS: usize = 3;

static MERCHANT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z][A-Za-z&'\- ]{2,}").unwrap());

static OFFER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\d+(?:[.,]\d+)?\s?%",
        r"|(?:SAR|SR|USD|\$|€|£)\s?\d+(?:[.,]\d+)?",
        r"|\d+(?:[.,]\d+)?\s?(?:SAR|SR|riyals?)\b",
        r"|\b(?:off|discount|cashback)\b",
    ))
    .unwrap()
});

static VALID_UNTIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)valid\s+until\s+(?P<value>[0-9A-Za-z/.\-]+)").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Merchant,
    Offer,
    ValidUntil,
}

/// What a rule yields when its pattern does not match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fallback {
    /// The [`UNKNOWN`] placeholder.
    Unknown,
    /// The first `n` characters of the block text followed by [`ELLIPSIS`].
    Truncate(usize),
}

/// One field's extraction policy.
///
/// A pattern with a `value` capture group yields that group, otherwise the
/// whole match. Surrounding whitespace is trimmed from the result, and matches
/// shorter than `min_chars` after trimming are passed over.
pub struct ExtractionRule {
    pub field: Field,
    pub pattern: &'static Lazy<Regex>,
    pub min_chars: usize,
    pub fallback: Fallback,
}

impl ExtractionRule {
    pub fn apply(&self, text: &str) -> String {
        self.find(text)
            .unwrap_or_else(|| match self.fallback {
                Fallback::Unknown => UNKNOWN.to_owned(),
                Fallback::Truncate(n) => truncate(text, n),
            })
    }

    /// The first match of the pattern at least `min_chars` long once trimmed.
    pub fn find(&self, text: &str) -> Option<String> {
        self.pattern
            .captures_iter(text)
            .filter_map(|captures| captures.name("value").or_else(|| captures.get(0)))
            .map(|found| found.as_str().trim())
            .find(|found| !found.is_empty() && found.chars().count() >= self.min_chars)
            .map(str::to_owned)
    }
}

pub static RULES: [ExtractionRule; 3] = [
    ExtractionRule {
        field: Field::Merchant,
        pattern: &MERCHANT_RE,
        min_chars: MERCHANT_MIN_CHARS,
        fallback: Fallback::Unknown,
    },
    ExtractionRule {
        field: Field::Offer,
        pattern: &OFFER_RE,
        min_chars: 1,
        fallback: Fallback::Truncate(OFFER_FALLBACK_CHARS),
    },
    ExtractionRule {
        field: Field::ValidUntil,
        pattern: &VALID_UNTIL_RE,
        min_chars: 1,
        fallback: Fallback::Unknown,
    },
];

fn truncate(text: &str, n: usize) -> String {
    let mut short = text.chars().take(n).collect::<String>();
    short.push_str(ELLIPSIS);
    short
}

/// Fields recovered from a single block, before it is tied to a source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OfferFields {
    pub merchant: String,
    pub offer: String,
    pub valid_until: String,
    pub description: String,
    pub learn_more: String,
}

/// Applies a rule set to blocks.
#[derive(Clone, Copy)]
pub struct Extractor {
    rules: &'static [ExtractionRule],
}

impl Default for Extractor {
    fn default() -> Self {
        Extractor { rules: &RULES }
    }
}

impl Extractor {
    pub fn new(rules: &'static [ExtractionRule]) -> Self {
        Extractor { rules }
    }

    pub fn extract(&self, block: &Block) -> OfferFields {
        let text = block.text.as_str();
        let mut fields = OfferFields {
            merchant: UNKNOWN.to_owned(),
            offer: truncate(text, OFFER_FALLBACK_CHARS),
            valid_until: UNKNOWN.to_owned(),
            description: text.to_owned(),
            learn_more: block.link.clone().unwrap_or_default(),
        };
        for rule in self.rules {
            let value = rule.apply(text);
            match rule.field {
                Field::Merchant => fields.merchant = value,
                Field::Offer => fields.offer = value,
                Field::ValidUntil => fields.valid_until = value,
            }
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str, link: Option<&str>) -> OfferFields {
        Extractor::default().extract(&Block::new(text, link.map(Into::into)))
    }

    #[test]
    fn full_offer_block() {
        let fields = extract("Acme Fashion 20% Off Valid until 12/31/2025", Some("/deal/1"));
        assert!(fields.merchant.starts_with("Acme Fashion"));
        assert_eq!(fields.offer, "20%");
        assert_eq!(fields.valid_until, "12/31/2025");
        assert_eq!(fields.learn_more, "/deal/1");
        assert_eq!(fields.description, "Acme Fashion 20% Off Valid until 12/31/2025");
    }

    #[test]
    fn unstructured_block_uses_fallbacks() {
        let text = "enjoy a treat at any of our partner outlets across the kingdom this season";
        let fields = extract(text, None);
        assert_eq!(fields.merchant, UNKNOWN);
        assert_eq!(fields.valid_until, UNKNOWN);
        assert_eq!(fields.offer, format!("{}...", &text[..60]));
        assert_eq!(fields.learn_more, "");
        assert_eq!(fields.description, text);
    }

    #[test]
    fn short_text_fallback_still_gets_ellipsis() {
        assert_eq!(extract("just a note", None).offer, "just a note...");
    }

    #[test]
    fn fallback_truncates_on_characters() {
        let text = "é".repeat(80);
        let offer = extract(&text, None).offer;
        assert_eq!(offer.chars().count(), 63);
        assert!(offer.ends_with(ELLIPSIS));
    }

    #[test]
    fn offer_takes_first_match() {
        assert_eq!(extract("get cashback of 15% today", None).offer, "cashback");
        assert_eq!(extract("save SAR 200 or 10%", None).offer, "SAR 200");
        assert_eq!(extract("up to 150 SAR back", None).offer, "150 SAR");
        assert_eq!(extract("Flat $25 on orders", None).offer, "$25");
        assert_eq!(extract("special DISCOUNT for members", None).offer, "DISCOUNT");
    }

    #[test]
    fn offer_keywords_match_whole_words() {
        let text = "official offers from trusted partners for everyone in town today";
        assert!(extract(text, None).offer.ends_with(ELLIPSIS));
    }

    #[test]
    fn valid_until_takes_date_token() {
        assert_eq!(extract("x valid until 2025-06-30.", None).valid_until, "2025-06-30.");
        assert_eq!(extract("Valid  until 30.06.2025 only", None).valid_until, "30.06.2025");
        assert_eq!(extract("Valid until December 2025", None).valid_until, "December");
        assert_eq!(extract("Valid until", None).valid_until, UNKNOWN);
    }

    #[test]
    fn merchant_needs_three_characters() {
        assert_eq!(extract("5% off at Ox", None).merchant, UNKNOWN);
        assert_eq!(extract("at H&M's store", None).merchant, "H&M's store");
        assert_eq!(extract("by Al-Fursan 5%", None).merchant, "Al-Fursan");
    }

    #[test]
    fn trailing_space_does_not_count_toward_merchant_length() {
        assert_eq!(extract("Ab 5% off", None).merchant, UNKNOWN);
        assert_eq!(extract("Ab 5% off at Zara Home", None).merchant, "Zara Home");
    }

    #[test]
    fn fields_are_independent() {
        let fields = extract("no capitals but 30% off", Some("/x"));
        assert_eq!(fields.merchant, UNKNOWN);
        assert_eq!(fields.offer, "30%");
        assert_eq!(fields.valid_until, UNKNOWN);
        assert_eq!(fields.learn_more, "/x");
    }

    #[test]
    fn extraction_is_repeatable() {
        let extractor = Extractor::default();
        let block = Block::new("Blue Cafe 10% discount Valid until 01/02/2026", Some("/c".into()));
        assert_eq!(extractor.extract(&block), extractor.extract(&block));
    }

    #[test]
    fn rules_cover_each_field_once() {
        let fields: Vec<_> = RULES.iter().map(|rule| rule.field).collect();
        assert_eq!(fields, [Field::Merchant, Field::Offer, Field::ValidUntil]);
        assert_eq!(RULES[1].fallback, Fallback::Truncate(OFFER_FALLBACK_CHARS));
    }
}
