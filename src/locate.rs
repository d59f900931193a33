use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

static CLASSED_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("[class]").unwrap());
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

static OFFER_CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(offer|promo|card|merchant)").unwrap());

const LEARN_MORE: &str = "learn more";

/// A markup subtree believed to hold a single offer.
///
/// Only what the extractor needs is kept, so a block does not borrow from
/// the parsed document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// Visible text, whitespace collapsed to single spaces.
    pub text: String,
    /// `href` of the first anchor in the block.
    pub link: Option<String>,
}

impl Block {
    pub fn new(text: impl AsRef<str>, link: Option<String>) -> Self {
        Block {
            text: flatten(text.as_ref()),
            link,
        }
    }

    pub fn from_element(element: ElementRef) -> Self {
        let text = element.text().collect::<Vec<_>>().join(" ");
        let link = if element.value().name() == "a" {
            element.value().attr("href").map(Into::into)
        } else {
            element
                .select(&ANCHOR_SELECTOR)
                .next()
                .and_then(|anchor| anchor.value().attr("href"))
                .map(Into::into)
        };
        Block::new(text, link)
    }
}

/// Collapses every whitespace run into one space and trims both ends.
pub fn flatten(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A way of finding offer blocks in a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocatorStrategy {
    /// Elements whose class names mention an offer, promo, card or merchant.
    ClassPattern,
    /// The parent of every anchor reading "Learn more".
    LearnMoreAnchor,
}

impl LocatorStrategy {
    fn candidates<'a>(self, document: &'a Html) -> Vec<ElementRef<'a>> {
        match self {
            LocatorStrategy::ClassPattern => document
                .select(&CLASSED_SELECTOR)
                .filter(|element| {
                    element
                        .value()
                        .attr("class")
                        .is_some_and(|class| OFFER_CLASS_RE.is_match(class))
                })
                .collect(),
            LocatorStrategy::LearnMoreAnchor => document
                .select(&ANCHOR_SELECTOR)
                .filter(|anchor| {
                    anchor
                        .text()
                        .collect::<String>()
                        .to_lowercase()
                        .contains(LEARN_MORE)
                })
                .map(|anchor| {
                    anchor
                        .parent()
                        .and_then(ElementRef::wrap)
                        .unwrap_or(anchor)
                })
                .collect(),
        }
    }
}

/// Finds offer blocks by trying each strategy in order.
///
/// The first strategy that yields at least one element decides the result;
/// later strategies are only consulted when every earlier one found nothing.
#[derive(Clone, Debug)]
pub struct Locator {
    strategies: Vec<LocatorStrategy>,
}

impl Default for Locator {
    fn default() -> Self {
        Locator::new(vec![
            LocatorStrategy::ClassPattern,
            LocatorStrategy::LearnMoreAnchor,
        ])
    }
}

impl Locator {
    pub fn new(strategies: Vec<LocatorStrategy>) -> Self {
        Locator { strategies }
    }

    pub fn strategies(&self) -> &[LocatorStrategy] {
        &self.strategies
    }

    /// Blocks in document order. Empty when no strategy matches.
    pub fn locate(&self, document: &Html) -> Vec<Block> {
        self.locate_with_strategy(document)
            .map(|(_, blocks)| blocks)
            .unwrap_or_default()
    }

    /// Like [`Locator::locate`], also reporting which strategy matched.
    pub fn locate_with_strategy(&self, document: &Html) -> Option<(LocatorStrategy, Vec<Block>)> {
        for &strategy in &self.strategies {
            let candidates = strategy.candidates(document);
            if candidates.is_empty() {
                debug!(?strategy, "no candidates, falling back");
                continue;
            }
            let blocks = candidates.into_iter().map(Block::from_element).collect();
            return Some((strategy, blocks));
        }
        None
    }
}
