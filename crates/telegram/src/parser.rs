//! Heuristic deal parsing.
//!
//! Channel posts are free-form text, but deal channels write to a pattern:
//! a headline, a purchase-price tier ("PP 899"), a qualifying action
//! (review/rating), and one short link per product. The rules here extract
//! that structure without attempting full NLP.

use std::sync::LazyLock;

use regex::Regex;

use dealwatch_catalog::{DEALS_CATEGORY, DealType, Platform, Product};

use crate::media::PLACEHOLDER_IMAGE;

/// Titles are capped at this many characters.
const TITLE_MAX_CHARS: usize = 80;

#[allow(clippy::expect_used)] // pattern is a compile-time constant
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("link pattern"));

#[allow(clippy::expect_used)] // pattern is a compile-time constant
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:₹|rs|pp|price)[^0-9]*([0-9]{2,6})").expect("price pattern")
});

/// Parse a raw post into zero or more product candidates.
///
/// Pure and deterministic: the same text always yields the same candidates,
/// and a post with no link yields none. Every candidate from one post
/// shares the title, description, price, and deal type; the platform is
/// classified per link, and the raw link text is the candidate's identity —
/// N links yield N candidates even when they point at the same product.
///
/// `image` is set to [`PLACEHOLDER_IMAGE`]; the listener overwrites it once
/// the post's photo is resolved.
#[must_use]
pub fn parse_deals(text: &str) -> Vec<Product> {
    if text.is_empty() {
        return Vec::new();
    }

    let links: Vec<&str> = LINK_RE.find_iter(text).map(|m| m.as_str()).collect();
    if links.is_empty() {
        return Vec::new();
    }

    // Classified once for the whole post; "review" wins over "rating" when
    // both appear.
    let lower = text.to_lowercase();
    let deal_type = if lower.contains("review") {
        DealType::Review
    } else if lower.contains("rating") {
        DealType::Rating
    } else {
        DealType::Discount
    };

    let title: String = text
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .chars()
        .take(TITLE_MAX_CHARS)
        .collect();

    // One price estimate per post; multi-tier posts keep the first match.
    let price = PRICE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse::<i64>().ok())
        .unwrap_or(0);

    links
        .into_iter()
        .map(|link| Product {
            id: link.to_string(),
            title: title.clone(),
            description: text.to_string(),
            price,
            category: DEALS_CATEGORY.to_string(),
            image: PLACEHOLDER_IMAGE.to_string(),
            rating: 0.0,
            tags: Vec::new(),
            platform: classify_platform(link),
            deal_type,
        })
        .collect()
}

/// Classify the marketplace from the link text alone.
fn classify_platform(link: &str) -> Platform {
    let link = link.to_lowercase();
    if link.contains("amzn") || link.contains("amazon") {
        Platform::Amazon
    } else if link.contains("fkrt") || link.contains("flipkart") {
        Platform::Flipkart
    } else if link.contains("ajio") || link.contains("ajiio") || link.contains("aji.io") {
        Platform::Ajio
    } else if link.contains("myntr") {
        Platform::Myntra
    } else {
        Platform::Other
    }
}
