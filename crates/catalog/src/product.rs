use serde::{Deserialize, Serialize};

/// Fixed category for everything the ingestion pipeline produces. Lets the
/// downstream listing distinguish ingested deals from other catalog sources.
pub const DEALS_CATEGORY: &str = "Deals";

/// Marketplace a deal link points to, classified from the link text.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Platform {
    Amazon,
    Flipkart,
    Ajio,
    Myntra,
    #[default]
    Other,
}

impl Platform {
    /// Stable string form used for the TEXT column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amazon => "Amazon",
            Self::Flipkart => "Flipkart",
            Self::Ajio => "Ajio",
            Self::Myntra => "Myntra",
            Self::Other => "Other",
        }
    }

    /// Parse the stored string form. Unknown values fall back to `Other`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "Amazon" => Self::Amazon,
            "Flipkart" => Self::Flipkart,
            "Ajio" => Self::Ajio,
            "Myntra" => Self::Myntra,
            _ => Self::Other,
        }
    }
}

/// Qualifying action a deal asks for. Mutually exclusive per post.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum DealType {
    /// Refund conditioned on posting a written review.
    Review,
    /// Refund conditioned on leaving a star rating.
    Rating,
    /// Plain price cut, no action required.
    #[default]
    Discount,
}

impl DealType {
    /// Stable string form used for the TEXT column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Review => "Review",
            Self::Rating => "Rating",
            Self::Discount => "Discount",
        }
    }

    /// Parse the stored string form. Unknown values fall back to `Discount`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "Review" => Self::Review,
            "Rating" => Self::Rating,
            _ => Self::Discount,
        }
    }
}

/// A catalog entry.
///
/// `id` is the raw deal link found in the source text: unique per catalog,
/// so re-ingesting the same link overwrites instead of duplicating. `price`
/// of `0` means "no estimate found", never "free".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub category: String,
    pub image: String,
    pub rating: f64,
    pub tags: Vec<String>,
    pub platform: Platform,
    pub deal_type: DealType,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: "https://amzn.to/x1".into(),
            title: "Clock Deal".into(),
            description: "Clock Deal\nPP 899".into(),
            price: 899,
            category: DEALS_CATEGORY.into(),
            image: "https://picsum.photos/500".into(),
            rating: 0.0,
            tags: Vec::new(),
            platform: Platform::Amazon,
            deal_type: DealType::Discount,
        }
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(product()).unwrap();
        assert_eq!(json["dealType"], "Discount");
        assert_eq!(json["platform"], "Amazon");
        assert_eq!(json["price"], 899);
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&product()).unwrap();
        let back: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(back, product());
    }

    #[test]
    fn platform_string_roundtrip() {
        for platform in [
            Platform::Amazon,
            Platform::Flipkart,
            Platform::Ajio,
            Platform::Myntra,
            Platform::Other,
        ] {
            assert_eq!(Platform::parse(platform.as_str()), platform);
        }
    }

    #[test]
    fn deal_type_string_roundtrip() {
        for deal_type in [DealType::Review, DealType::Rating, DealType::Discount] {
            assert_eq!(DealType::parse(deal_type.as_str()), deal_type);
        }
    }

    #[test]
    fn unknown_strings_fall_back() {
        assert_eq!(Platform::parse("Ebay"), Platform::Other);
        assert_eq!(DealType::parse("Cashback"), DealType::Discount);
    }
}
