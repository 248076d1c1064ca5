use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product listing scraped from one store's catalog, normalized for
/// comparison across stores.
///
/// Listings are immutable inputs to the matching engine: the collection
/// layer produces them and nothing downstream mutates them. `source_url`
/// is the unique key; two listings with the same `source_url` must carry
/// identical content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    /// Listed price. Must be strictly positive; the engine rejects the
    /// whole run otherwise.
    pub price: Decimal,
    /// ISO 4217 currency code (e.g., `"USD"`).
    pub currency: String,
    pub store_id: String,
    pub store_name: String,
    /// Canonical product-page URL. Unique key across the input set.
    pub source_url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Vendor/brand field as reported by the store, when present.
    #[serde(default)]
    pub vendor: Option<String>,
    /// Category the store itself assigned, when present. Carried through
    /// for reporting; the matcher derives its own category from the title.
    #[serde(default)]
    pub declared_product_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_default_on_deserialize() {
        let json = r#"{
            "title": "TAPTES Center Console Organizer",
            "price": "29.99",
            "currency": "USD",
            "store_id": "storea",
            "store_name": "Store A",
            "source_url": "https://storea.example.com/products/organizer"
        }"#;
        let listing: Listing = serde_json::from_str(json).expect("deserialization failed");
        assert!(listing.image_url.is_none());
        assert!(listing.vendor.is_none());
        assert!(listing.declared_product_type.is_none());
        assert!(listing.tags.is_empty());
        assert_eq!(listing.price, Decimal::new(2999, 2));
    }

    #[test]
    fn serde_roundtrip_preserves_price_precision() {
        let listing = Listing {
            title: "Floor Mat".to_string(),
            price: Decimal::new(12_950, 2),
            currency: "USD".to_string(),
            store_id: "storea".to_string(),
            store_name: "Store A".to_string(),
            source_url: "https://storea.example.com/products/mat".to_string(),
            image_url: None,
            vendor: Some("3D MAXpider".to_string()),
            declared_product_type: None,
            tags: vec!["interior".to_string()],
        };
        let json = serde_json::to_string(&listing).expect("serialization failed");
        let decoded: Listing = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(decoded, listing);
    }
}
