use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static IMAGE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("image url regex"));

/// A (color, size) stock-keeping unit with its own inventory counter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variant {
    pub color: String,
    pub size: String,
    pub inventory: u32,
}

/// Catalog product with its sellable variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub images: Vec<String>,
    pub variants: Vec<Variant>,
}

impl Product {
    /// Index of the variant matching (color, size) exactly, if any.
    pub fn variant_index(&self, color: &str, size: &str) -> Option<usize> {
        self.variants
            .iter()
            .position(|v| v.color == color && v.size == size)
    }

    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Document-level invariants, checked when products enter the store.
    pub fn validate(&self) -> Result<(), ProductInvalid> {
        if self.price.is_sign_negative() {
            return Err(ProductInvalid::NegativePrice);
        }
        if self.images.is_empty() || self.images.iter().any(|img| !IMAGE_URL_RE.is_match(img)) {
            return Err(ProductInvalid::BadImages);
        }
        let mut seen = HashSet::new();
        for v in &self.variants {
            if !seen.insert((v.color.as_str(), v.size.as_str())) {
                return Err(ProductInvalid::DuplicateVariant {
                    color: v.color.clone(),
                    size: v.size.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProductInvalid {
    #[error("Price must be non-negative")]
    NegativePrice,

    #[error("Images must be an array of valid URLs (at least one image required)")]
    BadImages,

    #[error("Duplicate color/size variant: {color}, {size}")]
    DuplicateVariant { color: String, size: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(variants: Vec<Variant>) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Shirt".to_string(),
            description: "A shirt".to_string(),
            price: Decimal::new(1999, 2),
            images: vec!["https://cdn.example.com/shirt.jpg".to_string()],
            variants,
        }
    }

    #[test]
    fn variant_lookup_is_exact_match() {
        let p = product(vec![
            Variant { color: "red".into(), size: "M".into(), inventory: 3 },
            Variant { color: "red".into(), size: "L".into(), inventory: 0 },
        ]);
        assert_eq!(p.variant_index("red", "L"), Some(1));
        assert_eq!(p.variant_index("Red", "L"), None);
        assert_eq!(p.variant_index("blue", "M"), None);
    }

    #[test]
    fn duplicate_variants_rejected() {
        let p = product(vec![
            Variant { color: "red".into(), size: "M".into(), inventory: 3 },
            Variant { color: "red".into(), size: "M".into(), inventory: 5 },
        ]);
        assert!(matches!(
            p.validate(),
            Err(ProductInvalid::DuplicateVariant { .. })
        ));
    }

    #[test]
    fn images_must_be_urls() {
        let mut p = product(vec![]);
        p.images = vec!["not-a-url".to_string()];
        assert!(matches!(p.validate(), Err(ProductInvalid::BadImages)));

        p.images.clear();
        assert!(matches!(p.validate(), Err(ProductInvalid::BadImages)));
    }
}
