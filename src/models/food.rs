//! Food record model
//!
//! Reference food data stored in the `foods` collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Nutrition;
use crate::error::ValidationError;

/// Collection holding food documents
pub const FOODS_COLLECTION: &str = "foods";

/// Where a food record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FoodSource {
    #[default]
    System,
    User,
    #[serde(alias = "openfoodfacts")]
    External,
}

impl FoodSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodSource::System => "system",
            FoodSource::User => "user",
            FoodSource::External => "external",
        }
    }
}

/// Serving the nutrition values refer to, e.g. 100 g
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingSize {
    pub amount: f64,
    pub unit: String,
}

/// A food with nutritional information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRecord {
    pub id: String,
    pub name: String,
    #[serde(alias = "nameIndonesian")]
    pub localized_name: String,
    pub category: String,
    pub nutrition: Nutrition,
    pub serving_size: ServingSize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub source: FoodSource,
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new food record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodCreate {
    pub name: String,
    #[serde(alias = "nameIndonesian")]
    pub localized_name: String,
    pub category: String,
    pub nutrition: Nutrition,
    pub serving_size: ServingSize,
    pub barcode: Option<String>,
    pub image_url: Option<String>,
}

/// Treat blank optional strings as absent
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl FoodCreate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name cannot be empty"));
        }
        if self.localized_name.trim().is_empty() {
            return Err(ValidationError::new("localizedName cannot be empty"));
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::new("category cannot be empty"));
        }
        if !(self.serving_size.amount > 0.0) {
            return Err(ValidationError::new("servingSize.amount must be greater than 0"));
        }
        if self.serving_size.unit.trim().is_empty() {
            return Err(ValidationError::new("servingSize.unit cannot be empty"));
        }
        self.nutrition.validate()
    }

    /// Build a system-sourced, verified record
    pub fn into_record(self, id: String, now: DateTime<Utc>) -> FoodRecord {
        FoodRecord {
            id,
            name: self.name.trim().to_string(),
            localized_name: self.localized_name.trim().to_string(),
            category: self.category.trim().to_string(),
            nutrition: self.nutrition,
            serving_size: self.serving_size,
            barcode: non_blank(self.barcode),
            image_url: non_blank(self.image_url),
            is_verified: true,
            source: FoodSource::System,
            created_at: now,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn banana_create() -> FoodCreate {
        FoodCreate {
            name: "Banana".to_string(),
            localized_name: "Pisang".to_string(),
            category: "fruits".to_string(),
            nutrition: Nutrition {
                calories: 89.0,
                protein: 1.1,
                carbs: 22.8,
                fat: 0.3,
                fiber: 2.6,
                sugar: 12.2,
                sodium: 1.0,
            },
            serving_size: ServingSize {
                amount: 100.0,
                unit: "g".to_string(),
            },
            barcode: Some("  ".to_string()),
            image_url: None,
        }
    }

    #[test]
    fn test_validate_create() {
        assert!(banana_create().validate().is_ok());

        let mut missing_category = banana_create();
        missing_category.category = " ".to_string();
        assert!(missing_category.validate().is_err());

        let mut zero_serving = banana_create();
        zero_serving.serving_size.amount = 0.0;
        assert!(zero_serving.validate().is_err());
    }

    #[test]
    fn test_into_record() {
        let record = banana_create().into_record("f-1".to_string(), DateTime::<Utc>::default());
        assert!(record.is_verified);
        assert_eq!(record.source, FoodSource::System);
        assert_eq!(record.barcode, None);
    }

    #[test]
    fn test_deserialize_legacy_document() {
        let doc = json!({
            "id": "f-1",
            "name": "Banana",
            "nameIndonesian": "Pisang",
            "category": "fruits",
            "nutrition": {"calories": 89, "protein": 1.1, "carbs": 22.8, "fat": 0.3,
                          "fiber": 2.6, "sugar": 12.2, "sodium": 1},
            "servingSize": {"amount": 100, "unit": "g"},
            "isVerified": true,
            "source": "openfoodfacts",
            "createdAt": "2024-05-01T10:00:00Z"
        });

        let food: FoodRecord = serde_json::from_value(doc).unwrap();
        assert_eq!(food.localized_name, "Pisang");
        assert_eq!(food.source, FoodSource::External);
        assert_eq!(food.nutrition.calories, 89.0);

        let out = serde_json::to_value(&food).unwrap();
        assert_eq!(out["localizedName"], "Pisang");
        assert!(out.get("barcode").is_none());
    }
}
