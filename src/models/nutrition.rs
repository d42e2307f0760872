//! Per-serving nutrition facts

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Nutritional information per serving
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64, // kcal
    #[serde(default)]
    pub protein: f64, // grams
    #[serde(default)]
    pub carbs: f64, // grams
    #[serde(default)]
    pub fat: f64, // grams
    #[serde(default)]
    pub fiber: f64, // grams
    #[serde(default)]
    pub sugar: f64, // grams
    #[serde(default)]
    pub sodium: f64, // milligrams
}

impl Nutrition {
    /// Reject negative or non-finite values
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
            ("fiber", self.fiber),
            ("sugar", self.sugar),
            ("sodium", self.sodium),
        ];

        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::new(format!("{} cannot be negative", name)));
            }
        }
        Ok(())
    }
}
