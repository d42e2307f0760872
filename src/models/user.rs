//! User model
//!
//! Profile, measurements, goals and settings stored in the `users`
//! collection, keyed by the identity provider's user id.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::nutrition::{ActivityLevel, NutritionGoal, Sex};

/// Collection holding user documents
pub const USERS_COLLECTION: &str = "users";

/// Date format for `dateOfBirth`
pub const DATE_OF_BIRTH_FORMAT: &str = "%Y-%m-%d";

/// Calorie target written at account creation
pub const DEFAULT_TARGET_CALORIES: i64 = 2000;

/// Parse a `YYYY-MM-DD` date of birth
pub fn parse_date_of_birth(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, DATE_OF_BIRTH_FORMAT).map_err(|_| {
        ValidationError::new(format!(
            "dateOfBirth must be a valid YYYY-MM-DD date, got '{}'",
            value
        ))
    })
}

fn validate_positive(name: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new(format!("{} must be greater than 0", name)))
    }
}

/// Physical measurements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurements {
    pub height: f64, // cm
    pub weight: f64, // kg
    pub updated_at: DateTime<Utc>,
}

/// Daily nutrition goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goals {
    pub activity_level: ActivityLevel,
    pub nutrition_goal: NutritionGoal,
    pub target_calories: i64,
    pub target_protein: f64, // grams
    pub target_carbs: f64,   // grams
    pub target_fat: f64,     // grams
    pub bmr: f64,
    pub tdee: f64,
    pub updated_at: DateTime<Utc>,
}

impl Goals {
    /// Goals for a new account. Nothing is calculated until the user
    /// explicitly updates their goals.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        Self {
            activity_level: ActivityLevel::Moderate,
            nutrition_goal: NutritionGoal::Maintain,
            target_calories: DEFAULT_TARGET_CALORIES,
            target_protein: 0.0,
            target_carbs: 0.0,
            target_fat: 0.0,
            bmr: 0.0,
            tdee: 0.0,
            updated_at: now,
        }
    }
}

/// App settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub units: String, // "metric" or "imperial"
    pub notifications: bool,
    pub theme: String, // "light", "dark", "system"
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            units: "metric".to_string(),
            notifications: true,
            theme: "system".to_string(),
        }
    }
}

/// A user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub date_of_birth: String,
    #[serde(rename = "gender", alias = "sex")]
    pub sex: Sex,
    pub measurements: Measurements,
    pub goals: Goals,
    #[serde(default)]
    pub settings: Settings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub email: String,
    pub name: String,
    pub date_of_birth: String,
    #[serde(alias = "sex")]
    pub gender: String,
    pub height: f64,
    pub weight: f64,
}

impl UserCreate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::new("email is required"));
        }
        if !email.contains('@') {
            return Err(ValidationError::new("email must be a valid address"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name is required"));
        }
        parse_date_of_birth(&self.date_of_birth)?;
        if Sex::parse_strict(&self.gender).is_none() {
            return Err(ValidationError::new("gender must be 'male' or 'female'"));
        }
        validate_positive("height", self.height)?;
        validate_positive("weight", self.weight)
    }

    /// Build the stored user with default goals and settings
    pub fn into_user(self, id: String, now: DateTime<Utc>) -> User {
        User {
            id,
            email: self.email.trim().to_string(),
            name: self.name.trim().to_string(),
            date_of_birth: self.date_of_birth,
            sex: Sex::from(self.gender),
            measurements: Measurements {
                height: self.height,
                weight: self.weight,
                updated_at: now,
            },
            goals: Goals::seeded(now),
            settings: Settings::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial profile update. Only present fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref name) = self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::new("name cannot be empty"));
            }
        }
        if let Some(ref dob) = self.date_of_birth {
            parse_date_of_birth(dob)?;
        }
        if let Some(height) = self.height {
            validate_positive("height", height)?;
        }
        if let Some(weight) = self.weight {
            validate_positive("weight", weight)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.date_of_birth.is_none()
            && self.height.is_none()
            && self.weight.is_none()
    }

    pub fn touches_measurements(&self) -> bool {
        self.height.is_some() || self.weight.is_some()
    }
}

/// Partial goals update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalsUpdate {
    #[serde(default)]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default)]
    pub nutrition_goal: Option<NutritionGoal>,
}
