//! Daily energy and macro targets
//!
//! Harris-Benedict (revised) BMR, activity-scaled TDEE, a goal adjustment and
//! a fixed 30/40/30 protein/carb/fat split. Everything here is a pure
//! function of its inputs.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::{parse_date_of_birth, User};

const PROTEIN_SHARE: f64 = 0.30;
const CARBS_SHARE: f64 = 0.40;
const FAT_SHARE: f64 = 0.30;

const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARBS: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

/// Biological sex as used by the BMR formula.
///
/// Only the exact value `"male"` selects the male formula; every other
/// stored value is treated as female.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    /// Accept only the two canonical values (used for new input)
    pub fn parse_strict(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Sex::Male),
            "female" => Some(Sex::Female),
            _ => None,
        }
    }
}

impl From<String> for Sex {
    fn from(s: String) -> Self {
        if s == "male" {
            Sex::Male
        } else {
            Sex::Female
        }
    }
}

impl From<Sex> for String {
    fn from(sex: Sex) -> Self {
        sex.as_str().to_string()
    }
}

/// Activity level with its TDEE multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }

    /// Unknown values silently become `Moderate`
    pub fn parse(s: &str) -> Self {
        match s {
            "sedentary" => ActivityLevel::Sedentary,
            "light" => ActivityLevel::Light,
            "moderate" => ActivityLevel::Moderate,
            "active" => ActivityLevel::Active,
            "very_active" => ActivityLevel::VeryActive,
            _ => ActivityLevel::Moderate,
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

impl From<String> for ActivityLevel {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ActivityLevel> for String {
    fn from(level: ActivityLevel) -> Self {
        level.as_str().to_string()
    }
}

/// Weight goal with its calorie adjustment factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NutritionGoal {
    Lose,
    #[default]
    Maintain,
    Gain,
}

impl NutritionGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            NutritionGoal::Lose => "lose",
            NutritionGoal::Maintain => "maintain",
            NutritionGoal::Gain => "gain",
        }
    }

    /// Unknown values silently become `Maintain`
    pub fn parse(s: &str) -> Self {
        match s {
            "lose" => NutritionGoal::Lose,
            "gain" => NutritionGoal::Gain,
            _ => NutritionGoal::Maintain,
        }
    }

    pub fn factor(&self) -> f64 {
        match self {
            NutritionGoal::Lose => 0.85,
            NutritionGoal::Maintain => 1.0,
            NutritionGoal::Gain => 1.15,
        }
    }
}

impl From<String> for NutritionGoal {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<NutritionGoal> for String {
    fn from(goal: NutritionGoal) -> Self {
        goal.as_str().to_string()
    }
}

/// Inputs to the goal calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biometrics {
    pub date_of_birth: NaiveDate,
    pub sex: Sex,
    pub height_cm: f64,
    pub weight_kg: f64,
}

impl Biometrics {
    /// Read biometrics off a stored user.
    ///
    /// A malformed date of birth or a non-positive measurement is a
    /// validation failure; no default age is substituted.
    pub fn from_user(user: &User) -> Result<Self, ValidationError> {
        let date_of_birth = parse_date_of_birth(&user.date_of_birth)?;

        let height_cm = user.measurements.height;
        let weight_kg = user.measurements.weight;
        if !(height_cm > 0.0 && height_cm.is_finite()) {
            return Err(ValidationError::new("height is required to calculate goals"));
        }
        if !(weight_kg > 0.0 && weight_kg.is_finite()) {
            return Err(ValidationError::new("weight is required to calculate goals"));
        }

        Ok(Self {
            date_of_birth,
            sex: user.sex,
            height_cm,
            weight_kg,
        })
    }
}

/// Calculated energy and macro targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalResult {
    pub bmr: f64,
    pub tdee: f64,
    pub target_calories: i64,
    pub target_protein_g: f64,
    pub target_carbs_g: f64,
    pub target_fat_g: f64,
}

/// Age in whole years on `as_of`.
///
/// Compares day-of-year rather than month/day, so around Feb 29 in leap
/// years the result can be one off.
pub fn age_on(date_of_birth: NaiveDate, as_of: NaiveDate) -> i32 {
    let mut age = as_of.year() - date_of_birth.year();
    if as_of.ordinal() < date_of_birth.ordinal() {
        age -= 1;
    }
    age
}

/// Basal metabolic rate in kcal/day
pub fn basal_metabolic_rate(sex: Sex, weight_kg: f64, height_cm: f64, age: i32) -> f64 {
    let age = f64::from(age);
    match sex {
        Sex::Male => 88.362 + 13.397 * weight_kg + 4.799 * height_cm - 5.677 * age,
        Sex::Female => 447.593 + 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age,
    }
}

/// Compute daily targets for the given biometrics and preferences
pub fn compute(
    biometrics: &Biometrics,
    activity_level: ActivityLevel,
    nutrition_goal: NutritionGoal,
    as_of: NaiveDate,
) -> GoalResult {
    let age = age_on(biometrics.date_of_birth, as_of);
    let bmr = basal_metabolic_rate(biometrics.sex, biometrics.weight_kg, biometrics.height_cm, age);
    let tdee = bmr * activity_level.multiplier();

    // Truncation, not rounding
    let target_calories = (tdee * nutrition_goal.factor()).trunc() as i64;
    let calories = target_calories as f64;

    GoalResult {
        bmr,
        tdee,
        target_calories,
        target_protein_g: calories * PROTEIN_SHARE / KCAL_PER_G_PROTEIN,
        target_carbs_g: calories * CARBS_SHARE / KCAL_PER_G_CARBS,
        target_fat_g: calories * FAT_SHARE / KCAL_PER_G_FAT,
    }
}
