//! Nutrition calculations
//!
//! Goal targets from biometrics and food search/pagination.

pub mod goals;
pub mod search;

pub use goals::{
    age_on, basal_metabolic_rate, compute, ActivityLevel, Biometrics, GoalResult, NutritionGoal,
    Sex,
};
pub use search::{search, SearchQuery, SearchResult, DEFAULT_LIMIT, MAX_LIMIT};
