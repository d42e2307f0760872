//! Data models
//!
//! Documents stored in the `users` and `foods` collections.

mod food;
mod nutrition;
mod user;

pub use food::{FoodCreate, FoodRecord, FoodSource, ServingSize, FOODS_COLLECTION};
pub use nutrition::Nutrition;
pub use user::{
    parse_date_of_birth, Goals, GoalsUpdate, Measurements, Settings, User, UserCreate,
    UserUpdate, DEFAULT_TARGET_CALORIES, USERS_COLLECTION,
};

#[cfg(test)]
pub(crate) mod fixtures {
    pub(crate) use super::food::fixtures::food;
    pub(crate) use super::user::fixtures::user_create;
}
