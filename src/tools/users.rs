//! User tools
//!
//! Account creation, profile patches and goal recalculation.

use chrono::{DateTime, Utc};

use crate::error::{ServiceError, ServiceResult, ValidationError};
use crate::models::{GoalsUpdate, User, UserCreate, UserUpdate, USERS_COLLECTION};
use crate::nutrition::{compute, ActivityLevel, Biometrics, GoalResult, NutritionGoal};
use crate::store::{DocumentStore, DocumentStoreExt, FieldUpdate};

fn load_user(store: &dyn DocumentStore, uid: &str) -> ServiceResult<User> {
    store
        .get_as::<User>(USERS_COLLECTION, uid)?
        .ok_or_else(|| ServiceError::NotFound(format!("User '{}'", uid)))
}

/// Create the profile for an authenticated identity.
///
/// Goals are seeded with defaults; nothing is calculated here.
pub fn create_user(
    store: &dyn DocumentStore,
    uid: &str,
    data: UserCreate,
    now: DateTime<Utc>,
) -> ServiceResult<User> {
    data.validate()?;

    if store.exists(USERS_COLLECTION, uid)? {
        return Err(ServiceError::Conflict(format!("User '{}' already exists", uid)));
    }

    let user = data.into_user(uid.to_string(), now);
    store.set_as(USERS_COLLECTION, uid, &user)?;

    tracing::info!(uid = %uid, "Created user");
    Ok(user)
}

/// Fetch the profile for an authenticated identity
pub fn get_user(store: &dyn DocumentStore, uid: &str) -> ServiceResult<User> {
    load_user(store, uid)
}

/// Apply a partial profile update and return the stored result
pub fn update_profile(
    store: &dyn DocumentStore,
    uid: &str,
    patch: UserUpdate,
    now: DateTime<Utc>,
) -> ServiceResult<User> {
    patch.validate()?;
    if patch.is_empty() {
        return Err(ValidationError::new("no profile fields to update").into());
    }

    let mut fields = Vec::new();
    if let Some(ref name) = patch.name {
        fields.push(FieldUpdate::new("name", name.trim()));
    }
    if let Some(ref dob) = patch.date_of_birth {
        fields.push(FieldUpdate::new("dateOfBirth", dob.as_str()));
    }
    if let Some(height) = patch.height {
        fields.push(FieldUpdate::new("measurements.height", height));
    }
    if let Some(weight) = patch.weight {
        fields.push(FieldUpdate::new("measurements.weight", weight));
    }
    if patch.touches_measurements() {
        fields.push(FieldUpdate::serialized("measurements.updatedAt", &now)?);
    }
    fields.push(FieldUpdate::serialized("updatedAt", &now)?);

    store.update(USERS_COLLECTION, uid, &fields)?;

    tracing::info!(uid = %uid, fields = fields.len(), "Updated profile");
    load_user(store, uid)
}

fn goal_fields(
    result: &GoalResult,
    activity_level: ActivityLevel,
    nutrition_goal: NutritionGoal,
    now: &DateTime<Utc>,
) -> ServiceResult<Vec<FieldUpdate>> {
    Ok(vec![
        FieldUpdate::serialized("goals.activityLevel", &activity_level)?,
        FieldUpdate::serialized("goals.nutritionGoal", &nutrition_goal)?,
        FieldUpdate::new("goals.targetCalories", result.target_calories),
        FieldUpdate::new("goals.targetProtein", result.target_protein_g),
        FieldUpdate::new("goals.targetCarbs", result.target_carbs_g),
        FieldUpdate::new("goals.targetFat", result.target_fat_g),
        FieldUpdate::new("goals.bmr", result.bmr),
        FieldUpdate::new("goals.tdee", result.tdee),
        FieldUpdate::serialized("goals.updatedAt", now)?,
        FieldUpdate::serialized("updatedAt", now)?,
    ])
}

/// Change activity level and/or goal, recompute targets and persist them
pub fn update_goals(
    store: &dyn DocumentStore,
    uid: &str,
    patch: GoalsUpdate,
    now: DateTime<Utc>,
) -> ServiceResult<User> {
    let user = load_user(store, uid)?;

    let activity_level = patch.activity_level.unwrap_or(user.goals.activity_level);
    let nutrition_goal = patch.nutrition_goal.unwrap_or(user.goals.nutrition_goal);

    let biometrics = Biometrics::from_user(&user)?;
    let result = compute(&biometrics, activity_level, nutrition_goal, now.date_naive());

    let fields = goal_fields(&result, activity_level, nutrition_goal, &now)?;
    store.update(USERS_COLLECTION, uid, &fields)?;

    tracing::info!(
        uid = %uid,
        activity_level = activity_level.as_str(),
        nutrition_goal = nutrition_goal.as_str(),
        target_calories = result.target_calories,
        "Updated goals"
    );
    load_user(store, uid)
}

/// Recompute targets from the user's current goals and biometrics
pub fn recalculate_goals(
    store: &dyn DocumentStore,
    uid: &str,
    now: DateTime<Utc>,
) -> ServiceResult<User> {
    update_goals(store, uid, GoalsUpdate::default(), now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::user_create;
    use crate::store::{memory_store, Filter, StoreError, StoreResult};
    use chrono::TimeZone;
    use serde_json::Value;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_create_user_seeds_defaults() {
        let store = memory_store();
        let user = create_user(&store, "uid-1", user_create(), at(2020, 1, 1)).unwrap();

        assert_eq!(user.goals.target_calories, 2000);
        assert_eq!(user.goals.bmr, 0.0);

        let stored = get_user(&store, "uid-1").unwrap();
        assert_eq!(stored, user);
    }

    #[test]
    fn test_create_user_twice_conflicts() {
        let store = memory_store();
        create_user(&store, "uid-1", user_create(), at(2020, 1, 1)).unwrap();

        let err = create_user(&store, "uid-1", user_create(), at(2020, 1, 2)).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn test_create_user_validates() {
        let store = memory_store();
        let mut data = user_create();
        data.height = -1.0;

        let err = create_user(&store, "uid-1", data, at(2020, 1, 1)).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(!store.exists(USERS_COLLECTION, "uid-1").unwrap());
    }

    #[test]
    fn test_get_missing_user() {
        let store = memory_store();
        assert!(matches!(get_user(&store, "nobody"), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn test_update_profile_applies_present_fields_only() {
        let store = memory_store();
        create_user(&store, "uid-1", user_create(), at(2020, 1, 1)).unwrap();

        let patch = UserUpdate {
            weight: Some(68.5),
            ..Default::default()
        };
        let user = update_profile(&store, "uid-1", patch, at(2020, 2, 1)).unwrap();

        assert_eq!(user.measurements.weight, 68.5);
        assert_eq!(user.measurements.height, 175.0);
        assert_eq!(user.name, "Rina");
        assert_eq!(user.measurements.updated_at, at(2020, 2, 1));
        assert_eq!(user.updated_at, at(2020, 2, 1));
        assert_eq!(user.created_at, at(2020, 1, 1));
    }

    #[test]
    fn test_update_profile_name_keeps_measurement_timestamp() {
        let store = memory_store();
        create_user(&store, "uid-1", user_create(), at(2020, 1, 1)).unwrap();

        let patch = UserUpdate {
            name: Some("Rina S.".to_string()),
            ..Default::default()
        };
        let user = update_profile(&store, "uid-1", patch, at(2020, 2, 1)).unwrap();

        assert_eq!(user.name, "Rina S.");
        assert_eq!(user.measurements.updated_at, at(2020, 1, 1));
    }

    #[test]
    fn test_update_profile_rejects_empty_patch() {
        let store = memory_store();
        create_user(&store, "uid-1", user_create(), at(2020, 1, 1)).unwrap();

        let err = update_profile(&store, "uid-1", UserUpdate::default(), at(2020, 2, 1)).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(get_user(&store, "uid-1").unwrap().updated_at, at(2020, 1, 1));
    }

    #[test]
    fn test_update_profile_rejects_padded_date_of_birth() {
        let store = memory_store();
        create_user(&store, "uid-1", user_create(), at(2020, 1, 1)).unwrap();

        let patch = UserUpdate {
            date_of_birth: Some(" 1991-05-01".to_string()),
            ..Default::default()
        };
        let err = update_profile(&store, "uid-1", patch, at(2020, 2, 1)).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(get_user(&store, "uid-1").unwrap().date_of_birth, "1990-01-01");
    }

    #[test]
    fn test_update_profile_missing_user() {
        let store = memory_store();
        let patch = UserUpdate {
            name: Some("Ghost".to_string()),
            ..Default::default()
        };
        let err = update_profile(&store, "nobody", patch, at(2020, 1, 1)).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn test_update_goals_persists_computed_targets() {
        let store = memory_store();
        create_user(&store, "uid-1", user_create(), at(2019, 1, 1)).unwrap();

        // Born 1990-01-01, so 30 on 2020-01-01
        let user = update_goals(&store, "uid-1", GoalsUpdate::default(), at(2020, 1, 1)).unwrap();

        assert_eq!(user.goals.activity_level, ActivityLevel::Moderate);
        assert_eq!(user.goals.nutrition_goal, NutritionGoal::Maintain);
        assert!((user.goals.bmr - 1695.667).abs() < 0.001);
        assert_eq!(user.goals.target_calories, 2628);
        assert!((user.goals.target_protein - 197.1).abs() < 1e-9);
        assert_eq!(user.goals.updated_at, at(2020, 1, 1));
    }

    #[test]
    fn test_update_goals_applies_patch() {
        let store = memory_store();
        create_user(&store, "uid-1", user_create(), at(2019, 1, 1)).unwrap();

        let patch = GoalsUpdate {
            activity_level: Some(ActivityLevel::Sedentary),
            nutrition_goal: Some(NutritionGoal::Lose),
        };
        let user = update_goals(&store, "uid-1", patch, at(2020, 1, 1)).unwrap();

        assert_eq!(user.goals.activity_level, ActivityLevel::Sedentary);
        assert_eq!(user.goals.nutrition_goal, NutritionGoal::Lose);
        assert!((user.goals.tdee - user.goals.bmr * 1.2).abs() < 1e-9);
        assert_eq!(user.goals.target_calories, (user.goals.tdee * 0.85).trunc() as i64);

        // Later recalculation keeps the stored preferences
        let again = recalculate_goals(&store, "uid-1", at(2020, 1, 1)).unwrap();
        assert_eq!(again.goals, user.goals);
    }

    #[test]
    fn test_update_goals_rejects_malformed_date_of_birth() {
        let store = memory_store();
        create_user(&store, "uid-1", user_create(), at(2019, 1, 1)).unwrap();
        store
            .update(USERS_COLLECTION, "uid-1", &[FieldUpdate::new("dateOfBirth", "1st of May")])
            .unwrap();

        let err = update_goals(&store, "uid-1", GoalsUpdate::default(), at(2020, 1, 1)).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let user = get_user(&store, "uid-1").unwrap();
        assert_eq!(user.goals.target_calories, 2000);
    }

    struct FailingStore;

    impl DocumentStore for FailingStore {
        fn get(&self, _: &str, _: &str) -> StoreResult<Option<Value>> {
            Err(StoreError::from(rusqlite::Error::InvalidQuery))
        }
        fn query(&self, _: &str, _: &[Filter], _: Option<usize>) -> StoreResult<Vec<Value>> {
            Err(StoreError::from(rusqlite::Error::InvalidQuery))
        }
        fn set(&self, _: &str, _: &str, _: &Value) -> StoreResult<()> {
            Err(StoreError::from(rusqlite::Error::InvalidQuery))
        }
        fn update(&self, _: &str, _: &str, _: &[FieldUpdate]) -> StoreResult<()> {
            Err(StoreError::from(rusqlite::Error::InvalidQuery))
        }
        fn delete(&self, _: &str, _: &str) -> StoreResult<bool> {
            Err(StoreError::from(rusqlite::Error::InvalidQuery))
        }
    }

    #[test]
    fn test_store_failures_pass_through() {
        let err = get_user(&FailingStore, "uid-1").unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));

        let err = create_user(&FailingStore, "uid-1", user_create(), at(2020, 1, 1)).unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));
    }

    #[test]
    fn test_validation_error_surfaces_message() {
        let err: ServiceError = ValidationError::new("height must be greater than 0").into();
        assert_eq!(err.to_string(), "Validation failed: height must be greater than 0");
    }
}
