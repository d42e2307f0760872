//! Food tools
//!
//! Search, lookup and creation of reference food records.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{FoodCreate, FoodRecord, FOODS_COLLECTION};
use crate::nutrition::{search, SearchQuery, SearchResult};
use crate::store::{DocumentStore, DocumentStoreExt, Filter};

/// Search foods by category and name.
///
/// The category filter runs in the store; text matching and pagination run
/// over whatever it returns. Documents that no longer decode as food records
/// are skipped.
pub fn search_foods(
    store: &dyn DocumentStore,
    text: &str,
    category: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> ServiceResult<SearchResult> {
    let query = SearchQuery::new(text, category, limit, offset)?;

    let filters: Vec<Filter> = query
        .category
        .iter()
        .map(|c| Filter::eq("category", c.as_str()))
        .collect();
    let documents = store.query(FOODS_COLLECTION, &filters, None)?;

    let foods = documents.into_iter().filter_map(|doc| {
        match serde_json::from_value::<FoodRecord>(doc) {
            Ok(food) => Some(food),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed food document");
                None
            }
        }
    });

    let result = search(foods, &query);
    tracing::debug!(
        text = %query.text,
        category = ?query.category,
        total = result.total,
        returned = result.foods.len(),
        "Searched foods"
    );
    Ok(result)
}

/// Fetch a single food record
pub fn get_food(store: &dyn DocumentStore, id: &str) -> ServiceResult<FoodRecord> {
    store
        .get_as::<FoodRecord>(FOODS_COLLECTION, id)?
        .ok_or_else(|| ServiceError::NotFound(format!("Food '{}'", id)))
}

/// Create a verified, system-sourced food record with a fresh id
pub fn create_food(
    store: &dyn DocumentStore,
    data: FoodCreate,
    now: DateTime<Utc>,
) -> ServiceResult<FoodRecord> {
    data.validate()?;

    let id = Uuid::new_v4().to_string();
    let food = data.into_record(id, now);
    store.set_as(FOODS_COLLECTION, &food.id, &food)?;

    tracing::info!(id = %food.id, name = %food.name, source = food.source.as_str(), "Created food");
    Ok(food)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::food;
    use crate::models::{FoodSource, Nutrition, ServingSize};
    use crate::store::memory_store;
    use serde_json::json;

    fn seed(store: &dyn DocumentStore, foods: &[FoodRecord]) {
        for f in foods {
            store.set_as(FOODS_COLLECTION, &f.id, f).unwrap();
        }
    }

    fn tempe_create() -> FoodCreate {
        FoodCreate {
            name: "Tempeh".to_string(),
            localized_name: "Tempe".to_string(),
            category: "protein".to_string(),
            nutrition: Nutrition {
                calories: 192.0,
                protein: 20.3,
                carbs: 7.6,
                fat: 10.8,
                ..Default::default()
            },
            serving_size: ServingSize {
                amount: 100.0,
                unit: "g".to_string(),
            },
            barcode: None,
            image_url: None,
        }
    }

    #[test]
    fn test_search_through_store() {
        let store = memory_store();
        seed(
            &store,
            &[
                food("f-1", "Banana", "Pisang", "fruits"),
                food("f-2", "Spinach", "Bayam", "vegetables"),
                food("f-3", "Plantain", "Pisang tanduk", "fruits"),
            ],
        );

        let result = search_foods(&store, "pisang", Some("fruits".to_string()), None, None).unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(result.foods[0].id, "f-1");
        assert_eq!(result.foods[1].id, "f-3");
        assert_eq!(result.limit, 20);

        let result = search_foods(&store, "", None, Some(2), Some(1)).unwrap();
        assert_eq!(result.total, 3);
        assert_eq!(result.foods.len(), 2);
        assert!(!result.has_more);
    }

    #[test]
    fn test_search_pages_in_insertion_order() {
        let store = memory_store();
        let fruits: Vec<FoodRecord> = (0..25)
            .map(|i| food(&format!("f-{:02}", 24 - i), &format!("Fruit {}", i), "Buah", "fruits"))
            .collect();
        seed(&store, &fruits);

        let page = search_foods(&store, "", Some("fruits".to_string()), Some(20), Some(20)).unwrap();
        assert_eq!(page.total, 25);
        assert_eq!(page.foods.len(), 5);
        assert_eq!(page.foods[0].name, "Fruit 20");
    }

    #[test]
    fn test_search_text_is_not_trimmed() {
        let store = memory_store();
        seed(
            &store,
            &[
                food("f-1", "Banana", "Pisang", "fruits"),
                food("f-2", "Ice cream", "Es krim", "desserts"),
            ],
        );

        let result = search_foods(&store, " ban", None, None, None).unwrap();
        assert_eq!(result.total, 0);

        // A lone space is still a text filter
        let result = search_foods(&store, " ", None, None, None).unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.foods[0].id, "f-2");
    }

    #[test]
    fn test_search_skips_malformed_documents() {
        let store = memory_store();
        seed(&store, &[food("f-1", "Banana", "Pisang", "fruits")]);
        store
            .set(FOODS_COLLECTION, "broken", &json!({"id": "broken", "category": "fruits"}))
            .unwrap();

        let result = search_foods(&store, "", Some("fruits".to_string()), None, None).unwrap();
        assert_eq!(result.total, 1);
    }

    #[test]
    fn test_search_rejects_bad_paging() {
        let store = memory_store();
        let err = search_foods(&store, "", None, Some(500), None).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = search_foods(&store, "", None, None, Some(-1)).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn test_get_food() {
        let store = memory_store();
        seed(&store, &[food("f-1", "Banana", "Pisang", "fruits")]);

        assert_eq!(get_food(&store, "f-1").unwrap().name, "Banana");
        assert!(matches!(get_food(&store, "f-404"), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn test_create_food() {
        let store = memory_store();
        let created = create_food(&store, tempe_create(), DateTime::<Utc>::default()).unwrap();

        assert!(Uuid::parse_str(&created.id).is_ok());
        assert!(created.is_verified);
        assert_eq!(created.source, FoodSource::System);
        assert_eq!(get_food(&store, &created.id).unwrap(), created);

        let other = create_food(&store, tempe_create(), DateTime::<Utc>::default()).unwrap();
        assert_ne!(other.id, created.id);
    }

    #[test]
    fn test_create_food_validates() {
        let store = memory_store();
        let mut data = tempe_create();
        data.nutrition.fat = -2.0;

        let err = create_food(&store, data, DateTime::<Utc>::default()).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(store.query(FOODS_COLLECTION, &[], None).unwrap().is_empty());
    }
}
