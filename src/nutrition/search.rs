//! Food search
//!
//! Category and text filtering over a list of food records with offset
//! pagination.

use serde::Serialize;

use crate::error::ValidationError;
use crate::models::FoodRecord;

/// Page size when none is given
pub const DEFAULT_LIMIT: usize = 20;

/// Largest accepted page size
pub const MAX_LIMIT: usize = 100;

/// A validated search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub category: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl SearchQuery {
    /// Validate raw request values.
    ///
    /// A missing or zero limit means [`DEFAULT_LIMIT`]; an empty category is
    /// the same as none.
    pub fn new(
        text: impl Into<String>,
        category: Option<String>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Self, ValidationError> {
        let limit = match limit {
            None | Some(0) => DEFAULT_LIMIT,
            Some(l) if l < 0 => {
                return Err(ValidationError::new("limit cannot be negative"));
            }
            Some(l) if l > MAX_LIMIT as i64 => {
                return Err(ValidationError::new(format!(
                    "limit cannot exceed {}",
                    MAX_LIMIT
                )));
            }
            Some(l) => l as usize,
        };

        let offset = match offset {
            None => 0,
            Some(o) if o < 0 => {
                return Err(ValidationError::new("offset cannot be negative"));
            }
            Some(o) => usize::try_from(o)
                .map_err(|_| ValidationError::new("offset is out of range"))?,
        };

        Ok(Self {
            text: text.into(),
            category: category.filter(|c| !c.is_empty()),
            limit,
            offset,
        })
    }

    fn matches(&self, food: &FoodRecord, needle: &str) -> bool {
        if let Some(ref category) = self.category {
            if &food.category != category {
                return false;
            }
        }
        needle.is_empty()
            || food.name.to_lowercase().contains(needle)
            || food.localized_name.to_lowercase().contains(needle)
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub foods: Vec<FoodRecord>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

/// Filter `all_foods` by `query` and return the requested page.
///
/// Input order is preserved. An offset at or past the end yields an empty
/// page with `total` still reported.
pub fn search<I>(all_foods: I, query: &SearchQuery) -> SearchResult
where
    I: IntoIterator<Item = FoodRecord>,
{
    let needle = query.text.to_lowercase();

    let matched: Vec<FoodRecord> = all_foods
        .into_iter()
        .filter(|food| query.matches(food, &needle))
        .collect();

    let total = matched.len();
    let foods: Vec<FoodRecord> = matched
        .into_iter()
        .skip(query.offset)
        .take(query.limit)
        .collect();
    let has_more = query.offset.saturating_add(foods.len()) < total;

    SearchResult {
        foods,
        total,
        limit: query.limit,
        offset: query.offset,
        has_more,
    }
}
