//! NutriTrack MCP Server Implementation
//!
//! Exposes the user and food tools over MCP. Every tool except the status
//! check authenticates the caller first.

use std::sync::Arc;

use chrono::Utc;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::auth::{authenticate, IdentityVerifier};
use crate::error::ServiceError;
use crate::models::{FoodCreate, GoalsUpdate, Nutrition, ServingSize, UserCreate, UserUpdate};
use crate::nutrition::{ActivityLevel, NutritionGoal};
use crate::store::DocumentStore;
use crate::tools::foods;
use crate::tools::status::StatusTracker;
use crate::tools::users;

/// NutriTrack MCP Service
#[derive(Clone)]
pub struct NutriTrackService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    store: Arc<dyn DocumentStore>,
    verifier: Arc<dyn IdentityVerifier>,
    tool_router: ToolRouter<NutriTrackService>,
}

impl NutriTrackService {
    pub fn new(
        status_tracker: StatusTracker,
        store: Arc<dyn DocumentStore>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(status_tracker)),
            store,
            verifier,
            tool_router: Self::tool_router(),
        }
    }

    async fn caller(&self, authorization: &str) -> Result<String, McpError> {
        authenticate(self.verifier.as_ref(), authorization)
            .await
            .map_err(|e| to_mcp_error(ServiceError::from(e)))
    }
}

/// Map handler errors onto MCP error codes
fn to_mcp_error(err: ServiceError) -> McpError {
    match err {
        ServiceError::Validation(_) => McpError::invalid_params(err.to_string(), None),
        ServiceError::Auth(_) | ServiceError::Conflict(_) => {
            McpError::invalid_request(err.to_string(), None)
        }
        ServiceError::NotFound(_) => McpError::resource_not_found(err.to_string(), None),
        ServiceError::Store(ref e) => {
            tracing::error!(error = %e, "Store failure");
            McpError::internal_error(err.to_string(), None)
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// User Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AuthParams {
    /// Authorization header value: "Bearer <id token>"
    pub authorization: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateUserParams {
    /// Authorization header value: "Bearer <id token>"
    pub authorization: String,
    pub email: String,
    pub name: String,
    /// Date of birth (YYYY-MM-DD)
    pub date_of_birth: String,
    /// "male" or "female"
    pub gender: String,
    /// Height in cm
    pub height: f64,
    /// Weight in kg
    pub weight: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateProfileParams {
    /// Authorization header value: "Bearer <id token>"
    pub authorization: String,
    pub name: Option<String>,
    /// Date of birth (YYYY-MM-DD)
    pub date_of_birth: Option<String>,
    /// Height in cm
    pub height: Option<f64>,
    /// Weight in kg
    pub weight: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateGoalsParams {
    /// Authorization header value: "Bearer <id token>"
    pub authorization: String,
    /// sedentary, light, moderate, active or very_active
    pub activity_level: Option<String>,
    /// lose, maintain or gain
    pub nutrition_goal: Option<String>,
}

// ============================================================================
// Food Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchFoodsParams {
    /// Authorization header value: "Bearer <id token>"
    pub authorization: String,
    /// Case-insensitive text matched against both names (optional)
    #[serde(default)]
    pub query: String,
    /// Exact category (optional)
    pub category: Option<String>,
    /// Page size, 1-100 (default 20)
    pub limit: Option<i64>,
    /// Number of matches to skip (default 0)
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetFoodParams {
    /// Authorization header value: "Bearer <id token>"
    pub authorization: String,
    /// Food ID
    pub id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateFoodParams {
    /// Authorization header value: "Bearer <id token>"
    pub authorization: String,
    pub name: String,
    /// Name in the local language
    pub localized_name: String,
    pub category: String,
    /// Serving amount the nutrition values refer to
    pub serving_amount: f64,
    /// Serving unit, e.g. "g"
    pub serving_unit: String,
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub sugar: f64,
    /// Sodium in mg
    #[serde(default)]
    pub sodium: f64,
    pub barcode: Option<String>,
    pub image_url: Option<String>,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl NutriTrackService {
    // --- Status ---

    #[tool(description = "Get the current status of the NutriTrack service including build info, database status, and process information")]
    async fn nutritrack_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        json_result(&tracker.get_status())
    }

    // --- Users ---

    #[tool(description = "Create the profile for the authenticated user. Goals start at 2000 kcal until update_goals is called.")]
    async fn create_user(&self, Parameters(p): Parameters<CreateUserParams>) -> Result<CallToolResult, McpError> {
        let uid = self.caller(&p.authorization).await?;
        let data = UserCreate {
            email: p.email,
            name: p.name,
            date_of_birth: p.date_of_birth,
            gender: p.gender,
            height: p.height,
            weight: p.weight,
        };
        let user = users::create_user(self.store.as_ref(), &uid, data, Utc::now()).map_err(to_mcp_error)?;
        json_result(&user)
    }

    #[tool(description = "Get the profile, measurements and goals of the authenticated user")]
    async fn get_current_user(&self, Parameters(p): Parameters<AuthParams>) -> Result<CallToolResult, McpError> {
        let uid = self.caller(&p.authorization).await?;
        let user = users::get_user(self.store.as_ref(), &uid).map_err(to_mcp_error)?;
        json_result(&user)
    }

    #[tool(description = "Update name, date of birth, height or weight. Only provided fields change.")]
    async fn update_profile(&self, Parameters(p): Parameters<UpdateProfileParams>) -> Result<CallToolResult, McpError> {
        let uid = self.caller(&p.authorization).await?;
        let patch = UserUpdate {
            name: p.name,
            date_of_birth: p.date_of_birth,
            height: p.height,
            weight: p.weight,
        };
        let user = users::update_profile(self.store.as_ref(), &uid, patch, Utc::now()).map_err(to_mcp_error)?;
        json_result(&user)
    }

    #[tool(description = "Set activity level and/or nutrition goal, then recalculate BMR, TDEE and daily calorie and macro targets")]
    async fn update_goals(&self, Parameters(p): Parameters<UpdateGoalsParams>) -> Result<CallToolResult, McpError> {
        let uid = self.caller(&p.authorization).await?;
        let patch = GoalsUpdate {
            activity_level: p.activity_level.as_deref().map(ActivityLevel::parse),
            nutrition_goal: p.nutrition_goal.as_deref().map(NutritionGoal::parse),
        };
        let user = users::update_goals(self.store.as_ref(), &uid, patch, Utc::now()).map_err(to_mcp_error)?;
        json_result(&user)
    }

    // --- Foods ---

    #[tool(description = "Search foods by name or localized name, optionally within one category, with limit/offset pagination")]
    async fn search_foods(&self, Parameters(p): Parameters<SearchFoodsParams>) -> Result<CallToolResult, McpError> {
        self.caller(&p.authorization).await?;
        let result = foods::search_foods(self.store.as_ref(), &p.query, p.category, p.limit, p.offset)
            .map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a food record with its nutrition facts by ID")]
    async fn get_food(&self, Parameters(p): Parameters<GetFoodParams>) -> Result<CallToolResult, McpError> {
        self.caller(&p.authorization).await?;
        let food = foods::get_food(self.store.as_ref(), &p.id).map_err(to_mcp_error)?;
        json_result(&food)
    }

    #[tool(description = "Create a verified food record with nutrition facts per serving")]
    async fn create_food(&self, Parameters(p): Parameters<CreateFoodParams>) -> Result<CallToolResult, McpError> {
        self.caller(&p.authorization).await?;
        let data = FoodCreate {
            name: p.name,
            localized_name: p.localized_name,
            category: p.category,
            nutrition: Nutrition {
                calories: p.calories,
                protein: p.protein,
                carbs: p.carbs,
                fat: p.fat,
                fiber: p.fiber,
                sugar: p.sugar,
                sodium: p.sodium,
            },
            serving_size: ServingSize {
                amount: p.serving_amount,
                unit: p.serving_unit,
            },
            barcode: p.barcode,
            image_url: p.image_url,
        };
        let food = foods::create_food(self.store.as_ref(), data, Utc::now()).map_err(to_mcp_error)?;
        json_result(&food)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for NutriTrackService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "nutritrack".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("NutriTrack".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "NutriTrack - user profiles, nutrition goals and food lookup. \
                 Every tool except nutritrack_status takes an authorization value of the form \"Bearer <id token>\". \
                 Users: create_user, get_current_user, update_profile, update_goals (recalculates targets). \
                 Foods: search_foods, get_food, create_food."
                    .into(),
            ),
        }
    }
}
