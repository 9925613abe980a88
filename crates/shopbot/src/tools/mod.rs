//! The six shopping tools the model can call.
//!
//! Tool calls arrive as `(name, args)` pairs. [`ShopTool::parse`] turns a pair
//! into a closed enum with typed arguments; the
//! [`ToolRegistry`](registry::ToolRegistry) executes it against the
//! conversation's [`ShopSession`](crate::agent::session::ShopSession).
//!
//! # Submodules
//!
//! - [`registry`]: [`ToolRegistry`]: declarations, validation, dispatch.
//! - [`catalog`]: the fixed product catalog and search.
//! - [`cart`]: [`Cart`] with totals kept in integer cents.
//! - [`discount`]: discount code checks.
//! - [`sources`]: [`OrderLookup`] / [`RecommendationFeed`] and their
//!   random default implementations.
//! - [`schema`]: declaration schema reduction and argument validation.
//! - [`names`]: tool name constants.

pub mod cart;
pub mod catalog;
pub mod discount;
pub mod names;
pub mod registry;
pub mod schema;
pub mod sources;

use schemars::JsonSchema;
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub use cart::{Cart, CartError, CartItem};
pub use registry::ToolRegistry;
pub use sources::{OrderLookup, RandomOrders, RecommendationFeed, ShuffledRecommendations};

/// Why a tool call could not be dispatched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool '{0}'.")]
    UnknownTool(String),
    #[error("Invalid arguments for tool '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },
}

// ── Argument types ─────────────────────────────────────────────────

#[derive(Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct SearchProductsArgs {
    /// The search query, e.g., 'running shoes', 'headphones'.
    pub query: String,
    /// Optional product category to filter by.
    #[serde(default)]
    pub category: Option<String>,
    /// Maximum number of results to return.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

fn default_max_results() -> u32 {
    5
}

#[derive(Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct GetOrderStatusArgs {
    /// The ID of the order to check.
    pub order_id: String,
}

#[derive(Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct AddToCartArgs {
    /// The ID of the product to add.
    pub product_id: String,
    /// The number of items to add. Defaults to 1.
    #[serde(default = "default_quantity")]
    #[schemars(range(min = 1, max = 10_000))]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct ApplyDiscountCodeArgs {
    /// The discount code to apply.
    pub code: String,
}

/// A parsed, dispatchable tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ShopTool {
    SearchProducts(SearchProductsArgs),
    GetOrderStatus(GetOrderStatusArgs),
    AddToCart(AddToCartArgs),
    GetCartContents,
    ApplyDiscountCode(ApplyDiscountCodeArgs),
    GetProductRecommendations,
}

impl ShopTool {
    /// Parse a raw call. Missing or `null` arguments count as `{}`.
    pub fn parse(name: &str, args: &serde_json::Value) -> Result<Self, ToolError> {
        let args = if args.is_null() {
            serde_json::json!({})
        } else {
            args.clone()
        };
        let tool = match name {
            names::SEARCH_PRODUCTS => Self::SearchProducts(typed(name, args)?),
            names::GET_ORDER_STATUS => Self::GetOrderStatus(typed(name, args)?),
            names::ADD_TO_CART => {
                let parsed: AddToCartArgs = typed(name, args)?;
                if !(1..=cart::MAX_LINE_QUANTITY).contains(&parsed.quantity) {
                    return Err(ToolError::InvalidArguments {
                        tool: name.to_string(),
                        message: format!(
                            "quantity must be between 1 and {}",
                            cart::MAX_LINE_QUANTITY
                        ),
                    });
                }
                Self::AddToCart(parsed)
            }
            names::GET_CART_CONTENTS => Self::GetCartContents,
            names::APPLY_DISCOUNT_CODE => Self::ApplyDiscountCode(typed(name, args)?),
            names::GET_PRODUCT_RECOMMENDATIONS => Self::GetProductRecommendations,
            other => return Err(ToolError::UnknownTool(other.to_string())),
        };
        Ok(tool)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SearchProducts(_) => names::SEARCH_PRODUCTS,
            Self::GetOrderStatus(_) => names::GET_ORDER_STATUS,
            Self::AddToCart(_) => names::ADD_TO_CART,
            Self::GetCartContents => names::GET_CART_CONTENTS,
            Self::ApplyDiscountCode(_) => names::APPLY_DISCOUNT_CODE,
            Self::GetProductRecommendations => names::GET_PRODUCT_RECOMMENDATIONS,
        }
    }
}

fn typed<T: DeserializeOwned>(tool: &str, args: serde_json::Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

/// Description and full parameter schema for a tool name.
pub fn tool_spec(name: &str) -> Option<(&'static str, serde_json::Value)> {
    let no_params = || serde_json::json!({"type": "object", "properties": {}});
    let spec = match name {
        names::SEARCH_PRODUCTS => (
            "Search for products in the catalog.",
            crate::json_schema_for::<SearchProductsArgs>(),
        ),
        names::GET_ORDER_STATUS => (
            "Retrieve the status of a customer's order.",
            crate::json_schema_for::<GetOrderStatusArgs>(),
        ),
        names::ADD_TO_CART => (
            "Add a product to the customer's shopping cart.",
            crate::json_schema_for::<AddToCartArgs>(),
        ),
        names::GET_CART_CONTENTS => ("Get the contents of the customer's shopping cart.", no_params()),
        names::APPLY_DISCOUNT_CODE => (
            "Apply a discount code to the customer's cart.",
            crate::json_schema_for::<ApplyDiscountCodeArgs>(),
        ),
        names::GET_PRODUCT_RECOMMENDATIONS => (
            "Get personalized product recommendations for the customer.",
            no_params(),
        ),
        _ => return None,
    };
    Some(spec)
}
