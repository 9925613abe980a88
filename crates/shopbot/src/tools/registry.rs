//! Tool declarations and dispatch.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::schema::{declaration_schema, log_tool_call, validate_arguments};
use super::sources::{OrderLookup, RandomOrders, RecommendationFeed, ShuffledRecommendations};
use super::{ShopTool, ToolError, catalog, discount, names, tool_spec};
use crate::agent::session::ShopSession;
use crate::api::wire::FunctionDeclaration;
use crate::message::{ToolCall, ToolResult};

/// The closed set of shopping tools, with their data sources.
///
/// Invoking a tool never fails: unknown names, invalid arguments and domain
/// errors all come back as a [`ToolResult`] the model can read.
pub struct ToolRegistry {
    orders: Box<dyn OrderLookup>,
    recommendations: Box<dyn RecommendationFeed>,
    validate_args: bool,
    schemas: HashMap<&'static str, Value>,
    declarations: Vec<FunctionDeclaration>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Registry with random order and recommendation sources and argument
    /// validation enabled.
    pub fn new() -> Self {
        let mut schemas = HashMap::new();
        let mut declarations = Vec::new();
        for name in names::ALL {
            if let Some((description, schema)) = tool_spec(name) {
                declarations.push(FunctionDeclaration {
                    name: name.to_string(),
                    description: description.to_string(),
                    parameters: declaration_schema(&schema),
                });
                schemas.insert(name, schema);
            }
        }
        Self {
            orders: Box::new(RandomOrders),
            recommendations: Box::new(ShuffledRecommendations),
            validate_args: true,
            schemas,
            declarations,
        }
    }

    pub fn with_order_lookup(mut self, orders: impl OrderLookup + 'static) -> Self {
        self.orders = Box::new(orders);
        self
    }

    pub fn with_recommendations(mut self, feed: impl RecommendationFeed + 'static) -> Self {
        self.recommendations = Box::new(feed);
        self
    }

    /// Enable or disable JSON Schema validation of call arguments.
    pub fn with_argument_validation(mut self, enabled: bool) -> Self {
        self.validate_args = enabled;
        self
    }

    /// Function declarations for every tool, in a stable order.
    pub fn definitions(&self) -> &[FunctionDeclaration] {
        &self.declarations
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.declarations.iter().map(|d| d.name.as_str())
    }

    /// Execute one tool call against `session`.
    pub async fn invoke(&self, call: &ToolCall, session: &mut ShopSession) -> ToolResult {
        log_tool_call(&call.name, &call.args);
        let result = match self.dispatch(call) {
            Ok(tool) => self.execute(tool, session),
            Err(e) => {
                warn!("[tool] {} rejected: {e}", call.name);
                error_payload(&e.to_string())
            }
        };
        debug!("[tool] {} result ({} bytes)", call.name, result.to_string().len());
        ToolResult::new(call.name.clone(), result)
    }

    fn dispatch(&self, call: &ToolCall) -> Result<ShopTool, ToolError> {
        let Some(schema) = self.schemas.get(call.name.as_str()) else {
            return Err(ToolError::UnknownTool(call.name.clone()));
        };
        if self.validate_args {
            let args = if call.args.is_null() { json!({}) } else { call.args.clone() };
            validate_arguments(&call.name, schema, &args).map_err(|message| {
                ToolError::InvalidArguments {
                    tool: call.name.clone(),
                    message,
                }
            })?;
        }
        ShopTool::parse(&call.name, &call.args)
    }

    fn execute(&self, tool: ShopTool, session: &mut ShopSession) -> Value {
        match tool {
            ShopTool::SearchProducts(args) => payload(&catalog::search(
                &args.query,
                args.category.as_deref(),
                args.max_results as usize,
            )),
            ShopTool::GetOrderStatus(args) => {
                payload(&self.orders.lookup(&args.order_id, &session.customer_id))
            }
            ShopTool::AddToCart(args) => add_to_cart(session, &args.product_id, args.quantity),
            ShopTool::GetCartContents => payload(&session.cart),
            ShopTool::ApplyDiscountCode(args) => payload(&discount::check(&args.code)),
            ShopTool::GetProductRecommendations => payload(&self.recommendations.recommend()),
        }
    }
}

fn add_to_cart(session: &mut ShopSession, product_id: &str, quantity: u32) -> Value {
    let Some(product) = catalog::find(product_id) else {
        return json!({
            "status": "error",
            "message": format!("Product with ID {product_id} not found."),
            "cart_total_items": session.cart.item_count(),
        });
    };
    if let Err(e) = session.cart.add(product, quantity) {
        return json!({
            "status": "error",
            "message": e.to_string(),
            "cart_total_items": session.cart.item_count(),
        });
    }
    json!({
        "status": "success",
        "message": format!("Added {quantity} x {} to cart.", product.name),
        "cart_total_items": session.cart.item_count(),
    })
}

fn payload<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value)
        .unwrap_or_else(|e| error_payload(&format!("failed to serialize result: {e}")))
}

fn error_payload(message: &str) -> Value {
    json!({"status": "error", "message": message})
}
