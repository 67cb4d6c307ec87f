//! get_nutrition_data tool
//!
//! Wraps the Nutritionix client for the agent. Lookup failures are folded
//! into a JSON `{"error": ...}` payload instead of failing the tool call, so
//! downstream tools and the model can inspect the outcome as text.

use crate::error::Result;
use crate::nutritionix::NutritionixClient;
use crate::tools::{ToolExecutor, ToolResult};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct GetNutritionParams {
    food_input: String,
}

/// Tool fetching nutrition facts for a food description
pub struct GetNutritionDataTool {
    client: Arc<NutritionixClient>,
}

impl GetNutritionDataTool {
    /// Create the tool around a shared Nutritionix client
    pub fn new(client: Arc<NutritionixClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ToolExecutor for GetNutritionDataTool {
    fn tool_definition(&self) -> serde_json::Value {
        json!({
            "name": "get_nutrition_data",
            "description": "Get nutrition info for a food description from the Nutritionix API. Returns raw JSON with a 'foods' list, or a JSON object with an 'error' key on failure.",
            "parameters": {
                "type": "object",
                "properties": {
                    "food_input": {
                        "type": "string",
                        "description": "Natural-language food description, e.g. '2 idli and sambar'"
                    }
                },
                "required": ["food_input"]
            }
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult> {
        let params: GetNutritionParams = match serde_json::from_value(args) {
            Ok(params) => params,
            Err(e) => return Ok(ToolResult::error(format!("Invalid arguments: {}", e))),
        };

        match self.client.natural_nutrients(&params.food_input).await {
            Ok(body) => Ok(ToolResult::success(body)),
            // Failures surface as data, not as a failed tool call
            Err(e) => Ok(ToolResult::success(
                json!({ "error": e.to_string() }).to_string(),
            )),
        }
    }
}
