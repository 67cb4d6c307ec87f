//! save_meal_data tool
//!
//! Appends a JSON-encoded meal record to the meal log under today's date.
//! Invalid JSON and I/O failures surface as textual failure messages.

use crate::error::Result;
use crate::storage::MealLog;
use crate::tools::{ToolExecutor, ToolResult};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct SaveMealParams {
    meal_info: String,
}

/// Tool persisting a meal record to the daily log
pub struct SaveMealTool {
    meal_log: Arc<MealLog>,
}

impl SaveMealTool {
    /// Create the tool around a shared meal log
    pub fn new(meal_log: Arc<MealLog>) -> Self {
        Self { meal_log }
    }
}

#[async_trait::async_trait]
impl ToolExecutor for SaveMealTool {
    fn tool_definition(&self) -> serde_json::Value {
        json!({
            "name": "save_meal_data",
            "description": "Save a meal record to the daily meal log. Pass a JSON object with meal_type and nutrition_data.",
            "parameters": {
                "type": "object",
                "properties": {
                    "meal_info": {
                        "type": "string",
                        "description": "JSON-encoded meal record, e.g. {\"meal_type\": \"breakfast\", \"nutrition_data\": {...}}"
                    }
                },
                "required": ["meal_info"]
            }
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult> {
        let params: SaveMealParams = match serde_json::from_value(args) {
            Ok(params) => params,
            Err(e) => return Ok(ToolResult::success(format!("❌ Save failed: {}", e))),
        };

        let record: serde_json::Value = match serde_json::from_str(&params.meal_info) {
            Ok(record) => record,
            Err(e) => return Ok(ToolResult::success(format!("❌ Save failed: {}", e))),
        };

        match self.meal_log.append(record).await {
            Ok(()) => Ok(ToolResult::success("✅ Meal saved successfully!".to_string())),
            Err(e) => Ok(ToolResult::success(format!("❌ Save failed: {}", e))),
        }
    }
}
