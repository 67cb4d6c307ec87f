//! get_meal_history tool
//!
//! Renders previously stored meals for a timeframe token: `today`,
//! `yesterday`, or a literal date key. An absent file or an empty date
//! yields a "nothing found" message, never an error.

use crate::error::Result;
use crate::storage::MealLog;
use crate::tools::{ToolExecutor, ToolResult};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct MealHistoryParams {
    timeframe: String,
}

/// Tool rendering the meal history for a given day
pub struct MealHistoryTool {
    meal_log: Arc<MealLog>,
}

impl MealHistoryTool {
    /// Create the tool around a shared meal log
    pub fn new(meal_log: Arc<MealLog>) -> Self {
        Self { meal_log }
    }

    fn resolve_date(timeframe: &str) -> String {
        match timeframe {
            "today" => MealLog::today_key(),
            "yesterday" => MealLog::yesterday_key(),
            other => other.to_string(),
        }
    }

    fn render(date: &str, meals: &[Value]) -> String {
        let mut lines = vec![format!("📅 Meals for {}:", date)];

        for meal in meals {
            let meal_type = meal
                .get("meal_type")
                .and_then(Value::as_str)
                .unwrap_or("meal");
            lines.push(format!("\n{}:", title_case(meal_type)));

            let foods = meal
                .get("nutrition_data")
                .and_then(|d| d.get("foods"))
                .and_then(Value::as_array);
            if let Some(foods) = foods {
                for food in foods {
                    let name = food
                        .get("food_name")
                        .and_then(Value::as_str)
                        .unwrap_or("Unknown");
                    let calories = food
                        .get("nf_calories")
                        .and_then(Value::as_f64)
                        .unwrap_or(0.0);
                    lines.push(format!("  • {} - {:.0} cal", name, calories));
                }
            }
        }

        lines.join("\n")
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[async_trait::async_trait]
impl ToolExecutor for MealHistoryTool {
    fn tool_definition(&self) -> serde_json::Value {
        json!({
            "name": "get_meal_history",
            "description": "Show meal history for 'today', 'yesterday', or a specific YYYY-MM-DD date.",
            "parameters": {
                "type": "object",
                "properties": {
                    "timeframe": {
                        "type": "string",
                        "description": "'today', 'yesterday', or a date like 2026-08-06"
                    }
                },
                "required": ["timeframe"]
            }
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult> {
        let params: MealHistoryParams = match serde_json::from_value(args) {
            Ok(params) => params,
            Err(e) => return Ok(ToolResult::success(format!("History error: {}", e))),
        };

        if !self.meal_log.file_exists() {
            return Ok(ToolResult::success("No meal history yet!".to_string()));
        }

        let date = Self::resolve_date(&params.timeframe);
        match self.meal_log.meals_for(&date).await {
            Ok(Some(meals)) => Ok(ToolResult::success(Self::render(&date, &meals))),
            Ok(None) => Ok(ToolResult::success(format!("No meals for {}", date))),
            Err(e) => Ok(ToolResult::success(format!("History error: {}", e))),
        }
    }
}
