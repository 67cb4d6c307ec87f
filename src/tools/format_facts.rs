//! format_nutrition_facts tool
//!
//! Aggregates per-food nutrient fields into totals and renders the fixed
//! multi-line breakdown. Absent fields count as zero; malformed JSON yields
//! a textual error message rather than a failure.

use crate::error::Result;
use crate::tools::{ToolExecutor, ToolResult};
use serde::Deserialize;
use serde_json::{json, Value};

/// Read a numeric field from a food item, defaulting to zero
fn num_field(food: &Value, name: &str) -> f64 {
    food.get(name).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Render the nutrition breakdown for a raw Nutritionix response
///
/// Sums calories, protein, carbs, fat, fiber, and sugar across all food
/// items. An empty or missing `foods` list renders the fixed "no data"
/// message, not zero totals.
pub fn format_nutrition_facts(nutrition_json: &str) -> String {
    let data: Value = match serde_json::from_str(nutrition_json) {
        Ok(data) => data,
        Err(e) => return format!("Error formatting: {}", e),
    };

    let foods = match data.get("foods").and_then(Value::as_array) {
        Some(foods) if !foods.is_empty() => foods,
        _ => return "No nutrition data found.".to_string(),
    };

    let total_calories: f64 = foods.iter().map(|f| num_field(f, "nf_calories")).sum();
    let total_protein: f64 = foods.iter().map(|f| num_field(f, "nf_protein")).sum();
    let total_carbs: f64 = foods
        .iter()
        .map(|f| num_field(f, "nf_total_carbohydrate"))
        .sum();
    let total_fat: f64 = foods.iter().map(|f| num_field(f, "nf_total_fat")).sum();
    let total_fiber: f64 = foods.iter().map(|f| num_field(f, "nf_dietary_fiber")).sum();
    let total_sugar: f64 = foods.iter().map(|f| num_field(f, "nf_sugars")).sum();

    let mut lines = vec![
        "📊 **NUTRITION BREAKDOWN**".to_string(),
        format!("🔥 Calories: {:.0} kcal", total_calories),
        format!("💪 Protein: {:.1}g", total_protein),
        format!("🍞 Carbs: {:.1}g", total_carbs),
        format!("🥑 Fat: {:.1}g", total_fat),
        format!("🌾 Fiber: {:.1}g", total_fiber),
        format!("🍭 Sugar: {:.1}g", total_sugar),
        String::new(),
        "**Food Items:**".to_string(),
    ];

    for (i, food) in foods.iter().enumerate() {
        let name = food
            .get("food_name")
            .and_then(Value::as_str)
            .unwrap_or("Unknown");
        let calories = num_field(food, "nf_calories");
        lines.push(format!("{}. {} - {:.0} kcal", i + 1, name, calories));
    }

    lines.join("\n")
}

#[derive(Debug, Deserialize)]
struct FormatFactsParams {
    nutrition_json: String,
}

/// Tool exposing the nutrition formatter to the agent
pub struct FormatNutritionFactsTool;

#[async_trait::async_trait]
impl ToolExecutor for FormatNutritionFactsTool {
    fn tool_definition(&self) -> serde_json::Value {
        json!({
            "name": "format_nutrition_facts",
            "description": "Show a detailed nutrition breakdown with calories, protein, carbs, fat, fiber, and sugar from raw nutrition JSON.",
            "parameters": {
                "type": "object",
                "properties": {
                    "nutrition_json": {
                        "type": "string",
                        "description": "Raw JSON returned by get_nutrition_data"
                    }
                },
                "required": ["nutrition_json"]
            }
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult> {
        let params: FormatFactsParams = match serde_json::from_value(args) {
            Ok(params) => params,
            Err(e) => return Ok(ToolResult::error(format!("Invalid arguments: {}", e))),
        };
        Ok(ToolResult::success(format_nutrition_facts(
            &params.nutrition_json,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_item_payload() -> String {
        serde_json::json!({
            "foods": [
                {
                    "food_name": "idli",
                    "nf_calories": 78.0,
                    "nf_protein": 4.0,
                    "nf_total_carbohydrate": 16.0,
                    "nf_total_fat": 0.4,
                    "nf_dietary_fiber": 1.2,
                    "nf_sugars": 0.2
                },
                {
                    "food_name": "sambar",
                    "nf_calories": 139.0,
                    "nf_protein": 7.0,
                    "nf_total_carbohydrate": 21.0,
                    "nf_total_fat": 3.2,
                    "nf_dietary_fiber": 4.6,
                    "nf_sugars": 3.1
                }
            ]
        })
        .to_string()
    }

    #[test]
    fn test_breakfast_scenario() {
        let output = format_nutrition_facts(&two_item_payload());
        assert!(output.contains("NUTRITION BREAKDOWN"));
        assert!(output.contains("Calories: 217 kcal"));
        assert!(output.contains("idli"));
        assert!(output.contains("sambar"));
    }

    #[test]
    fn test_totals_sum_all_fields() {
        let output = format_nutrition_facts(&two_item_payload());
        assert!(output.contains("Protein: 11.0g"));
        assert!(output.contains("Carbs: 37.0g"));
        assert!(output.contains("Fat: 3.6g"));
        assert!(output.contains("Fiber: 5.8g"));
        assert!(output.contains("Sugar: 3.3g"));
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let payload = serde_json::json!({
            "foods": [{"food_name": "water"}]
        })
        .to_string();
        let output = format_nutrition_facts(&payload);
        assert!(output.contains("Calories: 0 kcal"));
        assert!(output.contains("1. water - 0 kcal"));
    }

    #[test]
    fn test_missing_name_renders_unknown() {
        let payload = serde_json::json!({
            "foods": [{"nf_calories": 42.0}]
        })
        .to_string();
        let output = format_nutrition_facts(&payload);
        assert!(output.contains("1. Unknown - 42 kcal"));
    }

    #[test]
    fn test_empty_foods_is_no_data() {
        let output = format_nutrition_facts(r#"{"foods": []}"#);
        assert_eq!(output, "No nutrition data found.");
    }

    #[test]
    fn test_error_payload_is_no_data() {
        // The lookup tool reports failures as {"error": ...}; the formatter
        // treats that as an absent foods list, never as a failure
        let output = format_nutrition_facts(r#"{"error": "Nutritionix returned 500"}"#);
        assert_eq!(output, "No nutrition data found.");
    }

    #[test]
    fn test_malformed_json_yields_error_text() {
        let output = format_nutrition_facts("{not json");
        assert!(output.starts_with("Error formatting:"));
    }

    #[tokio::test]
    async fn test_tool_execute() {
        let tool = FormatNutritionFactsTool;
        let result = tool
            .execute(serde_json::json!({"nutrition_json": two_item_payload()}))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.contains("NUTRITION BREAKDOWN"));
    }
}
