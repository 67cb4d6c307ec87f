//! detect_meal_type tool
//!
//! Keyword classifier mapping free text to a meal-type label. First matching
//! group wins, in priority order breakfast > lunch > dinner > snack; text
//! with no match classifies as "unknown".

use crate::error::Result;
use crate::tools::{ToolExecutor, ToolResult};
use serde::Deserialize;
use serde_json::json;

/// Keyword groups in priority order
const MEAL_KEYWORDS: &[(&str, &[&str])] = &[
    ("breakfast", &["breakfast", "morning"]),
    ("lunch", &["lunch", "noon", "afternoon"]),
    ("dinner", &["dinner", "evening", "night", "supper"]),
    ("snack", &["snack", "snacking"]),
];

/// Classify free text into a meal-type label
///
/// Total over all inputs: every string maps to exactly one of
/// breakfast, lunch, dinner, snack, or unknown.
pub fn detect_meal_type(user_input: &str) -> &'static str {
    let text = user_input.to_lowercase();
    for (label, keywords) in MEAL_KEYWORDS {
        if keywords.iter().any(|kw| text.contains(kw)) {
            return label;
        }
    }
    "unknown"
}

#[derive(Debug, Deserialize)]
struct DetectMealTypeParams {
    user_input: String,
}

/// Tool exposing the meal-type classifier to the agent
pub struct DetectMealTypeTool;

#[async_trait::async_trait]
impl ToolExecutor for DetectMealTypeTool {
    fn tool_definition(&self) -> serde_json::Value {
        json!({
            "name": "detect_meal_type",
            "description": "Check if the user mentioned breakfast, lunch, dinner, or snack. Returns 'unknown' if not found.",
            "parameters": {
                "type": "object",
                "properties": {
                    "user_input": {
                        "type": "string",
                        "description": "The user's meal description text"
                    }
                },
                "required": ["user_input"]
            }
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult> {
        let params: DetectMealTypeParams = match serde_json::from_value(args) {
            Ok(params) => params,
            Err(e) => return Ok(ToolResult::error(format!("Invalid arguments: {}", e))),
        };
        Ok(ToolResult::success(
            detect_meal_type(&params.user_input).to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_breakfast() {
        assert_eq!(detect_meal_type("2 idli and sambar for breakfast"), "breakfast");
        assert_eq!(detect_meal_type("eggs this MORNING"), "breakfast");
    }

    #[test]
    fn test_detects_lunch() {
        assert_eq!(detect_meal_type("chicken sandwich for lunch"), "lunch");
        assert_eq!(detect_meal_type("rice at noon"), "lunch");
        assert_eq!(detect_meal_type("salad this afternoon"), "lunch");
    }

    #[test]
    fn test_detects_dinner() {
        assert_eq!(detect_meal_type("pasta for dinner"), "dinner");
        assert_eq!(detect_meal_type("soup in the evening"), "dinner");
        assert_eq!(detect_meal_type("late night pizza"), "dinner");
        assert_eq!(detect_meal_type("fish for supper"), "dinner");
    }

    #[test]
    fn test_detects_snack() {
        assert_eq!(detect_meal_type("just a snack"), "snack");
        assert_eq!(detect_meal_type("snacking on almonds"), "snack");
    }

    #[test]
    fn test_unknown_when_no_keyword() {
        assert_eq!(detect_meal_type("2 idli and sambar"), "unknown");
        assert_eq!(detect_meal_type(""), "unknown");
    }

    #[test]
    fn test_priority_breakfast_over_dinner() {
        // Both groups match; breakfast wins by priority
        assert_eq!(detect_meal_type("breakfast for dinner"), "breakfast");
    }

    #[test]
    fn test_priority_lunch_over_snack() {
        assert_eq!(detect_meal_type("a snack at lunch"), "lunch");
    }

    #[tokio::test]
    async fn test_tool_execute() {
        let tool = DetectMealTypeTool;
        let result = tool
            .execute(serde_json::json!({"user_input": "oats for breakfast"}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output, "breakfast");
    }

    #[tokio::test]
    async fn test_tool_rejects_missing_argument() {
        let tool = DetectMealTypeTool;
        let result = tool.execute(serde_json::json!({})).await.unwrap();
        assert!(!result.success);
        assert!(result.to_message().contains("Invalid arguments"));
    }
}
