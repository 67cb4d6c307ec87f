//! generate_health_advice tool
//!
//! Embeds aggregated nutrition data in a fixed prompt, runs a one-shot
//! completion (no tools), and relays the tips behind a fixed label.
//! Failures surface as textual messages.

use crate::error::Result;
use crate::providers::{Message, Provider};
use crate::tools::{ToolExecutor, ToolResult};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct HealthAdviceParams {
    nutrition_json: String,
}

/// Tool generating health tips from nutrition data
pub struct HealthAdviceTool {
    provider: Arc<dyn Provider>,
}

impl HealthAdviceTool {
    /// Create the tool around a shared provider
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    fn build_prompt(nutrition_json: &str) -> String {
        format!(
            "Based on this nutrition data, give 2-3 practical health tips:\n{}\n\nKeep it friendly, specific, and under 100 words!",
            nutrition_json
        )
    }
}

#[async_trait::async_trait]
impl ToolExecutor for HealthAdviceTool {
    fn tool_definition(&self) -> serde_json::Value {
        json!({
            "name": "generate_health_advice",
            "description": "Give practical health tips based on nutrition data.",
            "parameters": {
                "type": "object",
                "properties": {
                    "nutrition_json": {
                        "type": "string",
                        "description": "Nutrition JSON or formatted breakdown to base tips on"
                    }
                },
                "required": ["nutrition_json"]
            }
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult> {
        let params: HealthAdviceParams = match serde_json::from_value(args) {
            Ok(params) => params,
            Err(e) => return Ok(ToolResult::success(format!("Advice failed: {}", e))),
        };

        let prompt = Self::build_prompt(&params.nutrition_json);
        match self
            .provider
            .complete(&[Message::user(prompt)], &[])
            .await
        {
            Ok(response) => {
                let tips = response.message.content.unwrap_or_default();
                Ok(ToolResult::success(format!(
                    "💡 **Health Tips:**\n{}",
                    tips
                )))
            }
            Err(e) => Ok(ToolResult::success(format!("Advice failed: {}", e))),
        }
    }
}
