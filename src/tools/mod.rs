//! Tools module for nutrisage
//!
//! This module contains the tool trait, tool registry, and the six tool
//! implementations the agent can invoke: meal-type detection, nutrition
//! lookup, nutrition formatting, meal saving, meal history, and health
//! advice.

pub mod advice;
pub mod format_facts;
pub mod history;
pub mod meal_type;
pub mod nutrition;
pub mod save_meal;

use crate::error::Result;
use crate::nutritionix::NutritionixClient;
use crate::providers::Provider;
use crate::storage::MealLog;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Tool result structure
///
/// Represents the result of a tool execution. Both success output and
/// failure text flow back to the model as the tool's message; a failed
/// result never aborts the agent loop.
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// Whether the tool execution succeeded
    pub success: bool,
    /// Output from the tool
    pub output: String,
    /// Error message if execution failed
    pub error: Option<String>,
    /// Whether the output was truncated
    pub truncated: bool,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(output: String) -> Self {
        Self {
            success: true,
            output,
            error: None,
            truncated: false,
        }
    }

    /// Create a failed tool result
    pub fn error(error: String) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error),
            truncated: false,
        }
    }

    /// Truncate output if it exceeds the maximum size
    pub fn truncate_if_needed(mut self, max_size: usize) -> Self {
        if self.output.len() > max_size {
            self.output.truncate(max_size);
            self.output.push_str("\n... (truncated)");
            self.truncated = true;
        }
        self
    }

    /// Convert to a message string for the conversation
    pub fn to_message(&self) -> String {
        if self.success {
            self.output.clone()
        } else {
            format!(
                "Error: {}",
                self.error.as_deref().unwrap_or("Unknown error")
            )
        }
    }
}

/// Tool executor trait for implementing tool execution logic
///
/// Each tool must implement this trait to provide a definition (OpenAI
/// function-calling format) and execution logic callable by the agent.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Returns the tool definition as a JSON value
    ///
    /// The definition follows the OpenAI function calling format:
    /// `{"name": ..., "description": ..., "parameters": {json schema}}`
    fn tool_definition(&self) -> serde_json::Value;

    /// Executes the tool with the given arguments
    ///
    /// # Errors
    ///
    /// Returns error only on internal failures; expected failures (bad
    /// input, upstream errors) are reported through `ToolResult::error`
    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult>;
}

/// Tool registry for managing available tools
///
/// The registry maintains the collection of tools the agent may execute
/// during a conversation.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolExecutor>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool executor in the registry
    pub fn register(&mut self, name: impl Into<String>, executor: Arc<dyn ToolExecutor>) {
        self.tools.insert(name.into(), executor);
    }

    /// Get a tool executor by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolExecutor>> {
        self.tools.get(name).cloned()
    }

    /// Get all tool definitions as JSON values
    pub fn all_definitions(&self) -> Vec<serde_json::Value> {
        self.tools
            .values()
            .map(|executor| executor.tool_definition())
            .collect()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the full nutrition tool registry
///
/// Registers all six tools against their shared dependencies. The desired
/// invocation order (classify, then fetch, format, save, advise) lives in
/// the system prompt, not here.
pub fn build_registry(
    nutritionix: Arc<NutritionixClient>,
    meal_log: Arc<MealLog>,
    provider: Arc<dyn Provider>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register("detect_meal_type", Arc::new(meal_type::DetectMealTypeTool));
    registry.register(
        "get_nutrition_data",
        Arc::new(nutrition::GetNutritionDataTool::new(nutritionix)),
    );
    registry.register(
        "format_nutrition_facts",
        Arc::new(format_facts::FormatNutritionFactsTool),
    );
    registry.register(
        "save_meal_data",
        Arc::new(save_meal::SaveMealTool::new(meal_log.clone())),
    );
    registry.register(
        "get_meal_history",
        Arc::new(history::MealHistoryTool::new(meal_log)),
    );
    registry.register(
        "generate_health_advice",
        Arc::new(advice::HealthAdviceTool::new(provider)),
    );
    registry
}
