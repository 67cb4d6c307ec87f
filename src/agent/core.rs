//! Agent core implementation with the tool-calling execution loop
//!
//! This module implements the agent loop that:
//! - Builds the conversation from the system prompt, session history, and
//!   the latest user input
//! - Calls the provider and executes any requested tool calls
//! - Enforces a turn limit and a wall-clock timeout
//!
//! The desired tool ordering (classify, fetch, format, save, advise) is
//! instructional text in the system prompt; nothing here enforces it.

use crate::config::AgentConfig;
use crate::error::{NutrisageError, Result};
use crate::providers::{Message, Provider, ToolCall};
use crate::tools::{ToolRegistry, ToolResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::Conversation;

/// The tool-calling agent behind the webhook
///
/// The agent is stateless across requests: per-user history lives in the
/// session store and is passed into [`Agent::respond`] per call. Safety
/// limits are a maximum turn count and a wall-clock timeout.
pub struct Agent {
    provider: Arc<dyn Provider>,
    tools: ToolRegistry,
    config: AgentConfig,
    system_prompt: String,
}

impl Agent {
    /// Creates a new agent instance
    ///
    /// # Arguments
    ///
    /// * `provider` - The language-model provider to use for completions
    /// * `tools` - The tool registry with available tools
    /// * `config` - Agent configuration (limits, timeouts, etc.)
    /// * `system_prompt` - Instructional prompt prepended to every run
    ///
    /// # Errors
    ///
    /// Returns `NutrisageError::Config` if configuration validation fails
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: ToolRegistry,
        config: AgentConfig,
        system_prompt: impl Into<String>,
    ) -> Result<Self> {
        if config.max_turns == 0 {
            return Err(
                NutrisageError::Config("max_turns must be greater than 0".to_string()).into(),
            );
        }

        Ok(Self {
            provider,
            tools,
            config,
            system_prompt: system_prompt.into(),
        })
    }

    /// Runs the agent for one user message
    ///
    /// Builds system prompt + prior turns + user input, then iterates:
    /// request a completion; execute requested tool calls and feed their
    /// textual results back; stop on a final text response.
    ///
    /// # Errors
    ///
    /// - `NutrisageError::MaxTurnsExceeded` if the turn limit is reached
    /// - `NutrisageError::Provider` if provider calls fail or the response
    ///   carries neither content nor tool calls
    /// - a timeout error if the wall-clock limit is exceeded
    pub async fn respond(&self, history: &[Message], user_input: &str) -> Result<String> {
        let start_time = Instant::now();
        let timeout = Duration::from_secs(self.config.timeout_seconds);

        info!("Starting agent run");

        let mut conversation = Conversation::new(
            self.config.conversation.max_tokens,
            self.config.conversation.min_retain_turns,
            self.config.conversation.prune_threshold.into(),
        );
        conversation.add_system_message(&self.system_prompt);
        for message in history {
            conversation.add_message(message.clone());
        }
        conversation.add_user_message(user_input);

        let tool_definitions = self.tools.all_definitions();
        let mut turn = 0;

        loop {
            turn += 1;

            if turn > self.config.max_turns {
                warn!("Maximum turns ({}) exceeded", self.config.max_turns);
                return Err(NutrisageError::MaxTurnsExceeded {
                    limit: self.config.max_turns,
                    message: format!(
                        "Agent exceeded maximum turn limit of {}",
                        self.config.max_turns
                    ),
                }
                .into());
            }

            if start_time.elapsed() > timeout {
                warn!("Agent run timeout after {:?}", start_time.elapsed());
                return Err(anyhow::anyhow!(
                    "Agent run timeout after {} seconds",
                    self.config.timeout_seconds
                ));
            }

            debug!(
                "Turn {}/{}, tokens: {}",
                turn,
                self.config.max_turns,
                conversation.token_count()
            );

            let completion = self
                .provider
                .complete(conversation.messages(), &tool_definitions)
                .await?;
            let message = completion.message;

            match message.tool_calls.clone() {
                Some(calls) if !calls.is_empty() => {
                    debug!("Executing {} tool calls", calls.len());
                    conversation.add_message(message);

                    for tool_call in &calls {
                        let result = self.execute_tool_call(tool_call).await;
                        conversation.add_tool_result(&tool_call.id, result.to_message());
                    }

                    continue;
                }
                Some(_) => {
                    // An empty tool-call list counts as a final response
                    debug!("Provider returned empty tool calls, stopping");
                }
                None => {}
            }

            if let Some(content) = message.content {
                debug!("Provider returned final response, stopping");
                conversation.add_assistant_message(content.clone());
                info!(
                    "Agent run completed in {} turns, {} seconds",
                    turn,
                    start_time.elapsed().as_secs()
                );
                return Ok(content);
            }

            warn!("Provider returned neither content nor tool calls");
            return Err(NutrisageError::Provider(
                "Provider returned invalid response (no content or tool calls)".to_string(),
            )
            .into());
        }
    }

    /// Executes a single tool call
    ///
    /// Unknown tools, unparseable arguments, and tool failures all come back
    /// as textual results fed to the model on the next turn; they never
    /// abort the run.
    async fn execute_tool_call(&self, tool_call: &ToolCall) -> ToolResult {
        let tool_name = &tool_call.function.name;
        debug!("Executing tool: {}", tool_name);

        let Some(tool_executor) = self.tools.get(tool_name) else {
            warn!("Tool not found: {}", tool_name);
            return ToolResult::error(format!("Tool not found: {}", tool_name));
        };

        let args: serde_json::Value = match serde_json::from_str(&tool_call.function.arguments) {
            Ok(args) => args,
            Err(e) => {
                warn!("Failed to parse arguments for '{}': {}", tool_name, e);
                return ToolResult::error(format!(
                    "Failed to parse tool arguments for '{}': {}",
                    tool_name, e
                ));
            }
        };

        let result = match tool_executor.execute(args).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Tool '{}' execution failed: {}", tool_name, e);
                ToolResult::error(format!("Tool '{}' execution failed: {}", tool_name, e))
            }
        };

        result.truncate_if_needed(self.config.tools.max_output_size)
    }

    /// Returns the number of registered tools
    pub fn num_tools(&self) -> usize {
        self.tools.len()
    }
}
