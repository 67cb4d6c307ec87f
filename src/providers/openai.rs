//! OpenAI-compatible provider implementation for nutrisage
//!
//! This module implements the Provider trait against an OpenAI-style
//! chat-completions endpoint with tool calling support. The API base is
//! configurable so tests can point the provider at a mock server.

use crate::config::OpenAiConfig;
use crate::error::{NutrisageError, Result};
use crate::providers::{
    CompletionResponse, FunctionCall, Message, Provider, TokenUsage, ToolCall,
};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI chat-completions provider
///
/// Sends the running conversation and the registered tool schemas to
/// `{api_base}/chat/completions` and maps the response back into the
/// provider-neutral [`Message`] type. One request per completion; retries
/// and streaming are out of scope.
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

/// Request structure for the chat-completions endpoint
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ChatTool>,
    temperature: f32,
}

/// Message structure in OpenAI wire format
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ChatToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

/// Tool definition in OpenAI wire format
#[derive(Debug, Serialize)]
struct ChatTool {
    r#type: String,
    function: ChatFunction,
}

/// Function definition for tools
#[derive(Debug, Serialize)]
struct ChatFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

/// Tool call in OpenAI wire format
#[derive(Debug, Serialize, Deserialize)]
struct ChatToolCall {
    #[serde(default)]
    id: String,
    #[serde(default = "default_tool_type")]
    r#type: String,
    function: ChatFunctionCall,
}

/// Function call details; arguments arrive as a JSON-encoded string
#[derive(Debug, Serialize, Deserialize)]
struct ChatFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

fn default_tool_type() -> String {
    "function".to_string()
}

/// Response structure from the chat-completions endpoint
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize, Default)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("nutrisage/0.1.0")
            .build()
            .map_err(|e| {
                NutrisageError::Provider(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::info!(
            "Initialized OpenAI provider: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self { client, config })
    }

    /// Get the configured model name
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Convert provider-neutral messages to OpenAI wire format
    fn convert_messages(&self, messages: &[Message]) -> Vec<ChatMessage> {
        messages
            .iter()
            .filter_map(|m| {
                if m.content.is_none() && m.tool_calls.is_none() {
                    return None;
                }

                let tool_calls = m.tool_calls.as_ref().map(|calls| {
                    calls
                        .iter()
                        .map(|tc| ChatToolCall {
                            id: tc.id.clone(),
                            r#type: "function".to_string(),
                            function: ChatFunctionCall {
                                name: tc.function.name.clone(),
                                arguments: tc.function.arguments.clone(),
                            },
                        })
                        .collect()
                });

                Some(ChatMessage {
                    role: m.role.clone(),
                    content: m.content.clone(),
                    tool_calls,
                    tool_call_id: m.tool_call_id.clone(),
                })
            })
            .collect()
    }

    /// Convert tool schemas to OpenAI wire format
    fn convert_tools(&self, tools: &[serde_json::Value]) -> Vec<ChatTool> {
        tools
            .iter()
            .filter_map(|t| {
                let obj = t.as_object()?;
                let name = obj.get("name")?.as_str()?.to_string();
                let description = obj.get("description")?.as_str()?.to_string();
                let parameters = obj.get("parameters")?.clone();

                Some(ChatTool {
                    r#type: "function".to_string(),
                    function: ChatFunction {
                        name,
                        description,
                        parameters,
                    },
                })
            })
            .collect()
    }

    /// Convert an OpenAI response message back to the neutral format
    fn convert_response_message(&self, chat_msg: ChatMessage) -> Message {
        if let Some(tool_calls) = chat_msg.tool_calls {
            let converted: Vec<ToolCall> = tool_calls
                .into_iter()
                .map(|tc| ToolCall {
                    id: if tc.id.is_empty() {
                        format!("call_{}", uuid::Uuid::new_v4().simple())
                    } else {
                        tc.id
                    },
                    function: FunctionCall {
                        name: tc.function.name,
                        arguments: if tc.function.arguments.is_empty() {
                            "{}".to_string()
                        } else {
                            tc.function.arguments
                        },
                    },
                })
                .collect();

            Message::assistant_with_tools(converted)
        } else {
            Message::assistant(chat_msg.content.unwrap_or_default())
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[serde_json::Value],
    ) -> Result<CompletionResponse> {
        let url = format!("{}/chat/completions", self.config.api_base);

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: self.convert_messages(messages),
            tools: self.convert_tools(tools),
            temperature: self.config.temperature,
        };

        tracing::debug!(
            "Requesting completion: model={}, messages={}, tools={}",
            request.model,
            request.messages.len(),
            request.tools.len()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Completion request failed: {}", e);
                NutrisageError::Provider(format!("Failed to reach model API: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Model API returned {}: {}", status, error_text);
            return Err(NutrisageError::Provider(format!(
                "Model API returned {}: {}",
                status, error_text
            ))
            .into());
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse completion response: {}", e);
            NutrisageError::Provider(format!("Failed to parse model response: {}", e))
        })?;

        let choice = chat_response.choices.into_iter().next().ok_or_else(|| {
            NutrisageError::Provider("Model response contained no choices".to_string())
        })?;

        let message = self.convert_response_message(choice.message);
        let usage = chat_response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));

        Ok(match usage {
            Some(usage) => CompletionResponse::with_usage(message, usage),
            None => CompletionResponse::new(message),
        })
    }
}
