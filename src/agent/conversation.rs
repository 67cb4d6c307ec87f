//! Conversation management with token tracking and pruning
//!
//! This module implements conversation history management with estimated
//! token counting and pruning to stay within context limits.

use crate::providers::Message;

/// Manages conversation history with token tracking and pruning
///
/// The conversation maintains a list of messages and tracks an estimated
/// token count. When the count passes the prune threshold, older messages
/// are dropped while the system message and the most recent turns are kept.
///
/// Token counting uses a characters/4 heuristic, which approximates GPT
/// tokenization for English text.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    token_count: usize,
    max_tokens: usize,
    min_retain_turns: usize,
    prune_threshold: f64,
}

impl Conversation {
    /// Creates a new conversation with specified limits
    ///
    /// # Arguments
    ///
    /// * `max_tokens` - Maximum estimated token count
    /// * `min_retain_turns` - Minimum user turns to keep during pruning
    /// * `prune_threshold` - Fraction of max_tokens that triggers pruning
    pub fn new(max_tokens: usize, min_retain_turns: usize, prune_threshold: f64) -> Self {
        Self {
            messages: Vec::new(),
            token_count: 0,
            max_tokens,
            min_retain_turns,
            prune_threshold: prune_threshold.clamp(0.0, 1.0),
        }
    }

    /// Adds a pre-built message to the conversation
    pub fn add_message(&mut self, message: Message) {
        self.token_count += estimate_message_tokens(&message);
        self.messages.push(message);
        self.prune_if_needed();
    }

    /// Adds a system message to the conversation
    pub fn add_system_message(&mut self, content: impl Into<String>) {
        self.add_message(Message::system(content));
    }

    /// Adds a user message to the conversation
    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.add_message(Message::user(content));
    }

    /// Adds an assistant message to the conversation
    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.add_message(Message::assistant(content));
    }

    /// Adds a tool result message to the conversation
    pub fn add_tool_result(&mut self, tool_call_id: impl Into<String>, content: impl Into<String>) {
        self.add_message(Message::tool_result(tool_call_id, content));
    }

    /// Returns the conversation messages
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the conversation holds no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the current estimated token count
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// Prunes old messages once the token count exceeds the threshold
    ///
    /// Keeps system messages and everything from the `min_retain_turns`-th
    /// most recent user message onward.
    fn prune_if_needed(&mut self) {
        let threshold = (self.max_tokens as f64 * self.prune_threshold) as usize;
        if self.token_count <= threshold {
            return;
        }

        let mut keep_from_index = 0;
        let mut retained_turns = 0;
        for (idx, message) in self.messages.iter().enumerate().rev() {
            if message.role == "user" {
                retained_turns += 1;
                if retained_turns >= self.min_retain_turns {
                    keep_from_index = idx;
                    break;
                }
            }
        }

        if keep_from_index == 0 {
            return;
        }

        let mut pruned = 0;
        let messages = std::mem::take(&mut self.messages);
        for (idx, message) in messages.into_iter().enumerate() {
            if message.role == "system" || idx >= keep_from_index {
                self.messages.push(message);
            } else {
                pruned += 1;
            }
        }

        if pruned > 0 {
            tracing::debug!("Pruned {} old conversation messages", pruned);
        }

        self.token_count = self
            .messages
            .iter()
            .map(estimate_message_tokens)
            .sum();
    }
}

/// Estimate tokens for a message (characters / 4)
fn estimate_message_tokens(message: &Message) -> usize {
    let content_tokens = message
        .content
        .as_ref()
        .map(|s| s.len() / 4)
        .unwrap_or(0);

    let tool_calls_tokens = message
        .tool_calls
        .as_ref()
        .map(|calls| {
            calls
                .iter()
                .map(|call| (call.function.name.len() + call.function.arguments.len()) / 4)
                .sum()
        })
        .unwrap_or(0);

    content_tokens + tool_calls_tokens
}
