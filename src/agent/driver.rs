//! Model-driven client driver.
//!
//! Offers the server's tools to a chat deployment and lets the model decide
//! which to call:
//!
//! ```text
//! prompt ─► [system, user] ─► agentic_loop ◄─► ToolExecutor (MCP session)
//!                                  │
//!                                  ▼
//!                             AskOutcome { answer, exchanges, usage }
//! ```

use tracing::info;

use super::agentic_loop::agentic_loop;
use super::config::AgentConfig;
use super::executor::ToolExecutor;
use super::message::{ChatRequest, TokenUsage, system_message, user_message};
use super::provider::LlmProvider;
use super::tool::{ToolDefinition, ToolExchange};
use crate::error::AgentError;

/// Result of one [`ToolAgent::ask`].
#[derive(Debug, Clone)]
pub struct AskOutcome {
    /// The model's final answer.
    pub answer: String,
    /// Tool calls made while answering.
    pub exchanges: Vec<ToolExchange>,
    /// Total token usage.
    pub usage: TokenUsage,
}

/// Answers prompts with a chat model that may call MCP tools.
pub struct ToolAgent {
    provider: Box<dyn LlmProvider>,
    model: String,
    system_prompt: String,
    max_tool_iterations: usize,
    max_tokens: u32,
}

impl ToolAgent {
    /// Creates an agent over `provider`, taking limits and prompt from `config`.
    #[must_use]
    pub fn new(provider: Box<dyn LlmProvider>, config: &AgentConfig) -> Self {
        Self {
            provider,
            model: config.chat_deployment.clone(),
            system_prompt: config.system_prompt.clone(),
            max_tool_iterations: config.max_tool_iterations,
            max_tokens: config.max_tokens,
        }
    }

    /// Runs the tool-calling loop for one prompt.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] if a completion fails or the loop exceeds its
    /// iteration limit. Tool failures are reported to the model instead.
    pub async fn ask(
        &self,
        executor: &dyn ToolExecutor,
        tools: Vec<ToolDefinition>,
        prompt: &str,
    ) -> Result<AskOutcome, AgentError> {
        let mut request = ChatRequest {
            model: self.model.clone(),
            messages: vec![system_message(&self.system_prompt), user_message(prompt)],
            temperature: None,
            max_tokens: Some(self.max_tokens),
            tools,
        };

        let outcome = agentic_loop(
            self.provider.as_ref(),
            &mut request,
            executor,
            self.max_tool_iterations,
        )
        .await?;

        info!(
            provider = self.provider.name(),
            tool_calls = outcome.exchanges.len(),
            total_tokens = outcome.usage.total_tokens,
            "answered prompt"
        );

        Ok(AskOutcome {
            answer: outcome.response.content,
            exchanges: outcome.exchanges,
            usage: outcome.usage,
        })
    }
}

impl std::fmt::Debug for ToolAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolAgent")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("max_tool_iterations", &self.max_tool_iterations)
            .finish_non_exhaustive()
    }
}
