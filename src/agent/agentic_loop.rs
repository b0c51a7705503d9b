//! Agentic tool-calling loop.
//!
//! Drives the LLM ↔ tool execution round-trip: sends a request to the model,
//! executes any tool calls in the response, appends results, and repeats
//! until the model produces a final text response or the iteration limit
//! is reached.

use tracing::debug;

use super::executor::ToolExecutor;
use super::message::{
    ChatRequest, ChatResponse, TokenUsage, assistant_tool_calls_message, tool_message,
};
use super::provider::LlmProvider;
use super::tool::ToolExchange;
use crate::error::AgentError;

/// Everything a finished loop produced.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    /// The model's final (tool-free) response.
    pub response: ChatResponse,
    /// Every tool call executed along the way, in order.
    pub exchanges: Vec<ToolExchange>,
    /// Usage summed across all completions.
    pub usage: TokenUsage,
}

/// Runs an agentic loop: model → tool calls → tool results → model → …
///
/// Continues until the model responds without tool calls or
/// `max_iterations` completions have requested tools. Tool failures do not
/// end the loop; they are sent back to the model as error objects.
///
/// # Errors
///
/// Returns [`AgentError::ToolLoopExceeded`] if the model keeps requesting
/// tools beyond `max_iterations`. Propagates any provider errors.
pub async fn agentic_loop(
    provider: &dyn LlmProvider,
    request: &mut ChatRequest,
    executor: &dyn ToolExecutor,
    max_iterations: usize,
) -> Result<LoopOutcome, AgentError> {
    let mut exchanges = Vec::new();
    let mut usage = TokenUsage::default();

    for iteration in 0..=max_iterations {
        let response = provider.chat(request).await?;
        usage.accumulate(response.usage);

        if response.tool_calls.is_empty() {
            debug!(iteration, "agentic loop completed with final text response");
            return Ok(LoopOutcome {
                response,
                exchanges,
                usage,
            });
        }

        if iteration == max_iterations {
            break;
        }

        debug!(
            iteration,
            tool_count = response.tool_calls.len(),
            "executing tool calls"
        );

        request.messages.push(assistant_tool_calls_message(
            &response.content,
            response.tool_calls.clone(),
        ));

        for call in response.tool_calls {
            let result = executor.execute(&call).await;
            debug!(
                tool = call.name,
                call_id = call.id,
                is_error = result.is_error,
                "tool execution complete"
            );
            request
                .messages
                .push(tool_message(&result.tool_call_id, &result.content));
            exchanges.push(ToolExchange { call, result });
        }
    }

    Err(AgentError::ToolLoopExceeded { max_iterations })
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use crate::agent::message::{Role, system_message, user_message};
    use crate::agent::tool::ToolCall;

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    /// Mock provider that returns one `add` call on the first N completions,
    /// then a final text response.
    pub(crate) struct MockToolProvider {
        pub(crate) call_count: AtomicUsize,
        tool_rounds: usize,
    }

    impl MockToolProvider {
        pub(crate) fn new(tool_rounds: usize) -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                tool_rounds,
            }
        }
    }

    #[async_trait]
    impl LlmProvider for MockToolProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, AgentError> {
            let count = self.call_count.fetch_add(1, Ordering::SeqCst);
            let usage = TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 2,
                total_tokens: 12,
            };

            if count < self.tool_rounds {
                Ok(ChatResponse {
                    content: String::new(),
                    usage,
                    tool_calls: vec![ToolCall {
                        id: format!("call_{count}"),
                        name: "add".to_string(),
                        arguments: r#"{"a":3,"b":5}"#.to_string(),
                    }],
                    finish_reason: Some("tool_calls".to_string()),
                })
            } else {
                Ok(ChatResponse {
                    content: "The answer is 96.".to_string(),
                    usage,
                    tool_calls: Vec::new(),
                    finish_reason: Some("stop".to_string()),
                })
            }
        }
    }

    /// Executor that answers `add` and fails everything else.
    #[derive(Default)]
    pub(crate) struct MockExecutor {
        pub(crate) calls: AtomicUsize,
        pub(crate) seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ToolExecutor for MockExecutor {
        async fn invoke(
            &self,
            name: &str,
            arguments: serde_json::Map<String, serde_json::Value>,
        ) -> Result<String, AgentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(name.to_string());
            }
            if name != "add" {
                return Err(AgentError::Mcp {
                    message: format!("unknown tool {name}"),
                });
            }
            let arg = |k: &str| arguments.get(k).and_then(serde_json::Value::as_i64);
            Ok((arg("a").unwrap_or(0) + arg("b").unwrap_or(0)).to_string())
        }
    }

    fn request() -> ChatRequest {
        ChatRequest {
            model: "test".to_string(),
            messages: vec![system_message("test"), user_message("query")],
            temperature: None,
            max_tokens: Some(1024),
            tools: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_agentic_loop_single_tool_round() {
        let executor = MockExecutor::default();
        let provider = MockToolProvider::new(1);
        let mut request = request();

        let outcome = agentic_loop(&provider, &mut request, &executor, 10)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));

        assert_eq!(outcome.response.content, "The answer is 96.");
        // system + user + assistant(tool_calls) + tool(result)
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[2].role, Role::Assistant);
        assert_eq!(request.messages[3].role, Role::Tool);
        assert_eq!(request.messages[3].content, "8");
        assert_eq!(outcome.exchanges.len(), 1);
        assert_eq!(outcome.usage.total_tokens, 24);
    }

    #[tokio::test]
    async fn test_agentic_loop_multiple_rounds() {
        let executor = MockExecutor::default();
        let provider = MockToolProvider::new(3);
        let mut request = request();

        let outcome = agentic_loop(&provider, &mut request, &executor, 10)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));

        // 2 initial + 3 rounds * 2 (assistant + tool)
        assert_eq!(request.messages.len(), 8);
        assert_eq!(outcome.exchanges.len(), 3);
        assert_eq!(executor.calls.load(Ordering::SeqCst), 3);
        assert_eq!(provider.call_count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_agentic_loop_exceeds_max() {
        let executor = MockExecutor::default();
        let provider = MockToolProvider::new(100);
        let mut request = request();

        let result = agentic_loop(&provider, &mut request, &executor, 2).await;
        assert!(
            matches!(result, Err(AgentError::ToolLoopExceeded { max_iterations: 2 })),
            "expected ToolLoopExceeded"
        );
        assert_eq!(executor.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_agentic_loop_answer_on_last_allowed_completion() {
        let executor = MockExecutor::default();
        let provider = MockToolProvider::new(2);
        let mut request = request();

        let outcome = agentic_loop(&provider, &mut request, &executor, 2)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));
        assert_eq!(outcome.exchanges.len(), 2);
    }

    #[tokio::test]
    async fn test_agentic_loop_no_tools() {
        let executor = MockExecutor::default();
        let provider = MockToolProvider::new(0);
        let mut request = request();

        let outcome = agentic_loop(&provider, &mut request, &executor, 10)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));

        assert_eq!(outcome.response.content, "The answer is 96.");
        assert_eq!(request.messages.len(), 2);
        assert!(outcome.exchanges.is_empty());
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }
}
