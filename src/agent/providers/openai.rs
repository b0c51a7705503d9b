//! `OpenAI`-compatible provider implementation using the `async-openai` crate.
//!
//! One provider type serves both Azure `OpenAI` chat deployments and the
//! public `OpenAI` API; only the `async-openai` config differs.

use async_openai::Client;
use async_openai::config::{AzureConfig, Config, OpenAIConfig};
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessage,
    ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessage, ChatCompletionRequestSystemMessageContent,
    ChatCompletionRequestToolMessage, ChatCompletionRequestToolMessageContent,
    ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent, ChatCompletionTool,
    ChatCompletionToolType, CreateChatCompletionRequest, FunctionCall, FunctionObject,
};
use async_trait::async_trait;
use tracing::debug;

use crate::agent::config::{AgentConfig, env};
use crate::agent::message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
use crate::agent::provider::LlmProvider;
use crate::agent::tool::ToolCall;
use crate::error::{AgentError, ConfigError};
use crate::retrieval::embedding::no_retry;

/// `OpenAI`-compatible LLM provider.
///
/// Wraps the `async-openai` client for chat completions.
pub struct OpenAiProvider<C: Config + Send + Sync> {
    client: Client<C>,
    name: &'static str,
}

/// Builds the HTTP client carrying the configured request timeout.
fn http_client(config: &AgentConfig) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| ConfigError::HttpClient {
            message: e.to_string(),
        })
}

impl OpenAiProvider<AzureConfig> {
    /// Creates a provider for an Azure `OpenAI` chat deployment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if the endpoint or API version is unset,
    /// or [`ConfigError::HttpClient`] if the HTTP client cannot be built.
    pub fn azure(config: &AgentConfig) -> Result<Self, ConfigError> {
        let endpoint = config.endpoint.as_deref().ok_or(ConfigError::Missing {
            var: env::AZURE_ENDPOINT,
        })?;
        let api_version = config.api_version.as_deref().ok_or(ConfigError::Missing {
            var: env::AZURE_VERSION,
        })?;

        let azure = AzureConfig::new()
            .with_api_base(endpoint)
            .with_api_version(api_version)
            .with_deployment_id(&config.chat_deployment)
            .with_api_key(&config.api_key);

        Ok(Self {
            client: Client::with_config(azure)
                .with_http_client(http_client(config)?)
                .with_backoff(no_retry()),
            name: "azure",
        })
    }
}

impl OpenAiProvider<OpenAIConfig> {
    /// Creates a provider for the `OpenAI` API or a compatible proxy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP client cannot be built.
    pub fn openai(config: &AgentConfig) -> Result<Self, ConfigError> {
        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);

        if let Some(ref base_url) = config.endpoint {
            openai_config = openai_config.with_api_base(base_url);
        }

        Ok(Self {
            client: Client::with_config(openai_config)
                .with_http_client(http_client(config)?)
                .with_backoff(no_retry()),
            name: "openai",
        })
    }
}

/// Converts our message type to the `OpenAI` SDK type.
fn convert_message(msg: &ChatMessage) -> ChatCompletionRequestMessage {
    match msg.role {
        Role::System => ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
            content: ChatCompletionRequestSystemMessageContent::Text(msg.content.clone()),
            name: None,
        }),
        Role::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
            name: None,
        }),
        Role::Assistant => {
            let tool_calls = if msg.tool_calls.is_empty() {
                None
            } else {
                Some(
                    msg.tool_calls
                        .iter()
                        .map(|tc| ChatCompletionMessageToolCall {
                            id: tc.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: tc.name.clone(),
                                arguments: tc.arguments.clone(),
                            },
                        })
                        .collect(),
                )
            };

            let content = if msg.content.is_empty() {
                None
            } else {
                Some(ChatCompletionRequestAssistantMessageContent::Text(
                    msg.content.clone(),
                ))
            };

            #[allow(deprecated)]
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content,
                name: None,
                tool_calls,
                refusal: None,
                audio: None,
                function_call: None,
            })
        }
        Role::Tool => ChatCompletionRequestMessage::Tool(ChatCompletionRequestToolMessage {
            content: ChatCompletionRequestToolMessageContent::Text(msg.content.clone()),
            tool_call_id: msg.tool_call_id.clone().unwrap_or_default(),
        }),
    }
}

/// Builds an `OpenAI` chat completion request from our generic request.
fn build_request(request: &ChatRequest) -> CreateChatCompletionRequest {
    let messages: Vec<_> = request.messages.iter().map(convert_message).collect();

    let tools = if request.tools.is_empty() {
        None
    } else {
        Some(
            request
                .tools
                .iter()
                .map(|td| ChatCompletionTool {
                    r#type: ChatCompletionToolType::Function,
                    function: FunctionObject {
                        name: td.name.clone(),
                        description: Some(td.description.clone()),
                        parameters: Some(td.parameters.clone()),
                        strict: None,
                    },
                })
                .collect(),
        )
    };

    CreateChatCompletionRequest {
        model: request.model.clone(),
        messages,
        temperature: request.temperature,
        max_completion_tokens: request.max_tokens,
        tools,
        ..Default::default()
    }
}

impl<C: Config + Send + Sync> std::fmt::Debug for OpenAiProvider<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("name", &self.name)
            .field("client", &"<async-openai::Client>")
            .finish()
    }
}

#[async_trait]
impl<C: Config + Send + Sync + 'static> LlmProvider for OpenAiProvider<C> {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        let openai_request = build_request(request);
        debug!(
            provider = self.name,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "sending chat completion"
        );

        let response = self
            .client
            .chat()
            .create(openai_request)
            .await
            .map_err(|e| AgentError::ApiRequest {
                message: e.to_string(),
            })?;

        let choice = response.choices.first();

        let content = choice
            .and_then(|c| c.message.content.as_ref())
            .cloned()
            .unwrap_or_default();

        let tool_calls = choice
            .and_then(|c| c.message.tool_calls.as_ref())
            .map(|tcs| {
                tcs.iter()
                    .map(|tc| ToolCall {
                        id: tc.id.clone(),
                        name: tc.function.name.clone(),
                        arguments: tc.function.arguments.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let finish_reason = choice.and_then(|c| {
            c.finish_reason
                .as_ref()
                .map(|fr| format!("{fr:?}").to_lowercase())
        });

        let usage = response
            .usage
            .map_or_else(TokenUsage::default, |u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            });

        Ok(ChatResponse {
            content,
            usage,
            tool_calls,
            finish_reason,
        })
    }
}
