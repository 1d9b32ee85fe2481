use super::config::OpenRouterConfig;
use super::convert::{self, ChatCompletionRequest, ChatCompletionResponse};
use crate::retry::{RetryConfig, is_transient_status, is_transient_transport};
use async_trait::async_trait;
use fv_core::{ChatRequest, ChatResponse, FvError, Llm, Result};
use fv_telemetry::{Instrument, warn};
use reqwest::Client;

/// Reported as the provider when every stage came from this backend.
pub const PROVIDER_NAME: &str = "openrouter";

/// A failed attempt, and whether trying again could help.
struct SendFailure {
    error: FvError,
    transient: bool,
}

/// OpenAI-compatible chat-completions client.
///
/// Each request may name its own model; the configured model is used otherwise. All
/// analysis stages share one client.
///
/// ```rust,ignore
/// use fv_model::{OpenRouterClient, OpenRouterConfig};
///
/// let client = OpenRouterClient::new(
///     OpenRouterConfig::new(std::env::var("OPENROUTER_API_KEY")?, "deepseek/deepseek-r1")
///         .with_app_url("https://futurevalidate.app"),
/// )?;
/// ```
pub struct OpenRouterClient {
    client: Client,
    config: OpenRouterConfig,
    retry_config: RetryConfig,
}

impl OpenRouterClient {
    pub fn new(config: OpenRouterConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FvError::Model(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config, retry_config: RetryConfig::default() })
    }

    #[must_use]
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    pub fn config(&self) -> &OpenRouterConfig {
        &self.config
    }

    fn api_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url().trim_end_matches('/'))
    }

    fn build_request(&self, request: ChatRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: request.model.unwrap_or_else(|| self.config.model.clone()),
            messages: request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    async fn send(
        &self,
        chat_request: &ChatCompletionRequest,
    ) -> std::result::Result<ChatCompletionResponse, SendFailure> {
        let mut builder = self
            .client
            .post(self.api_url())
            .bearer_auth(&self.config.api_key)
            .header("X-Title", &self.config.app_title)
            .json(chat_request);
        if let Some(app_url) = &self.config.app_url {
            builder = builder.header("HTTP-Referer", app_url);
        }

        let response = builder.send().await.map_err(|e| SendFailure {
            transient: is_transient_transport(&e),
            error: FvError::Model(format!("chat completion request failed: {e}")),
        })?;

        let status = response.status();
        if !status.is_success() {
            let transient = is_transient_status(status);
            let error_text = response.text().await.unwrap_or_default();
            let retryability = if transient { "retryable" } else { "non-retryable" };
            return Err(SendFailure {
                error: FvError::Model(format!(
                    "chat completion error ({status}, {retryability}): {error_text}"
                )),
                transient,
            });
        }

        response.json::<ChatCompletionResponse>().await.map_err(|e| SendFailure {
            error: FvError::Model(format!("failed to decode chat completion: {e}")),
            transient: false,
        })
    }

    /// Sends once, then again for each allowed retry while failures stay transient.
    async fn send_with_retry(
        &self,
        chat_request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        let mut retry = 0;
        loop {
            match self.send(chat_request).await {
                Ok(response) => return Ok(response),
                Err(failure) if failure.transient && retry < self.retry_config.max_retries => {
                    let delay = self.retry_config.delay_for(retry);
                    retry += 1;
                    warn!(
                        attempt = retry,
                        max_retries = self.retry_config.max_retries,
                        delay_ms = delay.as_millis(),
                        error = %failure.error,
                        "chat completion failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(failure) => return Err(failure.error),
            }
        }
    }
}

#[async_trait]
impl Llm for OpenRouterClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        let chat_request = self.build_request(request);
        let span = fv_telemetry::model_call_span(&chat_request.model);

        async {
            let response = self.send_with_retry(&chat_request).await?;

            if let Some(error) = &response.error {
                let code = error.code.as_ref().map(ToString::to_string).unwrap_or_default();
                return Err(FvError::Model(format!(
                    "chat completion error ({code}): {}",
                    error.message
                )));
            }

            let chat = convert::into_chat_response(response, &chat_request.model)
                .ok_or_else(|| FvError::Model("chat completion returned no choices".to_string()))?;

            if let Some(usage) = &chat.usage {
                fv_telemetry::debug!(
                    model = %chat.model,
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "chat completion finished"
                );
            }
            Ok(chat)
        }
        .instrument(span)
        .await
    }
}
