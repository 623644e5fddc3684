use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
        ResponseFormat
    },
    Client as OpenAIClient
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::{
    config::{validate_api_key, ClassifierConfig},
    error::ClassifyError,
    extract::extract_record,
    model::DdcRecord,
    prompt::{user_prompt, SYSTEM_PROMPT}
};

/// Seam between the dispatcher and the classification client, so bulk
/// runs can be driven against a scripted stand-in.
#[async_trait]
pub trait Classify: Send + Sync {
    async fn classify(&self, text: &str) -> Result<DdcRecord, ClassifyError>;
}

/// Classification client: one text in, one validated record out. Never
/// retries on its own; a failed attempt is terminal for that request.
pub struct DdcAgent {
    internal: Arc<DdcAgentInternal>
}

impl DdcAgent {
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifyError> {
        Ok(DdcAgent {
            internal: Arc::new(DdcAgentInternal::new(config)?)
        })
    }
}

#[async_trait]
impl Classify for DdcAgent {
    async fn classify(&self, text: &str) -> Result<DdcRecord, ClassifyError> {
        self.internal.classify(text).await
    }
}

struct DdcAgentInternal {
    client: OpenAIClient<OpenAIConfig>,
    model: &'static str,
    temperature: f32,
    max_tokens: u32
}

impl DdcAgentInternal {
    fn new(config: ClassifierConfig) -> Result<Self, ClassifyError> {
        if !validate_api_key(&config.api_key) {
            return Err(ClassifyError::Credential(
                "API key must be at least 32 characters".to_string()
            ));
        }
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.trim())
            .with_api_base(config.provider.api_base());
        Ok(DdcAgentInternal {
            client: OpenAIClient::with_config(openai_config),
            model: config.provider.model(),
            temperature: config.temperature,
            max_tokens: config.max_tokens
        })
    }

    async fn classify(&self, text: &str) -> Result<DdcRecord, ClassifyError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .response_format(ResponseFormat::JsonObject)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_PROMPT)
                    .build()
                    .map_err(ClassifyError::from)?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_prompt(text))
                    .build()
                    .map_err(ClassifyError::from)?
                    .into(),
            ])
            .build()
            .map_err(ClassifyError::from)?;

        let content = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(ClassifyError::from)?
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ClassifyError::Extraction("no choices in response".to_string()))?
            .message
            .content
            .ok_or_else(|| ClassifyError::Extraction("no content in response".to_string()))?;

        debug!(chars = content.len(), "received completion");
        extract_record(&content)
    }
}
