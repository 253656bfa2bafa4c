use reqwest::blocking::Client;
use serde_json::{json, Value};

use super::{http, ProviderError, ProviderResult, Translator};

const SYSTEM_PROMPT: &str = "You are a professional mobile app translator. \
Reply with the translated text only, keeping placeholders and punctuation intact.";

fn endpoint_for(provider: &str) -> ProviderResult<&'static str> {
    match provider {
        "openai" => Ok("https://api.openai.com/v1/chat/completions"),
        "deepseek" => Ok("https://api.deepseek.com/v1/chat/completions"),
        _ => Err(ProviderError::Config(format!(
            "unsupported chat provider `{provider}`"
        ))),
    }
}

/// OpenAI-compatible chat completion translator.
pub struct ChatTranslator {
    client: Client,
    provider: String,
    endpoint: &'static str,
    api_key: String,
    model: String,
}

impl ChatTranslator {
    pub fn new(provider: &str, api_key: &str, model: &str) -> ProviderResult<Self> {
        let endpoint = endpoint_for(provider)?;

        if api_key.trim().is_empty() {
            return Err(ProviderError::Config("api key is required".to_string()));
        }
        if model.trim().is_empty() {
            return Err(ProviderError::Config("model is required".to_string()));
        }

        Ok(ChatTranslator {
            client: http::client()?,
            provider: provider.to_string(),
            endpoint,
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

impl std::fmt::Debug for ChatTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatTranslator")
            .field("provider", &self.provider)
            .field("endpoint", &self.endpoint)
            .field("api_key", &"***")
            .field("model", &self.model)
            .finish()
    }
}

impl Translator for ChatTranslator {
    fn translate(&self, source_lang: &str, target_lang: &str, text: &str) -> ProviderResult<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(source_lang, target_lang, text) }
            ],
            "temperature": 0.3
        });

        let response = http::send_with_retry(|| {
            self.client
                .post(self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
        })?;

        parse_response(&response)
    }

    fn name(&self) -> &str {
        &self.provider
    }
}

fn build_prompt(source_lang: &str, target_lang: &str, text: &str) -> String {
    format!("Translate from {source_lang} to {target_lang}.\nText:\n{}", text.trim())
}

fn parse_response(body: &str) -> ProviderResult<String> {
    let json: Value = serde_json::from_str(body)
        .map_err(|_| ProviderError::InvalidResponse("invalid JSON from provider".to_string()))?;

    let content = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| {
            ProviderError::InvalidResponse(
                "missing choices[0].message.content".to_string(),
            )
        })?;

    let content = content.trim();
    if content.is_empty() {
        return Err(ProviderError::InvalidResponse("empty translation".to_string()));
    }
    Ok(content.to_string())
}
