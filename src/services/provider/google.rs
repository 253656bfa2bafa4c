use reqwest::blocking::Client;
use serde_json::Value;

use super::{http, ProviderError, ProviderResult, Translator};

const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Keyless Google Translate web endpoint.
pub struct GoogleTranslate {
    client: Client,
    endpoint: String,
}

impl GoogleTranslate {
    pub fn new() -> ProviderResult<Self> {
        Ok(GoogleTranslate {
            client: http::client()?,
            endpoint: ENDPOINT.to_string(),
        })
    }
}

impl Translator for GoogleTranslate {
    fn translate(&self, source_lang: &str, target_lang: &str, text: &str) -> ProviderResult<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let body = http::send_with_retry(|| {
            self.client.get(&self.endpoint).query(&[
                ("client", "gtx"),
                ("dt", "t"),
                ("sl", source_lang),
                ("tl", target_lang),
                ("q", text),
            ])
        })?;

        parse_response(&body)
    }

    fn name(&self) -> &str {
        "Google Translate"
    }
}

/// The endpoint answers `[[["<segment>", "<source>", ...], ...], ...]`.
fn parse_response(body: &str) -> ProviderResult<String> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("invalid JSON: {e}")))?;

    let segments = json
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| ProviderError::InvalidResponse("missing segment list".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(|s| s.as_str()))
        .collect();

    if translated.trim().is_empty() {
        return Err(ProviderError::InvalidResponse(
            "empty translation".to_string(),
        ));
    }

    Ok(translated)
}
