use rand::{thread_rng, Rng};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use std::{thread, time::Duration};
use tracing::debug;

use super::{ProviderError, ProviderResult};

pub const MAX_RETRIES: usize = 3;
const BASE_DELAY_MS: u64 = 800;
const TIMEOUT_SECS: u64 = 60;

pub fn client() -> ProviderResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(TIMEOUT_SECS))
        .build()
        .map_err(|e| ProviderError::Config(format!("failed to create HTTP client: {e}")))
}

fn backoff(attempt: usize) -> Duration {
    let jitter: u64 = thread_rng().gen_range(0..200);
    let ms = BASE_DELAY_MS * (2_u64.pow(attempt as u32)) + jitter;
    Duration::from_millis(ms)
}

/// Sends the request built by `build`, retrying transient failures.
/// Returns the body of the first successful response.
pub fn send_with_retry(build: impl Fn() -> RequestBuilder) -> ProviderResult<String> {
    let mut last_err = ProviderError::Network("request was never sent".to_string());

    for attempt in 0..MAX_RETRIES {
        match build().send() {
            Ok(resp) => {
                let status = resp.status();

                match resp.text() {
                    Ok(text) if status.is_success() => return Ok(text),
                    Ok(text) => {
                        last_err = ProviderError::Http {
                            status: status.as_u16(),
                            message: extract_error_message(&text),
                        };
                        if !should_retry_http(status) {
                            break;
                        }
                    }
                    Err(err) => last_err = ProviderError::Network(err.to_string()),
                }
            }
            Err(err) => last_err = ProviderError::Network(err.to_string()),
        }

        if attempt + 1 < MAX_RETRIES {
            debug!(attempt, "provider call failed, retrying: {last_err}");
            thread::sleep(backoff(attempt));
        }
    }

    Err(last_err)
}

fn should_retry_http(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// Pulls `error.message` or `message` out of a JSON error body, else a
/// truncated raw body.
pub fn extract_error_message(body_text: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body_text) {
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return msg.to_string();
        }
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            return msg.to_string();
        }
    }

    let trimmed = body_text.trim();
    if trimmed.chars().count() > 400 {
        let snippet: String = trimmed.chars().take(400).collect();
        format!("{snippet}...")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_only_transient_statuses() {
        assert!(should_retry_http(StatusCode::TOO_MANY_REQUESTS));
        assert!(should_retry_http(StatusCode::REQUEST_TIMEOUT));
        assert!(should_retry_http(StatusCode::BAD_GATEWAY));
        assert!(!should_retry_http(StatusCode::UNAUTHORIZED));
        assert!(!should_retry_http(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn error_message_extraction() {
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"quota exceeded"}}"#),
            "quota exceeded"
        );
        assert_eq!(extract_error_message(r#"{"message":"bad key"}"#), "bad key");
        assert_eq!(extract_error_message("  plain  "), "plain");

        let long = "x".repeat(500);
        let msg = extract_error_message(&long);
        assert!(msg.ends_with("..."));
        assert_eq!(msg.chars().count(), 403);
    }

    #[test]
    fn backoff_grows() {
        assert!(backoff(0) < Duration::from_millis(1000));
        assert!(backoff(2) >= Duration::from_millis(3200));
    }
}
