//! Clients for the external MyMemory translation API.
//!
//! Two operations, with deliberately different failure behavior:
//!
//! - [`MyMemoryClient::translate`] propagates a [`ServiceError`] — a failed
//!   translation is a user-visible service failure.
//! - [`MyMemoryClient::detect`] never fails: any error falls back to
//!   `("en", 0.0)` with a warning, because a missed detection should not
//!   block a translation request.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Default MyMemory endpoint.
pub const MYMEMORY_URL: &str = "https://api.mymemory.translated.net/get";

/// Language detection only looks at the head of the text.
const DETECT_SNIPPET_CHARS: usize = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure talking to the external translation provider.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("translation service request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("translation service returned HTTP {0}")]
    Status(u16),
    #[error("unexpected translation service response: {0}")]
    Malformed(String),
}

/// HTTP client for the MyMemory translation API.
#[derive(Debug, Clone)]
pub struct MyMemoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl MyMemoryClient {
    /// Client pointed at the public MyMemory endpoint.
    pub fn new() -> Self {
        Self::with_base_url(MYMEMORY_URL.to_string())
    }

    /// Client pointed at a custom endpoint (tests, proxies).
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized. Constructors run
    /// once at process startup, before any request is accepted.
    pub fn with_base_url(base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self { http, base_url }
    }

    /// Translate `text` from `source_lang` to `target_lang`.
    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ServiceError> {
        let langpair = format!("{}|{}", source_lang, target_lang);
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("q", text), ("langpair", &langpair)])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ServiceError::Status(resp.status().as_u16()));
        }

        let data: Value = resp.json().await?;
        parse_translate_response(&data)
    }

    /// Detect the language of `text`, returning `(language_code, confidence)`.
    ///
    /// Only the first 100 characters are sent. Falls back to `("en", 0.0)`
    /// on any failure; this call never surfaces an error.
    pub async fn detect(&self, text: &str) -> (String, f64) {
        let snippet: String = text.chars().take(DETECT_SNIPPET_CHARS).collect();
        let result = self
            .http
            .get(&self.base_url)
            .query(&[("q", snippet.as_str()), ("langpair", "auto|en")])
            .send()
            .await;

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, "language detection request failed, defaulting to en");
                return ("en".to_string(), 0.0);
            }
        };

        match resp.json::<Value>().await {
            Ok(data) => match parse_detect_response(&data) {
                Some(lang) => (lang, 1.0),
                None => {
                    tracing::warn!("language detection response unusable, defaulting to en");
                    ("en".to_string(), 0.0)
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "language detection response unreadable, defaulting to en");
                ("en".to_string(), 0.0)
            }
        }
    }
}

impl Default for MyMemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the translated text from a MyMemory response body.
///
/// MyMemory reports its own status inside the JSON (`responseStatus`), even
/// when the HTTP status is 200.
pub fn parse_translate_response(data: &Value) -> Result<String, ServiceError> {
    let status = data["responseStatus"].as_i64().unwrap_or(0);
    if status != 200 {
        return Err(ServiceError::Malformed(format!(
            "responseStatus {}",
            status
        )));
    }
    data["responseData"]["translatedText"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ServiceError::Malformed("missing translatedText".into()))
}

/// Extract the detected language code from a MyMemory response body.
pub fn parse_detect_response(data: &Value) -> Option<String> {
    if data["responseStatus"].as_i64()? != 200 {
        return None;
    }
    let lang = data["responseData"]["detectedLanguage"].as_str()?;
    if lang.is_empty() {
        None
    } else {
        Some(lang.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_translate_success() {
        let data = json!({
            "responseStatus": 200,
            "responseData": {"translatedText": "Hola"}
        });
        assert_eq!(parse_translate_response(&data).unwrap(), "Hola");
    }

    #[test]
    fn parse_translate_provider_error_status() {
        let data = json!({
            "responseStatus": 403,
            "responseData": {"translatedText": "INVALID LANGUAGE PAIR"}
        });
        assert!(matches!(
            parse_translate_response(&data),
            Err(ServiceError::Malformed(_))
        ));
    }

    #[test]
    fn parse_translate_missing_text() {
        let data = json!({"responseStatus": 200, "responseData": {}});
        assert!(matches!(
            parse_translate_response(&data),
            Err(ServiceError::Malformed(_))
        ));
    }

    #[test]
    fn parse_translate_garbage_body() {
        let data = json!(["not", "an", "object"]);
        assert!(parse_translate_response(&data).is_err());
    }

    #[test]
    fn parse_detect_success() {
        let data = json!({
            "responseStatus": 200,
            "responseData": {"detectedLanguage": "es", "translatedText": "Hello"}
        });
        assert_eq!(parse_detect_response(&data), Some("es".to_string()));
    }

    #[test]
    fn parse_detect_failure_returns_none() {
        let data = json!({"responseStatus": 500});
        assert_eq!(parse_detect_response(&data), None);

        let data = json!({"responseStatus": 200, "responseData": {"detectedLanguage": ""}});
        assert_eq!(parse_detect_response(&data), None);

        let data = json!({"responseStatus": 200, "responseData": {}});
        assert_eq!(parse_detect_response(&data), None);
    }
}
