//! Request/reply HTTP backends.
//!
//! Simpler chat backends expose a single endpoint: POST `{"message": text}`
//! (or `{"prompt": text}`) and get back `{"reply": text}` (or
//! `{"response": text}`). There is no conversation list and no history on
//! the server side.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use parley_core::prelude::*;

/// Name of the request body field carrying the user's text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptField {
    #[default]
    Message,
    Prompt,
}

impl PromptField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptField::Message => "message",
            PromptField::Prompt => "prompt",
        }
    }
}

impl std::str::FromStr for PromptField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "message" => Ok(PromptField::Message),
            "prompt" => Ok(PromptField::Prompt),
            other => Err(Error::config(format!(
                "unknown HTTP field '{other}' (expected 'message' or 'prompt')"
            ))),
        }
    }
}

/// A backend that answers one piece of text with another.
///
/// `LocalReplyBackend` is the non-`Send` form; [`ReplyBackend`] is the
/// variant whose futures can be spawned onto the runtime.
#[trait_variant::make(ReplyBackend: Send)]
pub trait LocalReplyBackend {
    /// Send `text` and return the backend's reply.
    ///
    /// # Errors
    ///
    /// [`Error::UpstreamFailure`] for transport errors, non-2xx statuses,
    /// and bodies without a reply field.
    async fn ask(&self, text: &str) -> Result<String>;
}

/// HTTP client for a `POST {message|prompt}` endpoint.
#[derive(Debug, Clone)]
pub struct PromptClient {
    http: reqwest::Client,
    endpoint: String,
    field: PromptField,
}

impl PromptClient {
    pub fn new(endpoint: impl Into<String>, field: PromptField) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            field,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn field(&self) -> PromptField {
        self.field
    }
}

impl ReplyBackend for PromptClient {
    async fn ask(&self, text: &str) -> Result<String> {
        let body = build_body(self.field, text);
        debug!("HTTP backend: POST {} ({})", self.endpoint, self.field.as_str());

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::upstream(format!("request to {} failed: {e}", self.endpoint)))?;

        let status = resp.status();
        let raw = resp
            .text()
            .await
            .map_err(|e| Error::upstream(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(Error::upstream(format!(
                "{} returned {}: {}",
                self.endpoint,
                status,
                raw.chars().take(200).collect::<String>()
            )));
        }

        parse_reply_body(&raw)
    }
}

/// Request body for `text` under the configured field name.
fn build_body(field: PromptField, text: &str) -> Value {
    let mut body = serde_json::Map::new();
    body.insert(field.as_str().to_string(), Value::from(text));
    Value::Object(body)
}

/// Extract the reply text from a response body.
///
/// `reply` wins over `response` when both are present.
fn parse_reply_body(raw: &str) -> Result<String> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| Error::upstream(format!("response is not JSON: {e}")))?;

    ["reply", "response"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .ok_or_else(|| Error::upstream("response has neither 'reply' nor 'response'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_uses_message_field_by_default() {
        let body = build_body(PromptField::default(), "سلام");
        assert_eq!(body, serde_json::json!({ "message": "سلام" }));
    }

    #[test]
    fn test_body_uses_prompt_field() {
        let body = build_body(PromptField::Prompt, "hi");
        assert_eq!(body, serde_json::json!({ "prompt": "hi" }));
    }

    #[test]
    fn test_parse_reply_field() {
        assert_eq!(parse_reply_body(r#"{"reply":"سلام دوست من"}"#).unwrap(), "سلام دوست من");
    }

    #[test]
    fn test_parse_response_field() {
        assert_eq!(parse_reply_body(r#"{"response":"ok"}"#).unwrap(), "ok");
    }

    #[test]
    fn test_reply_preferred_over_response() {
        assert_eq!(
            parse_reply_body(r#"{"response":"b","reply":"a"}"#).unwrap(),
            "a"
        );
    }

    #[test]
    fn test_missing_reply_is_upstream_failure() {
        let err = parse_reply_body(r#"{"error":"quota"}"#).unwrap_err();
        assert!(matches!(err, Error::UpstreamFailure { .. }));
    }

    #[test]
    fn test_non_string_reply_is_upstream_failure() {
        let err = parse_reply_body(r#"{"reply":42}"#).unwrap_err();
        assert!(matches!(err, Error::UpstreamFailure { .. }));
    }

    #[test]
    fn test_non_json_is_upstream_failure() {
        let err = parse_reply_body("<html>502</html>").unwrap_err();
        assert!(matches!(err, Error::UpstreamFailure { .. }));
    }

    #[test]
    fn test_prompt_field_from_str() {
        assert_eq!("prompt".parse::<PromptField>().unwrap(), PromptField::Prompt);
        assert_eq!(" Message ".parse::<PromptField>().unwrap(), PromptField::Message);
        assert!("query".parse::<PromptField>().is_err());
    }

    #[test]
    fn test_prompt_field_serde_lowercase() {
        let field: PromptField = serde_json::from_str("\"prompt\"").unwrap();
        assert_eq!(field, PromptField::Prompt);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_upstream_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = PromptClient::new(format!("http://{addr}/chat"), PromptField::Message);
        let err = ReplyBackend::ask(&client, "hi").await.unwrap_err();
        assert!(matches!(err, Error::UpstreamFailure { .. }));
    }
}
