use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

/// Why a round-trip did not produce a reply
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("rate limited by the chat backend")]
    RateLimited,
    #[error("chat backend returned status {0}")]
    Status(StatusCode),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The three ways a round-trip can end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Reply(String),
    RateLimited,
    /// Any other failure; the reason is only logged, never shown
    Failed(String),
}

impl From<Result<String, ChatError>> for Outcome {
    fn from(result: Result<String, ChatError>) -> Self {
        match result {
            Ok(text) => Outcome::Reply(text),
            Err(ChatError::RateLimited) => Outcome::RateLimited,
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }
}

/// Client for the `POST /chat` endpoint
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ChatError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat", self.base_url)
    }

    pub async fn send(&self, message: &str) -> Result<String, ChatError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(&ChatRequest { message })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ChatError::RateLimited);
        }
        if !status.is_success() {
            return Err(ChatError::Status(status));
        }

        let body = response.text().await?;
        let chat_response: ChatResponse = serde_json::from_str(&body)?;
        Ok(chat_response.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_path() {
        let client = ChatClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8000/chat");
    }

    #[test]
    fn test_outcome_mapping() {
        assert_eq!(Outcome::from(Ok("Hi".to_string())), Outcome::Reply("Hi".to_string()));
        assert_eq!(Outcome::from(Err(ChatError::RateLimited)), Outcome::RateLimited);
        assert!(matches!(
            Outcome::from(Err(ChatError::Status(StatusCode::INTERNAL_SERVER_ERROR))),
            Outcome::Failed(reason) if reason.contains("500")
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(ChatRequest { message: "hello" }).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "hello" }));
    }
}
