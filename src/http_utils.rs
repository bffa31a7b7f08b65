//! HTTP client for the bug API.
//!
//! [`BugApiClient`] is the remote-service face of the API layer: one method
//! per operation, each decoding the response envelope and surfacing failures
//! as [`ApiClientError`]. The client never panics on a bad response; the
//! caller decides how to present the failure (see
//! [`resolve_message`] for the message resolution order the tracker uses).

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

use crate::api::ApiResponse;
use crate::validate::FieldError;
use crate::{Bug, BugDraft, BugId, BugPatch};

/// Failure modes of an API call.
#[derive(Debug)]
pub enum ApiClientError {
    /// The server answered with a structured error envelope.
    Api {
        /// The envelope's error message.
        message: String,
        /// The envelope's mirrored status code.
        status: u16,
        /// Per-field validation details, when present.
        errors: Option<Vec<FieldError>>,
    },
    /// The request never produced a usable response.
    Transport(reqwest::Error),
    /// The response body was not a well-formed envelope.
    Decode {
        /// The transport status code of the unparseable response.
        status: u16,
    },
}

impl fmt::Display for ApiClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api { message, status, .. } => write!(f, "{} (HTTP {})", message, status),
            Self::Transport(e) => write!(f, "{}", e),
            Self::Decode { status } => {
                write!(f, "unparseable response from server (HTTP {})", status)
            }
        }
    }
}

impl std::error::Error for ApiClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e)
    }
}

/// Resolves a user-visible message for a failed call.
///
/// Resolution order: the server's structured error message, else the
/// transport-level error text, else the operation-specific fallback.
pub fn resolve_message(error: &ApiClientError, fallback: &str) -> String {
    match error {
        ApiClientError::Api { message, .. } if !message.is_empty() => message.clone(),
        ApiClientError::Transport(e) => e.to_string(),
        _ => fallback.to_string(),
    }
}

/// HTTP client for a bugtrack server.
pub struct BugApiClient {
    client: Client,
    base_url: String,
}

impl BugApiClient {
    /// Creates a client for the given base URL (no `/api` suffix).
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Constructs a full API URL from a path.
    pub fn api_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/api/{}", base, path)
    }

    async fn decode<T>(&self, response: Response) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
    {
        let status = response.status().as_u16();
        let body = response.text().await?;
        let envelope: ApiResponse<T> =
            serde_json::from_str(&body).map_err(|_| ApiClientError::Decode { status })?;
        if let Some(error) = envelope.error {
            return Err(ApiClientError::Api {
                message: error.message,
                status: error.status,
                errors: error.errors,
            });
        }
        envelope.data.ok_or(ApiClientError::Decode { status })
    }

    /// Fetches all bugs, newest first.
    pub async fn list_bugs(&self) -> Result<Vec<Bug>, ApiClientError> {
        let response = self.client.get(self.api_url("bugs")).send().await?;
        self.decode(response).await
    }

    /// Fetches a single bug by identifier.
    pub async fn get_bug(&self, id: &BugId) -> Result<Bug, ApiClientError> {
        let url = self.api_url(&format!("bugs/{}", id));
        let response = self.client.get(url).send().await?;
        self.decode(response).await
    }

    /// Creates a bug from candidate fields and returns the stored record.
    pub async fn create_bug(&self, draft: &BugDraft) -> Result<Bug, ApiClientError> {
        let response = self
            .client
            .post(self.api_url("bugs"))
            .json(draft)
            .send()
            .await?;
        self.decode(response).await
    }

    /// Applies a partial update and returns the updated record.
    pub async fn update_bug(&self, id: &BugId, patch: &BugPatch) -> Result<Bug, ApiClientError> {
        let url = self.api_url(&format!("bugs/{}", id));
        let response = self.client.put(url).json(patch).send().await?;
        self.decode(response).await
    }

    /// Deletes a bug.
    pub async fn delete_bug(&self, id: &BugId) -> Result<(), ApiClientError> {
        let url = self.api_url(&format!("bugs/{}", id));
        let response = self.client.delete(url).send().await?;
        let _: Value = self.decode(response).await?;
        Ok(())
    }
}

/// Runs an API call and exits the process with a contextual message on
/// failure. For CLI use only; library callers handle errors themselves.
pub async fn execute_or_exit<T, F, Fut>(operation: F, context: &str) -> T
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, ApiClientError>>,
{
    match operation().await {
        Ok(result) => result,
        Err(e) => crate::cli_utils::exit_with_error(&format!("{}: {}", context, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_joins_cleanly() {
        let client = BugApiClient::new("http://localhost:5000".to_string());
        assert_eq!(client.api_url("bugs"), "http://localhost:5000/api/bugs");
        assert_eq!(client.api_url("/bugs"), "http://localhost:5000/api/bugs");

        let client = BugApiClient::new("http://localhost:5000/".to_string());
        assert_eq!(
            client.api_url("bugs/64a1f2c3d4e5f60718293a4b"),
            "http://localhost:5000/api/bugs/64a1f2c3d4e5f60718293a4b"
        );
    }

    #[test]
    fn resolve_message_prefers_server_message() {
        let error = ApiClientError::Api {
            message: "Bug not found".to_string(),
            status: 404,
            errors: None,
        };
        assert_eq!(resolve_message(&error, "Failed to fetch bugs"), "Bug not found");
    }

    #[test]
    fn resolve_message_falls_back_for_empty_and_decode_errors() {
        let error = ApiClientError::Api {
            message: String::new(),
            status: 500,
            errors: None,
        };
        assert_eq!(
            resolve_message(&error, "Failed to fetch bugs"),
            "Failed to fetch bugs"
        );
        let error = ApiClientError::Decode { status: 502 };
        assert_eq!(
            resolve_message(&error, "Failed to create bug"),
            "Failed to create bug"
        );
    }
}
