//! Save/load operations against the remote code API.
//!
//! Both endpoints take a `method` form field plus an `arguments` field
//! holding a JSON-encoded object.

use serde::Serialize;
use serde_json::Value;

use super::http::HttpClient;
use crate::config::Config;
use crate::error::ApiError;

/// `method` value for the save endpoint.
pub const SAVE_METHOD: &str = "save_code";

/// `method` value for the load endpoint.
pub const LOAD_METHOD: &str = "load_code";

/// Code to store in a slot.
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    /// Logical code name.
    pub name: &'a str,
    /// Target slot.
    pub slot: u32,
    /// File contents.
    pub code: &'a str,
}

/// Slot to read back after an upload.
#[derive(Debug, Clone, Copy)]
pub struct VerifyRequest {
    /// Slot to load.
    pub slot: u32,
}

#[derive(Serialize)]
struct SaveArguments<'a> {
    code: &'a str,
    slot: String,
    name: &'a str,
    log: u8,
}

// The load endpoint addresses code by slot number passed as `name`.
#[derive(Serialize)]
struct LoadArguments {
    name: String,
    run: &'static str,
    log: u8,
}

impl UploadRequest<'_> {
    /// Form fields for the save call.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments cannot be encoded as JSON.
    pub fn form(&self) -> serde_json::Result<[(&'static str, String); 2]> {
        let arguments = SaveArguments {
            code: self.code,
            slot: self.slot.to_string(),
            name: self.name,
            log: 1,
        };
        envelope(SAVE_METHOD, &arguments)
    }
}

impl VerifyRequest {
    /// Form fields for the load call.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments cannot be encoded as JSON.
    pub fn form(&self) -> serde_json::Result<[(&'static str, String); 2]> {
        let arguments = LoadArguments {
            name: self.slot.to_string(),
            run: "",
            log: 1,
        };
        envelope(LOAD_METHOD, &arguments)
    }
}

fn envelope<T: Serialize>(
    method: &str,
    arguments: &T,
) -> serde_json::Result<[(&'static str, String); 2]> {
    Ok([
        ("method", method.to_string()),
        ("arguments", serde_json::to_string(arguments)?),
    ])
}

/// Client for the save and load endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
    save_url: String,
    verify_url: String,
}

impl ApiClient {
    /// Create a client from the process configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &Config) -> std::result::Result<Self, ApiError> {
        Ok(Self {
            http: HttpClient::new(config)?,
            save_url: config.save_url(),
            verify_url: config.verify_url(),
        })
    }

    /// Save code into a slot and return the raw response text.
    ///
    /// Plain-text replies are accepted; only a JSON `message` containing
    /// "not found" counts as a rejection.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or rejection.
    pub async fn upload(&self, request: &UploadRequest<'_>) -> std::result::Result<String, ApiError> {
        let form = request
            .form()
            .map_err(|e| ApiError::Network(format!("cannot encode arguments: {e}")))?;

        let response = self
            .http
            .post_form(&self.save_url, &form)
            .await?
            .error_for_status()?;

        if is_not_found(&response.body) {
            return Err(ApiError::rejected(&response.body));
        }

        Ok(response.body)
    }

    /// Load a slot's code back from the server.
    ///
    /// Returns `None` when the call fails or the reply holds no code.
    pub async fn verify(&self, request: VerifyRequest) -> Option<String> {
        let form = request.form().ok()?;

        match self.http.post_form(&self.verify_url, &form).await {
            Ok(response) if response.success => extract_code(&response.body),
            Ok(response) => {
                tracing::debug!(status = response.status, slot = request.slot, "Load call failed");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, slot = request.slot, "Load call failed");
                None
            }
        }
    }
}

fn is_not_found(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(str::to_lowercase))
        .is_some_and(|message| message.contains("not found"))
}

/// Pull code out of a load response.
///
/// Accepted shapes, first match wins: a bare JSON string, `{"code": ..}`,
/// an array with an element carrying `code`, `{"result": {"code": ..}}`.
#[must_use]
pub fn extract_code(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    if let Value::String(code) = value {
        return Some(code);
    }

    if let Some(code) = value.get("code").and_then(Value::as_str) {
        return Some(code.to_string());
    }

    if let Value::Array(items) = &value {
        if let Some(code) = items
            .iter()
            .find_map(|item| item.get("code").and_then(Value::as_str))
        {
            return Some(code.to_string());
        }
    }

    value
        .get("result")
        .and_then(|result| result.get("code"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
