//! Form-posting HTTP client with cookie auth and a request timeout.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, COOKIE, REFERER};

use crate::config::Config;
use crate::error::ApiError;

/// `accept` header sent with every request.
pub const ACCEPT_JSON: &str = "application/json, text/javascript, */*; q=0.01";

/// `content-type` header sent with every form body.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Uniform view of an HTTP exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// True for 2xx statuses.
    pub success: bool,
    /// Numeric status code.
    pub status: u16,
    /// Canonical reason phrase, empty when unknown.
    pub status_text: String,
    /// Raw response body.
    pub body: String,
}

impl HttpResponse {
    /// Convert a non-2xx response into a status error.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` when `success` is false.
    pub fn error_for_status(self) -> std::result::Result<Self, ApiError> {
        if self.success {
            Ok(self)
        } else {
            Err(ApiError::Status {
                status: self.status,
                status_text: self.status_text,
                body: self.body,
            })
        }
    }
}

/// HTTP client bound to one server and one credential.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    /// Build a client from the process configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential or base URL cannot be used as a
    /// header value, or the TLS backend fails to initialise.
    pub fn new(config: &Config) -> std::result::Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
        headers.insert(
            REFERER,
            HeaderValue::from_str(&config.base_url)
                .map_err(|e| ApiError::Network(format!("invalid base URL header: {e}")))?,
        );

        let mut cookie = HeaderValue::from_str(&format!("auth={}", config.auth.trim()))
            .map_err(|e| ApiError::Network(format!("invalid auth cookie: {e}")))?;
        cookie.set_sensitive(true);
        headers.insert(COOKIE, cookie);

        let inner = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            inner,
            timeout: config.timeout,
        })
    }

    /// POST a URL-encoded form.
    ///
    /// Non-2xx responses are returned as `HttpResponse { success: false, .. }`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Timeout` if no response arrives in time and
    /// `ApiError::Network` for any other transport failure.
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(&str, String)],
    ) -> std::result::Result<HttpResponse, ApiError> {
        // `RequestBuilder::form` would send the content type without a charset.
        let body = serde_urlencoded::to_string(form)
            .map_err(|e| ApiError::Network(format!("cannot encode form: {e}")))?;

        let response = self
            .inner
            .post(url)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, FORM_URLENCODED)
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(url, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(url, &e))?;

        tracing::debug!(url, status = status.as_u16(), bytes = body.len(), "Response received");

        Ok(HttpResponse {
            success: status.is_success(),
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }

    fn transport_error(&self, url: &str, err: &reqwest::Error) -> ApiError {
        if err.is_timeout() {
            #[allow(clippy::cast_possible_truncation)]
            ApiError::Timeout {
                url: url.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
