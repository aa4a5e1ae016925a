//! Remote code API client.
//!
//! This module provides:
//! - A form-posting HTTP client carrying the `auth` cookie
//! - The save and load operations with response interpretation

mod api;
mod http;

pub use api::{extract_code, ApiClient, UploadRequest, VerifyRequest, LOAD_METHOD, SAVE_METHOD};
pub use http::{HttpClient, HttpResponse, ACCEPT_JSON, FORM_URLENCODED};
