//! Shared API request/response types
//!
//! JSON field names follow the browser client's camelCase convention.

use serde::{Deserialize, Serialize};

// ========================================
// Authentication Types
// ========================================

/// Body of `POST /api/login`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// ========================================
// Success Response Types
// ========================================

/// `{ "success": true }` acknowledgement for mutations
///
/// Mutations that choose a filename on the caller's behalf (copy, rename,
/// marker save) report it in `trackName`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            track_name: None,
            message: None,
        }
    }

    pub fn with_track(track_name: impl Into<String>) -> Self {
        Self {
            track_name: Some(track_name.into()),
            ..Self::ok()
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok()
        }
    }
}

// ========================================
// Error Response Types
// ========================================

/// Error body returned by every failing endpoint
///
/// # Examples
///
/// ```
/// use cuedeck_common::api::types::ErrorResponse;
///
/// let body = ErrorResponse::new("NOT_FOUND", "Scene not found");
/// let json = serde_json::to_value(&body).unwrap();
/// assert_eq!(json["error"]["code"], "NOT_FOUND");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error code and human-readable message
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorDetail {
    /// Error type identifier
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

// ========================================
// Tests
// ========================================
