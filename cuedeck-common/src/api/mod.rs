//! API module for shared HTTP API functionality
//!
//! Provides session authentication primitives and the request/response
//! types exchanged with the browser client.
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Shared types
//!
//! The server crate wraps these with Axum extractors and middleware.

pub mod auth;
pub mod types;

pub use auth::{check_credentials, SessionError, SessionToken, SESSION_COOKIE_NAME};
pub use types::{ErrorDetail, ErrorResponse, LoginRequest, SuccessResponse};
