//! # CueDeck Common Library
//!
//! Shared code for the CueDeck service including:
//! - Error types
//! - Bootstrap configuration loading
//! - Session authentication primitives
//! - Trim-marker filename grammar
//! - Natural ordering for scene names
//! - Audio media-type tables

pub mod api;
pub mod config;
pub mod error;
pub mod markers;
pub mod media;
pub mod natural;

pub use error::{Error, Result};
pub use markers::TrimMarkers;
