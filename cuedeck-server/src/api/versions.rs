//! Version snapshot endpoints

use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};

use super::{lock_version, optional, run_blocking};
use crate::error::{ApiError, ApiResult};
use crate::store::BASE_VERSION;
use crate::AppState;

/// Body of `POST /api/versions`; may be empty
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVersionRequest {
    #[serde(default)]
    pub from_version: Option<String>,
}

/// Name of a version
#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}

/// GET /api/versions
pub async fn list_versions(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let store = state.store.clone();
    let versions = run_blocking(move || store.list_versions()).await?;
    Ok(Json(versions))
}

/// GET /api/versions/latest
pub async fn latest_version(State(state): State<AppState>) -> ApiResult<Json<VersionResponse>> {
    let store = state.store.clone();
    let version = run_blocking(move || store.latest_version()).await?;
    Ok(Json(VersionResponse { version }))
}

/// POST /api/versions
///
/// Copies `fromVersion` (default `base`) to the next `ver<N>`.
pub async fn create_version(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<VersionResponse>> {
    let request: CreateVersionRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateVersionRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?
    };
    let from_version = optional(request.from_version).unwrap_or_else(|| BASE_VERSION.to_string());

    let _guard = lock_version(&state, &from_version).await?;
    let store = state.store.clone();
    let version = run_blocking(move || store.create_version(&from_version)).await?;

    Ok(Json(VersionResponse { version }))
}
