//! HTTP API handlers for cuedeck-server

pub mod auth;
pub mod buildinfo;
pub mod descriptions;
pub mod health;
pub mod music;
pub mod scenes;
pub mod tracks;
pub mod versions;

pub use auth::{auth_middleware, login, logout, SessionSettings};
pub use buildinfo::get_build_info;
pub use descriptions::{get_descriptions, get_descriptions_csv};
pub use health::health_routes;
pub use music::serve_music;
pub use scenes::list_scenes;
pub use tracks::{
    copy_track, create_tag, move_track, rename_track, reorder_tracks, save_markers, select_track,
};
pub use versions::{create_version, latest_version, list_versions};

use tokio::sync::OwnedMutexGuard;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Run synchronous store work on the blocking pool
pub(crate) async fn run_blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> cuedeck_common::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("Blocking task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// A required request field: present and non-empty
pub(crate) fn required(field: &str, value: Option<String>) -> ApiResult<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing required parameter: {}", field)))
}

/// Optional field where an empty string means absent
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Resolve `version` on disk, then take its mutation lock
///
/// Unknown or malformed versions fail before a lock entry is created.
pub(crate) async fn lock_version(
    state: &AppState,
    version: &str,
) -> ApiResult<OwnedMutexGuard<()>> {
    let store = state.store.clone();
    let name = version.to_string();
    run_blocking(move || store.version_dir(&name)).await?;
    Ok(state.locks.lock(version).await)
}
