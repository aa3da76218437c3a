//! Track mutation endpoints
//!
//! Every handler validates its body before touching the filesystem and
//! holds the version lock for the whole operation.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use cuedeck_common::api::SuccessResponse;
use cuedeck_common::TrimMarkers;
use serde::Deserialize;

use super::{lock_version, optional, required, run_blocking};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Body shared by move-track and copy-track
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransferTrackRequest {
    pub source_scene: Option<String>,
    pub target_scene: Option<String>,
    pub track_name: Option<String>,
    pub version: Option<String>,
    pub tag_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTagRequest {
    pub scene: Option<String>,
    pub version: Option<String>,
    pub tag_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenameTrackRequest {
    pub scene: Option<String>,
    pub version: Option<String>,
    pub old_name: Option<String>,
    pub new_name: Option<String>,
    pub tag_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveMarkersRequest {
    pub scene: Option<String>,
    pub version: Option<String>,
    pub track_name: Option<String>,
    pub tag_name: Option<String>,
    /// Whole seconds
    pub start: Option<u32>,
    /// Whole seconds; absent means "to the end"
    pub end: Option<u32>,
}

/// Body shared by reorder-tracks and select-track
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneRequest {
    pub scene: Option<String>,
    pub version: Option<String>,
    pub track_name: Option<String>,
}

struct Transfer {
    version: String,
    source_scene: String,
    target_scene: String,
    track_name: String,
    tag_name: Option<String>,
}

impl TryFrom<TransferTrackRequest> for Transfer {
    type Error = ApiError;

    fn try_from(request: TransferTrackRequest) -> ApiResult<Self> {
        Ok(Self {
            source_scene: required("sourceScene", request.source_scene)?,
            target_scene: required("targetScene", request.target_scene)?,
            track_name: required("trackName", request.track_name)?,
            version: required("version", request.version)?,
            tag_name: optional(request.tag_name),
        })
    }
}

/// PUT /api/move-track
pub async fn move_track(
    State(state): State<AppState>,
    payload: Result<Json<TransferTrackRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Json(request) = payload?;
    let t = Transfer::try_from(request)?;

    let _guard = lock_version(&state, &t.version).await?;
    let store = state.store.clone();
    run_blocking(move || {
        store.move_track(
            &t.version,
            &t.source_scene,
            &t.target_scene,
            &t.track_name,
            t.tag_name.as_deref(),
        )
    })
    .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/copy-track
pub async fn copy_track(
    State(state): State<AppState>,
    payload: Result<Json<TransferTrackRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Json(request) = payload?;
    let t = Transfer::try_from(request)?;

    let _guard = lock_version(&state, &t.version).await?;
    let store = state.store.clone();
    let written = run_blocking(move || {
        store.copy_track(
            &t.version,
            &t.source_scene,
            &t.target_scene,
            &t.track_name,
            t.tag_name.as_deref(),
        )
    })
    .await?;

    Ok(Json(SuccessResponse::with_track(written)))
}

/// POST /api/create-tag
pub async fn create_tag(
    State(state): State<AppState>,
    payload: Result<Json<CreateTagRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Json(request) = payload?;
    let scene = required("scene", request.scene)?;
    let version = required("version", request.version)?;
    let tag_name = required("tagName", request.tag_name)?;

    let _guard = lock_version(&state, &version).await?;
    let store = state.store.clone();
    run_blocking(move || store.create_tag(&version, &scene, &tag_name)).await?;

    Ok(Json(SuccessResponse::ok()))
}

/// PUT /api/rename-track
pub async fn rename_track(
    State(state): State<AppState>,
    payload: Result<Json<RenameTrackRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Json(request) = payload?;
    let scene = required("scene", request.scene)?;
    let version = required("version", request.version)?;
    let old_name = required("oldName", request.old_name)?;
    let new_name = required("newName", request.new_name)?;
    let tag_name = optional(request.tag_name);

    let _guard = lock_version(&state, &version).await?;
    let store = state.store.clone();
    let stored = run_blocking(move || {
        store.rename_track(&version, &scene, &old_name, &new_name, tag_name.as_deref())
    })
    .await?;

    Ok(Json(SuccessResponse::with_track(stored)))
}

/// PUT /api/save-markers
pub async fn save_markers(
    State(state): State<AppState>,
    payload: Result<Json<SaveMarkersRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Json(request) = payload?;
    let scene = required("scene", request.scene)?;
    let version = required("version", request.version)?;
    let track_name = required("trackName", request.track_name)?;
    let tag_name = optional(request.tag_name);
    let start = request
        .start
        .ok_or_else(|| ApiError::BadRequest("Missing required parameter: start".to_string()))?;
    let markers = TrimMarkers::new(start, request.end);

    let _guard = lock_version(&state, &version).await?;
    let store = state.store.clone();
    let stored = run_blocking(move || {
        store.save_markers(&version, &scene, &track_name, tag_name.as_deref(), markers)
    })
    .await?;

    Ok(Json(SuccessResponse::with_track(stored)))
}

/// PUT /api/reorder-tracks
pub async fn reorder_tracks(
    State(state): State<AppState>,
    payload: Result<Json<SceneRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Json(request) = payload?;
    let scene = required("scene", request.scene)?;
    let version = required("version", request.version)?;

    let _guard = lock_version(&state, &version).await?;
    let store = state.store.clone();
    run_blocking(move || store.reorder_tracks(&version, &scene)).await?;

    Ok(Json(SuccessResponse::ok()))
}

/// PUT /api/select-track
pub async fn select_track(
    State(state): State<AppState>,
    payload: Result<Json<SceneRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Json(request) = payload?;
    let scene = required("scene", request.scene)?;
    let version = required("version", request.version)?;
    let track_name = required("trackName", request.track_name)?;

    let _guard = lock_version(&state, &version).await?;
    let store = state.store.clone();
    run_blocking(move || store.select_track(&version, &scene, &track_name)).await?;

    Ok(Json(SuccessResponse::ok()))
}
