//! Scene listing endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::{required, run_blocking};
use crate::error::ApiResult;
use crate::store::SceneEntry;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ScenesQuery {
    pub version: Option<String>,
}

/// GET /api/scenes?version=V
pub async fn list_scenes(
    State(state): State<AppState>,
    Query(query): Query<ScenesQuery>,
) -> ApiResult<Json<Vec<SceneEntry>>> {
    let version = required("version", query.version)?;
    let store = state.store.clone();
    let scenes = run_blocking(move || store.list_scenes(&version)).await?;
    Ok(Json(scenes))
}
