//! Track description sheet endpoints

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use super::run_blocking;
use crate::error::{ApiError, ApiResult};
use crate::store::{find_descriptions_csv, parse_descriptions, TrackDescriptions};
use crate::AppState;

/// Raw sheet bytes, or `None` when no candidate file exists
///
/// Spreadsheet exports are often not UTF-8.
fn read_sheet(candidates: &[std::path::PathBuf]) -> cuedeck_common::Result<Option<Vec<u8>>> {
    match find_descriptions_csv(candidates) {
        Some(path) => Ok(Some(std::fs::read(path)?)),
        None => Ok(None),
    }
}

/// GET /api/descriptions/csv
pub async fn get_descriptions_csv(State(state): State<AppState>) -> ApiResult<Response> {
    let candidates = state.description_csvs.clone();
    let content = run_blocking(move || read_sheet(&candidates))
        .await?
        .ok_or_else(|| ApiError::NotFound("CSV file not found".to_string()))?;

    Ok(([(header::CONTENT_TYPE, "text/csv")], content).into_response())
}

/// GET /api/descriptions
///
/// Empty map when no sheet exists.
pub async fn get_descriptions(
    State(state): State<AppState>,
) -> ApiResult<Json<TrackDescriptions>> {
    let candidates = state.description_csvs.clone();
    let descriptions = run_blocking(move || match read_sheet(&candidates)? {
        Some(content) => parse_descriptions(&String::from_utf8_lossy(&content)),
        None => Ok(TrackDescriptions::new()),
    })
    .await?;
    Ok(Json(descriptions))
}
