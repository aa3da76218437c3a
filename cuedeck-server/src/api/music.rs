//! Audio file serving with byte-range support
//!
//! `GET /api/music/<path>` streams a file below the music root. A single
//! `Range: bytes=...` request answers 206 so browsers can seek.

use axum::{
    body::Body,
    extract::{Path as UrlPath, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use cuedeck_common::media::content_type_for;
use std::io::SeekFrom;
use std::path::{Component, Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Inclusive byte range within a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn byte_count(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Parse a `Range` header against a file of `size` bytes
///
/// Supports `bytes=a-b`, `bytes=a-` and `bytes=-n`. An end past the file is
/// clamped. Anything else, including multiple ranges, is unsatisfiable.
pub fn parse_range(value: &str, size: u64) -> Option<ByteRange> {
    let ranges = value.trim().strip_prefix("bytes=")?.trim();
    if ranges.contains(',') || size == 0 {
        return None;
    }
    let (start, end) = ranges.split_once('-')?;
    let (start, end) = (start.trim(), end.trim());

    let last = size - 1;
    let range = if start.is_empty() {
        let suffix: u64 = end.parse().ok()?;
        if suffix == 0 {
            return None;
        }
        ByteRange {
            start: size.saturating_sub(suffix),
            end: last,
        }
    } else {
        let start: u64 = start.parse().ok()?;
        let end = if end.is_empty() {
            last
        } else {
            end.parse::<u64>().ok()?.min(last)
        };
        ByteRange { start, end }
    };

    (range.start <= range.end && range.start < size).then_some(range)
}

/// Lexically resolve a request path below `root`
///
/// Only plain components are accepted; `..`, absolute paths and drive
/// prefixes are refused.
fn resolve_request_path(root: &Path, requested: &str) -> ApiResult<PathBuf> {
    let invalid = || ApiError::InvalidPath(format!("Invalid path: {}", requested));

    if requested.contains('\0') || requested.contains('\\') {
        return Err(invalid());
    }

    let mut resolved = root.to_path_buf();
    let mut depth = 0;
    for component in Path::new(requested).components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(invalid())
            }
        }
    }
    if depth == 0 {
        return Err(invalid());
    }
    Ok(resolved)
}

/// GET /api/music/*path
pub async fn serve_music(
    State(state): State<AppState>,
    UrlPath(requested): UrlPath<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let root = state.store.root().to_path_buf();
    let file_path = resolve_request_path(&root, &requested)?;

    let metadata = match tokio::fs::metadata(&file_path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!("File not found: {}", requested)))
        }
        Err(e) => return Err(e.into()),
    };
    if metadata.is_dir() {
        return Err(ApiError::InvalidPath(format!("Not a file: {}", requested)));
    }

    // Symlinks may still point outside the root
    let canonical_root = tokio::fs::canonicalize(&root).await?;
    let canonical_file = tokio::fs::canonicalize(&file_path).await?;
    if !canonical_file.starts_with(&canonical_root) {
        warn!("Refused path outside music root: {}", requested);
        return Err(ApiError::InvalidPath(format!("Invalid path: {}", requested)));
    }

    let size = metadata.len();
    let content_type = HeaderValue::from_static(content_type_for(&file_path));
    let mut file = tokio::fs::File::open(&canonical_file).await?;

    let range_header = headers
        .get(header::RANGE)
        .map(|value| value.to_str().unwrap_or_default());

    let Some(range_header) = range_header else {
        debug!("Serving {} ({} bytes)", requested, size);
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CONTENT_LENGTH, size)
            .header(header::ACCEPT_RANGES, "bytes")
            .body(Body::from_stream(ReaderStream::new(file)))
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        return Ok(response);
    };

    let range = parse_range(range_header, size).ok_or(ApiError::RangeNotSatisfiable { size })?;
    debug!(
        "Serving {} bytes {}-{}/{}",
        requested, range.start, range.end, size
    );

    file.seek(SeekFrom::Start(range.start)).await?;
    let body = Body::from_stream(ReaderStream::new(file.take(range.byte_count())));

    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, range.byte_count())
        .header(
            header::CONTENT_RANGE,
            format!("bytes {}-{}/{}", range.start, range.end, size),
        )
        .header(header::ACCEPT_RANGES, "bytes")
        .body(body)
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// Any non-GET method on `/api/music/*`
pub async fn method_not_allowed() -> impl IntoResponse {
    ApiError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_forms() {
        assert_eq!(
            parse_range("bytes=0-99", 1000),
            Some(ByteRange { start: 0, end: 99 })
        );
        assert_eq!(
            parse_range("bytes=900-", 1000),
            Some(ByteRange { start: 900, end: 999 })
        );
        assert_eq!(
            parse_range("bytes=-100", 1000),
            Some(ByteRange { start: 900, end: 999 })
        );
        // End clamped to the last byte
        assert_eq!(
            parse_range("bytes=500-5000", 1000),
            Some(ByteRange { start: 500, end: 999 })
        );
        // Suffix longer than the file covers all of it
        assert_eq!(
            parse_range("bytes=-5000", 1000),
            Some(ByteRange { start: 0, end: 999 })
        );
    }

    #[test]
    fn test_parse_range_unsatisfiable() {
        assert_eq!(parse_range("bytes=1000-", 1000), None);
        assert_eq!(parse_range("bytes=50-10", 1000), None);
        assert_eq!(parse_range("bytes=-0", 1000), None);
        assert_eq!(parse_range("bytes=0-1,5-6", 1000), None);
        assert_eq!(parse_range("items=0-1", 1000), None);
        assert_eq!(parse_range("bytes=abc", 1000), None);
        assert_eq!(parse_range("bytes=0-", 0), None);
    }

    #[test]
    fn test_byte_range_byte_count() {
        assert_eq!(ByteRange { start: 10, end: 10 }.byte_count(), 1);
        assert_eq!(ByteRange { start: 0, end: 99 }.byte_count(), 100);
    }

    #[test]
    fn test_resolve_request_path() {
        let root = Path::new("/srv/music");
        assert_eq!(
            resolve_request_path(root, "ver1/Scene 1/a.mp3").unwrap(),
            PathBuf::from("/srv/music/ver1/Scene 1/a.mp3")
        );
        for bad in ["../etc/passwd", "ver1/../../etc/passwd", "/etc/passwd", "", "a\\..\\b"] {
            assert!(
                matches!(resolve_request_path(root, bad), Err(ApiError::InvalidPath(_))),
                "{:?}",
                bad
            );
        }
    }
}
