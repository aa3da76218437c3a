//! Session authentication for cuedeck-server
//!
//! `/api/login` issues a signed `session` cookie; the middleware verifies it
//! on every protected route. With no credentials configured the middleware
//! lets everything through.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use cuedeck_common::api::auth::{
    check_credentials, cookie_value, expired_session_cookie, session_cookie,
};
use cuedeck_common::api::{LoginRequest, SessionToken, SuccessResponse, SESSION_COOKIE_NAME};
use cuedeck_common::config::Credentials;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Settings needed to issue and verify sessions
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub credentials: Credentials,
    pub secret: String,
    pub ttl_secs: i64,
    pub secure_cookie: bool,
}

/// Authentication middleware
///
/// Rejects requests without a valid session cookie with 401. Preflight
/// `OPTIONS` requests are never challenged.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(settings) = state.sessions.as_deref() else {
        return Ok(next.run(request).await);
    };
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let token = session_from_headers(request.headers())
        .ok_or_else(|| ApiError::Unauthenticated("Authentication required".to_string()))?;

    let session = SessionToken::decode(token, &settings.secret, settings.ttl_secs).map_err(|e| {
        debug!("Rejected session: {}", e);
        ApiError::Unauthenticated("Session invalid or expired".to_string())
    })?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Session cookie from any `Cookie` header of the request
fn session_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| cookie_value(value, SESSION_COOKIE_NAME))
        .filter(|token| !token.is_empty())
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, axum::extract::rejection::JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload?;

    let Some(settings) = state.sessions.as_deref() else {
        return Ok(Json(SuccessResponse::with_message("Authentication disabled")).into_response());
    };

    if request.username.is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    if !check_credentials(&request.username, &request.password, &settings.credentials) {
        warn!("Failed login attempt for user {:?}", request.username);
        return Err(ApiError::Unauthenticated("Invalid credentials".to_string()));
    }

    let token = SessionToken::new(request.username.as_str()).encode(&settings.secret);
    info!("User {} logged in", request.username);

    Ok((
        [(
            header::SET_COOKIE,
            session_cookie(&token, settings.ttl_secs, settings.secure_cookie),
        )],
        Json(SuccessResponse::with_message("Login successful")),
    )
        .into_response())
}

/// POST /api/logout
pub async fn logout(State(state): State<AppState>) -> Response {
    let secure = state
        .sessions
        .as_deref()
        .map(|settings| settings.secure_cookie)
        .unwrap_or(false);

    (
        [(header::SET_COOKIE, expired_session_cookie(secure))],
        Json(SuccessResponse::ok()),
    )
        .into_response()
}
