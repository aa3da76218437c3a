//! cuedeck-server library
//!
//! HTTP backend for organizing theatre sound cues stored as plain
//! directories: versions, scenes, tags and tracks.

use axum::Router;
use cuedeck_common::api::auth::generate_session_secret;
use cuedeck_common::config::ServerConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

pub mod api;
pub mod error;
pub mod store;

use api::SessionSettings;
use store::{MusicStore, VersionLocks};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Music root
    pub store: Arc<MusicStore>,
    /// Per-version mutation locks
    pub locks: VersionLocks,
    /// `None` disables authentication
    pub sessions: Option<Arc<SessionSettings>>,
    /// Description sheet candidates, in lookup order
    pub description_csvs: Arc<Vec<PathBuf>>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        store: MusicStore,
        sessions: Option<SessionSettings>,
        description_csvs: Vec<PathBuf>,
    ) -> Self {
        Self {
            store: Arc::new(store),
            locks: VersionLocks::new(),
            sessions: sessions.map(Arc::new),
            description_csvs: Arc::new(description_csvs),
        }
    }

    /// State for a resolved configuration
    ///
    /// Without `SESSION_SECRET` a random secret is generated, so sessions
    /// do not survive a restart.
    pub fn from_config(config: &ServerConfig) -> Self {
        let sessions = config.credentials.clone().map(|credentials| {
            let secret = match &config.session_secret {
                Some(secret) => secret.clone(),
                None => {
                    warn!("SESSION_SECRET not set, generated a random one (sessions end on restart)");
                    generate_session_secret()
                }
            };
            info!("Authentication enabled for user {}", credentials.username);
            SessionSettings {
                credentials,
                secret,
                ttl_secs: config.session_ttl_secs,
                secure_cookie: config.secure_cookie,
            }
        });

        if sessions.is_none() {
            info!("API authentication disabled (USERNAME/PASSWORD not set)");
        }

        Self::new(
            MusicStore::new(config.music_root.clone()),
            sessions,
            config.description_csv_candidates(),
        )
    }
}

/// Build application router
///
/// `/health`, `/api/buildinfo`, `/api/login` and `/api/logout` are public;
/// everything else under `/api` requires a session when auth is enabled.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    // Protected routes (require authentication)
    let protected = Router::new()
        .route(
            "/api/versions",
            get(api::list_versions).post(api::create_version),
        )
        .route("/api/versions/latest", get(api::latest_version))
        .route("/api/scenes", get(api::list_scenes))
        .route("/api/move-track", put(api::move_track))
        .route("/api/copy-track", post(api::copy_track))
        .route("/api/create-tag", post(api::create_tag))
        .route("/api/rename-track", put(api::rename_track))
        .route("/api/save-markers", put(api::save_markers))
        .route("/api/reorder-tracks", put(api::reorder_tracks))
        .route("/api/select-track", put(api::select_track))
        .route(
            "/api/music/*path",
            get(api::serve_music).fallback(api::music::method_not_allowed),
        )
        .route("/api/descriptions", get(api::get_descriptions))
        .route("/api/descriptions/csv", get(api::get_descriptions_csv))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/api/login", post(api::login))
        .route("/api/logout", post(api::logout))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    // Combine routers
    Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
