//! Test helpers for cuedeck-server integration tests
//!
//! `TestMusic` owns a temporary music root and builds routers over it.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use cuedeck_common::config::Credentials;
use cuedeck_server::api::SessionSettings;
use cuedeck_server::store::MusicStore;
use cuedeck_server::{build_router, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const TEST_USER: &str = "stage";
pub const TEST_PASSWORD: &str = "manager";
pub const TEST_SECRET: &str = "test-session-secret";

/// Temporary show directory: `<tmp>/music` plus room for the CSV sheet
pub struct TestMusic {
    dir: TempDir,
}

impl TestMusic {
    /// Empty music root with a `base` version
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        fs::create_dir_all(dir.path().join("music/base")).unwrap();
        Self { dir }
    }

    /// The standard fixture used by most tests
    ///
    /// ```text
    /// base/Scene 1/intro.mp3
    /// base/Scene 1/select/{cueA.mp3, cueB.mp3}
    /// base/Scene 1/selected/cueC.mp3
    /// base/Scene 2/storm_from_5s_to_30s.wav
    /// base/Scene 10/
    /// ```
    pub fn show() -> Self {
        let music = Self::new();
        music.touch("base/Scene 1/intro.mp3", b"intro");
        music.touch("base/Scene 1/select/cueA.mp3", b"A");
        music.touch("base/Scene 1/select/cueB.mp3", b"B");
        music.touch("base/Scene 1/selected/cueC.mp3", b"C");
        music.touch("base/Scene 2/storm_from_5s_to_30s.wav", b"storm");
        music.mkdir("base/Scene 10");
        music
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("music")
    }

    /// Directory containing the music root
    pub fn show_dir(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn touch(&self, relative: &str, contents: &[u8]) {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    pub fn mkdir(&self, relative: &str) {
        fs::create_dir_all(self.root().join(relative)).unwrap();
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.root().join(relative).exists()
    }

    pub fn read(&self, relative: &str) -> Vec<u8> {
        fs::read(self.root().join(relative)).unwrap()
    }

    /// Sorted names of the entries in a directory below the root
    pub fn list(&self, relative: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.root().join(relative))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    pub fn store(&self) -> MusicStore {
        MusicStore::new(self.root())
    }

    fn csv_candidates(&self) -> Vec<PathBuf> {
        vec![
            self.show_dir().join("Music - list 2.csv"),
            self.show_dir().join("music_tracks.csv"),
        ]
    }

    /// State with authentication disabled
    pub fn state(&self) -> AppState {
        AppState::new(self.store(), None, self.csv_candidates())
    }

    /// Router with authentication disabled
    pub fn app(&self) -> Router {
        build_router(self.state())
    }

    /// Router requiring a session for `TEST_USER` / `TEST_PASSWORD`
    pub fn app_with_auth(&self) -> Router {
        let sessions = SessionSettings {
            credentials: Credentials {
                username: TEST_USER.to_string(),
                password: TEST_PASSWORD.to_string(),
            },
            secret: TEST_SECRET.to_string(),
            ttl_secs: 3600,
            secure_cookie: false,
        };
        build_router(AppState::new(
            self.store(),
            Some(sessions),
            self.csv_candidates(),
        ))
    }
}

/// Request without a body
pub fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Request with a JSON body
pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Extract raw body bytes from response
pub async fn extract_bytes(body: Body) -> Vec<u8> {
    body.collect()
        .await
        .expect("Should read body")
        .to_bytes()
        .to_vec()
}
