#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use baladiya::config::Config;
use baladiya::{routes, schema, AppState};
use sea_orm::{ConnectOptions, Database};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_KEY: &str = "test-secret";
pub const BOUNDARY: &str = "baladiya-test-boundary";

pub struct TestApp {
    pub state: Arc<AppState>,
    pub router: Router,
    pub dir: TempDir,
}

pub fn config(dir: &TempDir) -> Config {
    Config {
        database_url: format!("sqlite://{}?mode=rwc", dir.path().join("cms.sqlite").display()),
        admin_key: ADMIN_KEY.to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        storage_root: dir.path().join("storage"),
        storage_disk: "public".to_string(),
        public_storage_url: "http://localhost:8000/storage".to_string(),
        max_upload_kb: 4096,
    }
}

pub async fn spawn() -> TestApp {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    let mut options = ConnectOptions::new(config.database_url.clone());
    options.max_connections(1).sqlx_logging(false);
    let database = Database::connect(options).await.unwrap();
    schema::migrate(&database).await.unwrap();

    let state = Arc::new(AppState::new(database, config).unwrap());
    TestApp::with_state(state, dir)
}

impl TestApp {
    pub fn with_state(state: Arc<AppState>, dir: TempDir) -> TestApp {
        let router = routes::router(state.clone());
        TestApp { state, router, dir }
    }

    pub fn storage(&self) -> PathBuf {
        self.dir.path().join("storage")
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, false).body(Body::empty()).unwrap())
            .await
    }

    pub async fn json(&self, method: Method, uri: &str, body: Value, admin: bool) -> (StatusCode, Value) {
        let request = request(method, uri, admin)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn delete(&self, uri: &str, admin: bool) -> (StatusCode, Value) {
        self.send(request(Method::DELETE, uri, admin).body(Body::empty()).unwrap())
            .await
    }

    pub async fn multipart(&self, uri: &str, parts: &[Part], admin: bool) -> (StatusCode, Value) {
        let request = request(Method::POST, uri, admin)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.send(request).await
    }
}

fn request(method: Method, uri: &str, admin: bool) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    if admin {
        builder.header(AUTHORIZATION, format!("Bearer {ADMIN_KEY}"))
    } else {
        builder
    }
}

pub enum Part {
    Text(&'static str, String),
    File {
        name: &'static str,
        file_name: &'static str,
        content_type: &'static str,
        data: Vec<u8>,
    },
}

pub fn text(name: &'static str, value: &str) -> Part {
    Part::Text(name, value.to_string())
}

pub fn png(name: &'static str, file_name: &'static str) -> Part {
    Part::File {
        name,
        file_name,
        content_type: "image/png",
        data: file_name.as_bytes().to_vec(),
    }
}

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
