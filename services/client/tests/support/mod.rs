//! An in-process stand-in for the remote document API.
//!
//! Mirrors the real service: JWT bearer tokens carrying `sub` and `exp`,
//! per-user `{user}_{n}` document ids, `.pdf`-only uploads and FastAPI-style
//! `{"detail": ...}` error bodies.

#![allow(dead_code)]

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use chrono::{Duration, Utc};
use client_lib::cli::AppState;
use client_lib::config::Config;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Inner {
    users: HashMap<String, String>,
    issued: HashMap<String, String>,
    pdfs: HashMap<String, Vec<(String, String, String)>>,
}

#[derive(Default)]
pub struct FakeApi {
    inner: Mutex<Inner>,
    requests: AtomicUsize,
}

impl FakeApi {
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Forgets every issued token, as a restarted server would.
    pub fn revoke_all_tokens(&self) {
        self.inner.lock().unwrap().issued.clear();
    }

    pub fn issue_token(&self, username: &str, expires_in: Duration) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let exp = (Utc::now() + expires_in).timestamp();
        let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": username, "exp": exp }).to_string());
        let token = format!("{header}.{payload}.test-signature");
        self.inner
            .lock()
            .unwrap()
            .issued
            .insert(token.clone(), username.to_string());
        token
    }

    fn hit(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn user_for(&self, headers: &HeaderMap) -> Result<String, Response> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Not authenticated"))?;
        self.inner
            .lock()
            .unwrap()
            .issued
            .get(token)
            .cloned()
            .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Invalid token"))
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

#[derive(Deserialize)]
struct UserBody {
    username: String,
    password: String,
}

async fn register(State(api): State<Arc<FakeApi>>, Json(body): Json<UserBody>) -> Response {
    api.hit();
    let mut inner = api.inner.lock().unwrap();
    if inner.users.contains_key(&body.username) {
        return detail(StatusCode::BAD_REQUEST, "Username already exists");
    }
    inner.users.insert(body.username, body.password);
    Json(json!({ "message": "User registered successfully" })).into_response()
}

async fn token(State(api): State<Arc<FakeApi>>, Form(body): Form<UserBody>) -> Response {
    api.hit();
    let known = api.inner.lock().unwrap().users.get(&body.username).cloned();
    match known {
        Some(password) if password == body.password => {
            let access_token = api.issue_token(&body.username, Duration::hours(24));
            Json(json!({ "access_token": access_token, "token_type": "bearer" })).into_response()
        }
        _ => detail(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn upload_pdf(
    State(api): State<Arc<FakeApi>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    api.hit();
    let user = match api.user_for(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let mut upload = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        match field.bytes().await {
            Ok(bytes) => upload = Some((filename, bytes)),
            Err(_) => return detail(StatusCode::BAD_REQUEST, "Unreadable upload"),
        }
    }
    let Some((filename, bytes)) = upload else {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "Field required");
    };
    if !filename.ends_with(".pdf") {
        return detail(StatusCode::BAD_REQUEST, "Only PDF files are allowed");
    }

    let mut inner = api.inner.lock().unwrap();
    let docs = inner.pdfs.entry(user.clone()).or_default();
    let pdf_id = format!("{}_{}", user, docs.len());
    docs.push((pdf_id.clone(), filename, STANDARD.encode(&bytes)));
    Json(json!({ "message": "PDF uploaded successfully", "pdf_id": pdf_id })).into_response()
}

async fn list_pdfs(State(api): State<Arc<FakeApi>>, headers: HeaderMap) -> Response {
    api.hit();
    let user = match api.user_for(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let inner = api.inner.lock().unwrap();
    let listing: Vec<_> = inner
        .pdfs
        .get(&user)
        .map(|docs| {
            docs.iter()
                .map(|(id, filename, _)| json!({ "pdf_id": id, "filename": filename }))
                .collect()
        })
        .unwrap_or_default();
    Json(listing).into_response()
}

async fn get_pdf(
    State(api): State<Arc<FakeApi>>,
    headers: HeaderMap,
    Path(pdf_id): Path<String>,
) -> Response {
    api.hit();
    let user = match api.user_for(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let inner = api.inner.lock().unwrap();
    let found = inner
        .pdfs
        .get(&user)
        .and_then(|docs| docs.iter().find(|(id, _, _)| *id == pdf_id));
    match found {
        // The real service answers without the id.
        Some((_, filename, content)) => {
            Json(json!({ "filename": filename, "content": content })).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "PDF not found"),
    }
}

/// Starts the fake API on an ephemeral port and returns its base URL.
pub async fn spawn_api() -> (Arc<FakeApi>, String) {
    let api = Arc::new(FakeApi::default());
    let app = Router::new()
        .route("/register", post(register))
        .route("/token", post(token))
        .route("/upload-pdf", post(upload_pdf))
        .route("/pdfs", get(list_pdfs))
        .route("/pdf/{pdf_id}", get(get_pdf))
        .with_state(api.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (api, format!("http://{}", addr))
}

pub fn config(api_url: &str, token_path: PathBuf) -> Config {
    Config {
        api_url: client_lib::config::parse_api_url(api_url).unwrap(),
        token_path,
        http_timeout: std::time::Duration::from_secs(5),
        log_filter: "debug".to_string(),
    }
}

/// A fresh client process pointed at `api_url`, sharing the token file in `dir`.
pub fn client(api_url: &str, dir: &tempfile::TempDir) -> AppState {
    AppState::new(config(api_url, dir.path().join("session.json"))).unwrap()
}
