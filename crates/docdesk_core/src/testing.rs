//! In-memory fakes of the ports, shared by the unit tests of this crate.

use async_trait::async_trait;
use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use bytes::Bytes;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::domain::{Credentials, DocumentDetail, DocumentSummary};
use crate::ports::{AuthService, DocumentService, PortError, PortResult, TokenStore};
use crate::token::BearerToken;

pub(crate) fn jwt_for(username: &str, expires_in: Duration) -> BearerToken {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let exp = (Utc::now() + expires_in).timestamp();
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{username}","exp":{exp}}}"#));
    BearerToken::new(format!("{header}.{payload}.fake-signature"))
}

#[derive(Default)]
struct FakeState {
    users: HashMap<String, String>,
    documents: HashMap<String, Vec<(String, String, Vec<u8>)>>,
    tokens: HashMap<String, String>,
    fail_next: Option<PortError>,
    fail_next_listing: Option<PortError>,
}

/// Mimics the remote API: `{user}_{n}` ids, 24h JWTs, `{detail}`-style rejections.
#[derive(Default)]
pub(crate) struct FakeRemote {
    state: Mutex<FakeState>,
    requests: AtomicUsize,
    /// Tests hold this lock to keep requests in flight.
    pub(crate) gate: tokio::sync::Mutex<()>,
    /// Like `gate`, but only holds listings.
    pub(crate) listing_gate: tokio::sync::Mutex<()>,
}

impl FakeRemote {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_user(self, username: &str, password: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .users
            .insert(username.to_string(), password.to_string());
        self
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_next(&self, error: PortError) {
        self.state.lock().unwrap().fail_next = Some(error);
    }

    /// Fails the next listing only; other requests are unaffected.
    pub(crate) fn fail_next_listing(&self, error: PortError) {
        self.state.lock().unwrap().fail_next_listing = Some(error);
    }

    pub(crate) fn accept_token(&self, token: &BearerToken, username: &str) {
        self.state
            .lock()
            .unwrap()
            .tokens
            .insert(token.as_str().to_string(), username.to_string());
    }

    pub(crate) fn revoke_all_tokens(&self) {
        self.state.lock().unwrap().tokens.clear();
    }

    async fn enter(&self) -> PortResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let _open = self.gate.lock().await;
        match self.state.lock().unwrap().fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn owner_of(&self, token: &BearerToken) -> PortResult<String> {
        self.state
            .lock()
            .unwrap()
            .tokens
            .get(token.as_str())
            .cloned()
            .ok_or(PortError::Unauthorized)
    }
}

#[async_trait]
impl AuthService for FakeRemote {
    async fn register(&self, credentials: &Credentials) -> PortResult<()> {
        self.enter().await?;
        let mut state = self.state.lock().unwrap();
        if state.users.contains_key(&credentials.username) {
            return Err(PortError::Rejected {
                status: 400,
                detail: "Username already exists".to_string(),
            });
        }
        state
            .users
            .insert(credentials.username.clone(), credentials.password.clone());
        Ok(())
    }

    async fn obtain_token(&self, credentials: &Credentials) -> PortResult<BearerToken> {
        self.enter().await?;
        let mut state = self.state.lock().unwrap();
        match state.users.get(&credentials.username) {
            Some(password) if *password == credentials.password => {
                let token = jwt_for(&credentials.username, Duration::hours(24));
                state
                    .tokens
                    .insert(token.as_str().to_string(), credentials.username.clone());
                Ok(token)
            }
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn verify_token(&self, token: &BearerToken) -> PortResult<()> {
        self.enter().await?;
        self.owner_of(token).map(|_| ())
    }
}

#[async_trait]
impl DocumentService for FakeRemote {
    async fn list_documents(&self, token: &BearerToken) -> PortResult<Vec<DocumentSummary>> {
        self.enter().await?;
        let _open = self.listing_gate.lock().await;
        if let Some(error) = self.state.lock().unwrap().fail_next_listing.take() {
            return Err(error);
        }
        let owner = self.owner_of(token)?;
        let state = self.state.lock().unwrap();
        Ok(state
            .documents
            .get(&owner)
            .map(|docs| {
                docs.iter()
                    .map(|(id, filename, _)| DocumentSummary {
                        id: id.clone(),
                        filename: filename.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn upload_document(
        &self,
        token: &BearerToken,
        filename: &str,
        content: Bytes,
    ) -> PortResult<()> {
        self.enter().await?;
        let owner = self.owner_of(token)?;
        let mut state = self.state.lock().unwrap();
        let docs = state.documents.entry(owner.clone()).or_default();
        let id = format!("{}_{}", owner, docs.len());
        docs.push((id, filename.to_string(), content.to_vec()));
        Ok(())
    }

    async fn fetch_document(&self, token: &BearerToken, id: &str) -> PortResult<DocumentDetail> {
        self.enter().await?;
        let owner = self.owner_of(token)?;
        let state = self.state.lock().unwrap();
        state
            .documents
            .get(&owner)
            .and_then(|docs| docs.iter().find(|(doc_id, _, _)| doc_id == id))
            .map(|(doc_id, filename, bytes)| DocumentDetail {
                id: doc_id.clone(),
                filename: filename.clone(),
                content: STANDARD.encode(bytes),
            })
            .ok_or_else(|| PortError::NotFound("PDF not found".to_string()))
    }
}

/// A store whose writes always fail.
#[derive(Default)]
pub(crate) struct ReadOnlyStore;

#[async_trait]
impl TokenStore for ReadOnlyStore {
    async fn load(&self) -> PortResult<Option<BearerToken>> {
        Ok(None)
    }

    async fn save(&self, _token: &BearerToken) -> PortResult<()> {
        Err(PortError::Storage("read-only".to_string()))
    }

    async fn clear(&self) -> PortResult<()> {
        Err(PortError::Storage("read-only".to_string()))
    }
}
