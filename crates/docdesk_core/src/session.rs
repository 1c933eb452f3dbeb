//! crates/docdesk_core/src/session.rs
//!
//! The session manager: owns the authenticated identity for one running client
//! and the bearer credential persisted behind the `TokenStore` port.
//!
//! One instance is created at startup and shared (by `Arc`) with every screen
//! that needs it. Logout resets it; it is never rebuilt.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::domain::{Credentials, Identity};
use crate::error::AuthError;
use crate::ports::{AuthService, PortError, TokenStore};
use crate::token::BearerToken;

const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
const REGISTRATION_FAILED: &str = "Registration failed";

/// The identity together with a counter bumped on every identity change.
///
/// Snapshots with different generations belong to different sessions, even when
/// both name the same user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub generation: u64,
    pub identity: Option<Identity>,
}

pub struct SessionManager {
    auth: Arc<dyn AuthService>,
    store: Arc<dyn TokenStore>,
    state: watch::Sender<SessionSnapshot>,
    /// Login, registration and rehydration share one in-flight slot.
    in_flight: Mutex<()>,
}

impl SessionManager {
    pub fn new(auth: Arc<dyn AuthService>, store: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            auth,
            store,
            state,
            in_flight: Mutex::new(()),
        }
    }

    /// Synchronous read of the in-memory identity. No network or storage access.
    pub fn current_identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Observes identity changes (login, logout, rehydration).
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    fn set_identity(&self, identity: Option<Identity>) -> Option<Identity> {
        let mut previous = None;
        self.state.send_modify(|state| {
            state.generation += 1;
            previous = std::mem::replace(&mut state.identity, identity);
        });
        previous
    }

    /// The stored bearer credential, read on every authenticated request.
    pub async fn credential(&self) -> Result<Option<BearerToken>, PortError> {
        self.store.load().await
    }

    /// Exchanges credentials for a token, stores it, then sets the identity.
    ///
    /// The identity is only set once the store write has succeeded, so a failed
    /// login never leaves a half-established session behind.
    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let _slot = self.in_flight.try_lock().map_err(|_| AuthError::Busy)?;
        let started = self.state.borrow().generation;
        let credentials = Credentials::new(username, password);

        info!(%username, "Logging in");
        let token = self
            .auth
            .obtain_token(&credentials)
            .await
            .map_err(|e| rejection(e, LOGIN_FAILED))?;
        if token.is_empty() {
            return Err(AuthError::Unavailable(PortError::Unexpected(
                "the token endpoint returned an empty access token".to_string(),
            )));
        }

        if self.state.borrow().generation != started {
            info!(%username, "Session changed while logging in, dropping the token");
            return Err(AuthError::Discarded);
        }

        self.store.save(&token).await.map_err(AuthError::Storage)?;
        // A logout may have cleared the store while the write was pending.
        if self.state.borrow().generation != started {
            info!(%username, "Session changed while storing the token, discarding it");
            self.discard_token().await;
            return Err(AuthError::Discarded);
        }

        let identity = Identity::new(username);
        self.set_identity(Some(identity.clone()));
        info!(%username, "Logged in");
        Ok(identity)
    }

    /// Registers a new account. The caller still has to log in afterwards.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let _slot = self.in_flight.try_lock().map_err(|_| AuthError::Busy)?;
        let credentials = Credentials::new(username, password);

        info!(%username, "Registering account");
        self.auth
            .register(&credentials)
            .await
            .map_err(|e| rejection(e, REGISTRATION_FAILED))?;
        info!(%username, "Account registered");
        Ok(())
    }

    /// Deletes the stored token and clears the identity. Always succeeds.
    pub async fn logout(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("Failed to delete the stored credential on logout: {}", e);
        }
        if let Some(previous) = self.set_identity(None) {
            info!(username = %previous, "Logged out");
        }
    }

    /// Rehydrates the identity from a stored credential at startup.
    ///
    /// - no token: stays logged out
    /// - token expired by its own `exp` claim, or rejected by the API: token cleared
    /// - token without a readable `sub` claim: left in place, stays logged out
    /// - API unreachable: token kept, identity stays absent, error returned
    pub async fn restore(&self) -> Result<Option<Identity>, AuthError> {
        let _slot = self.in_flight.try_lock().map_err(|_| AuthError::Busy)?;
        let started = self.state.borrow().generation;

        let Some(token) = self.store.load().await.map_err(AuthError::Storage)? else {
            debug!("No stored credential");
            return Ok(None);
        };

        let claims = token.claims().unwrap_or_default();
        if claims.is_expired_at(Utc::now()) {
            info!("Stored credential has expired, discarding it");
            self.discard_token().await;
            return Ok(None);
        }

        let Some(username) = claims.sub.filter(|sub| !sub.is_empty()) else {
            debug!("Stored credential does not name a user; a fresh login is required");
            return Ok(None);
        };

        let verdict = self.auth.verify_token(&token).await;
        if self.state.borrow().generation != started {
            debug!("Session changed while verifying the stored credential");
            return Err(AuthError::Discarded);
        }

        match verdict {
            Ok(()) => {
                let identity = Identity::new(username);
                self.set_identity(Some(identity.clone()));
                info!(username = %identity, "Session restored from stored credential");
                Ok(Some(identity))
            }
            Err(PortError::Unauthorized) => {
                info!("Stored credential was rejected by the API, discarding it");
                self.discard_token().await;
                Ok(None)
            }
            Err(e) => Err(AuthError::Unavailable(e)),
        }
    }

    async fn discard_token(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("Failed to delete a stale credential: {}", e);
        }
    }
}

/// Maps a port failure to the message the user sees.
fn rejection(error: PortError, fallback: &str) -> AuthError {
    match error {
        PortError::Transport(_) | PortError::Unexpected(_) | PortError::Storage(_) => {
            AuthError::Unavailable(error)
        }
        PortError::Unauthorized => AuthError::Rejected(fallback.to_string()),
        other => AuthError::Rejected(
            other
                .detail()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
        ),
    }
}
