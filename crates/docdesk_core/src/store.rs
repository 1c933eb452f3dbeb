//! crates/docdesk_core/src/store.rs
//!
//! An in-memory `TokenStore`. The credential lives as long as the process.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::{PortResult, TokenStore};
use crate::token::BearerToken;

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: RwLock<Option<BearerToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: BearerToken) -> Self {
        Self {
            slot: RwLock::new(Some(token)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> PortResult<Option<BearerToken>> {
        Ok(self.slot.read().await.clone())
    }

    async fn save(&self, token: &BearerToken) -> PortResult<()> {
        *self.slot.write().await = Some(token.clone());
        Ok(())
    }

    async fn clear(&self) -> PortResult<()> {
        self.slot.write().await.take();
        Ok(())
    }
}
