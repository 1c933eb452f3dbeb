//! crates/docdesk_core/src/domain.rs
//!
//! Defines the pure, core data structures for the client.
//! These structs are independent of the wire format of the remote API.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;

/// The in-memory record of which user is authenticated in this client instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

// Username/password pair sent to the register and token endpoints.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A lightweight listing entry: id and filename, no content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub id: String,
    pub filename: String,
}

/// A full document record. `content` is the base64 encoding of the PDF bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDetail {
    pub id: String,
    pub filename: String,
    pub content: String,
}

impl DocumentDetail {
    /// Decodes `content` back into the raw PDF bytes.
    pub fn decode_content(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.content.trim())
    }

    /// A `data:` URI suitable for a native PDF embed.
    pub fn data_uri(&self) -> String {
        format!("data:application/pdf;base64,{}", self.content)
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            filename: self.filename.clone(),
        }
    }
}
