//! services/client/src/adapters/http.rs
//!
//! This module contains the adapter for the remote document API.
//! It implements the `AuthService` and `DocumentService` ports from the `core`
//! crate on top of `reqwest`.

use async_trait::async_trait;
use bytes::Bytes;
use docdesk_core::domain::{Credentials, DocumentDetail, DocumentSummary};
use docdesk_core::ports::{AuthService, DocumentService, PortError, PortResult};
use docdesk_core::token::BearerToken;
use reqwest::{multipart, Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that speaks the remote API's REST contract.
#[derive(Clone)]
pub struct HttpApiAdapter {
    client: Client,
    base_url: Url,
}

impl HttpApiAdapter {
    /// Creates a new `HttpApiAdapter` with its own connection pool.
    pub fn new(base_url: Url, timeout: Duration) -> PortResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> PortResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PortError::Unexpected(format!("'{}' cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Deserialize)]
struct PdfSummaryRecord {
    pdf_id: String,
    filename: String,
}

impl PdfSummaryRecord {
    fn to_domain(self) -> DocumentSummary {
        DocumentSummary {
            id: self.pdf_id,
            filename: self.filename,
        }
    }
}

// `GET /pdf/{id}` may omit the id; the requested one is used instead.
#[derive(Deserialize)]
struct PdfRecord {
    #[serde(default)]
    pdf_id: Option<String>,
    filename: String,
    content: String,
}

impl PdfRecord {
    fn to_domain(self, requested_id: &str) -> DocumentDetail {
        DocumentDetail {
            id: self.pdf_id.unwrap_or_else(|| requested_id.to_string()),
            filename: self.filename,
            content: self.content,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

//=========================================================================================
// Response Handling
//=========================================================================================

/// Pulls the human-readable `detail` out of an error body.
fn extract_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// Turns a non-2xx response into the matching `PortError`.
async fn check(response: Response) -> PortResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = extract_detail(&body);
    debug!(status = status.as_u16(), %detail, "Request rejected");

    Err(match status {
        StatusCode::UNAUTHORIZED => PortError::Unauthorized,
        StatusCode::NOT_FOUND => PortError::NotFound(detail),
        _ => PortError::Rejected {
            status: status.as_u16(),
            detail,
        },
    })
}

fn transport(error: reqwest::Error) -> PortError {
    if error.is_decode() {
        PortError::Unexpected(format!("malformed response: {}", error))
    } else {
        PortError::Transport(error.to_string())
    }
}

//=========================================================================================
// Port Implementations
//=========================================================================================

#[async_trait]
impl AuthService for HttpApiAdapter {
    async fn register(&self, credentials: &Credentials) -> PortResult<()> {
        let url = self.endpoint(&["register"])?;
        debug!(%url, "POST register");

        let response = self
            .client
            .post(url)
            .json(&RegisterRequest {
                username: &credentials.username,
                password: &credentials.password,
            })
            .send()
            .await
            .map_err(transport)?;
        check(response).await?;
        Ok(())
    }

    async fn obtain_token(&self, credentials: &Credentials) -> PortResult<BearerToken> {
        let url = self.endpoint(&["token"])?;
        debug!(%url, "POST token");

        let response = self
            .client
            .post(url)
            .form(&[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(transport)?;
        let body: TokenResponse = check(response).await?.json().await.map_err(transport)?;

        if let Some(kind) = body.token_type.as_deref() {
            if !kind.eq_ignore_ascii_case("bearer") {
                warn!(token_type = %kind, "Token endpoint returned a non-bearer token type");
            }
        }
        Ok(BearerToken::new(body.access_token))
    }

    /// There is no dedicated endpoint; the listing is the cheapest authenticated call.
    async fn verify_token(&self, token: &BearerToken) -> PortResult<()> {
        let url = self.endpoint(&["pdfs"])?;
        debug!(%url, "GET pdfs (token check)");

        let response = self
            .client
            .get(url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(transport)?;
        check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentService for HttpApiAdapter {
    async fn list_documents(&self, token: &BearerToken) -> PortResult<Vec<DocumentSummary>> {
        let url = self.endpoint(&["pdfs"])?;
        debug!(%url, "GET pdfs");

        let response = self
            .client
            .get(url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(transport)?;
        // A `null` body is treated as an empty listing.
        let records: Option<Vec<PdfSummaryRecord>> =
            check(response).await?.json().await.map_err(transport)?;

        Ok(records
            .unwrap_or_default()
            .into_iter()
            .map(PdfSummaryRecord::to_domain)
            .collect())
    }

    async fn upload_document(
        &self,
        token: &BearerToken,
        filename: &str,
        content: Bytes,
    ) -> PortResult<()> {
        let url = self.endpoint(&["upload-pdf"])?;
        debug!(%url, %filename, bytes = content.len(), "POST upload-pdf");

        let part = multipart::Part::bytes(content.to_vec())
            .file_name(filename.to_string())
            .mime_str("application/pdf")
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .bearer_auth(token.as_str())
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        check(response).await?;
        Ok(())
    }

    async fn fetch_document(&self, token: &BearerToken, id: &str) -> PortResult<DocumentDetail> {
        let url = self.endpoint(&["pdf", id])?;
        debug!(%url, "GET pdf");

        let response = self
            .client
            .get(url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(transport)?;
        let record: PdfRecord = check(response).await?.json().await.map_err(transport)?;
        Ok(record.to_domain(id))
    }
}
