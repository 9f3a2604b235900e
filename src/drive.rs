// src/drive.rs

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use crate::error::{io_context, ReportError};

// --- Constants ---
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
pub const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const TOKEN_EXPIRY_BUFFER_SECS: u64 = 60;
const MULTIPART_BOUNDARY: &str = "hourgrid_upload_boundary";
const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Remote storage for finished reports.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// True when `filename` already exists (not trashed) inside the folder.
    async fn exists(&self, folder_id: &str, filename: &str) -> Result<bool, ReportError>;

    /// Uploads a local file into the folder and returns its shareable URL.
    async fn upload(
        &self,
        folder_id: &str,
        local_path: &Path,
        filename: &str,
    ) -> Result<String, ReportError>;
}

/// OAuth2 client credentials plus the long-lived refresh token provisioned
/// for this job.
#[derive(Debug, Clone)]
pub struct DriveCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at_unix_secs: u64,
}

impl CachedToken {
    fn is_expired(&self, buffer_secs: u64) -> Result<bool, ReportError> {
        let now_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| {
                ReportError::TimeError(format!("Failed to get system time duration: {}", e))
            })?
            .as_secs();
        Ok(now_unix >= self.expires_at_unix_secs.saturating_sub(buffer_secs))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    #[serde(default)]
    web_view_link: Option<String>,
}

/// Google Drive v3 adapter. Short-lived access tokens are minted from the
/// refresh token on demand and cached until close to expiry.
pub struct DriveStore {
    http_client: Client,
    credentials: DriveCredentials,
    token: Mutex<Option<CachedToken>>,
}

impl DriveStore {
    pub fn new(credentials: DriveCredentials, http_client: Client) -> Self {
        Self {
            http_client,
            credentials,
            token: Mutex::new(None),
        }
    }

    async fn access_token(&self) -> Result<String, ReportError> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref() {
            if !cached.is_expired(TOKEN_EXPIRY_BUFFER_SECS)? {
                return Ok(cached.access_token.clone());
            }
            debug!("Cached Drive access token is near expiry, refreshing");
        }

        info!("Requesting Drive access token...");
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.credentials.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let response = self
            .http_client
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(ReportError::TokenRefreshFailed {
                status: Some(status),
                message,
            });
        }

        let token: TokenResponse = response.json().await?;
        let now_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| {
                ReportError::TimeError(format!("Failed to get system time duration: {}", e))
            })?
            .as_secs();
        *guard = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at_unix_secs: now_unix + token.expires_in,
        });
        Ok(token.access_token)
    }
}

#[async_trait]
impl ReportStore for DriveStore {
    async fn exists(&self, folder_id: &str, filename: &str) -> Result<bool, ReportError> {
        let token = self.access_token().await?;
        let query = name_in_folder_query(folder_id, filename);
        let response = self
            .http_client
            .get(DRIVE_FILES_URL)
            .bearer_auth(&token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id)"),
                ("pageSize", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(ReportError::DriveApi { status, message });
        }

        let listing: FileList = response.json().await?;
        Ok(!listing.files.is_empty())
    }

    async fn upload(
        &self,
        folder_id: &str,
        local_path: &Path,
        filename: &str,
    ) -> Result<String, ReportError> {
        let token = self.access_token().await?;
        let content = std::fs::read(local_path).map_err(|e| {
            io_context(e, format!("reading report file '{}'", local_path.display()))
        })?;

        let metadata = json!({
            "name": filename,
            "parents": [folder_id],
        });
        let body = multipart_related_body(&metadata.to_string(), &content);

        let url = Url::parse_with_params(
            DRIVE_UPLOAD_URL,
            &[("uploadType", "multipart"), ("fields", "id,webViewLink")],
        )?;
        let response = self
            .http_client
            .post(url)
            .bearer_auth(&token)
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(ReportError::DriveApi { status, message });
        }

        let file: DriveFile = response.json().await?;
        debug!("Uploaded '{}' as file id {}", filename, file.id);
        Ok(file
            .web_view_link
            .unwrap_or_else(|| format!("https://drive.google.com/file/d/{}/view", file.id)))
    }
}

/// Drive search expression matching one filename inside one folder.
fn name_in_folder_query(folder_id: &str, filename: &str) -> String {
    format!(
        "name = '{}' and '{}' in parents and trashed = false",
        escape_query_value(filename),
        escape_query_value(folder_id)
    )
}

// Single quotes inside q values take a backslash escape.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn multipart_related_body(metadata_json: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata_json.len() + content.len() + 256);
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{}\r\n",
            MULTIPART_BOUNDARY, metadata_json
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Type: {}\r\n\r\n",
            MULTIPART_BOUNDARY, XLSX_MIME_TYPE
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--", MULTIPART_BOUNDARY).as_bytes());
    body
}
