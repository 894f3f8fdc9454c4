//! HTTP clients for the upload and forms endpoints
//!
//! Both clients wrap a `reqwest::Client` built with a bounded timeout, so a
//! hung endpoint fails like any other error.

use super::traits::{FileUploader, FormsApi};
use crate::config::WizardConfig;
use crate::state::AttachedFile;
use crate::submission::FormSubmission;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default Cloudinary API base
const CLOUDINARY_API: &str = "https://api.cloudinary.com/v1_1";

/// Header carrying the per-session deduplication key
const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")
}

/// Non-success answers from the forms endpoint
#[derive(Debug, thiserror::Error)]
pub enum FormsApiError {
    #[error("Forms API rejected the submission ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Unsigned Cloudinary upload using an upload preset
pub struct CloudinaryUploader {
    client: Client,
    base_url: String,
    cloud_name: String,
    upload_preset: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryResponse {
    secure_url: String,
}

impl CloudinaryUploader {
    /// Create an uploader from the loaded configuration
    pub fn from_config(config: &WizardConfig) -> Result<Self> {
        let client = build_http_client(config.request_timeout())?;
        Ok(Self::with_client(
            client,
            CLOUDINARY_API,
            &config.cloudinary_cloud_name,
            &config.cloudinary_upload_preset,
        ))
    }

    /// Create an uploader with a custom client and API base
    pub fn with_client(client: Client, base_url: &str, cloud_name: &str, upload_preset: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cloud_name: cloud_name.to_string(),
            upload_preset: upload_preset.to_string(),
        }
    }

    fn upload_url(&self) -> String {
        format!("{}/{}/auto/upload", self.base_url, self.cloud_name)
    }
}

#[async_trait]
impl FileUploader for CloudinaryUploader {
    async fn upload(&self, file: &AttachedFile, folder: &str) -> Result<String> {
        if self.cloud_name.is_empty() || self.upload_preset.is_empty() {
            return Err(anyhow!("File uploads are not configured"));
        }

        let bytes = tokio::fs::read(&file.path)
            .await
            .with_context(|| format!("Failed to read {}", file.path.display()))?;

        let part = multipart::Part::bytes(bytes)
            .file_name(file.file_name.clone())
            .mime_str(file.content_type())
            .map_err(|e| anyhow!("Failed to set MIME type: {}", e))?;
        let form = multipart::Form::new()
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", folder.to_string())
            .part("file", part);

        debug!(file = %file.file_name, folder, "Uploading attachment");
        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| anyhow!("Upload request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(%status, "Upload rejected");
            return Err(anyhow!("Upload failed ({}): {}", status, body));
        }

        let parsed: CloudinaryResponse = response
            .json()
            .await
            .context("Upload response did not contain a URL")?;
        info!(url = %parsed.secure_url, "Attachment uploaded");
        Ok(parsed.secure_url)
    }
}

/// JSON client for the forms submission endpoint
pub struct FormsClient {
    client: Client,
    endpoint: String,
}

impl FormsClient {
    /// Create a client from the loaded configuration
    pub fn from_config(config: &WizardConfig) -> Result<Self> {
        let client = build_http_client(config.request_timeout())?;
        Ok(Self::with_client(client, &config.forms_endpoint))
    }

    pub fn with_client(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl FormsApi for FormsClient {
    async fn submit(&self, submission: &FormSubmission, idempotency_key: Uuid) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(anyhow!("Forms endpoint is not configured"));
        }

        debug!(form_id = submission.form_id, fields = submission.fields.len(), "Posting form");
        let response = self
            .client
            .post(&self.endpoint)
            .header(IDEMPOTENCY_HEADER, idempotency_key.to_string())
            .json(submission)
            .send()
            .await
            .map_err(|e| anyhow!("Forms request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FormsApiError::Rejected {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        info!(form_id = submission.form_id, %status, "Form accepted");
        Ok(())
    }
}
