use async_trait::async_trait;
use serde::Deserialize;

use crate::config::CloudinaryConfig;
use crate::utils::AppError;

/// Armazena uma imagem e devolve a URL pública
#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(&self, data_uri: &str) -> Result<String, AppError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

pub struct CloudinaryClient {
    http: reqwest::Client,
    upload_url: String,
    upload_preset: String,
    folder: Option<String>,
}

impl CloudinaryClient {
    pub fn new(config: &CloudinaryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            upload_url: format!(
                "{}/v1_1/{}/image/upload",
                config.base_url.trim_end_matches('/'),
                config.cloud_name
            ),
            upload_preset: config.upload_preset.clone(),
            folder: config.folder.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.upload_preset.is_empty() && !self.upload_url.contains("/v1_1//")
    }
}

#[async_trait]
impl ImageUploader for CloudinaryClient {
    async fn upload(&self, data_uri: &str) -> Result<String, AppError> {
        if !self.is_configured() {
            return Err(AppError::Internal("Cloudinary is not configured".to_string()));
        }

        log::info!("☁️  Uploading assistant image ({} bytes encoded)", data_uri.len());

        let mut form = vec![
            ("file", data_uri),
            ("upload_preset", self.upload_preset.as_str()),
        ];
        if let Some(folder) = &self.folder {
            form.push(("folder", folder.as_str()));
        }

        let response = self
            .http
            .post(&self.upload_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::UpstreamError(format!("Failed to reach Cloudinary: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::UpstreamError(format!(
                "Cloudinary upload failed: {}",
                response.status()
            )));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamError(format!("Failed to parse Cloudinary response: {}", e)))?;

        uploaded
            .secure_url
            .ok_or_else(|| AppError::UpstreamError("Cloudinary response has no secure_url".to_string()))
    }
}
