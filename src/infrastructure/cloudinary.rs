use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use serde::Deserialize;
use sha1::{Digest, Sha1};

use crate::domain::errors::DomainError;
use crate::domain::ports::ImageStore;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_MIME: &str = "image/jpeg";
const TRANSFORMATION: &str = "q_auto:good,f_auto,w_1200,h_1200,c_limit,fl_progressive";
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// A validated image ready to be sent.
#[derive(Debug, PartialEq)]
pub struct DecodedImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Accepts raw base64 or a `data:<mime>;base64,<payload>` URI.
pub fn decode_image(input: &str) -> Result<DecodedImage, DomainError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DomainError::InvalidInput("Image payload is empty".to_string()));
    }

    let (mime, payload) = match input.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest.split_once(',').ok_or_else(|| {
                DomainError::InvalidInput("Malformed data URI".to_string())
            })?;
            let mime = header.strip_suffix(";base64").unwrap_or(header);
            let mime = if mime.is_empty() { DEFAULT_MIME } else { mime };
            (mime.to_ascii_lowercase(), payload)
        }
        None => (DEFAULT_MIME.to_string(), input),
    };

    if !mime.starts_with("image/") {
        return Err(DomainError::InvalidInput(format!(
            "Unsupported content type: {}",
            mime
        )));
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| DomainError::InvalidInput(format!("Invalid base64 image: {}", e)))?;
    if bytes.is_empty() {
        return Err(DomainError::InvalidInput("Image payload is empty".to_string()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(DomainError::InvalidInput(format!(
            "Image is larger than {} MB",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }

    Ok(DecodedImage { mime, bytes })
}

/// `sha1("k1=v1&k2=v2<secret>")` over the parameters sorted by name.
pub fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

pub struct CloudinaryImageStore {
    config: Option<CloudinaryConfig>,
    client: reqwest::Client,
}

impl CloudinaryImageStore {
    /// Without credentials every upload is rejected.
    pub fn new(config: Option<CloudinaryConfig>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    async fn upload(&self, base64_image: &str) -> Result<String, DomainError> {
        let config = self.config.as_ref().ok_or_else(|| {
            DomainError::InvalidInput("Image upload is not configured".to_string())
        })?;
        let image = decode_image(base64_image)?;

        let mut params = BTreeMap::new();
        params.insert("timestamp", Utc::now().timestamp().to_string());
        params.insert("transformation", TRANSFORMATION.to_string());
        let signature = sign(&params, &config.api_secret);

        let mut form: Vec<(&str, String)> = params.into_iter().collect();
        form.push(("api_key", config.api_key.clone()));
        form.push(("signature", signature));
        form.push(("file", image.data_uri()));

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            config.cloud_name
        );
        let response = self.client.post(&url).form(&form).send().await.map_err(|e| {
            log::error!("Cloudinary request failed: {}", e);
            DomainError::Internal(format!("Image upload failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Cloudinary rejected upload ({}): {}", status, body);
            return Err(DomainError::Internal(format!(
                "Image upload failed with status {}",
                status
            )));
        }

        let uploaded: UploadResponse = response.json().await.map_err(|e| {
            DomainError::Internal(format!("Unexpected Cloudinary response: {}", e))
        })?;
        log::info!("Image uploaded ({} bytes): {}", image.bytes.len(), uploaded.secure_url);
        Ok(uploaded.secure_url)
    }
}
