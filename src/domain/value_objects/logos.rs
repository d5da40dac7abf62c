use anyhow::{Result, anyhow, bail};
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

pub const MAX_LOGO_BYTES: usize = 2 * 1024 * 1024;

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoFormat {
    Png,
    Jpeg,
}

impl LogoFormat {
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(LogoFormat::Png),
            "image/jpeg" | "image/jpg" => Some(LogoFormat::Jpeg),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            LogoFormat::Png => "png",
            LogoFormat::Jpeg => "jpg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            LogoFormat::Png => "image/png",
            LogoFormat::Jpeg => "image/jpeg",
        }
    }

    fn matches_signature(&self, bytes: &[u8]) -> bool {
        match self {
            LogoFormat::Png => bytes.starts_with(PNG_SIGNATURE),
            LogoFormat::Jpeg => bytes.starts_with(JPEG_SIGNATURE),
        }
    }
}

/// Logo as sent by the client: a MIME type and base64 image data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogoUploadModel {
    pub content_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedLogo {
    pub format: LogoFormat,
    pub bytes: Vec<u8>,
}

pub fn validate_logo(upload: &LogoUploadModel) -> Result<ValidatedLogo> {
    let format = LogoFormat::from_content_type(&upload.content_type)
        .ok_or_else(|| anyhow!("Invalid file type. Only JPG/JPEG/PNG allowed."))?;

    let encoded = strip_data_url_prefix(&upload.data);
    // base64 grows data by 4/3; reject oversized payloads before decoding them.
    if encoded.len() > MAX_LOGO_BYTES / 3 * 4 + 4 {
        bail!("File too large. Max 2MB.");
    }

    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|_| anyhow!("Invalid logo encoding"))?;

    if bytes.is_empty() {
        bail!("Logo is empty");
    }
    if bytes.len() > MAX_LOGO_BYTES {
        bail!("File too large. Max 2MB.");
    }
    if !format.matches_signature(&bytes) {
        bail!("Logo content does not match its declared type");
    }

    Ok(ValidatedLogo { format, bytes })
}

fn strip_data_url_prefix(data: &str) -> &str {
    match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    }
}
