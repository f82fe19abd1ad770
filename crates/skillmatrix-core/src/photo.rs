//! Collaborator photos: embedded data-URIs and placeholder avatars

use base64::prelude::*;

use crate::config::AvatarSettings;
use crate::error::ValidationError;

/// Encode raw image bytes as a `data:<mime>;base64,<payload>` URI.
///
/// The MIME type is sniffed from the bytes; anything that is not an image is
/// rejected.
pub fn encode_data_uri(bytes: &[u8]) -> std::result::Result<String, ValidationError> {
    if bytes.is_empty() {
        return Err(ValidationError::EmptyImage);
    }
    let mime = match infer::get(bytes) {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => kind.mime_type(),
        Some(kind) => return Err(ValidationError::UnsupportedImage(kind.mime_type().to_string())),
        None => return Err(ValidationError::UnsupportedImage("unknown".to_string())),
    };
    Ok(format!("data:{};base64,{}", mime, BASE64_STANDARD.encode(bytes)))
}

/// True when the photo is an embedded image rather than a URL
pub fn is_data_uri(photo: &str) -> bool {
    photo.starts_with("data:")
}

/// Deterministic placeholder avatar URL derived from the name
pub fn placeholder_avatar_url(name: &str, settings: &AvatarSettings) -> String {
    format!(
        "{}?name={}&background={}&color={}",
        settings.base_url,
        urlencoding::encode(name),
        settings.background,
        settings.color
    )
}

/// Up to two uppercase initials, one per leading word
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

/// Photo supplied with a new collaborator
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhotoInput {
    /// No photo: fall back to the placeholder avatar
    #[default]
    None,
    /// Raw bytes of an uploaded image
    Upload(Vec<u8>),
    /// Already-resolved data-URI or URL
    Url(String),
}

impl PhotoInput {
    /// Resolve to the string stored on the collaborator
    pub fn resolve(&self, name: &str, settings: &AvatarSettings) -> std::result::Result<String, ValidationError> {
        match self {
            PhotoInput::None => Ok(placeholder_avatar_url(name, settings)),
            PhotoInput::Upload(bytes) => encode_data_uri(bytes),
            PhotoInput::Url(url) if url.trim().is_empty() => Ok(placeholder_avatar_url(name, settings)),
            PhotoInput::Url(url) => Ok(url.clone()),
        }
    }
}
