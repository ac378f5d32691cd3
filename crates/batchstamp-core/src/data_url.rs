//! `data:` URL encoding for staged export payloads.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Errors from parsing a base64 `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataUrlError {
    /// The string is not of the form `data:<mime>;base64,<payload>`.
    #[error("not a base64 data URL")]
    Malformed,

    /// The payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(String),
}

/// Encode `bytes` as `data:<mime_type>;base64,<payload>`.
#[must_use]
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Split a base64 data URL into its MIME type and decoded bytes.
///
/// # Errors
///
/// Returns [`DataUrlError::Malformed`] if the prefix or `;base64,`
/// marker is missing, or [`DataUrlError::Base64`] if the payload does
/// not decode.
pub fn decode(url: &str) -> Result<(&str, Vec<u8>), DataUrlError> {
    let rest = url.strip_prefix("data:").ok_or(DataUrlError::Malformed)?;
    let (mime_type, payload) = rest.split_once(";base64,").ok_or(DataUrlError::Malformed)?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| DataUrlError::Base64(e.to_string()))?;
    Ok((mime_type, bytes))
}
