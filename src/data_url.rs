//! Converting images to and from `data:` URLs.
//!
//! Image payloads travel through the analysis core as data URLs, the same
//! form a browser's `FileReader` produces.

use std::sync::LazyLock;

use base64::{Engine as _, prelude::BASE64_STANDARD};
use regex::Regex;

use crate::error::AnalysisError;

/// Convert binary data to a `data:` URL.
pub fn data_url(mime_type: &str, data: &[u8]) -> String {
    let base64_data = BASE64_STANDARD.encode(data);
    format!("data:{};base64,{}", mime_type, base64_data)
}

/// Regex for parsing a `data:` URL.
pub const DATA_URL_RE: &str = r"^data:(?P<mime_type>[^;,]+);base64,(?P<data>.+)$";

static DATA_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DATA_URL_RE).expect("failed to compile regex"));

/// Parse a `data:` URL into a MIME type and Base64-encoded data.
pub fn parse_data_url(data_url: &str) -> Option<(String, &str)> {
    let caps = DATA_URL_REGEX.captures(data_url)?;
    let mime_type = caps.name("mime_type")?.as_str().to_string();
    let data = caps.name("data")?.as_str();
    Some((mime_type, data))
}

/// Check that an image payload is worth analyzing.
///
/// Payloads are otherwise opaque, but an empty payload, or one claiming to be
/// a `data:` URL without being a valid one, can't have come from an image.
pub fn validate_payload(payload: &str) -> Result<(), AnalysisError> {
    if payload.trim().is_empty() {
        return Err(AnalysisError::InvalidPayload("payload is empty".to_owned()));
    }
    if payload.starts_with("data:") {
        let (mime_type, _) = parse_data_url(payload).ok_or_else(|| {
            AnalysisError::InvalidPayload("malformed data URL".to_owned())
        })?;
        if !mime_type.starts_with("image/") {
            return Err(AnalysisError::InvalidPayload(format!(
                "expected an image, found {mime_type}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_round_trips_through_parser() {
        let url = data_url("image/png", b"\x89PNG");
        assert_eq!(url, "data:image/png;base64,iVBORw==");
        let (mime_type, data) = parse_data_url(&url).unwrap();
        assert_eq!(mime_type, "image/png");
        assert_eq!(data, "iVBORw==");
    }

    #[test]
    fn validate_payload_rejects_bad_input() {
        for payload in ["", "   ", "data:image/png,notbase64", "data:text/plain;base64,aGk="] {
            assert!(
                matches!(
                    validate_payload(payload),
                    Err(AnalysisError::InvalidPayload(_))
                ),
                "{payload:?} should be invalid"
            );
        }
    }

    #[test]
    fn validate_payload_accepts_images_and_opaque_strings() {
        assert!(validate_payload("data:image/jpeg;base64,/9j/4AAQ").is_ok());
        assert!(validate_payload("raw image bytes").is_ok());
    }
}
