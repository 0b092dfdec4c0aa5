// src/acquire/image.rs
use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

static DATA_URL_MIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*data:(?P<mime>[\w.+-]+/[\w.+-]+)").expect("data url regex"));

/// Base64 image body plus the MIME type forwarded to the oracle.
/// The body is passed through as-is: no decoding, resizing, or format checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: String,
}

impl ImagePayload {
    /// Accepts either a full `data:<mime>;base64,<body>` URL or a bare base64 body.
    pub fn from_data_url(raw: &str) -> Self {
        match raw.split_once(";base64,") {
            Some((prefix, body)) => {
                let mime_type = DATA_URL_MIME
                    .captures(prefix)
                    .and_then(|c| c.name("mime"))
                    .map(|m| m.as_str().to_ascii_lowercase())
                    .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
                Self {
                    mime_type,
                    data: body.to_string(),
                }
            }
            None => Self {
                mime_type: DEFAULT_IMAGE_MIME.to_string(),
                data: raw.to_string(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_data_url_prefix_and_keeps_mime() {
        let p = ImagePayload::from_data_url("data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(p.mime_type, "image/png");
        assert_eq!(p.data, "iVBORw0KGgo=");
    }

    #[test]
    fn bare_base64_defaults_to_jpeg() {
        let p = ImagePayload::from_data_url("/9j/4AAQSkZJRg==");
        assert_eq!(p.mime_type, DEFAULT_IMAGE_MIME);
        assert_eq!(p.data, "/9j/4AAQSkZJRg==");
        assert!(!p.is_empty());
    }

    #[test]
    fn prefix_without_mime_falls_back_to_jpeg() {
        let p = ImagePayload::from_data_url(";base64,AAAA");
        assert_eq!(p.mime_type, DEFAULT_IMAGE_MIME);
        assert_eq!(p.data, "AAAA");
    }

    #[test]
    fn empty_body_is_detected() {
        assert!(ImagePayload::from_data_url("data:image/jpeg;base64,").is_empty());
    }
}
