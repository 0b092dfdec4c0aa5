// src/acquire/mod.rs
//! Content acquisition: fetch a page, reduce HTML to plain text, unwrap image data URLs.

pub mod fetch;
pub mod image;

use scraper::{Html, Node};

use crate::error::{AnalysisError, ValidationError};

pub use fetch::{HttpFetcher, PageFetcher, BROWSER_USER_AGENT, FETCH_TIMEOUT};
pub use image::ImagePayload;

pub const HTML_SOURCE: &str = "HTML input";
pub const IMAGE_SOURCE: &str = "Image input";

/// Which input a `/components` request carried. `url` wins over `html`, `html` over `image`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRequest {
    Url(String),
    Html(String),
    Image(ImagePayload),
}

impl AnalysisRequest {
    /// A present-but-empty field still selects its variant; emptiness fails later.
    pub fn from_fields(
        url: Option<String>,
        html: Option<String>,
        image: Option<String>,
    ) -> Result<Self, ValidationError> {
        match (url, html, image) {
            (Some(u), _, _) => Ok(Self::Url(u)),
            (None, Some(h), _) => Ok(Self::Html(h)),
            (None, None, Some(i)) => Ok(Self::Image(ImagePayload::from_data_url(&i))),
            (None, None, None) => Err(ValidationError::new(
                "Either URL, HTML, or image is required",
            )),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Url(_) => "url",
            Self::Html(_) => "html",
            Self::Image(_) => "image",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }
}

/// Normalized input plus the `source` label reported back to the client.
#[derive(Debug, Clone)]
pub struct Acquired {
    pub source: String,
    pub input: AnalysisInput,
}

/// Fetch (for URLs) and normalize a request into an orchestrator input.
pub async fn acquire(
    fetcher: &dyn PageFetcher,
    request: AnalysisRequest,
) -> Result<Acquired, AnalysisError> {
    match request {
        AnalysisRequest::Url(url) => {
            let html = fetcher.fetch(&url).await?;
            tracing::debug!(fetcher = fetcher.name(), page = %anon_hash(&html), "page fetched");
            Ok(Acquired {
                source: url,
                input: AnalysisInput::from_html(html),
            })
        }
        AnalysisRequest::Html(html) => Ok(Acquired {
            source: HTML_SOURCE.to_string(),
            input: AnalysisInput::from_html(html),
        }),
        AnalysisRequest::Image(payload) => {
            if payload.is_empty() {
                return Err(AnalysisError::EmptyImage);
            }
            Ok(Acquired {
                source: IMAGE_SOURCE.to_string(),
                input: AnalysisInput::Image(payload),
            })
        }
    }
}

/// Normalized input handed to the orchestrator.
#[derive(Debug, Clone)]
pub enum AnalysisInput {
    /// Plain text derived from HTML, plus the HTML itself for scoring.
    Page { text: String, html: String },
    Image(ImagePayload),
}

impl AnalysisInput {
    /// Build the text variant from raw HTML.
    pub fn from_html(html: impl Into<String>) -> Self {
        let html = html.into();
        let text = html_to_text(&html);
        Self::Page { text, html }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Page { .. } => "page",
            Self::Image(_) => "image",
        }
    }
}

/// Drop `<script>`/`<style>` content and join remaining text nodes with single spaces.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| matches!(e.name(), "script" | "style"))
        });
        if hidden {
            continue;
        }
        parts.extend(text.split_whitespace());
    }

    parts.join(" ")
}

/// First `max_chars` characters of `s`, never splitting a character.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Short anonymized id for logs. Never log raw page content.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;

    struct Canned(Result<&'static str, u16>);

    #[async_trait]
    impl PageFetcher for Canned {
        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            self.0.map(str::to_string).map_err(FetchError::Status)
        }

        fn name(&self) -> &'static str {
            "canned"
        }
    }

    #[test]
    fn request_precedence_is_url_then_html_then_image() {
        let s = |v: &str| Some(v.to_string());
        assert_eq!(
            AnalysisRequest::from_fields(s("https://a.test"), s("<p>"), s("AAAA")).unwrap().kind(),
            "url"
        );
        assert_eq!(AnalysisRequest::from_fields(None, s(""), s("AAAA")).unwrap().kind(), "html");
        assert!(AnalysisRequest::from_fields(None, None, s("AAAA")).unwrap().is_image());
        let err = AnalysisRequest::from_fields(None, None, None).unwrap_err();
        assert_eq!(err.to_string(), "Either URL, HTML, or image is required");
    }

    #[tokio::test]
    async fn acquire_labels_sources() {
        let ok = Canned(Ok("<h1>Hi</h1>"));
        let a = acquire(&ok, AnalysisRequest::Url("https://a.test".into())).await.unwrap();
        assert_eq!(a.source, "https://a.test");
        assert!(matches!(a.input, AnalysisInput::Page { ref text, .. } if text == "Hi"));

        let a = acquire(&ok, AnalysisRequest::Html("<p>x</p>".into())).await.unwrap();
        assert_eq!(a.source, HTML_SOURCE);
    }

    #[tokio::test]
    async fn acquire_surfaces_fetch_and_empty_image_errors() {
        let down = Canned(Err(503));
        let e = acquire(&down, AnalysisRequest::Url("https://a.test".into())).await.unwrap_err();
        assert_eq!(e.to_string(), "Error fetching website: HTTP status 503");

        let img = AnalysisRequest::Image(ImagePayload::from_data_url("data:image/png;base64,"));
        assert!(matches!(acquire(&down, img).await, Err(AnalysisError::EmptyImage)));
    }

    #[test]
    fn strips_script_and_style_and_collapses_whitespace() {
        let html = r#"<html><head><title>Shop</title><style>body{color:red}</style></head>
            <body><script>var x = "hidden";</script>
            <h1>Big   Sale</h1>
            <p>Buy
               now</p><p>&amp; save</p></body></html>"#;
        assert_eq!(html_to_text(html), "Shop Big Sale Buy now & save");
    }

    #[test]
    fn fragment_without_markup_structure() {
        assert_eq!(html_to_text("<p>x</p>"), "x");
        assert_eq!(html_to_text(""), "");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let s = "žluťoučký kůň";
        assert_eq!(truncate_chars(s, 4), "žluť");
        assert_eq!(truncate_chars(s, 100), s);
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn anon_hash_is_stable_and_short() {
        let a = anon_hash("<p>x</p>");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("<p>x</p>"));
        assert_ne!(a, anon_hash("<p>y</p>"));
    }
}
