//! One view model, three renderings
//!
//! The inspector produces a single [`RenderedView`] per request. The page, the
//! details fragment and the JSON document are all pure functions of it.

use askama::Template;
use serde::Serialize;

use common::blob::LinkPayload;

use crate::error::ViewError;
use crate::resolve::ClassifiedEntry;

/// Decoded link: the reference it points at plus its envelope metadata.
///
/// The two halves come from different byte streams and fail independently.
#[derive(Debug, Clone)]
pub struct LinkView {
    pub(crate) target: ClassifiedEntry,
    pub(crate) payload: Result<LinkPayload, ViewError>,
}

impl LinkView {
    pub fn target(&self) -> &ClassifiedEntry {
        &self.target
    }

    pub fn payload(&self) -> Option<&LinkPayload> {
        self.payload.as_ref().ok()
    }

    pub fn public_key_hex(&self) -> String {
        self.payload()
            .map(|p| spaced_hex(&p.public_key))
            .unwrap_or_default()
    }

    pub fn signature_hex(&self) -> String {
        self.payload()
            .map(|p| spaced_hex(&p.signature))
            .unwrap_or_default()
    }

    pub fn iv_hex(&self) -> String {
        self.payload().map(|p| spaced_hex(&p.iv)).unwrap_or_default()
    }

    pub fn payload_error(&self) -> String {
        self.payload
            .as_ref()
            .err()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// Type specific part of the view, picked by link > directory > image > text.
#[derive(Debug, Clone)]
pub enum Preview {
    None,
    Link(LinkView),
    Directory(Result<Vec<ClassifiedEntry>, ViewError>),
    /// Base64 of the content
    Image(String),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct RenderedView {
    pub(crate) entry: ClassifiedEntry,
    pub(crate) content_error: Option<ViewError>,
    pub(crate) hex_dump: String,
    pub(crate) content_len: usize,
    pub(crate) preview: Preview,
    pub(crate) default_entrypoint: String,
    pub(crate) requested: String,
}

impl RenderedView {
    pub fn new(entry: ClassifiedEntry) -> Self {
        Self {
            entry,
            content_error: None,
            hex_dump: String::new(),
            content_len: 0,
            preview: Preview::None,
            default_entrypoint: String::new(),
            requested: String::new(),
        }
    }

    pub fn with_default_entrypoint(mut self, text: impl Into<String>) -> Self {
        self.default_entrypoint = text.into();
        self
    }

    /// Keep the entrypoint text exactly as it was asked for, even when it
    /// does not decode.
    pub fn with_requested(mut self, text: impl Into<String>) -> Self {
        self.requested = text.into();
        self
    }

    pub fn entry(&self) -> &ClassifiedEntry {
        &self.entry
    }

    pub fn content_error(&self) -> String {
        self.content_error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    pub fn hex_dump(&self) -> &str {
        &self.hex_dump
    }

    pub fn content_len(&self) -> usize {
        self.content_len
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn link(&self) -> Option<&LinkView> {
        match &self.preview {
            Preview::Link(link) => Some(link),
            _ => None,
        }
    }

    pub fn dir_entries(&self) -> Option<&[ClassifiedEntry]> {
        match &self.preview {
            Preview::Directory(Ok(entries)) => Some(entries),
            _ => None,
        }
    }

    pub fn dir_error(&self) -> String {
        match &self.preview {
            Preview::Directory(Err(e)) => e.to_string(),
            _ => String::new(),
        }
    }

    pub fn image(&self) -> Option<&str> {
        match &self.preview {
            Preview::Image(data) => Some(data),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.preview {
            Preview::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn default_entrypoint(&self) -> &str {
        &self.default_entrypoint
    }

    pub fn requested(&self) -> &str {
        &self.requested
    }

    /// Pretty JSON of the entry alone, shown in the details fragment
    pub fn entry_dump(&self) -> String {
        serde_json::to_string_pretty(&self.entry).unwrap_or_default()
    }
}

/// Space separated uppercase hex, for envelope fields in HTML
pub fn spaced_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Serialize)]
struct LinkJson<'a> {
    #[serde(flatten)]
    target: &'a ClassifiedEntry,
    #[serde(rename = "linkVersion")]
    link_version: u8,
    #[serde(rename = "publicKey")]
    public_key: String,
    nonce: u64,
    signature: String,
    #[serde(rename = "contentVersion")]
    content_version: u64,
    iv: String,
    #[serde(rename = "linkDataErr")]
    link_data_err: String,
}

impl<'a> From<&'a LinkView> for LinkJson<'a> {
    fn from(link: &'a LinkView) -> Self {
        let payload = link.payload();
        Self {
            target: &link.target,
            link_version: payload.map(|p| p.version).unwrap_or_default(),
            public_key: payload.map(|p| hex::encode(p.public_key)).unwrap_or_default(),
            nonce: payload.map(|p| p.nonce).unwrap_or_default(),
            signature: payload.map(|p| hex::encode(p.signature)).unwrap_or_default(),
            content_version: payload.map(|p| p.content_version).unwrap_or_default(),
            iv: payload.map(|p| hex::encode(&p.iv)).unwrap_or_default(),
            link_data_err: link.payload_error(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ViewJson<'a> {
    #[serde(rename = "EP")]
    ep: &'a ClassifiedEntry,
    content_err: String,
    content_hex_dump: &'a str,
    content_len: usize,
    link: Option<LinkJson<'a>>,
    dir_err: String,
    dir_content: Option<&'a [ClassifiedEntry]>,
    image: &'a str,
    text: &'a str,
    #[serde(rename = "DefaultEP")]
    default_ep: &'a str,
}

impl<'a> From<&'a RenderedView> for ViewJson<'a> {
    fn from(view: &'a RenderedView) -> Self {
        Self {
            ep: view.entry(),
            content_err: view.content_error(),
            content_hex_dump: view.hex_dump(),
            content_len: view.content_len(),
            link: view.link().map(LinkJson::from),
            dir_err: view.dir_error(),
            dir_content: view.dir_entries(),
            image: view.image().unwrap_or_default(),
            text: view.text().unwrap_or_default(),
            default_ep: view.default_entrypoint(),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/entrypoint.html")]
struct EntrypointPage<'a> {
    view: &'a RenderedView,
}

#[derive(Template)]
#[template(path = "partials/details.html")]
struct DetailsFragment<'a> {
    view: &'a RenderedView,
}

/// Full HTML page with the tree widget rooted at the view's entry
pub fn render_page(view: &RenderedView) -> Result<String, askama::Error> {
    EntrypointPage { view }.render()
}

/// HTML details of one entry, without page chrome
pub fn render_details(view: &RenderedView) -> Result<String, askama::Error> {
    DetailsFragment { view }.render()
}

pub fn render_json(view: &RenderedView) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ViewJson::from(view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve_text;

    #[test]
    fn test_spaced_hex() {
        assert_eq!(spaced_hex(&[0x01, 0xab, 0xff]), "01 AB FF");
        assert_eq!(spaced_hex(&[]), "");
    }

    #[test]
    fn test_error_view_renders_everywhere() {
        let view = RenderedView::new(resolve_text("", "")).with_default_entrypoint("root");

        let json: serde_json::Value = serde_json::from_str(&render_json(&view).unwrap()).unwrap();
        assert_eq!(json["EP"]["Err"], "Missing entrypoint data");
        assert_eq!(json["DefaultEP"], "root");
        assert_eq!(json["ContentLen"], 0);
        assert!(json["Link"].is_null());
        assert!(json["DirContent"].is_null());

        assert!(render_details(&view)
            .unwrap()
            .contains("Missing entrypoint data"));
        assert!(render_page(&view).unwrap().contains("Missing entrypoint data"));
    }

    #[test]
    fn test_text_preview_is_escaped_in_html() {
        let view = RenderedView {
            preview: Preview::Text("<b>bold</b>".to_string()),
            ..RenderedView::new(resolve_text("", ""))
        };

        let html = render_details(&view).unwrap();
        assert!(!html.contains("<b>bold</b>"));
        assert!(html.contains("&lt;b&gt;bold&lt;&#x2f;b&gt;") || html.contains("&lt;b&gt;bold&lt;/b&gt;"));

        let json: serde_json::Value = serde_json::from_str(&render_json(&view).unwrap()).unwrap();
        assert_eq!(json["Text"], "<b>bold</b>");
    }
}
