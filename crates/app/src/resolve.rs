//! Classification of entrypoints
//!
//! Resolution never touches storage. It only decodes a reference and derives
//! what kind of node it points at, so the inspector knows how to read it.

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, Serializer};

use common::blob::{BlobName, BlobType};
use common::entrypoint::{Reference, DIR_MIME_TYPE};

use crate::codec;
use crate::error::ViewError;

/// A successfully decoded and classified reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    reference: Reference,
    blob_name: BlobName,
    text: String,
    is_dir: bool,
    is_link: bool,
    not_valid_before: Option<DateTime<Utc>>,
    not_valid_after: Option<DateTime<Utc>>,
}

impl ResolvedEntry {
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    pub fn blob_name(&self) -> &BlobName {
        &self.blob_name
    }

    /// Canonical Base58 text of the reference
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn mime_type(&self) -> &str {
        self.reference.mime_type()
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn is_link(&self) -> bool {
        self.is_link
    }

    pub fn not_valid_before(&self) -> Option<DateTime<Utc>> {
        self.not_valid_before
    }

    pub fn not_valid_after(&self) -> Option<DateTime<Utc>> {
        self.not_valid_after
    }
}

/// A named entry that either resolved completely or failed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEntry {
    name: String,
    result: Result<ResolvedEntry, ViewError>,
}

impl ClassifiedEntry {
    pub fn failed(name: &str, err: ViewError) -> Self {
        Self {
            name: name.to_string(),
            result: Err(err),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn result(&self) -> Result<&ResolvedEntry, &ViewError> {
        self.result.as_ref()
    }

    pub fn resolved(&self) -> Option<&ResolvedEntry> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ViewError> {
        self.result.as_ref().err()
    }

    pub fn into_result(self) -> Result<ResolvedEntry, ViewError> {
        self.result
    }

    pub fn text(&self) -> &str {
        self.resolved().map(ResolvedEntry::text).unwrap_or_default()
    }

    pub fn mime_type(&self) -> &str {
        self.resolved()
            .map(ResolvedEntry::mime_type)
            .unwrap_or_default()
    }

    pub fn is_dir(&self) -> bool {
        self.resolved().is_some_and(ResolvedEntry::is_dir)
    }

    pub fn is_link(&self) -> bool {
        self.resolved().is_some_and(ResolvedEntry::is_link)
    }

    /// Display label for the blob type, empty for failed entries
    pub fn blob_type(&self) -> &'static str {
        self.resolved()
            .map(|e| e.blob_name.blob_type().name())
            .unwrap_or_default()
    }

    pub fn error_message(&self) -> String {
        self.error().map(ToString::to_string).unwrap_or_default()
    }
}

fn timestamp(unix_micro: i64) -> Option<DateTime<Utc>> {
    if unix_micro > 0 {
        DateTime::from_timestamp_micros(unix_micro)
    } else {
        None
    }
}

/// Classify an already decoded reference.
///
/// The directory and link flags are computed independently of each other.
pub fn resolve(reference: Reference, name: &str) -> ClassifiedEntry {
    let blob_name = match reference.blob_name() {
        Ok(blob_name) => blob_name,
        Err(e) => return ClassifiedEntry::failed(name, ViewError::MalformedReference(e.to_string())),
    };

    let resolved = ResolvedEntry {
        text: codec::encode(&reference),
        is_dir: reference.mime_type() == DIR_MIME_TYPE,
        is_link: blob_name.blob_type() == BlobType::DynamicLink,
        not_valid_before: timestamp(reference.not_valid_before_unix_micro()),
        not_valid_after: timestamp(reference.not_valid_after_unix_micro()),
        blob_name,
        reference,
    };

    ClassifiedEntry {
        name: name.to_string(),
        result: Ok(resolved),
    }
}

pub fn resolve_bytes(bytes: &[u8], name: &str) -> ClassifiedEntry {
    match codec::decode_bytes(bytes) {
        Ok(reference) => resolve(reference, name),
        Err(e) => ClassifiedEntry::failed(name, e),
    }
}

pub fn resolve_text(text: &str, name: &str) -> ClassifiedEntry {
    match codec::decode(text) {
        Ok(reference) => resolve(reference, name),
        Err(e) => ClassifiedEntry::failed(name, e),
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct ReferenceJson {
    blob_name: String,
    mime_type: String,
    key: Option<String>,
    not_valid_before_unix_micro: i64,
    not_valid_after_unix_micro: i64,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct EntryJson<'a> {
    name: &'a str,
    #[serde(rename = "EP")]
    ep: Option<ReferenceJson>,
    str: &'a str,
    #[serde(rename = "BN")]
    bn: Option<String>,
    blob_type: &'static str,
    mime_type: &'a str,
    is_dir: bool,
    is_link: bool,
    not_valid_before: Option<DateTime<Utc>>,
    not_valid_after: Option<DateTime<Utc>>,
    err: String,
}

impl Serialize for ClassifiedEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let resolved = self.resolved();
        let json = EntryJson {
            name: &self.name,
            ep: resolved.map(|e| ReferenceJson {
                blob_name: e.blob_name.to_string(),
                mime_type: e.reference.mime_type().to_string(),
                key: e.reference.key_bytes().map(hex::encode),
                not_valid_before_unix_micro: e.reference.not_valid_before_unix_micro(),
                not_valid_after_unix_micro: e.reference.not_valid_after_unix_micro(),
            }),
            str: self.text(),
            bn: resolved.map(|e| e.blob_name.to_string()),
            blob_type: self.blob_type(),
            mime_type: self.mime_type(),
            is_dir: self.is_dir(),
            is_link: self.is_link(),
            not_valid_before: resolved.and_then(ResolvedEntry::not_valid_before),
            not_valid_after: resolved.and_then(ResolvedEntry::not_valid_after),
            err: self.error_message(),
        };
        json.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use common::prelude::*;

    use super::*;

    fn reference(blob_type: BlobType, mime_type: &str) -> Reference {
        let name = BlobName::from_content(blob_type, b"resolve");
        Reference::new(&name, &BlobKey::from([1u8; 32])).with_mime_type(mime_type)
    }

    #[test]
    fn test_classify_file() {
        let entry = resolve(reference(BlobType::Static, "text/plain"), "file.txt");

        assert_eq!(entry.name(), "file.txt");
        assert!(!entry.is_dir());
        assert!(!entry.is_link());
        assert_eq!(entry.blob_type(), "Static");
        assert_eq!(entry.mime_type(), "text/plain");
        assert!(entry.error().is_none());
    }

    #[test]
    fn test_classify_directory_and_link() {
        let dir = resolve(reference(BlobType::Static, DIR_MIME_TYPE), "");
        assert!(dir.is_dir());
        assert!(!dir.is_link());

        let link = resolve(reference(BlobType::DynamicLink, "text/plain"), "");
        assert!(link.is_link());
        assert!(!link.is_dir());

        // flags are independent
        let both = resolve(reference(BlobType::DynamicLink, DIR_MIME_TYPE), "");
        assert!(both.is_link());
        assert!(both.is_dir());
    }

    #[test]
    fn test_validity_window() {
        let before = 946_782_245_000_000; // 2000-01-02T03:04:05Z
        let entry = resolve(
            reference(BlobType::Static, "").with_validity(before, 0),
            "",
        );
        let resolved = entry.resolved().unwrap();

        assert_eq!(
            resolved.not_valid_before().unwrap().to_rfc3339(),
            "2000-01-02T03:04:05+00:00"
        );
        assert!(resolved.not_valid_after().is_none());
    }

    #[test]
    fn test_text_roundtrip() {
        let original = reference(BlobType::Static, "image/png");
        let text = codec::encode(&original);

        let entry = resolve_text(&text, "img");
        assert_eq!(entry.text(), text);
        assert_eq!(entry.resolved().unwrap().reference(), &original);
    }

    #[test]
    fn test_errors_replace_fields() {
        let entry = resolve_text("", "root");
        assert_eq!(entry.error(), Some(&ViewError::MissingReference));
        assert_eq!(entry.text(), "");
        assert!(!entry.is_dir());

        let entry = resolve_bytes(b"garbage", "");
        assert!(matches!(entry.error(), Some(ViewError::MalformedReference(_))));

        // structurally valid, but the blob name is not
        let entry = resolve(Reference::default(), "");
        assert!(matches!(entry.error(), Some(ViewError::MalformedReference(_))));
    }

    #[test]
    fn test_json_shape() {
        let entry = resolve(reference(BlobType::DynamicLink, "text/plain"), "l");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["Name"], "l");
        assert_eq!(json["Str"], entry.text());
        assert_eq!(json["IsLink"], true);
        assert_eq!(json["BlobType"], "DynamicLink");
        assert_eq!(json["EP"]["Key"], hex::encode([1u8; 32]));
        assert_eq!(json["Err"], "");

        let failed = serde_json::to_value(resolve_text("", "")).unwrap();
        assert_eq!(failed["Err"], "Missing entrypoint data");
        assert!(failed["EP"].is_null());
    }
}
