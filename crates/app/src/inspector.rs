use std::fmt::Write;

use base64::Engine;

use common::blob::{EncryptedBlobs, LinkPayload};
use common::entrypoint::Directory;

use crate::error::ViewError;
use crate::resolve::{resolve, resolve_bytes, ClassifiedEntry, ResolvedEntry};
use crate::view::{LinkView, Preview, RenderedView};

/// Bytes of content covered by the hex dump
pub const MAX_HEX_DUMP_BYTES: usize = 2048;

/// Reads the blob behind a classified entry and builds its view.
#[derive(Debug, Clone)]
pub struct Inspector {
    blobs: EncryptedBlobs,
}

impl Inspector {
    pub fn new(blobs: EncryptedBlobs) -> Self {
        Self { blobs }
    }

    pub fn blobs(&self) -> &EncryptedBlobs {
        &self.blobs
    }

    #[tracing::instrument(skip_all, fields(entry = %entry.text()))]
    pub async fn inspect(&self, entry: ClassifiedEntry) -> RenderedView {
        let resolved = match entry.resolved() {
            Some(resolved) => resolved.clone(),
            None => return RenderedView::new(entry),
        };
        let mut view = RenderedView::new(entry);

        let (raw, content) = match self.read(&resolved).await {
            Ok(read) => read,
            Err(e) => {
                tracing::debug!(error = %e, "could not read content");
                view.content_error = Some(e);
                return view;
            }
        };

        view.hex_dump = hex_dump(&content);
        view.content_len = content.len();
        view.preview = preview(&resolved, &raw, &content);
        view
    }

    /// Stored bytes and decrypted content of an entry's blob
    async fn read(&self, entry: &ResolvedEntry) -> Result<(Vec<u8>, Vec<u8>), ViewError> {
        let content_err = |e: &dyn std::fmt::Display| ViewError::ContentRead(e.to_string());

        let raw = self
            .blobs
            .open_raw(entry.blob_name())
            .await
            .map_err(|e| content_err(&e))?;
        let key = entry.reference().blob_key().map_err(|e| content_err(&e))?;
        let content = self
            .blobs
            .open(entry.blob_name(), &key)
            .await
            .map_err(|e| content_err(&e))?;

        Ok((raw.to_vec(), content))
    }
}

fn preview(entry: &ResolvedEntry, raw: &[u8], content: &[u8]) -> Preview {
    if entry.is_link() {
        let mut target = resolve_bytes(content, "");
        if let Some(ViewError::MalformedReference(msg)) = target.error() {
            target = ClassifiedEntry::failed("", ViewError::LinkDecode(msg.clone()));
        }
        return Preview::Link(LinkView {
            target,
            payload: LinkPayload::parse(raw).map_err(ViewError::from),
        });
    }

    if entry.is_dir() {
        let listing = Directory::from_bytes(content)
            .map(|dir| {
                dir.into_entries()
                    .into_iter()
                    .map(|e| resolve(e.reference().clone(), e.name()))
                    .collect()
            })
            .map_err(|e| ViewError::DirectoryDecode(e.to_string()));
        return Preview::Directory(listing);
    }

    let mime_type = entry.mime_type();
    if mime_type.starts_with("image/") {
        Preview::Image(base64::engine::general_purpose::STANDARD_NO_PAD.encode(content))
    } else if mime_type.starts_with("text/") {
        Preview::Text(String::from_utf8_lossy(content).into_owned())
    } else {
        Preview::None
    }
}

/// Hex dump of the first [`MAX_HEX_DUMP_BYTES`] bytes.
///
/// Bytes are separated by one space, two after every 8th byte and a newline
/// after every 32nd. Longer content ends with `... (N more)`.
pub fn hex_dump(content: &[u8]) -> String {
    let shown = &content[..content.len().min(MAX_HEX_DUMP_BYTES)];
    let mut out = String::with_capacity(shown.len() * 3 + 24);

    for (i, byte) in shown.iter().enumerate() {
        let _ = write!(out, "{:02x}", byte);
        let pos = i + 1;
        if pos % 32 == 0 {
            out.push('\n');
        } else if pos % 8 == 0 {
            out.push_str("  ");
        } else {
            out.push(' ');
        }
    }

    if content.len() > MAX_HEX_DUMP_BYTES {
        let _ = write!(out, "... ({} more)", content.len() - MAX_HEX_DUMP_BYTES);
    }
    out
}
