//! Entrypoints and directories
//!
//! An entrypoint ([`Reference`]) is everything needed to read one node of the
//! tree: the blob name, the key that decrypts it, its MIME type and an
//! optional validity window. A directory blob decrypts to a [`Directory`], an
//! ordered list of named entrypoints.
//!
//! Both are encoded with bincode using fixed-width integers and rejecting
//! trailing bytes, so every value has exactly one binary form.

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::blob::{BlobName, BlobNameError};
use crate::crypto::{BlobKey, KeyError};

/// MIME type marking an entrypoint as a directory
pub const DIR_MIME_TYPE: &str = "application/x-blobview-dir";

/// Upper bound on a single decoded entrypoint or directory
const MAX_ENCODED_SIZE: u64 = 16 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum EntrypointError {
    #[error("cannot parse {kind}: {source}")]
    Decode {
        kind: &'static str,
        #[source]
        source: bincode::Error,
    },

    #[error("entrypoint has no key")]
    MissingKey,

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    BlobName(#[from] BlobNameError),
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_big_endian()
        .reject_trailing_bytes()
}

fn decode<'a, T: Deserialize<'a>>(kind: &'static str, bytes: &'a [u8]) -> Result<T, EntrypointError> {
    codec()
        .with_limit(MAX_ENCODED_SIZE)
        .deserialize(bytes)
        .map_err(|source| EntrypointError::Decode { kind, source })
}

fn encode<T: Serialize>(value: &T) -> Vec<u8> {
    // only sized fields and no limit, nothing here can fail
    codec()
        .serialize(value)
        .expect("unbounded bincode serialization of sized types")
}

/// Binary reference to a blob
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reference {
    blob_name: Vec<u8>,
    mime_type: String,
    key: Option<Vec<u8>>,
    not_valid_before_unix_micro: i64,
    not_valid_after_unix_micro: i64,
}

impl Reference {
    pub fn new(blob_name: &BlobName, key: &BlobKey) -> Self {
        Self {
            key: Some(key.bytes().to_vec()),
            ..Self::from_name(blob_name)
        }
    }

    /// Reference without a key. Enough to locate the blob, not to read it.
    pub fn from_name(blob_name: &BlobName) -> Self {
        Self {
            blob_name: blob_name.to_bytes().to_vec(),
            ..Default::default()
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Restrict the validity window. Timestamps are Unix microseconds; zero
    /// leaves that side unbounded.
    pub fn with_validity(mut self, not_valid_before: i64, not_valid_after: i64) -> Self {
        self.not_valid_before_unix_micro = not_valid_before;
        self.not_valid_after_unix_micro = not_valid_after;
        self
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EntrypointError> {
        decode("entrypoint", bytes)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        encode(self)
    }

    /// Raw blob name bytes, not yet validated
    pub fn blob_name_bytes(&self) -> &[u8] {
        &self.blob_name
    }

    pub fn blob_name(&self) -> Result<BlobName, EntrypointError> {
        Ok(BlobName::from_bytes(&self.blob_name)?)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn key_bytes(&self) -> Option<&[u8]> {
        self.key.as_deref()
    }

    pub fn blob_key(&self) -> Result<BlobKey, EntrypointError> {
        let key = self.key.as_deref().ok_or(EntrypointError::MissingKey)?;
        Ok(BlobKey::from_slice(key)?)
    }

    pub fn not_valid_before_unix_micro(&self) -> i64 {
        self.not_valid_before_unix_micro
    }

    pub fn not_valid_after_unix_micro(&self) -> i64 {
        self.not_valid_after_unix_micro
    }

    pub fn is_dir(&self) -> bool {
        self.mime_type == DIR_MIME_TYPE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    name: String,
    reference: Reference,
}

impl DirectoryEntry {
    pub fn new(name: impl Into<String>, reference: Reference) -> Self {
        Self {
            name: name.into(),
            reference,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reference(&self) -> &Reference {
        &self.reference
    }
}

/// Ordered directory listing. Order is whatever the writer declared.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Directory {
    entries: Vec<DirectoryEntry>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, reference: Reference) {
        self.entries.push(DirectoryEntry::new(name, reference));
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<DirectoryEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EntrypointError> {
        decode("directory", bytes)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        encode(self)
    }
}
