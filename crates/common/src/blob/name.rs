use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Size of the digest part of a blob name (BLAKE3)
pub const DIGEST_SIZE: usize = blake3::OUT_LEN;
/// Size of a serialized blob name: one type tag byte followed by the digest
pub const BLOB_NAME_SIZE: usize = 1 + DIGEST_SIZE;

/// How a blob's content relates to its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlobType {
    /// Name is the hash of the stored bytes; content never changes
    Static = 0x01,
    /// Name is derived from the link's owner key and nonce; content is a
    /// signed, versioned pointer that may be replaced by newer revisions
    DynamicLink = 0x02,
}

impl BlobType {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(BlobType::Static),
            0x02 => Some(BlobType::DynamicLink),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            BlobType::Static => "Static",
            BlobType::DynamicLink => "DynamicLink",
        }
    }
}

impl fmt::Display for BlobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlobNameError {
    #[error("invalid blob name length, expected {BLOB_NAME_SIZE} bytes, got {0}")]
    InvalidLength(usize),
    #[error("invalid blob type tag: {0:#04x}")]
    InvalidType(u8),
    #[error("blob name is not valid base58")]
    NotBase58,
}

/// Content-derived identifier of a blob, prefixed with its type tag
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlobName {
    blob_type: BlobType,
    digest: [u8; DIGEST_SIZE],
}

impl BlobName {
    pub fn new(blob_type: BlobType, digest: [u8; DIGEST_SIZE]) -> Self {
        Self { blob_type, digest }
    }

    /// Name a blob by hashing the given bytes
    pub fn from_content(blob_type: BlobType, content: &[u8]) -> Self {
        Self::new(blob_type, *blake3::hash(content).as_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlobNameError> {
        if bytes.len() != BLOB_NAME_SIZE {
            return Err(BlobNameError::InvalidLength(bytes.len()));
        }
        let blob_type = BlobType::from_tag(bytes[0]).ok_or(BlobNameError::InvalidType(bytes[0]))?;
        let mut digest = [0u8; DIGEST_SIZE];
        digest.copy_from_slice(&bytes[1..]);
        Ok(Self::new(blob_type, digest))
    }

    pub fn to_bytes(&self) -> [u8; BLOB_NAME_SIZE] {
        let mut out = [0u8; BLOB_NAME_SIZE];
        out[0] = self.blob_type.tag();
        out[1..].copy_from_slice(&self.digest);
        out
    }

    pub fn blob_type(&self) -> BlobType {
        self.blob_type
    }

    pub fn digest(&self) -> &[u8; DIGEST_SIZE] {
        &self.digest
    }
}

impl fmt::Display for BlobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.to_bytes()).into_string())
    }
}

impl fmt::Debug for BlobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobName({})", self)
    }
}

impl FromStr for BlobName {
    type Err = BlobNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| BlobNameError::NotBase58)?;
        Self::from_bytes(&bytes)
    }
}
