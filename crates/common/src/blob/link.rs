//! Dynamic link envelope
//!
//! A dynamic link blob is stored as a fixed-layout header followed by the
//! encrypted link target:
//!
//! ```text
//! version         1 byte
//! public key     32 bytes   (Ed25519)
//! nonce           8 bytes   big-endian
//! signature      64 bytes   (Ed25519)
//! content version 8 bytes   big-endian
//! iv length       1 byte    top bit reserved, must be clear
//! iv              iv length bytes
//! ciphertext      remaining bytes
//! ```
//!
//! Version, public key and nonce never change for a given link and together
//! determine its blob name. Signature, content version and IV change with
//! every published revision.

use crate::crypto::{PUBLIC_KEY_SIZE, SIGNATURE_SIZE};

use super::name::{BlobName, BlobType};

/// Current envelope format version
pub const LINK_VERSION: u8 = 0;
/// Largest IV the envelope can describe
pub const MAX_IV_SIZE: u8 = 0x7F;
/// Length of the header before the IV bytes
pub const FIXED_HEADER_SIZE: usize = 1 + PUBLIC_KEY_SIZE + 8 + SIGNATURE_SIZE + 8 + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LinkPayloadError {
    #[error("truncated link payload: not enough data")]
    Truncated,
    #[error("invalid iv size: {0:#04x}")]
    InvalidIvSize(u8),
}

/// Bounded reader over a byte slice.
///
/// Every read either consumes exactly the requested number of bytes or fails.
/// The first failure sticks: all later reads return `None` without touching
/// the input, so a parser can issue its reads in order and check once.
#[derive(Debug)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    failed: bool,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            failed: false,
        }
    }

    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.failed {
            return None;
        }
        if self.data.len() < n {
            self.failed = true;
            return None;
        }
        let (head, tail) = self.data.split_at(n);
        self.data = tail;
        Some(head)
    }

    pub fn array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.take(N).and_then(|bytes| bytes.try_into().ok())
    }

    pub fn u8(&mut self) -> Option<u8> {
        self.array::<1>().map(|[b]| b)
    }

    pub fn u64_be(&mut self) -> Option<u64> {
        self.array::<8>().map(u64::from_be_bytes)
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn remaining(&self) -> &'a [u8] {
        self.data
    }
}

/// Decoded link envelope header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPayload {
    pub version: u8,
    pub public_key: [u8; PUBLIC_KEY_SIZE],
    pub nonce: u64,
    pub signature: [u8; SIGNATURE_SIZE],
    pub content_version: u64,
    pub iv: Vec<u8>,
}

impl LinkPayload {
    /// Parse the envelope header from raw link bytes, ignoring the ciphertext.
    pub fn parse(raw: &[u8]) -> Result<Self, LinkPayloadError> {
        Self::parse_with_body(raw).map(|(payload, _)| payload)
    }

    /// Parse the envelope header and return it along with the ciphertext that
    /// follows it.
    ///
    /// # Errors
    ///
    /// - [`LinkPayloadError::Truncated`] if the input ends before the header does
    /// - [`LinkPayloadError::InvalidIvSize`] if the IV length has its top bit
    ///   set; the IV bytes are not read in that case
    pub fn parse_with_body(raw: &[u8]) -> Result<(Self, &[u8]), LinkPayloadError> {
        let mut cursor = ByteCursor::new(raw);

        let version = cursor.u8();
        let public_key = cursor.array::<PUBLIC_KEY_SIZE>();
        let nonce = cursor.u64_be();
        let signature = cursor.array::<SIGNATURE_SIZE>();
        let content_version = cursor.u64_be();
        let iv_size = cursor.u8();

        if let Some(size) = iv_size {
            if size > MAX_IV_SIZE {
                return Err(LinkPayloadError::InvalidIvSize(size));
            }
        }
        let iv = iv_size.and_then(|size| cursor.take(size as usize));

        match (version, public_key, nonce, signature, content_version, iv) {
            (
                Some(version),
                Some(public_key),
                Some(nonce),
                Some(signature),
                Some(content_version),
                Some(iv),
            ) => Ok((
                Self {
                    version,
                    public_key,
                    nonce,
                    signature,
                    content_version,
                    iv: iv.to_vec(),
                },
                cursor.remaining(),
            )),
            _ => Err(LinkPayloadError::Truncated),
        }
    }

    /// Encoded length of this header, IV included
    pub fn header_len(&self) -> usize {
        FIXED_HEADER_SIZE + self.iv.len()
    }

    /// Serialize the envelope header (without ciphertext).
    pub fn encode(&self) -> Result<Vec<u8>, LinkPayloadError> {
        let iv_size = u8::try_from(self.iv.len())
            .ok()
            .filter(|size| *size <= MAX_IV_SIZE)
            .ok_or(LinkPayloadError::InvalidIvSize(self.iv.len().min(0xFF) as u8))?;

        let mut out = Vec::with_capacity(self.header_len());
        out.push(self.version);
        out.extend_from_slice(&self.public_key);
        out.extend_from_slice(&self.nonce.to_be_bytes());
        out.extend_from_slice(&self.signature);
        out.extend_from_slice(&self.content_version.to_be_bytes());
        out.push(iv_size);
        out.extend_from_slice(&self.iv);
        Ok(out)
    }

    /// Blob name of the link, derived from the fields that never change
    /// between revisions.
    pub fn blob_name(&self) -> BlobName {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[self.version]);
        hasher.update(&self.public_key);
        hasher.update(&self.nonce.to_be_bytes());
        BlobName::new(BlobType::DynamicLink, *hasher.finalize().as_bytes())
    }

    /// Bytes covered by the revision signature.
    pub fn signed_message(&self, name: &BlobName, ciphertext: &[u8]) -> Vec<u8> {
        let mut msg = Vec::with_capacity(name.to_bytes().len() + 9 + self.iv.len() + ciphertext.len());
        msg.extend_from_slice(&name.to_bytes());
        msg.extend_from_slice(&self.content_version.to_be_bytes());
        msg.push(self.iv.len() as u8);
        msg.extend_from_slice(&self.iv);
        msg.extend_from_slice(ciphertext);
        msg
    }
}
