//! Encrypted, content-addressed blobs
//!
//! [`EncryptedBlobs`] layers encryption and integrity checks on top of a
//! [`Datastore`]. Two blob types exist:
//!
//! - **Static** blobs are `nonce || ciphertext`, named by the BLAKE3 hash of
//!   those stored bytes. Opening verifies the hash before decrypting.
//! - **Dynamic links** are a signed [`LinkPayload`] envelope followed by the
//!   ciphertext. The name is derived from the envelope's unchanging fields,
//!   so a link keeps its name across revisions. Opening verifies the name
//!   derivation and the Ed25519 signature before decrypting.

mod link;
mod name;

use bytes::Bytes;

use crate::crypto::{
    BlobKey, KeyError, PublicKey, Signature, SigningKey, NONCE_SIZE, SIGNATURE_SIZE,
};
use crate::datastore::{Datastore, DatastoreError};

pub use link::{
    ByteCursor, LinkPayload, LinkPayloadError, FIXED_HEADER_SIZE, LINK_VERSION, MAX_IV_SIZE,
};
pub use name::{BlobName, BlobNameError, BlobType, BLOB_NAME_SIZE, DIGEST_SIZE};

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error(transparent)]
    Datastore(#[from] DatastoreError),

    #[error("blob name mismatch: stored content does not match {0}")]
    NameMismatch(BlobName),

    #[error("could not decrypt blob: {0}")]
    Crypto(#[from] KeyError),

    #[error("invalid dynamic link: {0}")]
    Link(#[from] LinkPayloadError),

    #[error("invalid dynamic link signature for {0}")]
    InvalidSignature(BlobName),

    #[error("dynamic link update does not match link {0}")]
    ForeignLink(BlobName),
}

/// Owner-side state of a dynamic link, needed to publish new revisions.
#[derive(Debug, Clone)]
pub struct LinkWriter {
    signing_key: SigningKey,
    nonce: u64,
    key: BlobKey,
    content_version: u64,
}

impl LinkWriter {
    fn generate() -> Result<Self, BlobError> {
        let mut nonce = [0u8; 8];
        getrandom::getrandom(&mut nonce)
            .map_err(|e| KeyError::from(anyhow::anyhow!("failed to generate nonce: {}", e)))?;
        Ok(Self {
            signing_key: SigningKey::generate()?,
            nonce: u64::from_be_bytes(nonce),
            key: BlobKey::generate()?,
            content_version: 0,
        })
    }

    pub fn blob_name(&self) -> BlobName {
        self.header(Vec::new()).blob_name()
    }

    pub fn key(&self) -> &BlobKey {
        &self.key
    }

    pub fn public_key(&self) -> PublicKey {
        self.signing_key.public()
    }

    /// Content version of the most recently sealed revision
    pub fn content_version(&self) -> u64 {
        self.content_version
    }

    fn header(&self, iv: Vec<u8>) -> LinkPayload {
        LinkPayload {
            version: LINK_VERSION,
            public_key: self.signing_key.public().to_bytes(),
            nonce: self.nonce,
            signature: [0; SIGNATURE_SIZE],
            content_version: self.content_version,
            iv,
        }
    }

    /// Encrypt and sign a new revision, returning the bytes to store.
    fn seal(&mut self, target: &[u8]) -> Result<Vec<u8>, BlobError> {
        let iv = crate::crypto::random_nonce()?;
        let ciphertext = self.key.encrypt_with_iv(&iv, target)?;

        self.content_version += 1;
        let mut payload = self.header(iv.to_vec());
        let name = payload.blob_name();
        payload.signature = self
            .signing_key
            .sign(&payload.signed_message(&name, &ciphertext))
            .to_bytes();

        let mut out = payload.encode()?;
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }
}

/// Encrypted blob access on top of a [`Datastore`]
#[derive(Debug, Clone)]
pub struct EncryptedBlobs {
    datastore: Datastore,
}

impl EncryptedBlobs {
    pub fn new(datastore: Datastore) -> Self {
        Self { datastore }
    }

    pub fn datastore(&self) -> &Datastore {
        &self.datastore
    }

    /// Read the stored bytes of a blob without any decryption or checks.
    pub async fn open_raw(&self, name: &BlobName) -> Result<Bytes, BlobError> {
        Ok(self.datastore.open(name).await?)
    }

    /// Read, verify and decrypt a blob.
    pub async fn open(&self, name: &BlobName, key: &BlobKey) -> Result<Vec<u8>, BlobError> {
        let raw = self.open_raw(name).await?;
        match name.blob_type() {
            BlobType::Static => {
                if BlobName::from_content(BlobType::Static, &raw) != *name {
                    return Err(BlobError::NameMismatch(*name));
                }
                Ok(key.decrypt(&raw)?)
            }
            BlobType::DynamicLink => {
                let (payload, ciphertext) = LinkPayload::parse_with_body(&raw)?;
                verify_link(name, &payload, ciphertext)?;
                Ok(key.decrypt_with_iv(&payload.iv, ciphertext)?)
            }
        }
    }

    /// Encrypt and store static content under a fresh key.
    pub async fn create_static(&self, data: &[u8]) -> Result<(BlobName, BlobKey), BlobError> {
        let key = BlobKey::generate()?;
        let sealed = key.encrypt(data)?;
        let name = BlobName::from_content(BlobType::Static, &sealed);
        self.datastore.put(&name, Bytes::from(sealed)).await?;
        Ok((name, key))
    }

    /// Create a new dynamic link whose first revision points at `target`.
    pub async fn create_link(
        &self,
        target: &[u8],
    ) -> Result<(BlobName, BlobKey, LinkWriter), BlobError> {
        let mut writer = LinkWriter::generate()?;
        let sealed = writer.seal(target)?;
        let name = writer.blob_name();
        self.datastore.put(&name, Bytes::from(sealed)).await?;
        tracing::debug!(link = %name, "created dynamic link");
        Ok((name, writer.key.clone(), writer))
    }

    /// Publish a new revision of an existing link.
    pub async fn update_link(
        &self,
        name: &BlobName,
        writer: &mut LinkWriter,
        target: &[u8],
    ) -> Result<(), BlobError> {
        if writer.blob_name() != *name {
            return Err(BlobError::ForeignLink(*name));
        }
        let sealed = writer.seal(target)?;
        self.datastore.put(name, Bytes::from(sealed)).await?;
        tracing::debug!(
            link = %name,
            content_version = writer.content_version,
            "updated dynamic link"
        );
        Ok(())
    }
}

fn verify_link(name: &BlobName, payload: &LinkPayload, ciphertext: &[u8]) -> Result<(), BlobError> {
    if payload.blob_name() != *name {
        return Err(BlobError::NameMismatch(*name));
    }
    if payload.iv.len() != NONCE_SIZE {
        return Err(BlobError::InvalidSignature(*name));
    }
    let public_key = PublicKey::from_bytes(&payload.public_key)
        .map_err(|_| BlobError::InvalidSignature(*name))?;
    let signature = Signature::from_bytes(&payload.signature);
    public_key
        .verify(&payload.signed_message(name, ciphertext), &signature)
        .map_err(|_| BlobError::InvalidSignature(*name))
}
