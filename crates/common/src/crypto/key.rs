//! Blob encryption using ChaCha20-Poly1305
//!
//! Static blobs are stored as `nonce (12 bytes) || ciphertext || tag (16 bytes)`.
//! Dynamic links carry their nonce (the IV) in the link envelope instead, so
//! they use the `*_with_iv` variants and store only `ciphertext || tag`.

use std::ops::Deref;

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};

/// Size of ChaCha20-Poly1305 nonce in bytes
pub const NONCE_SIZE: usize = 12;
/// Size of ChaCha20-Poly1305 key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// Errors that can occur during key handling, encryption or decryption
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("key error: {0}")]
    Default(#[from] anyhow::Error),
}

/// A 256-bit symmetric key protecting a single blob
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct BlobKey([u8; KEY_SIZE]);

impl Deref for BlobKey {
    type Target = [u8; KEY_SIZE];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<[u8; KEY_SIZE]> for BlobKey {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        BlobKey(bytes)
    }
}

impl BlobKey {
    /// Generate a new random key using the system RNG
    pub fn generate() -> Result<Self, KeyError> {
        let mut buff = [0; KEY_SIZE];
        getrandom::getrandom(&mut buff)
            .map_err(|e| anyhow::anyhow!("failed to generate random key: {}", e))?;
        Ok(Self(buff))
    }

    /// Create a key from a byte slice
    ///
    /// # Errors
    ///
    /// Returns an error if the slice length is not exactly `KEY_SIZE` bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, KeyError> {
        let buff: [u8; KEY_SIZE] = data.try_into().map_err(|_| {
            anyhow::anyhow!(
                "invalid key size, expected {}, got {}",
                KEY_SIZE,
                data.len()
            )
        })?;
        Ok(buff.into())
    }

    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(self.bytes()))
    }

    /// Encrypt data under a fresh random nonce.
    ///
    /// The output format is: `nonce (12 bytes) || ciphertext || auth_tag (16 bytes)`.
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, KeyError> {
        let nonce = random_nonce()?;
        let ciphertext = self.encrypt_with_iv(&nonce, data)?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypt data produced by [`BlobKey::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns an error if the data is too short to contain a nonce or if the
    /// authentication tag does not verify (tampered data or wrong key).
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, KeyError> {
        if data.len() < NONCE_SIZE {
            return Err(anyhow::anyhow!("data too short for nonce").into());
        }
        let (nonce, ciphertext) = data.split_at(NONCE_SIZE);
        self.decrypt_with_iv(nonce, ciphertext)
    }

    /// Encrypt data under an explicit nonce, returning `ciphertext || tag` only.
    pub fn encrypt_with_iv(&self, iv: &[u8; NONCE_SIZE], data: &[u8]) -> Result<Vec<u8>, KeyError> {
        self.cipher()
            .encrypt(Nonce::from_slice(iv), data)
            .map_err(|_| anyhow::anyhow!("encrypt error").into())
    }

    /// Decrypt `ciphertext || tag` under an explicit nonce.
    pub fn decrypt_with_iv(&self, iv: &[u8], data: &[u8]) -> Result<Vec<u8>, KeyError> {
        if iv.len() != NONCE_SIZE {
            return Err(anyhow::anyhow!(
                "invalid iv size, expected {}, got {}",
                NONCE_SIZE,
                iv.len()
            )
            .into());
        }
        self.cipher()
            .decrypt(Nonce::from_slice(iv), data)
            .map_err(|_| anyhow::anyhow!("decrypt error").into())
    }
}

/// Generate a random ChaCha20-Poly1305 nonce
pub(crate) fn random_nonce() -> Result<[u8; NONCE_SIZE], KeyError> {
    let mut nonce = [0u8; NONCE_SIZE];
    getrandom::getrandom(&mut nonce)
        .map_err(|e| anyhow::anyhow!("failed to generate nonce: {}", e))?;
    Ok(nonce)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_key_encrypt_decrypt() {
        let key = BlobKey::generate().unwrap();
        let data = b"hello world, this is a test message for encryption";

        let encrypted = key.encrypt(data).unwrap();
        assert_eq!(encrypted.len(), NONCE_SIZE + data.len() + 16);
        let decrypted = key.decrypt(&encrypted).unwrap();

        assert_eq!(data.as_slice(), decrypted.as_slice());
    }

    #[test]
    fn test_wrong_key_fails() {
        let key = BlobKey::generate().unwrap();
        let other = BlobKey::generate().unwrap();

        let encrypted = key.encrypt(b"secret").unwrap();
        let err = other.decrypt(&encrypted).unwrap_err();
        assert!(err.to_string().contains("decrypt error"));
    }

    #[test]
    fn test_key_size_validation() {
        assert!(BlobKey::from_slice(&[1u8; 16]).is_err());
        assert!(BlobKey::from_slice(&[1u8; 64]).is_err());
        assert!(BlobKey::from_slice(&[1u8; KEY_SIZE]).is_ok());
    }

    #[test]
    fn test_explicit_iv() {
        let key = BlobKey::generate().unwrap();
        let iv = [7u8; NONCE_SIZE];

        let ciphertext = key.encrypt_with_iv(&iv, b"link target").unwrap();
        assert_eq!(key.decrypt_with_iv(&iv, &ciphertext).unwrap(), b"link target");
        assert!(key.decrypt_with_iv(&[7u8; 8], &ciphertext).is_err());
        assert!(key.decrypt_with_iv(&[8u8; NONCE_SIZE], &ciphertext).is_err());
    }

    #[test]
    fn test_tampered_data_fails() {
        let key = BlobKey::generate().unwrap();
        let mut encrypted = key.encrypt(b"test data for integrity check").unwrap();

        encrypted[NONCE_SIZE + 3] ^= 0xFF;
        assert!(key.decrypt(&encrypted).is_err());
        assert!(key.decrypt(&encrypted[..4]).is_err());
    }

    #[test]
    fn test_empty_data_encryption() {
        let key = BlobKey::generate().unwrap();

        let encrypted = key.encrypt(b"").unwrap();
        let decrypted = key.decrypt(&encrypted).unwrap();

        assert!(decrypted.is_empty());
    }
}
