use std::fmt;

use ed25519_dalek::{Signature, Signer};

use super::KeyError;

/// Size of Ed25519 public key in bytes
pub const PUBLIC_KEY_SIZE: usize = ed25519_dalek::PUBLIC_KEY_LENGTH;
/// Size of Ed25519 signature in bytes
pub const SIGNATURE_SIZE: usize = ed25519_dalek::SIGNATURE_LENGTH;
/// Size of Ed25519 private key in bytes
pub const PRIVATE_KEY_SIZE: usize = ed25519_dalek::SECRET_KEY_LENGTH;

/// Public half of a dynamic link's keypair
///
/// Embedded in every link envelope; readers use it to verify that a link
/// revision was produced by the link's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(ed25519_dalek::VerifyingKey);

impl PublicKey {
    /// Parse a public key from raw bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid compressed Edwards point.
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_SIZE]) -> Result<Self, KeyError> {
        let key = ed25519_dalek::VerifyingKey::from_bytes(bytes)
            .map_err(|e| anyhow::anyhow!("invalid public key: {}", e))?;
        Ok(Self(key))
    }

    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0.to_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Verify an Ed25519 signature on a message.
    pub fn verify(
        &self,
        msg: &[u8],
        signature: &Signature,
    ) -> Result<(), ed25519_dalek::SignatureError> {
        self.0.verify_strict(msg, signature)
    }
}

/// Private half of a dynamic link's keypair
///
/// Whoever holds this key can publish new revisions of the link.
#[derive(Clone)]
pub struct SigningKey(ed25519_dalek::SigningKey);

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SigningKey").field(&self.public()).finish()
    }
}

impl From<[u8; PRIVATE_KEY_SIZE]> for SigningKey {
    fn from(secret: [u8; PRIVATE_KEY_SIZE]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(&secret))
    }
}

impl SigningKey {
    /// Generate a new random signing key using the system RNG
    pub fn generate() -> Result<Self, KeyError> {
        let mut bytes = [0u8; PRIVATE_KEY_SIZE];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| anyhow::anyhow!("failed to generate signing key: {}", e))?;
        Ok(Self::from(bytes))
    }

    pub fn public(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    pub fn sign(&self, msg: &[u8]) -> Signature {
        self.0.sign(msg)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let key = SigningKey::generate().unwrap();
        let signature = key.sign(b"revision 1");

        let public = key.public();
        assert!(public.verify(b"revision 1", &signature).is_ok());
        assert!(public.verify(b"revision 2", &signature).is_err());
    }

    #[test]
    fn test_public_key_bytes_roundtrip() {
        let public = SigningKey::generate().unwrap().public();
        let recovered = PublicKey::from_bytes(&public.to_bytes()).unwrap();
        assert_eq!(public, recovered);
        assert_eq!(public.to_hex().len(), PUBLIC_KEY_SIZE * 2);
    }

    #[test]
    fn test_debug_hides_secret() {
        let key = SigningKey::from([3u8; PRIVATE_KEY_SIZE]);
        let debug = format!("{:?}", key);
        assert!(debug.starts_with("SigningKey(PublicKey("));
    }
}
