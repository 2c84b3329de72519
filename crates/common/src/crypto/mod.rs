//! Cryptographic primitives for blob storage
//!
//! - **Content encryption**: every blob is sealed with its own ChaCha20-Poly1305
//!   [`BlobKey`]. The key travels inside the entrypoint that names the blob, so
//!   holding an entrypoint is what grants read access.
//! - **Dynamic links**: a link is owned by an Ed25519 [`SigningKey`]. Every
//!   revision of the link is signed, and readers check the signature against
//!   the [`PublicKey`] embedded in the link envelope.

mod key;
mod signing;

pub use ed25519_dalek::Signature;
pub use key::{BlobKey, KeyError, KEY_SIZE, NONCE_SIZE};
pub(crate) use key::random_nonce;
pub use signing::{PublicKey, SigningKey, PUBLIC_KEY_SIZE, SIGNATURE_SIZE};
