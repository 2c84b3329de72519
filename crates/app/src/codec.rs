//! Text form of entrypoints
//!
//! An entrypoint travels as the Base58 encoding of its binary form. Only the
//! canonical encoding is accepted, so every valid text maps to exactly one
//! reference and back.

use common::entrypoint::Reference;

use crate::error::ViewError;

pub fn decode(text: &str) -> Result<Reference, ViewError> {
    if text.is_empty() {
        return Err(ViewError::MissingReference);
    }

    let bytes = bs58::decode(text)
        .into_vec()
        .map_err(|_| ViewError::NotBase58)?;
    if bs58::encode(&bytes).into_string() != text {
        return Err(ViewError::NotBase58);
    }

    decode_bytes(&bytes)
}

pub fn decode_bytes(bytes: &[u8]) -> Result<Reference, ViewError> {
    Reference::from_bytes(bytes).map_err(|e| ViewError::MalformedReference(e.to_string()))
}

pub fn encode(reference: &Reference) -> String {
    bs58::encode(reference.to_bytes()).into_string()
}
