/**
 * Content addressing and encrypted blob access.
 *  - Blob names and types
 *  - Dynamic link envelopes
 *  - Opening and creating encrypted blobs
 */
pub mod blob;
/**
 * Helper for writing whole trees of files,
 *  directories and links into a datastore.
 *  Mostly useful for fixtures; the viewer
 *  itself never writes.
 */
pub mod builder;
/**
 * Cryptographic types and operations.
 *  - Symmetric blob keys
 *  - Ed25519 signing keys for dynamic links
 */
pub mod crypto;
/**
 * Raw blob storage backends resolved from
 *  a location string.
 */
pub mod datastore;
/**
 * Binary encodings of entrypoint references
 *  and directory listings.
 */
pub mod entrypoint;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::blob::{BlobError, BlobName, BlobType, EncryptedBlobs, LinkPayload, LinkWriter};
    pub use crate::builder::{BuilderError, TreeBuilder};
    pub use crate::crypto::{BlobKey, PublicKey, SigningKey};
    pub use crate::datastore::{Datastore, DatastoreError};
    pub use crate::entrypoint::{Directory, DirectoryEntry, Reference, DIR_MIME_TYPE};
    pub use crate::version::build_info;
}
