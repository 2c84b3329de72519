pub mod inspect;
pub mod serve;
pub mod version;

pub use inspect::Inspect;
pub use serve::Serve;
pub use version::Version;
