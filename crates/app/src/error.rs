use common::blob::LinkPayloadError;

/// Everything that can go wrong while turning an entrypoint into a view.
///
/// None of these abort a request. They end up as fields of the rendered view
/// next to whatever data could still be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("Missing entrypoint data")]
    MissingReference,

    #[error("invalid entrypoint - not a base58 data")]
    NotBase58,

    #[error("invalid entrypoint - {0}")]
    MalformedReference(String),

    #[error("truncated link payload: not enough data")]
    TruncatedLinkPayload,

    #[error("invalid iv size: {0:#04x}")]
    InvalidIvSize(u8),

    #[error("{0}")]
    ContentRead(String),

    #[error("invalid directory - {0}")]
    DirectoryDecode(String),

    #[error("invalid link target - {0}")]
    LinkDecode(String),
}

impl From<LinkPayloadError> for ViewError {
    fn from(err: LinkPayloadError) -> Self {
        match err {
            LinkPayloadError::Truncated => ViewError::TruncatedLinkPayload,
            LinkPayloadError::InvalidIvSize(size) => ViewError::InvalidIvSize(size),
        }
    }
}
