use std::sync::Arc;

use common::blob::EncryptedBlobs;
use common::datastore::{Datastore, DatastoreError};

use crate::inspector::Inspector;
use crate::resolve::resolve_text;
use crate::service_config::Config;
use crate::view::RenderedView;

/// Read-only state shared by all requests
#[derive(Debug, Clone)]
pub struct State {
    inspector: Inspector,
    default_entrypoint: Arc<str>,
}

impl State {
    pub fn new(datastore: Datastore, default_entrypoint: &str) -> Self {
        Self {
            inspector: Inspector::new(EncryptedBlobs::new(datastore)),
            default_entrypoint: Arc::from(default_entrypoint),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        let datastore = Datastore::from_location(&config.datastore)?;
        tracing::info!(location = datastore.location(), "opened datastore");
        Ok(Self::new(datastore, &config.entrypoint))
    }

    pub fn inspector(&self) -> &Inspector {
        &self.inspector
    }

    pub fn default_entrypoint(&self) -> &str {
        &self.default_entrypoint
    }

    /// Resolve and inspect an entrypoint given as text.
    pub async fn view(&self, text: &str) -> RenderedView {
        self.inspector
            .inspect(resolve_text(text, ""))
            .await
            .with_default_entrypoint(self.default_entrypoint.as_ref())
            .with_requested(text)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("could not create main datastore: {0}")]
    Datastore(#[from] DatastoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_datastore() {
        let config = Config {
            datastore: "/non-existing/folder".to_string(),
            ..Default::default()
        };
        let err = State::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("could not create main datastore"));

        let config = Config {
            datastore: String::new(),
            ..Default::default()
        };
        assert!(State::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_view_carries_default_entrypoint() {
        let state = State::new(Datastore::memory(), "start");
        let view = state.view("").await;

        assert_eq!(view.default_entrypoint(), "start");
        assert_eq!(view.entry().error_message(), "Missing entrypoint data");
    }

    #[tokio::test]
    async fn test_view_keeps_requested_text() {
        let state = State::new(Datastore::memory(), "start");
        let view = state.view("not-a-base58!").await;

        assert_eq!(view.requested(), "not-a-base58!");
        assert_eq!(view.entry().text(), "");
        assert_eq!(
            view.entry().error_message(),
            "invalid entrypoint - not a base58 data"
        );
    }
}
