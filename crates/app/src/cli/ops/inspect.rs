use clap::Args;

use analyzer::service_config::ConfigError;
use analyzer::view::render_json;
use analyzer::{ServiceState, StateSetupError};

/// Print the JSON view of one entrypoint without starting the server
#[derive(Args, Debug, Clone)]
pub struct Inspect {
    /// Entrypoint text, defaults to the configured entrypoint
    pub entrypoint: Option<String>,

    #[arg(short, long, env = "BLOBVIEW_DATASTORE")]
    pub datastore: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateSetupError),

    #[error("could not render view: {0}")]
    Render(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Inspect {
    type Error = InspectError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut config = ctx.file_config.clone().into_config()?;
        if let Some(datastore) = &self.datastore {
            config.datastore = datastore.clone();
        }

        let state = ServiceState::from_config(&config)?;
        let text = self.entrypoint.as_deref().unwrap_or(&config.entrypoint);
        let view = state.view(text).await;

        Ok(render_json(&view)?)
    }
}
