use std::path::PathBuf;

use clap::Args;

use analyzer::service_config::{ConfigError, FileConfig};
use analyzer::{spawn_service, ServiceConfig, StartError};

#[derive(Args, Debug, Clone, Default)]
pub struct Serve {
    /// Datastore location: memory://, file:///dir, a plain path, s3://bucket or an http(s) URL
    #[arg(short, long, env = "BLOBVIEW_DATASTORE")]
    pub datastore: Option<String>,

    /// Entrypoint the root page redirects to
    #[arg(short, long, env = "BLOBVIEW_ENTRYPOINT")]
    pub entrypoint: Option<String>,

    /// HTTP port to listen on
    #[arg(short, long, env = "BLOBVIEW_PORT")]
    pub port: Option<u16>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    #[arg(long, env = "BLOBVIEW_LOG_LEVEL")]
    pub log_level: Option<tracing::Level>,
}

impl Serve {
    /// Flags win over the config file, which wins over defaults.
    pub fn service_config(&self, file_config: &FileConfig) -> Result<ServiceConfig, ConfigError> {
        let mut config = file_config.clone().into_config()?;
        if let Some(datastore) = &self.datastore {
            config.datastore = datastore.clone();
        }
        if let Some(entrypoint) = &self.entrypoint {
            config.entrypoint = entrypoint.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(log_dir) = &self.log_dir {
            config.log_dir = Some(log_dir.clone());
        }
        if let Some(log_level) = self.log_level {
            config.log_level = log_level;
        }
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Start(#[from] StartError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = self.service_config(&ctx.file_config)?;
        spawn_service(&config).await?;
        Ok("viewer stopped".to_string())
    }
}
