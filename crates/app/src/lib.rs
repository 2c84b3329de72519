// Entrypoint handling
pub mod codec;
pub mod error;
pub mod inspector;
pub mod resolve;
pub mod view;

// Service modules
pub mod http_server;
pub mod process;
pub mod service_config;
pub mod service_state;

pub use process::{spawn_service, start_service, ShutdownHandle, StartError};
pub use service_config::Config as ServiceConfig;
pub use service_state::{State as ServiceState, StateSetupError};
