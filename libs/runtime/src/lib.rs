//! Process bootstrap shared by HR Portal binaries: layered configuration,
//! home directory resolution and logging initialization.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, AppConfig, CliArgs, LoggingConfig, PortalSection, Section,
    StorageBackend, StorageConfig,
};
