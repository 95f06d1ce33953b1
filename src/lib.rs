pub mod adapters;
pub mod components;
pub mod domain;
pub mod infrastructure;
pub mod service;
pub mod utils;

use crate::service::config::RuntimeConfig;
use crate::service::service_exporter::ServiceExporter;
use crate::service::service_runtime::{HostBindings, InitError};

pub fn initialize(config: RuntimeConfig, host: HostBindings) -> Result<ServiceExporter, InitError> {
    service::service_exporter::create_service_exporter(config, host)
}

/// Default configuration over in-memory browser backends.
pub fn init_default() -> Result<ServiceExporter, InitError> {
    let config = RuntimeConfig::default();
    initialize(config, HostBindings::in_memory())
}
