pub mod config;
pub mod logging;
pub mod service_exporter;
pub mod service_runtime;
