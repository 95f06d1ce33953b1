use crate::adapters::bus::errors::BusError;
use crate::adapters::bus::message_bus::dispatch;
use crate::components::controller::Controller;
use crate::components::gateway::CookieGateway;
use crate::components::overlay::{Injection, PageOverlayAgent};
use crate::components::panel::InteractivePanel;
use crate::domain::models::message_models::Response;
use crate::domain::models::tab_models::InstallReason;
use crate::domain::traits::cookie_traits::CookieStore;
use crate::domain::traits::page_traits::{Clipboard, Document};
use crate::domain::traits::tab_traits::{ExtensionHost, TabQuery};
use crate::infrastructure::{MemoryCookieStore, MemoryTabs, StaticExtensionHost};
use crate::service::config::{RuntimeConfig, TokioConfig};
use crate::service::logging::init_tracing;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Tokio runtime initialization failed: {0}")]
    TokioInit(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// The browser-side capabilities the background controller runs against.
#[derive(Clone)]
pub struct HostBindings {
    pub cookie_store: Arc<dyn CookieStore>,
    pub tabs: Arc<dyn TabQuery>,
    pub extension: Arc<dyn ExtensionHost>,
}

impl HostBindings {
    pub fn in_memory() -> Self {
        Self {
            cookie_store: Arc::new(MemoryCookieStore::new()),
            tabs: Arc::new(MemoryTabs::new()),
            extension: Arc::new(StaticExtensionHost::default()),
        }
    }
}

enum TokioRuntime {
    Owned(Runtime),
    Provided(Arc<AssertUnwindSafe<Runtime>>),
}

pub struct ServiceRuntime {
    tokio_runtime: TokioRuntime,
    config: RuntimeConfig,
    gateway: Arc<CookieGateway>,
    controller: Arc<Controller>,
}

impl ServiceRuntime {
    pub fn initialize(config: RuntimeConfig, host: HostBindings) -> Result<Arc<Self>, InitError> {
        let tokio_runtime = Self::create_tokio_runtime(&config.tokio)?;
        Ok(Self::assemble(TokioRuntime::Owned(tokio_runtime), config, host))
    }

    pub fn with_tokio_runtime(
        config: RuntimeConfig,
        host: HostBindings,
        tokio_runtime: Arc<AssertUnwindSafe<Runtime>>,
    ) -> Result<Arc<Self>, InitError> {
        Ok(Self::assemble(
            TokioRuntime::Provided(tokio_runtime),
            config,
            host,
        ))
    }

    fn assemble(tokio_runtime: TokioRuntime, config: RuntimeConfig, host: HostBindings) -> Arc<Self> {
        if init_tracing(&config.logging) {
            info!(filter = %config.logging.filter, "tracing initialized");
        }

        let gateway = Arc::new(CookieGateway::new(
            host.cookie_store,
            Arc::clone(&host.tabs),
            &config.gateway,
        ));
        let controller = Arc::new(Controller::new(
            Arc::clone(&gateway),
            host.tabs,
            host.extension,
            config.controller.clone(),
        ));

        Arc::new(Self {
            tokio_runtime,
            config,
            gateway,
            controller,
        })
    }

    pub fn available_runtime(&self) -> &Runtime {
        match &self.tokio_runtime {
            TokioRuntime::Owned(runtime) => runtime,
            TokioRuntime::Provided(runtime) => &runtime.0,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn controller(&self) -> &Arc<Controller> {
        &self.controller
    }

    pub fn execute_async<F, R>(&self, future: F) -> R
    where
        F: Future<Output = R> + Send + 'static,
        R: Send + 'static,
    {
        self.available_runtime().block_on(future)
    }

    /// Delivers a raw message to the background controller.
    pub fn dispatch(&self, message: Value) -> tokio::task::JoinHandle<Result<Response, BusError>> {
        let controller = Arc::clone(&self.controller);

        self.available_runtime()
            .spawn(async move { dispatch(&controller, message).await })
    }

    pub fn install(&self, reason: InstallReason) -> tokio::task::JoinHandle<()> {
        let controller = Arc::clone(&self.controller);

        self.available_runtime()
            .spawn(async move { controller.on_installed(reason).await })
    }

    /// A fresh popup bound to the shared gateway. Call `open` on it to load.
    pub fn open_panel(
        &self,
        document: Arc<dyn Document>,
        clipboard: Arc<dyn Clipboard>,
    ) -> InteractivePanel {
        InteractivePanel::new(
            Arc::clone(&self.gateway),
            document,
            clipboard,
            self.config.panel.clone(),
        )
    }

    pub fn inject_overlay(
        &self,
        document: Arc<dyn Document>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Injection {
        PageOverlayAgent::inject(document, clipboard, self.config.overlay.clone())
    }

    fn create_tokio_runtime(tokio_config: &TokioConfig) -> Result<Runtime, InitError> {
        let mut builder = tokio::runtime::Builder::new_multi_thread();

        if let Some(threads) = tokio_config.worker_threads {
            if threads == 0 {
                return Err(InitError::Configuration(
                    "worker_threads must be greater than 0".to_string(),
                ));
            }
            builder.worker_threads(threads);
        }
        if let Some(stack_size) = tokio_config.thread_stack_size {
            builder.thread_stack_size(stack_size);
        }
        if let Some(prefix) = &tokio_config.thread_name_prefix {
            builder.thread_name(prefix);
        }

        builder
            .enable_all()
            .build()
            .map_err(|e| InitError::TokioInit(e.to_string()))
    }
}
