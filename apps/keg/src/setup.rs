//! System setup and initialization

use crate::error::CliError;
use keg_config::Config;
use keg_events::EventSender;
use keg_net::{NetClient, NetConfig};
use keg_ops::{FormulaRegistry, OpsContextBuilder, OpsCtx};
use keg_platform::{Platform, PlatformContext};
use keg_types::HostPlatform;
use tracing::{debug, info};

/// System setup and component initialization
pub struct SystemSetup {
    config: Config,
    platform: Platform,
    registry: FormulaRegistry,
    net: Option<NetClient>,
    host: Option<HostPlatform>,
}

impl SystemSetup {
    /// Create new system setup
    pub fn new(config: Config) -> Self {
        Self {
            config,
            platform: Platform::current(),
            registry: FormulaRegistry::default(),
            net: None,
            host: None,
        }
    }

    /// Initialize all system components
    ///
    /// Nothing is written to disk here; directories under the root are
    /// created by the operations that need them.
    pub async fn initialize(&mut self, events: &EventSender) -> Result<(), CliError> {
        info!(root = %self.config.root().display(), "Initializing keg");

        self.init_registry().await?;
        self.init_net()?;
        self.init_host(events).await?;

        Ok(())
    }

    async fn init_registry(&mut self) -> Result<(), CliError> {
        let dir = self.config.formula_dir();
        self.registry = FormulaRegistry::load(&dir).await?;
        debug!(
            dir = %dir.display(),
            formulae = self.registry.len(),
            "Formula registry loaded"
        );
        Ok(())
    }

    fn init_net(&mut self) -> Result<(), CliError> {
        let net = NetClient::new(NetConfig::from(&self.config.network))?;
        self.net = Some(net);
        Ok(())
    }

    async fn init_host(&mut self, events: &EventSender) -> Result<(), CliError> {
        let override_version = self.config.os_version_override()?;
        let ctx = PlatformContext::new(Some(events.clone()));
        let host = keg_platform::detect_host(&self.platform, &ctx, override_version).await;
        debug!(%host, "Host detected");
        self.host = Some(host);
        Ok(())
    }

    /// Hand the initialized components to the operations layer
    pub fn into_context(self, events: EventSender) -> Result<OpsCtx, CliError> {
        let mut builder = OpsContextBuilder::new()
            .with_registry(self.registry)
            .with_platform(self.platform)
            .with_event_sender(events)
            .with_config(self.config);
        if let Some(net) = self.net {
            builder = builder.with_net(net);
        }
        if let Some(host) = self.host {
            builder = builder.with_host(host);
        }
        Ok(builder.build()?)
    }
}
