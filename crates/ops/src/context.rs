//! Operations context for dependency injection

use keg_config::Config;
use keg_errors::{Error, OpsError};
use keg_events::{EventEmitter, EventSender};
use keg_net::NetClient;
use keg_platform::{Platform, PlatformContext};
use keg_types::HostPlatform;
use std::path::PathBuf;

use crate::FormulaRegistry;

/// Operations context providing access to all system components
pub struct OpsCtx {
    /// Descriptors known by name
    pub registry: FormulaRegistry,
    /// Network client
    pub net: NetClient,
    /// Filesystem and process access
    pub platform: Platform,
    /// Host the platform gates are evaluated against
    pub host: HostPlatform,
    /// Event sender for progress reporting
    pub tx: EventSender,
    /// System configuration
    pub config: Config,
}

impl OpsCtx {
    /// Install root
    #[must_use]
    pub fn root(&self) -> PathBuf {
        self.config.root()
    }

    /// Platform context whose events are correlated with `package`
    #[must_use]
    pub fn platform_context(&self, package: &str) -> PlatformContext {
        PlatformContext::for_package(Some(self.tx.clone()), package)
    }
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

/// Builder for [`OpsCtx`]
#[derive(Default)]
pub struct OpsContextBuilder {
    registry: Option<FormulaRegistry>,
    net: Option<NetClient>,
    platform: Option<Platform>,
    host: Option<HostPlatform>,
    tx: Option<EventSender>,
    config: Option<Config>,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_registry(mut self, registry: FormulaRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set network client
    #[must_use]
    pub fn with_net(mut self, net: NetClient) -> Self {
        self.net = Some(net);
        self
    }

    /// Set platform; defaults to the running host
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: HostPlatform) -> Self {
        self.host = Some(host);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the context
    ///
    /// # Errors
    ///
    /// Returns an error if any required component is missing.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let registry = self.registry.ok_or_else(|| missing("registry"))?;
        let net = self.net.ok_or_else(|| missing("net"))?;
        let host = self.host.ok_or_else(|| missing("host"))?;
        let tx = self.tx.ok_or_else(|| missing("event_sender"))?;
        let config = self.config.ok_or_else(|| missing("config"))?;

        Ok(OpsCtx {
            registry,
            net,
            platform: self.platform.unwrap_or_else(Platform::current),
            host,
            tx,
            config,
        })
    }
}

fn missing(component: &str) -> Error {
    OpsError::MissingComponent {
        component: component.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use keg_types::OsVersion;

    #[test]
    fn test_builder_reports_missing_component() {
        let (tx, _rx) = keg_events::channel();
        let err = OpsContextBuilder::new()
            .with_event_sender(tx)
            .with_config(Config::default())
            .with_host(HostPlatform::macos(OsVersion::new(10, 14, 0)))
            .with_registry(FormulaRegistry::default())
            .build()
            .err()
            .unwrap();
        assert!(matches!(
            err,
            Error::Ops(OpsError::MissingComponent { ref component }) if component == "net"
        ));
    }
}
