//! Core platform abstractions and context management

use keg_events::{EventEmitter, EventSender};
use std::time::{Duration, Instant};

use crate::filesystem::FilesystemOperations;
use crate::process::{PlatformCommand, ProcessOperations};

/// Context for platform operations: where events go and which package they concern
#[derive(Clone, Default)]
pub struct PlatformContext {
    event_sender: Option<EventSender>,
    package: Option<String>,
}

impl PlatformContext {
    #[must_use]
    pub fn new(event_sender: Option<EventSender>) -> Self {
        Self {
            event_sender,
            package: None,
        }
    }

    /// Context whose events are correlated with `package`
    #[must_use]
    pub fn for_package(event_sender: Option<EventSender>, package: &str) -> Self {
        Self {
            event_sender,
            package: Some(package.to_string()),
        }
    }

    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }
}

impl EventEmitter for PlatformContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }

    fn correlation_id(&self) -> Option<&str> {
        self.package.as_deref()
    }
}

/// Wall-clock timer for operation metrics
pub(crate) struct OperationTimer(Instant);

impl OperationTimer {
    pub(crate) fn start() -> Self {
        Self(Instant::now())
    }

    pub(crate) fn elapsed_ms(&self) -> u64 {
        duration_to_millis(self.0.elapsed())
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Main platform abstraction providing access to all platform operations
pub struct Platform {
    filesystem_ops: Box<dyn FilesystemOperations>,
    process_ops: Box<dyn ProcessOperations>,
}

impl Platform {
    #[must_use]
    pub fn new(
        filesystem_ops: Box<dyn FilesystemOperations>,
        process_ops: Box<dyn ProcessOperations>,
    ) -> Self {
        Self {
            filesystem_ops,
            process_ops,
        }
    }

    /// Platform backed by the running Unix host
    #[must_use]
    pub fn current() -> Self {
        crate::implementations::unix::UnixPlatform::create()
    }

    #[must_use]
    pub fn filesystem(&self) -> &dyn FilesystemOperations {
        &*self.filesystem_ops
    }

    #[must_use]
    pub fn process(&self) -> &dyn ProcessOperations {
        &*self.process_ops
    }

    #[must_use]
    pub fn create_context(&self, event_sender: Option<EventSender>) -> PlatformContext {
        PlatformContext::new(event_sender)
    }

    /// Convenience method: create a new command builder
    #[must_use]
    pub fn command(&self, program: &str) -> PlatformCommand {
        PlatformCommand::new(program)
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform").finish_non_exhaustive()
    }
}
