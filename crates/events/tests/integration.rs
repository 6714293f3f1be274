//! Integration tests for events

use keg_events::*;

struct PackageScope {
    sender: EventSender,
    package: String,
}

impl EventEmitter for PackageScope {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.sender)
    }

    fn correlation_id(&self) -> Option<&str> {
        Some(&self.package)
    }
}

#[tokio::test]
async fn test_scoped_emitter_stamps_correlation_id() {
    let (tx, mut rx) = channel();
    let scope = PackageScope {
        sender: tx,
        package: "powershell".to_string(),
    };

    scope.emit(AppEvent::Install(InstallEvent::Caveats {
        package: "powershell".to_string(),
        text: "run pwsh".to_string(),
    }));

    let message = rx.recv().await.unwrap();
    assert_eq!(message.meta.correlation_id.as_deref(), Some("powershell"));
    assert_eq!(message.meta.source, EventSource::INSTALL);
    assert_eq!(message.meta.level, EventLevel::Info);
}

#[tokio::test]
async fn test_failed_gate_is_a_warning() {
    let (tx, mut rx) = channel();
    tx.emit(AppEvent::Install(InstallEvent::GateChecked {
        package: "powershell".to_string(),
        requirement: Some("macOS >= 10.13".to_string()),
        host: "macOS 10.12".to_string(),
        allowed: false,
    }));

    let message = rx.recv().await.unwrap();
    assert_eq!(message.meta.level, EventLevel::Warn);
    assert_eq!(message.event.log_target(), "keg::events::install");
}

#[test]
fn test_failures_log_at_error() {
    let event = AppEvent::Test(TestEvent::Failed {
        package: "powershell".to_string(),
        invocation: "pwsh -v".to_string(),
        status: "exited with status 1".to_string(),
    });
    assert_eq!(event.log_level(), tracing::Level::ERROR);
}
