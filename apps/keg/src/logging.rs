//! Structured logging integration for events
//!
//! Every event that reaches the CLI is also recorded as a tracing record
//! with structured fields, so `--debug` log files carry the full history of
//! an operation.

use keg_events::{
    AppEvent, DownloadEvent, EventMessage, GeneralEvent, InstallEvent, TestEvent, UninstallEvent,
};
use tracing::{debug, error, info, trace, warn, Level};

/// Log an event using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let event = &message.event;
    let meta = &message.meta;

    match event {
        AppEvent::Download(download_event) => match download_event {
            DownloadEvent::Started {
                url,
                package,
                total_bytes,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    url = %url,
                    package = ?package,
                    total_bytes = ?total_bytes,
                    "Download started"
                );
            }
            DownloadEvent::Progress {
                url,
                bytes_downloaded,
                total_bytes,
            } => {
                trace!(
                    source = meta.source.as_str(),
                    url = %url,
                    bytes_downloaded,
                    total_bytes = ?total_bytes,
                    "Download progress"
                );
            }
            DownloadEvent::Completed {
                url,
                package,
                bytes_downloaded,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    url = %url,
                    package = ?package,
                    bytes_downloaded,
                    "Download completed"
                );
            }
            DownloadEvent::Verified {
                url,
                package,
                sha256,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    url = %url,
                    package = ?package,
                    sha256 = %sha256,
                    "Checksum verified"
                );
            }
            DownloadEvent::Cached { url, package, path } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    url = %url,
                    package = ?package,
                    path = %path,
                    "Using cached archive"
                );
            }
            DownloadEvent::Failed {
                url,
                package,
                failure,
            } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    url = %url,
                    package = ?package,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Download failed"
                );
            }
        },

        AppEvent::Install(install_event) => match install_event {
            InstallEvent::GateChecked {
                package,
                requirement,
                host,
                allowed,
            } => {
                if *allowed {
                    info!(
                        source = meta.source.as_str(),
                        event_id = %meta.event_id,
                        correlation = ?meta.correlation_id,
                        package = %package,
                        requirement = ?requirement,
                        host = %host,
                        "Platform gate open"
                    );
                } else {
                    warn!(
                        source = meta.source.as_str(),
                        event_id = %meta.event_id,
                        correlation = ?meta.correlation_id,
                        package = %package,
                        requirement = ?requirement,
                        host = %host,
                        "Platform gate closed"
                    );
                }
            }
            InstallEvent::Started {
                package,
                version,
                prefix,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    package = %package,
                    version = %version,
                    prefix = %prefix,
                    "Package installation started"
                );
            }
            InstallEvent::StepCompleted {
                package,
                index,
                description,
            } => {
                debug!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    package = %package,
                    step = index,
                    description = %description,
                    "Install step completed"
                );
            }
            InstallEvent::Linked {
                package,
                link,
                target,
            } => {
                info!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    package = %package,
                    link = %link,
                    target = %target,
                    "Linked executable"
                );
            }
            InstallEvent::Completed {
                package,
                version,
                files_installed,
                duration_ms,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    package = %package,
                    version = %version,
                    files_installed,
                    duration_ms,
                    "Package installation completed"
                );
            }
            InstallEvent::Failed {
                package,
                version,
                failure,
            } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    package = %package,
                    version = %version,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Package installation failed"
                );
            }
            InstallEvent::Caveats { package, text } => {
                debug!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    package = %package,
                    caveats = %text,
                    "Caveats rendered"
                );
            }
        },

        AppEvent::Uninstall(uninstall_event) => match uninstall_event {
            UninstallEvent::Started { package, version } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    package = %package,
                    version = %version,
                    "Package uninstallation started"
                );
            }
            UninstallEvent::Completed {
                package,
                version,
                links_removed,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    package = %package,
                    version = %version,
                    links_removed,
                    "Package uninstallation completed"
                );
            }
            UninstallEvent::Failed {
                package,
                version,
                failure,
            } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    package = %package,
                    version = ?version,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Package uninstallation failed"
                );
            }
        },

        AppEvent::Test(test_event) => match test_event {
            TestEvent::Started {
                package,
                invocations,
            } => {
                info!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    package = %package,
                    invocations,
                    "Smoke test started"
                );
            }
            TestEvent::InvocationCompleted {
                package,
                invocation,
                exit_code,
                success,
            } => {
                debug!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    package = %package,
                    invocation = %invocation,
                    exit_code = ?exit_code,
                    success,
                    "Smoke test invocation finished"
                );
            }
            TestEvent::Passed { package } => {
                info!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    package = %package,
                    "Smoke test passed"
                );
            }
            TestEvent::Failed {
                package,
                invocation,
                status,
            } => {
                error!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    package = %package,
                    invocation = %invocation,
                    status = %status,
                    "Smoke test failed"
                );
            }
        },

        AppEvent::General(general_event) => match general_event {
            GeneralEvent::OperationStarted { operation } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    operation = %operation,
                    "Operation started"
                );
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    operation = %operation,
                    success,
                    "Operation completed"
                );
            }
            GeneralEvent::OperationFailed { operation, failure } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    operation = %operation,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Operation failed"
                );
            }
            GeneralEvent::Warning { message, context } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    message = %message,
                    context = ?context,
                    "Warning"
                );
            }
            GeneralEvent::Error { message, details } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    message = %message,
                    details = ?details,
                    "Error"
                );
            }
            GeneralEvent::DebugLog { message, context } => {
                debug!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    message = %message,
                    context = ?context,
                    "Debug log"
                );
            }
        },

        // Platform events are chatty; log them at whatever level they carry
        AppEvent::Platform(platform_event) => {
            let level = meta.tracing_level();
            if level == Level::ERROR {
                error!(source = meta.source.as_str(), correlation = ?meta.correlation_id, event = ?platform_event, "Platform event");
            } else if level == Level::WARN {
                warn!(source = meta.source.as_str(), correlation = ?meta.correlation_id, event = ?platform_event, "Platform event");
            } else if level == Level::INFO {
                info!(source = meta.source.as_str(), correlation = ?meta.correlation_id, event = ?platform_event, "Platform event");
            } else if level == Level::DEBUG {
                debug!(source = meta.source.as_str(), correlation = ?meta.correlation_id, event = ?platform_event, "Platform event");
            } else {
                trace!(source = meta.source.as_str(), correlation = ?meta.correlation_id, event = ?platform_event, "Platform event");
            }
        }
    }
}
