//! Event handling and progress display

use console::{Style, Term};
use keg_events::{
    AppEvent, DownloadEvent, EventMessage, GeneralEvent, InstallEvent, TestEvent, UninstallEvent,
};

/// Turns events into status lines on stderr and mirrors them to tracing
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    debug_enabled: bool,
    /// Suppress console output, e.g. in `--json` mode
    quiet: bool,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, debug_enabled: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            debug_enabled,
            quiet,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        crate::logging::log_event_with_tracing(&message);

        if self.quiet {
            return;
        }
        if let Some(line) = self.status_line(&message.event) {
            // best effort
            let _ = self.term.write_line(&line);
        }
    }

    /// Console line for an event, if it deserves one
    fn status_line(&self, event: &AppEvent) -> Option<String> {
        match event {
            AppEvent::Download(DownloadEvent::Started { url, .. }) => {
                Some(self.status(&format!("Downloading {}", file_name(url))))
            }
            AppEvent::Download(DownloadEvent::Verified { sha256, .. }) => {
                Some(self.status(&format!("Verified SHA-256 {sha256}")))
            }
            AppEvent::Download(DownloadEvent::Cached { path, .. }) => {
                Some(self.status(&format!("Already downloaded: {path}")))
            }
            AppEvent::Download(DownloadEvent::Failed { url, failure, .. }) => Some(
                self.error(&format!("Download of {url} failed: {}", failure.message)),
            ),

            AppEvent::Install(InstallEvent::GateChecked {
                package,
                requirement: Some(requirement),
                host,
                allowed: false,
            }) => Some(self.error(&format!(
                "{package} requires {requirement}; this host is {host}"
            ))),
            AppEvent::Install(InstallEvent::Started {
                package, version, ..
            }) => Some(self.status(&format!("Installing {package} {version}"))),
            AppEvent::Install(InstallEvent::StepCompleted { description, .. })
                if self.debug_enabled =>
            {
                Some(format!("    {description}"))
            }
            AppEvent::Install(InstallEvent::Linked { link, target, .. }) => {
                Some(format!("    {link} -> {target}"))
            }
            AppEvent::Install(InstallEvent::Failed {
                package, failure, ..
            }) => Some(self.error(&format!(
                "Installing {package} failed: {}",
                failure.message
            ))),

            AppEvent::Uninstall(UninstallEvent::Started { package, version }) => {
                Some(self.status(&format!("Uninstalling {package} {version}")))
            }

            AppEvent::Test(TestEvent::Started { package, .. }) => {
                Some(self.status(&format!("Testing {package}")))
            }
            AppEvent::Test(TestEvent::Failed {
                invocation, status, ..
            }) => Some(self.error(&format!("`{invocation}` {status}"))),

            AppEvent::General(GeneralEvent::Warning { message, context }) => {
                let text = match context {
                    Some(context) => format!("{message} ({context})"),
                    None => message.clone(),
                };
                Some(self.warning(&text))
            }
            AppEvent::General(GeneralEvent::DebugLog { message, .. }) if self.debug_enabled => {
                Some(format!("debug: {message}"))
            }

            _ => None,
        }
    }

    fn status(&self, message: &str) -> String {
        self.styled(Style::new().blue().bold(), "==>", message)
    }

    fn warning(&self, message: &str) -> String {
        self.styled(Style::new().yellow().bold(), "Warning:", message)
    }

    fn error(&self, message: &str) -> String {
        self.styled(Style::new().red().bold(), "Error:", message)
    }

    fn styled(&self, style: Style, prefix: &str, message: &str) -> String {
        if self.colors_enabled {
            format!("{} {message}", style.apply_to(prefix))
        } else {
            format!("{prefix} {message}")
        }
    }
}

fn file_name(url: &str) -> &str {
    url.rsplit('/').next().filter(|name| !name.is_empty()).unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keg_events::FailureContext;

    fn handler() -> EventHandler {
        EventHandler::new(false, false, false)
    }

    #[test]
    fn test_download_started_names_the_file() {
        let line = handler().status_line(&AppEvent::Download(DownloadEvent::Started {
            url: "https://example.com/dist/powershell-7.0.0-osx-x64.tar.gz".to_string(),
            package: Some("powershell".to_string()),
            total_bytes: None,
        }));
        assert_eq!(
            line.as_deref(),
            Some("==> Downloading powershell-7.0.0-osx-x64.tar.gz")
        );
    }

    #[test]
    fn test_closed_gate_is_an_error_line() {
        let line = handler().status_line(&AppEvent::Install(InstallEvent::GateChecked {
            package: "powershell".to_string(),
            requirement: Some("macOS >= 10.13 (high_sierra)".to_string()),
            host: "macOS 10.12".to_string(),
            allowed: false,
        }));
        assert!(line.unwrap().starts_with("Error: powershell requires"));
    }

    #[test]
    fn test_step_lines_only_in_debug() {
        let event = AppEvent::Install(InstallEvent::StepCompleted {
            package: "powershell".to_string(),
            index: 1,
            description: "copy all files into libexec".to_string(),
        });
        assert!(handler().status_line(&event).is_none());
        assert!(EventHandler::new(false, true, false)
            .status_line(&event)
            .is_some());
    }

    #[test]
    fn test_warning_line() {
        let line = handler().status_line(&AppEvent::General(GeneralEvent::warning(
            "smoke test could not be run",
        )));
        assert_eq!(line.as_deref(), Some("Warning: smoke test could not be run"));
    }

    #[test]
    fn test_quiet_handler_still_accepts_events() {
        let mut handler = EventHandler::new(false, false, true);
        handler.handle_event(EventMessage::from_event(AppEvent::Download(
            DownloadEvent::Failed {
                url: "https://example.com/a.tar.gz".to_string(),
                package: None,
                failure: FailureContext::new(None::<String>, "boom", None::<String>, false),
            },
        )));
    }
}
