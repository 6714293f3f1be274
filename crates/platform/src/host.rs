//! Host operating system detection

use keg_errors::PlatformError;
use keg_events::{AppEvent, EventEmitter, PlatformEvent};
use keg_types::{HostPlatform, OsFamily, OsVersion};

use crate::core::{Platform, PlatformContext};
use crate::process::PlatformCommand;

const SW_VERS: &str = "/usr/bin/sw_vers";

/// Parse the output of `sw_vers -productVersion`
///
/// # Errors
///
/// Returns an error if the output is not a dotted version number.
pub fn parse_product_version(stdout: &str) -> Result<OsVersion, PlatformError> {
    let trimmed = stdout.trim();
    trimmed
        .parse::<OsVersion>()
        .ok()
        .filter(|_| trimmed.starts_with(|c: char| c.is_ascii_digit()))
        .ok_or_else(|| PlatformError::HostDetectionFailed {
            message: format!("unexpected sw_vers output: {trimmed:?}"),
        })
}

/// Identify the host the gate is evaluated against
///
/// An `override_version` short-circuits detection and reports macOS at that
/// version. On macOS the version comes from `sw_vers`; if that cannot be run
/// the version is left unknown, which closes every gate. Other systems never
/// report a version.
pub async fn detect_host(
    platform: &Platform,
    ctx: &PlatformContext,
    override_version: Option<OsVersion>,
) -> HostPlatform {
    let host = match override_version {
        Some(version) => {
            tracing::debug!(%version, "using configured OS version");
            HostPlatform::macos(version)
        }
        None => match OsFamily::current() {
            OsFamily::MacOs => HostPlatform::new(OsFamily::MacOs, macos_version(platform, ctx).await),
            family => HostPlatform::new(family, None),
        },
    };

    ctx.emit(AppEvent::Platform(PlatformEvent::HostDetected {
        family: host.family.to_string(),
        version: host.version.map(|v| v.to_string()),
    }));
    host
}

async fn macos_version(platform: &Platform, ctx: &PlatformContext) -> Option<OsVersion> {
    let mut cmd = PlatformCommand::new(SW_VERS);
    cmd.arg("-productVersion");

    let result = match platform.process().execute_command(ctx, cmd).await {
        Ok(output) if output.status.success() => parse_product_version(&output.stdout_lossy()),
        Ok(output) => Err(PlatformError::HostDetectionFailed {
            message: format!("sw_vers exited with {}", output.status),
        }),
        Err(e) => Err(e),
    };

    match result {
        Ok(version) => Some(version),
        Err(e) => {
            ctx.emit_warning_with_context("could not determine macOS version", e.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_product_version() {
        assert_eq!(
            parse_product_version("10.14.6\n").unwrap(),
            OsVersion::new(10, 14, 6)
        );
        assert_eq!(parse_product_version("14.5").unwrap(), OsVersion::new(14, 5, 0));
        assert!(parse_product_version("").is_err());
        assert!(parse_product_version("sonoma").is_err());
    }

    #[tokio::test]
    async fn test_override_wins() {
        let platform = Platform::current();
        let ctx = PlatformContext::default();
        let host = detect_host(&platform, &ctx, Some(OsVersion::new(10, 12, 0))).await;
        assert_eq!(host, HostPlatform::macos(OsVersion::new(10, 12, 0)));
    }

    #[cfg(not(target_os = "macos"))]
    #[tokio::test]
    async fn test_non_macos_host_has_no_version() {
        let platform = Platform::current();
        let host = detect_host(&platform, &PlatformContext::default(), None).await;
        assert_eq!(host.family, OsFamily::current());
        assert_eq!(host.version, None);
    }
}
