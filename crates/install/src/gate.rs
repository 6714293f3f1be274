//! Platform gate evaluation

use keg_errors::InstallError;
use keg_types::{HostPlatform, PackageDescriptor};

/// Whether `descriptor` may be installed on `host`
///
/// Fails closed: a different OS family, an unknown host version or a version
/// below the declared minimum all close the gate. A descriptor without a
/// platform requirement is installable everywhere.
#[must_use]
pub fn resolve_platform_gate(descriptor: &PackageDescriptor, host: &HostPlatform) -> bool {
    let Some(requirement) = &descriptor.platform else {
        return true;
    };
    if host.family != requirement.family {
        return false;
    }
    host.version
        .is_some_and(|version| version >= requirement.min_version)
}

/// Like [`resolve_platform_gate`], but explains a closed gate
///
/// # Errors
///
/// Returns [`InstallError::PlatformUnsupported`] when the gate is closed.
pub fn ensure_platform(
    descriptor: &PackageDescriptor,
    host: &HostPlatform,
) -> Result<(), InstallError> {
    if resolve_platform_gate(descriptor, host) {
        return Ok(());
    }
    Err(InstallError::PlatformUnsupported {
        package: descriptor.name.clone(),
        required: descriptor
            .platform
            .as_ref()
            .map_or_else(String::new, ToString::to_string),
        current: host.to_string(),
    })
}
