//! Operating system families and versions used by platform gates

use keg_errors::VersionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// macOS release names accepted in place of a numeric version
const MACOS_RELEASES: &[(&str, OsVersion)] = &[
    ("yosemite", OsVersion::new(10, 10, 0)),
    ("el_capitan", OsVersion::new(10, 11, 0)),
    ("sierra", OsVersion::new(10, 12, 0)),
    ("high_sierra", OsVersion::new(10, 13, 0)),
    ("mojave", OsVersion::new(10, 14, 0)),
    ("catalina", OsVersion::new(10, 15, 0)),
    ("big_sur", OsVersion::new(11, 0, 0)),
    ("monterey", OsVersion::new(12, 0, 0)),
    ("ventura", OsVersion::new(13, 0, 0)),
    ("sonoma", OsVersion::new(14, 0, 0)),
    ("sequoia", OsVersion::new(15, 0, 0)),
];

/// Operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    #[serde(rename = "macos")]
    MacOs,
    Linux,
    Windows,
    Other,
}

impl OsFamily {
    /// Family of the OS this binary was compiled for
    #[must_use]
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            "windows" => Self::Windows,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MacOs => write!(f, "macOS"),
            Self::Linux => write!(f, "Linux"),
            Self::Windows => write!(f, "Windows"),
            Self::Other => write!(f, "unknown OS"),
        }
    }
}

impl FromStr for OsFamily {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "macos" | "darwin" | "osx" => Ok(Self::MacOs),
            "linux" => Ok(Self::Linux),
            "windows" => Ok(Self::Windows),
            other => Err(VersionError::InvalidVersion {
                input: other.to_string(),
            }),
        }
    }
}

/// A dotted numeric OS version (`10.13`, `10.14.6`, `11`)
///
/// Missing components are zero, so `10.13` and `10.13.0` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OsVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl OsVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Look up a macOS release name such as `high_sierra`
    #[must_use]
    pub fn from_macos_release(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        MACOS_RELEASES
            .iter()
            .find(|(release, _)| *release == normalized)
            .map(|(_, version)| *version)
    }

    /// The macOS release name for this version, if it has one
    #[must_use]
    pub fn macos_release_name(&self) -> Option<&'static str> {
        MACOS_RELEASES
            .iter()
            .rev()
            .find(|(_, version)| {
                version.major == self.major && (self.major >= 11 || version.minor == self.minor)
            })
            .map(|(name, _)| *name)
    }

    fn parse_numeric(input: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidVersion {
            input: input.to_string(),
        };

        let parts: Vec<&str> = input.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(invalid());
        }

        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *slot = part.parse().map_err(|_| invalid())?;
        }

        Ok(Self::new(numbers[0], numbers[1], numbers[2]))
    }
}

impl FromStr for OsVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
            Self::parse_numeric(trimmed)
        } else {
            Self::from_macos_release(trimmed).ok_or_else(|| VersionError::UnknownReleaseName {
                input: trimmed.to_string(),
            })
        }
    }
}

impl fmt::Display for OsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.patch == 0 {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        }
    }
}

impl Serialize for OsVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for OsVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The running host as seen by platform gates
///
/// `version` is `None` when it could not be determined; gates treat that as
/// unsupported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostPlatform {
    pub family: OsFamily,
    pub version: Option<OsVersion>,
}

impl HostPlatform {
    #[must_use]
    pub fn new(family: OsFamily, version: Option<OsVersion>) -> Self {
        Self { family, version }
    }

    #[must_use]
    pub fn macos(version: OsVersion) -> Self {
        Self::new(OsFamily::MacOs, Some(version))
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} {version}", self.family),
            None => write!(f, "{} (unknown version)", self.family),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_numeric_versions() {
        assert_eq!("10.13".parse::<OsVersion>().unwrap(), OsVersion::new(10, 13, 0));
        assert_eq!("10.14.6".parse::<OsVersion>().unwrap(), OsVersion::new(10, 14, 6));
        assert_eq!("11".parse::<OsVersion>().unwrap(), OsVersion::new(11, 0, 0));
        assert!("10..13".parse::<OsVersion>().is_err());
        assert!("10.13.1.2".parse::<OsVersion>().is_err());
        assert!("10.x".parse::<OsVersion>().is_err());
    }

    #[test]
    fn test_release_names() {
        assert_eq!(
            "high_sierra".parse::<OsVersion>().unwrap(),
            OsVersion::new(10, 13, 0)
        );
        assert_eq!("Big Sur".parse::<OsVersion>().unwrap(), OsVersion::new(11, 0, 0));
        assert!(matches!(
            "leopard_x".parse::<OsVersion>(),
            Err(VersionError::UnknownReleaseName { .. })
        ));
        assert_eq!(
            OsVersion::new(10, 13, 6).macos_release_name(),
            Some("high_sierra")
        );
        assert_eq!(OsVersion::new(14, 2, 1).macos_release_name(), Some("sonoma"));
    }

    #[test]
    fn test_ordering_matches_gate_scenarios() {
        let minimum = OsVersion::new(10, 13, 0);
        assert!("10.12".parse::<OsVersion>().unwrap() < minimum);
        assert!("10.14".parse::<OsVersion>().unwrap() > minimum);
        assert!("10.13.0".parse::<OsVersion>().unwrap() == minimum);
    }

    proptest! {
        #[test]
        fn prop_ordering_is_lexicographic(a in (0u32..30, 0u32..30, 0u32..30), b in (0u32..30, 0u32..30, 0u32..30)) {
            let va = OsVersion::new(a.0, a.1, a.2);
            let vb = OsVersion::new(b.0, b.1, b.2);
            prop_assert_eq!(va.cmp(&vb), a.cmp(&b));
        }

        #[test]
        fn prop_display_parses_back(major in 0u32..100, minor in 0u32..100, patch in 0u32..100) {
            let version = OsVersion::new(major, minor, patch);
            prop_assert_eq!(version.to_string().parse::<OsVersion>().unwrap(), version);
        }
    }
}
