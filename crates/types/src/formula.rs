//! Package descriptors ("formulae")
//!
//! A descriptor is an immutable record: where to download a prebuilt
//! archive, the digest it must match, the platform it needs, what it
//! conflicts with, and three install-time hooks expressed as data (install
//! steps, a caveats template and smoke-test invocations).
//!
//! Descriptors are written in TOML:
//!
//! ```toml
//! name = "powershell"
//! homepage = "https://github.com/powershell/powershell"
//! url = "https://github.com/PowerShell/PowerShell/releases/download/v7.0.0/powershell-7.0.0-osx-x64.tar.gz"
//! sha256 = "7ea2a539cb33f3c1c62280eea1d3b55cbd84c86676437a390e81c0ae374483e6"
//!
//! [depends_on]
//! macos = "high_sierra"
//!
//! [[install]]
//! action = "copy_all"
//! into = "libexec"
//! ```

use crate::checksum::{Checksum, ChecksumAlgorithm};
use crate::os::{OsFamily, OsVersion};
use keg_errors::FormulaError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/v?(\d+(?:\.\d+)+)/").unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

static VERSION_IN_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-_]v?(\d+(?:\.\d+)+)(?:[-_.]|$)")
        .unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

/// Whether a prebuilt bottle is looked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bottle {
    /// Upstream already ships a binary; nothing to pour
    #[default]
    Unneeded,
}

/// Minimum platform the package runs on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformRequirement {
    pub family: OsFamily,
    pub min_version: OsVersion,
}

impl fmt::Display for PlatformRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} >= {}", self.family, self.min_version)?;
        if self.family == OsFamily::MacOs {
            if let Some(name) = self.min_version.macos_release_name() {
                write!(f, " ({name})")?;
            }
        }
        Ok(())
    }
}

/// Which distribution form a conflicting package takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    Cask,
    Formula,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cask => write!(f, "cask"),
            Self::Formula => write!(f, "formula"),
        }
    }
}

/// A package that may not be installed alongside this one
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub name: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

/// Root a [`KegPath`] is relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KegDir {
    /// The versioned keg directory
    Prefix,
    /// Private files of the package
    Libexec,
    /// The public binary directory
    Bin,
}

impl KegDir {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prefix => "prefix",
            Self::Libexec => "libexec",
            Self::Bin => "bin",
        }
    }
}

impl FromStr for KegDir {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prefix" => Ok(Self::Prefix),
            "libexec" => Ok(Self::Libexec),
            "bin" => Ok(Self::Bin),
            other => Err(FormulaError::InvalidPath {
                value: other.to_string(),
                reason: "must start with prefix/, libexec/ or bin/".to_string(),
            }),
        }
    }
}

/// A path inside the install layout, written `libexec/pwsh`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KegPath {
    pub dir: KegDir,
    relative: PathBuf,
}

impl KegPath {
    /// # Errors
    ///
    /// Returns an error if `relative` is empty, absolute or escapes its root.
    pub fn new(dir: KegDir, relative: impl Into<PathBuf>) -> Result<Self, FormulaError> {
        let relative = relative.into();
        let invalid = |reason: &str| FormulaError::InvalidPath {
            value: format!("{}/{}", dir.as_str(), relative.display()),
            reason: reason.to_string(),
        };

        if relative.as_os_str().is_empty() {
            return Err(invalid("path names no file"));
        }
        for component in relative.components() {
            match component {
                Component::Normal(_) => {}
                Component::CurDir => return Err(invalid("`.` components are not allowed")),
                Component::ParentDir => return Err(invalid("`..` components are not allowed")),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid("path must be relative"))
                }
            }
        }

        Ok(Self { dir, relative })
    }

    #[must_use]
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// Last path component, used as the default link name
    #[must_use]
    pub fn file_name(&self) -> String {
        self.relative
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl FromStr for KegPath {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (dir, rest) = s.split_once('/').ok_or_else(|| FormulaError::InvalidPath {
            value: s.to_string(),
            reason: "must start with prefix/, libexec/ or bin/".to_string(),
        })?;
        Self::new(dir.parse()?, rest)
    }
}

impl TryFrom<String> for KegPath {
    type Error = FormulaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KegPath> for String {
    fn from(path: KegPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for KegPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.dir.as_str(), self.relative.display())
    }
}

/// Unix permission bits, written as an octal string (`"0555"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileMode(u32);

impl FileMode {
    /// # Errors
    ///
    /// Returns an error if `bits` has anything set outside `0o7777`.
    pub fn new(bits: u32) -> Result<Self, FormulaError> {
        if bits > 0o7777 {
            return Err(FormulaError::InvalidMode {
                value: format!("{bits:o}"),
            });
        }
        Ok(Self(bits))
    }

    #[must_use]
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Whether owner, group and others may all execute
    #[must_use]
    pub fn is_executable_by_all(self) -> bool {
        self.0 & 0o111 == 0o111
    }
}

impl FromStr for FileMode {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches("0o");
        let bits = u32::from_str_radix(digits, 8).map_err(|_| FormulaError::InvalidMode {
            value: s.to_string(),
        })?;
        Self::new(bits)
    }
}

impl TryFrom<String> for FileMode {
    type Error = FormulaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FileMode> for String {
    fn from(mode: FileMode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}

/// One operation of the install hook, applied in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InstallStep {
    /// Move every extracted file into `into`
    CopyAll { into: KegDir },
    /// Set permission bits on an installed file
    Chmod { path: KegPath, mode: FileMode },
    /// Link `bin/<name>` to `target`
    Symlink {
        target: KegPath,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl InstallStep {
    /// Name of the link a `Symlink` step creates in the bin directory
    #[must_use]
    pub fn link_name(&self) -> Option<String> {
        match self {
            Self::Symlink { target, name } => {
                Some(name.clone().unwrap_or_else(|| target.file_name()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for InstallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CopyAll { into } => write!(f, "copy all files into {}", into.as_str()),
            Self::Chmod { path, mode } => write!(f, "chmod {mode} {path}"),
            Self::Symlink { target, .. } => {
                write!(f, "link bin/{} -> {target}", self.link_name().unwrap_or_default())
            }
        }
    }
}

/// One smoke-test invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStep {
    pub exe: KegPath,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub expected_status: i32,
}

impl TestStep {
    /// Human-readable command line, e.g. `pwsh -c "1 + 1"`
    #[must_use]
    pub fn invocation(&self) -> String {
        let mut line = self.exe.file_name();
        for arg in &self.args {
            line.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                line.push('"');
                line.push_str(&arg.replace('"', "\\\""));
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// An immutable package descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescriptor {
    pub name: String,
    pub desc: Option<String>,
    pub homepage: String,
    pub url: String,
    pub version: String,
    pub checksum: Checksum,
    pub bottle: Bottle,
    pub platform: Option<PlatformRequirement>,
    pub conflicts: Vec<Conflict>,
    pub install: Vec<InstallStep>,
    pub caveats: Option<String>,
    pub test: Vec<TestStep>,
}

impl PackageDescriptor {
    /// Parse a descriptor from TOML
    ///
    /// `source_name` is used in error messages (usually the file path).
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a field fails validation.
    pub fn from_toml_str(source: &str, source_name: &str) -> Result<Self, FormulaError> {
        let file: FormulaFile = toml::from_str(source).map_err(|e| FormulaError::ParseError {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        Self::try_from(file)
    }

    /// Serialize back into the TOML file format
    ///
    /// # Errors
    ///
    /// Returns an error if TOML serialization fails.
    pub fn to_toml_string(&self) -> Result<String, FormulaError> {
        toml::to_string_pretty(&FormulaFile::from(self)).map_err(|e| FormulaError::ParseError {
            source_name: self.name.clone(),
            message: e.to_string(),
        })
    }

    /// Name of the file the archive is saved as
    #[must_use]
    pub fn archive_file_name(&self) -> String {
        self.url
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .map_or_else(|| format!("{}-{}.tar.gz", self.name, self.version), str::to_string)
    }
}

/// Infer a version from a download URL
///
/// Looks first for a `/v1.2.3/` path segment, then for `-1.2.3` in the file
/// name.
#[must_use]
pub fn infer_version(url: &str) -> Option<String> {
    if let Some(captures) = VERSION_SEGMENT.captures(url) {
        return Some(captures[1].to_string());
    }
    let file_name = url.rsplit('/').next()?;
    VERSION_IN_FILENAME
        .captures(file_name)
        .map(|captures| captures[1].to_string())
}

/// Names and versions become directories under the root, and link names
/// become entries of `bin`; each must be exactly one plain path component.
fn ensure_path_segment(field: &str, value: &str) -> Result<(), FormulaError> {
    let invalid = |message: &str| FormulaError::InvalidField {
        field: field.to_string(),
        message: format!("{value:?} {message}"),
    };

    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        _ if value.is_empty() => Err(invalid("is empty")),
        _ if value.contains('/') || value.contains('\\') => {
            Err(invalid("may not contain path separators"))
        }
        (Some(Component::Normal(segment)), None) if segment == value => Ok(()),
        _ => Err(invalid("must be a single path component, not `.` or `..`")),
    }
}

/// On-disk TOML shape of a descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct FormulaFile {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    desc: Option<String>,
    homepage: String,
    url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    sha256: String,
    #[serde(default)]
    bottle: Bottle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    caveats: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    depends_on: Option<DependsOn>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    conflicts_with: Vec<ConflictEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    install: Vec<InstallStep>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    test: Vec<TestStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DependsOn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    macos: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConflictEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cask: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    formula: Option<String>,
}

impl TryFrom<FormulaFile> for PackageDescriptor {
    type Error = FormulaError;

    fn try_from(file: FormulaFile) -> Result<Self, Self::Error> {
        if file.name.trim().is_empty() {
            return Err(FormulaError::MissingField {
                field: "name".to_string(),
            });
        }
        if file.url.trim().is_empty() {
            return Err(FormulaError::MissingField {
                field: "url".to_string(),
            });
        }

        ensure_path_segment("name", &file.name)?;

        let checksum = Checksum::parse(ChecksumAlgorithm::Sha256, &file.sha256)?;

        let version = match file.version {
            Some(version) if !version.trim().is_empty() => version,
            _ => infer_version(&file.url).ok_or_else(|| FormulaError::VersionNotInferable {
                url: file.url.clone(),
            })?,
        };
        ensure_path_segment("version", &version)?;

        for step in &file.install {
            if let InstallStep::Symlink { name: Some(name), .. } = step {
                ensure_path_segment("install.symlink.name", name)?;
            }
        }

        let platform = match file.depends_on.and_then(|d| d.macos) {
            Some(requirement) => {
                let min_version = requirement.trim_start_matches(">=").trim().parse().map_err(
                    |e: keg_errors::VersionError| FormulaError::InvalidField {
                        field: "depends_on.macos".to_string(),
                        message: e.to_string(),
                    },
                )?;
                Some(PlatformRequirement {
                    family: OsFamily::MacOs,
                    min_version,
                })
            }
            None => None,
        };

        let conflicts = file
            .conflicts_with
            .into_iter()
            .map(|entry| match (entry.cask, entry.formula) {
                (Some(name), None) => Ok(Conflict {
                    kind: ConflictKind::Cask,
                    name,
                }),
                (None, Some(name)) => Ok(Conflict {
                    kind: ConflictKind::Formula,
                    name,
                }),
                _ => Err(FormulaError::InvalidField {
                    field: "conflicts_with".to_string(),
                    message: "each entry names exactly one of `cask` or `formula`".to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: file.name,
            desc: file.desc,
            homepage: file.homepage,
            url: file.url,
            version,
            checksum,
            bottle: file.bottle,
            platform,
            conflicts,
            install: file.install,
            caveats: file.caveats,
            test: file.test,
        })
    }
}

impl From<&PackageDescriptor> for FormulaFile {
    fn from(descriptor: &PackageDescriptor) -> Self {
        let conflicts_with = descriptor
            .conflicts
            .iter()
            .map(|conflict| match conflict.kind {
                ConflictKind::Cask => ConflictEntry {
                    cask: Some(conflict.name.clone()),
                    formula: None,
                },
                ConflictKind::Formula => ConflictEntry {
                    cask: None,
                    formula: Some(conflict.name.clone()),
                },
            })
            .collect();

        Self {
            name: descriptor.name.clone(),
            desc: descriptor.desc.clone(),
            homepage: descriptor.homepage.clone(),
            url: descriptor.url.clone(),
            version: Some(descriptor.version.clone()),
            sha256: descriptor.checksum.digest().to_string(),
            bottle: descriptor.bottle,
            caveats: descriptor.caveats.clone(),
            depends_on: descriptor.platform.as_ref().map(|p| DependsOn {
                macos: Some(p.min_version.to_string()),
            }),
            conflicts_with,
            install: descriptor.install.clone(),
            test: descriptor.test.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMULA: &str = r#"
name = "powershell"
desc = "PowerShell"
homepage = "https://github.com/powershell/powershell"
url = "https://github.com/PowerShell/PowerShell/releases/download/v7.0.0/powershell-7.0.0-osx-x64.tar.gz"
sha256 = "7ea2a539cb33f3c1c62280eea1d3b55cbd84c86676437a390e81c0ae374483e6"
bottle = "unneeded"
caveats = "run {bin}/pwsh"

[depends_on]
macos = "high_sierra"

[[conflicts_with]]
cask = "powershell"

[[install]]
action = "copy_all"
into = "libexec"

[[install]]
action = "chmod"
path = "libexec/pwsh"
mode = "0555"

[[install]]
action = "symlink"
target = "libexec/pwsh"

[[test]]
exe = "bin/pwsh"
args = ["-v"]

[[test]]
exe = "bin/pwsh"
args = ["-c", "$psversiontable.psversion.tostring()"]
"#;

    #[test]
    fn test_parse_full_formula() {
        let descriptor = PackageDescriptor::from_toml_str(FORMULA, "powershell.toml").unwrap();
        assert_eq!(descriptor.name, "powershell");
        assert_eq!(descriptor.version, "7.0.0");
        assert_eq!(
            descriptor.platform,
            Some(PlatformRequirement {
                family: OsFamily::MacOs,
                min_version: OsVersion::new(10, 13, 0),
            })
        );
        assert_eq!(
            descriptor.conflicts,
            vec![Conflict {
                kind: ConflictKind::Cask,
                name: "powershell".to_string()
            }]
        );
        assert_eq!(descriptor.install.len(), 3);
        assert_eq!(descriptor.install[2].link_name().as_deref(), Some("pwsh"));
        assert_eq!(
            descriptor.test[1].invocation(),
            "pwsh -c $psversiontable.psversion.tostring()"
        );
        assert_eq!(
            descriptor.archive_file_name(),
            "powershell-7.0.0-osx-x64.tar.gz"
        );
    }

    #[test]
    fn test_malformed_checksum_is_rejected() {
        let broken = FORMULA.replace("483e6\"", "483e60\"");
        let err = PackageDescriptor::from_toml_str(&broken, "powershell.toml").unwrap_err();
        assert!(matches!(err, FormulaError::InvalidChecksum { .. }));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let broken = format!("sha1 = \"abc\"\n{FORMULA}");
        assert!(matches!(
            PackageDescriptor::from_toml_str(&broken, "x.toml"),
            Err(FormulaError::ParseError { .. })
        ));
    }

    #[test]
    fn test_conflict_entry_must_name_one_kind() {
        let broken = FORMULA.replace(
            "cask = \"powershell\"",
            "cask = \"powershell\"\nformula = \"pwsh\"",
        );
        assert!(matches!(
            PackageDescriptor::from_toml_str(&broken, "x.toml"),
            Err(FormulaError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_escaping_paths_are_rejected() {
        assert!("libexec/../etc/passwd".parse::<KegPath>().is_err());
        assert!("libexec/".parse::<KegPath>().is_err());
        assert!("opt/pwsh".parse::<KegPath>().is_err());
        assert!("pwsh".parse::<KegPath>().is_err());
        let ok: KegPath = "libexec/bin/pwsh".parse().unwrap();
        assert_eq!(ok.dir, KegDir::Libexec);
        assert_eq!(ok.file_name(), "pwsh");
        assert_eq!(ok.to_string(), "libexec/bin/pwsh");
    }

    #[test]
    fn test_name_must_be_one_path_component() {
        for name in ["../../escaped", "a/b", "..", ".", "/abs"] {
            let source = FORMULA.replace("name = \"powershell\"", &format!("name = {name:?}"));
            let err = PackageDescriptor::from_toml_str(&source, "x.toml").unwrap_err();
            assert!(
                matches!(&err, FormulaError::InvalidField { field, .. } if field == "name"),
                "{name}: {err:?}"
            );
        }
    }

    #[test]
    fn test_version_must_be_one_path_component() {
        for version in ["../../..", "7.0/0", ".."] {
            let source = FORMULA.replace("bottle = ", &format!("version = {version:?}\nbottle = "));
            let err = PackageDescriptor::from_toml_str(&source, "x.toml").unwrap_err();
            assert!(
                matches!(&err, FormulaError::InvalidField { field, .. } if field == "version"),
                "{version}: {err:?}"
            );
        }
    }

    #[test]
    fn test_link_name_must_be_one_path_component() {
        for name in ["/usr/local/bin/pwsh", "../pwsh", "sub/pwsh", ""] {
            let source = FORMULA.replace(
                "target = \"libexec/pwsh\"",
                &format!("target = \"libexec/pwsh\"\nname = {name:?}"),
            );
            let err = PackageDescriptor::from_toml_str(&source, "x.toml").unwrap_err();
            assert!(
                matches!(&err, FormulaError::InvalidField { field, .. } if field == "install.symlink.name"),
                "{name}: {err:?}"
            );
        }

        let renamed = FORMULA.replace(
            "target = \"libexec/pwsh\"",
            "target = \"libexec/pwsh\"\nname = \"pwsh7\"",
        );
        let descriptor = PackageDescriptor::from_toml_str(&renamed, "x.toml").unwrap();
        assert_eq!(descriptor.install[2].link_name().as_deref(), Some("pwsh7"));
    }

    #[test]
    fn test_file_mode() {
        let mode: FileMode = "0555".parse().unwrap();
        assert_eq!(mode.bits(), 0o555);
        assert!(mode.is_executable_by_all());
        assert_eq!(mode.to_string(), "0555");
        assert!(!"0644".parse::<FileMode>().unwrap().is_executable_by_all());
        assert!("999".parse::<FileMode>().is_err());
        assert!("17777".parse::<FileMode>().is_err());
    }

    #[test]
    fn test_infer_version() {
        assert_eq!(
            infer_version("https://example.com/releases/download/v7.0.0/powershell-7.0.0-osx-x64.tar.gz")
                .as_deref(),
            Some("7.0.0")
        );
        assert_eq!(
            infer_version("https://example.com/dist/tool-1.4.2.tar.gz").as_deref(),
            Some("1.4.2")
        );
        assert_eq!(infer_version("https://example.com/dist/tool.tar.gz"), None);
    }

    #[test]
    fn test_explicit_version_wins() {
        let source = FORMULA.replace("bottle = ", "version = \"7.0.0-rc1\"\nbottle = ");
        let descriptor = PackageDescriptor::from_toml_str(&source, "x.toml").unwrap();
        assert_eq!(descriptor.version, "7.0.0-rc1");
    }

    #[test]
    fn test_toml_output_parses_back() {
        let descriptor = PackageDescriptor::from_toml_str(FORMULA, "powershell.toml").unwrap();
        let rendered = descriptor.to_toml_string().unwrap();
        let reparsed = PackageDescriptor::from_toml_str(&rendered, "rendered.toml").unwrap();
        assert_eq!(reparsed, descriptor);
    }
}
