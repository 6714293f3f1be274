//! Caveats rendering

use keg_types::{InstalledLayout, PackageDescriptor};

/// Expand the descriptor's caveats template against an install layout
///
/// Recognised placeholders are `{name}`, `{version}`, `{prefix}`,
/// `{libexec}` and `{bin}`; anything else is left as written. Returns `None`
/// for descriptors without caveats.
#[must_use]
pub fn describe_caveats(descriptor: &PackageDescriptor, layout: &InstalledLayout) -> Option<String> {
    let template = descriptor.caveats.as_deref()?;

    let text = template
        .replace("{name}", &descriptor.name)
        .replace("{version}", &descriptor.version)
        .replace("{prefix}", &layout.prefix.display().to_string())
        .replace("{libexec}", &layout.libexec.display().to_string())
        .replace("{bin}", &layout.bin.display().to_string());

    Some(text.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMULA: &str = r#"
name = "powershell"
homepage = "https://github.com/powershell/powershell"
url = "https://example.com/v7.0.0/powershell-7.0.0-osx-x64.tar.gz"
sha256 = "7ea2a539cb33f3c1c62280eea1d3b55cbd84c86676437a390e81c0ae374483e6"
caveats = """
The executable is at:
  {bin}/pwsh
Other files are in {libexec} ({name} {version}, {unknown})
"""
"#;

    #[test]
    fn test_placeholders_are_expanded() {
        let descriptor = PackageDescriptor::from_toml_str(FORMULA, "powershell.toml").unwrap();
        let layout = InstalledLayout::new("/opt/keg", "powershell", "7.0.0");

        let text = describe_caveats(&descriptor, &layout).unwrap();
        assert!(text.contains("  /opt/keg/bin/pwsh\n"), "{text}");
        assert!(text.contains("/opt/keg/Cellar/powershell/7.0.0/libexec"));
        assert!(text.contains("(powershell 7.0.0, {unknown})"));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_no_caveats() {
        let mut descriptor = PackageDescriptor::from_toml_str(FORMULA, "powershell.toml").unwrap();
        descriptor.caveats = None;
        let layout = InstalledLayout::new("/opt/keg", "powershell", "7.0.0");
        assert_eq!(describe_caveats(&descriptor, &layout), None);
    }
}
