//! Static descriptor checks

use keg_types::{AuditReport, InstallStep, KegDir, KegPath, PackageDescriptor};
use url::Url;

/// Check a descriptor for problems that parsing alone does not catch
#[must_use]
pub fn audit(descriptor: &PackageDescriptor) -> AuditReport {
    let mut report = AuditReport::new(&descriptor.name);

    check_urls(descriptor, &mut report);

    if descriptor.desc.as_deref().is_none_or(|d| d.trim().is_empty()) {
        report.warn("no description");
    }
    if descriptor.checksum.declared_uppercase() {
        report.warn("sha256 should be written in lower-case hex");
    }

    check_install_steps(descriptor, &mut report);
    check_tests(descriptor, &mut report);

    report
}

fn check_urls(descriptor: &PackageDescriptor, report: &mut AuditReport) {
    match Url::parse(&descriptor.url) {
        Ok(url) if url.scheme() == "https" => {}
        Ok(url) => report.error(format!("url uses {} instead of https", url.scheme())),
        Err(e) => report.error(format!("url is not a valid URL: {e}")),
    }

    match Url::parse(&descriptor.homepage) {
        Ok(url) if url.scheme() == "https" => {}
        Ok(url) if url.scheme() == "http" => report.warn("homepage should use https"),
        Ok(url) => report.error(format!("homepage has unexpected scheme {}", url.scheme())),
        Err(e) => report.error(format!("homepage is not a valid URL: {e}")),
    }
}

fn check_install_steps(descriptor: &PackageDescriptor, report: &mut AuditReport) {
    if descriptor.install.is_empty() {
        report.error("no install steps");
        return;
    }

    let mut populated: Vec<KegDir> = Vec::new();
    for (index, step) in descriptor.install.iter().enumerate() {
        let number = index + 1;
        match step {
            InstallStep::CopyAll { into: KegDir::Bin } => {
                report.error(format!(
                    "install step {number}: files are copied into bin, which only holds links"
                ));
            }
            InstallStep::CopyAll { into } => populated.push(*into),
            InstallStep::Chmod { path, .. } | InstallStep::Symlink { target: path, .. } => {
                if !is_populated(&populated, path) {
                    report.error(format!(
                        "install step {number}: {path} is used before anything is copied into {}",
                        path.dir.as_str()
                    ));
                }
            }
        }
    }
}

fn is_populated(populated: &[KegDir], path: &KegPath) -> bool {
    match path.dir {
        KegDir::Bin => false,
        KegDir::Prefix => populated.contains(&KegDir::Prefix) || populated.contains(&KegDir::Libexec),
        KegDir::Libexec => populated.contains(&KegDir::Libexec) || populated.contains(&KegDir::Prefix),
    }
}

fn check_tests(descriptor: &PackageDescriptor, report: &mut AuditReport) {
    if descriptor.test.is_empty() {
        report.warn("no test steps");
        return;
    }

    let links: Vec<String> = descriptor
        .install
        .iter()
        .filter_map(InstallStep::link_name)
        .collect();

    if !descriptor.test.iter().any(|step| step.exe.dir == KegDir::Bin) {
        report.warn("tests never run a linked command from bin");
    }
    for step in descriptor.test.iter().filter(|step| step.exe.dir == KegDir::Bin) {
        let name = step.exe.file_name();
        if !links.contains(&name) {
            report.error(format!("test runs bin/{name}, which no install step links"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keg_types::AuditSeverity;

    const SHA: &str = "7ea2a539cb33f3c1c62280eea1d3b55cbd84c86676437a390e81c0ae374483e6";

    fn parse(body: &str) -> PackageDescriptor {
        PackageDescriptor::from_toml_str(body, "audit.toml").unwrap()
    }

    fn messages(report: &AuditReport, severity: AuditSeverity) -> Vec<String> {
        report
            .problems
            .iter()
            .filter(|p| p.severity == severity)
            .map(|p| p.message.clone())
            .collect()
    }

    #[test]
    fn test_clean_descriptor_passes() {
        let descriptor = parse(&format!(
            r#"
name = "demo"
desc = "Demo tool"
homepage = "https://example.com"
url = "https://example.com/demo-1.0.0.tar.gz"
sha256 = "{SHA}"

[[install]]
action = "copy_all"
into = "libexec"

[[install]]
action = "chmod"
path = "libexec/demo"
mode = "0555"

[[install]]
action = "symlink"
target = "libexec/demo"

[[test]]
exe = "bin/demo"
args = ["--version"]
"#
        ));
        let report = audit(&descriptor);
        assert!(report.problems.is_empty(), "{:?}", report.problems);
        assert!(report.passed());
    }

    #[test]
    fn test_problems_are_reported() {
        let descriptor = parse(&format!(
            r#"
name = "demo"
homepage = "example.com"
url = "http://example.com/demo-1.0.0.tar.gz"
sha256 = "{}"

[[install]]
action = "chmod"
path = "libexec/demo"
mode = "0555"

[[install]]
action = "copy_all"
into = "libexec"

[[test]]
exe = "bin/other"
"#,
            SHA.to_uppercase()
        ));
        let report = audit(&descriptor);
        assert!(!report.passed());

        let errors = messages(&report, AuditSeverity::Error);
        assert!(errors.iter().any(|m| m.contains("url uses http")), "{errors:?}");
        assert!(errors.iter().any(|m| m.starts_with("homepage is not a valid URL")));
        assert!(errors.iter().any(|m| m.starts_with("install step 1:")));
        assert!(errors.iter().any(|m| m.contains("bin/other")));

        let warnings = messages(&report, AuditSeverity::Warning);
        assert!(warnings.iter().any(|m| m.contains("lower-case")), "{warnings:?}");
        assert!(warnings.iter().any(|m| m == "no description"));
    }

    #[test]
    fn test_missing_steps() {
        let descriptor = parse(&format!(
            r#"
name = "demo"
desc = "Demo"
homepage = "https://example.com"
url = "https://example.com/demo-1.0.0.tar.gz"
sha256 = "{SHA}"
"#
        ));
        let report = audit(&descriptor);
        assert_eq!(messages(&report, AuditSeverity::Error), vec!["no install steps"]);
        assert_eq!(messages(&report, AuditSeverity::Warning), vec!["no test steps"]);
    }
}
