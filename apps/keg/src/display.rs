//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use keg_ops::{CaveatsReport, OperationResult};
use keg_types::{
    AuditReport, AuditSeverity, ColorChoice, FetchReport, FormulaInfo, InstallReport,
    InstalledPackage, TestResult, UninstallReport,
};
use std::io;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            self.render_json(result)
        } else {
            self.render_text(result)
        }
    }

    /// Render as JSON
    fn render_json(&self, result: &OperationResult) -> io::Result<()> {
        let json = result.to_json().map_err(io::Error::other)?;
        self.term.write_line(&json)
    }

    fn render_text(&self, result: &OperationResult) -> io::Result<()> {
        match result {
            OperationResult::InstallReport(report) => self.render_install_report(report),
            OperationResult::FetchReport(report) => self.render_fetch_report(report),
            OperationResult::Caveats(report) => self.render_caveats_report(report),
            OperationResult::TestResult(result) => self.render_test_result(result),
            OperationResult::FormulaInfo(info) => self.render_formula_info(info),
            OperationResult::AuditReport(report) => self.render_audit_report(report),
            OperationResult::PackageList(packages) => self.render_package_list(packages),
            OperationResult::UninstallReport(report) => self.render_uninstall_report(report),
        }
    }

    fn render_install_report(&self, report: &InstallReport) -> io::Result<()> {
        println!(
            "{} {} installed to {} ({} ms)",
            self.style_package_name(&report.name),
            report.version,
            report.prefix.display(),
            report.duration_ms
        );
        for link in &report.linked {
            println!("  {}", link.display());
        }

        if let Some(text) = &report.caveats {
            println!();
            println!("{}", self.style_heading("==> Caveats"));
            println!("{text}");
        }

        if let Some(test) = &report.test {
            println!();
            self.render_test_result(test)?;
        }
        Ok(())
    }

    fn render_fetch_report(&self, report: &FetchReport) -> io::Result<()> {
        let origin = if report.cached { " (cached)" } else { "" };
        println!("Downloaded: {}{origin}", report.path.display());
        println!("SHA-256:    {}", report.sha256);
        println!("Size:       {}", format_size(report.size));
        Ok(())
    }

    fn render_caveats_report(&self, report: &CaveatsReport) -> io::Result<()> {
        match &report.text {
            Some(text) => {
                println!("{}", self.style_heading(&format!("==> {}: Caveats", report.name)));
                println!("{text}");
            }
            None => println!("{} has no caveats.", report.name),
        }
        Ok(())
    }

    fn render_test_result(&self, result: &TestResult) -> io::Result<()> {
        for outcome in &result.invocations {
            let marker = if outcome.succeeded() {
                self.style_ok("[OK]")
            } else {
                self.style_error("[FAILED]")
            };
            println!("{marker} {}", outcome.invocation);
            if !outcome.succeeded() {
                println!("      {}", outcome.status_description());
                let stderr = outcome.stderr.trim();
                if !stderr.is_empty() {
                    println!("      {stderr}");
                }
            }
        }

        if result.passed() {
            println!("Smoke test for {} passed.", result.name);
        } else {
            println!("Smoke test for {} failed.", result.name);
        }
        Ok(())
    }

    /// Render formula information
    fn render_formula_info(&self, info: &FormulaInfo) -> io::Result<()> {
        println!("{} {}", self.style_package_name(&info.name), info.version);
        if let Some(desc) = &info.desc {
            println!("{desc}");
        }
        println!("{}", info.homepage);
        println!();

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.add_row(vec![Cell::new("URL").add_attribute(Attribute::Bold), Cell::new(&info.url)]);
        table.add_row(vec![
            Cell::new("SHA-256").add_attribute(Attribute::Bold),
            Cell::new(&info.sha256),
        ]);
        table.add_row(vec![
            Cell::new("Requires").add_attribute(Attribute::Bold),
            Cell::new(info.requires.as_deref().unwrap_or("-")),
        ]);
        table.add_row(vec![
            Cell::new("Conflicts").add_attribute(Attribute::Bold),
            Cell::new(join_or_dash(&info.conflicts)),
        ]);
        table.add_row(vec![
            Cell::new("Links").add_attribute(Attribute::Bold),
            Cell::new(join_or_dash(&info.links)),
        ]);
        let installed = match &info.installed {
            Some(package) => Cell::new(format!(
                "{} ({})",
                package.prefix.display(),
                package.installed_at.format("%Y-%m-%d %H:%M:%S UTC")
            ))
            .fg(Color::Green),
            None => Cell::new("Not installed"),
        };
        table.add_row(vec![Cell::new("Installed").add_attribute(Attribute::Bold), installed]);

        println!("{table}");
        Ok(())
    }

    fn render_audit_report(&self, report: &AuditReport) -> io::Result<()> {
        if report.problems.is_empty() {
            println!("{}: no problems found.", report.name);
            return Ok(());
        }

        println!("{}:", self.style_package_name(&report.name));
        for problem in &report.problems {
            let label = match problem.severity {
                AuditSeverity::Error => self.style_error("error"),
                AuditSeverity::Warning => self.style_warning("warning"),
            };
            println!("  * {label}: {}", problem.message);
        }

        let errors = report
            .problems
            .iter()
            .filter(|problem| problem.severity == AuditSeverity::Error)
            .count();
        println!();
        println!(
            "{} problems, {errors} errors",
            report.problems.len()
        );
        Ok(())
    }

    /// Render package list
    fn render_package_list(&self, packages: &[InstalledPackage]) -> io::Result<()> {
        if packages.is_empty() {
            println!("No packages installed.");
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Package").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("Installed").add_attribute(Attribute::Bold),
            Cell::new("Links").add_attribute(Attribute::Bold),
        ]);

        for package in packages {
            let links: Vec<String> = package
                .links
                .iter()
                .map(|link| link.display().to_string())
                .collect();
            table.add_row(vec![
                Cell::new(&package.name),
                Cell::new(&package.version),
                Cell::new(package.installed_at.format("%Y-%m-%d %H:%M").to_string()),
                Cell::new(join_or_dash(&links)),
            ]);
        }

        println!("{table}");
        Ok(())
    }

    fn render_uninstall_report(&self, report: &UninstallReport) -> io::Result<()> {
        println!(
            "Uninstalled {} {} ({})",
            self.style_package_name(&report.name),
            report.version,
            report.removed_prefix.display()
        );
        for link in &report.removed_links {
            println!("  removed {}", link.display());
        }
        for link in &report.skipped_links {
            println!(
                "  {} {} no longer points into the keg; left in place",
                self.style_warning("kept"),
                link.display()
            );
        }
        Ok(())
    }

    /// Style package name
    fn style_package_name(&self, name: &str) -> String {
        self.paint(Style::new().bold(), name)
    }

    fn style_heading(&self, text: &str) -> String {
        self.paint(Style::new().blue().bold(), text)
    }

    fn style_ok(&self, text: &str) -> String {
        self.paint(Style::new().green(), text)
    }

    fn style_warning(&self, text: &str) -> String {
        self.paint(Style::new().yellow(), text)
    }

    fn style_error(&self, text: &str) -> String {
        self.paint(Style::new().red().bold(), text)
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.supports_color() {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Check if color output is supported
    pub fn supports_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

/// Format byte size in human readable format
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{size:.0} {}", UNITS[unit_index])
    } else {
        format!("{size:.1} {}", UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(63 * 1024 * 1024 + 512 * 1024), "63.5 MB");
    }

    #[test]
    fn test_join_or_dash() {
        assert_eq!(join_or_dash(&[]), "-");
        assert_eq!(
            join_or_dash(&["cask powershell".to_string(), "formula pwsh".to_string()]),
            "cask powershell, formula pwsh"
        );
    }

    #[test]
    fn test_never_color_leaves_text_alone() {
        let renderer = OutputRenderer::new(false, ColorChoice::Never);
        assert_eq!(renderer.style_package_name("powershell"), "powershell");
        assert!(!renderer.supports_color());
    }
}
