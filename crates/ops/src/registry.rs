//! Descriptor registry: built-in formulae plus the formula directory

use keg_errors::{Error, FormulaError, OpsError};
use keg_types::PackageDescriptor;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const BUILTIN: &[(&str, &str)] = &[(
    "powershell.toml",
    include_str!("../formula/powershell.toml"),
)];

/// Where a registered descriptor came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormulaSource {
    Builtin,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct FormulaEntry {
    pub descriptor: PackageDescriptor,
    pub source: FormulaSource,
}

/// Descriptors known by name
#[derive(Debug, Clone, Default)]
pub struct FormulaRegistry {
    formulae: BTreeMap<String, FormulaEntry>,
}

impl FormulaRegistry {
    /// Registry holding only the formulae compiled into keg
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in formula fails to parse.
    pub fn with_builtins() -> Result<Self, Error> {
        let mut registry = Self::default();
        for (file_name, source) in BUILTIN {
            let descriptor = PackageDescriptor::from_toml_str(source, file_name)?;
            registry.insert(descriptor, FormulaSource::Builtin);
        }
        Ok(registry)
    }

    /// Built-ins plus every `*.toml` file in `dir`
    ///
    /// A missing directory is not an error. Files override built-ins of the
    /// same name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed or a file in it is
    /// not a valid formula.
    pub async fn load(dir: &Path) -> Result<Self, Error> {
        let mut registry = Self::with_builtins()?;

        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(dir = %dir.display(), "no formula directory");
                return Ok(registry);
            }
            Err(e) => return Err(directory_error(dir, &e)),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| directory_error(dir, &e))?
        {
            let path = entry.path();
            if is_formula_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let descriptor = read_formula(&path).await?;
            tracing::debug!(name = %descriptor.name, path = %path.display(), "registered formula");
            registry.insert(descriptor, FormulaSource::File(path));
        }
        Ok(registry)
    }

    pub fn insert(&mut self, descriptor: PackageDescriptor, source: FormulaSource) {
        self.formulae.insert(
            descriptor.name.clone(),
            FormulaEntry { descriptor, source },
        );
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FormulaEntry> {
        self.formulae.get(name)
    }

    /// Registered formulae in name order
    pub fn iter(&self) -> impl Iterator<Item = &FormulaEntry> {
        self.formulae.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.formulae.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formulae.is_empty()
    }

    /// Look up a formula by name, or load it from a `.toml` path
    ///
    /// # Errors
    ///
    /// Returns [`FormulaError::NotFound`] for unknown names, or a read/parse
    /// error for paths.
    pub async fn resolve(&self, formula: &str) -> Result<PackageDescriptor, Error> {
        let as_path = Path::new(formula);
        if is_formula_file(as_path) || formula.contains(std::path::MAIN_SEPARATOR) {
            return read_formula(as_path).await;
        }
        self.get(formula)
            .map(|entry| entry.descriptor.clone())
            .ok_or_else(|| {
                FormulaError::NotFound {
                    name: formula.to_string(),
                }
                .into()
            })
    }
}

fn is_formula_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

async fn read_formula(path: &Path) -> Result<PackageDescriptor, Error> {
    let source = fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::from(FormulaError::NotFound {
                name: path.display().to_string(),
            })
        } else {
            Error::io_with_path(&e, path)
        }
    })?;
    Ok(PackageDescriptor::from_toml_str(
        &source,
        &path.display().to_string(),
    )?)
}

fn directory_error(dir: &Path, error: &std::io::Error) -> Error {
    OpsError::FormulaDirectory {
        path: dir.display().to_string(),
        message: error.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use keg_types::{ConflictKind, KegDir, OsVersion};
    use tempfile::TempDir;

    const DEMO: &str = r#"
name = "demo"
homepage = "https://example.com"
url = "https://example.com/demo-2.1.0.tar.gz"
sha256 = "7ea2a539cb33f3c1c62280eea1d3b55cbd84c86676437a390e81c0ae374483e6"
"#;

    #[test]
    fn test_builtin_powershell() {
        let registry = FormulaRegistry::with_builtins().unwrap();
        let entry = registry.get("powershell").unwrap();
        assert_eq!(entry.source, FormulaSource::Builtin);

        let formula = &entry.descriptor;
        assert_eq!(formula.version, "7.0.0");
        assert_eq!(
            formula.platform.as_ref().unwrap().min_version,
            OsVersion::new(10, 13, 0)
        );
        assert_eq!(formula.conflicts[0].kind, ConflictKind::Cask);
        assert_eq!(formula.install.len(), 3);
        assert_eq!(formula.test.len(), 2);
        assert_eq!(formula.test[0].exe.dir, KegDir::Bin);
        assert!(formula.caveats.as_deref().unwrap().contains("{libexec}"));
    }

    #[tokio::test]
    async fn test_load_directory_and_resolve() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("demo.toml"), DEMO).await.unwrap();
        fs::write(temp.path().join("notes.txt"), "ignored").await.unwrap();

        let registry = FormulaRegistry::load(temp.path()).await.unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.iter().map(|e| e.descriptor.name.as_str()).collect::<Vec<_>>(),
            vec!["demo", "powershell"]
        );

        let demo = registry.resolve("demo").await.unwrap();
        assert_eq!(demo.version, "2.1.0");

        let by_path = registry
            .resolve(&temp.path().join("demo.toml").display().to_string())
            .await
            .unwrap();
        assert_eq!(by_path, demo);

        assert!(matches!(
            registry.resolve("nope").await.unwrap_err(),
            Error::Formula(FormulaError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_directory_keeps_builtins() {
        let temp = TempDir::new().unwrap();
        let registry = FormulaRegistry::load(&temp.path().join("absent"))
            .await
            .unwrap();
        assert!(registry.get("powershell").is_some());
    }

    #[tokio::test]
    async fn test_invalid_file_is_reported() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("bad.toml"), "name = ").await.unwrap();
        assert!(matches!(
            FormulaRegistry::load(temp.path()).await.unwrap_err(),
            Error::Formula(FormulaError::ParseError { .. })
        ));
    }
}
