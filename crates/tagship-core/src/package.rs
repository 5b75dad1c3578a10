use crate::config::{ALL_PACKAGES, ReleaseConfig};
use crate::errors::{ReleaseError, Result, io_error_with_path};
use crate::manifest::{manifest_path, read_manifest};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A package as read from its manifest at the start of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Name used for the release tag.
    pub name: String,
    pub dir: PathBuf,
    pub manifest_path: PathBuf,
    pub version: String,
    pub private: bool,
}

impl PackageDescriptor {
    /// Release tag for this package at `version`: `<name>@<version>`.
    pub fn release_tag(&self, version: &str) -> String {
        format!("{}@{}", self.name, version)
    }
}

/// Read the package named `name` from `dir`.
///
/// Fails with [`ReleaseError::PackageNotFound`] when `dir` has no manifest.
pub fn locate(name: &str, dir: &Path) -> Result<PackageDescriptor> {
    let manifest_path = manifest_path(dir);
    if !manifest_path.is_file() {
        return Err(ReleaseError::PackageNotFound(name.to_string()));
    }

    let manifest = read_manifest(&manifest_path)?;
    let version = manifest.require_version(&manifest_path)?.to_string();
    Ok(PackageDescriptor {
        name: name.to_string(),
        dir: dir.to_path_buf(),
        manifest_path,
        version,
        private: manifest.private,
    })
}

/// Names of the non-private packages under `packages_dir`, sorted.
///
/// Entries that are not directories or carry no manifest are skipped.
pub fn list_public_packages(packages_dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(packages_dir).map_err(|e| io_error_with_path(e, packages_dir))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let manifest = manifest_path(&path);
        if !manifest.is_file() {
            debug!(dir = %path.display(), "skipping directory without a manifest");
            continue;
        }
        if read_manifest(&manifest)?.private {
            debug!(dir = %path.display(), "skipping private package");
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }

    names.sort();
    Ok(names)
}

/// Maps package names to directories for the active mode.
#[derive(Debug, Clone)]
pub struct PackageLocator {
    root: PathBuf,
    packages_dir: PathBuf,
    monorepo: bool,
    explicit: Vec<String>,
}

impl PackageLocator {
    /// Locator for a repository whose root manifest is the package.
    pub fn single(root: impl Into<PathBuf>, packages: &[String]) -> Self {
        Self {
            root: root.into(),
            packages_dir: PathBuf::new(),
            monorepo: false,
            explicit: packages.to_vec(),
        }
    }

    /// Locator scanning `<root>/<packages_dir>`.
    pub fn monorepo(root: impl Into<PathBuf>, packages_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            packages_dir: packages_dir.into(),
            monorepo: true,
            explicit: Vec::new(),
        }
    }

    pub fn for_config(root: impl Into<PathBuf>, config: &ReleaseConfig) -> Self {
        if config.monorepo {
            Self::monorepo(root, &config.packages_dir)
        } else {
            Self::single(root, &config.packages)
        }
    }

    /// Names offered for selection.
    pub fn candidates(&self) -> Result<Vec<String>> {
        if self.monorepo {
            list_public_packages(&self.root.join(&self.packages_dir))
        } else {
            Ok(self.explicit.clone())
        }
    }

    /// Directory holding the manifest for `name`.
    pub fn package_dir(&self, name: &str) -> PathBuf {
        if self.monorepo {
            self.root.join(&self.packages_dir).join(name)
        } else {
            self.root.clone()
        }
    }

    /// Path, relative to the root, whose history belongs to `name`.
    pub fn source_path(&self, name: &str) -> PathBuf {
        if self.monorepo {
            self.packages_dir.join(name)
        } else {
            PathBuf::from(".")
        }
    }

    /// Resolve a selected name to its descriptor.
    ///
    /// In single-package mode the `all` placeholder resolves to the root
    /// manifest under its declared name.
    pub fn resolve(&self, name: &str) -> Result<PackageDescriptor> {
        let dir = self.package_dir(name);
        let mut descriptor = locate(name, &dir)?;
        if !self.monorepo && name == ALL_PACKAGES {
            let manifest = read_manifest(&descriptor.manifest_path)?;
            descriptor.name = manifest.name.ok_or_else(|| {
                ReleaseError::invalid_manifest(
                    &descriptor.manifest_path,
                    "missing a non-empty 'name' field",
                )
            })?;
        }
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CliOverrides, FileConfig};
    use tempfile::tempdir;

    fn write_package(dir: &Path, name: &str, version: &str, private: bool) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("package.json"),
            format!(
                "{{\n  \"name\": \"{name}\",\n  \"version\": \"{version}\",\n  \"private\": {private}\n}}\n"
            ),
        )
        .unwrap();
    }

    fn config(monorepo: bool, packages: &[&str]) -> ReleaseConfig {
        ReleaseConfig::resolve(
            FileConfig::default(),
            CliOverrides {
                monorepo,
                packages: packages.iter().map(|s| s.to_string()).collect(),
                ..CliOverrides::default()
            },
        )
    }

    #[test]
    fn locate_reads_descriptor() {
        let temp = tempdir().unwrap();
        write_package(temp.path(), "foo", "1.2.3", false);

        let pkg = locate("foo", temp.path()).unwrap();
        assert_eq!(pkg.name, "foo");
        assert_eq!(pkg.version, "1.2.3");
        assert_eq!(pkg.manifest_path, temp.path().join("package.json"));
        assert!(!pkg.private);
        assert_eq!(pkg.release_tag("1.2.4"), "foo@1.2.4");
    }

    #[test]
    fn locate_fails_without_manifest() {
        let temp = tempdir().unwrap();
        match locate("ghost", &temp.path().join("ghost")).unwrap_err() {
            ReleaseError::PackageNotFound(name) => assert_eq!(name, "ghost"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn monorepo_candidates_exclude_private_packages() {
        let temp = tempdir().unwrap();
        let packages = temp.path().join("packages");
        write_package(&packages.join("beta"), "beta", "0.1.0", false);
        write_package(&packages.join("alpha"), "alpha", "0.1.0", false);
        write_package(&packages.join("internal"), "internal", "0.1.0", true);
        fs::create_dir_all(packages.join("docs")).unwrap();
        fs::write(packages.join("README.md"), "notes\n").unwrap();

        let locator = PackageLocator::for_config(temp.path(), &config(true, &[]));
        assert_eq!(locator.candidates().unwrap(), vec!["alpha", "beta"]);
        assert_eq!(locator.package_dir("alpha"), packages.join("alpha"));
        assert_eq!(locator.source_path("alpha"), PathBuf::from("packages/alpha"));
    }

    #[test]
    fn monorepo_without_packages_dir_is_an_error() {
        let temp = tempdir().unwrap();
        let locator = PackageLocator::for_config(temp.path(), &config(true, &[]));
        assert!(matches!(locator.candidates(), Err(ReleaseError::Io(_))));
    }

    #[test]
    fn single_package_candidates_are_the_explicit_list() {
        let temp = tempdir().unwrap();
        write_package(temp.path(), "root-pkg", "2.0.0", false);

        let locator = PackageLocator::for_config(temp.path(), &config(false, &["widgets"]));
        assert_eq!(locator.candidates().unwrap(), vec!["widgets", "all"]);
        assert_eq!(locator.package_dir("widgets"), temp.path());
        assert_eq!(locator.source_path("widgets"), PathBuf::from("."));

        let explicit = locator.resolve("widgets").unwrap();
        assert_eq!(explicit.name, "widgets");
        assert_eq!(explicit.version, "2.0.0");

        let sentinel = locator.resolve("all").unwrap();
        assert_eq!(sentinel.name, "root-pkg");
    }

    #[test]
    fn monorepo_resolve_of_unknown_package_fails() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("packages")).unwrap();
        let locator = PackageLocator::for_config(temp.path(), &config(true, &[]));
        assert!(matches!(
            locator.resolve("nope"),
            Err(ReleaseError::PackageNotFound(_))
        ));
    }
}
