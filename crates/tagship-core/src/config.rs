use crate::errors::{ReleaseError, Result};
use crate::registry::DEFAULT_REGISTRY;
use std::path::{Path, PathBuf};

/// Placeholder entry meaning "no package specified" in single-package mode.
pub const ALL_PACKAGES: &str = "all";
pub const DEFAULT_PACKAGES_DIR: &str = "packages";
pub const CONFIG_DIR: &str = ".tagship";
pub const CONFIG_FILE: &str = "config.toml";

/// Settings read from `.tagship/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub monorepo: Option<bool>,
    pub registry: Option<String>,
    pub packages_dir: Option<String>,
    pub packages: Vec<String>,
}

impl FileConfig {
    /// Load `.tagship/config.toml` under `root`. A missing file yields defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_DIR).join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let value: toml::Value = text
            .parse()
            .map_err(|e| ReleaseError::Config(format!("invalid config.toml: {e}")))?;

        let Some(release) = value.get("release") else {
            return Ok(Self::default());
        };
        let release = release
            .as_table()
            .ok_or_else(|| ReleaseError::Config("[release] must be a table".into()))?;

        let monorepo = match release.get("monorepo") {
            None => None,
            Some(v) => Some(v.as_bool().ok_or_else(|| {
                ReleaseError::Config("release.monorepo must be a boolean".into())
            })?),
        };

        let string_key = |key: &str| -> Result<Option<String>> {
            match release.get(key) {
                None => Ok(None),
                Some(v) => v
                    .as_str()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .map(Some)
                    .ok_or_else(|| {
                        ReleaseError::Config(format!("release.{key} must be a non-empty string"))
                    }),
            }
        };

        let packages = match release.get("packages") {
            None => Vec::new(),
            Some(v) => v
                .as_array()
                .ok_or_else(|| {
                    ReleaseError::Config("release.packages must be an array of strings".into())
                })?
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ReleaseError::Config(format!(
                            "release.packages entries must be strings, found {item}"
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        };

        Ok(Self {
            monorepo,
            registry: string_key("registry")?,
            packages_dir: string_key("packages_dir")?,
            packages,
        })
    }
}

/// Values supplied on the command line; they take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub monorepo: bool,
    pub dry_run: bool,
    pub registry: Option<String>,
    pub packages: Vec<String>,
}

/// Fully resolved, per-invocation release settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    pub monorepo: bool,
    pub dry_run: bool,
    pub registry: String,
    /// Explicit package list; always ends with [`ALL_PACKAGES`].
    pub packages: Vec<String>,
    /// Directory scanned in monorepo mode, relative to the repository root.
    pub packages_dir: PathBuf,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self::resolve(FileConfig::default(), CliOverrides::default())
    }
}

impl ReleaseConfig {
    pub fn resolve(file: FileConfig, cli: CliOverrides) -> Self {
        let mut packages = if cli.packages.is_empty() {
            file.packages
        } else {
            cli.packages
        };
        packages.retain(|name| name != ALL_PACKAGES);
        packages.push(ALL_PACKAGES.to_string());

        Self {
            monorepo: cli.monorepo || file.monorepo.unwrap_or(false),
            dry_run: cli.dry_run,
            registry: cli
                .registry
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .or(file.registry)
                .unwrap_or_else(|| DEFAULT_REGISTRY.to_string()),
            packages,
            packages_dir: PathBuf::from(
                file.packages_dir
                    .unwrap_or_else(|| DEFAULT_PACKAGES_DIR.to_string()),
            ),
        }
    }

    /// Load the config file under `root` and merge the command-line values.
    pub fn load(root: &Path, cli: CliOverrides) -> Result<Self> {
        Ok(Self::resolve(FileConfig::load(root)?, cli))
    }
}

/// Which flow an invocation runs, decided once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseMode {
    SinglePackage,
    Monorepo,
    Publish { tag: String },
}

impl ReleaseMode {
    pub fn resolve(publish_tag: Option<String>, config: &ReleaseConfig) -> Self {
        match publish_tag {
            Some(tag) => Self::Publish { tag },
            None if config.monorepo => Self::Monorepo,
            None => Self::SinglePackage,
        }
    }
}
