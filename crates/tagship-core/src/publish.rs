use crate::errors::{ReleaseError, Result};
use crate::package::PackageLocator;
use crate::registry::{PublishRequest, RegistryClient, dist_tag_for};
use crate::version::parse_version;
use std::fmt;
use std::path::PathBuf;
use tracing::info;

/// A `<name>@<version>` tag observed by CI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
    pub name: String,
    pub version: String,
}

impl ReleaseTag {
    /// Parse a pushed tag.
    ///
    /// The split happens at the last `@` so scoped names such as
    /// `@scope/pkg@1.0.0` keep their leading `@`. A leading `v` on the version
    /// is dropped, and what remains must be a valid version.
    pub fn parse(tag: &str) -> Result<Self> {
        let (name, version) = tag
            .rsplit_once('@')
            .ok_or_else(|| ReleaseError::InvalidTag(tag.to_string()))?;
        if name.is_empty() {
            return Err(ReleaseError::InvalidTag(tag.to_string()));
        }

        let version = version.strip_prefix('v').unwrap_or(version);
        parse_version(version)?;

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
        })
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// What a successful CI publish did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub package: String,
    pub version: String,
    pub package_dir: PathBuf,
    pub dist_tag: Option<&'static str>,
}

/// Publish the package named by `tag` once its manifest agrees with the tag.
pub fn publish_tag(
    locator: &PackageLocator,
    tag: &str,
    registry: &str,
    client: &dyn RegistryClient,
) -> Result<PublishReport> {
    let tag = ReleaseTag::parse(tag)?;
    let package = locator.resolve(&tag.name)?;

    if package.version != tag.version {
        return Err(ReleaseError::VersionMismatch {
            tag_version: tag.version,
            current_version: package.version,
        });
    }

    let dist_tag = dist_tag_for(&tag.version);
    info!(package = %tag.name, version = %tag.version, ?dist_tag, registry, "publishing");
    client.publish(&PublishRequest {
        package_dir: &package.dir,
        dist_tag,
        registry: Some(registry),
    })?;

    Ok(PublishReport {
        package: tag.name,
        version: tag.version,
        package_dir: package.dir,
        dist_tag,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DEFAULT_REGISTRY;
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;

    #[derive(Default)]
    struct RecordingRegistry {
        published: RefCell<Vec<(PathBuf, Option<String>, Option<String>)>>,
    }

    impl RegistryClient for RecordingRegistry {
        fn publish(&self, request: &PublishRequest<'_>) -> Result<()> {
            self.published.borrow_mut().push((
                request.package_dir.to_path_buf(),
                request.dist_tag.map(str::to_string),
                request.registry.map(str::to_string),
            ));
            Ok(())
        }
    }

    fn monorepo_with(root: &Path, name: &str, version: &str) -> PackageLocator {
        let dir = root.join("packages").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("package.json"),
            format!("{{\"name\": \"{name}\", \"version\": \"{version}\"}}\n"),
        )
        .unwrap();
        PackageLocator::monorepo(root, "packages")
    }

    #[test]
    fn parses_plain_scoped_and_prefixed_tags() {
        assert_eq!(
            ReleaseTag::parse("foo@1.2.3").unwrap(),
            ReleaseTag {
                name: "foo".into(),
                version: "1.2.3".into()
            }
        );
        let scoped = ReleaseTag::parse("@acme/widgets@v2.0.0-beta.1").unwrap();
        assert_eq!(scoped.name, "@acme/widgets");
        assert_eq!(scoped.version, "2.0.0-beta.1");
        assert_eq!(scoped.to_string(), "@acme/widgets@2.0.0-beta.1");
    }

    #[test]
    fn rejects_malformed_tags() {
        assert!(matches!(
            ReleaseTag::parse("foo"),
            Err(ReleaseError::InvalidTag(_))
        ));
        assert!(matches!(
            ReleaseTag::parse("@1.0.0"),
            Err(ReleaseError::InvalidTag(_))
        ));
        assert!(matches!(
            ReleaseTag::parse("foo@1.2"),
            Err(ReleaseError::InvalidVersion(_))
        ));
        assert!(matches!(
            ReleaseTag::parse("foo@"),
            Err(ReleaseError::InvalidVersion(_))
        ));
    }

    #[test]
    fn stable_tag_publishes_with_default_dist_tag() {
        let temp = tempfile::tempdir().unwrap();
        let locator = monorepo_with(temp.path(), "foo", "1.2.3");
        let registry = RecordingRegistry::default();

        let report = publish_tag(&locator, "foo@1.2.3", DEFAULT_REGISTRY, &registry).unwrap();

        assert_eq!(report.dist_tag, None);
        assert_eq!(
            registry.published.borrow().as_slice(),
            &[(
                temp.path().join("packages/foo"),
                None,
                Some(DEFAULT_REGISTRY.to_string())
            )]
        );
    }

    #[test]
    fn beta_tag_publishes_under_beta() {
        let temp = tempfile::tempdir().unwrap();
        let locator = monorepo_with(temp.path(), "foo", "1.2.3-beta.0");
        let registry = RecordingRegistry::default();

        let report =
            publish_tag(&locator, "foo@1.2.3-beta.0", DEFAULT_REGISTRY, &registry).unwrap();

        assert_eq!(report.dist_tag, Some("beta"));
        assert_eq!(registry.published.borrow()[0].1.as_deref(), Some("beta"));
    }

    #[test]
    fn leading_v_is_stripped_before_comparison() {
        let temp = tempfile::tempdir().unwrap();
        let locator = monorepo_with(temp.path(), "foo", "1.2.3");
        let registry = RecordingRegistry::default();

        let report = publish_tag(&locator, "foo@v1.2.3", DEFAULT_REGISTRY, &registry).unwrap();
        assert_eq!(report.version, "1.2.3");
        assert_eq!(registry.published.borrow().len(), 1);
    }

    #[test]
    fn mismatched_version_fails_before_publishing() {
        let temp = tempfile::tempdir().unwrap();
        let locator = monorepo_with(temp.path(), "foo", "1.2.3");
        let registry = RecordingRegistry::default();

        let err = publish_tag(&locator, "foo@1.2.4", DEFAULT_REGISTRY, &registry).unwrap_err();

        match err {
            ReleaseError::VersionMismatch {
                tag_version,
                current_version,
            } => {
                assert_eq!(tag_version, "1.2.4");
                assert_eq!(current_version, "1.2.3");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(registry.published.borrow().is_empty());
    }

    #[test]
    fn manifest_version_must_match_exactly() {
        let temp = tempfile::tempdir().unwrap();
        let locator = monorepo_with(temp.path(), "foo", "1.2.3 ");
        let registry = RecordingRegistry::default();

        assert!(matches!(
            publish_tag(&locator, "foo@1.2.3", DEFAULT_REGISTRY, &registry),
            Err(ReleaseError::VersionMismatch { .. })
        ));
        assert!(registry.published.borrow().is_empty());
    }

    #[test]
    fn unknown_package_fails_before_publishing() {
        let temp = tempfile::tempdir().unwrap();
        let locator = monorepo_with(temp.path(), "foo", "1.2.3");
        let registry = RecordingRegistry::default();

        assert!(matches!(
            publish_tag(&locator, "bar@1.2.3", DEFAULT_REGISTRY, &registry),
            Err(ReleaseError::PackageNotFound(_))
        ));
        assert!(registry.published.borrow().is_empty());
    }

    #[test]
    fn single_package_mode_publishes_root() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join("package.json"),
            "{\"name\": \"root-pkg\", \"version\": \"3.0.0\"}\n",
        )
        .unwrap();
        let locator = PackageLocator::single(temp.path(), &["all".to_string()]);
        let registry = RecordingRegistry::default();

        let report = publish_tag(&locator, "root-pkg@3.0.0", "https://npm.example.com/", &registry)
            .unwrap();
        assert_eq!(report.package_dir, temp.path());
    }
}
