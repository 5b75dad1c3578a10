use crate::errors::{ReleaseError, Result};
use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;

/// Prerelease identifier used by every `pre*` increment.
pub const PRERELEASE_IDENTIFIER: &str = "beta";

/// Kind of version bump requested for a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseType {
    Patch,
    Minor,
    Major,
    Prerelease,
    Preminor,
    Premajor,
    Custom,
}

impl ReleaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Prerelease => "prerelease",
            Self::Preminor => "preminor",
            Self::Premajor => "premajor",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the "select release type" list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCandidate {
    pub label: &'static str,
    pub release_type: ReleaseType,
    /// `None` for the custom entry; the caller must supply a version.
    pub version: Option<Version>,
}

impl VersionCandidate {
    /// Display title, e.g. `next (1.2.4)`.
    pub fn title(&self) -> String {
        match &self.version {
            Some(version) => format!("{} ({})", self.label, version),
            None => self.label.to_string(),
        }
    }

    pub fn is_custom(&self) -> bool {
        self.release_type == ReleaseType::Custom
    }
}

/// Returns true when `input` is a strict semantic version (`1.2.3`, `1.2.3-beta.0`).
pub fn is_valid(input: &str) -> bool {
    Version::parse(input).is_ok()
}

/// Parse a version, mapping failures to [`ReleaseError::InvalidVersion`].
pub fn parse_version(input: &str) -> Result<Version> {
    Version::parse(input).map_err(|_| ReleaseError::InvalidVersion(input.to_string()))
}

/// Compute the ordered list of release choices for `current`.
///
/// Stable versions get `next`, `beta-minor`, `beta-major`, `minor`, `major`;
/// prerelease versions get `next` and `stable`. A trailing `custom` entry is
/// always present.
pub fn version_candidates(current: &Version) -> Vec<VersionCandidate> {
    let plan: &[(&'static str, ReleaseType)] = if current.pre.is_empty() {
        &[
            ("next", ReleaseType::Patch),
            ("beta-minor", ReleaseType::Preminor),
            ("beta-major", ReleaseType::Premajor),
            ("minor", ReleaseType::Minor),
            ("major", ReleaseType::Major),
        ]
    } else {
        &[
            ("next", ReleaseType::Prerelease),
            ("stable", ReleaseType::Patch),
        ]
    };

    let mut candidates: Vec<VersionCandidate> = plan
        .iter()
        .filter_map(|(label, release_type)| {
            increment(current, *release_type).map(|version| VersionCandidate {
                label,
                release_type: *release_type,
                version: Some(version),
            })
        })
        .collect();

    candidates.push(VersionCandidate {
        label: "custom",
        release_type: ReleaseType::Custom,
        version: None,
    });
    candidates
}

/// Same as [`version_candidates`] but starting from an unparsed manifest version.
pub fn candidates_for(current: &str) -> Result<Vec<VersionCandidate>> {
    Ok(version_candidates(&parse_version(current)?))
}

/// Apply a semver increment. Returns `None` for [`ReleaseType::Custom`] and
/// when a component would overflow.
///
/// Build metadata is always dropped.
pub fn increment(current: &Version, release_type: ReleaseType) -> Option<Version> {
    let mut next = current.clone();
    next.build = BuildMetadata::EMPTY;

    match release_type {
        ReleaseType::Patch => {
            if next.pre.is_empty() {
                next.patch = next.patch.checked_add(1)?;
            }
            next.pre = Prerelease::EMPTY;
        }
        ReleaseType::Minor => {
            if next.patch != 0 || next.pre.is_empty() {
                next.minor = next.minor.checked_add(1)?;
            }
            next.patch = 0;
            next.pre = Prerelease::EMPTY;
        }
        ReleaseType::Major => {
            if next.minor != 0 || next.patch != 0 || next.pre.is_empty() {
                next.major = next.major.checked_add(1)?;
            }
            next.minor = 0;
            next.patch = 0;
            next.pre = Prerelease::EMPTY;
        }
        ReleaseType::Preminor => {
            next.patch = 0;
            next.minor = next.minor.checked_add(1)?;
            next.pre = bump_prerelease(&Prerelease::EMPTY)?;
        }
        ReleaseType::Premajor => {
            next.minor = 0;
            next.patch = 0;
            next.major = next.major.checked_add(1)?;
            next.pre = bump_prerelease(&Prerelease::EMPTY)?;
        }
        ReleaseType::Prerelease => {
            if next.pre.is_empty() {
                next.patch = next.patch.checked_add(1)?;
            }
            next.pre = bump_prerelease(&next.pre)?;
        }
        ReleaseType::Custom => return None,
    }

    Some(next)
}

fn is_numeric(identifier: &str) -> bool {
    !identifier.is_empty() && identifier.bytes().all(|b| b.is_ascii_digit())
}

/// Bump the last numeric prerelease identifier and force the `beta` prefix.
fn bump_prerelease(pre: &Prerelease) -> Option<Prerelease> {
    let mut ids: Vec<String> = if pre.is_empty() {
        Vec::new()
    } else {
        pre.as_str().split('.').map(str::to_string).collect()
    };

    if ids.is_empty() {
        ids.push("0".to_string());
    } else {
        let last_numeric = ids.iter().rposition(|id| is_numeric(id));
        match last_numeric {
            Some(idx) => {
                let value: u64 = ids[idx].parse().ok()?;
                ids[idx] = value.checked_add(1)?.to_string();
            }
            None => ids.push("0".to_string()),
        }
    }

    let keeps_counter =
        ids[0] == PRERELEASE_IDENTIFIER && ids.get(1).is_some_and(|id| is_numeric(id));
    if !keeps_counter {
        ids = vec![PRERELEASE_IDENTIFIER.to_string(), "0".to_string()];
    }

    Prerelease::new(&ids.join(".")).ok()
}
