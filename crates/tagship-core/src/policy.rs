//! Release state machine: version choice, confirmation, and the
//! write / commit / tag / push sequence.

use crate::errors::{ReleaseError, Result};
use crate::git::VersionControl;
use crate::manifest::write_version;
use crate::package::PackageDescriptor;
use crate::prompt::Reporter;
use crate::version::parse_version;
use semver::Version;
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseState {
    Selecting,
    VersionChosen,
    Confirmed,
    Committed,
    Tagged,
    Pushed,
    Done,
    Aborted,
}

impl ReleaseState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    fn can_advance_to(&self, next: ReleaseState) -> bool {
        use ReleaseState::*;
        match (self, next) {
            (from, Aborted) => !from.is_terminal(),
            (Selecting, VersionChosen)
            | (VersionChosen, Confirmed)
            | (Confirmed, Committed)
            | (Committed, Tagged)
            | (Tagged, Pushed)
            | (Pushed, Done) => true,
            _ => false,
        }
    }

    /// True once local history holds a release commit that may not be on the remote.
    pub fn has_local_changes(&self) -> bool {
        matches!(self, Self::Committed | Self::Tagged)
    }
}

impl fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Selecting => "selecting",
            Self::VersionChosen => "version-chosen",
            Self::Confirmed => "confirmed",
            Self::Committed => "committed",
            Self::Tagged => "tagged",
            Self::Pushed => "pushed",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Why a release stopped without pushing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    NoPackageSelected,
    NoVersionSelected,
    InvalidVersion,
    Declined,
    NoChanges,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released { tag: String },
    Aborted(AbortReason),
}

/// A package paired with a validated target version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePlan {
    pub package: PackageDescriptor,
    pub version: Version,
    pub tag: String,
}

impl ReleasePlan {
    pub fn commit_message(&self) -> String {
        format!("release: {}", self.tag)
    }

    pub fn tag_ref(&self) -> String {
        format!("refs/tags/{}", self.tag)
    }
}

/// Drives one release through [`ReleaseState`].
pub struct ReleasePolicy<'a> {
    vcs: &'a dyn VersionControl,
    state: ReleaseState,
    trail: Vec<ReleaseState>,
}

impl<'a> ReleasePolicy<'a> {
    pub fn new(vcs: &'a dyn VersionControl) -> Self {
        Self {
            vcs,
            state: ReleaseState::Selecting,
            trail: vec![ReleaseState::Selecting],
        }
    }

    pub fn state(&self) -> ReleaseState {
        self.state
    }

    /// Every state visited so far, starting with `Selecting`.
    pub fn trail(&self) -> &[ReleaseState] {
        &self.trail
    }

    fn advance(&mut self, next: ReleaseState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal release transition {} -> {}",
            self.state,
            next
        );
        info!(from = %self.state, to = %next, "release state");
        self.state = next;
        self.trail.push(next);
    }

    /// Stop the release. No-op once a terminal state is reached.
    pub fn abort(&mut self, reason: AbortReason) -> ReleaseOutcome {
        if !self.state.is_terminal() {
            info!(?reason, "release aborted");
            self.advance(ReleaseState::Aborted);
        }
        ReleaseOutcome::Aborted(reason)
    }

    /// Validate `version` for `package`. An invalid version aborts the release.
    pub fn choose_version(
        &mut self,
        package: PackageDescriptor,
        version: &str,
    ) -> Result<ReleasePlan> {
        let parsed = match parse_version(version) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.abort(AbortReason::InvalidVersion);
                return Err(err);
            }
        };
        let tag = package.release_tag(&parsed.to_string());
        self.advance(ReleaseState::VersionChosen);
        Ok(ReleasePlan {
            package,
            version: parsed,
            tag,
        })
    }

    /// Record the user's answer. Returns whether the release continues.
    pub fn confirm(&mut self, approved: bool) -> bool {
        if approved {
            self.advance(ReleaseState::Confirmed);
        } else {
            self.abort(AbortReason::Declined);
        }
        approved
    }

    /// Write the manifest, then commit, tag, and push when that produced a diff.
    ///
    /// Fails with [`ReleaseError::NotConfirmed`] unless [`ReleasePolicy::confirm`]
    /// approved the release.
    ///
    /// Nothing is rolled back on failure; [`ReleasePolicy::state`] tells how far
    /// the release got.
    pub fn finalize(&mut self, plan: &ReleasePlan, reporter: &dyn Reporter) -> Result<ReleaseOutcome> {
        if self.state != ReleaseState::Confirmed {
            return Err(ReleaseError::NotConfirmed(self.state.to_string()));
        }

        reporter.step("Updating package version...");
        write_version(&plan.package.manifest_path, &plan.version.to_string())?;

        let diff = self.vcs.diff()?;
        if diff.trim().is_empty() {
            reporter.info("No changes to commit.");
            return Ok(self.abort(AbortReason::NoChanges));
        }

        reporter.step("Committing changes...");
        self.vcs.stage_all()?;
        self.vcs.commit(&plan.commit_message())?;
        self.advance(ReleaseState::Committed);
        self.vcs.create_tag(&plan.tag)?;
        self.advance(ReleaseState::Tagged);

        reporter.step("Pushing to remote...");
        if let Err(err) = self
            .vcs
            .push_ref(&plan.tag_ref())
            .and_then(|()| self.vcs.push_branch())
        {
            warn!(tag = %plan.tag, state = %self.state, "push failed; local commit and tag remain");
            return Err(err);
        }
        self.advance(ReleaseState::Pushed);
        self.advance(ReleaseState::Done);

        Ok(ReleaseOutcome::Released {
            tag: plan.tag.clone(),
        })
    }
}
