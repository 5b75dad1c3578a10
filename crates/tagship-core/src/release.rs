use crate::config::{ReleaseConfig, ReleaseMode};
use crate::errors::Result;
use crate::git::{VersionControl, latest_release_tag};
use crate::package::{PackageDescriptor, PackageLocator};
use crate::policy::{AbortReason, ReleaseOutcome, ReleasePolicy};
use crate::prompt::{Prompter, Reporter};
use crate::publish::{PublishReport, publish_tag};
use crate::registry::RegistryClient;
use crate::version::candidates_for;
use std::path::PathBuf;
use tracing::{debug, warn};

pub const DRY_RUN_FINISHED: &str = "Dry run finished - run git diff to see package changes.";
pub const PUSHED: &str = "Pushed, publishing should start shortly on CI.";

/// Result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Release(ReleaseOutcome),
    Publish(PublishReport),
}

/// Commits made to a package since its previous release tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentCommits {
    pub tag: String,
    pub sha: String,
    pub commits: Vec<String>,
}

/// Wires the release flows to their collaborators.
pub struct Orchestrator<'a> {
    root: PathBuf,
    config: &'a ReleaseConfig,
    vcs: &'a dyn VersionControl,
    registry: &'a dyn RegistryClient,
    prompter: &'a dyn Prompter,
    reporter: &'a dyn Reporter,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        root: impl Into<PathBuf>,
        config: &'a ReleaseConfig,
        vcs: &'a dyn VersionControl,
        registry: &'a dyn RegistryClient,
        prompter: &'a dyn Prompter,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            root: root.into(),
            config,
            vcs,
            registry,
            prompter,
            reporter,
        }
    }

    pub fn run(&self, mode: &ReleaseMode) -> Result<RunOutcome> {
        debug!(?mode, dry_run = self.config.dry_run, "starting");
        match mode {
            ReleaseMode::SinglePackage => self.release_single_package().map(RunOutcome::Release),
            ReleaseMode::Monorepo => self.release_monorepo().map(RunOutcome::Release),
            ReleaseMode::Publish { tag } => self.publish(tag).map(RunOutcome::Publish),
        }
    }

    /// Interactive release of the repository root package.
    pub fn release_single_package(&self) -> Result<ReleaseOutcome> {
        let locator = PackageLocator::single(&self.root, &self.config.packages);
        self.release_selected(&locator)
    }

    /// Interactive release of one package under the packages directory.
    pub fn release_monorepo(&self) -> Result<ReleaseOutcome> {
        let locator = PackageLocator::monorepo(&self.root, &self.config.packages_dir);
        self.release_selected(&locator)
    }

    /// CI publish of the package named by `tag`.
    pub fn publish(&self, tag: &str) -> Result<PublishReport> {
        let locator = PackageLocator::for_config(&self.root, self.config);
        let report = publish_tag(&locator, tag, &self.config.registry, self.registry)?;
        self.reporter.success(&format!(
            "Published {}@{}",
            report.package, report.version
        ));
        Ok(report)
    }

    fn release_selected(&self, locator: &PackageLocator) -> Result<ReleaseOutcome> {
        let mut policy = ReleasePolicy::new(self.vcs);

        let names = locator.candidates()?;
        let selected = self
            .prompter
            .select_package(&names)?
            .filter(|name| !name.trim().is_empty());
        let Some(name) = selected else {
            return Ok(policy.abort(AbortReason::NoPackageSelected));
        };

        let package = locator.resolve(&name)?;
        self.report_recent_commits(locator, &name, &package);

        let candidates = candidates_for(&package.version)?;
        let Some(index) = self.prompter.select_version(&candidates)? else {
            return Ok(policy.abort(AbortReason::NoVersionSelected));
        };
        let Some(candidate) = candidates.get(index) else {
            return Ok(policy.abort(AbortReason::NoVersionSelected));
        };
        debug!(package = %package.name, release_type = %candidate.release_type, "version choice");
        let target = match &candidate.version {
            Some(version) => version.to_string(),
            None => self.prompter.input_version(&package.version)?,
        };

        let plan = policy.choose_version(package, &target)?;
        let approved = self.prompter.confirm_release(&plan.tag)?;
        if !policy.confirm(approved) {
            return Ok(ReleaseOutcome::Aborted(AbortReason::Declined));
        }

        let outcome = match policy.finalize(&plan, self.reporter) {
            Ok(outcome) => outcome,
            Err(err) => {
                if policy.state().has_local_changes() {
                    self.reporter.warn(&format!(
                        "{} exists locally but was not pushed; push it manually or delete the local tag and commit",
                        plan.tag
                    ));
                }
                return Err(err);
            }
        };

        if matches!(outcome, ReleaseOutcome::Released { .. }) {
            if self.config.dry_run {
                self.reporter.success(DRY_RUN_FINISHED);
            } else {
                self.reporter.success(PUSHED);
            }
        }
        Ok(outcome)
    }

    fn report_recent_commits(
        &self,
        locator: &PackageLocator,
        name: &str,
        package: &PackageDescriptor,
    ) {
        match self.recent_commits(locator, name, package) {
            Ok(Some(recent)) => self.reporter.recent_commits(
                &package.name,
                &recent.tag,
                &recent.sha,
                &recent.commits,
            ),
            Ok(None) => debug!(package = %package.name, "no previous release tag"),
            Err(err) => warn!(package = %package.name, error = %err, "could not list recent commits"),
        }
    }

    /// Commits touching the package since its lexicographically latest release tag.
    pub fn recent_commits(
        &self,
        locator: &PackageLocator,
        name: &str,
        package: &PackageDescriptor,
    ) -> Result<Option<RecentCommits>> {
        let tags = self.vcs.list_tags()?;
        let Some(tag) = latest_release_tag(&tags, &package.name) else {
            return Ok(None);
        };
        let sha = self.vcs.resolve_tag(&tag)?;
        let commits = self.vcs.commits_since(&sha, &locator.source_path(name))?;
        Ok(Some(RecentCommits { tag, sha, commits }))
    }
}
