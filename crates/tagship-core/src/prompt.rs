use crate::errors::Result;
use crate::version::VersionCandidate;

/// Interactive questions asked during a release.
///
/// Implementations return `None` / `false` when the user dismisses a prompt.
pub trait Prompter {
    fn select_package(&self, packages: &[String]) -> Result<Option<String>>;
    /// Index into `candidates` of the chosen entry.
    fn select_version(&self, candidates: &[VersionCandidate]) -> Result<Option<usize>>;
    /// Free-form version, pre-filled with `initial`.
    fn input_version(&self, initial: &str) -> Result<String>;
    fn confirm_release(&self, tag: &str) -> Result<bool>;
}

/// Progress output shown to the user.
pub trait Reporter {
    /// Start of a release step, e.g. "Committing changes...".
    fn step(&self, message: &str);
    fn info(&self, message: &str);
    fn success(&self, message: &str);
    fn warn(&self, message: &str);
    /// Commits of `package` since its previous release tag.
    fn recent_commits(&self, package: &str, tag: &str, sha: &str, commits: &[String]);
}
