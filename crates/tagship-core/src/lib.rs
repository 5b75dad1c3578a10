pub mod config;
pub mod errors;
pub mod git;
pub mod manifest;
pub mod package;
pub mod policy;
pub mod process;
pub mod prompt;
pub mod publish;
pub mod registry;
pub mod release;
pub mod version;

// Re-export commonly used items
pub use config::{CliOverrides, FileConfig, ReleaseConfig, ReleaseMode};
pub use errors::{ReleaseError, Result};
pub use git::{SystemGit, VersionControl};
pub use package::{PackageDescriptor, PackageLocator};
pub use policy::{AbortReason, ReleaseOutcome, ReleasePlan, ReleasePolicy, ReleaseState};
pub use process::Executor;
pub use prompt::{Prompter, Reporter};
pub use publish::{PublishReport, ReleaseTag, publish_tag};
pub use registry::{NpmClient, PublishRequest, RegistryClient};
pub use release::{Orchestrator, RunOutcome};
pub use version::{ReleaseType, VersionCandidate, is_valid, version_candidates};
