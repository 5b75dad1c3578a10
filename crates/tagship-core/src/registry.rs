use crate::errors::Result;
use crate::process::{Executor, OutputMode};
use std::path::Path;

/// Public npm registry used when nothing else is configured.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org/";

/// Distribution tag applied to prerelease publishes.
pub const BETA_DIST_TAG: &str = "beta";

/// Arguments for a single publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest<'a> {
    pub package_dir: &'a Path,
    pub dist_tag: Option<&'a str>,
    pub registry: Option<&'a str>,
}

/// Registry client collaborator.
pub trait RegistryClient {
    fn publish(&self, request: &PublishRequest<'_>) -> Result<()>;
}

/// Publishes through the `npm` CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct NpmClient {
    executor: Executor,
}

impl NpmClient {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl RegistryClient for NpmClient {
    fn publish(&self, request: &PublishRequest<'_>) -> Result<()> {
        let args = publish_args(request);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.executor
            .run("npm", &args, request.package_dir, OutputMode::Piped)
    }
}

/// `npm publish` arguments for a request, always with public access.
pub fn publish_args(request: &PublishRequest<'_>) -> Vec<String> {
    let mut args = vec![
        "publish".to_string(),
        "--access".to_string(),
        "public".to_string(),
    ];
    if let Some(tag) = request.dist_tag {
        args.push("--tag".to_string());
        args.push(tag.to_string());
    }
    if let Some(registry) = request.registry.map(str::trim).filter(|r| !r.is_empty()) {
        args.push("--registry".to_string());
        args.push(registry.to_string());
    }
    args
}

/// `beta` for versions mentioning it, otherwise the registry default.
pub fn dist_tag_for(version: &str) -> Option<&'static str> {
    if version.contains(BETA_DIST_TAG) {
        Some(BETA_DIST_TAG)
    } else {
        None
    }
}
