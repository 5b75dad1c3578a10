use clap::{Args, Parser, Subcommand};

/// tagship – bump, tag, and push npm package releases; publish them from CI
#[derive(Debug, Parser)]
#[command(
    name = "tagship",
    version,
    about,
    long_about = None,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Log diagnostic details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Interactive release options (used when no subcommand is given)
    #[command(flatten)]
    pub release: ReleaseArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Publish the package named by a pushed `<name>@<version>` tag (for CI)
    Publish(PublishArgs),
}

#[derive(Debug, Args, Default)]
pub struct ReleaseArgs {
    /// Pick the package from the packages directory
    #[arg(long)]
    pub monorepo: bool,

    /// Package names offered for selection in single-package mode
    #[arg(short, long, num_args = 1.., value_name = "PACKAGE")]
    pub package: Vec<String>,

    /// Dry-run: update the manifest but only print git commands
    #[arg(long)]
    pub dry: bool,
}

#[derive(Debug, Args)]
#[command(after_long_help = "\
Examples:\n  tagship publish widgets@1.4.0\n  tagship publish @acme/widgets@v2.0.0-beta.1 --monorepo --registry https://npm.example.com/\n\nBehavior:\n  - The tag version (a leading `v` is ignored) must equal the package's manifest version.\n  - Versions containing `beta` are published under the `beta` dist-tag.")]
pub struct PublishArgs {
    /// Release tag of the form <name>@<version>
    pub tag: String,

    /// Resolve the package inside the packages directory
    #[arg(long)]
    pub monorepo: bool,

    /// Dry-run: print the publish command without running it
    #[arg(long)]
    pub dry: bool,

    /// Registry URL passed to npm
    #[arg(long, value_name = "URL")]
    pub registry: Option<String>,
}
