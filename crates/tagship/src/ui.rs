use dialoguer::{
    Confirm, Input, Select,
    console::{Style, style},
    theme::ColorfulTheme,
};
use tagship_core::errors::{ReleaseError, Result};
use tagship_core::{Prompter, Reporter, VersionCandidate};

pub const SUCCESS_PREFIX: &str = "✔";
pub const WARNING_PREFIX: &str = "⚠";
pub const STEP_PREFIX: &str = "›";
const SHORT_SHA_LEN: usize = 5;

pub fn log_success(message: &str) {
    let line = format!(
        "{} {}",
        style(SUCCESS_PREFIX).for_stdout().green(),
        Style::new().for_stdout().green().apply_to(message)
    );
    println!("{line}");
}

pub fn log_step(message: &str) {
    let line = format!(
        "{} {}",
        style(STEP_PREFIX).for_stdout().cyan(),
        Style::new().for_stdout().cyan().apply_to(message)
    );
    println!("{line}");
}

pub fn log_warning(message: &str) {
    let mut theme = prompt_theme();
    theme.error_prefix = style(WARNING_PREFIX.to_string()).for_stderr().yellow();
    theme.error_style = Style::new().for_stderr().yellow();

    let line = format!(
        "{} {}",
        theme.error_prefix.clone(),
        theme.error_style.apply_to(message)
    );
    eprintln!("{line}");
}

pub fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("🏷".to_string()).cyan(),
        prompt_style: Style::new().for_stderr(),
        success_prefix: style(SUCCESS_PREFIX.to_string()).for_stderr(),
        success_suffix: style(":".to_string()).for_stderr(),
        values_style: Style::new().for_stderr(),
        ..ColorfulTheme::default()
    }
}

pub fn prompt_error(error: dialoguer::Error) -> ReleaseError {
    match error {
        dialoguer::Error::IO(err) => ReleaseError::Prompt(err.to_string()),
    }
}

/// Abbreviated commit id shown in the recent-commit header.
pub fn short_sha(sha: &str) -> &str {
    sha.get(..SHORT_SHA_LEN).unwrap_or(sha)
}

/// Header line printed above the commits of a package since its last tag.
pub fn recent_commits_header(package: &str, tag: &str, sha: &str, count: usize) -> String {
    match count {
        0 => format!("No commits to {package} since {tag} ({})", short_sha(sha)),
        1 => format!("1 commit to {package} since {tag} ({})", short_sha(sha)),
        n => format!("{n} commits to {package} since {tag} ({})", short_sha(sha)),
    }
}

/// Terminal prompts and progress output.
pub struct Terminal {
    theme: ColorfulTheme,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            theme: prompt_theme(),
        }
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for Terminal {
    fn select_package(&self, packages: &[String]) -> Result<Option<String>> {
        if packages.is_empty() {
            return Err(ReleaseError::Prompt("no packages to release".into()));
        }

        let index = Select::with_theme(&self.theme)
            .with_prompt("Select package to release")
            .items(packages)
            .default(0)
            .interact_opt()
            .map_err(prompt_error)?;
        Ok(index.map(|i| packages[i].clone()))
    }

    fn select_version(&self, candidates: &[VersionCandidate]) -> Result<Option<usize>> {
        let titles: Vec<String> = candidates.iter().map(VersionCandidate::title).collect();
        Select::with_theme(&self.theme)
            .with_prompt("Select version")
            .items(&titles)
            .default(0)
            .interact_opt()
            .map_err(prompt_error)
    }

    fn input_version(&self, initial: &str) -> Result<String> {
        let value: String = Input::with_theme(&self.theme)
            .with_prompt("Enter custom version")
            .with_initial_text(initial)
            .interact_text()
            .map_err(prompt_error)?;
        Ok(value.trim().to_string())
    }

    fn confirm_release(&self, tag: &str) -> Result<bool> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(format!("Releasing {tag}. Confirm?"))
            .default(false)
            .interact_opt()
            .map_err(prompt_error)?;
        Ok(answer.unwrap_or(false))
    }
}

impl Reporter for Terminal {
    fn step(&self, message: &str) {
        log_step(message);
    }

    fn info(&self, message: &str) {
        println!("{message}");
    }

    fn success(&self, message: &str) {
        log_success(message);
    }

    fn warn(&self, message: &str) {
        log_warning(message);
    }

    fn recent_commits(&self, package: &str, tag: &str, sha: &str, commits: &[String]) {
        let header = recent_commits_header(package, tag, sha, commits.len());
        println!("{}", style(header).bold());
        for commit in commits {
            println!("  {}", style(commit).dim());
        }
    }
}
