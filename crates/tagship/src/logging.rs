use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter; `RUST_LOG` is read when unset.
pub const LOG_ENV: &str = "TAGSHIP_LOG";

/// Filter used when neither variable is set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| default_directive(verbose).into())
}

/// Install the stderr subscriber. A second call is a no-op.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}
