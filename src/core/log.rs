use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

const APP_TARGET: &str = "fxlive";

// Failed refreshes are logged at warn and must stay visible by default
const DEFAULT_DIRECTIVES: &str = "fxlive=warn";

/// Filter directives for the given verbosity and `RUST_LOG` value.
fn log_directives(verbose: bool, env: Option<&str>) -> String {
    let base = env
        .map(str::trim)
        .filter(|directives| !directives.is_empty())
        .unwrap_or(DEFAULT_DIRECTIVES);
    if verbose {
        format!("{base},{APP_TARGET}=debug")
    } else {
        base.to_string()
    }
}

fn build_filter(verbose: bool, env: Option<&str>) -> EnvFilter {
    EnvFilter::builder().parse_lossy(log_directives(verbose, env))
}

/// Installs the global subscriber. Output goes to stderr so it never mixes
/// with the converter panel on stdout.
pub fn init_logging(verbose: bool) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(build_filter(verbose, env.as_deref()))
        .init();
}
