use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Installs the global subscriber. A non-empty `RUST_LOG` replaces the
/// defaults entirely; otherwise `verbose` raises the crate's own level to debug.
pub fn init_logging(verbose: bool) {
    let filter = build_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok(), verbose);

    tracing_subscriber::registry()
        .with(fmt::layer().pretty())
        .with(filter)
        .init();
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "warn,goldrate=debug"
    } else {
        "warn,goldrate=info"
    }
}

fn build_filter(rust_log: Option<String>, verbose: bool) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directives(verbose)))
}
