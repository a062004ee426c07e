use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// The filter comes from `INSIGHTS_LOG_LEVEL`, then `RUST_LOG`, then
/// `default_level`. Output goes to stderr so report JSON on stdout stays
/// clean.
pub fn init(default_level: &str) {
    let log_env = std::env::var("INSIGHTS_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_level.to_string());
    let env_filter = EnvFilter::try_new(&log_env).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .try_init();
    tracing::debug!("log filter: {}", log_env);
}
