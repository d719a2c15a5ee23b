use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "POLL_WATCH_LOG";
const DEFAULT_DIRECTIVE: &str = "poll_watch=warn";

pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
