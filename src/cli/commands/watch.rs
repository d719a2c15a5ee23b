use anyhow::Result;

use crate::{
    app::watch_loop::run_watch,
    cli::SystemClock,
    config::{Config, ResolvedConfigPath},
    infra::command_source::CommandSource,
};

pub(crate) async fn run(
    cfg: Config,
    resolved_config: ResolvedConfigPath,
    max_changes: Option<usize>,
) -> Result<()> {
    tracing::info!(
        path = %resolved_config.path.display(),
        source = %resolved_config.source,
        wait_time_ms = cfg.wait_time_ms,
        "starting watch"
    );

    let source = CommandSource::from_config(&cfg.source);
    run_watch(&cfg, source, &SystemClock, max_changes).await
}
