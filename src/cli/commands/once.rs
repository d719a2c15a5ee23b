use anyhow::{Context, Result};

use crate::{config::Config, infra::command_source::CommandSource, ports::FetchPort};

pub(crate) async fn run(cfg: Config) -> Result<()> {
    let source = CommandSource::from_config(&cfg.source);
    let value = source.fetch().await?;
    let rendered = serde_json::to_string_pretty(&value).context("failed to render value")?;
    println!("{rendered}");
    Ok(())
}
