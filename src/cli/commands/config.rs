use anyhow::Result;

use crate::{cli::args::ConfigCommands, config::resolve_config_path_with_source};

pub(crate) fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path { config } => {
            let resolved = resolve_config_path_with_source(config.as_deref())?;
            println!("{}", resolved.path.display());
            println!("source: {}", resolved.source);
            Ok(())
        }
    }
}
