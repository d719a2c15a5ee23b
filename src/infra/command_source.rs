use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use crate::{
    config::{OutputFormat, SourceConfig},
    ports::FetchPort,
};

#[derive(Debug, Clone)]
pub struct CommandSource {
    program: PathBuf,
    args: Vec<String>,
    format: OutputFormat,
}

impl CommandSource {
    pub fn new<P: Into<PathBuf>>(program: P, args: Vec<String>, format: OutputFormat) -> Self {
        Self {
            program: program.into(),
            args,
            format,
        }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(&config.program, config.args.clone(), config.format)
    }

    async fn run(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("failed to execute {}", self.program.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "{} failed (status={}): {}",
                self.program.display(),
                output.status,
                stderr.trim()
            ));
        }

        Ok(String::from_utf8(output.stdout)
            .context("command output is not valid UTF-8")?
            .trim()
            .to_string())
    }
}

#[async_trait]
impl FetchPort<Value, anyhow::Error> for CommandSource {
    async fn fetch(&self) -> Result<Value> {
        let stdout = self.run().await?;
        parse_output(&stdout, self.format)
    }
}

pub fn parse_output(stdout: &str, format: OutputFormat) -> Result<Value> {
    match format {
        OutputFormat::Json => {
            serde_json::from_str(stdout).context("command output is not valid JSON")
        }
        OutputFormat::Text => Ok(Value::String(stdout.to_string())),
    }
}
