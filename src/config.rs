use std::{
    env,
    fmt::{Display, Formatter},
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use serde::Deserialize;

pub const CONFIG_ENV_VAR: &str = "POLL_WATCH_CONFIG";
pub const LOCAL_CONFIG_FILE: &str = "poll-watch.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_wait_time_ms")]
    pub wait_time_ms: u64,
    #[serde(default = "default_true")]
    pub pause_when_hidden: bool,
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

fn default_wait_time_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPathSource {
    Flag,
    WorkingDirectory,
    EnvVar,
    Default,
}

impl Display for ConfigPathSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Flag => "--config",
            Self::WorkingDirectory => "working directory",
            Self::EnvVar => CONFIG_ENV_VAR,
            Self::Default => "default",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfigPath {
    pub path: PathBuf,
    pub source: ConfigPathSource,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub resolved_path: ResolvedConfigPath,
}

pub fn parse_config(src: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(src).context("failed to parse config TOML")?;
    validate_config(&cfg)?;
    Ok(cfg)
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    load_config_with_path(path).map(|loaded| loaded.config)
}

pub fn load_config_with_path(path: Option<&Path>) -> Result<LoadedConfig> {
    let resolved_path = resolve_config_path_with_source(path)?;

    let src = fs::read_to_string(&resolved_path.path).with_context(|| {
        format!(
            "failed to read config: {} (source: {})",
            resolved_path.path.display(),
            resolved_path.source
        )
    })?;
    let config = parse_config(&src)
        .with_context(|| format!("invalid config: {}", resolved_path.path.display()))?;
    Ok(LoadedConfig {
        config,
        resolved_path,
    })
}

pub fn resolve_config_path(path: Option<&Path>) -> Result<PathBuf> {
    resolve_config_path_with_source(path).map(|resolved| resolved.path)
}

pub fn resolve_config_path_with_source(path: Option<&Path>) -> Result<ResolvedConfigPath> {
    if let Some(explicit) = path {
        return Ok(ResolvedConfigPath {
            path: explicit.to_path_buf(),
            source: ConfigPathSource::Flag,
        });
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Ok(ResolvedConfigPath {
            path: local,
            source: ConfigPathSource::WorkingDirectory,
        });
    }

    if let Some(raw) = env::var_os(CONFIG_ENV_VAR) {
        return Ok(ResolvedConfigPath {
            path: PathBuf::from(raw),
            source: ConfigPathSource::EnvVar,
        });
    }

    Ok(ResolvedConfigPath {
        path: default_config_path()?,
        source: ConfigPathSource::Default,
    })
}

pub fn default_config_path() -> Result<PathBuf> {
    let home = BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or_else(|| anyhow!("could not determine home directory"))?;
    Ok(home.join(".config").join("poll-watch").join("config.toml"))
}

fn validate_config(cfg: &Config) -> Result<()> {
    if cfg.wait_time_ms == 0 {
        return Err(anyhow!("wait_time_ms must be >= 1"));
    }

    if cfg.source.program.trim().is_empty() {
        return Err(anyhow!("source.program must not be empty"));
    }

    Ok(())
}
