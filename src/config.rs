//! Runtime settings: command line, environment, `qbank.toml`, defaults.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "qbank.toml";
pub const DEFAULT_HOST: &str = "huggingface.co";
pub const DEFAULT_SAMPLE_PATH: &str = "data/sample-questions.json";

/// Which page flavour to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Search, sort and limit over plain question cards.
    #[default]
    Cards,
    /// Start-index threshold over image-aware questions.
    Gallery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
pub enum SortMode {
    #[default]
    #[value(name = "none")]
    #[serde(rename = "none")]
    Original,
    #[value(name = "asc")]
    #[serde(rename = "asc")]
    Asc,
    #[value(name = "desc")]
    #[serde(rename = "desc")]
    Desc,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Original => "none",
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Original => Self::Asc,
            Self::Asc => Self::Desc,
            Self::Desc => Self::Original,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "qbank", about = "Browse question datasets from Hugging Face", version)]
pub struct Cli {
    /// Settings file; defaults to the nearest qbank.toml up from the current directory
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Dataset host
    #[arg(long, env = "QBANK_HOST")]
    pub host: Option<String>,

    /// Dataset repo id, e.g. openai/gsm8k
    #[arg(long = "repo", short = 'r')]
    pub repo_id: Option<String>,

    /// File inside the dataset repo, e.g. main/test.jsonl
    #[arg(long = "file", short = 'f')]
    pub file_path: Option<String>,

    /// Bearer token for private datasets
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Sample file loaded at startup
    #[arg(long = "sample", env = "QBANK_SAMPLE")]
    pub sample_path: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub variant: Option<Variant>,

    #[arg(long, value_enum)]
    pub sort: Option<SortMode>,

    /// Show at most this many questions (0 = no limit)
    #[arg(long)]
    pub limit: Option<usize>,

    #[arg(long, value_enum)]
    pub theme: Option<ThemeKind>,

    /// Request timeout in seconds (no timeout when unset)
    #[arg(long = "timeout")]
    pub timeout_secs: Option<u64>,

    #[arg(long = "log-file", env = "QBANK_LOG")]
    pub log_file: Option<PathBuf>,
}

/// Shape of `qbank.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub repo_id: Option<String>,
    pub file_path: Option<String>,
    pub token: Option<String>,
    pub sample_path: Option<PathBuf>,
    pub variant: Option<Variant>,
    pub sort: Option<SortMode>,
    pub limit: Option<usize>,
    pub theme: Option<ThemeKind>,
    pub timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub repo_id: String,
    pub file_path: String,
    pub token: Option<String>,
    pub sample_path: PathBuf,
    pub variant: Variant,
    pub sort: SortMode,
    pub limit: usize,
    pub theme: ThemeKind,
    pub timeout: Option<Duration>,
    pub log_file: PathBuf,
}

impl Settings {
    /// Resolves settings, reading the config file named by `--config` or
    /// the nearest one found by [`find_config_file`].
    pub fn load(cli: Cli) -> Result<Self> {
        let path = match &cli.config {
            Some(p) => Some(p.clone()),
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| find_config_file(&cwd)),
        };
        let file = match path {
            Some(p) => load_file_config(&p)?,
            None => FileConfig::default(),
        };
        Ok(Self::merge(cli, file))
    }

    pub fn merge(cli: Cli, file: FileConfig) -> Self {
        Self {
            host: cli
                .host
                .or(file.host)
                .unwrap_or_else(|| DEFAULT_HOST.into()),
            repo_id: cli.repo_id.or(file.repo_id).unwrap_or_default(),
            file_path: cli.file_path.or(file.file_path).unwrap_or_default(),
            token: cli
                .token
                .or(file.token)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            sample_path: cli
                .sample_path
                .or(file.sample_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SAMPLE_PATH)),
            variant: cli.variant.or(file.variant).unwrap_or_default(),
            sort: cli.sort.or(file.sort).unwrap_or_default(),
            limit: cli.limit.or(file.limit).unwrap_or(0),
            theme: cli.theme.or(file.theme).unwrap_or_default(),
            timeout: cli
                .timeout_secs
                .or(file.timeout_secs)
                .map(Duration::from_secs),
            log_file: cli
                .log_file
                .or(file.log_file)
                .unwrap_or_else(|| std::env::temp_dir().join("qbank.log")),
        }
    }
}

/// Looks for `qbank.toml` in `start` and each of its ancestors.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|p| p.is_file())
}

pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse config: {}", path.display()))
}
