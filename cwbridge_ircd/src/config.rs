use crate::session::SessionSettings;

use std::{
    collections::HashMap,
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;
use tracing_core::{LevelFilter, Metadata};

#[derive(Debug,Error)]
pub enum ConfigError
{
    #[error("I/O error on {1}: {0}")]
    IoError(std::io::Error, PathBuf),
    #[error("Parse error in {1}: {0}")]
    ParseError(json5::Error, PathBuf),
}

#[derive(Clone,Debug,serde::Serialize,serde::Deserialize)]
#[serde(rename_all="lowercase")]
pub enum BuiltinLogTarget
{
    Stdout,
    Stderr,
}

#[derive(Clone,Debug,serde::Serialize,serde::Deserialize)]
#[serde(untagged)]
pub enum LogTarget
{
    File { filename: PathBuf },
    Builtin(BuiltinLogTarget),
}

#[derive(Clone,Copy,Debug,PartialEq,Eq,serde::Serialize,serde::Deserialize)]
#[serde(rename_all ="lowercase")]
pub enum LogLevel
{
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

#[derive(Clone,Debug,serde::Deserialize)]
pub struct LogEntry
{
    pub target: LogTarget,
    #[serde(default)]
    pub modules: Vec<String>,
    pub level: Option<LogLevel>,
}

impl LogEntry
{
    /// Whether this target records events described by `metadata`. An empty
    /// module list matches everything, as does an event with no module path.
    pub fn enabled(&self, metadata: &Metadata<'_>) -> bool
    {
        let level = self.level.map_or(LevelFilter::TRACE, LevelFilter::from);
        if *metadata.level() > level
        {
            return false;
        }

        match metadata.module_path()
        {
            Some(module) if !self.modules.is_empty() => self.modules.iter().any(|m| module.starts_with(m.as_str())),
            _ => true,
        }
    }
}

/// HTTP client internals that log every request at debug level or below
const QUIET_MODULES: [&str; 2] = ["reqwest", "hyper"];

#[derive(Clone,Debug,serde::Deserialize)]
#[serde(rename_all="kebab-case", default)]
pub struct LoggingConfig
{
    /// Directory for file log targets
    pub dir: PathBuf,
    pub default_level: Option<LogLevel>,
    pub module_levels: HashMap<String, LogLevel>,
    pub targets: Vec<LogEntry>,
}

impl Default for LoggingConfig
{
    fn default() -> Self
    {
        Self {
            dir: PathBuf::from("."),
            default_level: Some(LogLevel::Info),
            module_levels: QUIET_MODULES.iter().map(|m| (m.to_string(), LogLevel::Warn)).collect(),
            targets: vec![LogEntry {
                target: LogTarget::Builtin(BuiltinLogTarget::Stderr),
                modules: Vec::new(),
                level: None,
            }],
        }
    }
}

#[derive(Clone,Debug,serde::Deserialize)]
#[serde(rename_all="kebab-case", default)]
pub struct BackendConfig
{
    pub base_url: String,
    pub poll_interval_secs: u64,
}

impl Default for BackendConfig
{
    fn default() -> Self
    {
        Self {
            base_url: chatwork_client::DEFAULT_BASE_URL.to_string(),
            poll_interval_secs: 5,
        }
    }
}

const MIN_POLL_INTERVAL_SECS: u64 = 1;

/// Top-level configuration for the gateway
#[derive(Clone,Debug,serde::Deserialize)]
#[serde(rename_all="kebab-case", default)]
pub struct BridgeConfig
{
    pub listen: SocketAddr,
    pub server_name: String,
    pub backend: BackendConfig,
    pub log: LoggingConfig,
}

impl Default for BridgeConfig
{
    fn default() -> Self
    {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 6667)),
            server_name: "cwbridge".to_string(),
            backend: BackendConfig::default(),
            log: LoggingConfig::default(),
        }
    }
}

impl BridgeConfig
{
    pub fn load_file(filename: impl AsRef<Path>) -> Result<Self, ConfigError>
    {
        let filename = filename.as_ref();
        let config = fs::read_to_string(filename)
                        .map_err(|e| ConfigError::IoError(e, filename.to_owned()))?;
        json5::from_str(&config).map_err(|e| ConfigError::ParseError(e, filename.to_owned()))
    }

    /// Settings for the sessions run by the listener. The poll interval is
    /// never shorter than one second.
    pub fn session_settings(&self) -> SessionSettings
    {
        SessionSettings {
            server_name: self.server_name.clone(),
            poll_interval: Duration::from_secs(self.backend.poll_interval_secs.max(MIN_POLL_INTERVAL_SECS)),
        }
    }
}

impl From<LogLevel> for LevelFilter
{
    fn from(arg: LogLevel) -> LevelFilter
    {
        match arg
        {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info  => LevelFilter::INFO,
            LogLevel::Warn  => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off   => LevelFilter::OFF,
        }
    }
}
