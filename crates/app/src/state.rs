use std::{fs, path::PathBuf, time::Duration};

use common::prelude::{SolidClientConfig, WebId};
use serde::{Deserialize, Serialize};
use url::Url;

pub const APP_NAME: &str = "podvault";
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Overrides the configured access token when set
pub const ACCESS_TOKEN_ENV: &str = "PODVAULT_ACCESS_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// The identity every operation acts as
    pub web_id: WebId,
    /// Root of the caller's store; read from the profile when unset
    #[serde(default)]
    pub pod_url: Option<Url>,
    /// Bearer token presented to the store
    #[serde(default)]
    pub access_token: Option<String>,
    /// Per-request timeout in seconds; 0 disables it
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    pub fn new(web_id: WebId) -> Self {
        Self {
            web_id,
            pod_url: None,
            access_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Client settings, with the token from `env_token` taking precedence.
    pub fn client_config(&self, env_token: Option<String>) -> SolidClientConfig {
        let access_token = env_token
            .filter(|token| !token.trim().is_empty())
            .or_else(|| self.access_token.clone());
        let timeout = (self.request_timeout_secs > 0)
            .then(|| Duration::from_secs(self.request_timeout_secs));
        SolidClientConfig {
            access_token,
            timeout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the podvault directory (~/.podvault)
    pub podvault_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the podvault directory path (custom or default ~/.podvault)
    pub fn podvault_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new podvault state directory
    pub fn init(custom_path: Option<PathBuf>, config: AppConfig) -> Result<Self, StateError> {
        let podvault_dir = Self::podvault_dir(custom_path)?;

        if podvault_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }
        fs::create_dir_all(&podvault_dir)?;

        let config_path = podvault_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            podvault_dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the podvault directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let podvault_dir = Self::podvault_dir(custom_path)?;

        if !podvault_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = podvault_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            podvault_dir,
            config_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("podvault directory not initialized. Run 'podvault init' first")]
    NotInitialized,

    #[error("podvault directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
