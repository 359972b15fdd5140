use async_once_cell::OnceCell;
use directories::ProjectDirs;
use eyre::{eyre, Result};
use lazy_static::lazy_static;
use serde_derive::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use super::{util, CLI_NAME};

lazy_static! {
    pub static ref SETTINGS: Arc<OnceCell<Settings>> = Arc::new(OnceCell::new());
}

static DEFAULT_DB_FILE: &str = "fyyur.db";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings global store is uninitialized")]
    Uninitialized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub db: String,
    #[serde(default)]
    pub pool: Pool,

    /// Seconds a single request may run before it is answered with a timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Number of artists and venues listed on the landing page
    #[serde(default = "default_recent_limit")]
    pub recent_limit: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db: String::new(),
            pool: Pool::default(),
            request_timeout: default_request_timeout(),
            recent_limit: default_recent_limit(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

fn default_recent_limit() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_pool_timeout")]
    pub timeout: u64,
}

impl Default for Pool {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            timeout: default_pool_timeout(),
        }
    }
}

fn default_max_connections() -> u32 {
    100
}

fn default_min_connections() -> u32 {
    5
}

fn default_pool_timeout() -> u64 {
    8
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "github", CLI_NAME)
        .ok_or_else(|| eyre!("Could not locate program directories"))
}

pub fn get_settings() -> Result<&'static Settings, SettingsError> {
    SETTINGS.get().ok_or(SettingsError::Uninitialized)
}

pub fn load(path: Option<PathBuf>) -> Result<Settings> {
    let path = match path {
        Some(path) => path,
        None => project_dirs()?
            .config_dir()
            .join(PathBuf::from("config.toml")),
    };
    tracing::info! {?path, "Loading config file"};
    let content = fs::read_to_string(path).unwrap_or_else(|_| "".to_string());
    let mut set: Settings = toml::from_str(content.as_str()).map_err(|e| eyre!(e))?;
    set = generate_default(set)?;
    tracing::trace! {settings = ?set, "Loaded settings"};
    Ok(set)
}

pub fn generate_default(mut set: Settings) -> Result<Settings> {
    if set.db == String::default() {
        let data_dir = project_dirs()?.data_dir().to_path_buf();
        util::mkdirp(&data_dir)?;
        set.db = format!(
            "sqlite://{}?mode=rwc",
            util::path_to_str(&data_dir.join(DEFAULT_DB_FILE))?
        );
    }
    Ok(set)
}
