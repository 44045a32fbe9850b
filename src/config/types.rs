use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Enable authentication for the API
    #[serde(default)]
    pub enabled: bool,

    /// API key for programmatic access (used with Authorization: Bearer header)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Username for browser login
    #[serde(default)]
    pub username: Option<String>,

    /// Bcrypt hash of the password (generate with `inkpad hash-password`)
    #[serde(default)]
    pub password_hash: Option<String>,

    /// Session timeout in hours (default: 24)
    #[serde(default = "default_session_timeout")]
    pub session_timeout_hours: u64,
}

fn default_session_timeout() -> u64 {
    24
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            auth: AuthConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding the database and uploaded files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Maximum accepted upload size in bytes (default: 10 MiB)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_max_upload_bytes() -> u64 {
    10 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl StorageConfig {
    /// Path of the SQLite database file inside the data directory.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("inkpad.db")
    }
}
