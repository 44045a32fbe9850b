mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./inkpad.toml",
        "~/.config/inkpad/config.toml",
        "/etc/inkpad/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.storage.max_upload_bytes == 0 {
        anyhow::bail!("storage.max_upload_bytes cannot be 0");
    }

    let auth = &config.server.auth;
    if auth.enabled
        && auth.api_key.is_none()
        && (auth.username.is_none() || auth.password_hash.is_none())
    {
        anyhow::bail!(
            "Auth is enabled but no credentials are configured; \
             set an api_key or a username and password_hash"
        );
    }

    Ok(())
}
