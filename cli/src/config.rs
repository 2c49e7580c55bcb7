// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::PathBuf, str::FromStr};

use agendum_core::{Config, expand_path};
use tokio::fs;

const AGENDUM_CONFIG_ENV: &str = "AGENDUM_CONFIG";

/// Load the configuration from `--config`, the `AGENDUM_CONFIG` variable or
/// the default location, in that order. `~` and environment variables in
/// explicit paths are expanded. A missing default file yields the
/// default configuration; an explicit path must exist.
#[tracing::instrument]
pub async fn parse_config(path: Option<PathBuf>) -> Result<Config, Box<dyn Error>> {
    let path = if let Some(path) = path {
        expand_path(&path)?
    } else if let Ok(env_path) = std::env::var(AGENDUM_CONFIG_ENV) {
        expand_path(&PathBuf::from(env_path))?
    } else {
        let path = Config::default_path()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        path
    };

    let mut config = fs::read_to_string(&path)
        .await
        .map_err(|e| format!("Failed to read config file at {}: {}", path.display(), e))?
        .parse::<ConfigRaw>()?
        .core;
    config.normalize()?;
    Ok(config)
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigRaw {
    core: Config,
}

impl FromStr for ConfigRaw {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::OnceLock;
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn write_config(dir: &TempDir, name: &str, domain: &str) -> PathBuf {
        let path = dir.path().join(name);
        let content = format!("[core]\nuid_domain = \"{domain}\"\n");
        fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn cli_flag_overrides_env_var() {
        let temp_dir = TempDir::new().unwrap();
        let cli_path = write_config(&temp_dir, "config.toml", "cli.example.com");
        let env_path = write_config(&temp_dir, "env_config.toml", "env.example.com");

        let _guard = env_lock().lock().await;
        unsafe {
            std::env::set_var(AGENDUM_CONFIG_ENV, env_path.to_str().unwrap());
        }

        let config = parse_config(Some(cli_path)).await.unwrap();
        assert_eq!(config.uid_domain, "@cli.example.com");

        unsafe {
            std::env::remove_var(AGENDUM_CONFIG_ENV);
        }
    }

    #[tokio::test]
    async fn env_var_overrides_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let env_path = write_config(&temp_dir, "env_config.toml", "@env.example.com");

        let _guard = env_lock().lock().await;
        unsafe {
            std::env::set_var(AGENDUM_CONFIG_ENV, env_path.to_str().unwrap());
        }

        let config = parse_config(None).await.unwrap();
        assert_eq!(config.uid_domain, "@env.example.com");

        unsafe {
            std::env::remove_var(AGENDUM_CONFIG_ENV);
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn falls_back_to_defaults_without_file() {
        let temp_dir = TempDir::new().unwrap();

        let _guard = env_lock().lock().await;
        unsafe {
            std::env::remove_var(AGENDUM_CONFIG_ENV);
            std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        }

        let config = parse_config(None).await.unwrap();
        assert_eq!(config, Config::default());

        unsafe {
            std::env::remove_var("XDG_CONFIG_HOME");
        }
    }

    #[tokio::test]
    async fn explicit_path_must_exist() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");

        let err = parse_config(Some(missing)).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[tokio::test]
    async fn rejects_out_of_range_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[core]\nfold_width = 1\n").unwrap();

        assert!(parse_config(Some(path)).await.is_err());
    }

    #[test]
    fn empty_file_is_default() {
        let raw: ConfigRaw = "".parse().unwrap();
        assert_eq!(raw.core, Config::default());
    }
}
