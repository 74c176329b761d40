use std::{collections::HashMap, fs, path::PathBuf, str::FromStr};

use anyhow::bail;

pub const CONFIG_FILE: &str = "todo_board.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => bail!("unknown storage backend '{other}' (expected memory or sqlite)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub storage_backend: StorageBackend,
    pub database_url: String,
    pub seed_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            storage_backend: StorageBackend::Memory,
            database_url: "sqlite://./data/todos.db".into(),
            seed_file: None,
        }
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let file = fs::read_to_string(CONFIG_FILE).ok();
    resolve_settings(file.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then the config file, then environment variables.
pub fn resolve_settings(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<HashMap<String, String>>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("bind_addr") {
                    settings.server_bind = v.clone();
                }
                if let Some(v) = file_cfg.get("storage_backend") {
                    settings.storage_backend = v.parse()?;
                }
                if let Some(v) = file_cfg.get("database_url") {
                    settings.database_url = v.clone();
                }
                if let Some(v) = file_cfg.get("seed_file") {
                    settings.seed_file = Some(PathBuf::from(v));
                }
            }
            Err(error) => tracing::warn!(%error, file = CONFIG_FILE, "ignoring unreadable config file"),
        }
    }

    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }
    if let Some(port) = env("PORT") {
        let port: u16 = port.trim().parse()?;
        settings.server_bind = with_port(&settings.server_bind, port);
    }
    if let Some(v) = env("APP__STORAGE_BACKEND") {
        settings.storage_backend = v.parse()?;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__SEED_FILE") {
        settings.seed_file = Some(PathBuf::from(v));
    }

    settings.database_url = normalize_database_url(&settings.database_url);
    Ok(settings)
}

fn with_port(bind: &str, port: u16) -> String {
    let host = match bind.rsplit_once(':') {
        Some((host, _)) if !host.is_empty() => host,
        _ => "127.0.0.1",
    };
    format!("{host}:{port}")
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
