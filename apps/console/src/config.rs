use std::{collections::HashMap, fs, path::Path, path::PathBuf, time::Duration};

use anyhow::Context;
use client_core::GatewayConfig;

pub const DEFAULT_BASE_URL: &str = "https://ec-course-api.hexschool.io";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub api_path: String,
    pub credentials_path: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_path: String::new(),
            credentials_path: default_credentials_path(),
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn gateway_config(&self) -> anyhow::Result<GatewayConfig> {
        if self.api_path.trim().is_empty() {
            anyhow::bail!(
                "no API path configured; set api_path in the config file, CATALOG_API_PATH or --api-path"
            );
        }
        Ok(GatewayConfig::new(&self.base_url, &self.api_path)?
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs)))
    }
}

fn default_credentials_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".catalog_console"))
        .unwrap_or_else(|| PathBuf::from(".catalog_console"))
        .join("session.json")
}

/// Defaults, then the optional config file, then the environment.
pub fn load_settings(config_path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(config_path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file {}", config_path.display()))?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("config: no file at {}", config_path.display());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", config_path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, String>>(raw)?;
    if let Some(v) = file_cfg.get("base_url") {
        settings.base_url = v.clone();
    }
    if let Some(v) = file_cfg.get("api_path") {
        settings.api_path = v.clone();
    }
    if let Some(v) = file_cfg.get("credentials_path") {
        settings.credentials_path = PathBuf::from(v);
    }
    if let Some(v) = file_cfg.get("request_timeout_secs") {
        settings.request_timeout_secs = v
            .parse()
            .with_context(|| format!("request_timeout_secs is not a number: {v}"))?;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("CATALOG_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = lookup("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Some(v) = lookup("CATALOG_API_PATH") {
        settings.api_path = v;
    }
    if let Some(v) = lookup("APP__API_PATH") {
        settings.api_path = v;
    }

    if let Some(v) = lookup("APP__CREDENTIALS_PATH") {
        settings.credentials_path = PathBuf::from(v);
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(_) => tracing::warn!("config: ignoring APP__REQUEST_TIMEOUT_SECS={v}"),
        }
    }
}
