//! Configuration schema, defaults, and layered loading.
//!
//! Precedence: defaults < config file < environment < CLI
use crate::session::Limits;
use anyhow::{ensure, Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_IMAGE_LIMIT: usize = 16;
pub const DEFAULT_MAX_TOTAL_SIZE_MB: u64 = 100;
pub const DEFAULT_STITCH_ENDPOINT: &str = "/api/stitch";
pub const DEFAULT_DOWNLOAD_NAME: &str = "panorama.webp";

const MAX_IMAGE_LIMIT: usize = 1024;
const MAX_TOTAL_SIZE_MB: u64 = 10 * 1024;

pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "panodrop")
        .map(|p| p.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("panodrop.toml"))
}

/// Local browser surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen port on loopback. 0 picks a free port.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: 0 }
    }
}

/// Fully resolved configuration after all layers merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Max number of images in one batch.
    pub image_limit: usize,
    /// Max aggregate size of one batch, in MiB.
    pub max_total_size_mb: u64,
    /// Stitch endpoint. Relative paths resolve against `service_url`.
    pub stitch_endpoint: String,
    /// Base for a relative `stitch_endpoint`. The defaults target a proxy
    /// mounting the service under `/api`; a service that serves `/stitch` at
    /// its root needs `stitch_endpoint = "/stitch"`.
    pub service_url: String,
    /// Fixed file name offered for the stitched result.
    pub download_name: String,
    pub request_timeout_secs: u64,
    pub server: ServerSettings,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            image_limit: DEFAULT_IMAGE_LIMIT,
            max_total_size_mb: DEFAULT_MAX_TOTAL_SIZE_MB,
            stitch_endpoint: DEFAULT_STITCH_ENDPOINT.to_string(),
            service_url: "http://127.0.0.1:8080".to_string(),
            download_name: DEFAULT_DOWNLOAD_NAME.to_string(),
            request_timeout_secs: 300,
            server: ServerSettings::default(),
        }
    }
}

impl UploadConfig {
    /// Validator ceilings derived from this config.
    pub fn limits(&self) -> Limits {
        Limits {
            max_files: self.image_limit,
            max_total_size_mb: self.max_total_size_mb,
        }
    }

    /// Absolute URL the stitch request is sent to.
    pub fn resolve_endpoint(&self) -> Result<Url> {
        if let Ok(url) = Url::parse(&self.stitch_endpoint) {
            return Ok(url);
        }

        let base = Url::parse(&self.service_url)
            .with_context(|| format!("Invalid service_url: {}", self.service_url))?;
        base.join(&self.stitch_endpoint)
            .with_context(|| format!("Invalid stitch_endpoint: {}", self.stitch_endpoint))
    }

    /// Rejects limits and names that cannot produce a usable session.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.image_limit >= 1,
            "Invalid config: image_limit must be >= 1"
        );
        ensure!(
            self.image_limit <= MAX_IMAGE_LIMIT,
            "Invalid config: image_limit must be <= {MAX_IMAGE_LIMIT}"
        );
        ensure!(
            self.max_total_size_mb >= 1,
            "Invalid config: max_total_size_mb must be >= 1"
        );
        ensure!(
            self.max_total_size_mb <= MAX_TOTAL_SIZE_MB,
            "Invalid config: max_total_size_mb must be <= {MAX_TOTAL_SIZE_MB}"
        );
        ensure!(
            !self.stitch_endpoint.trim().is_empty(),
            "Invalid config: stitch_endpoint must not be empty"
        );
        ensure!(
            self.request_timeout_secs >= 1,
            "Invalid config: request_timeout_secs must be >= 1"
        );
        ensure!(
            is_plain_file_name(&self.download_name),
            "Invalid config: download_name must be a plain file name"
        );
        self.resolve_endpoint()
            .context("Invalid config: stitch_endpoint does not resolve to a URL")?;
        Ok(())
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Values supplied on the command line. `None` keeps the loaded value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_total_size_mb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stitch_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// Loads config from defaults/file/env.
///
/// Environment keys use the `PANODROP_` prefix; nested keys are separated
/// by a double underscore (`PANODROP_SERVER__PORT`).
pub fn load_config() -> Result<UploadConfig> {
    let path = config_path();

    let config: UploadConfig = Figment::new()
        .merge(Serialized::defaults(UploadConfig::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("PANODROP_").split("__"))
        .extract()
        .context("Failed to load configuration")?;

    config.validate()?;

    Ok(config)
}

/// Applies runtime overrides to a loaded config and re-validates it.
pub fn apply_overrides(mut config: UploadConfig, overrides: &ConfigOverrides) -> Result<UploadConfig> {
    if let Some(limit) = overrides.image_limit {
        config.image_limit = limit;
    }
    if let Some(size) = overrides.max_total_size_mb {
        config.max_total_size_mb = size;
    }
    if let Some(endpoint) = &overrides.stitch_endpoint {
        config.stitch_endpoint = endpoint.clone();
    }
    if let Some(url) = &overrides.service_url {
        config.service_url = url.clone();
    }
    if let Some(port) = overrides.port {
        config.server.port = port;
    }

    config.validate()?;
    Ok(config)
}
