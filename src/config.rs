use crate::classifier::Classifier;
use crate::catalogue::ProcessEnv;
use crate::platform::PlatformKind;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub catalogue: Catalogue,
    pub server: Server,
    pub auth: Auth,
    pub limits: Limits,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Catalogue {
    pub platform: Option<PlatformKind>,
    pub extra: Vec<String>,
    pub exempt: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_base_path")]
    pub base_path: String,
}
fn default_bind_addr() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 7878 }
fn default_base_path() -> String { "/v1".to_string() }

impl Default for Server {
    fn default() -> Self {
        Self { bind_addr: default_bind_addr(), port: default_port(), base_path: default_base_path() }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Auth {
    pub bearer_token: String,
    /// Empty means the Origin header is not checked.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Limits {
    #[serde(default = "default_max_request_kb")]
    pub max_request_kb: usize,
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,
}
fn default_max_request_kb() -> usize { 64 }
fn default_max_batch() -> usize { 256 }

impl Default for Limits {
    fn default() -> Self {
        Self { max_request_kb: default_max_request_kb(), max_batch: default_max_batch() }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            Ok(serde_json::from_str(&raw)?)
        } else {
            Ok(toml::from_str(&raw)?)
        }
    }

    /// Checks only what every mode needs.
    pub fn validate(&self) -> anyhow::Result<()> {
        for entry in self.catalogue.extra.iter().chain(&self.catalogue.exempt) {
            if entry.trim().is_empty() { anyhow::bail!("catalogue entries must not be empty"); }
        }
        Ok(())
    }

    pub fn validate_server(&self) -> anyhow::Result<()> {
        self.validate()?;
        if self.auth.bearer_token.trim().is_empty() { anyhow::bail!("bearer_token must not be empty"); }
        if !self.server.base_path.starts_with('/') { anyhow::bail!("base_path must start with '/'"); }
        if self.limits.max_request_kb == 0 { anyhow::bail!("max_request_kb must be > 0"); }
        if self.limits.max_batch == 0 { anyhow::bail!("max_batch must be > 0"); }
        Ok(())
    }

    pub fn classifier(&self) -> Classifier {
        let platform = self.catalogue.platform.unwrap_or_else(PlatformKind::detect);
        Classifier::for_platform(platform, &ProcessEnv)
            .with_extra(self.catalogue.extra.iter().cloned())
            .with_exempt(self.catalogue.exempt.iter().cloned())
    }
}
