// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use procure_app::{
    DEFAULT_ORG_ID, DEFAULT_ORG_TYPE, DEFAULT_PROJECT_TYPE, DEFAULT_REORDER_LIMIT, Role,
};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

pub const APP_NAME: &str = "procuresense";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub identity: IdentityDefaults,
    #[serde(default)]
    pub demo: Demo,
    #[serde(default)]
    pub assistant: Assistant,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            identity: IdentityDefaults::default(),
            demo: Demo::default(),
            assistant: Assistant::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
    pub reorder_limit: Option<i64>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_API_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
            reorder_limit: Some(DEFAULT_REORDER_LIMIT as i64),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityDefaults {
    pub org_id: Option<String>,
    pub role: Option<String>,
}

impl Default for IdentityDefaults {
    fn default() -> Self {
        Self {
            org_id: Some(DEFAULT_ORG_ID.to_owned()),
            role: Some(Role::Buyer.as_str().to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Demo {
    pub use_cached_ai: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Assistant {
    pub org_type: Option<String>,
    pub project_type: Option<String>,
}

impl Default for Assistant {
    fn default() -> Self {
        Self {
            org_type: Some(DEFAULT_ORG_TYPE.to_owned()),
            project_type: Some(DEFAULT_PROJECT_TYPE.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("PROCURE_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set PROCURE_CONFIG_PATH to the config file")
        })?;

        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [api], [identity], [demo], [assistant], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(limit) = self.api.reorder_limit
            && limit <= 0
        {
            bail!(
                "api.reorder_limit in {} must be positive, got {}",
                path.display(),
                limit
            );
        }

        if let Some(base_url) = &self.api.base_url
            && base_url.trim().is_empty()
        {
            bail!("api.base_url in {} must not be empty", path.display());
        }

        if let Some(level) = &self.log.level {
            parse_level(level)
                .with_context(|| format!("invalid log.level in {}", path.display()))?;
        }

        Ok(())
    }

    pub fn api_base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn api_timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn reorder_limit(&self) -> usize {
        self.api
            .reorder_limit
            .and_then(|limit| usize::try_from(limit).ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_REORDER_LIMIT)
    }

    pub fn org_id(&self) -> &str {
        self.identity.org_id.as_deref().unwrap_or(DEFAULT_ORG_ID)
    }

    pub fn role(&self) -> &str {
        self.identity
            .role
            .as_deref()
            .unwrap_or(Role::Buyer.as_str())
    }

    pub fn use_cached_ai(&self) -> bool {
        self.demo.use_cached_ai.unwrap_or(false)
    }

    pub fn assistant_org_type(&self) -> &str {
        self.assistant
            .org_type
            .as_deref()
            .unwrap_or(DEFAULT_ORG_TYPE)
    }

    pub fn assistant_project_type(&self) -> &str {
        self.assistant
            .project_type
            .as_deref()
            .unwrap_or(DEFAULT_PROJECT_TYPE)
    }

    pub fn log_level(&self) -> Result<Level> {
        parse_level(self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# procure config\n# Place this file at: {}\n\nversion = 1\n\n[api]\nbase_url = \"{}\"\ntimeout = \"{}\"\nreorder_limit = {}\n\n[identity]\norg_id = \"{}\"\nrole = \"{}\"\n\n[demo]\nuse_cached_ai = false\n\n[assistant]\norg_type = \"{}\"\nproject_type = \"{}\"\n\n[log]\n# One of: error, warn, info, debug, trace\nlevel = \"{}\"\n",
            path.display(),
            DEFAULT_API_BASE_URL,
            DEFAULT_TIMEOUT,
            DEFAULT_REORDER_LIMIT,
            DEFAULT_ORG_ID,
            Role::Buyer.as_str(),
            DEFAULT_ORG_TYPE,
            DEFAULT_PROJECT_TYPE,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_level(raw: &str) -> Result<Level> {
    raw.trim().parse::<Level>().map_err(|_| {
        anyhow!("invalid log level {raw:?}; use one of: error, warn, info, debug, trace")
    })
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("invalid timeout duration {raw:?}; value is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
