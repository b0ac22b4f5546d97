//! Shared configuration for the decoyscope console.
//!
//! TOML profiles plus environment overrides, resolved into a
//! `decoyscope_core::ConsoleConfig`. The binary layers its CLI flags on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use decoyscope_core::{ConsoleConfig, DEFAULT_BASE_URL, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{profile}' in the config file")]
    UnknownProfile { profile: String },

    #[error("config file already exists at {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named decoy service deployments.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::from([(
                "default".to_owned(),
                Profile {
                    url: DEFAULT_BASE_URL.into(),
                    ..Profile::default()
                },
            )]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_top_limit")]
    pub top_limit: u32,

    #[serde(default = "default_history_page_size")]
    pub history_page_size: u32,

    /// Per-request timeout. Unset means requests are never cut short.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub insecure: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            page_size: default_page_size(),
            top_limit: default_top_limit(),
            history_page_size: default_history_page_size(),
            timeout_secs: None,
            insecure: false,
        }
    }
}

fn default_refresh_interval() -> u64 {
    30
}
fn default_page_size() -> u32 {
    20
}
fn default_top_limit() -> u32 {
    10
}
fn default_history_page_size() -> u32 {
    100
}

/// One decoy service deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// API base path, e.g. `http://10.0.0.5:8080/api/honeypot`.
    pub url: String,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    pub insecure: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub refresh_interval_secs: Option<u64>,
    pub page_size: Option<u32>,
    pub top_limit: Option<u32>,
    pub history_page_size: Option<u32>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "decoyscope", "decoyscope").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("decoyscope");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing file is fine) with `DECOYSCOPE_*` overrides.
///
/// Nested keys use a double underscore: `DECOYSCOPE_DEFAULTS__PAGE_SIZE=50`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("DECOYSCOPE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Write a starter config to `path`, refusing to overwrite an existing file.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(&Config::default())?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

/// Pick a profile: the named one, else `default_profile`, else built-in defaults.
pub fn resolve_console_config(
    config: &Config,
    profile_name: Option<&str>,
) -> Result<ConsoleConfig, ConfigError> {
    let name = profile_name.or(config.default_profile.as_deref());
    match name.map(|n| (n, config.profiles.get(n))) {
        Some((_, Some(profile))) => profile_to_console_config(profile, &config.defaults),
        Some((n, None)) if profile_name.is_some() => Err(ConfigError::UnknownProfile {
            profile: n.to_owned(),
        }),
        _ => profile_to_console_config(
            &Profile {
                url: DEFAULT_BASE_URL.into(),
                ..Profile::default()
            },
            &config.defaults,
        ),
    }
}

/// Build a `ConsoleConfig` from a profile, falling back to `defaults`.
pub fn profile_to_console_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ConsoleConfig, ConfigError> {
    let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "url".into(),
            reason: format!("expected an http(s) URL, got '{}'", url.scheme()),
        });
    }

    let positive = |field: &str, value: u32| {
        if value == 0 {
            Err(ConfigError::Validation {
                field: field.into(),
                reason: "must be greater than zero".into(),
            })
        } else {
            Ok(value)
        }
    };

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let refresh_secs = profile
        .refresh_interval_secs
        .unwrap_or(defaults.refresh_interval_secs);
    if refresh_secs == 0 {
        return Err(ConfigError::Validation {
            field: "refresh_interval_secs".into(),
            reason: "must be greater than zero".into(),
        });
    }

    Ok(ConsoleConfig {
        base_url: profile.url.clone(),
        tls,
        timeout: profile
            .timeout_secs
            .or(defaults.timeout_secs)
            .map(Duration::from_secs),
        refresh_interval: Duration::from_secs(refresh_secs),
        page_size: positive("page_size", profile.page_size.unwrap_or(defaults.page_size))?,
        top_limit: positive("top_limit", profile.top_limit.unwrap_or(defaults.top_limit))?,
        history_page_size: positive(
            "history_page_size",
            profile
                .history_page_size
                .unwrap_or(defaults.history_page_size),
        )?,
    })
}
