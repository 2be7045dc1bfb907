//! Configuration file and effective run settings.
//!
//! Settings live in `~/.otau/config.ini`. A missing file means defaults;
//! keys that are absent fall back to their default individually.
//!
//! ```ini
//! [index]
//! url = https://raw.githubusercontent.com/Koenkk/zigbee-OTA/master/index.json
//! audit_file = index.json
//!
//! [download]
//! output_dir = .
//! timeout = 5
//! sockets_per_origin = 10
//! max_redirects = 5
//!
//! [logging]
//! level = info
//! file = false
//!
//! [mirror.local]
//! url_prefix = https://github.com/Koenkk/zigbee-OTA/raw/master/images
//! base_url = http://localhost:8080/images
//! accept_invalid_certs = false
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::index::{DEFAULT_INDEX_URL, INDEX_AUDIT_FILE};
use crate::origin::{
    default_origins, ClientSettings, OriginConfig, DEFAULT_MAX_REDIRECTS, DEFAULT_MAX_SOCKETS,
    DEFAULT_TIMEOUT_SECS,
};

/// Name of the per-user configuration directory under `$HOME`.
pub const CONFIG_DIR_NAME: &str = ".otau";

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Accepted request timeout range, in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 1;
pub const MAX_TIMEOUT_SECS: u64 = 60;

const MIRROR_SECTION_PREFIX: &str = "mirror.";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] ini::ParseError),

    #[error("invalid value '{value}' for [{section}] {key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("mirror '{name}' is missing required key '{key}'")]
    IncompleteMirror { name: String, key: String },
}

/// The per-user configuration directory, `~/.otau`.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Default directory for log files.
pub fn default_log_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Clamp a timeout to the accepted range.
pub fn clamp_timeout(secs: u64) -> u64 {
    secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS)
}

/// Contents of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub index_url: String,
    /// Name of the index copy inside the output directory; empty disables it.
    pub audit_file: String,
    pub output_dir: PathBuf,
    pub timeout_secs: u64,
    pub sockets_per_origin: usize,
    pub max_redirects: usize,
    pub log_level: String,
    pub log_to_file: bool,
    pub origins: Vec<OriginConfig>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            audit_file: INDEX_AUDIT_FILE.to_string(),
            output_dir: PathBuf::from("."),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            sockets_per_origin: DEFAULT_MAX_SOCKETS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            log_level: "info".to_string(),
            log_to_file: false,
            origins: default_origins(),
        }
    }
}

impl ConfigFile {
    /// Load `~/.otau/config.ini`, or defaults when it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, or defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    /// Parse INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text)?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("index")) {
            if let Some(url) = section.get("url") {
                config.index_url = url.trim().to_string();
            }
            if let Some(file) = section.get("audit_file") {
                config.audit_file = file.trim().to_string();
            }
        }

        if let Some(section) = ini.section(Some("download")) {
            if let Some(dir) = section.get("output_dir") {
                config.output_dir = expand_tilde(dir.trim());
            }
            if let Some(value) = section.get("timeout") {
                config.timeout_secs = clamp_timeout(parse_value("download", "timeout", value)?);
            }
            if let Some(value) = section.get("sockets_per_origin") {
                let sockets: usize = parse_value("download", "sockets_per_origin", value)?;
                if sockets == 0 {
                    return Err(invalid("download", "sockets_per_origin", value, "must be at least 1"));
                }
                config.sockets_per_origin = sockets;
            }
            if let Some(value) = section.get("max_redirects") {
                config.max_redirects = parse_value("download", "max_redirects", value)?;
            }
        }

        if let Some(section) = ini.section(Some("logging")) {
            if let Some(level) = section.get("level") {
                config.log_level = level.trim().to_string();
            }
            if let Some(value) = section.get("file") {
                config.log_to_file = parse_bool("logging", "file", value)?;
            }
        }

        for (name, properties) in ini.iter() {
            let Some(mirror) = name.and_then(|n| n.strip_prefix(MIRROR_SECTION_PREFIX)) else {
                continue;
            };
            let section = format!("{}{}", MIRROR_SECTION_PREFIX, mirror);
            let required = |key: &str| {
                properties
                    .get(key)
                    .map(|v| v.trim().to_string())
                    .ok_or_else(|| ConfigError::IncompleteMirror {
                        name: mirror.to_string(),
                        key: key.to_string(),
                    })
            };
            let accept_invalid_certs = match properties.get("accept_invalid_certs") {
                Some(value) => parse_bool(&section, "accept_invalid_certs", value)?,
                None => false,
            };
            let origin = OriginConfig::new(mirror, required("url_prefix")?, required("base_url")?)
                .with_accept_invalid_certs(accept_invalid_certs);
            config.set_origin(origin);
        }

        Ok(config)
    }

    /// Add a mirror, replacing any existing mirror of the same name in place.
    pub fn set_origin(&mut self, origin: OriginConfig) {
        match self.origins.iter_mut().find(|o| o.name == origin.name) {
            Some(existing) => *existing = origin,
            None => self.origins.push(origin),
        }
    }

    /// Render the configuration as INI text.
    pub fn to_ini_string(&self) -> String {
        let mut ini = Ini::new();
        ini.with_section(Some("index"))
            .set("url", self.index_url.as_str())
            .set("audit_file", self.audit_file.as_str());
        ini.with_section(Some("download"))
            .set("output_dir", self.output_dir.display().to_string())
            .set("timeout", self.timeout_secs.to_string())
            .set("sockets_per_origin", self.sockets_per_origin.to_string())
            .set("max_redirects", self.max_redirects.to_string());
        ini.with_section(Some("logging"))
            .set("level", self.log_level.as_str())
            .set("file", self.log_to_file.to_string());
        for origin in &self.origins {
            ini.with_section(Some(format!("{}{}", MIRROR_SECTION_PREFIX, origin.name)))
                .set("url_prefix", origin.url_prefix.as_str())
                .set("base_url", origin.base_url.as_str())
                .set("accept_invalid_certs", origin.accept_invalid_certs.to_string());
        }

        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = ini.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

/// Effective settings for one download run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub index_url: String,
    pub output_dir: PathBuf,
    /// Index copy location; `None` disables the copy.
    pub audit_path: Option<PathBuf>,
    pub client: ClientSettings,
    pub origins: Vec<OriginConfig>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from_config(&ConfigFile::default())
    }
}

impl FetchConfig {
    pub fn from_config(config: &ConfigFile) -> Self {
        let audit_file = (!config.audit_file.is_empty()).then(|| PathBuf::from(&config.audit_file));
        Self {
            index_url: config.index_url.clone(),
            audit_path: audit_file.map(|file| config.output_dir.join(file)),
            output_dir: config.output_dir.clone(),
            client: ClientSettings {
                timeout: Duration::from_secs(clamp_timeout(config.timeout_secs)),
                max_sockets: config.sockets_per_origin.max(1),
                max_redirects: config.max_redirects,
            },
            origins: config.origins.clone(),
        }
    }

    /// Use a different output directory; the index copy moves with it.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Some(file) = self.audit_path.as_ref().and_then(|p| p.file_name()) {
            self.audit_path = Some(dir.join(file));
        }
        self.output_dir = dir;
        self
    }

    /// Set the request timeout, clamped to 1-60 seconds.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.client.timeout = Duration::from_secs(clamp_timeout(secs));
        self
    }

    pub fn with_index_url(mut self, url: impl Into<String>) -> Self {
        self.index_url = url.into();
        self
    }

    pub fn with_origins(mut self, origins: Vec<OriginConfig>) -> Self {
        self.origins = origins;
        self
    }

    pub fn without_audit_copy(mut self) -> Self {
        self.audit_path = None;
        self
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

fn parse_value<T>(section: &str, key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| invalid(section, key, value, &e.to_string()))
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(invalid(section, key, value, "expected true or false")),
    }
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
