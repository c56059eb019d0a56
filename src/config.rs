//! Run configuration and its INI-file source.
//!
//! The file uses a `[General]` section:
//!
//! ```ini
//! [General]
//! User = s123456
//! Password = secret
//! BaseURL = https://wuecampus2.uni-wuerzburg.de/
//! TargetDir = ./courses/
//! Interval = 3600
//! LogPath = downloader.log
//! ```
//!
//! Only `User` and `Password` are required; every other key has a default.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::auth::Credentials;
use crate::fetch::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};

/// Portal used when the file sets no `BaseURL`.
pub const DEFAULT_BASE_URL: &str = "https://wuecampus2.uni-wuerzburg.de/";

/// Download root used when the file sets no `TargetDir`.
pub const DEFAULT_TARGET_DIR: &str = "./";

/// Seconds between sync cycles when the file sets no `Interval`.
pub const DEFAULT_INTERVAL_SECS: u64 = 3600;

/// Log file used when the file sets no `LogPath`.
pub const DEFAULT_LOG_PATH: &str = "downloader.log";

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.ini";

const GENERAL_SECTION: &str = "general";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// The config file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A line is not a section header, comment, or `key = value` pair.
    #[error("invalid config syntax on line {line}: {message}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        message: String,
    },

    /// A value is out of range or of the wrong type.
    #[error("invalid config value for `{key}`: '{value}'. Expected {expected}")]
    InvalidValue {
        /// The offending key.
        key: String,
        /// The offending value.
        value: String,
        /// Description of the accepted values.
        expected: &'static str,
    },

    /// A required credential is absent or empty.
    #[error("missing required `{field}` in the [General] section\n  Suggestion: add `{field} = ...` to the config file")]
    MissingCredential {
        /// `"User"` or `"Password"`.
        field: &'static str,
    },
}

/// Minimum severity written to the log sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "error" | "critical" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(ConfigError::InvalidValue {
                key: "LogLevel".to_string(),
                value: raw.to_string(),
                expected: "one of ERROR, WARN, INFO, DEBUG, TRACE",
            }),
        }
    }
}

/// Which discovered terms a run syncs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TermSelection {
    /// Only the first term on the landing page, which the portal renders
    /// newest-first.
    #[default]
    Newest,
    /// Every discovered term.
    All,
}

/// Everything a sync run needs.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Account credentials.
    pub credentials: Credentials,
    /// Portal root, e.g. `https://wuecampus2.uni-wuerzburg.de/`.
    pub base_url: String,
    /// Root of the mirrored tree.
    pub target_dir: PathBuf,
    /// Pause between cycles in loop mode.
    pub interval: Duration,
    /// Log file path.
    pub log_path: PathBuf,
    /// Log sink severity.
    pub log_level: LogLevel,
    /// HTTP connect timeout.
    pub connect_timeout_secs: u64,
    /// HTTP total request timeout.
    pub read_timeout_secs: u64,
    /// Term selection policy.
    pub term_selection: TermSelection,
}

impl PortalConfig {
    /// Creates a config with default values for everything but credentials.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            target_dir: PathBuf::from(DEFAULT_TARGET_DIR),
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            log_level: LogLevel::default(),
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
            term_selection: TermSelection::default(),
        }
    }
}

/// Raw values read from the config file; `None` means "use the default".
#[derive(Clone, Default)]
pub struct FileConfig {
    /// `User`: portal account name.
    pub user: Option<String>,
    /// `Password`: portal password (redacted in Debug output).
    pub password: Option<String>,
    /// `BaseURL`: portal root.
    pub base_url: Option<String>,
    /// `TargetDir`: root of the mirrored tree.
    pub target_dir: Option<PathBuf>,
    /// `Interval`: seconds between cycles in loop mode.
    pub interval_secs: Option<u64>,
    /// `LogPath`: log file location.
    pub log_path: Option<PathBuf>,
    /// `LogLevel`: minimum severity written to the log.
    pub log_level: Option<LogLevel>,
    /// `ConnectTimeout`: HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// `ReadTimeout`: HTTP total request timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// `AllTerms`: sync every term instead of the newest only.
    pub all_terms: Option<bool>,
    /// Non-fatal problems found while loading (missing file, unknown keys).
    ///
    /// Loading happens before the log sink exists, so the caller logs these
    /// once logging is set up.
    pub warnings: Vec<String>,
}

impl fmt::Debug for FileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileConfig")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("target_dir", &self.target_dir)
            .field("interval_secs", &self.interval_secs)
            .field("log_path", &self.log_path)
            .field("log_level", &self.log_level)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("read_timeout_secs", &self.read_timeout_secs)
            .field("all_terms", &self.all_terms)
            .field("warnings", &self.warnings)
            .finish()
    }
}

impl FileConfig {
    /// Reads a config file. A missing file yields an empty config, so the
    /// credential check in [`into_portal_config`](Self::into_portal_config)
    /// reports what is actually wrong.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file exists but cannot be read, or
    /// any parse error from [`parse`](Self::parse).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::parse(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self {
                    warnings: vec![format!(
                        "config file '{}' not found; using defaults",
                        path.display()
                    )],
                    ..Self::default()
                })
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parses INI text. Keys are case-insensitive and read from `[General]`;
    /// other sections are ignored. `#` and `;` start comment lines.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Syntax`] or [`ConfigError::InvalidValue`].
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        let mut section: Option<String> = None;

        for (line_index, raw_line) in raw.lines().enumerate() {
            let line_number = line_index + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let Some(name) = header.strip_suffix(']') else {
                    return Err(ConfigError::Syntax {
                        line: line_number,
                        message: "unterminated section header".to_string(),
                    });
                };
                section = Some(name.trim().to_ascii_lowercase());
                continue;
            }

            let Some((raw_key, raw_value)) = line.split_once(['=', ':']) else {
                return Err(ConfigError::Syntax {
                    line: line_number,
                    message: "expected key = value".to_string(),
                });
            };
            let Some(current) = section.as_deref() else {
                return Err(ConfigError::Syntax {
                    line: line_number,
                    message: "key outside of any section".to_string(),
                });
            };
            if current != GENERAL_SECTION {
                continue;
            }

            let key = raw_key.trim();
            let value = raw_value.trim();
            cfg.apply(key, value)?;
        }

        Ok(cfg)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key.to_ascii_lowercase().as_str() {
            "user" => self.user = Some(value.to_string()),
            "password" => self.password = Some(value.to_string()),
            "baseurl" => self.base_url = Some(value.to_string()),
            "targetdir" => self.target_dir = Some(PathBuf::from(value)),
            "interval" => {
                self.interval_secs = Some(parse_ranged(key, value, 1..=604_800, "seconds in 1..=604800")?);
            }
            "logpath" => self.log_path = Some(PathBuf::from(value)),
            "loglevel" => self.log_level = Some(value.parse()?),
            "connecttimeout" => {
                self.connect_timeout_secs =
                    Some(parse_ranged(key, value, 1..=3600, "seconds in 1..=3600")?);
            }
            "readtimeout" => {
                self.read_timeout_secs =
                    Some(parse_ranged(key, value, 1..=3600, "seconds in 1..=3600")?);
            }
            "allterms" => self.all_terms = Some(parse_boolean(key, value)?),
            _ => self
                .warnings
                .push(format!("ignoring unknown config key `{key}`")),
        }
        Ok(())
    }

    /// Applies defaults and checks the credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] when `User` or `Password` is
    /// absent or empty.
    pub fn into_portal_config(self) -> Result<PortalConfig, ConfigError> {
        let user = non_empty(self.user).ok_or(ConfigError::MissingCredential { field: "User" })?;
        let password =
            non_empty(self.password).ok_or(ConfigError::MissingCredential { field: "Password" })?;

        let mut config = PortalConfig::new(Credentials::new(user, password));
        if let Some(base_url) = non_empty(self.base_url) {
            config.base_url = base_url;
        }
        if let Some(target_dir) = self.target_dir {
            config.target_dir = target_dir;
        }
        if let Some(interval_secs) = self.interval_secs {
            config.interval = Duration::from_secs(interval_secs);
        }
        if let Some(log_path) = self.log_path {
            config.log_path = log_path;
        }
        if let Some(log_level) = self.log_level {
            config.log_level = log_level;
        }
        if let Some(secs) = self.connect_timeout_secs {
            config.connect_timeout_secs = secs;
        }
        if let Some(secs) = self.read_timeout_secs {
            config.read_timeout_secs = secs;
        }
        if self.all_terms == Some(true) {
            config.term_selection = TermSelection::All;
        }
        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_ranged(
    key: &str,
    value: &str,
    range: std::ops::RangeInclusive<u64>,
    expected: &'static str,
) -> Result<u64, ConfigError> {
    value
        .parse::<u64>()
        .ok()
        .filter(|n| range.contains(n))
        .ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected,
        })
}

fn parse_boolean(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "a boolean (true/false, yes/no, on/off, 1/0)",
        }),
    }
}
