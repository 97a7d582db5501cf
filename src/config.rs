use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::discovery::DiscoveryOptions;

/// Environment variable holding the update server's `host[:port]`.
pub const HOST_ENV_VAR: &str = "UPDATE_HOST";

/// Name of the optional per-project settings file, looked up in the project root.
pub const PROJECT_FILE_NAME: &str = "deploy.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no update host configured: set UPDATE_HOST, pass --host, or add `host` to deploy.toml")]
    MissingHost,

    #[error("invalid update host '{value}': {reason}")]
    InvalidHost { value: String, reason: &'static str },

    #[error("failed to read {}: {source}", path.display())]
    ReadProjectFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    ParseProjectFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("no update host configured: set UPDATE_HOST or pass --host (deploy.toml could not be loaded)")]
    MissingHostWithBadProjectFile(#[source] Box<ConfigError>),
}

/// How discovered files are shipped to the update endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum UploadMode {
    /// One request per file, evaluated before the next file is read.
    PerFile,
    /// All files in a single request.
    #[default]
    Batch,
}

/// Target of the update endpoint: a host name with an optional port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateHost {
    pub host: String,
    pub port: Option<u16>,
}

impl UpdateHost {
    /// Parse `host`, `host:port`, `[v6]` or `[v6]:port`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHost`] for URLs (scheme or
    /// path present) and malformed ports, and [`ConfigError::MissingHost`]
    /// when the value is blank.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ConfigError::MissingHost);
        }

        let invalid = |reason| ConfigError::InvalidHost {
            value: value.to_string(),
            reason,
        };

        if value.contains("://") {
            return Err(invalid("expected a host name, not a URL"));
        }
        if value.contains('/') {
            return Err(invalid("host must not contain a path"));
        }

        let (host, port) = if let Some(rest) = value.strip_prefix('[') {
            // Bracketed IPv6 literal
            let (addr, after) = rest
                .split_once(']')
                .ok_or_else(|| invalid("unterminated '[' in IPv6 address"))?;
            let port = match after {
                "" => None,
                p => Some(
                    p.strip_prefix(':')
                        .ok_or_else(|| invalid("unexpected text after IPv6 address"))?,
                ),
            };
            (format!("[{addr}]"), port)
        } else {
            match value.split_once(':') {
                Some((h, p)) => (h.to_string(), Some(p)),
                None => (value.to_string(), None),
            }
        };

        if host.is_empty() || host == "[]" {
            return Err(invalid("host name is empty"));
        }

        let port = port
            .map(|p| p.parse::<u16>().map_err(|_| invalid("port must be a number between 0 and 65535")))
            .transpose()?;

        Ok(Self { host, port })
    }
}

impl fmt::Display for UpdateHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{port}", self.host),
            None => f.write_str(&self.host),
        }
    }
}

/// Contents of `deploy.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    pub host: Option<String>,
    pub mode: Option<UploadMode>,
    #[serde(default)]
    pub respect_gitignore: bool,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl ProjectFile {
    /// Load `deploy.toml` from `root`, or defaults when the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(PROJECT_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|source| {
            ConfigError::ReadProjectFile {
                path: path.clone(),
                source,
            }
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseProjectFile { path, source })
    }
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub mode: Option<UploadMode>,
    pub respect_gitignore: bool,
    pub exclude: Vec<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub host: UpdateHost,
    pub mode: UploadMode,
    pub root: PathBuf,
    pub patterns: Vec<String>,
    pub respect_gitignore: bool,
    pub exclude: Vec<String>,
}

impl DeployConfig {
    /// Load `deploy.toml` from `root` and resolve it against the overrides and
    /// `UPDATE_HOST`.
    ///
    /// # Errors
    ///
    /// When neither the flag nor the environment names a host and the project
    /// file cannot be loaded, the missing host is reported first as
    /// [`ConfigError::MissingHostWithBadProjectFile`], carrying the load
    /// error. Otherwise load errors and [`DeployConfig::resolve`] errors are
    /// returned as they are.
    pub fn load(
        root: PathBuf,
        overrides: Overrides,
        env_host: Option<String>,
    ) -> Result<Self, ConfigError> {
        let has_explicit_host = [&overrides.host, &env_host]
            .into_iter()
            .flatten()
            .any(|h| !h.trim().is_empty());
        let project = match ProjectFile::load(&root) {
            Ok(project) => project,
            Err(e) if !has_explicit_host => {
                return Err(ConfigError::MissingHostWithBadProjectFile(Box::new(e)));
            }
            Err(e) => return Err(e),
        };
        Self::resolve(root, overrides, env_host, project)
    }

    /// Merge command-line overrides, the `UPDATE_HOST` value and the project
    /// file into a single config.
    ///
    /// Host precedence is flag, then environment, then project file. Blank
    /// values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingHost`] when no source provides a host and
    /// [`ConfigError::InvalidHost`] when the chosen value is malformed.
    pub fn resolve(
        root: PathBuf,
        overrides: Overrides,
        env_host: Option<String>,
        project: ProjectFile,
    ) -> Result<Self, ConfigError> {
        let raw_host = [overrides.host, env_host, project.host]
            .into_iter()
            .flatten()
            .find(|h| !h.trim().is_empty())
            .ok_or(ConfigError::MissingHost)?;
        let host = UpdateHost::parse(&raw_host)?;

        let mut exclude = project.exclude;
        exclude.extend(overrides.exclude);

        Ok(Self {
            host,
            mode: overrides.mode.or(project.mode).unwrap_or_default(),
            root,
            patterns: DiscoveryOptions::default().patterns,
            respect_gitignore: overrides.respect_gitignore || project.respect_gitignore,
            exclude,
        })
    }

    #[must_use]
    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            patterns: self.patterns.clone(),
            respect_gitignore: self.respect_gitignore,
            exclude: self.exclude.clone(),
        }
    }
}
