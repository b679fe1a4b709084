//! Project configuration for contract runs
//!
//! Non-secret settings come from `.restcheck.toml` (or `.restcheck.json`);
//! the bearer token and the fabricator seed come only from the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the bearer token for mutating requests.
pub const TOKEN_VAR: &str = "API_TOKEN";

/// Environment variable holding the optional fabricator seed.
pub const SEED_VAR: &str = "FAKER_SEED";

/// Public GoRest v2 endpoint.
pub const DEFAULT_BASE_URL: &str = "https://gorest.co.in/public/v2";

/// Default instance preview length in schema diagnostics.
pub const DEFAULT_TRUNCATE_AT: usize = 300;

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the API under test, including the `/public/v2` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Directory holding `<name>.json` schema documents
    #[serde(default = "default_schemas_dir")]
    pub schemas_dir: PathBuf,

    /// Max characters of the instance shown in schema diagnostics (non-verbose)
    #[serde(default = "default_truncate_at")]
    pub truncate_at: usize,

    /// Dump all request/response pairs to JSONL files
    #[serde(default)]
    pub dump: bool,

    /// Directory for dump files (default: ".restcheck/dumps")
    #[serde(default)]
    pub dump_dir: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_schemas_dir() -> PathBuf {
    PathBuf::from("schemas")
}

const fn default_truncate_at() -> usize {
    DEFAULT_TRUNCATE_AT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            schemas_dir: default_schemas_dir(),
            truncate_at: DEFAULT_TRUNCATE_AT,
            dump: false,
            dump_dir: None,
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.restcheck.toml)
    pub fn load_default() -> Result<Self, ConfigError> {
        let candidates = [".restcheck.toml", ".restcheck.json", "restcheck.toml"];

        for name in candidates {
            let path = Path::new(name);
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    /// Dump directory, falling back to `.restcheck/dumps`.
    #[must_use]
    pub fn dump_dir_or_default(&self) -> PathBuf {
        self.dump_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(".restcheck/dumps"))
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# restcheck configuration
#
# Secrets are never read from this file:
#   API_TOKEN   bearer token for POST/PUT/DELETE (required)
#   FAKER_SEED  integer seed for reproducible test data (optional)

# API under test
base_url = "https://gorest.co.in/public/v2"

# Directory with user.json, post.json, todo.json
schemas_dir = "schemas"

# Instance preview length in schema diagnostics (pass -v for full output)
# truncate_at = 300

# Dump all request/response pairs to JSONL files (default: false)
# dump = true
# dump_dir = ".restcheck/dumps"
"#
    }
}

/// Bearer token, masked in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

/// Settings read once from the process environment at startup.
#[derive(Debug, Clone)]
pub struct Environment {
    pub token: ApiToken,
    pub seed: Option<u64>,
}

impl Environment {
    /// Read `API_TOKEN` and `FAKER_SEED`.
    ///
    /// # Errors
    ///
    /// Fails if the token is unset or empty, or the seed is not an integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::var(TOKEN_VAR).ok(),
            std::env::var(SEED_VAR).ok(),
        )
    }

    /// Build from raw variable values (`None` = unset).
    pub fn from_vars(token: Option<String>, seed: Option<String>) -> Result<Self, ConfigError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?;
        Ok(Self {
            token: ApiToken::new(token),
            seed: parse_seed(seed.as_deref())?,
        })
    }
}

/// Parse a seed value. Unset or empty means "no seed"; anything other than
/// ASCII digits is rejected.
///
/// Digit strings beyond `u64` are folded modulo 2^64, so every integer seed
/// maps to a stable generator seed.
pub fn parse_seed(raw: Option<&str>) -> Result<Option<u64>, ConfigError> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) if s.bytes().all(|b| b.is_ascii_digit()) => {
            let seed = s.bytes().fold(0u64, |acc, b| {
                acc.wrapping_mul(10).wrapping_add(u64::from(b - b'0'))
            });
            Ok(Some(seed))
        }
        Some(s) => Err(ConfigError::InvalidSeed(s.to_string())),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("API_TOKEN environment variable is not set. Set it to run tests.")]
    MissingToken,
    #[error("FAKER_SEED environment variable must be an integer, got {0:?}")]
    InvalidSeed(String),
}
