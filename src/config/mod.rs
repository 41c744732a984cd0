//! Configuration loading and management
//!
//! Configuration comes from YAML, then environment variables override it:
//!
//! | Variable            | Effect                                              |
//! |---------------------|-----------------------------------------------------|
//! | `HBNB_ENV`          | `development`, `testing` or `production`            |
//! | `HBNB_REPO_TYPE`    | `in_memory`, `in_file` or `in_db`                   |
//! | `HBNB_DATA_DIR`     | directory of the serialized-file backend            |
//! | `HBNB_DATABASE_URL` | connection URL of the relational backend           |

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default directory of the serialized-file backend
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default URL of the relational backend
pub const DEFAULT_DATABASE_URL: &str = "sqlite://hbnb.db";

/// Deployment profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Production,
}

impl Environment {
    /// Backend used when the configuration does not name one
    pub fn default_backend(&self) -> StorageBackend {
        match self {
            Environment::Development | Environment::Production => StorageBackend::Sqlite {
                url: DEFAULT_DATABASE_URL.to_string(),
            },
            Environment::Testing => StorageBackend::JsonFile {
                directory: PathBuf::from(DEFAULT_DATA_DIR),
            },
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "default" => Ok(Environment::Development),
            "testing" => Ok(Environment::Testing),
            "production" => Ok(Environment::Production),
            other => bail!("unknown environment '{}'", other),
        }
    }
}

/// Storage strategy, selected once at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process-local maps, lost on exit
    InMemory,

    /// One JSON document per entity kind under `directory`
    JsonFile { directory: PathBuf },

    /// Relational table reached through `url`
    Sqlite { url: String },
}

/// Argon2 cost parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHashingConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    /// Explicit backend; falls back to the environment's default
    #[serde(default)]
    pub storage: Option<StorageBackend>,

    #[serde(default)]
    pub password_hashing: PasswordHashingConfig,
}

impl AppConfig {
    /// Configuration for `environment` with every other value defaulted
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            ..Self::default()
        }
    }

    /// Configuration using the in-memory backend
    pub fn in_memory() -> Self {
        Self {
            storage: Some(StorageBackend::InMemory),
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration file {}", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("parsing {}", path))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Apply `HBNB_*` variables from the process environment
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `HBNB_*` overrides obtained through `lookup`
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(env) = lookup("HBNB_ENV") {
            self.environment = Environment::parse(&env)?;
        }

        if let Some(repo_type) = lookup("HBNB_REPO_TYPE") {
            self.storage = Some(match repo_type.trim().to_ascii_lowercase().as_str() {
                "in_memory" => StorageBackend::InMemory,
                "in_file" => StorageBackend::JsonFile {
                    directory: PathBuf::from(DEFAULT_DATA_DIR),
                },
                "in_db" | "in_sqlite_db" => StorageBackend::Sqlite {
                    url: DEFAULT_DATABASE_URL.to_string(),
                },
                other => bail!("unknown repository type '{}'", other),
            });
        }

        let mut backend = self.storage_backend();
        match &mut backend {
            StorageBackend::JsonFile { directory } => {
                if let Some(dir) = lookup("HBNB_DATA_DIR") {
                    *directory = PathBuf::from(dir);
                }
            }
            StorageBackend::Sqlite { url } => {
                if let Some(database_url) = lookup("HBNB_DATABASE_URL") {
                    *url = database_url;
                }
            }
            StorageBackend::InMemory => {}
        }
        if backend != self.storage_backend() {
            self.storage = Some(backend);
        }

        Ok(self)
    }

    /// The backend that will actually be used
    pub fn storage_backend(&self) -> StorageBackend {
        self.storage
            .clone()
            .unwrap_or_else(|| self.environment.default_backend())
    }
}
