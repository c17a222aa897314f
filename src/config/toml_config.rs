use crate::adapters::http::{DEFAULT_API_BASE, DEFAULT_THROTTLE, DEFAULT_USER_AGENT};
use crate::config::{DEFAULT_ENDPOINT, DEFAULT_EXCLUDED_TYPES};
use crate::core::ConfigProvider;
use crate::domain::model::SetType;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    pub assets: AssetsConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: Option<String>,
    pub endpoint: Option<String>,
    pub user_agent: Option<String>,
    pub throttle_ms: Option<u64>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    pub exclude_types: Option<Vec<SetType>>,
    pub exclude_digital: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    pub root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_base(&self) -> &str {
        self.source.base_url.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    fn sets_endpoint(&self) -> &str {
        self.source.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    fn user_agent(&self) -> &str {
        self.source.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    fn throttle(&self) -> Duration {
        self.source
            .throttle_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_THROTTLE)
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }

    fn exclude_types(&self) -> &[SetType] {
        self.filter
            .exclude_types
            .as_deref()
            .unwrap_or(DEFAULT_EXCLUDED_TYPES)
    }

    fn exclude_digital(&self) -> bool {
        self.filter.exclude_digital.unwrap_or(true)
    }

    fn icon_root(&self) -> &str {
        &self.assets.root
    }

    fn database_path(&self) -> &str {
        &self.database.path
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.base_url", self.api_base())?;
        validation::validate_non_empty_string("source.endpoint", self.sets_endpoint())?;
        validation::validate_non_empty_string("source.user_agent", self.user_agent())?;
        validation::validate_path("assets.root", self.icon_root())?;
        validation::validate_path("database.path", self.database_path())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[source]

[assets]
root = "./data"

[database]
path = "archive.db"
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.api_base(), "https://api.scryfall.com/");
        assert_eq!(config.sets_endpoint(), "sets");
        assert_eq!(config.throttle(), Duration::from_millis(100));
        assert_eq!(config.request_timeout(), None);
        assert_eq!(
            config.exclude_types(),
            &[SetType::Funny, SetType::Memorabilia]
        );
        assert!(config.exclude_digital());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_config() {
        let toml_content = r#"
[source]
base_url = "http://localhost:9000/"
endpoint = "sets"
user_agent = "archive-test/1.0"
throttle_ms = 5
timeout_seconds = 30

[filter]
exclude_types = ["token", "alchemy"]
exclude_digital = false

[assets]
root = "/tmp/icons"

[database]
path = "/tmp/archive.db"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api_base(), "http://localhost:9000/");
        assert_eq!(config.user_agent(), "archive-test/1.0");
        assert_eq!(config.throttle(), Duration::from_millis(5));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.exclude_types(), &[SetType::Token, SetType::Alchemy]);
        assert!(!config.exclude_digital());
        assert_eq!(config.icon_root(), "/tmp/icons");
    }

    #[test]
    fn test_unknown_exclude_type_is_rejected() {
        let toml_content = r#"
[source]

[filter]
exclude_types = ["funy"]

[assets]
root = "./data"

[database]
path = "archive.db"
"#;

        assert!(TomlConfig::from_toml_str(toml_content).is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SET_ARCHIVE_TEST_DB", "/var/lib/archive.db");

        let toml_content = r#"
[source]

[assets]
root = "./data"

[database]
path = "${SET_ARCHIVE_TEST_DB}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.database_path(), "/var/lib/archive.db");

        std::env::remove_var("SET_ARCHIVE_TEST_DB");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[source]
base_url = "invalid-url"

[assets]
root = "./data"

[database]
path = "archive.db"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.database_path(), "archive.db");
    }
}
