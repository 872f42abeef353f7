use crate::core::fetch::DEFAULT_TIMEOUT;
use crate::core::ConfigProvider;
use crate::domain::dataset::DEFAULT_BASE_URL;
use crate::utils::error::{EtlError, Result};
use crate::utils::logger::LOG_LEVELS;
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DATA_DIR: &str = "./files";
pub const LOG_FORMATS: [&str; 2] = ["compact", "json"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub fallback: FallbackConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Directory holding the CSV extracts (`producao.csv`, ...).
    pub data_dir: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub verbose: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            verbose: false,
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(EtlError::MissingConfigError {
                field: format!("config file {}", path.display()),
            });
        }
        let content = std::fs::read_to_string(path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${VITIBRASIL_DATA_DIR})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("source.base_url", &self.source.base_url)?;
        validation::validate_positive_number("source.timeout_seconds", self.source.timeout_seconds, 1)?;
        validation::validate_path("fallback.data_dir", &self.fallback.data_dir)?;
        validation::validate_one_of("logging.level", &self.logging.level, &LOG_LEVELS)?;
        validation::validate_one_of("logging.format", &self.logging.format, &LOG_FORMATS)?;
        Ok(())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.format == "json"
    }
}

impl ConfigProvider for TomlConfig {
    fn base_url(&self) -> &str {
        &self.source.base_url
    }

    fn data_dir(&self) -> &str {
        &self.fallback.data_dir
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.data_dir(), DEFAULT_DATA_DIR);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.logging.level, "info");
        assert!(!config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[source]
base_url = "https://mirror.example.com/index.php"
timeout_seconds = 3

[fallback]
data_dir = "/var/lib/vitibrasil"

[logging]
level = "debug"
format = "json"
verbose = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.source.base_url, "https://mirror.example.com/index.php");
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(config.data_dir(), "/var/lib/vitibrasil");
        assert_eq!(config.logging.level, "debug");
        assert!(config.json_logs());
        assert!(config.logging.verbose);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("VITIBRASIL_TEST_DATA_DIR", "/tmp/extracts");

        let toml_content = r#"
[fallback]
data_dir = "${VITIBRASIL_TEST_DATA_DIR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.fallback.data_dir, "/tmp/extracts");

        std::env::remove_var("VITIBRASIL_TEST_DATA_DIR");
    }

    #[test]
    fn test_config_validation() {
        let invalid_url = TomlConfig::from_toml_str("[source]\nbase_url = \"invalid-url\"\n").unwrap();
        assert!(invalid_url.validate().is_err());

        let zero_timeout = TomlConfig::from_toml_str("[source]\ntimeout_seconds = 0\n").unwrap();
        assert!(zero_timeout.validate().is_err());

        let bad_format = TomlConfig::from_toml_str("[logging]\nformat = \"xml\"\n").unwrap();
        assert!(bad_format.validate().is_err());

        let bad_level = TomlConfig::from_toml_str("[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(bad_level.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[source\nbase_url = 1").unwrap_err();
        assert!(matches!(err, EtlError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[fallback]\ndata_dir = \"./extracts\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.data_dir(), "./extracts");
    }

    #[test]
    fn test_missing_config_file_is_missing_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("vitibrasil.toml");

        let err = TomlConfig::from_file(&path).unwrap_err();
        match err {
            EtlError::MissingConfigError { field } => assert!(field.ends_with("vitibrasil.toml")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
