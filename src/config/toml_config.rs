use crate::core::ConfigProvider;
use crate::domain::schema::{Attribute, AttributeType, Schema};
use crate::utils::error::{ProviderError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASEPATH: &str = "/api";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub harbor: HarborConfig,
    pub logging: Option<LoggingConfig>,
}

/// Connection settings. Every field is optional so layers can be merged.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarborConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub insecure: Option<bool>,
    pub basepath: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ProviderError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ProviderError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HARBOR_PASSWORD})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ProviderError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn log_format(&self) -> Option<LogFormat> {
        self.logging.as_ref().and_then(|l| l.format)
    }
}

impl HarborConfig {
    /// 讀取 HARBOR_* 環境變數
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("HARBOR_URL").ok(),
            username: std::env::var("HARBOR_USERNAME").ok(),
            password: std::env::var("HARBOR_PASSWORD").ok(),
            insecure: std::env::var("HARBOR_INSECURE")
                .ok()
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes")),
            basepath: None,
            timeout_seconds: None,
        }
    }

    /// Parse the provider block the host sends with `configure`.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        if let serde_json::Value::Object(map) = value {
            provider_schema().validate_config(map)?;
        }
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Fields set in `higher` win over fields set in `self`.
    pub fn merge(self, higher: HarborConfig) -> HarborConfig {
        HarborConfig {
            url: higher.url.or(self.url),
            username: higher.username.or(self.username),
            password: higher.password.or(self.password),
            insecure: higher.insecure.or(self.insecure),
            basepath: higher.basepath.or(self.basepath),
            timeout_seconds: higher.timeout_seconds.or(self.timeout_seconds),
        }
    }
}

impl std::fmt::Debug for HarborConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarborConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("insecure", &self.insecure)
            .field("basepath", &self.basepath)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl ConfigProvider for HarborConfig {
    fn url(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }

    fn basepath(&self) -> &str {
        self.basepath.as_deref().unwrap_or(DEFAULT_BASEPATH)
    }

    fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.is_empty())
    }

    fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    fn insecure(&self) -> bool {
        self.insecure.unwrap_or(false)
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }
}

impl Validate for HarborConfig {
    fn validate(&self) -> Result<()> {
        let url = validation::validate_required_field("harbor.url", &self.url)?;
        validation::validate_url("harbor.url", url)?;

        if !self.basepath().starts_with('/') {
            return Err(ProviderError::InvalidConfigValueError {
                field: "harbor.basepath".to_string(),
                value: self.basepath().to_string(),
                reason: "Base path must start with '/'".to_string(),
            });
        }

        validation::validate_positive_number("harbor.timeout_seconds", self.timeout_seconds(), 1)?;

        if let Some(username) = &self.username {
            validation::validate_non_empty_string("harbor.username", username)?;
        }

        Ok(())
    }
}

/// Attributes accepted in the host's provider block.
pub fn provider_schema() -> Schema {
    Schema::new()
        .with_attribute(
            "url",
            Attribute::optional(AttributeType::String)
                .with_description("Harbor base URL, e.g. https://harbor.example.com (HARBOR_URL)"),
        )
        .with_attribute(
            "username",
            Attribute::optional(AttributeType::String).with_description("HARBOR_USERNAME"),
        )
        .with_attribute(
            "password",
            Attribute::optional(AttributeType::String)
                .sensitive()
                .with_description("HARBOR_PASSWORD"),
        )
        .with_attribute(
            "insecure",
            Attribute::optional(AttributeType::Bool).with_description("Skip TLS verification"),
        )
        .with_attribute(
            "basepath",
            Attribute::optional(AttributeType::String).with_description("API prefix, defaults to /api"),
        )
        .with_attribute("timeout_seconds", Attribute::optional(AttributeType::Int))
}
