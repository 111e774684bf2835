use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API request failed: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("[{method} {path}][{status}] {body}")]
    ApiError {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error("{kind} not found")]
    NotFoundError { kind: String },

    #[error("{message}")]
    InvalidInputError { message: String },

    #[error("\"{attribute}\": {message}")]
    SchemaError { attribute: String, message: String },

    #[error("unknown {kind} type: {type_name}")]
    UnknownTypeError { kind: String, type_name: String },

    #[error("provider is not configured")]
    NotConfiguredError,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    RemoteApi,
    Input,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ProviderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProviderError::TransportError(_) => ErrorCategory::Network,
            ProviderError::ApiError { .. } | ProviderError::NotFoundError { .. } => {
                ErrorCategory::RemoteApi
            }
            ProviderError::InvalidInputError { .. }
            | ProviderError::SchemaError { .. }
            | ProviderError::UnknownTypeError { .. } => ErrorCategory::Input,
            ProviderError::NotConfiguredError
            | ProviderError::ConfigError { .. }
            | ProviderError::MissingConfigError { .. }
            | ProviderError::InvalidConfigValueError { .. }
            | ProviderError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ProviderError::IoError(_) | ProviderError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ProviderError::TransportError(_) => ErrorSeverity::Medium,
            ProviderError::ApiError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            ProviderError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ProviderError::TransportError(_) => {
                "Check that the Harbor URL is reachable and the TLS settings are correct"
            }
            ProviderError::ApiError { status: 401, .. }
            | ProviderError::ApiError { status: 403, .. } => {
                "Check the Harbor username and password"
            }
            ProviderError::ApiError { .. } => "Inspect the Harbor response body for details",
            ProviderError::NotFoundError { .. } => {
                "Verify the name or ID exists in Harbor and is visible to this user"
            }
            ProviderError::InvalidInputError { .. } | ProviderError::SchemaError { .. } => {
                "Fix the attributes in the configuration block"
            }
            ProviderError::UnknownTypeError { .. } => "Run `harbor-provider schema` to list supported types",
            ProviderError::NotConfiguredError => "Send a configure request before any other operation",
            ProviderError::MissingConfigError { .. }
            | ProviderError::InvalidConfigValueError { .. }
            | ProviderError::ConfigValidationError { .. }
            | ProviderError::ConfigError { .. } => {
                "Check the provider configuration file and HARBOR_* environment variables"
            }
            ProviderError::IoError(_) => "Check file permissions and that the path exists",
            ProviderError::SerializationError(_) => "Check that the request is valid JSON",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ProviderError::TransportError(_) => format!("Could not reach Harbor: {}", self),
            ProviderError::ApiError { status, .. } => {
                format!("Harbor rejected the request (HTTP {}): {}", status, self)
            }
            _ => self.to_string(),
        }
    }

    /// 遠端回傳 404，或本地查無資料
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProviderError::ApiError { status: 404, .. } | ProviderError::NotFoundError { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
