//! Wire types of the JSON-lines plugin protocol. One request per stdin line,
//! one response per stdout line.

use crate::utils::error::ProviderError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const HANDSHAKE_PREFIX: &str = "HARBOR_PLUGIN";
pub const PROTOCOL_VERSION: u32 = 1;

pub fn handshake() -> String {
    format!("{}|{}|jsonl", HANDSHAKE_PREFIX, PROTOCOL_VERSION)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    DataSource,
    Resource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Request {
    GetSchema,
    Configure {
        #[serde(default)]
        config: Value,
    },
    Validate {
        kind: SchemaKind,
        type_name: String,
        #[serde(default)]
        config: Value,
    },
    ReadDataSource {
        type_name: String,
        #[serde(default)]
        config: Value,
    },
    Plan {
        type_name: String,
        #[serde(default)]
        prior_state: Option<Value>,
        #[serde(default)]
        config: Value,
    },
    Create {
        type_name: String,
        config: Value,
    },
    Read {
        type_name: String,
        state: Value,
    },
    Update {
        type_name: String,
        prior_state: Value,
        config: Value,
    },
    Delete {
        type_name: String,
        state: Value,
    },
    Import {
        type_name: String,
        id: String,
    },
    Stop,
}

impl Request {
    pub fn operation(&self) -> &'static str {
        match self {
            Request::GetSchema => "get_schema",
            Request::Configure { .. } => "configure",
            Request::Validate { .. } => "validate",
            Request::ReadDataSource { .. } => "read_data_source",
            Request::Plan { .. } => "plan",
            Request::Create { .. } => "create",
            Request::Read { .. } => "read",
            Request::Update { .. } => "update",
            Request::Delete { .. } => "delete",
            Request::Import { .. } => "import",
            Request::Stop => "stop",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Diagnostic {
    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: None,
        }
    }
}

impl From<&ProviderError> for Diagnostic {
    fn from(err: &ProviderError) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: err.to_string(),
            detail: Some(err.recovery_suggestion().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    pub result: Value,
    pub diagnostics: Vec<Diagnostic>,
}

impl Response {
    pub fn success(result: Value, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            ok: true,
            result,
            diagnostics,
        }
    }

    pub fn failure(err: &ProviderError) -> Self {
        Self {
            ok: false,
            result: Value::Null,
            diagnostics: vec![Diagnostic::from(err)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_read_data_source_request() {
        let request: Request = serde_json::from_value(json!({
            "operation": "read_data_source",
            "type_name": "harbor_project",
            "config": {"name": "library"}
        }))
        .unwrap();

        assert_eq!(
            request,
            Request::ReadDataSource {
                type_name: "harbor_project".to_string(),
                config: json!({"name": "library"}),
            }
        );
        assert_eq!(request.operation(), "read_data_source");
    }

    #[test]
    fn test_plan_prior_state_defaults_to_none() {
        let request: Request = serde_json::from_value(json!({
            "operation": "plan",
            "type_name": "harbor_usergroup",
            "config": {"group_name": "devs", "group_type": 2}
        }))
        .unwrap();

        assert!(matches!(request, Request::Plan { prior_state: None, .. }));
    }

    #[test]
    fn test_failure_response_shape() {
        let err = ProviderError::NotFoundError {
            kind: "Project".to_string(),
        };
        let response = serde_json::to_value(Response::failure(&err)).unwrap();

        assert_eq!(response["ok"], json!(false));
        assert_eq!(response["result"], json!(null));
        assert_eq!(response["diagnostics"][0]["severity"], json!("error"));
        assert_eq!(response["diagnostics"][0]["summary"], json!("Project not found"));
    }

    #[test]
    fn test_handshake_format() {
        assert_eq!(handshake(), "HARBOR_PLUGIN|1|jsonl");
    }
}
