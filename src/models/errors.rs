use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Structured error body returned with 422 responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationError {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub code: String,
    #[serde(default)]
    pub parameters: Vec<ErrorParameter>,
}

/// The offending field and the value the caller sent for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorParameter {
    pub key: String,
    pub value: Option<String>,
}

impl ValidationErrors {
    /// Single error naming one field
    pub fn for_field(key: &str, value: Option<&str>, message: &str) -> Self {
        Self {
            errors: vec![ValidationError {
                message: message.to_string(),
                kind: "1".to_string(),
                code: "-1".to_string(),
                parameters: vec![ErrorParameter {
                    key: key.to_string(),
                    value: value.map(str::to_string),
                }],
            }],
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}
