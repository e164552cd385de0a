//! Rule configuration as supplied by the review policy store

use serde::{Deserialize, Serialize};

use crate::advice::Status;
use crate::error::AdvisorError;

/// One configured review rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Engine-scoped rule type, e.g. `column.auto-increment-must-unsigned`
    #[serde(rename = "type")]
    pub rule_type: String,
    /// Severity level: DISABLED, NOTICE, WARNING or ERROR
    pub level: String,
    /// Rule-specific parameters
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Title for the rule's advice; the rule type when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl RuleConfig {
    pub fn new(rule_type: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            rule_type: rule_type.into(),
            level: level.into(),
            payload: serde_json::Value::Null,
            title: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Display title for this rule's advice
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.rule_type)
    }

    /// Resolve the configured level
    pub fn level(&self) -> Result<Level, AdvisorError> {
        self.level
            .parse::<Level>()
            .map_err(|message| AdvisorError::InvalidConfiguration {
                rule_type: self.rule_type.clone(),
                message,
            })
    }

    /// Read a string parameter from the payload
    pub fn payload_str(&self, key: &str) -> Result<Option<&str>, AdvisorError> {
        match self.payload.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(AdvisorError::InvalidConfiguration {
                rule_type: self.rule_type.clone(),
                message: format!("payload field '{}' must be a string, found {}", key, other),
            }),
        }
    }
}

/// Configured severity of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Disabled,
    Notice,
    Warning,
    Error,
}

impl Level {
    /// Status given to the rule's findings; `None` when the rule is off
    pub fn status(&self) -> Option<Status> {
        match self {
            Level::Disabled => None,
            Level::Notice | Level::Warning => Some(Status::Warning),
            Level::Error => Some(Status::Error),
        }
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DISABLED" => Ok(Level::Disabled),
            "NOTICE" => Ok(Level::Notice),
            "WARNING" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            _ => Err(format!(
                "unknown level '{}', expected one of DISABLED, NOTICE, WARNING, ERROR",
                s
            )),
        }
    }
}
