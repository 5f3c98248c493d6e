//! Persisted settings
//!
//! Field names follow the storage keys the host persists. Every field is
//! optional: a missing or empty value falls back to its default, and keys this
//! crate does not care about (icon theme, counter color...) are ignored.

use serde::{Deserialize, Serialize};

use nu_core::RequestType;

use crate::error::RulesError;
use crate::parser::parse_rule_list;

/// Request types intercepted when nothing is configured.
pub const DEFAULT_REQUEST_TYPES: &[&str] = &["main_frame"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default rules the user switched off (exact rule text)
    #[serde(rename = "neat_url_override_default_blocked_params")]
    pub override_default_blocked_params: Option<String>,
    /// User rules
    #[serde(rename = "neat_url_blocked_params")]
    pub blocked_params: Option<String>,
    /// Host suffixes never rewritten
    #[serde(rename = "neat_url_blacklist")]
    pub blacklist: Option<String>,
    /// Request types to intercept
    #[serde(rename = "neat_url_types")]
    pub types: Option<String>,
    #[serde(rename = "neat_url_logging")]
    pub logging: Option<bool>,
    /// Version that last wrote these settings
    #[serde(rename = "neat_url_version")]
    pub version: Option<String>,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        serde_json::from_str(json).map_err(RulesError::InvalidSettings)
    }

    pub fn overrides(&self) -> Vec<String> {
        list_or_default(self.override_default_blocked_params.as_deref(), &[])
    }

    pub fn user_rules(&self) -> Vec<String> {
        list_or_default(self.blocked_params.as_deref(), &[])
    }

    pub fn blacklist(&self) -> Vec<String> {
        list_or_default(self.blacklist.as_deref(), &[])
    }

    pub fn request_type_names(&self) -> Vec<String> {
        list_or_default(self.types.as_deref(), DEFAULT_REQUEST_TYPES)
    }

    pub fn request_types(&self) -> RequestType {
        RequestType::from_type_names(self.request_type_names().iter().map(String::as_str))
    }

    pub fn logging(&self) -> bool {
        self.logging.unwrap_or(false)
    }
}

fn list_or_default(value: Option<&str>, default: &[&str]) -> Vec<String> {
    match value {
        Some(text) if !text.is_empty() => parse_rule_list(text),
        _ => default.iter().map(|s| s.to_string()).collect(),
    }
}
