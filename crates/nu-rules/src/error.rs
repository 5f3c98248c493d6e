//! Error type for loading rule data.

#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("Invalid default parameter data: {0}")]
    InvalidDefaults(#[source] serde_json::Error),
    #[error("Invalid settings: {0}")]
    InvalidSettings(#[source] serde_json::Error),
    #[error("Default parameter data has no rules")]
    EmptyDefaults,
}
