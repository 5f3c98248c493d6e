//! Bundled rule data
//!
//! Default rules ship as JSON grouped by category; the suffix table ships as
//! plain text, one two-label ccSLD per line.

use serde::{Deserialize, Serialize};

use nu_core::SuffixTable;

use crate::error::RulesError;

/// Bundled default rules.
pub const BUNDLED_DEFAULT_PARAMS: &str = include_str!("../data/default-params-by-category.json");

/// Bundled ccSLD list.
pub const BUNDLED_SUFFIXES: &str = include_str!("../data/publicsuffix-ccSLD.txt");

/// `default-params-by-category.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultParams {
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub params: Vec<String>,
}

impl DefaultParams {
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        serde_json::from_str(json).map_err(RulesError::InvalidDefaults)
    }

    /// All rules, in category order.
    pub fn flatten(&self) -> Vec<String> {
        self.categories
            .iter()
            .flat_map(|category| category.params.iter().cloned())
            .collect()
    }
}

/// Parse default rule JSON into a flat, ordered rule list.
pub fn load_default_params(json: &str) -> Result<Vec<String>, RulesError> {
    let params = DefaultParams::from_json(json)?.flatten();
    if params.is_empty() {
        return Err(RulesError::EmptyDefaults);
    }
    Ok(params)
}

/// The default rules shipped with this crate.
pub fn bundled_default_params() -> Result<Vec<String>, RulesError> {
    load_default_params(BUNDLED_DEFAULT_PARAMS)
}

/// The suffix table shipped with this crate.
pub fn bundled_suffix_table() -> SuffixTable {
    SuffixTable::from_text(BUNDLED_SUFFIXES)
}
