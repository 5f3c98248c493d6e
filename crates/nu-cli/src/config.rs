use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::debug;

use nu_core::SuffixTable;
use nu_rules::{bundled_default_params, bundled_suffix_table, load_default_params, Settings};

/// Everything a snapshot is built from.
pub struct RuleSources {
    pub defaults: Vec<String>,
    pub settings: Settings,
    pub suffixes: Arc<SuffixTable>,
}

/// Read settings, default rules and the suffix list, falling back to bundled
/// data for any path not given.
pub fn load_sources(
    settings: Option<&Path>,
    defaults: Option<&Path>,
    suffixes: Option<&Path>,
) -> Result<RuleSources, String> {
    let settings = match settings {
        Some(path) => Settings::from_json(&read(path)?)
            .map_err(|e| format!("Invalid settings '{}': {}", path.display(), e))?,
        None => Settings::default(),
    };

    let defaults = match defaults {
        Some(path) => load_default_params(&read(path)?)
            .map_err(|e| format!("Invalid defaults '{}': {}", path.display(), e))?,
        None => bundled_default_params().map_err(|e| format!("Invalid bundled defaults: {}", e))?,
    };

    let suffixes = match suffixes {
        Some(path) => SuffixTable::from_text(&read(path)?),
        None => bundled_suffix_table(),
    };

    debug!(
        "loaded {} default rules, {} suffixes",
        defaults.len(),
        suffixes.len()
    );

    Ok(RuleSources {
        defaults,
        settings,
        suffixes: Arc::new(suffixes),
    })
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path.display(), e))
}
