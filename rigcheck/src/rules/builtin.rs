//! Built-in and external rule sets
//!
//! Rules are loaded from:
//! 1. JSON rule files supplied by the caller (user-editable)
//! 2. The default rule set compiled into the binary
//!
//! A rule file is either a bare JSON array of rules or an object with a
//! `rules` array.

use crate::core::RigCheckError;
use crate::rules::Rule;
use serde::Deserialize;
use std::path::Path;

const EMBEDDED_DEFAULT_RULES: &str = include_str!("../../rules/default_rules.json");

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleFile {
    List(Vec<Rule>),
    Wrapped { rules: Vec<Rule> },
}

impl RuleFile {
    fn into_rules(self) -> Vec<Rule> {
        match self {
            RuleFile::List(rules) | RuleFile::Wrapped { rules } => rules,
        }
    }
}

/// Get the default rule set from the embedded JSON file
pub fn default_rules() -> Vec<Rule> {
    match try_default_rules() {
        Ok(rules) => rules,
        Err(e) => {
            tracing::error!("Failed to parse embedded rule set: {}", e);
            Vec::new()
        }
    }
}

/// Parse the embedded rule set, surfacing a parse failure instead of an
/// empty set. File-level checks go through this.
pub fn try_default_rules() -> Result<Vec<Rule>, serde_json::Error> {
    parse_rules(EMBEDDED_DEFAULT_RULES)
}

/// Parse rules from a JSON string
pub fn parse_rules(json: &str) -> Result<Vec<Rule>, serde_json::Error> {
    serde_json::from_str::<RuleFile>(json).map(RuleFile::into_rules)
}

/// Load rules from a single JSON file
pub fn load_rules_from_file(path: &Path) -> Result<Vec<Rule>, RigCheckError> {
    let content = std::fs::read_to_string(path)?;
    parse_rules(&content).map_err(|source| RigCheckError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load rules from a directory of JSON files
/// Returns both successfully loaded rules and any errors encountered
pub fn load_rules_from_directory(dir: &Path) -> (Vec<Rule>, Vec<String>) {
    let mut rules = Vec::new();
    let mut errors = Vec::new();

    if !dir.is_dir() {
        return (rules, errors);
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            errors.push(format!("Failed to read directory {:?}: {}", dir, e));
            return (rules, errors);
        }
    };

    let mut paths: Vec<_> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|e| e == "json").unwrap_or(false))
        .collect();
    // read_dir order is platform dependent
    paths.sort();

    for path in paths {
        match load_rules_from_file(&path) {
            Ok(loaded) => {
                tracing::info!("Loaded {} rule(s) from {:?}", loaded.len(), path.file_name());
                rules.extend(loaded);
            }
            Err(e) => {
                let error_msg = format!("Failed to load {:?}: {}", path.file_name(), e);
                tracing::warn!("{}", error_msg);
                errors.push(error_msg);
            }
        }
    }

    (rules, errors)
}
