//! File-level checking shared by the CLI and library users.
//! Loads builds, rule sets and engine settings from JSON and runs the engine.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::engine::{CompatibilityEngine, EngineConfig};
use crate::parts::Build;
use crate::report::CompatibilityReport;
use crate::rules::{load_rules_from_directory, load_rules_from_file, try_default_rules, Rule};
use crate::wattage::PowerBudget;

#[derive(Debug, thiserror::Error)]
pub enum RigCheckError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid build: {0}")]
    InvalidBuild(String),
    #[error("{0}")]
    Other(String),
}

/// Options for check runs (CLI or library).
#[derive(Clone, Debug, Default)]
pub struct CheckOptions {
    pub config: EngineConfig,
    /// Rule file, or directory of rule files, to use instead of the
    /// embedded defaults.
    pub rules_file: Option<PathBuf>,
    /// Restrict evaluation to these rule names. Empty means all rules.
    pub only_rules: Vec<String>,
}

/// Per-file check result with the report and counts.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Source file, when the build was loaded from disk.
    pub file: Option<PathBuf>,
    pub build_name: String,
    pub report: CompatibilityReport,
    pub power: PowerBudget,
    pub stats: CheckStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckStats {
    pub parts: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl CheckResult {
    pub fn has_errors(&self) -> bool {
        self.stats.errors > 0
    }

    pub fn total_issues(&self) -> usize {
        self.stats.errors + self.stats.warnings
    }
}

/// Read a build file and validate item quantities.
pub fn load_build(path: &Path) -> Result<Build, RigCheckError> {
    let content = std::fs::read_to_string(path)?;
    let build: Build = serde_json::from_str(&content).map_err(|source| RigCheckError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(item) = build.items.iter().find(|item| item.quantity == 0) {
        return Err(RigCheckError::InvalidBuild(format!(
            "{} lists {} with quantity 0",
            build.id, item.part.full_name
        )));
    }
    Ok(build)
}

/// Read engine settings from a JSON file. Missing fields take defaults.
pub fn load_config(path: &Path) -> Result<EngineConfig, RigCheckError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| RigCheckError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Non-recursively discover build files (`*.json`) in a directory.
pub fn discover_build_files(dir: &Path) -> Result<Vec<PathBuf>, RigCheckError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Core check API used by the CLI.
pub struct RigCheckCore;

impl RigCheckCore {
    /// Resolve the rule set for a run: the rule file or the embedded
    /// defaults, narrowed by `only_rules`.
    pub fn resolve_rules(options: &CheckOptions) -> Result<Vec<Rule>, RigCheckError> {
        let rules = match &options.rules_file {
            Some(path) if path.is_dir() => {
                let (rules, errors) = load_rules_from_directory(path);
                if rules.is_empty() {
                    let reason = if errors.is_empty() {
                        format!("No rules found in {}", path.display())
                    } else {
                        errors.join("; ")
                    };
                    return Err(RigCheckError::Other(reason));
                }
                rules
            }
            Some(path) => load_rules_from_file(path)?,
            None => try_default_rules().map_err(|source| RigCheckError::Json {
                path: PathBuf::from("<embedded rules>"),
                source,
            })?,
        };

        if options.only_rules.is_empty() {
            return Ok(rules);
        }

        for name in &options.only_rules {
            if !rules.iter().any(|r| &r.name == name) {
                return Err(RigCheckError::Other(format!("Unknown rule: {}", name)));
            }
        }
        Ok(rules
            .into_iter()
            .filter(|r| options.only_rules.contains(&r.name))
            .collect())
    }

    /// Check an already loaded build.
    pub fn check_build(build: &Build, rules: &[Rule], options: &CheckOptions) -> CheckResult {
        let engine = CompatibilityEngine::new(options.config.clone());
        let parts = build.parts();
        let report = engine.check_build(build, rules);
        let stats = CheckStats {
            parts: parts.len(),
            errors: report.error_count(),
            warnings: report.warning_count(),
        };

        CheckResult {
            file: None,
            build_name: build.name.clone(),
            power: engine.power_budget(&parts),
            report,
            stats,
        }
    }

    /// Check a single build file.
    pub fn check_build_file(path: &Path, options: &CheckOptions) -> Result<CheckResult, RigCheckError> {
        let rules = Self::resolve_rules(options)?;
        Self::check_file_with_rules(path, &rules, options)
    }

    /// Check every build file in a directory.
    pub fn check_directory(dir: &Path, options: &CheckOptions) -> Result<Vec<CheckResult>, RigCheckError> {
        let rules = Self::resolve_rules(options)?;
        let files = discover_build_files(dir)?;
        tracing::info!("Checking {} build file(s) in {}", files.len(), dir.display());

        files
            .iter()
            .map(|path| Self::check_file_with_rules(path, &rules, options))
            .collect()
    }

    fn check_file_with_rules(
        path: &Path,
        rules: &[Rule],
        options: &CheckOptions,
    ) -> Result<CheckResult, RigCheckError> {
        let build = load_build(path)?;
        let mut result = Self::check_build(&build, rules, options);
        result.file = Some(path.to_path_buf());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_zero_quantity_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("build.json");
        fs::write(
            &path,
            r#"{"id": 1, "name": "Broken", "items": [
                {"part": {"id": 1, "full_name": "AMD Ryzen 5 7600X", "category": "cpu"}, "quantity": 0}
            ]}"#,
        )
        .expect("write build");

        let err = load_build(&path).expect_err("Should reject quantity 0");
        assert!(matches!(err, RigCheckError::InvalidBuild(_)));
        assert!(err.to_string().contains("AMD Ryzen 5 7600X"));
    }

    #[test]
    fn test_malformed_build_reports_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bad.json");
        fs::write(&path, "{").expect("write build");

        let err = load_build(&path).expect_err("Should fail to parse");
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_unknown_rule_filter_is_error() {
        let options = CheckOptions {
            only_rules: vec!["No Such Rule".to_string()],
            ..CheckOptions::default()
        };
        assert!(RigCheckCore::resolve_rules(&options).is_err());
    }

    #[test]
    fn test_rules_from_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(
            dir.path().join("sockets.json"),
            r#"[{"name": "Socket", "category_a": "cpu", "category_b": "motherboard",
                "attribute_a": "socket", "attribute_b": "socket", "operator": "match",
                "error_message": "Socket mismatch"}]"#,
        )
        .expect("write rules");
        fs::write(dir.path().join("broken.json"), "[").expect("write rules");

        let options = CheckOptions {
            rules_file: Some(dir.path().to_path_buf()),
            ..CheckOptions::default()
        };
        let rules = RigCheckCore::resolve_rules(&options).expect("Should resolve");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "Socket");
    }

    #[test]
    fn test_empty_rules_directory_is_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("notes.txt"), "not a rule file").expect("write notes");

        let options = CheckOptions {
            rules_file: Some(dir.path().to_path_buf()),
            ..CheckOptions::default()
        };
        let err = RigCheckCore::resolve_rules(&options).expect_err("Should refuse an empty rule set");
        assert!(err.to_string().contains("No rules found"));

        let build_dir = tempfile::tempdir().expect("temp dir");
        let build = build_dir.path().join("build.json");
        fs::write(
            &build,
            r#"{"id": 1, "name": "Mismatch", "items": [
                {"part": {"id": 1, "full_name": "CPU", "category": "cpu",
                          "attributes": [{"key": "socket", "value": "LGA1700"}]}},
                {"part": {"id": 2, "full_name": "Board", "category": "motherboard",
                          "attributes": [{"key": "socket", "value": "AM5"}]}}
            ]}"#,
        )
        .expect("write build");
        assert!(RigCheckCore::check_build_file(&build, &options).is_err());
    }

    #[test]
    fn test_in_memory_check_has_no_file() {
        let build = Build::new("1", "Scratch");
        let result = RigCheckCore::check_build(&build, &[], &CheckOptions::default());
        assert_eq!(result.file, None);
    }

    #[test]
    fn test_rule_filter_narrows_set() {
        let options = CheckOptions {
            only_rules: vec!["CPU-Motherboard Socket".to_string()],
            ..CheckOptions::default()
        };
        let rules = RigCheckCore::resolve_rules(&options).expect("Should resolve");
        assert_eq!(rules.len(), 1);
    }
}
