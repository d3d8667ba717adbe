//! Compatibility engine: runs a rule set and the wattage check over a
//! build's parts and produces a single verdict.
//!
//! The engine is a pure function of its inputs. It performs no I/O and never
//! fails; missing or malformed attribute data only causes individual checks
//! to be skipped.

use crate::parts::{Build, Part};
use crate::report::CompatibilityReport;
use crate::rules::{Issue, Rule, RuleEvaluator};
use crate::wattage::{PowerBudget, WattageEvaluator, DEFAULT_PSU_HEADROOM};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Recommended PSU capacity as a multiple of total TDP.
    pub psu_headroom: f64,
    /// Trim whitespace around `in` list entries (`"DDR4, DDR5"`).
    pub trim_list_items: bool,
    /// Evaluate rules on the rayon pool. Needs the `parallel` feature.
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            psu_headroom: DEFAULT_PSU_HEADROOM,
            trim_list_items: true,
            parallel: false,
        }
    }
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityResult {
    /// `false` iff at least one issue has error severity.
    pub compatible: bool,
    pub issues: Vec<Issue>,
}

impl CompatibilityResult {
    /// A result with no issues.
    pub fn no_issues() -> Self {
        Self {
            compatible: true,
            issues: Vec::new(),
        }
    }

    pub fn from_issues(issues: Vec<Issue>) -> Self {
        let compatible = !issues.iter().any(Issue::is_error);
        Self { compatible, issues }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| !i.is_error())
    }
}

/// Collapse issues with the same severity and message.
///
/// The first occurrence keeps its position. Part ids of later duplicates are
/// appended to it, skipping ids it already lists.
pub fn deduplicate(issues: Vec<Issue>) -> Vec<Issue> {
    let mut unique: Vec<Issue> = Vec::with_capacity(issues.len());
    let mut index: HashMap<Issue, usize> = HashMap::new();

    for issue in issues {
        match index.get(&issue) {
            Some(&at) => {
                let kept = &mut unique[at];
                for part in issue.parts {
                    if !kept.parts.contains(&part) {
                        kept.parts.push(part);
                    }
                }
            }
            None => {
                index.insert(issue.clone(), unique.len());
                unique.push(issue);
            }
        }
    }

    unique
}

/// Evaluates builds against a rule set plus the PSU wattage check.
#[derive(Debug, Clone)]
pub struct CompatibilityEngine {
    config: EngineConfig,
    rules: RuleEvaluator,
    wattage: WattageEvaluator,
}

impl CompatibilityEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            rules: RuleEvaluator::new(config.trim_list_items),
            wattage: WattageEvaluator::new(config.psu_headroom),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate `parts` against every active rule in `rules` and the
    /// wattage check.
    ///
    /// Fewer than two parts are vacuously compatible.
    pub fn evaluate<P: Borrow<Part> + Sync>(&self, parts: &[P], rules: &[Rule]) -> CompatibilityResult {
        if parts.len() < 2 {
            return CompatibilityResult::no_issues();
        }

        let active: Vec<&Rule> = rules.iter().filter(|r| r.active).collect();
        let mut issues = self.run_rules(parts, &active);
        issues.extend(self.wattage.evaluate(parts));

        let raw = issues.len();
        let issues = deduplicate(issues);
        tracing::debug!(
            "Evaluated {} part(s) against {} active rule(s): {} issue(s), {} after dedup",
            parts.len(),
            active.len(),
            raw,
            issues.len()
        );

        CompatibilityResult::from_issues(issues)
    }

    /// Evaluate a build and render the report with part display names.
    pub fn check_build(&self, build: &Build, rules: &[Rule]) -> CompatibilityReport {
        let result = self.evaluate(&build.parts(), rules);
        CompatibilityReport::from_result(build, &result)
    }

    pub fn power_budget<P: Borrow<Part>>(&self, parts: &[P]) -> PowerBudget {
        self.wattage.power_budget(parts)
    }

    fn run_rules_sequential<P: Borrow<Part>>(&self, parts: &[P], active: &[&Rule]) -> Vec<Issue> {
        active
            .iter()
            .flat_map(|rule| self.rules.evaluate(rule, parts))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn run_rules<P: Borrow<Part> + Sync>(&self, parts: &[P], active: &[&Rule]) -> Vec<Issue> {
        use rayon::prelude::*;

        if !self.config.parallel {
            return self.run_rules_sequential(parts, active);
        }
        // collect keeps rule order, so dedup sees the same sequence
        let per_rule: Vec<Vec<Issue>> = active
            .par_iter()
            .map(|rule| self.rules.evaluate(rule, parts))
            .collect();
        per_rule.into_iter().flatten().collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn run_rules<P: Borrow<Part> + Sync>(&self, parts: &[P], active: &[&Rule]) -> Vec<Issue> {
        if self.config.parallel {
            tracing::debug!("Parallel evaluation requested but the `parallel` feature is off");
        }
        self.run_rules_sequential(parts, active)
    }
}

impl Default for CompatibilityEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parts::PartId;
    use crate::rules::{default_rules, Operator, Severity};

    fn cpu(id: &str, socket: &str) -> Part {
        Part::new(id, format!("CPU {}", socket), "cpu")
            .with_attribute("socket", socket)
            .with_attribute("tdp", "105")
    }

    fn board(socket: &str, memory: &str) -> Part {
        Part::new("mb", "Board", "motherboard")
            .with_attribute("socket", socket)
            .with_attribute("memory_type", memory)
    }

    #[test]
    fn test_empty_and_single_part_are_compatible() {
        let engine = CompatibilityEngine::default();
        let rules = default_rules();

        let empty: Vec<Part> = Vec::new();
        let result = engine.evaluate(&empty, &rules);
        assert!(result.compatible);
        assert!(result.issues.is_empty());

        let single = vec![cpu("c", "LGA1700")];
        assert_eq!(engine.evaluate(&single, &rules), CompatibilityResult::no_issues());
    }

    #[test]
    fn test_socket_mismatch_is_single_error() {
        let engine = CompatibilityEngine::default();
        let parts = vec![cpu("c", "LGA1700"), board("AM5", "DDR5")];

        let result = engine.evaluate(&parts, &default_rules());
        assert!(!result.compatible);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].severity, Severity::Error);
        assert!(result.issues[0].message.to_lowercase().contains("socket"));
    }

    #[test]
    fn test_inactive_rules_are_ignored() {
        let engine = CompatibilityEngine::default();
        let parts = vec![cpu("c", "LGA1700"), board("AM5", "DDR5")];
        let rules: Vec<Rule> = default_rules().into_iter().map(Rule::inactive).collect();

        assert!(engine.evaluate(&parts, &rules).compatible);
    }

    #[test]
    fn test_warnings_do_not_flip_verdict() {
        let engine = CompatibilityEngine::default();
        let parts = vec![
            Part::new("gpu", "Long GPU", "gpu").with_attribute("length", "340"),
            Part::new("case", "Small Case", "case").with_attribute("gpu_clearance", "320"),
        ];

        let result = engine.evaluate(&parts, &default_rules());
        assert!(result.compatible);
        assert_eq!(result.warnings().count(), 1);
        assert_eq!(result.errors().count(), 0);
    }

    #[test]
    fn test_duplicate_messages_collapse_and_merge_parts() {
        let engine = CompatibilityEngine::default();
        let parts = vec![
            cpu("c1", "LGA1700"),
            cpu("c2", "AM4"),
            board("AM5", "DDR5"),
        ];

        let result = engine.evaluate(&parts, &default_rules());
        assert_eq!(result.issues.len(), 1);
        assert_eq!(
            result.issues[0].parts,
            vec![PartId::from("c1"), PartId::from("mb"), PartId::from("c2")]
        );
    }

    #[test]
    fn test_identical_rules_dedupe() {
        let engine = CompatibilityEngine::default();
        let rule = Rule::new(
            "Socket",
            "cpu",
            "socket",
            "motherboard",
            "socket",
            Operator::Match,
            "Socket mismatch",
        );
        let twin = Rule {
            name: "Socket (copy)".to_string(),
            ..rule.clone()
        };
        let parts = vec![cpu("c", "LGA1700"), board("AM5", "DDR5")];

        let result = engine.evaluate(&parts, &[rule, twin]);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].rule_name, "Socket");
    }

    #[test]
    fn test_wattage_issue_follows_rule_issues() {
        let engine = CompatibilityEngine::default();
        let parts = vec![
            cpu("c", "LGA1700"),
            board("AM5", "DDR5"),
            Part::new("psu", "Tiny PSU", "psu").with_attribute("wattage", "100"),
        ];

        let result = engine.evaluate(&parts, &default_rules());
        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.issues[1].rule_name, crate::wattage::PSU_WATTAGE_RULE);
    }

    #[test]
    fn test_trim_policy_is_configurable() {
        let parts = vec![
            Part::new("c", "CPU", "cpu").with_attribute("socket", "AM5"),
            Part::new("k", "Cooler", "cooler").with_attribute("supported_sockets", "AM4, AM5"),
        ];
        let rules = default_rules();

        let trimmed = CompatibilityEngine::default().evaluate(&parts, &rules);
        assert!(trimmed.issues.is_empty());

        let exact = CompatibilityEngine::new(EngineConfig {
            trim_list_items: false,
            ..EngineConfig::default()
        })
        .evaluate(&parts, &rules);
        assert_eq!(exact.issues.len(), 1);
        assert_eq!(exact.issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"psu_headroom": 1.3}"#).expect("Should parse config");
        assert_eq!(config.psu_headroom, 1.3);
        assert!(config.trim_list_items);
        assert!(!config.parallel);
    }

    fn mixed_parts() -> Vec<Part> {
        vec![
            cpu("c1", "LGA1700"),
            cpu("c2", "AM4"),
            board("AM5", "DDR4"),
            Part::new("r", "RAM", "ram").with_attribute("type", "DDR5"),
            Part::new("psu", "PSU", "psu").with_attribute("wattage", "220"),
        ]
    }

    // needs `--features parallel` to reach the rayon path
    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let parts = mixed_parts();
        let rules = default_rules();

        let sequential = CompatibilityEngine::default().evaluate(&parts, &rules);
        let parallel = CompatibilityEngine::new(EngineConfig {
            parallel: true,
            ..EngineConfig::default()
        })
        .evaluate(&parts, &rules);

        assert_eq!(sequential, parallel);
        let messages = |r: &CompatibilityResult| {
            r.issues.iter().map(|i| i.message.clone()).collect::<Vec<_>>()
        };
        assert_eq!(messages(&sequential), messages(&parallel));
    }

    #[cfg(not(feature = "parallel"))]
    #[test]
    fn test_parallel_flag_without_feature_runs_sequentially() {
        let parts = mixed_parts();
        let rules = default_rules();

        let sequential = CompatibilityEngine::default().evaluate(&parts, &rules);
        let requested = CompatibilityEngine::new(EngineConfig {
            parallel: true,
            ..EngineConfig::default()
        })
        .evaluate(&parts, &rules);

        assert_eq!(requested, sequential);
        assert_eq!(requested.issues.len(), sequential.issues.len());
        for (a, b) in requested.issues.iter().zip(&sequential.issues) {
            assert_eq!(a.parts, b.parts);
        }
    }
}
