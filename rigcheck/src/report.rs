//! Serialized compatibility report for a build.
//!
//! Wire shape:
//!
//! ```text
//! { "build_id": ..., "is_compatible": bool,
//!   "issues": [{ "rule_name", "severity", "message", "parts_involved": [names] }] }
//! ```

use crate::engine::CompatibilityResult;
use crate::parts::{Build, BuildId};
use crate::rules::Severity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportIssue {
    pub rule_name: String,
    pub severity: Severity,
    pub message: String,
    /// Display names of the parts involved.
    pub parts_involved: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub build_id: BuildId,
    pub is_compatible: bool,
    pub issues: Vec<ReportIssue>,
}

impl CompatibilityReport {
    pub fn from_result(build: &Build, result: &CompatibilityResult) -> Self {
        let issues = result
            .issues
            .iter()
            .map(|issue| ReportIssue {
                rule_name: issue.rule_name.clone(),
                severity: issue.severity,
                message: issue.message.clone(),
                parts_involved: issue.parts.iter().map(|id| build.part_name(id)).collect(),
            })
            .collect();

        Self {
            build_id: build.id.clone(),
            is_compatible: result.compatible,
            issues,
        }
    }

    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.len() - self.error_count()
    }
}
