//! Declarative compatibility rules and the issues they produce.
//!
//! A [`Rule`] relates one attribute of a part in `category_a` to one
//! attribute of a part in `category_b` through an [`Operator`]. Rules are
//! plain data: they are loaded from JSON (see [`builtin`]) and evaluated
//! pairwise by the [`RuleEvaluator`].

pub mod builtin;
pub mod evaluator;

pub use builtin::{default_rules, load_rules_from_directory, load_rules_from_file, try_default_rules};
pub use evaluator::RuleEvaluator;

use crate::parts::{parse_numeric, Category, PartId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reported compatibility problem.
///
/// Two issues are equal when their severity and message are equal; the rule
/// name and the parts involved do not take part in comparison or hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub rule_name: String,
    pub severity: Severity,
    pub message: String,
    pub parts: Vec<PartId>,
}

impl Issue {
    pub fn new(
        rule_name: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        parts: Vec<PartId>,
    ) -> Self {
        Self {
            rule_name: rule_name.into(),
            severity,
            message: message.into(),
            parts,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

impl PartialEq for Issue {
    fn eq(&self, other: &Self) -> bool {
        self.severity == other.severity && self.message == other.message
    }
}

impl Eq for Issue {}

impl Hash for Issue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.severity.hash(state);
        self.message.hash(state);
    }
}

/// Comparison applied between the two sides of a rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Values must be identical strings.
    Match,
    /// Left value must be numerically less than or equal to the right.
    Lte,
    /// Left value must be numerically greater than or equal to the right.
    Gte,
    /// Left value must be one entry of the comma-separated right value.
    In,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Match => "match",
            Operator::Lte => "lte",
            Operator::Gte => "gte",
            Operator::In => "in",
        }
    }

    /// Evaluate the operator on a pair of raw attribute values.
    ///
    /// Returns `Some(true)` when the pair satisfies the operator,
    /// `Some(false)` on a violation, and `None` when the pair cannot be
    /// judged (a numeric operator on a value that does not parse).
    /// `trim_list_items` controls whitespace trimming for [`Operator::In`].
    pub fn evaluate(&self, value_a: &str, value_b: &str, trim_list_items: bool) -> Option<bool> {
        match self {
            Operator::Match => Some(value_a == value_b),
            Operator::Lte => Some(parse_numeric(value_a)? <= parse_numeric(value_b)?),
            Operator::Gte => Some(parse_numeric(value_a)? >= parse_numeric(value_b)?),
            Operator::In => {
                let found = if trim_list_items {
                    let needle = value_a.trim();
                    value_b.split(',').any(|item| item.trim() == needle)
                } else {
                    value_b.split(',').any(|item| item == value_a)
                };
                Some(found)
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_severity() -> Severity {
    Severity::Error
}

fn default_active() -> bool {
    true
}

/// A declarative compatibility constraint between two part categories.
///
/// Field aliases accept the column names used by the catalog database
/// (`spec_a`, `rule_type`, `is_active`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category_a: Category,
    pub category_b: Category,
    #[serde(alias = "spec_a")]
    pub attribute_a: String,
    #[serde(alias = "spec_b")]
    pub attribute_b: String,
    #[serde(alias = "rule_type")]
    pub operator: Operator,
    pub error_message: String,
    #[serde(default = "default_severity")]
    pub severity: Severity,
    #[serde(default = "default_active", alias = "is_active")]
    pub active: bool,
}

impl Rule {
    /// Create an active, error-severity rule.
    pub fn new(
        name: impl Into<String>,
        category_a: impl Into<Category>,
        attribute_a: impl Into<String>,
        category_b: impl Into<Category>,
        attribute_b: impl Into<String>,
        operator: Operator,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            category_a: category_a.into(),
            category_b: category_b.into(),
            attribute_a: attribute_a.into(),
            attribute_b: attribute_b.into(),
            operator,
            error_message: error_message.into(),
            severity: Severity::Error,
            active: true,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Whether both sides of the rule draw from the same category.
    pub fn is_self_referential(&self) -> bool {
        self.category_a == self.category_b
    }

    /// Build the issue reported for one violating pair.
    pub fn violation(&self, part_a: &PartId, part_b: &PartId) -> Issue {
        Issue::new(
            self.name.clone(),
            self.severity,
            self.error_message.clone(),
            vec![part_a.clone(), part_b.clone()],
        )
    }
}
