//! Pairwise evaluation of a single rule over a set of parts.

use crate::parts::{iter_parts, Part};
use crate::rules::{Issue, Rule};
use std::borrow::Borrow;

/// Evaluates one [`Rule`] against every applicable part pair.
#[derive(Debug, Clone, Copy)]
pub struct RuleEvaluator {
    trim_list_items: bool,
}

impl RuleEvaluator {
    pub fn new(trim_list_items: bool) -> Self {
        Self { trim_list_items }
    }

    /// Evaluate `rule` over all `(a, b)` pairs where `a` is in
    /// `rule.category_a` and `b` is in `rule.category_b`.
    ///
    /// Missing attributes and values the operator cannot judge skip the
    /// pair. A part is never paired with itself, so a rule whose two
    /// categories are equal compares every ordered pair of distinct parts
    /// in that category.
    pub fn evaluate<P: Borrow<Part>>(&self, rule: &Rule, parts: &[P]) -> Vec<Issue> {
        let candidates_a: Vec<(usize, &Part)> = iter_parts(parts)
            .enumerate()
            .filter(|(_, p)| p.is_category(&rule.category_a))
            .collect();
        let candidates_b: Vec<(usize, &Part)> = iter_parts(parts)
            .enumerate()
            .filter(|(_, p)| p.is_category(&rule.category_b))
            .collect();

        if candidates_a.is_empty() || candidates_b.is_empty() {
            tracing::trace!("Rule '{}' does not apply to this build", rule.name);
            return Vec::new();
        }

        if rule.is_self_referential() {
            tracing::trace!(
                "Rule '{}' pairs {} part(s) within '{}'",
                rule.name,
                candidates_a.len(),
                rule.category_a
            );
        }

        let mut issues = Vec::new();
        for &(index_a, part_a) in &candidates_a {
            let Some(value_a) = part_a.get_string(&rule.attribute_a) else {
                tracing::trace!(
                    "Rule '{}': {} has no '{}', skipped",
                    rule.name,
                    part_a.id,
                    rule.attribute_a
                );
                continue;
            };

            for &(index_b, part_b) in &candidates_b {
                if index_a == index_b {
                    continue;
                }
                let Some(value_b) = part_b.get_string(&rule.attribute_b) else {
                    continue;
                };

                match rule
                    .operator
                    .evaluate(value_a, value_b, self.trim_list_items)
                {
                    Some(true) => {}
                    Some(false) => issues.push(rule.violation(&part_a.id, &part_b.id)),
                    None => tracing::debug!(
                        "Rule '{}': cannot compare '{}' with '{}' numerically, skipped",
                        rule.name,
                        value_a,
                        value_b
                    ),
                }
            }
        }

        if !issues.is_empty() {
            tracing::debug!("Rule '{}' raised {} issue(s)", rule.name, issues.len());
        }
        issues
    }
}

impl Default for RuleEvaluator {
    fn default() -> Self {
        Self::new(true)
    }
}
