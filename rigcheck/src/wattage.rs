//! Aggregate power check: total TDP of a build against its PSU.

use crate::parts::{iter_parts, Category, Part, PartId};
use crate::rules::{Issue, Severity};
use serde::Serialize;
use std::borrow::Borrow;

/// Rule name attached to issues raised by the wattage check.
pub const PSU_WATTAGE_RULE: &str = "PSU Wattage";

/// Recommended PSU capacity as a multiple of total TDP.
pub const DEFAULT_PSU_HEADROOM: f64 = 1.2;

/// Power figures for a build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerBudget {
    /// Sum of `tdp` over every non-PSU part.
    pub total_tdp: f64,
    pub psu: Option<PartId>,
    pub psu_wattage: Option<f64>,
    pub recommended: f64,
}

impl PowerBudget {
    pub fn headroom_ok(&self) -> bool {
        self.psu_wattage.map(|w| w >= self.recommended).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WattageEvaluator {
    headroom: f64,
}

impl WattageEvaluator {
    /// Create an evaluator with the given headroom multiplier.
    ///
    /// Multipliers below 1.0 or non-finite values fall back to
    /// [`DEFAULT_PSU_HEADROOM`].
    pub fn new(headroom: f64) -> Self {
        let headroom = if headroom.is_finite() && headroom >= 1.0 {
            headroom
        } else {
            tracing::warn!(
                "Invalid PSU headroom {}, using {}",
                headroom,
                DEFAULT_PSU_HEADROOM
            );
            DEFAULT_PSU_HEADROOM
        };
        Self { headroom }
    }

    pub fn headroom(&self) -> f64 {
        self.headroom
    }

    /// Compute the build's power figures.
    ///
    /// The first PSU in build order supplies the wattage; additional PSUs
    /// are ignored and neither supply nor draw power.
    pub fn power_budget<P: Borrow<Part>>(&self, parts: &[P]) -> PowerBudget {
        let mut psu: Option<&Part> = None;
        let mut total_tdp = 0.0;

        for part in iter_parts(parts) {
            if part.is_category(&Category::Psu) {
                match psu {
                    None => psu = Some(part),
                    Some(first) => tracing::warn!(
                        "Build has more than one PSU; using {} and ignoring {}",
                        first.id,
                        part.id
                    ),
                }
            } else if let Some(tdp) = part.get_numeric("tdp") {
                total_tdp += tdp;
            }
        }

        PowerBudget {
            total_tdp,
            psu: psu.map(|p| p.id.clone()),
            psu_wattage: psu.and_then(|p| p.get_numeric("wattage")),
            recommended: total_tdp * self.headroom,
        }
    }

    /// Check PSU capacity against total TDP.
    ///
    /// Skipped (no issue) when there is no PSU, no TDP to supply, or the
    /// PSU wattage is missing or unparseable.
    pub fn evaluate<P: Borrow<Part>>(&self, parts: &[P]) -> Option<Issue> {
        let budget = self.power_budget(parts);
        let psu = budget.psu.as_ref()?;
        if budget.total_tdp == 0.0 {
            return None;
        }
        let wattage = budget.psu_wattage?;

        if wattage < budget.total_tdp {
            Some(Issue::new(
                PSU_WATTAGE_RULE,
                Severity::Error,
                format!(
                    "PSU {}W is insufficient for {:.0}W total TDP",
                    wattage, budget.total_tdp
                ),
                vec![psu.clone()],
            ))
        } else if wattage < budget.recommended {
            Some(Issue::new(
                PSU_WATTAGE_RULE,
                Severity::Warning,
                format!(
                    "PSU {}W may be tight for {:.0}W TDP (recommended: {:.0}W)",
                    wattage,
                    budget.total_tdp,
                    budget.recommended.ceil()
                ),
                vec![psu.clone()],
            ))
        } else {
            None
        }
    }
}

impl Default for WattageEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_PSU_HEADROOM)
    }
}
