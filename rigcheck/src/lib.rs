//! RigCheck - PC build compatibility checking library
//!
//! This library evaluates a parts list against declarative compatibility
//! rules (CPU socket vs. motherboard socket, RAM type vs. motherboard memory
//! type, GPU length vs. case clearance, ...) and checks PSU capacity against
//! the build's total TDP.
//!
//! # Quick Start
//!
//! ```
//! use rigcheck::{default_rules, CompatibilityEngine, Part};
//!
//! let parts = vec![
//!     Part::new("cpu", "Intel Core i5-13600K", "cpu").with_attribute("socket", "LGA1700"),
//!     Part::new("mb", "ASUS TUF B650-PLUS", "motherboard").with_attribute("socket", "AM5"),
//! ];
//!
//! let result = CompatibilityEngine::default().evaluate(&parts, &default_rules());
//! assert!(!result.compatible);
//! for issue in &result.issues {
//!     println!("{}: {}", issue.severity, issue.message);
//! }
//! ```
//!
//! # Features
//!
//! - **Rules as data**: `match`, `lte`, `gte` and `in` operators over
//!   free-form part attributes
//! - **Power check**: total TDP against PSU wattage with configurable headroom
//! - **Lenient data handling**: missing or unparseable attributes skip a check
//!   instead of failing it
//! - **`parallel` feature**: evaluate rules on a rayon thread pool

pub mod core;
pub mod engine;
pub mod parts;
pub mod report;
pub mod rules;
pub mod wattage;

// Re-export main types
pub use crate::core::{
    discover_build_files, load_build, load_config, CheckOptions, CheckResult, CheckStats,
    RigCheckCore, RigCheckError,
};
pub use engine::{deduplicate, CompatibilityEngine, CompatibilityResult, EngineConfig};
pub use parts::{Attribute, AttributeBag, Build, BuildId, BuildItem, Category, Part, PartId};
pub use report::{CompatibilityReport, ReportIssue};
pub use rules::{default_rules, try_default_rules, Issue, Operator, Rule, RuleEvaluator, Severity};
pub use wattage::{PowerBudget, WattageEvaluator};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Build, CheckOptions, CheckResult, CompatibilityEngine, CompatibilityResult, EngineConfig,
        Issue, Part, RigCheckCore, RigCheckError, Rule, Severity,
    };
}
