//! Example: using CompatibilityEngine with hand-built parts and rules
//! (without RigCheckCore or any files).
//! Run with: cargo run --example custom_rules

use rigcheck::{CompatibilityEngine, EngineConfig, Operator, Part, Rule, Severity};

fn main() {
    let parts = vec![
        Part::new("cpu", "AMD Ryzen 9 7950X", "cpu")
            .with_attribute("socket", "AM5")
            .with_attribute("tdp", "170"),
        Part::new("gpu", "NVIDIA RTX 4090", "gpu")
            .with_attribute("length", "336")
            .with_attribute("tdp", "450"),
        Part::new("case", "NZXT H5 Flow", "case").with_attribute("gpu_clearance", "365"),
        Part::new("psu", "Corsair RM1000x", "psu").with_attribute("wattage", "1000"),
    ];

    let rules = vec![
        Rule::new(
            "GPU Case Clearance",
            "gpu",
            "length",
            "case",
            "gpu_clearance",
            Operator::Lte,
            "GPU may be too long for this case.",
        )
        .with_severity(Severity::Warning),
        Rule::new(
            "GPU Power Connector",
            "gpu",
            "power_connector",
            "psu",
            "connectors",
            Operator::In,
            "PSU lacks the GPU's power connector.",
        ),
    ];

    let engine = CompatibilityEngine::new(EngineConfig {
        psu_headroom: 1.5,
        ..EngineConfig::default()
    });
    let result = engine.evaluate(&parts, &rules);

    let budget = engine.power_budget(&parts);
    println!(
        "Total TDP {:.0}W, recommended PSU {:.0}W",
        budget.total_tdp, budget.recommended
    );
    println!(
        "Custom check found {} errors and {} warnings",
        result.errors().count(),
        result.warnings().count()
    );
    for issue in &result.issues {
        println!("  [{}] {}", issue.severity, issue.message);
    }

    if !result.compatible {
        std::process::exit(1);
    }
}
