//! Simple check example: check a build file and print the report.

use rigcheck::prelude::*;
use std::path::Path;

fn main() -> Result<(), RigCheckError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/builds/socket_mismatch_build.json".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example simple_check [path/to/build.json]");
        std::process::exit(1);
    }

    let result = RigCheckCore::check_build_file(path, &CheckOptions::default())?;

    println!("Compatibility results for: {} ({})", result.build_name, path.display());
    println!("Total issues: {}", result.total_issues());
    println!(
        "Power: {:.0}W TDP, recommended {:.0}W",
        result.power.total_tdp, result.power.recommended
    );
    println!();

    for issue in &result.report.issues {
        println!("  [{}] {}: {}", issue.severity, issue.rule_name, issue.message);
        println!("    Parts: {}", issue.parts_involved.join(", "));
    }

    if result.has_errors() {
        println!("\nBuild is not compatible.");
        std::process::exit(1);
    }

    println!("\nBuild is compatible.");
    Ok(())
}
