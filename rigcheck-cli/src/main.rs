//! RigCheck CLI - PC build compatibility checking from the command line.

use clap::{Parser, Subcommand, ValueEnum};
use rigcheck::{
    load_config, CheckOptions, CheckResult, EngineConfig, RigCheckCore, RigCheckError, Severity,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "rigcheck")]
#[command(about = "PC build compatibility checker", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a single build file
    Check {
        /// Path to a build JSON file
        #[arg(value_name = "BUILD")]
        build: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Check every build file in a directory
    Batch {
        /// Directory containing build JSON files
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// List compatibility rules
    Rules {
        /// Rule file or directory to list instead of the built-in rules
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Show rule descriptions and attributes
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Rule file or directory to use instead of the built-in rules
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Engine settings file (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only evaluate the named rule (repeatable)
    #[arg(long = "rule", value_name = "NAME")]
    only_rules: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Exit with error code if issues found at this severity or higher
    #[arg(long, value_enum)]
    fail_on: Option<FailOn>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for CI/CD
    Json,
    /// GitHub Actions format
    Github,
}

#[derive(Clone, ValueEnum)]
enum FailOn {
    Error,
    Warning,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let exit_code = match cli.command {
        Commands::Check { build, run } => handle_check(&build, &run),
        Commands::Batch { dir, run } => handle_batch(&dir, &run),
        Commands::Rules { rules, verbose } => handle_rules(rules.as_deref(), verbose),
    };

    process::exit(exit_code);
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn check_options(run: &RunArgs) -> Result<CheckOptions, RigCheckError> {
    let config = match &run.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    tracing::debug!("Engine config: {:?}", config);

    Ok(CheckOptions {
        config,
        rules_file: run.rules.clone(),
        only_rules: run.only_rules.clone(),
    })
}

fn handle_check(build: &Path, run: &RunArgs) -> i32 {
    tracing::debug!("Checking {}", build.display());
    let result = check_options(run).and_then(|options| RigCheckCore::check_build_file(build, &options));

    match result {
        Ok(result) => {
            let results = [result];
            output_results(&results, &run.format);
            exit_code(&results, run.fail_on.as_ref())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn handle_batch(dir: &Path, run: &RunArgs) -> i32 {
    let result = check_options(run).and_then(|options| RigCheckCore::check_directory(dir, &options));

    match result {
        Ok(results) => {
            tracing::debug!("Checked {} build(s) in {}", results.len(), dir.display());
            output_results(&results, &run.format);
            exit_code(&results, run.fail_on.as_ref())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn exit_code(results: &[CheckResult], fail_on: Option<&FailOn>) -> i32 {
    match fail_on {
        Some(threshold) if results.iter().any(|r| should_fail(r, threshold)) => 1,
        _ => 0,
    }
}

fn should_fail(result: &CheckResult, threshold: &FailOn) -> bool {
    match threshold {
        FailOn::Error => result.has_errors(),
        FailOn::Warning => result.total_issues() > 0,
    }
}

fn output_results(results: &[CheckResult], format: &OutputFormat) {
    match format {
        OutputFormat::Human => output_human(results),
        OutputFormat::Json => output_json(results),
        OutputFormat::Github => output_github(results),
    }
}

fn output_human(results: &[CheckResult]) {
    for result in results {
        match &result.file {
            Some(file) => println!("\nBuild: {} ({})", result.build_name, file.display()),
            None => println!("\nBuild: {}", result.build_name),
        }
        println!("{}", "─".repeat(60));

        match result.power.psu_wattage {
            Some(wattage) => println!(
                "  Power: {:.0}W TDP, PSU {:.0}W (recommended {:.0}W)",
                result.power.total_tdp,
                wattage,
                result.power.recommended.ceil()
            ),
            None => println!("  Power: {:.0}W TDP, no PSU wattage", result.power.total_tdp),
        }

        if result.total_issues() == 0 {
            println!("  No issues found");
            continue;
        }

        for (label, severity) in [("ERRORS", Severity::Error), ("WARNINGS", Severity::Warning)] {
            let issues: Vec<_> = result
                .report
                .issues
                .iter()
                .filter(|i| i.severity == severity)
                .collect();
            if issues.is_empty() {
                continue;
            }

            println!("\n  {}:", label);
            for issue in issues {
                println!("    - [{}] {}", issue.rule_name, issue.message);
                if !issue.parts_involved.is_empty() {
                    println!("      Parts: {}", issue.parts_involved.join(", "));
                }
            }
        }

        println!("\n  Summary:");
        println!("    Compatible: {}", if result.report.is_compatible { "yes" } else { "no" });
        println!("    Errors:     {}", result.stats.errors);
        println!("    Warnings:   {}", result.stats.warnings);
    }
}

fn output_json(results: &[CheckResult]) {
    let output = serde_json::json!({
        "results": results,
        "summary": {
            "total_builds": results.len(),
            "compatible": results.iter().filter(|r| r.report.is_compatible).count(),
            "total_issues": results.iter().map(|r| r.total_issues()).sum::<usize>(),
            "errors": results.iter().map(|r| r.stats.errors).sum::<usize>(),
        }
    });

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to render JSON: {}", e),
    }
}

fn output_github(results: &[CheckResult]) {
    for result in results {
        for issue in &result.report.issues {
            let level = match issue.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            };
            let file = result
                .file
                .as_ref()
                .map(|f| format!("file={},", f.display()))
                .unwrap_or_default();
            println!(
                "::{} {}title={}::{}",
                level,
                file,
                issue.rule_name,
                issue.message.replace('\n', " ")
            );
        }
    }
}

fn handle_rules(rules_file: Option<&Path>, verbose: bool) -> i32 {
    let options = CheckOptions {
        rules_file: rules_file.map(Path::to_path_buf),
        ..CheckOptions::default()
    };

    let rules = match RigCheckCore::resolve_rules(&options) {
        Ok(rules) => rules,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    tracing::debug!("Listing {} rule(s)", rules.len());
    println!("Available compatibility rules:\n");

    for rule in &rules {
        let status = if rule.active { "" } else { " (inactive)" };
        println!("  {}{}", rule.name, status);
        println!(
            "    {}.{} {} {}.{} [{}]",
            rule.category_a,
            rule.attribute_a,
            rule.operator,
            rule.category_b,
            rule.attribute_b,
            rule.severity
        );
        if verbose {
            if let Some(description) = &rule.description {
                println!("    {}", description);
            }
            println!("    Message: {}", rule.error_message);
        }
        println!();
    }

    println!("  PSU Wattage");
    println!("    total tdp vs psu.wattage (built in)");
    if verbose {
        println!("    Errors when the PSU cannot cover total TDP, warns below the headroom target.");
    }
    0
}
