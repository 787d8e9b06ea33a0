//! # Generate Command
//!
//! Runs the generation pipeline and prints what changed.

use apigen_core::pipeline::{run, RouteReport};
use apigen_core::strategies::BackendStrategy;
use apigen_core::{AppResult, Config, RegistrationOutcome};
use colored::Colorize;

/// Generates every configured route.
///
/// # Arguments
///
/// * `config` - Loaded configuration with resolved paths.
/// * `strategy` - The backend strategy (e.g. Actix) used for code generation.
pub fn execute(config: &Config, strategy: &impl BackendStrategy) -> AppResult<()> {
    let reports = run(config, strategy)?;

    for report in &reports {
        print_report(report);
    }

    let changed = reports.iter().filter(|r| r.changed()).count();
    println!(
        "{} {} route(s) processed, {} changed",
        "Done:".bold(),
        reports.len(),
        changed
    );
    Ok(())
}

fn print_report(report: &RouteReport) {
    println!(
        "{} {}",
        report.spec.method.cyan().bold(),
        report.path.bold()
    );
    for name in &report.added {
        println!("  {} {}", "+".green(), name);
    }
    match &report.registration {
        RegistrationOutcome::Inserted { statement } => {
            println!("  {} {}", "+".green(), statement);
        }
        RegistrationOutcome::AlreadyPresent if report.added.is_empty() => {
            println!("  {}", "up to date".dimmed());
        }
        RegistrationOutcome::AlreadyPresent => {}
    }
    if report.group.fell_back {
        println!(
            "  {} group '{}' not found, registered on '{}'",
            "!".yellow(),
            report.spec.group,
            report.group.variable
        );
    }
}
