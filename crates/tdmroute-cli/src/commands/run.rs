//! Scenario runner.
//!
//! Builds the scenario's graph, delivers its events, and prints every register
//! update along with the final register contents.

use clap::Args;
use std::path::{Path, PathBuf};
use tdmroute_config::{
    ConfigError, Outcome, Scenario, Session, SessionReport, WriteRecord, get_builtin_scenario,
};

#[derive(Args)]
pub struct RunArgs {
    /// Built-in scenario name or path to a scenario TOML file
    scenario: String,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Only print registers that are not zero
    #[arg(long)]
    nonzero: bool,

    /// Write the resolved scenario as TOML before running it
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let scenario = find_scenario(&args.scenario)?;
    if let Some(path) = &args.save {
        scenario.save(path)?;
        tracing::info!("saved scenario '{}' to {}", scenario.name, path.display());
        eprintln!("Saved scenario to {}", path.display());
    }

    let mut session = Session::from_scenario(&scenario)?;
    let report = session.run()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&scenario, &report, args.nonzero);
    }

    if !report.all_ok() {
        tracing::warn!("scenario '{}' had vetoed events", report.scenario);
        std::process::exit(1);
    }
    Ok(())
}

/// Looks up a built-in scenario first, then a file.
fn find_scenario(name: &str) -> Result<Scenario, ConfigError> {
    if let Some(scenario) = get_builtin_scenario(name) {
        tracing::debug!("using built-in scenario '{}'", scenario.name);
        return Ok(scenario);
    }

    let path = Path::new(name);
    if path.exists() {
        let scenario = Scenario::load(path)?;
        tracing::info!("loaded scenario '{}' from {}", scenario.name, path.display());
        return Ok(scenario);
    }

    Err(ConfigError::ScenarioNotFound(name.to_string()))
}

fn print_report(scenario: &Scenario, report: &SessionReport, nonzero: bool) {
    println!("Scenario: {} ({})", report.scenario, report.component);
    if let Some(desc) = &scenario.description {
        println!("  {desc}");
    }
    println!();

    if !report.setup.is_empty() {
        println!("Setup:");
        print_writes(&report.setup);
        println!();
    }

    println!("Events:");
    for (i, step) in report.steps.iter().enumerate() {
        let status = match &step.outcome {
            Outcome::Ok => "ok".to_string(),
            Outcome::Error { message, errno, .. } => format!("error {errno}: {message}"),
        };
        println!(
            "  [{i}] {:14} {:8} -> {} ({})",
            step.widget, step.event, status, step.state
        );
        print_writes(&step.writes);
    }
    println!();

    println!("Registers:");
    for reg in &report.registers {
        if nonzero && reg.value == 0 {
            continue;
        }
        println!("  {:#06x}: {:#010x}", reg.reg, reg.value);
    }
}

fn print_writes(writes: &[WriteRecord]) {
    for w in writes {
        println!(
            "        {:#06x} mask {:#010x} <- {:#010x}",
            w.reg, w.mask, w.value
        );
    }
}
