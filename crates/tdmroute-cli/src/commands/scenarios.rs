//! Built-in scenario listing.

use clap::Args;
use tdmroute_config::{builtin_scenarios, get_builtin_scenario};

#[derive(Args)]
pub struct ScenariosArgs {
    /// Print a scenario's TOML instead of the listing
    #[arg(value_name = "NAME")]
    name: Option<String>,
}

pub fn run(args: ScenariosArgs) -> anyhow::Result<()> {
    if let Some(name) = &args.name {
        let scenario = get_builtin_scenario(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown scenario: {}", name))?;
        print!("{}", scenario.to_toml()?);
        return Ok(());
    }

    println!("Built-in Scenarios:");
    println!("===================");
    for scenario in builtin_scenarios() {
        let desc = scenario.description.as_deref().unwrap_or("");
        println!("  {:22} {:8} - {}", scenario.name, scenario.component, desc);
    }
    println!();
    println!("Run one with: tdmroute run <name>");
    Ok(())
}
