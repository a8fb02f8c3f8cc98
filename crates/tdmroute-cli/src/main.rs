//! tdmroute CLI - run routing scenarios against the simulated S4 blocks.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tdmroute")]
#[command(author, version, about = "S4 TDM output routing simulator", long_about = None)]
struct Cli {
    /// Log routing decisions (repeat for register-level tracing)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a built-in scenario or a scenario file
    Run(commands::run::RunArgs),

    /// List built-in scenarios
    Scenarios(commands::scenarios::ScenariosArgs),

    /// Show the widgets and routes of a routing block
    Topology(commands::topology::TopologyArgs),

    /// Show the index carried by route labels
    Label(commands::label::LabelArgs),

    /// Show the select value of clock names
    Clock(commands::clock::ClockArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Scenarios(args) => commands::scenarios::run(args),
        Commands::Topology(args) => commands::topology::run(args),
        Commands::Label(args) => commands::label::run(args),
        Commands::Clock(args) => commands::clock::run(args),
    }
}
