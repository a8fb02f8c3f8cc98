//! Clock name decoding.

use clap::Args;
use tdmroute_core::clock;

#[derive(Args)]
pub struct ClockArgs {
    /// Clock names, e.g. mst_b_mclk
    #[arg(required = true)]
    names: Vec<String>,
}

pub fn run(args: ClockArgs) -> anyhow::Result<()> {
    for name in &args.names {
        match clock::try_resolve(name) {
            Some(id) => println!("{name:16} {id}"),
            None => println!("{name:16} 0 (no divider matches)"),
        }
    }
    Ok(())
}
