//! Route label decoding.

use clap::Args;
use tdmroute_core::label::parse_index;

#[derive(Args)]
pub struct LabelArgs {
    /// Route labels, e.g. TDM_D17 or Lane3
    #[arg(required = true)]
    labels: Vec<String>,
}

pub fn run(args: LabelArgs) -> anyhow::Result<()> {
    for label in &args.labels {
        println!("{label:16} {}", parse_index(label));
    }
    Ok(())
}
