//! Routing block topology listing.

#![allow(clippy::print_literal)]

use clap::Args;
use tdmroute_platform::Block;

#[derive(Args)]
pub struct TopologyArgs {
    /// Routing block (pad-out or tocodec)
    #[arg(value_name = "BLOCK")]
    block: String,

    /// Also list every route
    #[arg(long)]
    routes: bool,
}

pub fn run(args: TopologyArgs) -> anyhow::Result<()> {
    let block: Block = args
        .block
        .parse()
        .map_err(|e| anyhow::anyhow!("Unknown block '{}': {}", args.block, e))?;
    let topology = block.topology();
    let regmap = block.regmap_config();

    println!("{}", topology.name);
    println!("{}", "=".repeat(topology.name.len()));
    println!(
        "{} widgets, {} routes, {} registers",
        topology.widgets.len(),
        topology.routes.len(),
        regmap.register_count()
    );
    println!();

    println!("  {:16}  {:10}  {}", "Widget", "Kind", "Controls");
    println!("  {:16}  {:10}  {}", "------", "----", "--------");
    for widget in topology.widgets {
        let controls: Vec<_> = topology.controls_of(widget.name).collect();
        let controls = if controls.len() > 4 {
            format!("{} .. {} ({})", controls[0], controls[controls.len() - 1], controls.len())
        } else {
            controls.join(", ")
        };
        println!("  {:16}  {:10}  {}", widget.name, widget.kind.name(), controls);
    }

    if args.routes {
        println!();
        println!("Routes:");
        for route in topology.routes {
            match route.control {
                Some(control) => println!("  {} <- [{}] <- {}", route.sink, control, route.source),
                None => println!("  {} <- {}", route.sink, route.source),
            }
        }
    }
    Ok(())
}
