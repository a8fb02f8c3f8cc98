//! TDMRoute Platform - S4 TDM routing components
//!
//! This crate provides the two routing blocks of the S4 audio subsystem as
//! [`Component`]s: their static widget/route tables and the resolvers that
//! turn a powered-up graph into register updates.
//!
//! # Blocks
//!
//! - [`pad_out`] - Per-pad demux. Each TDM instance can drive any subset of
//!   the 32 data pads; lanes are handed out in graph order.
//! - [`tocodec`] - Lane mux feeding the internal codec. One lane of one TDM
//!   instance, plus clock selects and clock gating.
//!
//! # Topology Tables
//!
//! [`Topology`] holds a block's widgets and routes as `'static` data;
//! [`Topology::instantiate`] adds them to a [`RoutingGraph`].
//!
//! # no_std Support
//!
//! Like `tdmroute-core`, this crate is `no_std` compatible (with `alloc`).
//!
//! # Example
//!
//! ```rust
//! use tdmroute_core::{BackendEndpoint, Interface, RegisterFile, RegisterMap, Stream};
//! use tdmroute_core::{Component, PowerEvent, RoutingGraph};
//! use tdmroute_platform::pad_out::{PAD_REGMAP, PadOutComponent};
//!
//! let mut graph = RoutingGraph::new();
//! let mut pads = PadOutComponent::attach(&mut graph).unwrap();
//!
//! let stream = Stream::new(4, 4, Interface::new("mst_a_mclk", "mst_a_sclk"));
//! let be = graph
//!     .add_backend(BackendEndpoint::new("TDM-A", 0, "TDM_A Playback").with_playback(stream))
//!     .unwrap();
//! let sel = pads.selectors()[0];
//! graph.connect(be, sel, None, true).unwrap();
//! graph.select(sel, "TDM_D5").unwrap();
//!
//! let mut regs = RegisterFile::new(PAD_REGMAP);
//! regs.preload(0x4, 0x1F00);
//! pads.handle_event(&graph, &mut regs, sel, PowerEvent::PrePowerUp).unwrap();
//! assert_eq!(regs.read(0x4), 0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;

use core::fmt;
use core::str::FromStr;

pub mod pad_out;
pub mod tocodec;
pub mod topology;

// Re-export tdmroute-core types for convenience
pub use tdmroute_core::{Component, PowerEvent, ResolverState, RouteError, RoutingGraph};

// Re-export main types at crate root
pub use pad_out::{PadAssignment, PadOutComponent, PinRoute, plan_pads};
pub use tocodec::{LaneAssignment, ToCodecComponent, ToCodecFields, clk_enable, plan_lane};
pub use topology::{RouteTemplate, Topology, WidgetTemplate};

use tdmroute_core::RegmapConfig;
use tdmroute_core::graph::GraphError;

/// The routing blocks of the S4 audio subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Block {
    /// Data pad output demuxes.
    PadOut,
    /// TDM to internal codec bridge.
    ToCodec,
}

impl Block {
    /// All blocks.
    pub const ALL: [Self; 2] = [Self::PadOut, Self::ToCodec];

    /// Name used in scenario files and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::PadOut => "pad-out",
            Self::ToCodec => "tocodec",
        }
    }

    /// Widget and route tables.
    pub fn topology(self) -> &'static Topology {
        match self {
            Self::PadOut => &pad_out::PAD_OUT_TOPOLOGY,
            Self::ToCodec => &tocodec::TOCODEC_TOPOLOGY,
        }
    }

    /// Register geometry.
    pub const fn regmap_config(self) -> RegmapConfig {
        match self {
            Self::PadOut => pad_out::PAD_REGMAP,
            Self::ToCodec => tocodec::TOCODEC_REGMAP,
        }
    }

    /// Adds the block to `graph` and returns its component.
    ///
    /// `fields` only applies to [`Block::ToCodec`].
    pub fn attach(
        self,
        graph: &mut RoutingGraph,
        fields: ToCodecFields,
    ) -> Result<Box<dyn Component>, GraphError> {
        Ok(match self {
            Self::PadOut => Box::new(PadOutComponent::attach(graph)?),
            Self::ToCodec => Box::new(ToCodecComponent::attach(graph, fields)?),
        })
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown block name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseBlockError;

impl fmt::Display for ParseBlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected 'pad-out' or 'tocodec'")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseBlockError {}

impl FromStr for Block {
    type Err = ParseBlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|block| block.name().eq_ignore_ascii_case(s))
            .ok_or(ParseBlockError)
    }
}
