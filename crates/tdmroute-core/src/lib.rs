//! TDMRoute Core - routing primitives for multi-lane TDM audio interconnects
//!
//! This crate provides the building blocks shared by every TDM routing
//! component: a read-only view of the audio widget graph, the upstream search
//! for the active hardware backend, the small label/clock parsers that turn
//! topology strings into hardware indices, and the register field model the
//! resolvers write through.
//!
//! # Core Abstractions
//!
//! ## Audio Graph
//!
//! - [`AudioGraph`] - Read-only trait over widgets and paths owned by the
//!   power-sequencing engine
//! - [`RoutingGraph`] - Arena implementation used by simulation and tests
//! - [`find_backend`] - Upstream depth-first search for the live backend
//!
//! ## Registers
//!
//! - [`RegField`] - Inclusive bit range inside a 32-bit register
//! - [`RegisterMap`] - Read-modify-write contract of the register collaborator
//! - [`RegisterFile`] - In-memory register file with a write log
//! - [`RoutingAssignment`] - Ordered register updates produced by a resolver
//!
//! ## Events
//!
//! - [`PowerEvent`] - Power-sequencing events delivered per widget
//! - [`Component`] - Object-safe event handler implemented by routing components
//! - [`ResolverState`] - Per-component resolution state
//!
//! ## Parsers
//!
//! - [`label::parse_index`] - Extracts the pin/lane number embedded in a label
//! - [`clock::resolve`] - Maps a clock name to its hardware select value
//! - [`TdmSource`] - Identifies the TDM interface instance behind a backend
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (with `alloc`) so the same routing code
//! can run inside firmware. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! tdmroute-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use tdmroute_core::{RoutingGraph, WidgetKind, BackendEndpoint, Stream, Interface, find_backend};
//!
//! let mut graph = RoutingGraph::new();
//! let be = graph
//!     .add_backend(BackendEndpoint::new("TDM-A", 0, "TDM_A Playback"))
//!     .unwrap();
//! let sel = graph.add_widget("TDMA_OUT SEL", WidgetKind::Demux).unwrap();
//! graph.connect(be, sel, None, true).unwrap();
//!
//! let found = find_backend(&graph, sel).unwrap();
//! assert_eq!(found.playback_widget(), "TDM_A Playback");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod clock;
pub mod error;
pub mod event;
pub mod graph;
pub mod label;
pub mod regmap;
pub mod source;
pub mod stream;

// Re-export main types at crate root
pub use error::RouteError;
pub use event::{Component, PowerEvent, ResolverState};
pub use graph::{
    AudioGraph, BackendId, GraphError, Path, PathId, RoutingGraph, TDM_IFACE, Widget, WidgetId,
    WidgetKind, find_backend,
};
pub use regmap::{
    REG_STRIDE, RegField, RegisterFile, RegisterMap, RegisterWrite, RegmapConfig,
    RoutingAssignment,
};
pub use source::TdmSource;
pub use stream::{BackendEndpoint, Interface, Stream, lane_count};
