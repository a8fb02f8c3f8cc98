//! Audio path graph view for the routing resolvers.
//!
//! The widget graph belongs to the external power-sequencing engine. Resolvers
//! see it through the read-only [`AudioGraph`] trait: widgets and paths live in
//! arenas indexed by stable ids, and adjacency is expressed as id lists, never
//! as owning links.
//!
//! # Architecture
//!
//! - [`AudioGraph`] - the seam to the engine. Queried, never mutated, by
//!   resolvers.
//! - [`RoutingGraph`] - arena implementation with the engine-side mutation
//!   API (add widgets, connect paths, flip selections, attach streams). Used by
//!   simulation and tests.
//! - [`find_backend`] - upstream depth-first search from a routing widget to
//!   the live backend endpoint.
//!
//! # Example
//!
//! ```rust
//! use tdmroute_core::graph::{RoutingGraph, WidgetKind, connected_sinks};
//!
//! let mut graph = RoutingGraph::new();
//! let sel = graph.add_widget("TDMA_OUT SEL", WidgetKind::Demux).unwrap();
//! let d0 = graph.add_widget("TDM_D0", WidgetKind::Output).unwrap();
//! let d1 = graph.add_widget("TDM_D1", WidgetKind::Output).unwrap();
//! graph.connect(sel, d0, Some("TDM_D0"), false).unwrap();
//! graph.connect(sel, d1, Some("TDM_D1"), false).unwrap();
//!
//! graph.select(sel, "TDM_D1").unwrap();
//! let live: Vec<_> = connected_sinks(&graph, sel).map(|p| p.sink()).collect();
//! assert_eq!(live, vec![d1]);
//! ```

pub mod path;
mod routing;
mod search;
pub mod widget;

pub use path::{Path, PathId};
pub use routing::RoutingGraph;
pub use search::{TDM_IFACE, find_backend};
pub use widget::{BackendId, Widget, WidgetId, WidgetKind};

#[cfg(not(feature = "std"))]
use alloc::string::String;

use crate::stream::BackendEndpoint;

/// Read-only view of the audio path graph.
///
/// Implemented by the power-sequencing engine's graph. Object-safe so
/// components can take `&dyn AudioGraph`.
pub trait AudioGraph {
    /// Upper bound (exclusive) on widget indices.
    fn widget_count(&self) -> usize;

    /// Looks up a widget.
    fn widget(&self, id: WidgetId) -> Option<&Widget>;

    /// Looks up a path.
    fn path(&self, id: PathId) -> Option<&Path>;

    /// Paths arriving at `id`, in graph order. Empty for unknown widgets.
    fn source_paths(&self, id: WidgetId) -> &[PathId];

    /// Paths leaving `id`, in graph order. Empty for unknown widgets.
    fn sink_paths(&self, id: WidgetId) -> &[PathId];

    /// Looks up a backend endpoint record.
    fn backend(&self, id: BackendId) -> Option<&BackendEndpoint>;

    /// Finds a widget by exact name.
    fn find_widget(&self, name: &str) -> Option<WidgetId>;
}

/// Connected paths arriving at `id`, in graph order.
pub fn connected_sources<'g, G: AudioGraph + ?Sized>(
    graph: &'g G,
    id: WidgetId,
) -> impl Iterator<Item = &'g Path> + 'g {
    graph
        .source_paths(id)
        .iter()
        .filter_map(move |&p| graph.path(p))
        .filter(|p| p.is_connected())
}

/// Connected paths leaving `id`, in graph order.
pub fn connected_sinks<'g, G: AudioGraph + ?Sized>(
    graph: &'g G,
    id: WidgetId,
) -> impl Iterator<Item = &'g Path> + 'g {
    graph
        .sink_paths(id)
        .iter()
        .filter_map(move |&p| graph.path(p))
        .filter(|p| p.is_connected())
}

/// Errors from graph mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The specified widget was not found in the graph.
    WidgetNotFound(WidgetId),
    /// No widget carries this name.
    WidgetNameNotFound(String),
    /// The specified path was not found in the graph.
    PathNotFound(PathId),
    /// A widget with this name already exists.
    DuplicateWidget(String),
    /// Backend widgets must be created with an endpoint record.
    MissingEndpoint(String),
    /// The widget is not a backend endpoint.
    NotABackend(WidgetId),
    /// No path of the widget's selection side carries this label.
    LabelNotFound {
        /// Widget whose paths were searched.
        widget: String,
        /// The label that was not found.
        label: String,
    },
}

impl core::fmt::Display for GraphError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::WidgetNotFound(id) => write!(f, "widget {id} not found"),
            Self::WidgetNameNotFound(name) => write!(f, "widget '{name}' not found"),
            Self::PathNotFound(id) => write!(f, "path {id} not found"),
            Self::DuplicateWidget(name) => write!(f, "widget '{name}' already exists"),
            Self::MissingEndpoint(name) => {
                write!(f, "backend widget '{name}' needs an endpoint record")
            }
            Self::NotABackend(id) => write!(f, "widget {id} is not a backend endpoint"),
            Self::LabelNotFound { widget, label } => {
                write!(f, "widget '{widget}' has no path labelled '{label}'")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GraphError {}
