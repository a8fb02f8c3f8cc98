//! Widget records of the routing graph.
//!
//! A widget is one node of the audio path graph: a pad, a mux, a lane driver,
//! or the endpoint of a hardware backend. Widgets are created by the
//! power-sequencing engine and referenced by [`WidgetId`]; resolvers only hold
//! them for the duration of one event.

#[cfg(not(feature = "std"))]
use alloc::string::String;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use super::path::PathId;

/// Stable identifier of a widget.
///
/// Widget IDs are assigned sequentially and never reused within a graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub(crate) u32);

impl WidgetId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "WidgetId({})", self.0)
    }
}

/// Identifier of a backend endpoint record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendId(pub(crate) u32);

impl BackendId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// The role of a widget in the audio path graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// Signal entry point (audio interface input).
    Input,
    /// Signal exit point (physical pad or codec-facing output).
    Output,
    /// Selects one of several sources.
    Mux,
    /// Routes one source to a selected set of sinks.
    Demux,
    /// Sums several sources.
    Mixer,
    /// Playback endpoint of a hardware backend interface.
    Backend,
    /// Any other widget (switches, drivers, supplies).
    Generic,
}

impl WidgetKind {
    /// Short lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::Mux => "mux",
            Self::Demux => "demux",
            Self::Mixer => "mixer",
            Self::Backend => "backend",
            Self::Generic => "generic",
        }
    }
}

/// A widget and its adjacency.
#[derive(Debug, Clone)]
pub struct Widget {
    pub(crate) name: String,
    pub(crate) kind: WidgetKind,
    pub(crate) backend: Option<BackendId>,
    /// Paths arriving at this widget.
    pub(crate) incoming: Vec<PathId>,
    /// Paths leaving this widget.
    pub(crate) outgoing: Vec<PathId>,
}

impl Widget {
    pub(crate) fn new(name: String, kind: WidgetKind, backend: Option<BackendId>) -> Self {
        Self {
            name,
            kind,
            backend,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    /// Widget name, unique within a graph.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Widget role.
    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    /// Backend endpoint this widget represents, for [`WidgetKind::Backend`].
    pub fn backend(&self) -> Option<BackendId> {
        self.backend
    }
}
