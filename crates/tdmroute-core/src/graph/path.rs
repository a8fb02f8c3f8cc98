//! Directed connections between widgets.
//!
//! A path carries signal from its source widget to its sink widget. Mux and
//! demux paths carry the label of the control value that selects them
//! (`"TDM_D5"`, `"Lane3"`); the engine flips `connected` as selections and
//! power state change.

#[cfg(not(feature = "std"))]
use alloc::string::String;

use super::widget::WidgetId;

/// Stable identifier of a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathId(pub(crate) u32);

impl PathId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for PathId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "PathId({})", self.0)
    }
}

/// A directed edge of the audio graph.
#[derive(Debug, Clone)]
pub struct Path {
    pub(crate) source: WidgetId,
    pub(crate) sink: WidgetId,
    pub(crate) connected: bool,
    pub(crate) label: Option<String>,
}

impl Path {
    /// Upstream widget.
    pub fn source(&self) -> WidgetId {
        self.source
    }

    /// Downstream widget.
    pub fn sink(&self) -> WidgetId {
        self.sink
    }

    /// Whether the path currently carries signal.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Control label selecting this path, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}
