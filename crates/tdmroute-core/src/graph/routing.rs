//! Arena-backed audio graph with the engine-side mutation API.
//!
//! [`RoutingGraph`] stands in for the power-sequencing engine's widget graph:
//! it owns the widget, path, and backend arenas, lets callers flip path
//! connections the way control selections do, and attaches or detaches
//! backend playback streams. Resolvers only ever see it as `&dyn AudioGraph`.

#[cfg(not(feature = "std"))]
use alloc::{string::String, string::ToString, vec::Vec};

use super::path::{Path, PathId};
use super::widget::{BackendId, Widget, WidgetId, WidgetKind};
use super::{AudioGraph, GraphError};
use crate::stream::{BackendEndpoint, Stream};

/// Widget/path arena implementing [`AudioGraph`].
///
/// # Usage
///
/// 1. Create with [`new()`](Self::new)
/// 2. Add widgets: [`add_widget()`](Self::add_widget),
///    [`add_backend()`](Self::add_backend)
/// 3. Connect: [`connect()`](Self::connect)
/// 4. Drive selections: [`select()`](Self::select),
///    [`set_selection()`](Self::set_selection),
///    [`set_connected()`](Self::set_connected)
/// 5. Attach streams: [`set_playback_stream()`](Self::set_playback_stream)
#[derive(Debug, Clone, Default)]
pub struct RoutingGraph {
    widgets: Vec<Widget>,
    paths: Vec<Path>,
    backends: Vec<BackendEndpoint>,
}

impl RoutingGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of widgets.
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Returns true if the graph has no widgets.
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Number of paths.
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Iterates widgets with their ids, in creation order.
    pub fn widgets(&self) -> impl Iterator<Item = (WidgetId, &Widget)> {
        self.widgets
            .iter()
            .enumerate()
            .map(|(i, w)| (WidgetId(i as u32), w))
    }

    /// Iterates paths with their ids, in creation order.
    pub fn paths(&self) -> impl Iterator<Item = (PathId, &Path)> {
        self.paths
            .iter()
            .enumerate()
            .map(|(i, p)| (PathId(i as u32), p))
    }

    // --- Widget mutations ---

    /// Adds a widget. Returns its id.
    ///
    /// Names are unique. Backend widgets go through
    /// [`add_backend()`](Self::add_backend).
    pub fn add_widget(
        &mut self,
        name: impl Into<String>,
        kind: WidgetKind,
    ) -> Result<WidgetId, GraphError> {
        let name = name.into();
        if kind == WidgetKind::Backend {
            return Err(GraphError::MissingEndpoint(name));
        }
        self.push_widget(Widget::new(name, kind, None))
    }

    /// Adds a backend endpoint and its playback widget. Returns the widget id.
    ///
    /// The widget is named after the endpoint's playback widget name.
    pub fn add_backend(&mut self, endpoint: BackendEndpoint) -> Result<WidgetId, GraphError> {
        let name = endpoint.playback_widget().to_string();
        if self.find_widget(&name).is_some() {
            return Err(GraphError::DuplicateWidget(name));
        }
        let backend = BackendId(self.backends.len() as u32);
        self.backends.push(endpoint);
        self.push_widget(Widget::new(name, WidgetKind::Backend, Some(backend)))
    }

    fn push_widget(&mut self, widget: Widget) -> Result<WidgetId, GraphError> {
        if self.find_widget(&widget.name).is_some() {
            return Err(GraphError::DuplicateWidget(widget.name));
        }
        let id = WidgetId(self.widgets.len() as u32);
        #[cfg(feature = "tracing")]
        tracing::trace!("graph_add: {} widget '{}' as {id}", widget.kind.name(), widget.name);
        self.widgets.push(widget);
        Ok(id)
    }

    /// Looks up a widget id by name, failing with a descriptive error.
    pub fn widget_id(&self, name: &str) -> Result<WidgetId, GraphError> {
        self.find_widget(name)
            .ok_or_else(|| GraphError::WidgetNameNotFound(name.to_string()))
    }

    // --- Path mutations ---

    /// Adds a path from `source` to `sink`.
    ///
    /// `label` is the control value that selects the path on a mux/demux, or
    /// `None` for a fixed connection.
    pub fn connect(
        &mut self,
        source: WidgetId,
        sink: WidgetId,
        label: Option<&str>,
        connected: bool,
    ) -> Result<PathId, GraphError> {
        self.get_widget(source)?;
        self.get_widget(sink)?;

        let id = PathId(self.paths.len() as u32);
        self.paths.push(Path {
            source,
            sink,
            connected,
            label: label.map(ToString::to_string),
        });
        self.widgets[source.0 as usize].outgoing.push(id);
        self.widgets[sink.0 as usize].incoming.push(id);

        #[cfg(feature = "tracing")]
        tracing::trace!("graph_connect: {source} -> {sink} ({id})");
        Ok(id)
    }

    /// Sets the connection state of one path.
    pub fn set_connected(&mut self, id: PathId, connected: bool) -> Result<(), GraphError> {
        let path = self
            .paths
            .get_mut(id.0 as usize)
            .ok_or(GraphError::PathNotFound(id))?;
        path.connected = connected;
        Ok(())
    }

    /// Exclusively selects the path labelled `label` on a routing widget.
    ///
    /// Equivalent to [`set_selection()`](Self::set_selection) with one label.
    pub fn select(&mut self, widget: WidgetId, label: &str) -> Result<PathId, GraphError> {
        let selected = self.set_selection(widget, &[label])?;
        Ok(selected[0])
    }

    /// Connects exactly the labelled paths on a widget's selection side and
    /// disconnects every other labelled path there.
    ///
    /// The selection side is the sink side for a [`WidgetKind::Demux`] and the
    /// source side for every other kind. Unlabelled paths are left alone.
    /// Returns the ids of the selected paths, in `labels` order.
    pub fn set_selection(
        &mut self,
        widget: WidgetId,
        labels: &[&str],
    ) -> Result<Vec<PathId>, GraphError> {
        let data = self.get_widget(widget)?;
        let side = if data.kind == WidgetKind::Demux {
            data.outgoing.clone()
        } else {
            data.incoming.clone()
        };

        let mut selected = Vec::with_capacity(labels.len());
        for label in labels {
            let found = side
                .iter()
                .copied()
                .find(|p| self.paths[p.0 as usize].label.as_deref() == Some(*label));
            match found {
                Some(id) => selected.push(id),
                None => {
                    return Err(GraphError::LabelNotFound {
                        widget: data.name.clone(),
                        label: (*label).to_string(),
                    });
                }
            }
        }

        for id in side {
            let path = &mut self.paths[id.0 as usize];
            if path.label.is_some() {
                path.connected = selected.contains(&id);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_select: {widget} -> {labels:?}");
        Ok(selected)
    }

    // --- Backend state ---

    /// Attaches (`Some`) or detaches (`None`) the playback stream of the
    /// backend represented by `widget`.
    pub fn set_playback_stream(
        &mut self,
        widget: WidgetId,
        stream: Option<Stream>,
    ) -> Result<(), GraphError> {
        let backend = self
            .get_widget(widget)?
            .backend
            .ok_or(GraphError::NotABackend(widget))?;
        self.backends[backend.0 as usize].set_playback(stream);
        Ok(())
    }

    fn get_widget(&self, id: WidgetId) -> Result<&Widget, GraphError> {
        self.widgets
            .get(id.0 as usize)
            .ok_or(GraphError::WidgetNotFound(id))
    }
}

impl AudioGraph for RoutingGraph {
    fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id.0 as usize)
    }

    fn path(&self, id: PathId) -> Option<&Path> {
        self.paths.get(id.0 as usize)
    }

    fn source_paths(&self, id: WidgetId) -> &[PathId] {
        self.widgets
            .get(id.0 as usize)
            .map_or(&[], |w| w.incoming.as_slice())
    }

    fn sink_paths(&self, id: WidgetId) -> &[PathId] {
        self.widgets
            .get(id.0 as usize)
            .map_or(&[], |w| w.outgoing.as_slice())
    }

    fn backend(&self, id: BackendId) -> Option<&BackendEndpoint> {
        self.backends.get(id.0 as usize)
    }

    fn find_widget(&self, name: &str) -> Option<WidgetId> {
        self.widgets
            .iter()
            .position(|w| w.name == name)
            .map(|i| WidgetId(i as u32))
    }
}
