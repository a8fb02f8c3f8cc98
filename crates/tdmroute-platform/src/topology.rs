//! Static widget/route tables and their instantiation into a graph.
//!
//! Each routing block publishes its widgets and routes as `'static` tables,
//! built in `const` context. A route is `(sink, control, source)`: `control`
//! names the selector value that switches the path on, or is `None` for a
//! fixed connection.
//!
//! Instantiating a topology adds every widget, then every route. Controlled
//! routes start disconnected; fixed routes start connected. Routes that name
//! widgets outside the table (for example a backend's playback widget) are
//! resolved against the graph at instantiation time.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use tdmroute_core::graph::{AudioGraph, GraphError, PathId, RoutingGraph, WidgetId, WidgetKind};

/// One widget declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetTemplate {
    /// Widget name, unique within the graph.
    pub name: &'static str,
    /// Widget kind.
    pub kind: WidgetKind,
}

impl WidgetTemplate {
    /// Declares a widget.
    pub const fn new(name: &'static str, kind: WidgetKind) -> Self {
        Self { name, kind }
    }
}

/// One route declaration, `(sink, control, source)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteTemplate {
    /// Destination widget name.
    pub sink: &'static str,
    /// Selector value enabling the path, `None` for a fixed path.
    pub control: Option<&'static str>,
    /// Origin widget name.
    pub source: &'static str,
}

impl RouteTemplate {
    /// A path switched by the selector value `control`.
    pub const fn controlled(sink: &'static str, control: &'static str, source: &'static str) -> Self {
        Self {
            sink,
            control: Some(control),
            source,
        }
    }

    /// An always-present path.
    pub const fn fixed(sink: &'static str, source: &'static str) -> Self {
        Self {
            sink,
            control: None,
            source,
        }
    }
}

/// A routing block's widget and route tables.
#[derive(Debug, Clone, Copy)]
pub struct Topology {
    /// Block name, as used in logs and scenario files.
    pub name: &'static str,
    /// Widget declarations, in creation order.
    pub widgets: &'static [WidgetTemplate],
    /// Route declarations, in creation order.
    pub routes: &'static [RouteTemplate],
}

impl Topology {
    /// Adds the topology to `graph`.
    ///
    /// Returns the ids of the created widgets, in table order, and of the
    /// created paths, in route order. Fails without rolling back if a widget
    /// name is taken or a route names an unknown widget.
    pub fn instantiate(
        &self,
        graph: &mut RoutingGraph,
    ) -> Result<(Vec<WidgetId>, Vec<PathId>), GraphError> {
        let mut widgets = Vec::with_capacity(self.widgets.len());
        for template in self.widgets {
            widgets.push(graph.add_widget(template.name, template.kind)?);
        }

        let mut paths = Vec::with_capacity(self.routes.len());
        for route in self.routes {
            let source = graph.widget_id(route.source)?;
            let sink = graph.widget_id(route.sink)?;
            paths.push(graph.connect(source, sink, route.control, route.control.is_none())?);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "topology: instantiated '{}' ({} widgets, {} routes)",
            self.name,
            widgets.len(),
            paths.len()
        );
        Ok((widgets, paths))
    }

    /// Looks up a widget of this topology in `graph`.
    pub fn locate(graph: &dyn AudioGraph, name: &str) -> Result<WidgetId, GraphError> {
        graph
            .find_widget(name)
            .ok_or_else(|| GraphError::WidgetNameNotFound(name.into()))
    }

    /// Returns the widget template named `name`.
    pub fn widget(&self, name: &str) -> Option<&WidgetTemplate> {
        self.widgets.iter().find(|w| w.name == name)
    }

    /// Selector values of the routes whose source or sink is `widget`.
    pub fn controls_of<'a>(&'a self, widget: &'a str) -> impl Iterator<Item = &'static str> + 'a {
        self.routes
            .iter()
            .filter(move |r| r.source == widget || r.sink == widget)
            .filter_map(|r| r.control)
    }
}
