//! Upstream search for the backend endpoint feeding a routing widget.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use super::widget::{WidgetId, WidgetKind};
use super::AudioGraph;
use crate::stream::BackendEndpoint;

/// DAI id shared by every TDM interface backend.
pub const TDM_IFACE: u32 = 0;

/// Finds the backend endpoint driving `start`.
///
/// Walks connected paths against the direction of signal flow, depth first,
/// in graph order. A backend widget directly upstream of `start` is returned
/// as is. A backend found further up is only accepted if its DAI id is
/// [`TDM_IFACE`]; otherwise the branch that reached it is abandoned and the
/// search continues with the next sibling path one level up.
///
/// Returns `None` when no connected path leads to an accepted backend, which
/// means the routing cannot be determined yet (disconnected or mid-transition
/// topology), not that the graph is broken.
///
/// Exactly one live backend is expected upstream. With several, the first one
/// in search order wins.
pub fn find_backend<G: AudioGraph + ?Sized>(graph: &G, start: WidgetId) -> Option<&BackendEndpoint> {
    let mut visited = vec![false; graph.widget_count()];
    mark(&mut visited, start);

    // Each frame is (widget, index of the next source path to visit).
    let mut stack: Vec<(WidgetId, usize)> = vec![(start, 0)];

    while let Some(frame) = stack.last_mut() {
        let (current, cursor) = *frame;
        let Some(&path_id) = graph.source_paths(current).get(cursor) else {
            stack.pop();
            continue;
        };
        frame.1 += 1;

        let Some(path) = graph.path(path_id) else {
            continue;
        };
        if !path.is_connected() {
            continue;
        }
        let source = path.source();
        let Some(widget) = graph.widget(source) else {
            continue;
        };

        if widget.kind() == WidgetKind::Backend {
            let Some(backend) = widget.backend().and_then(|id| graph.backend(id)) else {
                continue;
            };
            if stack.len() == 1 || backend.id() == TDM_IFACE {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "find_backend: {} reached '{}' at depth {}",
                    start,
                    backend.name(),
                    stack.len()
                );
                return Some(backend);
            }
            // Non-TDM backend behind an intermediate widget: give up on it.
            stack.pop();
            continue;
        }

        if mark(&mut visited, source) {
            stack.push((source, 0));
        }
    }

    None
}

/// Marks `id` visited. Returns false if it already was (or is out of range).
fn mark(visited: &mut [bool], id: WidgetId) -> bool {
    match visited.get_mut(id.index() as usize) {
        Some(seen) if !*seen => {
            *seen = true;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RoutingGraph;
    use crate::stream::{Interface, Stream};

    fn backend(name: &str, id: u32, widget: &str) -> BackendEndpoint {
        BackendEndpoint::new(name, id, widget)
            .with_playback(Stream::new(2, 2, Interface::new("mst_a_mclk", "mst_a_sclk")))
    }

    #[test]
    fn direct_backend() {
        let mut graph = RoutingGraph::new();
        let be = graph.add_backend(backend("TDM-A", 0, "TDM_A Playback")).unwrap();
        let sel = graph.add_widget("SEL", WidgetKind::Demux).unwrap();
        graph.connect(be, sel, None, true).unwrap();

        let found = find_backend(&graph, sel).unwrap();
        assert_eq!(found.name(), "TDM-A");
    }

    #[test]
    fn direct_backend_accepted_regardless_of_id() {
        let mut graph = RoutingGraph::new();
        let be = graph.add_backend(backend("SPDIF", 3, "SPDIF Playback")).unwrap();
        let sel = graph.add_widget("SEL", WidgetKind::Demux).unwrap();
        graph.connect(be, sel, None, true).unwrap();
        assert_eq!(find_backend(&graph, sel).unwrap().name(), "SPDIF");
    }

    #[test]
    fn backend_through_intermediate_widgets() {
        let mut graph = RoutingGraph::new();
        let be = graph.add_backend(backend("TDM-B", 0, "TDM_B Playback")).unwrap();
        let aif = graph.add_widget("TDMB", WidgetKind::Input).unwrap();
        let input_src = graph.add_widget("INPUT SRC", WidgetKind::Mux).unwrap();
        let lane = graph.add_widget("Lane3", WidgetKind::Generic).unwrap();
        let lane_src = graph.add_widget("Lane SRC", WidgetKind::Mux).unwrap();
        graph.connect(be, aif, None, true).unwrap();
        graph.connect(aif, input_src, Some("TDMB"), true).unwrap();
        graph.connect(input_src, lane, None, true).unwrap();
        graph.connect(lane, lane_src, Some("Lane3"), true).unwrap();

        assert_eq!(find_backend(&graph, lane_src).unwrap().name(), "TDM-B");
    }

    #[test]
    fn disconnected_paths_are_ignored() {
        let mut graph = RoutingGraph::new();
        let be = graph.add_backend(backend("TDM-A", 0, "TDM_A Playback")).unwrap();
        let sel = graph.add_widget("SEL", WidgetKind::Demux).unwrap();
        let p = graph.connect(be, sel, None, false).unwrap();
        assert!(find_backend(&graph, sel).is_none());

        graph.set_connected(p, true).unwrap();
        assert!(find_backend(&graph, sel).is_some());
    }

    #[test]
    fn no_backend_upstream() {
        let mut graph = RoutingGraph::new();
        let input = graph.add_widget("IN", WidgetKind::Input).unwrap();
        let sel = graph.add_widget("SEL", WidgetKind::Demux).unwrap();
        graph.connect(input, sel, None, true).unwrap();
        assert!(find_backend(&graph, sel).is_none());
    }

    #[test]
    fn deep_non_tdm_backend_is_skipped_for_next_sibling() {
        let mut graph = RoutingGraph::new();
        let other = graph.add_backend(backend("PDM", 2, "PDM Playback")).unwrap();
        let tdm = graph.add_backend(backend("TDM-C", 0, "TDM_C Playback")).unwrap();
        let via_other = graph.add_widget("VIA_OTHER", WidgetKind::Generic).unwrap();
        let via_tdm = graph.add_widget("VIA_TDM", WidgetKind::Generic).unwrap();
        let sel = graph.add_widget("SEL", WidgetKind::Mux).unwrap();
        graph.connect(other, via_other, None, true).unwrap();
        graph.connect(tdm, via_tdm, None, true).unwrap();
        graph.connect(via_other, sel, None, true).unwrap();
        graph.connect(via_tdm, sel, None, true).unwrap();

        assert_eq!(find_backend(&graph, sel).unwrap().name(), "TDM-C");
    }

    #[test]
    fn cycles_terminate() {
        let mut graph = RoutingGraph::new();
        let a = graph.add_widget("A", WidgetKind::Mixer).unwrap();
        let b = graph.add_widget("B", WidgetKind::Mixer).unwrap();
        graph.connect(a, b, None, true).unwrap();
        graph.connect(b, a, None, true).unwrap();
        assert!(find_backend(&graph, b).is_none());
    }

    #[test]
    fn first_branch_wins_on_fan_in() {
        let mut graph = RoutingGraph::new();
        let a = graph.add_backend(backend("TDM-A", 0, "TDM_A Playback")).unwrap();
        let b = graph.add_backend(backend("TDM-B", 0, "TDM_B Playback")).unwrap();
        let sel = graph.add_widget("SEL", WidgetKind::Mux).unwrap();
        graph.connect(a, sel, None, true).unwrap();
        graph.connect(b, sel, None, true).unwrap();
        assert_eq!(find_backend(&graph, sel).unwrap().name(), "TDM-A");
    }

    #[test]
    fn unknown_start_widget() {
        let graph = RoutingGraph::new();
        assert!(find_backend(&graph, WidgetId(4)).is_none());
    }
}
