//! Data pad output routing.
//!
//! Each of the 32 data pads `TDM_D0..TDM_D31` has a 5-bit slot selecting which
//! TDM instance and lane drives it. Slots are packed four per register, one per
//! byte. A separate register holds one disable bit per pad.
//!
//! The three `TDMx_OUT SEL` demuxes connect a TDM instance to any subset of the
//! pads. When a demux is about to power up, [`plan_pads`] walks its connected
//! pads in graph order and hands out lanes `0..lane_count`, one per pad.
//!
//! Slot registers are addressed by pad number alone: pad `n` lives at offset
//! `(n / 4) * 4`, bits `(n % 4) * 8 ..+ 5`. The disable bitmap sits at
//! [`EE_AUDIO_DAT_PAD_CTRLF`].

#[cfg(not(feature = "std"))]
use alloc::{string::String, string::ToString, vec::Vec};

use tdmroute_core::graph::{AudioGraph, GraphError, RoutingGraph, WidgetId, WidgetKind, connected_sinks};
use tdmroute_core::{
    Component, PowerEvent, REG_STRIDE, RegField, RegisterMap, RegisterWrite, RegmapConfig,
    ResolverState, RouteError, RoutingAssignment, TdmSource, find_backend, label,
};

use crate::topology::{RouteTemplate, Topology, WidgetTemplate};

/// Pad control register 6.
pub const EE_AUDIO_DAT_PAD_CTRL6: u32 = 0x00;
/// Pad control register 7.
pub const EE_AUDIO_DAT_PAD_CTRL7: u32 = 0x04;
/// Pad control register 8.
pub const EE_AUDIO_DAT_PAD_CTRL8: u32 = 0x08;
/// Pad control register 9.
pub const EE_AUDIO_DAT_PAD_CTRL9: u32 = 0x0c;
/// Pad control register A.
pub const EE_AUDIO_DAT_PAD_CTRLA: u32 = 0x10;
/// Pad control register B.
pub const EE_AUDIO_DAT_PAD_CTRLB: u32 = 0x14;
/// Pad control register C.
pub const EE_AUDIO_DAT_PAD_CTRLC: u32 = 0x1c;
/// Pad control register D.
pub const EE_AUDIO_DAT_PAD_CTRLD: u32 = 0x20;
/// Pad control register E.
pub const EE_AUDIO_DAT_PAD_CTRLE: u32 = 0x24;
/// Pad disable bitmap, bit `n` disables pad `n`.
pub const EE_AUDIO_DAT_PAD_CTRLF: u32 = 0x28;

/// Number of data pads.
pub const PAD_COUNT: usize = 32;
/// Width of one pad slot in bits.
pub const PAD_SLOT_WIDTH: u8 = 5;
/// Pad slots per register.
pub const PADS_PER_REG: u32 = 4;
/// Lanes per TDM instance in the slot value encoding.
pub const LANES_PER_SOURCE: u32 = 8;

/// Register geometry of the pad block.
pub const PAD_REGMAP: RegmapConfig = RegmapConfig::mmio32(EE_AUDIO_DAT_PAD_CTRLF);

/// Output pad names. Also the demux selector values.
pub const PAD_LABELS: [&str; PAD_COUNT] = [
    "TDM_D0", "TDM_D1", "TDM_D2", "TDM_D3", "TDM_D4", "TDM_D5", "TDM_D6", "TDM_D7", "TDM_D8",
    "TDM_D9", "TDM_D10", "TDM_D11", "TDM_D12", "TDM_D13", "TDM_D14", "TDM_D15", "TDM_D16",
    "TDM_D17", "TDM_D18", "TDM_D19", "TDM_D20", "TDM_D21", "TDM_D22", "TDM_D23", "TDM_D24",
    "TDM_D25", "TDM_D26", "TDM_D27", "TDM_D28", "TDM_D29", "TDM_D30", "TDM_D31",
];

/// Demux selectors, one per TDM instance, in [`TdmSource`] order.
pub const PAD_SELECTORS: [&str; 3] = ["TDMA_OUT SEL", "TDMB_OUT SEL", "TDMC_OUT SEL"];

const WIDGET_COUNT: usize = PAD_SELECTORS.len() + PAD_COUNT;
const ROUTE_COUNT: usize = PAD_SELECTORS.len() * PAD_COUNT;

const fn pad_widgets() -> [WidgetTemplate; WIDGET_COUNT] {
    let mut widgets = [WidgetTemplate::new("", WidgetKind::Generic); WIDGET_COUNT];
    let mut i = 0;
    while i < PAD_SELECTORS.len() {
        widgets[i] = WidgetTemplate::new(PAD_SELECTORS[i], WidgetKind::Demux);
        i += 1;
    }
    let mut pin = 0;
    while pin < PAD_COUNT {
        widgets[PAD_SELECTORS.len() + pin] = WidgetTemplate::new(PAD_LABELS[pin], WidgetKind::Output);
        pin += 1;
    }
    widgets
}

const fn pad_routes() -> [RouteTemplate; ROUTE_COUNT] {
    let mut routes = [RouteTemplate::fixed("", ""); ROUTE_COUNT];
    let mut sel = 0;
    while sel < PAD_SELECTORS.len() {
        let mut pin = 0;
        while pin < PAD_COUNT {
            routes[sel * PAD_COUNT + pin] =
                RouteTemplate::controlled(PAD_LABELS[pin], PAD_LABELS[pin], PAD_SELECTORS[sel]);
            pin += 1;
        }
        sel += 1;
    }
    routes
}

static PAD_WIDGETS: [WidgetTemplate; WIDGET_COUNT] = pad_widgets();
static PAD_ROUTES: [RouteTemplate; ROUTE_COUNT] = pad_routes();

/// The pad block's widgets and routes.
pub static PAD_OUT_TOPOLOGY: Topology = Topology {
    name: "pad-out",
    widgets: &PAD_WIDGETS,
    routes: &PAD_ROUTES,
};

/// The 5-bit slot of pad `pin`.
///
/// `pin` must be below [`PAD_COUNT`].
pub const fn pin_slot(pin: u32) -> RegField {
    RegField::with_width(
        (pin / PADS_PER_REG) * REG_STRIDE,
        ((pin % PADS_PER_REG) * 8) as u8,
        PAD_SLOT_WIDTH,
    )
}

/// Slot value routing `lane` of `source` to a pad.
pub const fn slot_value(source: TdmSource, lane: u32) -> u32 {
    source.index() * LANES_PER_SOURCE + lane
}

/// One pad taking one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinRoute {
    /// Pad number.
    pub pin: u32,
    /// Lane ordinal within the stream.
    pub lane: u32,
    /// Slot value (unshifted).
    pub value: u32,
}

impl PinRoute {
    /// The pad's slot descriptor.
    pub const fn slot(&self) -> RegField {
        pin_slot(self.pin)
    }

    /// Disable bitmap bit of the pad.
    pub const fn disable_mask(&self) -> u32 {
        1 << self.pin
    }
}

/// Pads and lanes chosen for one demux activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadAssignment {
    /// DAI name of the backend driving the demux.
    pub backend: String,
    /// TDM instance of the backend.
    pub source: TdmSource,
    /// Lanes the stream needs.
    pub lane_count: u32,
    /// Pads routed, in lane order.
    pub pins: Vec<PinRoute>,
}

impl PadAssignment {
    /// Register updates realizing the assignment: per pad, its slot value
    /// followed by clearing its disable bit.
    pub fn assignment(&self) -> RoutingAssignment {
        let mut out = RoutingAssignment::new();
        for pin in &self.pins {
            out.push_field(pin.slot(), pin.value);
            out.push(RegisterWrite::new(EE_AUDIO_DAT_PAD_CTRLF, pin.disable_mask(), 0));
        }
        out
    }
}

/// Computes the pad routing for a demux about to power up.
///
/// Pure: reads `graph`, writes nothing. Connected sink paths to output widgets
/// are taken in graph order; each gets the next lane until the stream's lanes
/// are used up. The pad number comes from the path label, or from the sink
/// widget name for unlabelled paths.
pub fn plan_pads<G: AudioGraph + ?Sized>(graph: &G, widget: WidgetId) -> Result<PadAssignment, RouteError> {
    let name = graph
        .widget(widget)
        .ok_or(RouteError::UnknownWidget(widget))?
        .name();

    let backend = find_backend(graph, widget).ok_or_else(|| RouteError::BackendNotFound {
        widget: name.to_string(),
    })?;
    let stream = backend.playback().ok_or_else(|| RouteError::StreamNotFound {
        widget: name.to_string(),
        backend: backend.name().to_string(),
    })?;

    let lane_count = stream.lane_count();
    let source = TdmSource::from_widget_name_or_default(backend.playback_widget());

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "{name}: backend '{}' source {source}, {} ch / {} slots -> {lane_count} lanes",
        backend.name(),
        stream.channels,
        stream.slots
    );

    let mut pins = Vec::new();
    let mut lane = 0;
    for path in connected_sinks(graph, widget) {
        if lane >= lane_count {
            break;
        }
        let Some(sink) = graph.widget(path.sink()) else {
            continue;
        };
        if sink.kind() != WidgetKind::Output {
            continue;
        }
        let pin = label::parse_index(path.label().unwrap_or(sink.name()));
        if pin as usize >= PAD_COUNT {
            #[cfg(feature = "tracing")]
            tracing::warn!("{name}: '{}' is not a data pad, skipped", sink.name());
            continue;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("{name}: pad {pin} <- {source} lane {lane}");
        pins.push(PinRoute {
            pin,
            lane,
            value: slot_value(source, lane),
        });
        lane += 1;
    }

    Ok(PadAssignment {
        backend: backend.name().to_string(),
        source,
        lane_count,
        pins,
    })
}

/// Pad-out routing component.
///
/// Owns the pre-power events of the three demux selectors.
#[derive(Debug, Clone)]
pub struct PadOutComponent {
    selectors: [WidgetId; 3],
    state: ResolverState,
}

impl PadOutComponent {
    /// Adds the pad topology to `graph` and returns the component bound to it.
    pub fn attach(graph: &mut RoutingGraph) -> Result<Self, GraphError> {
        PAD_OUT_TOPOLOGY.instantiate(graph)?;
        Self::bind(graph)
    }

    /// Binds to a graph that already contains the pad topology.
    pub fn bind(graph: &dyn AudioGraph) -> Result<Self, GraphError> {
        Ok(Self {
            selectors: [
                Topology::locate(graph, PAD_SELECTORS[0])?,
                Topology::locate(graph, PAD_SELECTORS[1])?,
                Topology::locate(graph, PAD_SELECTORS[2])?,
            ],
            state: ResolverState::Idle,
        })
    }

    /// Demux selector widgets, in [`TdmSource`] order.
    pub fn selectors(&self) -> [WidgetId; 3] {
        self.selectors
    }

    /// Register geometry this component writes to.
    pub const fn regmap_config() -> RegmapConfig {
        PAD_REGMAP
    }
}

impl Component for PadOutComponent {
    fn handles(&self, widget: WidgetId) -> bool {
        self.selectors.contains(&widget)
    }

    fn handle_event(
        &mut self,
        graph: &dyn AudioGraph,
        regmap: &mut dyn RegisterMap,
        widget: WidgetId,
        event: PowerEvent,
    ) -> Result<(), RouteError> {
        if !self.handles(widget) {
            return Err(RouteError::UnknownWidget(widget));
        }

        match event {
            PowerEvent::PrePowerUp => {
                self.state = ResolverState::Resolving;
                match plan_pads(graph, widget) {
                    Ok(plan) => {
                        plan.assignment().apply(regmap);
                        self.state = ResolverState::Applied;
                        Ok(())
                    }
                    Err(err) => {
                        #[cfg(feature = "tracing")]
                        tracing::error!("pad-out: {err}");
                        self.state = ResolverState::Failed;
                        Err(err)
                    }
                }
            }
            PowerEvent::PrePowerDown => {
                self.state = ResolverState::Idle;
                Ok(())
            }
            event => {
                let err = RouteError::UnexpectedEvent {
                    widget: graph
                        .widget(widget)
                        .map_or_else(|| widget.to_string(), |w| w.name().to_string()),
                    event,
                };
                #[cfg(feature = "tracing")]
                tracing::error!("pad-out: {err}");
                Err(err)
            }
        }
    }

    fn state(&self) -> ResolverState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdmroute_core::{BackendEndpoint, Interface, RegisterFile, Stream};

    fn stream(channels: u32, slots: u32) -> Stream {
        Stream::new(channels, slots, Interface::new("mst_a_mclk", "mst_a_sclk"))
    }

    /// Pad topology with one backend linked to `selector`.
    fn setup(playback_widget: &str, selector: usize, s: Option<Stream>) -> (RoutingGraph, PadOutComponent, WidgetId) {
        let mut graph = RoutingGraph::new();
        let component = PadOutComponent::attach(&mut graph).unwrap();
        let mut endpoint = BackendEndpoint::new("TDM-X", 0, playback_widget);
        if let Some(s) = s {
            endpoint = endpoint.with_playback(s);
        }
        let be = graph.add_backend(endpoint).unwrap();
        let sel = component.selectors()[selector];
        graph.connect(be, sel, None, true).unwrap();
        (graph, component, sel)
    }

    #[test]
    fn slot_geometry() {
        assert_eq!(pin_slot(0).reg, 0x0);
        assert_eq!(pin_slot(0).mask(), 0x1F);
        assert_eq!(pin_slot(4).reg, 0x4);
        assert_eq!(pin_slot(4).mask(), 0x1F);
        assert_eq!(pin_slot(5).reg, 0x4);
        assert_eq!(pin_slot(5).mask(), 0x1F00);
        assert_eq!(pin_slot(31).reg, 0x1C);
        assert_eq!(pin_slot(31).mask(), 0x1F00_0000);
    }

    #[test]
    fn slot_values() {
        assert_eq!(slot_value(TdmSource::A, 0), 0);
        assert_eq!(slot_value(TdmSource::B, 3), 11);
        assert_eq!(slot_value(TdmSource::C, 7), 23);
    }

    #[test]
    fn topology_tables() {
        assert_eq!(PAD_OUT_TOPOLOGY.widgets.len(), 35);
        assert_eq!(PAD_OUT_TOPOLOGY.routes.len(), 96);
        assert_eq!(
            PAD_OUT_TOPOLOGY.routes[0],
            RouteTemplate::controlled("TDM_D0", "TDM_D0", "TDMA_OUT SEL")
        );
        assert_eq!(
            PAD_OUT_TOPOLOGY.routes[95],
            RouteTemplate::controlled("TDM_D31", "TDM_D31", "TDMC_OUT SEL")
        );
    }

    #[test]
    fn plan_assigns_lanes_in_graph_order() {
        let (mut graph, _, sel) = setup("TDM_B Playback", 1, Some(stream(8, 2)));
        graph.set_selection(sel, &["TDM_D2", "TDM_D9", "TDM_D17"]).unwrap();

        let plan = plan_pads(&graph, sel).unwrap();
        assert_eq!(plan.source, TdmSource::B);
        assert_eq!(plan.lane_count, 4);
        let routed: Vec<_> = plan.pins.iter().map(|p| (p.pin, p.lane, p.value)).collect();
        assert_eq!(routed, vec![(2, 0, 8), (9, 1, 9), (17, 2, 10)]);
    }

    #[test]
    fn plan_stops_at_lane_count() {
        let (mut graph, _, sel) = setup("TDM_A Playback", 0, Some(stream(2, 2)));
        graph.set_selection(sel, &["TDM_D0", "TDM_D1"]).unwrap();
        let plan = plan_pads(&graph, sel).unwrap();
        assert_eq!(plan.pins.len(), 1);
        assert_eq!(plan.pins[0].pin, 0);
    }

    #[test]
    fn missing_stream() {
        let (mut graph, _, sel) = setup("TDM_A Playback", 0, None);
        graph.select(sel, "TDM_D0").unwrap();
        let err = plan_pads(&graph, sel).unwrap_err();
        assert_eq!(
            err,
            RouteError::StreamNotFound {
                widget: "TDMA_OUT SEL".into(),
                backend: "TDM-X".into()
            }
        );
    }

    #[test]
    fn assignment_writes_slot_then_enable() {
        let plan = PadAssignment {
            backend: "TDM-C".into(),
            source: TdmSource::C,
            lane_count: 1,
            pins: vec![PinRoute {
                pin: 6,
                lane: 0,
                value: 16,
            }],
        };
        let writes = plan.assignment();
        assert_eq!(
            writes.writes(),
            &[
                RegisterWrite::new(0x4, 0x1F_0000, 16 << 16),
                RegisterWrite::new(EE_AUDIO_DAT_PAD_CTRLF, 1 << 6, 0),
            ]
        );
    }

    #[test]
    fn state_follows_events() {
        let (mut graph, mut component, sel) = setup("TDM_A Playback", 0, None);
        graph.select(sel, "TDM_D0").unwrap();
        let mut regs = RegisterFile::new(PAD_REGMAP);

        assert_eq!(component.state(), ResolverState::Idle);
        assert!(component
            .handle_event(&graph, &mut regs, sel, PowerEvent::PrePowerUp)
            .is_err());
        assert_eq!(component.state(), ResolverState::Failed);

        graph
            .set_playback_stream(graph.widget_id("TDM_A Playback").unwrap(), Some(stream(2, 2)))
            .unwrap();
        component
            .handle_event(&graph, &mut regs, sel, PowerEvent::PrePowerUp)
            .unwrap();
        assert_eq!(component.state(), ResolverState::Applied);

        component
            .handle_event(&graph, &mut regs, sel, PowerEvent::PrePowerDown)
            .unwrap();
        assert_eq!(component.state(), ResolverState::Idle);
    }

    #[test]
    fn post_events_are_rejected() {
        let (graph, mut component, sel) = setup("TDM_A Playback", 0, Some(stream(2, 2)));
        let mut regs = RegisterFile::new(PAD_REGMAP);
        let err = component
            .handle_event(&graph, &mut regs, sel, PowerEvent::PostPowerUp)
            .unwrap_err();
        assert!(matches!(err, RouteError::UnexpectedEvent { event: PowerEvent::PostPowerUp, .. }));
        assert!(regs.log().is_empty());
    }

    #[test]
    fn foreign_widget_is_rejected() {
        let (graph, mut component, _) = setup("TDM_A Playback", 0, Some(stream(2, 2)));
        let pad = graph.widget_id("TDM_D0").unwrap();
        let mut regs = RegisterFile::new(PAD_REGMAP);
        assert!(!component.handles(pad));
        assert_eq!(
            component.handle_event(&graph, &mut regs, pad, PowerEvent::PrePowerUp),
            Err(RouteError::UnknownWidget(pad))
        );
    }
}
