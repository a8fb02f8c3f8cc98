//! TDM to internal codec bridge.
//!
//! The bridge forwards one lane of one TDM instance to the internal audio
//! codec. Everything lives in a single control register:
//!
//! | Bits  | Field |
//! |-------|-------|
//! | 31    | output enable (`OUT EN` switch) |
//! | 30    | bit clock enable |
//! | 29    | master clock enable |
//! | 16-20 | data select, `lane + source * 8` |
//! | 12-14 | frame clock select |
//! | 9     | bit clock capture invert |
//! | 4-6   | bit clock select |
//! | 0-2   | master clock select |
//!
//! Two widgets carry events. `Lane SRC` resolves the data and clock selects on
//! pre-power-up ([`plan_lane`]). `OUT EN` gates the clocks ([`clk_enable`]).

#[cfg(not(feature = "std"))]
use alloc::{string::String, string::ToString, vec::Vec};

use tdmroute_core::graph::{AudioGraph, GraphError, RoutingGraph, WidgetId, WidgetKind, connected_sources};
use tdmroute_core::{
    Component, PowerEvent, RegField, RegisterMap, RegisterWrite, RegmapConfig, ResolverState,
    RouteError, RoutingAssignment, TdmSource, clock, find_backend, label,
};

use crate::topology::{RouteTemplate, Topology, WidgetTemplate};

/// The bridge control register.
pub const TOACODEC_CTRL0: u32 = 0x0;

/// Output enable bit shift.
pub const CTRL0_ENABLE_SHIFT: u32 = 31;
/// Bit clock enable bit shift.
pub const CTRL0_BCLK_ENABLE_SHIFT: u32 = 30;
/// Master clock enable bit shift.
pub const CTRL0_MCLK_ENABLE_SHIFT: u32 = 29;
/// Bit clock capture invert bit shift.
pub const CTRL0_BLK_CAP_INV_SHIFT: u32 = 9;

/// Both clock enable bits.
pub const CLK_ENABLE_MASK: u32 = (1 << CTRL0_MCLK_ENABLE_SHIFT) | (1 << CTRL0_BCLK_ENABLE_SHIFT);

/// Lanes per TDM instance in the data select encoding.
pub const LANE_OFFSET: u32 = 8;

/// Register geometry of the bridge.
pub const TOCODEC_REGMAP: RegmapConfig = RegmapConfig::mmio32(0x1);

/// `Lane SRC` selector values.
pub const LANE_LABELS: [&str; 8] = [
    "Lane0", "Lane1", "Lane2", "Lane3", "Lane4", "Lane5", "Lane6", "Lane7",
];

/// `INPUT SRC` selector values, in [`TdmSource`] order.
pub const SOURCE_LABELS: [&str; 3] = ["TDMA", "TDMB", "TDMC"];

/// Lane mux widget.
pub const LANE_SRC: &str = "Lane SRC";
/// Instance mux widget.
pub const INPUT_SRC: &str = "INPUT SRC";
/// Output enable switch widget.
pub const OUT_EN: &str = "OUT EN";
/// Selector value of the output enable switch.
pub const OUT_EN_SWITCH: &str = "Switch";
/// Codec facing output widget.
pub const TDM_TO_ACODEC: &str = "TDM_TO_ACODEC";

static TOCODEC_WIDGETS: [WidgetTemplate; 15] = [
    WidgetTemplate::new(LANE_SRC, WidgetKind::Mux),
    WidgetTemplate::new(INPUT_SRC, WidgetKind::Mux),
    WidgetTemplate::new(OUT_EN, WidgetKind::Generic),
    WidgetTemplate::new("TDMA", WidgetKind::Input),
    WidgetTemplate::new("TDMB", WidgetKind::Input),
    WidgetTemplate::new("TDMC", WidgetKind::Input),
    WidgetTemplate::new("Lane0", WidgetKind::Generic),
    WidgetTemplate::new("Lane1", WidgetKind::Generic),
    WidgetTemplate::new("Lane2", WidgetKind::Generic),
    WidgetTemplate::new("Lane3", WidgetKind::Generic),
    WidgetTemplate::new("Lane4", WidgetKind::Generic),
    WidgetTemplate::new("Lane5", WidgetKind::Generic),
    WidgetTemplate::new("Lane6", WidgetKind::Generic),
    WidgetTemplate::new("Lane7", WidgetKind::Generic),
    WidgetTemplate::new(TDM_TO_ACODEC, WidgetKind::Output),
];

static TOCODEC_ROUTES: [RouteTemplate; 21] = [
    RouteTemplate::controlled(INPUT_SRC, "TDMA", "TDMA"),
    RouteTemplate::controlled(INPUT_SRC, "TDMB", "TDMB"),
    RouteTemplate::controlled(INPUT_SRC, "TDMC", "TDMC"),
    RouteTemplate::fixed("Lane0", INPUT_SRC),
    RouteTemplate::fixed("Lane1", INPUT_SRC),
    RouteTemplate::fixed("Lane2", INPUT_SRC),
    RouteTemplate::fixed("Lane3", INPUT_SRC),
    RouteTemplate::fixed("Lane4", INPUT_SRC),
    RouteTemplate::fixed("Lane5", INPUT_SRC),
    RouteTemplate::fixed("Lane6", INPUT_SRC),
    RouteTemplate::fixed("Lane7", INPUT_SRC),
    RouteTemplate::controlled(LANE_SRC, "Lane0", "Lane0"),
    RouteTemplate::controlled(LANE_SRC, "Lane1", "Lane1"),
    RouteTemplate::controlled(LANE_SRC, "Lane2", "Lane2"),
    RouteTemplate::controlled(LANE_SRC, "Lane3", "Lane3"),
    RouteTemplate::controlled(LANE_SRC, "Lane4", "Lane4"),
    RouteTemplate::controlled(LANE_SRC, "Lane5", "Lane5"),
    RouteTemplate::controlled(LANE_SRC, "Lane6", "Lane6"),
    RouteTemplate::controlled(LANE_SRC, "Lane7", "Lane7"),
    RouteTemplate::controlled(OUT_EN, OUT_EN_SWITCH, LANE_SRC),
    RouteTemplate::fixed(TDM_TO_ACODEC, OUT_EN),
];

/// The bridge's widgets and routes.
pub static TOCODEC_TOPOLOGY: Topology = Topology {
    name: "tocodec",
    widgets: &TOCODEC_WIDGETS,
    routes: &TOCODEC_ROUTES,
};

/// Field layout of the bridge control register.
///
/// Differs between SoC generations; [`S4_TOCODEC_FIELDS`] is the S4 layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToCodecFields {
    /// Data select (`lane + source * 8`).
    pub dat_sel: RegField,
    /// Frame clock select.
    pub lrclk_sel: RegField,
    /// Bit clock select.
    pub bclk_sel: RegField,
    /// Master clock select.
    pub mclk_sel: RegField,
}

/// S4 field layout.
pub const S4_TOCODEC_FIELDS: ToCodecFields = ToCodecFields {
    dat_sel: RegField::new(TOACODEC_CTRL0, 16, 20),
    lrclk_sel: RegField::new(TOACODEC_CTRL0, 12, 14),
    bclk_sel: RegField::new(TOACODEC_CTRL0, 4, 6),
    mclk_sel: RegField::new(TOACODEC_CTRL0, 0, 2),
};

impl Default for ToCodecFields {
    fn default() -> Self {
        S4_TOCODEC_FIELDS
    }
}

impl ToCodecFields {
    /// Fields with their names, in register bit order from the top.
    pub fn named(&self) -> [(&'static str, RegField); 4] {
        [
            ("dat_sel", self.dat_sel),
            ("lrclk_sel", self.lrclk_sel),
            ("bclk_sel", self.bclk_sel),
            ("mclk_sel", self.mclk_sel),
        ]
    }

    /// Returns the names of the first two fields sharing bits, if any.
    pub fn first_overlap(&self) -> Option<(&'static str, &'static str)> {
        let named = self.named();
        for (i, (a, fa)) in named.iter().enumerate() {
            for (b, fb) in &named[i + 1..] {
                if fa.overlaps(fb) {
                    return Some((*a, *b));
                }
            }
        }
        None
    }
}

/// Lane and clock selection for one `Lane SRC` activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneAssignment {
    /// DAI name of the backend driving the lane.
    pub backend: String,
    /// TDM instance of the backend.
    pub source: TdmSource,
    /// Data select values, one per connected lane path, in graph order.
    pub selections: Vec<u32>,
    /// Master clock select value.
    pub mclk_id: u32,
    /// Bit and frame clock select value.
    pub sclk_id: u32,
}

impl LaneAssignment {
    /// Data select value left in the register once applied.
    pub fn data_select(&self) -> Option<u32> {
        self.selections.last().copied()
    }

    /// Register updates realizing the assignment.
    ///
    /// Every data select value is written in turn, so the last connected lane
    /// wins. The bit clock and frame clock share the serial clock id.
    pub fn assignment(&self, fields: &ToCodecFields) -> RoutingAssignment {
        let mut out = RoutingAssignment::new();
        for &value in &self.selections {
            out.push_field(fields.dat_sel, value);
        }
        out.push_field(fields.mclk_sel, self.mclk_id);
        out.push_field(fields.bclk_sel, self.sclk_id);
        out.push_field(fields.lrclk_sel, self.sclk_id);
        out
    }
}

/// Computes the lane and clock selects for `Lane SRC` about to power up.
///
/// Every connected, labelled source path yields one data select value. Clock
/// names that match no divider select divider 0.
pub fn plan_lane<G: AudioGraph + ?Sized>(graph: &G, widget: WidgetId) -> Result<LaneAssignment, RouteError> {
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

    let source = TdmSource::from_widget_name_or_default(backend.playback_widget());

    let selections: Vec<u32> = connected_sources(graph, widget)
        .filter_map(|path| path.label())
        .map(|lane| label::parse_index(lane) + source.index() * LANE_OFFSET)
        .collect();

    #[cfg(feature = "tracing")]
    for iface_clk in [&stream.iface.mclk, &stream.iface.sclk] {
        if clock::try_resolve(iface_clk).is_none() {
            tracing::warn!("{name}: clock '{iface_clk}' matches no divider, using mst_a");
        }
    }
    let mclk_id = clock::resolve(&stream.iface.mclk);
    let sclk_id = clock::resolve(&stream.iface.sclk);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "{name}: backend '{}' source {source}, dat_sel {selections:?}, mclk {mclk_id}, sclk {sclk_id}",
        backend.name()
    );

    Ok(LaneAssignment {
        backend: backend.name().to_string(),
        source,
        selections,
        mclk_id,
        sclk_id,
    })
}

/// Clock gate handler of the `OUT EN` switch.
///
/// Sets the capture invert bit on every call, then sets (pre-power-up) or
/// clears (pre-power-down) both clock enables. Other events still get the
/// invert bit before being rejected.
pub fn clk_enable(regmap: &mut dyn RegisterMap, widget: &str, event: PowerEvent) -> Result<(), RouteError> {
    let inv = 1 << CTRL0_BLK_CAP_INV_SHIFT;
    regmap.update_bits(TOACODEC_CTRL0, inv, inv);

    let value = match event {
        PowerEvent::PrePowerUp => CLK_ENABLE_MASK,
        PowerEvent::PrePowerDown => 0,
        event => {
            return Err(RouteError::UnexpectedEvent {
                widget: widget.to_string(),
                event,
            });
        }
    };
    regmap.update_bits(TOACODEC_CTRL0, CLK_ENABLE_MASK, value);
    Ok(())
}

/// Update written by the `OUT EN` switch control.
pub const fn output_enable(enabled: bool) -> RegisterWrite {
    let bit = 1 << CTRL0_ENABLE_SHIFT;
    RegisterWrite::new(TOACODEC_CTRL0, bit, if enabled { bit } else { 0 })
}

/// To-codec routing component.
///
/// Owns the events of `Lane SRC` and `OUT EN`. Its state tracks the lane
/// resolver only; the clock gate is stateless.
#[derive(Debug, Clone)]
pub struct ToCodecComponent {
    lane_src: WidgetId,
    out_en: WidgetId,
    fields: ToCodecFields,
    state: ResolverState,
}

impl ToCodecComponent {
    /// Adds the bridge topology to `graph` and returns the component bound to
    /// it.
    pub fn attach(graph: &mut RoutingGraph, fields: ToCodecFields) -> Result<Self, GraphError> {
        TOCODEC_TOPOLOGY.instantiate(graph)?;
        Self::bind(graph, fields)
    }

    /// Binds to a graph that already contains the bridge topology.
    pub fn bind(graph: &dyn AudioGraph, fields: ToCodecFields) -> Result<Self, GraphError> {
        Ok(Self {
            lane_src: Topology::locate(graph, LANE_SRC)?,
            out_en: Topology::locate(graph, OUT_EN)?,
            fields,
            state: ResolverState::Idle,
        })
    }

    /// The `Lane SRC` widget.
    pub fn lane_src(&self) -> WidgetId {
        self.lane_src
    }

    /// The `OUT EN` widget.
    pub fn out_en(&self) -> WidgetId {
        self.out_en
    }

    /// Field layout in use.
    pub fn fields(&self) -> &ToCodecFields {
        &self.fields
    }

    /// Register geometry this component writes to.
    pub const fn regmap_config() -> RegmapConfig {
        TOCODEC_REGMAP
    }

    fn lane_event(
        &mut self,
        graph: &dyn AudioGraph,
        regmap: &mut dyn RegisterMap,
        widget: WidgetId,
        event: PowerEvent,
    ) -> Result<(), RouteError> {
        match event {
            PowerEvent::PrePowerUp => {
                self.state = ResolverState::Resolving;
                match plan_lane(graph, widget) {
                    Ok(plan) => {
                        plan.assignment(&self.fields).apply(regmap);
                        self.state = ResolverState::Applied;
                        Ok(())
                    }
                    Err(err) => {
                        self.state = ResolverState::Failed;
                        Err(err)
                    }
                }
            }
            PowerEvent::PrePowerDown => {
                self.state = ResolverState::Idle;
                Ok(())
            }
            event => Err(RouteError::UnexpectedEvent {
                widget: LANE_SRC.to_string(),
                event,
            }),
        }
    }
}

impl Component for ToCodecComponent {
    fn handles(&self, widget: WidgetId) -> bool {
        widget == self.lane_src || widget == self.out_en
    }

    fn handle_event(
        &mut self,
        graph: &dyn AudioGraph,
        regmap: &mut dyn RegisterMap,
        widget: WidgetId,
        event: PowerEvent,
    ) -> Result<(), RouteError> {
        let result = if widget == self.lane_src {
            self.lane_event(graph, regmap, widget, event)
        } else if widget == self.out_en {
            clk_enable(regmap, OUT_EN, event)
        } else {
            return Err(RouteError::UnknownWidget(widget));
        };

        #[cfg(feature = "tracing")]
        if let Err(err) = &result {
            tracing::error!("tocodec: {err}");
        }
        result
    }

    fn state(&self) -> ResolverState {
        self.state
    }
}
