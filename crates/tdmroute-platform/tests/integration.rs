//! Integration tests for the S4 routing components.
//!
//! Drives both components through the `Component` trait on instantiated
//! topologies, the way the power-sequencing engine would, and checks the exact
//! register contents and write order that result.

use proptest::prelude::*;
use tdmroute_core::{
    BackendEndpoint, Component, Interface, PowerEvent, RegisterFile, RegisterMap, RegisterWrite,
    ResolverState, RouteError, RoutingGraph, Stream, WidgetId,
};
use tdmroute_platform::pad_out::{EE_AUDIO_DAT_PAD_CTRLF, PAD_LABELS, PAD_REGMAP, pin_slot};
use tdmroute_platform::tocodec::{
    CLK_ENABLE_MASK, INPUT_SRC, S4_TOCODEC_FIELDS, TOACODEC_CTRL0, TOCODEC_REGMAP,
};
use tdmroute_platform::{PadOutComponent, ToCodecComponent};

fn stream(channels: u32, slots: u32) -> Stream {
    Stream::new(channels, slots, Interface::new("mst_a_mclk", "mst_a_sclk"))
}

/// Pad topology with a backend on the selector of instance `selector`.
fn pad_rig(playback_widget: &str, selector: usize, s: Stream) -> (RoutingGraph, PadOutComponent, WidgetId) {
    let mut graph = RoutingGraph::new();
    let component = PadOutComponent::attach(&mut graph).unwrap();
    let be = graph
        .add_backend(BackendEndpoint::new("TDM-BE", 0, playback_widget).with_playback(s))
        .unwrap();
    let sel = component.selectors()[selector];
    graph.connect(be, sel, None, true).unwrap();
    (graph, component, sel)
}

/// Bridge topology with a backend wired into the `input` AIF widget.
fn codec_rig(playback_widget: &str, input: &str, iface: Interface) -> (RoutingGraph, ToCodecComponent) {
    let mut graph = RoutingGraph::new();
    let component = ToCodecComponent::attach(&mut graph, S4_TOCODEC_FIELDS).unwrap();
    let be = graph
        .add_backend(
            BackendEndpoint::new("TDM-BE", 0, playback_widget).with_playback(Stream::new(8, 8, iface)),
        )
        .unwrap();
    let aif = graph.widget_id(input).unwrap();
    graph.connect(be, aif, None, true).unwrap();
    (graph, component)
}

// ============================================================================
// 1. Pad-out end to end
// ============================================================================

#[test]
fn single_lane_to_pad_five() {
    let (mut graph, mut pads, sel) = pad_rig("TDM_A Playback", 0, stream(4, 4));
    graph.set_selection(sel, &["TDM_D5", "TDM_D9"]).unwrap();

    let mut regs = RegisterFile::new(PAD_REGMAP);
    regs.preload(0x4, 0xFFFF_FFFF);
    regs.preload(0x8, 0xFFFF_FFFF);
    regs.preload(EE_AUDIO_DAT_PAD_CTRLF, 0xFFFF_FFFF);

    pads.handle_event(&graph, &mut regs, sel, PowerEvent::PrePowerUp)
        .unwrap();

    assert_eq!(
        regs.log(),
        &[
            RegisterWrite::new(0x4, 0x1F00, 0),
            RegisterWrite::new(EE_AUDIO_DAT_PAD_CTRLF, 1 << 5, 0),
        ]
    );
    assert_eq!(regs.read(0x4), 0xFFFF_E0FF);
    assert_eq!(regs.read(EE_AUDIO_DAT_PAD_CTRLF), !(1 << 5));
    // TDM_D9 is beyond the stream's single lane.
    assert_eq!(regs.read(0x8), 0xFFFF_FFFF);
    assert_eq!(pads.state(), ResolverState::Applied);
}

#[test]
fn tdm_c_lanes_are_shifted_into_slots() {
    let (mut graph, mut pads, sel) = pad_rig("TDM_C Playback", 2, stream(6, 2));
    graph
        .set_selection(sel, &["TDM_D28", "TDM_D29", "TDM_D31"])
        .unwrap();

    let mut regs = RegisterFile::new(PAD_REGMAP);
    pads.handle_event(&graph, &mut regs, sel, PowerEvent::PrePowerUp)
        .unwrap();

    // Source C is 16; lanes 0, 1, 2 land in bytes 0, 1, 3 of 0x1C.
    assert_eq!(regs.read(0x1C), 16 | (17 << 8) | (18 << 24));
    assert_eq!(
        regs.read(EE_AUDIO_DAT_PAD_CTRLF),
        0,
        "enable only clears bits"
    );
    assert_eq!(regs.read_field(pin_slot(29)), 17);
}

#[test]
fn no_backend_means_no_writes() {
    let mut graph = RoutingGraph::new();
    let mut pads = PadOutComponent::attach(&mut graph).unwrap();
    let sel = pads.selectors()[1];
    graph.select(sel, "TDM_D0").unwrap();

    let mut regs = RegisterFile::new(PAD_REGMAP);
    let err = pads
        .handle_event(&graph, &mut regs, sel, PowerEvent::PrePowerUp)
        .unwrap_err();

    assert_eq!(
        err,
        RouteError::BackendNotFound {
            widget: "TDMB_OUT SEL".into()
        }
    );
    assert!(err.is_recoverable());
    assert_eq!(err.errno(), -22);
    assert!(regs.log().is_empty());
    assert_eq!(pads.state(), ResolverState::Failed);
}

#[test]
fn failure_is_not_sticky() {
    let mut graph = RoutingGraph::new();
    let mut pads = PadOutComponent::attach(&mut graph).unwrap();
    let be = graph
        .add_backend(BackendEndpoint::new("TDM-A", 0, "TDM_A Playback").with_playback(stream(2, 2)))
        .unwrap();
    let sel = pads.selectors()[0];
    let link = graph.connect(be, sel, None, false).unwrap();
    graph.select(sel, "TDM_D3").unwrap();

    let mut regs = RegisterFile::new(PAD_REGMAP);
    assert!(
        pads.handle_event(&graph, &mut regs, sel, PowerEvent::PrePowerUp)
            .is_err()
    );

    graph.set_connected(link, true).unwrap();
    pads.handle_event(&graph, &mut regs, sel, PowerEvent::PrePowerUp)
        .unwrap();
    assert_eq!(pads.state(), ResolverState::Applied);
    assert_eq!(regs.log().len(), 2);
}

#[test]
fn pre_power_down_writes_nothing() {
    let (mut graph, mut pads, sel) = pad_rig("TDM_B Playback", 1, stream(2, 1));
    graph.set_selection(sel, &["TDM_D0", "TDM_D1"]).unwrap();
    let mut regs = RegisterFile::new(PAD_REGMAP);

    pads.handle_event(&graph, &mut regs, sel, PowerEvent::PrePowerUp)
        .unwrap();
    let applied: Vec<_> = regs.dump().collect();
    regs.take_log();

    pads.handle_event(&graph, &mut regs, sel, PowerEvent::PrePowerDown)
        .unwrap();
    assert!(regs.log().is_empty());
    assert_eq!(regs.dump().collect::<Vec<_>>(), applied);
    assert_eq!(pads.state(), ResolverState::Idle);
}

#[test]
fn resolution_is_idempotent() {
    let (mut graph, mut pads, sel) = pad_rig("TDM_B Playback", 1, stream(8, 2));
    graph
        .set_selection(sel, &["TDM_D0", "TDM_D7", "TDM_D12", "TDM_D30"])
        .unwrap();

    let mut regs = RegisterFile::new(PAD_REGMAP);
    pads.handle_event(&graph, &mut regs, sel, PowerEvent::PrePowerUp)
        .unwrap();
    let first_writes = regs.take_log();
    let first: Vec<_> = regs.dump().collect();

    pads.handle_event(&graph, &mut regs, sel, PowerEvent::PrePowerUp)
        .unwrap();
    assert_eq!(regs.take_log(), first_writes);
    assert_eq!(regs.dump().collect::<Vec<_>>(), first);
}

#[test]
fn unknown_instance_falls_back_to_tdm_a() {
    let (mut graph, mut pads, sel) = pad_rig("SPDIF Playback", 0, stream(2, 2));
    graph.select(sel, "TDM_D2").unwrap();
    let mut regs = RegisterFile::new(PAD_REGMAP);
    regs.preload(0x0, 0x00FF_0000);

    pads.handle_event(&graph, &mut regs, sel, PowerEvent::PrePowerUp)
        .unwrap();
    assert_eq!(regs.read_field(pin_slot(2)), 0);
}

// ============================================================================
// 2. To-codec end to end
// ============================================================================

#[test]
fn lane_three_of_tdm_b() {
    let (mut graph, mut codec) =
        codec_rig("TDM_B Playback", "TDMB", Interface::new("mst_b_mclk", "mst_d_sclk"));
    graph
        .select(graph.widget_id(INPUT_SRC).unwrap(), "TDMB")
        .unwrap();
    graph.select(codec.lane_src(), "Lane3").unwrap();

    let mut regs = RegisterFile::new(TOCODEC_REGMAP);
    let lane_src = codec.lane_src();
    codec
        .handle_event(&graph, &mut regs, lane_src, PowerEvent::PrePowerUp)
        .unwrap();

    assert_eq!(regs.read_field(S4_TOCODEC_FIELDS.dat_sel), 11);
    assert_eq!(regs.read_field(S4_TOCODEC_FIELDS.mclk_sel), 1);
    assert_eq!(regs.read_field(S4_TOCODEC_FIELDS.bclk_sel), 3);
    assert_eq!(regs.read_field(S4_TOCODEC_FIELDS.lrclk_sel), 3);
    assert_eq!(codec.state(), ResolverState::Applied);
}

#[test]
fn write_order_is_data_then_clocks() {
    let (mut graph, mut codec) =
        codec_rig("TDM_A Playback", "TDMA", Interface::new("mst_a", "mst_b"));
    graph
        .select(graph.widget_id(INPUT_SRC).unwrap(), "TDMA")
        .unwrap();
    graph.select(codec.lane_src(), "Lane0").unwrap();

    let mut regs = RegisterFile::new(TOCODEC_REGMAP);
    let lane_src = codec.lane_src();
    codec
        .handle_event(&graph, &mut regs, lane_src, PowerEvent::PrePowerUp)
        .unwrap();

    let fields: Vec<_> = regs.log().iter().map(|w| w.mask).collect();
    assert_eq!(
        fields,
        vec![
            S4_TOCODEC_FIELDS.dat_sel.mask(),
            S4_TOCODEC_FIELDS.mclk_sel.mask(),
            S4_TOCODEC_FIELDS.bclk_sel.mask(),
            S4_TOCODEC_FIELDS.lrclk_sel.mask(),
        ]
    );
}

#[test]
fn unknown_clock_selects_divider_zero() {
    let (mut graph, mut codec) =
        codec_rig("TDM_C Playback", "TDMC", Interface::new("fclk_div2", "mst_f_sclk"));
    graph
        .select(graph.widget_id(INPUT_SRC).unwrap(), "TDMC")
        .unwrap();
    graph.select(codec.lane_src(), "Lane7").unwrap();

    let mut regs = RegisterFile::new(TOCODEC_REGMAP);
    regs.preload(TOACODEC_CTRL0, 0x7);
    let lane_src = codec.lane_src();
    codec
        .handle_event(&graph, &mut regs, lane_src, PowerEvent::PrePowerUp)
        .unwrap();

    assert_eq!(regs.read_field(S4_TOCODEC_FIELDS.mclk_sel), 0);
    assert_eq!(regs.read_field(S4_TOCODEC_FIELDS.bclk_sel), 5);
    assert_eq!(regs.read_field(S4_TOCODEC_FIELDS.dat_sel), 7 + 16);
}

#[test]
fn clock_gate_cycle() {
    let (graph, mut codec) = codec_rig("TDM_A Playback", "TDMA", Interface::new("mst_a", "mst_a"));
    let mut regs = RegisterFile::new(TOCODEC_REGMAP);
    let out_en = codec.out_en();

    codec
        .handle_event(&graph, &mut regs, out_en, PowerEvent::PrePowerUp)
        .unwrap();
    assert_eq!(regs.read(TOACODEC_CTRL0), CLK_ENABLE_MASK | (1 << 9));

    codec
        .handle_event(&graph, &mut regs, out_en, PowerEvent::PrePowerDown)
        .unwrap();
    assert_eq!(regs.read(TOACODEC_CTRL0), 1 << 9);

    let err = codec
        .handle_event(&graph, &mut regs, out_en, PowerEvent::PostPowerUp)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "OUT EN: unexpected event post-pmu"
    );
}

#[test]
fn components_are_object_safe() {
    let mut graph = RoutingGraph::new();
    let mut components: Vec<Box<dyn Component>> = vec![
        Box::new(PadOutComponent::attach(&mut graph).unwrap()),
        Box::new(ToCodecComponent::attach(&mut graph, S4_TOCODEC_FIELDS).unwrap()),
    ];
    let lane_src = graph.widget_id("Lane SRC").unwrap();
    let owners = components.iter().filter(|c| c.handles(lane_src)).count();
    assert_eq!(owners, 1);

    let mut regs = RegisterFile::new(TOCODEC_REGMAP);
    let err = components[1]
        .handle_event(&graph, &mut regs, lane_src, PowerEvent::PrePowerUp)
        .unwrap_err();
    assert!(matches!(err, RouteError::BackendNotFound { .. }));
}

// ============================================================================
// 3. Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// However many pads are selected, exactly min(selected, lanes) are
    /// written, with lanes handed out in pad order.
    #[test]
    fn lanes_never_exceed_stream_geometry(
        pins in prop::collection::btree_set(0usize..32, 1..12),
        channels in 1u32..=32,
        slots in 1u32..=8,
    ) {
        let (mut graph, mut pads, sel) = pad_rig("TDM_A Playback", 0, stream(channels, slots));
        let labels: Vec<&str> = pins.iter().map(|&p| PAD_LABELS[p]).collect();
        graph.set_selection(sel, &labels).unwrap();

        let mut regs = RegisterFile::new(PAD_REGMAP);
        pads.handle_event(&graph, &mut regs, sel, PowerEvent::PrePowerUp).unwrap();

        let lanes = ((channels - 1) / slots + 1) as usize;
        let routed = lanes.min(pins.len());
        prop_assert_eq!(regs.log().len(), routed * 2);
        for (lane, &pin) in pins.iter().take(routed).enumerate() {
            prop_assert_eq!(regs.read_field(pin_slot(pin as u32)), lane as u32);
        }
    }
}
