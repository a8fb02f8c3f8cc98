//! Built-in scenarios bundled with the library.
//!
//! These cover the reference routings of both blocks and are always
//! available without external files.

use crate::Scenario;

/// Built-in scenario names.
pub static BUILTIN_SCENARIO_NAMES: &[&str] = &[
    "pad-single-lane",
    "pad-multi-lane",
    "pad-no-backend",
    "tocodec-lane",
    "tocodec-unknown-clock",
];

static BUILTIN_SCENARIOS_TOML: &[(&str, &str)] = &[
    ("pad-single-lane", PAD_SINGLE_LANE),
    ("pad-multi-lane", PAD_MULTI_LANE),
    ("pad-no-backend", PAD_NO_BACKEND),
    ("tocodec-lane", TOCODEC_LANE),
    ("tocodec-unknown-clock", TOCODEC_UNKNOWN_CLOCK),
];

/// One lane to one pad; the second selected pad is beyond the stream.
const PAD_SINGLE_LANE: &str = r#"
name = "pad-single-lane"
description = "TDM_A, 4 channels in 4 slots: TDM_D5 takes lane 0, TDM_D9 is left alone"
component = "pad-out"

[[backends]]
name = "TDM-A"
dai_id = 0
widget = "TDM_A Playback"
links = ["TDMA_OUT SEL"]
[backends.stream]
channels = 4
slots = 4
mclk = "mst_a_mclk"
sclk = "mst_a_sclk"

[[selections]]
widget = "TDMA_OUT SEL"
labels = ["TDM_D5", "TDM_D9"]

[[preload]]
reg = 0x4
value = 0x00001F00

[[preload]]
reg = 0x8
value = 0x00001F00

[[preload]]
reg = 0x28
value = 0xFFFFFFFF

[[events]]
widget = "TDMA_OUT SEL"
event = "pre-pmu"

[[events]]
widget = "TDMA_OUT SEL"
event = "pre-pmd"
"#;

/// Four lanes of TDM_B spread over five selected pads.
const PAD_MULTI_LANE: &str = r#"
name = "pad-multi-lane"
description = "TDM_B, 8 channels in 2 slots: four lanes on TDM_D0..TDM_D3"
component = "pad-out"

[[backends]]
name = "TDM-B"
dai_id = 0
widget = "TDM_B Playback"
links = ["TDMB_OUT SEL"]
[backends.stream]
channels = 8
slots = 2
mclk = "mst_b_mclk"
sclk = "mst_b_sclk"

[[selections]]
widget = "TDMB_OUT SEL"
labels = ["TDM_D0", "TDM_D1", "TDM_D2", "TDM_D3", "TDM_D4"]

[[preload]]
reg = 0x28
value = 0xFFFFFFFF

[[events]]
widget = "TDMB_OUT SEL"
event = "pre-pmu"
"#;

/// Selector powered up while its backend link is down.
const PAD_NO_BACKEND: &str = r#"
name = "pad-no-backend"
description = "TDMC_OUT SEL powers up with no backend connected: routing is vetoed"
component = "pad-out"

[[backends]]
name = "TDM-C"
dai_id = 0
widget = "TDM_C Playback"
[backends.stream]
channels = 2
slots = 2
mclk = "mst_c_mclk"
sclk = "mst_c_sclk"

[[selections]]
widget = "TDMC_OUT SEL"
labels = ["TDM_D12"]

[[events]]
widget = "TDMC_OUT SEL"
event = "pre-pmu"
"#;

/// Lane 3 of TDM_B to the codec, with clock gating.
const TOCODEC_LANE: &str = r#"
name = "tocodec-lane"
description = "TDM_B lane 3 to the internal codec, master clock mst_b, serial clock mst_d"
component = "tocodec"

[[backends]]
name = "TDM-B"
dai_id = 0
widget = "TDM_B Playback"
links = ["TDMB"]
[backends.stream]
channels = 8
slots = 2
mclk = "mst_b_mclk"
sclk = "mst_d_sclk"

[[selections]]
widget = "INPUT SRC"
labels = ["TDMB"]

[[selections]]
widget = "Lane SRC"
labels = ["Lane3"]

[[selections]]
widget = "OUT EN"
labels = ["Switch"]

[[events]]
widget = "Lane SRC"
event = "pre-pmu"

[[events]]
widget = "OUT EN"
event = "pre-pmu"

[[events]]
widget = "OUT EN"
event = "pre-pmd"

[[events]]
widget = "Lane SRC"
event = "pre-pmd"
"#;

/// Clock names outside the divider set select divider 0.
const TOCODEC_UNKNOWN_CLOCK: &str = r#"
name = "tocodec-unknown-clock"
description = "TDM_C lane 0 with a non-divider master clock: mclk_sel falls back to 0"
component = "tocodec"

[[backends]]
name = "TDM-C"
dai_id = 0
widget = "TDM_C Playback"
links = ["TDMC"]
[backends.stream]
channels = 2
slots = 2
mclk = "fclk_div2"
sclk = "mst_e_sclk"

[[selections]]
widget = "INPUT SRC"
labels = ["TDMC"]

[[selections]]
widget = "Lane SRC"
labels = ["Lane0"]

[[preload]]
reg = 0x0
value = 0x00000007

[[events]]
widget = "Lane SRC"
event = "pre-pmu"
"#;

/// All built-in scenarios.
pub fn builtin_scenarios() -> Vec<Scenario> {
    BUILTIN_SCENARIOS_TOML
        .iter()
        .filter_map(|(_, toml)| Scenario::from_toml(toml).ok())
        .collect()
}

/// Get a built-in scenario by name (case-insensitive).
pub fn get_builtin_scenario(name: &str) -> Option<Scenario> {
    BUILTIN_SCENARIOS_TOML
        .iter()
        .find(|(builtin, _)| builtin.eq_ignore_ascii_case(name))
        .and_then(|(_, toml)| Scenario::from_toml(toml).ok())
}

/// Returns true if `name` is a built-in scenario.
pub fn is_builtin_scenario(name: &str) -> bool {
    BUILTIN_SCENARIO_NAMES
        .iter()
        .any(|builtin| builtin.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_scenario;

    #[test]
    fn every_builtin_parses() {
        for (name, toml) in BUILTIN_SCENARIOS_TOML {
            let scenario = Scenario::from_toml(toml)
                .unwrap_or_else(|e| panic!("builtin '{name}' does not parse: {e}"));
            assert_eq!(&scenario.name, name);
        }
        assert_eq!(builtin_scenarios().len(), BUILTIN_SCENARIO_NAMES.len());
    }

    #[test]
    fn every_builtin_validates() {
        for scenario in builtin_scenarios() {
            assert_eq!(validate_scenario(&scenario), Ok(()), "{}", scenario.name);
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(get_builtin_scenario("PAD-MULTI-LANE").is_some());
        assert!(is_builtin_scenario("Tocodec-Lane"));
        assert!(get_builtin_scenario("nope").is_none());
        assert!(!is_builtin_scenario("nope"));
    }

    #[test]
    fn names_match_table() {
        let table: Vec<_> = BUILTIN_SCENARIOS_TOML.iter().map(|(n, _)| *n).collect();
        assert_eq!(table, BUILTIN_SCENARIO_NAMES);
    }
}
