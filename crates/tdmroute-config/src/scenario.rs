//! Scenario file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use tdmroute_core::{BackendEndpoint, Interface, RegField, Stream};
use tdmroute_platform::ToCodecFields;

use crate::error::ConfigError;

/// A routing scenario: one component, its backends, the graph selections,
/// and the power events to deliver.
///
/// # TOML Format
///
/// ```toml
/// name = "pad-single-lane"
/// description = "TDM_A, 4 channels in 4 slots, routed to TDM_D5"
/// component = "pad-out"
///
/// [[backends]]
/// name = "TDM-A"
/// dai_id = 0
/// widget = "TDM_A Playback"
/// links = ["TDMA_OUT SEL"]
/// [backends.stream]
/// channels = 4
/// slots = 4
/// mclk = "mst_a_mclk"
/// sclk = "mst_a_sclk"
///
/// [[selections]]
/// widget = "TDMA_OUT SEL"
/// labels = ["TDM_D5"]
///
/// [[preload]]
/// reg = 0x4
/// value = 0xFFFFFFFF
///
/// [[events]]
/// widget = "TDMA_OUT SEL"
/// event = "pre-pmu"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    /// Name of the scenario.
    pub name: String,

    /// Optional description of the scenario.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Routing block under test (`pad-out` or `tocodec`).
    pub component: String,

    /// Backend endpoints and the widgets they feed.
    #[serde(default)]
    pub backends: Vec<BackendConfig>,

    /// Mux/demux selections applied before any event.
    #[serde(default)]
    pub selections: Vec<SelectionConfig>,

    /// Register values loaded before any event.
    #[serde(default)]
    pub preload: Vec<PreloadConfig>,

    /// Field layout override (`tocodec` only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldsConfig>,

    /// Power events, delivered in order.
    #[serde(default)]
    pub events: Vec<EventConfig>,
}

/// A backend endpoint declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendConfig {
    /// DAI name.
    pub name: String,
    /// DAI id. TDM interfaces use 0.
    #[serde(default)]
    pub dai_id: u32,
    /// Playback widget name, identifies the TDM instance.
    pub widget: String,
    /// Widgets the playback widget connects to.
    #[serde(default)]
    pub links: Vec<String>,
    /// Active playback stream, absent when the backend is idle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<StreamConfig>,
}

impl BackendConfig {
    /// Create a backend declaration without links or stream.
    pub fn new(name: impl Into<String>, dai_id: u32, widget: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dai_id,
            widget: widget.into(),
            links: Vec::new(),
            stream: None,
        }
    }

    /// Add a link to a topology widget.
    pub fn with_link(mut self, widget: impl Into<String>) -> Self {
        self.links.push(widget.into());
        self
    }

    /// Set the playback stream.
    pub fn with_stream(mut self, stream: StreamConfig) -> Self {
        self.stream = Some(stream);
        self
    }

    /// Build the endpoint record.
    pub fn endpoint(&self) -> BackendEndpoint {
        let endpoint = BackendEndpoint::new(&self.name, self.dai_id, &self.widget);
        match &self.stream {
            Some(stream) => endpoint.with_playback(stream.stream()),
            None => endpoint,
        }
    }
}

/// Playback stream geometry and clocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamConfig {
    /// Channel count.
    pub channels: u32,
    /// TDM slots per frame.
    pub slots: u32,
    /// Master clock name.
    pub mclk: String,
    /// Serial (bit) clock name.
    pub sclk: String,
}

impl StreamConfig {
    /// Create a stream declaration.
    pub fn new(channels: u32, slots: u32, mclk: impl Into<String>, sclk: impl Into<String>) -> Self {
        Self {
            channels,
            slots,
            mclk: mclk.into(),
            sclk: sclk.into(),
        }
    }

    /// Build the stream descriptor.
    pub fn stream(&self) -> Stream {
        Stream::new(self.channels, self.slots, Interface::new(&self.mclk, &self.sclk))
    }
}

/// Labelled paths to connect on one routing widget; all others there are
/// disconnected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionConfig {
    /// Mux, demux, or switch widget.
    pub widget: String,
    /// Selector values to connect.
    pub labels: Vec<String>,
}

impl SelectionConfig {
    /// Create a selection.
    pub fn new<S: Into<String>>(widget: impl Into<String>, labels: impl IntoIterator<Item = S>) -> Self {
        Self {
            widget: widget.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }
}

/// Initial value of one register.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreloadConfig {
    /// Register offset.
    pub reg: u32,
    /// Register value.
    pub value: u32,
}

/// One bit field, as an inclusive `lsb..=msb` range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldSpec {
    /// Register offset.
    #[serde(default)]
    pub reg: u32,
    /// Lowest bit.
    pub lsb: u8,
    /// Highest bit (inclusive).
    pub msb: u8,
}

impl FieldSpec {
    /// The field descriptor. Not range-checked; see [`RegField::is_valid`].
    pub fn field(&self) -> RegField {
        RegField {
            reg: self.reg,
            lsb: self.lsb,
            msb: self.msb,
        }
    }
}

/// To-codec field layout overrides. Missing fields keep the S4 layout.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldsConfig {
    /// Data select.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dat_sel: Option<FieldSpec>,
    /// Frame clock select.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lrclk_sel: Option<FieldSpec>,
    /// Bit clock select.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bclk_sel: Option<FieldSpec>,
    /// Master clock select.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mclk_sel: Option<FieldSpec>,
}

impl FieldsConfig {
    /// Applies the overrides on top of `base`.
    pub fn apply(&self, base: ToCodecFields) -> ToCodecFields {
        ToCodecFields {
            dat_sel: self.dat_sel.map_or(base.dat_sel, |f| f.field()),
            lrclk_sel: self.lrclk_sel.map_or(base.lrclk_sel, |f| f.field()),
            bclk_sel: self.bclk_sel.map_or(base.bclk_sel, |f| f.field()),
            mclk_sel: self.mclk_sel.map_or(base.mclk_sel, |f| f.field()),
        }
    }
}

/// One power event delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventConfig {
    /// Widget receiving the event.
    pub widget: String,
    /// Event name: `pre-pmu`, `post-pmu`, `pre-pmd`, or `post-pmd`.
    pub event: String,
}

impl EventConfig {
    /// Create an event delivery.
    pub fn new(widget: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            widget: widget.into(),
            event: event.into(),
        }
    }
}

impl Scenario {
    /// Create a new empty scenario for `component`.
    pub fn new(name: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            component: component.into(),
            backends: Vec::new(),
            selections: Vec::new(),
            preload: Vec::new(),
            fields: None,
            events: Vec::new(),
        }
    }

    /// Create a scenario with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a backend.
    pub fn with_backend(mut self, backend: BackendConfig) -> Self {
        self.backends.push(backend);
        self
    }

    /// Add a selection.
    pub fn with_selection(mut self, selection: SelectionConfig) -> Self {
        self.selections.push(selection);
        self
    }

    /// Add a register preload.
    pub fn with_preload(mut self, reg: u32, value: u32) -> Self {
        self.preload.push(PreloadConfig { reg, value });
        self
    }

    /// Set the field layout override.
    pub fn with_fields(mut self, fields: FieldsConfig) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Add an event delivery.
    pub fn with_event(mut self, widget: impl Into<String>, event: impl Into<String>) -> Self {
        self.events.push(EventConfig::new(widget, event));
        self
    }

    /// Load a scenario from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let scenario: Scenario = toml::from_str(&content)?;
        Ok(scenario)
    }

    /// Load a scenario from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the scenario to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the scenario to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolved to-codec field layout: the S4 layout with any overrides.
    pub fn tocodec_fields(&self) -> ToCodecFields {
        let base = ToCodecFields::default();
        self.fields.map_or(base, |f| f.apply(base))
    }
}
