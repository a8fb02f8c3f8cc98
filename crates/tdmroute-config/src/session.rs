//! Scenario simulation.
//!
//! A [`Session`] plays the power-sequencing engine for one scenario: it builds
//! the block's topology in a [`RoutingGraph`], wires the backends in, applies
//! the selections and register preloads, then delivers the scenario's events
//! to the component one by one, recording the register updates each causes.

use serde::Serialize;

use tdmroute_core::{
    Component, PowerEvent, RegisterFile, RegisterMap, RegisterWrite, ResolverState, RoutingGraph,
};
use tdmroute_platform::Block;
use tdmroute_platform::tocodec::{OUT_EN, OUT_EN_SWITCH, output_enable};

use crate::error::ConfigError;
use crate::validation::{ValidationError, validate_scenario};
use crate::Scenario;

/// A scenario ready to run.
pub struct Session {
    scenario: Scenario,
    block: Block,
    graph: RoutingGraph,
    component: Box<dyn Component>,
    registers: RegisterFile,
    setup: Vec<RegisterWrite>,
}

impl Session {
    /// Validates `scenario` and builds its graph, component, and registers.
    pub fn from_scenario(scenario: &Scenario) -> Result<Self, ConfigError> {
        validate_scenario(scenario)?;
        let block: Block = scenario
            .component
            .parse()
            .map_err(|_| ValidationError::UnknownComponent(scenario.component.clone()))?;

        let mut graph = RoutingGraph::new();
        let component = block.attach(&mut graph, scenario.tocodec_fields())?;

        for backend in &scenario.backends {
            let widget = graph.add_backend(backend.endpoint())?;
            for link in &backend.links {
                let sink = graph.widget_id(link)?;
                graph.connect(widget, sink, None, true)?;
            }
        }

        let mut registers = RegisterFile::new(block.regmap_config());
        for preload in &scenario.preload {
            registers.preload(preload.reg, preload.value);
        }

        for selection in &scenario.selections {
            let widget = graph.widget_id(&selection.widget)?;
            let labels: Vec<&str> = selection.labels.iter().map(String::as_str).collect();
            graph.set_selection(widget, &labels)?;

            if block == Block::ToCodec && selection.widget == OUT_EN {
                let write = output_enable(labels.contains(&OUT_EN_SWITCH));
                registers.update_bits(write.reg, write.mask, write.value);
            }
        }
        let setup = registers.take_log();

        tracing::info!(
            "session '{}': {} on {} widgets, {} backends",
            scenario.name,
            block,
            graph.len(),
            scenario.backends.len()
        );

        Ok(Self {
            scenario: scenario.clone(),
            block,
            graph,
            component,
            registers,
            setup,
        })
    }

    /// The block under test.
    pub fn block(&self) -> Block {
        self.block
    }

    /// The simulated graph.
    pub fn graph(&self) -> &RoutingGraph {
        &self.graph
    }

    /// The simulated registers.
    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Delivers one event to a widget and records its outcome.
    pub fn fire(&mut self, widget: &str, event: PowerEvent) -> Result<StepReport, ConfigError> {
        let id = self.graph.widget_id(widget)?;
        let result = self
            .component
            .handle_event(&self.graph, &mut self.registers, id, event);
        let writes = self.registers.take_log();

        let outcome = match result {
            Ok(()) => {
                tracing::debug!("{widget} {event}: ok, {} writes", writes.len());
                Outcome::Ok
            }
            Err(err) => {
                tracing::warn!("{widget} {event}: {err}");
                Outcome::Error {
                    message: err.to_string(),
                    errno: err.errno(),
                    recoverable: err.is_recoverable(),
                }
            }
        };

        Ok(StepReport {
            widget: widget.to_string(),
            event: event.name(),
            outcome,
            state: state_name(self.component.state()),
            writes: writes.into_iter().map(WriteRecord::from).collect(),
        })
    }

    /// Delivers every scenario event in order.
    pub fn run(&mut self) -> Result<SessionReport, ConfigError> {
        let events = self.scenario.events.clone();
        let mut steps = Vec::with_capacity(events.len());
        for step in &events {
            let event: PowerEvent = step.event.parse().map_err(|_| ValidationError::UnknownEvent {
                index: steps.len(),
                name: step.event.clone(),
            })?;
            steps.push(self.fire(&step.widget, event)?);
        }

        Ok(SessionReport {
            scenario: self.scenario.name.clone(),
            component: self.block.name(),
            setup: self.setup.iter().copied().map(WriteRecord::from).collect(),
            steps,
            registers: self
                .registers
                .dump()
                .map(|(reg, value)| RegisterValue { reg, value })
                .collect(),
        })
    }
}

fn state_name(state: ResolverState) -> &'static str {
    match state {
        ResolverState::Idle => "idle",
        ResolverState::Resolving => "resolving",
        ResolverState::Applied => "applied",
        ResolverState::Failed => "failed",
    }
}

/// Result of running a scenario.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionReport {
    /// Scenario name.
    pub scenario: String,
    /// Block name.
    pub component: &'static str,
    /// Updates issued while applying selections.
    pub setup: Vec<WriteRecord>,
    /// One entry per delivered event.
    pub steps: Vec<StepReport>,
    /// Final register contents.
    pub registers: Vec<RegisterValue>,
}

impl SessionReport {
    /// Returns true if every event was accepted.
    pub fn all_ok(&self) -> bool {
        self.steps.iter().all(|s| s.outcome == Outcome::Ok)
    }

    /// Final value of `reg`, if it is in the register map.
    pub fn register(&self, reg: u32) -> Option<u32> {
        self.registers.iter().find(|r| r.reg == reg).map(|r| r.value)
    }
}

/// One delivered event.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StepReport {
    /// Widget the event was delivered to.
    pub widget: String,
    /// Event name.
    pub event: &'static str,
    /// Handler result.
    pub outcome: Outcome,
    /// Component state after the event.
    pub state: &'static str,
    /// Register updates, in order.
    pub writes: Vec<WriteRecord>,
}

/// Handler result.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// Event accepted.
    Ok,
    /// Event vetoed.
    Error {
        /// Error message.
        message: String,
        /// Negative errno reported to the engine.
        errno: i32,
        /// Whether a retry may succeed once the graph changes.
        recoverable: bool,
    },
}

/// One register update.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct WriteRecord {
    /// Register offset.
    pub reg: u32,
    /// Bits replaced.
    pub mask: u32,
    /// New bit values.
    pub value: u32,
}

impl From<RegisterWrite> for WriteRecord {
    fn from(write: RegisterWrite) -> Self {
        Self {
            reg: write.reg,
            mask: write.mask,
            value: write.value,
        }
    }
}

/// One register's final value.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RegisterValue {
    /// Register offset.
    pub reg: u32,
    /// Register value.
    pub value: u32,
}
