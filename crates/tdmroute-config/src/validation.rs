//! Scenario validation.
//!
//! Checks what can be checked without building the graph: stream geometry,
//! event and component names, register offsets against the component's
//! register map, and field layout overrides. Widget names are resolved when a
//! [`Session`](crate::Session) is built.
//!
//! # Example
//!
//! ```rust
//! use tdmroute_config::{Scenario, validate_scenario};
//!
//! let scenario = Scenario::new("empty", "pad-out").with_event("TDMA_OUT SEL", "pre-pmu");
//! assert!(validate_scenario(&scenario).is_ok());
//!
//! let bad = Scenario::new("typo", "pad-out").with_event("TDMA_OUT SEL", "pmu");
//! assert!(validate_scenario(&bad).is_err());
//! ```

use std::collections::HashSet;
use thiserror::Error;

use tdmroute_core::PowerEvent;
use tdmroute_platform::Block;

use crate::Scenario;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Unknown routing block.
    #[error("unknown component '{0}' (expected 'pad-out' or 'tocodec')")]
    UnknownComponent(String),

    /// Two backends share a name or playback widget.
    #[error("duplicate backend '{0}'")]
    DuplicateBackend(String),

    /// A stream with no channels.
    #[error("backend '{backend}': stream has zero channels")]
    ZeroChannels {
        /// Backend name.
        backend: String,
    },

    /// A stream with no slots per frame.
    #[error("backend '{backend}': stream has zero slots")]
    ZeroSlots {
        /// Backend name.
        backend: String,
    },

    /// A selection without any label.
    #[error("selection on '{0}' has no labels")]
    EmptySelection(String),

    /// Unparseable event name.
    #[error("event #{index}: unknown event '{name}'")]
    UnknownEvent {
        /// Position in the event list.
        index: usize,
        /// The offending name.
        name: String,
    },

    /// Register offset not on the register stride.
    #[error("register {reg:#x} is not aligned to {stride} bytes")]
    MisalignedRegister {
        /// Register offset.
        reg: u32,
        /// Register stride.
        stride: u32,
    },

    /// Register offset beyond the component's register map.
    #[error("register {reg:#x} is beyond the last register {max:#x}")]
    RegisterOutOfRange {
        /// Register offset.
        reg: u32,
        /// Highest valid offset.
        max: u32,
    },

    /// Malformed field descriptor.
    #[error("field '{field}': {reason}")]
    InvalidField {
        /// Field name.
        field: String,
        /// Description of the problem.
        reason: String,
    },

    /// Two fields share bits.
    #[error("fields '{0}' and '{1}' overlap")]
    OverlappingFields(String, String),

    /// Field overrides on a block without fields.
    #[error("component '{0}' has no configurable fields")]
    FieldsNotSupported(String),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a scenario, collecting every problem found.
pub fn validate_scenario(scenario: &Scenario) -> ValidationResult<()> {
    let mut errors = Vec::new();

    let block = match scenario.component.parse::<Block>() {
        Ok(block) => Some(block),
        Err(_) => {
            errors.push(ValidationError::UnknownComponent(scenario.component.clone()));
            None
        }
    };

    let mut names = HashSet::new();
    let mut widgets = HashSet::new();
    for backend in &scenario.backends {
        if !names.insert(backend.name.as_str()) {
            errors.push(ValidationError::DuplicateBackend(backend.name.clone()));
        } else if !widgets.insert(backend.widget.as_str()) {
            errors.push(ValidationError::DuplicateBackend(backend.widget.clone()));
        }
        if let Some(stream) = &backend.stream {
            if stream.channels == 0 {
                errors.push(ValidationError::ZeroChannels {
                    backend: backend.name.clone(),
                });
            }
            if stream.slots == 0 {
                errors.push(ValidationError::ZeroSlots {
                    backend: backend.name.clone(),
                });
            }
        }
    }

    for selection in &scenario.selections {
        if selection.labels.is_empty() {
            errors.push(ValidationError::EmptySelection(selection.widget.clone()));
        }
    }

    for (index, event) in scenario.events.iter().enumerate() {
        if event.event.parse::<PowerEvent>().is_err() {
            errors.push(ValidationError::UnknownEvent {
                index,
                name: event.event.clone(),
            });
        }
    }

    if let Some(block) = block {
        let config = block.regmap_config();
        for preload in &scenario.preload {
            if preload.reg % config.reg_stride != 0 {
                errors.push(ValidationError::MisalignedRegister {
                    reg: preload.reg,
                    stride: config.reg_stride,
                });
            } else if preload.reg > config.max_register {
                errors.push(ValidationError::RegisterOutOfRange {
                    reg: preload.reg,
                    max: config.max_register,
                });
            }
        }

        if scenario.fields.is_some() {
            if block == Block::ToCodec {
                validate_fields(scenario, &mut errors);
            } else {
                errors.push(ValidationError::FieldsNotSupported(block.name().to_string()));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else if errors.len() == 1 {
        Err(errors.remove(0))
    } else {
        Err(ValidationError::Multiple(errors))
    }
}

fn validate_fields(scenario: &Scenario, errors: &mut Vec<ValidationError>) {
    let fields = scenario.tocodec_fields();
    let config = Block::ToCodec.regmap_config();
    let mut well_formed = true;

    for (name, field) in fields.named() {
        let reason = if field.lsb > field.msb {
            Some(format!("lsb {} is above msb {}", field.lsb, field.msb))
        } else if field.msb > 31 {
            Some(format!("msb {} does not fit a 32-bit register", field.msb))
        } else if !config.is_valid(field.reg) {
            Some(format!("register {:#x} is not in the register map", field.reg))
        } else {
            None
        };
        if let Some(reason) = reason {
            well_formed = false;
            errors.push(ValidationError::InvalidField {
                field: name.to_string(),
                reason,
            });
        }
    }

    // Overlap checks need valid masks.
    if well_formed && let Some((a, b)) = fields.first_overlap() {
        errors.push(ValidationError::OverlappingFields(a.to_string(), b.to_string()));
    }
}
