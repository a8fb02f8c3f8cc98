//! Scenario files and simulation sessions for tdmroute components.
//!
//! A scenario describes one routing experiment on an S4 block: the backends
//! feeding it, the mux selections made by the user, register reset values, and
//! the sequence of power events the engine delivers. Scenarios are stored as
//! TOML and run against a simulated register file.
//!
//! # Features
//!
//! - **Scenario files**: Load and save scenarios as TOML
//! - **Validation**: Catch bad geometry, event names, and register offsets early
//! - **Sessions**: Build the graph, deliver events, and report register updates
//! - **Built-in scenarios**: Reference routings for both blocks
//!
//! # Example
//!
//! ```rust
//! use tdmroute_config::{Session, get_builtin_scenario};
//!
//! let scenario = get_builtin_scenario("pad-single-lane").unwrap();
//! let mut session = Session::from_scenario(&scenario).unwrap();
//! let report = session.run().unwrap();
//!
//! assert!(report.all_ok());
//! // TDM_D5 selects TDM_A lane 0.
//! assert_eq!(report.register(0x4), Some(0));
//! ```

mod error;
mod scenario;

/// Scenario validation.
pub mod validation;

/// Scenario simulation.
pub mod session;

/// Built-in scenarios bundled with the library.
pub mod builtin;

pub use builtin::{
    BUILTIN_SCENARIO_NAMES, builtin_scenarios, get_builtin_scenario, is_builtin_scenario,
};
pub use error::ConfigError;
pub use scenario::{
    BackendConfig, EventConfig, FieldSpec, FieldsConfig, PreloadConfig, Scenario, SelectionConfig,
    StreamConfig,
};
pub use session::{Outcome, RegisterValue, Session, SessionReport, StepReport, WriteRecord};
pub use validation::{ValidationError, ValidationResult, validate_scenario};
