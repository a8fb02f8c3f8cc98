//! CLI command implementations.

pub mod clock;
pub mod label;
pub mod run;
pub mod scenarios;
pub mod topology;
