//! mm-engine: the simulation engine seam.
//!
//! Provides:
//! - [`SimulationEngine`] trait that model activation and queries talk to
//! - request types for the physics commands (twiss, survey, aperture, match)
//! - [`Command`] with MAD-X text rendering
//! - [`ScriptEngine`], an engine that renders and records commands instead of
//!   executing them, optionally appending them to a command log file
//!
//! # Architecture
//!
//! Everything above this crate sees the engine only through the trait, so a
//! binding to a live MAD-X process plugs in without touching the model layer.

pub mod command;
pub mod engine;
pub mod error;
pub mod log;
pub mod request;
pub mod script;

pub use command::Command;
pub use engine::{EngineOptions, ErrorSink, SimulationEngine};
pub use error::{EngineError, EngineResult};
pub use log::CommandLog;
pub use request::{
    ApertureRequest, Bounds, MatchRequest, SurveyRequest, Table, TwissRequest,
};
pub use script::{CommandHistory, ScriptEngine};
