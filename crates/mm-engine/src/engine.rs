//! SimulationEngine trait for pluggable engine backends.

use std::path::{Path, PathBuf};

use mm_core::Mapping;

use crate::error::EngineResult;
use crate::request::{ApertureRequest, MatchRequest, SurveyRequest, Table, TwissRequest};

/// Receives engine error messages before the error is returned to the caller.
pub type ErrorSink = Box<dyn FnMut(&str)>;

/// Construction-time engine options.
#[derive(Default)]
pub struct EngineOptions {
    /// File every issued command is appended to.
    pub command_log: Option<PathBuf>,
    /// Where engine error messages go. `None` reports through `tracing`.
    pub error_log: Option<ErrorSink>,
}

/// A stateful simulation engine.
///
/// Implementations keep whatever state earlier commands established (loaded
/// files, declared beams). Callers are expected to issue every declaration
/// at most once; engines may reject or silently repeat redundant ones.
pub trait SimulationEngine {
    /// Execute a script file.
    fn run_file(&mut self, path: &Path) -> EngineResult<()>;

    /// Declare a beam from keyword parameters.
    fn define_beam(&mut self, params: &Mapping) -> EngineResult<()>;

    fn twiss(&mut self, request: &TwissRequest) -> EngineResult<Table>;

    fn survey(&mut self, request: &SurveyRequest) -> EngineResult<Table>;

    fn aperture(&mut self, request: &ApertureRequest) -> EngineResult<Table>;

    fn match_(&mut self, request: &MatchRequest) -> EngineResult<Table>;

    /// Toggle engine echo/warning output.
    fn set_verbose(&mut self, _verbose: bool) -> EngineResult<()> {
        Ok(())
    }
}
