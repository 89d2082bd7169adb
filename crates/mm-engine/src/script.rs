//! Script-rendering engine.
//!
//! `ScriptEngine` accepts the full engine contract but executes nothing: it
//! checks what it can check locally (script files must exist and be text),
//! records each command in a shared [`CommandHistory`] and, if configured,
//! appends it to a [`CommandLog`]. Physics commands answer with empty tables
//! whose summary echoes the request.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use mm_core::{Mapping, Value};

use crate::command::{Command, range_label};
use crate::engine::{EngineOptions, ErrorSink, SimulationEngine};
use crate::error::{EngineError, EngineResult};
use crate::log::CommandLog;
use crate::request::{ApertureRequest, MatchRequest, SurveyRequest, Table, TwissRequest};

/// Shared, clonable view of the commands an engine has accepted.
#[derive(Clone, Debug, Default)]
pub struct CommandHistory(Rc<RefCell<Vec<Command>>>);

impl CommandHistory {
    pub fn commands(&self) -> Vec<Command> {
        self.0.borrow().clone()
    }

    /// Rendered MAD-X text of every command, in issue order.
    pub fn rendered(&self) -> Vec<String> {
        self.0.borrow().iter().map(Command::to_madx).collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Number of recorded commands with the given keyword.
    pub fn count(&self, keyword: &str) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|cmd| cmd.keyword() == keyword)
            .count()
    }

    fn push(&self, command: Command) {
        self.0.borrow_mut().push(command);
    }
}

pub struct ScriptEngine {
    history: CommandHistory,
    log: Option<CommandLog>,
    error_log: Option<ErrorSink>,
    verbose: bool,
}

impl ScriptEngine {
    pub fn new(options: EngineOptions) -> EngineResult<Self> {
        let log = options
            .command_log
            .as_deref()
            .map(CommandLog::open)
            .transpose()?;
        Ok(Self {
            history: CommandHistory::default(),
            log,
            error_log: options.error_log,
            verbose: true,
        })
    }

    /// Handle on the command history; stays valid after the engine moves.
    pub fn history(&self) -> CommandHistory {
        self.history.clone()
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn issue(&mut self, command: Command) -> EngineResult<()> {
        tracing::debug!(command = command.keyword(), "{}", command.to_madx());
        if let Some(log) = &mut self.log {
            log.record(&command)?;
        }
        self.history.push(command);
        Ok(())
    }

    fn reject(&mut self, command: &Command, message: String) -> EngineError {
        let text = command.to_madx();
        match &mut self.error_log {
            Some(sink) => sink(&format!("{text}: {message}")),
            None => tracing::error!(command = %text, "{message}"),
        }
        EngineError::Command {
            command: text,
            message,
        }
    }

    fn answer(name: &str, sequence: &str, range: String) -> Table {
        let mut table = Table::new(name);
        table
            .summary
            .insert(Value::from("sequence"), Value::from(sequence));
        table.summary.insert(Value::from("range"), Value::from(range));
        table
    }
}

impl SimulationEngine for ScriptEngine {
    fn run_file(&mut self, path: &Path) -> EngineResult<()> {
        let command = Command::Call {
            file: path.to_path_buf(),
        };
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.reject(&command, e.to_string())),
        };
        if std::str::from_utf8(&bytes).is_err() {
            return Err(self.reject(&command, "script is not valid text".to_string()));
        }
        self.issue(command)
    }

    fn define_beam(&mut self, params: &Mapping) -> EngineResult<()> {
        self.issue(Command::Beam {
            params: params.clone(),
        })
    }

    fn twiss(&mut self, request: &TwissRequest) -> EngineResult<Table> {
        self.issue(Command::Twiss(request.clone()))?;
        Ok(Self::answer(
            "twiss",
            &request.sequence,
            request.range.to_string(),
        ))
    }

    fn survey(&mut self, request: &SurveyRequest) -> EngineResult<Table> {
        self.issue(Command::Survey(request.clone()))?;
        Ok(Self::answer(
            "survey",
            &request.sequence,
            range_label(request.range.as_ref()),
        ))
    }

    fn aperture(&mut self, request: &ApertureRequest) -> EngineResult<Table> {
        let command = Command::Aperture(request.clone());
        if let Some(offsets) = &request.offsets
            && !offsets.is_file()
        {
            let message = format!("offsets file {} does not exist", offsets.display());
            return Err(self.reject(&command, message));
        }
        self.issue(command)?;
        Ok(Self::answer(
            "aperture",
            &request.sequence,
            request.range.to_string(),
        ))
    }

    fn match_(&mut self, request: &MatchRequest) -> EngineResult<Table> {
        self.issue(Command::Match(request.clone()))?;
        Ok(Self::answer(
            "match",
            &request.sequence,
            request.range.to_string(),
        ))
    }

    fn set_verbose(&mut self, verbose: bool) -> EngineResult<()> {
        self.verbose = verbose;
        self.issue(Command::Verbose(verbose))
    }
}
