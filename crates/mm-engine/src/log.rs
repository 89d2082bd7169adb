//! Command log: a replayable MAD-X transcript of every issued command.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::command::Command;
use crate::error::{EngineError, EngineResult};

pub struct CommandLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl CommandLog {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: &Path) -> EngineResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(EngineError::Log)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one command. Flushed immediately so the log survives a crash
    /// of whatever runs next.
    pub fn record(&mut self, command: &Command) -> EngineResult<()> {
        writeln!(self.writer, "{}", command.to_madx()).map_err(EngineError::Log)?;
        self.writer.flush().map_err(EngineError::Log)
    }
}
