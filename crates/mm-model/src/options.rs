//! Caller overrides for physics queries.
//!
//! Each query takes an options struct instead of free-form keywords. The
//! `extra` mapping passes further engine keywords through verbatim, but may
//! not name anything the model layer sets itself.

use std::path::PathBuf;

use mm_core::{Mapping, Value};

use crate::error::{ModelError, ModelResult};

/// Keywords the model layer fills in; rejected in `extra`.
pub const RESERVED_KEYS: [&str; 4] = ["sequence", "range", "twiss_init", "offsets"];

/// Initial-condition parameters that carry over into a match.
pub const MATCH_PARAMETERS: [&str; 18] = [
    "rmatrix", "chrom", "beta0", "deltap", "betx", "alfx", "mux", "x", "px", "dx", "dpx", "bety",
    "alfy", "muy", "y", "py", "dy", "dpy",
];

/// Whether `key` is accepted as a match initial condition (case-insensitive).
pub fn is_match_param(key: &str) -> bool {
    MATCH_PARAMETERS.iter().any(|p| p.eq_ignore_ascii_case(key))
}

fn check_extra(extra: &Mapping) -> ModelResult<()> {
    for (key, _) in mm_core::string_entries(extra) {
        if RESERVED_KEYS.iter().any(|r| r.eq_ignore_ascii_case(key)) {
            return Err(ModelError::InvalidArgument(format!(
                "`{key}` is set by the model and cannot be passed as an extra keyword"
            )));
        }
    }
    if extra.keys().any(|k| !k.is_string()) {
        return Err(ModelError::InvalidArgument(
            "extra keywords must be strings".to_string(),
        ));
    }
    Ok(())
}

fn put(map: &mut Mapping, key: &str, value: impl Into<Value>) {
    map.insert(mm_core::key(key), value.into());
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TwissOptions {
    /// Overrides applied on top of the range's default initial conditions.
    pub twiss_init: Mapping,
    pub extra: Mapping,
}

impl TwissOptions {
    pub fn init(mut self, key: &str, value: impl Into<Value>) -> Self {
        put(&mut self.twiss_init, key, value);
        self
    }

    pub fn extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        put(&mut self.extra, key, value);
        self
    }

    pub fn validate(&self) -> ModelResult<()> {
        check_extra(&self.extra)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurveyOptions {
    pub twiss_init: Mapping,
    pub extra: Mapping,
}

impl SurveyOptions {
    pub fn init(mut self, key: &str, value: impl Into<Value>) -> Self {
        put(&mut self.twiss_init, key, value);
        self
    }

    pub fn extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        put(&mut self.extra, key, value);
        self
    }

    pub fn validate(&self) -> ModelResult<()> {
        check_extra(&self.extra)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApertureOptions {
    /// Offsets table to use instead of the range's declared one.
    pub offsets: Option<PathBuf>,
    pub extra: Mapping,
}

impl ApertureOptions {
    pub fn offsets(mut self, path: impl Into<PathBuf>) -> Self {
        self.offsets = Some(path.into());
        self
    }

    pub fn extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        put(&mut self.extra, key, value);
        self
    }

    pub fn validate(&self) -> ModelResult<()> {
        check_extra(&self.extra)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchOptions {
    pub twiss_init: Mapping,
    pub constraints: Vec<Mapping>,
    pub vary: Vec<String>,
    pub method: String,
    pub extra: Mapping,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            twiss_init: Mapping::new(),
            constraints: Vec::new(),
            vary: Vec::new(),
            method: "lmdif".to_string(),
            extra: Mapping::new(),
        }
    }
}

impl MatchOptions {
    pub fn init(mut self, key: &str, value: impl Into<Value>) -> Self {
        put(&mut self.twiss_init, key, value);
        self
    }

    pub fn constraint(mut self, constraint: Mapping) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn vary(mut self, knob: impl Into<String>) -> Self {
        self.vary.push(knob.into());
        self
    }

    pub fn validate(&self) -> ModelResult<()> {
        check_extra(&self.extra)?;
        if self.method.trim().is_empty() {
            return Err(ModelError::InvalidArgument(
                "match method must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
