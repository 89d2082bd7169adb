//! Requests sent to the engine and the tables it returns.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use mm_core::Mapping;

/// First/last element names delimiting part of a sequence.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub first: String,
    pub last: String,
}

impl Bounds {
    /// Marker for the start of a sequence.
    pub const START: &'static str = "#s";
    /// Marker for the end of a sequence.
    pub const END: &'static str = "#e";

    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
        }
    }

    /// Bounds covering the whole sequence.
    pub fn full() -> Self {
        Self::new(Self::START, Self::END)
    }

    pub fn is_full(&self) -> bool {
        self.first == Self::START && self.last == Self::END
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.first, self.last)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TwissRequest {
    pub sequence: String,
    pub range: Bounds,
    pub twiss_init: Mapping,
    /// Further engine keywords, passed through verbatim.
    pub extra: Mapping,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SurveyRequest {
    pub sequence: String,
    /// `None` surveys the whole sequence.
    pub range: Option<Bounds>,
    pub initial: Mapping,
    pub extra: Mapping,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApertureRequest {
    pub sequence: String,
    pub range: Bounds,
    /// Local path of an element offsets table.
    pub offsets: Option<PathBuf>,
    pub extra: Mapping,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchRequest {
    pub sequence: String,
    pub range: Bounds,
    pub twiss_init: Mapping,
    /// One keyword mapping per `constraint` statement.
    pub constraints: Vec<Mapping>,
    /// Names of the knobs to vary.
    pub vary: Vec<String>,
    /// Minimization method, e.g. `lmdif`.
    pub method: String,
    pub extra: Mapping,
}

/// Tabular engine output: a summary mapping plus named numeric columns.
///
/// The model layer passes tables through without interpreting them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub name: String,
    pub summary: Mapping,
    pub columns: BTreeMap<String, Vec<f64>>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Number of rows, taken from the longest column.
    pub fn len(&self) -> usize {
        self.columns.values().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
