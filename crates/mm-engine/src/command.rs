//! Engine commands and their MAD-X text form.

use std::path::PathBuf;

use mm_core::{Mapping, Value};

use crate::request::{ApertureRequest, Bounds, MatchRequest, SurveyRequest, TwissRequest};

/// One command as issued to an engine.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Call { file: PathBuf },
    Verbose(bool),
    Beam { params: Mapping },
    Twiss(TwissRequest),
    Survey(SurveyRequest),
    Aperture(ApertureRequest),
    Match(MatchRequest),
}

impl Command {
    /// Short command name, as used in log lines.
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Call { .. } => "call",
            Command::Verbose(_) => "option",
            Command::Beam { .. } => "beam",
            Command::Twiss(_) => "twiss",
            Command::Survey(_) => "survey",
            Command::Aperture(_) => "aperture",
            Command::Match(_) => "match",
        }
    }

    /// Render as MAD-X input. Multi-statement commands are newline separated.
    pub fn to_madx(&self) -> String {
        match self {
            Command::Call { file } => {
                format!("call, file={};", quote(&file.to_string_lossy()))
            }
            Command::Verbose(on) => {
                let sign = if *on { "" } else { "-" };
                format!("option, {sign}echo, {sign}warn, {sign}info;")
            }
            Command::Beam { params } => Statement::new("beam").keywords(params).finish(),
            Command::Twiss(req) => Statement::new("twiss")
                .arg("sequence", &req.sequence)
                .arg("range", &req.range.to_string())
                .keywords(&req.twiss_init)
                .keywords(&req.extra)
                .finish(),
            Command::Survey(req) => {
                let mut stmt = Statement::new("survey").arg("sequence", &req.sequence);
                if let Some(range) = &req.range {
                    stmt = stmt.arg("range", &range.to_string());
                }
                stmt.keywords(&req.initial).keywords(&req.extra).finish()
            }
            Command::Aperture(req) => {
                let mut stmt = Statement::new("aperture").arg("range", &req.range.to_string());
                if let Some(offsets) = &req.offsets {
                    stmt = stmt.raw("offsetelem", quote(&offsets.to_string_lossy()));
                }
                let aperture = stmt.keywords(&req.extra).finish();
                format!("use, sequence={};\n{aperture}", req.sequence)
            }
            Command::Match(req) => render_match(req),
        }
    }
}

fn render_match(req: &MatchRequest) -> String {
    let mut lines = vec![
        Statement::new("match")
            .arg("sequence", &req.sequence)
            .keywords(&req.twiss_init)
            .keywords(&req.extra)
            .finish(),
    ];
    for constraint in &req.constraints {
        let mut stmt = Statement::new("constraint");
        if mm_core::get(constraint, "range").is_none() {
            stmt = stmt.arg("range", &req.range.to_string());
        }
        lines.push(stmt.keywords(constraint).finish());
    }
    for knob in &req.vary {
        lines.push(Statement::new("vary").arg("name", knob).finish());
    }
    lines.push(format!("{};", req.method));
    lines.push("endmatch;".to_string());
    lines.join("\n")
}

/// Builder for one `name, key=value, ...;` statement.
struct Statement {
    text: String,
}

impl Statement {
    fn new(name: &str) -> Self {
        Self {
            text: name.to_string(),
        }
    }

    fn raw(mut self, key: &str, value: String) -> Self {
        self.text.push_str(&format!(", {key}={value}"));
        self
    }

    fn arg(self, key: &str, value: &str) -> Self {
        self.raw(key, bare_or_quoted(value))
    }

    /// Append every entry of `params`; `null` values are skipped.
    fn keywords(mut self, params: &Mapping) -> Self {
        for (key, value) in mm_core::string_entries(params) {
            if let Some(rendered) = render_value(value) {
                self = self.raw(key, rendered);
            }
        }
        self
    }

    fn finish(mut self) -> String {
        self.text.push(';');
        self.text
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\\\""))
}

fn bare_or_quoted(s: &str) -> String {
    let bare = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_.#$/+-*[]()".contains(c));
    if bare { s.to_string() } else { quote(s) }
}

fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(bare_or_quoted(s)),
        Value::Sequence(items) => {
            let items: Vec<String> = items.iter().filter_map(render_value).collect();
            Some(format!("{{{}}}", items.join(", ")))
        }
        Value::Mapping(map) => {
            let items: Vec<String> = mm_core::string_entries(map)
                .filter_map(|(k, v)| render_value(v).map(|v| format!("{k}={v}")))
                .collect();
            Some(format!("{{{}}}", items.join(", ")))
        }
        Value::Tagged(tagged) => render_value(&tagged.value),
    }
}

/// Shorthand used by the engine when it reports the range of a request.
pub(crate) fn range_label(range: Option<&Bounds>) -> String {
    range.map_or_else(|| "full".to_string(), Bounds::to_string)
}
