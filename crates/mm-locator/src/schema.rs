//! Model definition schema.
//!
//! Definition documents map model names to [`ModelDef`] entries:
//!
//! ```yaml
//! LHC:
//!   real: true
//!   extends: [LHC_BASE]
//!   path-offsets:
//!     repository-offset: lhc
//!   init-files: [base.seq]
//!   beams:
//!     b1: {particle: proton, energy: 450}
//!   optics:
//!     nominal: {init-files: [opt.str]}
//!   sequences:
//!     lhcb1:
//!       beam: b1
//!       default-range: all
//!       ranges:
//!         all:
//!           madx-range: {first: "#s", last: "#e"}
//!           default-twiss: std
//!           twiss-initial-conditions:
//!             std: {betx: 1, bety: 1}
//!   default-optic: nominal
//!   default-sequence: lhcb1
//! ```
//!
//! Entries are merged as untyped mappings first (see `Locator::resolve`)
//! and only the expanded result is parsed into these types.

use std::path::PathBuf;

use indexmap::IndexMap;
use mm_core::{Mapping, Value};
use serde::{Deserialize, Serialize};

use crate::LocatorResult;
use crate::error::LocatorError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ModelDef {
    #[serde(default)]
    pub real: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    #[serde(default)]
    pub beams: IndexMap<String, Mapping>,
    #[serde(default)]
    pub optics: IndexMap<String, OpticDef>,
    #[serde(default)]
    pub sequences: IndexMap<String, SequenceDef>,
    #[serde(default)]
    pub init_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_optic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sequence: Option<String>,
    #[serde(default, alias = "path-offset", skip_serializing_if = "Option::is_none")]
    pub path_offsets: Option<PathOffsets>,
    /// Filesystem roots that replace the namespace repository when present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dbdirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct OpticDef {
    #[serde(default)]
    pub init_files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct SequenceDef {
    pub beam: String,
    pub default_range: String,
    #[serde(default)]
    pub ranges: IndexMap<String, RangeDef>,
    /// Aperture definition files, run once before the first aperture query.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aperfiles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct RangeDef {
    pub madx_range: MadxRange,
    pub default_twiss: String,
    #[serde(default)]
    pub twiss_initial_conditions: IndexMap<String, Mapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aper_offset: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MadxRange {
    pub first: String,
    pub last: String,
}

/// Where a model's data files live relative to the resource namespace.
///
/// Accepts either a full mapping or a bare string, which is taken as the
/// repository offset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "kebab-case", from = "PathOffsetsRepr")]
pub struct PathOffsets {
    pub repository_offset: String,
    pub resource_offset: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PathOffsetsRepr {
    Repository(String),
    #[serde(rename_all = "kebab-case")]
    Full {
        #[serde(default)]
        repository_offset: String,
        #[serde(default)]
        resource_offset: String,
    },
}

impl From<PathOffsetsRepr> for PathOffsets {
    fn from(repr: PathOffsetsRepr) -> Self {
        match repr {
            PathOffsetsRepr::Repository(repository_offset) => Self {
                repository_offset,
                resource_offset: String::new(),
            },
            PathOffsetsRepr::Full {
                repository_offset,
                resource_offset,
            } => Self {
                repository_offset,
                resource_offset,
            },
        }
    }
}

/// A fully expanded definition: the merged raw mapping plus its typed view.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDefinition {
    pub name: String,
    /// Expanded mapping, unknown keys included.
    pub data: Mapping,
    pub model: ModelDef,
}

impl ModelDefinition {
    pub fn from_expanded(name: &str, data: Mapping) -> LocatorResult<Self> {
        let model: ModelDef = serde_yaml::from_value(Value::Mapping(data.clone())).map_err(
            |source| LocatorError::Malformed {
                name: name.to_string(),
                source,
            },
        )?;
        Ok(Self {
            name: name.to_string(),
            data,
            model,
        })
    }

    pub fn repository_offset(&self) -> &str {
        self.model
            .path_offsets
            .as_ref()
            .map_or("", |p| p.repository_offset.as_str())
    }

    pub fn resource_offset(&self) -> &str {
        self.model
            .path_offsets
            .as_ref()
            .map_or("", |p| p.resource_offset.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_entry() {
        let def: ModelDef = serde_yaml::from_str("real: true\n").unwrap();
        assert!(def.real);
        assert!(def.beams.is_empty());
        assert!(def.path_offsets.is_none());
    }

    #[test]
    fn path_offsets_accept_both_shapes() {
        let def: ModelDef = serde_yaml::from_str(
            "path-offsets: {repository-offset: lhc, resource-offset: res}\n",
        )
        .unwrap();
        assert_eq!(
            def.path_offsets,
            Some(PathOffsets {
                repository_offset: "lhc".into(),
                resource_offset: "res".into(),
            })
        );

        let def: ModelDef = serde_yaml::from_str("path-offset: sps\n").unwrap();
        assert_eq!(def.path_offsets.unwrap().repository_offset, "sps");
    }

    #[test]
    fn sequences_keep_declaration_order() {
        let def: ModelDef = serde_yaml::from_str(
            r##"
beams: {b1: {particle: proton}}
sequences:
  zeta:
    beam: b1
    default-range: all
    ranges:
      all: {madx-range: {first: "#s", last: "#e"}, default-twiss: d}
  alpha:
    beam: b1
    default-range: all
    ranges:
      all: {madx-range: {first: "#s", last: "#e"}, default-twiss: d}
"##,
        )
        .unwrap();
        let names: Vec<_> = def.sequences.keys().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        let range = &def.sequences["zeta"].ranges["all"];
        assert_eq!(range.madx_range.first, "#s");
        assert!(range.twiss_initial_conditions.is_empty());
    }

    #[test]
    fn malformed_entry_is_reported() {
        let data: Mapping = serde_yaml::from_str("sequences: {s: {beam: 3}}\n").unwrap();
        assert!(matches!(
            ModelDefinition::from_expanded("X", data),
            Err(LocatorError::Malformed { .. })
        ));
    }
}
