//! Cross-reference validation of expanded definitions.

use crate::schema::ModelDef;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Model is not instantiable (real: false)")]
    NotReal,

    #[error("Unsupported key in a single-model document: {key}")]
    Unsupported { key: String },
}

/// Check that every name a definition refers to is declared.
///
/// Initial-condition sets are not checked here; a range whose default set is
/// missing fails when it is queried.
pub fn validate_model(model: &ModelDef) -> Result<(), ValidationError> {
    if !model.real {
        return Err(ValidationError::NotReal);
    }

    for (name, sequence) in &model.sequences {
        if !model.beams.contains_key(&sequence.beam) {
            return Err(ValidationError::MissingReference {
                id: sequence.beam.clone(),
                context: format!("sequence {name} beam"),
            });
        }
        if !sequence.ranges.contains_key(&sequence.default_range) {
            return Err(ValidationError::MissingReference {
                id: sequence.default_range.clone(),
                context: format!("sequence {name} default-range"),
            });
        }
    }

    if let Some(optic) = &model.default_optic
        && !model.optics.contains_key(optic)
    {
        return Err(ValidationError::MissingReference {
            id: optic.clone(),
            context: "default-optic".to_string(),
        });
    }

    if let Some(sequence) = &model.default_sequence
        && !model.sequences.contains_key(sequence)
    {
        return Err(ValidationError::MissingReference {
            id: sequence.clone(),
            context: "default-sequence".to_string(),
        });
    }

    Ok(())
}
