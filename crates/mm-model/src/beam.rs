use std::cell::Cell;

use mm_core::Mapping;

use crate::error::ModelResult;
use crate::model::Model;
use crate::state::LoadState;

/// Particle beam declaration: the keyword parameters of one `beam` command.
#[derive(Debug)]
pub(crate) struct Beam {
    name: String,
    params: Mapping,
    state: Cell<LoadState>,
}

impl Beam {
    pub(crate) fn new(name: &str, params: Mapping) -> Self {
        Self {
            name: name.to_string(),
            params,
            state: Cell::new(LoadState::Unloaded),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BeamHandle<'m> {
    model: &'m Model,
    beam: &'m Beam,
}

impl<'m> BeamHandle<'m> {
    pub(crate) fn new(model: &'m Model, beam: &'m Beam) -> Self {
        Self { model, beam }
    }

    pub fn name(&self) -> &'m str {
        &self.beam.name
    }

    pub fn params(&self) -> &'m Mapping {
        &self.beam.params
    }

    pub fn state(&self) -> LoadState {
        self.beam.state.get()
    }

    pub fn model(&self) -> &'m Model {
        self.model
    }

    /// Declare the beam in the engine, activating the model first.
    pub fn load(&self) -> ModelResult<()> {
        if !self.beam.state.get().is_unloaded() {
            return Ok(());
        }
        self.model.load()?;
        // Model activation defines the beams of all sequences.
        if !self.beam.state.get().is_unloaded() {
            return Ok(());
        }

        self.beam.state.set(LoadState::Loading);
        tracing::debug!(model = %self.model.name(), beam = %self.beam.name, "defining beam");
        self.model
            .with_engine(|engine| engine.define_beam(&self.beam.params))?;
        self.beam.state.set(LoadState::Loaded);
        Ok(())
    }
}
