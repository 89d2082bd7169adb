use std::cell::Cell;

use mm_locator::OpticDef;

use crate::error::ModelResult;
use crate::model::Model;
use crate::state::LoadState;

/// Optical configuration variant, applied by running its init files.
#[derive(Debug)]
pub(crate) struct Optic {
    name: String,
    def: OpticDef,
    state: Cell<LoadState>,
}

impl Optic {
    pub(crate) fn new(name: &str, def: OpticDef) -> Self {
        Self {
            name: name.to_string(),
            def,
            state: Cell::new(LoadState::Unloaded),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct OpticHandle<'m> {
    model: &'m Model,
    optic: &'m Optic,
}

impl<'m> OpticHandle<'m> {
    pub(crate) fn new(model: &'m Model, optic: &'m Optic) -> Self {
        Self { model, optic }
    }

    pub fn name(&self) -> &'m str {
        &self.optic.name
    }

    pub fn init_files(&self) -> &'m [String] {
        &self.optic.def.init_files
    }

    pub fn state(&self) -> LoadState {
        self.optic.state.get()
    }

    pub fn load(&self) -> ModelResult<()> {
        if !self.optic.state.get().is_unloaded() {
            return Ok(());
        }
        self.model.load()?;

        self.optic.state.set(LoadState::Loading);
        tracing::debug!(model = %self.model.name(), optic = %self.optic.name, "loading optic");
        self.model.call_files(&self.optic.def.init_files)?;
        self.optic.state.set(LoadState::Loaded);
        Ok(())
    }
}
