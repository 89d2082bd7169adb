//! The model graph root.

use std::cell::{Cell, RefCell};

use indexmap::IndexMap;
use mm_core::Mapping;
use mm_engine::{EngineResult, SimulationEngine};
use mm_locator::ModelDefinition;
use mm_resource::ResourceProvider;

use crate::beam::{Beam, BeamHandle};
use crate::error::{ModelError, ModelResult};
use crate::optic::{Optic, OpticHandle};
use crate::sequence::{Sequence, SequenceHandle};
use crate::state::LoadState;

/// A complete machine description bound to one simulation engine.
///
/// Beams, optics and sequences are owned here and reached through borrowed
/// handles. Nothing is sent to the engine until [`Model::load`] (or a query)
/// activates the parts involved; every activation happens at most once.
pub struct Model {
    definition: ModelDefinition,
    repository: Box<dyn ResourceProvider>,
    engine: RefCell<Box<dyn SimulationEngine>>,
    state: Cell<LoadState>,
    beams: IndexMap<String, Beam>,
    optics: IndexMap<String, Optic>,
    sequences: IndexMap<String, Sequence>,
}

impl Model {
    /// Build the graph for an expanded definition. Issues no engine commands.
    pub fn new(
        definition: ModelDefinition,
        repository: Box<dyn ResourceProvider>,
        engine: Box<dyn SimulationEngine>,
    ) -> Self {
        let def = &definition.model;
        let beams = def
            .beams
            .iter()
            .map(|(name, params)| (name.clone(), Beam::new(name, params.clone())))
            .collect();
        let optics = def
            .optics
            .iter()
            .map(|(name, def)| (name.clone(), Optic::new(name, def.clone())))
            .collect();
        let sequences = def
            .sequences
            .iter()
            .map(|(name, def)| (name.clone(), Sequence::new(name, def.clone())))
            .collect();

        Self {
            definition,
            repository,
            engine: RefCell::new(engine),
            state: Cell::new(LoadState::Unloaded),
            beams,
            optics,
            sequences,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// The expanded definition mapping, unknown keys included.
    pub fn data(&self) -> &Mapping {
        &self.definition.data
    }

    pub fn definition(&self) -> &ModelDefinition {
        &self.definition
    }

    pub fn repository(&self) -> &dyn ResourceProvider {
        self.repository.as_ref()
    }

    pub fn state(&self) -> LoadState {
        self.state.get()
    }

    /// Activate the model: run its init files, then define the beam of every
    /// sequence, in definition order.
    pub fn load(&self) -> ModelResult<()> {
        if !self.state.get().is_unloaded() {
            return Ok(());
        }
        self.state.set(LoadState::Loading);
        tracing::debug!(model = %self.name(), "loading model");

        self.call_files(&self.definition.model.init_files)?;
        for sequence in self.sequences() {
            sequence.beam()?.load()?;
        }

        self.state.set(LoadState::Loaded);
        tracing::debug!(model = %self.name(), "model loaded");
        Ok(())
    }

    pub fn beams(&self) -> impl Iterator<Item = BeamHandle<'_>> {
        self.beams.values().map(|beam| BeamHandle::new(self, beam))
    }

    pub fn beam(&self, name: &str) -> ModelResult<BeamHandle<'_>> {
        self.beams
            .get(name)
            .map(|beam| BeamHandle::new(self, beam))
            .ok_or_else(|| ModelError::not_found("beam", name))
    }

    pub fn optics(&self) -> impl Iterator<Item = OpticHandle<'_>> {
        self.optics.values().map(|optic| OpticHandle::new(self, optic))
    }

    pub fn optic(&self, name: &str) -> ModelResult<OpticHandle<'_>> {
        self.optics
            .get(name)
            .map(|optic| OpticHandle::new(self, optic))
            .ok_or_else(|| ModelError::not_found("optic", name))
    }

    pub fn sequences(&self) -> impl Iterator<Item = SequenceHandle<'_>> {
        self.sequences
            .values()
            .map(|sequence| SequenceHandle::new(self, sequence))
    }

    pub fn sequence(&self, name: &str) -> ModelResult<SequenceHandle<'_>> {
        self.sequences
            .get(name)
            .map(|sequence| SequenceHandle::new(self, sequence))
            .ok_or_else(|| ModelError::not_found("sequence", name))
    }

    pub fn default_optic(&self) -> ModelResult<OpticHandle<'_>> {
        match &self.definition.model.default_optic {
            Some(name) => self.optic(name),
            None => Err(ModelError::not_found("default optic", self.name())),
        }
    }

    pub fn default_sequence(&self) -> ModelResult<SequenceHandle<'_>> {
        match &self.definition.model.default_sequence {
            Some(name) => self.sequence(name),
            None => Err(ModelError::not_found("default sequence", self.name())),
        }
    }

    /// Run repository files through the engine, in order.
    pub(crate) fn call_files(&self, files: &[String]) -> ModelResult<()> {
        for file in files {
            let resource = self.repository.get(file)?;
            let path = resource.local_path()?;
            tracing::debug!(model = %self.name(), file = %file, "calling file");
            self.with_engine(|engine| engine.run_file(&path))?;
        }
        Ok(())
    }

    /// Borrow the engine for a single call.
    pub(crate) fn with_engine<T>(
        &self,
        call: impl FnOnce(&mut dyn SimulationEngine) -> EngineResult<T>,
    ) -> ModelResult<T> {
        let mut engine = self.engine.borrow_mut();
        Ok(call(engine.as_mut())?)
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name())
            .field("state", &self.state.get())
            .field("repository", &self.repository.describe())
            .finish_non_exhaustive()
    }
}
