use std::cell::Cell;

use indexmap::IndexMap;
use mm_core::Mapping;
use mm_engine::{Bounds, SurveyRequest, Table, TwissRequest};
use mm_locator::SequenceDef;

use crate::beam::BeamHandle;
use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use crate::options::{ApertureOptions, MatchOptions, SurveyOptions, TwissOptions};
use crate::range::{Range, RangeHandle};

/// Arrangement of beam line elements, subdivided into named ranges.
#[derive(Debug)]
pub(crate) struct Sequence {
    pub(crate) name: String,
    def: SequenceDef,
    ranges: IndexMap<String, Range>,
    /// A twiss over the whole sequence has run.
    pub(crate) full_twiss_done: Cell<bool>,
    /// Aperture files have been run.
    aperture_prepared: Cell<bool>,
}

impl Sequence {
    pub(crate) fn new(name: &str, def: SequenceDef) -> Self {
        let ranges = def
            .ranges
            .iter()
            .map(|(range, range_def)| (range.clone(), Range::new(range, range_def.clone())))
            .collect();
        Self {
            name: name.to_string(),
            def,
            ranges,
            full_twiss_done: Cell::new(false),
            aperture_prepared: Cell::new(false),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SequenceHandle<'m> {
    model: &'m Model,
    sequence: &'m Sequence,
}

impl<'m> SequenceHandle<'m> {
    pub(crate) fn new(model: &'m Model, sequence: &'m Sequence) -> Self {
        Self { model, sequence }
    }

    pub fn name(&self) -> &'m str {
        &self.sequence.name
    }

    pub fn def(&self) -> &'m SequenceDef {
        &self.sequence.def
    }

    pub fn model(&self) -> &'m Model {
        self.model
    }

    pub fn beam(&self) -> ModelResult<BeamHandle<'m>> {
        self.model.beam(&self.sequence.def.beam)
    }

    pub fn ranges(&self) -> impl Iterator<Item = RangeHandle<'m>> + use<'m> {
        let (model, sequence) = (self.model, self.sequence);
        sequence
            .ranges
            .values()
            .map(move |range| RangeHandle::new(model, sequence, range))
    }

    pub fn range(&self, name: &str) -> ModelResult<RangeHandle<'m>> {
        self.sequence
            .ranges
            .get(name)
            .map(|range| RangeHandle::new(self.model, self.sequence, range))
            .ok_or_else(|| ModelError::not_found("range", name))
    }

    pub fn default_range(&self) -> ModelResult<RangeHandle<'m>> {
        self.range(&self.sequence.def.default_range)
    }

    /// Ad-hoc range between two elements. Not supported yet.
    pub fn range_between(&self, first: &str, last: &str) -> ModelResult<RangeHandle<'m>> {
        Err(ModelError::NotImplemented(format!(
            "ad-hoc range {first}/{last} in sequence {}",
            self.sequence.name
        )))
    }

    /// Whether a twiss over the whole sequence has run.
    pub fn full_twiss_done(&self) -> bool {
        self.sequence.full_twiss_done.get()
    }

    pub fn aperture_prepared(&self) -> bool {
        self.sequence.aperture_prepared.get()
    }

    pub fn load(&self) -> ModelResult<()> {
        self.model.load()
    }

    pub fn twiss(&self, options: &TwissOptions) -> ModelResult<Table> {
        self.default_range()?.twiss(options)
    }

    pub fn survey(&self, options: &SurveyOptions) -> ModelResult<Table> {
        self.default_range()?.survey(options)
    }

    pub fn aperture(&self, options: &ApertureOptions) -> ModelResult<Table> {
        self.default_range()?.aperture(options)
    }

    pub fn match_(&self, options: &MatchOptions) -> ModelResult<Table> {
        self.default_range()?.match_(options)
    }

    /// Survey the whole sequence without a range bound.
    pub fn survey_unbounded(&self, options: &SurveyOptions) -> ModelResult<Table> {
        options.validate()?;
        self.load()?;
        let request = SurveyRequest {
            sequence: self.sequence.name.clone(),
            range: None,
            initial: options.twiss_init.clone(),
            extra: options.extra.clone(),
        };
        self.model.with_engine(|engine| engine.survey(&request))
    }

    /// Run a full twiss if none has run yet, then the aperture files. Once.
    pub(crate) fn prepare_aperture(&self) -> ModelResult<()> {
        if self.sequence.aperture_prepared.get() {
            return Ok(());
        }

        if !self.sequence.full_twiss_done.get() {
            let twiss_init: Mapping = self.default_range()?.initial_conditions(None)?.clone();
            let request = TwissRequest {
                sequence: self.sequence.name.clone(),
                range: Bounds::full(),
                twiss_init,
                extra: Mapping::new(),
            };
            tracing::debug!(sequence = %self.sequence.name, "full twiss before aperture");
            self.model.with_engine(|engine| engine.twiss(&request))?;
            self.sequence.full_twiss_done.set(true);
        }

        self.model.call_files(&self.sequence.def.aperfiles)?;
        self.sequence.aperture_prepared.set(true);
        Ok(())
    }
}
