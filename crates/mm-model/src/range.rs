use mm_core::Mapping;
use mm_engine::{ApertureRequest, Bounds, MatchRequest, SurveyRequest, Table, TwissRequest};
use mm_locator::RangeDef;
use mm_resource::Resource;

use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use crate::options::{ApertureOptions, MatchOptions, SurveyOptions, TwissOptions, is_match_param};
use crate::sequence::{Sequence, SequenceHandle};

/// Part of a sequence between two elements, with named initial-condition sets.
#[derive(Debug)]
pub(crate) struct Range {
    name: String,
    def: RangeDef,
}

impl Range {
    pub(crate) fn new(name: &str, def: RangeDef) -> Self {
        Self {
            name: name.to_string(),
            def,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RangeHandle<'m> {
    model: &'m Model,
    sequence: &'m Sequence,
    range: &'m Range,
}

impl<'m> RangeHandle<'m> {
    pub(crate) fn new(model: &'m Model, sequence: &'m Sequence, range: &'m Range) -> Self {
        Self {
            model,
            sequence,
            range,
        }
    }

    pub fn name(&self) -> &'m str {
        &self.range.name
    }

    pub fn def(&self) -> &'m RangeDef {
        &self.range.def
    }

    pub fn sequence(&self) -> SequenceHandle<'m> {
        SequenceHandle::new(self.model, self.sequence)
    }

    pub fn bounds(&self) -> Bounds {
        let madx = &self.range.def.madx_range;
        Bounds::new(&madx.first, &madx.last)
    }

    /// A named initial-condition set; the range's default set for `None`.
    pub fn initial_conditions(&self, name: Option<&str>) -> ModelResult<&'m Mapping> {
        let name = name.unwrap_or(&self.range.def.default_twiss);
        self.range
            .def
            .twiss_initial_conditions
            .get(name)
            .ok_or_else(|| ModelError::MissingInitialConditions {
                range: self.range.name.clone(),
                name: name.to_string(),
            })
    }

    /// The declared aperture offsets table, if any.
    pub fn offsets(&self) -> ModelResult<Option<Resource>> {
        match &self.range.def.aper_offset {
            Some(name) => Ok(Some(self.model.repository().get(name)?)),
            None => Ok(None),
        }
    }

    pub fn load(&self) -> ModelResult<()> {
        self.sequence().load()
    }

    /// Default initial conditions with the caller's overrides on top.
    fn merged_initial(&self, overrides: &Mapping) -> ModelResult<Mapping> {
        let mut merged = self.initial_conditions(None)?.clone();
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }
        Ok(merged)
    }

    pub fn twiss(&self, options: &TwissOptions) -> ModelResult<Table> {
        options.validate()?;
        self.load()?;
        let request = TwissRequest {
            sequence: self.sequence.name.clone(),
            range: self.bounds(),
            twiss_init: self.merged_initial(&options.twiss_init)?,
            extra: options.extra.clone(),
        };
        let table = self.model.with_engine(|engine| engine.twiss(&request))?;
        if request.range.is_full() {
            self.sequence.full_twiss_done.set(true);
        }
        Ok(table)
    }

    pub fn survey(&self, options: &SurveyOptions) -> ModelResult<Table> {
        options.validate()?;
        self.load()?;
        let request = SurveyRequest {
            sequence: self.sequence.name.clone(),
            range: Some(self.bounds()),
            initial: self.merged_initial(&options.twiss_init)?,
            extra: options.extra.clone(),
        };
        self.model.with_engine(|engine| engine.survey(&request))
    }

    /// Run aperture on this range, preparing the sequence first if needed.
    ///
    /// Without caller offsets, a declared `aper-offset` resource is exposed
    /// as a local file for the duration of the engine call.
    pub fn aperture(&self, options: &ApertureOptions) -> ModelResult<Table> {
        options.validate()?;
        self.load()?;
        self.sequence().prepare_aperture()?;

        let mut request = ApertureRequest {
            sequence: self.sequence.name.clone(),
            range: self.bounds(),
            offsets: options.offsets.clone(),
            extra: options.extra.clone(),
        };
        let declared = match request.offsets {
            Some(_) => None,
            None => self.offsets()?,
        };
        let _offsets = match declared {
            Some(resource) => {
                let local = resource.local_path()?;
                request.offsets = Some(local.path().to_path_buf());
                Some(local)
            }
            None => None,
        };
        self.model.with_engine(|engine| engine.aperture(&request))
    }

    /// Match on this range.
    ///
    /// Only recognized initial-condition parameters of the merged set carry
    /// over; the caller's `twiss_init` is applied on top unfiltered.
    pub fn match_(&self, options: &MatchOptions) -> ModelResult<Table> {
        options.validate()?;
        self.load()?;
        let merged = self.merged_initial(&options.twiss_init)?;
        let mut twiss_init = mm_core::filter_keys(&merged, is_match_param);
        for (key, value) in &options.twiss_init {
            twiss_init.insert(key.clone(), value.clone());
        }

        let request = MatchRequest {
            sequence: self.sequence.name.clone(),
            range: self.bounds(),
            twiss_init,
            constraints: options.constraints.clone(),
            vary: options.vary.clone(),
            method: options.method.clone(),
            extra: options.extra.clone(),
        };
        self.model.with_engine(|engine| engine.match_(&request))
    }
}
