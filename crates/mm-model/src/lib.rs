//! mm-model: model graphs bound to a simulation engine.
//!
//! A [`Model`] owns the beams, optics and sequences of one expanded
//! definition and activates them in the engine lazily: the model's init
//! files first, then each sequence's beam, optics on request. Queries
//! (twiss, survey, aperture, match) run on a [`RangeHandle`] or on a
//! sequence's default range.
//!
//! [`Factory`] is the usual entry point: it looks a model up through a
//! locator, builds the engine and returns the model already loaded.

pub mod beam;
pub mod error;
pub mod factory;
pub mod model;
pub mod optic;
pub mod options;
pub mod range;
pub mod sequence;
pub mod state;

pub use beam::BeamHandle;
pub use error::{ModelError, ModelResult};
pub use factory::{CreateOptions, EngineBuilder, Factory};
pub use model::Model;
pub use optic::OpticHandle;
pub use options::{
    ApertureOptions, MATCH_PARAMETERS, MatchOptions, RESERVED_KEYS, SurveyOptions, TwissOptions,
    is_match_param,
};
pub use range::RangeHandle;
pub use sequence::SequenceHandle;
pub use state::LoadState;
