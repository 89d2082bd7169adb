/// Activation state of a model, beam or optic.
///
/// Transitions only move forward. An entity is marked `Loading` before its
/// first engine command, so re-entrant activation sees it as done; a failure
/// midway leaves it there for good.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
}

impl LoadState {
    pub fn is_unloaded(self) -> bool {
        self == LoadState::Unloaded
    }

    pub fn is_loaded(self) -> bool {
        self == LoadState::Loaded
    }
}
