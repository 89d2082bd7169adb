//! Model construction from a locator.

use std::path::PathBuf;

use mm_engine::{EngineOptions, EngineResult, ErrorSink, ScriptEngine, SimulationEngine};
use mm_locator::ModelLocator;

use crate::error::{ModelError, ModelResult};
use crate::model::Model;

/// Constructs the engine for a new model.
pub type EngineBuilder = Box<dyn Fn(EngineOptions) -> EngineResult<Box<dyn SimulationEngine>>>;

#[derive(Default)]
pub struct CreateOptions {
    /// Existing engine to bind the model to. Excludes `command_log` and
    /// `error_log`.
    pub engine: Option<Box<dyn SimulationEngine>>,
    /// Command log for a newly built engine.
    pub command_log: Option<PathBuf>,
    /// Error sink for a newly built engine.
    pub error_log: Option<ErrorSink>,
}

/// Creates loaded models by name.
pub struct Factory {
    locator: Box<dyn ModelLocator>,
    engine_builder: EngineBuilder,
}

fn script_engine(options: EngineOptions) -> EngineResult<Box<dyn SimulationEngine>> {
    Ok(Box::new(ScriptEngine::new(options)?))
}

impl Factory {
    pub fn new(locator: Box<dyn ModelLocator>) -> Self {
        Self {
            locator,
            engine_builder: Box::new(script_engine),
        }
    }

    /// Replace the constructor used when no engine is passed to `create`.
    pub fn with_engine_builder<F>(mut self, builder: F) -> Self
    where
        F: Fn(EngineOptions) -> EngineResult<Box<dyn SimulationEngine>> + 'static,
    {
        self.engine_builder = Box::new(builder);
        self
    }

    pub fn locator(&self) -> &dyn ModelLocator {
        self.locator.as_ref()
    }

    pub fn list_models(&self) -> ModelResult<Vec<String>> {
        Ok(self.locator.list_names()?)
    }

    /// Find a model by name, bind it to an engine and load it.
    pub fn create(&self, name: &str, options: CreateOptions) -> ModelResult<Model> {
        let definition = self.locator.definition(name)?;
        let repository = self.locator.repository_for(&definition)?;

        let engine = match options.engine {
            Some(_) if options.command_log.is_some() => {
                return Err(ModelError::InvalidArgument(
                    "command_log cannot be used with an existing engine".to_string(),
                ));
            }
            Some(_) if options.error_log.is_some() => {
                return Err(ModelError::InvalidArgument(
                    "error_log cannot be used with an existing engine".to_string(),
                ));
            }
            Some(engine) => engine,
            None => {
                let mut engine = (self.engine_builder)(EngineOptions {
                    command_log: options.command_log,
                    error_log: options.error_log,
                })?;
                engine.set_verbose(false)?;
                engine
            }
        };

        tracing::info!(model = name, repository = %repository.describe(), "creating model");
        let model = Model::new(definition, repository, engine);
        model.load()?;
        Ok(model)
    }
}
