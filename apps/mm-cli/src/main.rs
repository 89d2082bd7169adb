use clap::{Parser, Subcommand};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mm_core::{Mapping, Value};
use mm_engine::{CommandHistory, ScriptEngine};
use mm_locator::{DistinctLocator, Locator, LocatorConfig, LocatorError, ModelLocator};
use mm_model::{CreateOptions, Factory, ModelError, TwissOptions};
use mm_resource::FileResource;

#[derive(Parser)]
#[command(name = "madmodel")]
#[command(about = "madmodel - accelerator model definitions and dry-run activation", long_about = None)]
struct Cli {
    /// Treat each definition file as a single model named after the file
    #[arg(long, global = true)]
    distinct: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List instantiable models
    List {
        /// Directory holding *.cpymad.yml definition files
        root: PathBuf,
    },
    /// Print the expanded definition of a model
    Show {
        /// Directory holding *.cpymad.yml definition files
        root: PathBuf,
        /// Model name
        model: String,
        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
    /// Print where a model's repository and resource files are read from
    Locate {
        /// Directory holding *.cpymad.yml definition files
        root: PathBuf,
        /// Model name
        model: String,
    },
    /// Load a model and print the issued commands
    Load {
        /// Directory holding *.cpymad.yml definition files
        root: PathBuf,
        /// Model name
        model: String,
        /// Also load this optic (defaults to none)
        #[arg(long)]
        optic: Option<String>,
        /// Append the issued commands to this file
        #[arg(long)]
        command_log: Option<PathBuf>,
    },
    /// Load a model and run twiss on a range
    Twiss {
        /// Directory holding *.cpymad.yml definition files
        root: PathBuf,
        /// Model name
        model: String,
        /// Sequence (defaults to the model's default sequence)
        #[arg(long)]
        sequence: Option<String>,
        /// Range (defaults to the sequence's default range)
        #[arg(long)]
        range: Option<String>,
        /// Initial condition override, e.g. --init betx=5
        #[arg(long = "init", value_parser = parse_keyword)]
        init: Vec<(String, Value)>,
        /// Append the issued commands to this file
        #[arg(long)]
        command_log: Option<PathBuf>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Locator(#[from] LocatorError),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

type CliResult<T> = Result<T, CliError>;

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let layout = if cli.distinct {
        Layout::Distinct
    } else {
        Layout::Merged
    };

    match cli.command {
        Commands::List { root } => cmd_list(&*layout.locator(&root)),
        Commands::Show { root, model, json } => cmd_show(&*layout.locator(&root), &model, json),
        Commands::Locate { root, model } => cmd_locate(&*layout.locator(&root), &model),
        Commands::Load {
            root,
            model,
            optic,
            command_log,
        } => cmd_load(layout.locator(&root), &model, optic.as_deref(), command_log),
        Commands::Twiss {
            root,
            model,
            sequence,
            range,
            init,
            command_log,
        } => cmd_twiss(
            layout.locator(&root),
            &model,
            sequence.as_deref(),
            range.as_deref(),
            init,
            command_log,
        ),
    }
}

fn parse_keyword(arg: &str) -> Result<(String, Value), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{arg}`"))?;
    let value: Value = serde_yaml::from_str(value).map_err(|e| e.to_string())?;
    Ok((key.trim().to_string(), value))
}

#[derive(Clone, Copy)]
enum Layout {
    Merged,
    Distinct,
}

impl Layout {
    fn locator(self, root: &Path) -> Box<dyn ModelLocator> {
        let provider = Box::new(FileResource::new(root));
        let config = LocatorConfig::from_env();
        match self {
            Layout::Merged => Box::new(Locator::with_config(provider, config)),
            Layout::Distinct => Box::new(DistinctLocator::with_config(provider, &config)),
        }
    }
}

/// A factory whose engines record into the returned history slot.
fn recording_factory(
    locator: Box<dyn ModelLocator>,
) -> (Factory, Rc<RefCell<Option<CommandHistory>>>) {
    let slot = Rc::new(RefCell::new(None));
    let captured = slot.clone();
    let factory = Factory::new(locator).with_engine_builder(move |options| {
        let engine = ScriptEngine::new(options)?;
        *captured.borrow_mut() = Some(engine.history());
        Ok(Box::new(engine))
    });
    (factory, slot)
}

fn print_history(history: &RefCell<Option<CommandHistory>>) {
    if let Some(history) = history.borrow().as_ref() {
        for line in history.rendered() {
            println!("{line}");
        }
    }
}

fn cmd_list(locator: &dyn ModelLocator) -> CliResult<()> {
    let names = locator.list_names()?;
    if names.is_empty() {
        println!("No models found");
    } else {
        for name in names {
            println!("{name}");
        }
    }
    Ok(())
}

fn cmd_show(locator: &dyn ModelLocator, model: &str, json: bool) -> CliResult<()> {
    let definition = locator.definition(model)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&definition.data)?);
    } else {
        print!("{}", serde_yaml::to_string(&definition.data)?);
    }
    Ok(())
}

fn cmd_locate(locator: &dyn ModelLocator, model: &str) -> CliResult<()> {
    let definition = locator.definition(model)?;
    println!("repository: {}", locator.repository_for(&definition)?.describe());
    println!("resources:  {}", locator.resource_for(&definition)?.describe());
    Ok(())
}

fn cmd_load(
    locator: Box<dyn ModelLocator>,
    name: &str,
    optic: Option<&str>,
    command_log: Option<PathBuf>,
) -> CliResult<()> {
    let (factory, history) = recording_factory(locator);
    let options = CreateOptions {
        command_log,
        ..CreateOptions::default()
    };
    let model = factory.create(name, options)?;
    if let Some(optic) = optic {
        model.optic(optic)?.load()?;
    }

    print_history(&history);
    Ok(())
}

fn cmd_twiss(
    locator: Box<dyn ModelLocator>,
    name: &str,
    sequence: Option<&str>,
    range: Option<&str>,
    init: Vec<(String, Value)>,
    command_log: Option<PathBuf>,
) -> CliResult<()> {
    let (factory, history) = recording_factory(locator);
    let options = CreateOptions {
        command_log,
        ..CreateOptions::default()
    };
    let model = factory.create(name, options)?;

    let sequence = match sequence {
        Some(sequence) => model.sequence(sequence)?,
        None => model.default_sequence()?,
    };
    let range = match range {
        Some(range) => sequence.range(range)?,
        None => sequence.default_range()?,
    };

    let mut twiss_init = Mapping::new();
    for (key, value) in init {
        twiss_init.insert(Value::String(key), value);
    }
    let table = range.twiss(&TwissOptions {
        twiss_init,
        ..TwissOptions::default()
    })?;

    print_history(&history);
    tracing::info!(table = %table.name, rows = table.len(), "twiss finished");
    Ok(())
}
