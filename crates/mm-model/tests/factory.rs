mod common;

use mm_core::{Mapping, Value};
use mm_engine::{Bounds, Command, ScriptEngine};
use mm_model::{CreateOptions, LoadState, ModelError, TwissOptions};

fn yaml(text: &str) -> Mapping {
    serde_yaml::from_str(text).unwrap()
}

#[test]
fn lhc_end_to_end() {
    let (factory, history) = common::factory();
    let model = factory.create("LHC", CreateOptions::default()).unwrap();
    let history = history.borrow().clone().unwrap();

    assert_eq!(model.name(), "LHC");
    assert_eq!(model.state(), LoadState::Loaded);
    assert_eq!(common::keywords(&history), vec!["option", "call", "beam"]);
    match &history.commands()[2] {
        Command::Beam { params } => assert_eq!(params, &yaml("{particle: proton}")),
        other => panic!("expected beam, got {other:?}"),
    }

    let table = model
        .default_sequence()
        .unwrap()
        .default_range()
        .unwrap()
        .twiss(&TwissOptions::default())
        .unwrap();
    assert_eq!(table.name, "twiss");

    match history.commands().last().unwrap() {
        Command::Twiss(request) => {
            assert_eq!(request.sequence, "lhcb1");
            assert_eq!(request.range, Bounds::full());
            assert_eq!(request.twiss_init, yaml("{betx: 1, bety: 1}"));
        }
        other => panic!("expected twiss, got {other:?}"),
    }
}

#[test]
fn engine_is_silenced_first() {
    let (factory, history) = common::factory();
    factory.create("RING", CreateOptions::default()).unwrap();
    let history = history.borrow().clone().unwrap();
    assert_eq!(history.commands()[0], Command::Verbose(false));
}

#[test]
fn listing_shows_real_models_only() {
    let (factory, _) = common::factory();
    assert_eq!(factory.list_models().unwrap(), vec!["LHC", "RING"]);
}

#[test]
fn unknown_model_is_reported() {
    let (factory, _) = common::factory();
    let err = factory.create("SPS", CreateOptions::default()).unwrap_err();
    assert!(matches!(err, ModelError::Locator(e) if e.is_not_found()));
}

#[test]
fn engine_and_command_log_are_exclusive() {
    let (factory, _) = common::factory();
    let dir = tempfile::tempdir().unwrap();
    let engine = ScriptEngine::new(Default::default()).unwrap();
    let options = CreateOptions {
        engine: Some(Box::new(engine)),
        command_log: Some(dir.path().join("log.madx")),
        ..CreateOptions::default()
    };
    assert!(matches!(
        factory.create("LHC", options),
        Err(ModelError::InvalidArgument(_))
    ));
}

#[test]
fn engine_and_error_log_are_exclusive() {
    let (factory, _) = common::factory();
    let engine = ScriptEngine::new(Default::default()).unwrap();
    let options = CreateOptions {
        engine: Some(Box::new(engine)),
        error_log: Some(Box::new(|_: &str| {})),
        ..CreateOptions::default()
    };
    assert!(matches!(
        factory.create("LHC", options),
        Err(ModelError::InvalidArgument(msg)) if msg.contains("error_log")
    ));
}

#[test]
fn existing_engine_is_used_as_is() {
    let (factory, built) = common::factory();
    let engine = ScriptEngine::new(Default::default()).unwrap();
    let history = engine.history();
    let options = CreateOptions {
        engine: Some(Box::new(engine)),
        ..CreateOptions::default()
    };
    factory.create("LHC", options).unwrap();

    assert!(built.borrow().is_none());
    assert_eq!(common::keywords(&history), vec!["call", "beam"]);
}

#[test]
fn command_log_receives_activation() {
    let (factory, _) = common::factory();
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("lhc.madx");
    let options = CreateOptions {
        command_log: Some(log.clone()),
        ..CreateOptions::default()
    };
    let model = factory.create("LHC", options).unwrap();
    drop(model);

    let text = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("option"));
    assert!(lines[1].starts_with("call, file="));
    assert_eq!(lines[2], "beam, particle=proton;");
}

#[test]
fn error_sink_sees_failures() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let messages = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink = messages.clone();
    let mut ns = common::namespace()
        .with("broken.cpymad.yml", "BROKEN: {real: true, init-files: [bin.seq]}\n");
    ns.insert("repdata/bin.seq", [0xffu8, 0xfe, 0x00]);
    let factory = mm_model::Factory::new(Box::new(mm_locator::Locator::new(Box::new(ns))));
    let options = CreateOptions {
        error_log: Some(Box::new(move |msg: &str| sink.borrow_mut().push(msg.to_string()))),
        ..CreateOptions::default()
    };

    let err = factory.create("BROKEN", options).unwrap_err();
    assert!(matches!(err, ModelError::Engine(_)));
    assert_eq!(messages.borrow().len(), 1);
    assert!(messages.borrow()[0].starts_with("call"));
}

#[test]
fn definition_data_is_kept() {
    let (factory, _) = common::factory();
    let model = factory.create("LHC", CreateOptions::default()).unwrap();
    assert_eq!(
        model.data().get(Value::from("default-optic")),
        Some(&Value::from("nominal"))
    );
    assert_eq!(model.definition().repository_offset(), "lhc");
}
