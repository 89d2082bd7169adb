mod common;

use mm_core::{Mapping, Value};
use mm_engine::{Bounds, Command, CommandHistory};
use mm_model::{
    ApertureOptions, CreateOptions, MatchOptions, Model, ModelError, SurveyOptions, TwissOptions,
};

fn yaml(text: &str) -> Mapping {
    serde_yaml::from_str(text).unwrap()
}

fn ring() -> (Model, CommandHistory) {
    let (factory, history) = common::factory();
    let model = factory.create("RING", CreateOptions::default()).unwrap();
    let history = history.borrow().clone().unwrap();
    (model, history)
}

fn twiss_requests(history: &CommandHistory) -> Vec<mm_engine::TwissRequest> {
    history
        .commands()
        .into_iter()
        .filter_map(|c| match c {
            Command::Twiss(request) => Some(request),
            _ => None,
        })
        .collect()
}

#[test]
fn caller_overrides_merge_over_default_set() {
    let (model, history) = ring();
    let options = TwissOptions::default().init("betx", 5);
    model.sequence("ring1").unwrap().twiss(&options).unwrap();

    let requests = twiss_requests(&history);
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].twiss_init,
        yaml("{betx: 5, bety: 2, tolerance: 0.1}")
    );
}

#[test]
fn twiss_passes_extra_keywords() {
    let (model, history) = ring();
    let options = TwissOptions::default().extra("chrom", true);
    let range = model.sequence("ring1").unwrap().range("arc").unwrap();
    range.twiss(&options).unwrap();

    let request = twiss_requests(&history).pop().unwrap();
    assert_eq!(request.range, Bounds::new("s.arc", "e.arc"));
    assert_eq!(request.extra, yaml("{chrom: true}"));
    assert!(!range.sequence().full_twiss_done());
}

#[test]
fn reserved_extra_keys_never_reach_the_engine() {
    let (model, history) = ring();
    let before = history.len();
    let options = TwissOptions::default().extra("range", "#s/#e");
    let err = model.sequence("ring1").unwrap().twiss(&options).unwrap_err();
    assert!(matches!(err, ModelError::InvalidArgument(_)));
    assert_eq!(history.len(), before);
}

#[test]
fn missing_default_set_is_reported() {
    let (model, _) = ring();
    let err = model
        .sequence("ring2")
        .unwrap()
        .twiss(&TwissOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        ModelError::MissingInitialConditions { ref range, ref name } if range == "all" && name == "missing"
    ));
}

#[test]
fn aperture_runs_one_full_twiss_first() {
    let (model, history) = ring();
    let sequence = model.sequence("ring1").unwrap();
    sequence.aperture(&ApertureOptions::default()).unwrap();
    sequence.aperture(&ApertureOptions::default()).unwrap();

    let requests = twiss_requests(&history);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].range, Bounds::full());
    assert_eq!(
        requests[0].twiss_init,
        yaml("{betx: 1, bety: 2, tolerance: 0.1}")
    );
    assert_eq!(history.count("aperture"), 2);
    assert!(sequence.aperture_prepared());

    // twiss, aperture files, aperture, aperture
    let tail: Vec<_> = common::keywords(&history)
        .into_iter()
        .rev()
        .take(4)
        .collect();
    assert_eq!(tail, vec!["aperture", "aperture", "call", "twiss"]);
}

#[test]
fn aperture_after_full_twiss_skips_the_extra_twiss() {
    let (model, history) = ring();
    let sequence = model.sequence("ring1").unwrap();
    sequence.twiss(&TwissOptions::default()).unwrap();
    assert!(sequence.full_twiss_done());
    sequence.range("arc").unwrap().aperture(&ApertureOptions::default()).unwrap();
    assert_eq!(twiss_requests(&history).len(), 1);
}

#[test]
fn declared_offsets_are_materialized_for_the_call() {
    let (model, history) = ring();
    let range = model.sequence("ring1").unwrap().range("arc").unwrap();
    assert!(range.offsets().unwrap().is_some());
    range.aperture(&ApertureOptions::default()).unwrap();

    let offsets = history
        .commands()
        .into_iter()
        .find_map(|c| match c {
            Command::Aperture(request) => request.offsets,
            _ => None,
        })
        .unwrap();
    assert!(offsets.to_string_lossy().ends_with(".tfs"));
    // The temporary copy is gone once the call returns.
    assert!(!offsets.exists());
}

#[test]
fn caller_offsets_take_precedence() {
    let (model, history) = ring();
    let dir = tempfile::tempdir().unwrap();
    let mine = dir.path().join("mine.tfs");
    std::fs::write(&mine, "@ NAME %s mine\n").unwrap();

    let range = model.sequence("ring1").unwrap().range("arc").unwrap();
    range
        .aperture(&ApertureOptions::default().offsets(&mine))
        .unwrap();
    match history.commands().last().unwrap() {
        Command::Aperture(request) => assert_eq!(request.offsets.as_deref(), Some(mine.as_path())),
        other => panic!("expected aperture, got {other:?}"),
    }
}

#[test]
fn survey_uses_range_and_merged_conditions() {
    let (model, history) = ring();
    let sequence = model.sequence("ring1").unwrap();
    sequence
        .survey(&SurveyOptions::default().init("x0", 1.5))
        .unwrap();
    sequence
        .survey_unbounded(&SurveyOptions::default())
        .unwrap();

    let surveys: Vec<_> = history
        .commands()
        .into_iter()
        .filter_map(|c| match c {
            Command::Survey(request) => Some(request),
            _ => None,
        })
        .collect();
    assert_eq!(surveys.len(), 2);
    assert_eq!(surveys[0].range, Some(Bounds::full()));
    assert_eq!(
        surveys[0].initial.get(Value::from("x0")),
        Some(&Value::from(1.5))
    );
    assert_eq!(surveys[1].range, None);
    assert!(surveys[1].initial.is_empty());
}

#[test]
fn match_keeps_only_match_parameters() {
    let (model, history) = ring();
    let range = model.sequence("ring1").unwrap().range("arc").unwrap();
    let options = MatchOptions::default()
        .init("bety", 60)
        .init("deltap", 0.001)
        .constraint(yaml("{betx: 30}"))
        .vary("kqf");
    range.match_(&options).unwrap();

    match history.commands().last().unwrap() {
        Command::Match(request) => {
            assert_eq!(
                request.twiss_init,
                yaml("{betx: 30, bety: 60, rmatrix: true, deltap: 0.001}")
            );
            assert_eq!(request.range, Bounds::new("s.arc", "e.arc"));
            assert_eq!(request.vary, vec!["kqf"]);
            assert_eq!(request.method, "lmdif");
        }
        other => panic!("expected match, got {other:?}"),
    }
}

#[test]
fn match_drops_unknown_default_keys() {
    let (model, history) = ring();
    model
        .sequence("ring1")
        .unwrap()
        .match_(&MatchOptions::default())
        .unwrap();
    match history.commands().last().unwrap() {
        Command::Match(request) => assert_eq!(request.twiss_init, yaml("{betx: 1, bety: 2}")),
        other => panic!("expected match, got {other:?}"),
    }
}

#[test]
fn range_accessors() {
    let (model, _) = ring();
    let sequence = model.sequence("ring1").unwrap();
    let range = sequence.default_range().unwrap();
    assert_eq!(range.name(), "all");
    assert!(range.bounds().is_full());
    assert!(range.offsets().unwrap().is_none());
    assert_eq!(
        sequence.range("arc").unwrap().initial_conditions(Some("arc")).unwrap(),
        &yaml("{betx: 30, bety: 70, rmatrix: true}")
    );
    assert!(matches!(
        range.initial_conditions(Some("nope")),
        Err(ModelError::MissingInitialConditions { .. })
    ));
    let names: Vec<_> = sequence.ranges().map(|r| r.name()).collect();
    assert_eq!(names, vec!["all", "arc"]);
    assert_eq!(sequence.beam().unwrap().name(), "b1");
    assert!(matches!(
        sequence.range_between("a", "b"),
        Err(ModelError::NotImplemented(_))
    ));
}
