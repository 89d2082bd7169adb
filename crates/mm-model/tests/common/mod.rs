#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use mm_engine::{CommandHistory, ScriptEngine};
use mm_locator::Locator;
use mm_model::Factory;
use mm_resource::MemoryResource;

pub const LHC_MODELS: &str = r##"
LHC_BASE:
  real: false
  path-offsets: {repository-offset: lhc, resource-offset: lhc}
  init-files: [base.seq]
  beams:
    b1: {particle: proton}
LHC:
  real: true
  extends: [LHC_BASE]
  optics:
    nominal: {init-files: [opt.str]}
  default-optic: nominal
  default-sequence: lhcb1
  sequences:
    lhcb1:
      beam: b1
      default-range: all
      ranges:
        all:
          madx-range: {first: "#s", last: "#e"}
          twiss-initial-conditions:
            std: {betx: 1, bety: 1}
          default-twiss: std
"##;

pub const RING_MODELS: &str = r##"
RING:
  real: true
  path-offsets: ring
  init-files: [ring.seq, ring.str]
  beams:
    b1: {particle: proton, energy: 450}
    b2: {particle: proton, energy: 450, bv: -1}
  optics:
    inj: {init-files: [inj.str]}
  sequences:
    ring1:
      beam: b1
      default-range: all
      aperfiles: [aper.madx]
      ranges:
        all:
          madx-range: {first: "#s", last: "#e"}
          default-twiss: default
          twiss-initial-conditions:
            default: {betx: 1, bety: 2, tolerance: 0.1}
        arc:
          madx-range: {first: s.arc, last: e.arc}
          default-twiss: arc
          aper-offset: offsets/arc.tfs
          twiss-initial-conditions:
            arc: {betx: 30, bety: 70, rmatrix: true}
    ring2:
      beam: b2
      default-range: all
      ranges:
        all: {madx-range: {first: "#s", last: "#e"}, default-twiss: missing}
    ring1_reverse:
      beam: b1
      default-range: all
      ranges:
        all: {madx-range: {first: "#s", last: "#e"}, default-twiss: d, twiss-initial-conditions: {d: {}}}
  default-sequence: ring1
"##;

pub fn namespace() -> MemoryResource {
    MemoryResource::new()
        .with("lhc.cpymad.yml", LHC_MODELS)
        .with("ring.cpymad.yml", RING_MODELS)
        .with("repdata/lhc/base.seq", "! lhc base\n")
        .with("repdata/lhc/opt.str", "! lhc optic\n")
        .with("repdata/ring/ring.seq", "! ring sequence\n")
        .with("repdata/ring/ring.str", "! ring strengths\n")
        .with("repdata/ring/inj.str", "! injection\n")
        .with("repdata/ring/aper.madx", "! apertures\n")
        .with("repdata/ring/offsets/arc.tfs", "@ NAME %s offsets\n")
}

/// A factory over [`namespace`] that exposes the history of every engine it builds.
pub fn factory() -> (Factory, Rc<RefCell<Option<CommandHistory>>>) {
    let slot = Rc::new(RefCell::new(None));
    let captured = slot.clone();
    let factory = Factory::new(Box::new(Locator::new(Box::new(namespace())))).with_engine_builder(
        move |options| {
            let engine = ScriptEngine::new(options)?;
            *captured.borrow_mut() = Some(engine.history());
            Ok(Box::new(engine))
        },
    );
    (factory, slot)
}

/// Keywords of the recorded commands, in issue order.
pub fn keywords(history: &CommandHistory) -> Vec<&'static str> {
    history.commands().iter().map(|c| c.keyword()).collect()
}
