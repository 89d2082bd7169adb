//! Recursive mapping merge.
//!
//! Mapping values merge key by key; every other value (scalars and lists
//! included) replaces the previous one outright. Keys keep the position of
//! their first insertion, so merging the same inputs always yields the same
//! serialized output.

use crate::value::{Mapping, Value};

/// Merge `overlay` into `target`; `overlay` wins on conflict.
pub fn deep_merge(target: &mut Mapping, overlay: &Mapping) {
    for (k, v) in overlay {
        if let (Some(Value::Mapping(existing)), Value::Mapping(incoming)) = (target.get_mut(k), v) {
            deep_merge(existing, incoming);
            continue;
        }
        target.insert(k.clone(), v.clone());
    }
}

/// Merge a sequence of mappings, earliest first, into a fresh mapping.
pub fn merged<'a>(layers: impl IntoIterator<Item = &'a Mapping>) -> Mapping {
    let mut out = Mapping::new();
    for layer in layers {
        deep_merge(&mut out, layer);
    }
    out
}
