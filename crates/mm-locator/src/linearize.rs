//! C3 linearization of a named inheritance graph.
//!
//! Given a root name and a lookup for each name's direct bases, produce an
//! order that starts with the root, lists every transitive base exactly once,
//! keeps each `extends` list in its declared order (local precedence), and
//! agrees with the linearization of every base (monotonicity).
//!
//! `L(x) = x + merge(L(b1), ..., L(bn), [b1, ..., bn])`, where `merge`
//! repeatedly takes the first head that appears in no other list's tail.

use std::collections::{HashMap, VecDeque};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LinearizeError {
    #[error("cyclic extends: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("no consistent order for bases {}", .0.join(", "))]
    Inconsistent(Vec<String>),

    #[error("unknown base {base} extended by {by}")]
    UnknownBase { base: String, by: String },
}

/// Linearize `root` using `bases` to look up direct bases.
///
/// `bases` returns `None` for names that do not exist.
pub fn linearize<F>(root: &str, bases: F) -> Result<Vec<String>, LinearizeError>
where
    F: Fn(&str) -> Option<Vec<String>>,
{
    let mut walk = Walk {
        bases,
        memo: HashMap::new(),
        stack: Vec::new(),
    };
    walk.visit(root)
}

struct Walk<F> {
    bases: F,
    memo: HashMap<String, Vec<String>>,
    stack: Vec<String>,
}

impl<F> Walk<F>
where
    F: Fn(&str) -> Option<Vec<String>>,
{
    fn visit(&mut self, name: &str) -> Result<Vec<String>, LinearizeError> {
        if let Some(done) = self.memo.get(name) {
            return Ok(done.clone());
        }
        if let Some(pos) = self.stack.iter().position(|n| n == name) {
            let mut cycle = self.stack[pos..].to_vec();
            cycle.push(name.to_string());
            return Err(LinearizeError::Cycle(cycle));
        }

        let direct = (self.bases)(name).unwrap_or_default();

        self.stack.push(name.to_string());
        let mut lists: Vec<VecDeque<String>> = Vec::with_capacity(direct.len() + 1);
        for base in &direct {
            if (self.bases)(base).is_none() {
                return Err(LinearizeError::UnknownBase {
                    base: base.clone(),
                    by: name.to_string(),
                });
            }
            lists.push(self.visit(base)?.into());
        }
        self.stack.pop();
        lists.push(direct.iter().cloned().collect());

        let mut order = vec![name.to_string()];
        order.extend(merge(lists)?);
        self.memo.insert(name.to_string(), order.clone());
        Ok(order)
    }
}

fn merge(mut lists: Vec<VecDeque<String>>) -> Result<Vec<String>, LinearizeError> {
    let mut out = Vec::new();
    loop {
        lists.retain(|l| !l.is_empty());
        if lists.is_empty() {
            return Ok(out);
        }

        let next = lists
            .iter()
            .filter_map(|l| l.front())
            .find(|head| !lists.iter().any(|l| l.iter().skip(1).any(|n| n == *head)))
            .cloned();

        let Some(next) = next else {
            let mut heads: Vec<String> = Vec::new();
            for head in lists.iter().filter_map(|l| l.front()) {
                if !heads.contains(head) {
                    heads.push(head.clone());
                }
            }
            return Err(LinearizeError::Inconsistent(heads));
        };

        for list in &mut lists {
            if list.front() == Some(&next) {
                list.pop_front();
            }
        }
        out.push(next);
    }
}
