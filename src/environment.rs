//! # Environment
//!
//! An ordered sequence of [`Definition`]s with a name-to-index map built
//! lazily on first query. Order encodes dependency rank: a definition may
//! refer by name only to earlier entries.
//!
//! Following the reference kernel's per-instance `RuntimeState` rather than
//! a process-wide table: there is no global mutable state anywhere in this
//! module. An `Environment` is a plain value; `extended` produces a new one
//! rather than mutating the original, which lets a `Book`'s earlier
//! judgements keep pointing at the environment they were derived under
//! while later ones see the extension.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::definition::Definition;
use crate::error::{Error, Result};

struct Inner {
    defs: Vec<Definition>,
    /// Memoized name -> index lookups, populated incrementally as queries
    /// are made; `scanned` marks how far the linear scan has progressed.
    index: RefCell<HashMap<String, usize>>,
    scanned: RefCell<usize>,
}

/// An ordered, append-only (per value) list of definitions. Cloning an
/// `Environment` is cheap (an `Rc` bump); producing an *extended*
/// environment allocates a new value, never mutates an existing one.
#[derive(Clone)]
pub struct Environment {
    inner: Rc<Inner>,
}

impl Environment {
    pub fn empty() -> Environment {
        Environment {
            inner: Rc::new(Inner {
                defs: Vec::new(),
                index: RefCell::new(HashMap::new()),
                scanned: RefCell::new(0),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.defs.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Definition> {
        self.inner.defs.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.inner.defs.iter()
    }

    fn advance_scan_to(&self, name: &str) -> Option<usize> {
        let mut scanned = self.inner.scanned.borrow_mut();
        let mut index = self.inner.index.borrow_mut();
        while *scanned < self.inner.defs.len() {
            let def = &self.inner.defs[*scanned];
            index.entry(def.definiendum().to_string()).or_insert(*scanned);
            *scanned += 1;
            if def.definiendum() == name {
                return Some(index[name]);
            }
        }
        index.get(name).copied()
    }

    /// O(1) once memoized; otherwise extends the scan far enough to answer
    /// this query, caching every name seen along the way.
    pub fn lookup_index(&self, name: &str) -> Option<usize> {
        if let Some(i) = self.inner.index.borrow().get(name) {
            return Some(*i);
        }
        self.advance_scan_to(name)
    }

    pub fn lookup(&self, name: &str) -> Option<&Definition> {
        self.lookup_index(name).map(|i| &self.inner.defs[i])
    }

    pub fn has_constant(&self, name: &str) -> bool {
        self.lookup_index(name).is_some()
    }

    /// Appends a new definition, rejecting a duplicate name. Produces a new
    /// `Environment` value; the receiver is left untouched, so judgements
    /// already pointing at it remain valid.
    pub fn extended(&self, def: Definition) -> Result<Environment> {
        if self.has_constant(def.definiendum()) {
            return Err(Error::DuplicateDefinitionName(
                def.definiendum().to_string(),
            ));
        }
        debug!("environment extended with definition '{}'", def.definiendum());
        let mut defs = self.inner.defs.clone();
        defs.push(def);
        Ok(Environment {
            inner: Rc::new(Inner {
                defs,
                index: RefCell::new(HashMap::new()),
                scanned: RefCell::new(0),
            }),
        })
    }
}

/// Environments are equivalent when they have the same length and, at each
/// index, the same definiendum name. This mirrors the reference
/// implementation's operative definition, which checks only definiendum
/// identity per slot rather than full structural equality of each
/// definition (see DESIGN.md).
pub fn equiv_env(a: &Environment, b: &Environment) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| x.definiendum() == y.definiendum())
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment(len={})", self.len())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "env(#defs={})", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::term::Term;

    fn prim(name: &str) -> Definition {
        Definition::new(Context::empty(), name, Term::Star)
    }

    #[test]
    fn lookup_index_consistent() {
        let env = Environment::empty()
            .extended(prim("A"))
            .unwrap()
            .extended(prim("B"))
            .unwrap();
        let i = env.lookup_index("B").unwrap();
        assert_eq!(env.get(i).unwrap().definiendum(), "B");
    }

    #[test]
    fn duplicate_name_rejected() {
        let env = Environment::empty().extended(prim("A")).unwrap();
        assert!(env.extended(prim("A")).is_err());
    }

    #[test]
    fn extension_does_not_mutate_original() {
        let env = Environment::empty().extended(prim("A")).unwrap();
        let env2 = env.extended(prim("B")).unwrap();
        assert_eq!(env.len(), 1);
        assert_eq!(env2.len(), 2);
    }

    #[test]
    fn equiv_env_checks_definiendum_only() {
        let a = Environment::empty().extended(prim("A")).unwrap();
        let b = Environment::empty()
            .extended(Definition::new(Context::empty(), "A", Term::Square))
            .unwrap();
        assert!(equiv_env(&a, &b));
    }
}
