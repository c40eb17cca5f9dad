//! # Context
//!
//! An ordered sequence of typed variable pairs. Order is significant:
//! `form`/`abst` key off the *last* entry, and contexts may only be
//! extended at the tail.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::Result;
use crate::term::Term;

/// An ordered sequence of `(variable, type)` pairs. Variable names within a
/// context must be unique.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Context {
    entries: Vec<(char, Term)>,
}

impl Context {
    pub fn empty() -> Context {
        Context {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(char, Term)] {
        &self.entries
    }

    pub fn get(&self, i: usize) -> Option<&(char, Term)> {
        self.entries.get(i)
    }

    pub fn last(&self) -> Option<&(char, Term)> {
        self.entries.last()
    }

    pub fn contains_var(&self, x: char) -> bool {
        self.entries.iter().any(|(y, _)| *y == x)
    }

    /// The type bound to `x`, preferring the most recently added entry if
    /// the name occurs more than once.
    pub fn lookup(&self, x: char) -> Option<&Term> {
        self.entries.iter().rev().find(|(y, _)| *y == x).map(|(_, t)| t)
    }

    /// Appends a typed pair at the tail, producing a new context value.
    pub fn extended(&self, var: char, ty: Term) -> Context {
        let mut entries = self.entries.clone();
        entries.push((var, ty));
        Context { entries }
    }

    /// The union of the variable names bound by this context's entries.
    pub fn free_variables(&self) -> BTreeSet<char> {
        self.entries.iter().map(|(x, _)| *x).collect()
    }

    /// Pairwise alpha-equivalence of the first `n` entries' variables and
    /// types.
    pub fn equiv_n(&self, other: &Context, n: usize) -> Result<bool> {
        if n > self.len() || n > other.len() {
            return Ok(false);
        }
        for i in 0..n {
            let (x, a) = &self.entries[i];
            let (y, b) = &other.entries[i];
            if x != y {
                return Ok(false);
            }
            if !a.alpha_equivalent(b)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn equiv(&self, other: &Context) -> Result<bool> {
        if self.len() != other.len() {
            return Ok(false);
        }
        self.equiv_n(other, self.len())
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "{{}}");
        }
        write!(f, "Context{{")?;
        for (i, (x, ty)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", x, ty)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_only_at_tail() {
        let c = Context::empty().extended('x', Term::Star);
        let c2 = c.extended('y', Term::variable('x'));
        assert_eq!(c2.last().unwrap().0, 'y');
        assert_eq!(c2.len(), 2);
    }

    #[test]
    fn equiv_n_prefix() {
        let a = Context::empty()
            .extended('x', Term::Star)
            .extended('y', Term::Star);
        let b = Context::empty()
            .extended('x', Term::Star)
            .extended('z', Term::variable('x'));
        assert!(a.equiv_n(&b, 1).unwrap());
        assert!(!a.equiv_n(&b, 2).unwrap());
    }

    #[test]
    fn empty_context_display() {
        assert_eq!(format!("{}", Context::empty()), "{}");
    }
}
