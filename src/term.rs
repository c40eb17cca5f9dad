//! # Term algebra
//!
//! The kernel expression: a tagged union of seven shapes, capture-avoiding
//! substitution, free variables, and alpha-equivalence. Terms are immutable
//! values; `Application`/`AbstLambda`/`AbstPi` own their children through
//! `Box`, so a substitution that would otherwise alias a subtree always
//! produces a fresh one instead.

use std::collections::BTreeSet;
use std::fmt;

use log::trace;

use crate::error::{Error, Result};

/// Fresh-variable selection prefers these letters, in order, before falling
/// back to an alphabetical scan of the remaining universe. Kept stable so
/// pretty-printed output is reproducible; tests must not depend on which
/// specific letter is chosen.
const PREFERRED_NAMES: &[char] = &['x', 'y', 'z', 'u', 'v', 'w', 'a', 'b', 'c'];

/// The kernel expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    /// The sort of types.
    Star,
    /// The sort of kinds. Not itself typable.
    Square,
    /// A variable occurrence.
    Variable(char),
    /// Function application, `M N`.
    Application(Box<Term>, Box<Term>),
    /// A value abstraction, `λx:A.M`.
    AbstLambda(char, Box<Term>, Box<Term>),
    /// A dependent function type, `Πx:A.B`.
    AbstPi(char, Box<Term>, Box<Term>),
    /// A reference to a named definition with substituted arguments.
    Constant(String, Vec<Term>),
}

impl Term {
    pub fn variable(name: char) -> Term {
        Term::Variable(name)
    }

    pub fn application(f: Term, a: Term) -> Term {
        Term::Application(Box::new(f), Box::new(a))
    }

    pub fn lambda(name: char, bound_type: Term, body: Term) -> Term {
        Term::AbstLambda(name, Box::new(bound_type), Box::new(body))
    }

    pub fn pi(name: char, bound_type: Term, body: Term) -> Term {
        Term::AbstPi(name, Box::new(bound_type), Box::new(body))
    }

    pub fn constant(name: impl Into<String>, args: Vec<Term>) -> Term {
        Term::Constant(name.into(), args)
    }

    pub fn is_sort(&self) -> bool {
        matches!(self, Term::Star | Term::Square)
    }

    pub fn split_variable(&self) -> Option<char> {
        match self {
            Term::Variable(x) => Some(*x),
            _ => None,
        }
    }

    pub fn split_application(&self) -> Option<(&Term, &Term)> {
        match self {
            Term::Application(m, n) => Some((m, n)),
            _ => None,
        }
    }

    pub fn split_lambda(&self) -> Option<(char, &Term, &Term)> {
        match self {
            Term::AbstLambda(x, a, m) => Some((*x, a, m)),
            _ => None,
        }
    }

    pub fn split_pi(&self) -> Option<(char, &Term, &Term)> {
        match self {
            Term::AbstPi(x, a, b) => Some((*x, a, b)),
            _ => None,
        }
    }

    pub fn split_constant(&self) -> Option<(&str, &[Term])> {
        match self {
            Term::Constant(name, args) => Some((name, args)),
            _ => None,
        }
    }

    /// The set of variable names occurring unbound in this term.
    pub fn free_variables(&self) -> BTreeSet<char> {
        match self {
            Term::Star | Term::Square => BTreeSet::new(),
            Term::Variable(x) => {
                let mut fv = BTreeSet::new();
                fv.insert(*x);
                fv
            }
            Term::Application(m, n) => {
                let mut fv = m.free_variables();
                fv.extend(n.free_variables());
                fv
            }
            Term::AbstLambda(x, a, m) | Term::AbstPi(x, a, m) => {
                let mut fv = a.free_variables();
                fv.extend(m.free_variables().into_iter().filter(|y| y != x));
                fv
            }
            Term::Constant(_, args) => {
                let mut fv = BTreeSet::new();
                for arg in args {
                    fv.extend(arg.free_variables());
                }
                fv
            }
        }
    }

    /// Capture-avoiding substitution `self[x := s]`.
    pub fn substitute(&self, x: char, s: &Term) -> Result<Term> {
        match self {
            Term::Star | Term::Square => Ok(self.clone()),
            Term::Variable(y) => {
                if *y == x {
                    Ok(s.clone())
                } else {
                    Ok(self.clone())
                }
            }
            Term::Application(m, n) => {
                Ok(Term::application(m.substitute(x, s)?, n.substitute(x, s)?))
            }
            Term::AbstLambda(y, a, m) => Self::substitute_binder(*y, a, m, x, s, Term::lambda),
            Term::AbstPi(y, a, m) => Self::substitute_binder(*y, a, m, x, s, Term::pi),
            Term::Constant(c, args) => {
                let mut substituted = Vec::with_capacity(args.len());
                for arg in args {
                    substituted.push(arg.substitute(x, s)?);
                }
                Ok(Term::constant(c.clone(), substituted))
            }
        }
    }

    fn substitute_binder(
        y: char,
        a: &Term,
        m: &Term,
        x: char,
        s: &Term,
        rebuild: impl Fn(char, Term, Term) -> Term,
    ) -> Result<Term> {
        if y == x {
            // The bound name shadows x: only the type annotation is
            // substituted into, binder and body are untouched.
            return Ok(rebuild(y, a.substitute(x, s)?, m.clone()));
        }
        if !s.free_variables().contains(&y) {
            return Ok(rebuild(y, a.substitute(x, s)?, m.substitute(x, s)?));
        }
        let z = fresh(&[&Term::variable(x), &Term::variable(y), s, m])?;
        let renamed_body = m.substitute(y, &Term::variable(z))?;
        Ok(rebuild(
            z,
            a.substitute(x, s)?,
            renamed_body.substitute(x, s)?,
        ))
    }

    /// Parallel substitution, applied as an iterated substitution in list
    /// order. Synthesis and instantiation rely on this exact order.
    pub fn substitute_many(&self, pairs: &[(char, Term)]) -> Result<Term> {
        let mut t = self.clone();
        for (x, s) in pairs {
            t = t.substitute(*x, s)?;
        }
        Ok(t)
    }

    /// Decides equality up to bound-variable renaming.
    pub fn alpha_equivalent(&self, other: &Term) -> Result<bool> {
        match (self, other) {
            (Term::Star, Term::Star) | (Term::Square, Term::Square) => Ok(true),
            (Term::Variable(x), Term::Variable(y)) => Ok(x == y),
            (Term::Application(m, n), Term::Application(k, l)) => {
                Ok(m.alpha_equivalent(k)? && n.alpha_equivalent(l)?)
            }
            (Term::AbstLambda(x, a, m), Term::AbstLambda(y, b, l))
            | (Term::AbstPi(x, a, m), Term::AbstPi(y, b, l)) => {
                if !a.alpha_equivalent(b)? {
                    return Ok(false);
                }
                let z = fresh(&[&Term::variable(*x), &Term::variable(*y), m, l])?;
                let m_renamed = m.substitute(*x, &Term::variable(z))?;
                let l_renamed = l.substitute(*y, &Term::variable(z))?;
                m_renamed.alpha_equivalent(&l_renamed)
            }
            (Term::Constant(c1, args1), Term::Constant(c2, args2)) => {
                if c1 != c2 || args1.len() != args2.len() {
                    return Ok(false);
                }
                for (a1, a2) in args1.iter().zip(args2.iter()) {
                    if !a1.alpha_equivalent(a2)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Star => write!(f, "*"),
            Term::Square => write!(f, "@"),
            Term::Variable(x) => write!(f, "{}", x),
            Term::Application(m, n) => write!(f, "%{} {}", paren(m), paren(n)),
            Term::AbstLambda(x, a, m) => write!(f, "${}:{}.{}", x, a, m),
            Term::AbstPi(x, a, b) => write!(f, "?{}:{}.{}", x, a, b),
            Term::Constant(name, args) => {
                write!(f, "{}[", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, "]")
            }
        }
    }
}

fn paren(t: &Term) -> String {
    match t {
        Term::Star | Term::Square | Term::Variable(_) | Term::Constant(_, _) => format!("{}", t),
        _ => format!("({})", t),
    }
}

/// Yields a single-character variable name not free in any of `terms`. The
/// universe is `{a..z, A..Z}`; preferred names are tried first, in a stable
/// order, then the remaining letters alphabetically. Exhaustion is a
/// dedicated, non-silent error.
pub fn fresh(terms: &[&Term]) -> Result<char> {
    let mut avoid = BTreeSet::new();
    for t in terms {
        avoid.extend(t.free_variables());
    }
    for &c in PREFERRED_NAMES {
        if !avoid.contains(&c) {
            trace!("fresh variable selected from preferred list: {}", c);
            return Ok(c);
        }
    }
    for c in ('a'..='z').chain('A'..='Z') {
        if !avoid.contains(&c) {
            trace!("fresh variable selected by alphabetical scan: {}", c);
            return Ok(c);
        }
    }
    Err(Error::FreshNameExhausted { universe: 52 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(c: char) -> Term {
        Term::variable(c)
    }

    #[test]
    fn free_variables0() {
        let t = Term::lambda('x', Term::Star, v('x'));
        assert!(t.free_variables().is_empty());
    }

    #[test]
    fn free_variables1() {
        let t = Term::lambda('x', Term::Star, v('y'));
        let fv = t.free_variables();
        assert_eq!(fv.len(), 1);
        assert!(fv.contains(&'y'));
    }

    #[test]
    fn free_variables2() {
        let t = Term::constant("c", vec![v('a'), v('b')]);
        let fv = t.free_variables();
        assert!(fv.contains(&'a'));
        assert!(fv.contains(&'b'));
    }

    #[test]
    fn substitution_vacuous_is_noop() {
        let t = Term::lambda('x', Term::Star, v('x'));
        let s = t.substitute('y', &v('z')).unwrap();
        assert!(t.alpha_equivalent(&s).unwrap());
    }

    #[test]
    fn substitution_descends_into_constant_args() {
        let t = Term::constant("c", vec![v('x'), v('y')]);
        let s = t.substitute('x', &Term::Star).unwrap();
        assert_eq!(s, Term::constant("c", vec![Term::Star, v('y')]));
    }

    #[test]
    fn substitution_avoids_capture() {
        // (\y. x)[x := y] must rename the binder, not capture y.
        let t = Term::lambda('y', Term::Star, v('x'));
        let s = t.substitute('x', &v('y')).unwrap();
        match s {
            Term::AbstLambda(bound, _, body) => {
                assert_ne!(bound, 'y');
                assert_eq!(*body, v('y'));
            }
            _ => panic!("expected a lambda"),
        }
    }

    #[test]
    fn alpha_equivalence0() {
        let a = Term::lambda('x', Term::Star, v('x'));
        let b = Term::lambda('y', Term::Star, v('y'));
        assert!(a.alpha_equivalent(&b).unwrap());
    }

    #[test]
    fn alpha_equivalence1() {
        let a = Term::lambda('x', Term::Star, v('x'));
        let b = Term::lambda('x', Term::Star, v('y'));
        assert!(!a.alpha_equivalent(&b).unwrap());
    }

    #[test]
    fn alpha_equivalence_is_reflexive_symmetric() {
        let a = Term::pi('x', Term::Star, Term::application(v('f'), v('x')));
        assert!(a.alpha_equivalent(&a).unwrap());
        let b = Term::pi('z', Term::Star, Term::application(v('f'), v('z')));
        assert!(a.alpha_equivalent(&b).unwrap());
        assert!(b.alpha_equivalent(&a).unwrap());
    }

    #[test]
    fn star_square_not_convertible_by_alpha() {
        assert!(!Term::Star.alpha_equivalent(&Term::Square).unwrap());
    }
}
