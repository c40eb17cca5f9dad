//! # Convertibility
//!
//! Decides whether two terms are beta-delta convertible under an
//! environment: a terminating, mutually recursive procedure mixing
//! structural comparison with rank-ordered unfolding. Termination follows
//! because every recursive call either shrinks a term structurally or
//! strictly decreases the rank of the outermost opaque `Constant` on at
//! least one side.

use log::trace;

use crate::environment::Environment;
use crate::error::Result;
use crate::reducer::{delta_reduce, is_delta_reducible, reduce_application};
use crate::term::{fresh, Term};

/// `conv(a, b, env)`.
pub fn is_convertible(a: &Term, b: &Term, env: &Environment) -> Result<bool> {
    // Implementations are free to intern terms; a cheap structural-equality
    // check stands in for the "exact same value" identity short-circuit
    // that reference counting would otherwise give for free.
    if a == b {
        return Ok(true);
    }
    use Term::*;
    match (a, b) {
        (Star, Star) | (Square, Square) => return a.alpha_equivalent(b),
        (Variable(_), Variable(_)) => return a.alpha_equivalent(b),
        (Application(m, n), Application(k, l)) => {
            if is_convertible(m, k, env)? && is_convertible(n, l, env)? {
                return Ok(true);
            }
            if let Some(a2) = reduce_application(a, env)? {
                return is_convertible(&a2, b, env);
            }
            if let Some(b2) = reduce_application(b, env)? {
                return is_convertible(a, &b2, env);
            }
            return Ok(false);
        }
        (AbstLambda(x, ta, m), AbstLambda(y, tb, l))
        | (AbstPi(x, ta, m), AbstPi(y, tb, l)) => {
            if !is_convertible(ta, tb, env)? {
                return Ok(false);
            }
            if !l.free_variables().contains(x) {
                let l_sub = l.substitute(*y, &Term::variable(*x))?;
                return is_convertible(m, &l_sub, env);
            }
            let z = fresh(&[&Term::variable(*x), &Term::variable(*y), m, l])?;
            let m2 = m.substitute(*x, &Term::variable(z))?;
            let l2 = l.substitute(*y, &Term::variable(z))?;
            return is_convertible(&m2, &l2, env);
        }
        (Constant(c1, args1), Constant(c2, args2)) if c1 == c2 => {
            if args1.len() != args2.len() {
                let a2 = delta_reduce(a, env)?;
                let b2 = delta_reduce(b, env)?;
                return is_convertible(&a2, &b2, env);
            }
            let mut all_ok = true;
            for (x, y) in args1.iter().zip(args2.iter()) {
                if !is_convertible(x, y, env)? {
                    all_ok = false;
                    break;
                }
            }
            if all_ok {
                return Ok(true);
            }
            if is_delta_reducible(a, env) && is_delta_reducible(b, env) {
                let a2 = delta_reduce(a, env)?;
                let b2 = delta_reduce(b, env)?;
                return is_convertible(&a2, &b2, env);
            }
            return Ok(false);
        }
        (Constant(c1, _), Constant(c2, _)) => {
            let i1 = env.lookup_index(c1);
            let i2 = env.lookup_index(c2);
            return match (i1, i2) {
                (Some(i1v), Some(i2v)) if i1v < i2v => {
                    trace!("conv: unfolding '{}' (larger rank)", c2);
                    let b2 = delta_reduce(b, env)?;
                    is_convertible(a, &b2, env)
                }
                (Some(_), Some(_)) => {
                    trace!("conv: unfolding '{}' (larger or tied rank)", c1);
                    let a2 = delta_reduce(a, env)?;
                    is_convertible(&a2, b, env)
                }
                _ => Ok(false),
            };
        }
        _ => {}
    }

    // Differing variants: step whichever side can be stepped and retry.
    if is_delta_reducible(b, env) {
        let b2 = delta_reduce(b, env)?;
        return is_convertible(a, &b2, env);
    }
    if let Some(a2) = reduce_application(a, env)? {
        return is_convertible(&a2, b, env);
    }
    if let Some(b2) = reduce_application(b, env)? {
        return is_convertible(a, &b2, env);
    }
    if is_delta_reducible(a, env) {
        let a2 = delta_reduce(a, env)?;
        return is_convertible(&a2, b, env);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::definition::Definition;
    use crate::term::Term;

    fn v(c: char) -> Term {
        Term::variable(c)
    }

    #[test]
    fn alpha_implies_convertible() {
        let env = Environment::empty();
        let a = Term::lambda('x', Term::Star, v('x'));
        let b = Term::lambda('y', Term::Star, v('y'));
        assert!(is_convertible(&a, &b, &env).unwrap());
    }

    #[test]
    fn star_and_square_not_convertible() {
        let env = Environment::empty();
        assert!(!is_convertible(&Term::Star, &Term::Square, &env).unwrap());
    }

    #[test]
    fn beta_delta_equal_types_are_convertible() {
        // conv(%($x:*.x) A, A, env) = true
        let env = Environment::empty();
        let lhs = Term::application(Term::lambda('x', Term::Star, v('x')), v('A'));
        let rhs = v('A');
        assert!(is_convertible(&lhs, &rhs, &env).unwrap());
    }

    #[test]
    fn distinct_constants_unfold_to_agree() {
        let ty = Term::Star;
        let def_a = Definition::new_with_definiens(Context::empty(), "a", Term::Star, ty.clone());
        let env = Environment::empty().extended(def_a).unwrap();
        let def_b = Definition::new_with_definiens(
            Context::empty(),
            "b",
            Term::constant("a", vec![]),
            ty,
        );
        let env = env.extended(def_b).unwrap();
        let a = Term::constant("a", vec![]);
        let b = Term::constant("b", vec![]);
        assert!(is_convertible(&a, &b, &env).unwrap());
    }
}
