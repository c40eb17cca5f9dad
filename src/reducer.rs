//! # Reducer
//!
//! Beta-reduction, delta-reduction (definition unfolding), rank, and the
//! interleaved beta-delta normal form `NF_above`. Each normalizing pass
//! asserts its own idempotence on the value it produces, mirroring the
//! reference implementation's runtime assertions rather than leaving
//! idempotence as a claim only tests check.

use log::trace;

use crate::environment::Environment;
use crate::term::Term;
use crate::error::Result;

/// One leftmost-outermost beta step, or `None` if `t` contains no redex.
fn beta_step(t: &Term) -> Result<Option<Term>> {
    match t {
        Term::Application(m, n) => {
            if let Term::AbstLambda(x, _, body) = m.as_ref() {
                trace!("beta-reducing redex on bound variable '{}'", x);
                return Ok(Some(body.substitute(*x, n)?));
            }
            if let Some(m2) = beta_step(m)? {
                return Ok(Some(Term::application(m2, (**n).clone())));
            }
            if let Some(n2) = beta_step(n)? {
                return Ok(Some(Term::application((**m).clone(), n2)));
            }
            Ok(None)
        }
        Term::AbstLambda(x, a, m) => {
            if let Some(a2) = beta_step(a)? {
                return Ok(Some(Term::lambda(*x, a2, (**m).clone())));
            }
            if let Some(m2) = beta_step(m)? {
                return Ok(Some(Term::lambda(*x, (**a).clone(), m2)));
            }
            Ok(None)
        }
        Term::AbstPi(x, a, b) => {
            if let Some(a2) = beta_step(a)? {
                return Ok(Some(Term::pi(*x, a2, (**b).clone())));
            }
            if let Some(b2) = beta_step(b)? {
                return Ok(Some(Term::pi(*x, (**a).clone(), b2)));
            }
            Ok(None)
        }
        Term::Constant(name, args) => {
            for (i, arg) in args.iter().enumerate() {
                if let Some(a2) = beta_step(arg)? {
                    let mut new_args = args.clone();
                    new_args[i] = a2;
                    return Ok(Some(Term::constant(name.clone(), new_args)));
                }
            }
            Ok(None)
        }
        Term::Star | Term::Square | Term::Variable(_) => Ok(None),
    }
}

/// Drives beta-reduction to normal form. Idempotent on its output (checked
/// at runtime via `debug_assert!`).
pub fn beta_nf(t: &Term) -> Result<Term> {
    let mut current = t.clone();
    while let Some(next) = beta_step(&current)? {
        current = next;
    }
    debug_assert!(
        beta_step(&current)?.is_none(),
        "beta_nf produced a term with a remaining redex"
    );
    Ok(current)
}

/// The maximum environment index of any non-primitive `Constant` occurring
/// in `t`, or `-1` if none.
pub fn rank(t: &Term, env: &Environment) -> i64 {
    match t {
        Term::Star | Term::Square | Term::Variable(_) => -1,
        Term::Application(m, n) => rank(m, env).max(rank(n, env)),
        Term::AbstLambda(_, a, m) | Term::AbstPi(_, a, m) => rank(a, env).max(rank(m, env)),
        Term::Constant(name, args) => {
            let mut r = -1;
            if let Some(idx) = env.lookup_index(name) {
                if let Some(def) = env.get(idx) {
                    if !def.is_primitive() {
                        r = idx as i64;
                    }
                }
            }
            for arg in args {
                r = r.max(rank(arg, env));
            }
            r
        }
    }
}

pub fn is_delta_reducible(t: &Term, env: &Environment) -> bool {
    match t.split_constant() {
        Some((name, _)) => env.lookup(name).map(|d| !d.is_primitive()).unwrap_or(false),
        None => false,
    }
}

/// Unfolds a non-primitive `Constant` one delta step. Primitive constants
/// and anything else are returned unchanged.
pub fn delta_reduce(t: &Term, env: &Environment) -> Result<Term> {
    let (name, args) = match t.split_constant() {
        Some(pair) => pair,
        None => return Ok(t.clone()),
    };
    let def = match env.lookup(name) {
        Some(d) => d,
        None => return Ok(t.clone()),
    };
    match def.definiens() {
        None => Ok(t.clone()),
        Some(definiens) => {
            trace!("delta-reducing constant '{}'", name);
            let pairs: Vec<(char, Term)> = def
                .context()
                .entries()
                .iter()
                .zip(args.iter())
                .map(|((x, _), u)| (*x, u.clone()))
                .collect();
            definiens.substitute_many(&pairs)
        }
    }
}

/// Reduces every `Constant` whose rank is `>= idx` (and whose definition
/// has a body); constants below `idx`, and primitives, are left opaque.
pub fn delta_nf_above(t: &Term, env: &Environment, idx: i64) -> Result<Term> {
    match t {
        Term::Star | Term::Square | Term::Variable(_) => Ok(t.clone()),
        Term::Application(m, n) => Ok(Term::application(
            delta_nf_above(m, env, idx)?,
            delta_nf_above(n, env, idx)?,
        )),
        Term::AbstLambda(x, a, m) => Ok(Term::lambda(
            *x,
            delta_nf_above(a, env, idx)?,
            delta_nf_above(m, env, idx)?,
        )),
        Term::AbstPi(x, a, b) => Ok(Term::pi(
            *x,
            delta_nf_above(a, env, idx)?,
            delta_nf_above(b, env, idx)?,
        )),
        Term::Constant(name, args) => {
            let r = rank(t, env);
            let is_reducible = is_delta_reducible(t, env);
            if r < idx || !is_reducible {
                if args.is_empty() {
                    Ok(t.clone())
                } else {
                    let mut new_args = Vec::with_capacity(args.len());
                    for arg in args {
                        new_args.push(delta_nf_above(arg, env, idx)?);
                    }
                    Ok(Term::constant(name.clone(), new_args))
                }
            } else {
                let reduced = delta_reduce(t, env)?;
                delta_nf_above(&reduced, env, idx)
            }
        }
    }
}

pub fn delta_nf(t: &Term, env: &Environment) -> Result<Term> {
    delta_nf_above(t, env, 0)
}

/// Interleaves `beta_nf` and `delta_nf_above` until a fixed point
/// (alpha-equivalent between rounds). Each pass's idempotence is asserted.
pub fn nf_above(t: &Term, env: &Environment, idx: i64) -> Result<Term> {
    let mut current = t.clone();
    loop {
        let b = beta_nf(&current)?;
        debug_assert!(beta_nf(&b)?.alpha_equivalent(&b)?, "beta_nf not idempotent");
        let d = delta_nf_above(&b, env, idx)?;
        debug_assert!(
            delta_nf_above(&d, env, idx)?.alpha_equivalent(&d)?,
            "delta_nf_above not idempotent"
        );
        if d.alpha_equivalent(&current)? {
            return Ok(d);
        }
        current = d;
    }
}

pub fn nf(t: &Term, env: &Environment) -> Result<Term> {
    nf_above(t, env, 0)
}

/// Given an `Application` whose head is not yet a lambda, tries to make it
/// one by unfolding the head constant or recursively reducing a nested
/// application, then beta-reduces the exposed redex. Returns `None` if no
/// reduction is possible.
pub fn reduce_application(t: &Term, env: &Environment) -> Result<Option<Term>> {
    let (m, n) = match t.split_application() {
        Some(pair) => pair,
        None => return Ok(None),
    };
    match m {
        Term::AbstLambda(x, _, body) => Ok(Some(body.substitute(*x, n)?)),
        Term::Application(_, _) => {
            if let Some(m2) = reduce_application(m, env)? {
                reduce_application(&Term::application(m2, n.clone()), env)
            } else {
                Ok(None)
            }
        }
        Term::Constant(_, _) => {
            if is_delta_reducible(m, env) {
                let m2 = delta_reduce(m, env)?;
                reduce_application(&Term::application(m2, n.clone()), env)
            } else {
                Ok(None)
            }
        }
        Term::Star | Term::Square | Term::Variable(_) | Term::AbstPi(_, _, _) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::definition::Definition;

    fn v(c: char) -> Term {
        Term::variable(c)
    }

    #[test]
    fn beta_reduction_example() {
        // (\x:*.x) y --beta--> y
        let redex = Term::application(Term::lambda('x', Term::Star, v('x')), v('y'));
        let reduced = beta_nf(&redex).unwrap();
        assert_eq!(reduced, v('y'));
    }

    #[test]
    fn beta_reduction_nested() {
        // (\x:*. x z) applied to w, under application with y: NF(%(\x.%x y)(z)) = %z y
        let inner = Term::lambda('x', Term::Star, Term::application(v('x'), v('y')));
        let redex = Term::application(inner, v('z'));
        let reduced = beta_nf(&redex).unwrap();
        assert_eq!(reduced, Term::application(v('z'), v('y')));
    }

    #[test]
    fn beta_nf_is_idempotent() {
        let redex = Term::application(Term::lambda('x', Term::Star, v('x')), v('y'));
        let once = beta_nf(&redex).unwrap();
        let twice = beta_nf(&once).unwrap();
        assert!(once.alpha_equivalent(&twice).unwrap());
    }

    fn env_with_identity() -> Environment {
        let ty = Term::pi('x', Term::Star, Term::Star);
        let body = Term::lambda('x', Term::Star, v('x'));
        let def = Definition::new_with_definiens(Context::empty(), "id", body, ty);
        Environment::empty().extended(def).unwrap()
    }

    #[test]
    fn delta_reduction_example() {
        // id[A] --delta--> \x:*.x  (the context variable and the definiens'
        // bound variable coincide, so substitution only touches the type
        // annotation, which is Star and unaffected).
        let env = env_with_identity();
        let applied = Term::constant("id", vec![Term::variable('A')]);
        let reduced = delta_reduce(&applied, &env).unwrap();
        assert!(reduced
            .alpha_equivalent(&Term::lambda('x', Term::Star, v('x')))
            .unwrap());
    }

    #[test]
    fn delta_reduce_then_beta_applies_identity() {
        let env = env_with_identity();
        let id_a = Term::constant("id", vec![Term::variable('A')]);
        // %id[A] u --delta,beta--> u
        let applied = Term::application(id_a, v('u'));
        let unfolded_head = delta_reduce(
            &applied.split_application().unwrap().0.clone(),
            &env,
        )
        .unwrap();
        let rebuilt = Term::application(unfolded_head, v('u'));
        let result = beta_nf(&rebuilt).unwrap();
        assert_eq!(result, v('u'));
    }

    #[test]
    fn rank_of_term_without_constants_is_minus_one() {
        let env = Environment::empty();
        assert_eq!(rank(&v('x'), &env), -1);
    }

    #[test]
    fn reduce_application_unfolds_nested_constant() {
        let env = env_with_identity();
        let id_a = Term::constant("id", vec![Term::variable('A')]);
        let applied = Term::application(id_a, v('u'));
        let stepped = reduce_application(&applied, &env).unwrap();
        assert!(stepped.is_some());
    }
}
