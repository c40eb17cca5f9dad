//! # Script synthesis
//!
//! Turns an [`Environment`] (built by a front-end from a `.def` file) into a
//! linear sequence of [`Rule`]s that re-derives it from nothing. Every
//! definition is visited in environment order; the resulting judgement that
//! introduces it (via `def` or `defpr`) becomes the new "environment is
//! well-formed" anchor for everything that follows.
//!
//! This does not search for proofs: a [`Definition`]'s context, definiens,
//! and type are already known-good terms (the environment was built by
//! a front-end that trusts its input), so synthesis is a structural walk
//! that reconstructs, rule by rule, the derivation those terms already
//! admit. A term shape the walk cannot handle (free variable with no
//! recorded judgement, `Square` where a type is expected) is a sign the
//! environment itself is ill-formed, surfaced as a [`DeductionError`].

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use log::{debug, trace};

use crate::book::{Book, Rule};
use crate::definition::Definition;
use crate::environment::Environment;
use crate::error::{DeductionError, Error, Result};
use crate::term::Term;

/// One context-building or term-deriving frame: the book index of the
/// current "environment well-formed at this context" marker, plus the
/// in-scope variables' own `x : A` judgement indices.
#[derive(Clone)]
struct Frame {
    anchor: usize,
    vars: HashMap<char, usize>,
}

/// Drives a [`Book`] to completion, recording every rule it applies so the
/// sequence can be written out as a script.
pub struct Synthesizer {
    book: Book,
    script: Vec<Rule>,
    /// Subgoal cache, keyed by `(context display, term display)` and reset
    /// per top-level definition: a judgement proved while deriving one
    /// definition's context or body is only safe to reuse against book
    /// indices built under the *same* environment stage, since every rule's
    /// `equiv_env` check compares environment length.
    cache: HashMap<(String, String), usize>,
}

impl Synthesizer {
    pub fn new() -> Synthesizer {
        Synthesizer {
            book: Book::new(),
            script: Vec::new(),
            cache: HashMap::new(),
        }
    }

    /// Builds the underlying [`Book`] in skip-checks mode, so a rule whose
    /// applicability predicate fails is still recorded rather than rejected.
    pub fn with_skip_checks() -> Synthesizer {
        Synthesizer {
            book: Book::with_skip_checks(),
            script: Vec::new(),
            cache: HashMap::new(),
        }
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn script(&self) -> &[Rule] {
        &self.script
    }

    fn apply(&mut self, rule: Rule) -> Result<usize> {
        let idx = self.book.apply(&rule)?;
        trace!("synth: {} -> {}", rule, idx);
        self.script.push(rule);
        Ok(idx)
    }

    fn cache_key(&self, frame: &Frame, term: &Term) -> (String, String) {
        let ctx = self
            .book
            .get(frame.anchor)
            .map(|j| j.context().to_string())
            .unwrap_or_default();
        (ctx, term.to_string())
    }

    /// Derives a judgement `⟨env, ctx, A, s⟩` for a context entry's own
    /// type, extends both the context anchor and every already-recorded
    /// variable forward by one slot, and registers the new variable.
    fn extend_context(&mut self, frame: &mut Frame, x: char, a: &Term) -> Result<()> {
        let j_a = self.derive_term(frame, a)?;
        let j_x = self.apply(Rule::Var(j_a, x))?;
        let new_anchor = self.apply(Rule::Weak(frame.anchor, j_a, x))?;
        for v in frame.vars.values_mut() {
            *v = self.apply(Rule::Weak(*v, j_a, x))?;
        }
        frame.anchor = new_anchor;
        frame.vars.insert(x, j_x);
        Ok(())
    }

    /// Builds a `Context`'s entries in order from an empty base frame,
    /// returning the frame positioned at the full context.
    fn build_context(&mut self, base_anchor: usize, entries: &[(char, Term)]) -> Result<Frame> {
        let mut frame = Frame {
            anchor: base_anchor,
            vars: HashMap::new(),
        };
        for (x, a) in entries {
            self.extend_context(&mut frame, *x, a)?;
        }
        Ok(frame)
    }

    /// Structurally derives a judgement whose term is exactly `term`
    /// (not merely alpha-equivalent to it), in the context and environment
    /// carried by `frame`.
    fn derive_term(&mut self, frame: &mut Frame, term: &Term) -> Result<usize> {
        let key = self.cache_key(frame, term);
        if let Some(idx) = self.cache.get(&key) {
            return Ok(*idx);
        }
        let idx = self.derive_term_uncached(frame, term)?;
        self.cache.insert(key, idx);
        Ok(idx)
    }

    fn derive_term_uncached(&mut self, frame: &mut Frame, term: &Term) -> Result<usize> {
        let idx = match term {
            Term::Star => frame.anchor,
            Term::Square => {
                return Err(deduction(
                    "square",
                    "tp",
                    Error::Type(crate::error::TypeError::SquareNotTypable),
                ))
            }
            Term::Variable(x) => *frame.vars.get(x).ok_or_else(|| {
                deduction(
                    &term.to_string(),
                    "var",
                    Error::Inference(crate::error::InferenceError::new(
                        "var",
                        vec![],
                        format!("no judgement recorded for free variable '{}'", x),
                    )),
                )
            })?,
            Term::Application(m, n) => {
                let jm = self.derive_term(frame, m)?;
                let jn = self.derive_term(frame, n)?;
                self.apply(Rule::Appl(jm, jn))?
            }
            Term::Constant(name, args) => {
                let env = self
                    .book
                    .get(frame.anchor)
                    .ok_or_else(|| deduction(&term.to_string(), "inst", no_anchor()))?
                    .env()
                    .clone();
                let p = env.lookup_index(name).ok_or_else(|| {
                    deduction(
                        &term.to_string(),
                        "inst",
                        Error::Type(crate::error::TypeError::UndefinedConstant {
                            name: name.clone(),
                        }),
                    )
                })?;
                let mut ks = Vec::with_capacity(args.len());
                for a in args {
                    ks.push(self.derive_term(frame, a)?);
                }
                self.apply(Rule::Inst(frame.anchor, args.len(), ks, p))?
            }
            Term::AbstLambda(x, a, m) => {
                let mut inner = frame.clone();
                self.extend_context(&mut inner, *x, a)?;
                let j_m = self.derive_term(&mut inner, m)?;
                let body_ty = self
                    .book
                    .get(j_m)
                    .ok_or_else(|| deduction(&term.to_string(), "abst", no_anchor()))?
                    .ty()
                    .clone();
                let j_b_sort = self.derive_term(&mut inner, &body_ty)?;
                let j_a_sort = self.derive_term(frame, a)?;
                let j_pi = self.apply(Rule::Form(j_a_sort, j_b_sort))?;
                self.apply(Rule::Abst(j_m, j_pi))?
            }
            Term::AbstPi(x, a, b) => {
                let mut inner = frame.clone();
                self.extend_context(&mut inner, *x, a)?;
                let j_a_sort = self.derive_term(frame, a)?;
                let j_b = self.derive_term(&mut inner, b)?;
                self.apply(Rule::Form(j_a_sort, j_b))?
            }
        };
        Ok(idx)
    }

    /// Introduces one definition on top of the current environment,
    /// returning the new anchor (`⟨env', ∅, Star, Square⟩`).
    fn introduce(&mut self, anchor: usize, def: &Definition) -> Result<usize> {
        debug!("synth: introducing '{}'", def.definiendum());
        self.cache.clear();
        let mut frame = self.build_context(anchor, def.context().entries())?;
        match def.definiens() {
            Some(body) => {
                let j_body = self.derive_term(&mut frame, body)?;
                self.apply(Rule::Def(anchor, j_body, def.definiendum().to_string()))
            }
            None => {
                let j_ty = self.derive_term(&mut frame, def.ty())?;
                self.apply(Rule::DefPr(anchor, j_ty, def.definiendum().to_string()))
            }
        }
    }

    /// Derives the whole environment, in order, from nothing. Returns the
    /// final anchor index.
    pub fn synthesize_environment(&mut self, env: &Environment) -> Result<usize> {
        let mut anchor = self.apply(Rule::Sort)?;
        for def in env.iter() {
            anchor = self.introduce(anchor, def)?;
        }
        Ok(anchor)
    }

    /// Derives only the definitions in `indices` (already filtered to a
    /// dependency-closed, environment-ordered subset), skipping the rest.
    pub fn synthesize_subset(&mut self, env: &Environment, indices: &[usize]) -> Result<usize> {
        let wanted: BTreeSet<usize> = indices.iter().copied().collect();
        let mut anchor = self.apply(Rule::Sort)?;
        for (i, def) in env.iter().enumerate() {
            if wanted.contains(&i) {
                anchor = self.introduce(anchor, def)?;
            }
        }
        Ok(anchor)
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Synthesizer::new()
    }
}

fn no_anchor() -> Error {
    Error::Inference(crate::error::InferenceError::new(
        "synth",
        vec![],
        "internal anchor judgement missing",
    ))
}

fn deduction(subgoal: &str, rule: &'static str, source: Error) -> Error {
    Error::Deduction(DeductionError {
        subgoal: subgoal.to_string(),
        attempted_rule: rule,
        source: Box::new(source),
    })
}

/// Collects every constant name referenced anywhere in `term` (recursing
/// into application, abstraction, and constant-argument positions).
fn referenced_names(term: &Term, acc: &mut BTreeSet<String>) {
    match term {
        Term::Star | Term::Square | Term::Variable(_) => {}
        Term::Application(m, n) => {
            referenced_names(m, acc);
            referenced_names(n, acc);
        }
        Term::AbstLambda(_, a, m) | Term::AbstPi(_, a, m) => {
            referenced_names(a, acc);
            referenced_names(m, acc);
        }
        Term::Constant(name, args) => {
            acc.insert(name.clone());
            for a in args {
                referenced_names(a, acc);
            }
        }
    }
}

fn definition_dependencies(def: &Definition) -> BTreeSet<String> {
    let mut acc = BTreeSet::new();
    for (_, ty) in def.context().entries() {
        referenced_names(ty, &mut acc);
    }
    if let Some(body) = def.definiens() {
        referenced_names(body, &mut acc);
    }
    referenced_names(def.ty(), &mut acc);
    acc
}

/// Breadth-first dependency closure of `target` within `env`: the target's
/// own environment index plus every definition (transitively) referenced by
/// its context, definiens, or type, returned in ascending (original
/// environment) order.
pub fn dependency_closure(env: &Environment, target: &str) -> Result<Vec<usize>> {
    if env.lookup_index(target).is_none() {
        return Err(Error::Type(crate::error::TypeError::UndefinedConstant {
            name: target.to_string(),
        }));
    }
    let mut resolved: BTreeSet<usize> = BTreeSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    let mut queued: HashSet<String> = HashSet::new();
    queue.push_back(target.to_string());
    queued.insert(target.to_string());
    while let Some(name) = queue.pop_front() {
        let idx = match env.lookup_index(&name) {
            Some(i) => i,
            None => continue,
        };
        resolved.insert(idx);
        let def = env.get(idx).expect("lookup_index is in range");
        for dep in definition_dependencies(def) {
            if queued.insert(dep.clone()) {
                queue.push_back(dep);
            }
        }
    }
    Ok(resolved.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    fn prim_star(name: &str) -> Definition {
        Definition::new(Context::empty(), name, Term::Star)
    }

    #[test]
    fn synthesize_single_primitive() {
        let env = Environment::empty().extended(prim_star("A")).unwrap();
        let mut synth = Synthesizer::new();
        let anchor = synth.synthesize_environment(&env).unwrap();
        let j = synth.book().get(anchor).unwrap();
        assert_eq!(j.env().len(), 1);
        assert!(j.env().has_constant("A"));
    }

    #[test]
    fn synthesize_definition_with_context() {
        // id := \x:*.x : Pi(x:*).*
        let ctx = Context::empty().extended('x', Term::Star);
        let def = Definition::new_with_definiens(
            ctx,
            "id",
            Term::lambda('x', Term::Star, Term::variable('x')),
            Term::pi('x', Term::Star, Term::Star),
        );
        let env = Environment::empty().extended(def).unwrap();
        let mut synth = Synthesizer::new();
        let anchor = synth.synthesize_environment(&env).unwrap();
        assert!(synth.book().get(anchor).unwrap().env().has_constant("id"));
        assert!(!synth.script().is_empty());
    }

    #[test]
    fn dependency_closure_includes_transitive_refs() {
        let a = prim_star("A");
        let b = Definition::new_with_definiens(
            Context::empty(),
            "b",
            Term::constant("A", vec![]),
            Term::Star,
        );
        let env = Environment::empty()
            .extended(a)
            .unwrap()
            .extended(b)
            .unwrap();
        let closure = dependency_closure(&env, "b").unwrap();
        assert_eq!(closure, vec![0, 1]);
    }

    #[test]
    fn dependency_closure_rejects_unknown_name() {
        let env = Environment::empty();
        assert!(dependency_closure(&env, "nope").is_err());
    }
}
