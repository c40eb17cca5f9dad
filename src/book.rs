//! # Book and the ten inference rules
//!
//! A linear, append-only log of [`Judgment`]s. Each rule checks an
//! applicability predicate before appending; failure raises a structured
//! [`InferenceError`] naming the offending (1-based) judgement indices and
//! the reason, unless the `Book` was constructed in "skip checks" mode, in
//! which case a failed boolean predicate is logged and the rule proceeds
//! anyway (spec §7, §9). Checks that are not boolean predicates but are
//! instead the *shape* a rule needs in order to build its output at all
//! (e.g. `appl` requiring its left judgement's type to actually be a pi
//! abstraction) are never skippable: there is no judgement to construct
//! without them, regardless of mode.

use std::fmt;

use log::{info, warn};

use crate::context::Context;
use crate::convert::is_convertible;
use crate::definition::Definition;
use crate::environment::{equiv_env, Environment};
use crate::error::{Error, InferenceError, Result};
use crate::judgment::Judgment;
use crate::term::Term;

pub struct Book {
    judgments: Vec<Judgment>,
    skip_checks: bool,
}

impl Default for Book {
    fn default() -> Self {
        Book::new()
    }
}

impl Book {
    pub fn new() -> Book {
        Book {
            judgments: Vec::new(),
            skip_checks: false,
        }
    }

    /// Re-verification mode: applicability-predicate failures are logged
    /// and silently accepted rather than raised. Opt-in only.
    pub fn with_skip_checks() -> Book {
        Book {
            judgments: Vec::new(),
            skip_checks: true,
        }
    }

    pub fn len(&self) -> usize {
        self.judgments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.judgments.is_empty()
    }

    /// 1-based lookup, matching script-file line references.
    pub fn get(&self, idx: usize) -> Option<&Judgment> {
        idx.checked_sub(1).and_then(|i| self.judgments.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Judgment> {
        self.judgments.iter()
    }

    fn require(&self, idx: usize, rule: &'static str) -> Result<&Judgment> {
        self.get(idx)
            .ok_or_else(|| ie(rule, vec![idx], "no such judgement in the book"))
    }

    fn push(&mut self, j: Judgment) -> usize {
        self.judgments.push(j);
        let idx = self.judgments.len();
        info!("book: judgement {} appended", idx);
        idx
    }

    /// Checks a boolean applicability predicate. In skip-checks mode a
    /// failure is logged and treated as satisfied; otherwise it raises an
    /// `InferenceError`.
    fn check(&self, rule: &'static str, indices: &[usize], ok: bool, reason: &str) -> Result<()> {
        if ok {
            return Ok(());
        }
        if self.skip_checks {
            warn!(
                "rule '{}' applicability check skipped ({}): {}",
                rule,
                indices
                    .iter()
                    .map(|i| i.to_string())
                    .collect::<Vec<_>>()
                    .join(","),
                reason
            );
            return Ok(());
        }
        Err(ie(rule, indices.to_vec(), reason))
    }

    // ---- the ten inference rules ----------------------------------------

    pub fn sort(&mut self) -> Result<usize> {
        let j = Judgment::new(Environment::empty(), Context::empty(), Term::Star, Term::Square);
        Ok(self.push(j))
    }

    pub fn var(&mut self, m: usize, x: char) -> Result<usize> {
        let jm = self.require(m, "var")?.clone();
        self.check("var", &[m], jm.ty().is_sort(), "type of judgement is not a sort")?;
        self.check(
            "var",
            &[m],
            !jm.context().contains_var(x),
            "variable already occurs in the context",
        )?;
        let new_ctx = jm.context().extended(x, jm.term().clone());
        let j = Judgment::new(jm.env().clone(), new_ctx, Term::variable(x), jm.term().clone());
        Ok(self.push(j))
    }

    pub fn weak(&mut self, m: usize, n: usize, x: char) -> Result<usize> {
        let jm = self.require(m, "weak")?.clone();
        let jn = self.require(n, "weak")?.clone();
        self.check(
            "weak",
            &[m, n],
            equiv_env(jm.env(), jn.env()),
            "environments of judgements do not match",
        )?;
        self.check(
            "weak",
            &[m, n],
            jm.context().equiv(jn.context())?,
            "contexts of judgements do not match",
        )?;
        self.check(
            "weak",
            &[m, n],
            jn.ty().is_sort(),
            "type of 2nd judgement is not a sort",
        )?;
        self.check(
            "weak",
            &[m, n],
            !jm.context().contains_var(x),
            "variable already occurs in the context",
        )?;
        let new_ctx = jm.context().extended(x, jn.term().clone());
        let j = Judgment::new(jm.env().clone(), new_ctx, jm.term().clone(), jm.ty().clone());
        Ok(self.push(j))
    }

    pub fn form(&mut self, m: usize, n: usize) -> Result<usize> {
        let jm = self.require(m, "form")?.clone();
        let jn = self.require(n, "form")?.clone();
        self.check(
            "form",
            &[m, n],
            equiv_env(jm.env(), jn.env()),
            "environments of judgements do not match",
        )?;
        self.check(
            "form",
            &[m, n],
            jn.context().len() == jm.context().len() + 1,
            "context of 2nd judgement does not extend that of 1st by exactly one entry",
        )?;
        self.check(
            "form",
            &[m, n],
            jm.context().equiv_n(jn.context(), jm.context().len())?,
            "context of 2nd judgement does not extend that of 1st",
        )?;
        let (x, a) = jn
            .context()
            .last()
            .ok_or_else(|| ie("form", vec![m, n], "2nd judgement's context is empty"))?
            .clone();
        self.check(
            "form",
            &[m, n],
            a.alpha_equivalent(jm.term())?,
            "type of the new context entry is not alpha-equivalent to term of 1st judgement",
        )?;
        self.check(
            "form",
            &[m, n],
            jm.ty().is_sort(),
            "type of 1st judgement is not a sort",
        )?;
        self.check(
            "form",
            &[m, n],
            jn.ty().is_sort(),
            "type of 2nd judgement is not a sort",
        )?;
        let new_term = Term::pi(x, jm.term().clone(), jn.term().clone());
        let j = Judgment::new(jm.env().clone(), jm.context().clone(), new_term, jn.ty().clone());
        Ok(self.push(j))
    }

    pub fn appl(&mut self, m: usize, n: usize) -> Result<usize> {
        let jm = self.require(m, "appl")?.clone();
        let jn = self.require(n, "appl")?.clone();
        self.check(
            "appl",
            &[m, n],
            equiv_env(jm.env(), jn.env()),
            "environments of judgements do not match",
        )?;
        self.check(
            "appl",
            &[m, n],
            jm.context().equiv(jn.context())?,
            "contexts of judgements do not match",
        )?;
        let (x, a, b) = jm
            .ty()
            .split_pi()
            .ok_or_else(|| ie("appl", vec![m, n], "type of 1st judgement is not a pi abstraction"))?;
        self.check(
            "appl",
            &[m, n],
            jn.ty().alpha_equivalent(a)?,
            "type of 2nd judgement is not alpha-equivalent to the domain type",
        )?;
        let new_term = Term::application(jm.term().clone(), jn.term().clone());
        let new_type = b.substitute(x, jn.term())?;
        let j = Judgment::new(jm.env().clone(), jm.context().clone(), new_term, new_type);
        Ok(self.push(j))
    }

    pub fn abst(&mut self, m: usize, n: usize) -> Result<usize> {
        let jm = self.require(m, "abst")?.clone();
        let jn = self.require(n, "abst")?.clone();
        self.check(
            "abst",
            &[m, n],
            equiv_env(jm.env(), jn.env()),
            "environments of judgements do not match",
        )?;
        self.check(
            "abst",
            &[m, n],
            jm.context().len() == jn.context().len() + 1,
            "context of 1st judgement does not extend that of 2nd by exactly one entry",
        )?;
        self.check(
            "abst",
            &[m, n],
            jn.context().equiv_n(jm.context(), jn.context().len())?,
            "context of 1st judgement does not extend that of 2nd",
        )?;
        let (x, a) = jm
            .context()
            .last()
            .ok_or_else(|| ie("abst", vec![m, n], "1st judgement's context is empty"))?
            .clone();
        let (xp, ap, bp) = jn
            .term()
            .split_pi()
            .ok_or_else(|| ie("abst", vec![m, n], "term of 2nd judgement is not a pi abstraction"))?;
        self.check(
            "abst",
            &[m, n],
            xp == x,
            "bound variable of 2nd judgement's term does not match the new context entry",
        )?;
        self.check(
            "abst",
            &[m, n],
            ap.alpha_equivalent(&a)?,
            "domain type of 2nd judgement's term does not match the new context entry's type",
        )?;
        self.check(
            "abst",
            &[m, n],
            bp.alpha_equivalent(jm.ty())?,
            "body type of 2nd judgement's term is not alpha-equivalent to type of 1st judgement",
        )?;
        self.check(
            "abst",
            &[m, n],
            jn.ty().is_sort(),
            "type of 2nd judgement is not a sort",
        )?;
        let new_term = Term::lambda(x, a, jm.term().clone());
        let j = Judgment::new(jn.env().clone(), jn.context().clone(), new_term, jn.term().clone());
        Ok(self.push(j))
    }

    pub fn conv(&mut self, m: usize, n: usize) -> Result<usize> {
        let jm = self.require(m, "conv")?.clone();
        let jn = self.require(n, "conv")?.clone();
        self.check(
            "conv",
            &[m, n],
            equiv_env(jm.env(), jn.env()),
            "environments of judgements do not match",
        )?;
        self.check(
            "conv",
            &[m, n],
            jm.context().equiv(jn.context())?,
            "contexts of judgements do not match",
        )?;
        self.check(
            "conv",
            &[m, n],
            is_convertible(jn.term(), jm.ty(), jm.env())?,
            "term of 2nd judgement is not convertible with type of 1st judgement",
        )?;
        self.check(
            "conv",
            &[m, n],
            jn.ty().is_sort(),
            "type of 2nd judgement is not a sort",
        )?;
        let j = Judgment::new(
            jm.env().clone(),
            jm.context().clone(),
            jm.term().clone(),
            jn.term().clone(),
        );
        Ok(self.push(j))
    }

    pub fn def(&mut self, m: usize, n: usize, name: &str) -> Result<usize> {
        let jm = self.require(m, "def")?.clone();
        let jn = self.require(n, "def")?.clone();
        self.check(
            "def",
            &[m, n],
            equiv_env(jm.env(), jn.env()),
            "environments of judgements do not match",
        )?;
        self.check(
            "def",
            &[m, n],
            !jm.env().has_constant(name),
            "name is already present in the environment",
        )?;
        let definition = Definition::new_with_definiens(
            jn.context().clone(),
            name,
            jn.term().clone(),
            jn.ty().clone(),
        );
        let new_env = jm.env().extended(definition)?;
        let j = Judgment::new(new_env, jm.context().clone(), jm.term().clone(), jm.ty().clone());
        Ok(self.push(j))
    }

    /// Stricter than the applicability the original implementation
    /// literally used: `type_n` must be a sort, matching `is_def_prim_applicable`
    /// rather than reusing plain `is_def_applicable` (see DESIGN.md).
    pub fn defpr(&mut self, m: usize, n: usize, name: &str) -> Result<usize> {
        let jm = self.require(m, "defpr")?.clone();
        let jn = self.require(n, "defpr")?.clone();
        self.check(
            "defpr",
            &[m, n],
            equiv_env(jm.env(), jn.env()),
            "environments of judgements do not match",
        )?;
        self.check(
            "defpr",
            &[m, n],
            !jm.env().has_constant(name),
            "name is already present in the environment",
        )?;
        self.check(
            "defpr",
            &[m, n],
            jn.ty().is_sort(),
            "type of 2nd judgement is not a sort",
        )?;
        let definition = Definition::new(jn.context().clone(), name, jn.term().clone());
        let new_env = jm.env().extended(definition)?;
        let j = Judgment::new(new_env, jm.context().clone(), jm.term().clone(), jm.ty().clone());
        Ok(self.push(j))
    }

    pub fn inst(&mut self, m: usize, n: usize, ks: &[usize], p: usize) -> Result<usize> {
        let jm = self.require(m, "inst")?.clone();
        self.check(
            "inst",
            &[m],
            jm.term().alpha_equivalent(&Term::Star)? && *jm.ty() == Term::Square,
            "judgement is not the env-wellformedness marker Star : Square",
        )?;
        self.check(
            "inst",
            &[m],
            ks.len() == n,
            "number of instantiation judgements does not match n",
        )?;
        let def = jm
            .env()
            .get(p)
            .ok_or_else(|| ie("inst", vec![m], format!("no definition at environment index {}", p)))?
            .clone();
        self.check(
            "inst",
            &[m],
            def.context().len() == n,
            "definition's context length does not match n",
        )?;
        let mut pairs: Vec<(char, Term)> = Vec::with_capacity(n);
        let mut terms = Vec::with_capacity(n);
        for (i, &ki) in ks.iter().enumerate() {
            let jki = self.require(ki, "inst")?.clone();
            self.check(
                "inst",
                &[m, ki],
                equiv_env(jki.env(), jm.env()),
                "environment of an instantiation judgement does not match",
            )?;
            self.check(
                "inst",
                &[m, ki],
                jki.context().equiv(jm.context())?,
                "context of an instantiation judgement does not match",
            )?;
            let (xi, ai) = def
                .context()
                .get(i)
                .ok_or_else(|| ie("inst", vec![m, ki], "definition context shorter than n"))?
                .clone();
            let expected = ai.substitute_many(&pairs)?;
            self.check(
                "inst",
                &[m, ki],
                jki.ty().alpha_equivalent(&expected)?,
                "type of instantiation judgement does not match the expected instantiated type",
            )?;
            pairs.push((xi, jki.term().clone()));
            terms.push(jki.term().clone());
        }
        let new_term = Term::constant(def.definiendum().to_string(), terms);
        let new_type = def.ty().substitute_many(&pairs)?;
        let j = Judgment::new(jm.env().clone(), jm.context().clone(), new_term, new_type);
        Ok(self.push(j))
    }

    // ---- utility rules ---------------------------------------------------

    pub fn cp(&mut self, m: usize) -> Result<usize> {
        let jm = self.require(m, "cp")?.clone();
        Ok(self.push(jm))
    }

    pub fn sp(&mut self, m: usize, n: usize) -> Result<usize> {
        let jm = self.require(m, "sp")?.clone();
        let (x, ty) = jm
            .context()
            .get(n)
            .ok_or_else(|| ie("sp", vec![m], format!("no context entry at position {}", n)))?
            .clone();
        let j = Judgment::new(jm.env().clone(), jm.context().clone(), Term::variable(x), ty);
        Ok(self.push(j))
    }

    pub fn tp(&mut self, m: usize) -> Result<usize> {
        let jm = self.require(m, "tp")?.clone();
        self.check(
            "tp",
            &[m],
            jm.term().alpha_equivalent(&Term::Star)? && *jm.ty() == Term::Square,
            "judgement is not the env-wellformedness marker Star : Square",
        )?;
        let j = Judgment::new(jm.env().clone(), jm.context().clone(), Term::Square, Term::Square);
        Ok(self.push(j))
    }
}

fn ie(rule: &'static str, indices: Vec<usize>, reason: impl Into<String>) -> Error {
    Error::Inference(InferenceError::new(rule, indices, reason))
}

/// One script line: a rule name plus its operands, exactly as read from or
/// written to a script file (spec external interface, §F). `m`/`n`/`k_i` are
/// 1-based book indices; `inst`'s `p` is a 0-based environment index; `sp`'s
/// second operand is a 0-based context-slot position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    Sort,
    Var(usize, char),
    Weak(usize, usize, char),
    Form(usize, usize),
    Appl(usize, usize),
    Abst(usize, usize),
    Conv(usize, usize),
    Def(usize, usize, String),
    DefPr(usize, usize, String),
    Inst(usize, usize, Vec<usize>, usize),
    Cp(usize),
    Sp(usize, usize),
    Tp(usize),
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Sort => "sort",
            Rule::Var(..) => "var",
            Rule::Weak(..) => "weak",
            Rule::Form(..) => "form",
            Rule::Appl(..) => "appl",
            Rule::Abst(..) => "abst",
            Rule::Conv(..) => "conv",
            Rule::Def(..) => "def",
            Rule::DefPr(..) => "defpr",
            Rule::Inst(..) => "inst",
            Rule::Cp(..) => "cp",
            Rule::Sp(..) => "sp",
            Rule::Tp(..) => "tp",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Sort => write!(f, "sort"),
            Rule::Var(m, x) => write!(f, "var {} {}", m, x),
            Rule::Weak(m, n, x) => write!(f, "weak {} {} {}", m, n, x),
            Rule::Form(m, n) => write!(f, "form {} {}", m, n),
            Rule::Appl(m, n) => write!(f, "appl {} {}", m, n),
            Rule::Abst(m, n) => write!(f, "abst {} {}", m, n),
            Rule::Conv(m, n) => write!(f, "conv {} {}", m, n),
            Rule::Def(m, n, name) => write!(f, "def {} {} {}", m, n, name),
            Rule::DefPr(m, n, name) => write!(f, "defpr {} {} {}", m, n, name),
            Rule::Inst(m, n, ks, p) => {
                write!(f, "inst {} {}", m, n)?;
                for k in ks {
                    write!(f, " {}", k)?;
                }
                write!(f, " {}", p)
            }
            Rule::Cp(m) => write!(f, "cp {}", m),
            Rule::Sp(m, n) => write!(f, "sp {} {}", m, n),
            Rule::Tp(m) => write!(f, "tp {}", m),
        }
    }
}

impl Book {
    /// Applies one parsed or synthesized script line, dispatching to the
    /// matching rule method.
    pub fn apply(&mut self, rule: &Rule) -> Result<usize> {
        match rule {
            Rule::Sort => self.sort(),
            Rule::Var(m, x) => self.var(*m, *x),
            Rule::Weak(m, n, x) => self.weak(*m, *n, *x),
            Rule::Form(m, n) => self.form(*m, *n),
            Rule::Appl(m, n) => self.appl(*m, *n),
            Rule::Abst(m, n) => self.abst(*m, *n),
            Rule::Conv(m, n) => self.conv(*m, *n),
            Rule::Def(m, n, name) => self.def(*m, *n, name),
            Rule::DefPr(m, n, name) => self.defpr(*m, *n, name),
            Rule::Inst(m, n, ks, p) => self.inst(*m, *n, ks, *p),
            Rule::Cp(m) => self.cp(*m),
            Rule::Sp(m, n) => self.sp(*m, *n),
            Rule::Tp(m) => self.tp(*m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_produces_star_square() {
        let mut book = Book::new();
        let i = book.sort().unwrap();
        let j = book.get(i).unwrap();
        assert_eq!(*j.term(), Term::Star);
        assert_eq!(*j.ty(), Term::Square);
    }

    #[test]
    fn var_extends_context() {
        let mut book = Book::new();
        let i = book.sort().unwrap();
        let j = book.var(i, 'x').unwrap();
        let jv = book.get(j).unwrap();
        assert_eq!(*jv.term(), Term::variable('x'));
        assert_eq!(jv.context().len(), 1);
    }

    #[test]
    fn appl_on_non_pi_fails_with_exact_message() {
        let mut book = Book::new();
        let i = book.sort().unwrap();
        let j = book.var(i, 'x').unwrap();
        // j's type is Star, not a pi abstraction: appl(j, j) must fail.
        let err = book.appl(j, j).unwrap_err();
        match err {
            Error::Inference(ie) => {
                assert_eq!(ie.rule, "appl");
                assert_eq!(ie.reason, "type of 1st judgement is not a pi abstraction");
            }
            _ => panic!("expected an InferenceError"),
        }
    }

    #[test]
    fn identity_function_derivation() {
        // sort: * : @
        // var(1,'x') gives x : * under {x:*}
        // form needs ctx_n to extend ctx_m by one entry whose type is
        // alpha-equivalent to term_m: form(1,2) -> Pi(x:*).* : @
        let mut book = Book::new();
        let s = book.sort().unwrap();
        let x = book.var(s, 'x').unwrap();
        let pi = book.form(s, x).unwrap();
        let j = book.get(pi).unwrap();
        assert!(j
            .term()
            .alpha_equivalent(&Term::pi('x', Term::Star, Term::Star))
            .unwrap());
    }

    #[test]
    fn def_rejects_duplicate_name() {
        let mut book = Book::new();
        let s = book.sort().unwrap();
        let x = book.var(s, 'x').unwrap();
        let d1 = book.def(x, x, "a").unwrap();
        assert!(book.def(d1, x, "a").is_err());
    }

    #[test]
    fn skip_checks_accepts_failing_predicate() {
        let mut book = Book::with_skip_checks();
        let s = book.sort().unwrap();
        let x = book.var(s, 'x').unwrap();
        // x's type is Star, not a pi: under skip-checks this would still
        // fail because `split_pi` cannot manufacture a shape that is not
        // there. Use a genuinely skippable predicate instead: weak() with
        // a variable already in scope is a boolean check, not a shape
        // requirement.
        assert!(book.weak(x, s, 'x').is_ok());
    }
}
