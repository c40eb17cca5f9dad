//! # A checker for a dependently-typed lambda calculus with definitions
//!
//! This crate implements the core of a proof checker for a *pure type
//! system* in the style of the Automath/Calculus-of-Constructions family,
//! extended with a notion of named, context-parameterised *definitions*
//! (both primitive, axiom-like definitions and derived ones with a
//! definiens). Terms are built from two sorts (`*`, the sort of types, and
//! `@`, the sort of kinds), variables, applications, and the two binders
//! `\x:A.M` (lambda abstraction) and `?x:A.B` (dependent product, "pi").
//!
//! The system is built up in layers:
//!
//! - [`term`]: the term algebra itself — construction, substitution (with
//!   capture-avoiding fresh-variable renaming), and alpha-equivalence.
//! - [`context`] and [`environment`]: the two name-scoping structures a
//!   judgement is relative to — a context of locally-bound variables, and
//!   an environment of globally-named definitions.
//! - [`reducer`]: beta-reduction (redex contraction), delta-reduction
//!   (definition unfolding, staged by [`reducer::rank`] so that later
//!   definitions unfold before earlier ones), and the combined normal form.
//! - [`convert`]: the beta-delta convertibility decision procedure that the
//!   `conv` inference rule is built on.
//! - [`type_synthesis`]: computes the normal-form type of a term directly,
//!   for front-ends and tooling that need a type without going through the
//!   [`book`] derivation machinery.
//! - [`judgment`] and [`book`]: a [`judgment::Judgment`] is a single
//!   ⟨environment, context, term, type⟩ statement; a [`book::Book`] is an
//!   append-only log of judgements built up one inference rule at a time.
//!   Ten primitive rules (`sort`, `var`, `weak`, `form`, `appl`, `abst`,
//!   `conv`, `def`, `defpr`, `inst`) plus three structural utilities (`cp`,
//!   `sp`, `tp`) are all a caller has to build a derivation with.
//! - [`synth`]: given an already-built [`environment::Environment`],
//!   synthesizes the rule sequence that re-derives it from nothing, for
//!   producing replayable proof scripts.
//!
//! Everything above is a pure, synchronous value-oriented API: there is no
//! global mutable state, and an [`environment::Environment`] extension
//! produces a new value rather than mutating an existing one, so earlier
//! judgements built against an older environment remain valid after later
//! ones extend it.
//!
//! Tokenizing and parsing `.def` source files, term surface syntax, and
//! script files are layered on top in [`parser`]; the `driver` crate wires
//! those together into command-line front-ends.
//!
//! [`environment::Environment`]: crate::environment::Environment

pub mod book;
pub mod context;
pub mod convert;
pub mod definition;
pub mod environment;
pub mod error;
pub mod judgment;
pub mod parser;
pub mod reducer;
pub mod synth;
pub mod term;
pub mod type_synthesis;
