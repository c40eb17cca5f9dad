//! Structured error kinds.
//!
//! One enum per spec error kind, each deriving [`thiserror::Error`] so every
//! variant carries its own [`std::fmt::Display`] message, plus a top-level
//! [`Error`] that unifies them for call sites that can raise more than one
//! kind. `TokenizeError`/`ParseError`/`ExprError` variants that are derived
//! from input carry a [`Location`]; `TypeError`/`InferenceError` carry the
//! offending term, context, or judgement indices instead.

use std::fmt;

/// A position in a source file, one-indexed, used by every error that is
/// derived from parsed input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Lexical errors: an unrecognised glyph, an unterminated block comment, or
/// a numeric literal that overflows its representation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    #[error("unknown glyph '{glyph}' at {location}")]
    UnknownGlyph { glyph: char, location: Location },
    #[error("unterminated block comment starting at {location}")]
    UnterminatedBlockComment { location: Location },
    #[error("numeric literal overflow at {location}")]
    NumericOverflow { location: Location },
}

/// Grammar-level errors: the token stream does not match the expected
/// production. `UnmatchedDelimiter` carries a secondary note pointing back
/// at the opening delimiter.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token '{found}' at {location}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        location: Location,
    },
    #[error("{message} at {location} (opened at {opener})")]
    UnmatchedDelimiter {
        message: String,
        location: Location,
        opener: Location,
    },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },
}

/// Errors local to parsing a single term expression: a malformed
/// application, abstraction, or constant argument list.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    #[error("malformed application at {location}: {reason}")]
    MalformedApplication { location: Location, reason: String },
    #[error("malformed abstraction at {location}: {reason}")]
    MalformedAbstraction { location: Location, reason: String },
    #[error("malformed constant arguments for '{name}' at {location}: {reason}")]
    MalformedConstantArgs {
        name: String,
        location: Location,
        reason: String,
    },
}

/// Errors raised by type synthesis (`type_of`), naming the offending term
/// and, where relevant, its context.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("square is not typable")]
    SquareNotTypable,
    #[error("variable '{name}' not found in context {context}")]
    VariableNotInContext { name: char, context: String },
    #[error("constant '{name}' is not defined in the environment")]
    UndefinedConstant { name: String },
    #[error("the type of application head '{head}' is not a pi abstraction")]
    ApplicationHeadNotPi { head: String },
    #[error("the type of a pi-abstraction body must be a sort, found '{found}'")]
    PiBodyNotSort { found: String },
    #[error("constant '{name}' expects {expected} argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

/// Raised by a rule's applicability predicate: names the offending judgement
/// indices (1-based, matching script-file line references) and the reason
/// the predicate failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("rule '{rule}' is not applicable to judgement(s) {indices:?}: {reason}")]
pub struct InferenceError {
    pub rule: &'static str,
    pub indices: Vec<usize>,
    pub reason: String,
}

impl InferenceError {
    pub fn new(rule: &'static str, indices: Vec<usize>, reason: impl Into<String>) -> Self {
        InferenceError {
            rule,
            indices,
            reason: reason.into(),
        }
    }
}

/// Raised by the script synthesizer when no rule sequence reaches a
/// subgoal. Carries the subgoal description, the rule the synthesizer was
/// attempting, and the sub-error that defeated it.
#[derive(Debug, thiserror::Error)]
#[error("could not derive subgoal '{subgoal}' via rule '{attempted_rule}': {source}")]
pub struct DeductionError {
    pub subgoal: String,
    pub attempted_rule: &'static str,
    #[source]
    pub source: Box<Error>,
}

/// The unified error type for any call site that can raise more than one
/// error kind.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Expr(#[from] ExprError),
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Deduction(#[from] DeductionError),
    /// Fresh-variable selection exhausted its universe of single-character
    /// names. A dedicated, non-silent failure (spec boundary behavior).
    #[error("exhausted fresh variable generation over the {universe}-letter universe")]
    FreshNameExhausted { universe: usize },
    /// Raised by `Environment::extended` when the definiendum is already
    /// present.
    #[error("duplicate definition name '{0}' already present in the environment")]
    DuplicateDefinitionName(String),
}

pub type Result<T> = std::result::Result<T, Error>;
