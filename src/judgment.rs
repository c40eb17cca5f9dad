//! # Judgment
//!
//! ⟨environment, context, term, type⟩ — a derivable statement: "under this
//! environment and context, the term has this type".

use std::fmt;

use crate::context::Context;
use crate::environment::Environment;
use crate::term::Term;

#[derive(Clone, Debug)]
pub struct Judgment {
    env: Environment,
    context: Context,
    term: Term,
    ty: Term,
}

impl Judgment {
    pub fn new(env: Environment, context: Context, term: Term, ty: Term) -> Judgment {
        Judgment {
            env,
            context,
            term,
            ty,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn ty(&self) -> &Term {
        &self.ty
    }
}

impl fmt::Display for Judgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Judge<<{}; {} |- {} : {}>>",
            self.env, self.context, self.term, self.ty
        )
    }
}
