//! # Definition
//!
//! A context, a definiendum name, an optional definiens (absent means
//! "primitive axiom"), and a type.

use std::fmt;

use crate::context::Context;
use crate::term::Term;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Definition {
    context: Context,
    definiendum: String,
    definiens: Option<Term>,
    ty: Term,
}

impl Definition {
    pub fn new(context: Context, definiendum: impl Into<String>, ty: Term) -> Definition {
        Definition {
            context,
            definiendum: definiendum.into(),
            definiens: None,
            ty,
        }
    }

    pub fn new_with_definiens(
        context: Context,
        definiendum: impl Into<String>,
        definiens: Term,
        ty: Term,
    ) -> Definition {
        Definition {
            context,
            definiendum: definiendum.into(),
            definiens: Some(definiens),
            ty,
        }
    }

    pub fn is_primitive(&self) -> bool {
        self.definiens.is_none()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn definiendum(&self) -> &str {
        &self.definiendum
    }

    pub fn definiens(&self) -> Option<&Term> {
        self.definiens.as_ref()
    }

    pub fn ty(&self) -> &Term {
        &self.ty
    }

    /// A `Constant` reference to this definition, applied to its own
    /// context variables as arguments (used when a rule needs to refer back
    /// to the definition it just introduced).
    pub fn to_constant_term(&self) -> Term {
        let args = self
            .context
            .entries()
            .iter()
            .map(|(x, _)| Term::variable(*x))
            .collect();
        Term::constant(self.definiendum.clone(), args)
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} |> {} := {} : {}",
            if self.is_primitive() { "prim " } else { "" },
            self.context,
            self.definiendum,
            self.definiens
                .as_ref()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "#".to_string()),
            self.ty
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_has_no_definiens() {
        let d = Definition::new(Context::empty(), "A", Term::Star);
        assert!(d.is_primitive());
        assert!(d.definiens().is_none());
    }

    #[test]
    fn to_constant_term_uses_context_vars() {
        let ctx = Context::empty().extended('x', Term::Star);
        let d = Definition::new_with_definiens(
            ctx,
            "id",
            Term::lambda('y', Term::variable('x'), Term::variable('y')),
            Term::pi('y', Term::variable('x'), Term::variable('x')),
        );
        let c = d.to_constant_term();
        assert_eq!(c, Term::constant("id", vec![Term::variable('x')]));
    }
}
