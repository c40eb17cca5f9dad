//! Tokenizing and parsing of the external file formats: `.def` definition
//! files, the prefix term surface syntax, and script files. None of this
//! participates in the type theory itself — it only ever produces the data
//! model ([`crate::environment::Environment`], [`crate::term::Term`],
//! [`crate::book::Rule`]) that the core operates on.

pub mod defs;
pub mod lexer;
pub mod script;
pub mod term;

pub use defs::{parse_def_file, parse_def_file_entries};
pub use script::{parse_script, write_script};

use crate::term::Term;

/// The three notations a term can be rendered in (spec external interface).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notation {
    /// `$x:(A).(M)`, `?x:(A).(B)`, `%(M)(N)`, `name[(T1),(T2)]` — fully
    /// parenthesized, re-parseable by [`term::TermParser`].
    Conventional,
    /// `$x:A.M`, `?x:A.B`, `%M N` — the compact prefix syntax this crate's
    /// [`std::fmt::Display`] impl for [`Term`] already produces.
    Compact,
    /// `Lam x:(A).(M)`, `Pai x:(A).(B)` — the Book/judgement form, never
    /// re-parsed.
    Rich,
}

pub fn render(t: &Term, notation: Notation) -> String {
    match notation {
        Notation::Conventional => render_conventional(t),
        Notation::Compact => t.to_string(),
        Notation::Rich => render_rich(t),
    }
}

/// Fully parenthesized, same prefix glyphs as the compact `Display` form —
/// `%(M)(N)`, `$x:(A).(M)`, `?x:(A).(B)`, `name[(T1),(T2)]` — re-parseable
/// by [`super::term::TermParser`].
fn render_conventional(t: &Term) -> String {
    match t {
        Term::Star => "*".to_string(),
        Term::Square => "@".to_string(),
        Term::Variable(x) => x.to_string(),
        Term::Application(m, n) => {
            format!("%({})({})", render_conventional(m), render_conventional(n))
        }
        Term::AbstLambda(x, a, m) => format!(
            "${}:({}).({})",
            x,
            render_conventional(a),
            render_conventional(m)
        ),
        Term::AbstPi(x, a, b) => format!(
            "?{}:({}).({})",
            x,
            render_conventional(a),
            render_conventional(b)
        ),
        Term::Constant(name, args) => format!(
            "{}[{}]",
            name,
            args.iter()
                .map(|a| format!("({})", render_conventional(a)))
                .collect::<Vec<_>>()
                .join(",")
        ),
    }
}

/// Human-readable Book/judgement form — identical to [`render_conventional`]
/// except abstractions spell out `Lam`/`Pai` instead of `$`/`?`. Read-only:
/// never consumed by the tokenizer grammar.
fn render_rich(t: &Term) -> String {
    match t {
        Term::Star => "*".to_string(),
        Term::Square => "@".to_string(),
        Term::Variable(x) => x.to_string(),
        Term::Application(m, n) => format!("%({})({})", render_rich(m), render_rich(n)),
        Term::AbstLambda(x, a, m) => format!("Lam {}:({}).({})", x, render_rich(a), render_rich(m)),
        Term::AbstPi(x, a, b) => format!("Pai {}:({}).({})", x, render_rich(a), render_rich(b)),
        Term::Constant(name, args) => format!(
            "{}[{}]",
            name,
            args.iter()
                .map(|a| format!("({})", render_rich(a)))
                .collect::<Vec<_>>()
                .join(",")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::lexer::tokenize;
    use super::term::TermParser;
    use std::collections::HashMap;

    #[test]
    fn conventional_and_rich_differ_from_compact() {
        let t = Term::lambda('x', Term::Star, Term::variable('x'));
        assert_eq!(render(&t, Notation::Compact), "$x:*.x");
        assert_eq!(render(&t, Notation::Conventional), "$x:(*).(x)");
        assert_eq!(render(&t, Notation::Rich), "Lam x:(*).(x)");
    }

    #[test]
    fn conventional_rendering_is_re_parseable() {
        let t = Term::application(
            Term::pi('x', Term::Star, Term::variable('x')),
            Term::constant("nat", vec![Term::Star, Term::Square]),
        );
        let text = render(&t, Notation::Conventional);
        let tokens = tokenize(&text).unwrap();
        let rename = HashMap::new();
        let parsed = TermParser::new(&tokens, &rename).parse_term().unwrap();
        assert_eq!(parsed, t);
    }
}
