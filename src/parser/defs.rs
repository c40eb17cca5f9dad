//! Parser for `.def` files: a sequence of `def2 ... edef2` blocks terminated
//! by `END`, each describing one [`Definition`].
//!
//! A context-variable position may be a single-character [`Token::Var`] (used
//! verbatim) or a multi-character [`Token::Ident`] (renamed to the next
//! unused single letter for the duration of that definition — the kernel's
//! `Term` only has room for single-character binders).

use std::collections::HashMap;

use crate::context::Context;
use crate::definition::Definition;
use crate::environment::Environment;
use crate::error::{Error, ParseError, Result};
use crate::term::Term;

use super::lexer::{tokenize, Spanned, Token};
use super::term::TermParser;

struct Cursor<'a> {
    tokens: &'a [Spanned<Token>],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.value)
    }

    fn location(&self) -> crate::error::Location {
        self.tokens
            .get(self.pos)
            .map(|s| s.location)
            .unwrap_or(crate::error::Location { line: 0, column: 0 })
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).map(|s| s.value.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_int(&mut self) -> Result<i64> {
        match self.advance() {
            Some(Token::Int(n)) => Ok(n),
            other => Err(unexpected(other, "an integer", self.location())),
        }
    }

    fn expect_symbol(&mut self, c: char) -> Result<()> {
        match self.advance() {
            Some(Token::Symbol(s)) if s == c => Ok(()),
            other => Err(unexpected(other, &format!("'{}'", c), self.location())),
        }
    }

    /// Parses one context-variable position, allocating a fresh single letter
    /// if it was written as a multi-character identifier.
    fn expect_binder_name(&mut self, used: &mut Vec<char>, rename: &mut HashMap<String, char>) -> Result<char> {
        match self.advance() {
            Some(Token::Var(x)) => {
                used.push(x);
                Ok(x)
            }
            Some(Token::Ident(name)) => {
                let c = next_unused_letter(used);
                used.push(c);
                rename.insert(name, c);
                Ok(c)
            }
            other => Err(unexpected(other, "a context variable", self.location())),
        }
    }

    /// A definiendum or constant name: either token class is accepted.
    fn expect_name(&mut self) -> Result<String> {
        match self.advance() {
            Some(Token::Ident(name)) => Ok(name),
            Some(Token::Var(x)) => Ok(x.to_string()),
            other => Err(unexpected(other, "a name", self.location())),
        }
    }
}

fn next_unused_letter(used: &[char]) -> char {
    ('a'..='z')
        .chain('A'..='Z')
        .find(|c| !used.contains(c))
        .expect("the single-letter universe is exhausted within one definition")
}

fn unexpected(found: Option<Token>, expected: &str, location: crate::error::Location) -> Error {
    Error::Parse(ParseError::UnexpectedToken {
        found: found
            .map(|t| format!("{:?}", t))
            .unwrap_or_else(|| "end of input".to_string()),
        expected: expected.to_string(),
        location,
    })
}

/// Parses a complete `.def` source string into an [`Environment`], in the
/// order the definitions appear (which is also their dependency rank).
pub fn parse_def_file(source: &str) -> Result<Environment> {
    let mut env = Environment::empty();
    for def in parse_def_file_entries(source)? {
        env = env.extended(def)?;
    }
    Ok(env)
}

/// Like [`parse_def_file`] but returns the raw, order-preserved list of
/// definitions without folding them into an [`Environment`] — so a caller
/// that only wants to re-render the file (e.g. the definition-file
/// converter's `-s` skip-checks mode) is not forced through the duplicate-name
/// check that building an `Environment` performs.
pub fn parse_def_file_entries(source: &str) -> Result<Vec<Definition>> {
    let tokens = tokenize(source)?;
    let mut cursor = Cursor {
        tokens: &tokens,
        pos: 0,
    };
    let mut defs = Vec::new();

    loop {
        match cursor.peek() {
            Some(Token::Def2) => {
                cursor.advance();
                defs.push(parse_one_definition(&mut cursor)?);
            }
            Some(Token::End) => {
                cursor.advance();
                break;
            }
            other => {
                return Err(unexpected(
                    other.cloned(),
                    "'def2' or 'END'",
                    cursor.location(),
                ))
            }
        }
    }
    Ok(defs)
}

fn parse_one_definition(cursor: &mut Cursor<'_>) -> Result<Definition> {
    let n = cursor.expect_int()?;
    let mut used = Vec::new();
    let mut rename = HashMap::new();
    let mut context = Context::empty();
    for _ in 0..n {
        let x = cursor.expect_binder_name(&mut used, &mut rename)?;
        cursor.expect_symbol(':')?;
        let ty = parse_term_here(cursor, &rename)?;
        context = context.extended(x, ty);
    }

    let name = cursor.expect_name()?;

    let definiens = match cursor.peek() {
        Some(Token::Symbol('#')) => {
            cursor.advance();
            None
        }
        _ => Some(parse_term_here(cursor, &rename)?),
    };

    let ty = parse_term_here(cursor, &rename)?;

    cursor.expect_symbol_token(Token::Edef2)?;

    Ok(match definiens {
        Some(body) => Definition::new_with_definiens(context, name, body, ty),
        None => Definition::new(context, name, ty),
    })
}

impl<'a> Cursor<'a> {
    fn expect_symbol_token(&mut self, expected: Token) -> Result<()> {
        match self.advance() {
            Some(t) if t == expected => Ok(()),
            other => Err(unexpected(other, &format!("{:?}", expected), self.location())),
        }
    }
}

fn parse_term_here(cursor: &mut Cursor<'_>, rename: &HashMap<String, char>) -> Result<Term> {
    let mut parser = TermParser::new(&cursor.tokens[cursor.pos..], rename);
    let term = parser.parse_term()?;
    cursor.pos += parser.position();
    Ok(term)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_primitive_definition() {
        let src = "def2 0 A * edef2 END";
        let env = parse_def_file(src).unwrap();
        assert_eq!(env.len(), 1);
        let d = env.get(0).unwrap();
        assert_eq!(d.definiendum(), "A");
        assert!(d.is_primitive());
        assert_eq!(*d.ty(), Term::Star);
    }

    #[test]
    fn parses_definition_with_context_and_body() {
        let src = "def2 1 x : * id $x:*.x ?x:*.* edef2 END";
        let env = parse_def_file(src).unwrap();
        let d = env.get(0).unwrap();
        assert_eq!(d.definiendum(), "id");
        assert_eq!(d.context().len(), 1);
        assert!(!d.is_primitive());
    }

    #[test]
    fn renames_multi_character_context_variables() {
        let src = "def2 1 foo : * c # foo edef2 END";
        let env = parse_def_file(src).unwrap();
        let d = env.get(0).unwrap();
        let (x, _) = d.context().get(0).unwrap();
        assert_eq!(*d.ty(), Term::variable(*x));
    }

    #[test]
    fn multiple_definitions_in_order() {
        let src = "def2 0 A * edef2 def2 0 B * edef2 END";
        let env = parse_def_file(src).unwrap();
        assert_eq!(env.len(), 2);
        assert_eq!(env.get(0).unwrap().definiendum(), "A");
        assert_eq!(env.get(1).unwrap().definiendum(), "B");
    }
}
