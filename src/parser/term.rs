//! Recursive-descent parser for the prefix term surface syntax:
//! `*`, `@`, a variable letter, `%E E` (application), `$x:T.E` (lambda),
//! `?x:T.E` (pi), `name[E,...]` (constant), and parenthesised grouping.

use std::collections::HashMap;

use crate::error::{Error, Location, ParseError, Result};
use crate::term::Term;

use super::lexer::{Spanned, Token};

/// A cursor over a token stream plus an optional renaming of multi-character
/// identifiers to the single-letter variables they stand in for (used while
/// parsing a `.def` block whose context introduced such a name).
pub struct TermParser<'a> {
    tokens: &'a [Spanned<Token>],
    pos: usize,
    rename: &'a HashMap<String, char>,
}

impl<'a> TermParser<'a> {
    pub fn new(tokens: &'a [Spanned<Token>], rename: &'a HashMap<String, char>) -> Self {
        TermParser {
            tokens,
            pos: 0,
            rename,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.value)
    }

    fn location(&self) -> Location {
        self.tokens
            .get(self.pos)
            .map(|s| s.location)
            .unwrap_or(Location { line: 0, column: 0 })
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos).map(|s| &s.value);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_symbol(&mut self, c: char) -> Result<()> {
        match self.peek() {
            Some(Token::Symbol(s)) if *s == c => {
                self.advance();
                Ok(())
            }
            other => Err(Error::Parse(ParseError::UnexpectedToken {
                found: describe(other),
                expected: format!("'{}'", c),
                location: self.location(),
            })),
        }
    }

    fn expect_var(&mut self) -> Result<char> {
        match self.peek().cloned() {
            Some(Token::Var(x)) => {
                self.advance();
                Ok(x)
            }
            other => Err(Error::Parse(ParseError::UnexpectedToken {
                found: describe(&other),
                expected: "a single-character variable".to_string(),
                location: self.location(),
            })),
        }
    }

    /// Parses one term expression.
    pub fn parse_term(&mut self) -> Result<Term> {
        let loc = self.location();
        match self.peek().cloned() {
            Some(Token::Symbol('*')) => {
                self.advance();
                Ok(Term::Star)
            }
            Some(Token::Symbol('@')) => {
                self.advance();
                Ok(Term::Square)
            }
            Some(Token::Var(x)) => {
                self.advance();
                Ok(Term::variable(x))
            }
            Some(Token::Symbol('%')) => {
                self.advance();
                let m = self.parse_term()?;
                let n = self.parse_term()?;
                Ok(Term::application(m, n))
            }
            Some(Token::Symbol('$')) => {
                self.advance();
                let x = self.expect_var()?;
                self.expect_symbol(':')?;
                let ty = self.parse_term()?;
                self.expect_symbol('.')?;
                let body = self.parse_term()?;
                Ok(Term::lambda(x, ty, body))
            }
            Some(Token::Symbol('?')) => {
                self.advance();
                let x = self.expect_var()?;
                self.expect_symbol(':')?;
                let ty = self.parse_term()?;
                self.expect_symbol('.')?;
                let body = self.parse_term()?;
                Ok(Term::pi(x, ty, body))
            }
            Some(Token::Symbol('(')) => {
                self.advance();
                let inner = self.parse_term()?;
                self.expect_symbol(')')?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                self.advance();
                if matches!(self.peek(), Some(Token::Symbol('['))) {
                    self.advance();
                    let args = self.parse_term_list()?;
                    self.expect_symbol(']')?;
                    Ok(Term::constant(name, args))
                } else if let Some(&x) = self.rename.get(&name) {
                    Ok(Term::variable(x))
                } else {
                    Err(Error::Parse(ParseError::UnexpectedToken {
                        found: format!("identifier '{}'", name),
                        expected: "'[' (constant application) or a renamed context variable"
                            .to_string(),
                        location: loc,
                    }))
                }
            }
            other => Err(Error::Parse(ParseError::UnexpectedToken {
                found: describe(&other),
                expected: "a term".to_string(),
                location: loc,
            })),
        }
    }

    fn parse_term_list(&mut self) -> Result<Vec<Term>> {
        let mut terms = Vec::new();
        if matches!(self.peek(), Some(Token::Symbol(']'))) {
            return Ok(terms);
        }
        loop {
            terms.push(self.parse_term()?);
            match self.peek() {
                Some(Token::Symbol(',')) => {
                    self.advance();
                }
                _ => break,
            }
        }
        Ok(terms)
    }
}

fn describe(tok: &Option<Token>) -> String {
    match tok {
        Some(Token::Def2) => "'def2'".to_string(),
        Some(Token::Edef2) => "'edef2'".to_string(),
        Some(Token::End) => "'END'".to_string(),
        Some(Token::Int(n)) => n.to_string(),
        Some(Token::Var(x)) => x.to_string(),
        Some(Token::Ident(s)) => s.clone(),
        Some(Token::Symbol(c)) => c.to_string(),
        Some(Token::Assign) => ":=".to_string(),
        None => "end of input".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    fn parse(src: &str) -> Term {
        let toks = tokenize(src).unwrap();
        let rename = HashMap::new();
        TermParser::new(&toks, &rename).parse_term().unwrap()
    }

    #[test]
    fn parses_identity_lambda() {
        let t = parse("$x:*.x");
        assert_eq!(t, Term::lambda('x', Term::Star, Term::variable('x')));
    }

    #[test]
    fn parses_pi() {
        let t = parse("?x:*.*");
        assert_eq!(t, Term::pi('x', Term::Star, Term::Star));
    }

    #[test]
    fn parses_application_with_parens() {
        let t = parse("%($x:*.x)(y)");
        assert_eq!(
            t,
            Term::application(
                Term::lambda('x', Term::Star, Term::variable('x')),
                Term::variable('y'),
            )
        );
    }

    #[test]
    fn parses_constant_with_args() {
        let t = parse("id[*, y]");
        assert_eq!(
            t,
            Term::constant("id", vec![Term::Star, Term::variable('y')])
        );
    }

    #[test]
    fn parses_nested_application_prefix() {
        let t = parse("%%f x y");
        assert_eq!(
            t,
            Term::application(
                Term::application(Term::variable('f'), Term::variable('x')),
                Term::variable('y'),
            )
        );
    }
}
