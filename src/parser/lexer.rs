//! Tokenizer for `.def` files and term expressions.
//!
//! Whitespace-separated, with `//` line comments and `/* .. */` block
//! comments. A maximal alphanumeric/`_`/`-` run starting with a letter is a
//! single-character [`Token::Var`] if it is exactly one character long, and
//! a multi-character [`Token::Ident`] otherwise; this is what lets a bare
//! context-variable position and a constant-name position share a lexical
//! class.

use crate::error::{Error, Location, Result, TokenizeError};

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Def2,
    Edef2,
    End,
    Int(i64),
    Var(char),
    Ident(String),
    /// One of `()[]{}:;,.\$?*@#%`.
    Symbol(char),
    /// `:=`.
    Assign,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Spanned<T> {
    pub value: T,
    pub location: Location,
}

const PUNCTUATION: &str = "()[]{}:;,.\\$?*@#%";

pub fn tokenize(input: &str) -> Result<Vec<Spanned<Token>>> {
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    let mut line = 1usize;
    let mut column = 1usize;
    let mut out = Vec::new();

    let advance = |i: &mut usize, line: &mut usize, column: &mut usize, chars: &[char]| {
        if chars[*i] == '\n' {
            *line += 1;
            *column = 1;
        } else {
            *column += 1;
        }
        *i += 1;
    };

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            advance(&mut i, &mut line, &mut column, &chars);
            continue;
        }
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                advance(&mut i, &mut line, &mut column, &chars);
            }
            continue;
        }
        if c == '/' && chars.get(i + 1) == Some(&'*') {
            let start = Location { line, column };
            advance(&mut i, &mut line, &mut column, &chars);
            advance(&mut i, &mut line, &mut column, &chars);
            let mut closed = false;
            while i < chars.len() {
                if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                    advance(&mut i, &mut line, &mut column, &chars);
                    advance(&mut i, &mut line, &mut column, &chars);
                    closed = true;
                    break;
                }
                advance(&mut i, &mut line, &mut column, &chars);
            }
            if !closed {
                return Err(Error::Tokenize(TokenizeError::UnterminatedBlockComment {
                    location: start,
                }));
            }
            continue;
        }

        let start = Location { line, column };

        if c.is_ascii_digit() {
            let mut text = String::new();
            while i < chars.len() && chars[i].is_ascii_digit() {
                text.push(chars[i]);
                advance(&mut i, &mut line, &mut column, &chars);
            }
            let value = text
                .parse::<i64>()
                .map_err(|_| Error::Tokenize(TokenizeError::NumericOverflow { location: start }))?;
            out.push(Spanned {
                value: Token::Int(value),
                location: start,
            });
            continue;
        }

        if c.is_alphabetic() {
            let mut text = String::new();
            while i < chars.len()
                && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '-')
            {
                text.push(chars[i]);
                advance(&mut i, &mut line, &mut column, &chars);
            }
            let token = match text.as_str() {
                "def2" => Token::Def2,
                "edef2" => Token::Edef2,
                "END" => Token::End,
                _ if text.chars().count() == 1 => Token::Var(text.chars().next().unwrap()),
                _ => Token::Ident(text),
            };
            out.push(Spanned {
                value: token,
                location: start,
            });
            continue;
        }

        if c == ':' && chars.get(i + 1) == Some(&'=') {
            advance(&mut i, &mut line, &mut column, &chars);
            advance(&mut i, &mut line, &mut column, &chars);
            out.push(Spanned {
                value: Token::Assign,
                location: start,
            });
            continue;
        }

        if PUNCTUATION.contains(c) {
            advance(&mut i, &mut line, &mut column, &chars);
            out.push(Spanned {
                value: Token::Symbol(c),
                location: start,
            });
            continue;
        }

        return Err(Error::Tokenize(TokenizeError::UnknownGlyph {
            glyph: c,
            location: start,
        }));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_def2_block() {
        let toks = tokenize("def2 0 c # * edef2").unwrap();
        assert_eq!(toks[0].value, Token::Def2);
        assert_eq!(toks[1].value, Token::Int(0));
        assert_eq!(toks[2].value, Token::Var('c'));
        assert_eq!(toks.last().unwrap().value, Token::Edef2);
    }

    #[test]
    fn single_letter_is_var_multi_letter_is_ident() {
        let toks = tokenize("x foo").unwrap();
        assert_eq!(toks[0].value, Token::Var('x'));
        assert_eq!(toks[1].value, Token::Ident("foo".to_string()));
    }

    #[test]
    fn line_and_block_comments_are_skipped() {
        let toks = tokenize("// hello\nx /* skip\nthis */ y").unwrap();
        assert_eq!(toks.len(), 2);
    }

    #[test]
    fn unterminated_block_comment_errors() {
        assert!(tokenize("/* never closes").is_err());
    }

    #[test]
    fn unknown_glyph_errors() {
        assert!(tokenize("~").is_err());
    }
}
