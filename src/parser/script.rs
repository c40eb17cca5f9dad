//! Reader and writer for script files: one rule invocation per line,
//! `lineno opcode operands…`, terminated by a sentinel `-1` line. `//` line
//! comments and blank lines are ignored between entries.

use crate::book::Rule;
use crate::error::{Error, Location, ParseError, Result};

pub fn write_script(rules: &[Rule]) -> String {
    let mut out = String::new();
    for (i, rule) in rules.iter().enumerate() {
        out.push_str(&format!("{} {}\n", i + 1, rule));
    }
    out.push_str("-1\n");
    out
}

pub fn parse_script(source: &str) -> Result<Vec<Rule>> {
    let mut rules = Vec::new();
    for (lineno, raw) in source.lines().enumerate() {
        let line = match raw.find("//") {
            Some(i) => &raw[..i],
            None => raw,
        }
        .trim();
        if line.is_empty() {
            continue;
        }
        if line == "-1" {
            break;
        }
        rules.push(parse_line(line, lineno + 1)?);
    }
    Ok(rules)
}

fn loc(lineno: usize) -> Location {
    Location {
        line: lineno,
        column: 1,
    }
}

fn parse_line(line: &str, lineno: usize) -> Result<Rule> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 2 {
        return Err(Error::Parse(ParseError::UnexpectedEof {
            expected: "a script line: 'lineno opcode operands...'".to_string(),
        }));
    }
    // fields[0] is the line's own label; unused beyond sanity-checking it
    // parses as an integer, since the book assigns the real index.
    parse_usize(fields[0], lineno)?;
    let opcode = fields[1];
    let ops = &fields[2..];

    let rule = match opcode {
        "sort" => {
            expect_arity(ops, 0, lineno)?;
            Rule::Sort
        }
        "var" => {
            expect_arity(ops, 2, lineno)?;
            Rule::Var(parse_usize(ops[0], lineno)?, parse_char(ops[1], lineno)?)
        }
        "weak" => {
            expect_arity(ops, 3, lineno)?;
            Rule::Weak(
                parse_usize(ops[0], lineno)?,
                parse_usize(ops[1], lineno)?,
                parse_char(ops[2], lineno)?,
            )
        }
        "form" => {
            expect_arity(ops, 2, lineno)?;
            Rule::Form(parse_usize(ops[0], lineno)?, parse_usize(ops[1], lineno)?)
        }
        "appl" => {
            expect_arity(ops, 2, lineno)?;
            Rule::Appl(parse_usize(ops[0], lineno)?, parse_usize(ops[1], lineno)?)
        }
        "abst" => {
            expect_arity(ops, 2, lineno)?;
            Rule::Abst(parse_usize(ops[0], lineno)?, parse_usize(ops[1], lineno)?)
        }
        "conv" => {
            expect_arity(ops, 2, lineno)?;
            Rule::Conv(parse_usize(ops[0], lineno)?, parse_usize(ops[1], lineno)?)
        }
        "def" => {
            expect_arity(ops, 3, lineno)?;
            Rule::Def(
                parse_usize(ops[0], lineno)?,
                parse_usize(ops[1], lineno)?,
                ops[2].to_string(),
            )
        }
        "defpr" => {
            expect_arity(ops, 3, lineno)?;
            Rule::DefPr(
                parse_usize(ops[0], lineno)?,
                parse_usize(ops[1], lineno)?,
                ops[2].to_string(),
            )
        }
        "inst" => {
            if ops.len() < 2 {
                return Err(Error::Parse(ParseError::UnexpectedEof {
                    expected: "'inst m n k1..kn p'".to_string(),
                }));
            }
            let m = parse_usize(ops[0], lineno)?;
            let n = parse_usize(ops[1], lineno)?;
            if ops.len() != 2 + n + 1 {
                return Err(Error::Parse(ParseError::UnexpectedToken {
                    found: format!("{} operand(s)", ops.len()),
                    expected: format!("{} operands for 'inst' with n={}", 2 + n + 1, n),
                    location: loc(lineno),
                }));
            }
            let ks = ops[2..2 + n]
                .iter()
                .map(|s| parse_usize(s, lineno))
                .collect::<Result<Vec<_>>>()?;
            let p = parse_usize(ops[2 + n], lineno)?;
            Rule::Inst(m, n, ks, p)
        }
        "cp" => {
            expect_arity(ops, 1, lineno)?;
            Rule::Cp(parse_usize(ops[0], lineno)?)
        }
        "sp" => {
            expect_arity(ops, 2, lineno)?;
            Rule::Sp(parse_usize(ops[0], lineno)?, parse_usize(ops[1], lineno)?)
        }
        "tp" => {
            expect_arity(ops, 1, lineno)?;
            Rule::Tp(parse_usize(ops[0], lineno)?)
        }
        other => {
            return Err(Error::Parse(ParseError::UnexpectedToken {
                found: other.to_string(),
                expected: "a known rule opcode".to_string(),
                location: loc(lineno),
            }))
        }
    };
    Ok(rule)
}

fn expect_arity(ops: &[&str], n: usize, lineno: usize) -> Result<()> {
    if ops.len() != n {
        return Err(Error::Parse(ParseError::UnexpectedToken {
            found: format!("{} operand(s)", ops.len()),
            expected: format!("{} operand(s)", n),
            location: loc(lineno),
        }));
    }
    Ok(())
}

fn parse_usize(s: &str, lineno: usize) -> Result<usize> {
    s.parse::<usize>().map_err(|_| {
        Error::Parse(ParseError::UnexpectedToken {
            found: s.to_string(),
            expected: "an unsigned integer".to_string(),
            location: loc(lineno),
        })
    })
}

fn parse_char(s: &str, lineno: usize) -> Result<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::Parse(ParseError::UnexpectedToken {
            found: s.to_string(),
            expected: "a single-character variable".to_string(),
            location: loc(lineno),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_simple_script() {
        let rules = vec![Rule::Sort, Rule::Var(1, 'x'), Rule::Form(1, 2)];
        let text = write_script(&rules);
        assert!(text.ends_with("-1\n"));
        let parsed = parse_script(&text).unwrap();
        assert_eq!(parsed, rules);
    }

    #[test]
    fn parses_inst_with_variable_arity() {
        let rules = parse_script("1 inst 4 2 1 2 0\n-1\n").unwrap();
        assert_eq!(rules, vec![Rule::Inst(4, 2, vec![1, 2], 0)]);
    }

    #[test]
    fn ignores_comments_and_blank_lines() {
        let rules = parse_script("// a comment\n\n1 sort\n-1\n").unwrap();
        assert_eq!(rules, vec![Rule::Sort]);
    }

    #[test]
    fn rejects_unknown_opcode() {
        assert!(parse_script("1 bogus\n-1\n").is_err());
    }
}
