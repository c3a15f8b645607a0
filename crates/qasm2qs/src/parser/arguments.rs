//! Register arguments and broadcast.

use std::fmt;

use super::Cursor;
use crate::error::{TranslateError, TranslateResult};
use crate::lexer::Token;

/// An argument as written: `q` or `q[2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argument<'src> {
    pub name: &'src str,
    pub index: Option<usize>,
    pub line: usize,
}

impl fmt::Display for Argument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{i}]", self.name),
            None => f.write_str(self.name),
        }
    }
}

/// An argument resolved against the symbol tables or the enclosing gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// One qubit or bit, already rendered (`q[2]`, or a gate parameter `a`).
    Element(String),
    /// A whole register, expanded element by element.
    Register { name: String, size: usize },
}

impl Operand {
    fn element(&self, i: usize) -> String {
        match self {
            Operand::Element(text) => text.clone(),
            Operand::Register { name, .. } => format!("{name}[{i}]"),
        }
    }
}

/// Parse `arg (, arg)*`. Enters on the first argument, exits on the token
/// after the last one.
pub fn parse_arguments<'src>(cursor: &mut Cursor<'src>) -> TranslateResult<Vec<Argument<'src>>> {
    let mut args = Vec::new();
    loop {
        args.push(parse_argument(cursor)?);
        if !cursor.check(Token::Comma) {
            break;
        }
        cursor.bump("argument")?;
    }
    Ok(args)
}

/// Parse `name` or `name[int]`. Enters on the name, exits after it.
pub fn parse_argument<'src>(cursor: &mut Cursor<'src>) -> TranslateResult<Argument<'src>> {
    let head = cursor
        .require(Token::Identifier)
        .map_err(|_| cursor.unexpected("register argument"))?;
    cursor.bump("`;`")?;

    let index = if cursor.check(Token::LBracket) {
        let index = cursor.expect_integer("register index")?;
        cursor.expect(Token::RBracket)?;
        cursor.bump("`;`")?;
        Some(index)
    } else {
        None
    };

    Ok(Argument {
        name: head.text,
        index,
        line: head.line,
    })
}

/// Expand operands into one row per call. Whole registers must agree in
/// size; single elements are repeated on every row.
pub fn broadcast(
    cursor: &Cursor<'_>,
    line: usize,
    operands: &[Operand],
) -> TranslateResult<Vec<Vec<String>>> {
    let mut width: Option<(&str, usize)> = None;
    for operand in operands {
        if let Operand::Register { name, size } = operand {
            match width {
                None => width = Some((name.as_str(), *size)),
                Some((first, n)) if n != *size => {
                    return Err(TranslateError::RegisterSizeMismatch {
                        path: cursor.label(),
                        line,
                        message: format!("'{first}' has {n} elements, '{name}' has {size}"),
                    });
                }
                Some(_) => {}
            }
        }
    }

    let rows = width.map_or(1, |(_, n)| n);
    Ok((0..rows)
        .map(|i| operands.iter().map(|op| op.element(i)).collect())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> TranslateResult<Vec<String>> {
        let mut cursor = Cursor::new(source, "args.qasm");
        cursor.advance()?;
        let args = parse_arguments(&mut cursor)?;
        cursor.require(Token::Semicolon)?;
        Ok(args.iter().map(ToString::to_string).collect())
    }

    fn register(name: &str, size: usize) -> Operand {
        Operand::Register {
            name: name.into(),
            size,
        }
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(parse("q[0], r, a[12];").unwrap(), vec!["q[0]", "r", "a[12]"]);
    }

    #[test]
    fn test_parse_rejects_non_identifier() {
        assert!(parse("[0];").is_err());
        assert!(parse("q[0],;").is_err());
        assert!(parse("q[x];").is_err());
    }

    #[test]
    fn test_broadcast_single_elements() {
        let cursor = Cursor::new("", "b.qasm");
        let rows = broadcast(
            &cursor,
            1,
            &[Operand::Element("q[0]".into()), Operand::Element("q[1]".into())],
        )
        .unwrap();
        assert_eq!(rows, vec![vec!["q[0]", "q[1]"]]);
    }

    #[test]
    fn test_broadcast_register_with_element() {
        let cursor = Cursor::new("", "b.qasm");
        let rows = broadcast(&cursor, 1, &[Operand::Element("a[0]".into()), register("q", 3)])
            .unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["a[0]", "q[0]"],
                vec!["a[0]", "q[1]"],
                vec!["a[0]", "q[2]"],
            ]
        );
    }

    #[test]
    fn test_broadcast_size_mismatch() {
        let cursor = Cursor::new("", "b.qasm");
        let err = broadcast(&cursor, 7, &[register("q", 2), register("r", 3)]).unwrap_err();
        assert!(matches!(err, TranslateError::RegisterSizeMismatch { line: 7, .. }));
    }
}
