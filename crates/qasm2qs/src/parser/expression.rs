//! Gate parameter expressions.
//!
//! Expressions are parsed with precedence climbing and rendered as Q#
//! `Double` expressions. Entry: cursor on the first token of the expression.
//! Exit: cursor on the first token after it.

use std::fmt;

use super::Cursor;
use crate::error::{TranslateError, TranslateResult};
use crate::lexer::Token;

/// A parameter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal, already in Q# `Double` form.
    Number(String),
    Pi,
    /// Parameter of the enclosing gate.
    Param(String),
    Neg(Box<Expr>),
    Paren(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: MathFn,
        arg: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    fn from_token(token: Token) -> Option<Self> {
        match token {
            Token::Plus => Some(Self::Add),
            Token::Minus => Some(Self::Sub),
            Token::Star => Some(Self::Mul),
            Token::Slash => Some(Self::Div),
            Token::Caret => Some(Self::Pow),
            _ => None,
        }
    }

    fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
            Self::Pow => POW_PRECEDENCE,
        }
    }
}

const POW_PRECEDENCE: u8 = 3;

/// Unary functions of the `OpenQASM` 2 expression grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathFn {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
}

impl MathFn {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            "exp" => Some(Self::Exp),
            "ln" => Some(Self::Ln),
            "sqrt" => Some(Self::Sqrt),
            _ => None,
        }
    }

    fn qsharp_name(self) -> &'static str {
        match self {
            Self::Sin => "Sin",
            Self::Cos => "Cos",
            Self::Tan => "Tan",
            Self::Exp => "ExpD",
            Self::Ln => "Log",
            Self::Sqrt => "Sqrt",
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => f.write_str(n),
            Expr::Pi => f.write_str("PI()"),
            Expr::Param(name) => f.write_str(name),
            Expr::Neg(e) => write!(f, "-{e}"),
            Expr::Paren(e) => write!(f, "({e})"),
            Expr::Binary {
                op: BinOp::Pow,
                lhs,
                rhs,
            } => write!(f, "PowD({lhs}, {rhs})"),
            Expr::Binary { op, lhs, rhs } => {
                let symbol = match op {
                    BinOp::Add => "+",
                    BinOp::Sub => "-",
                    BinOp::Mul => "*",
                    BinOp::Div => "/",
                    BinOp::Pow => unreachable!("rendered as PowD"),
                };
                write!(f, "{lhs} {symbol} {rhs}")
            }
            Expr::Call { func, arg } => write!(f, "{}({arg})", func.qsharp_name()),
        }
    }
}

/// Parse one expression. Identifiers must name one of `params`.
pub fn parse_expression(cursor: &mut Cursor<'_>, params: &[String]) -> TranslateResult<Expr> {
    parse_binary(cursor, params, 0)
}

/// Parse a parenthesized, comma-separated expression list. Enters on `(`,
/// exits on the token after `)`.
pub fn parse_expression_list(
    cursor: &mut Cursor<'_>,
    params: &[String],
) -> TranslateResult<Vec<Expr>> {
    cursor.require(Token::LParen)?;
    cursor.bump("expression or `)`")?;

    let mut exprs = Vec::new();
    if !cursor.check(Token::RParen) {
        loop {
            exprs.push(parse_expression(cursor, params)?);
            if cursor.check(Token::Comma) {
                cursor.bump("expression")?;
                continue;
            }
            break;
        }
        cursor.require(Token::RParen)?;
    }
    cursor.bump("gate arguments")?;
    Ok(exprs)
}

fn parse_binary(cursor: &mut Cursor<'_>, params: &[String], min_prec: u8) -> TranslateResult<Expr> {
    let mut lhs = parse_unary(cursor, params)?;

    while let Some(op) = cursor.current().and_then(|t| BinOp::from_token(t.token)) {
        let prec = op.precedence();
        if prec < min_prec {
            break;
        }
        cursor.bump("expression")?;

        // `^` is right-associative.
        let next_min = if op == BinOp::Pow { prec } else { prec + 1 };
        let rhs = parse_binary(cursor, params, next_min)?;
        lhs = Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        };
    }

    Ok(lhs)
}

fn parse_unary(cursor: &mut Cursor<'_>, params: &[String]) -> TranslateResult<Expr> {
    if cursor.check(Token::Minus) {
        cursor.bump("expression")?;
        // -a^b is -(a^b)
        let operand = parse_binary(cursor, params, POW_PRECEDENCE)?;
        return Ok(Expr::Neg(Box::new(operand)));
    }
    parse_primary(cursor, params)
}

fn parse_primary(cursor: &mut Cursor<'_>, params: &[String]) -> TranslateResult<Expr> {
    let token = cursor.require_any("expression")?;

    let expr = match token.token {
        Token::IntLiteral => Expr::Number(format!("{}.0", token.text)),
        Token::RealLiteral => Expr::Number(normalize_real(token.text)),
        Token::Pi => Expr::Pi,
        Token::Identifier => {
            if let Some(func) = MathFn::from_name(token.text) {
                cursor.expect(Token::LParen)?;
                cursor.bump("expression")?;
                let arg = parse_expression(cursor, params)?;
                cursor.require(Token::RParen)?;
                Expr::Call {
                    func,
                    arg: Box::new(arg),
                }
            } else if params.iter().any(|p| p == token.text) {
                Expr::Param(token.text.to_string())
            } else {
                return Err(TranslateError::UndefinedParameter {
                    path: cursor.label(),
                    line: token.line,
                    name: token.text.to_string(),
                });
            }
        }
        Token::LParen => {
            cursor.bump("expression")?;
            let inner = parse_expression(cursor, params)?;
            cursor.require(Token::RParen)?;
            Expr::Paren(Box::new(inner))
        }
        _ => return Err(cursor.unexpected("expression")),
    };

    cursor.bump("`)` or `,`")?;
    Ok(expr)
}

/// Q# needs digits on both sides of the point: `2.` becomes `2.0` and
/// `1e-3` becomes `1.0e-3`.
fn normalize_real(text: &str) -> String {
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(i) => text.split_at(i),
        None => (text, ""),
    };
    let mantissa = if !mantissa.contains('.') {
        format!("{mantissa}.0")
    } else if mantissa.ends_with('.') {
        format!("{mantissa}0")
    } else {
        mantissa.to_string()
    };
    format!("{mantissa}{exponent}")
}
