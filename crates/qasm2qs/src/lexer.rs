//! Lexer for `OpenQASM` 2.

use std::ops::Range;

use logos::Logos;
use thiserror::Error;

/// Token kinds for `OpenQASM` 2.
///
/// Literal and identifier tokens carry no payload: their text lives in
/// [`SpannedToken::text`], which borrows from the source.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")]
pub enum Token {
    // Keywords
    #[token("OPENQASM")]
    OpenQasm,

    #[token("include")]
    Include,

    #[token("qreg")]
    QReg,

    #[token("creg")]
    CReg,

    #[token("gate")]
    Gate,

    #[token("opaque")]
    Opaque,

    #[token("if")]
    If,

    #[token("measure")]
    Measure,

    #[token("reset")]
    Reset,

    #[token("barrier")]
    Barrier,

    #[token("pi")]
    Pi,

    // Literals
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    RealLiteral,

    #[regex(r"[0-9]+")]
    IntLiteral,

    #[regex(r#""[^"\n]*""#)]
    StringLiteral,

    // Identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,

    // Operators and punctuation
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("^")]
    Caret,

    #[token("==")]
    EqEq,

    #[token("!=")]
    NotEq,

    #[token("<")]
    Lt,

    #[token("<=")]
    LtEq,

    #[token(">")]
    Gt,

    #[token(">=")]
    GtEq,

    #[token("->")]
    Arrow,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,
}

impl Token {
    /// True for the comparison operators accepted in `if` conditions.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Token::EqEq | Token::NotEq | Token::Lt | Token::LtEq | Token::Gt | Token::GtEq
        )
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::OpenQasm => write!(f, "`OPENQASM`"),
            Token::Include => write!(f, "`include`"),
            Token::QReg => write!(f, "`qreg`"),
            Token::CReg => write!(f, "`creg`"),
            Token::Gate => write!(f, "`gate`"),
            Token::Opaque => write!(f, "`opaque`"),
            Token::If => write!(f, "`if`"),
            Token::Measure => write!(f, "`measure`"),
            Token::Reset => write!(f, "`reset`"),
            Token::Barrier => write!(f, "`barrier`"),
            Token::Pi => write!(f, "`pi`"),
            Token::RealLiteral => write!(f, "real literal"),
            Token::IntLiteral => write!(f, "integer"),
            Token::StringLiteral => write!(f, "string literal"),
            Token::Identifier => write!(f, "identifier"),
            Token::Plus => write!(f, "`+`"),
            Token::Minus => write!(f, "`-`"),
            Token::Star => write!(f, "`*`"),
            Token::Slash => write!(f, "`/`"),
            Token::Caret => write!(f, "`^`"),
            Token::EqEq => write!(f, "`==`"),
            Token::NotEq => write!(f, "`!=`"),
            Token::Lt => write!(f, "`<`"),
            Token::LtEq => write!(f, "`<=`"),
            Token::Gt => write!(f, "`>`"),
            Token::GtEq => write!(f, "`>=`"),
            Token::Arrow => write!(f, "`->`"),
            Token::LParen => write!(f, "`(`"),
            Token::RParen => write!(f, "`)`"),
            Token::LBracket => write!(f, "`[`"),
            Token::RBracket => write!(f, "`]`"),
            Token::LBrace => write!(f, "`{{`"),
            Token::RBrace => write!(f, "`}}`"),
            Token::Semicolon => write!(f, "`;`"),
            Token::Comma => write!(f, "`,`"),
        }
    }
}

/// A token with its literal text and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpannedToken<'src> {
    pub token: Token,
    pub text: &'src str,
    /// Byte offset of the first character.
    pub start: usize,
    /// 1-based line of the first character.
    pub line: usize,
}

impl SpannedToken<'_> {
    pub fn span(&self) -> Range<usize> {
        self.start..self.start + self.text.len()
    }
}

/// A character sequence that starts no token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message} ('{text}')")]
pub struct LexError {
    pub line: usize,
    pub text: String,
    pub message: String,
}

/// Lazy token stream over a source string.
///
/// Whitespace and comments are skipped. The stream is single-pass: once
/// consumed, a new `Tokenizer` is needed to scan the source again.
pub struct Tokenizer<'src> {
    lexer: logos::Lexer<'src, Token>,
    line: usize,
    scanned: usize,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: Token::lexer(source),
            line: 1,
            scanned: 0,
        }
    }

    /// Line of the most recently produced token.
    pub fn line(&self) -> usize {
        self.line
    }

    fn track_line(&mut self, start: usize) {
        let skipped = &self.lexer.source()[self.scanned..start];
        self.line += skipped.bytes().filter(|&b| b == b'\n').count();
        self.scanned = start;
    }
}

impl<'src> Iterator for Tokenizer<'src> {
    type Item = Result<SpannedToken<'src>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.lexer.next()?;
        let start = self.lexer.span().start;
        self.track_line(start);
        let text = self.lexer.slice();

        match result {
            // A closed block comment is skipped by the lexer, so a `/*` that
            // still reaches us never ends.
            Ok(Token::Slash) if self.lexer.remainder().starts_with('*') => Some(Err(LexError {
                line: self.line,
                text: "/*".into(),
                message: "unterminated block comment".into(),
            })),
            Ok(token) => Some(Ok(SpannedToken {
                token,
                text,
                start,
                line: self.line,
            })),
            Err(()) => {
                let message = if text.starts_with('"') {
                    "unterminated string literal"
                } else {
                    "invalid token"
                };
                Some(Err(LexError {
                    line: self.line,
                    text: text.to_string(),
                    message: message.into(),
                }))
            }
        }
    }
}
