//! The shared token cursor.

use std::path::{Path, PathBuf};

use crate::error::{TranslateError, TranslateResult};
use crate::lexer::{SpannedToken, Token, Tokenizer};

/// Single forward-only position in the token stream of one source.
///
/// The cursor always *stands on* a token: [`Cursor::current`] is the token
/// most recently read. Statement routines enter with the cursor on their
/// leading token and return with it on their terminator, which they do not
/// consume.
pub struct Cursor<'src> {
    tokens: Tokenizer<'src>,
    current: Option<SpannedToken<'src>>,
    path: PathBuf,
    label: String,
}

impl<'src> Cursor<'src> {
    /// A cursor before the first token of `source`. `path` names the source
    /// in errors and anchors relative includes.
    pub fn new(source: &'src str, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self {
            tokens: Tokenizer::new(source),
            current: None,
            path,
            label,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The path as it appears in error messages.
    pub fn label(&self) -> String {
        self.label.clone()
    }

    pub fn current(&self) -> Option<&SpannedToken<'src>> {
        self.current.as_ref()
    }

    /// Text of the current token.
    pub fn current_text(&self) -> Option<&'src str> {
        self.current.map(|t| t.text)
    }

    /// Line of the current token, or of the last token read.
    pub fn line(&self) -> usize {
        self.current.map_or_else(|| self.tokens.line(), |t| t.line)
    }

    /// Move to the next token. Returns `false` at end of input.
    pub fn advance(&mut self) -> TranslateResult<bool> {
        self.current = match self.tokens.next() {
            Some(Ok(token)) => Some(token),
            Some(Err(e)) => {
                return Err(TranslateError::Lexical {
                    path: self.label(),
                    line: e.line,
                    text: e.text,
                    message: e.message,
                });
            }
            None => None,
        };
        Ok(self.current.is_some())
    }

    /// Move to the next token, which must exist.
    pub fn bump(&mut self, expected: &str) -> TranslateResult<SpannedToken<'src>> {
        self.advance()?;
        self.require_any(expected)
    }

    /// Move to the next token, which must be `token`.
    pub fn expect(&mut self, token: Token) -> TranslateResult<SpannedToken<'src>> {
        self.advance()?;
        self.require(token)
    }

    /// The current token, which must exist.
    pub fn require_any(&self, expected: &str) -> TranslateResult<SpannedToken<'src>> {
        self.current.ok_or_else(|| TranslateError::UnexpectedEof {
            path: self.label(),
            expected: expected.to_string(),
        })
    }

    /// The current token, which must be `token`. Does not advance.
    pub fn require(&self, token: Token) -> TranslateResult<SpannedToken<'src>> {
        let current = self.require_any(&token.to_string())?;
        if current.token != token {
            return Err(self.unexpected(&token.to_string()));
        }
        Ok(current)
    }

    /// Check the kind of the current token.
    pub fn check(&self, token: Token) -> bool {
        self.current.is_some_and(|t| t.token == token)
    }

    /// Move to the next token and read it as a non-negative integer.
    /// `what` describes the integer for error messages ("register size").
    pub fn expect_integer(&mut self, what: &str) -> TranslateResult<usize> {
        let token = self.bump(what)?;
        if token.token != Token::IntLiteral {
            return Err(TranslateError::MalformedDeclaration {
                path: self.label(),
                line: token.line,
                message: format!("{what} must be a non-negative integer, found '{}'", token.text),
            });
        }
        token
            .text
            .parse::<usize>()
            .map_err(|_| TranslateError::MalformedDeclaration {
                path: self.label(),
                line: token.line,
                message: format!("{what} '{}' is out of range", token.text),
            })
    }

    /// Error for the current token not being what the grammar needs.
    pub fn unexpected(&self, expected: &str) -> TranslateError {
        match self.current {
            Some(token) => TranslateError::UnexpectedToken {
                path: self.label(),
                line: token.line,
                expected: expected.to_string(),
                found: token.text.to_string(),
            },
            None => TranslateError::UnexpectedEof {
                path: self.label(),
                expected: expected.to_string(),
            },
        }
    }
}
