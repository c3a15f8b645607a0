//! Error types for the translator.

use thiserror::Error;

/// Errors that can occur while translating a program.
///
/// Every variant carries the path of the source being read, so that errors
/// raised inside an included file name that file rather than the root.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TranslateError {
    /// Lexer error (a character that starts no token, an unterminated
    /// string or block comment).
    #[error("{path}:{line}: lexical error at '{text}': {message}")]
    Lexical {
        path: String,
        line: usize,
        text: String,
        message: String,
    },

    /// Unexpected token.
    #[error("{path}:{line}: expected {expected}, found '{found}'")]
    UnexpectedToken {
        path: String,
        line: usize,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("{path}: unexpected end of input, expected {expected}")]
    UnexpectedEof { path: String, expected: String },

    /// A register (or gate qubit parameter) that was never declared.
    #[error("{path}:{line}: undeclared register '{name}'")]
    UndeclaredRegister {
        path: String,
        line: usize,
        name: String,
    },

    /// Register size or index that is not a valid non-negative integer,
    /// or an unsupported version header.
    #[error("{path}:{line}: malformed declaration: {message}")]
    MalformedDeclaration {
        path: String,
        line: usize,
        message: String,
    },

    /// Duplicate register or gate declaration.
    #[error("{path}:{line}: duplicate declaration of '{name}'")]
    DuplicateDeclaration {
        path: String,
        line: usize,
        name: String,
    },

    /// Whole-register arguments of different sizes in one statement.
    #[error("{path}:{line}: register size mismatch: {message}")]
    RegisterSizeMismatch {
        path: String,
        line: usize,
        message: String,
    },

    /// Expression names something that is not a parameter of the enclosing gate.
    #[error("{path}:{line}: undefined parameter '{name}'")]
    UndefinedParameter {
        path: String,
        line: usize,
        name: String,
    },

    /// Wrong number of qubit arguments.
    #[error("{path}:{line}: gate '{gate}' expects {expected} qubits, got {got}")]
    WrongQubitCount {
        path: String,
        line: usize,
        gate: String,
        expected: usize,
        got: usize,
    },

    /// Wrong number of parameters.
    #[error("{path}:{line}: gate '{gate}' expects {expected} parameters, got {got}")]
    WrongParameterCount {
        path: String,
        line: usize,
        gate: String,
        expected: usize,
        got: usize,
    },

    /// An `include` that cannot be resolved, read, or that includes itself.
    #[error("{path}:{line}: cannot include \"{file}\": {message}")]
    Include {
        path: String,
        line: usize,
        file: String,
        message: String,
    },

    /// The source file could not be read.
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid translator configuration.
    #[error("{path}: invalid configuration: {message}")]
    Config { path: String, message: String },
}

impl TranslateError {
    /// Path of the source (or config file) the error was raised in.
    pub fn path(&self) -> &str {
        match self {
            Self::Lexical { path, .. }
            | Self::UnexpectedToken { path, .. }
            | Self::UnexpectedEof { path, .. }
            | Self::UndeclaredRegister { path, .. }
            | Self::MalformedDeclaration { path, .. }
            | Self::DuplicateDeclaration { path, .. }
            | Self::RegisterSizeMismatch { path, .. }
            | Self::UndefinedParameter { path, .. }
            | Self::WrongQubitCount { path, .. }
            | Self::WrongParameterCount { path, .. }
            | Self::Include { path, .. }
            | Self::Io { path, .. }
            | Self::Config { path, .. } => path,
        }
    }

    /// Line of the offending token, when there is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Lexical { line, .. }
            | Self::UnexpectedToken { line, .. }
            | Self::UndeclaredRegister { line, .. }
            | Self::MalformedDeclaration { line, .. }
            | Self::DuplicateDeclaration { line, .. }
            | Self::RegisterSizeMismatch { line, .. }
            | Self::UndefinedParameter { line, .. }
            | Self::WrongQubitCount { line, .. }
            | Self::WrongParameterCount { line, .. }
            | Self::Include { line, .. } => Some(*line),
            Self::UnexpectedEof { .. } | Self::Io { .. } | Self::Config { .. } => None,
        }
    }
}

/// Result type for translation operations.
pub type TranslateResult<T> = Result<T, TranslateError>;
