//! Statement parser for `OpenQASM` 2.
//!
//! Parsing and emission happen in one pass: each statement is translated as
//! soon as it is recognized, writing into the scope stack of the
//! [`Parser`]. The cursor is passed explicitly so that nested constructs
//! (gate bodies, conditionals, included files) share a single position.

mod arguments;
mod cursor;
mod expression;
mod statement;

pub use arguments::{Argument, Operand};
pub use cursor::Cursor;

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::config::TranslatorConfig;
use crate::emitter::{CodeBuffer, ScopeKind, ScopeStack};
use crate::error::{TranslateError, TranslateResult};
use crate::gates::GateRegistry;
use crate::lexer::Token;
use crate::symbols::{Register, SymbolTables};

/// The token a statement routine leaves the cursor on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// `;` of a simple statement.
    Semicolon,
    /// `}` closing a gate body.
    Brace,
}

/// The statement forms, keyed by their leading token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Version,
    QuantumRegister,
    ClassicalRegister,
    GateDefinition,
    Conditional,
    Measurement,
    GateApplication,
    Include,
    Opaque,
    Reset,
    Barrier,
}

impl StatementKind {
    /// Classify a leading token.
    pub fn classify(token: Token) -> Option<Self> {
        let kind = match token {
            Token::OpenQasm => Self::Version,
            Token::QReg => Self::QuantumRegister,
            Token::CReg => Self::ClassicalRegister,
            Token::Gate => Self::GateDefinition,
            Token::If => Self::Conditional,
            Token::Measure => Self::Measurement,
            Token::Identifier => Self::GateApplication,
            Token::Include => Self::Include,
            Token::Opaque => Self::Opaque,
            Token::Reset => Self::Reset,
            Token::Barrier => Self::Barrier,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether this statement may appear in a scope of the given kind, and
    /// if not, what was expected there instead.
    fn check_scope(self, scope: &ScopeKind) -> Result<(), &'static str> {
        match scope {
            ScopeKind::Root => Ok(()),
            ScopeKind::Gate(_) => match self {
                Self::GateApplication | Self::Barrier => Ok(()),
                _ => Err("gate application or `barrier` inside a gate body"),
            },
            ScopeKind::Conditional => match self {
                Self::GateApplication | Self::Measurement | Self::Reset | Self::Barrier => Ok(()),
                _ => Err("quantum operation after `if`"),
            },
        }
    }
}

/// Translation state shared by every level of statement recursion: the
/// register tables, the scope stack of code buffers, the measured targets
/// and the known gates.
pub struct Parser<'cfg> {
    config: &'cfg TranslatorConfig,
    symbols: SymbolTables,
    scopes: ScopeStack,
    measured: Vec<String>,
    gates: GateRegistry,
    include_stack: Vec<PathBuf>,
}

impl<'cfg> Parser<'cfg> {
    pub fn new(config: &'cfg TranslatorConfig) -> Self {
        Self {
            config,
            symbols: SymbolTables::new(),
            scopes: ScopeStack::new(),
            measured: Vec::new(),
            gates: GateRegistry::new(),
            include_stack: Vec::new(),
        }
    }

    /// Start from pre-populated register tables.
    #[must_use]
    pub fn with_symbols(mut self, symbols: SymbolTables) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn symbols(&self) -> &SymbolTables {
        &self.symbols
    }

    /// Classical locations written by measurements, in program order.
    pub fn measured(&self) -> &[String] {
        &self.measured
    }

    pub fn gates(&self) -> &GateRegistry {
        &self.gates
    }

    /// Inside buffer of the innermost open scope.
    pub fn inside(&self) -> &CodeBuffer {
        self.scopes.inside()
    }

    pub fn outside(&self) -> &CodeBuffer {
        self.scopes.outside()
    }

    /// Parse statements until the cursor runs out of tokens. Returns the
    /// number of statements parsed.
    pub fn parse_program(&mut self, cursor: &mut Cursor<'_>) -> TranslateResult<usize> {
        self.include_stack.push(source_key(cursor.path()));
        let result = self.parse_statements(cursor);
        self.include_stack.pop();
        result
    }

    fn parse_statements(&mut self, cursor: &mut Cursor<'_>) -> TranslateResult<usize> {
        let mut count = 0;
        while cursor.advance()? {
            self.parse_statement(cursor)?;
            count += 1;
        }
        Ok(count)
    }

    /// Parse and translate one statement.
    ///
    /// Enters with the cursor on the statement's leading token; returns with
    /// it on the terminator, which is reported in the result.
    pub fn parse_statement(&mut self, cursor: &mut Cursor<'_>) -> TranslateResult<Terminator> {
        let lead = cursor.require_any("statement")?;
        let kind =
            StatementKind::classify(lead.token).ok_or_else(|| cursor.unexpected("statement"))?;
        kind.check_scope(self.scopes.current_kind())
            .map_err(|expected| cursor.unexpected(expected))?;

        debug!(?kind, line = lead.line, "statement");

        match kind {
            StatementKind::Version => self.parse_version(cursor),
            StatementKind::QuantumRegister => self.parse_register(cursor, true),
            StatementKind::ClassicalRegister => self.parse_register(cursor, false),
            StatementKind::GateDefinition => self.parse_gate_definition(cursor),
            StatementKind::Conditional => self.parse_conditional(cursor),
            StatementKind::Measurement => self.parse_measurement(cursor),
            StatementKind::GateApplication => self.parse_gate_application(cursor),
            StatementKind::Include => self.parse_include(cursor),
            StatementKind::Opaque => self.parse_opaque(cursor),
            StatementKind::Reset => self.parse_reset(cursor),
            StatementKind::Barrier => self.parse_barrier(cursor),
        }
    }

    /// Consume the parser, returning everything the driver needs to
    /// assemble the compilation unit.
    pub fn finish(self) -> ParsedProgram {
        let (outside, root) = self.scopes.into_parts();
        ParsedProgram {
            symbols: self.symbols,
            outside,
            root,
            measured: self.measured,
            gates: self.gates.len(),
            operations: self.gates.operation_names().clone(),
        }
    }

    /// Resolve a quantum argument against the enclosing gate's qubit
    /// parameters, or the quantum register table at top level.
    fn resolve_qubit(&self, cursor: &Cursor<'_>, arg: &Argument<'_>) -> TranslateResult<Operand> {
        if let Some(gate) = self.scopes.gate_scope() {
            if !gate.qubits.iter().any(|q| q == arg.name) {
                return Err(undeclared(cursor, arg));
            }
            if arg.index.is_some() {
                return Err(TranslateError::UnexpectedToken {
                    path: cursor.label(),
                    line: arg.line,
                    expected: format!("qubit parameter of gate '{}'", gate.name),
                    found: arg.to_string(),
                });
            }
            return Ok(Operand::Element(arg.name.to_string()));
        }

        let register = self
            .symbols
            .quantum
            .get(arg.name)
            .ok_or_else(|| undeclared(cursor, arg))?;
        Ok(resolve_in_register(arg, register))
    }

    /// Resolve a classical argument against the classical register table.
    fn resolve_bit(&self, cursor: &Cursor<'_>, arg: &Argument<'_>) -> TranslateResult<Operand> {
        if self.scopes.gate_scope().is_some() {
            return Err(undeclared(cursor, arg));
        }
        let register = self
            .symbols
            .classical
            .get(arg.name)
            .ok_or_else(|| undeclared(cursor, arg))?;
        Ok(resolve_in_register(arg, register))
    }

    /// Names usable in parameter expressions at the current position.
    fn expression_params(&self) -> Vec<String> {
        self.scopes
            .gate_scope()
            .map(|g| g.params.clone())
            .unwrap_or_default()
    }
}

/// Identity of a source file for include cycle detection.
fn source_key(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Render an argument under the register's Q# binding.
fn resolve_in_register(arg: &Argument<'_>, register: &Register) -> Operand {
    match arg.index {
        Some(i) => Operand::Element(format!("{}[{i}]", register.binding)),
        None => Operand::Register {
            name: register.binding.clone(),
            size: register.size,
        },
    }
}

fn undeclared(cursor: &Cursor<'_>, arg: &Argument<'_>) -> TranslateError {
    TranslateError::UndeclaredRegister {
        path: cursor.label(),
        line: arg.line,
        name: arg.name.to_string(),
    }
}

/// Result of parsing a whole program.
#[derive(Debug)]
pub struct ParsedProgram {
    pub symbols: SymbolTables,
    /// Top-level operation definitions.
    pub outside: CodeBuffer,
    /// Instruction sequence of the entry operation.
    pub root: CodeBuffer,
    pub measured: Vec<String>,
    /// Number of user gate declarations.
    pub gates: usize,
    /// Q# operation names taken by gate definitions and helpers.
    pub operations: FxHashSet<String>,
}
