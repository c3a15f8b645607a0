//! Statement parsing.
//!
//! Each routine enters with the cursor on the statement's leading token and
//! returns with it on the terminator.

use std::fs;
use std::path::PathBuf;

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use super::arguments::{broadcast, parse_argument, parse_arguments};
use super::expression::parse_expression_list;
use super::{Cursor, Operand, Parser, Terminator, source_key};
use crate::emitter::{ScopeKind, operation_definition};
use crate::error::{TranslateError, TranslateResult};
use crate::gates::GateSignature;
use crate::lexer::Token;

/// The library every `OpenQASM` 2 program includes. Its gates are served by
/// the gate table.
const STANDARD_LIBRARY: &str = "qelib1.inc";

impl Parser<'_> {
    /// `OPENQASM 2.0;`
    pub(super) fn parse_version(&mut self, cursor: &mut Cursor<'_>) -> TranslateResult<Terminator> {
        let version = cursor.bump("version number")?;
        if !matches!(version.token, Token::RealLiteral | Token::IntLiteral) {
            return Err(cursor.unexpected("version number"));
        }
        let major = version.text.split('.').next().unwrap_or_default();
        if major != "2" {
            return Err(TranslateError::MalformedDeclaration {
                path: cursor.label(),
                line: version.line,
                message: format!("unsupported OPENQASM version {}", version.text),
            });
        }
        cursor.expect(Token::Semicolon)?;
        Ok(Terminator::Semicolon)
    }

    /// `qreg name[size];` or `creg name[size];`
    pub(super) fn parse_register(
        &mut self,
        cursor: &mut Cursor<'_>,
        quantum: bool,
    ) -> TranslateResult<Terminator> {
        let name = cursor.expect(Token::Identifier)?;
        cursor.expect(Token::LBracket)?;
        let size = cursor.expect_integer("register size")?;
        if size == 0 {
            return Err(TranslateError::MalformedDeclaration {
                path: cursor.label(),
                line: name.line,
                message: format!("register '{}' must have at least one element", name.text),
            });
        }
        cursor.expect(Token::RBracket)?;
        cursor.expect(Token::Semicolon)?;

        let declared = if quantum {
            self.symbols.declare_quantum(name.text, size)
        } else {
            self.symbols.declare_classical(name.text, size)
        };
        if !declared {
            return Err(TranslateError::DuplicateDeclaration {
                path: cursor.label(),
                line: name.line,
                name: name.text.to_string(),
            });
        }

        debug!(name = name.text, size, quantum, "declared register");
        Ok(Terminator::Semicolon)
    }

    /// `gate name(params) qubits { body }`
    pub(super) fn parse_gate_definition(
        &mut self,
        cursor: &mut Cursor<'_>,
    ) -> TranslateResult<Terminator> {
        let (signature, operation) = self.parse_signature(cursor, false)?;
        cursor.require(Token::LBrace)?;

        self.scopes.push(ScopeKind::Gate(signature.clone()));
        loop {
            cursor.bump("`}`")?;
            if cursor.check(Token::RBrace) {
                break;
            }
            self.parse_statement(cursor)?;
        }
        let Some((_, body)) = self.scopes.pop() else {
            unreachable!("gate scope was pushed above");
        };

        self.scopes.define(operation_definition(signature.header(&operation), body));
        Ok(Terminator::Brace)
    }

    /// `opaque name(params) qubits;`
    pub(super) fn parse_opaque(&mut self, cursor: &mut Cursor<'_>) -> TranslateResult<Terminator> {
        let (signature, _) = self.parse_signature(cursor, true)?;
        cursor.require(Token::Semicolon)?;
        warn!(
            gate = signature.name.as_str(),
            "opaque gate has no body; calls are emitted by name"
        );
        Ok(Terminator::Semicolon)
    }

    /// `if (creg op int) statement`
    pub(super) fn parse_conditional(
        &mut self,
        cursor: &mut Cursor<'_>,
    ) -> TranslateResult<Terminator> {
        cursor.expect(Token::LParen)?;
        cursor.bump("classical register")?;
        let register = parse_argument(cursor)?;
        if register.index.is_some() {
            return Err(TranslateError::UnexpectedToken {
                path: cursor.label(),
                line: register.line,
                expected: "classical register name".into(),
                found: register.to_string(),
            });
        }
        let binding = match self.resolve_bit(cursor, &register)? {
            Operand::Register { name, .. } => name,
            Operand::Element(text) => text,
        };

        let op = cursor.require_any("comparison operator")?;
        if !op.token.is_comparison() {
            return Err(cursor.unexpected("comparison operator"));
        }
        let value = cursor.expect(Token::IntLiteral)?;
        cursor.expect(Token::RParen)?;
        cursor.bump("statement")?;

        self.scopes.push(ScopeKind::Conditional);
        let terminator = self.parse_statement(cursor)?;
        let Some((_, body)) = self.scopes.pop() else {
            unreachable!("conditional scope was pushed above");
        };

        let inside = self.scopes.inside_mut();
        inside.push(format!("if({binding}{}{}){{", op.text, value.text));
        inside.append_nested(body, 1);
        inside.push("}");
        Ok(terminator)
    }

    /// `measure qarg -> carg;`
    pub(super) fn parse_measurement(
        &mut self,
        cursor: &mut Cursor<'_>,
    ) -> TranslateResult<Terminator> {
        let line = cursor.line();
        cursor.bump("qubit argument")?;
        let qubit = parse_argument(cursor)?;
        cursor.require(Token::Arrow)?;
        cursor.bump("classical argument")?;
        let bit = parse_argument(cursor)?;
        cursor.require(Token::Semicolon)?;

        let operands = [
            self.resolve_qubit(cursor, &qubit)?,
            self.resolve_bit(cursor, &bit)?,
        ];
        if qubit.index.is_some() != bit.index.is_some() {
            return Err(TranslateError::RegisterSizeMismatch {
                path: cursor.label(),
                line,
                message: format!(
                    "'{qubit} -> {bit}' must measure a register into a register or a qubit into a bit"
                ),
            });
        }
        for row in broadcast(cursor, line, &operands)? {
            let (q, c) = (&row[0], &row[1]);
            self.scopes.inside_mut().push(format!("set {c} = M({q});"));
            self.measured.push(c.clone());
        }
        Ok(Terminator::Semicolon)
    }

    /// `name(params) args;`
    pub(super) fn parse_gate_application(
        &mut self,
        cursor: &mut Cursor<'_>,
    ) -> TranslateResult<Terminator> {
        let name = cursor.require(Token::Identifier)?;
        cursor.bump("gate arguments")?;

        let params = if cursor.check(Token::LParen) {
            parse_expression_list(cursor, &self.expression_params())?
        } else {
            Vec::new()
        };
        let args = parse_arguments(cursor)?;
        cursor.require(Token::Semicolon)?;

        let mut target = self.gates.resolve(name.text);
        if let Some((num_params, num_qubits)) = target.arity {
            if params.len() != num_params {
                return Err(TranslateError::WrongParameterCount {
                    path: cursor.label(),
                    line: name.line,
                    gate: name.text.to_string(),
                    expected: num_params,
                    got: params.len(),
                });
            }
            if args.len() != num_qubits {
                return Err(TranslateError::WrongQubitCount {
                    path: cursor.label(),
                    line: name.line,
                    gate: name.text.to_string(),
                    expected: num_qubits,
                    got: args.len(),
                });
            }
        }

        let mut operands = Vec::with_capacity(args.len());
        for arg in &args {
            operands.push(self.resolve_qubit(cursor, arg)?);
        }
        let rows = broadcast(cursor, name.line, &operands)?;

        for definition in self.gates.claim_helpers(&mut target) {
            debug!(gate = name.text, "emitting helper operation");
            self.scopes.define(definition);
        }

        let params: Vec<String> = params.iter().map(ToString::to_string).collect();
        for row in rows {
            self.scopes.inside_mut().push(target.render(&params, &row));
        }
        Ok(Terminator::Semicolon)
    }

    /// `include "file";`
    pub(super) fn parse_include(&mut self, cursor: &mut Cursor<'_>) -> TranslateResult<Terminator> {
        let literal = cursor.expect(Token::StringLiteral)?;
        cursor.expect(Token::Semicolon)?;
        let file = literal.text.trim_matches('"');

        if file == STANDARD_LIBRARY {
            debug!(file, "standard library include satisfied by the gate table");
            return Ok(Terminator::Semicolon);
        }

        let include_error = |message: String| TranslateError::Include {
            path: cursor.label(),
            line: literal.line,
            file: file.to_string(),
            message,
        };

        let resolved = self
            .include_candidates(cursor, file)
            .into_iter()
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| include_error("file not found".into()))?;

        if self.include_stack.contains(&source_key(&resolved)) {
            return Err(include_error("include cycle".into()));
        }

        let source = fs::read_to_string(&resolved).map_err(|e| include_error(e.to_string()))?;
        debug!(file = %resolved.display(), "including");

        let mut nested = Cursor::new(&source, resolved);
        self.parse_program(&mut nested)?;
        Ok(Terminator::Semicolon)
    }

    /// `reset arg;`
    pub(super) fn parse_reset(&mut self, cursor: &mut Cursor<'_>) -> TranslateResult<Terminator> {
        let line = cursor.line();
        cursor.bump("qubit argument")?;
        let arg = parse_argument(cursor)?;
        cursor.require(Token::Semicolon)?;

        let operand = self.resolve_qubit(cursor, &arg)?;
        for row in broadcast(cursor, line, &[operand])? {
            self.scopes.inside_mut().push(format!("Reset({});", row[0]));
        }
        Ok(Terminator::Semicolon)
    }

    /// `barrier args;` is checked and dropped.
    pub(super) fn parse_barrier(&mut self, cursor: &mut Cursor<'_>) -> TranslateResult<Terminator> {
        let line = cursor.line();
        cursor.bump("barrier arguments")?;
        let args = parse_arguments(cursor)?;
        cursor.require(Token::Semicolon)?;

        for arg in &args {
            self.resolve_qubit(cursor, arg)?;
        }
        warn!(line, "barrier has no Q# counterpart and is dropped");
        Ok(Terminator::Semicolon)
    }

    /// Parse `name (params)? qubits` of a gate or opaque declaration and
    /// record it, returning the signature and its Q# operation name. Exits
    /// on the token after the last qubit parameter.
    fn parse_signature(
        &mut self,
        cursor: &mut Cursor<'_>,
        opaque: bool,
    ) -> TranslateResult<(GateSignature, String)> {
        let name = cursor.expect(Token::Identifier)?;
        cursor.bump("gate parameters")?;

        let mut params = Vec::new();
        if cursor.check(Token::LParen) {
            cursor.bump("parameter name or `)`")?;
            if !cursor.check(Token::RParen) {
                params = parse_names(cursor, "parameter name")?;
                cursor.require(Token::RParen)?;
            }
            cursor.bump("qubit parameter")?;
        }
        let qubits = parse_names(cursor, "qubit parameter")?;

        if let Some(dup) = first_duplicate(params.iter().chain(&qubits)) {
            return Err(TranslateError::DuplicateDeclaration {
                path: cursor.label(),
                line: name.line,
                name: dup.to_string(),
            });
        }

        let signature = GateSignature {
            name: name.text.to_string(),
            params,
            qubits,
            opaque,
        };
        let Some(operation) = self.gates.declare(signature.clone()) else {
            return Err(TranslateError::DuplicateDeclaration {
                path: cursor.label(),
                line: name.line,
                name: signature.name,
            });
        };
        debug!(
            gate = signature.name.as_str(),
            operation = operation.as_str(),
            params = signature.params.len(),
            qubits = signature.qubits.len(),
            "declared gate"
        );
        Ok((signature, operation))
    }

    /// Where an include may live: next to the including file, then the
    /// configured include paths, in order.
    fn include_candidates(&self, cursor: &Cursor<'_>, file: &str) -> Vec<PathBuf> {
        let local = cursor
            .path()
            .parent()
            .map_or_else(|| PathBuf::from(file), |dir| dir.join(file));
        std::iter::once(local)
            .chain(self.config.include_paths.iter().map(|dir| dir.join(file)))
            .collect()
    }
}

/// Parse `name (, name)*`. Enters on the first name, exits after the last.
fn parse_names(cursor: &mut Cursor<'_>, what: &str) -> TranslateResult<Vec<String>> {
    let mut names = Vec::new();
    loop {
        let name = cursor
            .require(Token::Identifier)
            .map_err(|_| cursor.unexpected(what))?;
        names.push(name.text.to_string());
        cursor.bump("`,` or `{`")?;
        if !cursor.check(Token::Comma) {
            return Ok(names);
        }
        cursor.bump(what)?;
    }
}

fn first_duplicate<'a>(names: impl Iterator<Item = &'a String>) -> Option<&'a String> {
    let mut seen = FxHashSet::default();
    names.into_iter().find(|name| !seen.insert(name.as_str()))
}
