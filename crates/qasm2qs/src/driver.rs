//! File-level driver: runs the parser over a whole source and assembles the
//! Q# compilation unit.

use std::fs;
use std::path::Path;

use tracing::{info, instrument, warn};

use crate::config::TranslatorConfig;
use crate::emitter::{CodeBuffer, operation_definition};
use crate::error::{TranslateError, TranslateResult};
use crate::gates::{capitalize, unique_name};
use crate::parser::{Cursor, ParsedProgram, Parser};

/// Path reported for in-memory sources.
const INLINE_SOURCE: &str = "<input>";

/// Entry operation name used when no better one is available.
const DEFAULT_ENTRY: &str = "Main";

/// Translates `OpenQASM` 2 programs into Q# namespaces.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    config: TranslatorConfig,
}

impl Translator {
    pub fn new(config: TranslatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translate the file at `path` into namespace `module_name`.
    ///
    /// The entry operation is named after the file stem unless the config
    /// names one.
    #[instrument(skip_all, fields(module = module_name, path = %path.as_ref().display()))]
    pub fn translate_file(
        &self,
        module_name: &str,
        path: impl AsRef<Path>,
    ) -> TranslateResult<String> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| TranslateError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let entry = path
            .file_stem()
            .map(|stem| entry_name(&stem.to_string_lossy()))
            .unwrap_or_else(|| DEFAULT_ENTRY.to_string());
        self.translate_source(module_name, &source, path, entry)
    }

    /// Translate an in-memory source. Includes resolve against the working
    /// directory and the configured include paths.
    pub fn translate_str(&self, module_name: &str, source: &str) -> TranslateResult<String> {
        self.translate_source(
            module_name,
            source,
            Path::new(INLINE_SOURCE),
            DEFAULT_ENTRY.to_string(),
        )
    }

    fn translate_source(
        &self,
        module_name: &str,
        source: &str,
        path: &Path,
        default_entry: String,
    ) -> TranslateResult<String> {
        info!("Translating {} into namespace {module_name}", path.display());

        let mut parser = Parser::new(&self.config);
        let mut cursor = Cursor::new(source, path);
        let statements = parser.parse_program(&mut cursor)?;
        let program = parser.finish();

        info!(
            "Parsed {statements} statements: {} qubits, {} bits, {} gates, {} measurements",
            program.symbols.num_qubits(),
            program.symbols.num_clbits(),
            program.gates,
            program.measured.len()
        );

        let requested = self.config.entry_operation.clone().unwrap_or(default_entry);
        let entry = unique_name(&requested, &program.operations);
        if entry != requested {
            warn!(
                requested = requested.as_str(),
                entry = entry.as_str(),
                "entry operation name is taken by a gate; renamed"
            );
        }
        let unit = self.compilation_unit(module_name, &entry, program);
        Ok(unit.render(&self.config.indent))
    }

    /// Header, namespace, opens, operation definitions and the entry
    /// operation.
    fn compilation_unit(
        &self,
        module_name: &str,
        entry: &str,
        program: ParsedProgram,
    ) -> CodeBuffer {
        let mut unit = CodeBuffer::new();
        if !self.config.header.is_empty() {
            for line in self.config.header.lines() {
                unit.push(line);
            }
            unit.blank();
        }

        unit.push(format!("namespace {module_name}"));
        unit.push("{");
        for open in &self.config.opens {
            unit.push_at(1, format!("open {open};"));
        }
        if !self.config.opens.is_empty() {
            unit.blank();
        }

        let entry_operation = self.entry_operation(entry, &program);
        if !program.outside.is_empty() {
            unit.append_nested(program.outside, 1);
            unit.blank();
        }
        unit.append_nested(entry_operation, 1);
        unit.push("}");
        unit
    }

    /// The synthesized operation holding the program's top-level
    /// instructions: classical registers as mutable `Result` arrays, one
    /// nested `using` block per quantum register, and the measured
    /// locations returned in measurement order.
    fn entry_operation(&self, name: &str, program: &ParsedProgram) -> CodeBuffer {
        let out = &self.config.output_register;
        let measured = &program.measured;
        let quantum: Vec<_> = program.symbols.quantum.iter().collect();

        let mut body = CodeBuffer::new();
        if !measured.is_empty() {
            body.push(format!("mutable {out} = new Result[{}];", measured.len()));
        }
        for creg in program.symbols.classical.iter() {
            body.push(format!("mutable {} = new Result[{}];", creg.binding, creg.size));
        }

        for (depth, qreg) in quantum.iter().enumerate() {
            body.push_at(depth, format!("using({} = Qubit[{}])", qreg.binding, qreg.size));
            body.push_at(depth, "{");
        }

        let depth = quantum.len();
        body.append_nested(program.root.clone(), depth);
        for (k, target) in measured.iter().enumerate() {
            body.push_at(depth, format!("set {out}[{k}] = {target};"));
        }

        for (depth, qreg) in quantum.iter().enumerate().rev() {
            if self.config.reset_qubits {
                body.push_at(depth + 1, format!("ResetAll({});", qreg.binding));
            }
            body.push_at(depth, "}");
        }

        let result = if measured.is_empty() {
            "()"
        } else {
            body.push(format!("return {out};"));
            "(Result[])"
        };
        operation_definition(format!("operation {name}():{result}"), body)
    }
}

/// Translate the `OpenQASM` 2 file at `source_path` into a Q# namespace
/// named `module_name`, with the default configuration.
pub fn translate(module_name: &str, source_path: impl AsRef<Path>) -> TranslateResult<String> {
    Translator::default().translate_file(module_name, source_path)
}

/// Turn a file stem into an operation name: characters that cannot appear
/// in an identifier become `_`, and the first letter is upper-cased.
fn entry_name(stem: &str) -> String {
    let mut name: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if name.is_empty() {
        return DEFAULT_ENTRY.to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    capitalize(&name)
}
