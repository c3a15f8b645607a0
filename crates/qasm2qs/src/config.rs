//! Translator configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```yaml
//! indent: "\t"
//! include_paths: ["/opt/qasm/include"]
//! entry_operation: Teleport
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::emitter::INDENT;
use crate::error::{TranslateError, TranslateResult};

/// Options that shape the generated Q#.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Indent marker, repeated once per nesting level.
    pub indent: String,

    /// Comment block written above the namespace. Each line is emitted as is.
    pub header: String,

    /// Namespaces opened at the top of the generated namespace.
    pub opens: Vec<String>,

    /// Directories searched for `include` files after the including file's
    /// own directory.
    pub include_paths: Vec<PathBuf>,

    /// Name of the synthesized entry operation. Defaults to the source file
    /// stem (or `Main` for in-memory sources).
    pub entry_operation: Option<String>,

    /// Name of the `Result[]` returned by the entry operation.
    pub output_register: String,

    /// Emit `ResetAll` for every quantum register before it is released.
    pub reset_qubits: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            indent: INDENT.to_string(),
            header: "// Generated by qasm2qs from OpenQASM 2 source.\n\
                     // Changes will be lost when the file is regenerated."
                .to_string(),
            opens: vec![
                "Microsoft.Quantum.Primitive".into(),
                "Microsoft.Quantum.Canon".into(),
                "Microsoft.Quantum.Extensions.Math".into(),
            ],
            include_paths: Vec::new(),
            entry_operation: None,
            output_register: "_out".into(),
            reset_qubits: true,
        }
    }
}

impl TranslatorConfig {
    /// Parse a YAML document. `origin` names the document in errors.
    pub fn from_yaml_str(yaml: &str, origin: &str) -> TranslateResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml).map_err(|e| TranslateError::Config {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate(origin)?;
        Ok(config)
    }

    /// Load a YAML config file.
    pub fn from_file(path: impl AsRef<Path>) -> TranslateResult<Self> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let yaml = fs::read_to_string(path).map_err(|e| TranslateError::Config {
            path: label.clone(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&yaml, &label)
    }

    /// Set the entry operation name.
    #[must_use]
    pub fn with_entry_operation(mut self, name: impl Into<String>) -> Self {
        self.entry_operation = Some(name.into());
        self
    }

    /// Add an include search directory.
    #[must_use]
    pub fn with_include_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_paths.push(dir.into());
        self
    }

    /// Set the indent marker.
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    fn validate(&self, origin: &str) -> TranslateResult<()> {
        if let Some(name) = &self.entry_operation {
            if !is_identifier(name) {
                return Err(TranslateError::Config {
                    path: origin.to_string(),
                    message: format!("entry_operation '{name}' is not an identifier"),
                });
            }
        }
        if !is_identifier(&self.output_register) {
            return Err(TranslateError::Config {
                path: origin.to_string(),
                message: format!(
                    "output_register '{}' is not an identifier",
                    self.output_register
                ),
            });
        }
        if self.indent.chars().any(|c| !c.is_whitespace()) {
            return Err(TranslateError::Config {
                path: origin.to_string(),
                message: "indent must be whitespace".into(),
            });
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TranslatorConfig::default();
        assert_eq!(config.indent, INDENT);
        assert_eq!(config.output_register, "_out");
        assert!(config.reset_qubits);
        assert!(config.opens.iter().any(|o| o == "Microsoft.Quantum.Primitive"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = TranslatorConfig::from_yaml_str(
            "indent: \"\\t\"\nentry_operation: Teleport\ninclude_paths: [lib]\n",
            "test.yaml",
        )
        .unwrap();

        assert_eq!(config.indent, "\t");
        assert_eq!(config.entry_operation.as_deref(), Some("Teleport"));
        assert_eq!(config.include_paths, vec![PathBuf::from("lib")]);
        assert_eq!(config.output_register, "_out");
    }

    #[test]
    fn test_invalid_yaml() {
        let err = TranslatorConfig::from_yaml_str("indent: [", "bad.yaml").unwrap_err();
        assert!(matches!(err, TranslateError::Config { .. }));
        assert_eq!(err.path(), "bad.yaml");
    }

    #[test]
    fn test_rejects_bad_entry_name() {
        let err = TranslatorConfig::from_yaml_str("entry_operation: \"1st\"", "c.yaml").unwrap_err();
        assert!(err.to_string().contains("entry_operation"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qasm2qs.yaml");
        fs::write(&path, "reset_qubits: false\n").unwrap();

        let config = TranslatorConfig::from_file(&path).unwrap();
        assert!(!config.reset_qubits);

        let missing = TranslatorConfig::from_file(dir.path().join("missing.yaml"));
        assert!(missing.is_err());
    }

    #[test]
    fn test_builders() {
        let config = TranslatorConfig::default()
            .with_entry_operation("Bell")
            .with_include_path("inc")
            .with_indent("  ");
        assert_eq!(config.entry_operation.as_deref(), Some("Bell"));
        assert_eq!(config.include_paths.len(), 1);
        assert_eq!(config.indent, "  ");
    }
}
