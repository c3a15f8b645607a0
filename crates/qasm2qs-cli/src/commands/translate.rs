//! Translate command implementation.

use anyhow::{Context, Result};
use console::style;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use qasm2qs::{Translator, TranslatorConfig};

/// Options of the translate command.
#[derive(Debug, Default)]
pub struct TranslateOptions<'a> {
    pub input: &'a str,
    pub output: Option<&'a str>,
    pub namespace: Option<&'a str>,
    pub operation: Option<&'a str>,
    pub config: Option<&'a str>,
    pub include_paths: &'a [String],
}

/// Execute the translate command. Returns the path written.
pub fn execute(options: &TranslateOptions<'_>) -> Result<PathBuf> {
    let input = Path::new(options.input);
    println!(
        "{} Translating {}",
        style("→").cyan().bold(),
        style(input.display()).green()
    );

    if !input.exists() {
        anyhow::bail!("File not found: {}", input.display());
    }

    let config = load_config(options)?;
    let namespace = options
        .namespace
        .map_or_else(|| default_namespace(input), str::to_string);
    debug!(?config, namespace = namespace.as_str(), "translator configuration");

    let qsharp = Translator::new(config).translate_file(&namespace, input)?;

    let output = options
        .output
        .map_or_else(|| input.with_extension("qs"), PathBuf::from);
    fs::write(&output, qsharp)
        .with_context(|| format!("Failed to write file: {}", output.display()))?;

    println!("{} Translation complete", style("✓").green().bold());
    println!("  Namespace: {}", style(&namespace).yellow());
    println!("  Output:    {}", style(output.display()).green());

    Ok(output)
}

/// Config file values first, then command-line overrides.
fn load_config(options: &TranslateOptions<'_>) -> Result<TranslatorConfig> {
    let mut config = match options.config {
        Some(path) => TranslatorConfig::from_file(path)?,
        None => TranslatorConfig::default(),
    };
    if let Some(operation) = options.operation {
        config = config.with_entry_operation(operation);
    }
    for dir in options.include_paths {
        config = config.with_include_path(dir);
    }
    Ok(config)
}

/// `Quantum.<Stem>` for an input file `<stem>.qasm`.
fn default_namespace(input: &Path) -> String {
    let stem = input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>();

    let mut chars = stem.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            format!("Quantum.{}{}", first.to_ascii_uppercase(), chars.as_str())
        }
        _ => "Quantum.Program".to_string(),
    }
}
