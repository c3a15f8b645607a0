//! End-to-end translation of sample programs.

use std::fs;
use std::path::{Path, PathBuf};

use qasm2qs::{TranslateError, Translator, TranslatorConfig, translate};

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Collapse every run of whitespace so layouts compare by content.
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn assert_translates(sample: &str, module: &str) {
    let output = translate(module, data(&format!("{sample}.qasm"))).unwrap();
    let expected = fs::read_to_string(data(&format!("{sample}.qs"))).unwrap();
    assert_eq!(normalize(&output), normalize(&expected));
}

#[test]
fn test_hadamard() {
    assert_translates("hadamard", "Quantum.Hadamard");
}

#[test]
fn test_cnot() {
    assert_translates("cnot", "Quantum.Cnot");
}

#[test]
fn test_gate_library() {
    assert_translates("gates", "Quantum.Gates");
}

#[test]
fn test_file_and_string_agree_apart_from_entry_name() {
    let path = data("cnot.qasm");
    let source = fs::read_to_string(&path).unwrap();
    let config = TranslatorConfig::default().with_entry_operation("Cnot");
    let translator = Translator::new(config);

    assert_eq!(
        translator.translate_file("Quantum.Cnot", &path).unwrap(),
        translator.translate_str("Quantum.Cnot", &source).unwrap()
    );
}

#[test]
fn test_custom_indent_and_opens() {
    let config = TranslatorConfig {
        opens: vec!["Microsoft.Quantum.Intrinsic".into()],
        header: "// custom".into(),
        ..TranslatorConfig::default()
    }
    .with_indent("\t");

    let output = Translator::new(config)
        .translate_str("Q", "qreg q[1]; h q[0];")
        .unwrap();

    assert!(output.starts_with("// custom\n\nnamespace Q\n{\n\topen Microsoft.Quantum.Intrinsic;\n"));
    assert!(output.contains("\n\t\t\t\tH(q[0]);\n"));
}

#[test]
fn test_undeclared_register_names_source_and_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.qasm");
    fs::write(&path, "OPENQASM 2.0;\nqreg q[2];\nh r[0];\n").unwrap();

    let err = translate("Broken", &path).unwrap_err();

    assert!(matches!(err, TranslateError::UndeclaredRegister { ref name, .. } if name == "r"));
    assert_eq!(err.line(), Some(3));
    let message = err.to_string();
    assert!(message.contains("broken.qasm:3"), "{message}");
}

#[test]
fn test_lexical_error() {
    let err = Translator::default()
        .translate_str("L", "qreg q[1];\nh q[0] @;\n")
        .unwrap_err();
    assert!(matches!(err, TranslateError::Lexical { line: 2, .. }));
    assert_eq!(err.path(), "<input>");
}

#[test]
fn test_unterminated_statement() {
    let err = Translator::default()
        .translate_str("E", "qreg q[1];\nh q[0]")
        .unwrap_err();
    assert!(matches!(err, TranslateError::UnexpectedEof { .. }));
}

#[test]
fn test_include_next_to_source() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("bell.inc"),
        "OPENQASM 2.0;\ngate bell a, b { h a; cx a, b; }\n",
    )
    .unwrap();
    let path = dir.path().join("pair.qasm");
    fs::write(
        &path,
        "OPENQASM 2.0;\ninclude \"qelib1.inc\";\ninclude \"bell.inc\";\nqreg q[2];\nbell q[0], q[1];\n",
    )
    .unwrap();

    let output = translate("Pair", &path).unwrap();

    assert!(output.contains("operation Bell(a:Qubit, b:Qubit):()"));
    assert!(output.contains("Bell(q[0], q[1]);"));
    assert!(output.contains("operation Pair():()"));
}

#[test]
fn test_missing_include() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("main.qasm");
    fs::write(&path, "include \"nowhere.inc\";\n").unwrap();

    let err = translate("Main", &path).unwrap_err();
    assert!(matches!(err, TranslateError::Include { ref file, line: 1, .. } if file == "nowhere.inc"));
}

#[test]
fn test_config_file_drives_translation() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("qasm2qs.yaml");
    fs::write(
        &config_path,
        "entry_operation: Run\noutput_register: results\nreset_qubits: false\n",
    )
    .unwrap();

    let config = TranslatorConfig::from_file(&config_path).unwrap();
    let output = Translator::new(config)
        .translate_str("C", "qreg q[1]; creg c[1]; measure q -> c;")
        .unwrap();

    assert!(output.contains("operation Run():(Result[])"));
    assert!(output.contains("mutable results = new Result[1];"));
    assert!(output.contains("set results[0] = c[0];"));
    assert!(!output.contains("ResetAll"));
}

#[test]
fn test_register_name_shared_by_both_namespaces() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.qasm");
    fs::write(
        &path,
        "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg r[2];\ncreg r[2];\nh r;\nmeasure r -> r;\n",
    )
    .unwrap();

    let output = translate("Quantum.Shared", &path).unwrap();

    let expected = "mutable _out = new Result[2]; \
                    mutable r_c = new Result[2]; \
                    using(r = Qubit[2]) { \
                    H(r[0]); H(r[1]); \
                    set r_c[0] = M(r[0]); set r_c[1] = M(r[1]); \
                    set _out[0] = r_c[0]; set _out[1] = r_c[1]; \
                    ResetAll(r); }";
    assert!(normalize(&output).contains(expected), "{output}");
}

#[test]
fn test_gate_named_after_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flip.qasm");
    fs::write(&path, "qreg q[1];\ngate flip a { x a; }\nflip q[0];\n").unwrap();

    let output = translate("Quantum.Flip", &path).unwrap();

    assert_eq!(output.matches("operation Flip(").count(), 1);
    assert!(output.contains("operation Flip_1():()"));
}
