//! Code buffers and the scope stack for emitting Q#.
//!
//! Two kinds of buffer are live during a translation. The *outside* buffer
//! collects top-level operation definitions and is shared by every scope.
//! Each open scope (the entry operation, a gate body, a conditional body)
//! owns an *inside* buffer holding its instruction sequence.
//!
//! Fragments store a depth relative to their buffer; indentation is applied
//! once, when the final text is rendered, with a single fixed marker per
//! level.

use std::fmt;

use tracing::debug;

use crate::gates::GateSignature;

/// Default indent marker, one per nesting level.
pub const INDENT: &str = "    ";

/// One line of emitted text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fragment {
    depth: usize,
    text: String,
}

/// Append-only sequence of emitted lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBuffer {
    fragments: Vec<Fragment>,
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line at depth 0.
    pub fn push(&mut self, text: impl Into<String>) {
        self.push_at(0, text);
    }

    /// Append a line at the given relative depth.
    pub fn push_at(&mut self, depth: usize, text: impl Into<String>) {
        self.fragments.push(Fragment {
            depth,
            text: text.into(),
        });
    }

    /// Append an empty separator line.
    pub fn blank(&mut self) {
        self.push("");
    }

    /// Append all of `other`, shifted `levels` deeper.
    pub fn append_nested(&mut self, other: CodeBuffer, levels: usize) {
        self.fragments
            .extend(other.fragments.into_iter().map(|f| Fragment {
                depth: f.depth + levels,
                text: f.text,
            }));
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Lines without indentation.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().map(|f| f.text.as_str())
    }

    /// Render with `indent` repeated once per level, every line terminated
    /// by a newline. Empty lines carry no indentation.
    pub fn render(&self, indent: &str) -> String {
        let mut out = String::new();
        for fragment in &self.fragments {
            if !fragment.text.is_empty() {
                out.push_str(&indent.repeat(fragment.depth));
                out.push_str(&fragment.text);
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for CodeBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(INDENT))
    }
}

/// Wrap a body into an old-style Q# operation definition:
///
/// ```text
/// operation Name(q:Qubit):()
/// {
///     body
///     {
///         ...
///     }
/// }
/// ```
pub fn operation_definition(header: impl Into<String>, body: CodeBuffer) -> CodeBuffer {
    definition_with(header, body, &[])
}

/// Like [`operation_definition`], with generated `adjoint` and `controlled`
/// specializations so the operation can be called through
/// `(Controlled Op)` and `(Adjoint Op)`.
pub fn controllable_operation_definition(
    header: impl Into<String>,
    body: CodeBuffer,
) -> CodeBuffer {
    definition_with(
        header,
        body,
        &["adjoint auto", "controlled auto", "controlled adjoint auto"],
    )
}

fn definition_with(
    header: impl Into<String>,
    body: CodeBuffer,
    specializations: &[&str],
) -> CodeBuffer {
    let mut def = CodeBuffer::new();
    def.push(header);
    def.push("{");
    def.push_at(1, "body");
    def.push_at(1, "{");
    def.append_nested(body, 2);
    def.push_at(1, "}");
    for specialization in specializations {
        def.push_at(1, *specialization);
    }
    def.push("}");
    def
}

/// What kind of lexical scope an inside buffer belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    /// The synthesized entry operation.
    Root,
    /// The body of a gate definition.
    Gate(GateSignature),
    /// The single statement guarded by an `if`.
    Conditional,
}

#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    buffer: CodeBuffer,
}

/// The outside buffer plus a stack of inside buffers. The root scope is
/// always present and is never popped.
#[derive(Debug)]
pub struct ScopeStack {
    outside: CodeBuffer,
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            outside: CodeBuffer::new(),
            scopes: vec![Scope {
                kind: ScopeKind::Root,
                buffer: CodeBuffer::new(),
            }],
        }
    }

    /// Open a fresh inside buffer.
    pub fn push(&mut self, kind: ScopeKind) {
        debug!(depth = self.scopes.len(), ?kind, "open scope");
        self.scopes.push(Scope {
            kind,
            buffer: CodeBuffer::new(),
        });
    }

    /// Close the innermost scope and hand back its buffer. Returns `None`
    /// when only the root scope is left.
    pub fn pop(&mut self) -> Option<(ScopeKind, CodeBuffer)> {
        if self.scopes.len() == 1 {
            return None;
        }
        let scope = self.scopes.pop()?;
        debug!(depth = self.scopes.len(), lines = scope.buffer.len(), "close scope");
        Some((scope.kind, scope.buffer))
    }

    /// Inside buffer of the innermost scope.
    pub fn inside(&self) -> &CodeBuffer {
        &self.innermost().buffer
    }

    pub fn inside_mut(&mut self) -> &mut CodeBuffer {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last].buffer
    }

    pub fn outside(&self) -> &CodeBuffer {
        &self.outside
    }

    /// Add an operation definition to the outside buffer, separated from
    /// the previous one by a blank line.
    pub fn define(&mut self, definition: CodeBuffer) {
        if !self.outside.is_empty() {
            self.outside.blank();
        }
        self.outside.append_nested(definition, 0);
    }

    /// Kind of the innermost scope.
    pub fn current_kind(&self) -> &ScopeKind {
        &self.innermost().kind
    }

    /// Signature of the nearest enclosing gate definition, if any.
    pub fn gate_scope(&self) -> Option<&GateSignature> {
        self.scopes.iter().rev().find_map(|s| match &s.kind {
            ScopeKind::Gate(sig) => Some(sig),
            _ => None,
        })
    }

    /// Split into the outside buffer and the root inside buffer.
    pub fn into_parts(mut self) -> (CodeBuffer, CodeBuffer) {
        let root = self.scopes.swap_remove(0);
        (self.outside, root.buffer)
    }

    fn innermost(&self) -> &Scope {
        &self.scopes[self.scopes.len() - 1]
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl ScopeStack {
        fn depth(&self) -> usize {
            self.scopes.len()
        }
    }

    #[test]
    fn test_render_indents_per_level() {
        let mut buffer = CodeBuffer::new();
        buffer.push("a");
        buffer.push_at(2, "b");
        buffer.blank();
        buffer.push_at(1, "c");

        assert_eq!(buffer.render("  "), "a\n    b\n\n  c\n");
        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn test_append_nested_shifts_depth() {
        let mut inner = CodeBuffer::new();
        inner.push("X(q);");
        inner.push_at(1, "Y(q);");

        let mut outer = CodeBuffer::new();
        outer.push("{");
        outer.append_nested(inner, 1);
        outer.push("}");

        assert_eq!(outer.render("\t"), "{\n\tX(q);\n\t\tY(q);\n}\n");
    }

    #[test]
    fn test_operation_definition_layout() {
        let mut body = CodeBuffer::new();
        body.push("H(q);");
        let def = operation_definition("operation Mygate(q:Qubit):()", body);

        assert_eq!(
            def.to_string(),
            "operation Mygate(q:Qubit):()\n{\n    body\n    {\n        H(q);\n    }\n}\n"
        );
    }

    #[test]
    fn test_controllable_definition_layout() {
        let mut body = CodeBuffer::new();
        body.push("Rz(theta, q);");
        let def = controllable_operation_definition("operation Turn(theta:Double, q:Qubit):()", body);

        assert_eq!(
            def.to_string(),
            "operation Turn(theta:Double, q:Qubit):()\n{\n    body\n    {\n        Rz(theta, q);\n    }\n    adjoint auto\n    controlled auto\n    controlled adjoint auto\n}\n"
        );
    }

    #[test]
    fn test_scope_stack_push_pop() {
        let mut scopes = ScopeStack::new();
        scopes.inside_mut().push("root");

        scopes.push(ScopeKind::Conditional);
        assert_eq!(scopes.depth(), 2);
        assert!(scopes.inside().is_empty());
        scopes.inside_mut().push("nested");

        let (kind, buffer) = scopes.pop().unwrap();
        assert_eq!(kind, ScopeKind::Conditional);
        assert_eq!(buffer.lines().collect::<Vec<_>>(), vec!["nested"]);
        assert_eq!(scopes.inside().lines().collect::<Vec<_>>(), vec!["root"]);
    }

    #[test]
    fn test_root_is_never_popped() {
        let mut scopes = ScopeStack::new();
        assert!(scopes.pop().is_none());
        assert_eq!(scopes.depth(), 1);
        assert_eq!(scopes.current_kind(), &ScopeKind::Root);
    }

    #[test]
    fn test_gate_scope_visible_through_conditional() {
        let sig = GateSignature {
            name: "g".into(),
            params: vec![],
            qubits: vec!["a".into()],
            opaque: false,
        };
        let mut scopes = ScopeStack::new();
        assert!(scopes.gate_scope().is_none());

        scopes.push(ScopeKind::Gate(sig.clone()));
        scopes.push(ScopeKind::Conditional);
        assert_eq!(scopes.gate_scope(), Some(&sig));
    }

    #[test]
    fn test_define_separates_operations() {
        let mut scopes = ScopeStack::new();
        scopes.define(operation_definition("operation A():()", CodeBuffer::new()));
        scopes.define(operation_definition("operation B():()", CodeBuffer::new()));

        let (outside, root) = scopes.into_parts();
        assert!(root.is_empty());
        let lines: Vec<_> = outside.lines().collect();
        assert_eq!(lines[0], "operation A():()");
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "operation B():()");
    }
}
