//! Gate table: maps `OpenQASM` gate names onto Q# callables.
//!
//! Standard `qelib1.inc` gates map onto Q# intrinsics where one exists.
//! `U`/`u3`/`u2` have no intrinsic and are served by helper operations that
//! the translator synthesizes on first use. Any other name is a user gate and
//! is called by its capitalized name.
//!
//! User gates and helpers share one set of Q# operation names. A name that is
//! already taken gets the first free `_N` suffix.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::emitter::{CodeBuffer, controllable_operation_definition};

/// Standard gates with a fixed Q# rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardGate {
    I,
    X,
    Y,
    Z,
    H,
    S,
    Sdg,
    T,
    Tdg,
    Rx,
    Ry,
    Rz,
    U1,
    U2,
    U3,
    CX,
    CY,
    CZ,
    CH,
    CRz,
    CU1,
    CU3,
    Swap,
    CCX,
}

impl StandardGate {
    /// Look up a gate by its `OpenQASM` name.
    pub fn from_qasm(name: &str) -> Option<Self> {
        let gate = match name {
            "id" => Self::I,
            "x" => Self::X,
            "y" => Self::Y,
            "z" => Self::Z,
            "h" => Self::H,
            "s" => Self::S,
            "sdg" => Self::Sdg,
            "t" => Self::T,
            "tdg" => Self::Tdg,
            "rx" => Self::Rx,
            "ry" => Self::Ry,
            "rz" => Self::Rz,
            "u1" => Self::U1,
            "u2" => Self::U2,
            "U" | "u3" => Self::U3,
            "CX" | "cx" => Self::CX,
            "cy" => Self::CY,
            "cz" => Self::CZ,
            "ch" => Self::CH,
            "crz" => Self::CRz,
            "cu1" => Self::CU1,
            "cu3" => Self::CU3,
            "swap" => Self::Swap,
            "ccx" => Self::CCX,
            _ => return None,
        };
        Some(gate)
    }

    /// Number of classical (angle) parameters.
    pub fn num_params(self) -> usize {
        match self {
            Self::Rx | Self::Ry | Self::Rz | Self::U1 | Self::CRz | Self::CU1 => 1,
            Self::U2 => 2,
            Self::U3 | Self::CU3 => 3,
            _ => 0,
        }
    }

    /// Number of qubit arguments.
    pub fn num_qubits(self) -> usize {
        match self {
            Self::CX
            | Self::CY
            | Self::CZ
            | Self::CH
            | Self::CRz
            | Self::CU1
            | Self::CU3
            | Self::Swap => 2,
            Self::CCX => 3,
            _ => 1,
        }
    }

    /// The Q# callable, without any `Controlled` functor.
    pub fn callee(self) -> &'static str {
        match self {
            Self::I => "I",
            Self::X => "X",
            Self::Y | Self::CY => "Y",
            Self::Z | Self::CZ => "Z",
            Self::H | Self::CH => "H",
            Self::S => "S",
            Self::Sdg => "(Adjoint S)",
            Self::T => "T",
            Self::Tdg => "(Adjoint T)",
            Self::Rx => "Rx",
            Self::Ry => "Ry",
            Self::Rz | Self::CRz => "Rz",
            Self::U1 | Self::CU1 => "R1",
            Self::U2 => "U2",
            Self::U3 | Self::CU3 => "U3",
            Self::CX => "CNOT",
            Self::Swap => "SWAP",
            Self::CCX => "CCNOT",
        }
    }

    /// Number of leading qubits passed as the control array of a
    /// `Controlled` call.
    pub fn controls(self) -> usize {
        match self {
            Self::CY | Self::CZ | Self::CH | Self::CRz | Self::CU1 | Self::CU3 => 1,
            _ => 0,
        }
    }

    /// Helper operations this gate depends on, in definition order.
    pub fn helpers(self) -> &'static [Helper] {
        match self {
            Self::U3 | Self::CU3 => &[Helper::U3],
            Self::U2 => &[Helper::U3, Helper::U2],
            _ => &[],
        }
    }
}

/// Operations synthesized for standard gates without a Q# intrinsic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Helper {
    /// `U(theta, phi, lambda) = Rz(phi) Ry(theta) Rz(lambda)` up to global phase.
    U3,
    /// `u2(phi, lambda) = U(pi/2, phi, lambda)`.
    U2,
}

impl Helper {
    /// Name the helper is emitted under unless a user gate already took it.
    pub fn operation_name(self) -> &'static str {
        match self {
            Self::U3 => "U3",
            Self::U2 => "U2",
        }
    }

    /// Definition emitted under `name`. `u3` is the operation the `U3`
    /// helper was emitted under.
    pub fn definition(self, name: &str, u3: &str) -> CodeBuffer {
        let mut body = CodeBuffer::new();
        let header = match self {
            Self::U3 => {
                body.push("Rz(lambda, q);");
                body.push("Ry(theta, q);");
                body.push("Rz(phi, q);");
                format!("operation {name}(theta:Double, phi:Double, lambda:Double, q:Qubit):()")
            }
            Self::U2 => {
                body.push(format!("{u3}(PI() / 2.0, phi, lambda, q);"));
                format!("operation {name}(phi:Double, lambda:Double, q:Qubit):()")
            }
        };
        controllable_operation_definition(header, body)
    }
}

/// Signature of a user `gate` or `opaque` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateSignature {
    pub name: String,
    pub params: Vec<String>,
    pub qubits: Vec<String>,
    pub opaque: bool,
}

impl GateSignature {
    /// Q# operation header under `operation`, e.g.
    /// `operation Rot(theta:Double, q:Qubit):()`.
    pub fn header(&self, operation: &str) -> String {
        let params = self
            .params
            .iter()
            .map(|p| format!("{p}:Double"))
            .chain(self.qubits.iter().map(|q| format!("{q}:Qubit")))
            .collect::<Vec<_>>()
            .join(", ");
        format!("operation {operation}({params}):()")
    }
}

/// How to call a gate in Q#.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallTarget {
    pub callee: String,
    pub controls: usize,
    /// `(parameters, qubits)` when the arity is known.
    pub arity: Option<(usize, usize)>,
    pub helpers: &'static [Helper],
}

impl CallTarget {
    /// Render one call statement.
    ///
    /// Plain calls are `Callee(params, qubits);`. Controlled calls pass the
    /// control qubits as an array and the rest as a tuple:
    /// `(Controlled Rz)([c], (theta, t));`.
    pub fn render(&self, params: &[String], qubits: &[String]) -> String {
        if self.controls == 0 || qubits.len() <= self.controls {
            let args = params
                .iter()
                .chain(qubits)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            return format!("{}({args});", self.callee);
        }

        let (controls, targets) = qubits.split_at(self.controls);
        let inner = params
            .iter()
            .chain(targets)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        let target_arg = if params.is_empty() && targets.len() == 1 {
            inner
        } else {
            format!("({inner})")
        };
        format!(
            "(Controlled {})([{}], {target_arg});",
            self.callee,
            controls.join(", ")
        )
    }
}

#[derive(Debug, Clone)]
struct UserGate {
    signature: GateSignature,
    operation: String,
}

/// Gates known to one translation unit: user declarations, the helpers
/// already emitted, and every Q# operation name handed out so far.
#[derive(Debug, Clone, Default)]
pub struct GateRegistry {
    user: FxHashMap<String, UserGate>,
    helpers: FxHashMap<Helper, String>,
    operations: FxHashSet<String>,
}

impl GateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user gate and reserve its operation name. Returns `None` if
    /// the gate is already declared.
    pub fn declare(&mut self, signature: GateSignature) -> Option<String> {
        if self.user.contains_key(&signature.name) {
            return None;
        }
        let operation = self.reserve(&capitalize(&signature.name));
        self.user.insert(
            signature.name.clone(),
            UserGate {
                signature,
                operation: operation.clone(),
            },
        );
        Some(operation)
    }

    pub fn get(&self, name: &str) -> Option<&GateSignature> {
        self.user.get(name).map(|gate| &gate.signature)
    }

    pub fn len(&self) -> usize {
        self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_empty()
    }

    /// Q# operation names taken by user gates and emitted helpers.
    pub fn operation_names(&self) -> &FxHashSet<String> {
        &self.operations
    }

    /// Resolve a gate name. User declarations shadow standard gates; unknown
    /// names are passed through capitalized.
    pub fn resolve(&self, name: &str) -> CallTarget {
        if let Some(gate) = self.user.get(name) {
            return CallTarget {
                callee: gate.operation.clone(),
                controls: 0,
                arity: Some((gate.signature.params.len(), gate.signature.qubits.len())),
                helpers: &[],
            };
        }
        match StandardGate::from_qasm(name) {
            Some(gate) => CallTarget {
                callee: gate.callee().to_string(),
                controls: gate.controls(),
                arity: Some((gate.num_params(), gate.num_qubits())),
                helpers: gate.helpers(),
            },
            None => CallTarget {
                callee: capitalize(name),
                controls: 0,
                arity: None,
                helpers: &[],
            },
        }
    }

    /// Claim the helpers `target` depends on and point it at the last one.
    /// Returns the definitions of helpers not emitted before, in order.
    pub fn claim_helpers(&mut self, target: &mut CallTarget) -> Vec<CodeBuffer> {
        let mut definitions = Vec::new();
        for &helper in target.helpers {
            if self.helpers.contains_key(&helper) {
                continue;
            }
            let name = self.reserve(helper.operation_name());
            let u3 = self
                .helpers
                .get(&Helper::U3)
                .cloned()
                .unwrap_or_else(|| name.clone());
            definitions.push(helper.definition(&name, &u3));
            self.helpers.insert(helper, name);
        }
        if let Some(name) = target.helpers.last().and_then(|h| self.helpers.get(h)) {
            target.callee.clone_from(name);
        }
        definitions
    }

    fn reserve(&mut self, base: &str) -> String {
        let name = unique_name(base, &self.operations);
        self.operations.insert(name.clone());
        name
    }
}

/// `base` if it is free, otherwise `base_N` for the smallest free `N`.
pub fn unique_name(base: &str, taken: &FxHashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}_{n}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Upper-case the first character: `mygate` becomes `Mygate`.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("mygate"), "Mygate");
        assert_eq!(capitalize("H"), "H");
        assert_eq!(capitalize("_x"), "_x");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_standard_lookup() {
        assert_eq!(StandardGate::from_qasm("cx"), Some(StandardGate::CX));
        assert_eq!(StandardGate::from_qasm("CX"), Some(StandardGate::CX));
        assert_eq!(StandardGate::from_qasm("U"), Some(StandardGate::U3));
        assert_eq!(StandardGate::from_qasm("mygate"), None);
        assert_eq!(StandardGate::CCX.num_qubits(), 3);
        assert_eq!(StandardGate::U2.num_params(), 2);
    }

    #[test]
    fn test_render_plain_call() {
        let registry = GateRegistry::new();
        let target = registry.resolve("cx");
        assert_eq!(
            target.render(&[], &strings(&["q[0]", "q[1]"])),
            "CNOT(q[0], q[1]);"
        );

        let target = registry.resolve("rz");
        assert_eq!(
            target.render(&strings(&["PI() / 4.0"]), &strings(&["q[2]"])),
            "Rz(PI() / 4.0, q[2]);"
        );

        let target = registry.resolve("tdg");
        assert_eq!(target.render(&[], &strings(&["a"])), "(Adjoint T)(a);");
    }

    #[test]
    fn test_render_controlled_call() {
        let registry = GateRegistry::new();
        assert_eq!(
            registry.resolve("cz").render(&[], &strings(&["a", "b"])),
            "(Controlled Z)([a], b);"
        );
        assert_eq!(
            registry
                .resolve("crz")
                .render(&strings(&["theta"]), &strings(&["a", "b"])),
            "(Controlled Rz)([a], (theta, b));"
        );
    }

    #[test]
    fn test_unknown_gate_is_capitalized() {
        let target = GateRegistry::new().resolve("mygate");
        assert_eq!(target.callee, "Mygate");
        assert_eq!(target.arity, None);
    }

    #[test]
    fn test_user_gate_shadows_standard() {
        let mut registry = GateRegistry::new();
        let operation = registry.declare(GateSignature {
            name: "h".into(),
            params: vec![],
            qubits: strings(&["a", "b"]),
            opaque: false,
        });
        assert_eq!(operation.as_deref(), Some("H"));
        let target = registry.resolve("h");
        assert_eq!(target.callee, "H");
        assert_eq!(target.arity, Some((0, 2)));
    }

    #[test]
    fn test_duplicate_gate_declaration() {
        let mut registry = GateRegistry::new();
        let sig = GateSignature {
            name: "g".into(),
            params: vec![],
            qubits: strings(&["q"]),
            opaque: true,
        };
        assert!(registry.declare(sig.clone()).is_some());
        assert!(registry.declare(sig).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_gates_capitalizing_alike_get_distinct_operations() {
        let mut registry = GateRegistry::new();
        let gate = |name: &str| GateSignature {
            name: name.into(),
            params: vec![],
            qubits: strings(&["a"]),
            opaque: false,
        };
        assert_eq!(registry.declare(gate("flip")).as_deref(), Some("Flip"));
        assert_eq!(registry.declare(gate("Flip")).as_deref(), Some("Flip_1"));
        assert_eq!(registry.resolve("Flip").callee, "Flip_1");
        assert!(registry.operation_names().contains("Flip"));
    }

    #[test]
    fn test_helpers_claimed_once() {
        let mut registry = GateRegistry::new();
        let mut target = registry.resolve("u2");
        assert_eq!(target.helpers, &[Helper::U3, Helper::U2]);

        let definitions = registry.claim_helpers(&mut target);
        assert_eq!(definitions.len(), 2);
        assert_eq!(target.callee, "U2");

        let mut again = registry.resolve("u3");
        assert!(registry.claim_helpers(&mut again).is_empty());
        assert_eq!(again.callee, "U3");
    }

    #[test]
    fn test_helper_avoids_user_operation_name() {
        let mut registry = GateRegistry::new();
        registry.declare(GateSignature {
            name: "u3".into(),
            params: strings(&["a", "b", "c"]),
            qubits: strings(&["x"]),
            opaque: false,
        });

        let mut target = registry.resolve("u2");
        let definitions = registry.claim_helpers(&mut target);
        let headers: Vec<_> = definitions
            .iter()
            .filter_map(|d| d.lines().next())
            .collect();
        assert_eq!(
            headers,
            vec![
                "operation U3_1(theta:Double, phi:Double, lambda:Double, q:Qubit):()",
                "operation U2(phi:Double, lambda:Double, q:Qubit):()",
            ]
        );
        assert!(
            definitions[1]
                .lines()
                .any(|l| l == "U3_1(PI() / 2.0, phi, lambda, q);")
        );
        assert_eq!(registry.resolve("u3").callee, "U3");
    }

    #[test]
    fn test_helpers_support_functors() {
        let definition = Helper::U3.definition("U3", "U3");
        let lines: Vec<_> = definition.lines().collect();
        assert!(lines.contains(&"controlled auto"));
        assert!(lines.contains(&"adjoint auto"));
        assert!(lines.contains(&"controlled adjoint auto"));
    }

    #[test]
    fn test_unique_name() {
        let mut taken = FxHashSet::default();
        assert_eq!(unique_name("Main", &taken), "Main");
        taken.insert("Main".to_string());
        taken.insert("Main_1".to_string());
        assert_eq!(unique_name("Main", &taken), "Main_2");
    }

    #[test]
    fn test_signature_header() {
        let sig = GateSignature {
            name: "rot".into(),
            params: strings(&["theta"]),
            qubits: strings(&["a", "b"]),
            opaque: false,
        };
        assert_eq!(
            sig.header("Rot"),
            "operation Rot(theta:Double, a:Qubit, b:Qubit):()"
        );
    }
}
