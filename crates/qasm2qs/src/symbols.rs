//! Register symbol tables.
//!
//! `OpenQASM` 2 has two register namespaces, quantum (`qreg`) and classical
//! (`creg`). The same name may appear once in each. Registers are declared at
//! top level only and live for the whole translation unit.
//!
//! Q# has a single namespace for locals, so every register also carries the
//! binding it is emitted under. A register whose name is already bound by the
//! other namespace is bound under a suffixed name instead.

use rustc_hash::FxHashMap;

/// A declared register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub name: String,
    pub size: usize,
    /// Name of the Q# local holding the register.
    pub binding: String,
}

/// One register namespace. Iteration follows declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterTable {
    registers: Vec<Register>,
    index: FxHashMap<String, usize>,
}

impl RegisterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a register. Returns `false` (and leaves the table untouched)
    /// if the name is already taken in this namespace.
    pub fn declare(&mut self, name: &str, size: usize) -> bool {
        self.declare_bound(name, size, name.to_string())
    }

    /// Declare a register emitted under `binding`.
    pub fn declare_bound(&mut self, name: &str, size: usize, binding: String) -> bool {
        if self.index.contains_key(name) {
            return false;
        }
        self.index.insert(name.to_string(), self.registers.len());
        self.registers.push(Register {
            name: name.to_string(),
            size,
            binding,
        });
        true
    }

    pub fn get(&self, name: &str) -> Option<&Register> {
        self.index.get(name).map(|&i| &self.registers[i])
    }

    /// Declared size of `name`, if it exists.
    pub fn size_of(&self, name: &str) -> Option<usize> {
        self.get(name).map(|r| r.size)
    }

    fn binds(&self, binding: &str) -> bool {
        self.registers.iter().any(|r| r.binding == binding)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Register> {
        self.registers.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registers.iter().map(|r| r.name.as_str())
    }

    /// Sizes in declaration order.
    pub fn sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.registers.iter().map(|r| r.size)
    }
}

/// The quantum and classical register tables of one translation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTables {
    pub quantum: RegisterTable,
    pub classical: RegisterTable,
}

impl SymbolTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a quantum register. Returns `false` if `name` is already a
    /// quantum register.
    pub fn declare_quantum(&mut self, name: &str, size: usize) -> bool {
        let binding = self.free_binding(name, "_q");
        self.quantum.declare_bound(name, size, binding)
    }

    /// Declare a classical register. Returns `false` if `name` is already a
    /// classical register.
    pub fn declare_classical(&mut self, name: &str, size: usize) -> bool {
        let binding = self.free_binding(name, "_c");
        self.classical.declare_bound(name, size, binding)
    }

    /// `name`, or `name` followed by `suffix` as often as needed to avoid
    /// every binding already handed out.
    fn free_binding(&self, name: &str, suffix: &str) -> String {
        let mut binding = name.to_string();
        while self.quantum.binds(&binding) || self.classical.binds(&binding) {
            binding.push_str(suffix);
        }
        binding
    }

    /// Total number of qubits over all quantum registers.
    pub fn num_qubits(&self) -> usize {
        self.quantum.sizes().sum()
    }

    /// Total number of bits over all classical registers.
    pub fn num_clbits(&self) -> usize {
        self.classical.sizes().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_lookup() {
        let mut table = RegisterTable::new();
        assert!(table.declare("q", 3));
        assert!(table.declare("anc", 1));

        assert_eq!(table.size_of("q"), Some(3));
        assert_eq!(table.size_of("anc"), Some(1));
        assert_eq!(table.size_of("r"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_duplicate_is_rejected() {
        let mut table = RegisterTable::new();
        assert!(table.declare("q", 3));
        assert!(!table.declare("q", 5));
        assert_eq!(table.size_of("q"), Some(3));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_declaration_order() {
        let mut table = RegisterTable::new();
        for (name, size) in [("z", 1), ("a", 2), ("m", 3)] {
            table.declare(name, size);
        }
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["z", "a", "m"]);
        assert_eq!(table.sizes().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_namespaces_are_independent() {
        let mut symbols = SymbolTables::new();
        assert!(symbols.quantum.declare("r", 2));
        assert!(symbols.classical.declare("r", 4));

        assert_eq!(symbols.quantum.size_of("r"), Some(2));
        assert_eq!(symbols.classical.size_of("r"), Some(4));
        assert_eq!(symbols.num_qubits(), 2);
        assert_eq!(symbols.num_clbits(), 4);
    }

    #[test]
    fn test_shared_name_gets_distinct_binding() {
        let mut symbols = SymbolTables::new();
        assert!(symbols.declare_quantum("r", 1));
        assert!(symbols.declare_classical("r", 1));
        assert!(symbols.declare_classical("c", 2));

        assert_eq!(symbols.quantum.get("r").unwrap().binding, "r");
        assert_eq!(symbols.classical.get("r").unwrap().binding, "r_c");
        assert_eq!(symbols.classical.get("c").unwrap().binding, "c");
    }

    #[test]
    fn test_binding_avoids_earlier_suffixed_names() {
        let mut symbols = SymbolTables::new();
        assert!(symbols.declare_classical("r", 1));
        assert!(symbols.declare_quantum("r", 1));
        assert!(symbols.declare_quantum("r_q", 1));

        assert_eq!(symbols.classical.get("r").unwrap().binding, "r");
        assert_eq!(symbols.quantum.get("r").unwrap().binding, "r_q");
        assert_eq!(symbols.quantum.get("r_q").unwrap().binding, "r_q_q");
        assert!(!symbols.declare_quantum("r", 3));
    }
}
