use std::collections::HashSet;

use indexmap::IndexMap;

use super::types::Type;

/// Member name under which a class constructor is stored
pub const CONSTRUCTOR_MEMBER: &str = "constructor";

// ========== Symbols ==========

#[derive(Debug, Clone, PartialEq)]
pub struct VariableSymbol {
    pub name: String,
    pub ty: Type,
    pub is_const: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSymbol {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
}

/// A class member: a field or a method
///
/// The constructor is an ordinary method member stored under
/// [`CONSTRUCTOR_MEMBER`].
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Field {
        name: String,
        ty: Type,
        is_const: bool,
    },
    Method {
        name: String,
        params: Vec<Param>,
        return_type: Type,
    },
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Field { name, .. } => name,
            Member::Method { name, .. } => name,
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self, Member::Method { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassSymbol {
    pub name: String,
    /// Base class by name; resolved on demand, never validated at
    /// declaration time so a base may be declared later in the program
    pub base: Option<String>,
    pub members: IndexMap<String, Member>,
}

/// A name binding inside a lexical scope
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Variable(VariableSymbol),
    Function(FunctionSymbol),
}

// ========== Scopes ==========

/// One lexical scope frame: an insertion-ordered mapping from name to symbol
#[derive(Debug, Default)]
pub struct Scope {
    bindings: IndexMap<String, Symbol>,
}

impl Scope {
    fn insert(&mut self, name: String, symbol: Symbol) -> bool {
        if self.bindings.contains_key(&name) {
            false
        } else {
            self.bindings.insert(name, symbol);
            true
        }
    }

    fn get(&self, name: &str) -> Option<&Symbol> {
        self.bindings.get(name)
    }
}

// ========== Symbol Table ==========

/// The complete symbol structure: the scope stack plus the global class and
/// function registries.
///
/// Scope frames live in an arena and are never destroyed; a separate stack
/// of indices tracks the currently active lexical chain. Exiting a scope
/// deactivates its frame but keeps it for the textual export. Frame 0 is the
/// global scope and can never be exited.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    active: Vec<usize>,
    functions: IndexMap<String, FunctionSymbol>,
    classes: IndexMap<String, ClassSymbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
            active: vec![0],
            functions: IndexMap::new(),
            classes: IndexMap::new(),
        }
    }

    /// Enter a new nested scope, returning its frame index
    pub fn enter_scope(&mut self) -> usize {
        let idx = self.scopes.len();
        self.scopes.push(Scope::default());
        self.active.push(idx);
        idx
    }

    /// Exit the current scope, returning its frame index
    ///
    /// Exiting the global scope is a programming error, not a data error.
    pub fn exit_scope(&mut self) -> usize {
        assert!(self.active.len() > 1, "Cannot exit the global scope");
        self.active.pop().unwrap()
    }

    /// Current nesting depth (0 = only the global scope is active)
    pub fn depth(&self) -> usize {
        self.active.len() - 1
    }

    fn current_scope_mut(&mut self) -> &mut Scope {
        let idx = *self.active.last().unwrap();
        &mut self.scopes[idx]
    }

    /// Define a variable in the current scope
    /// Returns false if the current scope already binds the name
    pub fn define_variable(&mut self, symbol: VariableSymbol) -> bool {
        let name = symbol.name.clone();
        self.current_scope_mut()
            .insert(name, Symbol::Variable(symbol))
    }

    /// Resolve a variable, searching from innermost to outermost scope
    pub fn resolve_variable(&self, name: &str) -> Option<&VariableSymbol> {
        for &scope_idx in self.active.iter().rev() {
            if let Some(Symbol::Variable(var)) = self.scopes[scope_idx].get(name) {
                return Some(var);
            }
        }
        None
    }

    /// Define a function in the global registry and bind it in the current
    /// scope. Returns false if either the registry or the current scope
    /// already has the name.
    pub fn define_function(&mut self, symbol: FunctionSymbol) -> bool {
        let name = symbol.name.clone();
        if self.functions.contains_key(&name) {
            return false;
        }
        if !self
            .current_scope_mut()
            .insert(name.clone(), Symbol::Function(symbol.clone()))
        {
            return false;
        }
        self.functions.insert(name, symbol);
        true
    }

    /// Resolve a function: the global registry first, then scope bindings
    pub fn resolve_function(&self, name: &str) -> Option<&FunctionSymbol> {
        if let Some(func) = self.functions.get(name) {
            return Some(func);
        }
        for &scope_idx in self.active.iter().rev() {
            if let Some(Symbol::Function(func)) = self.scopes[scope_idx].get(name) {
                return Some(func);
            }
        }
        None
    }

    /// Define a class in the global registry
    /// Returns false if the name is taken
    pub fn define_class(&mut self, symbol: ClassSymbol) -> bool {
        if self.classes.contains_key(&symbol.name) {
            return false;
        }
        self.classes.insert(symbol.name.clone(), symbol);
        true
    }

    pub fn resolve_class(&self, name: &str) -> Option<&ClassSymbol> {
        self.classes.get(name)
    }

    /// Add a member to an already-declared class
    /// Returns false if the class is unknown or the member name is taken
    pub fn define_member(&mut self, class_name: &str, member: Member) -> bool {
        let Some(class) = self.classes.get_mut(class_name) else {
            return false;
        };
        let name = member.name().to_string();
        if class.members.contains_key(&name) {
            false
        } else {
            class.members.insert(name, member);
            true
        }
    }

    /// Resolve a member on a class, falling back through the base chain.
    /// A visited set keeps base cycles from looping forever.
    pub fn resolve_member(&self, class_name: &str, member_name: &str) -> Option<&Member> {
        let mut visited = HashSet::new();
        let mut current = class_name;
        loop {
            if !visited.insert(current) {
                return None;
            }
            let class = self.resolve_class(current)?;
            if let Some(member) = class.members.get(member_name) {
                return Some(member);
            }
            current = class.base.as_deref()?;
        }
    }

    /// True iff `child` transitively inherits from `ancestor` (strict:
    /// a class does not inherit from itself)
    pub fn inherits_from(&self, child: &str, ancestor: &str) -> bool {
        let mut visited = HashSet::new();
        let mut current = child;
        loop {
            if !visited.insert(current) {
                return false;
            }
            let Some(base) = self
                .resolve_class(current)
                .and_then(|class| class.base.as_deref())
            else {
                return false;
            };
            if base == ancestor {
                return true;
            }
            current = base;
        }
    }

    /// Assignability: may a value of type `source` be stored where `target`
    /// is expected?
    ///
    /// - identical types always match;
    /// - `error` absorbs on either side, so cascades stay silent;
    /// - integer widens to float; no other primitive widening;
    /// - null is a valid string value and nothing else;
    /// - arrays are covariant by element type;
    /// - an object matches any of its transitive base classes.
    pub fn is_assignable(&self, target: &Type, source: &Type) -> bool {
        match (target, source) {
            (t, s) if t == s => true,
            (Type::Error, _) | (_, Type::Error) => true,
            (Type::Float, Type::Integer) => true,
            (Type::Str, Type::Null) => true,
            (Type::Array(t), Type::Array(s)) => self.is_assignable(t, s),
            (Type::Object(t), Type::Object(s)) => self.inherits_from(s, t),
            _ => false,
        }
    }

    /// Textual dump: one block per scope frame in creation order, then the
    /// function and class registries
    pub fn export_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        for (frame, scope) in self.scopes.iter().enumerate() {
            if frame == 0 {
                lines.push("[global]".to_string());
            } else {
                lines.push(format!("[scope_{}]", frame));
            }
            for symbol in scope.bindings.values() {
                match symbol {
                    Symbol::Variable(var) => {
                        let suffix = if var.is_const { " (const)" } else { "" };
                        lines.push(format!("  var {}: {}{}", var.name, var.ty, suffix));
                    }
                    Symbol::Function(func) => lines.push(format!("  {}", signature(func))),
                }
            }
        }

        lines.push("[functions]".to_string());
        for func in self.functions.values() {
            lines.push(format!("  {}", signature(func)));
        }

        lines.push("[classes]".to_string());
        for class in self.classes.values() {
            lines.push(format!("  class {}", class.name));
            for member in class.members.values() {
                match member {
                    Member::Field { name, ty, .. } => {
                        lines.push(format!("    field {}: {}", name, ty));
                    }
                    Member::Method {
                        name,
                        params,
                        return_type,
                    } => {
                        lines.push(format!(
                            "    method {}({}) -> {}",
                            name,
                            format_params(params),
                            return_type
                        ));
                    }
                }
            }
        }

        lines
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

fn format_params(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| format!("{}: {}", p.name, p.ty))
        .collect::<Vec<_>>()
        .join(", ")
}

fn signature(func: &FunctionSymbol) -> String {
    format!(
        "func {}({}) -> {}",
        func.name,
        format_params(&func.params),
        func.return_type
    )
}
