// Call resolution over left-hand-side chains.
//
// A chain (`primary` followed by `.name`, `[expr]`, and `(args)` suffixes) is
// walked left to right carrying a pair of (type so far, pending callee).
// An identifier naming a function and a property access naming a method each
// produce a pending callee; the next call suffix consumes it. A chain that
// ends with an unconsumed callee used its name as a value, which is reported.

use super::{FunctionSymbol, Param, SemanticAnalyzer, Type, CONSTRUCTOR_MEMBER};
use crate::ast::NodeType;

/// The pending callee threaded through a chain walk
pub(super) enum Callee {
    /// A global function named directly
    Function(FunctionSymbol),
    /// A method resolved on a receiver's class
    Method {
        class: String,
        signature: FunctionSymbol,
    },
}

impl Callee {
    fn description(&self) -> String {
        match self {
            Callee::Function(f) => format!("function '{}'", f.name),
            Callee::Method { class, signature } => {
                format!("method '{}' of class '{}'", signature.name, class)
            }
        }
    }
}

impl SemanticAnalyzer {
    /// Checks a chain-rooted expression in value position
    pub(super) fn check_chain_expression(&mut self, node_idx: usize) -> Type {
        let (ty, callee) = self.check_chain(node_idx);
        if let Some(callee) = callee {
            self.report_callee_as_value(&callee, node_idx);
            return Type::Error;
        }
        ty
    }

    /// Walks one chain node, returning its type and any pending callee
    pub(super) fn check_chain(&mut self, node_idx: usize) -> (Type, Option<Callee>) {
        let result = match self.node_type(node_idx) {
            NodeType::Identifier => self.check_identifier(node_idx),
            NodeType::This => (self.check_this(node_idx), None),
            NodeType::NewExpr => (self.check_new_expr(node_idx), None),
            NodeType::Call => self.check_call(node_idx),
            NodeType::Index => self.check_index(node_idx),
            NodeType::PropertyAccess => self.check_property_access(node_idx),
            // A parenthesized or otherwise non-chain receiver
            _ => (self.check_expression(node_idx), None),
        };
        self.set_node_type(node_idx, result.0.clone());
        result
    }

    /// An identifier resolves to a variable (a value) or a function
    /// (a pending callee)
    fn check_identifier(&mut self, node_idx: usize) -> (Type, Option<Callee>) {
        let name = self.ast.node_text(node_idx).to_string();

        if let Some(var) = self.symbols.resolve_variable(&name) {
            return (var.ty.clone(), None);
        }
        if let Some(func) = self.symbols.resolve_function(&name) {
            return (Type::Error, Some(Callee::Function(func.clone())));
        }

        self.record_error(format!("Undeclared identifier '{}'", name), node_idx);
        (Type::Error, None)
    }

    /// A call suffix: consumes the pending callee of its left side
    fn check_call(&mut self, node_idx: usize) -> (Type, Option<Callee>) {
        let children = self.child_indices(node_idx);
        let (Some(&callee_idx), Some(&args_idx)) = (children.first(), children.get(1)) else {
            return (Type::Error, None);
        };

        let (callee_ty, callee) = self.check_chain(callee_idx);

        let arg_idxs = self.child_indices(args_idx);
        let arg_types: Vec<Type> = arg_idxs
            .iter()
            .map(|&arg| self.check_expression(arg))
            .collect();

        match callee {
            Some(Callee::Function(func)) => {
                let label = format!("function '{}'", func.name);
                self.check_call_arguments(&label, &func.params, &arg_types, &arg_idxs, node_idx);
                (func.return_type, None)
            }
            Some(Callee::Method { class, signature }) => {
                let label = format!("method '{}' of class '{}'", signature.name, class);
                self.check_call_arguments(
                    &label,
                    &signature.params,
                    &arg_types,
                    &arg_idxs,
                    node_idx,
                );
                (signature.return_type, None)
            }
            None => {
                if !callee_ty.is_error() {
                    self.record_error(
                        format!("Value of type '{}' is not callable", callee_ty),
                        node_idx,
                    );
                }
                (Type::Error, None)
            }
        }
    }

    /// Arity must match exactly; each argument must be assignable to its
    /// parameter, reported with its 1-based position
    pub(super) fn check_call_arguments(
        &mut self,
        label: &str,
        params: &[Param],
        arg_types: &[Type],
        arg_idxs: &[usize],
        call_idx: usize,
    ) {
        if params.len() != arg_types.len() {
            self.record_error(
                format!(
                    "Expected {} argument(s) to {}, found {}",
                    params.len(),
                    label,
                    arg_types.len()
                ),
                call_idx,
            );
            return;
        }

        for (position, (param, arg_ty)) in params.iter().zip(arg_types.iter()).enumerate() {
            if !self.symbols.is_assignable(&param.ty, arg_ty) {
                self.record_error(
                    format!(
                        "Argument {} to {} must be of type '{}', found '{}'",
                        position + 1,
                        label,
                        param.ty,
                        arg_ty
                    ),
                    arg_idxs[position],
                );
            }
        }
    }

    /// `new C(args)`: the result is an instance of C whether or not the
    /// construction checks out. The constructor is looked up on C first,
    /// then up the base chain.
    fn check_new_expr(&mut self, node_idx: usize) -> Type {
        let children = self.child_indices(node_idx);
        let (Some(&name_idx), Some(&args_idx)) = (children.first(), children.get(1)) else {
            return Type::Error;
        };

        let class_name = self.ast.node_text(name_idx).to_string();
        if self.symbols.resolve_class(&class_name).is_none() {
            self.record_error(format!("Unknown class '{}'", class_name), node_idx);
            return Type::Error;
        }

        let arg_idxs = self.child_indices(args_idx);
        let arg_types: Vec<Type> = arg_idxs
            .iter()
            .map(|&arg| self.check_expression(arg))
            .collect();

        match self.resolve_constructor(&class_name) {
            Some(params) => {
                let label = format!("constructor of class '{}'", class_name);
                self.check_call_arguments(&label, &params, &arg_types, &arg_idxs, node_idx);
            }
            None => {
                if !arg_types.is_empty() {
                    self.record_error(
                        format!(
                            "Class '{}' has no constructor but arguments were provided",
                            class_name
                        ),
                        node_idx,
                    );
                }
            }
        }

        Type::Object(class_name)
    }

    /// Parameters of the first constructor on the class or its base chain
    fn resolve_constructor(&self, class_name: &str) -> Option<Vec<Param>> {
        match self.symbols.resolve_member(class_name, CONSTRUCTOR_MEMBER) {
            Some(super::Member::Method { params, .. }) => Some(params.clone()),
            _ => None,
        }
    }

    /// A function or method name was used where a value is required
    pub(super) fn report_callee_as_value(&mut self, callee: &Callee, node_idx: usize) {
        self.record_error(
            format!("The {} must be called", callee.description()),
            node_idx,
        );
    }
}
