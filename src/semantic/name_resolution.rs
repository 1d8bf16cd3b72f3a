// Name binding for variable and constant declarations, plus resolution of
// type annotations against the primitive names and the class registry.

use super::{SemanticAnalyzer, Type, VariableSymbol};
use crate::ast::NodeType;

impl SemanticAnalyzer {
    /// Visits a variable or constant declaration
    ///
    /// The declared type comes from the annotation when present, otherwise
    /// from the initializer. The initializer is checked before the name is
    /// bound, so `let x = x;` resolves against the outer world and reports
    /// the name as undeclared.
    pub(super) fn visit_var_decl(&mut self, node_idx: usize, is_const: bool) {
        let view = self.ast.var_decl(node_idx);
        let Some(name_idx) = view.name_idx() else {
            return; // malformed tree, nothing to bind
        };
        let annotation_idx = view.annotation_idx();
        let initializer_idx = view.initializer_idx();
        let name = self.ast.node_text(name_idx).to_string();

        let declared = annotation_idx.map(|type_idx| self.resolve_type_node(type_idx));
        let initialized = initializer_idx.map(|expr_idx| self.check_expression(expr_idx));

        if is_const && initializer_idx.is_none() {
            self.record_error(format!("Constant '{}' must be initialized", name), node_idx);
        }

        if let (Some(declared_ty), Some(init_ty)) = (&declared, &initialized) {
            if !self.symbols.is_assignable(declared_ty, init_ty) {
                self.record_error(
                    format!(
                        "Cannot initialize '{}' of type '{}' with a value of type '{}'",
                        name, declared_ty, init_ty
                    ),
                    initializer_idx.unwrap_or(node_idx),
                );
            }
        }

        let ty = declared.or(initialized).unwrap_or(Type::Error);
        let symbol = VariableSymbol {
            name: name.clone(),
            ty,
            is_const,
        };
        if !self.symbols.define_variable(symbol) {
            self.record_error(
                format!("'{}' is already defined in this scope", name),
                name_idx,
            );
        }
    }

    /// Resolves a type node (TypeName or ArrayType) to a semantic type
    ///
    /// A name that is neither a primitive nor a declared class reports an
    /// unknown type and resolves to the error sentinel.
    pub(super) fn resolve_type_node(&mut self, type_idx: usize) -> Type {
        match self.node_type(type_idx) {
            NodeType::TypeName => {
                let name = self.ast.node_text(type_idx).to_string();
                match name.as_str() {
                    "integer" => Type::Integer,
                    "float" => Type::Float,
                    "boolean" => Type::Boolean,
                    "string" => Type::Str,
                    "void" => Type::Void,
                    _ => {
                        if self.symbols.resolve_class(&name).is_some() {
                            Type::Object(name)
                        } else {
                            self.record_error(format!("Unknown type '{}'", name), type_idx);
                            Type::Error
                        }
                    }
                }
            }
            NodeType::ArrayType => match self.ast.child_at(type_idx, 0) {
                Some(element_idx) => Type::array(self.resolve_type_node(element_idx)),
                None => Type::Error,
            },
            _ => Type::Error,
        }
    }
}
