// Class declarations: the class is registered before its members are
// visited so method bodies can name their own class. Members are processed
// in declaration order; fields record their type, methods record their
// signature and then have their bodies checked with 'this' in scope. The
// constructor is the method member named 'constructor' and always returns
// void.

use super::function_type_checking::FunctionKind;
use super::{ClassSymbol, Member, SemanticAnalyzer, Type, CONSTRUCTOR_MEMBER};
use crate::ast::NodeType;
use indexmap::IndexMap;

impl SemanticAnalyzer {
    pub(super) fn visit_class_decl(&mut self, node_idx: usize) {
        let view = self.ast.class_decl(node_idx);
        let Some(name_idx) = view.name_idx() else {
            return;
        };
        let name = self.ast.node_text(name_idx).to_string();
        let base = view.base_name().map(String::from);
        let member_idxs = view.members();

        let symbol = ClassSymbol {
            name: name.clone(),
            base,
            members: IndexMap::new(),
        };
        if !self.symbols.define_class(symbol) {
            self.record_error(format!("Class '{}' is already defined", name), name_idx);
        }

        let saved_class = self.current_class.replace(name.clone());
        for member_idx in member_idxs {
            match self.node_type(member_idx) {
                NodeType::VarDecl => self.visit_field_member(&name, member_idx, false),
                NodeType::ConstDecl => self.visit_field_member(&name, member_idx, true),
                NodeType::FunctionDecl => self.visit_method_member(&name, member_idx),
                _ => {}
            }
        }
        self.current_class = saved_class;
    }

    /// A field member, declared with variable or constant syntax
    fn visit_field_member(&mut self, class_name: &str, node_idx: usize, is_const: bool) {
        let view = self.ast.var_decl(node_idx);
        let Some(name_idx) = view.name_idx() else {
            return;
        };
        let annotation_idx = view.annotation_idx();
        let initializer_idx = view.initializer_idx();
        let name = self.ast.node_text(name_idx).to_string();

        let declared = annotation_idx.map(|type_idx| self.resolve_type_node(type_idx));
        // Field initializers run outside any method, so 'this' is not
        // available in them
        let initialized = initializer_idx.map(|expr_idx| self.check_expression(expr_idx));

        if is_const && initializer_idx.is_none() {
            self.record_error(
                format!("Constant field '{}' must be initialized", name),
                node_idx,
            );
        }

        if let (Some(declared_ty), Some(init_ty)) = (&declared, &initialized) {
            if !self.symbols.is_assignable(declared_ty, init_ty) {
                self.record_error(
                    format!(
                        "Cannot initialize field '{}' of type '{}' with a value of type '{}'",
                        name, declared_ty, init_ty
                    ),
                    initializer_idx.unwrap_or(node_idx),
                );
            }
        }

        let ty = declared.or(initialized).unwrap_or(Type::Error);
        let member = Member::Field {
            name: name.clone(),
            ty,
            is_const,
        };
        if !self.symbols.define_member(class_name, member) {
            self.record_error(
                format!("Class '{}' already has a member '{}'", class_name, name),
                name_idx,
            );
        }
    }

    /// A method or constructor member
    fn visit_method_member(&mut self, class_name: &str, node_idx: usize) {
        let view = self.ast.function_decl(node_idx);
        let Some(name_idx) = view.name_idx() else {
            return;
        };
        let param_idxs = view.params();
        let return_type_idx = view.return_type_idx();
        let name = self.ast.node_text(name_idx).to_string();

        let params = self.collect_params(&param_idxs);
        let is_constructor = name == CONSTRUCTOR_MEMBER;

        // Constructors produce the instance; their return type is void no
        // matter what the body looks like
        let return_type = if is_constructor {
            Type::Void
        } else {
            match return_type_idx {
                Some(type_idx) => self.resolve_type_node(type_idx),
                None => Type::Void,
            }
        };

        let member = Member::Method {
            name: name.clone(),
            params: params.clone(),
            return_type: return_type.clone(),
        };
        if !self.symbols.define_member(class_name, member) {
            if is_constructor {
                self.record_error(
                    format!("Class '{}' already has a constructor", class_name),
                    name_idx,
                );
            } else {
                self.record_error(
                    format!("Class '{}' already has a member '{}'", class_name, name),
                    name_idx,
                );
            }
        }

        let kind = if is_constructor {
            FunctionKind::Constructor
        } else {
            FunctionKind::Method
        };
        self.check_function_body(node_idx, &params, &return_type, kind);
    }

    /// `this` yields the current class instance inside a method or
    /// constructor body and is an error anywhere else
    pub(super) fn check_this(&mut self, node_idx: usize) -> Type {
        if self.in_method {
            if let Some(class_name) = &self.current_class {
                return Type::Object(class_name.clone());
            }
        }
        self.record_error(
            "'this' used outside of a class method".to_string(),
            node_idx,
        );
        Type::Error
    }
}
