// The three assignment shapes: simple variable, property, and list element.
// Targets must exist, must not be constant, and must accept the value's type.

use super::{Member, SemanticAnalyzer, Type};

impl SemanticAnalyzer {
    /// `name = value`
    pub(super) fn check_assign(&mut self, node_idx: usize) -> Type {
        let children = self.child_indices(node_idx);
        let (Some(&target_idx), Some(&value_idx)) = (children.first(), children.get(1)) else {
            return Type::Error;
        };

        let name = self.ast.node_text(target_idx).to_string();
        let value_ty = self.check_expression(value_idx);

        let Some(var) = self.symbols.resolve_variable(&name).cloned() else {
            self.record_error(format!("Undeclared variable '{}'", name), target_idx);
            self.set_node_type(target_idx, Type::Error);
            return Type::Error;
        };
        self.set_node_type(target_idx, var.ty.clone());

        if var.is_const {
            self.record_error(format!("Cannot assign to constant '{}'", name), node_idx);
        } else if !self.symbols.is_assignable(&var.ty, &value_ty) {
            self.record_error(
                format!(
                    "Cannot assign a value of type '{}' to variable '{}' of type '{}'",
                    value_ty, name, var.ty
                ),
                node_idx,
            );
        }

        value_ty
    }

    /// `receiver.name = value` — the receiver must be an object whose class
    /// (or a base of it) declares a non-method, non-constant member
    pub(super) fn check_property_assign(&mut self, node_idx: usize) -> Type {
        let children = self.child_indices(node_idx);
        let (Some(&receiver_idx), Some(&name_idx), Some(&value_idx)) =
            (children.first(), children.get(1), children.get(2))
        else {
            return Type::Error;
        };

        let receiver_ty = self.check_expression(receiver_idx);
        let value_ty = self.check_expression(value_idx);
        let name = self.ast.node_text(name_idx).to_string();

        let class = match receiver_ty {
            Type::Error => return Type::Error,
            Type::Object(class) => class,
            other => {
                self.record_error(
                    format!("Cannot assign to a property of non-object type '{}'", other),
                    node_idx,
                );
                return Type::Error;
            }
        };

        match self.symbols.resolve_member(&class, &name).cloned() {
            None => {
                self.record_error(
                    format!("Unknown property '{}' on type '{}'", name, class),
                    name_idx,
                );
                Type::Error
            }
            Some(Member::Method { .. }) => {
                self.record_error(
                    format!("Cannot assign to method '{}' of class '{}'", name, class),
                    name_idx,
                );
                Type::Error
            }
            Some(Member::Field { ty, is_const, .. }) => {
                if is_const {
                    self.record_error(
                        format!("Cannot assign to constant field '{}' of class '{}'", name, class),
                        node_idx,
                    );
                } else if !self.symbols.is_assignable(&ty, &value_ty) {
                    self.record_error(
                        format!(
                            "Cannot assign a value of type '{}' to field '{}' of type '{}'",
                            value_ty, name, ty
                        ),
                        node_idx,
                    );
                }
                value_ty
            }
        }
    }

    /// `receiver[index] = value` — the receiver must be a list, the index an
    /// integer, and the value assignable to the element type
    pub(super) fn check_index_assign(&mut self, node_idx: usize) -> Type {
        let children = self.child_indices(node_idx);
        let (Some(&receiver_idx), Some(&index_idx), Some(&value_idx)) =
            (children.first(), children.get(1), children.get(2))
        else {
            return Type::Error;
        };

        let receiver_ty = self.check_expression(receiver_idx);
        let index_ty = self.check_expression(index_idx);
        let value_ty = self.check_expression(value_idx);

        if index_ty != Type::Integer && !index_ty.is_error() {
            self.record_error(
                format!("List index must be an 'integer', found '{}'", index_ty),
                index_idx,
            );
        }

        match receiver_ty {
            Type::Error => Type::Error,
            Type::Array(element_ty) => {
                if !self.symbols.is_assignable(&element_ty, &value_ty) {
                    self.record_error(
                        format!(
                            "Cannot assign '{}' to an element of a list of type '{}'",
                            value_ty, element_ty
                        ),
                        node_idx,
                    );
                }
                value_ty
            }
            other => {
                self.record_error(
                    format!("Cannot assign by index to non-array type '{}'", other),
                    node_idx,
                );
                Type::Error
            }
        }
    }
}
