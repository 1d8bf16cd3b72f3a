// Expression typing: literals, operators, ternaries, and array literals.
// Every visited expression node gets exactly one computed type; the error
// sentinel absorbs so a broken operand never produces a second diagnostic.

use super::{SemanticAnalyzer, Type};
use crate::ast::NodeType;

/// Operator spelling for diagnostics
fn operator_symbol(node_type: NodeType) -> &'static str {
    match node_type {
        NodeType::Or => "||",
        NodeType::And => "&&",
        NodeType::Equal => "==",
        NodeType::NotEqual => "!=",
        NodeType::Less => "<",
        NodeType::LessEqual => "<=",
        NodeType::Greater => ">",
        NodeType::GreaterEqual => ">=",
        NodeType::Add => "+",
        NodeType::Subtract => "-",
        NodeType::Multiply => "*",
        NodeType::Divide => "/",
        NodeType::Modulo => "%",
        NodeType::Not => "!",
        NodeType::Negate => "-",
        NodeType::UnaryPlus => "+",
        _ => "?",
    }
}

impl SemanticAnalyzer {
    /// Computes the type of an expression node, records it, and returns it
    pub(super) fn check_expression(&mut self, node_idx: usize) -> Type {
        let ty = match self.node_type(node_idx) {
            NodeType::LiteralInteger => Type::Integer,
            NodeType::LiteralFloat => Type::Float,
            NodeType::LiteralString => Type::Str,
            NodeType::LiteralBoolean => Type::Boolean,
            NodeType::LiteralNull => Type::Null,
            NodeType::ArrayLiteral => self.check_array_literal(node_idx),

            NodeType::Not => self.check_not(node_idx),
            NodeType::Negate | NodeType::UnaryPlus => self.check_numeric_unary(node_idx),
            NodeType::And | NodeType::Or => self.check_logical(node_idx),
            NodeType::Equal | NodeType::NotEqual => self.check_equality(node_idx),
            NodeType::Less
            | NodeType::LessEqual
            | NodeType::Greater
            | NodeType::GreaterEqual => self.check_relational(node_idx),
            NodeType::Add
            | NodeType::Subtract
            | NodeType::Multiply
            | NodeType::Divide
            | NodeType::Modulo => self.check_arithmetic(node_idx),
            NodeType::Ternary => self.check_ternary(node_idx),

            NodeType::Assign => self.check_assign(node_idx),
            NodeType::PropertyAssign => self.check_property_assign(node_idx),
            NodeType::IndexAssign => self.check_index_assign(node_idx),

            NodeType::Identifier
            | NodeType::This
            | NodeType::NewExpr
            | NodeType::Call
            | NodeType::Index
            | NodeType::PropertyAccess => self.check_chain_expression(node_idx),

            // Not an expression node; nothing sensible to infer
            _ => Type::Error,
        };
        self.set_node_type(node_idx, ty.clone());
        ty
    }

    /// Types of the two children of a binary operator node
    fn binary_operand_types(&mut self, node_idx: usize) -> (Type, Type) {
        let children = self.child_indices(node_idx);
        let left = children
            .first()
            .map(|&c| self.check_expression(c))
            .unwrap_or(Type::Error);
        let right = children
            .get(1)
            .map(|&c| self.check_expression(c))
            .unwrap_or(Type::Error);
        (left, right)
    }

    fn check_not(&mut self, node_idx: usize) -> Type {
        let operand = match self.ast.child_at(node_idx, 0) {
            Some(c) => self.check_expression(c),
            None => Type::Error,
        };
        match operand {
            Type::Boolean => Type::Boolean,
            Type::Error => Type::Error,
            other => {
                self.record_error(
                    format!("Operator '!' requires a boolean operand, found '{}'", other),
                    node_idx,
                );
                Type::Error
            }
        }
    }

    fn check_numeric_unary(&mut self, node_idx: usize) -> Type {
        let symbol = operator_symbol(self.node_type(node_idx));
        let operand = match self.ast.child_at(node_idx, 0) {
            Some(c) => self.check_expression(c),
            None => Type::Error,
        };
        if operand.is_error() {
            return Type::Error;
        }
        if operand.is_numeric() {
            return operand;
        }
        self.record_error(
            format!(
                "Unary '{}' requires a numeric operand, found '{}'",
                symbol, operand
            ),
            node_idx,
        );
        Type::Error
    }

    fn check_logical(&mut self, node_idx: usize) -> Type {
        let symbol = operator_symbol(self.node_type(node_idx));
        let (left, right) = self.binary_operand_types(node_idx);
        if left.is_error() || right.is_error() {
            return Type::Error;
        }
        if left == Type::Boolean && right == Type::Boolean {
            return Type::Boolean;
        }
        self.record_error(
            format!(
                "Logical operator '{}' requires boolean operands, found '{}' and '{}'",
                symbol, left, right
            ),
            node_idx,
        );
        Type::Error
    }

    /// Equality accepts identical types, mixed numerics, and comparisons
    /// against null
    fn check_equality(&mut self, node_idx: usize) -> Type {
        let symbol = operator_symbol(self.node_type(node_idx));
        let (left, right) = self.binary_operand_types(node_idx);
        if left.is_error() || right.is_error() {
            return Type::Error;
        }
        let comparable = left == right
            || (left.is_numeric() && right.is_numeric())
            || left == Type::Null
            || right == Type::Null;
        if comparable {
            return Type::Boolean;
        }
        self.record_error(
            format!(
                "Comparison '{}' between incompatible types '{}' and '{}'",
                symbol, left, right
            ),
            node_idx,
        );
        Type::Error
    }

    // Relational operators are numeric-only; strings do not order
    fn check_relational(&mut self, node_idx: usize) -> Type {
        let symbol = operator_symbol(self.node_type(node_idx));
        let (left, right) = self.binary_operand_types(node_idx);
        if left.is_error() || right.is_error() {
            return Type::Error;
        }
        if left.is_numeric() && right.is_numeric() {
            return Type::Boolean;
        }
        self.record_error(
            format!(
                "Comparison '{}' between incompatible types '{}' and '{}'",
                symbol, left, right
            ),
            node_idx,
        );
        Type::Error
    }

    /// Arithmetic promotes numerics; '+' with a string operand concatenates
    fn check_arithmetic(&mut self, node_idx: usize) -> Type {
        let node_type = self.node_type(node_idx);
        let symbol = operator_symbol(node_type);
        let (left, right) = self.binary_operand_types(node_idx);
        if left.is_error() || right.is_error() {
            return Type::Error;
        }
        if node_type == NodeType::Add && (left == Type::Str || right == Type::Str) {
            return Type::Str;
        }
        if left.is_numeric() && right.is_numeric() {
            return Type::common_numeric(&left, &right);
        }
        self.record_error(
            format!(
                "Arithmetic operator '{}' requires numeric operands, found '{}' and '{}'",
                symbol, left, right
            ),
            node_idx,
        );
        Type::Error
    }

    /// `c ? a : b` requires a boolean condition; the result is the common
    /// numeric type, a string when one arm is a string, or the arms' shared
    /// type
    fn check_ternary(&mut self, node_idx: usize) -> Type {
        let children = self.child_indices(node_idx);
        let (Some(&cond_idx), Some(&then_idx), Some(&else_idx)) =
            (children.first(), children.get(1), children.get(2))
        else {
            return Type::Error;
        };

        let cond_ty = self.check_expression(cond_idx);
        if cond_ty != Type::Boolean && !cond_ty.is_error() {
            self.record_error(
                format!("Condition of '?:' must be a 'boolean', found '{}'", cond_ty),
                cond_idx,
            );
        }

        let then_ty = self.check_expression(then_idx);
        let else_ty = self.check_expression(else_idx);
        if then_ty.is_error() || else_ty.is_error() {
            return Type::Error;
        }
        if then_ty.is_numeric() && else_ty.is_numeric() {
            return Type::common_numeric(&then_ty, &else_ty);
        }
        if then_ty == Type::Str || else_ty == Type::Str {
            return Type::Str;
        }
        if then_ty == else_ty {
            return then_ty;
        }
        self.record_error(
            format!(
                "Branches of '?:' have incompatible types '{}' and '{}'",
                then_ty, else_ty
            ),
            node_idx,
        );
        Type::Error
    }

    /// All elements of a list literal must share one type. The empty literal
    /// types as an array of the error sentinel, which any array annotation
    /// accepts.
    fn check_array_literal(&mut self, node_idx: usize) -> Type {
        let elements = self.child_indices(node_idx);
        if elements.is_empty() {
            return Type::array(Type::Error);
        }

        let element_types: Vec<Type> = elements
            .iter()
            .map(|&e| self.check_expression(e))
            .collect();

        let Some(base) = element_types.iter().find(|t| !t.is_error()).cloned() else {
            return Type::array(Type::Error);
        };
        let uniform = element_types
            .iter()
            .all(|t| t.is_error() || *t == base);
        if !uniform {
            self.record_error(
                "List elements must all be of the same type".to_string(),
                node_idx,
            );
            return Type::array(Type::Error);
        }
        Type::array(base)
    }
}
