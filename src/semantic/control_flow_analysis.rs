// Statement-level control flow: boolean conditions, loop bookkeeping for
// break/continue, the scopes opened by for/foreach/catch regions, and the
// subtree visits of switch and try-catch.

use super::{SemanticAnalyzer, Type, VariableSymbol};
use crate::ast::NodeType;

impl SemanticAnalyzer {
    /// Requires a boolean condition; an error-typed condition was already
    /// reported and stays silent
    fn check_condition(&mut self, cond_idx: usize, construct: &str) {
        let ty = self.check_expression(cond_idx);
        if ty != Type::Boolean && !ty.is_error() {
            self.record_error(
                format!(
                    "Condition of '{}' must be a 'boolean', found '{}'",
                    construct, ty
                ),
                cond_idx,
            );
        }
    }

    /// Visits a loop body with the loop depth raised
    fn visit_loop_body(&mut self, body_idx: usize) {
        self.loop_depth += 1;
        self.visit_statement(body_idx);
        self.loop_depth -= 1;
    }

    pub(super) fn visit_if_stmt(&mut self, node_idx: usize) {
        let children = self.child_indices(node_idx);
        if let Some(&cond_idx) = children.first() {
            self.check_condition(cond_idx, "if");
        }
        for &branch_idx in children.iter().skip(1) {
            self.visit_statement(branch_idx);
        }
    }

    pub(super) fn visit_while_stmt(&mut self, node_idx: usize) {
        let children = self.child_indices(node_idx);
        if let Some(&cond_idx) = children.first() {
            self.check_condition(cond_idx, "while");
        }
        if let Some(&body_idx) = children.get(1) {
            self.visit_loop_body(body_idx);
        }
    }

    pub(super) fn visit_do_while_stmt(&mut self, node_idx: usize) {
        // Children are body first, condition second
        let children = self.child_indices(node_idx);
        if let Some(&body_idx) = children.first() {
            self.visit_loop_body(body_idx);
        }
        if let Some(&cond_idx) = children.get(1) {
            self.check_condition(cond_idx, "do-while");
        }
    }

    /// `for` opens one scope spanning init, condition, update, and body
    pub(super) fn visit_for_stmt(&mut self, node_idx: usize) {
        self.symbols.enter_scope();

        for child_idx in self.child_indices(node_idx) {
            match self.node_type(child_idx) {
                NodeType::ForInit => {
                    if let Some(init_idx) = self.ast.child_at(child_idx, 0) {
                        if self.node_type(init_idx) == NodeType::VarDecl {
                            self.visit_statement(init_idx);
                        } else {
                            self.check_expression(init_idx);
                        }
                    }
                }
                NodeType::ForCondition => {
                    if let Some(cond_idx) = self.ast.child_at(child_idx, 0) {
                        self.check_condition(cond_idx, "for");
                    }
                }
                NodeType::ForUpdate => {
                    if let Some(update_idx) = self.ast.child_at(child_idx, 0) {
                        self.check_expression(update_idx);
                    }
                }
                _ => self.visit_loop_body(child_idx),
            }
        }

        self.symbols.exit_scope();
    }

    /// `foreach (id in expr)` requires an array and binds the loop variable
    /// to its element type in a fresh scope
    pub(super) fn visit_foreach_stmt(&mut self, node_idx: usize) {
        let children = self.child_indices(node_idx);
        let (Some(&binding_idx), Some(&iterable_idx), Some(&body_idx)) =
            (children.first(), children.get(1), children.get(2))
        else {
            return;
        };

        self.symbols.enter_scope();

        let iterable_ty = self.check_expression(iterable_idx);
        let element_ty = match iterable_ty {
            Type::Array(element) => *element,
            Type::Error => Type::Error,
            other => {
                self.record_error(
                    format!("Foreach requires an array, found '{}'", other),
                    iterable_idx,
                );
                Type::Error
            }
        };

        let name = self.ast.node_text(binding_idx).to_string();
        self.symbols.define_variable(VariableSymbol {
            name,
            ty: element_ty,
            is_const: false,
        });

        self.visit_loop_body(body_idx);
        self.symbols.exit_scope();
    }

    /// `break` / `continue` must sit inside a loop body
    pub(super) fn visit_jump_stmt(&mut self, node_idx: usize, keyword: &str) {
        if self.loop_depth == 0 {
            self.record_error(
                format!("'{}' used outside of a loop", keyword),
                node_idx,
            );
        }
    }

    /// The scrutinee and every case expression and arm statement are visited
    /// for their own diagnostics
    pub(super) fn visit_switch_stmt(&mut self, node_idx: usize) {
        for child_idx in self.child_indices(node_idx) {
            match self.node_type(child_idx) {
                NodeType::SwitchCase => {
                    let arm = self.child_indices(child_idx);
                    if let Some(&case_expr_idx) = arm.first() {
                        self.check_expression(case_expr_idx);
                    }
                    for &stmt_idx in arm.iter().skip(1) {
                        self.visit_statement(stmt_idx);
                    }
                }
                NodeType::DefaultCase => {
                    for stmt_idx in self.child_indices(child_idx) {
                        self.visit_statement(stmt_idx);
                    }
                }
                _ => {
                    // The scrutinee expression
                    self.check_expression(child_idx);
                }
            }
        }
    }

    /// The catch region opens a scope binding the caught value as a string
    pub(super) fn visit_try_catch_stmt(&mut self, node_idx: usize) {
        let children = self.child_indices(node_idx);
        let (Some(&try_idx), Some(&binding_idx), Some(&catch_idx)) =
            (children.first(), children.get(1), children.get(2))
        else {
            return;
        };

        self.visit_statement(try_idx);

        self.symbols.enter_scope();
        let name = self.ast.node_text(binding_idx).to_string();
        self.symbols.define_variable(VariableSymbol {
            name,
            ty: Type::Str,
            is_const: false,
        });
        self.visit_statement(catch_idx);
        self.symbols.exit_scope();
    }
}
