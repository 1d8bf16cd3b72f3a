use std::collections::HashMap;

use log::debug;

mod assignment_type_checking;
mod class_type_definition;
mod control_flow_analysis;
mod expression_type_inference;
mod function_call_type_checking;
mod function_type_checking;
mod name_resolution;
mod property_access_type_checking;
mod symbol_table;
mod types;

pub use symbol_table::{
    ClassSymbol, FunctionSymbol, Member, Param, Symbol, SymbolTable, VariableSymbol,
    CONSTRUCTOR_MEMBER,
};
pub use types::Type;

use crate::ast::{Ast, NodeType};

/// Represents a semantic analysis error
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl SemanticError {
    pub fn new(message: String, line: usize, column: usize) -> Self {
        SemanticError {
            message,
            line,
            column,
        }
    }
}

impl std::fmt::Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Semantic error at {}:{}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for SemanticError {}

/// The outcome of a full analysis: every collected diagnostic plus the final
/// symbol table (all scope frames, functions, and classes)
#[derive(Debug)]
pub struct Analysis {
    pub errors: Vec<SemanticError>,
    pub symbols: SymbolTable,
}

impl Analysis {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Main semantic analyzer: walks the parse tree once, binding declarations,
/// typing every expression, and collecting diagnostics.
///
/// Diagnostics are never fatal. After reporting, checking continues with the
/// absorbing `<error>` type so one mistake produces one message.
pub struct SemanticAnalyzer {
    ast: Ast,
    symbols: SymbolTable,
    errors: Vec<SemanticError>,
    /// Computed type of every visited expression node
    node_types: HashMap<usize, Type>,

    // Context state, maintained with save/restore discipline at every
    // entry/exit point
    loop_depth: usize,
    /// Return types of the lexically enclosing functions, innermost last
    return_types: Vec<Type>,
    saw_return: bool,
    current_class: Option<String>,
    in_method: bool,
    in_constructor: bool,
}

impl SemanticAnalyzer {
    /// Creates a new semantic analyzer over the given parse tree
    pub fn new(ast: Ast) -> Self {
        SemanticAnalyzer {
            ast,
            symbols: SymbolTable::new(),
            errors: Vec::new(),
            node_types: HashMap::new(),
            loop_depth: 0,
            return_types: Vec::new(),
            saw_return: false,
            current_class: None,
            in_method: false,
            in_constructor: false,
        }
    }

    /// Performs semantic analysis on the whole tree
    ///
    /// Always runs to completion; the result carries every diagnostic found
    /// plus the final symbol table.
    pub fn analyze(mut self) -> Analysis {
        debug!(
            "starting semantic analysis over {} parse-tree nodes",
            self.ast.nodes.len()
        );

        if let Some(root_idx) = self.ast.root {
            // Program statements run in the global scope, in order
            for stmt_idx in self.child_indices(root_idx) {
                self.visit_statement(stmt_idx);
            }
        }

        debug!(
            "semantic analysis complete: {} diagnostic(s), scope depth {}",
            self.errors.len(),
            self.symbols.depth()
        );

        Analysis {
            errors: self.errors,
            symbols: self.symbols,
        }
    }

    /// Records a semantic error at the position of the given node
    fn record_error(&mut self, message: String, node_idx: usize) {
        let (line, column) = self.ast.position(node_idx);
        self.errors.push(SemanticError::new(message, line, column));
    }

    fn node_type(&self, idx: usize) -> NodeType {
        self.ast.nodes[idx].node_type
    }

    /// Direct children, collected so the tree can be walked while `self`
    /// is borrowed mutably
    fn child_indices(&self, idx: usize) -> Vec<usize> {
        self.ast.children(idx).collect()
    }

    fn set_node_type(&mut self, node_idx: usize, ty: Type) {
        self.node_types.insert(node_idx, ty);
    }

    /// Visits a statement node and dispatches to the appropriate checker
    fn visit_statement(&mut self, node_idx: usize) {
        match self.node_type(node_idx) {
            NodeType::Block => self.visit_block(node_idx),
            NodeType::VarDecl => self.visit_var_decl(node_idx, false),
            NodeType::ConstDecl => self.visit_var_decl(node_idx, true),
            NodeType::FunctionDecl => self.visit_function_decl(node_idx),
            NodeType::ClassDecl => self.visit_class_decl(node_idx),
            NodeType::ExprStmt | NodeType::PrintStmt => {
                if let Some(expr_idx) = self.ast.child_at(node_idx, 0) {
                    self.check_expression(expr_idx);
                }
            }
            NodeType::IfStmt => self.visit_if_stmt(node_idx),
            NodeType::WhileStmt => self.visit_while_stmt(node_idx),
            NodeType::DoWhileStmt => self.visit_do_while_stmt(node_idx),
            NodeType::ForStmt => self.visit_for_stmt(node_idx),
            NodeType::ForeachStmt => self.visit_foreach_stmt(node_idx),
            NodeType::BreakStmt => self.visit_jump_stmt(node_idx, "break"),
            NodeType::ContinueStmt => self.visit_jump_stmt(node_idx, "continue"),
            NodeType::ReturnStmt => self.visit_return_stmt(node_idx),
            NodeType::TryCatchStmt => self.visit_try_catch_stmt(node_idx),
            NodeType::SwitchStmt => self.visit_switch_stmt(node_idx),
            // Anything else in statement position is a bare expression
            _ => {
                self.check_expression(node_idx);
            }
        }
    }

    /// Visits a block: a fresh scope around its statements
    fn visit_block(&mut self, node_idx: usize) {
        self.symbols.enter_scope();
        for stmt_idx in self.child_indices(node_idx) {
            self.visit_statement(stmt_idx);
        }
        self.symbols.exit_scope();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::limits::CompilerLimits;
    use crate::parser::parse;

    /// Helper function to analyze source code
    fn analyze_source(source: &str) -> Analysis {
        let limits = CompilerLimits::default();
        let tokens = lex(source, &limits).unwrap();
        let ast = parse(source.to_string(), tokens, &limits).unwrap();
        SemanticAnalyzer::new(ast).analyze()
    }

    #[test]
    fn test_empty_program() {
        let analysis = analyze_source("");
        assert!(analysis.is_clean());
        // Only the global frame plus the registry headers appear in the dump
        assert_eq!(
            analysis.symbols.export_lines(),
            vec!["[global]", "[functions]", "[classes]"]
        );
    }

    #[test]
    fn test_scope_depth_restored_after_analysis() {
        let analysis = analyze_source(
            "{ let a = 1; { let b = 2; } } function f() { } class C { function m() { } }",
        );
        assert_eq!(analysis.symbols.depth(), 0);
    }

    #[test]
    fn test_shadowing_across_blocks() {
        let analysis = analyze_source(
            "{ let x: integer = 1; { let x: integer = 2; print(x); } print(x); }",
        );
        assert!(
            analysis.is_clean(),
            "shadowing should be legal: {:?}",
            analysis.errors
        );
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let source = "let a: integer = \"x\"; b = 2; print(c);";
        let first = analyze_source(source);
        let second = analyze_source(source);
        assert_eq!(first.errors, second.errors);
        assert!(!first.errors.is_empty());
    }

    #[test]
    fn test_diagnostic_positions_are_valid() {
        let analysis = analyze_source("let a = b;\n  c = 1;");
        assert!(!analysis.errors.is_empty());
        for error in &analysis.errors {
            assert!(error.line >= 1);
            assert!(error.column >= 1);
        }
    }

    #[test]
    fn test_error_display_format() {
        let error = SemanticError::new("Undeclared variable 'x'".to_string(), 3, 7);
        assert_eq!(
            error.to_string(),
            "Semantic error at 3:7: Undeclared variable 'x'"
        );
    }

    #[test]
    fn test_statements_visited_in_order() {
        // Both statements are wrong; diagnostics come out in source order
        let analysis = analyze_source("let a: integer = \"x\";\nlet b: string = 1;");
        assert_eq!(analysis.errors.len(), 2);
        assert!(analysis.errors[0].line < analysis.errors[1].line);
    }
}
