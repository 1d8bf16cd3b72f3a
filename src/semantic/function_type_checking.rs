// Function declarations and return discipline.
//
// A declaration registers its signature globally, then checks its body in a
// fresh scope holding the parameters. A per-function flag records whether
// any return statement was seen; a non-void function whose body never
// returns is reported at the declaration. This is deliberately the weakest
// return-coverage property; there is no path-sensitive analysis.

use super::{FunctionSymbol, Param, SemanticAnalyzer, Type, VariableSymbol};

/// What kind of body is being checked; decides the 'this' binding and the
/// constructor flag
#[derive(Clone, Copy, PartialEq)]
pub(super) enum FunctionKind {
    Function,
    Method,
    Constructor,
}

impl SemanticAnalyzer {
    /// Visits a top-level (or nested) function declaration
    pub(super) fn visit_function_decl(&mut self, node_idx: usize) {
        let view = self.ast.function_decl(node_idx);
        let Some(name_idx) = view.name_idx() else {
            return;
        };
        let param_idxs = view.params();
        let return_type_idx = view.return_type_idx();
        let name = self.ast.node_text(name_idx).to_string();

        let params = self.collect_params(&param_idxs);
        let return_type = match return_type_idx {
            Some(type_idx) => self.resolve_type_node(type_idx),
            None => Type::Void,
        };

        let symbol = FunctionSymbol {
            name: name.clone(),
            params: params.clone(),
            return_type: return_type.clone(),
        };
        if !self.symbols.define_function(symbol) {
            self.record_error(format!("Function '{}' is already defined", name), name_idx);
        }

        self.check_function_body(node_idx, &params, &return_type, FunctionKind::Function);
    }

    /// Resolves the parameter list of a function, method, or constructor.
    /// A parameter without an annotation gets the error sentinel, which
    /// absorbs later argument checks.
    pub(super) fn collect_params(&mut self, param_idxs: &[usize]) -> Vec<Param> {
        let mut params = Vec::with_capacity(param_idxs.len());
        for &param_idx in param_idxs {
            let Some(name_idx) = self.ast.child_at(param_idx, 0) else {
                continue;
            };
            let name = self.ast.node_text(name_idx).to_string();
            let ty = match self.ast.child_at(param_idx, 1) {
                Some(type_idx) => self.resolve_type_node(type_idx),
                None => Type::Error,
            };
            params.push(Param { name, ty });
        }
        params
    }

    /// Checks a function, method, or constructor body: a fresh scope with
    /// the parameters (and 'this' for class members), the return-type stack,
    /// and the saw-return flag, all restored on exit
    pub(super) fn check_function_body(
        &mut self,
        decl_idx: usize,
        params: &[Param],
        return_type: &Type,
        kind: FunctionKind,
    ) {
        let Some(body_idx) = self.ast.function_decl(decl_idx).body_idx() else {
            return;
        };

        self.symbols.enter_scope();

        if kind != FunctionKind::Function {
            if let Some(class_name) = self.current_class.clone() {
                // 'this' is a read-only binding of the receiver
                self.symbols.define_variable(VariableSymbol {
                    name: "this".to_string(),
                    ty: Type::Object(class_name),
                    is_const: true,
                });
            }
        }

        for param in params {
            let symbol = VariableSymbol {
                name: param.name.clone(),
                ty: param.ty.clone(),
                is_const: false,
            };
            if !self.symbols.define_variable(symbol) {
                self.record_error(format!("Duplicate parameter '{}'", param.name), decl_idx);
            }
        }

        let saved_saw_return = self.saw_return;
        let saved_in_method = self.in_method;
        let saved_in_constructor = self.in_constructor;
        self.saw_return = false;
        self.in_method = kind != FunctionKind::Function;
        self.in_constructor = kind == FunctionKind::Constructor;
        self.return_types.push(return_type.clone());

        self.visit_block(body_idx);

        self.return_types.pop();
        if *return_type != Type::Void && !return_type.is_error() && !self.saw_return {
            let name = self
                .ast
                .function_decl(decl_idx)
                .name()
                .unwrap_or("<unknown>")
                .to_string();
            self.record_error(
                format!("Function '{}' must return on all paths", name),
                decl_idx,
            );
        }
        self.saw_return = saved_saw_return;
        self.in_method = saved_in_method;
        self.in_constructor = saved_in_constructor;

        self.symbols.exit_scope();
    }

    /// Visits a return statement against the innermost enclosing function
    pub(super) fn visit_return_stmt(&mut self, node_idx: usize) {
        let value_idx = self.ast.child_at(node_idx, 0);

        let Some(expected) = self.return_types.last().cloned() else {
            if let Some(expr_idx) = value_idx {
                self.check_expression(expr_idx);
            }
            self.record_error("'return' used outside of a function".to_string(), node_idx);
            return;
        };

        self.saw_return = true;

        match value_idx {
            Some(expr_idx) => {
                let value_ty = self.check_expression(expr_idx);
                if expected == Type::Void {
                    let message = if self.in_constructor {
                        "Cannot return a value from a constructor"
                    } else {
                        "Cannot return a value from a void function"
                    };
                    self.record_error(message.to_string(), node_idx);
                } else if !self.symbols.is_assignable(&expected, &value_ty) {
                    self.record_error(
                        format!(
                            "Cannot return a value of type '{}' from a function returning '{}'",
                            value_ty, expected
                        ),
                        expr_idx,
                    );
                }
            }
            None => {
                if expected != Type::Void && !expected.is_error() {
                    self.record_error(
                        format!("Return without a value in a function returning '{}'", expected),
                        node_idx,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Analysis, SemanticAnalyzer, Type};
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

    // ========== Declarations ==========

    #[test]
    fn test_function_registered() {
        let analysis = analyze_source("function f(a: integer): string { return \"x\"; }");
        assert!(analysis.is_clean(), "{:?}", analysis.errors);
        let func = analysis.symbols.resolve_function("f").unwrap();
        assert_eq!(func.params.len(), 1);
        assert_eq!(func.return_type, Type::Str);
    }

    #[test]
    fn test_return_type_defaults_to_void() {
        let analysis = analyze_source("function f() { }");
        assert!(analysis.is_clean());
        assert_eq!(
            analysis.symbols.resolve_function("f").unwrap().return_type,
            Type::Void
        );
    }

    #[test]
    fn test_duplicate_function() {
        let analysis = analyze_source("function f() { } function f() { }");
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.errors[0].message.contains("already defined"));
    }

    #[test]
    fn test_duplicate_parameter() {
        let analysis = analyze_source("function f(a: integer, a: string) { }");
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.errors[0].message.contains("Duplicate parameter 'a'"));
    }

    #[test]
    fn test_parameters_visible_in_body() {
        let analysis = analyze_source(
            "function f(a: integer): integer { return a + 1; }",
        );
        assert!(analysis.is_clean(), "{:?}", analysis.errors);
    }

    #[test]
    fn test_body_may_shadow_parameter() {
        let analysis = analyze_source(
            "function f(a: integer) { let a: string = \"x\"; print(a); }",
        );
        assert!(analysis.is_clean(), "{:?}", analysis.errors);
    }

    #[test]
    fn test_recursive_function() {
        let analysis = analyze_source(
            "function fact(n: integer): integer { \
               return n < 2 ? 1 : n * fact(n - 1); \
             }",
        );
        assert!(analysis.is_clean(), "{:?}", analysis.errors);
    }

    // ========== Return Coverage ==========

    #[test]
    fn test_missing_return() {
        let analysis = analyze_source("function f(x: integer): integer { }");
        assert_eq!(analysis.errors.len(), 1);
        assert!(
            analysis.errors[0]
                .message
                .contains("Function 'f' must return on all paths")
        );
    }

    #[test]
    fn test_return_inside_branch_counts() {
        // Weakest property: a return anywhere in the body satisfies it
        let analysis = analyze_source(
            "function f(x: integer): integer { if (x > 0) { return 1; } }",
        );
        assert!(analysis.is_clean(), "{:?}", analysis.errors);
    }

    #[test]
    fn test_void_function_needs_no_return() {
        let analysis = analyze_source("function f() { print(1); }");
        assert!(analysis.is_clean());
    }

    // ========== Return Typing ==========

    #[test]
    fn test_return_type_mismatch() {
        let analysis = analyze_source(
            "function f(): integer { return \"x\"; }",
        );
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.errors[0].message.contains("Cannot return"));
    }

    #[test]
    fn test_return_widening() {
        let analysis = analyze_source("function f(): float { return 1; }");
        assert!(analysis.is_clean(), "{:?}", analysis.errors);
    }

    #[test]
    fn test_return_value_in_void_function() {
        let analysis = analyze_source("function f() { return 1; }");
        assert_eq!(analysis.errors.len(), 1);
        assert!(
            analysis.errors[0]
                .message
                .contains("Cannot return a value from a void function")
        );
    }

    #[test]
    fn test_bare_return_in_typed_function() {
        let analysis = analyze_source("function f(): integer { return; }");
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.errors[0].message.contains("Return without a value"));
    }

    #[test]
    fn test_return_outside_function() {
        let analysis = analyze_source("return 1;");
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.errors[0].message.contains("outside of a function"));
    }

    #[test]
    fn test_nested_function_return_types_are_independent() {
        let analysis = analyze_source(
            "function outer(): integer { \
               function inner(): string { return \"s\"; } \
               return 1; \
             }",
        );
        assert!(analysis.is_clean(), "{:?}", analysis.errors);
    }

    #[test]
    fn test_nested_function_missing_return_is_local() {
        let analysis = analyze_source(
            "function outer(): integer { \
               function inner(): string { } \
               return 1; \
             }",
        );
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.errors[0].message.contains("'inner'"));
    }
}
