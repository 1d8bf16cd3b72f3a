// Property and index suffixes on left-hand-side chains.
//
// Property access requires an object receiver and resolves the member
// through the inheritance chain: a field yields its type, a method yields a
// pending callee for the next call suffix. Indexing requires an array
// receiver and an integer index and yields the element type.

use super::function_call_type_checking::Callee;
use super::{Member, SemanticAnalyzer, Type};

impl SemanticAnalyzer {
    /// `receiver.name`
    pub(super) fn check_property_access(&mut self, node_idx: usize) -> (Type, Option<Callee>) {
        let children = self.child_indices(node_idx);
        let (Some(&receiver_idx), Some(&name_idx)) = (children.first(), children.get(1)) else {
            return (Type::Error, None);
        };

        let (receiver_ty, receiver_callee) = self.check_chain(receiver_idx);
        if let Some(callee) = receiver_callee {
            self.report_callee_as_value(&callee, receiver_idx);
            return (Type::Error, None);
        }

        let name = self.ast.node_text(name_idx).to_string();
        let class = match receiver_ty {
            Type::Error => return (Type::Error, None),
            Type::Object(class) => class,
            other => {
                self.record_error(
                    format!(
                        "Cannot access property '{}' on non-object type '{}'",
                        name, other
                    ),
                    node_idx,
                );
                return (Type::Error, None);
            }
        };

        match self.symbols.resolve_member(&class, &name).cloned() {
            Some(Member::Field { ty, .. }) => (ty, None),
            Some(Member::Method {
                name,
                params,
                return_type,
            }) => {
                let signature = super::FunctionSymbol {
                    name,
                    params,
                    return_type,
                };
                (Type::Error, Some(Callee::Method { class, signature }))
            }
            None => {
                self.record_error(
                    format!("Unknown property '{}' on type '{}'", name, class),
                    name_idx,
                );
                (Type::Error, None)
            }
        }
    }

    /// `receiver[index]`
    pub(super) fn check_index(&mut self, node_idx: usize) -> (Type, Option<Callee>) {
        let children = self.child_indices(node_idx);
        let (Some(&receiver_idx), Some(&index_idx)) = (children.first(), children.get(1)) else {
            return (Type::Error, None);
        };

        let (receiver_ty, receiver_callee) = self.check_chain(receiver_idx);
        let receiver_ty = if let Some(callee) = receiver_callee {
            self.report_callee_as_value(&callee, receiver_idx);
            Type::Error
        } else {
            receiver_ty
        };

        let index_ty = self.check_expression(index_idx);
        if index_ty != Type::Integer && !index_ty.is_error() {
            self.record_error(
                format!("List index must be an 'integer', found '{}'", index_ty),
                index_idx,
            );
        }

        match receiver_ty {
            Type::Error => (Type::Error, None),
            Type::Array(element_ty) => (*element_ty, None),
            other => {
                self.record_error(
                    format!("Cannot index a value of non-array type '{}'", other),
                    node_idx,
                );
                (Type::Error, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Analysis, SemanticAnalyzer};
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

    // ========== Property Access ==========

    #[test]
    fn test_field_access() {
        let analysis = analyze_source(
            "class P { var name: string; } let p: P = new P(); let n: string = p.name;",
        );
        assert!(analysis.is_clean(), "{:?}", analysis.errors);
    }

    #[test]
    fn test_inherited_field_access() {
        let analysis = analyze_source(
            "class A { var n: integer; } class B : A { } \
             let b: B = new B(); let x: integer = b.n;",
        );
        assert!(analysis.is_clean(), "{:?}", analysis.errors);
    }

    #[test]
    fn test_unknown_member() {
        let analysis = analyze_source(
            "class P { } let p: P = new P(); let x = p.ghost;",
        );
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.errors[0].message.contains("Unknown property 'ghost'"));
    }

    #[test]
    fn test_property_on_non_object() {
        let analysis = analyze_source("let n: integer = 1; let x = n.field;");
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.errors[0].message.contains("non-object"));
    }

    #[test]
    fn test_property_on_error_is_absorbed() {
        // The undeclared receiver reports once; the property access on the
        // resulting error type stays silent
        let analysis = analyze_source("let x = ghost.field;");
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.errors[0].message.contains("Undeclared"));
    }

    #[test]
    fn test_chained_field_access() {
        let analysis = analyze_source(
            "class Inner { var n: integer; } \
             class Outer { var inner: Inner; } \
             let o: Outer = new Outer(); let x: integer = o.inner.n;",
        );
        assert!(analysis.is_clean(), "{:?}", analysis.errors);
    }

    // ========== Indexing ==========

    #[test]
    fn test_index_yields_element_type() {
        let analysis = analyze_source(
            "let xs: integer[] = [1, 2, 3]; let a: integer = xs[0];",
        );
        assert!(analysis.is_clean(), "{:?}", analysis.errors);
    }

    #[test]
    fn test_nested_index() {
        let analysis = analyze_source(
            "let m: integer[][] = [[1], [2]]; let row: integer[] = m[0]; let v: integer = m[0][1];",
        );
        assert!(analysis.is_clean(), "{:?}", analysis.errors);
    }

    #[test]
    fn test_index_must_be_integer() {
        let analysis = analyze_source(
            "let xs: integer[] = [1, 2, 3]; let a = xs[\"0\"];",
        );
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.errors[0].message.contains("index must be an 'integer'"));
    }

    #[test]
    fn test_index_on_non_array() {
        let analysis = analyze_source("let s: string = \"x\"; let c = s[0];");
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.errors[0].message.contains("non-array"));
    }

    #[test]
    fn test_index_on_call_result() {
        let analysis = analyze_source(
            "function rows(): integer[] { return [1, 2]; } let x: integer = rows()[0];",
        );
        assert!(analysis.is_clean(), "{:?}", analysis.errors);
    }
}
