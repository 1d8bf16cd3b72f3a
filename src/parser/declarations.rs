use super::{ParseError, Parser};
use crate::ast::NodeType;
use crate::lexer::TokenKind;

// Declaration parsing methods
impl<'a> Parser<'a> {
    /// Parse a variable or constant declaration:
    /// ('let' | 'var' | 'const') Identifier (':' type)? ('=' expression)? ';'
    ///
    /// A 'const' without initializer parses fine; the analyzer rejects it.
    pub(super) fn parse_var_decl(
        &mut self,
        depth: usize,
        is_const: bool,
    ) -> Result<usize, ParseError> {
        self.check_depth(depth)?;

        let node_type = if is_const {
            NodeType::ConstDecl
        } else {
            NodeType::VarDecl
        };
        let decl_idx = self.new_node(node_type)?;
        self.advance(); // 'let' / 'var' / 'const'

        let name_idx = self.expect_identifier("variable name")?;
        self.ast.add_child(decl_idx, name_idx);

        if self.current_kind() == TokenKind::Colon {
            let annotation_idx = self.new_node(NodeType::TypeAnnotation)?;
            self.advance(); // ':'
            let type_idx = self.parse_type()?;
            self.ast.add_child(annotation_idx, type_idx);
            self.ast.add_child(decl_idx, annotation_idx);
        }

        if self.current_kind() == TokenKind::Equal {
            let initializer_idx = self.new_node(NodeType::Initializer)?;
            self.advance(); // '='
            let expr_idx = self.parse_expression(depth + 1)?;
            self.ast.add_child(initializer_idx, expr_idx);
            self.ast.add_child(decl_idx, initializer_idx);
        }

        self.consume(TokenKind::Semicolon, "';'")?;
        Ok(decl_idx)
    }

    /// Parse a function declaration:
    /// 'function' Identifier '(' parameters? ')' (':' type)? block
    ///
    /// Also used for methods and constructors inside a class body.
    pub(super) fn parse_function_decl(&mut self, depth: usize) -> Result<usize, ParseError> {
        self.check_depth(depth)?;

        let decl_idx = self.new_node(NodeType::FunctionDecl)?;
        self.advance(); // 'function'

        let name_idx = self.expect_identifier("function name")?;
        self.ast.add_child(decl_idx, name_idx);

        let params_idx = self.parse_parameters()?;
        self.ast.add_child(decl_idx, params_idx);

        if self.current_kind() == TokenKind::Colon {
            let clause_idx = self.new_node(NodeType::ReturnClause)?;
            self.advance(); // ':'
            let type_idx = self.parse_type()?;
            self.ast.add_child(clause_idx, type_idx);
            self.ast.add_child(decl_idx, clause_idx);
        }

        let body_idx = self.parse_block(depth + 1)?;
        self.ast.add_child(decl_idx, body_idx);
        Ok(decl_idx)
    }

    /// Parse a parameter list: '(' (parameter (',' parameter)*)? ')'
    /// where parameter := Identifier (':' type)?
    fn parse_parameters(&mut self) -> Result<usize, ParseError> {
        let list_idx = self.new_node(NodeType::ParamList)?;
        self.consume(TokenKind::LParen, "'('")?;

        if self.current_kind() != TokenKind::RParen {
            loop {
                let param_idx = self.new_node(NodeType::Param)?;
                let name_idx = self.expect_identifier("parameter name")?;
                self.ast.add_child(param_idx, name_idx);

                if self.eat(TokenKind::Colon) {
                    let type_idx = self.parse_type()?;
                    self.ast.add_child(param_idx, type_idx);
                }
                self.ast.add_child(list_idx, param_idx);

                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenKind::RParen, "')'")?;
        Ok(list_idx)
    }

    /// Parse a class declaration:
    /// 'class' Identifier (':' Identifier)? '{' member* '}'
    /// where member := variable, constant, or function declaration
    pub(super) fn parse_class_decl(&mut self, depth: usize) -> Result<usize, ParseError> {
        self.check_depth(depth)?;

        let decl_idx = self.new_node(NodeType::ClassDecl)?;
        self.advance(); // 'class'

        let name_idx = self.expect_identifier("class name")?;
        self.ast.add_child(decl_idx, name_idx);

        if self.eat(TokenKind::Colon) {
            if self.current_kind() != TokenKind::Identifier {
                return Err(ParseError::unexpected_token(
                    "base class name",
                    self.current_token(),
                    &self.ast.source,
                ));
            }
            let base_idx = self.new_node(NodeType::BaseClause)?;
            self.advance();
            self.ast.add_child(decl_idx, base_idx);
        }

        self.consume(TokenKind::LBrace, "'{'")?;
        while self.current_kind() != TokenKind::RBrace && self.current_kind() != TokenKind::Eof {
            let member_idx = match self.current_kind() {
                TokenKind::Let | TokenKind::Var => self.parse_var_decl(depth + 1, false)?,
                TokenKind::Const => self.parse_var_decl(depth + 1, true)?,
                TokenKind::Function => self.parse_function_decl(depth + 1)?,
                _ => {
                    return Err(ParseError::unexpected_token(
                        "class member declaration",
                        self.current_token(),
                        &self.ast.source,
                    ));
                }
            };
            self.ast.add_child(decl_idx, member_idx);
        }
        self.consume(TokenKind::RBrace, "'}'")?;

        Ok(decl_idx)
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use crate::ast::NodeType;
    use crate::lexer::lex;
    use crate::limits::CompilerLimits;

    fn to_ast(source: &str) -> Result<crate::ast::Ast, super::ParseError> {
        let limits = CompilerLimits::default();
        let tokens = lex(source, &limits).unwrap();
        parse(source.to_string(), tokens, &limits)
    }

    #[test]
    fn test_var_decl_full() {
        let ast = to_ast("let x: integer = 1;").unwrap();
        let decl = ast.child_at(ast.root.unwrap(), 0).unwrap();
        let view = ast.var_decl(decl);
        assert_eq!(view.name(), Some("x"));
        assert!(view.annotation_idx().is_some());
        assert!(view.initializer_idx().is_some());
    }

    #[test]
    fn test_var_decl_bare() {
        let ast = to_ast("var y;").unwrap();
        let decl = ast.child_at(ast.root.unwrap(), 0).unwrap();
        let view = ast.var_decl(decl);
        assert_eq!(view.name(), Some("y"));
        assert!(view.annotation_idx().is_none());
        assert!(view.initializer_idx().is_none());
    }

    #[test]
    fn test_const_without_initializer_parses() {
        // Semantically invalid, but the parser accepts it so the analyzer
        // can report it with a proper diagnostic
        let ast = to_ast("const PI: integer;").unwrap();
        let decl = ast.child_at(ast.root.unwrap(), 0).unwrap();
        assert_eq!(ast.nodes[decl].node_type, NodeType::ConstDecl);
    }

    #[test]
    fn test_function_decl() {
        let ast = to_ast("function add(a: integer, b: integer): integer { return a; }").unwrap();
        let decl = ast.child_at(ast.root.unwrap(), 0).unwrap();
        let view = ast.function_decl(decl);
        assert_eq!(view.name(), Some("add"));
        assert_eq!(view.params().len(), 2);
        assert!(view.return_type_idx().is_some());
        assert!(view.body_idx().is_some());
    }

    #[test]
    fn test_function_decl_defaults() {
        let ast = to_ast("function main() { }").unwrap();
        let decl = ast.child_at(ast.root.unwrap(), 0).unwrap();
        let view = ast.function_decl(decl);
        assert_eq!(view.params().len(), 0);
        assert!(view.return_type_idx().is_none());
    }

    #[test]
    fn test_untyped_parameter() {
        let ast = to_ast("function f(x) { }").unwrap();
        let decl = ast.child_at(ast.root.unwrap(), 0).unwrap();
        let params = ast.function_decl(decl).params();
        assert_eq!(params.len(), 1);
        // Param has only the name child
        assert_eq!(ast.children(params[0]).count(), 1);
    }

    #[test]
    fn test_class_decl_with_base_and_members() {
        let ast = to_ast(
            "class Dog : Animal { var name: string; function speak(): string { return this.name; } }",
        )
        .unwrap();
        let decl = ast.child_at(ast.root.unwrap(), 0).unwrap();
        let view = ast.class_decl(decl);
        assert_eq!(view.name(), Some("Dog"));
        assert_eq!(view.base_name(), Some("Animal"));
        assert_eq!(view.members().len(), 2);
    }

    #[test]
    fn test_class_decl_without_base() {
        let ast = to_ast("class Empty { }").unwrap();
        let decl = ast.child_at(ast.root.unwrap(), 0).unwrap();
        let view = ast.class_decl(decl);
        assert_eq!(view.base_name(), None);
        assert!(view.members().is_empty());
    }

    #[test]
    fn test_class_member_must_be_declaration() {
        let err = to_ast("class C { print(1); }").unwrap_err();
        assert!(err.message.contains("class member"));
    }
}
