use super::{ParseError, Parser};
use crate::ast::NodeType;
use crate::lexer::TokenKind;

// Recursive statement parsing methods
impl<'a> Parser<'a> {
    /// Parse all statements up to end of file into the Program root
    pub(super) fn parse_program(&mut self) -> Result<(), ParseError> {
        while self.current_kind() != TokenKind::Eof {
            let stmt_idx = self.parse_statement(0)?;
            if let Some(root_idx) = self.ast.root {
                self.ast.add_child(root_idx, stmt_idx);
            }
        }
        Ok(())
    }

    /// Parse a single statement
    pub(super) fn parse_statement(&mut self, depth: usize) -> Result<usize, ParseError> {
        self.check_depth(depth)?;

        match self.current_kind() {
            TokenKind::LBrace => self.parse_block(depth + 1),
            TokenKind::Let | TokenKind::Var => self.parse_var_decl(depth + 1, false),
            TokenKind::Const => self.parse_var_decl(depth + 1, true),
            TokenKind::Function => self.parse_function_decl(depth + 1),
            TokenKind::Class => self.parse_class_decl(depth + 1),
            TokenKind::Print => self.parse_print_stmt(depth + 1),
            TokenKind::If => self.parse_if_stmt(depth + 1),
            TokenKind::While => self.parse_while_stmt(depth + 1),
            TokenKind::Do => self.parse_do_while_stmt(depth + 1),
            TokenKind::For => self.parse_for_stmt(depth + 1),
            TokenKind::Foreach => self.parse_foreach_stmt(depth + 1),
            TokenKind::Break => self.parse_jump_stmt(NodeType::BreakStmt, "'break'"),
            TokenKind::Continue => self.parse_jump_stmt(NodeType::ContinueStmt, "'continue'"),
            TokenKind::Return => self.parse_return_stmt(depth + 1),
            TokenKind::Try => self.parse_try_catch_stmt(depth + 1),
            TokenKind::Switch => self.parse_switch_stmt(depth + 1),
            _ => self.parse_expression_stmt(depth + 1),
        }
    }

    /// Parse a braced block: '{' statement* '}'
    pub(super) fn parse_block(&mut self, depth: usize) -> Result<usize, ParseError> {
        self.check_depth(depth)?;
        let block_idx = self.new_node(NodeType::Block)?;
        self.consume(TokenKind::LBrace, "'{'")?;

        while self.current_kind() != TokenKind::RBrace && self.current_kind() != TokenKind::Eof {
            let stmt_idx = self.parse_statement(depth + 1)?;
            self.ast.add_child(block_idx, stmt_idx);
        }

        self.consume(TokenKind::RBrace, "'}'")?;
        Ok(block_idx)
    }

    /// Parse an expression statement: expression ';'
    fn parse_expression_stmt(&mut self, depth: usize) -> Result<usize, ParseError> {
        let stmt_idx = self.new_node(NodeType::ExprStmt)?;
        let expr_idx = self.parse_expression(depth + 1)?;
        self.ast.add_child(stmt_idx, expr_idx);
        self.consume(TokenKind::Semicolon, "';'")?;
        Ok(stmt_idx)
    }

    /// Parse a print statement: 'print' '(' expression ')' ';'
    fn parse_print_stmt(&mut self, depth: usize) -> Result<usize, ParseError> {
        let stmt_idx = self.new_node(NodeType::PrintStmt)?;
        self.advance(); // 'print'
        self.consume(TokenKind::LParen, "'('")?;
        let expr_idx = self.parse_expression(depth + 1)?;
        self.ast.add_child(stmt_idx, expr_idx);
        self.consume(TokenKind::RParen, "')'")?;
        self.consume(TokenKind::Semicolon, "';'")?;
        Ok(stmt_idx)
    }

    /// Parse an if statement: 'if' '(' expression ')' block ('else' block)?
    fn parse_if_stmt(&mut self, depth: usize) -> Result<usize, ParseError> {
        let stmt_idx = self.new_node(NodeType::IfStmt)?;
        self.advance(); // 'if'
        self.consume(TokenKind::LParen, "'('")?;
        let cond_idx = self.parse_expression(depth + 1)?;
        self.ast.add_child(stmt_idx, cond_idx);
        self.consume(TokenKind::RParen, "')'")?;

        let then_idx = self.parse_block(depth + 1)?;
        self.ast.add_child(stmt_idx, then_idx);

        if self.eat(TokenKind::Else) {
            let else_idx = self.parse_block(depth + 1)?;
            self.ast.add_child(stmt_idx, else_idx);
        }

        Ok(stmt_idx)
    }

    /// Parse a while statement: 'while' '(' expression ')' block
    fn parse_while_stmt(&mut self, depth: usize) -> Result<usize, ParseError> {
        let stmt_idx = self.new_node(NodeType::WhileStmt)?;
        self.advance(); // 'while'
        self.consume(TokenKind::LParen, "'('")?;
        let cond_idx = self.parse_expression(depth + 1)?;
        self.ast.add_child(stmt_idx, cond_idx);
        self.consume(TokenKind::RParen, "')'")?;

        let body_idx = self.parse_block(depth + 1)?;
        self.ast.add_child(stmt_idx, body_idx);
        Ok(stmt_idx)
    }

    /// Parse a do-while statement: 'do' block 'while' '(' expression ')' ';'
    fn parse_do_while_stmt(&mut self, depth: usize) -> Result<usize, ParseError> {
        let stmt_idx = self.new_node(NodeType::DoWhileStmt)?;
        self.advance(); // 'do'

        let body_idx = self.parse_block(depth + 1)?;
        self.ast.add_child(stmt_idx, body_idx);

        self.consume(TokenKind::While, "'while'")?;
        self.consume(TokenKind::LParen, "'('")?;
        let cond_idx = self.parse_expression(depth + 1)?;
        self.ast.add_child(stmt_idx, cond_idx);
        self.consume(TokenKind::RParen, "')'")?;
        self.consume(TokenKind::Semicolon, "';'")?;
        Ok(stmt_idx)
    }

    /// Parse a for statement:
    /// 'for' '(' (var_decl | expression ';' | ';') expression? ';' expression? ')' block
    fn parse_for_stmt(&mut self, depth: usize) -> Result<usize, ParseError> {
        let stmt_idx = self.new_node(NodeType::ForStmt)?;
        self.advance(); // 'for'
        self.consume(TokenKind::LParen, "'('")?;

        // Init clause (the var_decl / expression variants consume the ';')
        match self.current_kind() {
            TokenKind::Semicolon => {
                self.advance();
            }
            TokenKind::Let | TokenKind::Var => {
                let init_idx = self.new_node(NodeType::ForInit)?;
                let decl_idx = self.parse_var_decl(depth + 1, false)?;
                self.ast.add_child(init_idx, decl_idx);
                self.ast.add_child(stmt_idx, init_idx);
            }
            _ => {
                let init_idx = self.new_node(NodeType::ForInit)?;
                let expr_idx = self.parse_expression(depth + 1)?;
                self.ast.add_child(init_idx, expr_idx);
                self.ast.add_child(stmt_idx, init_idx);
                self.consume(TokenKind::Semicolon, "';'")?;
            }
        }

        // Condition clause
        if self.current_kind() != TokenKind::Semicolon {
            let cond_idx = self.new_node(NodeType::ForCondition)?;
            let expr_idx = self.parse_expression(depth + 1)?;
            self.ast.add_child(cond_idx, expr_idx);
            self.ast.add_child(stmt_idx, cond_idx);
        }
        self.consume(TokenKind::Semicolon, "';'")?;

        // Update clause
        if self.current_kind() != TokenKind::RParen {
            let update_idx = self.new_node(NodeType::ForUpdate)?;
            let expr_idx = self.parse_expression(depth + 1)?;
            self.ast.add_child(update_idx, expr_idx);
            self.ast.add_child(stmt_idx, update_idx);
        }
        self.consume(TokenKind::RParen, "')'")?;

        let body_idx = self.parse_block(depth + 1)?;
        self.ast.add_child(stmt_idx, body_idx);
        Ok(stmt_idx)
    }

    /// Parse a foreach statement: 'foreach' '(' Identifier 'in' expression ')' block
    fn parse_foreach_stmt(&mut self, depth: usize) -> Result<usize, ParseError> {
        let stmt_idx = self.new_node(NodeType::ForeachStmt)?;
        self.advance(); // 'foreach'
        self.consume(TokenKind::LParen, "'('")?;

        let binding_idx = self.expect_identifier("loop variable name")?;
        self.ast.add_child(stmt_idx, binding_idx);

        self.consume(TokenKind::In, "'in'")?;
        let iterable_idx = self.parse_expression(depth + 1)?;
        self.ast.add_child(stmt_idx, iterable_idx);
        self.consume(TokenKind::RParen, "')'")?;

        let body_idx = self.parse_block(depth + 1)?;
        self.ast.add_child(stmt_idx, body_idx);
        Ok(stmt_idx)
    }

    /// Parse a break or continue statement
    fn parse_jump_stmt(&mut self, node_type: NodeType, what: &str) -> Result<usize, ParseError> {
        let stmt_idx = self.new_node(node_type)?;
        self.advance(); // keyword
        self.consume(TokenKind::Semicolon, &format!("';' after {}", what))?;
        Ok(stmt_idx)
    }

    /// Parse a return statement: 'return' expression? ';'
    fn parse_return_stmt(&mut self, depth: usize) -> Result<usize, ParseError> {
        let stmt_idx = self.new_node(NodeType::ReturnStmt)?;
        self.advance(); // 'return'

        if self.current_kind() != TokenKind::Semicolon {
            let expr_idx = self.parse_expression(depth + 1)?;
            self.ast.add_child(stmt_idx, expr_idx);
        }
        self.consume(TokenKind::Semicolon, "';'")?;
        Ok(stmt_idx)
    }

    /// Parse a try-catch statement: 'try' block 'catch' '(' Identifier ')' block
    fn parse_try_catch_stmt(&mut self, depth: usize) -> Result<usize, ParseError> {
        let stmt_idx = self.new_node(NodeType::TryCatchStmt)?;
        self.advance(); // 'try'

        let try_idx = self.parse_block(depth + 1)?;
        self.ast.add_child(stmt_idx, try_idx);

        self.consume(TokenKind::Catch, "'catch'")?;
        self.consume(TokenKind::LParen, "'('")?;
        let binding_idx = self.expect_identifier("catch variable name")?;
        self.ast.add_child(stmt_idx, binding_idx);
        self.consume(TokenKind::RParen, "')'")?;

        let catch_idx = self.parse_block(depth + 1)?;
        self.ast.add_child(stmt_idx, catch_idx);
        Ok(stmt_idx)
    }

    /// Parse a switch statement:
    /// 'switch' '(' expression ')' '{' ('case' expression ':' statement*)* ('default' ':' statement*)? '}'
    fn parse_switch_stmt(&mut self, depth: usize) -> Result<usize, ParseError> {
        let stmt_idx = self.new_node(NodeType::SwitchStmt)?;
        self.advance(); // 'switch'
        self.consume(TokenKind::LParen, "'('")?;
        let scrutinee_idx = self.parse_expression(depth + 1)?;
        self.ast.add_child(stmt_idx, scrutinee_idx);
        self.consume(TokenKind::RParen, "')'")?;
        self.consume(TokenKind::LBrace, "'{'")?;

        loop {
            match self.current_kind() {
                TokenKind::Case => {
                    let case_idx = self.new_node(NodeType::SwitchCase)?;
                    self.advance(); // 'case'
                    let expr_idx = self.parse_expression(depth + 1)?;
                    self.ast.add_child(case_idx, expr_idx);
                    self.consume(TokenKind::Colon, "':'")?;
                    self.parse_case_body(depth + 1, case_idx)?;
                    self.ast.add_child(stmt_idx, case_idx);
                }
                TokenKind::Default => {
                    let default_idx = self.new_node(NodeType::DefaultCase)?;
                    self.advance(); // 'default'
                    self.consume(TokenKind::Colon, "':'")?;
                    self.parse_case_body(depth + 1, default_idx)?;
                    self.ast.add_child(stmt_idx, default_idx);
                }
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                _ => {
                    return Err(ParseError::unexpected_token(
                        "'case', 'default', or '}'",
                        self.current_token(),
                        &self.ast.source,
                    ));
                }
            }
        }

        Ok(stmt_idx)
    }

    /// Parse the statements of one switch arm, up to the next arm or '}'
    fn parse_case_body(&mut self, depth: usize, case_idx: usize) -> Result<(), ParseError> {
        loop {
            match self.current_kind() {
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof => {
                    return Ok(());
                }
                _ => {
                    let stmt_idx = self.parse_statement(depth + 1)?;
                    self.ast.add_child(case_idx, stmt_idx);
                }
            }
        }
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

    fn top_level_kinds(source: &str) -> Vec<NodeType> {
        let ast = to_ast(source).unwrap();
        ast.children(ast.root.unwrap())
            .map(|idx| ast.nodes[idx].node_type)
            .collect()
    }

    #[test]
    fn test_empty_program() {
        let ast = to_ast("").unwrap();
        assert_eq!(ast.children(ast.root.unwrap()).count(), 0);
    }

    #[test]
    fn test_statement_kinds() {
        let kinds = top_level_kinds(
            "let x = 1; print(x); { x = 2; } while (true) { break; } return;",
        );
        assert_eq!(
            kinds,
            vec![
                NodeType::VarDecl,
                NodeType::PrintStmt,
                NodeType::Block,
                NodeType::WhileStmt,
                NodeType::ReturnStmt,
            ]
        );
    }

    #[test]
    fn test_if_else() {
        let ast = to_ast("if (true) { print(1); } else { print(2); }").unwrap();
        let if_idx = ast.child_at(ast.root.unwrap(), 0).unwrap();
        assert_eq!(ast.nodes[if_idx].node_type, NodeType::IfStmt);
        assert_eq!(ast.children(if_idx).count(), 3); // condition, then, else
    }

    #[test]
    fn test_for_with_all_clauses() {
        let ast = to_ast("for (let i = 0; i < 10; i = i + 1) { print(i); }").unwrap();
        let for_idx = ast.child_at(ast.root.unwrap(), 0).unwrap();
        let kinds: Vec<_> = ast
            .children(for_idx)
            .map(|i| ast.nodes[i].node_type)
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeType::ForInit,
                NodeType::ForCondition,
                NodeType::ForUpdate,
                NodeType::Block,
            ]
        );
    }

    #[test]
    fn test_for_with_empty_clauses() {
        let ast = to_ast("for (;;) { }").unwrap();
        let for_idx = ast.child_at(ast.root.unwrap(), 0).unwrap();
        let kinds: Vec<_> = ast
            .children(for_idx)
            .map(|i| ast.nodes[i].node_type)
            .collect();
        assert_eq!(kinds, vec![NodeType::Block]);
    }

    #[test]
    fn test_foreach() {
        let ast = to_ast("foreach (item in xs) { print(item); }").unwrap();
        let stmt = ast.child_at(ast.root.unwrap(), 0).unwrap();
        assert_eq!(ast.nodes[stmt].node_type, NodeType::ForeachStmt);
        let binding = ast.child_at(stmt, 0).unwrap();
        assert_eq!(ast.node_text(binding), "item");
    }

    #[test]
    fn test_try_catch() {
        let ast = to_ast("try { print(1); } catch (err) { print(err); }").unwrap();
        let stmt = ast.child_at(ast.root.unwrap(), 0).unwrap();
        assert_eq!(ast.nodes[stmt].node_type, NodeType::TryCatchStmt);
        let binding = ast.child_at(stmt, 1).unwrap();
        assert_eq!(ast.node_text(binding), "err");
    }

    #[test]
    fn test_switch() {
        let ast = to_ast(
            "switch (x) { case 1: print(1); case 2: print(2); default: print(0); }",
        )
        .unwrap();
        let stmt = ast.child_at(ast.root.unwrap(), 0).unwrap();
        let kinds: Vec<_> = ast
            .children(stmt)
            .map(|i| ast.nodes[i].node_type)
            .collect();
        assert_eq!(kinds[0], NodeType::Identifier); // scrutinee
        assert_eq!(
            &kinds[1..],
            &[
                NodeType::SwitchCase,
                NodeType::SwitchCase,
                NodeType::DefaultCase,
            ]
        );
    }

    #[test]
    fn test_missing_semicolon() {
        let err = to_ast("let x = 1").unwrap_err();
        assert!(err.message.contains("';'"));
    }

    #[test]
    fn test_unclosed_block() {
        let err = to_ast("{ let x = 1;").unwrap_err();
        assert!(err.message.contains("'}'"));
    }
}
