use super::{ParseError, Parser};
use crate::ast::NodeType;
use crate::lexer::TokenKind;

// Binary operator precedence levels (higher binds tighter)
fn binary_precedence(kind: TokenKind) -> Option<u8> {
    match kind {
        TokenKind::OrOr => Some(1),
        TokenKind::AndAnd => Some(2),
        TokenKind::EqualEqual | TokenKind::BangEqual => Some(3),
        TokenKind::Lt | TokenKind::LtEqual | TokenKind::Gt | TokenKind::GtEqual => Some(4),
        TokenKind::Plus | TokenKind::Minus => Some(5),
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some(6),
        _ => None,
    }
}

fn binary_node_type(kind: TokenKind) -> NodeType {
    match kind {
        TokenKind::OrOr => NodeType::Or,
        TokenKind::AndAnd => NodeType::And,
        TokenKind::EqualEqual => NodeType::Equal,
        TokenKind::BangEqual => NodeType::NotEqual,
        TokenKind::Lt => NodeType::Less,
        TokenKind::LtEqual => NodeType::LessEqual,
        TokenKind::Gt => NodeType::Greater,
        TokenKind::GtEqual => NodeType::GreaterEqual,
        TokenKind::Plus => NodeType::Add,
        TokenKind::Minus => NodeType::Subtract,
        TokenKind::Star => NodeType::Multiply,
        TokenKind::Slash => NodeType::Divide,
        TokenKind::Percent => NodeType::Modulo,
        _ => unreachable!("not a binary operator"),
    }
}

// Recursive expression parsing methods
impl<'a> Parser<'a> {
    /// Parse an expression (assignment is the lowest-precedence form)
    pub(super) fn parse_expression(&mut self, depth: usize) -> Result<usize, ParseError> {
        self.check_depth(depth)?;
        self.parse_assignment(depth)
    }

    /// Parse an assignment or fall through to a ternary expression.
    ///
    /// Assignments are recognized after the fact: the left side is parsed as
    /// an ordinary expression and rewritten into an Assign / PropertyAssign /
    /// IndexAssign node when an '=' follows. Only identifier, property, and
    /// index expressions are valid targets.
    fn parse_assignment(&mut self, depth: usize) -> Result<usize, ParseError> {
        let left_idx = self.parse_ternary(depth)?;

        if self.current_kind() != TokenKind::Equal {
            return Ok(left_idx);
        }

        let equals_token = self.current_token().clone();
        self.advance(); // '='
        let value_idx = self.parse_assignment(depth + 1)?; // right-associative

        let left_token = self.ast.nodes[left_idx].token_idx;
        match self.ast.nodes[left_idx].node_type {
            NodeType::Identifier => {
                let assign_idx = self.new_node_at(NodeType::Assign, left_token)?;
                self.ast.add_child(assign_idx, left_idx);
                self.ast.add_child(assign_idx, value_idx);
                Ok(assign_idx)
            }
            NodeType::PropertyAccess => {
                let parts: Vec<usize> = self.ast.children(left_idx).collect();
                let assign_idx = self.new_node_at(NodeType::PropertyAssign, left_token)?;
                for part in parts {
                    self.ast.detach(part);
                    self.ast.add_child(assign_idx, part);
                }
                self.ast.add_child(assign_idx, value_idx);
                Ok(assign_idx)
            }
            NodeType::Index => {
                let parts: Vec<usize> = self.ast.children(left_idx).collect();
                let assign_idx = self.new_node_at(NodeType::IndexAssign, left_token)?;
                for part in parts {
                    self.ast.detach(part);
                    self.ast.add_child(assign_idx, part);
                }
                self.ast.add_child(assign_idx, value_idx);
                Ok(assign_idx)
            }
            _ => Err(ParseError::from_token(
                "Invalid assignment target".to_string(),
                &equals_token,
            )),
        }
    }

    /// Parse a ternary conditional: binary ('?' expression ':' expression)?
    fn parse_ternary(&mut self, depth: usize) -> Result<usize, ParseError> {
        let cond_idx = self.parse_binary(depth, 1)?;

        if !self.eat(TokenKind::Question) {
            return Ok(cond_idx);
        }

        let cond_token = self.ast.nodes[cond_idx].token_idx;
        let ternary_idx = self.new_node_at(NodeType::Ternary, cond_token)?;
        let then_idx = self.parse_assignment(depth + 1)?;
        self.consume(TokenKind::Colon, "':'")?;
        let else_idx = self.parse_assignment(depth + 1)?;

        self.ast.add_child(ternary_idx, cond_idx);
        self.ast.add_child(ternary_idx, then_idx);
        self.ast.add_child(ternary_idx, else_idx);
        Ok(ternary_idx)
    }

    /// Parse binary operators with precedence climbing
    fn parse_binary(&mut self, depth: usize, min_precedence: u8) -> Result<usize, ParseError> {
        self.check_depth(depth)?;
        let mut left_idx = self.parse_unary(depth)?;

        loop {
            let op_kind = self.current_kind();
            let precedence = match binary_precedence(op_kind) {
                Some(p) if p >= min_precedence => p,
                _ => break,
            };
            self.advance(); // operator

            // Parse right side with higher precedence for left-associativity
            let right_idx = self.parse_binary(depth + 1, precedence + 1)?;

            let left_token = self.ast.nodes[left_idx].token_idx;
            let op_idx = self.new_node_at(binary_node_type(op_kind), left_token)?;
            self.ast.add_child(op_idx, left_idx);
            self.ast.add_child(op_idx, right_idx);
            left_idx = op_idx;
        }

        Ok(left_idx)
    }

    /// Parse unary prefix operators: '!' | '-' | '+'
    fn parse_unary(&mut self, depth: usize) -> Result<usize, ParseError> {
        self.check_depth(depth)?;

        let node_type = match self.current_kind() {
            TokenKind::Bang => NodeType::Not,
            TokenKind::Minus => NodeType::Negate,
            TokenKind::Plus => NodeType::UnaryPlus,
            _ => return self.parse_postfix(depth),
        };

        let op_idx = self.new_node(node_type)?;
        self.advance(); // operator
        let operand_idx = self.parse_unary(depth + 1)?;
        self.ast.add_child(op_idx, operand_idx);
        Ok(op_idx)
    }

    /// Parse a primary expression followed by call, index, and property
    /// suffixes, left to right
    fn parse_postfix(&mut self, depth: usize) -> Result<usize, ParseError> {
        let mut expr_idx = self.parse_primary(depth)?;

        loop {
            let chain_token = self.ast.nodes[expr_idx].token_idx;
            match self.current_kind() {
                TokenKind::LParen => {
                    let args_idx = self.parse_arg_list(depth)?;
                    let call_idx = self.new_node_at(NodeType::Call, chain_token)?;
                    self.ast.add_child(call_idx, expr_idx);
                    self.ast.add_child(call_idx, args_idx);
                    expr_idx = call_idx;
                }
                TokenKind::LBracket => {
                    self.advance(); // '['
                    let index_expr_idx = self.parse_expression(depth + 1)?;
                    self.consume(TokenKind::RBracket, "']'")?;
                    let index_idx = self.new_node_at(NodeType::Index, chain_token)?;
                    self.ast.add_child(index_idx, expr_idx);
                    self.ast.add_child(index_idx, index_expr_idx);
                    expr_idx = index_idx;
                }
                TokenKind::Dot => {
                    self.advance(); // '.'
                    let name_idx = self.expect_identifier("property name")?;
                    let access_idx = self.new_node_at(NodeType::PropertyAccess, chain_token)?;
                    self.ast.add_child(access_idx, expr_idx);
                    self.ast.add_child(access_idx, name_idx);
                    expr_idx = access_idx;
                }
                _ => break,
            }
        }

        Ok(expr_idx)
    }

    /// Parse a call argument list: '(' (expression (',' expression)*)? ')'
    fn parse_arg_list(&mut self, depth: usize) -> Result<usize, ParseError> {
        let list_idx = self.new_node(NodeType::ArgList)?;
        self.consume(TokenKind::LParen, "'('")?;

        if self.current_kind() != TokenKind::RParen {
            loop {
                let arg_idx = self.parse_expression(depth + 1)?;
                self.ast.add_child(list_idx, arg_idx);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenKind::RParen, "')'")?;
        Ok(list_idx)
    }

    /// Parse a primary expression: literal, array literal, identifier,
    /// 'this', 'new', or a parenthesized expression
    fn parse_primary(&mut self, depth: usize) -> Result<usize, ParseError> {
        match self.current_kind() {
            TokenKind::Integer => self.terminal(NodeType::LiteralInteger),
            TokenKind::Float => self.terminal(NodeType::LiteralFloat),
            TokenKind::Str => self.terminal(NodeType::LiteralString),
            TokenKind::True | TokenKind::False => self.terminal(NodeType::LiteralBoolean),
            TokenKind::Null => self.terminal(NodeType::LiteralNull),
            TokenKind::Identifier => self.terminal(NodeType::Identifier),
            TokenKind::This => self.terminal(NodeType::This),
            TokenKind::LBracket => {
                let literal_idx = self.new_node(NodeType::ArrayLiteral)?;
                self.advance(); // '['
                if self.current_kind() != TokenKind::RBracket {
                    loop {
                        let element_idx = self.parse_expression(depth + 1)?;
                        self.ast.add_child(literal_idx, element_idx);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.consume(TokenKind::RBracket, "']'")?;
                Ok(literal_idx)
            }
            TokenKind::New => {
                let new_idx = self.new_node(NodeType::NewExpr)?;
                self.advance(); // 'new'
                let name_idx = self.expect_identifier("class name")?;
                self.ast.add_child(new_idx, name_idx);
                let args_idx = self.parse_arg_list(depth)?;
                self.ast.add_child(new_idx, args_idx);
                Ok(new_idx)
            }
            TokenKind::LParen => {
                self.advance(); // '('
                let inner_idx = self.parse_expression(depth + 1)?;
                self.consume(TokenKind::RParen, "')'")?;
                Ok(inner_idx)
            }
            _ => Err(ParseError::unexpected_token(
                "expression",
                self.current_token(),
                &self.ast.source,
            )),
        }
    }

    fn terminal(&mut self, node_type: NodeType) -> Result<usize, ParseError> {
        let node_idx = self.new_node(node_type)?;
        self.advance();
        Ok(node_idx)
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use crate::ast::{Ast, NodeType};
    use crate::lexer::lex;
    use crate::limits::CompilerLimits;

    fn to_ast(source: &str) -> Result<Ast, super::ParseError> {
        let limits = CompilerLimits::default();
        let tokens = lex(source, &limits).unwrap();
        parse(source.to_string(), tokens, &limits)
    }

    /// The expression of the first statement (assumed to be an ExprStmt)
    fn first_expr(ast: &Ast) -> usize {
        let stmt = ast.child_at(ast.root.unwrap(), 0).unwrap();
        ast.child_at(stmt, 0).unwrap()
    }

    #[test]
    fn test_precedence_multiplication_over_addition() {
        let ast = to_ast("x = 1 + 2 * 3;").unwrap();
        let assign = first_expr(&ast);
        let value = ast.child_at(assign, 1).unwrap();
        assert_eq!(ast.nodes[value].node_type, NodeType::Add);
        let add_right = ast.child_at(value, 1).unwrap();
        assert_eq!(ast.nodes[add_right].node_type, NodeType::Multiply);
    }

    #[test]
    fn test_precedence_comparison_over_logic() {
        let ast = to_ast("x = a < b && c > d;").unwrap();
        let assign = first_expr(&ast);
        let value = ast.child_at(assign, 1).unwrap();
        assert_eq!(ast.nodes[value].node_type, NodeType::And);
        let left = ast.child_at(value, 0).unwrap();
        assert_eq!(ast.nodes[left].node_type, NodeType::Less);
    }

    #[test]
    fn test_grouping_overrides_precedence() {
        let ast = to_ast("x = (1 + 2) * 3;").unwrap();
        let assign = first_expr(&ast);
        let value = ast.child_at(assign, 1).unwrap();
        assert_eq!(ast.nodes[value].node_type, NodeType::Multiply);
        let left = ast.child_at(value, 0).unwrap();
        assert_eq!(ast.nodes[left].node_type, NodeType::Add);
    }

    #[test]
    fn test_unary_chain() {
        let ast = to_ast("x = !!true;").unwrap();
        let assign = first_expr(&ast);
        let value = ast.child_at(assign, 1).unwrap();
        assert_eq!(ast.nodes[value].node_type, NodeType::Not);
        let inner = ast.child_at(value, 0).unwrap();
        assert_eq!(ast.nodes[inner].node_type, NodeType::Not);
    }

    #[test]
    fn test_ternary() {
        let ast = to_ast("x = a ? 1 : 2;").unwrap();
        let assign = first_expr(&ast);
        let value = ast.child_at(assign, 1).unwrap();
        assert_eq!(ast.nodes[value].node_type, NodeType::Ternary);
        assert_eq!(ast.children(value).count(), 3);
    }

    #[test]
    fn test_simple_assignment_shape() {
        let ast = to_ast("a = 1;").unwrap();
        let assign = first_expr(&ast);
        assert_eq!(ast.nodes[assign].node_type, NodeType::Assign);
        let target = ast.child_at(assign, 0).unwrap();
        assert_eq!(ast.node_text(target), "a");
    }

    #[test]
    fn test_property_assignment_shape() {
        let ast = to_ast("p.name = \"Ana\";").unwrap();
        let assign = first_expr(&ast);
        assert_eq!(ast.nodes[assign].node_type, NodeType::PropertyAssign);
        let kinds: Vec<_> = ast
            .children(assign)
            .map(|i| ast.nodes[i].node_type)
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeType::Identifier,    // receiver
                NodeType::Identifier,    // property name
                NodeType::LiteralString, // value
            ]
        );
    }

    #[test]
    fn test_index_assignment_shape() {
        let ast = to_ast("xs[0] = 10;").unwrap();
        let assign = first_expr(&ast);
        assert_eq!(ast.nodes[assign].node_type, NodeType::IndexAssign);
        assert_eq!(ast.children(assign).count(), 3);
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = to_ast("1 + 2 = 3;").unwrap_err();
        assert!(err.message.contains("Invalid assignment target"));
    }

    #[test]
    fn test_chained_suffixes() {
        // a.b(1)[2] parses as Index(Call(PropertyAccess(a, b), args), 2)
        let ast = to_ast("x = a.b(1)[2];").unwrap();
        let assign = first_expr(&ast);
        let value = ast.child_at(assign, 1).unwrap();
        assert_eq!(ast.nodes[value].node_type, NodeType::Index);
        let call = ast.child_at(value, 0).unwrap();
        assert_eq!(ast.nodes[call].node_type, NodeType::Call);
        let access = ast.child_at(call, 0).unwrap();
        assert_eq!(ast.nodes[access].node_type, NodeType::PropertyAccess);
    }

    #[test]
    fn test_new_expression() {
        let ast = to_ast("x = new Dog(\"Rex\");").unwrap();
        let assign = first_expr(&ast);
        let value = ast.child_at(assign, 1).unwrap();
        assert_eq!(ast.nodes[value].node_type, NodeType::NewExpr);
        let name = ast.child_at(value, 0).unwrap();
        assert_eq!(ast.node_text(name), "Dog");
        let args = ast.child_at(value, 1).unwrap();
        assert_eq!(ast.nodes[args].node_type, NodeType::ArgList);
        assert_eq!(ast.children(args).count(), 1);
    }

    #[test]
    fn test_array_literal() {
        let ast = to_ast("x = [1, 2, 3];").unwrap();
        let assign = first_expr(&ast);
        let value = ast.child_at(assign, 1).unwrap();
        assert_eq!(ast.nodes[value].node_type, NodeType::ArrayLiteral);
        assert_eq!(ast.children(value).count(), 3);
    }

    #[test]
    fn test_empty_array_literal() {
        let ast = to_ast("x = [];").unwrap();
        let assign = first_expr(&ast);
        let value = ast.child_at(assign, 1).unwrap();
        assert_eq!(ast.nodes[value].node_type, NodeType::ArrayLiteral);
        assert_eq!(ast.children(value).count(), 0);
    }

    #[test]
    fn test_recursion_depth_limit() {
        let limits = CompilerLimits {
            max_expr_depth: 8,
            ..Default::default()
        };
        let source = format!("x = {}1;", "!".repeat(32));
        let tokens = lex(&source, &limits).unwrap();
        let result = parse(source.clone(), tokens, &limits);
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("too deep"));
    }
}
