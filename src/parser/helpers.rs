use super::error::ParseError;
use crate::ast::{AstNode, NodeType};
use crate::lexer::{Token, TokenKind};

// Parser helper methods
impl<'a> super::Parser<'a> {
    // Helper: Check recursion depth limit
    pub(super) fn check_depth(&self, depth: usize) -> Result<(), ParseError> {
        if depth >= self.limits.max_expr_depth {
            return Err(ParseError::from_token(
                format!(
                    "Parsing nesting too deep: {} levels (max {}). Consider simplifying.",
                    depth, self.limits.max_expr_depth
                ),
                self.current_token(),
            ));
        }
        Ok(())
    }

    // Helper: Get current token (with bounds checking)
    pub(super) fn current_token(&self) -> &Token {
        // If we've gone past the end, return the EOF token (always last)
        if self.current >= self.ast.tokens.len() {
            &self.ast.tokens[self.ast.tokens.len() - 1]
        } else {
            &self.ast.tokens[self.current]
        }
    }

    pub(super) fn current_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Helper: Advance to the next token without validation
    pub(super) fn advance(&mut self) {
        self.current += 1;
    }

    /// Helper: Consume the current token if it has the given kind
    pub(super) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.current_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Helper: Consume a specific token kind or error
    pub(super) fn consume(&mut self, kind: TokenKind, expected: &str) -> Result<(), ParseError> {
        if self.current_kind() != kind {
            return Err(ParseError::unexpected_token(
                expected,
                self.current_token(),
                &self.ast.source,
            ));
        }
        self.advance();
        Ok(())
    }

    /// Helper: Create a node starting at the current token, enforcing the
    /// parse-tree size limit
    pub(super) fn new_node(&mut self, node_type: NodeType) -> Result<usize, ParseError> {
        self.new_node_at(node_type, self.current)
    }

    /// Helper: Create a node starting at a specific token
    pub(super) fn new_node_at(
        &mut self,
        node_type: NodeType,
        token_idx: usize,
    ) -> Result<usize, ParseError> {
        if self.ast.nodes.len() >= self.limits.max_ast_nodes {
            return Err(ParseError::from_token(
                format!(
                    "Parse tree too large: {} nodes (max {})",
                    self.ast.nodes.len(),
                    self.limits.max_ast_nodes
                ),
                self.current_token(),
            ));
        }
        Ok(self.ast.add_node(AstNode::new(node_type, token_idx)))
    }

    /// Helper: Consume an identifier token and produce an Identifier node
    pub(super) fn expect_identifier(&mut self, expected: &str) -> Result<usize, ParseError> {
        if self.current_kind() != TokenKind::Identifier {
            return Err(ParseError::unexpected_token(
                expected,
                self.current_token(),
                &self.ast.source,
            ));
        }
        let node = self.new_node(NodeType::Identifier)?;
        self.advance();
        Ok(node)
    }
}
