use super::{ParseError, Parser};
use crate::ast::NodeType;
use crate::lexer::TokenKind;

// Type annotation parsing
//
// type     := base_type ('[' ']')*
// base_type := Identifier   (primitive names are plain identifiers)
impl<'a> Parser<'a> {
    /// Parse a type, returning the index of a TypeName or ArrayType node
    pub(super) fn parse_type(&mut self) -> Result<usize, ParseError> {
        let base_token = self.current;
        if self.current_kind() != TokenKind::Identifier {
            return Err(ParseError::unexpected_token(
                "type name",
                self.current_token(),
                &self.ast.source,
            ));
        }
        let mut node = self.new_node(NodeType::TypeName)?;
        self.advance();

        // Each '[]' suffix wraps the type in another array layer
        while self.eat(TokenKind::LBracket) {
            self.consume(TokenKind::RBracket, "']'")?;
            let array_node = self.new_node_at(NodeType::ArrayType, base_token)?;
            self.ast.add_child(array_node, node);
            node = array_node;
        }

        Ok(node)
    }
}
