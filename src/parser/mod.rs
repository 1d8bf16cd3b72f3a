// Parser module - splits the recursive descent parser into logical components
mod declarations;
mod error;
mod expressions;
mod helpers;
mod statements;
mod types;

// Public exports
pub use error::ParseError;

use crate::ast::{Ast, AstNode, NodeType};
use crate::lexer::Token;
use crate::limits::CompilerLimits;

// Parser structure
pub struct Parser<'a> {
    ast: Ast,
    current: usize,
    limits: &'a CompilerLimits,
}

impl<'a> Parser<'a> {
    pub fn new(source: String, tokens: Vec<Token>, limits: &'a CompilerLimits) -> Self {
        let mut ast = Ast::new(source, tokens);

        // Create the Program root node
        let program_node = AstNode::new(NodeType::Program, 0);
        let root_idx = ast.add_node(program_node);
        ast.root = Some(root_idx);

        Self {
            ast,
            current: 0,
            limits,
        }
    }

    // Main parsing entry point
    pub fn parse(mut self) -> Result<Ast, ParseError> {
        self.parse_program()?;
        Ok(self.ast)
    }
}

// Public API function
pub fn parse(
    source: String,
    tokens: Vec<Token>,
    limits: &CompilerLimits,
) -> Result<Ast, ParseError> {
    let parser = Parser::new(source, tokens, limits);
    parser.parse()
}
