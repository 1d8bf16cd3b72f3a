use crate::lexer::Token;

// Parse tree with single vector storage using first-child/next-sibling links.
// The tree owns the source text and token stream so that every consumer can
// recover node spellings and positions from a node index alone.
#[derive(Debug)]
pub struct Ast {
    pub nodes: Vec<AstNode>,
    pub source: String,
    pub tokens: Vec<Token>,
    pub root: Option<usize>,
}

// Node kinds in the parse tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Program, // Root node containing all statements
    Block,   // '{' statement* '}'

    // Declarations
    VarDecl,        // Children: Identifier, [TypeAnnotation], [Initializer]
    ConstDecl,      // Children: Identifier, [TypeAnnotation], [Initializer]
    TypeAnnotation, // Children: one type node
    Initializer,    // Children: one expression
    FunctionDecl,   // Children: Identifier, ParamList, [ReturnClause], Block
    ParamList,      // Children: Param*
    Param,          // Children: Identifier, [type node]
    ReturnClause,   // Children: one type node
    ClassDecl,      // Children: Identifier, [BaseClause], member declarations*
    BaseClause,     // Terminal; token is the base class name

    // Type nodes
    TypeName,  // Terminal; token is the type or class name
    ArrayType, // Children: element type node

    // Statements
    ExprStmt,     // Children: one expression
    PrintStmt,    // Children: one expression
    IfStmt,       // Children: condition, then Block, [else Block]
    WhileStmt,    // Children: condition, Block
    DoWhileStmt,  // Children: Block, condition
    ForStmt,      // Children: [ForInit], [ForCondition], [ForUpdate], Block
    ForInit,      // Children: VarDecl or expression
    ForCondition, // Children: one expression
    ForUpdate,    // Children: one expression
    ForeachStmt,  // Children: Identifier, iterable expression, Block
    BreakStmt,
    ContinueStmt,
    ReturnStmt,   // Children: [expression]
    TryCatchStmt, // Children: try Block, Identifier, catch Block
    SwitchStmt,   // Children: scrutinee, (SwitchCase | DefaultCase)*
    SwitchCase,   // Children: case expression, statement*
    DefaultCase,  // Children: statement*

    // Assignment expressions
    Assign,         // Children: Identifier, value
    PropertyAssign, // Children: receiver, Identifier, value
    IndexAssign,    // Children: receiver, index, value

    // Operators
    Ternary, // Children: condition, then, else
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Not,
    Negate,
    UnaryPlus,

    // Literals (terminals)
    LiteralInteger,
    LiteralFloat,
    LiteralString,
    LiteralBoolean,
    LiteralNull,
    ArrayLiteral, // Children: element expressions*

    // Primaries and suffixes
    Identifier, // Terminal
    This,       // Terminal
    NewExpr,    // Children: Identifier (class name), ArgList
    Call,       // Children: callee expression, ArgList
    Index,      // Children: receiver, index expression
    PropertyAccess, // Children: receiver, Identifier
    ArgList,    // Children: argument expressions*
}

// Uniform-size parse tree node. Every node, terminal or not, records the
// index of its starting token so diagnostics always have a position.
#[derive(Debug, Clone)]
pub struct AstNode {
    pub node_type: NodeType,
    pub token_idx: usize,

    // Tree structure using indices
    pub first_child: Option<usize>,
    pub next_sibling: Option<usize>,
    pub parent: Option<usize>,
}

impl AstNode {
    pub fn new(node_type: NodeType, token_idx: usize) -> Self {
        Self {
            node_type,
            token_idx,
            first_child: None,
            next_sibling: None,
            parent: None,
        }
    }
}

impl Ast {
    pub fn new(source: String, tokens: Vec<Token>) -> Self {
        Self {
            nodes: Vec::new(),
            source,
            tokens,
            root: None,
        }
    }

    // Add node and return its index
    pub fn add_node(&mut self, node: AstNode) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(node);
        idx
    }

    // Link child to parent (adds as last child)
    pub fn add_child(&mut self, parent_idx: usize, child_idx: usize) {
        self.nodes[child_idx].parent = Some(parent_idx);

        if let Some(first_child_idx) = self.nodes[parent_idx].first_child {
            // Find last sibling and append
            let mut current = first_child_idx;
            while let Some(next) = self.nodes[current].next_sibling {
                current = next;
            }
            self.nodes[current].next_sibling = Some(child_idx);
        } else {
            // This is the first child
            self.nodes[parent_idx].first_child = Some(child_idx);
        }
    }

    // Unlink a node from its parent and siblings so it can be re-attached.
    // Only the node's own links are cleared; the previous parent must not be
    // visited again (the parser uses this when rewriting assignment targets).
    pub fn detach(&mut self, idx: usize) {
        self.nodes[idx].next_sibling = None;
        self.nodes[idx].parent = None;
    }

    /// Iterate over the direct children of a node
    pub fn children(&self, idx: usize) -> Children<'_> {
        Children {
            ast: self,
            next: self.nodes[idx].first_child,
        }
    }

    /// Nth direct child, if present
    pub fn child_at(&self, idx: usize, n: usize) -> Option<usize> {
        self.children(idx).nth(n)
    }

    /// First direct child with the given kind
    pub fn child_of_type(&self, idx: usize, kind: NodeType) -> Option<usize> {
        self.children(idx).find(|&c| self.nodes[c].node_type == kind)
    }

    /// Spelling of the node's starting token
    pub fn node_text(&self, idx: usize) -> &str {
        self.tokens[self.nodes[idx].token_idx].text(&self.source)
    }

    /// (line, column) of the node's starting token
    pub fn position(&self, idx: usize) -> (usize, usize) {
        let token = &self.tokens[self.nodes[idx].token_idx];
        (token.line, token.column)
    }

    // Typed accessor views over common declaration shapes

    pub fn var_decl(&self, idx: usize) -> VarDeclView<'_> {
        VarDeclView { ast: self, idx }
    }

    pub fn function_decl(&self, idx: usize) -> FunctionDeclView<'_> {
        FunctionDeclView { ast: self, idx }
    }

    pub fn class_decl(&self, idx: usize) -> ClassDeclView<'_> {
        ClassDeclView { ast: self, idx }
    }
}

pub struct Children<'a> {
    ast: &'a Ast,
    next: Option<usize>,
}

impl Iterator for Children<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = self.ast.nodes[current].next_sibling;
        Some(current)
    }
}

/// View over a VarDecl / ConstDecl node
pub struct VarDeclView<'a> {
    ast: &'a Ast,
    idx: usize,
}

impl<'a> VarDeclView<'a> {
    pub fn name_idx(&self) -> Option<usize> {
        self.ast.child_of_type(self.idx, NodeType::Identifier)
    }

    pub fn name(&self) -> Option<&'a str> {
        self.name_idx().map(|i| self.ast.node_text(i))
    }

    /// The type node inside the annotation, if annotated
    pub fn annotation_idx(&self) -> Option<usize> {
        let annotation = self.ast.child_of_type(self.idx, NodeType::TypeAnnotation)?;
        self.ast.child_at(annotation, 0)
    }

    /// The expression inside the initializer, if initialized
    pub fn initializer_idx(&self) -> Option<usize> {
        let initializer = self.ast.child_of_type(self.idx, NodeType::Initializer)?;
        self.ast.child_at(initializer, 0)
    }
}

/// View over a FunctionDecl node
pub struct FunctionDeclView<'a> {
    ast: &'a Ast,
    idx: usize,
}

impl<'a> FunctionDeclView<'a> {
    pub fn name_idx(&self) -> Option<usize> {
        self.ast.child_of_type(self.idx, NodeType::Identifier)
    }

    pub fn name(&self) -> Option<&'a str> {
        self.name_idx().map(|i| self.ast.node_text(i))
    }

    /// Param node indices, in declaration order
    pub fn params(&self) -> Vec<usize> {
        match self.ast.child_of_type(self.idx, NodeType::ParamList) {
            Some(list) => self.ast.children(list).collect(),
            None => Vec::new(),
        }
    }

    /// The type node inside the return clause, if declared
    pub fn return_type_idx(&self) -> Option<usize> {
        let clause = self.ast.child_of_type(self.idx, NodeType::ReturnClause)?;
        self.ast.child_at(clause, 0)
    }

    pub fn body_idx(&self) -> Option<usize> {
        self.ast.child_of_type(self.idx, NodeType::Block)
    }
}

/// View over a ClassDecl node
pub struct ClassDeclView<'a> {
    ast: &'a Ast,
    idx: usize,
}

impl<'a> ClassDeclView<'a> {
    pub fn name_idx(&self) -> Option<usize> {
        self.ast.child_of_type(self.idx, NodeType::Identifier)
    }

    pub fn name(&self) -> Option<&'a str> {
        self.name_idx().map(|i| self.ast.node_text(i))
    }

    pub fn base_name(&self) -> Option<&'a str> {
        self.ast
            .child_of_type(self.idx, NodeType::BaseClause)
            .map(|i| self.ast.node_text(i))
    }

    /// Member declaration node indices, in declaration order
    pub fn members(&self) -> Vec<usize> {
        self.ast
            .children(self.idx)
            .filter(|&c| {
                matches!(
                    self.ast.nodes[c].node_type,
                    NodeType::VarDecl | NodeType::ConstDecl | NodeType::FunctionDecl
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Token, TokenKind};

    fn dummy_token() -> Token {
        Token {
            kind: TokenKind::Identifier,
            start: 0,
            end: 1,
            line: 1,
            column: 1,
        }
    }

    #[test]
    fn test_add_child_links_siblings() {
        let mut ast = Ast::new("x".to_string(), vec![dummy_token()]);
        let parent = ast.add_node(AstNode::new(NodeType::Program, 0));
        let a = ast.add_node(AstNode::new(NodeType::Identifier, 0));
        let b = ast.add_node(AstNode::new(NodeType::Identifier, 0));
        let c = ast.add_node(AstNode::new(NodeType::Identifier, 0));

        ast.add_child(parent, a);
        ast.add_child(parent, b);
        ast.add_child(parent, c);

        assert_eq!(ast.children(parent).collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(ast.nodes[a].parent, Some(parent));
        assert_eq!(ast.nodes[a].next_sibling, Some(b));
        assert_eq!(ast.nodes[c].next_sibling, None);
    }

    #[test]
    fn test_detach_clears_links() {
        let mut ast = Ast::new("x".to_string(), vec![dummy_token()]);
        let parent = ast.add_node(AstNode::new(NodeType::Program, 0));
        let a = ast.add_node(AstNode::new(NodeType::Identifier, 0));
        let b = ast.add_node(AstNode::new(NodeType::Identifier, 0));
        ast.add_child(parent, a);
        ast.add_child(parent, b);

        ast.detach(a);
        assert_eq!(ast.nodes[a].next_sibling, None);
        assert_eq!(ast.nodes[a].parent, None);
    }

    #[test]
    fn test_child_helpers() {
        let mut ast = Ast::new("x".to_string(), vec![dummy_token()]);
        let parent = ast.add_node(AstNode::new(NodeType::VarDecl, 0));
        let name = ast.add_node(AstNode::new(NodeType::Identifier, 0));
        let annotation = ast.add_node(AstNode::new(NodeType::TypeAnnotation, 0));
        ast.add_child(parent, name);
        ast.add_child(parent, annotation);

        assert_eq!(ast.child_at(parent, 1), Some(annotation));
        assert_eq!(
            ast.child_of_type(parent, NodeType::TypeAnnotation),
            Some(annotation)
        );
        assert_eq!(ast.child_of_type(parent, NodeType::Initializer), None);
    }
}
