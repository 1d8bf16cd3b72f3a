use crate::lexer::{Token, TokenKind};

// Parse error
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub(super) fn from_token(message: String, token: &Token) -> Self {
        Self {
            message,
            line: token.line,
            column: token.column,
        }
    }

    pub(super) fn unexpected_token(expected: &str, token: &Token, source: &str) -> Self {
        let found = match &token.kind {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Identifier => format!("identifier '{}'", token.text(source)),
            TokenKind::Str => "string literal".to_string(),
            _ => format!("'{}'", token.text(source)),
        };

        Self::from_token(format!("Expected {}, found {}", expected, found), token)
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Parse error at {}:{}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}
