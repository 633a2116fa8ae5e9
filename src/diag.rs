use thiserror::Error;

/// Line number (starting at one).
pub type Position = u32;

/// A scanning or parsing failure, with the line it was detected on.
#[derive(Debug, PartialEq, Error)]
#[error("syntax error: line {pos}: {kind}")]
pub struct SyntaxError {
    pub pos: Position,
    pub kind: SyntaxErrorKind,
}

#[derive(Debug, PartialEq, Error)]
pub enum SyntaxErrorKind {
    #[error("unexpected token '{found}', expected '{expected}'")]
    UnexpectedToken { found: String, expected: String },
    #[error("unexpected character: {0}")]
    BadChar(char),
    #[error("cannot parse number literal: {0}")]
    BadNumberLiteral(String),
    #[error("unexpected token '{0}', expected an expression")]
    ExpectedExpression(String),
    #[error("unexpected token '{0}', expected an identifier")]
    ExpectedIdentifier(String),
}
