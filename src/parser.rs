//! Recursive-descent parser.
//!
//! One function per grammar rule, layered by precedence (loosest first):
//!
//! ```text
//! expression         = logical_expression;
//! logical_expression = logical_term { "||" logical_term };
//! logical_term       = logical_factor { "&&" logical_factor };
//! logical_factor     = relational_expression | "!" logical_factor;
//! relational_expr    = arithmetic_expression { ("<"|">"|"<="|">="|"=="|"!=") arithmetic_expression };
//! arithmetic_expr    = arithmetic_term { ("+"|"-") arithmetic_term };
//! arithmetic_term    = callable_expression { ("*"|"/") callable_expression };
//! callable_expr      = simple_expression { expression_list };
//! simple_expression  = <number> | <boolean> | <identifier> | "(" expression ")"
//!                    | "-" simple_expression | function_expression;
//! ```
//!
//! Every binary layer folds left, so `a-b-c` parses as `(a-b)-c`.

use std::rc::Rc;

use crate::ast::{BinaryOp, Expr, FunctionLiteral, Stmt};
use crate::diag::{Position, SyntaxError, SyntaxErrorKind};
use crate::token::Token;

pub struct Parser {
    tokens: Vec<(Position, Token)>,
    pos: usize,
}

impl Parser {
    /// Creates a parser over a scanned token sequence.  The end-of-input
    /// sentinel is appended here, not by the scanner.
    pub fn new(mut tokens: Vec<(Position, Token)>) -> Parser {
        let sentinel_pos = tokens.last().map_or(1, |(pos, _)| *pos);
        tokens.push((sentinel_pos, Token::Eof));
        Parser { tokens, pos: 0 }
    }

    /// Parses a whole program: exactly one statement.  Tokens past that
    /// statement are ignored.
    pub fn parse_program(&mut self) -> Result<Stmt, SyntaxError> {
        self.statement()
    }

    /// Parses a single expression.  Used by tests.
    #[allow(dead_code)]
    pub fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        self.expression()
    }

    fn statement(&mut self) -> Result<Stmt, SyntaxError> {
        match self.current() {
            Token::LeftCurly => self.block_statement(),
            Token::If => self.if_statement(),
            Token::While => self.while_statement(),
            Token::Return => self.return_statement(),
            Token::Print => self.print_statement(),
            // One token of lookahead disambiguates a named function
            // declaration from a function literal expression, and an
            // assignment from a plain identifier expression.
            Token::Function if matches!(self.lookahead(), Token::Identifier(_)) => {
                self.function_statement()
            }
            Token::Identifier(_) if self.lookahead() == &Token::Equal => self.assignment(),
            _ => Ok(Stmt::Expr(self.expression()?)),
        }
    }

    /// block_statement = "{" {";"} [ statement { ";" {";"} statement } {";"} ] "}";
    fn block_statement(&mut self) -> Result<Stmt, SyntaxError> {
        self.consume(Token::LeftCurly)?;
        let mut statements = vec![];
        self.skip_semicolons();
        while self.current() != &Token::RightCurly {
            statements.push(self.statement()?);
            if self.current() != &Token::Semicolon {
                break;
            }
            self.skip_semicolons();
        }
        self.consume(Token::RightCurly)?;
        Ok(Stmt::Block(statements))
    }

    fn skip_semicolons(&mut self) {
        while self.current() == &Token::Semicolon {
            self.advance();
        }
    }

    fn if_statement(&mut self) -> Result<Stmt, SyntaxError> {
        self.consume(Token::If)?;
        self.consume(Token::LeftParen)?;
        let condition = self.expression()?;
        self.consume(Token::RightParen)?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.current() == &Token::Else {
            self.advance();
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt, SyntaxError> {
        self.consume(Token::While)?;
        self.consume(Token::LeftParen)?;
        let condition = self.expression()?;
        self.consume(Token::RightParen)?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition, body })
    }

    /// return_statement = "return" [ expression ];
    fn return_statement(&mut self) -> Result<Stmt, SyntaxError> {
        self.consume(Token::Return)?;
        let value = match self.current() {
            Token::Semicolon | Token::RightCurly | Token::Eof => None,
            _ => Some(self.expression()?),
        };
        Ok(Stmt::Return(value))
    }

    fn print_statement(&mut self) -> Result<Stmt, SyntaxError> {
        self.consume(Token::Print)?;
        let arguments = self.expression_list()?;
        Ok(Stmt::Print(arguments))
    }

    /// function_statement = "function" <identifier> identifier_list block_statement;
    ///
    /// Desugared at parse time: `function f(x) {...}` produces the same AST
    /// as `f = function(x) {...}`.
    fn function_statement(&mut self) -> Result<Stmt, SyntaxError> {
        self.consume(Token::Function)?;
        let name = self.identifier()?;
        let parameters = self.identifier_list()?;
        let body = self.block_statement()?;
        Ok(Stmt::Assign(
            name,
            Expr::Function(Rc::new(FunctionLiteral { parameters, body })),
        ))
    }

    /// assignment = <identifier> "=" expression;
    fn assignment(&mut self) -> Result<Stmt, SyntaxError> {
        let name = self.identifier()?;
        self.consume(Token::Equal)?;
        let value = self.expression()?;
        Ok(Stmt::Assign(name, value))
    }

    fn expression(&mut self) -> Result<Expr, SyntaxError> {
        self.logical_expression()
    }

    fn logical_expression(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.logical_term()?;
        while self.current() == &Token::OrOr {
            self.advance();
            let rhs = self.logical_term()?;
            expr = Expr::Binary(BinaryOp::Or, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn logical_term(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.logical_factor()?;
        while self.current() == &Token::AndAnd {
            self.advance();
            let rhs = self.logical_factor()?;
            expr = Expr::Binary(BinaryOp::And, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    /// logical_factor = relational_expression | "!" logical_factor;
    fn logical_factor(&mut self) -> Result<Expr, SyntaxError> {
        if self.current() == &Token::Bang {
            self.advance();
            Ok(Expr::Not(Box::new(self.logical_factor()?)))
        } else {
            self.relational_expression()
        }
    }

    fn relational_expression(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.arithmetic_expression()?;
        loop {
            let op = match self.current() {
                Token::Less => BinaryOp::Less,
                Token::Greater => BinaryOp::Greater,
                Token::LessEqual => BinaryOp::LessEqual,
                Token::GreaterEqual => BinaryOp::GreaterEqual,
                Token::EqualEqual => BinaryOp::Equal,
                Token::BangEqual => BinaryOp::NotEqual,
                _ => break,
            };
            self.advance();
            let rhs = self.arithmetic_expression()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn arithmetic_expression(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.arithmetic_term()?;
        loop {
            let op = match self.current() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.arithmetic_term()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn arithmetic_term(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.callable_expression()?;
        loop {
            let op = match self.current() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.callable_expression()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    /// callable_expression = simple_expression { expression_list };
    ///
    /// Each argument list wraps the previous result, so `f()(1,2)` calls the
    /// result of calling `f`.
    fn callable_expression(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.simple_expression()?;
        while self.current() == &Token::LeftParen {
            let arguments = self.expression_list()?;
            expr = Expr::Call {
                callee: Box::new(expr),
                arguments,
            };
        }
        Ok(expr)
    }

    fn simple_expression(&mut self) -> Result<Expr, SyntaxError> {
        match self.current().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Token::True => {
                self.advance();
                Ok(Expr::Boolean(true))
            }
            Token::False => {
                self.advance();
                Ok(Expr::Boolean(false))
            }
            Token::Identifier(name) => {
                self.advance();
                Ok(Expr::Identifier(name))
            }
            Token::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(Token::RightParen)?;
                // No wrapper node: the parentheses only affect grouping.
                Ok(expr)
            }
            Token::Minus => {
                self.advance();
                Ok(Expr::Negate(Box::new(self.simple_expression()?)))
            }
            Token::Function => self.function_expression(),
            found => Err(self.error(SyntaxErrorKind::ExpectedExpression(found.to_string()))),
        }
    }

    /// function_expression = "function" identifier_list block_statement;
    fn function_expression(&mut self) -> Result<Expr, SyntaxError> {
        self.consume(Token::Function)?;
        let parameters = self.identifier_list()?;
        let body = self.block_statement()?;
        Ok(Expr::Function(Rc::new(FunctionLiteral { parameters, body })))
    }

    /// identifier_list = "(" [ <identifier> { "," <identifier> } ] ")";
    fn identifier_list(&mut self) -> Result<Vec<String>, SyntaxError> {
        self.consume(Token::LeftParen)?;
        let mut names = vec![];
        if self.current() != &Token::RightParen {
            loop {
                names.push(self.identifier()?);
                if self.current() != &Token::Comma {
                    break;
                }
                self.advance();
            }
        }
        self.consume(Token::RightParen)?;
        Ok(names)
    }

    /// expression_list = "(" [ expression { "," expression } ] ")";
    fn expression_list(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        self.consume(Token::LeftParen)?;
        let mut expressions = vec![];
        if self.current() != &Token::RightParen {
            loop {
                expressions.push(self.expression()?);
                if self.current() != &Token::Comma {
                    break;
                }
                self.advance();
            }
        }
        self.consume(Token::RightParen)?;
        Ok(expressions)
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos].1
    }

    fn current_pos(&self) -> Position {
        self.tokens[self.pos].0
    }

    /// The token after the current one (the sentinel when out of input).
    fn lookahead(&self) -> &Token {
        let next = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[next].1
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn consume(&mut self, expected: Token) -> Result<(), SyntaxError> {
        if self.current() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(SyntaxErrorKind::UnexpectedToken {
                found: self.current().to_string(),
                expected: expected.to_string(),
            }))
        }
    }

    fn identifier(&mut self) -> Result<String, SyntaxError> {
        if let Token::Identifier(name) = self.current() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error(SyntaxErrorKind::ExpectedIdentifier(
                self.current().to_string(),
            )))
        }
    }

    fn error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError {
            pos: self.current_pos(),
            kind,
        }
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser").field("pos", &self.pos).finish()
    }
}
