//! Lexical analyzer

use std::iter::Peekable;
use std::str::Chars;

use crate::diag::{Position, SyntaxError, SyntaxErrorKind};
use crate::token::Token;

/// Turns source text into the ordered token sequence the parser consumes.
///
/// The returned sequence does not include a trailing sentinel; the parser
/// appends its own [`Token::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<(Position, Token)>, SyntaxError> {
    let mut scanner = Scanner::new(source);
    let mut tokens = vec![];
    loop {
        match scanner.get_token()? {
            (_, Token::Eof) => break,
            pos_and_token => tokens.push(pos_and_token),
        }
    }
    Ok(tokens)
}

/// Turn a sequence of characters into a sequence of tokens.
pub struct Scanner<'s> {
    input: Peekable<Chars<'s>>,
    line: Position,

    // Buffer used when scanning longer tokens.  Allocated here to reuse memory.
    buf: String,
}

impl<'s> Scanner<'s> {
    pub fn new(source: &'s str) -> Scanner<'s> {
        Scanner {
            input: source.chars().peekable(),
            line: 1,
            buf: String::new(),
        }
    }

    /// Scan next token and return it with the line it starts on.
    pub fn get_token(&mut self) -> Result<(Position, Token), SyntaxError> {
        self.get_raw_token().map(|token| (self.line, token))
    }

    fn get_raw_token(&mut self) -> Result<Token, SyntaxError> {
        loop {
            match self.input.next() {
                None => return Ok(Token::Eof),
                Some(ch) => match ch {
                    '\n' => self.line += 1,
                    ' ' | '\t' | '\r' => (),
                    '+' => return Ok(Token::Plus),
                    '-' => return Ok(Token::Minus),
                    '*' => return Ok(Token::Star),
                    '/' => {
                        if self.input.peek() == Some(&'/') {
                            self.skip_comment();
                        } else {
                            return Ok(Token::Slash);
                        }
                    }
                    '(' => return Ok(Token::LeftParen),
                    ')' => return Ok(Token::RightParen),
                    '{' => return Ok(Token::LeftCurly),
                    '}' => return Ok(Token::RightCurly),
                    ';' => return Ok(Token::Semicolon),
                    ',' => return Ok(Token::Comma),
                    '<' => return Ok(self.with_optional_equal(Token::LessEqual, Token::Less)),
                    '>' => {
                        return Ok(self.with_optional_equal(Token::GreaterEqual, Token::Greater))
                    }
                    '=' => return Ok(self.with_optional_equal(Token::EqualEqual, Token::Equal)),
                    '!' => return Ok(self.with_optional_equal(Token::BangEqual, Token::Bang)),
                    '&' => {
                        if self.input.peek() == Some(&'&') {
                            self.input.next();
                            return Ok(Token::AndAnd);
                        } else {
                            return Err(self.error(SyntaxErrorKind::BadChar(ch)));
                        }
                    }
                    '|' => {
                        if self.input.peek() == Some(&'|') {
                            self.input.next();
                            return Ok(Token::OrOr);
                        } else {
                            return Err(self.error(SyntaxErrorKind::BadChar(ch)));
                        }
                    }
                    '0'..='9' => return self.scan_number(ch),
                    'a'..='z' | 'A'..='Z' | '_' => return Ok(self.scan_identifier(ch)),
                    _ => return Err(self.error(SyntaxErrorKind::BadChar(ch))),
                },
            };
        }
    }

    /// If the next character is '=', consume it and return `with_equal`,
    /// otherwise return `without_equal`.
    fn with_optional_equal(&mut self, with_equal: Token, without_equal: Token) -> Token {
        if self.input.peek() == Some(&'=') {
            self.input.next();
            with_equal
        } else {
            without_equal
        }
    }

    fn scan_number(&mut self, first_digit: char) -> Result<Token, SyntaxError> {
        self.buf.clear();
        self.buf.push(first_digit);
        while let Some(&ch) = self.input.peek() {
            if ch.is_ascii_digit() || ch == '.' {
                self.buf.push(ch);
                self.input.next();
            } else {
                break;
            }
        }

        // Optional exponent part: 1e9, 2.5E-3, ...
        if let Some(&(ch @ ('e' | 'E'))) = self.input.peek() {
            self.buf.push(ch);
            self.input.next();
            if let Some(&(sign @ ('+' | '-'))) = self.input.peek() {
                self.buf.push(sign);
                self.input.next();
            }
            while let Some(&digit) = self.input.peek() {
                if digit.is_ascii_digit() {
                    self.buf.push(digit);
                    self.input.next();
                } else {
                    break;
                }
            }
        }

        match self.buf.parse::<f64>() {
            Ok(n) => Ok(Token::Number(n)),
            Err(_) => Err(self.error(SyntaxErrorKind::BadNumberLiteral(self.buf.clone()))),
        }
    }

    fn skip_comment(&mut self) {
        while let Some(&ch) = self.input.peek() {
            if ch == '\n' {
                break;
            }
            self.input.next();
        }
    }

    fn scan_identifier(&mut self, first_char: char) -> Token {
        self.buf.clear();
        self.buf.push(first_char);
        while let Some(&ch) = self.input.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.buf.push(ch);
                self.input.next();
            } else {
                break;
            }
        }

        match self.buf.as_str() {
            "true" => Token::True,
            "false" => Token::False,
            "function" => Token::Function,
            "if" => Token::If,
            "else" => Token::Else,
            "while" => Token::While,
            "return" => Token::Return,
            "print" => Token::Print,
            _ => Token::Identifier(self.buf.clone()),
        }
    }

    fn error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError {
            pos: self.line,
            kind,
        }
    }
}

impl std::fmt::Debug for Scanner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner").field("line", &self.line).finish()
    }
}
