//! Lexical analysis: turns Monkey source text into a stream of [Token]s.
//!
//! The [Lexer] does no lookahead beyond a single character and never retains its input beyond the
//! next [Token] it hands back; identifiers, numbers, and string contents are sliced directly out
//! of the source text.
//!
//! ```
//! use monkey::lexer::Lexer;
//! use monkey::token::TokenKind::*;
//!
//! let mut lexer = Lexer::new("let x = 5 + 5;");
//! let kinds: Vec<_> = std::iter::from_fn(|| {
//!     let token = lexer.next_token();
//!     (token.kind != Eof).then_some(token.kind)
//! })
//! .collect();
//!
//! assert_eq!(vec![Let, Ident, Assign, Int, Plus, Int, Semicolon], kinds);
//! ```

use crate::token::{lookup_ident, Token, TokenKind};

/// Scans Monkey source code and yields [Token]s on demand.
///
/// Once the input is exhausted, [Lexer::next_token] returns [TokenKind::Eof] forever.
#[derive(Debug)]
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    read_position: usize,
    ch: char,
}

const SENTINEL: char = '\u{0}';

impl<'a> Lexer<'a> {
    /// Start scanning the given string of source code.
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer {
            input,
            position: 0,
            read_position: 0,
            ch: SENTINEL,
        };
        lexer.read_char();
        lexer
    }

    /// Return the next [Token] from the input. Past end-of-input, always returns
    /// [TokenKind::Eof].
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let token = match self.ch {
            '=' => {
                if self.peek_char() == '=' {
                    self.read_char();
                    Token::new(TokenKind::Eq, "==")
                } else {
                    Token::new(TokenKind::Assign, "=")
                }
            }
            '+' => Token::new(TokenKind::Plus, "+"),
            '-' => Token::new(TokenKind::Minus, "-"),
            '!' => {
                if self.peek_char() == '=' {
                    self.read_char();
                    Token::new(TokenKind::NotEq, "!=")
                } else {
                    Token::new(TokenKind::Bang, "!")
                }
            }
            '/' => Token::new(TokenKind::Slash, "/"),
            '*' => Token::new(TokenKind::Asterisk, "*"),
            '<' => Token::new(TokenKind::Lt, "<"),
            '>' => Token::new(TokenKind::Gt, ">"),
            ';' => Token::new(TokenKind::Semicolon, ";"),
            ':' => Token::new(TokenKind::Colon, ":"),
            ',' => Token::new(TokenKind::Comma, ","),
            '(' => Token::new(TokenKind::LParen, "("),
            ')' => Token::new(TokenKind::RParen, ")"),
            '{' => Token::new(TokenKind::LBrace, "{"),
            '}' => Token::new(TokenKind::RBrace, "}"),
            '[' => Token::new(TokenKind::LBracket, "["),
            ']' => Token::new(TokenKind::RBracket, "]"),
            '"' => Token::new(TokenKind::Str, self.read_string()),
            SENTINEL => Token::new(TokenKind::Eof, ""),
            c if is_letter(c) => {
                let ident = self.read_identifier();
                return Token::new(lookup_ident(ident), ident);
            }
            c if c.is_ascii_digit() => return Token::new(TokenKind::Int, self.read_number()),
            c => Token::new(TokenKind::Illegal, c.to_string()),
        };

        self.read_char();
        token
    }

    /// Reads the identifier starting at the current character, leaving `self.ch` on the first
    /// character that is no longer part of it.
    fn read_identifier(&mut self) -> &'a str {
        let start = self.position;
        while is_letter(self.ch) {
            self.read_char();
        }
        &self.input[start..self.position]
    }

    /// Reads a run of digits, leaving `self.ch` on the first non-digit.
    fn read_number(&mut self) -> &'a str {
        let start = self.position;
        while self.ch.is_ascii_digit() {
            self.read_char();
        }
        &self.input[start..self.position]
    }

    /// Reads a string literal's contents, not including the surrounding quotes. Expects the
    /// opening quote to be the current character; leaves `self.ch` on the closing quote (or the
    /// sentinel, if the string was never terminated).
    fn read_string(&mut self) -> &'a str {
        let start = self.position + 1;
        loop {
            self.read_char();
            if self.ch == '"' || self.ch == SENTINEL {
                break;
            }
        }
        &self.input[start..self.position]
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, ' ' | '\t' | '\n' | '\r') {
            self.read_char();
        }
    }

    fn read_char(&mut self) {
        self.ch = self
            .input
            .get(self.read_position..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or(SENTINEL);
        self.position = self.read_position;
        self.read_position += self.ch.len_utf8();
    }

    fn peek_char(&self) -> char {
        self.input
            .get(self.read_position..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or(SENTINEL)
    }
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}
