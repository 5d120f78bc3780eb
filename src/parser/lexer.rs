//! Lexer (tokenizer) for PM/0 program text
//!
//! Converts raw program text into a flat [`Token`] stream of signed integers.
//! Any run of non-whitespace characters that is not a valid 32-bit integer is
//! rejected with its line and column.

use super::program::{SourceLocation, Word};
use std::fmt;

/// Token variants produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(Word, SourceLocation),
    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::Number(_, loc) | Token::Eof(loc) => *loc,
        }
    }
}

/// Lexer error with location information
#[derive(Debug, Clone)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lexer error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

/// Lexer for PM/0 program text
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given program text.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                tokens.push(Token::Eof(self.current_location()));
                break;
            }

            tokens.push(self.number()?);
        }

        Ok(tokens)
    }

    /// Read one whitespace-delimited word and convert it to an integer
    fn number(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let mut text = String::new();

        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                break;
            }
            text.push(ch);
            self.advance();
        }

        let digits = text.strip_prefix(['-', '+']).unwrap_or(&text);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(LexError {
                message: format!("Expected an integer, found '{}'", text),
                location: loc,
            });
        }

        text.parse::<Word>()
            .map(|value| Token::Number(value, loc))
            .map_err(|_| LexError {
                message: format!("Integer out of range: {}", text),
                location: loc,
            })
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied()?;
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_and_lines() {
        let mut lexer = Lexer::new("7 0 10\n1 0 -5\n");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(tokens.len(), 7);
        assert!(matches!(tokens[0], Token::Number(7, _)));
        assert!(matches!(tokens[5], Token::Number(-5, _)));
        assert_eq!(tokens[3].location(), SourceLocation::new(2, 1));
        assert_eq!(tokens[5].location(), SourceLocation::new(2, 5));
        assert!(matches!(tokens[6], Token::Eof(_)));
    }

    #[test]
    fn test_tabs_and_blank_lines() {
        let mut lexer = Lexer::new("\n\n\t9\t0\t3\r\n");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Number(9, _)));
        assert_eq!(tokens[0].location().line, 3);
        assert!(matches!(tokens[2], Token::Number(3, _)));
    }

    #[test]
    fn test_rejects_garbage() {
        let mut lexer = Lexer::new("1 0 5\n2 x 1");
        let err = lexer.tokenize().unwrap_err();

        assert_eq!(err.location, SourceLocation::new(2, 3));
        assert!(err.message.contains("'x'"));
    }

    #[test]
    fn test_rejects_lone_sign_and_overflow() {
        assert!(Lexer::new("-").tokenize().is_err());
        assert!(Lexer::new("99999999999").tokenize().is_err());
        assert!(Lexer::new("+12").tokenize().is_ok());
    }
}
