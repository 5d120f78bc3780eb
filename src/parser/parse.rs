//! Program parser
//!
//! Groups the lexer's integer stream into `(opcode, L, M)` triples. The
//! parser does not know about opcodes; decoding happens in the machine.

use crate::parser::lexer::{LexError, Lexer, Token};
use crate::parser::program::{Program, RawInstruction, SourceLocation, INSTRUCTION_WIDTH};
use std::fmt;

/// Parser error type
#[derive(Debug)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Parser over a tokenized program
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parse the entire program into instruction triples
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            let location = self.peek().location();
            let mut words = [0; INSTRUCTION_WIDTH];

            for (i, slot) in words.iter_mut().enumerate() {
                match self.advance() {
                    Token::Number(value, _) => *slot = *value,
                    Token::Eof(loc) => {
                        return Err(ParseError {
                            message: format!(
                                "Incomplete instruction: expected {} words, found {}",
                                INSTRUCTION_WIDTH, i
                            ),
                            location: *loc,
                        });
                    }
                }
            }

            program.push(RawInstruction::new(words[0], words[1], words[2]), location);
        }

        Ok(program)
    }

    fn advance(&mut self) -> &Token {
        let token = &self.tokens[self.position];
        if !matches!(token, Token::Eof(_)) {
            self.position += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }
}

/// Parse program text in one call
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    Parser::new(source)?.parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_triples() {
        let program = parse_program("7 0 13\n6 0 3\n9 0 3\n").unwrap();

        assert_eq!(program.len(), 3);
        assert_eq!(program.instructions[0], RawInstruction::new(7, 0, 13));
        assert_eq!(program.instructions[2], RawInstruction::new(9, 0, 3));
        assert_eq!(program.locations[1].line, 2);
        assert_eq!(program.word_count(), 9);
    }

    #[test]
    fn test_triples_may_span_lines() {
        let program = parse_program("1 0\n5 9 0\n3").unwrap();

        assert_eq!(
            program.instructions,
            vec![RawInstruction::new(1, 0, 5), RawInstruction::new(9, 0, 3)]
        );
    }

    #[test]
    fn test_empty_program() {
        let program = parse_program("   \n\n").unwrap();
        assert!(program.is_empty());
    }

    #[test]
    fn test_incomplete_instruction() {
        let err = parse_program("1 0 5\n9 0").unwrap_err();

        assert!(err.message.contains("found 2"));
        assert_eq!(err.location.line, 2);
    }

    #[test]
    fn test_lex_error_propagates() {
        let err = parse_program("1 0 five").unwrap_err();
        assert_eq!(err.location, SourceLocation::new(1, 5));
    }
}
