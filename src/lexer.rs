//! Tokenizer for the rule/fact/query input language.
//!
//! The token set is fixed and tiny: single uppercase-letter facts, the five
//! operators `! + | ^` and parentheses, the two connectives `=>` and `<=>`,
//! the line markers `=` (initial facts) and `?` (queries), and end-of-line.
//! Comments (`#` to end of line) and blank space are stripped here, so the
//! parser never sees them. Tokenization is pure: text in, located tokens out.

use logos::Logos;

use crate::error::{Result, SequiturError};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("!")]
    Not,

    #[token("+")]
    And,

    #[token("|")]
    Or,

    #[token("^")]
    Xor,

    // Longest match wins, so `=>` and `<=>` take precedence over `=`.
    #[token("=>")]
    Implies,

    #[token("<=>")]
    Iff,

    #[token("=")]
    InitialMarker,

    #[token("?")]
    QueryMarker,

    #[token("\n")]
    Eol,

    #[regex(r"[A-Z]", |lex| lex.slice().as_bytes()[0] as char)]
    Fact(char),
}

impl Token {
    /// How the token reads in an error message.
    pub fn describe(&self) -> &'static str {
        match self {
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::Not => "'!'",
            Token::And => "'+'",
            Token::Or => "'|'",
            Token::Xor => "'^'",
            Token::Implies => "'=>'",
            Token::Iff => "'<=>'",
            Token::InitialMarker => "'='",
            Token::QueryMarker => "'?'",
            Token::Eol => "end of line",
            Token::Fact(_) => "fact",
        }
    }
}

/// A token plus where it came from, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

/// Maps byte offsets to 1-based (line, column) pairs.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                starts.push(offset + 1);
            }
        }
        Self { starts }
    }

    fn locate(&self, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&start| start <= offset);
        (line, offset - self.starts[line - 1] + 1)
    }
}

/// Tokenize the whole input, or fail on the first unrecognized character.
pub fn tokenize(text: &str) -> Result<Vec<Lexeme>> {
    let index = LineIndex::new(text);
    let mut lexer = Token::lexer(text);
    let mut lexemes = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let (line, column) = index.locate(span.start);
        match result {
            Ok(token) => lexemes.push(Lexeme { token, line, column }),
            Err(()) => {
                return Err(SequiturError::Syntax {
                    message: format!("unexpected character '{}'", &text[span.start..span.end]),
                    line,
                    column,
                });
            }
        }
    }

    Ok(lexemes)
}
