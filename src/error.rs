
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SequiturError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax { message: String, line: usize, column: usize },
    #[error("Semantic error at line {line}: {message}")]
    Semantic { message: String, line: usize },
    #[error(
        "Contradiction on {fact}: rule at line {positive_rule} concludes {fact} \
         while rule at line {negative_rule} concludes !{fact}"
    )]
    Contradiction { fact: char, positive_rule: usize, negative_rule: usize },
    #[error("Io error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, SequiturError>;

// Helper conversions
impl From<std::io::Error> for SequiturError {
    fn from(e: std::io::Error) -> Self { Self::Io(e.to_string()) }
}
