//! Expression trees, rules, and the line-oriented parser.
//!
//! Grammar, highest to lowest precedence:
//!
//! ```text
//! primary -> '(' expr ')' | FACT
//! unary   -> '!' unary | primary
//! and     -> unary ( '+' unary )*
//! or      -> and   ( '|' and   )*
//! expr    -> or    ( '^' or    )*
//! ```
//!
//! All binary operators are left-associative. The connectives `=>` and `<=>`
//! bind looser than every operator and exactly one must appear per rule line,
//! splitting it into a condition and a conclusion. A line starting with `=`
//! declares initial facts, a line starting with `?` declares query targets.
//! Any malformed line aborts the whole load; skipping a line would silently
//! drop logic the caller expects to be present.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Result, SequiturError};
use crate::lexer::{tokenize, Lexeme, Token};

/// A logical expression over facts. Immutable once parsed; each rule owns
/// its own trees outright, even when two rules spell the same condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Fact(char),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Xor(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Collect every fact letter referenced anywhere in this tree.
    pub fn facts(&self, out: &mut BTreeSet<char>) {
        match self {
            Expr::Fact(fact) => {
                out.insert(*fact);
            }
            Expr::Not(inner) => inner.facts(out),
            Expr::And(left, right) | Expr::Or(left, right) | Expr::Xor(left, right) => {
                left.facts(out);
                right.facts(out);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Fact(fact) => write!(f, "{fact}"),
            Expr::Not(inner) => write!(f, "!{inner}"),
            Expr::And(left, right) => write!(f, "({left} + {right})"),
            Expr::Or(left, right) => write!(f, "({left} | {right})"),
            Expr::Xor(left, right) => write!(f, "({left} ^ {right})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    Implies,
    Iff,
}

/// A parsed rule. `line` is the 1-based source line, the stable identifier
/// used by diagnostics, cycle reports, and contradiction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub line: usize,
    pub condition: Expr,
    pub connective: Connective,
    pub conclusion: Expr,
}

impl Rule {
    pub fn all_facts(&self) -> BTreeSet<char> {
        let mut facts = BTreeSet::new();
        self.condition.facts(&mut facts);
        self.conclusion.facts(&mut facts);
        facts
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let connective = match self.connective {
            Connective::Implies => "=>",
            Connective::Iff => "<=>",
        };
        write!(f, "{} {} {}", self.condition, connective, self.conclusion)
    }
}

/// Everything one input text declares: rules, the facts asserted true at
/// start, and the query targets, in source order.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub rules: Vec<Rule>,
    pub initial_facts: BTreeSet<char>,
    pub queries: Vec<char>,
}

/// Parse a whole input text into a [`Script`].
pub fn parse(text: &str) -> Result<Script> {
    let lexemes = tokenize(text)?;
    let mut script = Script::default();

    for line in lexemes.split(|lexeme| lexeme.token == Token::Eol) {
        if line.is_empty() {
            continue;
        }
        match line[0].token {
            Token::InitialMarker => parse_fact_list(&line[1..], &line[0], |fact| {
                // duplicates are permitted and idempotent
                script.initial_facts.insert(fact);
            })?,
            Token::QueryMarker => {
                if line.len() == 1 {
                    return Err(expected("at least one fact after '?'", &line[0], after(&line[0])));
                }
                parse_fact_list(&line[1..], &line[0], |fact| script.queries.push(fact))?;
            }
            _ => script.rules.push(parse_rule_line(line)?),
        }
    }

    Ok(script)
}

/// An `=`/`?` line body: nothing but facts allowed.
fn parse_fact_list(body: &[Lexeme], marker: &Lexeme, mut sink: impl FnMut(char)) -> Result<()> {
    for lexeme in body {
        match lexeme.token {
            Token::Fact(fact) => sink(fact),
            other => {
                return Err(SequiturError::Syntax {
                    message: format!(
                        "only facts may follow {}, got {}",
                        marker.token.describe(),
                        other.describe()
                    ),
                    line: lexeme.line,
                    column: lexeme.column,
                });
            }
        }
    }
    Ok(())
}

fn parse_rule_line(line: &[Lexeme]) -> Result<Rule> {
    let mut cursor = Cursor::new(line);
    let condition = cursor.parse_expr()?;

    let connective = match cursor.peek() {
        Some(Token::Implies) => Connective::Implies,
        Some(Token::Iff) => Connective::Iff,
        _ => return Err(cursor.unexpected("'=>' or '<=>'")),
    };
    cursor.advance();

    let conclusion = cursor.parse_expr()?;

    // A second connective, a stray ')', anything at all: the line is over.
    match cursor.peek() {
        None => Ok(Rule { line: line[0].line, condition, connective, conclusion }),
        Some(Token::Implies) | Some(Token::Iff) => {
            Err(cursor.unexpected("end of line (a rule may contain only one connective)"))
        }
        Some(_) => Err(cursor.unexpected("end of line")),
    }
}

fn expected(message: &str, at: &Lexeme, column: usize) -> SequiturError {
    SequiturError::Syntax { message: format!("expected {message}"), line: at.line, column }
}

// Column just past a lexeme, for "something is missing here" errors.
fn after(lexeme: &Lexeme) -> usize {
    lexeme.column + 1
}

/// Token cursor over one line, with the recursive-descent levels.
struct Cursor<'a> {
    line: &'a [Lexeme],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a [Lexeme]) -> Self {
        Self { line, pos: 0 }
    }

    fn peek(&self) -> Option<Token> {
        self.line.get(self.pos).map(|lexeme| lexeme.token)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Error at the current position, naming what was wanted.
    fn unexpected(&self, wanted: &str) -> SequiturError {
        match self.line.get(self.pos) {
            Some(lexeme) => SequiturError::Syntax {
                message: format!("expected {wanted}, got {}", lexeme.token.describe()),
                line: lexeme.line,
                column: lexeme.column,
            },
            None => {
                let last = &self.line[self.line.len() - 1];
                SequiturError::Syntax {
                    message: format!("expected {wanted}, got end of line"),
                    line: last.line,
                    column: after(last),
                }
            }
        }
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_xor()
    }

    fn parse_xor(&mut self) -> Result<Expr> {
        let mut left = self.parse_or()?;
        while self.peek() == Some(Token::Xor) {
            self.advance();
            let right = self.parse_or()?;
            left = Expr::Xor(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        while self.peek() == Some(Token::And) {
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.peek() == Some(Token::Not) {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_expr()?;
                if self.peek() != Some(Token::RParen) {
                    return Err(self.unexpected("')'"));
                }
                self.advance();
                Ok(inner)
            }
            Some(Token::Fact(fact)) => {
                self.advance();
                Ok(Expr::Fact(fact))
            }
            _ => Err(self.unexpected("'(', '!' or a fact")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(text: &str) -> Rule {
        let script = parse(text).unwrap();
        assert_eq!(script.rules.len(), 1);
        script.rules.into_iter().next().unwrap()
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let parsed = rule("A + B | C => D");
        assert_eq!(parsed.condition.to_string(), "((A + B) | C)");
    }

    #[test]
    fn or_binds_tighter_than_xor() {
        let parsed = rule("A | B ^ C => D");
        assert_eq!(parsed.condition.to_string(), "((A | B) ^ C)");
    }

    #[test]
    fn binary_operators_are_left_associative() {
        let parsed = rule("A + B + C => D");
        assert_eq!(parsed.condition.to_string(), "((A + B) + C)");
    }

    #[test]
    fn parentheses_override_precedence() {
        let parsed = rule("A + (B | C) => D");
        assert_eq!(parsed.condition.to_string(), "(A + (B | C))");
    }

    #[test]
    fn not_applies_to_the_nearest_operand() {
        let parsed = rule("!A + B => C");
        assert_eq!(parsed.condition.to_string(), "(!A + B)");
        let parsed = rule("!!A => C");
        assert_eq!(parsed.condition.to_string(), "!!A");
    }

    #[test]
    fn iff_is_recognized() {
        let parsed = rule("A + B <=> C");
        assert_eq!(parsed.connective, Connective::Iff);
    }

    #[test]
    fn initial_and_query_lines() {
        let script = parse("A => B\n=AAC\n?BC\n").unwrap();
        assert_eq!(script.initial_facts.iter().collect::<Vec<_>>(), vec![&'A', &'C']);
        assert_eq!(script.queries, vec!['B', 'C']);
    }

    #[test]
    fn empty_initial_line_is_valid() {
        let script = parse("A => B\n=\n?B").unwrap();
        assert!(script.initial_facts.is_empty());
    }

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        let script = parse("# header\n\nA => B\n\n=A\n?B\n").unwrap();
        assert_eq!(script.rules.len(), 1);
    }

    #[test]
    fn two_connectives_are_rejected() {
        let err = parse("A => B => C").unwrap_err();
        assert!(err.to_string().contains("only one connective"), "{err}");
    }

    #[test]
    fn missing_connective_is_rejected() {
        assert!(parse("A + B").is_err());
    }

    #[test]
    fn unmatched_parenthesis_is_rejected() {
        let err = parse("(A + B => C").unwrap_err();
        match err {
            SequiturError::Syntax { line, .. } => assert_eq!(line, 1),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn missing_operand_is_rejected() {
        assert!(parse("A + => B").is_err());
        assert!(parse("A + | B => C").is_err());
        assert!(parse("=> B").is_err());
    }

    #[test]
    fn empty_query_line_is_rejected() {
        assert!(parse("A => B\n?").is_err());
    }

    #[test]
    fn error_positions_point_at_the_offender() {
        let err = parse("A + B => C\nD + + E => F").unwrap_err();
        match err {
            SequiturError::Syntax { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, 5);
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn rule_keeps_its_source_line() {
        let script = parse("# comment\nA => B\n\nC => D\n").unwrap();
        assert_eq!(script.rules[0].line, 2);
        assert_eq!(script.rules[1].line, 4);
    }
}
