//! Three-valued backward-chaining resolution.
//!
//! `resolve` proves a fact by recursively proving the rules that could
//! conclude it, consulting the knowledge graph for the candidate set. Truth
//! values are TRUE, FALSE, or UNDETERMINED, where UNDETERMINED only ever
//! arises transiently when a fact is re-encountered on the active resolution
//! stack (a cycle) and never survives as a fact's final value: a fact no
//! fired rule asserts defaults to FALSE under the closed-world policy.
//!
//! Session state — the memo cache, the in-progress stack, fired-rule and
//! cycle diagnostics — lives in an explicit [`Session`] value, never in a
//! hidden global, so callers can run independent sessions side by side.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use tracing::{debug, warn};

use crate::error::{Result, SequiturError};
use crate::graph::{Direction, FactHasher, KnowledgeGraph, Polarity, RuleId};
use crate::parser::{Expr, Rule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruthValue {
    True,
    False,
    Undetermined,
}

impl TruthValue {
    pub fn negated(self) -> Self {
        match self {
            TruthValue::True => TruthValue::False,
            TruthValue::False => TruthValue::True,
            TruthValue::Undetermined => TruthValue::Undetermined,
        }
    }

    /// AND: one FALSE operand forces FALSE no matter what the other is.
    pub fn and(left: Self, right: Self) -> Self {
        match (left, right) {
            (TruthValue::False, _) | (_, TruthValue::False) => TruthValue::False,
            (TruthValue::True, TruthValue::True) => TruthValue::True,
            _ => TruthValue::Undetermined,
        }
    }

    /// OR: one TRUE operand forces TRUE no matter what the other is.
    pub fn or(left: Self, right: Self) -> Self {
        match (left, right) {
            (TruthValue::True, _) | (_, TruthValue::True) => TruthValue::True,
            (TruthValue::False, TruthValue::False) => TruthValue::False,
            _ => TruthValue::Undetermined,
        }
    }

    /// XOR: neither operand alone can force a result, so any UNDETERMINED
    /// operand makes the combination UNDETERMINED.
    pub fn xor(left: Self, right: Self) -> Self {
        match (left, right) {
            (TruthValue::Undetermined, _) | (_, TruthValue::Undetermined) => {
                TruthValue::Undetermined
            }
            (l, r) if l != r => TruthValue::True,
            _ => TruthValue::False,
        }
    }
}

impl fmt::Display for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TruthValue::True => write!(f, "TRUE"),
            TruthValue::False => write!(f, "FALSE"),
            TruthValue::Undetermined => write!(f, "UNDETERMINED"),
        }
    }
}

/// Per-session resolution state. Valid only while the rule set and the
/// current fact set are unchanged; drop or [`Session::invalidate`] it on any
/// fact mutation.
#[derive(Debug, Default)]
pub struct Session {
    cache: HashMap<char, TruthValue, FactHasher>,
    in_progress: Vec<char>,
    fired: HashMap<char, Vec<RuleId>, FactHasher>,
    cycles: Vec<Vec<char>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every memoized value and diagnostic.
    pub fn invalidate(&mut self) {
        self.cache.clear();
        self.in_progress.clear();
        self.fired.clear();
        self.cycles.clear();
    }

    /// Rules that fired while proving `fact`, in evaluation order.
    pub fn fired(&self, fact: char) -> &[RuleId] {
        self.fired.get(&fact).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cycle paths encountered so far, e.g. `['A', 'B', 'A']`.
    pub fn cycles(&self) -> &[Vec<char>] {
        &self.cycles
    }
}

/// The resolver. Borrows the loaded rules, the graph, and the current fact
/// set; all mutation happens in the [`Session`] passed to each call.
pub struct Engine<'a> {
    rules: &'a [Rule],
    graph: &'a KnowledgeGraph,
    facts: &'a BTreeSet<char>,
}

impl<'a> Engine<'a> {
    pub fn new(rules: &'a [Rule], graph: &'a KnowledgeGraph, facts: &'a BTreeSet<char>) -> Self {
        Self { rules, graph, facts }
    }

    /// Resolve one fact to a truth value, or fail with a contradiction.
    /// The public result is always TRUE or FALSE: UNDETERMINED exists only
    /// inside an active resolution, for the fact that re-entered its own
    /// proof.
    pub fn resolve(&self, session: &mut Session, fact: char) -> Result<TruthValue> {
        self.resolve_inner(session, fact).map(|outcome| outcome.0)
    }

    /// The bool is the cycle taint: true when the value was computed under
    /// an active cycle truncation. Tainted values are valid for the stack
    /// that produced them but must not be memoized — a fact still on the
    /// stack may yet resolve differently.
    fn resolve_inner(&self, session: &mut Session, fact: char) -> Result<(TruthValue, bool)> {
        // Initial facts are axioms; they short-circuit all rule search.
        if self.facts.contains(&fact) {
            return Ok((TruthValue::True, false));
        }

        if let Some(pos) = session.in_progress.iter().position(|&f| f == fact) {
            let mut path: Vec<char> = session.in_progress[pos..].to_vec();
            path.push(fact);
            warn!(
                fact = %fact,
                path = %render_path(&path),
                "cycle detected, treating re-entered fact as undetermined"
            );
            session.cycles.push(path);
            return Ok((TruthValue::Undetermined, true));
        }

        if let Some(&cached) = session.cache.get(&fact) {
            return Ok((cached, false));
        }

        session.in_progress.push(fact);
        let result = self.prove(session, fact);
        session.in_progress.pop();

        if let Ok((value, tainted)) = result {
            if !tainted {
                session.cache.insert(fact, value);
            }
        }
        result
    }

    /// Try every rule that could conclude `fact`. A rule fires when its
    /// condition side evaluates TRUE; a fired rule asserts each of its
    /// conclusion literals at that literal's polarity. Both polarities
    /// asserted for the same fact is a contradiction. Anything no fired
    /// rule asserts is FALSE, the closed-world default.
    fn prove(&self, session: &mut Session, fact: char) -> Result<(TruthValue, bool)> {
        let mut asserted_true: Option<RuleId> = None;
        let mut asserted_false: Option<RuleId> = None;
        let mut tainted = false;

        for edge in self.graph.concluding(fact) {
            let rule = &self.rules[edge.rule];
            let condition = match edge.direction {
                Direction::Forward => &rule.condition,
                Direction::Reverse => &rule.conclusion,
            };

            let (value, condition_tainted) = self.evaluate(session, condition)?;
            tainted |= condition_tainted;
            if value == TruthValue::True {
                debug!(rule = rule.line, fact = %fact, "rule fired");
                let fired = session.fired.entry(fact).or_default();
                if !fired.contains(&edge.rule) {
                    fired.push(edge.rule);
                }
                match edge.polarity {
                    Polarity::Positive => asserted_true.get_or_insert(edge.rule),
                    Polarity::Negative => asserted_false.get_or_insert(edge.rule),
                };
            }
        }

        match (asserted_true, asserted_false) {
            (Some(positive), Some(negative)) => Err(SequiturError::Contradiction {
                fact,
                positive_rule: self.rules[positive].line,
                negative_rule: self.rules[negative].line,
            }),
            (Some(_), None) => Ok((TruthValue::True, tainted)),
            _ => Ok((TruthValue::False, tainted)),
        }
    }

    /// Evaluate an expression tree by resolving its leaves and combining
    /// under three-valued semantics. The taint flag ORs across the whole
    /// tree, even where one operand forces the classical result.
    fn evaluate(&self, session: &mut Session, expr: &Expr) -> Result<(TruthValue, bool)> {
        match expr {
            Expr::Fact(fact) => self.resolve_inner(session, *fact),
            Expr::Not(inner) => {
                let (value, tainted) = self.evaluate(session, inner)?;
                Ok((value.negated(), tainted))
            }
            Expr::And(left, right) => {
                let (left, left_tainted) = self.evaluate(session, left)?;
                let (right, right_tainted) = self.evaluate(session, right)?;
                Ok((TruthValue::and(left, right), left_tainted || right_tainted))
            }
            Expr::Or(left, right) => {
                let (left, left_tainted) = self.evaluate(session, left)?;
                let (right, right_tainted) = self.evaluate(session, right)?;
                Ok((TruthValue::or(left, right), left_tainted || right_tainted))
            }
            Expr::Xor(left, right) => {
                let (left, left_tainted) = self.evaluate(session, left)?;
                let (right, right_tainted) = self.evaluate(session, right)?;
                Ok((TruthValue::xor(left, right), left_tainted || right_tainted))
            }
        }
    }
}

fn render_path(path: &[char]) -> String {
    let mut rendered = String::new();
    for (i, fact) in path.iter().enumerate() {
        if i > 0 {
            rendered.push_str(" -> ");
        }
        rendered.push(*fact);
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::TruthValue::{False, True, Undetermined};
    use super::*;

    #[test]
    fn negation_table() {
        assert_eq!(True.negated(), False);
        assert_eq!(False.negated(), True);
        assert_eq!(Undetermined.negated(), Undetermined);
    }

    #[test]
    fn and_forces_false() {
        assert_eq!(TruthValue::and(False, Undetermined), False);
        assert_eq!(TruthValue::and(Undetermined, False), False);
        assert_eq!(TruthValue::and(True, Undetermined), Undetermined);
        assert_eq!(TruthValue::and(True, True), True);
    }

    #[test]
    fn or_forces_true() {
        assert_eq!(TruthValue::or(True, Undetermined), True);
        assert_eq!(TruthValue::or(Undetermined, True), True);
        assert_eq!(TruthValue::or(False, Undetermined), Undetermined);
        assert_eq!(TruthValue::or(False, False), False);
    }

    #[test]
    fn xor_cannot_be_forced() {
        assert_eq!(TruthValue::xor(True, Undetermined), Undetermined);
        assert_eq!(TruthValue::xor(False, Undetermined), Undetermined);
        assert_eq!(TruthValue::xor(True, False), True);
        assert_eq!(TruthValue::xor(True, True), False);
        assert_eq!(TruthValue::xor(False, False), False);
    }
}
