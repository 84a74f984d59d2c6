//! Rule-set statistics: operator counts, tree depth, per-rule complexity,
//! and per-fact degrees in the knowledge graph.

use std::collections::BTreeSet;
use std::fmt;

use crate::graph::KnowledgeGraph;
use crate::parser::{Connective, Expr, Rule};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OperatorCounts {
    pub not: usize,
    pub and: usize,
    pub or: usize,
    pub xor: usize,
}

impl OperatorCounts {
    pub fn total(&self) -> usize {
        self.not + self.and + self.or + self.xor
    }

    fn tally(&mut self, expr: &Expr) {
        match expr {
            Expr::Fact(_) => {}
            Expr::Not(inner) => {
                self.not += 1;
                self.tally(inner);
            }
            Expr::And(left, right) => {
                self.and += 1;
                self.tally(left);
                self.tally(right);
            }
            Expr::Or(left, right) => {
                self.or += 1;
                self.tally(left);
                self.tally(right);
            }
            Expr::Xor(left, right) => {
                self.xor += 1;
                self.tally(left);
                self.tally(right);
            }
        }
    }
}

/// Maximum nesting depth of an expression tree; a bare fact is depth 0.
pub fn depth(expr: &Expr) -> usize {
    match expr {
        Expr::Fact(_) => 0,
        Expr::Not(inner) => 1 + depth(inner),
        Expr::And(left, right) | Expr::Or(left, right) | Expr::Xor(left, right) => {
            1 + depth(left).max(depth(right))
        }
    }
}

#[derive(Debug)]
pub struct RuleSetStats {
    pub total_rules: usize,
    pub biconditional_rules: usize,
    pub operators: OperatorCounts,
    pub max_depth: usize,
    pub mean_complexity: f64,
    pub facts_used: BTreeSet<char>,
    pub facts_concluded: BTreeSet<char>,
}

/// Walk every rule once and collect the aggregate metrics. Complexity of a
/// rule is its total operator count across both trees.
pub fn analyze(rules: &[Rule]) -> RuleSetStats {
    let mut operators = OperatorCounts::default();
    let mut max_depth = 0;
    let mut complexity_total = 0usize;
    let mut biconditional_rules = 0;
    let mut facts_used = BTreeSet::new();
    let mut facts_concluded = BTreeSet::new();

    for rule in rules {
        if rule.connective == Connective::Iff {
            biconditional_rules += 1;
        }

        let mut per_rule = OperatorCounts::default();
        per_rule.tally(&rule.condition);
        per_rule.tally(&rule.conclusion);
        complexity_total += per_rule.total();

        operators.not += per_rule.not;
        operators.and += per_rule.and;
        operators.or += per_rule.or;
        operators.xor += per_rule.xor;

        max_depth = max_depth.max(depth(&rule.condition)).max(depth(&rule.conclusion));

        rule.condition.facts(&mut facts_used);
        rule.conclusion.facts(&mut facts_concluded);
    }

    let mean_complexity = if rules.is_empty() {
        0.0
    } else {
        complexity_total as f64 / rules.len() as f64
    };

    RuleSetStats {
        total_rules: rules.len(),
        biconditional_rules,
        operators,
        max_depth,
        mean_complexity,
        facts_used,
        facts_concluded,
    }
}

/// (fact, rules concluding it, rules using it) for every fact in the graph.
pub fn fact_degrees(graph: &KnowledgeGraph) -> Vec<(char, usize, usize)> {
    graph
        .facts()
        .into_iter()
        .map(|fact| (fact, graph.concluding(fact).len(), graph.using(fact).len()))
        .collect()
}

impl fmt::Display for RuleSetStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Rules:          {}", self.total_rules)?;
        writeln!(f, "Biconditional:  {}", self.biconditional_rules)?;
        writeln!(
            f,
            "Operators:      ! {}  + {}  | {}  ^ {}",
            self.operators.not, self.operators.and, self.operators.or, self.operators.xor
        )?;
        writeln!(f, "Max tree depth: {}", self.max_depth)?;
        writeln!(f, "Mean complexity: {:.2}", self.mean_complexity)?;
        let used: String = self.facts_used.iter().collect();
        let concluded: String = self.facts_concluded.iter().collect();
        writeln!(f, "Facts used:      {used}")?;
        write!(f, "Facts concluded: {concluded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn counts_and_depth() {
        let script = parse("A + !B => C\n(A | B) ^ C => D\nA <=> E\n?CDE").unwrap();
        let stats = analyze(&script.rules);
        assert_eq!(stats.total_rules, 3);
        assert_eq!(stats.biconditional_rules, 1);
        assert_eq!(stats.operators.not, 1);
        assert_eq!(stats.operators.and, 1);
        assert_eq!(stats.operators.or, 1);
        assert_eq!(stats.operators.xor, 1);
        // (A | B) ^ C nests two levels deep.
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.facts_concluded, BTreeSet::from(['C', 'D', 'E']));
    }

    #[test]
    fn empty_rule_set_has_zero_mean() {
        let stats = analyze(&[]);
        assert_eq!(stats.mean_complexity, 0.0);
    }
}
