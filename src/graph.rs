//! The knowledge graph: explicit fact nodes and bidirectional fact↔rule
//! edges, built once per load and read-only from then on.
//!
//! Two maps make the solver's lookups O(1): `concluding` answers "which rules
//! could conclude fact X" (the one backward chaining lives on), and `using`
//! answers the symmetric "which rules mention X in their condition" (kept for
//! the export and statistics layers). Rules and facts are referenced by id —
//! a rule's index and a fact's letter — never by owning pointers, so there is
//! nothing cyclic to manage.

use std::collections::{BTreeSet, HashMap};
use std::hash::BuildHasherDefault;

use seahash::SeaHasher;

use crate::error::{Result, SequiturError};
use crate::parser::{Connective, Expr, Rule};

/// Index into the loaded rule list.
pub type RuleId = usize;

pub type FactHasher = BuildHasherDefault<SeaHasher>;

/// Which reading of the rule an edge represents. An `<=>` rule is one Rule
/// value with two registered readings; both report the same source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Whether the conclusion literal was negated (`!X`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

/// One way a fact can be concluded: this rule, read in this direction,
/// asserts the fact at this polarity when it fires.
#[derive(Debug, Clone, Copy)]
pub struct ConcludingEdge {
    pub rule: RuleId,
    pub direction: Direction,
    pub polarity: Polarity,
}

#[derive(Debug, Clone)]
pub struct FactNode {
    pub fact: char,
    pub is_initial: bool,
}

#[derive(Debug, Default)]
pub struct KnowledgeGraph {
    nodes: HashMap<char, FactNode, FactHasher>,
    concluding: HashMap<char, Vec<ConcludingEdge>, FactHasher>,
    using: HashMap<char, Vec<RuleId>, FactHasher>,
}

/// Flatten a conclusion tree into the literals it asserts: plain facts and
/// facts under a direct NOT, reachable through any nesting of AND/OR/XOR.
/// A NOT over a compound expression asserts nothing.
pub fn conclusion_literals(expr: &Expr) -> Vec<(char, Polarity)> {
    match expr {
        Expr::Fact(fact) => vec![(*fact, Polarity::Positive)],
        Expr::Not(inner) => match inner.as_ref() {
            Expr::Fact(fact) => vec![(*fact, Polarity::Negative)],
            _ => Vec::new(),
        },
        Expr::And(left, right) | Expr::Or(left, right) | Expr::Xor(left, right) => {
            let mut literals = conclusion_literals(left);
            literals.extend(conclusion_literals(right));
            literals
        }
    }
}

impl KnowledgeGraph {
    /// Build the graph from the parsed rules. Every fact mentioned by a
    /// rule, the initial set, or a query gets a node up front; the engine
    /// never has to create one mid-inference.
    pub fn build(
        rules: &[Rule],
        initial_facts: &BTreeSet<char>,
        queries: &[char],
    ) -> Result<Self> {
        let mut graph = Self::default();

        for fact in initial_facts {
            graph.ensure_node(*fact, initial_facts);
        }
        for fact in queries {
            graph.ensure_node(*fact, initial_facts);
        }

        for (id, rule) in rules.iter().enumerate() {
            for fact in rule.all_facts() {
                graph.ensure_node(fact, initial_facts);
            }

            let mut condition_facts = BTreeSet::new();
            rule.condition.facts(&mut condition_facts);
            for fact in condition_facts {
                graph.using.entry(fact).or_default().push(id);
            }

            let forward = conclusion_literals(&rule.conclusion);
            if forward.is_empty() {
                return Err(SequiturError::Semantic {
                    message: format!("rule '{rule}' concludes no facts"),
                    line: rule.line,
                });
            }
            for (fact, polarity) in forward {
                graph.concluding.entry(fact).or_default().push(ConcludingEdge {
                    rule: id,
                    direction: Direction::Forward,
                    polarity,
                });
            }

            // The reversed reading of an IFF: the conclusion side proves the
            // condition side. A condition with no literal shape simply does
            // not get a reverse registration; the forward one stands alone.
            if rule.connective == Connective::Iff {
                for (fact, polarity) in conclusion_literals(&rule.condition) {
                    graph.concluding.entry(fact).or_default().push(ConcludingEdge {
                        rule: id,
                        direction: Direction::Reverse,
                        polarity,
                    });
                }
            }
        }

        Ok(graph)
    }

    fn ensure_node(&mut self, fact: char, initial_facts: &BTreeSet<char>) {
        self.nodes
            .entry(fact)
            .or_insert_with(|| FactNode { fact, is_initial: initial_facts.contains(&fact) });
    }

    /// Every way `fact` can be concluded. Empty for facts no rule concludes.
    pub fn concluding(&self, fact: char) -> &[ConcludingEdge] {
        self.concluding.get(&fact).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rules that reference `fact` in their condition tree.
    pub fn using(&self, fact: char) -> &[RuleId] {
        self.using.get(&fact).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn node(&self, fact: char) -> Option<&FactNode> {
        self.nodes.get(&fact)
    }

    pub fn facts(&self) -> BTreeSet<char> {
        self.nodes.keys().copied().collect()
    }

    pub fn fact_count(&self) -> usize {
        self.nodes.len()
    }

    /// All facts `fact` transitively depends on through concluding rules.
    pub fn dependency_chain(&self, rules: &[Rule], fact: char) -> BTreeSet<char> {
        let mut visited = BTreeSet::new();
        let mut pending = vec![fact];

        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            for edge in self.concluding(current) {
                let rule = &rules[edge.rule];
                let side = match edge.direction {
                    Direction::Forward => &rule.condition,
                    Direction::Reverse => &rule.conclusion,
                };
                let mut facts = BTreeSet::new();
                side.facts(&mut facts);
                pending.extend(facts.into_iter().filter(|f| !visited.contains(f)));
            }
        }

        visited.remove(&fact);
        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn build(text: &str) -> (Vec<Rule>, KnowledgeGraph) {
        let script = parse(text).unwrap();
        let graph =
            KnowledgeGraph::build(&script.rules, &script.initial_facts, &script.queries).unwrap();
        (script.rules, graph)
    }

    #[test]
    fn concluding_edges_cover_every_literal() {
        let (_, graph) = build("A + B => Y + Z\n=A\n?Y");
        assert_eq!(graph.concluding('Y').len(), 1);
        assert_eq!(graph.concluding('Z').len(), 1);
        assert!(graph.concluding('A').is_empty());
    }

    #[test]
    fn negated_conclusions_carry_polarity() {
        let (_, graph) = build("A => !B\n=A\n?B");
        let edges = graph.concluding('B');
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].polarity, Polarity::Negative);
    }

    #[test]
    fn iff_registers_both_readings() {
        let (_, graph) = build("A + B <=> C\n=A\n?C");
        assert_eq!(graph.concluding('C').len(), 1);
        // A and B each get the reversed reading of the same rule.
        assert_eq!(graph.concluding('A').len(), 1);
        assert_eq!(graph.concluding('A')[0].direction, Direction::Reverse);
        assert_eq!(graph.concluding('A')[0].rule, graph.concluding('C')[0].rule);
    }

    #[test]
    fn using_edges_track_condition_facts() {
        let (_, graph) = build("A + B => C\nA => D\n?CD");
        assert_eq!(graph.using('A').len(), 2);
        assert_eq!(graph.using('B').len(), 1);
        assert!(graph.using('C').is_empty());
    }

    #[test]
    fn empty_conclusion_is_a_semantic_error() {
        let script = parse("A => !(B + C)").unwrap();
        let err =
            KnowledgeGraph::build(&script.rules, &script.initial_facts, &script.queries)
                .unwrap_err();
        match err {
            SequiturError::Semantic { line, .. } => assert_eq!(line, 1),
            other => panic!("expected semantic error, got {other:?}"),
        }
    }

    #[test]
    fn query_only_facts_still_get_nodes() {
        let (_, graph) = build("A => B\n=A\n?Z");
        assert!(graph.node('Z').is_some());
        assert!(graph.concluding('Z').is_empty());
    }

    #[test]
    fn nodes_remember_load_time_initials() {
        let (_, graph) = build("A => B\n=A\n?B");
        assert!(graph.node('A').unwrap().is_initial);
        assert!(!graph.node('B').unwrap().is_initial);
    }

    #[test]
    fn dependency_chain_is_transitive() {
        let (rules, graph) = build("A => B\nB => C\n=A\n?C");
        let deps = graph.dependency_chain(&rules, 'C');
        assert_eq!(deps, BTreeSet::from(['A', 'B']));
    }
}
