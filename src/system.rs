//! The system facade wiring lexer, parser, graph, and engine together.
//!
//! [`ExpertSystem::load`] takes input text through tokenization, parsing, and
//! graph construction in one shot, failing fast on any syntax or semantic
//! error so no partial knowledge graph is ever queried. After a successful
//! load the facade answers `resolve` calls, memoizing across the queries of
//! one run, and supports interactive fact mutation — every mutation
//! invalidates all memoized results, since a cached value is only valid for
//! the fact set it was computed under.

use std::collections::BTreeSet;

use tracing::info;

use crate::engine::{Engine, Session, TruthValue};
use crate::error::Result;
use crate::graph::KnowledgeGraph;
use crate::parser::{parse, Rule};

/// The outcome of resolving one query target: a truth value, or the
/// contradiction that prevented one, plus the source lines of the rules
/// that fired while proving it.
#[derive(Debug)]
pub struct Finding {
    pub fact: char,
    pub outcome: Result<TruthValue>,
    pub fired_rules: Vec<usize>,
}

impl Finding {
    /// Single-character status marker, as printed by the CLI and the REPL.
    pub fn symbol(&self) -> &'static str {
        match &self.outcome {
            Ok(TruthValue::True) => "\u{2713}",
            Ok(TruthValue::False) => "\u{2717}",
            Ok(TruthValue::Undetermined) => "?",
            Err(_) => "!",
        }
    }
}

#[derive(Debug)]
pub struct ExpertSystem {
    rules: Vec<Rule>,
    graph: KnowledgeGraph,
    loaded_facts: BTreeSet<char>,
    current_facts: BTreeSet<char>,
    queries: Vec<char>,
    session: Session,
}

impl ExpertSystem {
    /// Lex, parse, and build the knowledge graph. Any malformed line or
    /// meaningless rule aborts the whole load.
    pub fn load(text: &str) -> Result<Self> {
        let script = parse(text)?;
        let graph = KnowledgeGraph::build(&script.rules, &script.initial_facts, &script.queries)?;
        info!(
            rules = script.rules.len(),
            facts = graph.fact_count(),
            queries = script.queries.len(),
            "knowledge graph built"
        );
        Ok(Self {
            rules: script.rules,
            graph,
            current_facts: script.initial_facts.clone(),
            loaded_facts: script.initial_facts,
            queries: script.queries,
            session: Session::new(),
        })
    }

    /// Resolve one fact against the current fact set.
    pub fn resolve(&mut self, fact: char) -> Result<TruthValue> {
        let engine = Engine::new(&self.rules, &self.graph, &self.current_facts);
        engine.resolve(&mut self.session, fact)
    }

    /// Resolve every loaded query target in order. Contradictions are
    /// per-fact outcomes; later queries still run.
    pub fn resolve_all(&mut self) -> Vec<Finding> {
        let queries = self.queries.clone();
        queries
            .into_iter()
            .map(|fact| {
                let outcome = self.resolve(fact);
                Finding { fact, outcome, fired_rules: self.fired_rules(fact) }
            })
            .collect()
    }

    /// Source lines of the rules that fired while proving `fact`, for the
    /// export and visualization layers.
    pub fn fired_rules(&self, fact: char) -> Vec<usize> {
        self.session.fired(fact).iter().map(|&id| self.rules[id].line).collect()
    }

    /// Cycle paths hit so far in this session.
    pub fn cycles(&self) -> &[Vec<char>] {
        self.session.cycles()
    }

    /// Assert a fact true for subsequent queries. Expects an uppercase
    /// letter; the REPL validates raw input before calling. Invalidates all
    /// memoized results.
    pub fn add_initial_fact(&mut self, fact: char) {
        self.current_facts.insert(fact);
        self.session.invalidate();
    }

    /// Retract a fact. Invalidates all memoized results.
    pub fn remove_initial_fact(&mut self, fact: char) {
        self.current_facts.remove(&fact);
        self.session.invalidate();
    }

    /// Restore the fact set the input file declared.
    pub fn reset_facts(&mut self) {
        self.current_facts = self.loaded_facts.clone();
        self.session.invalidate();
    }

    /// Which single fact assertions would make `target` TRUE? Tries each
    /// known fact in its own throwaway session; the live session and fact
    /// set are untouched. Candidates whose addition contradicts are skipped.
    pub fn suggest(&self, target: char) -> Vec<char> {
        let mut suggestions = Vec::new();
        for candidate in self.graph.facts() {
            if candidate == target || self.current_facts.contains(&candidate) {
                continue;
            }
            let mut facts = self.current_facts.clone();
            facts.insert(candidate);
            let engine = Engine::new(&self.rules, &self.graph, &facts);
            if let Ok(TruthValue::True) = engine.resolve(&mut Session::new(), target) {
                suggestions.push(candidate);
            }
        }
        suggestions
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn queries(&self) -> &[char] {
        &self.queries
    }

    pub fn current_facts(&self) -> &BTreeSet<char> {
        &self.current_facts
    }

    pub fn graph(&self) -> &KnowledgeGraph {
        &self.graph
    }
}
