//! Justification-graph export in DOT (Graphviz) and JSON.
//!
//! Resolves every fact the graph knows about, then renders fact nodes (with
//! their truth value and whether they are initial, queried, or derived) and
//! rule edges (condition fact → concluded fact). The JSON form is the same
//! document serialized with serde; both are meant for external visualization
//! tooling, not for reloading.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::graph::conclusion_literals;
use crate::parser::Connective;
use crate::system::ExpertSystem;

#[derive(Debug, Serialize)]
pub struct FactExport {
    pub fact: char,
    pub value: String,
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct RuleExport {
    pub line: usize,
    pub text: String,
    pub biconditional: bool,
    pub fired: bool,
}

#[derive(Debug, Serialize)]
pub struct EdgeExport {
    pub from: char,
    pub to: char,
    pub rule: usize,
}

#[derive(Debug, Serialize)]
pub struct JustificationExport {
    pub facts: Vec<FactExport>,
    pub rules: Vec<RuleExport>,
    pub edges: Vec<EdgeExport>,
}

/// Resolve everything and collect the export document.
pub fn justification(system: &mut ExpertSystem) -> JustificationExport {
    let all_facts = system.graph().facts();

    let mut facts = Vec::new();
    let mut fired_lines: BTreeSet<usize> = BTreeSet::new();
    for &fact in &all_facts {
        let value = match system.resolve(fact) {
            Ok(value) => value.to_string(),
            Err(_) => "CONTRADICTION".to_string(),
        };
        fired_lines.extend(system.fired_rules(fact));
        let kind = if system.current_facts().contains(&fact) {
            "initial"
        } else if system.queries().contains(&fact) {
            "query"
        } else {
            "derived"
        };
        facts.push(FactExport { fact, value, kind: kind.to_string() });
    }

    let mut rules = Vec::new();
    let mut edges = Vec::new();
    for rule in system.rules() {
        rules.push(RuleExport {
            line: rule.line,
            text: rule.to_string(),
            biconditional: rule.connective == Connective::Iff,
            fired: fired_lines.contains(&rule.line),
        });
        let mut condition_facts = BTreeSet::new();
        rule.condition.facts(&mut condition_facts);
        for &from in &condition_facts {
            for (to, _) in conclusion_literals(&rule.conclusion) {
                edges.push(EdgeExport { from, to, rule: rule.line });
            }
        }
    }

    JustificationExport { facts, rules, edges }
}

/// Render the document as a Graphviz digraph.
pub fn to_dot(export: &JustificationExport) -> String {
    let mut dot = String::from("digraph justification {\n");
    dot.push_str("    rankdir=LR;\n");
    dot.push_str("    node [shape=circle, style=filled, fontname=\"Helvetica\"];\n");

    for fact in &export.facts {
        let fill = match fact.value.as_str() {
            "TRUE" => "palegreen",
            "FALSE" => "mistyrose",
            "CONTRADICTION" => "orange",
            _ => "khaki",
        };
        // Initial facts get a double border, queried facts a bold one.
        let extra = match fact.kind.as_str() {
            "initial" => ", peripheries=2",
            "query" => ", penwidth=2",
            _ => "",
        };
        dot.push_str(&format!(
            "    \"{}\" [label=\"{}\\n{}\", fillcolor={}{}];\n",
            fact.fact, fact.fact, fact.value, fill, extra
        ));
    }

    let biconditional: BTreeSet<usize> =
        export.rules.iter().filter(|r| r.biconditional).map(|r| r.line).collect();
    for edge in &export.edges {
        let dir = if biconditional.contains(&edge.rule) { ", dir=both" } else { "" };
        dot.push_str(&format!(
            "    \"{}\" -> \"{}\" [label=\"L{}\"{}];\n",
            edge.from, edge.to, edge.rule, dir
        ));
    }

    dot.push_str("}\n");
    dot
}

/// Render the document as pretty-printed JSON.
pub fn to_json(export: &JustificationExport) -> String {
    // serde_json only fails on non-string map keys or failing Serialize
    // impls; these derived structs have neither.
    serde_json::to_string_pretty(export).expect("export document serializes")
}

pub fn write_dot(system: &mut ExpertSystem, path: &Path) -> Result<()> {
    let export = justification(system);
    fs::write(path, to_dot(&export))?;
    Ok(())
}

pub fn write_json(system: &mut ExpertSystem, path: &Path) -> Result<()> {
    let export = justification(system);
    fs::write(path, to_json(&export))?;
    Ok(())
}
