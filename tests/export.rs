use sequitur::export;
use sequitur::system::ExpertSystem;

const SCENARIO: &str = "C => E\nA | B => C\nV ^ W => X\n=ABG\n?GVX";

#[test]
fn justification_classifies_facts() {
    let mut system = ExpertSystem::load(SCENARIO).unwrap();
    let doc = export::justification(&mut system);

    let find = |fact: char| doc.facts.iter().find(|f| f.fact == fact).unwrap();
    assert_eq!(find('G').kind, "initial");
    assert_eq!(find('G').value, "TRUE");
    assert_eq!(find('V').kind, "query");
    assert_eq!(find('V').value, "FALSE");
    assert_eq!(find('E').kind, "derived");
    assert_eq!(find('E').value, "TRUE");
}

#[test]
fn justification_marks_fired_rules() {
    let mut system = ExpertSystem::load(SCENARIO).unwrap();
    let doc = export::justification(&mut system);

    let find = |line: usize| doc.rules.iter().find(|r| r.line == line).unwrap();
    assert!(find(1).fired, "C => E fires");
    assert!(find(2).fired, "A | B => C fires");
    assert!(!find(3).fired, "V ^ W => X cannot fire");
}

#[test]
fn edges_run_from_condition_to_conclusion() {
    let mut system = ExpertSystem::load("A + B => C\n=AB\n?C").unwrap();
    let doc = export::justification(&mut system);
    let mut pairs: Vec<(char, char)> = doc.edges.iter().map(|e| (e.from, e.to)).collect();
    pairs.sort();
    assert_eq!(pairs, vec![('A', 'C'), ('B', 'C')]);
    assert_eq!(doc.edges[0].rule, 1);
}

#[test]
fn dot_output_is_a_digraph() {
    let mut system = ExpertSystem::load(SCENARIO).unwrap();
    let dot = export::to_dot(&export::justification(&mut system));
    assert!(dot.starts_with("digraph justification {"));
    assert!(dot.contains("\"G\" [label=\"G\\nTRUE\""), "{dot}");
    assert!(dot.contains("\"C\" -> \"E\" [label=\"L1\"]"), "{dot}");
    assert!(dot.trim_end().ends_with('}'));
}

#[test]
fn iff_edges_are_bidirectional_in_dot() {
    let mut system = ExpertSystem::load("A <=> B\n=A\n?B").unwrap();
    let dot = export::to_dot(&export::justification(&mut system));
    assert!(dot.contains("dir=both"), "{dot}");
}

#[test]
fn json_round_trips_through_serde() {
    let mut system = ExpertSystem::load(SCENARIO).unwrap();
    let json = export::to_json(&export::justification(&mut system));
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(value["facts"].as_array().unwrap().len() >= 7);
    assert!(value["rules"].as_array().unwrap().iter().any(|r| r["line"] == 2));
    assert!(value["edges"].as_array().unwrap().iter().any(|e| e["from"] == "A"));
}

#[test]
fn contradictions_are_visible_in_the_export() {
    let mut system = ExpertSystem::load("A => B\nA => !B\n=A\n?B").unwrap();
    let doc = export::justification(&mut system);
    let b = doc.facts.iter().find(|f| f.fact == 'B').unwrap();
    assert_eq!(b.value, "CONTRADICTION");
}
