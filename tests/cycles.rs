use sequitur::engine::TruthValue;
use sequitur::system::ExpertSystem;

#[test]
fn two_fact_cycle_terminates_false() {
    let mut system = ExpertSystem::load("A => B\nB => A\n?AB").unwrap();
    assert_eq!(system.resolve('A').unwrap(), TruthValue::False);
    assert_eq!(system.resolve('B').unwrap(), TruthValue::False);
}

#[test]
fn cycle_path_is_reported() {
    let mut system = ExpertSystem::load("A => B\nB => A\n?A").unwrap();
    system.resolve('A').unwrap();
    let cycles = system.cycles();
    assert!(!cycles.is_empty());
    let path = &cycles[0];
    // The path closes on the re-entered fact.
    assert_eq!(path.first(), path.last());
    assert!(path.len() >= 3);
}

#[test]
fn longer_cycle_terminates() {
    let text = "A => B\nB => C\nC => D\nD => A\n?ABCD";
    let mut system = ExpertSystem::load(text).unwrap();
    for fact in ['A', 'B', 'C', 'D'] {
        assert_eq!(system.resolve(fact).unwrap(), TruthValue::False);
    }
}

#[test]
fn self_referential_rule_terminates() {
    let mut system = ExpertSystem::load("A => A\n?A").unwrap();
    assert_eq!(system.resolve('A').unwrap(), TruthValue::False);
}

#[test]
fn negative_self_reference_terminates() {
    // !A => A is paradoxical; the closed-world default wins.
    let mut system = ExpertSystem::load("!A => A\n?A").unwrap();
    assert_eq!(system.resolve('A').unwrap(), TruthValue::False);
}

#[test]
fn unrelated_facts_survive_a_cycle() {
    let text = "A => B\nB => A\nG => H\n=G\n?ABH";
    let mut system = ExpertSystem::load(text).unwrap();
    assert_eq!(system.resolve('A').unwrap(), TruthValue::False);
    assert_eq!(system.resolve('H').unwrap(), TruthValue::True);
}

#[test]
fn external_support_breaks_a_cycle_true() {
    // A and B feed each other, but C proves A outright; both end up true
    // no matter which is asked first.
    let text = "A => B\nB => A\nC => A\n=C\n?AB";
    let mut system = ExpertSystem::load(text).unwrap();
    assert_eq!(system.resolve('A').unwrap(), TruthValue::True);
    assert_eq!(system.resolve('B').unwrap(), TruthValue::True);

    let mut system = ExpertSystem::load(text).unwrap();
    assert_eq!(system.resolve('B').unwrap(), TruthValue::True);
    assert_eq!(system.resolve('A').unwrap(), TruthValue::True);
}

#[test]
fn iff_pair_with_no_support_stays_false() {
    // A <=> B wires both directions; neither side has independent support.
    let mut system = ExpertSystem::load("A <=> B\n?AB").unwrap();
    assert_eq!(system.resolve('A').unwrap(), TruthValue::False);
    assert_eq!(system.resolve('B').unwrap(), TruthValue::False);
}

#[test]
fn full_alphabet_cycle_terminates() {
    // One ring over all 26 facts; resolution must stay bounded.
    let mut text = String::new();
    for i in 0..26u8 {
        let from = (b'A' + i) as char;
        let to = (b'A' + (i + 1) % 26) as char;
        text.push_str(&format!("{from} => {to}\n"));
    }
    text.push_str("?A");
    let mut system = ExpertSystem::load(&text).unwrap();
    assert_eq!(system.resolve('A').unwrap(), TruthValue::False);
}
