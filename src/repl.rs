//! Interactive fact-validation mode.
//!
//! Lets the user flip facts and re-query without editing the input file.
//! Every `+`/`-`/`reset` mutation goes through the facade, which invalidates
//! the memo cache before the next resolve; stale answers are impossible by
//! construction.

use std::io::{self, BufRead, Write};
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::engine::TruthValue;
use crate::error::Result;
use crate::export;
use crate::system::ExpertSystem;

const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[91m";
const YELLOW: &str = "\x1b[93m";
const RESET: &str = "\x1b[0m";

lazy_static! {
    static ref SUGGEST: Regex = Regex::new(r"(?i)^suggest\s+([A-Za-z])$").unwrap();
    static ref EXPORT: Regex = Regex::new(r"(?i)^export\s+(dot|json)\s+(\S+)$").unwrap();
}

fn print_help() {
    println!();
    println!("Commands:");
    println!("  +A, +AB...      assert fact(s) true");
    println!("  -A, -AB...      retract fact(s)");
    println!("  ?A, ?AB...      query fact(s) against the current set");
    println!("  facts           show the current fact set");
    println!("  rules           show the loaded rules");
    println!("  reset           restore the facts the file declared");
    println!("  suggest A       single facts whose assertion makes A true");
    println!("  export dot F    write the justification graph to F (Graphviz)");
    println!("  export json F   write the justification graph to F (JSON)");
    println!("  help            this text");
    println!("  quit            leave interactive mode");
    println!();
}

fn print_facts(system: &ExpertSystem) {
    let facts: String = system.current_facts().iter().collect();
    if facts.is_empty() {
        println!("Currently true facts: (none)");
    } else {
        println!("Currently true facts: {facts}");
    }
}

fn print_result(system: &mut ExpertSystem, fact: char, color: bool) {
    match system.resolve(fact) {
        Ok(value) => {
            let (tint, symbol) = match value {
                TruthValue::True => (GREEN, "\u{2713}"),
                TruthValue::False => (RED, "\u{2717}"),
                TruthValue::Undetermined => (YELLOW, "?"),
            };
            if color {
                println!("{tint}{fact}: {symbol} {value}{RESET}");
            } else {
                println!("{fact}: {symbol} {value}");
            }
        }
        Err(e) => println!("{fact}: ! {e}"),
    }
}

/// Uppercase letters from a command tail; complains about anything else.
fn fact_letters(raw: &str) -> Vec<char> {
    let mut letters = Vec::new();
    for c in raw.chars().filter(|c| !c.is_whitespace() && *c != ',') {
        if c.is_ascii_alphabetic() {
            letters.push(c.to_ascii_uppercase());
        } else {
            println!("Invalid fact: {c}");
        }
    }
    letters
}

/// Run the interactive loop until `quit` or end of input.
pub fn run(system: &mut ExpertSystem, color: bool) -> Result<()> {
    println!("Interactive fact validation. Type 'help' for commands.");
    print_facts(system);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\n> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.to_ascii_lowercase().as_str() {
            "quit" | "exit" | "q" => break,
            "help" => {
                print_help();
                continue;
            }
            "facts" => {
                print_facts(system);
                continue;
            }
            "reset" => {
                system.reset_facts();
                println!("Reset to the facts the file declared.");
                print_facts(system);
                continue;
            }
            "rules" => {
                for rule in system.rules() {
                    println!("  L{}: {}", rule.line, rule);
                }
                continue;
            }
            _ => {}
        }

        if let Some(rest) = input.strip_prefix('+') {
            for fact in fact_letters(rest) {
                system.add_initial_fact(fact);
            }
            print_facts(system);
        } else if let Some(rest) = input.strip_prefix('-') {
            for fact in fact_letters(rest) {
                system.remove_initial_fact(fact);
            }
            print_facts(system);
        } else if let Some(rest) = input.strip_prefix('?') {
            let letters = fact_letters(rest);
            if letters.is_empty() {
                println!("No queries given.");
            }
            for fact in letters {
                print_result(system, fact, color);
            }
        } else if let Some(captures) = SUGGEST.captures(input) {
            let target = captures[1].chars().next().unwrap().to_ascii_uppercase();
            if let Ok(TruthValue::True) = system.resolve(target) {
                println!("{target} is already true with the current facts.");
                continue;
            }
            let suggestions = system.suggest(target);
            if suggestions.is_empty() {
                println!("No single-fact assertion makes {target} true.");
            } else {
                let list: String = suggestions.into_iter().collect();
                println!("Asserting any of these makes {target} true: {list}");
            }
        } else if let Some(captures) = EXPORT.captures(input) {
            let path = Path::new(&captures[2]);
            let written = match &captures[1].to_ascii_lowercase()[..] {
                "dot" => export::write_dot(system, path),
                _ => export::write_json(system, path),
            };
            match written {
                Ok(()) => println!("Graph written to {}", path.display()),
                Err(e) => println!("Export failed: {e}"),
            }
        } else {
            println!("Unknown command: {input} (try 'help')");
        }
    }

    Ok(())
}
