//! Sequitur – a propositional-calculus expert system.
//!
//! Sequitur answers truth-value queries about atomic propositions ("facts",
//! single uppercase letters) given a set of rules and a set of facts
//! asserted true at the start:
//!
//! * The [`lexer`] turns rule/fact/query text into a flat token stream,
//!   stripping comments and whitespace.
//! * The [`parser`] builds, per rule line, a pair of expression trees
//!   (condition and conclusion) joined by `=>` or `<=>`, enforcing operator
//!   precedence `()  !  +  |  ^` and exactly one connective per line.
//! * The [`graph`] module holds the knowledge graph: explicit fact nodes
//!   with bidirectional fact↔rule edges, so "which rules could conclude X"
//!   is one lookup.
//! * The [`engine`] resolves a queried fact by backward chaining over the
//!   graph under three-valued logic, detecting cycles (reported, resolved
//!   as UNDETERMINED for the re-entered fact) and contradictions (an error
//!   naming both rules), and memoizing per-fact results for the session.
//!
//! The [`system`] module wires the four together behind
//! [`system::ExpertSystem`], the surface everything else consumes:
//! the CLI runner in `main.rs`, the interactive mode in [`repl`], the
//! DOT/JSON justification export in [`export`], and the rule-set metrics in
//! [`stats`].
//!
//! ## Input language
//!
//! ```text
//! C => E            # implication
//! A + B <=> C       # biconditional
//! A + !B => F       # conjunction and negation
//! V ^ W => X        # exclusive or
//! =AB               # A and B are true at start
//! ?GVX              # resolve G, V and X
//! ```
//!
//! ## Quick start
//!
//! ```
//! use sequitur::system::ExpertSystem;
//! use sequitur::engine::TruthValue;
//!
//! let mut system = ExpertSystem::load("A + B => C\n=AB\n?C").unwrap();
//! assert_eq!(system.resolve('C').unwrap(), TruthValue::True);
//! ```
//!
//! Facts not asserted and not concluded by any fired rule resolve FALSE,
//! the closed-world default. Initial facts are axioms: they resolve TRUE
//! before any rule search. Interactive callers may flip facts between
//! queries; every mutation invalidates the memo cache.

pub mod engine;
pub mod error;
pub mod export;
pub mod graph;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod stats;
pub mod system;
