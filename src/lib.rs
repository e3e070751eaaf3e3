//! `hornbook`: a backward-chaining inference engine with unification over
//! a small Horn-clause knowledge base.
//!
//! The crate's only contract with a collaborator is textual: hand it a set
//! of clauses and a goal (§4.3's surface syntax), get back a success flag,
//! an ordered list of variable-binding solutions, and an optional proof
//! trace. Everything upstream of that — LLM translation, retrieval,
//! self-refinement, interactive shells — lives outside this crate.

pub mod config;
pub mod error;
pub mod io;
pub mod kb;
pub mod prove;
pub mod term;
pub mod unify;

pub use config::ProverConfig;
pub use error::Error;
pub use kb::ClauseSet;
pub use prove::{ProofOutcome, Prover, Solution};
pub use term::{Atom, Clause, Term};

/// Parse a clause-source text into a [`ClauseSet`], returning any
/// malformed clauses that were skipped alongside it.
pub fn load_kb(source: &str) -> (ClauseSet, Vec<io::ParseIssue>) {
    let program = io::parse_program(source);
    let mut kb = ClauseSet::new();
    for fact in program.facts {
        kb.insert(Clause::fact(fact));
    }
    for (head, body) in program.rules {
        kb.insert(Clause::rule(head, body));
    }
    (kb, program.issues)
}
