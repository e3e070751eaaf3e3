//! The clause set (knowledge base) that the prover searches.

use indexmap::IndexSet;

use crate::term::{Atom, Clause};

/// A set of clauses: a fact index (structural-equality deduplicated, but
/// iterated in insertion order so enumeration is deterministic across runs)
/// and an ordered rule list (order IS observable and determines solution
/// enumeration order).
///
/// The fact index is an `IndexSet` rather than a plain `HashSet` so that
/// iteration order follows insertion order instead of `RandomState`'s
/// per-process hash seed — a plain `HashSet` would make fact enumeration
/// order (and hence solution order for goals with multiple matching facts)
/// vary from run to run of the same binary.
#[derive(Debug, Default, Clone)]
pub struct ClauseSet {
    facts: IndexSet<Atom>,
    rules: Vec<(Atom, Vec<Atom>)>,
}

impl ClauseSet {
    /// Construct an empty clause set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause, routing facts into the fact index and rules onto the
    /// end of the rule list.
    pub fn insert(&mut self, clause: Clause) {
        match clause {
            Clause::Fact(atom) => {
                self.facts.insert(atom);
            }
            Clause::Rule(head, body) => {
                self.rules.push((head, body));
            }
        }
    }

    /// Build a clause set from an iterator of clauses, preserving rule
    /// order.
    pub fn from_clauses(clauses: impl IntoIterator<Item = Clause>) -> Self {
        let mut kb = Self::new();
        for clause in clauses {
            kb.insert(clause);
        }
        kb
    }

    /// Iterate the fact index in insertion (source) order.
    pub fn facts(&self) -> impl Iterator<Item = &Atom> {
        self.facts.iter()
    }

    /// Iterate the rule list in source order.
    pub fn rules(&self) -> impl Iterator<Item = &(Atom, Vec<Atom>)> {
        self.rules.iter()
    }

    /// Number of facts in the index.
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// Number of rules in the list.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
