//! Error-handling module for the crate.

use thiserror::Error;

/// Error-collection for all the possible hard errors occurring in this
/// crate. Per the prover's own contract, a failed proof, a detected cycle
/// or a depth-limit hit are *not* errors — they are ordinary negative
/// results carried in [`crate::prove::ProofOutcome`]. Only goal parsing can
/// fail hard, since a goal that does not parse gives the prover nothing to
/// search for.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The goal text could not be parsed as a single atom.
    #[error("could not parse goal {0:?} as an atom")]
    GoalParse(String),
    /// The goal text was empty or contained only whitespace/comments.
    #[error("goal text is empty")]
    EmptyGoal,
}
