//! The backward-chaining prover.

pub mod engine;
pub mod trace;

pub use engine::{ProofOutcome, Prover, Solution};
