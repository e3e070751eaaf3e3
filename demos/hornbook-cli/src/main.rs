//! Demo CLI: load a Horn-clause knowledge base from a `.kb` file, prove (or
//! solve) a goal against it, and print the result and proof trace.
//!
//! A thin, direct analogue of `backward_chain.py`'s `demo()` driver, wired
//! through a real argument parser instead of `sys.argv` indexing.

use std::{fs, process::ExitCode};

use clap::Parser;
use hornbook::{load_kb, ProverConfig};

/// Load a `.kb` file of facts and rules and prove (or solve) a goal against
/// it.
#[derive(Debug, Parser)]
#[command(name = "hornbook", version, about)]
struct Args {
    /// Path to a `.kb` file: `name(arg,...).` facts and `head :- body.` rules.
    kb: String,

    /// The goal atom to prove, e.g. `mammal(dog)` or `parent(X,alice)`.
    goal: String,

    /// Enumerate all solutions instead of only reporting provability.
    #[arg(long)]
    solve: bool,

    /// Print the proof trace.
    #[arg(long)]
    trace: bool,

    /// Maximum goal-stack depth before a branch is abandoned.
    #[arg(long, default_value_t = 50)]
    max_depth: usize,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let source = match fs::read_to_string(&args.kb) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error reading {:?}: {e}", args.kb);
            return ExitCode::FAILURE;
        }
    };

    let (kb, issues) = load_kb(&source);
    for issue in &issues {
        eprintln!("warning: skipped clause {:?}: {}", issue.span, issue.reason);
    }
    log::info!(
        "loaded {} facts and {} rules from {:?}",
        kb.fact_count(),
        kb.rule_count(),
        args.kb
    );

    let config = ProverConfig::default()
        .with_max_depth(args.max_depth)
        .with_trace(args.trace);
    let prover = hornbook::Prover::new(&kb, config);

    let outcome = match prover.run(&args.goal) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.trace && !outcome.trace.is_empty() {
        println!("{}", outcome.trace);
    }

    if args.solve {
        if outcome.solutions.is_empty() {
            println!("no solutions");
        } else {
            for (i, solution) in outcome.solutions.iter().enumerate() {
                println!("solution {}: {solution}", i + 1);
            }
        }
    } else {
        println!("{}", outcome.success);
    }

    if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
