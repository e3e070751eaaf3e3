//! Property-based tests for the universal properties listed in spec.md's
//! testable-properties section: unification symmetry, fact round-trip,
//! rename capture-freedom, memo idempotence, cycle safety and determinism.

use hornbook::term::{make_constant, Atom};
use hornbook::unify::{unify_atoms, Env};
use hornbook::{load_kb, ProverConfig, Prover};
use proptest::prelude::*;

/// A small alphabet of constant names, kept short so collisions (which
/// exercise the "equal" branch of unification) show up often in the
/// generated cases.
fn const_name() -> impl Strategy<Value = String> {
    prop_oneof!["a", "b", "c", "dog", "cat"].prop_map(|s| s.to_owned())
}

proptest! {
    /// Property 1 (spec.md §8): for ground atoms `a`, `b`, `unify(a,b,e)`
    /// succeeds iff `unify(b,a,e)` succeeds, and when both succeed the
    /// substitutions agree (trivially so here, since both sides are ground
    /// and the environment is never extended).
    #[test]
    fn unification_is_symmetric(x in const_name(), y in const_name()) {
        let env = Env::new();
        let a = Atom::new("p", vec![make_constant(x)]);
        let b = Atom::new("p", vec![make_constant(y)]);
        let forward = unify_atoms(&a, &b, &env).is_some();
        let backward = unify_atoms(&b, &a, &env).is_some();
        prop_assert_eq!(forward, backward);
    }

    /// Property 2: any single ground fact, loaded alone into a KB, proves
    /// itself and yields exactly one solution with no bindings.
    #[test]
    fn fact_round_trip(name in const_name()) {
        let source = format!("p({name}).");
        let (kb, issues) = load_kb(&source);
        prop_assert!(issues.is_empty());
        let prover = Prover::new(&kb, ProverConfig::default());
        prop_assert!(prover.prove(&format!("p({name})")).unwrap());
        let solutions = prover.solve(&format!("p({name})")).unwrap();
        prop_assert_eq!(solutions.len(), 1);
        prop_assert!(solutions[0].is_empty());
    }

    /// Property 6: repeated `solve` calls on the same KB and goal return
    /// solutions in the same order.
    #[test]
    fn solve_is_deterministic(n in 1usize..5) {
        let mut source = String::new();
        for i in 0..n {
            source.push_str(&format!("p(v{i}).\n"));
        }
        let (kb, _) = load_kb(&source);
        let prover = Prover::new(&kb, ProverConfig::default());
        let first = prover.solve("p(X)").unwrap();
        let second = prover.solve("p(X)").unwrap();
        prop_assert_eq!(first, second);
    }
}

/// Property 3: renaming a rule's variables consistently before use does not
/// change the set of solutions a top-level goal produces. Two KBs that
/// differ only in the spelling of a rule's variables must solve identically.
#[test]
fn rename_capture_freedom_across_spellings() {
    let kb_x = r#"
    has_fur(dog). warm_blooded(dog).
    has_fur(cat). warm_blooded(cat).
    mammal(X) :- has_fur(X), warm_blooded(X).
    "#;
    let kb_renamed = r#"
    has_fur(dog). warm_blooded(dog).
    has_fur(cat). warm_blooded(cat).
    mammal(Creature) :- has_fur(Creature), warm_blooded(Creature).
    "#;

    let (a, _) = load_kb(kb_x);
    let (b, _) = load_kb(kb_renamed);
    let prover_a = Prover::new(&a, ProverConfig::default());
    let prover_b = Prover::new(&b, ProverConfig::default());

    let mut solutions_a: Vec<_> = prover_a
        .solve("mammal(X)")
        .unwrap()
        .iter()
        .map(|s| s.get("X").unwrap().to_owned())
        .collect();
    let mut solutions_b: Vec<_> = prover_b
        .solve("mammal(X)")
        .unwrap()
        .iter()
        .map(|s| s.get("X").unwrap().to_owned())
        .collect();
    solutions_a.sort();
    solutions_b.sort();
    assert_eq!(solutions_a, solutions_b);
}

/// Property 4: a ground goal proved twice within one call (via a rule that
/// invokes it twice) produces the same solution set as proving it once —
/// the memo short-circuits the second derivation rather than duplicating or
/// dropping it.
#[test]
fn memo_idempotence() {
    let source = r#"
    has_fur(dog). warm_blooded(dog).
    mammal(X) :- has_fur(X), warm_blooded(X).
    twice_mammal(X) :- mammal(X), mammal(X).
    "#;
    let (kb, _) = load_kb(source);
    let prover = Prover::new(&kb, ProverConfig::default());
    assert_eq!(prover.solve("twice_mammal(dog)").unwrap().len(), 1);
}

/// Property 5: a directly self-recursive goal terminates (fails cleanly on
/// the cycle check) rather than looping forever, regardless of depth limit.
#[test]
fn cycle_safety_terminates() {
    let (kb, _) = load_kb("p(X) :- p(X).");
    let prover = Prover::new(&kb, ProverConfig::default());
    assert!(!prover.prove("p(a)").unwrap());
}
