//! Structural unification over an incremental binding environment.

use std::collections::{HashMap, HashSet};

use crate::term::{Atom, Term, VarId};

/// A partial mapping from variable identities to terms. A variable may be
/// bound to a constant or to another variable (forming a chain); bindings
/// are never keyed by a constant.
///
/// Environments are copy-on-extend: [`Env::bind`] returns a new `Env`
/// sharing the parent's bindings via a persistent map, so a branch that
/// extends the environment never mutates what a sibling branch sees.
#[derive(Debug, Clone, Default)]
pub struct Env {
    bindings: im_rc_like::PersistentMap,
}

impl Env {
    /// The empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a variable one step, without following further chains.
    fn lookup(&self, id: VarId) -> Option<Term> {
        self.bindings.get(id)
    }

    /// Walk a term's binding chain until it reaches a constant or an
    /// unbound variable, using a visited set to guarantee termination even
    /// in the presence of a malformed chain.
    pub fn resolve(&self, term: &Term) -> Term {
        let mut current = term.clone();
        let mut visited = HashSet::new();
        loop {
            match &current {
                Term::Constant(_) => return current,
                Term::Variable(id, _) => {
                    if !visited.insert(*id) {
                        // A cycle in the binding chain: stop at the
                        // variable we've already seen rather than loop
                        // forever. Acyclicity is the unifier's job to
                        // maintain; this guard is the belt under that
                        // braces.
                        return current;
                    }
                    match self.lookup(*id) {
                        Some(next) => current = next,
                        None => return current,
                    }
                }
            }
        }
    }

    /// Extend the environment with `var := value`, returning a new
    /// environment. The parent is left untouched.
    fn bind(&self, var: VarId, value: Term) -> Env {
        Env {
            bindings: self.bindings.insert(var, value),
        }
    }
}

/// Unify two atoms under an existing environment. On success, returns an
/// extended environment; on failure, returns `None`. The input environment
/// is never mutated.
pub fn unify_atoms(a: &Atom, b: &Atom, env: &Env) -> Option<Env> {
    if a.predicate() != b.predicate() || a.arity() != b.arity() {
        return None;
    }

    let mut current = env.clone();
    for (x, y) in a.args().zip(b.args()) {
        current = unify_terms(x, y, &current)?;
    }
    Some(current)
}

/// Unify two terms under an existing environment.
pub fn unify_terms(x: &Term, y: &Term, env: &Env) -> Option<Env> {
    let rx = env.resolve(x);
    let ry = env.resolve(y);

    match (&rx, &ry) {
        (Term::Constant(cx), Term::Constant(cy)) => {
            if cx == cy {
                Some(env.clone())
            } else {
                None
            }
        }
        (Term::Variable(vx, _), Term::Variable(vy, _)) => {
            if vx == vy {
                // Same variable after resolution: no-op success. This is
                // the effect the source's redundant self-bind branch was
                // reaching for; we keep the effect and drop the
                // redundancy.
                Some(env.clone())
            } else {
                // Deterministic direction: bind the lower-id variable to
                // the higher one, so the higher id is always the chain's
                // terminal representative and repeated unifications of the
                // same pair produce the same chain shape.
                let (lo, hi) = if vx.0 < vy.0 { (*vx, ry.clone()) } else { (*vy, rx.clone()) };
                Some(env.bind(lo, hi))
            }
        }
        (Term::Variable(v, _), Term::Constant(_)) => Some(env.bind(*v, ry)),
        (Term::Constant(_), Term::Variable(v, _)) => Some(env.bind(*v, rx)),
    }
}

/// A tiny persistent map built on an `Rc`'d association list, sufficient
/// for the binding environment's copy-on-extend discipline without pulling
/// in a dedicated persistent-collections crate for one map type.
mod im_rc_like {
    use std::rc::Rc;

    use crate::term::{Term, VarId};

    #[derive(Debug, Clone, Default)]
    pub struct PersistentMap(Option<Rc<Node>>);

    #[derive(Debug)]
    struct Node {
        key: VarId,
        value: Term,
        next: Option<Rc<Node>>,
    }

    impl PersistentMap {
        pub fn get(&self, key: VarId) -> Option<Term> {
            let mut node = self.0.as_ref();
            while let Some(n) = node {
                if n.key == key {
                    return Some(n.value.clone());
                }
                node = n.next.as_ref();
            }
            None
        }

        pub fn insert(&self, key: VarId, value: Term) -> Self {
            PersistentMap(Some(Rc::new(Node {
                key,
                value,
                next: self.0.clone(),
            })))
        }
    }
}

/// Resolve a whole atom's arguments through an environment, producing a new
/// atom with every resolvable argument substituted. Unresolved variables
/// are left as-is.
pub fn substitute_atom(atom: &Atom, env: &Env) -> Atom {
    let args = atom.args().map(|t| env.resolve(t)).collect();
    Atom::new(atom.predicate().clone(), args)
}

/// Restrict an environment to a set of variable ids, returning only those
/// that resolve to a constant. Used to surface solutions without leaking
/// internal rule-renaming variables.
pub fn restrict_to_constants(vars: &[VarId], env: &Env) -> HashMap<VarId, Term> {
    let mut out = HashMap::new();
    for &id in vars {
        let name: std::rc::Rc<str> = "_".into();
        let resolved = env.resolve(&Term::Variable(id, name));
        if matches!(resolved, Term::Constant(_)) {
            out.insert(id, resolved);
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::term::{make_constant, VarAllocator};

    #[test]
    fn constants_unify_iff_equal() {
        let env = Env::new();
        assert!(unify_terms(&make_constant("a"), &make_constant("a"), &env).is_some());
        assert!(unify_terms(&make_constant("a"), &make_constant("b"), &env).is_none());
    }

    #[test]
    fn variable_binds_to_constant() {
        let mut vars = VarAllocator::new();
        let x = vars.fresh("X");
        let env = Env::new();
        let env = unify_terms(&x, &make_constant("dog"), &env).unwrap();
        assert_eq!(env.resolve(&x), make_constant("dog"));
    }

    #[test]
    fn self_unification_is_noop() {
        let mut vars = VarAllocator::new();
        let x = vars.fresh("X");
        let env = Env::new();
        let env = unify_terms(&x, &x, &env).unwrap();
        assert_eq!(env.resolve(&x), x);
    }

    #[test]
    fn arity_mismatch_fails_atoms() {
        let env = Env::new();
        let a = Atom::new("p", vec![make_constant("a")]);
        let b = Atom::new("p", vec![make_constant("a"), make_constant("b")]);
        assert!(unify_atoms(&a, &b, &env).is_none());
    }

    #[test]
    fn unification_is_symmetric() {
        let env = Env::new();
        let a = Atom::new("p", vec![make_constant("a"), make_constant("b")]);
        let b = Atom::new("p", vec![make_constant("a"), make_constant("b")]);
        assert_eq!(unify_atoms(&a, &b, &env).is_some(), unify_atoms(&b, &a, &env).is_some());
    }

    #[test]
    fn branches_do_not_see_each_others_bindings() {
        let mut vars = VarAllocator::new();
        let x = vars.fresh("X");
        let env = Env::new();
        let branch_a = unify_terms(&x, &make_constant("dog"), &env).unwrap();
        let branch_b = unify_terms(&x, &make_constant("cat"), &env).unwrap();
        assert_eq!(branch_a.resolve(&x), make_constant("dog"));
        assert_eq!(branch_b.resolve(&x), make_constant("cat"));
    }
}
