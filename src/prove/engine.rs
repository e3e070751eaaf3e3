//! The backward-chaining prover: SLD-style resolution with fresh-variable
//! renaming, cycle detection, depth bounding and ground-goal memoisation.

use std::collections::{HashMap, HashSet};

use crate::{
    config::ProverConfig,
    error::Error,
    io::parser::ClauseParser,
    kb::ClauseSet,
    prove::trace::Trace,
    term::{Atom, Term, VarAllocator, VarId},
    unify::{restrict_to_constants, substitute_atom, unify_atoms, Env},
};

/// A single proved binding, restricted to the variables of the top-level
/// goal and ordered the way they first appeared in the goal text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Solution {
    bindings: Vec<(String, String)>,
}

impl Solution {
    /// The constant bound to a query variable, if any.
    pub fn get(&self, var: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(name, _)| name == var)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over the bindings in query-variable order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether this solution binds no variables (a ground "yes").
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.bindings.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{k}={v}")?;
        }
        write!(f, "}}")
    }
}

/// The full result of a `prove`/`solve` call: success, the ordered
/// solutions, and (when tracing is enabled) the human-readable trace.
#[derive(Debug, Clone, Default)]
pub struct ProofOutcome {
    /// Whether at least one solution was found.
    pub success: bool,
    /// All distinct solutions, in enumeration order.
    pub solutions: Vec<Solution>,
    /// The trace string, empty when tracing is disabled.
    pub trace: String,
}

/// A backward-chaining prover over a borrowed, read-only clause set.
#[derive(Debug)]
pub struct Prover<'kb> {
    kb: &'kb ClauseSet,
    config: ProverConfig,
}

/// Per-call search state: goal stack (cycle detection), proved set
/// (memoisation), the rule-trial counter, and the variable allocator used
/// both for the query's own variables and subsequent rule renamings.
/// Everything here is scoped to one top-level `prove`/`solve` call.
struct Search {
    goal_stack: Vec<Atom>,
    proved: HashSet<Atom>,
    rule_counter: u64,
    vars: VarAllocator,
    trace: Trace,
}

impl<'kb> Prover<'kb> {
    /// Construct a prover over a clause set with the given configuration.
    pub fn new(kb: &'kb ClauseSet, config: ProverConfig) -> Self {
        Self { kb, config }
    }

    /// `prove(goal) -> bool`: true iff at least one solution exists.
    pub fn prove(&self, goal_text: &str) -> Result<bool, Error> {
        Ok(self.run(goal_text)?.success)
    }

    /// `solve(goal) -> solutions`: enumerates all solutions in
    /// deterministic order.
    pub fn solve(&self, goal_text: &str) -> Result<Vec<Solution>, Error> {
        Ok(self.run(goal_text)?.solutions)
    }

    /// The combined external-facing call: success flag, solution list and
    /// trace, in one shot — the shape collaborators at the crate boundary
    /// consume (see the crate's external-interface docs).
    pub fn run(&self, goal_text: &str) -> Result<ProofOutcome, Error> {
        let parser = ClauseParser::new();
        let goal = parser.parse_goal(goal_text)?;
        let vars = parser.into_var_allocator();

        let query_vars: Vec<(VarId, String)> = {
            let mut seen = HashSet::new();
            let mut out = Vec::new();
            for term in goal_term_iter(&goal) {
                if let Term::Variable(id, name) = term {
                    if seen.insert(id) {
                        out.push((id, name.to_string()));
                    }
                }
            }
            out
        };

        let mut search = Search {
            goal_stack: Vec::new(),
            proved: HashSet::new(),
            rule_counter: 0,
            vars,
            trace: Trace::new(self.config.trace),
        };

        let envs = self.backchain(&mut search, &goal, &Env::new());

        let mut solutions = Vec::new();
        let mut seen_solutions = HashSet::new();
        let query_var_ids: Vec<VarId> = query_vars.iter().map(|(id, _)| *id).collect();
        for env in &envs {
            let restricted = restrict_to_constants(&query_var_ids, env);
            let bindings: Vec<(String, String)> = query_vars
                .iter()
                .filter_map(|(id, name)| {
                    restricted
                        .get(id)
                        .map(|term| (name.clone(), term.to_string()))
                })
                .collect();

            if bindings.is_empty() && !query_vars.is_empty() {
                // Goal had variables but none resolved to a constant in
                // this branch: nothing concrete to surface.
                continue;
            }

            let solution = Solution { bindings };
            let key = solution.to_string();
            if seen_solutions.insert(key) {
                solutions.push(solution);
            }
        }

        Ok(ProofOutcome {
            success: !envs.is_empty(),
            solutions,
            trace: search.trace.finish(),
        })
    }

    /// Attempt to prove `goal` under `env`, returning one environment per
    /// successful derivation.
    fn backchain(&self, search: &mut Search, goal: &Atom, env: &Env) -> Vec<Env> {
        let bound_goal = substitute_atom(goal, env);
        search.trace.enter_goal(&bound_goal.to_string());
        log::trace!(target: "prove", "goal {bound_goal} (depth {})", search.goal_stack.len());

        if search.goal_stack.len() >= self.config.max_depth {
            search.trace.max_depth_reached(&bound_goal.to_string());
            log::debug!(target: "prove", "max depth reached for {bound_goal}");
            search.trace.exit_goal();
            return Vec::new();
        }

        // Cycle detection uses structural equality of the post-substitution
        // goal; two goals that unify but are not structurally equal will
        // not collide here.
        if search.goal_stack.contains(&bound_goal) {
            search.trace.cycle_detected(&bound_goal.to_string());
            log::debug!(target: "prove", "cycle detected for {bound_goal}");
            search.trace.exit_goal();
            return Vec::new();
        }

        if bound_goal.is_ground() && search.proved.contains(&bound_goal) {
            search.trace.already_proved(&bound_goal.to_string());
            search.trace.exit_goal();
            return vec![env.clone()];
        }

        search.goal_stack.push(bound_goal.clone());
        let mut results = Vec::new();

        // Facts are tried before rules.
        for fact in self.kb.facts() {
            if let Some(new_env) = unify_atoms(goal, fact, env) {
                search.trace.matched_fact(&fact.to_string());
                log::trace!(target: "prove", "matched fact {fact}");
                self.remember_if_ground(search, goal, &new_env);
                results.push(new_env);
            }
        }

        // Rules, in source order; each trial gets a fresh renamed copy.
        for (head, body) in self.kb.rules() {
            search.rule_counter += 1;
            let (renamed_head, renamed_body) =
                rename_rule(head, body, &mut search.vars, search.rule_counter);

            if let Some(match_env) = unify_atoms(goal, &renamed_head, env) {
                let source_rule = crate::term::Clause::rule(head.clone(), body.clone());
                search.trace.trying_rule(&source_rule.to_string());
                log::debug!(target: "prove", "trying rule {source_rule}");

                let premise_results = self.prove_premises(search, &renamed_body, &match_env);
                if premise_results.is_empty() {
                    search.trace.rule_failed(&source_rule.to_string());
                } else {
                    search.trace.rule_succeeded(&source_rule.to_string());
                    log::debug!(target: "prove", "rule succeeded {source_rule}");
                    for result_env in premise_results {
                        self.remember_if_ground(search, goal, &result_env);
                        results.push(result_env);
                    }
                }
            }
        }

        if results.is_empty() {
            search.trace.cannot_prove(&bound_goal.to_string());
        }

        search.goal_stack.pop();
        search.trace.exit_goal();
        results
    }

    /// Prove a rule body left-to-right: the environment produced by
    /// premise *i* is the input to premise *i+1*.
    fn prove_premises(&self, search: &mut Search, premises: &[Atom], env: &Env) -> Vec<Env> {
        match premises.split_first() {
            None => vec![env.clone()],
            Some((first, rest)) => {
                let first_results = self.backchain(search, first, env);
                let mut all = Vec::new();
                for result_env in first_results {
                    if rest.is_empty() {
                        all.push(result_env);
                    } else {
                        all.extend(self.prove_premises(search, rest, &result_env));
                    }
                }
                all
            }
        }
    }

    /// Insert the resolved goal into the proved set, but only when it is
    /// ground: memoising a non-ground resolved goal would incorrectly
    /// suppress alternative solutions on later branches.
    fn remember_if_ground(&self, search: &mut Search, goal: &Atom, env: &Env) {
        let matched = substitute_atom(goal, env);
        if matched.is_ground() {
            search.proved.insert(matched);
        }
    }
}

/// Allocate a fresh suffix and substitute it into every variable of a
/// rule's head and body, yielding a fresh copy with no variables shared
/// with the query or with any other trial of the same rule.
fn rename_rule(
    head: &Atom,
    body: &[Atom],
    vars: &mut VarAllocator,
    suffix: u64,
) -> (Atom, Vec<Atom>) {
    let mut renaming: HashMap<VarId, Term> = HashMap::new();
    let new_head = rename_atom(head, &mut renaming, &mut *vars, suffix);
    let new_body = body
        .iter()
        .map(|atom| rename_atom(atom, &mut renaming, &mut *vars, suffix))
        .collect();
    (new_head, new_body)
}

fn rename_term(term: &Term, renaming: &mut HashMap<VarId, Term>, vars: &mut VarAllocator, suffix: u64) -> Term {
    match term {
        Term::Constant(_) => term.clone(),
        Term::Variable(id, name) => renaming
            .entry(*id)
            .or_insert_with(|| vars.fresh(format!("{name}_{suffix}")))
            .clone(),
    }
}

fn rename_atom(atom: &Atom, renaming: &mut HashMap<VarId, Term>, vars: &mut VarAllocator, suffix: u64) -> Atom {
    let args = atom
        .args()
        .map(|t| rename_term(t, renaming, &mut *vars, suffix))
        .collect();
    Atom::new(atom.predicate().clone(), args)
}

fn goal_term_iter(atom: &Atom) -> impl Iterator<Item = &Term> {
    atom.args()
}
