//! The term model: constants, variables, atoms and clauses.

use std::{
    fmt::{self, Display},
    rc::Rc,
};

/// An interned constant name. Cloning is a refcount bump, not a copy of the
/// underlying bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Rc<str>);

impl Symbol {
    /// Intern a constant name.
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self(name.into())
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// A variable identity. Two variables are the same variable iff their ids
/// are equal; the name carried alongside is for diagnostics only (trace
/// output, error messages) and never participates in equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub(crate) u32);

/// A term: either a constant or a variable. This is a tagged two-variant
/// enum rather than a naming convention on a shared string type, so the
/// variable/constant distinction is a type-level fact, not a spelling
/// convention the rest of the engine has to keep re-deriving.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// An atomic constant.
    Constant(Symbol),
    /// A variable, identified by a stable id and a display name.
    Variable(VarId, Rc<str>),
}

impl Term {
    /// Whether this term is a variable.
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(..))
    }

    /// The variable id, if this term is a variable.
    pub fn var_id(&self) -> Option<VarId> {
        match self {
            Term::Variable(id, _) => Some(*id),
            Term::Constant(_) => None,
        }
    }

    /// The display name, for variables their source name, for constants
    /// their symbol text.
    pub fn display_name(&self) -> &str {
        match self {
            Term::Constant(sym) => sym.as_str(),
            Term::Variable(_, name) => name,
        }
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Constant(sym) => write!(f, "{sym}"),
            Term::Variable(_, name) => write!(f, "{name}"),
        }
    }
}

/// Allocates fresh variable identities. One counter is shared by the parser
/// (each clause gets its own scope, so identities never leak across
/// clauses) and the prover (each rule trial allocates a fresh block of
/// identities via renaming).
#[derive(Debug, Default)]
pub struct VarAllocator {
    next: u32,
}

impl VarAllocator {
    /// Construct a fresh allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new, never-before-seen variable identity with the given
    /// display name.
    pub fn fresh(&mut self, name: impl Into<Rc<str>>) -> Term {
        let id = VarId(self.next);
        self.next += 1;
        Term::Variable(id, name.into())
    }
}

/// A predicate application: a predicate name applied to a fixed-arity tuple
/// of argument terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    predicate: Symbol,
    args: Vec<Term>,
}

impl Atom {
    /// Construct a new atom.
    pub fn new(predicate: impl Into<Symbol>, args: Vec<Term>) -> Self {
        Self {
            predicate: predicate.into(),
            args,
        }
    }

    /// The predicate name.
    pub fn predicate(&self) -> &Symbol {
        &self.predicate
    }

    /// The arity (number of arguments).
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Iterate over the argument terms.
    pub fn args(&self) -> impl Iterator<Item = &Term> {
        self.args.iter()
    }

    /// Whether this atom contains no variables.
    pub fn is_ground(&self) -> bool {
        self.args.iter().all(|t| !t.is_variable())
    }

    /// Iterate over the variable ids occurring in this atom, in argument
    /// order, with duplicates.
    pub fn variable_ids(&self) -> impl Iterator<Item = VarId> + '_ {
        self.args.iter().filter_map(Term::var_id)
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.predicate)
        } else {
            write!(f, "{}(", self.predicate)?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ")")
        }
    }
}

/// A clause: a fact or a rule. Kept as an explicit two-variant type even
/// though an empty-bodied rule is behaviourally a fact, so parse output
/// preserves the surface distinction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// A fact: a single atom with no body.
    Fact(Atom),
    /// A rule: a head atom proved by an ordered body of premise atoms.
    Rule(Atom, Vec<Atom>),
}

impl Clause {
    /// Construct a fact clause.
    pub fn fact(atom: Atom) -> Self {
        Clause::Fact(atom)
    }

    /// Construct a rule clause.
    pub fn rule(head: Atom, body: Vec<Atom>) -> Self {
        Clause::Rule(head, body)
    }

    /// The head atom (a fact's atom, or a rule's head).
    pub fn head(&self) -> &Atom {
        match self {
            Clause::Fact(atom) => atom,
            Clause::Rule(head, _) => head,
        }
    }

    /// The body atoms, empty for a fact.
    pub fn body(&self) -> &[Atom] {
        match self {
            Clause::Fact(_) => &[],
            Clause::Rule(_, body) => body,
        }
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Fact(atom) => write!(f, "{atom}."),
            Clause::Rule(head, body) => {
                write!(f, "{head} :- ")?;
                for (i, atom) in body.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{atom}")?;
                }
                write!(f, ".")
            }
        }
    }
}

/// Construct a constant term.
pub fn make_constant(name: impl Into<Symbol>) -> Term {
    Term::Constant(name.into())
}

/// Construct a fact clause from an atom.
pub fn make_fact(atom: Atom) -> Clause {
    Clause::fact(atom)
}

/// Construct a rule clause from a head and a body.
pub fn make_rule(head: Atom, body: Vec<Atom>) -> Clause {
    Clause::rule(head, body)
}
