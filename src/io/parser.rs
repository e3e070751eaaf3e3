//! A parser for the surface syntax: `name(arg1,arg2,...)` facts and
//! `head :- body1, body2.` rules, ported from `prolog_parser.py`'s
//! regex-and-split approach into `nom` combinators plus the same
//! paren-depth-aware splitting the original uses for rule bodies.

use std::{cell::RefCell, collections::HashMap};

use nom::{
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace0},
    combinator::{all_consuming, map, opt, recognize},
    multi::{many0, many0_count, separated_list0},
    sequence::{delimited, pair, preceded},
    IResult,
};

use crate::{
    error::Error,
    term::{make_constant, Atom, Clause, Term, VarAllocator},
};

/// A clause that failed to parse: the source span and the reason, kept so
/// callers can report diagnostics even though the parser itself never
/// aborts a whole file over one bad clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// The clause text that failed to parse.
    pub span: String,
    /// A short, human-readable reason.
    pub reason: String,
}

/// The result of parsing a whole source text: facts and rules in source
/// order, plus any clauses that had to be skipped.
#[derive(Debug, Clone, Default)]
pub struct ParsedProgram {
    /// Facts, in source order.
    pub facts: Vec<Atom>,
    /// Rules (head, body), in source order.
    pub rules: Vec<(Atom, Vec<Atom>)>,
    /// Clauses that failed to parse and were skipped.
    pub issues: Vec<ParseIssue>,
}

/// Parses a single clause. Holds a per-clause variable scope (variable
/// names do not carry identity across clauses) plus the allocator that
/// mints fresh variable ids; [`ClauseParser::into_var_allocator`] lets a
/// caller (the prover, parsing a goal) keep allocating from the same
/// counter afterwards, so query variables and any later rule-renaming
/// variables never collide.
#[derive(Debug, Default)]
pub struct ClauseParser {
    scope: RefCell<HashMap<String, Term>>,
    vars: RefCell<VarAllocator>,
}

impl ClauseParser {
    /// Construct a parser with a fresh variable scope and allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recover the variable allocator, to keep minting fresh ids after
    /// parsing (e.g. for rule renaming during a proof).
    pub fn into_var_allocator(self) -> VarAllocator {
        self.vars.into_inner()
    }

    fn resolve_var(&self, name: &str) -> Term {
        if name == "_" {
            // Anonymous: fresh identity at every occurrence.
            return self.vars.borrow_mut().fresh("_");
        }
        if let Some(term) = self.scope.borrow().get(name) {
            return term.clone();
        }
        let term = self.vars.borrow_mut().fresh(name.to_owned());
        self.scope.borrow_mut().insert(name.to_owned(), term.clone());
        term
    }

    fn term_for(&self, ident: &str) -> Term {
        let is_variable = ident == "_"
            || ident
                .chars()
                .next()
                .is_some_and(|c| c == '_' || c.is_uppercase());
        if is_variable {
            self.resolve_var(ident)
        } else {
            make_constant(ident)
        }
    }

    /// Parse an identifier: letters/digits/underscores, starting with a
    /// letter or underscore.
    fn ident<'a>(&self, input: &'a str) -> IResult<&'a str, &'a str> {
        recognize(pair(
            nom::branch::alt((alpha1, tag("_"))),
            many0_count(nom::branch::alt((alphanumeric1, tag("_")))),
        ))(input)
    }

    /// Parse a single argument: a variable or a constant, classified by
    /// spelling.
    fn parse_arg<'a>(&self, input: &'a str) -> IResult<&'a str, Term> {
        map(preceded(multispace0, |i| self.ident(i)), |name| {
            self.term_for(name)
        })(input)
    }

    /// Parse an atom: `name(arg1,...)` or a bare `name`.
    pub fn parse_atom<'a>(&self, input: &'a str) -> IResult<&'a str, Atom> {
        let (input, _) = multispace0(input)?;
        let (input, name) = self.ident(input)?;
        let (input, args) = opt(delimited(
            preceded(multispace0, char('(')),
            separated_list0(preceded(multispace0, char(',')), |i| self.parse_arg(i)),
            preceded(multispace0, char(')')),
        ))(input)?;
        let (input, _) = multispace0(input)?;
        log::trace!(target: "parser", "parsed atom {name}/{}", args.as_ref().map_or(0, Vec::len));
        Ok((input, Atom::new(name, args.unwrap_or_default())))
    }

    /// Parse one clause span (no trailing `.`, comments already stripped)
    /// into a [`Clause`]. Premises that fail to parse, or that begin with
    /// a backslash-escape operator such as `\=`, are dropped from the
    /// rule's body without making the whole clause fail — this is the
    /// documented, intentional behaviour for the engine's unsupported
    /// disequality operator.
    pub fn parse_clause(&self, span: &str) -> Result<Clause, String> {
        let span = span.trim();
        if let Some(pos) = span.find(":-") {
            let head_str = span[..pos].trim();
            let body_str = span[pos + 2..].trim();

            let (_, head) = all_consuming(|i| self.parse_atom(i))(head_str)
                .map_err(|e| format!("malformed rule head {head_str:?}: {e}"))?;

            let mut body = Vec::new();
            for premise in split_top_level_commas(body_str) {
                let premise = premise.trim();
                if premise.is_empty() {
                    continue;
                }
                if premise.starts_with('\\') {
                    log::debug!(target: "parser", "dropping disequality premise {premise:?}");
                    continue;
                }
                match all_consuming(|i| self.parse_atom(i))(premise) {
                    Ok((_, atom)) => body.push(atom),
                    Err(_) => {
                        log::debug!(target: "parser", "skipping malformed premise {premise:?}");
                    }
                }
            }

            Ok(Clause::rule(head, body))
        } else {
            let (_, atom) = all_consuming(|i| self.parse_atom(i))(span)
                .map_err(|e| format!("malformed fact {span:?}: {e}"))?;
            Ok(Clause::fact(atom))
        }
    }

    /// Parse goal text (a single atom, no trailing period required) into
    /// an [`Atom`].
    pub fn parse_goal(&self, text: &str) -> Result<Atom, Error> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyGoal);
        }
        let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed).trim();
        all_consuming(|i| self.parse_atom(i))(trimmed)
            .map(|(_, atom)| atom)
            .map_err(|_| Error::GoalParse(text.to_owned()))
    }
}

/// Split `%`-comments (which extend to end of line) out of a source text,
/// leaving newlines in place so later span-finding still works across
/// commented-out lines.
fn strip_comments(text: &str) -> String {
    text.lines()
        .map(|line| match line.find('%') {
            Some(idx) => &line[..idx],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split a rule body on commas, but only at paren-depth zero, so premises
/// like `\=(X,Y)` are not torn apart by their own argument list's comma.
fn split_top_level_commas(s: &str) -> Vec<&str> {
    let mut depth = 0i32;
    let mut start = 0usize;
    let mut out = Vec::new();
    for (idx, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                out.push(s[start..idx].trim());
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    let last = s[start..].trim();
    if !last.is_empty() {
        out.push(last);
    }
    out
}

/// Find the next clause span: everything up to (not including) the first
/// `.` that sits at paren-depth zero. Consumes that `.` as the separator.
fn clause_span(input: &str) -> IResult<&str, &str> {
    let (input, _) = multispace0(input)?;
    if input.is_empty() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Eof,
        )));
    }

    let mut depth = 0i32;
    for (idx, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            '.' if depth == 0 => {
                let (span, rest) = input.split_at(idx);
                return Ok((&rest[1..], span.trim()));
            }
            _ => {}
        }
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Eof,
    )))
}

/// Parse a whole source text into facts and rules, in source order,
/// skipping (and reporting) any clause that fails to parse. An empty file,
/// or one containing only comments, yields empty lists.
pub fn parse_program(text: &str) -> ParsedProgram {
    let stripped = strip_comments(text);
    let (_, spans) = many0(clause_span)(stripped.as_str()).unwrap_or((stripped.as_str(), vec![]));

    let mut program = ParsedProgram::default();
    for span in spans {
        if span.is_empty() {
            continue;
        }
        let parser = ClauseParser::new();
        match parser.parse_clause(span) {
            Ok(Clause::Fact(atom)) => program.facts.push(atom),
            Ok(Clause::Rule(head, body)) => program.rules.push((head, body)),
            Err(reason) => {
                log::warn!(target: "parser", "skipping malformed clause {span:?}: {reason}");
                program.issues.push(ParseIssue {
                    span: span.to_owned(),
                    reason,
                });
            }
        }
    }
    program
}

/// Parse a single goal atom, with its own fresh variable scope.
pub fn parse_goal(text: &str) -> Result<Atom, Error> {
    ClauseParser::new().parse_goal(text)
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    #[test]
    fn parses_ground_fact() {
        let parser = ClauseParser::new();
        let (_, atom) = parser.parse_atom("has_fur(dog)").unwrap();
        assert_eq!(atom.to_string(), "has_fur(dog)");
    }

    #[test]
    fn parses_bare_atom() {
        let parser = ClauseParser::new();
        let (_, atom) = parser.parse_atom("flightless").unwrap();
        assert_eq!(atom.arity(), 0);
    }

    #[test]
    fn same_name_same_variable_within_a_clause() {
        let parser = ClauseParser::new();
        let clause = parser
            .parse_clause("mammal(X) :- has_fur(X), warm_blooded(X)")
            .unwrap();
        let head_var = clause.head().args().next().unwrap().var_id();
        for atom in clause.body() {
            assert_eq!(atom.args().next().unwrap().var_id(), head_var);
        }
    }

    #[test]
    fn anonymous_variables_are_fresh_per_occurrence() {
        let parser = ClauseParser::new();
        let clause = parser.parse_clause("p(_, _)").unwrap();
        let mut args = clause.head().args();
        let a = args.next().unwrap().var_id();
        let b = args.next().unwrap().var_id();
        assert_ne!(a, b);
    }

    #[test]
    fn drops_disequality_premises_without_error() {
        let parser = ClauseParser::new();
        let clause = parser.parse_clause("p(X) :- q(X), X \\= Y").unwrap();
        assert_eq!(clause.body().len(), 1);
        assert_eq!(clause.body()[0].predicate().as_str(), "q");
    }

    #[test]
    fn comments_are_stripped() {
        let program = parse_program("% a comment\nhas_fur(dog). % trailing\n");
        assert_eq!(program.facts.len(), 1);
        assert!(program.issues.is_empty());
    }

    #[test]
    fn malformed_clause_is_skipped_not_fatal() {
        let program = parse_program("has_fur(dog).\n(((.\nwarm_blooded(dog).");
        assert_eq!(program.facts.len(), 2);
        assert_eq!(program.issues.len(), 1);
    }

    #[test]
    fn empty_file_yields_empty_lists() {
        let program = parse_program("   \n % only a comment\n");
        assert!(program.facts.is_empty());
        assert!(program.rules.is_empty());
    }

    #[test]
    fn multiline_clause_is_one_clause() {
        let program = parse_program("grandparent(X,Z) :-\n  parent(X,Y),\n  parent(Y,Z).\n");
        assert_eq!(program.rules.len(), 1);
        assert_eq!(program.rules[0].1.len(), 2);
    }

    #[test]
    fn body_split_respects_paren_depth() {
        let parts = split_top_level_commas("foo(a,b), bar(c)");
        assert_eq!(parts, vec!["foo(a,b)", "bar(c)"]);
    }

    #[test]
    fn goal_parses_without_trailing_dot() {
        let atom = parse_goal("mammal(dog)").unwrap();
        assert_eq!(atom.to_string(), "mammal(dog)");
    }

    #[test]
    fn empty_goal_is_an_error() {
        assert_eq!(parse_goal("   "), Err(Error::EmptyGoal));
    }
}
