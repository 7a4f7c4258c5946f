mod binary;
mod cardinality;
pub mod sanity;
mod watched;

use std::hash::{Hash, Hasher};

pub use binary::*;
pub use cardinality::*;
pub use watched::*;

use crate::common::{storage::ClauseRef, Conflict, Literal, Vocabulary};

/// The constraints a solver stores. Unit clauses are never stored: they are
/// asserted at level 0 as soon as they are known.
#[derive(Debug, Clone)]
pub enum Constraint {
    Binary(BinaryClause),
    Watched(WatchedClause),
    AtLeast(AtLeast),
}

impl Constraint {
    /// Create a clause of at least two literals. The first two literals are the
    /// ones watched.
    pub fn clause(literals: Vec<Literal>) -> Self {
        assert!(literals.len() >= 2, "stored clauses have at least two literals");
        if literals.len() == 2 {
            Constraint::Binary(BinaryClause::new(literals[0], literals[1]))
        } else {
            Constraint::Watched(WatchedClause::new(literals))
        }
    }

    pub fn at_least(literals: Vec<Literal>, degree: usize) -> Self {
        Constraint::AtLeast(AtLeast::new(literals, degree))
    }

    pub fn literals(&self) -> &[Literal] {
        match self {
            Constraint::Binary(c) => c.literals(),
            Constraint::Watched(c) => c.literals(),
            Constraint::AtLeast(c) => c.literals(),
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Constraint::Binary(_))
    }

    /// The literals currently watched by this constraint.
    pub fn watched(&self) -> &[Literal] {
        match self {
            Constraint::Binary(c) => c.literals(),
            Constraint::Watched(c) => c.watched(),
            Constraint::AtLeast(c) => c.watched(),
        }
    }

    /// Register the constraint in the watch lists of its watched literals.
    pub fn attach(&self, clause: ClauseRef, voc: &mut Vocabulary) {
        for &lit in self.watched() {
            voc.watch(lit, clause);
        }
    }

    pub fn detach(&self, clause: ClauseRef, voc: &mut Vocabulary) {
        for &lit in self.watched() {
            voc.unwatch(lit, clause);
        }
    }

    /// React to the watched literal `falsified` becoming false. The constraint
    /// either moves the watch, stays watched because it is satisfied, or
    /// assigns the literals it now implies. A conflict is returned if an implied
    /// literal is already false.
    pub fn propagate(
        &mut self,
        clause: ClauseRef,
        voc: &mut Vocabulary,
        falsified: Literal,
    ) -> Result<(), Conflict> {
        match self {
            Constraint::Binary(c) => c.propagate(clause, voc, falsified),
            Constraint::Watched(c) => c.propagate(clause, voc, falsified),
            Constraint::AtLeast(c) => c.propagate(clause, voc, falsified),
        }
    }

    /// Append to `out` the literals whose truth forced `implied`, that is the
    /// negation of every other falsified literal. With `None` the constraint is
    /// the conflict and every falsified literal is explained.
    pub fn calc_reason(&self, implied: Option<Literal>, voc: &Vocabulary, out: &mut Vec<Literal>) {
        match self {
            Constraint::Binary(c) => c.calc_reason(implied, voc, out),
            Constraint::Watched(c) => c.calc_reason(implied, voc, out),
            Constraint::AtLeast(c) => c.calc_reason(implied, voc, out),
        }
    }

    /// True if the constraint is satisfied at level 0 and can be dropped for
    /// good.
    pub fn simplify(&self, voc: &Vocabulary) -> bool {
        match self {
            Constraint::AtLeast(c) => c.simplify(voc),
            _ => self
                .literals()
                .iter()
                .any(|&lit| voc.is_satisfied(lit) && voc.level(lit.var()) == 0),
        }
    }

    /// True if the constraint is the reason of one of its watched literals and
    /// thus may not be removed.
    pub fn locked(&self, clause: ClauseRef, voc: &Vocabulary) -> bool {
        self.watched()
            .iter()
            .any(|&lit| voc.is_satisfied(lit) && voc.reason(lit.var()) == Some(clause))
    }

    fn degree(&self) -> usize {
        match self {
            Constraint::AtLeast(c) => c.degree(),
            _ => 1,
        }
    }

    /// The literals in sorted order, independent of where the watches moved.
    pub fn sorted_literals(&self) -> Vec<Literal> {
        let mut literals = self.literals().to_vec();
        literals.sort_unstable();
        literals
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.degree() == other.degree() && self.sorted_literals() == other.sorted_literals()
    }
}

impl Eq for Constraint {}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.degree().hash(state);
        self.sorted_literals().hash(state);
    }
}
