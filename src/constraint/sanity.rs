//! Normalisation of constraints before they are stored.

use itertools::Itertools;

use crate::{
    common::{Literal, Vocabulary},
    error::SolverError,
};

/// Outcome of checking a candidate clause against the current assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sanitized {
    /// The clause is already satisfied or a tautology and can be dropped.
    Satisfied,
    /// A single literal remains, it has to be asserted instead of stored.
    Unit(Literal),
    /// Sorted, duplicate free literals of which none is assigned.
    Clause(Vec<Literal>),
}

/// Check a candidate clause before it is created: drop it if a literal is
/// true, remove false literals, sort and deduplicate, drop tautologies and fail
/// on the empty clause. Running the check on its own output changes nothing.
pub fn sanity_check(literals: &[Literal], voc: &Vocabulary) -> Result<Sanitized, SolverError> {
    if literals.iter().any(|&l| voc.is_satisfied(l)) {
        return Ok(Sanitized::Satisfied);
    }
    let literals = literals
        .iter()
        .copied()
        .filter(|&l| !voc.is_falsified(l))
        .sorted_unstable()
        .dedup()
        .collect_vec();

    if literals.iter().tuple_windows().any(|(&a, &b)| a == -b) {
        return Ok(Sanitized::Satisfied);
    }

    match literals.len() {
        0 => Err(SolverError::Contradiction("creating empty clause")),
        1 => Ok(Sanitized::Unit(literals[0])),
        _ => Ok(Sanitized::Clause(literals)),
    }
}

/// Outcome of checking a candidate cardinality constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizedAtLeast {
    Satisfied,
    /// Every literal is needed, each of them is a unit.
    Units(Vec<Literal>),
    /// The degree dropped to one, this is an ordinary clause.
    Clause(Sanitized),
    AtLeast(Vec<Literal>, usize),
}

/// Same idea as [`sanity_check`] for "at least `degree` of `literals`". True
/// literals and complementary pairs each lower the degree by one.
pub fn sanity_check_at_least(
    literals: &[Literal],
    degree: usize,
    voc: &Vocabulary,
) -> Result<SanitizedAtLeast, SolverError> {
    let mut degree = degree as i64;
    let mut open = vec![];
    for &lit in literals {
        if voc.is_satisfied(lit) {
            degree -= 1;
        } else if !voc.is_falsified(lit) {
            open.push(lit);
        }
    }
    open.sort_unstable();
    open.dedup();

    let mut kept: Vec<Literal> = Vec::with_capacity(open.len());
    for lit in open {
        if kept.last() == Some(&-lit) {
            kept.pop();
            degree -= 1;
        } else {
            kept.push(lit);
        }
    }

    if degree <= 0 {
        Ok(SanitizedAtLeast::Satisfied)
    } else if degree as usize > kept.len() {
        Err(SolverError::Contradiction("cardinality constraint cannot be satisfied"))
    } else if degree as usize == kept.len() {
        Ok(SanitizedAtLeast::Units(kept))
    } else if degree == 1 {
        sanity_check(&kept, voc).map(SanitizedAtLeast::Clause)
    } else {
        Ok(SanitizedAtLeast::AtLeast(kept, degree as usize))
    }
}
