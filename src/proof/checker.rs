use super::ClauseId;
use crate::{
    common::{Literal, Var},
    error::ProofAssertionError,
};

/// Receives the events of a proof log in order.
pub trait ProofVisitor {
    fn root(&mut self, id: ClauseId, literals: &[Literal]) -> Result<(), ProofAssertionError>;

    fn chain(
        &mut self,
        id: ClauseId,
        start: ClauseId,
        steps: &[(Var, ClauseId)],
    ) -> Result<(), ProofAssertionError>;

    fn deleted(&mut self, id: ClauseId) -> Result<(), ProofAssertionError>;

    /// Called once the goal of a traversal has been reached.
    fn done(&mut self) {}
}

/// Visitor that rebuilds every clause of a proof by actually performing the
/// resolutions of each chain.
#[derive(Debug, Default)]
pub struct ResolutionChecker {
    clauses: Vec<Option<Vec<Literal>>>,
}

impl ResolutionChecker {
    /// The clause derived for `id`, if it is still alive.
    pub fn clause(&self, id: ClauseId) -> Result<&[Literal], ProofAssertionError> {
        self.clauses
            .get(id.raw() as usize)
            .and_then(Option::as_deref)
            .ok_or(ProofAssertionError::DanglingClause(id))
    }

    /// Number of clauses derived so far, deleted ones included.
    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    fn push(&mut self, id: ClauseId, clause: Vec<Literal>) {
        debug_assert_eq!(id.raw() as usize, self.clauses.len(), "ids out of order");
        self.clauses.push(Some(clause));
    }
}

impl AsRef<ResolutionChecker> for ResolutionChecker {
    fn as_ref(&self) -> &ResolutionChecker {
        self
    }
}

impl ProofVisitor for ResolutionChecker {
    fn root(&mut self, id: ClauseId, literals: &[Literal]) -> Result<(), ProofAssertionError> {
        self.push(id, literals.to_vec());
        Ok(())
    }

    fn chain(
        &mut self,
        id: ClauseId,
        start: ClauseId,
        steps: &[(Var, ClauseId)],
    ) -> Result<(), ProofAssertionError> {
        let mut clause = self.clause(start)?.to_vec();
        for &(var, next) in steps {
            clause = resolve(&clause, self.clause(next)?, var)?;
        }
        self.push(id, clause);
        Ok(())
    }

    fn deleted(&mut self, id: ClauseId) -> Result<(), ProofAssertionError> {
        let slot = self
            .clauses
            .get_mut(id.raw() as usize)
            .ok_or(ProofAssertionError::DanglingClause(id))?;
        *slot = None;
        Ok(())
    }
}

/// Resolve two sorted, duplicate free clauses on `var`. The variable has to
/// occur in both clauses, with opposite polarities.
pub fn resolve(
    clause: &[Literal],
    other: &[Literal],
    var: Var,
) -> Result<Vec<Literal>, ProofAssertionError> {
    let pivot = clause
        .iter()
        .copied()
        .find(|l| l.var() == var)
        .ok_or(ProofAssertionError::MissingVariable(var))?;
    let opposite = other
        .iter()
        .copied()
        .find(|l| l.var() == var)
        .ok_or(ProofAssertionError::MissingVariable(var))?;
    if pivot == opposite {
        return Err(ProofAssertionError::SamePolarity(var));
    }

    let mut resolvent: Vec<Literal> = clause
        .iter()
        .chain(other)
        .copied()
        .filter(|l| l.var() != var)
        .collect();
    resolvent.sort_unstable();
    resolvent.dedup();
    Ok(resolvent)
}
