use crate::{
    common::{Literal, Var},
    proof::ClauseId,
};

/// Errors surfaced to the caller of the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SolverError {
    /// The formula is unsatisfiable before any search took place.
    #[error("contradiction: {0}")]
    Contradiction(&'static str),
    /// The conflict or time budget ran out before an answer was found.
    #[error("timeout before an answer was found")]
    Timeout,
    /// A constraint that cannot be justified by resolution was added while proof
    /// logging is enabled.
    #[error("cardinality constraints cannot be recorded in a resolution proof")]
    ProofUnsupported,
}

/// A resolution proof failed to replay.
///
/// This indicates a bug in whoever produced the proof rather than a normal
/// outcome, but it never touches the state of the solver that produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProofAssertionError {
    #[error("resolved on missing variable: {0}")]
    MissingVariable(Var),
    #[error("resolved on variable with same polarity in both clauses: {0}")]
    SamePolarity(Var),
    #[error("clause {0} is not available")]
    DanglingClause(ClauseId),
    #[error("final clause {0} is not empty: {clause}", clause = display_clause(.1))]
    NotEmpty(ClauseId, Vec<Literal>),
    #[error("the proof does not derive the empty clause")]
    NoRefutation,
    #[error("proof logging is not enabled")]
    Disabled,
}

fn display_clause(literals: &[Literal]) -> String {
    itertools::join(literals.iter().map(|l| l.raw()), " ")
}
