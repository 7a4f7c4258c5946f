//! A conflict driven clause learning SAT solver which can record the
//! resolution steps of its conflict analysis and check them afterwards.

pub mod common;
pub mod constraint;
pub mod enumerate;
pub mod error;
pub mod parser;
pub mod proof;
pub mod solver;

pub use common::{Literal, Var};
pub use enumerate::{count_models, ModelIterator};
pub use error::{ProofAssertionError, SolverError};
pub use proof::{ClauseId, Proof, ProofEvent, ProofVisitor, ResolutionChecker};
pub use solver::{ConstraintHandle, OrderPolicy, RestartPolicy, Solver, SolverConfig, Statistics};
