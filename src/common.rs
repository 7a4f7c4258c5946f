mod literal;
pub mod storage;
mod vocabulary;

pub use literal::*;
pub use vocabulary::*;

/// Raised when an assignment contradicts the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Conflict {}
