//! Enumeration of every model of a formula by repeatedly blocking the last one.

use crate::{
    error::SolverError,
    solver::Solver,
};

/// Yields the models of the solver's formula one after the other. Each model is
/// blocked by adding the clause of its negated literals before the next search,
/// so the solver is left with every found model excluded.
#[derive(Debug)]
pub struct ModelIterator<'a> {
    solver: &'a mut Solver,
    done: bool,
}

impl<'a> ModelIterator<'a> {
    pub fn new(solver: &'a mut Solver) -> Self {
        ModelIterator {
            solver,
            done: false,
        }
    }
}

impl Iterator for ModelIterator<'_> {
    type Item = Result<Vec<i32>, SolverError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.solver.is_satisfiable() {
            Ok(true) => {}
            Ok(false) => {
                self.done = true;
                return None;
            }
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        }

        let model = self.solver.model().map(<[i32]>::to_vec).unwrap_or_default();
        let blocking: Vec<i32> = model.iter().map(|&lit| -lit).collect();
        // an empty blocking clause means this was the only model left
        if self.solver.add_clause(&blocking).is_err() {
            self.done = true;
        }
        Some(Ok(model))
    }
}

/// Count the models of the formula. The solver is left with every model
/// blocked.
pub fn count_models(solver: &mut Solver) -> Result<u64, SolverError> {
    let mut count = 0;
    for model in ModelIterator::new(solver) {
        model?;
        count += 1;
        tracing::trace!("found model {}", count);
    }
    Ok(count)
}
