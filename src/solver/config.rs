use super::{
    order::{ActivityOrder, RandomOrder, VariableOrder},
    restarts::{GeometricRestarts, LubyRestarts, NoRestarts, RestartStrategy},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RestartPolicy {
    Luby { base: u64 },
    Geometric { first: u64, factor: f64 },
    Never,
}

impl RestartPolicy {
    pub(super) fn build(self) -> Box<dyn RestartStrategy> {
        match self {
            RestartPolicy::Luby { base } => Box::new(LubyRestarts::new(base)),
            RestartPolicy::Geometric { first, factor } => {
                Box::new(GeometricRestarts::new(first, factor))
            }
            RestartPolicy::Never => Box::new(NoRestarts),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPolicy {
    /// Variable activity with phase saving.
    Activity,
    Random { seed: u64 },
}

/// How a [`super::Solver`] searches. The defaults follow the usual minisat
/// settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub restarts: RestartPolicy,
    pub order: OrderPolicy,
    pub var_decay: f64,
    pub clause_decay: f64,
    /// Initial learnt clause limit as a fraction of the original clauses.
    pub learnt_ratio: f64,
    pub min_learnts: usize,
    /// Record a resolution proof while searching.
    pub proof: bool,
}

impl SolverConfig {
    pub(super) fn build_order(&self) -> Box<dyn VariableOrder> {
        match self.order {
            OrderPolicy::Activity => Box::new(ActivityOrder::new(self.var_decay)),
            OrderPolicy::Random { seed } => Box::new(RandomOrder::new(seed)),
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            restarts: RestartPolicy::Luby { base: 100 },
            order: OrderPolicy::Activity,
            var_decay: 0.95,
            clause_decay: 0.999,
            learnt_ratio: 1.0 / 3.0,
            min_learnts: 1000,
            proof: false,
        }
    }
}
