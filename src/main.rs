use std::time::Duration;

use anyhow::{anyhow, Result};
use chainsat::{
    count_models,
    parser,
    proof::{ClauseId, ProofVisitor, ResolutionChecker},
    Literal, OrderPolicy, ProofAssertionError, RestartPolicy, Solver, SolverConfig, SolverError,
    Var,
};
use clap::{Parser, ValueEnum};
use indicatif::ProgressBar;
use itertools::Itertools;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Restarts {
    Luby,
    Geometric,
    Never,
}

#[derive(Parser, Debug)]
pub struct Flags {
    #[arg(long)]
    /// Record a resolution proof and check it if the formula is unsatisfiable.
    proof: bool,
    #[arg(short, long)]
    /// Show a progress bar while the proof is checked.
    progress: bool,
    #[arg(short, long)]
    /// Give up after this many seconds.
    timeout: Option<f64>,
    #[arg(long)]
    /// Give up after this many conflicts.
    conflicts: Option<u64>,
    #[arg(long, value_enum, default_value_t = Restarts::Luby)]
    restarts: Restarts,
    #[arg(long)]
    /// Decide on random variables instead of the most active ones.
    random_order: bool,
    #[arg(long, default_value_t = 0)]
    /// Seed of the random variable order.
    seed: u64,
    #[arg(short, long)]
    /// Count the models of the formula instead of printing one.
    count: bool,
    cnf: String,
}

impl Flags {
    fn config(&self) -> SolverConfig {
        let restarts = match self.restarts {
            Restarts::Luby => RestartPolicy::Luby { base: 100 },
            Restarts::Geometric => RestartPolicy::Geometric {
                first: 100,
                factor: 1.5,
            },
            Restarts::Never => RestartPolicy::Never,
        };
        let order = if self.random_order {
            OrderPolicy::Random { seed: self.seed }
        } else {
            OrderPolicy::Activity
        };
        SolverConfig {
            restarts,
            order,
            proof: self.proof,
            ..SolverConfig::default()
        }
    }
}

/// Checks the proof while advancing a progress bar for every replayed clause.
struct ProgressChecker {
    checker: ResolutionChecker,
    progress: ProgressBar,
}

impl ProofVisitor for ProgressChecker {
    fn root(&mut self, id: ClauseId, literals: &[Literal]) -> Result<(), ProofAssertionError> {
        self.progress.inc(1);
        self.checker.root(id, literals)
    }

    fn chain(
        &mut self,
        id: ClauseId,
        start: ClauseId,
        steps: &[(Var, ClauseId)],
    ) -> Result<(), ProofAssertionError> {
        self.progress.inc(1);
        self.checker.chain(id, start, steps)
    }

    fn deleted(&mut self, id: ClauseId) -> Result<(), ProofAssertionError> {
        self.checker.deleted(id)
    }

    fn done(&mut self) {
        self.progress.finish();
    }
}

impl AsRef<ResolutionChecker> for ProgressChecker {
    fn as_ref(&self) -> &ResolutionChecker {
        &self.checker
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();
    let flags = Flags::parse();

    let (header, clauses) = parser::cnf::parse(&std::fs::read_to_string(&flags.cnf)?)?;

    let mut solver = Solver::new(flags.config());
    solver.new_var(header.vars);
    if let Some(seconds) = flags.timeout {
        solver.set_timeout(Duration::from_secs_f64(seconds));
    }
    if let Some(conflicts) = flags.conflicts {
        solver.set_timeout_on_conflicts(conflicts);
    }

    for clause in &clauses {
        if let Err(err) = solver.add_clause(clause) {
            // the solver remembers the formula is unsatisfiable
            tracing::info!("{}", err);
            break;
        }
    }

    if flags.count {
        match count_models(&mut solver) {
            Ok(count) => println!("c {} models", count),
            Err(SolverError::Timeout) => println!("s UNKNOWN"),
            Err(err) => return Err(err.into()),
        }
        return Ok(());
    }

    match solver.is_satisfiable() {
        Ok(true) => {
            println!("s SATISFIABLE");
            let model = solver.model().ok_or(anyhow!("satisfiable without a model"))?;
            println!("v {} 0", model.iter().join(" "));
        }
        Ok(false) => {
            println!("s UNSATISFIABLE");
            if flags.proof {
                let progress = if flags.progress {
                    ProgressBar::new(solver.proof().map_or(0, |p| p.num_clauses()) as u64)
                } else {
                    ProgressBar::hidden()
                };
                let mut checker = ProgressChecker {
                    checker: ResolutionChecker::default(),
                    progress,
                };
                solver.check_proof_with(&mut checker)?;
                println!("c proof verified");
            }
        }
        Err(SolverError::Timeout) => println!("s UNKNOWN"),
        Err(err) => return Err(err.into()),
    }
    tracing::info!("{}", solver.statistics());
    Ok(())
}
