mod analysis;
mod config;
mod order;
mod proof_logging;
mod propagator;
mod restarts;

use std::{
    fmt::Display,
    time::{Duration, Instant},
};

use fxhash::FxHashMap;
use itertools::Itertools;

pub use config::{OrderPolicy, RestartPolicy, SolverConfig};
pub use order::{ActivityOrder, RandomOrder, VariableOrder};
pub use restarts::{GeometricRestarts, LubyRestarts, NoRestarts, RestartStrategy};

use crate::{
    common::{
        storage::{ClauseData, ClauseRef, ClauseStorage},
        Literal, Var, Vocabulary,
    },
    constraint::{
        sanity::{sanity_check, sanity_check_at_least, Sanitized, SanitizedAtLeast},
        Constraint,
    },
    error::{ProofAssertionError, SolverError},
    proof::{ClauseId, Proof, ProofVisitor, ResolutionChecker},
};

use analysis::{Analysis, ConflictAnalyzer};
use proof_logging::ProofLogger;
use propagator::Propagator;

const CLAUSE_RESCALE_LIMIT: f64 = 1e20;

/// What became of a constraint handed to the solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintHandle {
    /// The constraint is stored, possibly one that was added before.
    Stored(ClauseRef),
    /// The constraint reduced to a single literal, asserted at level 0.
    Unit(Literal),
    /// A cardinality constraint which needs every one of its literals.
    Units(Vec<Literal>),
    /// Already satisfied or a tautology, nothing was stored.
    Satisfied,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Statistics {
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
    pub restarts: u64,
    pub learnt: u64,
    pub deleted: u64,
    pub reductions: u64,
}

impl Display for Statistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "decisions: {}, propagations: {}, conflicts: {}, restarts: {}, learnt: {}, deleted: {}, reductions: {}",
            self.decisions,
            self.propagations,
            self.conflicts,
            self.restarts,
            self.learnt,
            self.deleted,
            self.reductions
        )
    }
}

enum SearchOutcome {
    Sat,
    Unsat,
    Restart,
}

/// Limits of a single call to [`Solver::is_satisfiable_with`].
struct Budget {
    deadline: Option<Instant>,
    max_conflicts: Option<u64>,
}

impl Budget {
    fn exhausted(&self, conflicts: u64) -> bool {
        self.max_conflicts.map_or(false, |max| conflicts >= max)
            || self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }
}

/// A conflict driven clause learning solver.
///
/// Constraints can be added before and between calls to
/// [`Solver::is_satisfiable`]. Every call starts from level 0 and leaves the
/// solver at level 0 again.
#[derive(Debug)]
pub struct Solver {
    config: SolverConfig,
    voc: Vocabulary,
    clause_db: ClauseStorage,
    learnts: Vec<ClauseRef>,
    originals: usize,
    /// Stored original constraints, to detect duplicates.
    known: FxHashMap<Constraint, ClauseRef>,
    propagator: Propagator,
    analyzer: ConflictAnalyzer,
    order: Box<dyn VariableOrder>,
    restarts: Box<dyn RestartStrategy>,
    proof: ProofLogger,
    clause_inc: f64,
    max_learnts: f64,
    /// Trail length at level 0 when satisfied constraints were last removed.
    simplified: usize,
    unsat: bool,
    model: Option<Vec<i32>>,
    time_limit: Option<Duration>,
    conflict_limit: Option<u64>,
    stats: Statistics,
}

impl Default for Solver {
    fn default() -> Self {
        Solver::new(SolverConfig::default())
    }
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        let order = config.build_order();
        let restarts = config.restarts.build();
        let proof = if config.proof {
            ProofLogger::enabled()
        } else {
            ProofLogger::Disabled
        };
        Solver {
            config,
            voc: Vocabulary::new(),
            clause_db: ClauseStorage::default(),
            learnts: vec![],
            originals: 0,
            known: FxHashMap::default(),
            propagator: Propagator::default(),
            analyzer: ConflictAnalyzer::default(),
            order,
            restarts,
            proof,
            clause_inc: 1.0,
            max_learnts: 0.0,
            simplified: 0,
            unsat: false,
            model: None,
            time_limit: None,
            conflict_limit: None,
            stats: Statistics::default(),
        }
    }

    /// Add `count` fresh variables, numbered after the existing ones.
    pub fn new_var(&mut self, count: usize) {
        let Some(first) = self.voc.new_vars(count) else {
            return;
        };
        let vars = self.voc.num_vars();
        self.analyzer.grow(vars);
        self.proof.grow(vars);
        for id in first.id()..=vars as u32 {
            self.order.new_var(Var::new(id));
        }
    }

    pub fn num_vars(&self) -> usize {
        self.voc.num_vars()
    }

    /// Number of stored constraints, learnt ones included.
    pub fn num_constraints(&self) -> usize {
        self.clause_db.len()
    }

    pub fn num_learnts(&self) -> usize {
        self.learnts.len()
    }

    /// Start recording a resolution proof. Only possible before any constraint
    /// is added.
    pub fn enable_proof(&mut self) {
        assert!(
            self.clause_db.is_empty() && self.voc.trail().is_empty() && !self.unsat,
            "proof logging has to be enabled before adding constraints"
        );
        if !self.proof.is_enabled() {
            self.proof = ProofLogger::enabled();
            self.proof.grow(self.voc.num_vars());
        }
    }

    pub fn set_timeout(&mut self, limit: Duration) {
        self.time_limit = Some(limit);
    }

    pub fn set_timeout_on_conflicts(&mut self, conflicts: u64) {
        self.conflict_limit = Some(conflicts);
    }

    fn literal(&self, raw: i32) -> Literal {
        assert!(
            raw.unsigned_abs() as usize <= self.voc.num_vars(),
            "literal {} is out of range, there are {} variables",
            raw,
            self.voc.num_vars()
        );
        Literal::from(raw)
    }

    /// Add a clause given as dimacs literals. Fails with a contradiction if the
    /// clause is empty once the literals false at level 0 are removed.
    pub fn add_clause(&mut self, literals: &[i32]) -> Result<ConstraintHandle, SolverError> {
        let literals = literals.iter().map(|&l| self.literal(l)).collect_vec();
        self.add_literals(&literals)
    }

    /// Add the constraint that at least `degree` of the literals hold.
    pub fn add_at_least(
        &mut self,
        literals: &[i32],
        degree: usize,
    ) -> Result<ConstraintHandle, SolverError> {
        let literals = literals.iter().map(|&l| self.literal(l)).collect_vec();
        self.check_consistent()?;
        if self.proof.is_enabled() {
            return match degree {
                0 => Ok(ConstraintHandle::Satisfied),
                1 => self.add_literals(&literals),
                _ => Err(SolverError::ProofUnsupported),
            };
        }

        match sanity_check_at_least(&literals, degree, &self.voc) {
            Err(err) => {
                self.unsat = true;
                Err(err)
            }
            Ok(SanitizedAtLeast::Satisfied) | Ok(SanitizedAtLeast::Clause(Sanitized::Satisfied)) => {
                Ok(ConstraintHandle::Satisfied)
            }
            Ok(SanitizedAtLeast::Units(units)) => {
                for &lit in &units {
                    let assigned = self.voc.assign(lit, None);
                    debug_assert!(assigned.is_ok(), "unit {} is already false", lit);
                }
                self.propagate_root()?;
                Ok(ConstraintHandle::Units(units))
            }
            Ok(SanitizedAtLeast::Clause(Sanitized::Unit(lit))) => {
                self.assert_unit(lit, None)?;
                Ok(ConstraintHandle::Unit(lit))
            }
            Ok(SanitizedAtLeast::Clause(Sanitized::Clause(clause))) => {
                Ok(self.store(Constraint::clause(clause), &literals))
            }
            Ok(SanitizedAtLeast::AtLeast(literals, degree)) => {
                Ok(self.store(Constraint::at_least(literals.clone(), degree), &literals))
            }
        }
    }

    fn check_consistent(&self) -> Result<(), SolverError> {
        debug_assert_eq!(self.voc.decision_level(), 0);
        if self.unsat {
            Err(SolverError::Contradiction("the formula is already unsatisfiable"))
        } else {
            Ok(())
        }
    }

    fn add_literals(&mut self, literals: &[Literal]) -> Result<ConstraintHandle, SolverError> {
        self.check_consistent()?;
        match sanity_check(literals, &self.voc) {
            Err(err) => {
                self.proof.new_clause(literals, &self.voc);
                self.unsat = true;
                tracing::debug!("clause {} is a contradiction", itertools::join(literals, " "));
                Err(err)
            }
            Ok(Sanitized::Satisfied) => Ok(ConstraintHandle::Satisfied),
            Ok(Sanitized::Unit(lit)) => {
                let id = self.proof.new_clause(literals, &self.voc);
                self.assert_unit(lit, id)?;
                Ok(ConstraintHandle::Unit(lit))
            }
            Ok(Sanitized::Clause(clause)) => Ok(self.store(Constraint::clause(clause), literals)),
        }
    }

    /// Store an original constraint unless an equal one is stored already.
    fn store(&mut self, constraint: Constraint, original: &[Literal]) -> ConstraintHandle {
        if let Some(&existing) = self.known.get(&constraint) {
            tracing::warn!(
                "constraint {} is already stored as {}",
                itertools::join(constraint.literals(), " "),
                existing
            );
            return ConstraintHandle::Stored(existing);
        }
        let id = self.proof.new_clause(original, &self.voc);
        let clause = self
            .clause_db
            .insert(ClauseData::original(constraint.clone(), id));
        constraint.attach(clause, &mut self.voc);
        self.known.insert(constraint, clause);
        self.originals += 1;
        ConstraintHandle::Stored(clause)
    }

    /// Assert a literal at level 0 and propagate its consequences.
    fn assert_unit(&mut self, lit: Literal, id: Option<ClauseId>) -> Result<(), SolverError> {
        let assigned = self.voc.assign(lit, None);
        debug_assert!(assigned.is_ok(), "unit {} is already false", lit);
        self.proof.set_unit(lit.var(), id);
        self.propagate_root()
    }

    fn propagate_root(&mut self) -> Result<(), SolverError> {
        match self.propagator.propagate(&mut self.voc, &mut self.clause_db) {
            Ok(()) => {
                self.proof.record_root_units(&self.voc, &self.clause_db);
                Ok(())
            }
            Err(conflict) => {
                self.root_conflict(conflict);
                Err(SolverError::Contradiction("unit conflicts with level 0"))
            }
        }
    }

    fn root_conflict(&mut self, conflict: ClauseRef) {
        self.proof.record_root_units(&self.voc, &self.clause_db);
        let data = self.clause_db.data(conflict);
        self.proof
            .derive_empty(data.constraint.literals(), data.proof_id);
        self.unsat = true;
        tracing::info!("conflict at level 0, the formula is unsatisfiable");
    }

    pub fn is_satisfiable(&mut self) -> Result<bool, SolverError> {
        self.is_satisfiable_with(&[])
    }

    /// Decide the formula under additional unit assumptions. A `false` answer
    /// with assumptions only means the formula and the assumptions cannot hold
    /// together.
    pub fn is_satisfiable_with(&mut self, assumptions: &[i32]) -> Result<bool, SolverError> {
        self.model = None;
        if self.unsat {
            tracing::info!("the formula is known to be unsatisfiable");
            return Ok(false);
        }
        let assumptions = assumptions.iter().map(|&l| self.literal(l)).collect_vec();
        let budget = Budget {
            deadline: self.time_limit.map(|limit| Instant::now() + limit),
            max_conflicts: self.conflict_limit.map(|max| self.stats.conflicts + max),
        };
        self.max_learnts =
            (self.originals as f64 * self.config.learnt_ratio).max(self.config.min_learnts as f64);
        tracing::info!(
            "solving {} variables, {} constraints, {} assumptions",
            self.voc.num_vars(),
            self.originals,
            assumptions.len()
        );

        let result = self.solve(&assumptions, &budget);
        self.backtrack(0);
        match &result {
            Ok(true) => tracing::info!("satisfiable"),
            Ok(false) => tracing::info!("unsatisfiable"),
            Err(err) => tracing::info!("{}", err),
        }
        tracing::info!("{}", self.statistics());
        result
    }

    fn solve(&mut self, assumptions: &[Literal], budget: &Budget) -> Result<bool, SolverError> {
        loop {
            let interval = self.restarts.next_interval();
            match self.search(assumptions, interval, budget)? {
                SearchOutcome::Sat => {
                    self.model = Some(self.voc.model());
                    return Ok(true);
                }
                SearchOutcome::Unsat => return Ok(false),
                SearchOutcome::Restart => {
                    self.stats.restarts += 1;
                    self.max_learnts *= 1.1;
                    tracing::info!(
                        "restart {}: {} conflicts, {} learnts, {} constraints, {} variables",
                        self.stats.restarts,
                        self.stats.conflicts,
                        self.learnts.len(),
                        self.originals,
                        self.voc.num_vars()
                    );
                    if budget.exhausted(self.stats.conflicts) {
                        return Err(SolverError::Timeout);
                    }
                }
            }
        }
    }

    /// Search until a model is found, the formula is refuted or `interval`
    /// conflicts happened.
    fn search(
        &mut self,
        assumptions: &[Literal],
        interval: Option<u64>,
        budget: &Budget,
    ) -> Result<SearchOutcome, SolverError> {
        let mut conflicts = 0;
        loop {
            match self.propagator.propagate(&mut self.voc, &mut self.clause_db) {
                Err(conflict) => {
                    self.stats.conflicts += 1;
                    conflicts += 1;
                    if self.voc.decision_level() == 0 {
                        self.root_conflict(conflict);
                        return Ok(SearchOutcome::Unsat);
                    }

                    let analysis = self.analyzer.analyze(
                        conflict,
                        &self.voc,
                        &self.clause_db,
                        self.order.as_mut(),
                        &mut self.proof,
                    );
                    self.learn(analysis);
                    self.order.decay();
                    self.clause_inc /= self.config.clause_decay;

                    if budget.exhausted(self.stats.conflicts) {
                        return Err(SolverError::Timeout);
                    }
                }
                Ok(()) => {
                    if self.voc.decision_level() == 0 {
                        self.proof.record_root_units(&self.voc, &self.clause_db);
                        self.simplify_db();
                    }
                    if interval.map_or(false, |limit| conflicts >= limit) {
                        self.backtrack(0);
                        return Ok(SearchOutcome::Restart);
                    }
                    if self.learnts.len() as f64 - self.voc.trail().len() as f64 >= self.max_learnts {
                        self.reduce_db();
                    }

                    let next = match assumptions.get(self.voc.decision_level() as usize) {
                        Some(&lit) if self.voc.is_satisfied(lit) => {
                            // keep one level per assumption
                            self.voc.new_decision_level();
                            continue;
                        }
                        Some(&lit) if self.voc.is_falsified(lit) => {
                            tracing::debug!("assumption {} does not hold", lit);
                            return Ok(SearchOutcome::Unsat);
                        }
                        Some(&lit) => lit,
                        None => match self.order.select(&self.voc) {
                            Some(lit) => {
                                self.stats.decisions += 1;
                                lit
                            }
                            None => return Ok(SearchOutcome::Sat),
                        },
                    };
                    tracing::trace!("decide {} at level {}", next, self.voc.decision_level() + 1);
                    self.voc.decide(next);
                }
            }
        }
    }

    /// Backjump and assert the learnt clause.
    fn learn(&mut self, analysis: Analysis) {
        let Analysis {
            learnt,
            backtrack_level,
            antecedents,
            proof_id,
        } = analysis;
        for clause in antecedents {
            if self.clause_db.data(clause).learnt {
                self.bump_clause(clause);
            }
        }
        self.backtrack(backtrack_level);

        let asserting = learnt[0];
        if learnt.len() == 1 {
            let assigned = self.voc.assign(asserting, None);
            debug_assert!(assigned.is_ok(), "asserting literal {} is false", asserting);
            self.proof.set_unit(asserting.var(), proof_id);
        } else {
            let clause = self
                .clause_db
                .insert(ClauseData::learnt(Constraint::clause(learnt), proof_id));
            self.clause_db.data(clause).constraint.attach(clause, &mut self.voc);
            self.learnts.push(clause);
            self.bump_clause(clause);
            let assigned = self.voc.assign(asserting, Some(clause));
            debug_assert!(assigned.is_ok(), "asserting literal {} is false", asserting);
        }
        self.stats.learnt += 1;
    }

    fn backtrack(&mut self, level: u32) {
        let order = &mut self.order;
        self.voc.undo_to(level, |lit| order.undo(lit));
    }

    fn bump_clause(&mut self, clause: ClauseRef) {
        let data = self.clause_db.data_mut(clause);
        data.activity += self.clause_inc;
        if data.activity > CLAUSE_RESCALE_LIMIT {
            for &learnt in &self.learnts {
                if let Some(data) = self.clause_db.get_mut(learnt) {
                    data.activity /= CLAUSE_RESCALE_LIMIT;
                }
            }
            self.clause_inc /= CLAUSE_RESCALE_LIMIT;
        }
    }

    /// Remove about half of the learnt clauses, the least active first. Binary
    /// clauses and reasons are kept.
    fn reduce_db(&mut self) {
        let extra = self.clause_inc / self.learnts.len() as f64;
        let mut learnts = std::mem::take(&mut self.learnts);
        let db = &self.clause_db;
        learnts.sort_by(|&a, &b| {
            let (a, b) = (db.data(a), db.data(b));
            a.constraint
                .is_binary()
                .cmp(&b.constraint.is_binary())
                .then(a.activity.total_cmp(&b.activity))
        });

        let half = learnts.len() / 2;
        let before = learnts.len();
        for (i, clause) in learnts.into_iter().enumerate() {
            let data = self.clause_db.data(clause);
            let removable = !data.constraint.is_binary()
                && !data.constraint.locked(clause, &self.voc)
                && (i < half || data.activity < extra);
            if removable {
                self.remove_clause(clause);
            } else {
                self.learnts.push(clause);
            }
        }
        self.stats.reductions += 1;
        tracing::debug!(
            "reduced learnt clauses from {} to {}",
            before,
            self.learnts.len()
        );
    }

    /// Remove every constraint satisfied at level 0.
    fn simplify_db(&mut self) {
        debug_assert_eq!(self.voc.decision_level(), 0);
        if self.voc.trail().len() == self.simplified {
            return;
        }
        let satisfied = self
            .clause_db
            .clauses()
            .filter(|(_, data)| data.constraint.simplify(&self.voc))
            .map(|(clause, _)| clause)
            .collect_vec();
        for &clause in &satisfied {
            for &lit in self.clause_db.data(clause).constraint.literals() {
                if self.voc.reason(lit.var()) == Some(clause) {
                    self.voc.clear_reason(lit.var());
                }
            }
            self.remove_clause(clause);
        }
        let db = &self.clause_db;
        self.learnts.retain(|&clause| db.contains(clause));
        self.simplified = self.voc.trail().len();
        tracing::debug!("removed {} constraints satisfied at level 0", satisfied.len());
    }

    fn remove_clause(&mut self, clause: ClauseRef) {
        let Some(data) = self.clause_db.remove(clause) else {
            return;
        };
        data.constraint.detach(clause, &mut self.voc);
        self.proof.deleted(data.proof_id);
        if !data.learnt {
            self.known.remove(&data.constraint);
            self.originals -= 1;
        }
        self.stats.deleted += 1;
        tracing::trace!("removed {}", clause);
    }

    /// The model found by the last call, if it answered `true`.
    pub fn model(&self) -> Option<&[i32]> {
        self.model.as_deref()
    }

    pub fn statistics(&self) -> Statistics {
        Statistics {
            propagations: self.propagator.propagations(),
            ..self.stats
        }
    }

    pub fn proof(&self) -> Option<&Proof> {
        self.proof.proof()
    }

    /// Replay the recorded proof and make sure it derives the empty clause.
    pub fn check_proof(&self) -> Result<(), ProofAssertionError> {
        self.check_proof_with(&mut ResolutionChecker::default())
    }

    /// Like [`Solver::check_proof`] with a caller supplied checker.
    pub fn check_proof_with<V: ProofVisitor + AsRef<ResolutionChecker>>(
        &self,
        visitor: &mut V,
    ) -> Result<(), ProofAssertionError> {
        self.proof.check_with(visitor)
    }
}
