use crate::{
    common::{storage::ClauseStorage, Literal, Var, VarMap, Vocabulary},
    error::ProofAssertionError,
    proof::{ClauseId, Proof, ProofVisitor, ResolutionChecker},
};

/// Records the reasoning of a solver in a [`Proof`]. When disabled every
/// operation does nothing, so the search does not have to care whether a proof
/// is wanted.
#[derive(Debug, Default)]
pub enum ProofLogger {
    #[default]
    Disabled,
    Enabled(Box<ProofState>),
}

#[derive(Debug, Default)]
pub struct ProofState {
    proof: Proof,
    /// Id of the unit clause of every variable assigned at level 0.
    unit_ids: VarMap<Option<ClauseId>>,
    /// Prefix of the level 0 trail whose unit clauses are derived.
    unit_cursor: usize,
    empty: Option<ClauseId>,
}

impl ProofState {
    fn unit_id(&self, var: Var) -> ClauseId {
        self.unit_ids[var]
            .unwrap_or_else(|| panic!("no unit clause derived for {}", var))
    }
}

impl ProofLogger {
    pub fn enabled() -> Self {
        ProofLogger::Enabled(Box::default())
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, ProofLogger::Enabled(_))
    }

    pub fn proof(&self) -> Option<&Proof> {
        match self {
            ProofLogger::Disabled => None,
            ProofLogger::Enabled(state) => Some(&state.proof),
        }
    }

    /// Id of the empty clause, once derived.
    pub fn empty_clause(&self) -> Option<ClauseId> {
        match self {
            ProofLogger::Disabled => None,
            ProofLogger::Enabled(state) => state.empty,
        }
    }

    pub fn grow(&mut self, vars: usize) {
        if let ProofLogger::Enabled(state) = self {
            state.unit_ids.grow(vars);
        }
    }

    /// Record a clause of the formula as it was given and resolve away the
    /// literals already false at level 0. The id of the remaining clause is
    /// returned, which is the empty clause if every literal is false.
    pub fn new_clause(&mut self, original: &[Literal], voc: &Vocabulary) -> Option<ClauseId> {
        let ProofLogger::Enabled(state) = self else {
            return None;
        };
        let root = state.proof.add_root(original);
        state.proof.begin_chain(root);
        let mut falsified: Vec<Var> = original
            .iter()
            .filter(|&&l| voc.is_falsified(l))
            .map(|l| l.var())
            .collect();
        falsified.sort_unstable();
        falsified.dedup();
        for var in falsified {
            let unit = state.unit_id(var);
            state.proof.resolve(unit, var);
        }
        let id = state.proof.end_chain();
        if original.iter().all(|&l| voc.is_falsified(l)) {
            state.empty = Some(id);
        }
        Some(id)
    }

    /// The literal of `var` was asserted at level 0 by the clause `id`.
    pub fn set_unit(&mut self, var: Var, id: Option<ClauseId>) {
        if let ProofLogger::Enabled(state) = self {
            state.unit_ids[var] = id;
        }
    }

    pub fn begin_chain(&mut self, start: Option<ClauseId>) {
        if let ProofLogger::Enabled(state) = self {
            state.proof.begin_chain(start.expect("stored constraint without proof id"));
        }
    }

    pub fn resolve(&mut self, next: Option<ClauseId>, var: Var) {
        if let ProofLogger::Enabled(state) = self {
            state
                .proof
                .resolve(next.expect("stored constraint without proof id"), var);
        }
    }

    /// Resolve the chain with the unit clause of a variable fixed at level 0.
    pub fn resolve_unit(&mut self, var: Var) {
        if let ProofLogger::Enabled(state) = self {
            let unit = state.unit_id(var);
            state.proof.resolve(unit, var);
        }
    }

    pub fn end_chain(&mut self) -> Option<ClauseId> {
        match self {
            ProofLogger::Disabled => None,
            ProofLogger::Enabled(state) => Some(state.proof.end_chain()),
        }
    }

    pub fn deleted(&mut self, id: Option<ClauseId>) {
        if let (ProofLogger::Enabled(state), Some(id)) = (self, id) {
            state.proof.deleted(id);
        }
    }

    /// Derive a unit clause for every literal propagated at level 0 since the
    /// last call, by resolving its reason with the units of the other literals.
    pub fn record_root_units(&mut self, voc: &Vocabulary, clause_db: &ClauseStorage) {
        let ProofLogger::Enabled(state) = self else {
            return;
        };
        let root = voc.root_trail();
        for &lit in &root[state.unit_cursor.min(root.len())..] {
            let var = lit.var();
            if state.unit_ids[var].is_some() {
                continue;
            }
            let reason = voc
                .reason(var)
                .unwrap_or_else(|| panic!("{} is fixed at level 0 without a reason", lit));
            let data = clause_db.data(reason);
            state
                .proof
                .begin_chain(data.proof_id.expect("stored constraint without proof id"));
            for &other in data.constraint.literals() {
                if other.var() != var {
                    let unit = state.unit_id(other.var());
                    state.proof.resolve(unit, other.var());
                }
            }
            let id = state.proof.end_chain();
            state.unit_ids[var] = Some(id);
        }
        state.unit_cursor = root.len();
    }

    /// Derive the empty clause from a constraint falsified at level 0.
    pub fn derive_empty(&mut self, conflict: &[Literal], start: Option<ClauseId>) {
        let ProofLogger::Enabled(state) = self else {
            return;
        };
        state
            .proof
            .begin_chain(start.expect("stored constraint without proof id"));
        for lit in conflict {
            let unit = state.unit_id(lit.var());
            state.proof.resolve(unit, lit.var());
        }
        let id = state.proof.end_chain();
        tracing::debug!("derived the empty clause as {}", id);
        state.empty = Some(id);
    }

    /// Replay the proof up to the empty clause with the given checker.
    pub fn check_with<V: ProofVisitor + AsRef<ResolutionChecker>>(
        &self,
        visitor: &mut V,
    ) -> Result<(), ProofAssertionError> {
        let ProofLogger::Enabled(state) = self else {
            return Err(ProofAssertionError::Disabled);
        };
        let empty = state.empty.ok_or(ProofAssertionError::NoRefutation)?;
        state.proof.check_with(visitor, Some(empty))
    }
}
