use crate::{
    common::{
        storage::{ClauseRef, ClauseStorage},
        Literal, Var, VarMap, Vocabulary,
    },
    proof::ClauseId,
};

use super::{order::VariableOrder, proof_logging::ProofLogger};

/// Result of analysing a conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// The asserting literal first, followed, if any, by the literal of the
    /// backtrack level.
    pub learnt: Vec<Literal>,
    pub backtrack_level: u32,
    /// Every constraint resolved with, the conflict included.
    pub antecedents: Vec<ClauseRef>,
    /// Id of the learnt clause in the proof, if one is recorded.
    pub proof_id: Option<ClauseId>,
}

/// First unique implication point conflict analysis.
#[derive(Debug, Default)]
pub struct ConflictAnalyzer {
    seen: VarMap<bool>,
    reason: Vec<Literal>,
    /// Variables fixed at level 0 met during the analysis.
    root_vars: Vec<Var>,
}

impl ConflictAnalyzer {
    pub fn grow(&mut self, vars: usize) {
        self.seen.grow(vars);
    }

    /// Resolve the conflict with the reasons of the current level literals, most
    /// recent first, until a single literal of the current level is left.
    /// Every resolution step is recorded in the proof, and level 0 literals are
    /// resolved away with their unit clauses at the end of the chain.
    pub fn analyze(
        &mut self,
        conflict: ClauseRef,
        voc: &Vocabulary,
        clause_db: &ClauseStorage,
        order: &mut dyn VariableOrder,
        proof: &mut ProofLogger,
    ) -> Analysis {
        let level = voc.decision_level();
        debug_assert!(level > 0, "conflicts at level 0 cannot be analysed");

        let mut learnt = vec![];
        let mut antecedents = vec![conflict];
        let mut pending = 0;
        let mut implied: Option<Literal> = None;
        let mut clause = conflict;
        let mut index = voc.trail().len();

        proof.begin_chain(clause_db.data(conflict).proof_id);
        loop {
            self.reason.clear();
            clause_db
                .data(clause)
                .constraint
                .calc_reason(implied, voc, &mut self.reason);

            for &lit in &self.reason {
                let var = lit.var();
                if self.seen[var] {
                    continue;
                }
                self.seen[var] = true;
                match voc.level(var) {
                    0 => self.root_vars.push(var),
                    l if l == level => {
                        order.bump(var);
                        pending += 1;
                    }
                    _ => {
                        order.bump(var);
                        learnt.push(-lit);
                    }
                }
            }

            // the most recent literal of the current level still to resolve
            let next = loop {
                index -= 1;
                let lit = voc.trail()[index];
                if self.seen[lit.var()] {
                    break lit;
                }
            };
            self.seen[next.var()] = false;
            implied = Some(next);
            pending -= 1;
            if pending == 0 {
                break;
            }

            clause = voc.reason(next.var()).unwrap_or_else(|| {
                panic!("no antecedent for {} while resolving a conflict", next)
            });
            antecedents.push(clause);
            proof.resolve(clause_db.data(clause).proof_id, next.var());
        }

        let asserting = -implied.expect("conflict without current level literal");
        learnt.insert(0, asserting);

        for &var in &self.root_vars {
            proof.resolve_unit(var);
            self.seen[var] = false;
        }
        debug_assert!(
            antecedents.len() > 1 || !self.root_vars.is_empty() || !proof.is_enabled(),
            "learnt clause is the conflict itself"
        );
        self.root_vars.clear();
        let proof_id = proof.end_chain();
        for lit in &learnt[1..] {
            self.seen[lit.var()] = false;
        }

        let backtrack_level = if learnt.len() == 1 {
            0
        } else {
            let (pos, level) = learnt[1..]
                .iter()
                .enumerate()
                .map(|(i, lit)| (i + 1, voc.level(lit.var())))
                .max_by_key(|&(_, level)| level)
                .expect("learnt clause has more than one literal");
            learnt.swap(1, pos);
            level
        };

        tracing::debug!(
            "learnt {} with backtrack level {}",
            itertools::join(learnt.iter(), " "),
            backtrack_level
        );
        Analysis {
            learnt,
            backtrack_level,
            antecedents,
            proof_id,
        }
    }
}
