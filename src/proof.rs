mod checker;
mod events;

use std::fmt::Display;

pub use checker::*;
pub use events::*;

use crate::{
    common::{Literal, Var},
    error::ProofAssertionError,
};

/// Identifier of a clause in a proof log. Ids are handed out in strictly
/// increasing order starting from 0.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClauseId(u32);

impl ClauseId {
    pub fn new(id: u32) -> Self {
        ClauseId(id)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl Display for ClauseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

const EMPTY_ROOT: u32 = 1 << 1;

/// Append only log of root clauses, resolution chains and deletions.
///
/// Every record is a run of non zero integers closed by a 0:
/// - root: the first literal code shifted left by one, followed by the
///   positive deltas between consecutive sorted literal codes. The empty root
///   is `EMPTY_ROOT` alone, code 1 is never a literal.
/// - chain: `((id - start) << 1) | 1` followed by `(var, id - next)` pairs,
///   where `id` is the id the chain allocates.
/// - deletion: `((id - gone) << 1) | 1` without any pair, where `id` is the next
///   id to be allocated. Deletions do not allocate an id.
#[derive(Debug, Default, Clone)]
pub struct Proof {
    memory: Vec<u32>,
    next_id: u32,
    chain_ids: Vec<ClauseId>,
    chain_vars: Vec<Var>,
}

impl Proof {
    pub fn new() -> Self {
        Proof::default()
    }

    /// Record a clause of the formula and return its id. The literals are
    /// sorted and deduplicated first, which makes a 0 delta impossible.
    pub fn add_root(&mut self, literals: &[Literal]) -> ClauseId {
        let mut clause = literals.to_vec();
        clause.sort_unstable();
        clause.dedup();

        match clause.first() {
            Some(first) => self.memory.push(first.code() << 1),
            None => self.memory.push(EMPTY_ROOT),
        }
        for (prev, next) in clause.iter().zip(clause.iter().skip(1)) {
            self.memory.push(next.code() - prev.code());
        }
        self.memory.push(0);

        let id = self.allocate();
        tracing::trace!("root {} = {:?}", id, clause.iter().map(|l| l.raw()).collect::<Vec<_>>());
        id
    }

    pub fn begin_chain(&mut self, start: ClauseId) {
        self.chain_ids.clear();
        self.chain_vars.clear();
        self.chain_ids.push(start);
    }

    /// Resolve the clause built so far with `next` on `var`.
    pub fn resolve(&mut self, next: ClauseId, var: Var) {
        assert!(!self.chain_ids.is_empty(), "resolve outside of a chain");
        self.chain_ids.push(next);
        self.chain_vars.push(var);
    }

    /// Close the current chain. A chain without any resolution is its start
    /// clause, no record is written and the start id is returned.
    pub fn end_chain(&mut self) -> ClauseId {
        assert_eq!(self.chain_ids.len(), self.chain_vars.len() + 1);
        if self.chain_vars.is_empty() {
            return self.chain_ids[0];
        }

        let id = self.next_id;
        self.memory.push(((id - self.chain_ids[0].0) << 1) | 1);
        for (var, next) in self.chain_vars.iter().zip(&self.chain_ids[1..]) {
            self.memory.push(var.id());
            self.memory.push(id - next.0);
        }
        self.memory.push(0);

        let id = self.allocate();
        tracing::trace!("chain {} from {} over {} steps", id, self.chain_ids[0], self.chain_vars.len());
        id
    }

    /// Record that a clause will not be referenced any more.
    pub fn deleted(&mut self, gone: ClauseId) {
        assert!(gone.0 < self.next_id, "deleting unknown clause {}", gone);
        self.memory.push(((self.next_id - gone.0) << 1) | 1);
        self.memory.push(0);
    }

    /// The most recently allocated id.
    pub fn last(&self) -> Option<ClauseId> {
        self.next_id.checked_sub(1).map(ClauseId)
    }

    /// Number of ids allocated so far.
    pub fn num_clauses(&self) -> usize {
        self.next_id as usize
    }

    /// Decode the log from its beginning.
    pub fn events(&self) -> Events<'_> {
        Events::new(&self.memory)
    }

    /// Replay the log, stopping after the record which allocated `goal` (by
    /// default the last one), and report every event to the visitor.
    pub fn traverse(
        &self,
        visitor: &mut impl ProofVisitor,
        goal: Option<ClauseId>,
    ) -> Result<(), ProofAssertionError> {
        let goal = goal.or(self.last()).ok_or(ProofAssertionError::NoRefutation)?;
        for event in self.events() {
            let reached = match &event {
                ProofEvent::Root { id, literals } => {
                    visitor.root(*id, literals)?;
                    *id == goal
                }
                ProofEvent::Chain { id, start, steps } => {
                    visitor.chain(*id, *start, steps)?;
                    *id == goal
                }
                ProofEvent::Deleted(id) => {
                    visitor.deleted(*id)?;
                    false
                }
            };
            if reached {
                visitor.done();
                return Ok(());
            }
        }
        Err(ProofAssertionError::DanglingClause(goal))
    }

    /// Replay the log up to `goal` performing every resolution, and make sure
    /// the clause derived last is empty.
    pub fn check(&self, goal: Option<ClauseId>) -> Result<(), ProofAssertionError> {
        let mut checker = ResolutionChecker::default();
        self.check_with(&mut checker, goal)
    }

    /// Like [`Proof::check`] with a caller supplied checker, which lets callers
    /// wrap it to observe the replay.
    pub fn check_with<V: ProofVisitor + AsRef<ResolutionChecker>>(
        &self,
        visitor: &mut V,
        goal: Option<ClauseId>,
    ) -> Result<(), ProofAssertionError> {
        let goal = goal.or(self.last()).ok_or(ProofAssertionError::NoRefutation)?;
        tracing::info!("checking proof up to {}", goal);
        self.traverse(visitor, Some(goal))?;

        let clause = visitor.as_ref().clause(goal)?;
        if clause.is_empty() {
            tracing::info!("final clause: <empty>");
            Ok(())
        } else {
            Err(ProofAssertionError::NotEmpty(goal, clause.to_vec()))
        }
    }

    fn allocate(&mut self) -> ClauseId {
        let id = ClauseId(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(raw: &[i32]) -> Vec<Literal> {
        raw.iter().map(|&i| Literal::from(i)).collect()
    }

    #[test]
    fn root_is_delta_encoded() {
        let mut proof = Proof::new();
        let id = proof.add_root(&lits(&[3, -1, 3, 2]));
        assert_eq!(id, ClauseId(0));
        // codes: -1 = 3, 2 = 4, 3 = 6
        assert_eq!(proof.memory, vec![6, 1, 2, 0]);
    }

    #[test]
    fn root_round_trips_through_traversal() {
        let mut proof = Proof::new();
        let id = proof.add_root(&lits(&[5, -2, 5, 1, -2]));
        let events: Vec<_> = proof.events().collect();
        assert_eq!(
            events,
            vec![ProofEvent::Root {
                id,
                literals: lits(&[1, -2, 5]),
            }]
        );
    }

    #[test]
    fn empty_root_is_a_refutation() {
        let mut proof = Proof::new();
        proof.add_root(&lits(&[1, 2]));
        let empty = proof.add_root(&[]);
        assert_eq!(proof.memory[proof.memory.len() - 2..], [EMPTY_ROOT, 0]);
        assert_eq!(
            proof.events().last(),
            Some(ProofEvent::Root {
                id: empty,
                literals: vec![],
            })
        );
        assert_eq!(proof.check(Some(empty)), Ok(()));
    }

    #[test]
    fn chain_of_one_allocates_nothing() {
        let mut proof = Proof::new();
        let a = proof.add_root(&lits(&[1, 2]));
        let words = proof.memory.len();
        proof.begin_chain(a);
        assert_eq!(proof.end_chain(), a);
        assert_eq!(proof.memory.len(), words);
        assert_eq!(proof.last(), Some(a));
    }

    #[test]
    fn chains_and_deletions_decode_to_their_events() {
        let mut proof = Proof::new();
        let a = proof.add_root(&lits(&[1, 2]));
        let b = proof.add_root(&lits(&[-1, 2]));
        let c = proof.add_root(&lits(&[-2]));
        proof.begin_chain(a);
        proof.resolve(b, Var::new(1));
        proof.resolve(c, Var::new(2));
        let d = proof.end_chain();
        proof.deleted(b);
        assert_eq!(d, ClauseId(3));

        let events: Vec<_> = proof.events().skip(3).collect();
        assert_eq!(
            events,
            vec![
                ProofEvent::Chain {
                    id: d,
                    start: a,
                    steps: vec![(Var::new(1), b), (Var::new(2), c)],
                },
                ProofEvent::Deleted(b),
            ]
        );
        assert!(proof.check(None).is_ok());
    }

    #[test]
    fn traversal_stops_at_the_goal() {
        let mut proof = Proof::new();
        let a = proof.add_root(&lits(&[1]));
        proof.add_root(&lits(&[2]));

        let mut checker = ResolutionChecker::default();
        proof.traverse(&mut checker, Some(a)).unwrap();
        assert_eq!(checker.num_clauses(), 1);

        let mut checker = ResolutionChecker::default();
        assert_eq!(
            proof.traverse(&mut checker, Some(ClauseId(7))),
            Err(ProofAssertionError::DanglingClause(ClauseId(7)))
        );
    }

    #[test]
    fn non_empty_goal_fails_the_check() {
        let mut proof = Proof::new();
        let a = proof.add_root(&lits(&[1, 2]));
        let b = proof.add_root(&lits(&[-1, 2]));
        proof.begin_chain(a);
        proof.resolve(b, Var::new(1));
        let c = proof.end_chain();
        assert_eq!(
            proof.check(None),
            Err(ProofAssertionError::NotEmpty(c, lits(&[2])))
        );
        assert_eq!(Proof::new().check(None), Err(ProofAssertionError::NoRefutation));
    }
}
