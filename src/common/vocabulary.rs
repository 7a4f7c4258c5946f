use super::{
    storage::ClauseRef,
    Conflict, Literal, LiteralMap, Var, VarMap,
};

/// Per literal and per variable solver state: the current assignment, the
/// level and reason of every assigned variable, the trail in assignment order
/// and the watch lists.
#[derive(Debug, Default)]
pub struct Vocabulary {
    vars: usize,
    /// True for every literal that currently holds.
    truth: LiteralMap<bool>,
    level: VarMap<u32>,
    reason: VarMap<Option<ClauseRef>>,
    /// Index of every assigned variable on the trail.
    position: VarMap<u32>,
    /// Constraints to revisit once the literal becomes false.
    watches: LiteralMap<Vec<ClauseRef>>,
    trail: Vec<Literal>,
    /// Trail length at the start of every decision level.
    trail_lim: Vec<usize>,
    /// Head of the propagation queue, an index into the trail.
    queue_head: usize,
}

impl Vocabulary {
    pub fn new() -> Self {
        Vocabulary::default()
    }

    /// Grow the vocabulary by `count` variables and return the first new one.
    pub fn new_vars(&mut self, count: usize) -> Option<Var> {
        let first = self.vars + 1;
        self.vars += count;
        self.truth.grow(self.vars);
        self.level.grow(self.vars);
        self.reason.grow(self.vars);
        self.position.grow(self.vars);
        self.watches.grow(self.vars);
        (count > 0).then(|| Var::new(first as u32))
    }

    pub fn num_vars(&self) -> usize {
        self.vars
    }

    pub fn vars(&self) -> impl Iterator<Item = Var> {
        (1..=self.vars as u32).map(Var::new)
    }

    pub fn is_satisfied(&self, literal: Literal) -> bool {
        self.truth[literal]
    }

    pub fn is_falsified(&self, literal: Literal) -> bool {
        self.truth[-literal]
    }

    pub fn is_assigned(&self, literal: Literal) -> bool {
        self.truth[literal] || self.truth[-literal]
    }

    pub fn is_unassigned(&self, literal: Literal) -> bool {
        !self.is_assigned(literal)
    }

    pub fn decision_level(&self) -> u32 {
        self.trail_lim.len() as u32
    }

    pub fn level(&self, var: Var) -> u32 {
        self.level[var]
    }

    pub fn reason(&self, var: Var) -> Option<ClauseRef> {
        self.reason[var]
    }

    /// Position of an assigned variable on the trail.
    pub fn trail_position(&self, var: Var) -> usize {
        debug_assert!(self.is_assigned(var.positive()));
        self.position[var] as usize
    }

    /// Forget the reason of a level 0 assignment whose constraint is removed.
    pub fn clear_reason(&mut self, var: Var) {
        debug_assert_eq!(self.level[var], 0);
        self.reason[var] = None;
    }

    /// Try assigning the literal at the current decision level. If it is already
    /// true nothing happens. If it is falsified an error with a conflict is
    /// returned.
    pub fn assign(&mut self, literal: Literal, reason: Option<ClauseRef>) -> Result<(), Conflict> {
        if self.is_falsified(literal) {
            Err(Conflict {})
        } else if self.is_satisfied(literal) {
            Ok(())
        } else {
            let var = literal.var();
            self.truth[literal] = true;
            self.level[var] = self.decision_level();
            self.reason[var] = reason;
            self.position[var] = self.trail.len() as u32;
            self.trail.push(literal);
            tracing::trace!("assign {} at level {}", literal, self.decision_level());
            Ok(())
        }
    }

    /// Open a new decision level and assign the decision literal in it.
    pub fn decide(&mut self, literal: Literal) {
        debug_assert!(self.is_unassigned(literal));
        self.new_decision_level();
        let _ = self.assign(literal, None);
    }

    /// Open a decision level without assigning anything, used for assumptions
    /// which already hold.
    pub fn new_decision_level(&mut self) {
        self.trail_lim.push(self.trail.len());
    }

    /// Unassign every literal above the given level in reverse trail order.
    /// Each unassigned literal is handed to `on_undo`.
    pub fn undo_to(&mut self, level: u32, mut on_undo: impl FnMut(Literal)) {
        if self.decision_level() <= level {
            return;
        }
        let cut = self.trail_lim[level as usize];
        while self.trail.len() > cut {
            let literal = self.trail.pop().expect("trail shorter than its level limit");
            let var = literal.var();
            self.truth[literal] = false;
            self.reason[var] = None;
            self.level[var] = 0;
            on_undo(literal);
        }
        self.trail_lim.truncate(level as usize);
        self.queue_head = self.queue_head.min(cut);
    }

    /// Pop the next assigned literal whose consequences have not been propagated.
    pub fn next_to_propagate(&mut self) -> Option<Literal> {
        let literal = self.trail.get(self.queue_head).copied()?;
        self.queue_head += 1;
        Some(literal)
    }

    /// Drop the remaining propagation queue after a conflict.
    pub fn flush_queue(&mut self) {
        self.queue_head = self.trail.len();
    }

    pub fn trail(&self) -> &[Literal] {
        &self.trail
    }

    /// The trail prefix assigned before any decision.
    pub fn root_trail(&self) -> &[Literal] {
        let end = self.trail_lim.first().copied().unwrap_or(self.trail.len());
        &self.trail[..end]
    }

    pub fn all_assigned(&self) -> bool {
        self.trail.len() == self.vars
    }

    pub fn watch(&mut self, literal: Literal, clause: ClauseRef) {
        self.watches[literal].push(clause);
    }

    pub fn unwatch(&mut self, literal: Literal, clause: ClauseRef) {
        let list = &mut self.watches[literal];
        if let Some(pos) = list.iter().position(|&c| c == clause) {
            list.swap_remove(pos);
        }
    }

    pub fn watches(&self, literal: Literal) -> &[ClauseRef] {
        &self.watches[literal]
    }

    /// Take the watch list of a literal. Constraints re-register themselves
    /// while they are propagated.
    pub fn take_watches(&mut self, literal: Literal) -> Vec<ClauseRef> {
        std::mem::take(&mut self.watches[literal])
    }

    /// The current assignment as signed dimacs integers, unassigned variables
    /// are reported as false.
    pub fn model(&self) -> Vec<i32> {
        self.vars()
            .map(|var| {
                if self.is_satisfied(var.positive()) {
                    var.positive().raw()
                } else {
                    var.negative().raw()
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(i: i32) -> Literal {
        Literal::from(i)
    }

    #[test]
    fn literal_and_negation_never_both_hold() {
        let mut voc = Vocabulary::new();
        voc.new_vars(2);
        assert!(voc.assign(lit(1), None).is_ok());
        assert!(voc.assign(lit(1), None).is_ok());
        assert!(voc.assign(lit(-1), None).is_err());
        assert!(voc.is_satisfied(lit(1)));
        assert!(voc.is_falsified(lit(-1)));
        assert!(voc.is_unassigned(lit(2)));
        assert_eq!(voc.trail().len(), 1);
    }

    #[test]
    fn undo_to_zero_restores_every_decision() {
        let mut voc = Vocabulary::new();
        voc.new_vars(4);
        voc.assign(lit(4), None).unwrap();
        voc.decide(lit(1));
        voc.assign(lit(-2), Some(ClauseRef::from_index(0))).unwrap();
        voc.decide(lit(3));
        assert_eq!(voc.decision_level(), 2);
        assert_eq!(voc.level(Var::new(2)), 1);

        let mut undone = vec![];
        voc.undo_to(0, |l| undone.push(l.raw()));

        assert_eq!(undone, vec![3, -2, 1]);
        assert_eq!(voc.decision_level(), 0);
        for v in 1..=3 {
            assert!(voc.is_unassigned(lit(v)));
            assert_eq!(voc.reason(Var::new(v as u32)), None);
        }
        // level 0 is left untouched
        assert!(voc.is_satisfied(lit(4)));
        assert_eq!(voc.root_trail(), &[lit(4)]);
    }

    #[test]
    fn queue_is_rewound_on_undo() {
        let mut voc = Vocabulary::new();
        voc.new_vars(3);
        voc.assign(lit(1), None).unwrap();
        voc.decide(lit(2));
        assert_eq!(voc.next_to_propagate(), Some(lit(1)));
        assert_eq!(voc.next_to_propagate(), Some(lit(2)));
        assert_eq!(voc.next_to_propagate(), None);
        voc.undo_to(0, |_| ());
        voc.decide(lit(-3));
        assert_eq!(voc.next_to_propagate(), Some(lit(-3)));
    }

    #[test]
    fn watch_lists_are_sets_of_handles() {
        let mut voc = Vocabulary::new();
        voc.new_vars(2);
        let (a, b) = (ClauseRef::from_index(0), ClauseRef::from_index(1));
        voc.watch(lit(1), a);
        voc.watch(lit(1), b);
        voc.unwatch(lit(1), a);
        assert_eq!(voc.watches(lit(1)), &[b]);
        assert_eq!(voc.take_watches(lit(1)), vec![b]);
        assert!(voc.watches(lit(1)).is_empty());
    }
}
