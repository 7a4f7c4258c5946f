use crate::common::{
    storage::{ClauseRef, ClauseStorage},
    Vocabulary,
};

/// Unit propagation over the watch lists of the vocabulary.
#[derive(Debug, Default)]
pub struct Propagator {
    propagations: u64,
}

impl Propagator {
    /// Drain the propagation queue. For every literal made true, each
    /// constraint watching its negation is visited. If a constraint turns out to
    /// be falsified propagation stops and the constraint is returned, otherwise
    /// the assignment is a fixpoint once this returns.
    pub fn propagate(
        &mut self,
        voc: &mut Vocabulary,
        clause_db: &mut ClauseStorage,
    ) -> Result<(), ClauseRef> {
        while let Some(lit) = voc.next_to_propagate() {
            self.propagations += 1;
            let falsified = -lit;
            let watchers = voc.take_watches(falsified);

            for (i, &clause) in watchers.iter().enumerate() {
                let data = clause_db.data_mut(clause);
                if data.constraint.propagate(clause, voc, falsified).is_err() {
                    // give the unvisited constraints their watch back
                    for &rest in &watchers[i + 1..] {
                        voc.watch(falsified, rest);
                    }
                    voc.flush_queue();
                    return Err(clause);
                }
            }
        }
        Ok(())
    }

    pub fn propagations(&self) -> u64 {
        self.propagations
    }
}
