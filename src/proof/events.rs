use super::{ClauseId, EMPTY_ROOT};
use crate::common::{Literal, Var};

/// A record of the proof log, decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofEvent {
    Root {
        id: ClauseId,
        literals: Vec<Literal>,
    },
    /// `start` resolved in order with every `(var, clause)` step.
    Chain {
        id: ClauseId,
        start: ClauseId,
        steps: Vec<(Var, ClauseId)>,
    },
    Deleted(ClauseId),
}

/// Lazily decodes a proof log from its first record. Every call to
/// [`super::Proof::events`] starts over, nothing is shared with the log except a
/// borrow of its memory.
#[derive(Debug, Clone)]
pub struct Events<'a> {
    memory: &'a [u32],
    pos: usize,
    next_id: u32,
}

impl<'a> Events<'a> {
    pub(super) fn new(memory: &'a [u32]) -> Self {
        Events {
            memory,
            pos: 0,
            next_id: 0,
        }
    }

    fn word(&mut self) -> u32 {
        let word = *self
            .memory
            .get(self.pos)
            .expect("proof record is not terminated");
        self.pos += 1;
        word
    }

    fn root(&mut self, head: u32) -> ProofEvent {
        let mut code = head >> 1;
        let mut literals = if head == EMPTY_ROOT {
            vec![]
        } else {
            vec![Literal::from_code(code)]
        };
        loop {
            let delta = self.word();
            if delta == 0 {
                break;
            }
            code += delta;
            literals.push(Literal::from_code(code));
        }
        let id = ClauseId(self.next_id);
        self.next_id += 1;
        ProofEvent::Root { id, literals }
    }

    fn chain(&mut self, head: u32) -> ProofEvent {
        let id = self.next_id;
        let start = ClauseId(id - (head >> 1));
        let mut steps = vec![];
        loop {
            let var = self.word();
            if var == 0 {
                break;
            }
            let next = ClauseId(id - self.word());
            steps.push((Var::new(var), next));
        }

        if steps.is_empty() {
            ProofEvent::Deleted(start)
        } else {
            self.next_id += 1;
            ProofEvent::Chain {
                id: ClauseId(id),
                start,
                steps,
            }
        }
    }
}

impl Iterator for Events<'_> {
    type Item = ProofEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.memory.len() {
            return None;
        }
        let head = self.word();
        if head & 1 == 0 {
            Some(self.root(head))
        } else {
            Some(self.chain(head))
        }
    }
}
