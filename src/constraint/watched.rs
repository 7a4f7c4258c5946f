use crate::common::{storage::ClauseRef, Conflict, Literal, Vocabulary};

/// A clause of three or more literals. The head and tail watches live in the
/// first two positions, the remaining literals are kept in no particular order
/// and are swapped into a watch position when a watch becomes false.
///
/// As long as the clause is not satisfied and not falsified both watches are
/// true or unassigned.
#[derive(Debug, Clone)]
pub struct WatchedClause {
    literals: Vec<Literal>,
}

const HEAD: usize = 0;
const TAIL: usize = 1;

impl WatchedClause {
    pub fn new(literals: Vec<Literal>) -> Self {
        debug_assert!(literals.len() > 2);
        WatchedClause { literals }
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn watched(&self) -> &[Literal] {
        &self.literals[..2]
    }

    pub fn propagate(
        &mut self,
        clause: ClauseRef,
        voc: &mut Vocabulary,
        falsified: Literal,
    ) -> Result<(), Conflict> {
        // keep the falsified watch in the tail position
        if self.literals[HEAD] == falsified {
            self.literals.swap(HEAD, TAIL);
        }
        debug_assert_eq!(self.literals[TAIL], falsified, "clause does not watch {}", falsified);

        let head = self.literals[HEAD];
        if voc.is_satisfied(head) {
            voc.watch(falsified, clause);
            return Ok(());
        }

        let replacement = (2..self.literals.len()).find(|&i| !voc.is_falsified(self.literals[i]));
        if let Some(i) = replacement {
            self.literals.swap(TAIL, i);
            voc.watch(self.literals[TAIL], clause);
            return Ok(());
        }

        // no other literal can be watched, the head is a new unit
        voc.watch(falsified, clause);
        voc.assign(head, Some(clause))
    }

    pub fn calc_reason(&self, implied: Option<Literal>, voc: &Vocabulary, out: &mut Vec<Literal>) {
        for &lit in &self.literals {
            if Some(lit) != implied {
                debug_assert!(voc.is_falsified(lit));
                out.push(-lit);
            }
        }
    }
}
