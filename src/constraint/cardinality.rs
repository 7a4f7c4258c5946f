use crate::common::{storage::ClauseRef, Conflict, Literal, Vocabulary};

/// At least `degree` of the literals must hold.
///
/// The first `degree + 1` literals are watched. Once a watch is falsified and no
/// unwatched literal can replace it, every other watch is implied.
#[derive(Debug, Clone)]
pub struct AtLeast {
    literals: Vec<Literal>,
    degree: usize,
}

impl AtLeast {
    pub fn new(literals: Vec<Literal>, degree: usize) -> Self {
        debug_assert!(degree >= 1 && degree < literals.len());
        AtLeast { literals, degree }
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn watched(&self) -> &[Literal] {
        &self.literals[..=self.degree]
    }

    pub fn propagate(
        &mut self,
        clause: ClauseRef,
        voc: &mut Vocabulary,
        falsified: Literal,
    ) -> Result<(), Conflict> {
        let watched = self.degree + 1;
        let pos = self.literals[..watched]
            .iter()
            .position(|&l| l == falsified)
            .unwrap_or_else(|| panic!("constraint does not watch {}", falsified));

        if let Some(i) = (watched..self.literals.len()).find(|&i| !voc.is_falsified(self.literals[i])) {
            self.literals.swap(pos, i);
            voc.watch(self.literals[pos], clause);
            return Ok(());
        }

        voc.watch(falsified, clause);
        let others = || self.literals[..watched].iter().copied().filter(|&l| l != falsified);
        if others().any(|l| voc.is_falsified(l)) {
            return Err(Conflict {});
        }
        for lit in others() {
            voc.assign(lit, Some(clause))?;
        }
        Ok(())
    }

    /// Only literals falsified before `implied` explain it, literals falsified
    /// afterwards are not part of the implication.
    pub fn calc_reason(&self, implied: Option<Literal>, voc: &Vocabulary, out: &mut Vec<Literal>) {
        let before = implied.map(|lit| voc.trail_position(lit.var()));
        for &lit in &self.literals {
            if !voc.is_falsified(lit) {
                continue;
            }
            match before {
                Some(pos) if voc.trail_position(lit.var()) > pos => (),
                _ => out.push(-lit),
            }
        }
    }

    /// Satisfied once `degree` literals are true at level 0.
    pub fn simplify(&self, voc: &Vocabulary) -> bool {
        self.literals
            .iter()
            .filter(|&&l| voc.is_satisfied(l) && voc.level(l.var()) == 0)
            .count()
            >= self.degree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(raw: &[i32]) -> Vec<Literal> {
        raw.iter().map(|&i| Literal::from(i)).collect()
    }

    #[test]
    fn implies_all_remaining_watches() {
        let mut voc = Vocabulary::new();
        voc.new_vars(4);
        let clause = ClauseRef::from_index(0);
        // at least 2 of 1, 2, 3, 4
        let mut c = AtLeast::new(lits(&[1, 2, 3, 4]), 2);

        voc.decide(Literal::from(-1));
        c.propagate(clause, &mut voc, Literal::from(1)).unwrap();
        assert_eq!(c.watched(), &lits(&[4, 2, 3])[..]);
        assert!(voc.is_unassigned(Literal::from(2)));

        voc.decide(Literal::from(-4));
        c.propagate(clause, &mut voc, Literal::from(4)).unwrap();
        assert!(voc.is_satisfied(Literal::from(2)));
        assert!(voc.is_satisfied(Literal::from(3)));
        assert_eq!(voc.reason(Literal::from(3).var()), Some(clause));

        let mut reason = vec![];
        c.calc_reason(Some(Literal::from(3)), &voc, &mut reason);
        reason.sort();
        assert_eq!(reason, lits(&[-1, -4]));
    }

    #[test]
    fn two_falsified_watches_conflict() {
        let mut voc = Vocabulary::new();
        voc.new_vars(3);
        let mut c = AtLeast::new(lits(&[1, 2, 3]), 2);
        voc.assign(Literal::from(-1), None).unwrap();
        voc.assign(Literal::from(-2), None).unwrap();
        assert!(c
            .propagate(ClauseRef::from_index(0), &mut voc, Literal::from(1))
            .is_err());
    }

    #[test]
    fn later_falsified_literals_are_not_reasons() {
        let mut voc = Vocabulary::new();
        voc.new_vars(3);
        let clause = ClauseRef::from_index(0);
        let mut c = AtLeast::new(lits(&[1, 2, 3]), 2);
        voc.decide(Literal::from(-1));
        c.propagate(clause, &mut voc, Literal::from(1)).unwrap();
        assert!(voc.is_satisfied(Literal::from(2)));

        let mut reason = vec![];
        c.calc_reason(Some(Literal::from(2)), &voc, &mut reason);
        assert_eq!(reason, lits(&[-1]));
    }
}
