use crate::common::{storage::ClauseRef, Conflict, Literal, Vocabulary};

/// A clause of exactly two literals. Both literals are always watched, so
/// there is nothing to search for when one of them becomes false.
#[derive(Debug, Clone)]
pub struct BinaryClause {
    literals: [Literal; 2],
}

impl BinaryClause {
    pub fn new(first: Literal, second: Literal) -> Self {
        debug_assert!(!first.matches(second));
        BinaryClause {
            literals: [first, second],
        }
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    fn other(&self, literal: Literal) -> Literal {
        if self.literals[0] == literal {
            self.literals[1]
        } else {
            debug_assert_eq!(self.literals[1], literal, "clause does not watch {}", literal);
            self.literals[0]
        }
    }

    pub fn propagate(
        &mut self,
        clause: ClauseRef,
        voc: &mut Vocabulary,
        falsified: Literal,
    ) -> Result<(), Conflict> {
        voc.watch(falsified, clause);
        voc.assign(self.other(falsified), Some(clause))
    }

    pub fn calc_reason(&self, implied: Option<Literal>, voc: &Vocabulary, out: &mut Vec<Literal>) {
        match implied {
            Some(lit) => out.push(-self.other(lit)),
            None => {
                debug_assert!(self.literals.iter().all(|&l| voc.is_falsified(l)));
                out.extend(self.literals.iter().map(|&l| -l));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falsified_literal_implies_the_other() {
        let mut voc = Vocabulary::new();
        voc.new_vars(2);
        let clause = ClauseRef::from_index(3);
        let mut c = BinaryClause::new(Literal::from(1), Literal::from(-2));
        voc.assign(Literal::from(2), None).unwrap();

        assert!(c.propagate(clause, &mut voc, Literal::from(-2)).is_ok());
        assert!(voc.is_satisfied(Literal::from(1)));
        assert_eq!(voc.reason(Literal::from(1).var()), Some(clause));
        assert_eq!(voc.watches(Literal::from(-2)), &[clause]);

        let mut reason = vec![];
        c.calc_reason(Some(Literal::from(1)), &voc, &mut reason);
        assert_eq!(reason, vec![Literal::from(2)]);
    }

    #[test]
    fn both_false_is_a_conflict() {
        let mut voc = Vocabulary::new();
        voc.new_vars(2);
        let mut c = BinaryClause::new(Literal::from(1), Literal::from(2));
        voc.assign(Literal::from(-1), None).unwrap();
        voc.assign(Literal::from(-2), None).unwrap();
        assert!(c
            .propagate(ClauseRef::from_index(0), &mut voc, Literal::from(2))
            .is_err());

        let mut reason = vec![];
        c.calc_reason(None, &voc, &mut reason);
        assert_eq!(reason, vec![Literal::from(-1), Literal::from(-2)]);
    }
}
