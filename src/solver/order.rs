mod heap;

use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::common::{Literal, Var, VarMap, Vocabulary};

use heap::ActivityHeap;

/// Picks the next decision. The search notifies the order about every new
/// variable, every variable met during conflict analysis and every literal
/// unassigned on backtrack.
pub trait VariableOrder: std::fmt::Debug {
    fn new_var(&mut self, var: Var);

    /// An unassigned literal to decide on, or None if every variable is
    /// assigned.
    fn select(&mut self, voc: &Vocabulary) -> Option<Literal>;

    fn bump(&mut self, var: Var);

    /// Called once per conflict.
    fn decay(&mut self);

    fn undo(&mut self, literal: Literal);
}

const RESCALE_LIMIT: f64 = 1e100;

/// VSIDS: variables met in conflicts are bumped by an increment that grows
/// geometrically, so recent conflicts weigh more. The polarity of a variable is
/// the one it had when last unassigned, negative at first.
#[derive(Debug)]
pub struct ActivityOrder {
    heap: ActivityHeap,
    increment: f64,
    decay: f64,
    positive: VarMap<bool>,
}

impl ActivityOrder {
    pub fn new(decay: f64) -> Self {
        assert!(decay > 0.0 && decay <= 1.0, "decay factor {} out of range", decay);
        ActivityOrder {
            heap: ActivityHeap::default(),
            increment: 1.0,
            decay,
            positive: VarMap::default(),
        }
    }

    pub fn activity(&self, var: Var) -> f64 {
        self.heap.activity(var)
    }
}

impl VariableOrder for ActivityOrder {
    fn new_var(&mut self, var: Var) {
        self.heap.grow(var.index());
        self.positive.grow(var.index());
        self.heap.insert(var);
    }

    fn select(&mut self, voc: &Vocabulary) -> Option<Literal> {
        // assigned variables are only dropped from the heap once they surface
        while let Some(var) = self.heap.pop() {
            if voc.is_unassigned(var.positive()) {
                let literal = if self.positive[var] {
                    var.positive()
                } else {
                    var.negative()
                };
                return Some(literal);
            }
        }
        None
    }

    fn bump(&mut self, var: Var) {
        if self.heap.activity(var) + self.increment >= RESCALE_LIMIT {
            self.heap.rescale(RESCALE_LIMIT);
            self.increment /= RESCALE_LIMIT;
            tracing::trace!("rescaled variable activities");
        }
        self.heap.increase(var, self.increment);
    }

    fn decay(&mut self) {
        self.increment /= self.decay;
    }

    fn undo(&mut self, literal: Literal) {
        let var = literal.var();
        self.positive[var] = !literal.is_negative();
        self.heap.insert(var);
    }
}

/// Decides on a uniformly random unassigned variable with a random polarity.
/// Conflicts do not influence it.
#[derive(Debug)]
pub struct RandomOrder {
    vars: Vec<Var>,
    rng: SmallRng,
}

impl RandomOrder {
    pub fn new(seed: u64) -> Self {
        RandomOrder {
            vars: vec![],
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl VariableOrder for RandomOrder {
    fn new_var(&mut self, var: Var) {
        self.vars.push(var);
    }

    fn select(&mut self, voc: &Vocabulary) -> Option<Literal> {
        if self.vars.is_empty() {
            return None;
        }
        let start = self.rng.gen_range(0..self.vars.len());
        let var = self.vars[start..]
            .iter()
            .chain(&self.vars[..start])
            .copied()
            .find(|var| voc.is_unassigned(var.positive()))?;
        if self.rng.gen_bool(0.5) {
            Some(var.positive())
        } else {
            Some(var.negative())
        }
    }

    fn bump(&mut self, _var: Var) {}

    fn decay(&mut self) {}

    fn undo(&mut self, _literal: Literal) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(order: &mut dyn VariableOrder, vars: usize) -> Vocabulary {
        let mut voc = Vocabulary::new();
        voc.new_vars(vars);
        for var in voc.vars() {
            order.new_var(var);
        }
        voc
    }

    #[test]
    fn most_active_variable_is_decided_first() {
        let mut order = ActivityOrder::new(0.95);
        let voc = setup(&mut order, 4);
        order.bump(Var::new(3));
        order.decay();
        order.bump(Var::new(2));
        // the later bump is worth more
        assert!(order.activity(Var::new(2)) > order.activity(Var::new(3)));
        assert_eq!(order.select(&voc), Some(Literal::from(-2)));
        assert_eq!(order.select(&voc), Some(Literal::from(-3)));
    }

    #[test]
    fn phase_is_saved_on_undo() {
        let mut order = ActivityOrder::new(0.95);
        let mut voc = setup(&mut order, 2);
        order.bump(Var::new(1));
        let first = order.select(&voc).unwrap();
        voc.decide(-first);
        voc.undo_to(0, |lit| order.undo(lit));
        assert_eq!(order.select(&voc), Some(Literal::from(1)));
    }

    #[test]
    fn assigned_variables_are_skipped() {
        let mut order = ActivityOrder::new(0.95);
        let mut voc = setup(&mut order, 3);
        voc.assign(Literal::from(1), None).unwrap();
        voc.assign(Literal::from(-3), None).unwrap();
        assert_eq!(order.select(&voc), Some(Literal::from(-2)));
        voc.assign(Literal::from(2), None).unwrap();
        assert_eq!(order.select(&voc), None);
    }

    #[test]
    fn activities_are_rescaled_before_overflowing() {
        let mut order = ActivityOrder::new(0.5);
        let _ = setup(&mut order, 2);
        for _ in 0..400 {
            order.bump(Var::new(1));
            order.decay();
        }
        assert!(order.activity(Var::new(1)).is_finite());
        assert!(order.activity(Var::new(1)) < RESCALE_LIMIT);
    }

    #[test]
    fn random_order_finds_the_last_unassigned_variable() {
        let mut order = RandomOrder::new(42);
        let mut voc = setup(&mut order, 8);
        for i in [1, -2, 3, 4, -6, 7, 8] {
            voc.assign(Literal::from(i), None).unwrap();
        }
        for _ in 0..20 {
            let lit = order.select(&voc).unwrap();
            assert_eq!(lit.var(), Var::new(5));
        }
        voc.assign(Literal::from(5), None).unwrap();
        assert_eq!(order.select(&voc), None);
    }
}
