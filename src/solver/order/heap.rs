use crate::common::{Var, VarMap};

/// Binary max-heap of variables keyed on their activity. Variables taken out of
/// the heap keep their activity, so bumping works whether or not they are in
/// it.
#[derive(Debug, Default)]
pub struct ActivityHeap {
    activity: VarMap<f64>,
    heap: Vec<Var>,
    /// Index into `heap`, if the variable is in it.
    position: VarMap<Option<u32>>,
}

impl ActivityHeap {
    pub fn grow(&mut self, vars: usize) {
        self.activity.grow(vars);
        self.position.grow(vars);
    }

    pub fn activity(&self, var: Var) -> f64 {
        self.activity[var]
    }

    pub fn contains(&self, var: Var) -> bool {
        self.position[var].is_some()
    }

    pub fn insert(&mut self, var: Var) {
        if self.contains(var) {
            return;
        }
        self.position[var] = Some(self.heap.len() as u32);
        self.heap.push(var);
        self.sift_up(self.heap.len() - 1);
    }

    pub fn pop(&mut self) -> Option<Var> {
        let top = *self.heap.first()?;
        let last = self.heap.len() - 1;
        self.swap(0, last);
        self.heap.pop();
        self.position[top] = None;
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(top)
    }

    pub fn increase(&mut self, var: Var, amount: f64) {
        self.activity[var] += amount;
        if let Some(pos) = self.position[var] {
            self.sift_up(pos as usize);
        }
    }

    /// Divide every activity by `divisor`. The order does not change.
    pub fn rescale(&mut self, divisor: f64) {
        for activity in self.activity.iter_mut() {
            *activity /= divisor;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.position[self.heap[a]] = Some(a as u32);
        self.position[self.heap[b]] = Some(b as u32);
    }

    fn higher(&self, a: usize, b: usize) -> bool {
        self.activity[self.heap[a]] > self.activity[self.heap[b]]
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.higher(pos, parent) {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut largest = pos;
            if left < self.heap.len() && self.higher(left, largest) {
                largest = left;
            }
            if right < self.heap.len() && self.higher(right, largest) {
                largest = right;
            }
            if largest == pos {
                break;
            }
            self.swap(pos, largest);
            pos = largest;
        }
    }
}
