/// Decides how many conflicts the search may run into before restarting.
pub trait RestartStrategy: std::fmt::Debug {
    /// The number of conflicts until the next restart, None to never restart.
    fn next_interval(&mut self) -> Option<u64>;
}

// The Luby sequence is a recursive sequence of the form:
// 1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8, 1, 1, 2....
// multiplied by a base interval. The next element is computed in constant time
// using Knuth's 'reluctant doubling' formula.
#[derive(Debug, Clone, Copy)]
pub struct LubyRestarts {
    u: i64,
    v: i64,
    base: u64,
}

impl LubyRestarts {
    pub fn new(base: u64) -> Self {
        LubyRestarts { u: 1, v: 1, base }
    }
}

impl RestartStrategy for LubyRestarts {
    fn next_interval(&mut self) -> Option<u64> {
        let next = self.v as u64;
        if (self.u & -self.u) == self.v {
            self.u += 1;
            self.v = 1;
        } else {
            self.v *= 2;
        }
        Some(next * self.base)
    }
}

/// Intervals growing by a constant factor, starting from `first`.
#[derive(Debug, Clone, Copy)]
pub struct GeometricRestarts {
    next: f64,
    factor: f64,
}

impl GeometricRestarts {
    pub fn new(first: u64, factor: f64) -> Self {
        assert!(factor >= 1.0, "restart intervals may not shrink");
        GeometricRestarts {
            next: first as f64,
            factor,
        }
    }
}

impl RestartStrategy for GeometricRestarts {
    fn next_interval(&mut self) -> Option<u64> {
        let interval = self.next as u64;
        self.next *= self.factor;
        Some(interval.max(1))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoRestarts;

impl RestartStrategy for NoRestarts {
    fn next_interval(&mut self) -> Option<u64> {
        None
    }
}
