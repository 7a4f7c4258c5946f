use std::{
    fmt::Display,
    ops::{Index, IndexMut, Neg},
};

/// A boolean variable, identified by its positive dimacs id.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Var {
    id: u32,
}

impl Var {
    /// Create a variable from its 1-based id.
    pub fn new(id: u32) -> Self {
        assert!(id > 0, "variables are numbered from 1");
        Var { id }
    }

    pub fn id(self) -> u32 {
        self.id
    }

    pub fn index(self) -> usize {
        self.id as usize
    }

    /// The literal asserting this variable to be true.
    pub fn positive(self) -> Literal {
        Literal { code: self.id << 1 }
    }

    /// The literal asserting this variable to be false.
    pub fn negative(self) -> Literal {
        Literal {
            code: (self.id << 1) | 1,
        }
    }
}

impl Display for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.id)
    }
}

/// A literal represented by an integer. The lowest bit holds the polarity and
/// the remaining bits the variable, so the two literals of a variable are
/// adjacent when sorted and negation is a single bit flip. Codes 0 and 1 are
/// never valid since variables start at 1.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Literal {
    code: u32,
}

impl Literal {
    pub fn from_code(code: u32) -> Self {
        debug_assert!(code >= 2, "literal code {} has no variable", code);
        Literal { code }
    }

    pub fn code(self) -> u32 {
        self.code
    }

    pub fn var(self) -> Var {
        Var { id: self.code >> 1 }
    }

    pub fn is_negative(self) -> bool {
        self.code & 1 == 1
    }

    /// Compares two literals and returns true if they use the same variable
    pub fn matches(self, other: Self) -> bool {
        self.code >> 1 == other.code >> 1
    }

    /// The signed dimacs integer of this literal.
    pub fn raw(self) -> i32 {
        let id = (self.code >> 1) as i32;
        if self.is_negative() {
            -id
        } else {
            id
        }
    }
}

impl Neg for Literal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Literal {
            code: self.code ^ 1,
        }
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        assert!(value != 0, "cannot create literal with id 0");
        let var = Var::new(value.unsigned_abs());
        if value < 0 {
            var.negative()
        } else {
            var.positive()
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw())
    }
}

/// Dense storage of one value per literal.
#[derive(Debug, Clone, Default)]
pub struct LiteralMap<T> {
    inner: Vec<T>,
}

impl<T: Clone + Default> LiteralMap<T> {
    /// Make room for every literal of the variables `1..=vars`.
    pub fn grow(&mut self, vars: usize) {
        let len = (vars + 1) * 2;
        if self.inner.len() < len {
            self.inner.resize(len, T::default());
        }
    }
}

impl<T> Index<Literal> for LiteralMap<T> {
    type Output = T;
    fn index(&self, index: Literal) -> &Self::Output {
        &self.inner[index.code as usize]
    }
}

impl<T> IndexMut<Literal> for LiteralMap<T> {
    fn index_mut(&mut self, index: Literal) -> &mut Self::Output {
        &mut self.inner[index.code as usize]
    }
}

/// Dense storage of one value per variable.
#[derive(Debug, Clone, Default)]
pub struct VarMap<T> {
    inner: Vec<T>,
}

impl<T: Clone + Default> VarMap<T> {
    pub fn grow(&mut self, vars: usize) {
        if self.inner.len() < vars + 1 {
            self.inner.resize(vars + 1, T::default());
        }
    }
}

impl<T> VarMap<T> {
    /// Iterate over the values of the variables `1..`, skipping the unused slot 0.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.inner.iter_mut().skip(1)
    }
}

impl<T> Index<Var> for VarMap<T> {
    type Output = T;
    fn index(&self, index: Var) -> &Self::Output {
        &self.inner[index.index()]
    }
}

impl<T> IndexMut<Var> for VarMap<T> {
    fn index_mut(&mut self, index: Var) -> &mut Self::Output {
        &mut self.inner[index.index()]
    }
}
