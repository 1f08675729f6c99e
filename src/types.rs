//! Type-safe handles for tableau variables and rows.
//!
//! Both are dense indices into the engine's tables. Keeping them as distinct
//! newtypes prevents mixing up a variable index with a row index in the
//! pivoting code, where both are juggled at once.
use std::fmt;

/// A variable handle (0-indexed).
///
/// Variables are registered with [`Fixplex::ensure_var`][crate::fixplex::Fixplex::ensure_var]
/// and never destroyed, so a handle stays valid until the tableau is reset.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    /// Creates a variable handle with the given index.
    pub const fn new(id: u32) -> Self {
        Var(id)
    }

    /// Returns the raw index.
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Returns the index as a `usize` for table lookups.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u32> for Var {
    fn from(id: u32) -> Self {
        Var(id)
    }
}

impl From<Var> for u32 {
    fn from(var: Var) -> Self {
        var.0
    }
}

/// A row handle (0-indexed), returned by [`Fixplex::add_row`][crate::fixplex::Fixplex::add_row].
///
/// # Invariants
///
/// - Every row owns exactly one basic variable.
/// - Rows are never removed individually; pivoting only changes which
///   variable a row owns.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RowId(u32);

impl RowId {
    pub const fn new(id: u32) -> Self {
        RowId(id)
    }

    pub const fn id(self) -> u32 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl From<RowId> for usize {
    fn from(row: RowId) -> Self {
        row.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_creation() {
        let v0 = Var::new(0);
        let v1 = Var::new(1);
        assert_eq!(v0.id(), 0);
        assert_eq!(v1.index(), 1);
        assert!(v0 < v1);
        assert_eq!(Var::from(7), Var::new(7));
        assert_eq!(u32::from(Var::new(7)), 7);
    }

    #[test]
    fn test_display() {
        assert_eq!(Var::new(3).to_string(), "v3");
        assert_eq!(RowId::new(2).to_string(), "r2");
    }
}
