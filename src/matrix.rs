//! Sparse row/column storage for the tableau.
//!
//! Rows are vectors of `(variable, coefficient)` entries over the ring; columns
//! are the lists of rows each variable occurs in. The two views are kept in sync
//! by every mutating operation, so a variable's column lists exactly the rows
//! with a nonzero coefficient on it.
//!
//! All structural changes of the tableau (row creation, scaling, combination)
//! go through the single [`SparseMatrix`] owned by the engine.

use crate::numeral::Ring;
use crate::types::{RowId, Var};

/// A nonzero entry of a row.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RowEntry {
    pub var: Var,
    pub coeff: u64,
}

/// An occurrence of a variable in some row.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ColEntry {
    pub row: RowId,
    pub coeff: u64,
}

#[derive(Debug, Clone)]
pub struct SparseMatrix {
    ring: Ring,
    rows: Vec<Vec<RowEntry>>,
    columns: Vec<Vec<RowId>>,
}

impl SparseMatrix {
    pub fn new(ring: Ring) -> Self {
        Self {
            ring,
            rows: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    /// Drops all rows and columns.
    pub fn reset(&mut self) {
        self.rows.clear();
        self.columns.clear();
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_vars(&self) -> usize {
        self.columns.len()
    }

    /// Grows the column table to include `var`.
    pub fn ensure_var(&mut self, var: Var) {
        if self.columns.len() <= var.index() {
            self.columns.resize_with(var.index() + 1, Vec::new);
        }
    }

    /// Creates a new empty row.
    pub fn mk_row(&mut self) -> RowId {
        let row = RowId::new(self.rows.len() as u32);
        self.rows.push(Vec::new());
        row
    }

    pub fn row_entries(&self, row: RowId) -> &[RowEntry] {
        &self.rows[row.index()]
    }

    /// Rows containing `var`, with the coefficient of `var` in each.
    pub fn col_entries(&self, var: Var) -> impl Iterator<Item = ColEntry> + '_ {
        self.columns[var.index()].iter().map(move |&row| ColEntry {
            row,
            coeff: self.coeff(row, var).unwrap_or(0),
        })
    }

    /// Number of rows containing `var`.
    pub fn column_size(&self, var: Var) -> usize {
        self.columns[var.index()].len()
    }

    /// Coefficient of `var` in `row`, `None` if absent.
    pub fn coeff(&self, row: RowId, var: Var) -> Option<u64> {
        self.rows[row.index()]
            .iter()
            .find(|e| e.var == var)
            .map(|e| e.coeff)
    }

    /// Adds `coeff * var` to `row`, merging with an existing entry.
    ///
    /// Entries whose coefficient cancels to zero are removed.
    pub fn add_var(&mut self, row: RowId, coeff: u64, var: Var) {
        let coeff = self.ring.reduce(coeff);
        if coeff == 0 {
            return;
        }
        self.ensure_var(var);
        let entries = &mut self.rows[row.index()];
        match entries.iter().position(|e| e.var == var) {
            Some(i) => {
                let sum = self.ring.add(entries[i].coeff, coeff);
                if sum == 0 {
                    entries.swap_remove(i);
                    self.columns[var.index()].retain(|&r| r != row);
                } else {
                    entries[i].coeff = sum;
                }
            }
            None => {
                entries.push(RowEntry { var, coeff });
                self.columns[var.index()].push(row);
            }
        }
    }

    /// Multiplies every coefficient of `row` by `k`.
    pub fn mul(&mut self, row: RowId, k: u64) {
        let ring = self.ring;
        let entries = &mut self.rows[row.index()];
        for e in entries.iter_mut() {
            e.coeff = ring.mul(e.coeff, k);
        }
        // An even factor can annihilate coefficients with many trailing zeros.
        let vanished: Vec<Var> = entries.iter().filter(|e| e.coeff == 0).map(|e| e.var).collect();
        if !vanished.is_empty() {
            entries.retain(|e| e.coeff != 0);
            for var in vanished {
                self.columns[var.index()].retain(|&r| r != row);
            }
        }
    }

    /// `dst := dst + k * src`.
    pub fn add(&mut self, dst: RowId, k: u64, src: RowId) {
        assert_ne!(dst, src, "Cannot add a row to itself");
        let src_entries = self.rows[src.index()].clone();
        for e in src_entries {
            let coeff = self.ring.mul(k, e.coeff);
            self.add_var(dst, coeff, e.var);
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn matrix(bits: u32) -> SparseMatrix {
        SparseMatrix::new(Ring::new(bits).unwrap())
    }

    #[test]
    fn test_mk_row_and_entries() {
        let mut m = matrix(8);
        let (x, y) = (Var::new(0), Var::new(1));
        let r = m.mk_row();
        m.add_var(r, 3, x);
        m.add_var(r, 5, y);
        assert_eq!(m.num_rows(), 1);
        assert_eq!(m.coeff(r, x), Some(3));
        assert_eq!(m.coeff(r, y), Some(5));
        assert_eq!(m.column_size(x), 1);
        let col: Vec<_> = m.col_entries(y).collect();
        assert_eq!(col, vec![ColEntry { row: r, coeff: 5 }]);
    }

    #[test]
    fn test_add_var_merges_and_cancels() {
        let mut m = matrix(4);
        let x = Var::new(0);
        let r = m.mk_row();
        m.add_var(r, 3, x);
        m.add_var(r, 4, x);
        assert_eq!(m.coeff(r, x), Some(7));
        m.add_var(r, 9, x);
        assert_eq!(m.coeff(r, x), None);
        assert_eq!(m.column_size(x), 0);
        m.add_var(r, 16, x);
        assert!(m.row_entries(r).is_empty());
    }

    #[test]
    fn test_mul() {
        let mut m = matrix(4);
        let (x, y) = (Var::new(0), Var::new(1));
        let r = m.mk_row();
        m.add_var(r, 1, x);
        m.add_var(r, 8, y);
        m.mul(r, 3);
        assert_eq!(m.coeff(r, x), Some(3));
        assert_eq!(m.coeff(r, y), Some(8));
        m.mul(r, 2);
        assert_eq!(m.coeff(r, x), Some(6));
        assert_eq!(m.coeff(r, y), None);
        assert_eq!(m.column_size(y), 0);
    }

    #[test]
    fn test_add_rows() {
        let mut m = matrix(4);
        let (x, y, z) = (Var::new(0), Var::new(1), Var::new(2));
        // r1: x + 2y, r2: 3y + z
        let r1 = m.mk_row();
        m.add_var(r1, 1, x);
        m.add_var(r1, 2, y);
        let r2 = m.mk_row();
        m.add_var(r2, 3, y);
        m.add_var(r2, 1, z);
        // r2 := 2*r2 - 3*r1 = -3x + 2z
        m.mul(r2, 2);
        m.add(r2, m.ring().neg(3), r1);
        assert_eq!(m.coeff(r2, y), None);
        assert_eq!(m.coeff(r2, x), Some(13));
        assert_eq!(m.coeff(r2, z), Some(2));
        let rows_of_x: Vec<_> = m.col_entries(x).map(|c| c.row).collect();
        assert_eq!(rows_of_x, vec![r1, r2]);
        assert_eq!(m.column_size(y), 1);
    }

    #[test]
    fn test_reset() {
        let mut m = matrix(8);
        let r = m.mk_row();
        m.add_var(r, 1, Var::new(4));
        m.reset();
        assert_eq!(m.num_rows(), 0);
        assert_eq!(m.num_vars(), 0);
    }
}
