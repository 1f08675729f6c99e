//! Interval-based infeasibility proof for a single row.
//!
//! For a row `Σ c_i * x_i = 0` with every `x_i` in a non-free bound `[lo_i, hi_i)`,
//! the sum ranges (as integers, before reduction) over
//!
//! ```text
//! [Σ c_i * lo_i, Σ c_i * (hi_i - 1)]
//! ```
//!
//! with width `W = Σ c_i * ((hi_i - 1 - lo_i) mod 2^N)`. If `W < 2^N` the interval
//! maps onto the ring without wrapping past itself, so its reduced endpoints
//! `lo_sum <= hi_sum` describe all reachable sums exactly. The row is then
//! infeasible when that interval avoids zero, i.e. `0 < lo_sum <= hi_sum`.
//!
//! Free variables or a width of `2^N` or more make the check inconclusive.

use log::debug;

use crate::fixplex::Fixplex;
use crate::types::RowId;

impl<R> Fixplex<R> {
    /// Returns `true` if `row` provably has no solution within the current bounds.
    ///
    /// A `false` result means "not proven", not "satisfiable".
    pub fn is_infeasible_row(&self, row: RowId) -> bool {
        let ring = &self.ring;
        let mut lo_sum = 0;
        let mut hi_sum = 0;
        let mut width = 0;

        for e in self.matrix.row_entries(row) {
            let bounds = self.bounds(e.var);
            if bounds.is_free() {
                return false;
            }
            let top = ring.sub(bounds.hi, 1);
            lo_sum = ring.add(lo_sum, ring.mul(e.coeff, bounds.lo));
            hi_sum = ring.add(hi_sum, ring.mul(e.coeff, top));

            let range = ring.sub(top, bounds.lo);
            match ring.checked_mul(e.coeff, range).and_then(|w| ring.checked_add(width, w)) {
                Some(w) => width = w,
                None => return false,
            }
        }

        let infeasible = 0 < lo_sum && lo_sum <= hi_sum;
        if infeasible {
            debug!(
                "is_infeasible_row({}): sums in [{}, {}], width {}",
                row, lo_sum, hi_sum, width
            );
        }
        infeasible
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::fixplex::Fixplex;
    use crate::types::Var;

    #[test]
    fn test_disjoint_interval_is_infeasible() {
        // x + y = 0 over 4 bits, x in [5, 16), y in [13, 16)
        let mut fp = Fixplex::new(4).unwrap();
        let (x, y) = (Var::new(0), Var::new(1));
        fp.ensure_var(y);
        let r = fp.add_row(x, [(x, 1), (y, 1)]).unwrap();
        fp.set_bounds(x, 5, 0).unwrap();
        fp.set_bounds(y, 13, 0).unwrap();
        // Sums cover [18, 30], i.e. [2, 14] after reduction.
        assert!(fp.is_infeasible_row(r));
    }

    #[test]
    fn test_interval_containing_zero() {
        // x in [5, 16), y in [0, 4): x = 15, y = 1 is a solution.
        let mut fp = Fixplex::new(4).unwrap();
        let (x, y) = (Var::new(0), Var::new(1));
        fp.ensure_var(y);
        let r = fp.add_row(x, [(x, 1), (y, 1)]).unwrap();
        fp.set_bounds(x, 5, 0).unwrap();
        fp.set_bounds(y, 0, 4).unwrap();
        assert!(!fp.is_infeasible_row(r));
    }

    #[test]
    fn test_free_variable_is_inconclusive() {
        let mut fp = Fixplex::new(4).unwrap();
        let (x, y) = (Var::new(0), Var::new(1));
        fp.ensure_var(y);
        let r = fp.add_row(x, [(x, 1), (y, 1)]).unwrap();
        fp.set_bounds(x, 1, 2).unwrap();
        assert!(!fp.is_infeasible_row(r));
    }

    #[test]
    fn test_wide_interval_is_inconclusive() {
        // x + 4y = 0 over 4 bits, x in [1, 2)
        let mut fp = Fixplex::new(4).unwrap();
        let (x, y) = (Var::new(0), Var::new(1));
        fp.ensure_var(y);
        let r = fp.add_row(x, [(x, 1), (y, 4)]).unwrap();
        fp.set_bounds(x, 1, 2).unwrap();
        fp.set_bounds(y, 0, 3).unwrap();
        // x + 4y ranges over [1, 9]: zero is not reachable.
        assert!(fp.is_infeasible_row(r));
        fp.set_bounds(y, 0, 5).unwrap();
        // [1, 17] wraps past zero.
        assert!(!fp.is_infeasible_row(r));
    }

    #[test]
    fn test_interval_reaching_zero_exactly() {
        // x + y = 0 over 4 bits, x in [8, 9), y in [8, 9): 8 + 8 = 16 = 0.
        let mut fp = Fixplex::new(4).unwrap();
        let (x, y) = (Var::new(0), Var::new(1));
        fp.ensure_var(y);
        let r = fp.add_row(x, [(x, 1), (y, 1)]).unwrap();
        fp.set_bounds(x, 8, 9).unwrap();
        fp.set_bounds(y, 8, 9).unwrap();
        assert!(!fp.is_infeasible_row(r));
    }
}
