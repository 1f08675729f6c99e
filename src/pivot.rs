//! Pivot selection and the pivot operation.
//!
//! To repair a basic variable `x` of row `r` (base coefficient `a`), some
//! non-basic `y` of `r` (coefficient `b`) takes its place in the basis while `x`
//! is set to a target value. This is only sound when every division stays exact,
//! so `y` is *eligible* iff
//!
//! - `tz(b)` is minimal among the coefficients of `r`, and
//! - `tz(b) <= tz(c)` for the coefficient `c` of `y` in every row containing `y`.
//!
//! Among eligible candidates, the preferred one
//!
//! 1. lands within its own bounds after the pivot, then
//! 2. if none does, violates them the least, otherwise
//! 3. pushes the fewest other basic variables out of their bounds, then
//! 4. occurs in the fewest rows.
//!
//! Remaining ties are broken uniformly at random, or by smallest index under
//! Bland's rule.

use log::{debug, trace};
use rand::Rng;

use crate::fixplex::Fixplex;
use crate::matrix::{ColEntry, RowEntry};
use crate::types::{RowId, Var};

/// A selected entering variable.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct PivotCandidate {
    pub(crate) var: Var,
    pub(crate) coeff: u64,
    /// Whether `var` stays within its bounds after the pivot.
    pub(crate) in_bounds: bool,
}

/// Lower is better.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
struct Score {
    out_of_bounds: bool,
    violation: u64,
    num_newly_infeasible: usize,
    column_size: usize,
}

impl<R: Rng> Fixplex<R> {
    /// Picks the entering variable for moving the basic `x` to `new_value`.
    pub(crate) fn select_pivot(&mut self, x: Var, new_value: u64) -> Option<PivotCandidate> {
        let ring = self.ring;
        let r = self.base_row(x)?;
        let a = self.rows[r.index()].base_coeff;
        let row_value = self.rows[r.index()].value;
        let tz_a = ring.trailing_zeros(a);

        let entries: Vec<RowEntry> = self.matrix.row_entries(r).to_vec();
        let mut best: Option<(PivotCandidate, Score)> = None;
        let mut num_ties: usize = 0;

        for RowEntry { var: y, coeff: b } in entries {
            if y == x || ring.trailing_zeros(b) > tz_a {
                continue;
            }
            if !self.has_minimal_trailing_zeros(y, b) {
                continue;
            }

            // b * y' + a * new_value + rest = 0
            let rest = ring.sub(row_value, ring.mul(b, self.value(y)));
            let new_y = self.solve_base(ring.add(rest, ring.mul(a, new_value)), b);
            let bounds = self.bounds(y);
            let in_bounds = bounds.contains(new_y);
            let score = Score {
                out_of_bounds: !in_bounds,
                violation: bounds.violation(&ring, new_y),
                num_newly_infeasible: if in_bounds {
                    self.num_newly_infeasible(y, r, ring.sub(new_y, self.value(y)))
                } else {
                    0
                },
                column_size: self.matrix.column_size(y),
            };
            let candidate = PivotCandidate {
                var: y,
                coeff: b,
                in_bounds,
            };
            trace!("select_pivot({}): candidate {} with {:?}", x, y, score);

            best = match best {
                None => {
                    num_ties = 1;
                    Some((candidate, score))
                }
                Some((current, current_score)) => {
                    if score < current_score {
                        num_ties = 1;
                        Some((candidate, score))
                    } else if score > current_score {
                        Some((current, current_score))
                    } else if self.bland {
                        if y < current.var {
                            Some((candidate, score))
                        } else {
                            Some((current, current_score))
                        }
                    } else {
                        num_ties += 1;
                        if self.rng.random_range(0..num_ties) == 0 {
                            Some((candidate, score))
                        } else {
                            Some((current, current_score))
                        }
                    }
                }
            };
        }

        if let Some((candidate, _)) = best {
            debug!("select_pivot({}, {}) = {:?}", x, new_value, candidate);
        }
        best.map(|(candidate, _)| candidate)
    }

    /// Checks that no row has a coefficient of `y` with fewer trailing zeros than `b`.
    pub(crate) fn has_minimal_trailing_zeros(&self, y: Var, b: u64) -> bool {
        let tz = self.ring.trailing_zeros(b);
        if tz == 0 {
            return true;
        }
        self.matrix
            .col_entries(y)
            .all(|c| self.ring.trailing_zeros(c.coeff) >= tz)
    }

    /// Counts basic variables, other than the base of `r`, that are within their
    /// bounds now but would leave them if `y` changed by `delta`.
    pub(crate) fn num_newly_infeasible(&self, y: Var, r: RowId, delta: u64) -> usize {
        let ring = self.ring;
        self.matrix
            .col_entries(y)
            .filter(|c| c.row != r)
            .filter(|&ColEntry { row, coeff }| {
                let info = &self.rows[row.index()];
                let bounds = self.bounds(info.base);
                if bounds.is_free() || !bounds.contains(self.value(info.base)) {
                    return false;
                }
                let value = ring.add(info.value, ring.mul(coeff, delta));
                !bounds.contains(self.solve_base(value, info.base_coeff))
            })
            .count()
    }

    /// Exchanges the basic `x` with the non-basic `y` (coefficient `b` in the row
    /// of `x`), setting `x` to `new_value`.
    ///
    /// ```text
    /// a * x + b * y + R = 0, value(r) = b * old_y + R.value
    /// value(r) := value(r) - b * old_y + a * new_value
    /// y := -value(r) / b
    /// ```
    ///
    /// Then `y` is eliminated from every other row.
    pub(crate) fn pivot(&mut self, x: Var, y: Var, b: u64, new_value: u64) {
        debug!("pivot(x = {}, y = {}, b = {}, new_value = {})", x, y, b, new_value);
        self.stats.num_pivots += 1;
        let ring = self.ring;
        let r = match self.base_row(x) {
            Some(r) => r,
            None => panic!("Cannot pivot non-basic {}", x),
        };
        assert!(!self.is_base(y), "Cannot pivot with basic {}", y);
        debug_assert_eq!(self.matrix.coeff(r, y), Some(b));
        debug_assert!(self.has_minimal_trailing_zeros(y, b));

        let old_y = self.value(y);
        let ri = &mut self.rows[r.index()];
        let a = ri.base_coeff;
        ri.value = ring.add(ring.sub(ri.value, ring.mul(b, old_y)), ring.mul(a, new_value));
        ri.base = y;
        ri.base_coeff = b;

        self.vars[x.index()].base2row = None;
        self.vars[x.index()].value = new_value;
        self.vars[y.index()].base2row = Some(r);
        self.update_base_value(r);
        self.add_patch(y);
        self.eliminate_column(r, y, old_y);

        debug_assert!(self.well_formed());
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::bounds::Bounds;

    fn vars<const K: usize>(fp: &mut Fixplex) -> [Var; K] {
        let vs: [Var; K] = std::array::from_fn(|i| Var::new(i as u32));
        fp.ensure_var(vs[K - 1]);
        vs
    }

    #[test]
    fn test_pivot_and_back_restores_values() {
        let mut fp = Fixplex::new(8).unwrap();
        let [x, y, z, w] = vars::<4>(&mut fp);
        // r0: 2x + 2y + 4z = 0, r1: w + 6y + z = 0
        let r0 = fp.add_row(x, [(x, 2), (y, 2), (z, 4)]).unwrap();
        let r1 = fp.add_row(w, [(w, 1), (y, 6), (z, 1)]).unwrap();
        fp.update_value(y, 3).unwrap();
        fp.update_value(z, 1).unwrap();
        assert_eq!(fp.value(x), 123);
        assert_eq!(fp.value(w), 237);
        let before: Vec<u64> = [x, y, z, w].iter().map(|&v| fp.value(v)).collect();

        fp.pivot(x, y, 2, 7);
        assert!(fp.well_formed());
        assert!(fp.is_base(y));
        assert!(!fp.is_base(x));
        assert_eq!(fp.value(x), 7);
        assert_eq!(fp.value(y), 119);
        assert_eq!(fp.value(w), 53);
        assert_eq!(fp.matrix.coeff(r1, y), None);
        assert_eq!(fp.matrix.coeff(r1, x), Some(250));
        assert_eq!(fp.matrix.coeff(r1, z), Some(245));

        fp.pivot(y, x, 2, 3);
        assert!(fp.well_formed());
        let after: Vec<u64> = [x, y, z, w].iter().map(|&v| fp.value(v)).collect();
        assert_eq!(before, after);
        assert_eq!(fp.row_base(r0), x);
        let mut entries = fp.row_entries(r1).to_vec();
        entries.sort_by_key(|e| e.var);
        assert_eq!(
            entries,
            vec![
                RowEntry { var: y, coeff: 6 },
                RowEntry { var: z, coeff: 1 },
                RowEntry { var: w, coeff: 1 },
            ]
        );
        assert_eq!(fp.stats().num_pivots, 2);
    }

    #[test]
    fn test_eligibility() {
        let mut fp = Fixplex::new(8).unwrap();
        let [x, y, z, w] = vars::<4>(&mut fp);
        // r0: 2x + 2y + 4z = 0, r1: w + y = 0
        fp.add_row(x, [(x, 2), (y, 2), (z, 4)]).unwrap();
        fp.add_row(w, [(w, 1), (y, 1)]).unwrap();
        // y has an odd coefficient in r1.
        assert!(!fp.has_minimal_trailing_zeros(y, 2));
        assert!(fp.has_minimal_trailing_zeros(z, 4));
        assert!(fp.has_minimal_trailing_zeros(y, 1));
        // z is not minimal in r0 and y fails the column check.
        assert_eq!(fp.select_pivot(x, 10), None);
    }

    #[test]
    fn test_select_prefers_in_bounds() {
        let mut fp = Fixplex::new(4).unwrap();
        let [x, y, z] = vars::<3>(&mut fp);
        // x + y + z = 0
        fp.add_row(x, [(x, 1), (y, 1), (z, 1)]).unwrap();
        fp.set_bounds(y, 0, 2).unwrap();
        // Moving x to 5 needs y + z = 11: only z can absorb it.
        let p = fp.select_pivot(x, 5).unwrap();
        assert_eq!(p.var, z);
        assert!(p.in_bounds);
    }

    #[test]
    fn test_select_least_violation() {
        let mut fp = Fixplex::new(4).unwrap();
        let [x, y, z] = vars::<3>(&mut fp);
        fp.add_row(x, [(x, 1), (y, 1), (z, 1)]).unwrap();
        fp.set_bounds(y, 0, 2).unwrap();
        fp.set_bounds(z, 0, 8).unwrap();
        // x = 5 needs y' = 11 (violation 5) or z' = 11 (violation 4).
        let p = fp.select_pivot(x, 5).unwrap();
        assert_eq!(p.var, z);
        assert!(!p.in_bounds);
        assert_eq!(fp.bounds(z), Bounds::new(0, 8));
    }

    #[test]
    fn test_select_avoids_breaking_other_rows() {
        let mut fp = Fixplex::new(4).unwrap();
        let [x, y, z, w] = vars::<4>(&mut fp);
        // r0: x + y + z = 0, r1: w + y = 0 with w in [0, 1)
        fp.add_row(x, [(x, 1), (y, 1), (z, 1)]).unwrap();
        fp.add_row(w, [(w, 1), (y, 1)]).unwrap();
        fp.set_bounds(w, 0, 1).unwrap();
        // Changing y would move w away from 0; z is free of such effects.
        assert_eq!(fp.num_newly_infeasible(y, RowId::new(0), 3), 1);
        assert_eq!(fp.num_newly_infeasible(z, RowId::new(0), 3), 0);
        let p = fp.select_pivot(x, 4).unwrap();
        assert_eq!(p.var, z);
    }

    #[test]
    fn test_bland_picks_smallest_index() {
        let mut fp = Fixplex::new(4).unwrap();
        let [x, y, z, w] = vars::<4>(&mut fp);
        // x + y + z + w = 0, y, z and w all free and in a single row.
        fp.add_row(x, [(x, 1), (w, 1), (z, 1), (y, 1)]).unwrap();
        fp.bland = true;
        let p = fp.select_pivot(x, 3).unwrap();
        assert_eq!(p.var, y);
    }
}
