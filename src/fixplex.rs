//! The fixed-precision simplex tableau.
//!
//! # Overview
//!
//! [`Fixplex`] decides feasibility of linear equations over `Z/2^N` under
//! per-variable bounds `[lo, hi)` (see [`bounds`][crate::bounds]). It keeps the
//! equations in *tableau form*: every row
//!
//! ```text
//! d * base + c1 * v1 + ... + ck * vk = 0
//! ```
//!
//! owns one *basic* variable `base` whose value is derived from the current
//! values of the *non-basic* variables `v1..vk`. Non-basic values are chosen
//! freely; basic values follow.
//!
//! # Invariants
//!
//! - Each basic variable occurs in exactly one row, the row it owns.
//! - A row caches `c1 * value(v1) + ... + ck * value(vk)`, its *row value*.
//! - `d * value(base) + row_value == 0`, with `value(base)` the canonical quotient
//!   (see [`Ring::div_exact`]).
//! - `d` has the fewest trailing zeros among the coefficients of its row. This is
//!   what makes every base value derivable by exact division, for *any*
//!   assignment of the non-basic variables.
//!
//! [`Fixplex::well_formed`] checks all of these.
//!
//! # Search
//!
//! [`Fixplex::make_feasible`] repairs basic variables that violate their bounds by
//! pivoting them out of the basis (see [`pivot`][crate::pivot]), and asks the
//! interval proof (see [`proof`][crate::proof]) for a conflict when no pivot helps.
//!
//! ```
//! use fixplex::fixplex::{Feasibility, Fixplex};
//! use fixplex::types::Var;
//!
//! // x + y = 0 over 4 bits, x in [5, 16), y in [0, 4)
//! let mut fp = Fixplex::new(4).unwrap();
//! let (x, y) = (Var::new(0), Var::new(1));
//! fp.ensure_var(y);
//! fp.add_row(x, [(x, 1), (y, 1)]).unwrap();
//! fp.set_bounds(x, 5, 0).unwrap();
//! fp.set_bounds(y, 0, 4).unwrap();
//!
//! assert_eq!(fp.make_feasible(), Feasibility::Feasible);
//! assert_eq!(fp.value(x), 15);
//! assert_eq!(fp.value(y), 1);
//! ```

use std::fmt::Debug;

use log::{debug, info, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::bounds::Bounds;
use crate::config::{FixplexConfig, ResourceLimit, Unlimited};
use crate::error::{FixplexError, Result};
use crate::matrix::{ColEntry, RowEntry, SparseMatrix};
use crate::numeral::Ring;
use crate::patch::VarSet;
use crate::stats::FixplexStats;
use crate::types::{RowId, Var};

/// Outcome of [`Fixplex::make_feasible`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Feasibility {
    /// Every variable is within its bounds.
    Feasible,
    /// The row of [`Fixplex::infeasible_row`] cannot be satisfied under current bounds.
    Infeasible,
    /// Gave up: resource limit, iteration budget, or no applicable repair.
    Unknown,
}

#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct VarInfo {
    pub(crate) value: u64,
    pub(crate) bounds: Bounds,
    /// Owning row, for basic variables.
    pub(crate) base2row: Option<RowId>,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct RowInfo {
    pub(crate) base: Var,
    pub(crate) base_coeff: u64,
    /// Sum of `coeff * value` over the non-base entries.
    pub(crate) value: u64,
}

pub struct Fixplex<R = ChaCha8Rng> {
    pub(crate) ring: Ring,
    pub(crate) config: FixplexConfig,
    pub(crate) matrix: SparseMatrix,
    pub(crate) vars: Vec<VarInfo>,
    pub(crate) rows: Vec<RowInfo>,
    pub(crate) to_patch: VarSet,
    /// Variables selected so far in the current `make_feasible` call.
    left_basis: VarSet,
    pub(crate) bland: bool,
    infeasible_var: Option<Var>,
    pub(crate) stats: FixplexStats,
    pub(crate) rng: R,
    limit: Box<dyn ResourceLimit>,
}

impl Fixplex<ChaCha8Rng> {
    /// Creates an empty tableau over `Z/2^bits` with the default configuration.
    pub fn new(bits: u32) -> Result<Self> {
        Self::with_config(bits, FixplexConfig::default())
    }

    /// Creates an empty tableau whose generator is seeded from `config.seed`.
    pub fn with_config(bits: u32, config: FixplexConfig) -> Result<Self> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(bits, config, rng)
    }
}

impl<R: Rng> Fixplex<R> {
    /// Creates an empty tableau using `rng` for tie-breaking.
    pub fn with_rng(bits: u32, config: FixplexConfig, rng: R) -> Result<Self> {
        let ring = Ring::new(bits)?;
        Ok(Self {
            ring,
            config,
            matrix: SparseMatrix::new(ring),
            vars: Vec::new(),
            rows: Vec::new(),
            to_patch: VarSet::default(),
            left_basis: VarSet::default(),
            bland: false,
            infeasible_var: None,
            stats: FixplexStats::default(),
            rng,
            limit: Box::new(Unlimited),
        })
    }

    /// Installs the external resource limit polled by [`make_feasible`](Self::make_feasible).
    pub fn set_limit(&mut self, limit: impl ResourceLimit + 'static) {
        self.limit = Box::new(limit);
    }

    /// Clears all variables, rows and statistics.
    ///
    /// The configuration, resource limit and generator state are kept.
    pub fn reset(&mut self) {
        debug!("reset()");
        self.matrix.reset();
        self.vars.clear();
        self.rows.clear();
        self.to_patch.clear();
        self.left_basis.clear();
        self.bland = false;
        self.infeasible_var = None;
        self.stats = FixplexStats::default();
    }
}

// Accessors
impl<R> Fixplex<R> {
    pub fn ring(&self) -> &Ring {
        &self.ring
    }
    pub fn config(&self) -> &FixplexConfig {
        &self.config
    }
    pub fn stats(&self) -> &FixplexStats {
        &self.stats
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn value(&self, v: Var) -> u64 {
        self.vars[v.index()].value
    }
    pub fn bounds(&self, v: Var) -> Bounds {
        self.vars[v.index()].bounds
    }
    pub fn lo(&self, v: Var) -> u64 {
        self.bounds(v).lo
    }
    pub fn hi(&self, v: Var) -> u64 {
        self.bounds(v).hi
    }
    pub fn is_base(&self, v: Var) -> bool {
        self.vars[v.index()].base2row.is_some()
    }
    /// The row owning `v`, if `v` is basic.
    pub fn base_row(&self, v: Var) -> Option<RowId> {
        self.vars[v.index()].base2row
    }
    pub fn in_bounds_var(&self, v: Var) -> bool {
        let info = &self.vars[v.index()];
        info.bounds.contains(info.value)
    }

    pub fn row_base(&self, r: RowId) -> Var {
        self.rows[r.index()].base
    }
    pub fn row_base_coeff(&self, r: RowId) -> u64 {
        self.rows[r.index()].base_coeff
    }
    /// Cached sum of `coeff * value` over the non-base entries of `r`.
    pub fn row_value(&self, r: RowId) -> u64 {
        self.rows[r.index()].value
    }
    pub fn row_entries(&self, r: RowId) -> &[RowEntry] {
        self.matrix.row_entries(r)
    }
    /// Rows containing `v`, with the coefficient of `v` in each.
    pub fn col_entries(&self, v: Var) -> impl Iterator<Item = ColEntry> + '_ {
        self.matrix.col_entries(v)
    }

    /// The basic variable that caused the last `Infeasible` verdict.
    pub fn infeasible_var(&self) -> Option<Var> {
        self.infeasible_var
    }
    /// The row proven infeasible by the last `Infeasible` verdict.
    pub fn infeasible_row(&self) -> Option<RowId> {
        self.infeasible_var.and_then(|v| self.base_row(v))
    }

    /// Members of the to-patch set, in increasing order.
    pub fn to_patch(&self) -> impl Iterator<Item = Var> + '_ {
        self.to_patch.iter()
    }

    fn check_var(&self, v: Var) -> Result<()> {
        if v.index() < self.vars.len() {
            Ok(())
        } else {
            Err(FixplexError::UnknownVar(v))
        }
    }

    fn check_value(&self, value: u64) -> Result<()> {
        if self.ring.contains(value) {
            Ok(())
        } else {
            Err(FixplexError::ValueOutOfRange {
                value,
                bits: self.ring.bits(),
            })
        }
    }

    /// Sum of `coeff * value` over the non-base entries, recomputed from the matrix.
    pub(crate) fn compute_row_value(&self, r: RowId) -> u64 {
        let base = self.rows[r.index()].base;
        self.matrix
            .row_entries(r)
            .iter()
            .filter(|e| e.var != base)
            .fold(0, |acc, e| self.ring.add(acc, self.ring.mul(e.coeff, self.value(e.var))))
    }

    /// Value of the base variable for a given row value: `-row_value / base_coeff`.
    ///
    /// # Panics
    ///
    /// Panics if the division is not exact, which means the row invariant is broken.
    pub(crate) fn solve_base(&self, row_value: u64, base_coeff: u64) -> u64 {
        self.ring
            .div_exact(self.ring.neg(row_value), base_coeff)
            .unwrap_or_else(|| {
                panic!(
                    "Row value {} is not divisible by base coefficient {}",
                    row_value, base_coeff
                )
            })
    }

    /// Re-derives the base value of `r` from its cached row value.
    pub(crate) fn update_base_value(&mut self, r: RowId) -> Var {
        let RowInfo {
            base,
            base_coeff,
            value,
        } = self.rows[r.index()];
        self.vars[base.index()].value = self.solve_base(value, base_coeff);
        base
    }

    /// Puts a basic variable into the to-patch set if it is out of bounds.
    pub(crate) fn add_patch(&mut self, v: Var) {
        debug_assert!(self.is_base(v));
        if !self.in_bounds_var(v) {
            self.to_patch.insert(v);
        }
    }
}

// Variables and bounds
impl<R: Rng> Fixplex<R> {
    /// Registers `v` (and every smaller index) with free bounds and value zero.
    pub fn ensure_var(&mut self, v: Var) {
        if self.vars.len() <= v.index() {
            self.vars.resize_with(v.index() + 1, VarInfo::default);
            self.matrix.ensure_var(v);
            self.to_patch.reserve(2 * v.index() + 1);
        }
    }

    /// Sets the bounds of `v` to `[lo, hi)`.
    ///
    /// A basic variable that now violates its bounds is queued for repair; a
    /// non-basic one is moved to the nearer bound right away.
    pub fn set_bounds(&mut self, v: Var, lo: u64, hi: u64) -> Result<()> {
        self.check_var(v)?;
        self.check_value(lo)?;
        self.check_value(hi)?;
        debug!("set_bounds(v = {}, lo = {}, hi = {})", v, lo, hi);

        self.vars[v.index()].bounds = Bounds::new(lo, hi);
        if self.is_base(v) {
            self.add_patch(v);
        } else if !self.in_bounds_var(v) {
            let value = self.value(v);
            let (target, _) = self.bounds(v).nearest(&self.ring, value);
            self.update_value_core(v, self.ring.sub(target, value));
        }
        Ok(())
    }

    /// Adds `delta` to the value of the non-basic variable `v`.
    pub fn update_value(&mut self, v: Var, delta: u64) -> Result<()> {
        self.check_var(v)?;
        self.check_value(delta)?;
        if self.is_base(v) {
            return Err(FixplexError::BasicUpdate(v));
        }
        self.update_value_core(v, delta);
        Ok(())
    }

    //
    // v <- v + delta
    // s*d + R = 0, where R contains c*v
    // ->
    // R.value += c*delta
    // s.value = -R.value / d
    //
    fn update_value_core(&mut self, v: Var, delta: u64) {
        if delta == 0 {
            return;
        }
        debug!("update_value(v = {}, delta = {})", v, delta);
        let ring = self.ring;
        let info = &mut self.vars[v.index()];
        info.value = ring.add(info.value, delta);

        let column: Vec<ColEntry> = self.matrix.col_entries(v).collect();
        for ColEntry { row, coeff } in column {
            let ri = &mut self.rows[row.index()];
            ri.value = ring.add(ri.value, ring.mul(delta, coeff));
            let s = self.update_base_value(row);
            self.add_patch(s);
        }
        debug_assert!(self.well_formed());
    }
}

// Rows
impl<R: Rng> Fixplex<R> {
    /// Adds the row `Σ coeff * var = 0` with `base_var` as its basic variable.
    ///
    /// Entries may repeat variables (their coefficients are summed) and may have
    /// zero coefficients (they are dropped). Basic variables of other rows are
    /// substituted away, and `base_var` is eliminated from every other row, so the
    /// tableau stays in tableau form.
    ///
    /// Nothing is changed when an error is returned.
    pub fn add_row(
        &mut self,
        base_var: Var,
        entries: impl IntoIterator<Item = (Var, u64)>,
    ) -> Result<RowId> {
        let ring = self.ring;
        self.check_var(base_var)?;

        let mut scratch: Vec<RowEntry> = Vec::new();
        for (var, coeff) in entries {
            self.check_var(var)?;
            self.check_value(coeff)?;
            accumulate(&ring, &mut scratch, coeff, var);
        }
        debug!("add_row(base = {}, entries = {:?})", base_var, scratch);

        if let Some(row) = self.base_row(base_var) {
            return Err(FixplexError::AlreadyBasic { var: base_var, row });
        }

        // Substitute the rows of basic variables into the new row. Each step
        // scales the scratch row, so coefficients are read afresh.
        let basic: Vec<(Var, RowId)> = scratch
            .iter()
            .filter_map(|e| self.base_row(e.var).map(|rw| (e.var, rw)))
            .collect();
        for (w, rw) in basic {
            let Some(e) = scratch
                .iter()
                .find(|entry| entry.var == w)
                .map(|entry| entry.coeff)
            else {
                continue;
            };
            let f = self.rows[rw.index()].base_coeff;
            let s = ring.trailing_zeros(f);
            if ring.trailing_zeros(e) < s {
                return Err(FixplexError::InexactElimination {
                    var: w,
                    row: rw,
                    coeff: e,
                });
            }
            // r := f1 * r - (e >> s) * r_w
            let f1 = ring.odd_part(f);
            for entry in scratch.iter_mut() {
                entry.coeff = ring.mul(entry.coeff, f1);
            }
            let k = ring.neg(e >> s);
            for entry in self.matrix.row_entries(rw) {
                accumulate(&ring, &mut scratch, ring.mul(k, entry.coeff), entry.var);
            }
            debug_assert!(scratch.iter().all(|entry| entry.var != w));
        }

        let base_coeff = scratch
            .iter()
            .find(|e| e.var == base_var)
            .map(|e| e.coeff)
            .ok_or(FixplexError::ZeroBaseCoeff(base_var))?;
        let tz = ring.trailing_zeros(base_coeff);
        if let Some(other) = scratch.iter().find(|e| ring.trailing_zeros(e.coeff) < tz) {
            return Err(FixplexError::NonMinimalBaseCoeff {
                var: base_var,
                coeff: base_coeff,
                other_var: other.var,
                other: other.coeff,
            });
        }
        if let Some(c) = self
            .matrix
            .col_entries(base_var)
            .find(|c| ring.trailing_zeros(c.coeff) < tz)
        {
            return Err(FixplexError::InexactElimination {
                var: base_var,
                row: c.row,
                coeff: c.coeff,
            });
        }

        // Commit.
        let r = self.matrix.mk_row();
        for e in &scratch {
            self.matrix.add_var(r, e.coeff, e.var);
        }
        let value = scratch
            .iter()
            .filter(|e| e.var != base_var)
            .fold(0, |acc, e| ring.add(acc, ring.mul(e.coeff, self.value(e.var))));
        assert_eq!(r.index(), self.rows.len());
        self.rows.push(RowInfo {
            base: base_var,
            base_coeff,
            value,
        });
        let old_value = self.value(base_var);
        self.vars[base_var.index()].base2row = Some(r);
        self.update_base_value(r);
        self.add_patch(base_var);
        self.eliminate_column(r, base_var, old_value);

        debug_assert!(self.well_formed_row(r));
        debug_assert!(self.well_formed());
        Ok(r)
    }

    /// Eliminates `y`, the base variable of `r`, from every other row.
    ///
    /// `old_value` is the value `y` had while it was still non-basic; the other
    /// rows' cached values were computed with it.
    ///
    /// For a row `z` with `c * y`, `b = base_coeff(r) = 2^t * b1`:
    ///
    /// ```text
    /// z := b1 * z - (c >> t) * r
    /// value(z) := b1 * (value(z) - c * old_value) - (c >> t) * value(r)
    /// base_coeff(z) := b1 * base_coeff(z)
    /// ```
    pub(crate) fn eliminate_column(&mut self, r: RowId, y: Var, old_value: u64) {
        let ring = self.ring;
        let b = self.rows[r.index()].base_coeff;
        let t = ring.trailing_zeros(b);
        let b1 = ring.odd_part(b);
        let row_r_value = self.rows[r.index()].value;

        let column: Vec<ColEntry> = self
            .matrix
            .col_entries(y)
            .filter(|c| c.row != r)
            .collect();
        for ColEntry { row: z, coeff: c } in column {
            assert!(
                ring.trailing_zeros(c) >= t,
                "Coefficient {} of {} in {} has fewer trailing zeros than {}",
                c,
                y,
                z,
                b
            );
            let c1 = c >> t;
            trace!("eliminate {} from {}: {} := {} * {} - {} * {}", y, z, z, b1, z, c1, r);
            self.matrix.mul(z, b1);
            self.matrix.add(z, ring.neg(c1), r);

            let rz = &mut self.rows[z.index()];
            let rest = ring.sub(rz.value, ring.mul(c, old_value));
            rz.value = ring.sub(ring.mul(b1, rest), ring.mul(c1, row_r_value));
            rz.base_coeff = ring.mul(rz.base_coeff, b1);
            let s = self.update_base_value(z);
            self.add_patch(s);
            debug_assert!(self.well_formed_row(z));
        }
    }
}

// Feasibility loop
impl<R: Rng> Fixplex<R> {
    /// Repairs bound violations of basic variables until all are fixed, a
    /// conflict is proven, or the budget runs out.
    ///
    /// The tableau stays consistent whatever the outcome, so a call that returns
    /// [`Feasibility::Unknown`] can simply be repeated later.
    pub fn make_feasible(&mut self) -> Feasibility {
        self.stats.num_checks += 1;
        self.left_basis.clear();
        self.infeasible_var = None;
        self.bland = false;
        let mut num_iterations = 0;
        let mut num_repeated = 0;
        let mut stuck: Vec<Var> = Vec::new();
        debug_assert!(self.well_formed());

        while let Some(v) = self.select_var_to_fix() {
            if !self.limit.inc() || num_iterations >= self.config.max_iterations {
                debug!("make_feasible: budget exhausted after {} pivots", num_iterations);
                self.to_patch.insert(v);
                self.to_patch.extend(stuck);
                return Feasibility::Unknown;
            }
            if !self.is_base(v) {
                continue;
            }
            self.check_blands_rule(v, &mut num_repeated);
            match self.make_var_feasible(v) {
                VarRepair::InBounds => {}
                VarRepair::Pivoted => num_iterations += 1,
                VarRepair::Conflict => {
                    self.to_patch.insert(v);
                    self.to_patch.extend(stuck);
                    self.infeasible_var = Some(v);
                    self.stats.num_infeasible += 1;
                    info!("make_feasible: row {:?} of {} is infeasible", self.base_row(v), v);
                    return Feasibility::Infeasible;
                }
                VarRepair::Stuck => stuck.push(v),
            }
        }

        // Later pivots may have repaired (or moved out of the basis) set-aside variables.
        stuck.retain(|&v| self.is_base(v) && !self.in_bounds_var(v));
        if !stuck.is_empty() {
            debug!("make_feasible: no repair for {:?}", stuck);
            self.to_patch.extend(stuck);
            return Feasibility::Unknown;
        }
        debug_assert!(self.well_formed());
        Feasibility::Feasible
    }

    /// Removes and returns the next variable to repair.
    fn select_var_to_fix(&mut self) -> Option<Var> {
        let v = if self.bland {
            self.to_patch.first()?
        } else {
            let n = self.to_patch.len();
            if n == 0 {
                return None;
            }
            let k = self.rng.random_range(0..n);
            self.to_patch.nth(k)?
        };
        self.to_patch.remove(v);
        Some(v)
    }

    fn check_blands_rule(&mut self, v: Var, num_repeated: &mut usize) {
        if self.bland {
            return;
        }
        if !self.left_basis.insert(v) {
            *num_repeated += 1;
            if *num_repeated > self.config.blands_rule_threshold {
                info!("make_feasible: switching to Bland's rule after {} repetitions", num_repeated);
                self.bland = true;
                self.stats.num_blands += 1;
            }
        }
    }

    /// Attempts to move the basic variable `x` into its bounds.
    fn make_var_feasible(&mut self, x: Var) -> VarRepair {
        if self.in_bounds_var(x) {
            return VarRepair::InBounds;
        }
        let value = self.value(x);
        let (new_value, _) = self.bounds(x).nearest(&self.ring, value);
        let candidate = self.select_pivot(x, new_value);

        match candidate {
            Some(p) if p.in_bounds => {
                self.pivot(x, p.var, p.coeff, new_value);
                return VarRepair::Pivoted;
            }
            _ => {}
        }

        // No pivot keeps everything in bounds: look for a conflict first.
        if let Some(r) = self.base_row(x) {
            if self.is_infeasible_row(r) {
                return VarRepair::Conflict;
            }
        }
        match candidate {
            Some(p) => {
                self.pivot(x, p.var, p.coeff, new_value);
                VarRepair::Pivoted
            }
            None => VarRepair::Stuck,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum VarRepair {
    InBounds,
    Pivoted,
    Conflict,
    Stuck,
}

/// Adds `coeff * var` to a scratch row, merging and dropping zero entries.
fn accumulate(ring: &Ring, entries: &mut Vec<RowEntry>, coeff: u64, var: Var) {
    let coeff = ring.reduce(coeff);
    if coeff == 0 {
        return;
    }
    match entries.iter().position(|e| e.var == var) {
        Some(i) => {
            let sum = ring.add(entries[i].coeff, coeff);
            if sum == 0 {
                entries.remove(i);
            } else {
                entries[i].coeff = sum;
            }
        }
        None => entries.push(RowEntry { var, coeff }),
    }
}

impl<R> Debug for Fixplex<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fixplex")
            .field("ring", &self.ring)
            .field("num_vars", &self.vars.len())
            .field("num_rows", &self.rows.len())
            .field("to_patch", &self.to_patch.len())
            .finish()
    }
}
