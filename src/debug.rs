//! Debug utilities for inspecting the tableau.
//!
//! This module provides a printable view of rows, the [`Display`] of the
//! whole tableau, and [`Fixplex::well_formed`], the consistency check used by
//! debug assertions throughout the engine.

use std::fmt::{Display, Write};

use log::warn;

use crate::error::{FixplexError, Result};
use crate::fixplex::Fixplex;
use crate::matrix::RowEntry;
use crate::types::{RowId, Var};

/// A snapshot of a single row.
#[derive(Debug, Clone)]
pub struct RowDump {
    pub row: RowId,
    pub base: Var,
    pub base_coeff: u64,
    /// Cached row value
    pub value: u64,
    /// Entries sorted by variable
    pub entries: Vec<RowEntry>,
}

impl Display for RowDump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ", self.row)?;
        for (i, e) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            if e.var == self.base {
                write!(f, "{}*[{}]", e.coeff, e.var)?;
            } else {
                write!(f, "{}*{}", e.coeff, e.var)?;
            }
        }
        write!(f, " = 0 (value = {})", self.value)
    }
}

impl<R> Fixplex<R> {
    /// Get a snapshot of a single row.
    pub fn row_dump(&self, r: RowId) -> Result<RowDump> {
        if r.index() >= self.num_rows() {
            return Err(FixplexError::UnknownRow(r));
        }
        let mut entries = self.row_entries(r).to_vec();
        entries.sort_by_key(|e| e.var);
        Ok(RowDump {
            row: r,
            base: self.row_base(r),
            base_coeff: self.row_base_coeff(r),
            value: self.row_value(r),
            entries,
        })
    }

    /// Dump the variables with their values and bounds.
    pub fn dump_vars(&self) -> String {
        let mut result = String::new();
        for i in 0..self.num_vars() {
            let v = Var::new(i as u32);
            let marker = match self.base_row(v) {
                Some(r) => format!(" (base of {})", r),
                None => String::new(),
            };
            let flag = if self.in_bounds_var(v) { "" } else { " !" };
            writeln!(&mut result, "{} := {} in {}{}{}", v, self.value(v), self.bounds(v), marker, flag).unwrap();
        }
        result
    }

    /// Checks all tableau invariants, logging the first violation found.
    pub fn well_formed(&self) -> bool {
        let num_basic = self.vars.iter().filter(|v| v.base2row.is_some()).count();
        if num_basic != self.num_rows() {
            warn!("{} basic variables for {} rows", num_basic, self.num_rows());
            return false;
        }
        for i in 0..self.num_vars() {
            let v = Var::new(i as u32);
            if let Some(r) = self.base_row(v) {
                if self.row_base(r) != v {
                    warn!("{} points to {}, owned by {}", v, r, self.row_base(r));
                    return false;
                }
                if self.matrix.column_size(v) != 1 {
                    warn!("basic {} occurs in {} rows", v, self.matrix.column_size(v));
                    return false;
                }
            }
        }
        (0..self.num_rows()).all(|i| self.well_formed_row(RowId::new(i as u32)))
    }

    /// Checks the invariants of a single row.
    pub fn well_formed_row(&self, r: RowId) -> bool {
        let ring = self.ring();
        let base = self.row_base(r);
        let base_coeff = self.row_base_coeff(r);

        if self.base_row(base) != Some(r) {
            warn!("base {} of {} is not basic there", base, r);
            return false;
        }
        if base_coeff == 0 || self.matrix.coeff(r, base) != Some(base_coeff) {
            warn!("{} has base coefficient {} but entry {:?}", r, base_coeff, self.matrix.coeff(r, base));
            return false;
        }
        let tz = ring.trailing_zeros(base_coeff);
        if let Some(e) = self.row_entries(r).iter().find(|e| ring.trailing_zeros(e.coeff) < tz) {
            warn!("{} has {}*{} below base coefficient {}", r, e.coeff, e.var, base_coeff);
            return false;
        }
        let value = self.compute_row_value(r);
        if value != self.row_value(r) {
            warn!("{} caches value {} but sums to {}", r, self.row_value(r), value);
            return false;
        }
        let sum = ring.add(ring.mul(base_coeff, self.value(base)), value);
        if sum != 0 {
            warn!("{} evaluates to {}", r, sum);
            return false;
        }
        true
    }
}

impl<R> Display for Fixplex<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Fixplex over {} ({} vars, {} rows):", self.ring(), self.num_vars(), self.num_rows())?;
        for i in 0..self.num_rows() {
            if let Ok(dump) = self.row_dump(RowId::new(i as u32)) {
                writeln!(f, "  {}", dump)?;
            }
        }
        for line in self.dump_vars().lines() {
            writeln!(f, "  {}", line)?;
        }
        Ok(())
    }
}
