//! Errors reported for contract violations.
//!
//! Search outcomes are never errors (see [`Feasibility`][crate::fixplex::Feasibility]).
//! A [`FixplexError`] means the caller asked for something the tableau cannot
//! represent; the tableau is left untouched in that case.

use thiserror::Error;

use crate::types::{RowId, Var};

/// Result type alias for tableau operations.
pub type Result<T> = std::result::Result<T, FixplexError>;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum FixplexError {
    /// Ring width outside `1..=64`.
    #[error("invalid bit width {0}, expected 1..=64")]
    InvalidWidth(u32),

    /// Variable was never registered with `ensure_var`.
    #[error("unknown variable {0}")]
    UnknownVar(Var),

    /// Row handle does not belong to this tableau.
    #[error("unknown row {0}")]
    UnknownRow(RowId),

    /// A bound, delta or coefficient does not fit in the ring.
    #[error("value {value} does not fit in {bits} bits")]
    ValueOutOfRange { value: u64, bits: u32 },

    /// The base variable of a new row has no nonzero coefficient in it.
    #[error("base variable {0} has a zero coefficient in the new row")]
    ZeroBaseCoeff(Var),

    /// The requested base variable is already basic in another row.
    #[error("variable {var} is already basic in row {row}")]
    AlreadyBasic { var: Var, row: RowId },

    /// The base coefficient does not have the fewest trailing zeros in its row,
    /// so the base value cannot always be derived by exact division.
    #[error("base coefficient {coeff} of {var} has more trailing zeros than coefficient {other} of {other_var}")]
    NonMinimalBaseCoeff {
        var: Var,
        coeff: u64,
        other_var: Var,
        other: u64,
    },

    /// A basic variable in the new row cannot be eliminated exactly.
    #[error("basic variable {var} (row {row}) cannot be eliminated: coefficient {coeff} is not a multiple of its base coefficient's power of two")]
    InexactElimination { var: Var, row: RowId, coeff: u64 },

    /// `update_value` requires a non-basic variable.
    #[error("variable {0} is basic; only non-basic variables can be updated")]
    BasicUpdate(Var),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            FixplexError::InvalidWidth(0).to_string(),
            "invalid bit width 0, expected 1..=64"
        );
        assert_eq!(
            FixplexError::ValueOutOfRange { value: 16, bits: 4 }.to_string(),
            "value 16 does not fit in 4 bits"
        );
        assert_eq!(
            FixplexError::AlreadyBasic {
                var: Var::new(3),
                row: RowId::new(1)
            }
            .to_string(),
            "variable v3 is already basic in row r1"
        );
    }
}
