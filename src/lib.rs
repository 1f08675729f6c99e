//! # fixplex: fixed-precision simplex over `Z/2^N`
//!
//! **`fixplex`** decides feasibility of systems of linear equations over the ring of
//! `N`-bit machine integers (`1 <= N <= 64`), where every variable is confined to a
//! possibly-wrapping interval `[lo, hi)`.
//! It is meant as a bit-vector theory component: cheap incremental checks, exact
//! modular arithmetic, and sound conflicts.
//!
//! ## How it works
//!
//! The equations are kept in tableau form: each row owns one *basic* variable whose
//! value is derived from the *non-basic* ones. When a basic variable violates its
//! bounds, [`make_feasible`][crate::fixplex::Fixplex::make_feasible] pivots it out of
//! the basis, choosing the entering variable so that all divisions stay exact in the
//! ring. When no pivot helps, an interval argument over the row proves infeasibility.
//!
//! - **Exact ring arithmetic**: [`Ring`][crate::numeral::Ring] wraps all operations modulo `2^N`
//!   and divides only where the divisor's trailing zeros allow it.
//! - **Wrapping bounds**: [`Bounds`][crate::bounds::Bounds] reads `[lo, hi)` on the circle,
//!   so `[14, 2)` means `{14, 15, 0, 1}` on 4 bits.
//! - **Incremental**: bounds, values and rows can be changed between checks.
//! - **Deterministic**: tie-breaking uses a seeded generator, see [`FixplexConfig`][crate::config::FixplexConfig].
//!
//! ## Basic Usage
//!
//! ```rust
//! use fixplex::fixplex::{Feasibility, Fixplex};
//! use fixplex::types::Var;
//!
//! // x + y = 0 over 4 bits
//! let mut fp = Fixplex::new(4)?;
//! let x = Var::new(0);
//! let y = Var::new(1);
//! fp.ensure_var(y);
//! let row = fp.add_row(x, [(x, 1), (y, 1)])?;
//!
//! // x in [5, 16), y in [13, 16)
//! fp.set_bounds(x, 5, 0)?;
//! fp.set_bounds(y, 13, 0)?;
//!
//! assert_eq!(fp.make_feasible(), Feasibility::Infeasible);
//! assert_eq!(fp.infeasible_row(), Some(row));
//! # Ok::<(), fixplex::error::FixplexError>(())
//! ```
//!
//! ## Modules
//!
//! - [`fixplex`]: the engine and its feasibility loop
//! - [`pivot`]: entering-variable selection and pivoting
//! - [`proof`]: row infeasibility proofs
//! - [`matrix`]: sparse row/column storage
//! - [`numeral`]: ring arithmetic
//! - [`bounds`]: wrapping intervals
//! - [`config`], [`stats`], [`error`]: configuration, counters, errors

pub mod bounds;
pub mod config;
pub mod debug;
pub mod error;
pub mod fixplex;
pub mod matrix;
pub mod numeral;
pub mod patch;
pub mod pivot;
pub mod proof;
pub mod stats;
pub mod types;
