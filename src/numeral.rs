//! Fixed-width modular arithmetic.
//!
//! All tableau values and coefficients are elements of the ring `Z/2^N` for a
//! width `N` fixed per engine. Elements are stored as `u64` values below `2^N`,
//! so any width in `1..=64` is supported.
//!
//! Besides the usual wrapping operations, the tableau needs three things the
//! standard integer types do not provide directly:
//!
//! - **Overflow-checked** addition and multiplication *relative to `2^N`*
//!   (used by the infeasibility proof).
//! - **Inverses** of odd elements (odd elements are exactly the units of the ring).
//! - **Exact division** `a / b` for `b = 2^t * b1` with `b1` odd, defined iff
//!   `2^t` divides `a`.
//!
//! # Canonical quotients
//!
//! When `b` is even, the equation `b * q = a` has `2^t` solutions that differ in
//! their top `t` bits. [`Ring::div_exact`] always returns the smallest one, i.e. the
//! unique solution below `2^(N-t)`. Scaling both `a` and `b` by the same odd factor
//! does not change that solution, which is what keeps basic variable values stable
//! when rows are combined.

use std::fmt::{Display, Formatter};

use crate::error::{FixplexError, Result};

/// The ring of integers modulo `2^bits`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Ring {
    bits: u32,
    mask: u64,
}

impl Ring {
    /// Creates the ring `Z/2^bits`.
    ///
    /// Fails with [`FixplexError::InvalidWidth`] unless `1 <= bits <= 64`.
    pub fn new(bits: u32) -> Result<Self> {
        if bits == 0 || bits > 64 {
            return Err(FixplexError::InvalidWidth(bits));
        }
        Ok(Self {
            bits,
            mask: Self::mask_of(bits),
        })
    }

    const fn mask_of(bits: u32) -> u64 {
        if bits >= 64 {
            u64::MAX
        } else {
            (1u64 << bits) - 1
        }
    }

    /// Bit width `N`.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Largest element, `2^N - 1`.
    pub fn max_value(&self) -> u64 {
        self.mask
    }

    /// Checks whether a raw value is an element of this ring.
    pub fn contains(&self, x: u64) -> bool {
        x & !self.mask == 0
    }

    /// Reduces an arbitrary `u64` modulo `2^N`.
    #[inline]
    pub fn reduce(&self, x: u64) -> u64 {
        x & self.mask
    }

    #[inline]
    pub fn add(&self, a: u64, b: u64) -> u64 {
        a.wrapping_add(b) & self.mask
    }

    #[inline]
    pub fn sub(&self, a: u64, b: u64) -> u64 {
        a.wrapping_sub(b) & self.mask
    }

    #[inline]
    pub fn mul(&self, a: u64, b: u64) -> u64 {
        a.wrapping_mul(b) & self.mask
    }

    #[inline]
    pub fn neg(&self, a: u64) -> u64 {
        a.wrapping_neg() & self.mask
    }

    /// Integer sum of two elements, or `None` if it does not fit below `2^N`.
    pub fn checked_add(&self, a: u64, b: u64) -> Option<u64> {
        let sum = a.checked_add(b)?;
        self.contains(sum).then_some(sum)
    }

    /// Integer product of two elements, or `None` if it does not fit below `2^N`.
    pub fn checked_mul(&self, a: u64, b: u64) -> Option<u64> {
        let product = a.checked_mul(b)?;
        self.contains(product).then_some(product)
    }

    /// Number of trailing zero bits, `N` for zero.
    #[inline]
    pub fn trailing_zeros(&self, x: u64) -> u32 {
        if x == 0 {
            self.bits
        } else {
            x.trailing_zeros()
        }
    }

    /// The odd factor of a nonzero element: `x >> trailing_zeros(x)`.
    pub fn odd_part(&self, x: u64) -> u64 {
        assert_ne!(x, 0, "Zero has no odd part");
        x >> x.trailing_zeros()
    }

    /// Multiplicative inverse of an odd element, `None` for even elements.
    ///
    /// Newton iteration `y <- y * (2 - x * y)` doubles the number of correct low
    /// bits per step; `y = x` is already correct to 3 bits for odd `x`.
    pub fn inverse(&self, x: u64) -> Option<u64> {
        if x & 1 == 0 {
            return None;
        }
        let mut y = x;
        for _ in 0..5 {
            y = y.wrapping_mul(2u64.wrapping_sub(x.wrapping_mul(y)));
        }
        debug_assert_eq!(x.wrapping_mul(y), 1);
        Some(y & self.mask)
    }

    /// Checks whether `b` divides `a` exactly, i.e. `tz(b) <= tz(a)` and `b != 0`.
    pub fn divides(&self, b: u64, a: u64) -> bool {
        b != 0 && self.trailing_zeros(b) <= self.trailing_zeros(a)
    }

    /// Canonical solution `q` of `b * q = a`, see the [module docs](self).
    ///
    /// Returns `None` if `b` does not divide `a`.
    pub fn div_exact(&self, a: u64, b: u64) -> Option<u64> {
        if !self.divides(b, a) {
            return None;
        }
        let t = b.trailing_zeros();
        // `inverse` only fails on even input, and the odd part is odd.
        let inv = self.inverse(self.odd_part(b))?;
        let q = self.mul(inv, a >> t);
        Some(q & Self::mask_of(self.bits - t))
    }
}

impl Display for Ring {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Z/2^{}", self.bits)
    }
}
