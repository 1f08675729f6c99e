//! Possibly-wrapping bound intervals on the ring.
//!
//! A bound `[lo, hi)` is read on the circle `Z/2^N`:
//!
//! | Encoding  | Meaning                       |
//! |-----------|-------------------------------|
//! | `lo == hi` | unconstrained                |
//! | `lo < hi`  | `lo <= x < hi`               |
//! | `lo > hi`  | `x < hi` or `lo <= x` (wraps) |
//!
//! Note that the upper bound `2^N` itself is not representable; `[5, 16)` on a
//! 4-bit ring is written `[5, 0)` and falls in the wrapping case.

use std::fmt::{Display, Formatter};

use crate::numeral::Ring;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Bounds {
    pub lo: u64,
    pub hi: u64,
}

impl Bounds {
    pub const fn new(lo: u64, hi: u64) -> Self {
        Self { lo, hi }
    }

    pub const fn is_free(&self) -> bool {
        self.lo == self.hi
    }

    pub const fn is_wrapping(&self) -> bool {
        self.lo > self.hi
    }

    pub const fn contains(&self, value: u64) -> bool {
        in_bounds(value, self.lo, self.hi)
    }

    /// The in-bounds value closest to `value` on the circle, together with the
    /// distance to it. Ties go to `lo`.
    ///
    /// Moving up to `lo` costs `lo - value`, moving down to `hi - 1` costs
    /// `value - (hi - 1)`, both measured in the ring.
    pub fn nearest(&self, ring: &Ring, value: u64) -> (u64, u64) {
        if self.contains(value) {
            return (value, 0);
        }
        let top = ring.sub(self.hi, 1);
        let up = ring.sub(self.lo, value);
        let down = ring.sub(value, top);
        if up <= down {
            (self.lo, up)
        } else {
            (top, down)
        }
    }

    /// How far `value` lies outside the interval, 0 if inside.
    pub fn violation(&self, ring: &Ring, value: u64) -> u64 {
        self.nearest(ring, value).1
    }
}

impl Display for Bounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_free() {
            write!(f, "*")
        } else {
            write!(f, "[{}, {})", self.lo, self.hi)
        }
    }
}

/// Membership test for the interval `[lo, hi)`, see the [module docs](self).
pub const fn in_bounds(value: u64, lo: u64, hi: u64) -> bool {
    if lo == hi {
        return true;
    }
    if lo < hi {
        return lo <= value && value < hi;
    }
    value < hi || lo <= value
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_free_contains_everything() {
        let ring = Ring::new(4).unwrap();
        for (lo, hi) in [(0, 0), (7, 7), (15, 15)] {
            let b = Bounds::new(lo, hi);
            assert!(b.is_free());
            for value in [0, 1, 7, 8, 14, ring.max_value()] {
                assert!(b.contains(value), "{} in {}", value, b);
            }
        }
        let ring = Ring::new(64).unwrap();
        assert!(in_bounds(ring.max_value(), 3, 3));
        assert!(in_bounds(0, u64::MAX, u64::MAX));
    }

    #[test]
    fn test_plain_interval() {
        let b = Bounds::new(2, 5);
        assert!(!b.is_wrapping());
        assert!(!b.contains(1));
        assert!(b.contains(2));
        assert!(b.contains(4));
        assert!(!b.contains(5));
    }

    #[test]
    fn test_wrapping_interval() {
        // [13, 16) ∪ [0, 2) on 4 bits
        let b = Bounds::new(13, 2);
        assert!(b.is_wrapping());
        assert!(b.contains(13));
        assert!(b.contains(15));
        assert!(b.contains(0));
        assert!(b.contains(1));
        assert!(!b.contains(2));
        assert!(!b.contains(12));
        // [5, 16) is encoded as [5, 0)
        let b = Bounds::new(5, 0);
        assert!(b.contains(15));
        assert!(!b.contains(0));
        assert!(!b.contains(4));
    }

    #[test]
    fn test_nearest() {
        let ring = Ring::new(4).unwrap();
        let b = Bounds::new(5, 0);
        // From 0: up to 5 costs 5, down to 15 costs 1.
        assert_eq!(b.nearest(&ring, 0), (15, 1));
        // From 3: up to 5 costs 2, down to 15 costs 4.
        assert_eq!(b.nearest(&ring, 3), (5, 2));
        assert_eq!(b.nearest(&ring, 9), (9, 0));
        let b = Bounds::new(4, 7);
        assert_eq!(b.nearest(&ring, 14), (4, 6));
        // Tie goes to lo.
        assert_eq!(b.nearest(&ring, 13), (4, 7));
        assert_eq!(b.violation(&ring, 10), 4);
    }
}
