//! Dekker (1971) compensated summation.
//!
//! Accumulating many small terms of mixed sign in a plain `f64` loses the low
//! bits to cancellation; over a large profile the divergence sum visibly
//! drifts past its mathematical bound. A two-component accumulator carries
//! the rounding error of every addition in a second double.

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A double-double value: `hi` carries the sum, `lo` the accumulated error.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dekker {
    hi: f64,
    lo: f64,
}

impl Dekker {
    /// Create an accumulator holding `value` exactly.
    pub fn new(value: f64) -> Self {
        Self { hi: value, lo: 0.0 }
    }

    /// The accumulated sum.
    pub fn value(self) -> f64 {
        self.hi
    }
}

impl From<f64> for Dekker {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl Add for Dekker {
    type Output = Dekker;

    fn add(self, rhs: Dekker) -> Dekker {
        let r = self.hi + rhs.hi;
        let s = if self.hi.abs() > rhs.hi.abs() {
            self.hi - r + rhs.hi + rhs.lo + self.lo
        } else {
            rhs.hi - r + self.hi + self.lo + rhs.lo
        };
        let z = r + s;
        let zz = r - z + s;
        Dekker { hi: z, lo: zz }
    }
}

impl AddAssign for Dekker {
    fn add_assign(&mut self, rhs: Dekker) {
        *self = *self + rhs;
    }
}

impl AddAssign<f64> for Dekker {
    fn add_assign(&mut self, rhs: f64) {
        *self = *self + Dekker::new(rhs);
    }
}

impl Neg for Dekker {
    type Output = Dekker;

    fn neg(self) -> Dekker {
        Dekker {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

impl Sub for Dekker {
    type Output = Dekker;

    fn sub(self, rhs: Dekker) -> Dekker {
        self + (-rhs)
    }
}

impl SubAssign for Dekker {
    fn sub_assign(&mut self, rhs: Dekker) {
        *self = *self - rhs;
    }
}
