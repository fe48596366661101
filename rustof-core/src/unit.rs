//! Physical units as exact integer exponents over the reduction base units.
//!
//! Time-of-flight reduction works in a small closed set of base units:
//! meter, angstrom, microsecond, milli-electron-volt, radian, and counts.
//! A [`Unit`] tracks one signed exponent per base, so products and quotients
//! compose exactly and mismatches are caught before any buffer is touched.
//! There is no implicit magnitude conversion between the two length bases;
//! the physical constants used by the conversion coefficients are pre-scaled
//! instead.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A physical unit, stored as exponents of the base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Unit {
    m: i8,
    angstrom: i8,
    us: i8,
    mev: i8,
    rad: i8,
    counts: i8,
}

impl Unit {
    const fn new(m: i8, angstrom: i8, us: i8, mev: i8, rad: i8, counts: i8) -> Self {
        Self {
            m,
            angstrom,
            us,
            mev,
            rad,
            counts,
        }
    }

    /// Dimensionless.
    pub const ONE: Self = Self::new(0, 0, 0, 0, 0, 0);
    /// Meter.
    pub const M: Self = Self::new(1, 0, 0, 0, 0, 0);
    /// Angstrom.
    pub const ANGSTROM: Self = Self::new(0, 1, 0, 0, 0, 0);
    /// Microsecond.
    pub const US: Self = Self::new(0, 0, 1, 0, 0, 0);
    /// Milli-electron-volt.
    pub const MEV: Self = Self::new(0, 0, 0, 1, 0, 0);
    /// Radian.
    pub const RAD: Self = Self::new(0, 0, 0, 0, 1, 0);
    /// Detector counts.
    pub const COUNTS: Self = Self::new(0, 0, 0, 0, 0, 1);

    /// Product of two units.
    #[must_use]
    pub const fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.m + rhs.m,
            self.angstrom + rhs.angstrom,
            self.us + rhs.us,
            self.mev + rhs.mev,
            self.rad + rhs.rad,
            self.counts + rhs.counts,
        )
    }

    /// Quotient of two units.
    #[must_use]
    pub const fn div(self, rhs: Self) -> Self {
        self.mul(rhs.recip())
    }

    /// Multiplicative inverse.
    #[must_use]
    pub const fn recip(self) -> Self {
        Self::new(
            -self.m,
            -self.angstrom,
            -self.us,
            -self.mev,
            -self.rad,
            -self.counts,
        )
    }

    /// Square root, if every exponent is even.
    #[must_use]
    pub fn sqrt(self) -> Option<Self> {
        let halve = |e: i8| if e % 2 == 0 { Some(e / 2) } else { None };
        Some(Self::new(
            halve(self.m)?,
            halve(self.angstrom)?,
            halve(self.us)?,
            halve(self.mev)?,
            halve(self.rad)?,
            halve(self.counts)?,
        ))
    }

    /// True if all exponents are zero.
    #[must_use]
    pub const fn is_dimensionless(self) -> bool {
        self.m == 0
            && self.angstrom == 0
            && self.us == 0
            && self.mev == 0
            && self.rad == 0
            && self.counts == 0
    }

    /// True for plain angles (radian, or dimensionless ratios).
    #[must_use]
    pub const fn is_angle(self) -> bool {
        self.m == 0
            && self.angstrom == 0
            && self.us == 0
            && self.mev == 0
            && self.counts == 0
            && (self.rad == 1 || self.rad == 0)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return f.write_str("one");
        }
        let parts = [
            ("m", self.m),
            ("angstrom", self.angstrom),
            ("us", self.us),
            ("meV", self.mev),
            ("rad", self.rad),
            ("counts", self.counts),
        ];
        let mut first = true;
        for (label, exp) in parts {
            if exp == 0 {
                continue;
            }
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            if exp == 1 {
                f.write_str(label)?;
            } else {
                write!(f, "{label}^{exp}")?;
            }
        }
        Ok(())
    }
}
