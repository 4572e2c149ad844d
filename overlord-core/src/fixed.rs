//! Fixed-point arithmetic for deterministic simulation.
//!
//! Yield multipliers, equipment grades and the aggression dial are fractional,
//! but every game quantity is a whole number produced by flooring. Keeping the
//! intermediate math in integers makes those floors identical on every platform,
//! so floats (f32/f64) stay out of sim logic and are only used for display.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

/// Fixed-point value with scale 10000.
///
/// `0.25 → 2500`, `1.0 → 10000`. Multiplication and division widen to `i128`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Fixed(pub i64);

impl Fixed {
    /// Scale factor: 10000 = 1.0
    pub const SCALE: i64 = 10000;

    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(10000);
    pub const HALF: Fixed = Fixed(5000);

    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Fixed(raw)
    }

    /// Create from integer (e.g., 5 → 50_000)
    #[inline]
    pub const fn from_int(v: i64) -> Self {
        Fixed(v * Self::SCALE)
    }

    /// Create from a percentage (e.g., 75 → 0.75).
    #[inline]
    pub const fn from_percent(pct: i64) -> Self {
        Fixed(pct * Self::SCALE / 100)
    }

    /// Create from a ratio `num / den`, truncated. A zero denominator yields zero.
    pub fn from_ratio(num: i64, den: i64) -> Self {
        if den == 0 {
            return Fixed::ZERO;
        }
        Fixed((num as i128 * Self::SCALE as i128 / den as i128) as i64)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Largest integer not greater than this value.
    #[inline]
    pub const fn floor(self) -> i64 {
        self.0.div_euclid(Self::SCALE)
    }

    /// Nearest integer, halves rounded up.
    #[inline]
    pub const fn round(self) -> i64 {
        (self.0 + Self::SCALE / 2).div_euclid(Self::SCALE)
    }

    /// Scale an integer quantity and floor the result: `floor(v × self)`.
    #[inline]
    pub fn apply(self, v: i64) -> i64 {
        (Fixed::from_int(v) * self).floor()
    }

    #[inline]
    pub fn max(self, other: Fixed) -> Fixed {
        if self.0 >= other.0 {
            self
        } else {
            other
        }
    }

    #[inline]
    pub fn min(self, other: Fixed) -> Fixed {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    /// Convert to f64 (display only)
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }
}

impl Add for Fixed {
    type Output = Fixed;
    #[inline]
    fn add(self, other: Fixed) -> Fixed {
        Fixed(self.0 + other.0)
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, other: Fixed) {
        self.0 += other.0;
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    #[inline]
    fn sub(self, other: Fixed) -> Fixed {
        Fixed(self.0 - other.0)
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, other: Fixed) {
        self.0 -= other.0;
    }
}

impl Mul for Fixed {
    type Output = Fixed;
    #[inline]
    fn mul(self, other: Fixed) -> Fixed {
        Fixed((self.0 as i128 * other.0 as i128 / Fixed::SCALE as i128) as i64)
    }
}

impl Div for Fixed {
    type Output = Fixed;
    #[inline]
    fn div(self, other: Fixed) -> Fixed {
        if other.0 == 0 {
            return Fixed::ZERO;
        }
        Fixed((self.0 as i128 * Fixed::SCALE as i128 / other.0 as i128) as i64)
    }
}

impl std::fmt::Debug for Fixed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fixed({} = {})", self.0, self.to_f64())
    }
}

impl std::fmt::Display for Fixed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.to_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_and_ratio() {
        assert_eq!(Fixed::from_percent(75), Fixed(7500));
        assert_eq!(Fixed::from_percent(100), Fixed::ONE);
        assert_eq!(Fixed::from_ratio(1, 4), Fixed(2500));
        assert_eq!(Fixed::from_ratio(5, 0), Fixed::ZERO);
    }

    #[test]
    fn test_floor_and_round() {
        assert_eq!(Fixed(12_999).floor(), 1);
        assert_eq!(Fixed(-1).floor(), -1);
        assert_eq!(Fixed(14_999).round(), 1);
        assert_eq!(Fixed(15_000).round(), 2);
    }

    #[test]
    fn test_apply_floors() {
        // 1000 troops at 1.3 → 1300
        assert_eq!(Fixed::from_percent(130).apply(1000), 1300);
        // 33 × 0.5 = 16.5 → 16
        assert_eq!(Fixed::HALF.apply(33), 16);
    }

    #[test]
    fn test_multiply_divide() {
        assert_eq!(Fixed::from_int(2) * Fixed::from_int(3), Fixed::from_int(6));
        assert_eq!(Fixed::HALF * Fixed::HALF, Fixed(2500));
        assert_eq!(Fixed::from_int(6) / Fixed::from_int(2), Fixed::from_int(3));
        assert_eq!(Fixed::ONE / Fixed::ZERO, Fixed::ZERO);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Multiplication is commutative
            #[test]
            fn mul_is_commutative(a in -1_000_000..=1_000_000i64, b in -1_000_000..=1_000_000i64) {
                let x = Fixed::from_int(a);
                let y = Fixed::from_int(b);
                prop_assert_eq!(x * y, y * x);
            }

            /// Applying a larger multiplier never yields a smaller quantity
            #[test]
            fn apply_is_monotone(v in 0..100_000i64, lo in 0..300i64, step in 0..300i64) {
                let a = Fixed::from_percent(lo).apply(v);
                let b = Fixed::from_percent(lo + step).apply(v);
                prop_assert!(a <= b);
            }
        }
    }
}
