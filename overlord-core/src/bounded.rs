use crate::fixed::Fixed;
use serde::{Deserialize, Serialize};

/// An integer clamped to `MIN..=MAX` on every write.
/// Used for: morale (0 to 100), tax rate (0 to 100), training level (0 to 100).
///
/// Serializes as the bare number; out-of-range values are clamped when loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct BoundedInt<const MIN: i32, const MAX: i32> {
    value: i32,
}

impl<const MIN: i32, const MAX: i32> BoundedInt<MIN, MAX> {
    pub const fn new(value: i32) -> Self {
        let value = if value < MIN {
            MIN
        } else if value > MAX {
            MAX
        } else {
            value
        };
        Self { value }
    }

    pub fn get(&self) -> i32 {
        self.value
    }

    pub fn min(&self) -> i32 {
        MIN
    }

    pub fn max(&self) -> i32 {
        MAX
    }

    /// Adds `delta` and returns the change actually applied after clamping.
    pub fn add(&mut self, delta: i32) -> i32 {
        let before = self.value;
        self.value = (self.value.saturating_add(delta)).clamp(MIN, MAX);
        self.value - before
    }

    pub fn set(&mut self, value: i32) {
        self.value = value.clamp(MIN, MAX);
    }

    pub fn is_max(&self) -> bool {
        self.value == MAX
    }

    /// Ratio from 0.0 to 1.0 as Fixed.
    pub fn ratio(&self) -> Fixed {
        Fixed::from_ratio((self.value - MIN) as i64, (MAX - MIN) as i64)
    }
}

impl<const MIN: i32, const MAX: i32> From<i32> for BoundedInt<MIN, MAX> {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

impl<const MIN: i32, const MAX: i32> From<BoundedInt<MIN, MAX>> for i32 {
    fn from(value: BoundedInt<MIN, MAX>) -> Self {
        value.value
    }
}

impl<const MIN: i32, const MAX: i32> Default for BoundedInt<MIN, MAX> {
    fn default() -> Self {
        Self::new(MIN)
    }
}

impl<const MIN: i32, const MAX: i32> std::fmt::Display for BoundedInt<MIN, MAX> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A 0-100 percentage.
pub type Percentage = BoundedInt<0, 100>;
pub type Morale = Percentage;
pub type TaxRate = Percentage;
pub type TrainingLevel = Percentage;
