//! Five-channel resource amounts.
//!
//! [`ResourceLedger`] is the non-negative balance held by a faction or a planet
//! stockpile (and doubles as the shape of a cost or a reward). [`ResourceDelta`]
//! is a signed change. A ledger can only be debited through [`ResourceLedger::spend`]
//! or [`ResourceLedger::apply`], both of which check every channel before mutating.

use crate::fixed::Fixed;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Credits,
    Minerals,
    Fuel,
    Food,
    Energy,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Credits,
        Resource::Minerals,
        Resource::Fuel,
        Resource::Food,
        Resource::Energy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Resource::Credits => "Credits",
            Resource::Minerals => "Minerals",
            Resource::Fuel => "Fuel",
            Resource::Food => "Food",
            Resource::Energy => "Energy",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Attempted overspend of a ledger channel.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Insufficient {resource}. Need {required} have {available}")]
pub struct LedgerError {
    pub resource: Resource,
    pub required: u64,
    pub available: u64,
}

/// Non-negative balance across the five channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLedger {
    pub credits: u64,
    pub minerals: u64,
    pub fuel: u64,
    pub food: u64,
    pub energy: u64,
}

impl ResourceLedger {
    pub const ZERO: ResourceLedger = ResourceLedger::new(0, 0, 0, 0, 0);

    pub const fn new(credits: u64, minerals: u64, fuel: u64, food: u64, energy: u64) -> Self {
        Self {
            credits,
            minerals,
            fuel,
            food,
            energy,
        }
    }

    pub const fn credits(credits: u64) -> Self {
        Self::new(credits, 0, 0, 0, 0)
    }

    pub fn get(&self, resource: Resource) -> u64 {
        match resource {
            Resource::Credits => self.credits,
            Resource::Minerals => self.minerals,
            Resource::Fuel => self.fuel,
            Resource::Food => self.food,
            Resource::Energy => self.energy,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u64 {
        match resource {
            Resource::Credits => &mut self.credits,
            Resource::Minerals => &mut self.minerals,
            Resource::Fuel => &mut self.fuel,
            Resource::Food => &mut self.food,
            Resource::Energy => &mut self.energy,
        }
    }

    pub fn set(&mut self, resource: Resource, amount: u64) {
        *self.slot(resource) = amount;
    }

    pub fn is_zero(&self) -> bool {
        Resource::ALL.iter().all(|&r| self.get(r) == 0)
    }

    /// First channel in which `cost` exceeds this balance, if any.
    pub fn shortfall(&self, cost: &ResourceLedger) -> Option<LedgerError> {
        Resource::ALL.iter().find_map(|&resource| {
            let required = cost.get(resource);
            let available = self.get(resource);
            (required > available).then_some(LedgerError {
                resource,
                required,
                available,
            })
        })
    }

    pub fn can_afford(&self, cost: &ResourceLedger) -> bool {
        self.shortfall(cost).is_none()
    }

    /// Debit `cost`. Nothing changes unless every channel covers its share.
    pub fn spend(&mut self, cost: &ResourceLedger) -> Result<(), LedgerError> {
        if let Some(err) = self.shortfall(cost) {
            return Err(err);
        }
        for resource in Resource::ALL {
            *self.slot(resource) -= cost.get(resource);
        }
        Ok(())
    }

    /// Debit a single channel.
    pub fn spend_one(&mut self, resource: Resource, amount: u64) -> Result<(), LedgerError> {
        let available = self.get(resource);
        if amount > available {
            return Err(LedgerError {
                resource,
                required: amount,
                available,
            });
        }
        *self.slot(resource) -= amount;
        Ok(())
    }

    pub fn deposit(&mut self, amount: &ResourceLedger) {
        for resource in Resource::ALL {
            let slot = self.slot(resource);
            *slot = slot.saturating_add(amount.get(resource));
        }
    }

    /// Apply a signed delta. A negative channel larger than the balance rejects
    /// the whole delta.
    pub fn apply(&mut self, delta: &ResourceDelta) -> Result<(), LedgerError> {
        let mut next = *self;
        for resource in Resource::ALL {
            let change = delta.get(resource);
            let available = self.get(resource);
            *next.slot(resource) =
                available
                    .checked_add_signed(change)
                    .ok_or(LedgerError {
                        resource,
                        required: change.unsigned_abs(),
                        available,
                    })?;
        }
        *self = next;
        Ok(())
    }

    /// Each channel scaled by `factor`, floored.
    pub fn scaled(&self, factor: Fixed) -> ResourceLedger {
        let mut out = ResourceLedger::ZERO;
        for resource in Resource::ALL {
            *out.slot(resource) = factor.apply(self.get(resource) as i64).max(0) as u64;
        }
        out
    }
}

impl Add for ResourceLedger {
    type Output = ResourceLedger;
    fn add(mut self, other: ResourceLedger) -> ResourceLedger {
        self.deposit(&other);
        self
    }
}

impl AddAssign for ResourceLedger {
    fn add_assign(&mut self, other: ResourceLedger) {
        self.deposit(&other);
    }
}

impl std::fmt::Display for ResourceLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "credits {} | minerals {} | fuel {} | food {} | energy {}",
            self.credits, self.minerals, self.fuel, self.food, self.energy
        )
    }
}

/// Signed change across the five channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceDelta {
    pub credits: i64,
    pub minerals: i64,
    pub fuel: i64,
    pub food: i64,
    pub energy: i64,
}

impl ResourceDelta {
    pub fn get(&self, resource: Resource) -> i64 {
        match resource {
            Resource::Credits => self.credits,
            Resource::Minerals => self.minerals,
            Resource::Fuel => self.fuel,
            Resource::Food => self.food,
            Resource::Energy => self.energy,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == ResourceDelta::default()
    }

    pub fn negated(&self) -> ResourceDelta {
        ResourceDelta {
            credits: -self.credits,
            minerals: -self.minerals,
            fuel: -self.fuel,
            food: -self.food,
            energy: -self.energy,
        }
    }
}

impl From<ResourceLedger> for ResourceDelta {
    fn from(amount: ResourceLedger) -> Self {
        let clamp = |v: u64| i64::try_from(v).unwrap_or(i64::MAX);
        ResourceDelta {
            credits: clamp(amount.credits),
            minerals: clamp(amount.minerals),
            fuel: clamp(amount.fuel),
            food: clamp(amount.food),
            energy: clamp(amount.energy),
        }
    }
}

impl Add for ResourceDelta {
    type Output = ResourceDelta;
    fn add(self, other: ResourceDelta) -> ResourceDelta {
        ResourceDelta {
            credits: self.credits.saturating_add(other.credits),
            minerals: self.minerals.saturating_add(other.minerals),
            fuel: self.fuel.saturating_add(other.fuel),
            food: self.food.saturating_add(other.food),
            energy: self.energy.saturating_add(other.energy),
        }
    }
}

impl AddAssign for ResourceDelta {
    fn add_assign(&mut self, other: ResourceDelta) {
        *self = *self + other;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_rejects_overspend_without_mutation() {
        let mut ledger = ResourceLedger::new(3000, 500, 0, 0, 0);
        let cost = ResourceLedger::new(8000, 100, 0, 0, 0);

        let err = ledger.spend(&cost).unwrap_err();
        assert_eq!(err.resource, Resource::Credits);
        assert_eq!(err.to_string(), "Insufficient Credits. Need 8000 have 3000");
        assert_eq!(ledger, ResourceLedger::new(3000, 500, 0, 0, 0));
    }

    #[test]
    fn test_spend_and_deposit() {
        let mut ledger = ResourceLedger::new(10_000, 2000, 1000, 0, 0);
        ledger
            .spend(&ResourceLedger::new(8000, 2000, 1000, 0, 0))
            .unwrap();
        assert_eq!(ledger, ResourceLedger::credits(2000));

        ledger.deposit(&ResourceLedger::new(1, 2, 3, 4, 5));
        assert_eq!(ledger, ResourceLedger::new(2001, 2, 3, 4, 5));
    }

    #[test]
    fn test_apply_delta_is_atomic() {
        let mut ledger = ResourceLedger::new(100, 100, 5, 0, 0);
        let delta = ResourceDelta {
            credits: -50,
            fuel: -10,
            ..Default::default()
        };

        let err = ledger.apply(&delta).unwrap_err();
        assert_eq!(err.resource, Resource::Fuel);
        assert_eq!(ledger.credits, 100, "credits must not be touched");

        let ok = ResourceDelta {
            credits: -50,
            food: 20,
            ..Default::default()
        };
        ledger.apply(&ok).unwrap();
        assert_eq!(ledger, ResourceLedger::new(50, 100, 5, 20, 0));
    }

    #[test]
    fn test_scaled_floors() {
        let cost = ResourceLedger::new(8001, 2000, 1001, 0, 0);
        assert_eq!(
            cost.scaled(Fixed::HALF),
            ResourceLedger::new(4000, 1000, 500, 0, 0)
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn ledger() -> impl Strategy<Value = ResourceLedger> {
            (0..50_000u64, 0..50_000u64, 0..50_000u64, 0..50_000u64, 0..50_000u64)
                .prop_map(|(c, m, f, fo, e)| ResourceLedger::new(c, m, f, fo, e))
        }

        proptest! {
            /// Spending either succeeds exactly or leaves the ledger untouched
            #[test]
            fn spend_never_goes_negative(start in ledger(), cost in ledger()) {
                let mut l = start;
                match l.spend(&cost) {
                    Ok(()) => {
                        for r in Resource::ALL {
                            prop_assert_eq!(l.get(r), start.get(r) - cost.get(r));
                        }
                    }
                    Err(_) => prop_assert_eq!(l, start),
                }
            }

            #[test]
            fn negated_delta_round_trips(start in ledger(), amount in ledger()) {
                let mut l = start;
                let delta = ResourceDelta::from(amount);
                l.apply(&delta).unwrap();
                l.apply(&delta.negated()).unwrap();
                prop_assert_eq!(l, start);
            }
        }
    }
}
