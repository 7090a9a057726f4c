//! Plunder items and the take/raid session a boarder works through.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

use crate::numbers::{floor_f64_to_u32, i64_to_f64};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlunderKind {
    Commodity,
    Outfit,
}

/// One kind of loot aboard a ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlunderItem {
    pub name: String,
    pub kind: PlunderKind,
    pub count: u32,
    pub unit_value: i64,
    #[serde(default = "PlunderItem::default_unit_mass")]
    pub unit_mass: f64,
    /// Protected items can only be reached once the ship is conquered.
    #[serde(default)]
    pub protected: bool,
}

impl PlunderItem {
    const fn default_unit_mass() -> f64 {
        1.0
    }

    #[must_use]
    pub fn commodity(name: impl Into<String>, tons: u32, unit_value: i64) -> Self {
        Self {
            name: name.into(),
            kind: PlunderKind::Commodity,
            count: tons,
            unit_value,
            unit_mass: 1.0,
            protected: false,
        }
    }

    #[must_use]
    pub fn outfit(
        name: impl Into<String>,
        count: u32,
        unit_value: i64,
        unit_mass: f64,
        protected: bool,
    ) -> Self {
        Self {
            name: name.into(),
            kind: PlunderKind::Outfit,
            count,
            unit_value,
            unit_mass,
            protected,
        }
    }

    #[must_use]
    pub fn total_value(&self) -> i64 {
        self.unit_value.saturating_mul(i64::from(self.count))
    }

    /// Credits per ton; massless items rank first.
    #[must_use]
    pub fn value_per_ton(&self) -> f64 {
        if self.unit_mass <= 0.0 {
            return f64::INFINITY;
        }
        i64_to_f64(self.unit_value) / self.unit_mass
    }

    /// How many units fit into `cargo_free` tons, capped at what is left.
    #[must_use]
    pub fn units_that_fit(&self, cargo_free: f64) -> u32 {
        if self.unit_mass <= 0.0 {
            return self.count;
        }
        floor_f64_to_u32(cargo_free / self.unit_mass).min(self.count)
    }

    #[must_use]
    pub const fn is_reachable(&self, conquered: bool) -> bool {
        conquered || !self.protected
    }

    fn with_count(&self, count: u32) -> Self {
        Self {
            count,
            ..self.clone()
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlunderError {
    #[error("plunder index {index} is out of range ({len} items remain)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("{name} is protected until the ship is conquered")]
    Protected { name: String },
    #[error("a plunder quantity of zero takes nothing")]
    ZeroQuantity,
}

/// Running totals of everything taken in a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlunderTotals {
    pub commodity_mass: f64,
    pub mass: f64,
    pub outfits: u32,
    pub value: i64,
}

/// The loot one combatant can take from its enemy, best value per ton
/// first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlunderSession {
    remaining: Vec<PlunderItem>,
    taken: Vec<PlunderItem>,
    totals: PlunderTotals,
}

impl PlunderSession {
    #[must_use]
    pub fn new(items: Vec<PlunderItem>) -> Self {
        let mut remaining: Vec<PlunderItem> =
            items.into_iter().filter(|item| item.count > 0).collect();
        remaining.sort_by(|a, b| {
            b.value_per_ton()
                .partial_cmp(&a.value_per_ton())
                .unwrap_or(Ordering::Equal)
        });
        Self {
            remaining,
            taken: Vec::new(),
            totals: PlunderTotals::default(),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> &[PlunderItem] {
        &self.remaining
    }

    #[must_use]
    pub fn taken(&self) -> &[PlunderItem] {
        &self.taken
    }

    #[must_use]
    pub const fn totals(&self) -> PlunderTotals {
        self.totals
    }

    /// Nothing at all is left aboard.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Nothing reachable fits into the hold any more.
    #[must_use]
    pub fn is_finished(&self, conquered: bool, cargo_free: f64) -> bool {
        !self
            .remaining
            .iter()
            .any(|item| item.is_reachable(conquered) && item.units_that_fit(cargo_free) > 0)
    }

    /// Check that a take order names a reachable item.
    ///
    /// # Errors
    ///
    /// Returns a [`PlunderError`] describing why the order cannot be carried out.
    pub fn check_take(
        &self,
        index: usize,
        quantity: u32,
        conquered: bool,
    ) -> Result<&PlunderItem, PlunderError> {
        if quantity == 0 {
            return Err(PlunderError::ZeroQuantity);
        }
        let item = self
            .remaining
            .get(index)
            .ok_or(PlunderError::IndexOutOfRange {
                index,
                len: self.remaining.len(),
            })?;
        if !item.is_reachable(conquered) {
            return Err(PlunderError::Protected {
                name: item.name.clone(),
            });
        }
        Ok(item)
    }

    /// Take up to `quantity` of one item, limited by the hold. Returns
    /// the lot taken, which may hold zero units if nothing fit.
    ///
    /// # Errors
    ///
    /// Returns a [`PlunderError`] if the order is invalid.
    pub fn take(
        &mut self,
        index: usize,
        quantity: u32,
        conquered: bool,
        cargo_free: f64,
    ) -> Result<PlunderItem, PlunderError> {
        let units = self
            .check_take(index, quantity, conquered)?
            .units_that_fit(cargo_free)
            .min(quantity);
        Ok(self.remove_units(index, units))
    }

    /// Take everything reachable that fits, most valuable per ton first.
    pub fn raid(&mut self, conquered: bool, cargo_free: f64) -> Vec<PlunderItem> {
        let mut space = cargo_free;
        let mut lots = Vec::new();
        let mut index = 0;
        while index < self.remaining.len() {
            let item = &self.remaining[index];
            let units = if item.is_reachable(conquered) {
                item.units_that_fit(space)
            } else {
                0
            };
            if units == 0 {
                index += 1;
                continue;
            }
            let emptied = units == item.count;
            let lot = self.remove_units(index, units);
            space -= lot.unit_mass * f64::from(lot.count);
            lots.push(lot);
            if !emptied {
                index += 1;
            }
        }
        lots
    }

    /// Value a raid would yield right now, without taking anything.
    #[must_use]
    pub fn expected_total_raid_value(&self, conquered: bool, cargo_free: f64) -> i64 {
        let mut space = cargo_free;
        let mut value = 0_i64;
        for item in self.remaining.iter().filter(|item| item.is_reachable(conquered)) {
            let units = item.units_that_fit(space);
            if units == 0 {
                continue;
            }
            space -= item.unit_mass * f64::from(units);
            value = value.saturating_add(item.unit_value.saturating_mul(i64::from(units)));
        }
        value
    }

    /// Total value of protected items still aboard.
    #[must_use]
    pub fn protected_value(&self) -> i64 {
        self.remaining
            .iter()
            .filter(|item| item.protected)
            .map(PlunderItem::total_value)
            .sum()
    }

    fn remove_units(&mut self, index: usize, units: u32) -> PlunderItem {
        let lot = self.remaining[index].with_count(units);
        if units == 0 {
            return lot;
        }
        self.remaining[index].count -= units;
        if self.remaining[index].count == 0 {
            self.remaining.remove(index);
        }

        let mass = lot.unit_mass * f64::from(units);
        self.totals.mass += mass;
        match lot.kind {
            PlunderKind::Commodity => self.totals.commodity_mass += mass,
            PlunderKind::Outfit => self.totals.outfits += units,
        }
        self.totals.value = self.totals.value.saturating_add(lot.total_value());
        self.taken.push(lot.clone());
        lot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cargo() -> Vec<PlunderItem> {
        vec![
            PlunderItem::commodity("Food", 10, 100),
            PlunderItem::outfit("Laser Rifle", 2, 9_000, 1.0, false),
            PlunderItem::outfit("Hyperdrive", 1, 50_000, 20.0, true),
            PlunderItem::commodity("Empty", 0, 5),
        ]
    }

    #[test]
    fn session_orders_by_value_per_ton_and_drops_empty_lots() {
        let session = PlunderSession::new(cargo());
        let names: Vec<_> = session.remaining().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Laser Rifle", "Hyperdrive", "Food"]);
    }

    #[test]
    fn take_is_limited_by_cargo_space() {
        let mut session = PlunderSession::new(cargo());
        let food = session.remaining().len() - 1;
        let lot = session.take(food, 10, false, 4.0).unwrap();
        assert_eq!(lot.count, 4);
        assert_eq!(session.remaining()[food].count, 6);
        assert_eq!(session.totals().value, 400);
        assert!((session.totals().commodity_mass - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn protected_items_require_conquest() {
        let mut session = PlunderSession::new(cargo());
        assert_eq!(
            session.take(1, 1, false, 100.0),
            Err(PlunderError::Protected {
                name: "Hyperdrive".to_string()
            })
        );
        assert!(session.take(1, 1, true, 100.0).is_ok());
        assert_eq!(session.take(0, 0, true, 100.0), Err(PlunderError::ZeroQuantity));
        assert!(matches!(
            session.take(9, 1, true, 100.0),
            Err(PlunderError::IndexOutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn raid_takes_everything_reachable_that_fits() {
        let mut session = PlunderSession::new(cargo());
        assert_eq!(session.expected_total_raid_value(false, 100.0), 19_000);
        let lots = session.raid(false, 100.0);
        assert_eq!(lots.len(), 2);
        assert_eq!(session.remaining().len(), 1);
        assert!(!session.is_exhausted());
        assert!(session.is_finished(false, 100.0));
        assert!(!session.is_finished(true, 100.0));

        session.raid(true, 100.0);
        assert!(session.is_exhausted());
        assert_eq!(session.totals().value, 69_000);
        assert_eq!(session.totals().outfits, 3);
    }

    #[test]
    fn raid_value_respects_a_full_hold() {
        let session = PlunderSession::new(cargo());
        assert_eq!(session.expected_total_raid_value(true, 0.0), 0);
        assert!(session.is_finished(true, 0.0));
        assert_eq!(session.protected_value(), 50_000);
    }
}
