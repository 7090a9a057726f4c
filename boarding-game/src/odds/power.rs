use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::constants::{ATTACK_POWER_FLOOR, DEFENSE_POWER_FLOOR};
use crate::ship::Ship;

/// Whether crew members are fighting aboard the enemy or at home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Attack,
    Defense,
}

impl Role {
    #[must_use]
    pub const fn floor(self) -> f64 {
        match self {
            Self::Attack => ATTACK_POWER_FLOOR,
            Self::Defense => DEFENSE_POWER_FLOOR,
        }
    }

    /// Effective crew for this role: real crew plus the matching
    /// automated systems.
    #[must_use]
    pub fn effective_crew<S: Ship + ?Sized>(self, ship: &S) -> u32 {
        let automated = match self {
            Self::Attack => ship.attributes().automated_invaders,
            Self::Defense => ship.attributes().automated_defenders,
        };
        ship.crew().saturating_add(automated)
    }
}

/// Cumulative power of a ship's effective crew in one role. Entry `i`
/// holds the total power of the best `i + 1` members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerTable {
    role: Role,
    cumulative: Vec<f64>,
}

impl PowerTable {
    /// Build the table for `ship`'s current crew.
    ///
    /// Each outfit with a bonus for `role` can be wielded by one member;
    /// the strongest are handed out first and everyone else fights with
    /// the government's base crew power.
    #[must_use]
    pub fn for_ship<S: Ship + ?Sized>(ship: &S, role: Role) -> Self {
        let government = ship.government();
        let (base, hull_bonus) = match role {
            Role::Attack => (
                government.crew_attack,
                ship.attributes().base_capture_attack,
            ),
            Role::Defense => (
                government.crew_defense,
                ship.attributes().base_capture_defense,
            ),
        };
        let mut members: Vec<f64> = Vec::new();
        for outfit in ship.outfits() {
            let bonus = match role {
                Role::Attack => outfit.boarding_attack,
                Role::Defense => outfit.boarding_defense,
            };
            if bonus > 0.0 && outfit.count > 0 {
                members.extend(std::iter::repeat_n(bonus + base, outfit.count as usize));
            }
        }
        members.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
        members.resize(role.effective_crew(ship) as usize, base);
        Self::from_members(role, &members, hull_bonus)
    }

    /// Build a table from per-member power values, strongest first.
    /// `hull_bonus` is added to the first member.
    #[must_use]
    pub fn from_members(role: Role, members: &[f64], hull_bonus: f64) -> Self {
        let floor = role.floor();
        let mut cumulative = Vec::with_capacity(members.len());
        let mut total = 0.0;
        for (index, member) in members.iter().enumerate() {
            total += member;
            if index == 0 {
                total += hull_bonus;
            }
            total = total.max(floor);
            cumulative.push(total);
        }
        Self { role, cumulative }
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Number of members the table was built for.
    #[must_use]
    pub fn members(&self) -> u32 {
        u32::try_from(self.cumulative.len()).unwrap_or(u32::MAX)
    }

    /// Raw cumulative entries.
    #[must_use]
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Total power with `crew` members left. No members means the role
    /// floor; more members than the table knows about count as a full
    /// complement.
    #[must_use]
    pub fn at(&self, crew: u32) -> f64 {
        if crew == 0 {
            return self.role.floor();
        }
        let index = (crew as usize - 1).min(self.cumulative.len().saturating_sub(1));
        self.cumulative
            .get(index)
            .copied()
            .unwrap_or_else(|| self.role.floor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ship::{Government, OutfitStack, ShipRecord};

    #[test]
    fn best_outfits_are_wielded_first() {
        let ship = ShipRecord::new("Corsair", Government::new("Pirate"), 4)
            .with_outfit(OutfitStack::new("Pistol", 1).with_boarding(1.0, 0.0))
            .with_outfit(OutfitStack::new("Rifle", 2).with_boarding(3.0, 0.0));
        let table = PowerTable::for_ship(&ship, Role::Attack);
        assert_eq!(table.cumulative(), &[4.0, 8.0, 10.0, 11.0]);
        assert!((table.at(0) - 0.0).abs() < f64::EPSILON);
        assert!((table.at(2) - 8.0).abs() < f64::EPSILON);
        assert!((table.at(40) - 11.0).abs() < f64::EPSILON);
    }

    #[test]
    fn hull_bonus_and_automation_count() {
        let mut ship = ShipRecord::new("Bastion", Government::new("Navy"), 2).with_automation(0, 2);
        ship.attributes.base_capture_defense = 5.0;
        let table = PowerTable::for_ship(&ship, Role::Defense);
        assert_eq!(table.members(), 4);
        assert_eq!(table.cumulative(), &[7.0, 9.0, 11.0, 13.0]);
    }

    #[test]
    fn defense_never_drops_below_floor() {
        let mut government = Government::new("Pacifist");
        government.crew_defense = 0.0;
        let ship = ShipRecord::new("Tender", government, 0);
        let table = PowerTable::for_ship(&ship, Role::Defense);
        assert_eq!(table.members(), 0);
        assert!(table.at(0) > 0.0);
        assert!(table.at(3) > 0.0);

        let negative = PowerTable::from_members(Role::Attack, &[1.0, 1.0], -5.0);
        assert_eq!(negative.cumulative(), &[0.0, 1.0]);
    }
}
