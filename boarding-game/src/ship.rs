//! The ship and government contract the combat engine consumes, plus a
//! plain in-memory ship used by tests and the tester CLI.

use serde::{Deserialize, Serialize};

use crate::numbers::u32_to_i32;
use crate::plunder::{PlunderItem, PlunderKind};
use crate::vocabulary::{AttackStrategy, BoardingGoal, DefenseStrategy};

/// Faction data a combatant inherits from its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Government {
    pub name: String,
    #[serde(default = "Government::default_crew_attack")]
    pub crew_attack: f64,
    #[serde(default = "Government::default_crew_defense")]
    pub crew_defense: f64,
    #[serde(default)]
    pub attack_strategy: AttackStrategy,
    #[serde(default)]
    pub defense_strategy: DefenseStrategy,
    /// Governments without a language can be understood by anyone.
    #[serde(default)]
    pub language: Option<String>,
}

impl Government {
    const fn default_crew_attack() -> f64 {
        1.0
    }

    const fn default_crew_defense() -> f64 {
        2.0
    }

    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            crew_attack: Self::default_crew_attack(),
            crew_defense: Self::default_crew_defense(),
            attack_strategy: AttackStrategy::default(),
            defense_strategy: DefenseStrategy::default(),
            language: None,
        }
    }

    #[must_use]
    pub const fn with_strategies(mut self, attack: AttackStrategy, defense: DefenseStrategy) -> Self {
        self.attack_strategy = attack;
        self.defense_strategy = defense;
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub fn shares_language(&self, other: &Self) -> bool {
        match (&self.language, &other.language) {
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => true,
        }
    }
}

impl Default for Government {
    fn default() -> Self {
        Self::new("Independent")
    }
}

/// Boarding-relevant ship attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipAttributes {
    pub category: String,
    pub automated_invaders: u32,
    pub automated_defenders: u32,
    /// Chance that a won self-destruct attempt actually detonates.
    pub self_destruct: f64,
    pub base_capture_attack: f64,
    pub base_capture_defense: f64,
}

/// A stack of identical installed outfits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitStack {
    pub name: String,
    pub count: u32,
    #[serde(default)]
    pub boarding_attack: f64,
    #[serde(default)]
    pub boarding_defense: f64,
    #[serde(default)]
    pub cost: i64,
    #[serde(default = "OutfitStack::default_mass")]
    pub mass: f64,
    /// Installed deep in the hull: only reachable after conquest.
    #[serde(default)]
    pub protected: bool,
}

impl OutfitStack {
    const fn default_mass() -> f64 {
        1.0
    }

    #[must_use]
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
            boarding_attack: 0.0,
            boarding_defense: 0.0,
            cost: 0,
            mass: Self::default_mass(),
            protected: false,
        }
    }

    #[must_use]
    pub const fn with_boarding(mut self, attack: f64, defense: f64) -> Self {
        self.boarding_attack = attack;
        self.boarding_defense = defense;
        self
    }

    #[must_use]
    pub const fn with_value(mut self, cost: i64, mass: f64, protected: bool) -> Self {
        self.cost = cost;
        self.mass = mass;
        self.protected = protected;
        self
    }
}

/// What the combat engine needs from a ship. The host game owns ship
/// storage; a combat borrows two ships for its duration and hands them
/// back when it is done.
pub trait Ship {
    fn name(&self) -> &str;
    fn government(&self) -> &Government;
    fn attributes(&self) -> &ShipAttributes;
    fn outfits(&self) -> &[OutfitStack];

    fn crew(&self) -> u32;
    fn required_crew(&self) -> u32;
    /// Adjust the crew count, never going below zero.
    fn add_crew(&mut self, delta: i32);

    fn cost(&self) -> i64;
    fn chassis_cost(&self) -> i64;
    fn cargo_free(&self) -> f64;

    /// Everything an enemy could carry off.
    fn plunder(&self) -> Vec<PlunderItem>;
    fn remove_plunder(&mut self, item: &PlunderItem, count: u32);
    fn stow_plunder(&mut self, item: &PlunderItem, count: u32);

    fn boarding_goal(&self) -> BoardingGoal;
    fn is_player_controlled(&self) -> bool;
    fn is_destroyed(&self) -> bool;
    fn destroy(&mut self);

    /// Destroy the ship from the inside; nobody aboard survives.
    fn self_destruct(&mut self) {
        self.destroy();
    }

    /// Hand this ship over to `captor`, which moves a prize crew aboard.
    fn was_captured(&mut self, captor: &mut Self)
    where
        Self: Sized;

    fn category(&self) -> &str {
        &self.attributes().category
    }

    fn extra_crew(&self) -> u32 {
        self.crew().saturating_sub(self.required_crew())
    }
}

/// A cargo hold entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoLot {
    pub name: String,
    #[serde(default = "CargoLot::default_kind")]
    pub kind: PlunderKind,
    pub count: u32,
    #[serde(default = "CargoLot::default_unit_mass")]
    pub unit_mass: f64,
    #[serde(default)]
    pub unit_value: i64,
}

impl CargoLot {
    const fn default_kind() -> PlunderKind {
        PlunderKind::Commodity
    }

    const fn default_unit_mass() -> f64 {
        1.0
    }

    #[must_use]
    pub fn commodity(name: impl Into<String>, tons: u32, unit_value: i64) -> Self {
        Self {
            name: name.into(),
            kind: PlunderKind::Commodity,
            count: tons,
            unit_mass: 1.0,
            unit_value,
        }
    }
}

/// Plain serializable ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipRecord {
    pub name: String,
    #[serde(default)]
    pub government: Government,
    #[serde(default)]
    pub attributes: ShipAttributes,
    pub crew: u32,
    #[serde(default)]
    pub required_crew: u32,
    #[serde(default)]
    pub outfits: Vec<OutfitStack>,
    #[serde(default)]
    pub cargo: Vec<CargoLot>,
    #[serde(default)]
    pub cargo_capacity: f64,
    #[serde(default)]
    pub cost: i64,
    #[serde(default)]
    pub chassis_cost: i64,
    #[serde(default)]
    pub goal: BoardingGoal,
    #[serde(default)]
    pub player: bool,
    #[serde(default)]
    pub destroyed: bool,
    #[serde(default)]
    pub self_destructed: bool,
    #[serde(default)]
    pub captured_by: Option<String>,
}

impl ShipRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, government: Government, crew: u32) -> Self {
        Self {
            name: name.into(),
            government,
            attributes: ShipAttributes::default(),
            crew,
            required_crew: 1,
            outfits: Vec::new(),
            cargo: Vec::new(),
            cargo_capacity: 0.0,
            cost: 0,
            chassis_cost: 0,
            goal: BoardingGoal::default(),
            player: false,
            destroyed: false,
            self_destructed: false,
            captured_by: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.attributes.category = category.into();
        self
    }

    #[must_use]
    pub const fn with_required_crew(mut self, required: u32) -> Self {
        self.required_crew = required;
        self
    }

    #[must_use]
    pub const fn with_automation(mut self, invaders: u32, defenders: u32) -> Self {
        self.attributes.automated_invaders = invaders;
        self.attributes.automated_defenders = defenders;
        self
    }

    #[must_use]
    pub const fn with_self_destruct(mut self, chance: f64) -> Self {
        self.attributes.self_destruct = chance;
        self
    }

    #[must_use]
    pub fn with_outfit(mut self, outfit: OutfitStack) -> Self {
        self.outfits.push(outfit);
        self
    }

    #[must_use]
    pub fn with_cargo(mut self, lot: CargoLot) -> Self {
        self.cargo.push(lot);
        self
    }

    #[must_use]
    pub const fn with_cargo_capacity(mut self, tons: f64) -> Self {
        self.cargo_capacity = tons;
        self
    }

    #[must_use]
    pub const fn with_cost(mut self, cost: i64, chassis_cost: i64) -> Self {
        self.cost = cost;
        self.chassis_cost = chassis_cost;
        self
    }

    #[must_use]
    pub const fn with_goal(mut self, goal: BoardingGoal) -> Self {
        self.goal = goal;
        self
    }

    #[must_use]
    pub const fn player_controlled(mut self) -> Self {
        self.player = true;
        self
    }

    fn cargo_used(&self) -> f64 {
        self.cargo
            .iter()
            .map(|lot| lot.unit_mass * f64::from(lot.count))
            .sum()
    }
}

impl Ship for ShipRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn government(&self) -> &Government {
        &self.government
    }

    fn attributes(&self) -> &ShipAttributes {
        &self.attributes
    }

    fn outfits(&self) -> &[OutfitStack] {
        &self.outfits
    }

    fn crew(&self) -> u32 {
        self.crew
    }

    fn required_crew(&self) -> u32 {
        self.required_crew
    }

    fn add_crew(&mut self, delta: i32) {
        self.crew = self.crew.saturating_add_signed(delta);
    }

    fn cost(&self) -> i64 {
        self.cost
    }

    fn chassis_cost(&self) -> i64 {
        self.chassis_cost
    }

    fn cargo_free(&self) -> f64 {
        (self.cargo_capacity - self.cargo_used()).max(0.0)
    }

    fn plunder(&self) -> Vec<PlunderItem> {
        let cargo = self.cargo.iter().map(|lot| PlunderItem {
            name: lot.name.clone(),
            kind: lot.kind,
            count: lot.count,
            unit_value: lot.unit_value,
            unit_mass: lot.unit_mass,
            protected: false,
        });
        let outfits = self.outfits.iter().map(|outfit| {
            PlunderItem::outfit(
                outfit.name.clone(),
                outfit.count,
                outfit.cost,
                outfit.mass,
                outfit.protected,
            )
        });
        cargo.chain(outfits).collect()
    }

    fn remove_plunder(&mut self, item: &PlunderItem, count: u32) {
        let from_cargo = self
            .cargo
            .iter_mut()
            .find(|lot| lot.name == item.name && lot.kind == item.kind);
        if let Some(lot) = from_cargo {
            lot.count = lot.count.saturating_sub(count);
        } else if let Some(outfit) = self
            .outfits
            .iter_mut()
            .find(|outfit| outfit.name == item.name)
        {
            outfit.count = outfit.count.saturating_sub(count);
        }
        self.cargo.retain(|lot| lot.count > 0);
        self.outfits.retain(|outfit| outfit.count > 0);
    }

    fn stow_plunder(&mut self, item: &PlunderItem, count: u32) {
        if let Some(lot) = self
            .cargo
            .iter_mut()
            .find(|lot| lot.name == item.name && lot.kind == item.kind)
        {
            lot.count = lot.count.saturating_add(count);
            return;
        }
        self.cargo.push(CargoLot {
            name: item.name.clone(),
            kind: item.kind,
            count,
            unit_mass: item.unit_mass,
            unit_value: item.unit_value,
        });
    }

    fn boarding_goal(&self) -> BoardingGoal {
        self.goal
    }

    fn is_player_controlled(&self) -> bool {
        self.player
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.crew = 0;
    }

    fn self_destruct(&mut self) {
        self.self_destructed = true;
        self.destroy();
    }

    fn was_captured(&mut self, captor: &mut Self) {
        let prize_crew = self
            .required_crew
            .max(1)
            .min(captor.crew.saturating_sub(1));
        captor.add_crew(-u32_to_i32(prize_crew));
        self.add_crew(u32_to_i32(prize_crew));
        self.government = captor.government.clone();
        self.player = captor.player;
        self.captured_by = Some(captor.name.clone());
    }
}
