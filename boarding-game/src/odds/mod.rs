//! Odds of conquest and expected casualties, precomputed when a combat
//! starts from each ship's crew, outfits and attributes.

pub mod capture;
pub mod power;
pub mod probability;

pub use capture::CaptureOdds;
pub use power::{PowerTable, Role};
pub use probability::{
    BoardingProbability, ForcePower, Forces, ProbabilityReport, Scenario, Strategy,
};

use serde::{Deserialize, Serialize};

use crate::ship::Ship;
use crate::vocabulary::{Side, Sides};

impl ForcePower {
    #[must_use]
    pub fn for_ship<S: Ship + ?Sized>(ship: &S) -> Self {
        Self {
            attack: PowerTable::for_ship(ship, Role::Attack),
            defense: PowerTable::for_ship(ship, Role::Defense),
            self_destruct: ship.attributes().self_destruct,
        }
    }
}

/// Every table a combat needs, built once from the opening crews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardingOdds {
    /// Each side's odds of conquering the other by invading it.
    pub invasion: Sides<CaptureOdds>,
    pub probability: BoardingProbability,
}

impl BoardingOdds {
    #[must_use]
    pub fn new(forces: &Sides<ForcePower>, self_destruct_multiplier: f64) -> Self {
        let invasion = Sides::from_fn(|side: Side| {
            CaptureOdds::new(
                forces[side].attack.clone(),
                forces[side.opponent()].defense.clone(),
            )
        });
        Self {
            invasion,
            probability: BoardingProbability::new(forces, self_destruct_multiplier),
        }
    }

    /// Build the tables for two ships as they are right now.
    #[must_use]
    pub fn for_ships<S: Ship>(boarder: &S, target: &S, self_destruct_multiplier: f64) -> Self {
        let forces = Sides::new(ForcePower::for_ship(boarder), ForcePower::for_ship(target));
        Self::new(&forces, self_destruct_multiplier)
    }
}
