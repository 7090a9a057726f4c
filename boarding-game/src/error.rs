//! Errors a boarding session reports to its caller.

use thiserror::Error;

use crate::vocabulary::{CombatState, Objective, Side};

/// Misuse of a [`BoardingCombat`](crate::combat::BoardingCombat). None of
/// these arise from bad luck; each one means the caller asked for something
/// the current turn does not allow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardingError {
    #[error("{side} cannot {objective} while the combat is {state}")]
    InvalidObjective {
        side: Side,
        objective: Objective,
        state: CombatState,
    },
    #[error("{side} supplied details that do not fit a {objective} order")]
    InvalidDetails { side: Side, objective: Objective },
    #[error("{side} has no resolution for {objective}")]
    UnresolvableObjective { side: Side, objective: Objective },
    #[error("neither combatant is player controlled")]
    NoPlayerCombatant,
    #[error("the combat is over ({state})")]
    CombatOver { state: CombatState },
    #[error("combat did not finish within {turns} automatic turns")]
    Stalemate { turns: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_side() {
        let err = BoardingError::InvalidObjective {
            side: Side::Target,
            objective: Objective::Plunder,
            state: CombatState::Poised,
        };
        assert_eq!(err.to_string(), "target cannot plunder while the combat is poised");
        assert_eq!(
            BoardingError::Stalemate { turns: 12 }.to_string(),
            "combat did not finish within 12 automatic turns"
        );
    }
}
