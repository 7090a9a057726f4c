//! Activities (what a side submits each turn) and the actions they turn
//! into once attempted.

use serde::{Deserialize, Serialize};

use crate::offer::Offer;
use crate::vocabulary::{CombatState, Negotiation, Objective};

/// Which plunder to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlunderOrder {
    /// Take up to `quantity` of the item at `index` in the remaining list.
    Take { index: usize, quantity: u32 },
    /// Take everything that fits, most valuable per ton first.
    Raid,
}

/// Loose objective details, for callers that assemble an activity from
/// separately chosen parts (a UI, a script). See [`Activity::from_parts`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Details {
    None,
    Plunder(PlunderOrder),
    Offer(Offer),
}

/// An objective together with the data that objective needs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "objective", content = "details", rename_all = "snake_case")]
pub enum Activity {
    #[default]
    Null,
    Pending,
    Attack,
    Defend,
    Plunder(PlunderOrder),
    SelfDestruct,
    Negotiate(Offer),
    Reject,
    Resolve(Offer),
    Capture,
    Leave,
    Destroy,
}

impl Activity {
    #[must_use]
    pub const fn take(index: usize, quantity: u32) -> Self {
        Self::Plunder(PlunderOrder::Take { index, quantity })
    }

    #[must_use]
    pub const fn raid() -> Self {
        Self::Plunder(PlunderOrder::Raid)
    }

    /// Pair an objective with details, or `None` if the details do not
    /// fit the objective.
    #[must_use]
    pub fn from_parts(objective: Objective, details: Details) -> Option<Self> {
        let activity = match (objective, details) {
            (Objective::Plunder, Details::Plunder(order)) => Self::Plunder(order),
            (Objective::Negotiate, Details::Offer(offer)) => Self::Negotiate(offer),
            (Objective::Resolve, Details::Offer(offer)) => Self::Resolve(offer),
            (
                Objective::Plunder | Objective::Negotiate | Objective::Resolve,
                Details::None | Details::Plunder(_) | Details::Offer(_),
            ) => return None,
            (_, Details::Plunder(_) | Details::Offer(_)) => return None,
            (Objective::Null, Details::None) => Self::Null,
            (Objective::Pending, Details::None) => Self::Pending,
            (Objective::Attack, Details::None) => Self::Attack,
            (Objective::Defend, Details::None) => Self::Defend,
            (Objective::SelfDestruct, Details::None) => Self::SelfDestruct,
            (Objective::Reject, Details::None) => Self::Reject,
            (Objective::Capture, Details::None) => Self::Capture,
            (Objective::Leave, Details::None) => Self::Leave,
            (Objective::Destroy, Details::None) => Self::Destroy,
        };
        Some(activity)
    }

    #[must_use]
    pub const fn objective(&self) -> Objective {
        match self {
            Self::Null => Objective::Null,
            Self::Pending => Objective::Pending,
            Self::Attack => Objective::Attack,
            Self::Defend => Objective::Defend,
            Self::Plunder(_) => Objective::Plunder,
            Self::SelfDestruct => Objective::SelfDestruct,
            Self::Negotiate(_) => Objective::Negotiate,
            Self::Reject => Objective::Reject,
            Self::Resolve(_) => Objective::Resolve,
            Self::Capture => Objective::Capture,
            Self::Leave => Objective::Leave,
            Self::Destroy => Objective::Destroy,
        }
    }

    #[must_use]
    pub const fn offer(&self) -> Option<&Offer> {
        match self {
            Self::Negotiate(offer) | Self::Resolve(offer) => Some(offer),
            _ => None,
        }
    }

    #[must_use]
    pub const fn plunder_order(&self) -> Option<PlunderOrder> {
        match self {
            Self::Plunder(order) => Some(*order),
            _ => None,
        }
    }

    #[must_use]
    pub fn details(&self) -> Details {
        match self {
            Self::Plunder(order) => Details::Plunder(*order),
            Self::Negotiate(offer) | Self::Resolve(offer) => Details::Offer(offer.clone()),
            _ => Details::None,
        }
    }
}

/// The consequences an attempted action has on the turn in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub state: CombatState,
    pub negotiation: Negotiation,
    /// The objective whose power this side rolls casualties with. For a
    /// failed action this is still the intended objective.
    pub casualty_objective: Objective,
    pub casualty_rolls: u32,
}

/// An attempted activity: what was intended, what actually happened and
/// what it did to the combat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub intent: Activity,
    pub actual: Activity,
    pub effect: Effect,
}

impl Action {
    /// An action that has not been attempted yet.
    #[must_use]
    pub fn pending(intent: Activity, state: CombatState, negotiation: Negotiation) -> Self {
        let casualty_objective = intent.objective();
        Self {
            intent,
            actual: Activity::Pending,
            effect: Effect {
                state,
                negotiation,
                casualty_objective,
                casualty_rolls: 0,
            },
        }
    }

    #[must_use]
    pub const fn succeeded(&self) -> bool {
        !matches!(self.actual, Activity::Null | Activity::Pending)
    }
}
