//! Shared boarding vocabulary: sides, combat states, negotiation status,
//! objectives and the strategies combatants follow.
//!
//! Everything here is plain data plus exhaustive predicates. The state
//! machine, the odds engine and the AI all read these rules, so a new
//! variant fails to compile until every rule accounts for it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// Which of the two combatants a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Boarder,
    Target,
}

impl Side {
    pub const BOTH: [Self; 2] = [Self::Boarder, Self::Target];

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Boarder => Self::Target,
            Self::Target => Self::Boarder,
        }
    }

    #[must_use]
    pub const fn is_boarder(self) -> bool {
        matches!(self, Self::Boarder)
    }

    /// The state in which this side has crew aboard the enemy ship.
    #[must_use]
    pub const fn invading_state(self) -> CombatState {
        match self {
            Self::Boarder => CombatState::BoarderInvading,
            Self::Target => CombatState::TargetInvading,
        }
    }

    /// The state in which this side has conquered the enemy ship.
    #[must_use]
    pub const fn victory_state(self) -> CombatState {
        match self {
            Self::Boarder => CombatState::BoarderVictory,
            Self::Target => CombatState::TargetVictory,
        }
    }

    #[must_use]
    pub const fn rejected_status(self) -> Negotiation {
        match self {
            Self::Boarder => Negotiation::BoarderRejected,
            Self::Target => Negotiation::TargetRejected,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boarder => "boarder",
            Self::Target => "target",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pair of values, one per side. Combatants, intents and casualty
/// counts all live in one of these instead of in loose boarder/target
/// variables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sides<T> {
    pub boarder: T,
    pub target: T,
}

impl<T> Sides<T> {
    pub const fn new(boarder: T, target: T) -> Self {
        Self { boarder, target }
    }

    pub fn from_fn(mut f: impl FnMut(Side) -> T) -> Self {
        Self {
            boarder: f(Side::Boarder),
            target: f(Side::Target),
        }
    }

    pub const fn get(&self, side: Side) -> &T {
        match side {
            Side::Boarder => &self.boarder,
            Side::Target => &self.target,
        }
    }

    pub const fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Boarder => &mut self.boarder,
            Side::Target => &mut self.target,
        }
    }

    /// Borrow the value for `side` and its opponent mutably at once.
    pub const fn pair_mut(&mut self, side: Side) -> (&mut T, &mut T) {
        match side {
            Side::Boarder => (&mut self.boarder, &mut self.target),
            Side::Target => (&mut self.target, &mut self.boarder),
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(Side, T) -> U) -> Sides<U> {
        Sides {
            boarder: f(Side::Boarder, self.boarder),
            target: f(Side::Target, self.target),
        }
    }

    pub const fn as_ref(&self) -> Sides<&T> {
        Sides {
            boarder: &self.boarder,
            target: &self.target,
        }
    }
}

impl<T: Clone> Sides<T> {
    pub fn splat(value: T) -> Self {
        Self {
            boarder: value.clone(),
            target: value,
        }
    }
}

impl<T> Index<Side> for Sides<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        self.get(side)
    }
}

impl<T> IndexMut<Side> for Sides<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        self.get_mut(side)
    }
}

/// The overall state of a boarding combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatState {
    /// The boarder has matched velocity but nobody has crossed over.
    #[default]
    Isolated,
    /// Both crews are facing each other at the airlock.
    Poised,
    /// The crews are disengaging.
    Withdrawing,
    BoarderInvading,
    TargetInvading,
    BoarderVictory,
    TargetVictory,
    Ended,
}

impl CombatState {
    #[must_use]
    pub const fn is_ended(self) -> bool {
        matches!(self, Self::Ended)
    }

    /// Victory states can only progress to `Ended`; `Ended` never changes.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::BoarderVictory | Self::TargetVictory | Self::Ended)
    }

    #[must_use]
    pub const fn victor(self) -> Option<Side> {
        match self {
            Self::BoarderVictory => Some(Side::Boarder),
            Self::TargetVictory => Some(Side::Target),
            _ => None,
        }
    }

    /// Whether crew can be lost while the combat is in this state.
    #[must_use]
    pub const fn prevents_casualties(self) -> bool {
        match self {
            Self::Isolated
            | Self::Withdrawing
            | Self::BoarderVictory
            | Self::TargetVictory
            | Self::Ended => true,
            Self::Poised | Self::BoarderInvading | Self::TargetInvading => false,
        }
    }

    /// States in which either side may open talks.
    #[must_use]
    pub const fn allows_negotiation(self) -> bool {
        match self {
            Self::Isolated
            | Self::Poised
            | Self::Withdrawing
            | Self::BoarderInvading
            | Self::TargetInvading => true,
            Self::BoarderVictory | Self::TargetVictory | Self::Ended => false,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Isolated => "isolated",
            Self::Poised => "poised",
            Self::Withdrawing => "withdrawing",
            Self::BoarderInvading => "boarder_invading",
            Self::TargetInvading => "target_invading",
            Self::BoarderVictory => "boarder_victory",
            Self::TargetVictory => "target_victory",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for CombatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of settlement talks between the two combatants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Negotiation {
    #[default]
    NotAttempted,
    BoarderRejected,
    TargetRejected,
    Active,
    Successful,
    Failed,
}

impl Negotiation {
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    #[must_use]
    pub const fn prevents_casualties(self) -> bool {
        match self {
            Self::Active => true,
            Self::NotAttempted
            | Self::BoarderRejected
            | Self::TargetRejected
            | Self::Successful
            | Self::Failed => false,
        }
    }

    /// Whether `side` may open a fresh round of talks. A side that
    /// rejected the last round may try again; the side that was rejected
    /// may not.
    #[must_use]
    pub const fn allows_new_talks(self, side: Side) -> bool {
        match self {
            Self::NotAttempted => true,
            Self::BoarderRejected => side.is_boarder(),
            Self::TargetRejected => !side.is_boarder(),
            Self::Active | Self::Successful | Self::Failed => false,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotAttempted => "not_attempted",
            Self::BoarderRejected => "boarder_rejected",
            Self::TargetRejected => "target_rejected",
            Self::Active => "active",
            Self::Successful => "successful",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for Negotiation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a combatant is trying to achieve with its action this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Do nothing. Also the actual objective of any action that failed.
    Null,
    /// Placeholder for an action that has not been decided yet.
    Pending,
    Attack,
    Defend,
    Plunder,
    SelfDestruct,
    Negotiate,
    Reject,
    Resolve,
    Capture,
    Leave,
    Destroy,
}

impl Objective {
    pub const ALL: [Self; 12] = [
        Self::Null,
        Self::Pending,
        Self::Attack,
        Self::Defend,
        Self::Plunder,
        Self::SelfDestruct,
        Self::Negotiate,
        Self::Reject,
        Self::Resolve,
        Self::Capture,
        Self::Leave,
        Self::Destroy,
    ];

    /// Objectives that never cost lives on their own.
    #[must_use]
    pub const fn prevents_casualties(self) -> bool {
        match self {
            Self::Null
            | Self::Pending
            | Self::Plunder
            | Self::Negotiate
            | Self::Reject
            | Self::Resolve
            | Self::Capture
            | Self::Leave => true,
            Self::Attack | Self::Defend | Self::SelfDestruct | Self::Destroy => false,
        }
    }

    /// Defensive objectives are carried out by the defenders at home and
    /// use defense power; the rest are carried out by invaders.
    #[must_use]
    pub const fn is_defensive(self) -> bool {
        match self {
            Self::Defend | Self::SelfDestruct | Self::Negotiate | Self::Resolve | Self::Leave => {
                true
            }
            Self::Null
            | Self::Pending
            | Self::Attack
            | Self::Plunder
            | Self::Reject
            | Self::Capture
            | Self::Destroy => false,
        }
    }

    /// Objectives that end the combat when they succeed.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(
            self,
            Self::SelfDestruct | Self::Capture | Self::Destroy | Self::Leave
        )
    }

    /// Objectives that are only offered while talks are underway.
    #[must_use]
    pub const fn is_diplomatic(self) -> bool {
        matches!(self, Self::Negotiate | Self::Reject | Self::Resolve)
    }

    #[must_use]
    pub const fn bit(self) -> u16 {
        1 << (self as u16)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Pending => "pending",
            Self::Attack => "attack",
            Self::Defend => "defend",
            Self::Plunder => "plunder",
            Self::SelfDestruct => "self_destruct",
            Self::Negotiate => "negotiate",
            Self::Reject => "reject",
            Self::Resolve => "resolve",
            Self::Capture => "capture",
            Self::Leave => "leave",
            Self::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Objective {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|objective| objective.as_str() == s)
            .ok_or(())
    }
}

/// Whether `objective` may be chosen by `side` in the given situation.
///
/// `Null` is available outside active talks; while talks are open only
/// diplomacy is. `Pending` never is: it marks an undecided intent and has
/// no resolution.
#[must_use]
pub const fn is_objective_valid(
    objective: Objective,
    state: CombatState,
    negotiation: Negotiation,
    side: Side,
) -> bool {
    use CombatState as S;

    let boarder = side.is_boarder();
    if state.is_ended() {
        return matches!(objective, Objective::Null);
    }
    if negotiation.is_active() {
        return matches!(
            objective,
            Objective::Negotiate | Objective::Reject | Objective::Resolve
        );
    }
    let victorious = match state.victor() {
        Some(victor) => victor.is_boarder() == boarder,
        None => false,
    };

    match objective {
        Objective::Null => true,
        Objective::Pending | Objective::Reject | Objective::Resolve => false,
        Objective::Attack => matches!(
            state,
            S::Poised | S::Withdrawing | S::BoarderInvading | S::TargetInvading
        ) || (boarder && matches!(state, S::Isolated)),
        Objective::Defend => {
            matches!(
                state,
                S::Poised | S::Withdrawing | S::BoarderInvading | S::TargetInvading
            ) || (!boarder && matches!(state, S::Isolated))
        }
        Objective::SelfDestruct => match state {
            S::Poised => true,
            S::Isolated | S::BoarderInvading => !boarder,
            S::TargetInvading => boarder,
            S::Withdrawing | S::BoarderVictory | S::TargetVictory | S::Ended => false,
        },
        Objective::Plunder | Objective::Leave | Objective::Destroy => {
            (boarder && matches!(state, S::Isolated)) || victorious
        }
        Objective::Capture => victorious,
        Objective::Negotiate => state.allows_negotiation() && negotiation.allows_new_talks(side),
    }
}

/// Compact set of objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ObjectiveSet(u16);

impl ObjectiveSet {
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn contains(self, objective: Objective) -> bool {
        self.0 & objective.bit() != 0
    }

    pub const fn insert(&mut self, objective: Objective) {
        self.0 |= objective.bit();
    }

    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Objective> {
        Objective::ALL
            .into_iter()
            .filter(move |objective| self.contains(*objective))
    }
}

impl FromIterator<Objective> for ObjectiveSet {
    fn from_iter<I: IntoIterator<Item = Objective>>(iter: I) -> Self {
        let mut set = Self::empty();
        for objective in iter {
            set.insert(objective);
        }
        set
    }
}

impl Serialize for ObjectiveSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for ObjectiveSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let objectives = Vec::<Objective>::deserialize(deserializer)?;
        Ok(objectives.into_iter().collect())
    }
}

/// Every objective `side` may choose in the given situation.
#[must_use]
pub fn valid_objectives(state: CombatState, negotiation: Negotiation, side: Side) -> ObjectiveSet {
    Objective::ALL
        .into_iter()
        .filter(|objective| is_objective_valid(*objective, state, negotiation, side))
        .collect()
}

/// The side that acts first in a turn. The invaded side normally reacts
/// first; only a target that is itself invading gives way to the boarder.
#[must_use]
pub const fn first_actor(state: CombatState) -> Side {
    match state {
        CombatState::TargetInvading => Side::Boarder,
        _ => Side::Target,
    }
}

/// How willing a crew is to go on the offensive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackStrategy {
    /// Only attack when victory is near certain and nearly bloodless.
    #[default]
    Cautious,
    /// Attack when victory is near certain and the losses are affordable.
    Aggressive,
    /// Attack when victory is more likely than not.
    Reckless,
    /// Attack at any odds.
    Fanatical,
}

impl AttackStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cautious => "cautious",
            Self::Aggressive => "aggressive",
            Self::Reckless => "reckless",
            Self::Fanatical => "fanatical",
        }
    }
}

impl fmt::Display for AttackStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a crew responds to being boarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseStrategy {
    /// Hold the ship and only strike back when clearly stronger.
    #[default]
    Repel,
    /// Strike back whenever the exchange favours the defenders.
    Counter,
    /// Never let the enemy profit, even at the cost of the ship.
    Deny,
}

impl DefenseStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Repel => "repel",
            Self::Counter => "counter",
            Self::Deny => "deny",
        }
    }
}

impl fmt::Display for DefenseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a ship is boarding (or what it wants once it has won).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardingGoal {
    /// No standing orders; take whatever pays best.
    #[default]
    Opportunistic,
    Capture,
    Plunder,
    CaptureManually,
    PlunderManually,
}

impl BoardingGoal {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opportunistic => "opportunistic",
            Self::Capture => "capture",
            Self::Plunder => "plunder",
            Self::CaptureManually => "capture_manually",
            Self::PlunderManually => "plunder_manually",
        }
    }
}
