use boarding_game::{
    Activity, BoardingCombat, BoardingRules, CargoLot, CombatState, Government, Objective, Ship,
    ShipRecord, Side, Sides,
};
use rand::{Error, RngCore};

/// Always draws the bottom of the range: every power contest goes to the
/// actor and every casualty roll goes against the target.
struct StubRng {
    value: u32,
}

impl RngCore for StubRng {
    fn next_u32(&mut self) -> u32 {
        self.value
    }

    fn next_u64(&mut self) -> u64 {
        u64::from(self.value)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

fn raider(crew: u32) -> ShipRecord {
    ShipRecord::new("Raider", Government::new("Pirate"), crew).with_cargo_capacity(50.0)
}

fn hauler(crew: u32) -> ShipRecord {
    ShipRecord::new("Hauler", Government::new("Merchant"), crew)
}

fn rigged(boarder: ShipRecord, target: ShipRecord) -> BoardingCombat<ShipRecord, StubRng> {
    BoardingCombat::with_rng(
        boarder,
        target,
        BoardingRules::default(),
        StubRng { value: 0 },
    )
}

#[test]
fn isolated_boarder_attacks_and_wins() {
    let mut combat = rigged(raider(5), hauler(1));
    assert_eq!(combat.combatant(Side::Boarder).invaders(), 5);
    assert_eq!(combat.combatant(Side::Target).defenders(), 1);
    let turn = combat
        .step_with(Sides::new(Activity::Attack, Activity::Defend))
        .unwrap();

    assert_eq!(turn.first, Side::Target);
    assert_eq!(turn.state_before, CombatState::Isolated);
    assert_eq!(turn.state, CombatState::BoarderVictory);
    assert_eq!(turn.casualties.target, 1);
    assert_eq!(turn.casualties.boarder, 0);
    assert_eq!(turn.report(Side::Target).crew, 0);
    assert_eq!(turn.report(Side::Boarder).crew, 5);
    assert!(turn.has_note("log.boarding.conquered"));
    assert!(turn.report(Side::Boarder).is_enemy_conquered);
    assert!(turn.report(Side::Target).is_conquered);
    assert!(turn.report(Side::Boarder).can(Objective::Capture));
    assert_eq!(
        turn.report(Side::Target).valid_objectives.iter().collect::<Vec<_>>(),
        vec![Objective::Null]
    );
}

#[test]
fn mutual_attack_in_poised_stays_poised() {
    let mut combat = rigged(raider(4), hauler(10));
    let turn = combat
        .step_with(Sides::new(Activity::Attack, Activity::Defend))
        .unwrap();
    assert_eq!(turn.state, CombatState::Poised);
    assert_eq!(turn.casualties.target, 1);

    let turn = combat
        .step_with(Sides::new(Activity::Attack, Activity::Attack))
        .unwrap();
    assert_eq!(turn.state, CombatState::Poised);
    assert_eq!(turn.first, Side::Target);
    // Target rolls floor(0.25 * 9) = 2 times, the boarder once.
    assert_eq!(turn.casualties.target, 3);
    assert_eq!(turn.results.target.enemy_casualties, 0);
    assert_eq!(turn.results.target.casualties, 2);
    assert_eq!(turn.results.boarder.enemy_casualties, 1);
    assert_eq!(combat.combatant(Side::Target).crew(), 6);
    assert_eq!(combat.combatant(Side::Boarder).crew(), 4);
}

#[test]
fn self_destruct_ends_the_combat() {
    let target = hauler(6).with_self_destruct(1.0);
    let mut combat = rigged(raider(10), target);
    let turn = combat
        .step_with(Sides::new(Activity::Attack, Activity::SelfDestruct))
        .unwrap();

    assert_eq!(turn.state, CombatState::Ended);
    assert_eq!(turn.actions.target.actual, Activity::SelfDestruct);
    assert_eq!(
        turn.actions.boarder.actual,
        Activity::Null,
        "the boarder had nothing left to attack"
    );
    assert_eq!(turn.casualties.target, 6);
    assert!(turn.has_note("log.boarding.self-destruct"));
    assert!(turn.has_note("log.boarding.action-voided"));

    let ships = combat.into_ships();
    assert!(ships.target.is_destroyed());
    assert_eq!(ships.target.crew(), 0);
    assert_eq!(ships.boarder.crew(), 10);
}

#[test]
fn plunder_exhaustion_destroys_the_target() {
    let target = hauler(3).with_cargo(CargoLot::commodity("Food", 5, 200));
    let mut combat = rigged(raider(8), target);
    let turn = combat
        .step_with(Sides::new(Activity::raid(), Activity::Defend))
        .unwrap();

    assert_eq!(turn.state, CombatState::Ended);
    assert_eq!(turn.plunder_taken.boarder.len(), 1);
    assert_eq!(turn.plunder_taken.boarder[0].count, 5);
    assert_eq!(turn.casualties.target, 3);
    assert_eq!(turn.results.boarder.enemy_casualties, 3);
    assert!(turn.has_note("log.boarding.plunder.taken"));
    assert!(turn.has_note("log.boarding.plunder.exhausted"));

    let summary = combat.summary();
    assert_eq!(summary.plunder_value.boarder, 1_000);
    assert!(summary.destroyed.target);
    assert!(!summary.destroyed.boarder);

    let ships = combat.into_ships();
    assert_eq!(ships.boarder.cargo.len(), 1);
    assert_eq!(ships.boarder.cargo[0].count, 5);
}

#[test]
fn partial_take_leaves_the_target_afloat() {
    let target = hauler(3).with_cargo(CargoLot::commodity("Food", 5, 200));
    let mut combat = rigged(raider(8), target);
    let turn = combat
        .step_with(Sides::new(Activity::take(0, 2), Activity::Defend))
        .unwrap();

    assert_eq!(turn.state, CombatState::Isolated);
    assert_eq!(turn.plunder_taken.boarder[0].count, 2);
    assert_eq!(turn.casualties.target, 0);
    assert_eq!(combat.combatant(Side::Target).loot().remaining()[0].count, 3);
}

#[test]
fn conquered_prize_is_captured() {
    let target = hauler(1).with_required_crew(2);
    let mut combat = rigged(raider(10), target);
    combat
        .step_with(Sides::new(Activity::Attack, Activity::Defend))
        .unwrap();
    let turn = combat
        .step_with(Sides::new(Activity::Capture, Activity::Null))
        .unwrap();

    assert_eq!(turn.state, CombatState::Ended);
    assert_eq!(turn.crew_transfers.boarder, -2);
    assert_eq!(turn.crew_transfers.target, 2);
    assert!(combat.summary().captured);
    assert_eq!(combat.victor(), Some(Side::Boarder));

    let ships = combat.into_ships();
    assert_eq!(ships.target.captured_by.as_deref(), Some("Raider"));
    assert_eq!(ships.target.crew(), 2);
    assert_eq!(ships.boarder.crew(), 8);
}
