//! Progression regression tests.
//!
//! These run the full tick loop on the shipped content with the autoplayer
//! and the local assistant, and check that milestones land within expected
//! windows. They catch economy regressions from content or rate changes.

use farm_control::{Advisor, AutoFarmer, CommandSource, FieldAnalyst};
use farm_core::{
    achievement, tick, Command, CommandEnvelope, CommandId, GameContent, GameState, LocationId,
};
use farm_world::{build_initial_state, load_content, session_rng};
use rand_chacha::ChaCha8Rng;
use std::sync::OnceLock;

fn content() -> &'static GameContent {
    static CONTENT: OnceLock<GameContent> = OnceLock::new();
    CONTENT.get_or_init(|| {
        let manifest = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
        load_content(&format!("{manifest}/../../content")).expect("content loads")
    })
}

fn start(location: &str, seed: u64) -> (GameState, ChaCha8Rng) {
    let mut rng = session_rng(seed);
    let state = build_initial_state(content(), &LocationId(location.to_string()), seed, &mut rng)
        .expect("location exists");
    (state, rng)
}

/// Plays `days` full days. Once a day the assistant's suggestion, if any,
/// is queued alongside the autoplayer's commands.
fn play(state: &mut GameState, rng: &mut ChaCha8Rng, days: u64, with_advisor: bool) -> usize {
    let content = content();
    let mut farmer = AutoFarmer::default();
    let mut next_id = 0;
    let mut suggestions = 0;
    for _ in 0..days * content.constants.ticks_per_day {
        let mut commands = farmer.generate_commands(state, content, &mut next_id);
        if with_advisor && state.meta.tick % content.constants.ticks_per_day == 0 {
            let analysis = FieldAnalyst.analyze(state, content).expect("local analysis");
            if let Some(suggestion) = analysis.suggestion {
                suggestions += 1;
                commands.insert(
                    0,
                    CommandEnvelope {
                        id: CommandId(format!("cmd_advisor_{suggestions}")),
                        issued_tick: state.meta.tick,
                        command: Command::ApplySuggestion { suggestion },
                    },
                );
            }
        }
        tick(state, &commands, content, rng);
    }
    suggestions
}

#[test]
fn first_harvest_within_ten_days() {
    let (mut state, mut rng) = start("central_valley_usa", 1);

    play(&mut state, &mut rng, 10, false);

    assert!(state.ledger.has_achievement(achievement::FIRST_PLANT));
    assert!(
        state.ledger.has_achievement(achievement::FIRST_HARVEST),
        "no harvest after 10 days: {:?}",
        state.ledger
    );
}

#[test]
fn a_season_of_play_levels_up_and_grows_the_farm() {
    for location in ["central_valley_usa", "kyoto_japan", "andes_peru"] {
        let (mut state, mut rng) = start(location, 7);
        let unlocked_at_start = state.tiles.iter().filter(|t| !t.locked).count();

        play(&mut state, &mut rng, 30, true);

        assert!(state.ledger.level >= 2, "{location}: level {}", state.ledger.level);
        let unlocked = state.tiles.iter().filter(|t| !t.locked).count();
        assert!(unlocked > unlocked_at_start, "{location}: farm never expanded");
        assert!(state.ledger.has_achievement(achievement::FARM_EXPANSION));
        assert!(state.ledger.has_achievement(achievement::SEASONED_VET));
    }
}

#[test]
fn same_seed_same_farm() {
    let (mut a, mut rng_a) = start("kyoto_japan", 99);
    let (mut b, mut rng_b) = start("kyoto_japan", 99);

    play(&mut a, &mut rng_a, 5, true);
    play(&mut b, &mut rng_b, 5, true);

    assert_eq!(a.ledger.money, b.ledger.money);
    assert_eq!(a.ledger.xp, b.ledger.xp);
    assert_eq!(a.tiles, b.tiles);
    assert_eq!(a.environment, b.environment);
}
