use rand::Rng;

use crate::actions::apply_command;
use crate::{achievement, environment, growth, ledger, notices};
use crate::{CommandEnvelope, Event, EventEnvelope, GameContent, GameState};

/// Advance the simulation by one tick.
///
/// Order of operations:
/// 1. Apply queued commands.
/// 2. Increment the tick counter.
/// 3. Grow, dry and rain-water tiles against the current reading.
/// 4. Evaluate proactive notice rules (cooldown gated).
/// 5. On a new day: regenerate resources, roll the season, check level.
/// 6. Advance the environmental reading for the next tick.
///
/// Returns all events produced this tick.
pub fn tick(
    state: &mut GameState,
    commands: &[CommandEnvelope],
    content: &GameContent,
    rng: &mut impl Rng,
) -> Vec<EventEnvelope> {
    let mut events = Vec::new();

    for envelope in commands {
        apply_command(state, &envelope.command, content, &mut events);
    }

    state.meta.tick += 1;
    let is_new_day = state
        .meta
        .tick
        .is_multiple_of(content.constants.ticks_per_day.max(1));

    growth::advance_tiles(state, content, rng, &mut events);
    notices::evaluate(state, content, &mut events);
    if is_new_day {
        roll_day(state, content, &mut events);
    }
    if state
        .meta
        .tick
        .is_multiple_of(content.constants.environment_interval_ticks.max(1))
    {
        advance_environment(state, content, rng);
    }

    events
}

fn roll_day(state: &mut GameState, content: &GameContent, events: &mut Vec<EventEnvelope>) {
    let current_tick = state.meta.tick;
    state.ledger.day += 1;
    state
        .ledger
        .regenerate_daily(state.environment.precipitation, &content.constants);
    events.push(crate::emit(
        &mut state.counters,
        current_tick,
        Event::DayStarted {
            day: state.ledger.day,
        },
    ));

    if state
        .ledger
        .day
        .is_multiple_of(content.constants.days_per_season.max(1))
    {
        state.ledger.season = state.ledger.season.next();
        events.push(crate::emit(
            &mut state.counters,
            current_tick,
            Event::SeasonChanged {
                season: state.ledger.season,
            },
        ));
        ledger::unlock_achievement(state, content, achievement::SEASONED_VET, events);
    }

    ledger::check_level_up(state, content, events);
}

/// Steps the reading toward the current season's target for the session's
/// location. An unknown location leaves the reading unchanged.
fn advance_environment(state: &mut GameState, content: &GameContent, rng: &mut impl Rng) {
    let Some(location) = content.location(&state.meta.location) else {
        return;
    };
    let target = location.seasonal_targets.for_season(state.ledger.season);
    state.environment = environment::advance(&state.environment, target, rng);
}
