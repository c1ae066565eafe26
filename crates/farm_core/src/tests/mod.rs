use super::*;
use crate::test_fixtures::{base_content, base_state, make_rng, open_tile};

mod actions;
mod upgrades;

// --- Shared test helpers ------------------------------------------------

fn test_content() -> GameContent {
    base_content()
}

/// Content whose reading never changes, so weather-driven tests control
/// the environment directly.
fn frozen_weather_content() -> GameContent {
    let mut content = base_content();
    content.constants.environment_interval_ticks = 1_000_000;
    content
}

fn test_state(content: &GameContent) -> GameState {
    base_state(content)
}

fn envelope(state: &GameState, command: Command) -> CommandEnvelope {
    CommandEnvelope {
        id: CommandId(format!("cmd_{:06}", state.meta.tick)),
        issued_tick: state.meta.tick,
        command,
    }
}

fn run(state: &mut GameState, content: &GameContent, command: Command) -> Vec<EventEnvelope> {
    let mut events = Vec::new();
    apply_command(state, &command, content, &mut events);
    events
}

fn use_tool(
    state: &mut GameState,
    content: &GameContent,
    tool: Tool,
    tile: usize,
) -> Vec<EventEnvelope> {
    let mut events = run(state, content, Command::SelectTool { tool: Some(tool) });
    events.extend(run(state, content, Command::Interact { tile }));
    events
}

/// Planted, unwatered, unfertilized tile at the `n`th open slot.
fn planted_tile(state: &mut GameState, n: usize) -> usize {
    let index = open_tile(state, n);
    let tile = &mut state.tiles[index];
    tile.planted = true;
    tile.crop = Some(CropId("wheat".to_string()));
    tile.growth = 0.1;
    index
}

fn count_events(events: &[EventEnvelope], predicate: impl Fn(&Event) -> bool) -> usize {
    events.iter().filter(|e| predicate(&e.event)).count()
}

fn has_event(events: &[EventEnvelope], predicate: impl Fn(&Event) -> bool) -> bool {
    count_events(events, predicate) > 0
}
