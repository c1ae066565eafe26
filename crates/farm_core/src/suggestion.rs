//! Suggestion reconciler: applies a bulk suggested action to every
//! qualifying tile the budget covers.

use crate::actions::water_cost;
use crate::{
    Comparison, Criterion, EnvironmentalReading, Event, EventEnvelope, GameContent, GameState,
    Resource, SuggestedAction, Suggestion, Tile,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    Applied { tiles: Vec<usize>, debited: f32 },
    Rejected,
}

fn criterion_holds(criterion: &Criterion, tile: &Tile, reading: &EnvironmentalReading) -> bool {
    match *criterion {
        Criterion::RequiresPlanted => tile.planted,
        Criterion::Watered { expected } => tile.watered == expected,
        Criterion::Fertilized { expected } => tile.fertilized == expected,
        Criterion::Threshold {
            field,
            comparison,
            value,
        } => {
            let observed = reading.field(field);
            match comparison {
                Comparison::LessThan => observed < value,
                Comparison::GreaterThan => observed > value,
            }
        }
    }
}

/// Whether the action can still do anything to this tile.
fn applicable(action: SuggestedAction, tile: &Tile) -> bool {
    match action {
        SuggestedAction::Water => tile.planted && !tile.watered,
        SuggestedAction::Fertilize => tile.planted && !tile.fertilized,
    }
}

pub fn qualifies(suggestion: &Suggestion, tile: &Tile, reading: &EnvironmentalReading) -> bool {
    !tile.locked
        && applicable(suggestion.action, tile)
        && suggestion
            .criteria
            .iter()
            .all(|criterion| criterion_holds(criterion, tile, reading))
}

/// Resource and per-tile cost of one application.
///
/// A bulk fertilize scales the whole per-tile energy, surcharge included,
/// by the energy modifier.
pub fn unit_cost(
    action: SuggestedAction,
    state: &GameState,
    content: &GameContent,
) -> (Resource, f32) {
    let constants = &content.constants;
    match action {
        SuggestedAction::Water => (Resource::Water, water_cost(state, content)),
        SuggestedAction::Fertilize => (
            Resource::Energy,
            (constants.plant_energy_cost + constants.fertilize_energy_surcharge)
                * state.ledger.modifiers.energy_cost,
        ),
    }
}

/// Plans the application without mutating anything.
///
/// Tiles are taken in grid order while the `n`th application is itself
/// affordable, i.e. `unit × n <= available`, so a budget covering `k` of
/// the qualifying tiles selects exactly the first `k`.
pub fn plan(state: &GameState, suggestion: &Suggestion, content: &GameContent) -> ReconcileOutcome {
    let (resource, unit) = unit_cost(suggestion.action, state, content);
    let available = state.ledger.available(resource);

    let mut tiles = Vec::new();
    for (index, tile) in state.tiles.iter().enumerate() {
        if !qualifies(suggestion, tile, &state.environment) {
            continue;
        }
        let next = tiles.len() as f32 + 1.0;
        if unit * next > available {
            break;
        }
        tiles.push(index);
    }

    if tiles.is_empty() {
        ReconcileOutcome::Rejected
    } else {
        let debited = unit * tiles.len() as f32;
        ReconcileOutcome::Applied { tiles, debited }
    }
}

/// Plans, debits the total once, then marks every selected tile.
pub(crate) fn reconcile(
    state: &mut GameState,
    suggestion: &Suggestion,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> ReconcileOutcome {
    let action = suggestion.action;
    let mut outcome = plan(state, suggestion, content);
    if let ReconcileOutcome::Applied { debited, .. } = &outcome {
        let (resource, _) = unit_cost(action, state, content);
        if state.ledger.spend(resource, *debited).is_err() {
            outcome = ReconcileOutcome::Rejected;
        }
    }

    let event = match &outcome {
        ReconcileOutcome::Applied { tiles, debited } => {
            for &index in tiles {
                let tile = &mut state.tiles[index];
                match action {
                    SuggestedAction::Water => tile.watered = true,
                    SuggestedAction::Fertilize => tile.fertilized = true,
                }
            }
            #[allow(clippy::cast_possible_truncation)]
            let affected = tiles.len() as u32;
            Event::SuggestionApplied {
                action,
                affected,
                debited: *debited,
            }
        }
        ReconcileOutcome::Rejected => Event::SuggestionRejected { action },
    };
    events.push(crate::emit(&mut state.counters, state.meta.tick, event));
    outcome
}
