//! Action engine: one handler per tool, plus the other player commands.
//!
//! Failed preconditions are silent no-ops, except for a missing tool and a
//! locked tile, which surface as `ActionRejected` warnings.

use crate::ledger::{self, round_money};
use crate::suggestion::reconcile;
use crate::{
    achievement, Command, EnvironmentalReading, Event, EventEnvelope, GameContent, GameState,
    RejectReason, Resource, Tile, TileReport, Tool,
};

/// Soil moisture band the inspect report calls optimal.
const OPTIMAL_MOISTURE: std::ops::RangeInclusive<f32> = 50.0..=75.0;
/// Soil moisture below which watering earns the smart-watering bonus.
pub const SMART_WATER_MOISTURE: f32 = 40.0;
/// NDVI below which fertilizing earns the smart-fertilizing bonus.
pub const SMART_FERTILIZE_NDVI: f32 = 0.5;
/// NDVI above which a harvest earns the vegetation bonus.
const HARVEST_NDVI: f32 = 0.7;

/// Energy for planting and harvesting, after upgrades.
pub fn base_energy_cost(state: &GameState, content: &GameContent) -> f32 {
    content.constants.plant_energy_cost * state.ledger.modifiers.energy_cost
}

pub fn fertilize_energy_cost(state: &GameState, content: &GameContent) -> f32 {
    base_energy_cost(state, content) + content.constants.fertilize_energy_surcharge
}

pub fn water_cost(state: &GameState, content: &GameContent) -> f32 {
    content.constants.water_cost * state.ledger.modifiers.water_cost
}

/// Money a harvest of `tile` would pay under `reading`.
pub fn harvest_value(
    state: &GameState,
    tile: &Tile,
    reading: &EnvironmentalReading,
    content: &GameContent,
) -> i64 {
    let constants = &content.constants;
    let mut money = constants.harvest_base_money
        * tile.soil.modifiers().yield_modifier
        * state.ledger.modifiers.harvest_yield;
    if tile.fertilized {
        money += constants.harvest_fertilized_bonus;
    }
    if reading.ndvi > HARVEST_NDVI {
        money += constants.harvest_ndvi_bonus;
    }
    round_money(money)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn harvest_xp(state: &GameState, content: &GameContent) -> u64 {
    (content.constants.harvest_xp * state.ledger.modifiers.xp)
        .round()
        .max(0.0) as u64
}

/// Applies a single command immediately.
pub fn apply_command(
    state: &mut GameState,
    command: &Command,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    match command {
        Command::SelectTool { tool } => {
            state.selected_tool = *tool;
            events.push(crate::emit(
                &mut state.counters,
                state.meta.tick,
                Event::ToolSelected { tool: *tool },
            ));
        }
        Command::Interact { tile } => interact(state, *tile, content, events),
        Command::PurchaseUpgrade { upgrade } => {
            ledger::purchase_upgrade(state, content, upgrade, events);
        }
        Command::ApplySuggestion { suggestion } => {
            reconcile(state, suggestion, content, events);
        }
    }
}

fn reject(state: &mut GameState, reason: RejectReason, events: &mut Vec<EventEnvelope>) {
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::ActionRejected { reason },
    ));
}

/// Uses the selected tool on one tile.
pub(crate) fn interact(
    state: &mut GameState,
    index: usize,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    let Some(tile) = state.tiles.get(index) else {
        return;
    };
    if tile.locked && state.selected_tool != Some(Tool::Expand) {
        reject(state, RejectReason::TileLocked, events);
        return;
    }
    let Some(tool) = state.selected_tool else {
        reject(state, RejectReason::NoToolSelected, events);
        return;
    };

    match tool {
        Tool::Plant => plant(state, index, content, events),
        Tool::Water => water(state, index, content, events),
        Tool::Fertilize => fertilize(state, index, content, events),
        Tool::Harvest => harvest(state, index, content, events),
        Tool::Expand => expand(state, index, content, events),
        Tool::Inspect => inspect(state, index, content, events),
    }
}

fn plant(state: &mut GameState, index: usize, content: &GameContent, events: &mut Vec<EventEnvelope>) {
    if state.tiles[index].planted || state.available_crops.is_empty() {
        return;
    }
    let cost = base_energy_cost(state, content);
    if state.ledger.spend(Resource::Energy, cost).is_err() {
        return;
    }

    let slot = state.ledger.day as usize % state.available_crops.len();
    let crop = state.available_crops[slot].clone();
    let crop_name = content
        .crop(&crop)
        .map_or_else(|| crop.0.clone(), |def| def.name.clone());

    let tile = &mut state.tiles[index];
    tile.planted = true;
    tile.crop = Some(crop.clone());
    tile.growth = 0.1;
    tile.health = 100.0;

    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::Planted {
            tile: index,
            crop,
            crop_name,
        },
    ));
    ledger::unlock_achievement(state, content, achievement::FIRST_PLANT, events);
}

fn water(state: &mut GameState, index: usize, content: &GameContent, events: &mut Vec<EventEnvelope>) {
    let tile = &state.tiles[index];
    if !tile.planted || tile.watered {
        return;
    }
    let cost = water_cost(state, content);
    if state.ledger.spend(Resource::Water, cost).is_err() {
        return;
    }
    state.tiles[index].watered = true;

    let smart = state.environment.soil_moisture < SMART_WATER_MOISTURE;
    let bonus = if smart {
        content.constants.smart_water_bonus
    } else {
        0
    };
    state.ledger.money += bonus;
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::Watered { tile: index, bonus },
    ));
    if smart {
        ledger::unlock_achievement(state, content, achievement::DATA_DRIVEN, events);
    }
}

fn fertilize(
    state: &mut GameState,
    index: usize,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    let tile = &state.tiles[index];
    if !tile.planted || tile.fertilized {
        return;
    }
    let cost = fertilize_energy_cost(state, content);
    if state.ledger.spend(Resource::Energy, cost).is_err() {
        return;
    }
    state.tiles[index].fertilized = true;

    let smart = state.environment.ndvi < SMART_FERTILIZE_NDVI;
    let bonus = if smart {
        content.constants.smart_fertilize_bonus
    } else {
        0
    };
    state.ledger.money += bonus;
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::Fertilized { tile: index, bonus },
    ));
    if smart {
        ledger::unlock_achievement(state, content, achievement::DATA_DRIVEN, events);
    }
}

fn harvest(
    state: &mut GameState,
    index: usize,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    if !state.tiles[index].is_harvestable() {
        return;
    }
    // Harvesting uses the base energy cost; the fertilize surcharge does not apply.
    let cost = base_energy_cost(state, content);
    if state.ledger.spend(Resource::Energy, cost).is_err() {
        return;
    }

    let money = harvest_value(state, &state.tiles[index], &state.environment, content);
    let xp = harvest_xp(state, content);
    let crop = state.tiles[index].crop.clone();
    state.tiles[index].reset_to_baseline();
    state.ledger.money += money;

    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::Harvested {
            tile: index,
            crop,
            money,
            xp,
        },
    ));
    ledger::grant_xp(state, content, xp, events);
    ledger::unlock_achievement(state, content, achievement::FIRST_HARVEST, events);
}

fn expand(state: &mut GameState, index: usize, content: &GameContent, events: &mut Vec<EventEnvelope>) {
    if !state.tiles[index].locked {
        return;
    }
    let cost = content.constants.expand_cost;
    if state.ledger.money < cost {
        reject(state, RejectReason::ExpansionUnaffordable { cost }, events);
        return;
    }
    state.ledger.money -= cost;
    state.tiles[index].locked = false;
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::LandPurchased { tile: index, cost },
    ));
    ledger::unlock_achievement(state, content, achievement::FARM_EXPANSION, events);
}

fn inspect(state: &mut GameState, index: usize, content: &GameContent, events: &mut Vec<EventEnvelope>) {
    let report = tile_report(state, index, content);
    if let Some(report) = report {
        events.push(crate::emit(
            &mut state.counters,
            state.meta.tick,
            Event::TileInspected {
                report: Box::new(report),
            },
        ));
    }
}

/// Read-only detail view of one tile against the current reading.
pub fn tile_report(state: &GameState, index: usize, content: &GameContent) -> Option<TileReport> {
    let tile = state.tiles.get(index)?;
    let reading = &state.environment;
    let crop = tile.crop.as_ref().and_then(|id| content.crop(id));
    Some(TileReport {
        tile: index,
        soil: tile.soil,
        growth: tile.growth,
        crop: tile.crop.clone(),
        crop_name: crop.map(|def| def.name.clone()),
        optimal_temp: crop.map(|def| def.optimal_temp),
        temperature: reading.temperature,
        temperature_optimal: crate::growth::temperature_optimal(crop, reading.temperature),
        soil_moisture: reading.soil_moisture,
        moisture_optimal: OPTIMAL_MOISTURE.contains(&reading.soil_moisture),
        ndvi: reading.ndvi,
    })
}
