//! Tile & crop growth: per-tick growth, drying, fertilizer loss and rain.

use rand::Rng;

use crate::{CropDef, EnvironmentalReading, Event, EventEnvelope, GameContent, GameState, Tile, MAX_GROWTH};

const WATERED_GROWTH: f32 = 0.34;
const FERTILIZED_GROWTH: f32 = 0.1;
const OPTIMAL_TEMP_BONUS: f32 = 0.05;
const SUNNY_BONUS: f32 = 0.05;
/// Band used when a tile's crop is missing from content.
const FALLBACK_OPTIMAL_TEMP: (f32, f32) = (18.0, 28.0);

const SUNNY_DRYING_CHANCE: f32 = 0.4;
const DRYING_CHANCE: f32 = 0.2;
const FERTILIZER_LOSS_GROWTH: f32 = 2.0;
const FERTILIZER_LOSS_CHANCE: f32 = 0.1;

pub fn temperature_optimal(crop: Option<&CropDef>, temperature: f32) -> bool {
    let (low, high) = crop.map_or(FALLBACK_OPTIMAL_TEMP, |def| def.optimal_temp);
    temperature >= low && temperature <= high
}

/// Growth gained by a planted tile this tick, before the `MAX_GROWTH` cap.
pub fn growth_increment(tile: &Tile, crop: Option<&CropDef>, reading: &EnvironmentalReading) -> f32 {
    let mut base = 0.0;
    if tile.watered {
        base = WATERED_GROWTH;
    }
    if tile.fertilized {
        base += FERTILIZED_GROWTH;
    }
    base *= tile.soil.modifiers().growth_modifier;

    if temperature_optimal(crop, reading.temperature) {
        base += OPTIMAL_TEMP_BONUS;
    }
    if reading.is_sunny() {
        base += SUNNY_BONUS;
    }
    base
}

/// Chance that a watered tile dries out this tick.
pub fn drying_chance(tile: &Tile, reading: &EnvironmentalReading) -> f32 {
    let chance = if reading.is_sunny() {
        SUNNY_DRYING_CHANCE
    } else {
        DRYING_CHANCE
    };
    chance / tile.soil.modifiers().water_retention
}

/// Runs the tile pass against the reading currently in force.
///
/// Each tile grows, may dry out and may lose fertilizer, in grid order.
/// Afterwards, if it is raining, every planted unlocked dry tile is watered.
/// The rain notice fires only on the transition into rain.
pub(crate) fn advance_tiles(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let current_tick = state.meta.tick;
    let reading = state.environment;

    for index in 0..state.tiles.len() {
        let tile = &mut state.tiles[index];
        let crop = tile.crop.as_ref().and_then(|id| content.crop(id));

        if !tile.locked && tile.planted && tile.growth < MAX_GROWTH {
            let increment = growth_increment(tile, crop, &reading);
            tile.growth = (tile.growth + increment).min(MAX_GROWTH);
            if tile.growth >= MAX_GROWTH {
                let crop_name = crop.map_or_else(|| "Crop".to_string(), |def| def.name.clone());
                events.push(crate::emit(
                    &mut state.counters,
                    current_tick,
                    Event::ReadyToHarvest {
                        tile: index,
                        crop_name,
                    },
                ));
            }
        }

        let tile = &mut state.tiles[index];
        if tile.watered && rng.gen::<f32>() < drying_chance(tile, &reading) {
            tile.watered = false;
        }
        if tile.fertilized
            && tile.growth > FERTILIZER_LOSS_GROWTH
            && rng.gen::<f32>() < FERTILIZER_LOSS_CHANCE
        {
            tile.fertilized = false;
        }
    }

    let raining = reading.is_raining();
    if raining {
        let mut count = 0u32;
        for tile in state
            .tiles
            .iter_mut()
            .filter(|tile| !tile.locked && tile.planted && !tile.watered)
        {
            tile.watered = true;
            count += 1;
        }
        if count > 0 && !state.weather.was_raining {
            events.push(crate::emit(
                &mut state.counters,
                current_tick,
                Event::RainWatered { count },
            ));
        }
    }
    state.weather.was_raining = raining;
}
