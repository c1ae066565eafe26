//! Snapshot metrics computed from `GameState`.
//!
//! `compute_metrics(&GameState) -> FarmMetrics` samples the current state for
//! the notice rules, the advisor and status output. No state mutation, no IO.

use serde::Serialize;

use crate::{GameState, Season};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmMetrics {
    pub tick: u64,
    pub day: u32,
    pub season: Season,

    // Ledger
    pub money: i64,
    pub xp: u64,
    pub level: u32,
    pub water: f32,
    pub max_water: f32,
    pub energy: f32,
    pub max_energy: f32,

    // Field
    pub tiles_unlocked: u32,
    pub tiles_planted: u32,
    pub planted_unwatered: u32,
    pub planted_unfertilized: u32,
    pub harvest_ready: u32,

    // Readings
    pub soil_moisture: f32,
    pub ndvi: f32,
    pub temperature: f32,
    pub precipitation: f32,

    pub achievements_unlocked: u32,
    pub upgrades_owned: u32,
}

#[allow(clippy::cast_possible_truncation)]
pub fn compute_metrics(state: &GameState) -> FarmMetrics {
    let mut tiles_unlocked = 0;
    let mut tiles_planted = 0;
    let mut planted_unwatered = 0;
    let mut planted_unfertilized = 0;
    let mut harvest_ready = 0;

    for tile in state.tiles.iter().filter(|tile| !tile.locked) {
        tiles_unlocked += 1;
        if tile.is_harvestable() {
            harvest_ready += 1;
        }
        if !tile.planted {
            continue;
        }
        tiles_planted += 1;
        if !tile.watered {
            planted_unwatered += 1;
        }
        if !tile.fertilized {
            planted_unfertilized += 1;
        }
    }

    let ledger = &state.ledger;
    FarmMetrics {
        tick: state.meta.tick,
        day: ledger.day,
        season: ledger.season,
        money: ledger.money,
        xp: ledger.xp,
        level: ledger.level,
        water: ledger.water,
        max_water: ledger.max_water,
        energy: ledger.energy,
        max_energy: ledger.max_energy,
        tiles_unlocked,
        tiles_planted,
        planted_unwatered,
        planted_unfertilized,
        harvest_ready,
        soil_moisture: state.environment.soil_moisture,
        ndvi: state.environment.ndvi,
        temperature: state.environment.temperature,
        precipitation: state.environment.precipitation,
        achievements_unlocked: ledger.achievements.len() as u32,
        upgrades_owned: ledger.upgrades.len() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, base_state};

    #[test]
    fn counts_only_unlocked_tiles() {
        let content = base_content();
        let mut state = base_state(&content);
        let unlocked = state.tiles.iter().filter(|tile| !tile.locked).count() as u32;

        let locked_index = state.tiles.iter().position(|tile| tile.locked).unwrap();
        state.tiles[locked_index].planted = true;
        state.tiles[locked_index].growth = 4.0;

        let metrics = compute_metrics(&state);
        assert_eq!(metrics.tiles_unlocked, unlocked);
        assert_eq!(metrics.tiles_planted, 0);
        assert_eq!(metrics.harvest_ready, 0);
    }

    #[test]
    fn classifies_planted_tiles() {
        let content = base_content();
        let mut state = base_state(&content);
        let open: Vec<usize> = (0..state.tiles.len())
            .filter(|&i| !state.tiles[i].locked)
            .take(3)
            .collect();
        for &i in &open {
            state.tiles[i].planted = true;
        }
        state.tiles[open[0]].watered = true;
        state.tiles[open[1]].fertilized = true;
        state.tiles[open[2]].growth = 4.0;

        let metrics = compute_metrics(&state);
        assert_eq!(metrics.tiles_planted, 3);
        assert_eq!(metrics.planted_unwatered, 2);
        assert_eq!(metrics.planted_unfertilized, 2);
        assert_eq!(metrics.harvest_ready, 1);
    }
}
