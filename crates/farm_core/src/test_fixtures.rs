//! Shared test fixtures for farm_core and downstream crates.
//!
//! `base_content()` is a small but complete `GameContent`: three crops, one
//! location, every built-in achievement and a market of upgrades.
//! `base_state()` is a fresh session on that content with loamy soil
//! everywhere so growth and yields are predictable.

use crate::{
    achievement, AchievementDef, AchievementId, Constants, Counters, CropDef, CropId,
    EnvironmentalReading, GameContent, GameState, Ledger, LocationDef, LocationId, MetaState,
    Modifiers, NoticeState, Season, SeasonTarget, SeasonalTargets, SoilDistribution, SoilType,
    Tile, UpgradeDef, UpgradeId, UpgradeStat, WaterNeeds, WeatherState,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use uuid::Uuid;

pub const LOCATION: &str = "central_valley_usa";

fn crop(id: &str, name: &str, optimal_temp: (f32, f32), water_needs: WaterNeeds) -> CropDef {
    CropDef {
        id: CropId(id.to_string()),
        name: name.to_string(),
        optimal_temp,
        water_needs,
    }
}

fn season(temperature: f32, precipitation: f32, solar_irradiance: f32, relative_humidity: f32) -> SeasonTarget {
    SeasonTarget {
        temperature,
        precipitation,
        solar_irradiance,
        relative_humidity,
    }
}

fn upgrade(id: &str, cost: i64, level_required: u32, stat: UpgradeStat, modifier: f32) -> UpgradeDef {
    UpgradeDef {
        id: UpgradeId(id.to_string()),
        name: id.replace('_', " "),
        description: String::new(),
        cost,
        level_required,
        stat,
        modifier,
    }
}

/// Mild reading: optimal for every fixture crop, not sunny, not raining,
/// soil moisture and NDVI above the smart-action thresholds.
pub fn mild_reading() -> EnvironmentalReading {
    EnvironmentalReading {
        soil_moisture: 60.0,
        temperature: 22.0,
        precipitation: 5.0,
        solar_irradiance: 500.0,
        wind_speed: 10.0,
        ndvi: 0.6,
        relative_humidity: 65.0,
    }
}

pub fn base_constants() -> Constants {
    Constants {
        ticks_per_day: 24,
        days_per_season: 30,
        grid_cols: 12,
        grid_rows: 8,
        starting_money: 100,
        starting_water: 100.0,
        starting_energy: 100.0,
        max_water: 100.0,
        max_energy: 100.0,
        level_thresholds: vec![0, 100, 250, 500, 1000, 2000, 3500, 5000, 7500, 10000],
        plant_energy_cost: 5.0,
        fertilize_energy_surcharge: 5.0,
        water_cost: 10.0,
        expand_cost: 150,
        harvest_base_money: 50.0,
        harvest_fertilized_bonus: 20.0,
        harvest_ndvi_bonus: 30.0,
        harvest_xp: 25.0,
        smart_water_bonus: 10,
        smart_fertilize_bonus: 15,
        daily_water_base: 5.0,
        daily_energy: 100.0,
        notice_cooldown_ticks: 40,
        environment_interval_ticks: 1,
    }
}

pub fn base_content() -> GameContent {
    let achievement_def = |id: &str, name: &str, reward: i64| AchievementDef {
        id: AchievementId(id.to_string()),
        name: name.to_string(),
        description: String::new(),
        reward,
    };

    GameContent {
        content_version: "test".to_string(),
        crops: vec![
            crop("corn", "Corn", (20.0, 30.0), WaterNeeds::Medium),
            crop("wheat", "Wheat", (20.0, 25.0), WaterNeeds::Low),
            crop("tomato", "Tomato", (21.0, 29.0), WaterNeeds::High),
        ],
        locations: vec![LocationDef {
            id: LocationId(LOCATION.to_string()),
            name: "Central Valley, USA".to_string(),
            description: String::new(),
            base_reading: mild_reading(),
            seasonal_targets: SeasonalTargets {
                spring: season(20.0, 10.0, 600.0, 60.0),
                summer: season(32.0, 1.0, 850.0, 40.0),
                fall: season(22.0, 8.0, 500.0, 55.0),
                winter: season(10.0, 20.0, 300.0, 75.0),
            },
            available_crops: vec![
                CropId("corn".to_string()),
                CropId("wheat".to_string()),
                CropId("tomato".to_string()),
            ],
            soil_distribution: SoilDistribution {
                loamy: 0.6,
                sandy: 0.3,
                clay: 0.1,
            },
        }],
        achievements: vec![
            achievement_def(achievement::FIRST_PLANT, "Green Thumb", 50),
            achievement_def(achievement::FIRST_HARVEST, "Bountiful Harvest", 100),
            achievement_def(achievement::DATA_DRIVEN, "Data Farmer", 75),
            achievement_def(achievement::SEASONED_VET, "Seasoned Veteran", 200),
            achievement_def(achievement::FARM_EXPANSION, "Land Baron", 150),
        ],
        upgrades: vec![
            upgrade("water_pump_1", 500, 2, UpgradeStat::WaterCostMultiplier, 0.8),
            upgrade("water_tank_1", 300, 1, UpgradeStat::WaterCapacity, 150.0),
            upgrade("efficient_tools", 400, 2, UpgradeStat::EnergyCostMultiplier, 0.8),
            upgrade("fertilizer_mix", 600, 3, UpgradeStat::HarvestYieldMultiplier, 1.25),
            upgrade("almanac", 450, 2, UpgradeStat::XpMultiplier, 1.5),
        ],
        constants: base_constants(),
    }
}

/// Fresh session: day 1, Spring, loamy soil, the standard unlocked
/// centre block, no tool selected.
pub fn base_state(content: &GameContent) -> GameState {
    let constants = &content.constants;
    let (cols, rows) = (constants.grid_cols, constants.grid_rows);
    let tiles = (0..cols * rows)
        .map(|index| {
            let (row, col) = (index / cols, index % cols);
            let unlocked = row > 0 && row + 1 < rows && col > 3 && col + 4 < cols;
            Tile::new(SoilType::Loamy, !unlocked)
        })
        .collect();
    let location = LocationId(LOCATION.to_string());
    let available_crops = content
        .location(&location)
        .map(|def| def.available_crops.clone())
        .unwrap_or_default();

    GameState {
        meta: MetaState {
            tick: 0,
            seed: 42,
            session_id: Uuid::nil(),
            location,
            content_version: content.content_version.clone(),
        },
        ledger: Ledger {
            money: constants.starting_money,
            xp: 0,
            level: 1,
            water: constants.starting_water,
            energy: constants.starting_energy,
            max_water: constants.max_water,
            max_energy: constants.max_energy,
            day: 1,
            season: Season::Spring,
            achievements: vec![],
            upgrades: BTreeMap::new(),
            modifiers: Modifiers::default(),
        },
        tiles,
        environment: mild_reading(),
        available_crops,
        selected_tool: None,
        weather: WeatherState::default(),
        notices: NoticeState::default(),
        counters: Counters { next_event_id: 1 },
    }
}

/// Index of the `n`th unlocked tile in grid order.
pub fn open_tile(state: &GameState, n: usize) -> usize {
    state
        .tiles
        .iter()
        .enumerate()
        .filter(|(_, tile)| !tile.locked)
        .nth(n)
        .map(|(index, _)| index)
        .expect("fixture has enough unlocked tiles")
}

/// Deterministic RNG seeded with 42.
pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
