//! Content loading and session setup shared between farm_cli and farm_daemon.

use anyhow::{bail, ensure, Context, Result};
use farm_core::{
    achievement, AchievementDef, Constants, Counters, CropDef, GameContent, GameState,
    Ledger, LocationDef, LocationId, MetaState, Modifiers, NoticeState, Season, SoilDistribution,
    SoilType, Tile, UpgradeDef, WeatherState,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

#[derive(Deserialize)]
struct CropsFile {
    content_version: String,
    crops: Vec<CropDef>,
}

#[derive(Deserialize)]
struct LocationsFile {
    locations: Vec<LocationDef>,
}

#[derive(Deserialize)]
struct AchievementsFile {
    achievements: Vec<AchievementDef>,
}

#[derive(Deserialize)]
struct UpgradesFile {
    upgrades: Vec<UpgradeDef>,
}

const SOIL_WEIGHT_TOLERANCE: f32 = 1e-3;

/// Validates cross-references and ranges in loaded content.
///
/// Catches authoring mistakes like a location offering an unknown crop, a
/// soil distribution that does not sum to one, or a base reading outside
/// the environmental bounds.
pub fn validate_content(content: &GameContent) -> Result<()> {
    validate_constants(&content.constants)?;

    let crop_ids: HashSet<&str> = content.crops.iter().map(|c| c.id.0.as_str()).collect();
    ensure!(
        crop_ids.len() == content.crops.len(),
        "crop ids are not unique"
    );
    for crop in &content.crops {
        let (low, high) = crop.optimal_temp;
        ensure!(
            low <= high,
            "crop '{}' optimal temperature range is inverted: {low}..{high}",
            crop.id
        );
    }

    ensure!(!content.locations.is_empty(), "no locations defined");
    for location in &content.locations {
        ensure!(
            !location.available_crops.is_empty(),
            "location '{}' offers no crops",
            location.id
        );
        for crop in &location.available_crops {
            ensure!(
                crop_ids.contains(crop.0.as_str()),
                "location '{}' crop '{}' is not a known crop",
                location.id,
                crop
            );
        }
        validate_soil(&location.id, &location.soil_distribution)?;
        ensure!(
            location.base_reading.within_bounds(),
            "location '{}' base reading is outside the environmental bounds",
            location.id
        );
    }

    for id in achievement::ALL {
        ensure!(
            content.achievement(id).is_some(),
            "built-in achievement '{id}' is not defined"
        );
    }

    let mut upgrade_ids = HashSet::new();
    for upgrade in &content.upgrades {
        ensure!(
            upgrade_ids.insert(upgrade.id.0.as_str()),
            "upgrade '{}' is defined twice",
            upgrade.id
        );
        ensure!(
            upgrade.cost > 0,
            "upgrade '{}' has non-positive cost {}",
            upgrade.id,
            upgrade.cost
        );
        ensure!(
            upgrade.modifier > 0.0,
            "upgrade '{}' has non-positive modifier",
            upgrade.id
        );
    }
    Ok(())
}

fn validate_constants(constants: &Constants) -> Result<()> {
    ensure!(constants.ticks_per_day > 0, "ticks_per_day must be positive");
    ensure!(constants.days_per_season > 0, "days_per_season must be positive");
    ensure!(
        constants.environment_interval_ticks > 0,
        "environment_interval_ticks must be positive"
    );
    ensure!(
        constants.grid_cols > 8 && constants.grid_rows > 2,
        "grid {}x{} is too small for an unlocked starting block",
        constants.grid_cols,
        constants.grid_rows
    );
    ensure!(
        constants
            .level_thresholds
            .windows(2)
            .all(|pair| pair[0] < pair[1]),
        "level thresholds must ascend"
    );
    ensure!(
        constants.starting_water <= constants.max_water
            && constants.starting_energy <= constants.max_energy,
        "starting resources exceed their maximum"
    );
    Ok(())
}

fn validate_soil(location: &LocationId, soil: &SoilDistribution) -> Result<()> {
    ensure!(
        soil.loamy >= 0.0 && soil.sandy >= 0.0 && soil.clay >= 0.0,
        "location '{location}' has a negative soil weight"
    );
    let total = soil.loamy + soil.sandy + soil.clay;
    ensure!(
        (total - 1.0).abs() <= SOIL_WEIGHT_TOLERANCE,
        "location '{location}' soil distribution sums to {total}, expected 1"
    );
    Ok(())
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let text = std::fs::read_to_string(dir.join(file)).with_context(|| format!("reading {file}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {file}"))
}

pub fn load_content(content_dir: &str) -> Result<GameContent> {
    let dir = Path::new(content_dir);
    let constants: Constants = read_json(dir, "constants.json")?;
    let crops_file: CropsFile = read_json(dir, "crops.json")?;
    let locations_file: LocationsFile = read_json(dir, "locations.json")?;
    let achievements_file: AchievementsFile = read_json(dir, "achievements.json")?;
    let upgrades_file: UpgradesFile = read_json(dir, "upgrades.json")?;

    let content = GameContent {
        content_version: crops_file.content_version,
        locations: locations_file.locations,
        crops: crops_file.crops,
        achievements: achievements_file.achievements,
        upgrades: upgrades_file.upgrades,
        constants,
    };
    validate_content(&content).with_context(|| format!("validating content in {content_dir}"))?;
    Ok(content)
}

/// Seeded RNG used for a whole session.
pub fn session_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

fn sample_soil(distribution: &SoilDistribution, rng: &mut impl Rng) -> SoilType {
    let roll: f32 = rng.gen();
    if roll < distribution.sandy {
        SoilType::Sandy
    } else if roll < distribution.sandy + distribution.clay {
        SoilType::Clay
    } else {
        SoilType::Loamy
    }
}

/// Unlocked starting block: every row but the edges, the middle columns.
pub fn starts_unlocked(index: usize, constants: &Constants) -> bool {
    let (cols, rows) = (constants.grid_cols, constants.grid_rows);
    let (row, col) = (index / cols, index % cols);
    row > 0 && row + 1 < rows && col > 3 && col + 4 < cols
}

/// Starts a session at `location`: builds the grid, ledger and first reading.
pub fn build_initial_state(
    content: &GameContent,
    location: &LocationId,
    seed: u64,
    rng: &mut impl Rng,
) -> Result<GameState> {
    let Some(def) = content.location(location) else {
        let known: Vec<&str> = content.locations.iter().map(|l| l.id.0.as_str()).collect();
        bail!("unknown location '{location}' (known: {})", known.join(", "));
    };
    let c = &content.constants;

    let session_id = farm_core::generate_session_id(rng);
    let tiles = (0..c.grid_cols * c.grid_rows)
        .map(|index| {
            let soil = sample_soil(&def.soil_distribution, rng);
            Tile::new(soil, !starts_unlocked(index, c))
        })
        .collect();

    Ok(GameState {
        meta: MetaState {
            tick: 0,
            seed,
            session_id,
            location: def.id.clone(),
            content_version: content.content_version.clone(),
        },
        ledger: Ledger {
            money: c.starting_money,
            xp: 0,
            level: 1,
            water: c.starting_water,
            energy: c.starting_energy,
            max_water: c.max_water,
            max_energy: c.max_energy,
            day: 1,
            season: Season::Spring,
            achievements: vec![],
            upgrades: BTreeMap::new(),
            modifiers: Modifiers::default(),
        },
        tiles,
        environment: def.base_reading.clamped(),
        available_crops: def.available_crops.clone(),
        selected_tool: None,
        weather: WeatherState {
            was_raining: false,
        },
        notices: NoticeState::default(),
        counters: Counters { next_event_id: 1 },
    })
}
