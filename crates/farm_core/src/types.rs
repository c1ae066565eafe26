//! Type definitions for `farm_core`.
//!
//! All public types, structs, enums, and ID newtypes used by the simulation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(CropId);
string_id!(LocationId);
string_id!(AchievementId);
string_id!(UpgradeId);
string_id!(CommandId);
string_id!(EventId);

/// Ids of the achievements the simulation awards on its own.
/// Their names, descriptions and rewards live in `GameContent`.
pub mod achievement {
    pub const FIRST_PLANT: &str = "first_plant";
    pub const FIRST_HARVEST: &str = "first_harvest";
    pub const DATA_DRIVEN: &str = "data_driven";
    pub const SEASONED_VET: &str = "seasoned_vet";
    pub const FARM_EXPANSION: &str = "farm_expansion";

    pub const ALL: [&str; 5] = [
        FIRST_PLANT,
        FIRST_HARVEST,
        DATA_DRIVEN,
        SEASONED_VET,
        FARM_EXPANSION,
    ];
}

/// Tile growth at which a crop is ready to harvest.
pub const MAX_GROWTH: f32 = 4.0;

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    /// Cyclic successor: Spring → Summer → Fall → Winter → Spring.
    pub const fn next(self) -> Self {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Fall,
            Season::Fall => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilType {
    Loamy,
    Sandy,
    Clay,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SoilModifiers {
    /// Divides the per-tick drying chance of a watered tile.
    pub water_retention: f32,
    pub growth_modifier: f32,
    pub yield_modifier: f32,
}

impl SoilType {
    pub const fn modifiers(self) -> SoilModifiers {
        match self {
            SoilType::Loamy => SoilModifiers {
                water_retention: 1.0,
                growth_modifier: 1.0,
                yield_modifier: 1.0,
            },
            SoilType::Sandy => SoilModifiers {
                water_retention: 0.6,
                growth_modifier: 0.9,
                yield_modifier: 0.8,
            },
            SoilType::Clay => SoilModifiers {
                water_retention: 1.4,
                growth_modifier: 1.1,
                yield_modifier: 1.2,
            },
        }
    }
}

impl std::fmt::Display for SoilType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SoilType::Loamy => "loamy",
            SoilType::Sandy => "sandy",
            SoilType::Clay => "clay",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Plant,
    Water,
    Fertilize,
    Harvest,
    Expand,
    Inspect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterNeeds {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Money,
    Water,
    Energy,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Resource::Money => "money",
            Resource::Water => "water",
            Resource::Energy => "energy",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Achievement,
    #[serde(rename = "levelup")]
    LevelUp,
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub meta: MetaState,
    pub ledger: Ledger,
    /// Row-major grid, `grid_cols` × `grid_rows`.
    pub tiles: Vec<Tile>,
    pub environment: EnvironmentalReading,
    /// Crops plantable at the selected location, in content order.
    pub available_crops: Vec<CropId>,
    pub selected_tool: Option<Tool>,
    pub weather: WeatherState,
    pub notices: NoticeState,
    pub counters: Counters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaState {
    pub tick: u64,
    pub seed: u64,
    pub session_id: Uuid,
    pub location: LocationId,
    pub content_version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherState {
    /// Raining state observed on the previous tick; rain notices are edge-triggered.
    pub was_raining: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoticeState {
    pub last_notice_tick: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub planted: bool,
    pub watered: bool,
    pub fertilized: bool,
    /// Always within `[0, MAX_GROWTH]`.
    pub growth: f32,
    pub crop: Option<CropId>,
    pub health: f32,
    /// Assigned at creation, never changes.
    pub soil: SoilType,
    pub locked: bool,
}

impl Tile {
    pub fn new(soil: SoilType, locked: bool) -> Self {
        Self {
            planted: false,
            watered: false,
            fertilized: false,
            growth: 0.0,
            crop: None,
            health: 100.0,
            soil,
            locked,
        }
    }

    pub fn is_harvestable(&self) -> bool {
        self.planted && self.growth >= MAX_GROWTH
    }

    /// Back to the unplanted baseline; soil and lock state are kept.
    pub(crate) fn reset_to_baseline(&mut self) {
        *self = Tile::new(self.soil, self.locked);
    }
}

/// Money, resources, calendar and progression for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub money: i64,
    pub xp: u64,
    pub level: u32,
    pub water: f32,
    pub energy: f32,
    pub max_water: f32,
    pub max_energy: f32,
    pub day: u32,
    pub season: Season,
    /// Unlock order; each id appears at most once.
    pub achievements: Vec<AchievementId>,
    /// Purchased upgrade id → its modifier value.
    pub upgrades: BTreeMap<UpgradeId, f32>,
    pub modifiers: Modifiers,
}

/// Running multipliers accumulated from purchased upgrades.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    pub water_cost: f32,
    pub energy_cost: f32,
    pub harvest_yield: f32,
    pub xp: f32,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            water_cost: 1.0,
            energy_cost: 1.0,
            harvest_yield: 1.0,
            xp: 1.0,
        }
    }
}

/// Simulated satellite readings for the farm's location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalReading {
    /// Percent.
    pub soil_moisture: f32,
    /// Degrees Celsius.
    pub temperature: f32,
    /// Millimetres.
    pub precipitation: f32,
    /// W/m².
    pub solar_irradiance: f32,
    /// km/h.
    pub wind_speed: f32,
    pub ndvi: f32,
    /// Percent.
    pub relative_humidity: f32,
}

// ---------------------------------------------------------------------------
// Command types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub id: CommandId,
    pub issued_tick: u64,
    pub command: Command,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    SelectTool { tool: Option<Tool> },
    /// Use the selected tool on the tile at this grid index.
    Interact { tile: usize },
    PurchaseUpgrade { upgrade: UpgradeId },
    ApplySuggestion { suggestion: Suggestion },
}

// ---------------------------------------------------------------------------
// Suggestion types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    Water,
    Fertilize,
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestedAction::Water => f.write_str("water"),
            SuggestedAction::Fertilize => f.write_str("fertilize"),
        }
    }
}

/// Global readings a suggestion criterion may threshold on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvField {
    SoilMoisture,
    Ndvi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    LessThan,
    GreaterThan,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Criterion {
    RequiresPlanted,
    Watered { expected: bool },
    Fertilized { expected: bool },
    Threshold {
        field: EnvField,
        comparison: Comparison,
        value: f32,
    },
}

/// A bulk action proposed by the assistant. Criteria are ANDed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub action: SuggestedAction,
    pub message: String,
    pub criteria: SmallVec<[Criterion; 4]>,
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub tick: u64,
    pub event: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ToolSelected {
        tool: Option<Tool>,
    },
    Planted {
        tile: usize,
        crop: CropId,
        crop_name: String,
    },
    /// `bonus` is paid when the soil was dry enough to make watering a smart call.
    Watered {
        tile: usize,
        bonus: i64,
    },
    Fertilized {
        tile: usize,
        bonus: i64,
    },
    Harvested {
        tile: usize,
        crop: Option<CropId>,
        money: i64,
        xp: u64,
    },
    LandPurchased {
        tile: usize,
        cost: i64,
    },
    TileInspected {
        report: Box<TileReport>,
    },
    ActionRejected {
        reason: RejectReason,
    },
    ReadyToHarvest {
        tile: usize,
        crop_name: String,
    },
    RainWatered {
        count: u32,
    },
    AchievementUnlocked {
        id: AchievementId,
        name: String,
        reward: i64,
    },
    LevelUp {
        level: u32,
    },
    DayStarted {
        day: u32,
    },
    SeasonChanged {
        season: Season,
    },
    UpgradePurchased {
        id: UpgradeId,
        name: String,
        cost: i64,
    },
    SuggestionApplied {
        action: SuggestedAction,
        affected: u32,
        debited: f32,
    },
    SuggestionRejected {
        action: SuggestedAction,
    },
    ProactiveNotice {
        rule: String,
        level: NoticeLevel,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RejectReason {
    NoToolSelected,
    TileLocked,
    ExpansionUnaffordable { cost: i64 },
    UnknownUpgrade { id: UpgradeId },
    UpgradeOwned { id: UpgradeId },
    LevelTooLow { required: u32 },
    UpgradeUnaffordable { cost: i64 },
}

/// Read-only detail view produced by the inspect tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileReport {
    pub tile: usize,
    pub soil: SoilType,
    pub growth: f32,
    pub crop: Option<CropId>,
    pub crop_name: Option<String>,
    pub optimal_temp: Option<(f32, f32)>,
    pub temperature: f32,
    pub temperature_optimal: bool,
    pub soil_moisture: f32,
    pub moisture_optimal: bool,
    pub ndvi: f32,
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameContent {
    pub content_version: String,
    pub locations: Vec<LocationDef>,
    pub crops: Vec<CropDef>,
    pub achievements: Vec<AchievementDef>,
    pub upgrades: Vec<UpgradeDef>,
    pub constants: Constants,
}

impl GameContent {
    pub fn crop(&self, id: &CropId) -> Option<&CropDef> {
        self.crops.iter().find(|crop| &crop.id == id)
    }

    pub fn location(&self, id: &LocationId) -> Option<&LocationDef> {
        self.locations.iter().find(|location| &location.id == id)
    }

    pub fn achievement(&self, id: &str) -> Option<&AchievementDef> {
        self.achievements.iter().find(|def| def.id.0 == id)
    }

    pub fn upgrade(&self, id: &UpgradeId) -> Option<&UpgradeDef> {
        self.upgrades.iter().find(|def| &def.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropDef {
    pub id: CropId,
    pub name: String,
    /// Inclusive temperature band, °C.
    pub optimal_temp: (f32, f32),
    pub water_needs: WaterNeeds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationDef {
    pub id: LocationId,
    pub name: String,
    pub description: String,
    pub base_reading: EnvironmentalReading,
    pub seasonal_targets: SeasonalTargets,
    pub available_crops: Vec<CropId>,
    pub soil_distribution: SoilDistribution,
}

/// Values the seasonal readings drift toward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonTarget {
    pub temperature: f32,
    pub precipitation: f32,
    pub solar_irradiance: f32,
    pub relative_humidity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalTargets {
    pub spring: SeasonTarget,
    pub summer: SeasonTarget,
    pub fall: SeasonTarget,
    pub winter: SeasonTarget,
}

impl SeasonalTargets {
    pub const fn for_season(&self, season: Season) -> &SeasonTarget {
        match season {
            Season::Spring => &self.spring,
            Season::Summer => &self.summer,
            Season::Fall => &self.fall,
            Season::Winter => &self.winter,
        }
    }
}

/// Per-tile soil probabilities; weights sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilDistribution {
    pub loamy: f32,
    pub sandy: f32,
    pub clay: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementDef {
    pub id: AchievementId,
    pub name: String,
    pub description: String,
    /// One-time money reward paid on unlock.
    pub reward: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeStat {
    WaterCostMultiplier,
    EnergyCostMultiplier,
    HarvestYieldMultiplier,
    XpMultiplier,
    /// Replaces `max_water`.
    WaterCapacity,
    /// Replaces `max_energy`.
    EnergyCapacity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeDef {
    pub id: UpgradeId,
    pub name: String,
    pub description: String,
    pub cost: i64,
    pub level_required: u32,
    pub stat: UpgradeStat,
    pub modifier: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    pub ticks_per_day: u64,
    pub days_per_season: u32,
    pub grid_cols: usize,
    pub grid_rows: usize,
    pub starting_money: i64,
    pub starting_water: f32,
    pub starting_energy: f32,
    pub max_water: f32,
    pub max_energy: f32,
    /// XP needed to leave level `n` is `level_thresholds[n]`; ascending.
    pub level_thresholds: Vec<u64>,
    pub plant_energy_cost: f32,
    /// Added on top of the base energy cost when fertilizing.
    pub fertilize_energy_surcharge: f32,
    pub water_cost: f32,
    pub expand_cost: i64,
    pub harvest_base_money: f32,
    pub harvest_fertilized_bonus: f32,
    pub harvest_ndvi_bonus: f32,
    pub harvest_xp: f32,
    pub smart_water_bonus: i64,
    pub smart_fertilize_bonus: i64,
    pub daily_water_base: f32,
    pub daily_energy: f32,
    pub notice_cooldown_ticks: u64,
    pub environment_interval_ticks: u64,
}
