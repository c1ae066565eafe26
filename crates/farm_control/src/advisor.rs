//! The farm assistant: short tips and one-shot field analyses.
//!
//! Advisors may fail; the `*_or_fallback` wrappers turn every failure into a
//! fixed message so callers always have something to show the player.

use farm_core::actions::{SMART_FERTILIZE_NDVI, SMART_WATER_MOISTURE};
use farm_core::{
    compute_metrics, Comparison, Criterion, EnvField, FarmMetrics, GameContent, GameState,
    SuggestedAction, Suggestion,
};
use serde::{Deserialize, Serialize};
use smallvec::smallvec;
use thiserror::Error;

pub const OFFLINE_TIP: &str = "The AI assistant is currently offline. Please check your configuration.";
pub const FAILED_TIP: &str =
    "I seem to be having trouble analyzing the data right now. Let's stick to the basics!";
pub const EMPTY_TIP: &str = "Let's check the data panels for our next move!";
pub const OFFLINE_ANALYSIS: &str = "AI systems are offline. Cannot perform analysis.";
pub const FAILED_ANALYSIS: &str =
    "I had a system error while analyzing the farm. Please check the raw data yourself!";

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("advisor is offline")]
    Offline,
    #[error("advisor unavailable: {0}")]
    Unavailable(String),
    #[error("malformed advisor response: {0}")]
    Malformed(String),
}

/// Result of a field analysis. `suggestion` is `None` when nothing needs doing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub summary: String,
    pub suggestion: Option<Suggestion>,
}

pub trait Advisor {
    fn tip(&self, state: &GameState, content: &GameContent) -> Result<String, AdvisorError>;
    fn analyze(&self, state: &GameState, content: &GameContent) -> Result<Analysis, AdvisorError>;
}

/// Never fails: offline and broken advisors map to canned messages.
pub fn tip_or_fallback(result: Result<String, AdvisorError>) -> String {
    match result {
        Ok(text) => {
            let cleaned = text.trim().replace('"', "");
            if cleaned.is_empty() {
                EMPTY_TIP.to_string()
            } else {
                cleaned
            }
        }
        Err(AdvisorError::Offline) => OFFLINE_TIP.to_string(),
        Err(err) => {
            tracing::warn!(error = %err, "tip request failed");
            FAILED_TIP.to_string()
        }
    }
}

pub fn analysis_or_fallback(result: Result<Analysis, AdvisorError>) -> Analysis {
    match result {
        Ok(analysis) => analysis,
        Err(AdvisorError::Offline) => Analysis {
            summary: OFFLINE_ANALYSIS.to_string(),
            suggestion: None,
        },
        Err(err) => {
            tracing::warn!(error = %err, "analysis request failed");
            Analysis {
                summary: FAILED_ANALYSIS.to_string(),
                suggestion: None,
            }
        }
    }
}

/// Used when no assistant is configured, or its credentials are missing.
pub struct OfflineAdvisor;

impl Advisor for OfflineAdvisor {
    fn tip(&self, _state: &GameState, _content: &GameContent) -> Result<String, AdvisorError> {
        Err(AdvisorError::Offline)
    }

    fn analyze(&self, _state: &GameState, _content: &GameContent) -> Result<Analysis, AdvisorError> {
        Err(AdvisorError::Offline)
    }
}

/// Deterministic rule-based assistant working from the metrics snapshot.
#[derive(Debug, Default)]
pub struct FieldAnalyst;

impl FieldAnalyst {
    /// Something to do on the field right now.
    fn tactical(metrics: &FarmMetrics) -> Option<String> {
        if metrics.soil_moisture < SMART_WATER_MOISTURE && metrics.planted_unwatered > 0 {
            return Some(format!(
                "The soil moisture is getting low at {:.0}%. Watering your crops now will keep them healthy!",
                metrics.soil_moisture
            ));
        }
        if metrics.harvest_ready > 0 {
            return Some(format!(
                "{} plots are ready to harvest. Bring them in to free the soil for new crops.",
                metrics.harvest_ready
            ));
        }
        if metrics.ndvi < SMART_FERTILIZE_NDVI && metrics.planted_unfertilized > 0 {
            return Some(format!(
                "Vegetation index is down to {:.2}. Fertilizer now pays a bonus and perks up your plants.",
                metrics.ndvi
            ));
        }
        None
    }

    /// Where the money should go.
    fn strategic(state: &GameState, content: &GameContent, metrics: &FarmMetrics) -> Option<String> {
        let affordable = content
            .upgrades
            .iter()
            .filter(|def| !state.ledger.upgrades.contains_key(&def.id))
            .filter(|def| def.level_required <= metrics.level && def.cost <= metrics.money)
            .min_by_key(|def| def.cost);
        if let Some(def) = affordable {
            return Some(format!(
                "You have ${}. The {} (${}) is within reach: {}",
                metrics.money, def.name, def.cost, def.description
            ));
        }

        let expand_cost = content.constants.expand_cost;
        let room_to_grow = state.tiles.iter().any(|tile| tile.locked);
        if !room_to_grow {
            return None;
        }
        if metrics.money >= expand_cost {
            Some(format!(
                "You have ${}. Buying another plot for ${expand_cost} could really boost your income next season.",
                metrics.money
            ))
        } else {
            Some(format!(
                "Saving up ${} more would let you expand the farm.",
                expand_cost - metrics.money
            ))
        }
    }

    fn seasonal(metrics: &FarmMetrics, days_per_season: u32) -> String {
        let days = days_per_season.max(1);
        let remaining = days - metrics.day % days;
        format!(
            "{} is approaching in {remaining} days. It's a good time to plan your next crops.",
            metrics.season.next()
        )
    }

    fn summary(state: &GameState, content: &GameContent, metrics: &FarmMetrics) -> String {
        let place = content
            .location(&state.meta.location)
            .map_or_else(|| state.meta.location.0.clone(), |def| def.name.clone());
        format!(
            "{place} in {}: soil moisture {:.0}%, NDVI {:.2}, {} of {} plots planted.",
            metrics.season,
            metrics.soil_moisture,
            metrics.ndvi,
            metrics.tiles_planted,
            metrics.tiles_unlocked
        )
    }
}

/// Suggestion for the dry planted plots, if the soil is dry enough.
pub fn water_suggestion(metrics: &FarmMetrics) -> Option<Suggestion> {
    (metrics.soil_moisture < SMART_WATER_MOISTURE && metrics.planted_unwatered > 0).then(|| {
        Suggestion {
            action: SuggestedAction::Water,
            message: format!(
                "Soil moisture is {:.0}%. Water the {} dry plots.",
                metrics.soil_moisture, metrics.planted_unwatered
            ),
            criteria: smallvec![
                Criterion::RequiresPlanted,
                Criterion::Watered { expected: false },
                Criterion::Threshold {
                    field: EnvField::SoilMoisture,
                    comparison: Comparison::LessThan,
                    value: SMART_WATER_MOISTURE,
                },
            ],
        }
    })
}

/// Suggestion for the unfertilized planted plots, if vegetation is weak.
pub fn fertilize_suggestion(metrics: &FarmMetrics) -> Option<Suggestion> {
    (metrics.ndvi < SMART_FERTILIZE_NDVI && metrics.planted_unfertilized > 0).then(|| Suggestion {
        action: SuggestedAction::Fertilize,
        message: format!(
            "NDVI is {:.2}. Fertilize the {} plots that need it.",
            metrics.ndvi, metrics.planted_unfertilized
        ),
        criteria: smallvec![
            Criterion::RequiresPlanted,
            Criterion::Fertilized { expected: false },
            Criterion::Threshold {
                field: EnvField::Ndvi,
                comparison: Comparison::LessThan,
                value: SMART_FERTILIZE_NDVI,
            },
        ],
    })
}

impl Advisor for FieldAnalyst {
    fn tip(&self, state: &GameState, content: &GameContent) -> Result<String, AdvisorError> {
        let metrics = compute_metrics(state);
        let tip = Self::tactical(&metrics)
            .or_else(|| Self::strategic(state, content, &metrics))
            .unwrap_or_else(|| Self::seasonal(&metrics, content.constants.days_per_season));
        Ok(tip)
    }

    fn analyze(&self, state: &GameState, content: &GameContent) -> Result<Analysis, AdvisorError> {
        let metrics = compute_metrics(state);
        Ok(Analysis {
            summary: Self::summary(state, content, &metrics),
            suggestion: water_suggestion(&metrics).or_else(|| fertilize_suggestion(&metrics)),
        })
    }
}
