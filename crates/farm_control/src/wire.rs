//! JSON shapes exchanged with a remote assistant.
//!
//! The remote side sends criteria as an open object of optional fields; they
//! are decoded here into the closed `Criterion` set. Anything outside that
//! set is rejected as malformed rather than guessed at.

use farm_core::{
    compute_metrics, Comparison, Criterion, EnvField, GameContent, GameState, Season,
    SuggestedAction, Suggestion,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::advisor::{AdvisorError, Analysis};

/// Farm snapshot posted to the remote assistant with every request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmContext {
    pub location: String,
    pub day: u32,
    pub season: Season,
    pub money: i64,
    pub level: u32,
    pub water: f32,
    pub energy: f32,
    pub planted_tiles: u32,
    pub unlocked_tiles: u32,
    pub unwatered_planted_tiles: u32,
    pub unfertilized_planted_tiles: u32,
    pub soil_moisture: f32,
    pub temperature: f32,
    pub ndvi: f32,
}

impl FarmContext {
    pub fn new(state: &GameState, content: &GameContent) -> Self {
        let metrics = compute_metrics(state);
        let location = content
            .location(&state.meta.location)
            .map_or_else(|| state.meta.location.0.clone(), |def| def.name.clone());
        Self {
            location,
            day: metrics.day,
            season: metrics.season,
            money: metrics.money,
            level: metrics.level,
            water: metrics.water,
            energy: metrics.energy,
            planted_tiles: metrics.tiles_planted,
            unlocked_tiles: metrics.tiles_unlocked,
            unwatered_planted_tiles: metrics.planted_unwatered,
            unfertilized_planted_tiles: metrics.planted_unfertilized,
            soil_moisture: metrics.soil_moisture,
            temperature: metrics.temperature,
            ndvi: metrics.ndvi,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WireTip {
    pub tip: String,
}

#[derive(Debug, Deserialize)]
pub struct WireAnalysis {
    pub summary: String,
    #[serde(default)]
    pub suggestion: Option<WireSuggestion>,
}

#[derive(Debug, Deserialize)]
pub struct WireSuggestion {
    pub action: String,
    pub message: String,
    #[serde(default)]
    pub criteria: WireCriteria,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCriteria {
    #[serde(default)]
    pub requires_planted: bool,
    pub is_watered: Option<bool>,
    pub is_fertilized: Option<bool>,
    pub soil_moisture: Option<WireThreshold>,
    pub ndvi: Option<WireThreshold>,
}

#[derive(Debug, Deserialize)]
pub struct WireThreshold {
    pub comparison: String,
    pub value: f32,
}

fn decode_action(action: &str) -> Result<SuggestedAction, AdvisorError> {
    match action {
        "water" => Ok(SuggestedAction::Water),
        "fertilize" => Ok(SuggestedAction::Fertilize),
        other => Err(AdvisorError::Malformed(format!("unknown action '{other}'"))),
    }
}

fn decode_threshold(field: EnvField, threshold: &WireThreshold) -> Result<Criterion, AdvisorError> {
    let comparison = match threshold.comparison.as_str() {
        "less_than" => Comparison::LessThan,
        "greater_than" => Comparison::GreaterThan,
        other => {
            return Err(AdvisorError::Malformed(format!(
                "unknown comparison '{other}'"
            )))
        }
    };
    if !threshold.value.is_finite() {
        return Err(AdvisorError::Malformed("threshold is not finite".to_string()));
    }
    Ok(Criterion::Threshold {
        field,
        comparison,
        value: threshold.value,
    })
}

impl TryFrom<WireSuggestion> for Suggestion {
    type Error = AdvisorError;

    fn try_from(wire: WireSuggestion) -> Result<Self, Self::Error> {
        let action = decode_action(&wire.action)?;
        let c = &wire.criteria;
        let mut criteria = SmallVec::new();
        if c.requires_planted {
            criteria.push(Criterion::RequiresPlanted);
        }
        if let Some(expected) = c.is_watered {
            criteria.push(Criterion::Watered { expected });
        }
        if let Some(expected) = c.is_fertilized {
            criteria.push(Criterion::Fertilized { expected });
        }
        if let Some(threshold) = &c.soil_moisture {
            criteria.push(decode_threshold(EnvField::SoilMoisture, threshold)?);
        }
        if let Some(threshold) = &c.ndvi {
            criteria.push(decode_threshold(EnvField::Ndvi, threshold)?);
        }
        Ok(Suggestion {
            action,
            message: wire.message,
            criteria,
        })
    }
}

impl TryFrom<WireAnalysis> for Analysis {
    type Error = AdvisorError;

    fn try_from(wire: WireAnalysis) -> Result<Self, Self::Error> {
        Ok(Analysis {
            summary: wire.summary,
            suggestion: wire.suggestion.map(Suggestion::try_from).transpose()?,
        })
    }
}

/// Decodes a raw analysis body.
pub fn parse_analysis(body: &str) -> Result<Analysis, AdvisorError> {
    let wire: WireAnalysis =
        serde_json::from_str(body).map_err(|err| AdvisorError::Malformed(err.to_string()))?;
    Analysis::try_from(wire)
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_core::test_fixtures::{base_content, base_state};

    #[test]
    fn full_water_suggestion_decodes() {
        let body = r#"{
            "summary": "Dry spell in the valley.",
            "suggestion": {
                "action": "water",
                "message": "Water the dry plots.",
                "criteria": {
                    "requiresPlanted": true,
                    "isWatered": false,
                    "soilMoisture": { "comparison": "less_than", "value": 40 }
                }
            }
        }"#;

        let analysis = parse_analysis(body).unwrap();

        let suggestion = analysis.suggestion.unwrap();
        assert_eq!(suggestion.action, SuggestedAction::Water);
        assert_eq!(
            suggestion.criteria.as_slice(),
            &[
                Criterion::RequiresPlanted,
                Criterion::Watered { expected: false },
                Criterion::Threshold {
                    field: EnvField::SoilMoisture,
                    comparison: Comparison::LessThan,
                    value: 40.0,
                },
            ]
        );
    }

    #[test]
    fn null_suggestion_is_none() {
        let analysis = parse_analysis(r#"{"summary": "All good.", "suggestion": null}"#).unwrap();
        assert!(analysis.suggestion.is_none());
        assert_eq!(analysis.summary, "All good.");
    }

    #[test]
    fn missing_criteria_decode_to_an_empty_set() {
        let body = r#"{"summary": "s", "suggestion": {"action": "fertilize", "message": "m"}}"#;
        let suggestion = parse_analysis(body).unwrap().suggestion.unwrap();
        assert!(suggestion.criteria.is_empty());
    }

    #[test]
    fn unknown_action_is_malformed() {
        let body = r#"{"summary": "s", "suggestion": {"action": "harvest", "message": "m"}}"#;
        assert!(matches!(parse_analysis(body), Err(AdvisorError::Malformed(_))));
    }

    #[test]
    fn unknown_comparison_is_malformed() {
        let body = r#"{"summary": "s", "suggestion": {"action": "water", "message": "m",
            "criteria": {"ndvi": {"comparison": "roughly", "value": 0.5}}}}"#;
        assert!(matches!(parse_analysis(body), Err(AdvisorError::Malformed(_))));
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(parse_analysis("{"), Err(AdvisorError::Malformed(_))));
    }

    #[test]
    fn context_uses_camel_case() {
        let content = base_content();
        let state = base_state(&content);

        let json = serde_json::to_value(FarmContext::new(&state, &content)).unwrap();

        assert_eq!(json["location"], "Central Valley, USA");
        assert_eq!(json["unlockedTiles"], 24);
        assert!(json.get("soilMoisture").is_some());
    }
}
