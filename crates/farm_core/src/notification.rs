//! User-facing rendering of simulation events.

use serde::Serialize;

use crate::{Event, NoticeLevel, RejectReason};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notification {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

fn rejection(reason: &RejectReason) -> String {
    match reason {
        RejectReason::NoToolSelected => "Please select a tool from the side panel first.".to_string(),
        RejectReason::TileLocked => {
            "This land is locked. Use the expand tool to purchase it.".to_string()
        }
        RejectReason::ExpansionUnaffordable { cost } => format!("You need ${cost} to expand here."),
        RejectReason::UnknownUpgrade { id } => format!("The market has no upgrade called {id}."),
        RejectReason::UpgradeOwned { id } => format!("You already own {id}."),
        RejectReason::LevelTooLow { required } => {
            format!("You need to reach level {required} for that upgrade.")
        }
        RejectReason::UpgradeUnaffordable { cost } => {
            format!("You need ${cost} to buy that upgrade.")
        }
    }
}

/// Renders the player-visible events; bookkeeping events yield `None`.
pub fn notification(event: &Event) -> Option<Notification> {
    use NoticeLevel::{Achievement, Info, LevelUp, Success, Warning};

    let rendered = match event {
        Event::ToolSelected { .. } | Event::DayStarted { .. } | Event::TileInspected { .. } => {
            return None;
        }
        Event::Planted { crop_name, .. } => Notification::new(Success, format!("Planted {crop_name}!")),
        Event::Watered { bonus, .. } if *bonus > 0 => Notification::new(
            Success,
            format!("Smart watering! Soil is dry. (+${bonus})"),
        ),
        Event::Watered { .. } => Notification::new(Info, "Watered the plant."),
        Event::Fertilized { bonus, .. } if *bonus > 0 => Notification::new(
            Success,
            format!("Great timing! NDVI was low. (+${bonus})"),
        ),
        Event::Fertilized { .. } => Notification::new(Info, "Fertilized the plant."),
        Event::Harvested { money, xp, .. } => {
            Notification::new(Success, format!("Harvested for ${money} and {xp} XP!"))
        }
        Event::LandPurchased { .. } => {
            Notification::new(Success, "Land purchased! Your farm is growing.")
        }
        Event::ActionRejected { reason } => Notification::new(Warning, rejection(reason)),
        Event::ReadyToHarvest { crop_name, .. } => {
            Notification::new(Info, format!("{crop_name} is ready to harvest!"))
        }
        Event::RainWatered { count } => {
            Notification::new(Info, format!("The rain watered {count} of your crops!"))
        }
        Event::AchievementUnlocked { name, .. } => Notification::new(Achievement, name.clone()),
        Event::LevelUp { level } => {
            Notification::new(LevelUp, format!("Level Up! You've reached Level {level}!"))
        }
        Event::SeasonChanged { season } => {
            Notification::new(Info, format!("The season has changed to {season}!"))
        }
        Event::UpgradePurchased { name, .. } => {
            Notification::new(Success, format!("Purchased {name}!"))
        }
        Event::SuggestionApplied { affected, .. } => Notification::new(
            Success,
            format!("Terra's suggestion applied! Affected {affected} plots."),
        ),
        Event::SuggestionRejected { .. } => Notification::new(
            Warning,
            "Couldn't apply suggestion. Either no plots met the criteria or you lack resources.",
        ),
        Event::ProactiveNotice { level, message, .. } => {
            Notification::new(*level, format!("Terra: {message}"))
        }
    };
    Some(rendered)
}
