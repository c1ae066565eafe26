//! Resource & progression ledger: money, water, energy, XP, levels,
//! achievements and upgrades.

use crate::{
    AchievementId, Constants, Event, EventEnvelope, GameContent, GameState, Ledger, RejectReason,
    Resource, UpgradeId, UpgradeStat,
};

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("insufficient {resource}: need {needed}, have {available}")]
pub struct Insufficient {
    pub resource: Resource,
    pub needed: f32,
    pub available: f32,
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn round_money(amount: f32) -> i64 {
    amount.round() as i64
}

impl Ledger {
    pub fn available(&self, resource: Resource) -> f32 {
        match resource {
            Resource::Money => self.money as f32,
            Resource::Water => self.water,
            Resource::Energy => self.energy,
        }
    }

    /// Debits `amount`, or leaves the ledger untouched if it cannot cover it.
    pub fn spend(&mut self, resource: Resource, amount: f32) -> Result<(), Insufficient> {
        let available = self.available(resource);
        if amount > available {
            return Err(Insufficient {
                resource,
                needed: amount,
                available,
            });
        }
        match resource {
            Resource::Money => self.money -= round_money(amount),
            Resource::Water => self.water = (self.water - amount).max(0.0),
            Resource::Energy => self.energy = (self.energy - amount).max(0.0),
        }
        Ok(())
    }

    /// Water and energy are capped at their maximum.
    pub fn credit(&mut self, resource: Resource, amount: f32) {
        match resource {
            Resource::Money => self.money += round_money(amount),
            Resource::Water => self.water = (self.water + amount).min(self.max_water),
            Resource::Energy => self.energy = (self.energy + amount).min(self.max_energy),
        }
    }

    /// Adds XP and runs one level-up check.
    pub fn grant_xp(&mut self, amount: u64, thresholds: &[u64]) -> bool {
        self.xp += amount;
        self.check_level_up(thresholds)
    }

    /// Advances at most one level per call; `thresholds[level]` is the XP
    /// needed to leave `level`.
    pub fn check_level_up(&mut self, thresholds: &[u64]) -> bool {
        let Some(&next) = thresholds.get(self.level as usize) else {
            return false;
        };
        if self.xp >= next {
            self.level += 1;
            true
        } else {
            false
        }
    }

    /// Day-rollover regeneration. Precipitation tops up the water tank.
    pub fn regenerate_daily(&mut self, precipitation: f32, constants: &Constants) {
        let rain_bonus = precipitation.max(0.0) / 2.0;
        self.credit(Resource::Water, constants.daily_water_base + rain_bonus.round());
        self.credit(Resource::Energy, constants.daily_energy);
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|owned| owned.0 == id)
    }
}

/// Unlocks `id` and pays its reward. Unlocking an owned or unknown
/// achievement is a no-op.
pub(crate) fn unlock_achievement(
    state: &mut GameState,
    content: &GameContent,
    id: &str,
    events: &mut Vec<EventEnvelope>,
) {
    if state.ledger.has_achievement(id) {
        return;
    }
    let Some(def) = content.achievement(id) else {
        return;
    };
    state.ledger.achievements.push(AchievementId(id.to_string()));
    state.ledger.money += def.reward;
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::AchievementUnlocked {
            id: def.id.clone(),
            name: def.name.clone(),
            reward: def.reward,
        },
    ));
}

fn announce_level(state: &mut GameState, leveled_up: bool, events: &mut Vec<EventEnvelope>) {
    if leveled_up {
        events.push(crate::emit(
            &mut state.counters,
            state.meta.tick,
            Event::LevelUp {
                level: state.ledger.level,
            },
        ));
    }
}

pub(crate) fn check_level_up(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    let leveled_up = state
        .ledger
        .check_level_up(&content.constants.level_thresholds);
    announce_level(state, leveled_up, events);
}

/// Adds XP and runs one level check, announcing a level-up.
pub(crate) fn grant_xp(
    state: &mut GameState,
    content: &GameContent,
    amount: u64,
    events: &mut Vec<EventEnvelope>,
) {
    let leveled_up = state
        .ledger
        .grant_xp(amount, &content.constants.level_thresholds);
    announce_level(state, leveled_up, events);
}

fn reject(state: &mut GameState, reason: RejectReason, events: &mut Vec<EventEnvelope>) {
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::ActionRejected { reason },
    ));
}

/// Buys an upgrade from the market.
///
/// Multiplier stats compound into the running modifiers; capacity stats
/// replace the tank maximum and clamp the current amount to it.
pub(crate) fn purchase_upgrade(
    state: &mut GameState,
    content: &GameContent,
    id: &UpgradeId,
    events: &mut Vec<EventEnvelope>,
) {
    let Some(def) = content.upgrade(id) else {
        reject(state, RejectReason::UnknownUpgrade { id: id.clone() }, events);
        return;
    };
    if state.ledger.upgrades.contains_key(id) {
        reject(state, RejectReason::UpgradeOwned { id: id.clone() }, events);
        return;
    }
    if state.ledger.level < def.level_required {
        let required = def.level_required;
        reject(state, RejectReason::LevelTooLow { required }, events);
        return;
    }
    if state.ledger.money < def.cost {
        let cost = def.cost;
        reject(state, RejectReason::UpgradeUnaffordable { cost }, events);
        return;
    }

    let ledger = &mut state.ledger;
    ledger.money -= def.cost;
    ledger.upgrades.insert(def.id.clone(), def.modifier);
    match def.stat {
        UpgradeStat::WaterCostMultiplier => ledger.modifiers.water_cost *= def.modifier,
        UpgradeStat::EnergyCostMultiplier => ledger.modifiers.energy_cost *= def.modifier,
        UpgradeStat::HarvestYieldMultiplier => ledger.modifiers.harvest_yield *= def.modifier,
        UpgradeStat::XpMultiplier => ledger.modifiers.xp *= def.modifier,
        UpgradeStat::WaterCapacity => {
            ledger.max_water = def.modifier;
            ledger.water = ledger.water.min(ledger.max_water);
        }
        UpgradeStat::EnergyCapacity => {
            ledger.max_energy = def.modifier;
            ledger.energy = ledger.energy.min(ledger.max_energy);
        }
    }

    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::UpgradePurchased {
            id: def.id.clone(),
            name: def.name.clone(),
            cost: def.cost,
        },
    ));
}
