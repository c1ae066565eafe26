//! Proactive farm-health notices.
//!
//! An ordered rule table evaluated against a metrics snapshot. The first
//! matching rule fires, and then nothing fires again until the cooldown has
//! elapsed.

use crate::metrics::{compute_metrics, FarmMetrics};
use crate::{Event, EventEnvelope, GameContent, GameState, NoticeLevel};

type CheckFn = fn(&FarmMetrics) -> bool;
type MessageFn = fn(&FarmMetrics) -> String;

struct NoticeRule {
    id: &'static str,
    level: NoticeLevel,
    check: CheckFn,
    message: MessageFn,
}

const RULES: &[NoticeRule] = &[
    NoticeRule {
        id: "LOW_WATER",
        level: NoticeLevel::Warning,
        check: |m| m.water < 20.0,
        message: |_| "Your water tank is nearly empty. Remember to refill it!".to_string(),
    },
    NoticeRule {
        id: "DRY_SOIL",
        level: NoticeLevel::Warning,
        check: |m| m.soil_moisture < 25.0 && m.planted_unwatered > 0,
        message: |_| "The soil is very dry! Your crops are thirsty.".to_string(),
    },
    NoticeRule {
        id: "HARVEST_BACKLOG",
        level: NoticeLevel::Info,
        check: |m| m.harvest_ready > 5,
        message: |m| format!("{} crops are ready to harvest! Great work.", m.harvest_ready),
    },
];

pub fn rule_ids() -> impl Iterator<Item = &'static str> {
    RULES.iter().map(|rule| rule.id)
}

fn cooled_down(state: &GameState, cooldown: u64) -> bool {
    state
        .notices
        .last_notice_tick
        .is_none_or(|last| state.meta.tick.saturating_sub(last) > cooldown)
}

/// Fires at most one notice; records the tick when one fires.
pub(crate) fn evaluate(state: &mut GameState, content: &GameContent, events: &mut Vec<EventEnvelope>) {
    if !cooled_down(state, content.constants.notice_cooldown_ticks) {
        return;
    }
    let metrics = compute_metrics(state);
    let Some(rule) = RULES.iter().find(|rule| (rule.check)(&metrics)) else {
        return;
    };

    state.notices.last_notice_tick = Some(state.meta.tick);
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::ProactiveNotice {
            rule: rule.id.to_string(),
            level: rule.level,
            message: (rule.message)(&metrics),
        },
    ));
}
