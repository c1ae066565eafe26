//! `farm_core`: deterministic farm simulation.
//!
//! No IO, no network. All randomness via the passed-in Rng.

pub mod actions;
mod engine;
pub mod environment;
pub mod growth;
mod id;
pub mod ledger;
pub mod metrics;
pub mod notices;
pub mod notification;
pub mod suggestion;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use actions::{apply_command, tile_report};
pub use engine::tick;
pub use id::generate_session_id;
pub use ledger::Insufficient;
pub use metrics::{compute_metrics, FarmMetrics};
pub use notification::{notification, Notification};
pub use suggestion::{plan as plan_suggestion, ReconcileOutcome};
pub use types::*;

pub(crate) fn emit(counters: &mut Counters, tick: u64, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope { id, tick, event }
}

#[cfg(test)]
mod tests;
