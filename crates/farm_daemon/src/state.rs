use crate::advisor::AdvisorDesk;
use farm_control::{AutoFarmer, CommandSource};
use farm_core::{Command, EventEnvelope, GameContent, GameState};
use parking_lot::Mutex;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tokio::sync::broadcast;

pub struct Session {
    pub game_state: GameState,
    pub content: GameContent,
    pub rng: ChaCha8Rng,
    /// Drives the farm on every tick when set.
    pub autoplayer: Option<AutoFarmer>,
    pub next_command_id: u64,
}

impl Session {
    /// Applies one player command immediately.
    pub fn apply(&mut self, command: &Command) -> Vec<EventEnvelope> {
        let mut events = Vec::new();
        farm_core::apply_command(&mut self.game_state, command, &self.content, &mut events);
        events
    }

    /// One scheduler firing, including any autoplayer commands.
    pub fn step(&mut self) -> Vec<EventEnvelope> {
        let commands = match self.autoplayer.as_mut() {
            Some(autoplayer) => autoplayer.generate_commands(
                &self.game_state,
                &self.content,
                &mut self.next_command_id,
            ),
            None => Vec::new(),
        };
        farm_core::tick(&mut self.game_state, &commands, &self.content, &mut self.rng)
    }
}

pub type SharedSession = Arc<Mutex<Session>>;
pub type EventTx = broadcast::Sender<Vec<EventEnvelope>>;

#[derive(Clone)]
pub struct AppState {
    pub session: SharedSession,
    pub event_tx: EventTx,
    pub desk: Arc<AdvisorDesk>,
    pub ticks_per_sec: f64,
}

impl AppState {
    /// Fans a batch out to stream subscribers. Empty batches are dropped.
    pub fn publish(&self, events: Vec<EventEnvelope>) {
        if !events.is_empty() {
            // No subscribers is not an error.
            let _ = self.event_tx.send(events);
        }
    }
}
