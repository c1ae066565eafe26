use crate::advisor::request_tip;
use crate::state::AppState;
use std::time::Duration;
use tokio::task::JoinHandle;

pub async fn run_tick_loop(app: AppState, max_ticks: Option<u64>) {
    let mut interval = if app.ticks_per_sec > 0.0 {
        let mut iv = tokio::time::interval(Duration::from_secs_f64(1.0 / app.ticks_per_sec));
        iv.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        Some(iv)
    } else {
        None
    };

    loop {
        let (events, done) = {
            let mut session = app.session.lock();
            let events = session.step();
            let done = max_ticks.is_some_and(|max| session.game_state.meta.tick >= max);
            (events, done)
        };

        app.publish(events);

        if done {
            tracing::info!("tick limit reached, stopping scheduler");
            break;
        }

        if let Some(ref mut iv) = interval {
            iv.tick().await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}

/// Refreshes the assistant tip on a fixed period. A refresh that finds a
/// tip request already in flight is skipped.
pub async fn run_tip_loop(app: AppState, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    interval.tick().await; // discard the immediate first tick
    loop {
        interval.tick().await;
        match request_tip(&app).await {
            Ok(tip) => tracing::debug!(%tip, "tip refreshed"),
            Err(_) => tracing::debug!("tip refresh skipped, request in flight"),
        }
    }
}

/// Owns the session's periodic tasks. Dropping it aborts them.
pub struct SessionTasks {
    handles: Vec<JoinHandle<()>>,
}

impl SessionTasks {
    pub fn spawn(app: &AppState, tip_every: Option<Duration>, max_ticks: Option<u64>) -> Self {
        let mut handles = vec![tokio::spawn(run_tick_loop(app.clone(), max_ticks))];
        if let Some(every) = tip_every {
            handles.push(tokio::spawn(run_tip_loop(app.clone(), every)));
        }
        Self { handles }
    }

    /// Aborts every task and waits for each to finish unwinding.
    pub async fn shutdown(mut self) {
        let handles = std::mem::take(&mut self.handles);
        for handle in &handles {
            handle.abort();
        }
        for handle in handles {
            // A cancelled task reports a JoinError; that is the expected outcome.
            let _ = handle.await;
        }
        tracing::info!("session tasks stopped");
    }

    pub fn is_running(&self) -> bool {
        self.handles.iter().any(|handle| !handle.is_finished())
    }
}

impl Drop for SessionTasks {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_app;

    #[tokio::test]
    async fn tick_loop_stops_at_the_limit() {
        let app = test_app(0.0);

        run_tick_loop(app.clone(), Some(48)).await;

        let session = app.session.lock();
        assert_eq!(session.game_state.meta.tick, 48);
        assert_eq!(session.game_state.ledger.day, 3);
    }

    #[tokio::test]
    async fn tick_batches_reach_subscribers() {
        let app = test_app(0.0);
        app.session.lock().autoplayer = Some(farm_control::AutoFarmer::default());
        let mut rx = app.event_tx.subscribe();

        run_tick_loop(app.clone(), Some(1)).await;

        let batch = rx.recv().await.unwrap();
        assert!(batch
            .iter()
            .any(|e| matches!(e.event, farm_core::Event::Planted { .. })));
    }

    #[tokio::test]
    async fn dropping_tasks_aborts_the_timers() {
        let app = test_app(1_000.0);
        let tasks = SessionTasks::spawn(&app, Some(Duration::from_millis(5)), None);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(tasks.is_running());

        tasks.shutdown().await;

        let tick = app.session.lock().game_state.meta.tick;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(app.session.lock().game_state.meta.tick, tick);
    }
}
