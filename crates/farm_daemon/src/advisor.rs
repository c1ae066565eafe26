//! Assistant plumbing for the daemon: backend selection, the remote HTTP
//! client, and the desk that serializes requests against the live session.
//!
//! Requests never hold the session lock across an await. The desk hands out
//! a generation number per analysis; a result that comes back after the
//! generation has moved on is dropped instead of installing its suggestion.

use crate::state::{AppState, SharedSession};
use farm_control::wire::{parse_analysis, FarmContext, WireTip};
use farm_control::{
    analysis_or_fallback, tip_or_fallback, Advisor, AdvisorError, Analysis, FieldAnalyst,
};
use farm_core::{Command, EventEnvelope, Suggestion};
use parking_lot::Mutex;
use serde::Serialize;
use std::time::Duration;

pub const URL_ENV: &str = "FARM_ADVISOR_URL";
pub const API_KEY_ENV: &str = "FARM_ADVISOR_API_KEY";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const WELCOME_TIP: &str = "Welcome! I am Terra, your AI assistant. Let's get planting!";

// ---------------------------------------------------------------------------
// Remote client
// ---------------------------------------------------------------------------

pub struct RemoteAdvisor {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RemoteAdvisor {
    pub fn new(base_url: &str, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Posts the farm context and returns the raw response body.
    async fn post(&self, path: &str, context: &FarmContext) -> Result<String, AdvisorError> {
        let response = self
            .client
            .post(format!("{}/{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(context)
            .send()
            .await
            .map_err(|err| AdvisorError::Unavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::Unavailable(format!("{path} returned {status}")));
        }
        response
            .text()
            .await
            .map_err(|err| AdvisorError::Unavailable(err.to_string()))
    }

    pub async fn tip(&self, context: &FarmContext) -> Result<String, AdvisorError> {
        let body = self.post("tip", context).await?;
        serde_json::from_str::<WireTip>(&body)
            .map(|wire| wire.tip)
            .map_err(|err| AdvisorError::Malformed(err.to_string()))
    }

    pub async fn analyze(&self, context: &FarmContext) -> Result<Analysis, AdvisorError> {
        let body = self.post("analysis", context).await?;
        parse_analysis(&body)
    }
}

// ---------------------------------------------------------------------------
// Backend selection
// ---------------------------------------------------------------------------

pub enum AdvisorBackend {
    Local(FieldAnalyst),
    Remote(RemoteAdvisor),
    Offline,
}

impl AdvisorBackend {
    /// No URL: the local analyst. URL without a key: offline for the session.
    pub fn from_settings(url: Option<String>, api_key: Option<String>) -> Self {
        let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
            return AdvisorBackend::Local(FieldAnalyst);
        };
        match api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => {
                tracing::info!(%url, "using remote assistant");
                AdvisorBackend::Remote(RemoteAdvisor::new(&url, key))
            }
            None => {
                tracing::warn!("{URL_ENV} is set but {API_KEY_ENV} is not; assistant offline");
                AdvisorBackend::Offline
            }
        }
    }

    pub fn from_env() -> Self {
        Self::from_settings(std::env::var(URL_ENV).ok(), std::env::var(API_KEY_ENV).ok())
    }

    pub fn name(&self) -> &'static str {
        match self {
            AdvisorBackend::Local(_) => "local",
            AdvisorBackend::Remote(_) => "remote",
            AdvisorBackend::Offline => "offline",
        }
    }

    async fn tip(&self, session: &SharedSession) -> Result<String, AdvisorError> {
        match self {
            AdvisorBackend::Local(analyst) => {
                let guard = session.lock();
                analyst.tip(&guard.game_state, &guard.content)
            }
            AdvisorBackend::Remote(remote) => {
                let context = {
                    let guard = session.lock();
                    FarmContext::new(&guard.game_state, &guard.content)
                };
                remote.tip(&context).await
            }
            AdvisorBackend::Offline => Err(AdvisorError::Offline),
        }
    }

    async fn analyze(&self, session: &SharedSession) -> Result<Analysis, AdvisorError> {
        match self {
            AdvisorBackend::Local(analyst) => {
                let guard = session.lock();
                analyst.analyze(&guard.game_state, &guard.content)
            }
            AdvisorBackend::Remote(remote) => {
                let context = {
                    let guard = session.lock();
                    FarmContext::new(&guard.game_state, &guard.content)
                };
                remote.analyze(&context).await
            }
            AdvisorBackend::Offline => Err(AdvisorError::Offline),
        }
    }
}

// ---------------------------------------------------------------------------
// Desk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DeskView {
    pub backend: &'static str,
    pub tip: String,
    pub tip_busy: bool,
    pub analysis_busy: bool,
    pub generation: u64,
    pub pending: Option<Suggestion>,
}

struct DeskState {
    tip: String,
    tip_busy: bool,
    analysis_busy: bool,
    generation: u64,
    pending: Option<Suggestion>,
}

/// Outcome of a request that got past the busy check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Ready { analysis: Analysis },
    /// Another request started while this one was in flight.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Busy;

pub struct AdvisorDesk {
    backend: AdvisorBackend,
    inner: Mutex<DeskState>,
}

impl AdvisorDesk {
    pub fn new(backend: AdvisorBackend) -> Self {
        Self {
            backend,
            inner: Mutex::new(DeskState {
                tip: WELCOME_TIP.to_string(),
                tip_busy: false,
                analysis_busy: false,
                generation: 0,
                pending: None,
            }),
        }
    }

    pub fn view(&self) -> DeskView {
        let inner = self.inner.lock();
        DeskView {
            backend: self.backend.name(),
            tip: inner.tip.clone(),
            tip_busy: inner.tip_busy,
            analysis_busy: inner.analysis_busy,
            generation: inner.generation,
            pending: inner.pending.clone(),
        }
    }

    pub fn begin_tip(&self) -> Result<u64, Busy> {
        let mut inner = self.inner.lock();
        if inner.tip_busy {
            return Err(Busy);
        }
        inner.tip_busy = true;
        inner.generation += 1;
        inner.pending = None;
        Ok(inner.generation)
    }

    pub fn finish_tip(&self, tip: String) {
        let mut inner = self.inner.lock();
        inner.tip_busy = false;
        inner.tip = tip;
    }

    pub fn begin_analysis(&self) -> Result<u64, Busy> {
        let mut inner = self.inner.lock();
        if inner.analysis_busy {
            return Err(Busy);
        }
        inner.analysis_busy = true;
        inner.generation += 1;
        inner.pending = None;
        Ok(inner.generation)
    }

    /// Installs the result only if `generation` is still current.
    pub fn finish_analysis(&self, generation: u64, analysis: Analysis) -> AnalysisOutcome {
        let mut inner = self.inner.lock();
        inner.analysis_busy = false;
        if inner.generation != generation {
            tracing::debug!(generation, current = inner.generation, "discarding stale analysis");
            return AnalysisOutcome::Superseded;
        }
        inner.tip.clone_from(&analysis.summary);
        inner.pending.clone_from(&analysis.suggestion);
        AnalysisOutcome::Ready { analysis }
    }

    /// Consumes the pending suggestion.
    pub fn take_pending(&self) -> Option<Suggestion> {
        let mut inner = self.inner.lock();
        let pending = inner.pending.take();
        if pending.is_some() {
            inner.generation += 1;
        }
        pending
    }
}

// ---------------------------------------------------------------------------
// Request flows
// ---------------------------------------------------------------------------

pub async fn request_tip(app: &AppState) -> Result<String, Busy> {
    app.desk.begin_tip()?;
    let tip = tip_or_fallback(app.desk.backend.tip(&app.session).await);
    app.desk.finish_tip(tip.clone());
    Ok(tip)
}

pub async fn request_analysis(app: &AppState) -> Result<AnalysisOutcome, Busy> {
    let generation = app.desk.begin_analysis()?;
    let analysis = analysis_or_fallback(app.desk.backend.analyze(&app.session).await);
    Ok(app.desk.finish_analysis(generation, analysis))
}

/// Reconciles the pending suggestion against the live state.
/// `None` when nothing is pending.
pub fn apply_pending(app: &AppState) -> Option<Vec<EventEnvelope>> {
    let suggestion = app.desk.take_pending()?;
    let events = app
        .session
        .lock()
        .apply(&Command::ApplySuggestion { suggestion });
    app.publish(events.clone());
    Some(events)
}
