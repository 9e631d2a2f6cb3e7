use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::api::{RiskPredictor, WeatherClient};
use crate::constants::{HEAT_INDEX_PACING, STRESS_PACING};
use crate::error::{AdvisoryError, AdvisoryResult};
use crate::models::{HistoryEntry, LoadingStage, UserInputs};
use crate::store::{Action, Store};

/// Delays of the two stages that only pace the progress display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub heat_index: Duration,
    pub stress: Duration,
}

impl Pacing {
    pub fn standard() -> Self {
        Self {
            heat_index: HEAT_INDEX_PACING,
            stress: STRESS_PACING,
        }
    }

    pub fn none() -> Self {
        Self {
            heat_index: Duration::ZERO,
            stress: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
}

/// How a trigger ended
#[derive(Debug)]
pub enum RunOutcome {
    /// Result stored and recorded in history; show the results view
    Completed(HistoryEntry),
    /// Error stored; show the failure view and wait for a manual retry
    Failed(AdvisoryError),
    /// Nothing submitted yet; send the user back to the input form
    NeedsInputs,
    /// Another run is in flight, this trigger did nothing
    AlreadyRunning,
}

/// Returns the phase to idle however the run ends
struct RunGuard {
    phase: Arc<Mutex<RunPhase>>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = RunPhase::Idle;
    }
}

/// Drives one assessment through its stages, one run at a time
#[derive(Clone)]
pub struct Orchestrator {
    store: Store,
    weather: Arc<dyn WeatherClient>,
    predictor: Arc<dyn RiskPredictor>,
    pacing: Pacing,
    phase: Arc<Mutex<RunPhase>>,
}

impl Orchestrator {
    pub fn new(
        store: Store,
        weather: Arc<dyn WeatherClient>,
        predictor: Arc<dyn RiskPredictor>,
        pacing: Pacing,
    ) -> Self {
        Self {
            store,
            weather,
            predictor,
            pacing,
            phase: Arc::new(Mutex::new(RunPhase::Idle)),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn phase(&self) -> RunPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_begin(&self) -> Option<RunGuard> {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if *phase == RunPhase::Running {
            return None;
        }
        *phase = RunPhase::Running;
        Some(RunGuard {
            phase: Arc::clone(&self.phase),
        })
    }

    /// Stores fresh inputs and runs them. Rejected while another run is in flight,
    /// so the running assessment never sees its inputs replaced.
    ///
    /// The previous assessment's weather and result are cleared first; a view
    /// never pairs one run's prediction with another run's weather.
    pub async fn submit(&self, inputs: UserInputs) -> RunOutcome {
        let Some(guard) = self.try_begin() else {
            tracing::info!("Assessment already in progress, ignoring submission");
            return RunOutcome::AlreadyRunning;
        };

        self.store.dispatch(Action::ResetPrediction);
        self.store.dispatch(Action::SetInputs(inputs));
        self.spawn_run(guard).await
    }

    /// Runs the inputs already in the store
    pub async fn run(&self) -> RunOutcome {
        let Some(guard) = self.try_begin() else {
            tracing::info!("Assessment already in progress, ignoring trigger");
            return RunOutcome::AlreadyRunning;
        };

        self.spawn_run(guard).await
    }

    /// The run is its own task: it reaches success or failure even if the
    /// caller stops waiting for it.
    async fn spawn_run(&self, guard: RunGuard) -> RunOutcome {
        let this = self.clone();
        match tokio::spawn(async move { this.drive(guard).await }).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                tracing::error!("Assessment task cancelled: {}", e);
                let err = AdvisoryError::Interrupted;
                self.store.dispatch(Action::SetError(Some(err.to_string())));
                RunOutcome::Failed(err)
            }
        }
    }

    async fn drive(&self, _guard: RunGuard) -> RunOutcome {
        let Some(inputs) = self.store.user_inputs() else {
            tracing::warn!("No assessment inputs in store, redirecting to input collection");
            return RunOutcome::NeedsInputs;
        };

        match self.execute(&inputs).await {
            Ok(entry) => {
                tracing::info!(
                    "Assessment {} complete: {} risk ({}%)",
                    entry.id,
                    entry.result.risk_category.as_str(),
                    entry.result.risk_percentage
                );
                RunOutcome::Completed(entry)
            }
            Err(e) => {
                tracing::error!(
                    origin = e.service().map(|s| s.as_str()).unwrap_or("client"),
                    "Assessment failed: {}",
                    e
                );
                self.store.dispatch(Action::SetError(Some(e.to_string())));
                RunOutcome::Failed(e)
            }
        }
    }

    async fn execute(&self, inputs: &UserInputs) -> AdvisoryResult<HistoryEntry> {
        self.enter(LoadingStage::FetchingWeather);
        let location = inputs.location_query()?;
        let weather = self.weather.fetch_weather(&location).await?;
        self.store.dispatch(Action::SetWeather(weather.clone()));

        self.enter(LoadingStage::CalculatingHeatIndex);
        pace(self.pacing.heat_index).await;

        self.enter(LoadingStage::EvaluatingStress);
        pace(self.pacing.stress).await;

        self.enter(LoadingStage::GeneratingRecommendations);
        let result = self.predictor.predict_risk(inputs, &weather).await?;
        self.store.dispatch(Action::SetResult(result.clone()));

        let entry = HistoryEntry {
            id: Uuid::new_v4().to_string(),
            inputs: inputs.clone(),
            result,
            timestamp: Utc::now(),
        };
        self.store.dispatch(Action::AddHistory(entry.clone()));
        Ok(entry)
    }

    fn enter(&self, stage: LoadingStage) {
        tracing::info!("Stage {}: {}", stage.position() + 1, stage.label());
        self.store.dispatch(Action::SetLoadingStage(Some(stage)));
    }
}

async fn pace(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
