use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use crate::history::HistoryFile;
use crate::models::{
    HistoryEntry, LoadingStage, PredictionResult, UserInputs, WeatherData,
};

const EVENT_CAPACITY: usize = 64;

/// Everything the presentation surfaces render from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionState {
    pub user_inputs: Option<UserInputs>,
    pub weather: Option<WeatherData>,
    pub result: Option<PredictionResult>,
    pub loading_stage: Option<LoadingStage>,
    /// Most recent first
    pub history: Vec<HistoryEntry>,
    pub error: Option<String>,
}

impl PredictionState {
    pub fn with_history(history: Vec<HistoryEntry>) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetInputs(UserInputs),
    SetWeather(WeatherData),
    SetResult(PredictionResult),
    SetLoadingStage(Option<LoadingStage>),
    AddHistory(HistoryEntry),
    SetError(Option<String>),
    ResetPrediction,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetInputs(_) => "set_inputs",
            Action::SetWeather(_) => "set_weather",
            Action::SetResult(_) => "set_result",
            Action::SetLoadingStage(_) => "set_loading_stage",
            Action::AddHistory(_) => "add_history",
            Action::SetError(_) => "set_error",
            Action::ResetPrediction => "reset_prediction",
        }
    }

    fn touches_history(&self) -> bool {
        matches!(self, Action::AddHistory(_))
    }
}

/// Applies one action. Total and side-effect free.
pub fn reduce(state: PredictionState, action: Action) -> PredictionState {
    match action {
        Action::SetInputs(inputs) => PredictionState {
            user_inputs: Some(inputs),
            error: None,
            ..state
        },
        Action::SetWeather(weather) => PredictionState {
            weather: Some(weather),
            ..state
        },
        Action::SetResult(result) => PredictionState {
            result: Some(result),
            loading_stage: None,
            ..state
        },
        Action::SetLoadingStage(stage) => PredictionState {
            loading_stage: stage,
            ..state
        },
        Action::AddHistory(entry) => {
            let mut history = Vec::with_capacity(state.history.len() + 1);
            history.push(entry);
            history.extend(state.history);
            PredictionState { history, ..state }
        }
        Action::SetError(error) => PredictionState {
            error,
            loading_stage: None,
            ..state
        },
        Action::ResetPrediction => PredictionState::with_history(state.history),
    }
}

struct StoreInner {
    state: Mutex<PredictionState>,
    history_file: Option<HistoryFile>,
    events: broadcast::Sender<Action>,
}

/// Shared handle to the prediction state. `dispatch` is the only way to change it.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Rehydrates history from `history_file` and persists every later change to it
    pub fn open(history_file: HistoryFile) -> Self {
        tracing::info!("Using history at {}", history_file.path().display());
        let history = history_file.load();
        Self::build(PredictionState::with_history(history), Some(history_file))
    }

    /// Store without durable history
    pub fn in_memory(state: PredictionState) -> Self {
        Self::build(state, None)
    }

    fn build(state: PredictionState, history_file: Option<HistoryFile>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(state),
                history_file,
                events,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PredictionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn dispatch(&self, action: Action) {
        tracing::debug!(action = action.name(), "dispatch");

        let mut state = self.lock();
        let current = std::mem::take(&mut *state);
        *state = reduce(current, action.clone());

        if action.touches_history() {
            if let Some(file) = &self.inner.history_file {
                if let Err(e) = file.save(&state.history) {
                    tracing::warn!("Failed to persist history: {:#}", e);
                }
            }
        }

        // Sent under the lock so subscribers see actions in applied order.
        // Nobody listening is fine.
        let _ = self.inner.events.send(action);
    }

    pub fn snapshot(&self) -> PredictionState {
        self.lock().clone()
    }

    pub fn user_inputs(&self) -> Option<UserInputs> {
        self.lock().user_inputs.clone()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.lock().history.clone()
    }

    /// Every action applied after this call, in order
    pub fn subscribe(&self) -> broadcast::Receiver<Action> {
        self.inner.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
