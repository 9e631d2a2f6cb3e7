use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use crate::api::{RiskPredictor, WeatherClient};
use crate::error::AdvisoryResult;
use crate::models::{
    ActivityLevel, AgeGroup, FactorSeverity, HistoryEntry, HydrationLevel, LocationQuery,
    PredictionMetadata, PredictionResult, Recommendation, RiskCategory, RiskFactor, Urgency,
    UserInputs, WeatherData, WeatherSource,
};

pub fn dubai_inputs() -> UserInputs {
    UserInputs {
        city: "Dubai".to_string(),
        latitude: None,
        longitude: None,
        exposure_duration: 6,
        activity_level: ActivityLevel::Heavy,
        hydration_level: HydrationLevel::Moderate,
        age_group: AgeGroup::From26To35,
    }
}

pub fn dubai_weather() -> WeatherData {
    WeatherData {
        temperature: 42.0,
        humidity: 65.0,
        heat_index: Some(52.0),
        wind_speed: 8.0,
        uv_index: Some(11.0),
        condition: "Clear Sky".to_string(),
        location_name: None,
        source: WeatherSource::LiveApi,
    }
}

pub fn prediction(category: RiskCategory, percentage: u8) -> PredictionResult {
    PredictionResult {
        risk_category: category,
        risk_percentage: percentage,
        summary: "High heat stress risk detected.".to_string(),
        factors: vec![
            RiskFactor {
                icon: "thermometer".to_string(),
                label: "Temperature".to_string(),
                severity: FactorSeverity::High,
                value: "42\u{00b0}C".to_string(),
            },
            RiskFactor {
                icon: "droplets".to_string(),
                label: "Humidity".to_string(),
                severity: FactorSeverity::High,
                value: "65%".to_string(),
            },
        ],
        recommendations: vec![
            Recommendation {
                title: "Immediate Hydration Protocol".to_string(),
                explanation: "Consume 250ml of water every 15 minutes.".to_string(),
                urgency: Urgency::High,
            },
            Recommendation {
                title: "Buddy System".to_string(),
                explanation: "Pair workers to monitor each other.".to_string(),
                urgency: Urgency::Low,
            },
        ],
        metadata: PredictionMetadata {
            location: "Dubai, UAE".to_string(),
            timestamp: "2026-07-01T12:00:00Z".to_string(),
            environmental_snapshot: "Clear sky, 42\u{00b0}C, 65% humidity".to_string(),
        },
    }
}

pub fn high_risk() -> PredictionResult {
    prediction(RiskCategory::High, 78)
}

pub fn history_entry(id: &str, percentage: u8) -> HistoryEntry {
    HistoryEntry {
        id: id.to_string(),
        inputs: dubai_inputs(),
        result: prediction(RiskCategory::Moderate, percentage),
        timestamp: Utc::now(),
    }
}

/// Weather client returning a canned outcome, optionally held until released
pub struct FakeWeather {
    outcome: AdvisoryResult<WeatherData>,
    gate: Option<Arc<Notify>>,
    pub calls: Mutex<Vec<LocationQuery>>,
}

impl FakeWeather {
    pub fn ok(weather: WeatherData) -> Self {
        Self::with_outcome(Ok(weather))
    }

    pub fn with_outcome(outcome: AdvisoryResult<WeatherData>) -> Self {
        Self {
            outcome,
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn gated(weather: WeatherData, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::ok(weather)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

#[async_trait]
impl WeatherClient for FakeWeather {
    async fn fetch_weather(&self, location: &LocationQuery) -> AdvisoryResult<WeatherData> {
        self.calls.lock().expect("calls lock").push(location.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.outcome.clone()
    }
}

/// Predictor answering from a queue; the last answer repeats
pub struct FakePredictor {
    responses: Mutex<VecDeque<AdvisoryResult<PredictionResult>>>,
    pub calls: Mutex<Vec<(UserInputs, WeatherData)>>,
}

impl FakePredictor {
    pub fn ok(result: PredictionResult) -> Self {
        Self::sequence(vec![Ok(result)])
    }

    pub fn sequence(responses: Vec<AdvisoryResult<PredictionResult>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

#[async_trait]
impl RiskPredictor for FakePredictor {
    async fn predict_risk(
        &self,
        inputs: &UserInputs,
        weather: &WeatherData,
    ) -> AdvisoryResult<PredictionResult> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((inputs.clone(), weather.clone()));

        let mut responses = self.responses.lock().expect("responses lock");
        if responses.len() > 1 {
            responses.pop_front().expect("non-empty queue")
        } else {
            responses.front().cloned().expect("at least one response")
        }
    }
}
