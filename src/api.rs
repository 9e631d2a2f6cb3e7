use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::constants::{HEALTH_PATH, PREDICT_PATH, USER_AGENT, WEATHER_PATH};
use crate::error::{AdvisoryError, AdvisoryResult, ServiceKind};
use crate::models::{
    HealthStatus, LocationQuery, PredictRequest, PredictionResult, UserInputs, WeatherData,
};

/// Source of current weather conditions
#[async_trait]
pub trait WeatherClient: Send + Sync {
    async fn fetch_weather(&self, location: &LocationQuery) -> AdvisoryResult<WeatherData>;
}

/// Opaque heat-stress risk model
#[async_trait]
pub trait RiskPredictor: Send + Sync {
    async fn predict_risk(
        &self,
        inputs: &UserInputs,
        weather: &WeatherData,
    ) -> AdvisoryResult<PredictionResult>;
}

/// HTTP client for the advisory backend
#[derive(Clone)]
pub struct HttpAdvisoryClient {
    client: Client,
    base_url: String,
}

impl HttpAdvisoryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and deserializes the JSON response
    async fn make_request<T: DeserializeOwned>(
        &self,
        service: ServiceKind,
        request: RequestBuilder,
    ) -> AdvisoryResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| AdvisoryError::Transport {
                service,
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisoryError::Service {
                service,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AdvisoryError::Transport {
                service,
                reason: e.to_string(),
            })?;

        serde_json::from_slice::<T>(&body).map_err(|e| AdvisoryError::MalformedResponse {
            service,
            reason: e.to_string(),
        })
    }

    /// Liveness of the backend, for display only
    pub async fn health(&self) -> AdvisoryResult<HealthStatus> {
        tracing::debug!("Checking backend health at {}", self.base_url);

        let request = self.client.get(self.url(HEALTH_PATH));
        self.make_request(ServiceKind::Health, request).await
    }
}

#[async_trait]
impl WeatherClient for HttpAdvisoryClient {
    async fn fetch_weather(&self, location: &LocationQuery) -> AdvisoryResult<WeatherData> {
        let request = self.client.get(self.url(WEATHER_PATH));
        let request = match location {
            LocationQuery::Coordinates { lat, lon } => {
                tracing::info!("Fetching weather for coordinates: {}, {}", lat, lon);
                request.query(&[("lat", lat.to_string()), ("lon", lon.to_string())])
            }
            LocationQuery::City(city) => {
                tracing::info!("Fetching weather for city: {}", city);
                request.query(&[("location", city.as_str())])
            }
        };

        self.make_request(ServiceKind::Weather, request).await
    }
}

#[async_trait]
impl RiskPredictor for HttpAdvisoryClient {
    async fn predict_risk(
        &self,
        inputs: &UserInputs,
        weather: &WeatherData,
    ) -> AdvisoryResult<PredictionResult> {
        tracing::info!("Requesting risk prediction for {}", inputs.city);

        let request = self
            .client
            .post(self.url(PREDICT_PATH))
            .json(&PredictRequest { inputs, weather });
        self.make_request(ServiceKind::Prediction, request).await
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
