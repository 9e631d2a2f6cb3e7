use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::constants::{MAX_EXPOSURE_HOURS, MIN_CITY_LEN, MIN_EXPOSURE_HOURS};
use crate::error::{AdvisoryError, AdvisoryResult};

// ============================================================================
// Assessment Inputs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    /// Office or desk work
    Light,
    /// Walking or supervision
    Moderate,
    /// Manual labor
    Heavy,
    /// Intense physical work
    Extreme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HydrationLevel {
    Well,
    Moderate,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum AgeGroup {
    #[serde(rename = "18-25")]
    From18To25,
    #[serde(rename = "26-35")]
    From26To35,
    #[serde(rename = "36-45")]
    From36To45,
    #[serde(rename = "46-55")]
    From46To55,
    #[serde(rename = "55+")]
    Over55,
}

/// Where the weather lookup should be made for
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates { lat: f64, lon: f64 },
    City(String),
}

/// One assessment request, exactly as the prediction API expects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInputs {
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub exposure_duration: u8,
    pub activity_level: ActivityLevel,
    pub hydration_level: HydrationLevel,
    pub age_group: AgeGroup,
}

impl UserInputs {
    /// Resolves the location to query, preferring coordinates over the city
    pub fn location_query(&self) -> AdvisoryResult<LocationQuery> {
        if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
            if !valid_coordinates(lat, lon) {
                return Err(AdvisoryError::InvalidInputs(format!(
                    "coordinates out of range: {lat}, {lon}"
                )));
            }
            return Ok(LocationQuery::Coordinates { lat, lon });
        }

        let city = self.city.trim();
        if city.chars().count() < MIN_CITY_LEN {
            return Err(AdvisoryError::InvalidInputs(
                "enter a valid city name or provide coordinates".to_string(),
            ));
        }
        Ok(LocationQuery::City(city.to_string()))
    }

    pub fn validate(&self) -> AdvisoryResult<()> {
        self.location_query()?;

        if !(MIN_EXPOSURE_HOURS..=MAX_EXPOSURE_HOURS).contains(&self.exposure_duration) {
            return Err(AdvisoryError::InvalidInputs(format!(
                "exposure duration must be between {MIN_EXPOSURE_HOURS} and {MAX_EXPOSURE_HOURS} hours, got {}",
                self.exposure_duration
            )));
        }
        Ok(())
    }
}

fn valid_coordinates(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon)
}

// ============================================================================
// Weather API Models
// ============================================================================

/// Provenance of a weather snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherSource {
    LiveApi,
    MockData,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat_index: Option<f64>,
    #[serde(alias = "wind_speed")]
    pub wind_speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<f64>,
    pub condition: String,
    #[serde(
        default,
        alias = "location_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub location_name: Option<String>,
    #[serde(default)]
    pub source: WeatherSource,
}

// ============================================================================
// Prediction API Models
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    Low,
    Moderate,
    High,
    Extreme,
}

impl RiskCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskCategory::Low => "low",
            RiskCategory::Moderate => "moderate",
            RiskCategory::High => "high",
            RiskCategory::Extreme => "extreme",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorSeverity {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    #[serde(default)]
    pub icon: String,
    pub label: String,
    pub severity: FactorSeverity,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub explanation: String,
    pub urgency: Urgency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionMetadata {
    pub location: String,
    pub timestamp: String,
    pub environmental_snapshot: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub risk_category: RiskCategory,
    #[serde(deserialize_with = "deserialize_percentage")]
    pub risk_percentage: u8,
    pub summary: String,
    pub factors: Vec<RiskFactor>,
    pub recommendations: Vec<Recommendation>,
    pub metadata: PredictionMetadata,
}

/// The model reports a weighted score with one decimal; keep the nearest whole percent
fn deserialize_percentage<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Err(de::Error::custom("risk percentage is not a finite number"));
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

/// Request body of the prediction endpoint
#[derive(Debug, Serialize)]
pub struct PredictRequest<'a> {
    pub inputs: &'a UserInputs,
    pub weather: &'a WeatherData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

// ============================================================================
// Assessment Progress & History
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingStage {
    FetchingWeather,
    CalculatingHeatIndex,
    EvaluatingStress,
    GeneratingRecommendations,
}

impl LoadingStage {
    /// Every stage, in the order a run visits them
    pub const ALL: [LoadingStage; 4] = [
        LoadingStage::FetchingWeather,
        LoadingStage::CalculatingHeatIndex,
        LoadingStage::EvaluatingStress,
        LoadingStage::GeneratingRecommendations,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LoadingStage::FetchingWeather => "Fetching environmental data",
            LoadingStage::CalculatingHeatIndex => "Calculating heat index",
            LoadingStage::EvaluatingStress => "Evaluating physiological stress",
            LoadingStage::GeneratingRecommendations => "Generating safety recommendations",
        }
    }

    pub fn position(self) -> usize {
        match self {
            LoadingStage::FetchingWeather => 0,
            LoadingStage::CalculatingHeatIndex => 1,
            LoadingStage::EvaluatingStress => 2,
            LoadingStage::GeneratingRecommendations => 3,
        }
    }
}

/// Durable record of one completed assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub inputs: UserInputs,
    pub result: PredictionResult,
    pub timestamp: DateTime<Utc>,
}

/// One point of the risk trend, oldest assessment first
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub label: String,
    pub risk_percentage: u8,
    pub category: RiskCategory,
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SubmitAssessmentRequest {
    /// City name; may be omitted when coordinates are given
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Hours spent outdoors, 1 to 12
    pub exposure_duration: u8,
    pub activity_level: ActivityLevel,
    pub hydration_level: HydrationLevel,
    pub age_group: AgeGroup,
}

impl SubmitAssessmentRequest {
    /// Builds validated inputs, labelling coordinate-only submissions like a GPS fix
    pub fn into_inputs(self) -> AdvisoryResult<UserInputs> {
        let city = match (self.city.as_deref().map(str::trim), self.latitude, self.longitude) {
            (Some(city), _, _) if !city.is_empty() => city.to_string(),
            (_, Some(lat), Some(lon)) => format!("GPS: {lat:.4}, {lon:.4}"),
            _ => String::new(),
        };

        let inputs = UserInputs {
            city,
            latitude: self.latitude,
            longitude: self.longitude,
            exposure_duration: self.exposure_duration,
            activity_level: self.activity_level,
            hydration_level: self.hydration_level,
            age_group: self.age_group,
        };
        inputs.validate()?;
        Ok(inputs)
    }
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct HistoryRequest {
    /// Only list the most recent entries
    #[serde(default)]
    pub limit: Option<usize>,
}

#[cfg(test)]
#[path = "tests/models_tests.rs"]
mod tests;
