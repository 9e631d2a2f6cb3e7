use crate::history::trend;
use crate::models::{
    FactorSeverity, HealthStatus, HistoryEntry, LoadingStage, PredictionResult, Urgency,
    WeatherData, WeatherSource,
};
use crate::store::PredictionState;

/// Formats a prediction into the results view
pub fn format_result(result: &PredictionResult, weather: Option<&WeatherData>) -> String {
    let mut output = format!(
        "Heat Stress Risk: {} ({}%)\nLocation: {}\nAssessed: {}\n\n{}\n",
        result.risk_category.as_str().to_uppercase(),
        result.risk_percentage,
        result.metadata.location,
        result.metadata.timestamp,
        result.summary
    );

    if !result.metadata.environmental_snapshot.is_empty() {
        output.push_str(&format!(
            "Conditions: {}\n",
            result.metadata.environmental_snapshot
        ));
    }

    if let Some(weather) = weather {
        output.push_str(&format_weather(weather));
    }

    if !result.factors.is_empty() {
        output.push_str("\nContributing Factors:\n");
        for factor in &result.factors {
            output.push_str(&format!(
                "  - {}: {} [{}]\n",
                factor.label,
                factor.value,
                severity_label(factor.severity)
            ));
        }
    }

    if !result.recommendations.is_empty() {
        output.push_str("\nRecommendations:\n");
        for (i, rec) in result.recommendations.iter().enumerate() {
            output.push_str(&format!(
                "{}. {} ({} urgency)\n   {}\n",
                i + 1,
                rec.title,
                urgency_label(rec.urgency),
                rec.explanation
            ));
        }
    }
    output
}

fn format_weather(weather: &WeatherData) -> String {
    let mut output = match &weather.location_name {
        Some(name) => format!("Weather at {}: ", name),
        None => "Weather: ".to_string(),
    };
    output.push_str(&format!(
        "{}, {:.1}\u{00b0}C, {:.0}% humidity, wind {:.1} km/h",
        weather.condition, weather.temperature, weather.humidity, weather.wind_speed
    ));
    if let Some(heat_index) = weather.heat_index {
        output.push_str(&format!(", heat index {:.1}\u{00b0}C", heat_index));
    }
    if let Some(uv) = weather.uv_index {
        output.push_str(&format!(", UV {:.0}", uv));
    }
    if weather.source == WeatherSource::MockData {
        output.push_str(" (simulated)");
    }
    output.push('\n');
    output
}

/// Formats the waiting view, or the failure view once a run has failed
pub fn format_progress(state: &PredictionState) -> String {
    if let Some(error) = &state.error {
        return format_failure(error);
    }

    let Some(current) = state.loading_stage else {
        return match (&state.result, &state.user_inputs) {
            (Some(result), _) => format!(
                "Assessment complete: {} risk ({}%). Use latest_result for details.",
                result.risk_category.as_str(),
                result.risk_percentage
            ),
            (None, Some(_)) => "Assessment submitted, waiting to start.".to_string(),
            (None, None) => "No assessment in progress.".to_string(),
        };
    };

    let location = state
        .user_inputs
        .as_ref()
        .map(|inputs| inputs.city.as_str())
        .unwrap_or("unknown location");

    let mut output = format!("Analyzing risk factors for {}\n\n", location);
    for stage in LoadingStage::ALL {
        let marker = if stage.position() < current.position() {
            "[x]"
        } else if stage == current {
            "[>]"
        } else {
            "[ ]"
        };
        output.push_str(&format!("{} {}\n", marker, stage.label()));
    }
    output
}

/// Formats an orchestration failure with the manual retry hint
pub fn format_failure(message: &str) -> String {
    format!(
        "Analysis Failed\n\n{}\n\nCall reset_assessment and submit again to try again.",
        message
    )
}

/// Formats the history view, most recent first
pub fn format_history(history: &[HistoryEntry], limit: Option<usize>) -> String {
    if history.is_empty() {
        return "No predictions yet. Submit an assessment to start a history.".to_string();
    }

    let mut output = format!(
        "Prediction History: {} assessment{} recorded\n\n",
        history.len(),
        if history.len() == 1 { "" } else { "s" }
    );

    let shown = limit.unwrap_or(history.len()).min(history.len());
    for entry in &history[..shown] {
        output.push_str(&format!(
            "{} | {:>3}% {:<8} | {} | {}\n  {}\n",
            entry.timestamp.format("%b %d, %Y %H:%M"),
            entry.result.risk_percentage,
            entry.result.risk_category.as_str(),
            entry.inputs.city,
            entry.id,
            entry.result.summary
        ));
    }

    let points = trend(history);
    output.push_str("\nRisk Trend:\n");
    output.push_str(
        &points
            .iter()
            .map(|p| format!("{} {}% ({})", p.label, p.risk_percentage, p.category.as_str()))
            .collect::<Vec<_>>()
            .join(" -> "),
    );
    output.push('\n');
    output
}

pub fn format_health(health: &HealthStatus) -> String {
    match &health.service {
        Some(service) => format!("{}: {}", service, health.status),
        None => format!("Backend status: {}", health.status),
    }
}

fn severity_label(severity: FactorSeverity) -> &'static str {
    match severity {
        FactorSeverity::Low => "low",
        FactorSeverity::Moderate => "moderate",
        FactorSeverity::High => "high",
    }
}

fn urgency_label(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::High => "high",
        Urgency::Medium => "medium",
        Urgency::Low => "low",
    }
}

#[cfg(test)]
#[path = "tests/formatters_tests.rs"]
mod tests;
