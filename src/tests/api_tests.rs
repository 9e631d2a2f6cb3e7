use super::*;
use crate::models::{RiskCategory, WeatherSource};
use crate::test_support::{dubai_inputs, dubai_weather, high_risk};
use axum::{
    extract::Query,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::net::TcpListener;

async fn spawn_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

fn client(base_url: &str) -> HttpAdvisoryClient {
    HttpAdvisoryClient::new(base_url, Duration::from_secs(5)).expect("client")
}

/// Echoes the received query back through the `condition` field
async fn echo_weather(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let mut keys: Vec<_> = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    keys.sort();

    Json(json!({
        "temperature": 42.0,
        "humidity": 65.0,
        "wind_speed": 8.0,
        "condition": keys.join("&"),
        "location_name": "Dubai",
        "source": "live_api"
    }))
}

#[tokio::test]
async fn weather_by_city_sends_location_param() {
    let base = spawn_backend(Router::new().route(WEATHER_PATH, get(echo_weather))).await;

    let weather = client(&base)
        .fetch_weather(&LocationQuery::City("Dubai".to_string()))
        .await
        .expect("weather");

    assert_eq!(weather.condition, "location=Dubai");
    assert_eq!(weather.temperature, 42.0);
    assert_eq!(weather.source, WeatherSource::LiveApi);
    assert_eq!(weather.location_name.as_deref(), Some("Dubai"));
}

#[tokio::test]
async fn weather_by_coordinates_sends_lat_lon_only() {
    let base = spawn_backend(Router::new().route(WEATHER_PATH, get(echo_weather))).await;

    let weather = client(&base)
        .fetch_weather(&LocationQuery::Coordinates {
            lat: 25.25,
            lon: 55.5,
        })
        .await
        .expect("weather");

    assert_eq!(weather.condition, "lat=25.25&lon=55.5");
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let base = spawn_backend(Router::new().route(WEATHER_PATH, get(echo_weather))).await;
    let client = client(&format!("{base}/"));

    assert_eq!(client.base_url(), base);
    assert!(client
        .fetch_weather(&LocationQuery::City("Dubai".to_string()))
        .await
        .is_ok());
}

#[tokio::test]
async fn prediction_posts_inputs_and_weather() {
    let router = Router::new().route(
        PREDICT_PATH,
        post(|Json(body): Json<Value>| async move {
            let mut result = serde_json::to_value(high_risk()).expect("result");
            // Echo what the model received
            result["summary"] = json!(format!(
                "{} {} {}",
                body["inputs"]["city"].as_str().unwrap_or_default(),
                body["inputs"]["activityLevel"].as_str().unwrap_or_default(),
                body["weather"]["heatIndex"]
            ));
            result["riskPercentage"] = json!(77.6);
            Json(result)
        }),
    );
    let base = spawn_backend(router).await;

    let result = client(&base)
        .predict_risk(&dubai_inputs(), &dubai_weather())
        .await
        .expect("prediction");

    assert_eq!(result.summary, "Dubai heavy 52.0");
    assert_eq!(result.risk_category, RiskCategory::High);
    assert_eq!(result.risk_percentage, 78);
    assert_eq!(result.recommendations.len(), 2);
}

#[tokio::test]
async fn non_success_status_is_a_service_fault() {
    let router = Router::new().route(
        PREDICT_PATH,
        post(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"error": "Prediction service unavailable"})),
            )
        }),
    );
    let base = spawn_backend(router).await;

    let err = client(&base)
        .predict_risk(&dubai_inputs(), &dubai_weather())
        .await
        .expect_err("503");

    assert_eq!(
        err,
        AdvisoryError::Service {
            service: ServiceKind::Prediction,
            status: 503
        }
    );
}

#[tokio::test]
async fn unexpected_body_is_a_malformed_response() {
    let router = Router::new().route(WEATHER_PATH, get(|| async { Json(json!([1, 2, 3])) }));
    let base = spawn_backend(router).await;

    let err = client(&base)
        .fetch_weather(&LocationQuery::City("Dubai".to_string()))
        .await
        .expect_err("malformed");

    assert!(matches!(
        err,
        AdvisoryError::MalformedResponse {
            service: ServiceKind::Weather,
            ..
        }
    ));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_fault() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let err = client(&format!("http://{addr}"))
        .fetch_weather(&LocationQuery::City("Dubai".to_string()))
        .await
        .expect_err("refused");

    assert!(matches!(
        err,
        AdvisoryError::Transport {
            service: ServiceKind::Weather,
            ..
        }
    ));
}

#[tokio::test]
async fn slow_backend_times_out_as_transport_fault() {
    let router = Router::new().route(
        HEALTH_PATH,
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"status": "healthy"}))
        }),
    );
    let base = spawn_backend(router).await;
    let client = HttpAdvisoryClient::new(base, Duration::from_millis(100)).expect("client");

    let err = client.health().await.expect_err("timeout");
    assert_eq!(err.service(), Some(ServiceKind::Health));
    assert!(matches!(err, AdvisoryError::Transport { .. }));
}

#[tokio::test]
async fn health_reports_backend_status() {
    let router = Router::new().route(
        HEALTH_PATH,
        get(|| async { Json(json!({"status": "healthy", "service": "Heat Guardian API"})) }),
    );
    let base = spawn_backend(router).await;

    let health = client(&base).health().await.expect("health");
    assert_eq!(health.status, "healthy");
    assert_eq!(health.service.as_deref(), Some("Heat Guardian API"));
}
