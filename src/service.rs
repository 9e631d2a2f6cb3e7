use anyhow::Result;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters, ServerHandler},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};
use std::sync::Arc;

use crate::api::HttpAdvisoryClient;
use crate::config::Settings;
use crate::formatters::{
    format_failure, format_health, format_history, format_progress, format_result,
};
use crate::history::HistoryFile;
use crate::models::{HistoryRequest, SubmitAssessmentRequest};
use crate::orchestrator::{Orchestrator, RunOutcome};
use crate::store::{Action, Store};

/// MCP surface of the advisory: input form, progress, results and history views
#[derive(Clone)]
pub struct HeatAdvisor {
    orchestrator: Orchestrator,
    client: Arc<HttpAdvisoryClient>,
    tool_router: ToolRouter<Self>,
}

impl HeatAdvisor {
    /// Wires the HTTP backend, persisted history and orchestrator from settings
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Arc::new(HttpAdvisoryClient::new(
            settings.api_base_url.clone(),
            settings.request_timeout(),
        )?);
        let store = Store::open(HistoryFile::new(&settings.history_path));
        let orchestrator = Orchestrator::new(
            store,
            client.clone(),
            client.clone(),
            settings.pacing(),
        );

        Ok(Self::from_parts(orchestrator, client))
    }

    pub fn from_parts(orchestrator: Orchestrator, client: Arc<HttpAdvisoryClient>) -> Self {
        Self {
            orchestrator,
            client,
            tool_router: Self::tool_router(),
        }
    }

    fn store(&self) -> &Store {
        self.orchestrator.store()
    }

    /// Maps a finished run onto the view the user should see next
    fn render_outcome(&self, outcome: RunOutcome) -> Result<CallToolResult, McpError> {
        match outcome {
            RunOutcome::Completed(entry) => {
                let state = self.store().snapshot();
                let formatted = format_result(&entry.result, state.weather.as_ref());
                Ok(CallToolResult::success(vec![Content::text(formatted)]))
            }
            RunOutcome::Failed(e) if e.is_input_fault() => {
                Err(McpError::invalid_params(e.to_string(), None))
            }
            RunOutcome::Failed(e) => Ok(CallToolResult::error(vec![Content::text(
                format_failure(&e.to_string()),
            )])),
            RunOutcome::NeedsInputs => Err(McpError::invalid_params(
                "No assessment inputs; call submit_assessment with location and work context.",
                None,
            )),
            RunOutcome::AlreadyRunning => {
                let progress = format_progress(&self.store().snapshot());
                Ok(CallToolResult::success(vec![Content::text(format!(
                    "An assessment is already in progress.\n\n{}",
                    progress
                ))]))
            }
        }
    }
}

#[tool_handler]
impl ServerHandler for HeatAdvisor {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "heatshield".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Heat-stress risk advisory for outdoor work. Submit a location and work context \
                to get a risk score, contributing factors and safety recommendations."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl HeatAdvisor {
    /// Submits inputs and runs a full assessment
    #[tool(description = "Assess heat-stress risk for outdoor work. Provide a city name (e.g., 'Dubai') or latitude/longitude, exposure duration in hours (1-12), activity level (light, moderate, heavy, extreme), hydration level (well, moderate, poor) and age group (18-25, 26-35, 36-45, 46-55, 55+).")]
    async fn submit_assessment(
        &self,
        Parameters(request): Parameters<SubmitAssessmentRequest>,
    ) -> Result<CallToolResult, McpError> {
        let inputs = request
            .into_inputs()
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        tracing::info!("Assessment submitted for {}", inputs.city);

        let outcome = self.orchestrator.submit(inputs).await;
        self.render_outcome(outcome)
    }

    /// Shows the stage of the running assessment
    #[tool(description = "Show progress of the current assessment, or the failure message if it failed.")]
    async fn assessment_status(&self) -> Result<CallToolResult, McpError> {
        let formatted = format_progress(&self.store().snapshot());
        Ok(CallToolResult::success(vec![Content::text(formatted)]))
    }

    /// Shows the most recent prediction
    #[tool(description = "Show the risk score, contributing factors and recommendations of the latest assessment.")]
    async fn latest_result(&self) -> Result<CallToolResult, McpError> {
        let state = self.store().snapshot();
        if let Some(message) = &state.error {
            return Ok(CallToolResult::error(vec![Content::text(format_failure(
                message,
            ))]));
        }
        if state.loading_stage.is_some() {
            return Err(McpError::invalid_params(
                "An assessment is still running; check assessment_status.",
                None,
            ));
        }
        let Some(result) = &state.result else {
            return Err(McpError::invalid_params(
                "No completed assessment yet; call submit_assessment first.",
                None,
            ));
        };

        let formatted = format_result(result, state.weather.as_ref());
        Ok(CallToolResult::success(vec![Content::text(formatted)]))
    }

    /// Lists past assessments with a risk trend
    #[tool(description = "List past assessments, most recent first, with a risk trend. Optionally limit the number of entries listed.")]
    async fn assessment_history(
        &self,
        Parameters(request): Parameters<HistoryRequest>,
    ) -> Result<CallToolResult, McpError> {
        let history = self.store().history();
        tracing::info!("Listing {} history entries", history.len());

        let formatted = format_history(&history, request.limit);
        Ok(CallToolResult::success(vec![Content::text(formatted)]))
    }

    /// Clears the current assessment so a new one can be submitted
    #[tool(description = "Clear the current assessment (inputs, result and error) to try again. History is kept.")]
    async fn reset_assessment(&self) -> Result<CallToolResult, McpError> {
        self.store().dispatch(Action::ResetPrediction);
        Ok(CallToolResult::success(vec![Content::text(
            "Assessment cleared. Submit new inputs to start again.",
        )]))
    }

    /// Reports backend liveness
    #[tool(description = "Check whether the advisory backend is reachable.")]
    async fn service_health(&self) -> Result<CallToolResult, McpError> {
        tracing::info!("Checking backend health at {}", self.client.base_url());

        let health = self
            .client
            .health()
            .await
            .map_err(|e| McpError::internal_error(format!("Health check failed: {}", e), None))?;

        Ok(CallToolResult::success(vec![Content::text(format_health(&health))]))
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
