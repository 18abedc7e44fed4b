pub mod explain;
pub mod store;

use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Path as UrlPath, Query, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::AppConfig;
use crate::core::{
    MathExplanation, ProjectionStatus, ScenarioInput, ScenarioKind, ScenarioOutput,
    ValidationError, run_scenario,
};
use explain::{
    CohereExplainer, Explainer, FALLBACK_EXPLANATION, compare_saved, explain_or_fallback,
    no_saved_scenarios, suggest_from_saved,
};
use store::ScenarioStore;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),
    #[error("{0}")]
    UnknownScenario(String),
    #[error("Invalid scenario id '{0}'")]
    InvalidId(String),
    #[error("Scenario {0} not found")]
    NotFound(u64),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidJson(_) | ApiError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownScenario(_) | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Io { .. } | ApiError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error_response(self.status(), &self.to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct SavedResponse {
    id: u64,
    message: &'static str,
}

#[derive(Serialize)]
struct SummaryResponse {
    summary: String,
}

#[derive(Serialize)]
struct SuggestionsResponse {
    suggestions: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SimulateQuery {
    explain: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct SaveScenarioRequest {
    #[serde(default)]
    title: Option<String>,
    input: Value,
}

/// Uniform response for every scenario type.
#[derive(Debug, Serialize)]
pub struct SimulationResponse {
    pub scenario: ScenarioKind,
    pub status: ProjectionStatus,
    /// Period numbers 1..=N, for chart axes.
    pub labels: Vec<u32>,
    pub data: Value,
    pub metrics: Value,
    pub summary: String,
    pub math_explanation: MathExplanation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_explanation: Option<String>,
}

impl SimulationResponse {
    pub fn from_output(
        output: &ScenarioOutput,
        ai_explanation: Option<String>,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            scenario: output.kind(),
            status: output.status(),
            labels: (1..=output.period_count() as u32).collect(),
            data: output.periods_value()?,
            metrics: output.metrics_value()?,
            summary: output.summary().to_string(),
            math_explanation: output.math_explanation().clone(),
            ai_explanation,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<ScenarioStore>,
    explainer: Option<Arc<dyn Explainer>>,
}

impl AppState {
    pub fn new(explainer: Option<Arc<dyn Explainer>>) -> Self {
        Self {
            store: Arc::new(ScenarioStore::default()),
            explainer,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/simulate/:kind", post(simulate_handler))
        .route(
            "/scenarios/:key",
            get(list_scenarios_handler)
                .post(save_scenario_handler)
                .delete(delete_scenario_handler),
        )
        .route("/scenarios/:key/summary", get(summarize_scenarios_handler))
        .route("/scenarios/:key/suggestions", get(suggest_scenarios_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(config: AppConfig) -> std::io::Result<()> {
    let explainer: Option<Arc<dyn Explainer>> = match config.explainer.clone() {
        Some(settings) => Some(Arc::new(
            CohereExplainer::new(settings).map_err(std::io::Error::other)?,
        )),
        None => None,
    };
    let explanations = explainer.is_some();
    let app = router(AppState::new(explainer));

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, explanations, "finsim HTTP API listening");

    axum::serve(listener, app).await
}

/// Runs one scenario from a JSON file; backs the `simulate` subcommand.
pub fn simulate_file(kind: ScenarioKind, path: &Path) -> Result<String, ApiError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ApiError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let body: Value =
        serde_json::from_str(&raw).map_err(|e| ApiError::InvalidJson(e.to_string()))?;
    let (_, output) = simulate_value(kind, body)?;
    let response = SimulationResponse::from_output(&output, None)?;
    Ok(serde_json::to_string_pretty(&response)?)
}

fn parse_kind(raw: &str) -> Result<ScenarioKind, ApiError> {
    raw.parse().map_err(ApiError::UnknownScenario)
}

fn simulate_value(
    kind: ScenarioKind,
    body: Value,
) -> Result<(ScenarioInput, ScenarioOutput), ApiError> {
    let input =
        ScenarioInput::from_value(kind, body).map_err(|e| ApiError::InvalidJson(e.to_string()))?;
    let output = run_scenario(&input)?;
    info!(
        scenario = %kind,
        status = ?output.status(),
        reached = !output.status().is_failure(),
        periods = output.period_count(),
        "simulation complete"
    );
    Ok((input, output))
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_handler(
    State(state): State<AppState>,
    UrlPath(kind): UrlPath<String>,
    Query(query): Query<SimulateQuery>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let kind = parse_kind(&kind)?;
    let Json(body) = body.map_err(|e| ApiError::InvalidJson(e.body_text()))?;
    let (input, output) = simulate_value(kind, body)?;

    let ai_explanation = match &state.explainer {
        Some(explainer) if query.explain.unwrap_or(true) => {
            let input = input.to_value()?;
            Some(explain_or_fallback(explainer.as_ref(), &input, &output).await)
        }
        _ => None,
    };

    let response = SimulationResponse::from_output(&output, ai_explanation)?;
    Ok(json_response(StatusCode::OK, response))
}

async fn save_scenario_handler(
    State(state): State<AppState>,
    UrlPath(key): UrlPath<String>,
    body: Result<Json<SaveScenarioRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let kind = parse_kind(&key)?;
    let Json(request) = body.map_err(|e| ApiError::InvalidJson(e.body_text()))?;
    let (input, output) = simulate_value(kind, request.input)?;

    let id = state
        .store
        .save(
            kind,
            request.title,
            input.to_value()?,
            serde_json::to_value(&output)?,
        )
        .await;
    Ok(json_response(
        StatusCode::CREATED,
        SavedResponse {
            id,
            message: "Scenario saved",
        },
    ))
}

async fn list_scenarios_handler(
    State(state): State<AppState>,
    UrlPath(key): UrlPath<String>,
) -> Result<Response, ApiError> {
    let kind = parse_kind(&key)?;
    Ok(json_response(StatusCode::OK, state.store.list(kind).await))
}

async fn delete_scenario_handler(
    State(state): State<AppState>,
    UrlPath(key): UrlPath<String>,
) -> Result<Response, ApiError> {
    let id = key.parse::<u64>().map_err(|_| ApiError::InvalidId(key))?;
    state.store.delete(id).await.ok_or(ApiError::NotFound(id))?;
    Ok(json_response(
        StatusCode::OK,
        MessageResponse {
            message: "Scenario deleted",
        },
    ))
}

async fn summarize_scenarios_handler(
    State(state): State<AppState>,
    UrlPath(key): UrlPath<String>,
) -> Result<Response, ApiError> {
    let kind = parse_kind(&key)?;
    let records = state.store.list(kind).await;
    let summary = match &state.explainer {
        Some(explainer) => compare_saved(explainer.as_ref(), kind, &records).await,
        None if records.is_empty() => no_saved_scenarios(kind),
        None => FALLBACK_EXPLANATION.to_string(),
    };
    Ok(json_response(StatusCode::OK, SummaryResponse { summary }))
}

async fn suggest_scenarios_handler(
    State(state): State<AppState>,
    UrlPath(key): UrlPath<String>,
) -> Result<Response, ApiError> {
    let kind = parse_kind(&key)?;
    let records = state.store.list(kind).await;
    let suggestions = match &state.explainer {
        Some(explainer) => suggest_from_saved(explainer.as_ref(), kind, &records).await,
        None if records.is_empty() => vec![no_saved_scenarios(kind)],
        None => vec![FALLBACK_EXPLANATION.to_string()],
    };
    Ok(json_response(
        StatusCode::OK,
        SuggestionsResponse { suggestions },
    ))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::explain::ExplainError;
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    struct CannedExplainer(Result<&'static str, u16>);

    #[async_trait]
    impl Explainer for CannedExplainer {
        async fn generate(&self, _prompt: &str) -> Result<String, ExplainError> {
            self.0
                .map(str::to_string)
                .map_err(ExplainError::Status)
        }
    }

    fn app(explainer: Option<CannedExplainer>) -> Router {
        router(AppState::new(
            explainer.map(|e| Arc::new(e) as Arc<dyn Explainer>),
        ))
    }

    fn debt_body() -> Value {
        json!({"debt": 120000.0, "monthly_payment": 5000.0, "interest_rate": 12.0})
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, _, value) = send_with_headers(app, method, uri, body).await;
        (status, value)
    }

    async fn send_with_headers(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, axum::http::HeaderMap, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(match body {
                Some(body) => Body::from(body.to_string()),
                None => Body::empty(),
            })
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, headers, value)
    }

    #[tokio::test]
    async fn health_reports_ok_without_caching() {
        let (status, headers, body) = send_with_headers(app(None), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
        assert_eq!(
            headers.get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );
    }

    #[tokio::test]
    async fn simulate_debt_payoff_returns_uniform_shape() {
        let (status, body) =
            send(app(None), "POST", "/simulate/debt-payoff", Some(debt_body())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scenario"], "debt-payoff");
        assert_eq!(body["status"], "goal_reached");
        assert_eq!(body["labels"].as_array().map(Vec::len), Some(28));
        assert_eq!(body["labels"][0], 1);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(28));
        assert_eq!(body["metrics"]["months_to_payoff"], 28);
        assert_approx(
            body["metrics"]["total_interest"].as_f64().unwrap_or_default(),
            17_909.432_578_664_688,
        );
        assert_eq!(body["math_explanation"]["title"], "Debt Payoff Calculation");
        assert!(body.get("ai_explanation").is_none());
    }

    #[tokio::test]
    async fn simulate_attaches_explanation_unless_disabled() {
        let explained = send(
            app(Some(CannedExplainer(Ok("Steady payments win.")))),
            "POST",
            "/simulate/debt-payoff",
            Some(debt_body()),
        )
        .await
        .1;
        assert_eq!(explained["ai_explanation"], "Steady payments win.");

        let skipped = send(
            app(Some(CannedExplainer(Ok("unused")))),
            "POST",
            "/simulate/debt-payoff?explain=false",
            Some(debt_body()),
        )
        .await
        .1;
        assert!(skipped.get("ai_explanation").is_none());
    }

    #[tokio::test]
    async fn simulate_falls_back_when_provider_fails() {
        let (status, body) = send(
            app(Some(CannedExplainer(Err(500)))),
            "POST",
            "/simulate/debt-payoff",
            Some(debt_body()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ai_explanation"], FALLBACK_EXPLANATION);
        assert_eq!(body["metrics"]["months_to_payoff"], 28);
    }

    #[tokio::test]
    async fn simulate_reports_non_convergence_as_a_result() {
        let (status, body) = send(
            app(None),
            "POST",
            "/simulate/debt-payoff",
            Some(json!({"debt": 120000.0, "monthly_payment": 1000.0, "interest_rate": 12.0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "non_convergent");
        assert_eq!(body["labels"], json!([]));
    }

    #[tokio::test]
    async fn simulate_maps_errors_to_status_codes() {
        let (status, body) = send(app(None), "POST", "/simulate/retirement", Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "unknown scenario type 'retirement'");

        let (status, body) = send(
            app(None),
            "POST",
            "/simulate/debt-payoff",
            Some(json!({"debt": 0.0, "monthly_payment": 10.0, "interest_rate": 5.0})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "debt must be greater than zero");

        let (status, body) = send(
            app(None),
            "POST",
            "/simulate/investing",
            Some(json!({"initial": 100.0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"]
                .as_str()
                .is_some_and(|msg| msg.starts_with("Invalid JSON payload"))
        );

        let (status, _) = send(app(None), "GET", "/nowhere", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn scenarios_can_be_saved_listed_and_deleted() {
        let app = app(None);

        let (status, saved) = send(
            app.clone(),
            "POST",
            "/scenarios/debt-payoff",
            Some(json!({"title": "Credit card", "input": debt_body()})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(saved, json!({"id": 1, "message": "Scenario saved"}));

        let (status, listed) = send(app.clone(), "GET", "/scenarios/debt-payoff", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed[0]["id"], 1);
        assert_eq!(listed[0]["title"], "Credit card");
        assert_eq!(listed[0]["scenario"], "debt-payoff");
        assert_eq!(listed[0]["output"]["metrics"]["months_to_payoff"], 28);

        let (_, others) = send(app.clone(), "GET", "/scenarios/investing", None).await;
        assert_eq!(others, json!([]));

        let (status, deleted) = send(app.clone(), "DELETE", "/scenarios/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["message"], "Scenario deleted");

        let (status, missing) = send(app.clone(), "DELETE", "/scenarios/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(missing["error"], "Scenario 1 not found");

        let (status, _) = send(app, "DELETE", "/scenarios/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn saving_rejects_invalid_inputs() {
        let (status, _) = send(
            app(None),
            "POST",
            "/scenarios/emergency-fund",
            Some(json!({"input": {"monthly_expenses": -5.0, "months_of_expenses": 3}})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    fn emergency_body(monthly_savings: f64) -> Value {
        json!({
            "monthly_expenses": 20000.0,
            "months_of_expenses": 6,
            "current_emergency_savings": 10000.0,
            "monthly_savings": monthly_savings,
            "annual_interest_rate_percent": 2.0
        })
    }

    async fn save_emergency_scenarios(app: &Router) {
        for (title, savings) in [("Basic", 5000.0), ("Aggressive", 15000.0)] {
            let (status, _) = send(
                app.clone(),
                "POST",
                "/scenarios/emergency-fund",
                Some(json!({"title": title, "input": emergency_body(savings)})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }
    }

    #[tokio::test]
    async fn saved_scenarios_can_be_summarized() {
        let app = app(Some(CannedExplainer(Ok("Aggressive gets there first."))));

        let (status, empty) = send(app.clone(), "GET", "/scenarios/emergency-fund/summary", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(empty, json!({"summary": "No emergency fund scenarios found."}));

        save_emergency_scenarios(&app).await;
        let (status, body) = send(app, "GET", "/scenarios/emergency-fund/summary", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "Aggressive gets there first.");
    }

    #[tokio::test]
    async fn saved_scenarios_yield_listed_suggestions() {
        let app = app(Some(CannedExplainer(Ok(
            "1. Raise monthly savings\n- 2. Use a higher-yield account\n\n3. Trim expenses",
        ))));

        let (_, empty) = send(app.clone(), "GET", "/scenarios/investing/suggestions", None).await;
        assert_eq!(empty, json!({"suggestions": ["No investing scenarios found."]}));

        save_emergency_scenarios(&app).await;
        let (status, body) =
            send(app, "GET", "/scenarios/emergency-fund/suggestions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["suggestions"],
            json!([
                "1. Raise monthly savings",
                "2. Use a higher-yield account",
                "3. Trim expenses"
            ])
        );
    }

    #[tokio::test]
    async fn saved_scenario_insights_fall_back_without_a_provider() {
        for app in [app(Some(CannedExplainer(Err(503)))), app(None)] {
            save_emergency_scenarios(&app).await;

            let (_, summary) =
                send(app.clone(), "GET", "/scenarios/emergency-fund/summary", None).await;
            assert_eq!(summary["summary"], FALLBACK_EXPLANATION);

            let (_, suggestions) =
                send(app, "GET", "/scenarios/emergency-fund/suggestions", None).await;
            assert_eq!(suggestions["suggestions"], json!([FALLBACK_EXPLANATION]));
        }

        let (status, _) = send(app(None), "GET", "/scenarios/lottery/summary", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn simulate_file_renders_pretty_json() {
        let path = std::env::temp_dir().join(format!(
            "finsim-investing-{}.json",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"{"initial": 0, "monthly": 1000, "return_rate": 0, "years": 1}"#,
        )
        .expect("write input");

        let rendered = simulate_file(ScenarioKind::Investing, &path).expect("simulated");
        let _ = std::fs::remove_file(&path);
        let value: Value = serde_json::from_str(&rendered).expect("json");

        assert_eq!(value["scenario"], "investing");
        assert_eq!(value["metrics"]["future_value"], 12000.0);
        assert!(rendered.contains('\n'));
    }

    #[test]
    fn simulate_file_reports_missing_file() {
        let err = simulate_file(
            ScenarioKind::Investing,
            Path::new("/definitely/not/here.json"),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Io { .. }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
