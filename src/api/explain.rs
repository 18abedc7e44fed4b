//! Plain-language explanations from a text-generation provider.
//!
//! Explanations never affect the numbers: any provider failure degrades to
//! [`FALLBACK_EXPLANATION`].

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::store::StoredScenario;
use crate::config::ExplainerConfig;
use crate::core::{MathExplanation, ScenarioKind, ScenarioOutput};

pub const FALLBACK_EXPLANATION: &str = "An AI explanation couldn't be generated at the moment.";

#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("explanation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("explanation provider answered with status {0}")]
    Status(u16),
    #[error("explanation provider returned no text")]
    Empty,
}

#[async_trait]
pub trait Explainer: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ExplainError>;
}

fn scenario_intro(kind: ScenarioKind) -> &'static str {
    match kind {
        ScenarioKind::Budgeting => {
            "Explain the following budgeting simulation in plain English so the user \
             understands what their result means."
        }
        ScenarioKind::EmergencyFund => {
            "Explain the following emergency fund simulation in simple, user-friendly language."
        }
        ScenarioKind::DebtPayoff => {
            "This simulation estimates the user's debt payoff plan. Write a clear and \
             encouraging explanation of the results."
        }
        ScenarioKind::Investing => {
            "This simulation projects potential investment growth over time. Explain what the \
             numbers mean for the user."
        }
        ScenarioKind::EducationFund => {
            "This simulation compares projected education savings with the inflated cost of \
             education. Explain whether the user is on track."
        }
        ScenarioKind::MajorPurchase => {
            "This simulation plans a down payment and loan for a major purchase. Explain the \
             savings and financing picture."
        }
        ScenarioKind::WealthBuilding => {
            "This simulation projects a long-term wealth goal with growing contributions, fees \
             and inflation. Explain the outlook in today's money."
        }
        ScenarioKind::BudgetOptimization => {
            "This simulation projects monthly cash flow with optional what-if adjustments. \
             Point out where the user can improve."
        }
        ScenarioKind::DebtManagement => {
            "This simulation projects a business's cash flow while servicing several loans. \
             Comment on liquidity and debt risk."
        }
    }
}

pub fn build_prompt(
    kind: ScenarioKind,
    input: &Value,
    summary: &str,
    math: &MathExplanation,
) -> String {
    let mut prompt = format!(
        "You are a helpful financial assistant.\n\n{}\n\nUser Inputs:\n{input}\n\n\
         Simulation Summary:\n{summary}\n\nMath Explanation ({}):\n",
        scenario_intro(kind),
        math.title
    );
    for section in &math.sections {
        prompt.push_str(&format!("{}:\n", section.heading));
        for item in &section.items {
            prompt.push_str(&format!("- {item}\n"));
        }
    }
    prompt.push_str("\nWrite a short, clear explanation:\n");
    prompt
}

async fn generate_or_fallback(explainer: &dyn Explainer, kind: ScenarioKind, prompt: &str) -> String {
    match explainer.generate(prompt).await {
        Ok(text) => text,
        Err(err) => {
            warn!(scenario = %kind, error = %err, "AI explanation failed; using fallback");
            FALLBACK_EXPLANATION.to_string()
        }
    }
}

/// Never fails; a provider error is logged and replaced by the fallback text.
pub async fn explain_or_fallback(
    explainer: &dyn Explainer,
    input: &Value,
    output: &ScenarioOutput,
) -> String {
    let prompt = build_prompt(
        output.kind(),
        input,
        output.summary(),
        output.math_explanation(),
    );
    generate_or_fallback(explainer, output.kind(), &prompt).await
}

pub fn no_saved_scenarios(kind: ScenarioKind) -> String {
    format!("No {} scenarios found.", kind.as_str().replace('-', " "))
}

fn saved_scenario_lines(records: &[StoredScenario]) -> String {
    records
        .iter()
        .map(|record| {
            format!(
                "Scenario {} ({}): inputs {}. Result: {}",
                record.id,
                record.title.as_deref().unwrap_or("Untitled"),
                record.input,
                record.output["summary"].as_str().unwrap_or("not available")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_comparison_prompt(kind: ScenarioKind, records: &[StoredScenario]) -> String {
    format!(
        "You are a financial advisor. Below are several {} scenarios. Write a short, clear \
         summary that compares these scenarios. Reference each scenario by its number and \
         title, mention the key amounts and highlight the main differences. Keep the summary \
         concise and do not list every variable. Express all amounts in Philippine pesos (₱). \
         Do not introduce the summary or repeat the prompt.\n\n{}\n",
        kind.as_str().replace('-', " "),
        saved_scenario_lines(records)
    )
}

pub fn build_suggestions_prompt(kind: ScenarioKind, records: &[StoredScenario]) -> String {
    format!(
        "You are a financial advisor. Below are multiple {} scenarios, each with their \
         variables listed. Based on all scenarios, give 3 specific, practical suggestions to \
         improve the user's outcomes. Be direct and actionable. Express all amounts in \
         Philippine pesos (₱). Do not repeat the prompt or introduce the suggestions, just \
         list them as:\n1. ...\n2. ...\n3. ...\n\n{}\n",
        kind.as_str().replace('-', " "),
        saved_scenario_lines(records)
    )
}

/// One suggestion per non-blank line, without bullet dashes.
pub fn split_suggestions(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().trim_start_matches('-').trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compares every saved scenario of one kind in a single paragraph.
pub async fn compare_saved(
    explainer: &dyn Explainer,
    kind: ScenarioKind,
    records: &[StoredScenario],
) -> String {
    if records.is_empty() {
        return no_saved_scenarios(kind);
    }
    generate_or_fallback(explainer, kind, &build_comparison_prompt(kind, records)).await
}

pub async fn suggest_from_saved(
    explainer: &dyn Explainer,
    kind: ScenarioKind,
    records: &[StoredScenario],
) -> Vec<String> {
    if records.is_empty() {
        return vec![no_saved_scenarios(kind)];
    }
    let text = generate_or_fallback(explainer, kind, &build_suggestions_prompt(kind, records)).await;
    let suggestions = split_suggestions(&text);
    if suggestions.is_empty() {
        vec![FALLBACK_EXPLANATION.to_string()]
    } else {
        suggestions
    }
}

/// Cohere `generate` endpoint client.
pub struct CohereExplainer {
    config: ExplainerConfig,
    client: Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    generations: Vec<Generation>,
}

#[derive(Deserialize)]
struct Generation {
    text: String,
}

impl CohereExplainer {
    pub fn new(config: ExplainerConfig) -> Result<Self, ExplainError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn generate_url(&self) -> String {
        format!("{}/v1/generate", self.config.base_url)
    }
}

#[async_trait]
impl Explainer for CohereExplainer {
    async fn generate(&self, prompt: &str) -> Result<String, ExplainError> {
        let response = self
            .client
            .post(self.generate_url())
            .bearer_auth(self.config.api_key())
            .json(&GenerateRequest {
                model: &self.config.model,
                prompt,
                max_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExplainError::Status(status.as_u16()));
        }

        let body: GenerateResponse = response.json().await?;
        body.generations
            .into_iter()
            .map(|generation| generation.text.trim().to_string())
            .find(|text| !text.is_empty())
            .ok_or(ExplainError::Empty)
    }
}
