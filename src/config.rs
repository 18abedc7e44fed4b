//! Command line and the runtime configuration built from it once at startup.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::core::ScenarioKind;

pub const DEFAULT_COHERE_BASE_URL: &str = "https://api.cohere.ai";
pub const DEFAULT_COHERE_MODEL: &str = "command";

#[derive(Parser, Debug)]
#[command(
    name = "finsim",
    about = "Deterministic personal-finance projections: debt payoff, savings goals, investing and budgets"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Run one scenario from a JSON file and print the result.
    Simulate(SimulateArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: IpAddr,
    #[command(flatten)]
    pub explainer: ExplainerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ExplainerArgs {
    #[arg(
        long,
        env = "COHERE_API_KEY",
        hide_env_values = true,
        help = "Enables AI explanations when set"
    )]
    pub cohere_api_key: Option<String>,
    #[arg(long, env = "COHERE_BASE_URL", default_value = DEFAULT_COHERE_BASE_URL)]
    pub cohere_base_url: String,
    #[arg(long, default_value = DEFAULT_COHERE_MODEL)]
    pub cohere_model: String,
    #[arg(long, default_value_t = 30)]
    pub explain_timeout_secs: u64,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Scenario type in kebab-case, e.g. debt-payoff.
    pub kind: ScenarioKind,
    /// JSON file holding the scenario input.
    #[arg(long)]
    pub input: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: IpAddr,
    pub port: u16,
    /// `None` disables AI explanations; responses then omit them.
    pub explainer: Option<ExplainerConfig>,
}

impl AppConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

impl From<ServeArgs> for AppConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            bind: args.bind,
            port: args.port,
            explainer: args.explainer.into_config(),
        }
    }
}

impl ExplainerArgs {
    pub fn into_config(self) -> Option<ExplainerConfig> {
        let key = self.cohere_api_key.filter(|key| !key.trim().is_empty())?;
        Some(
            ExplainerConfig::new(key)
                .with_base_url(self.cohere_base_url)
                .with_model(self.cohere_model)
                .with_timeout(Duration::from_secs(self.explain_timeout_secs)),
        )
    }
}

/// Settings for the text-generation provider behind AI explanations.
#[derive(Clone)]
pub struct ExplainerConfig {
    api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl ExplainerConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_COHERE_BASE_URL.to_string(),
            model: DEFAULT_COHERE_MODEL.to_string(),
            timeout: Duration::from_secs(30),
            max_tokens: 300,
            temperature: 0.7,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for ExplainerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExplainerConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}
