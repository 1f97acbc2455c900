// Session configuration: command-line flags and the immutable client settings
// built from them.

use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;

use crate::api::envelope::StatusPolicy;

/// Production endpoint of the EVO API.
pub const DEFAULT_BASE_URL: &str = "https://app.alice.ws/cli/v1";

/// Upper bound on the total duration of one request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Command-line flags.
#[derive(Debug, Parser)]
#[command(name = "alice-cli", version, about = "Interactive client for the Alice EVO instance API")]
pub struct Cli {
    /// API bearer token (client ID:secret). Prompted for when omitted.
    #[arg(long, env = "ALICE_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL of the API.
    #[arg(long, env = "ALICE_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Treat a non-2xx `status` inside a successful response as an error.
    #[arg(long, env = "ALICE_STRICT_STATUS")]
    pub strict_status: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The token given on the command line or environment, if non-blank.
    pub fn supplied_token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Build the session configuration around an already resolved token.
    pub fn client_config(&self, token: String) -> ClientConfig {
        let policy = if self.strict_status {
            StatusPolicy::Enforce
        } else {
            StatusPolicy::Ignore
        };
        ClientConfig::new(token)
            .with_base_url(&self.base_url)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_status_policy(policy)
    }
}

/// Immutable settings for one client session.
#[derive(Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: SecretString,
    pub timeout: Duration,
    pub status_policy: StatusPolicy,
}

impl ClientConfig {
    /// Default settings for the production endpoint.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: SecretString::from(token.into()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            status_policy: StatusPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }
}
