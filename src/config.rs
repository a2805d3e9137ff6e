use std::env;

// Hardhat account #0; a throwaway development key, never funded on a real
// network. Production deployments must set TOKENFORGE_DEPLOYER_KEY.
const DEV_DEPLOYER_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Service configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub deployer_key: String,
    /// Confirmation depth before a deployment is considered final.
    /// 0 returns on first inclusion (local/test networks).
    pub confirmations: u64,
    /// Maximum seconds to wait for confirmation before reporting a timeout.
    pub confirmation_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("TOKENFORGE_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            deployer_key: env::var("TOKENFORGE_DEPLOYER_KEY")
                .unwrap_or_else(|_| DEV_DEPLOYER_KEY.to_string()),
            confirmations: env::var("TOKENFORGE_CONFIRMATIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            confirmation_timeout_secs: env::var("TOKENFORGE_CONFIRMATION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(180),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            deployer_key: DEV_DEPLOYER_KEY.to_string(),
            confirmations: 1,
            confirmation_timeout_secs: 180,
        }
    }
}
