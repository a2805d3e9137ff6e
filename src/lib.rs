pub mod api;
pub mod chain;
pub mod config;
pub mod contracts;
pub mod encoder;
pub mod error;
pub mod networks;
pub mod orchestrator;
pub mod persist;
pub mod query;
pub mod types;
pub mod wallet;

pub use chain::ChainClient;
pub use config::Config;
pub use error::DeployError;
pub use networks::Network;
pub use orchestrator::{DeploymentOrchestrator, DeploymentPhase};
pub use query::QueryService;
pub use types::{DeploymentResult, TokenConfig, TokenInfo};
pub use wallet::{LocalSigner, WalletProvider};
