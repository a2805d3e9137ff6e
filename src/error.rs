use axum::http::StatusCode;
use thiserror::Error;

/// Error taxonomy for the deployment core.
///
/// Validation and network-config variants are produced before anything is
/// sent to a chain; the rest surface wallet, RPC, or transaction failures
/// verbatim. Only `ConnectionError` on read paths is safe to retry blindly:
/// resubmitting after an ambiguous write failure can mint a duplicate token,
/// so that decision is always left to the caller.
#[derive(Error, Debug)]
pub enum DeployError {
    // Config validation — never sent to chain
    #[error("Value out of range: {0}")]
    OutOfRange(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    // Network configuration
    #[error("Unsupported network: chain id {0}")]
    UnsupportedNetwork(u64),
    #[error("Factory not deployed on {0}")]
    FactoryNotDeployed(String),

    // Wallet
    #[error("Wallet provider unavailable")]
    WalletUnavailable,
    #[error("User rejected the request")]
    UserRejected,
    #[error("Wallet is on the wrong network")]
    NetworkMismatch,

    // Transaction execution
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Transaction reverted: {0}")]
    Reverted(String),
    #[error("Confirmation timed out for transaction {0}")]
    Timeout(String),
    #[error("Deployment failed: {0}")]
    DeploymentFailed(String),

    // RPC transport
    #[error("RPC connection failed: {0}")]
    ConnectionError(String),

    // Reads
    #[error("No token contract at {0}")]
    ContractNotFound(String),
}

impl DeployError {
    /// True for errors caused by malformed or unresolvable input — the
    /// request never reached a chain and is safe to correct and resend.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DeployError::OutOfRange(_)
                | DeployError::InvalidDate(_)
                | DeployError::InvalidAmount(_)
                | DeployError::InvalidAddress(_)
                | DeployError::InvalidConfig(_)
                | DeployError::UnsupportedNetwork(_)
                | DeployError::FactoryNotDeployed(_)
        )
    }

    /// HTTP status for the API boundary: 4xx when the caller can fix the
    /// request, 5xx when execution failed on our side of the wire.
    pub fn status_code(&self) -> StatusCode {
        match self {
            e if e.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
            DeployError::ConnectionError(_) => StatusCode::BAD_GATEWAY,
            DeployError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
