use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info};

use crate::types::DeploymentResult;

/// Flattened deployment record handed to the persistence collaborator.
/// The core only guarantees these field names; the storage schema behind
/// them is not its concern.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentRecord {
    pub user_address: String,
    pub token_name: String,
    pub token_symbol: String,
    pub network: String,
    pub contract_address: String,
    pub transaction_hash: String,
    pub gas_used: u64,
    pub deployment_cost: String,
    pub status: String,
}

impl DeploymentRecord {
    pub fn from_result(
        result: &DeploymentResult,
        user_address: &str,
        token_name: &str,
        token_symbol: &str,
        network: &str,
    ) -> Self {
        Self {
            user_address: user_address.to_string(),
            token_name: token_name.to_string(),
            token_symbol: token_symbol.to_string(),
            network: network.to_string(),
            contract_address: result.contract_address.clone().unwrap_or_default(),
            transaction_hash: result.transaction_hash.clone().unwrap_or_default(),
            gas_used: result.gas_used.unwrap_or(0),
            deployment_cost: result.deployment_cost.clone().unwrap_or_else(|| "0".into()),
            status: if result.success { "success" } else { "failed" }.to_string(),
        }
    }
}

/// Storage collaborator for deployment outcomes.
#[async_trait]
pub trait DeploymentSink: Send + Sync {
    async fn record(&self, record: &DeploymentRecord) -> anyhow::Result<()>;
}

/// Default sink: structured log line per deployment. Stands in wherever no
/// database collaborator is wired up.
pub struct LogSink;

#[async_trait]
impl DeploymentSink for LogSink {
    async fn record(&self, record: &DeploymentRecord) -> anyhow::Result<()> {
        info!(
            "Deployment recorded: {}",
            serde_json::to_string(record).unwrap_or_default()
        );
        Ok(())
    }
}

/// Persist a record without letting a sink failure poison the deployment
/// outcome: the token is on-chain whether or not the write lands.
pub async fn record_non_fatal(sink: &dyn DeploymentSink, record: DeploymentRecord) {
    if let Err(e) = sink.record(&record).await {
        error!(
            "Failed to persist deployment record for {}: {}",
            record.transaction_hash, e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSink;

    #[async_trait]
    impl DeploymentSink for FailingSink {
        async fn record(&self, _record: &DeploymentRecord) -> anyhow::Result<()> {
            anyhow::bail!("database unreachable")
        }
    }

    fn sample_record() -> DeploymentRecord {
        let result = DeploymentResult {
            success: true,
            contract_address: Some("0xdead".into()),
            transaction_hash: Some("0xbeef".into()),
            gas_used: Some(2_156_789),
            deployment_cost: Some("0.05".into()),
            error: None,
        };
        DeploymentRecord::from_result(&result, "0xf39f", "Demo", "DEM", "ethereum")
    }

    #[test]
    fn record_flattens_result() {
        let record = sample_record();
        assert_eq!(record.status, "success");
        assert_eq!(record.contract_address, "0xdead");
        assert_eq!(record.gas_used, 2_156_789);
        assert_eq!(record.network, "ethereum");
    }

    #[test]
    fn failed_result_flattens_with_defaults() {
        let result = DeploymentResult::failure("rpc down".into());
        let record = DeploymentRecord::from_result(&result, "0xf39f", "Demo", "DEM", "polygon");
        assert_eq!(record.status, "failed");
        assert_eq!(record.contract_address, "");
        assert_eq!(record.gas_used, 0);
    }

    #[tokio::test]
    async fn sink_failure_is_swallowed() {
        // Must not panic or propagate
        record_non_fatal(&FailingSink, sample_record()).await;
    }

    #[tokio::test]
    async fn log_sink_accepts_records() {
        assert!(LogSink.record(&sample_record()).await.is_ok());
    }
}
