use rust_decimal_macros::dec;
use std::time::Duration;
use tracing::{info, warn};

use crate::chain::{extract_created_address, ChainClient};
use crate::encoder;
use crate::error::DeployError;
use crate::types::{DeploymentResult, TokenConfig};

/// Phases of a single deployment attempt, in order. The machine is terminal
/// on first success or first unrecoverable error; there is no retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentPhase {
    Validating,
    Resolving,
    Estimating,
    Submitting,
    Confirming,
    ExtractingEvent,
    Done,
}

impl DeploymentPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentPhase::Validating => "validating",
            DeploymentPhase::Resolving => "resolving",
            DeploymentPhase::Estimating => "estimating",
            DeploymentPhase::Submitting => "submitting",
            DeploymentPhase::Confirming => "confirming",
            DeploymentPhase::ExtractingEvent => "extracting_event",
            DeploymentPhase::Done => "done",
        }
    }
}

/// Runs one deployment attempt end to end: validate, resolve the factory,
/// estimate cost, submit, await confirmation, extract the creation event.
/// Stateless per call; nothing is persisted here. Persistence of the
/// returned result is the caller's concern.
pub struct DeploymentOrchestrator {
    client: ChainClient,
    confirmations: u64,
    confirmation_timeout: Duration,
}

impl DeploymentOrchestrator {
    pub fn new(client: ChainClient, confirmations: u64, confirmation_timeout: Duration) -> Self {
        Self {
            client,
            confirmations,
            confirmation_timeout,
        }
    }

    /// Deploy a token from the given config. `Ok` means the creation
    /// transaction confirmed; an inconsistent success (receipt confirmed
    /// but creation event absent) is still `Ok` with an empty contract
    /// address and a dedicated warning, never a fabricated placeholder.
    pub async fn deploy(&self, config: &TokenConfig) -> Result<DeploymentResult, DeployError> {
        let mut phase = DeploymentPhase::Validating;
        info!("[{}] Validating config for {}", phase.as_str(), config.name);

        // Validation never clamps: out-of-range values are rejected before
        // anything touches the network.
        let params = encoder::validate_config(config)?;
        let vesting = encoder::encode_vesting_schedule(&config.vesting_config)?;

        let vesting_total = encoder::enabled_vesting_total(&config.vesting_config);
        if vesting_total > dec!(100) {
            // Advisory only: the contract is the final arbiter.
            warn!(
                "Enabled vesting allocations sum to {}% (> 100%), proceeding anyway",
                vesting_total
            );
        }

        phase = DeploymentPhase::Resolving;
        let network = self.client.network();
        if network.chain_id != config.chain_id {
            return Err(DeployError::InvalidConfig(format!(
                "Config targets chain {} but client is bound to chain {}",
                config.chain_id, network.chain_id
            )));
        }
        let factory = network.factory_address()?;
        info!(
            "[{}] Factory {} on {} (chain {})",
            phase.as_str(),
            factory,
            network.name,
            network.chain_id
        );

        let creator = self.client.authorize().await?;

        phase = DeploymentPhase::Estimating;
        let estimate = self.client.estimate_fee(factory).await?;
        info!(
            "[{}] Protocol fee {} {}, estimated total {} {}",
            phase.as_str(),
            estimate.deployment_fee,
            network.symbol,
            estimate.total_cost,
            network.symbol
        );

        phase = DeploymentPhase::Submitting;
        info!(
            "[{}] Submitting creation of {} ({}) from {}",
            phase.as_str(),
            params.name,
            params.symbol,
            creator
        );
        // The protocol fee is attached verbatim; under-attaching makes the
        // factory reject, which surfaces below as a revert.
        let tx_hash = self
            .client
            .submit_creation(factory, params, vesting, estimate.deployment_fee_wei)
            .await?;

        phase = DeploymentPhase::Confirming;
        info!(
            "[{}] Awaiting {} confirmation(s) for {:#x}",
            phase.as_str(),
            self.confirmations,
            tx_hash
        );
        let receipt = self
            .client
            .await_confirmation(tx_hash, self.confirmations, self.confirmation_timeout)
            .await?;

        if !receipt.status() {
            // No revert reason is available from the receipt alone.
            return Err(DeployError::DeploymentFailed(format!(
                "Creation transaction {:#x} reverted",
                tx_hash
            )));
        }

        phase = DeploymentPhase::ExtractingEvent;
        info!(
            "[{}] Scanning {} receipt log(s) for the creation event",
            phase.as_str(),
            receipt.inner.logs().len()
        );
        let contract_address = match extract_created_address(receipt.inner.logs(), factory) {
            Some(addr) => format!("{:#x}", addr),
            None => {
                // Inconsistent success: confirmed receipt, no creation
                // event. Reported as success with an empty address so the
                // condition stays observable downstream.
                warn!(
                    "Receipt {:#x} confirmed but TokenCreated event is missing",
                    tx_hash
                );
                String::new()
            }
        };

        phase = DeploymentPhase::Done;
        info!(
            "[{}] Token {} deployed at {:?} (tx {:#x})",
            phase.as_str(),
            config.name,
            contract_address,
            tx_hash
        );

        Ok(DeploymentResult {
            success: true,
            contract_address: Some(contract_address),
            transaction_hash: Some(format!("{:#x}", tx_hash)),
            gas_used: Some(u64::try_from(receipt.gas_used).unwrap_or(u64::MAX)),
            deployment_cost: Some(estimate.deployment_fee),
            error: None,
        })
    }
}

/// Flatten a failed attempt into the result shape callers persist. A
/// confirmation timeout keeps the original transaction hash so the caller
/// can reconcile later: the transaction may still succeed on-chain.
pub fn failure_result(err: &DeployError) -> DeploymentResult {
    let mut result = DeploymentResult::failure(err.to_string());
    if let DeployError::Timeout(tx_hash) = err {
        result.transaction_hash = Some(tx_hash.clone());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networks::Network;
    use crate::types::{FeatureFlags, VestingAllocation, VestingCategory};
    use crate::wallet::{WalletError, WalletProvider};
    use alloy::primitives::{Address, B256};
    use alloy::rpc::types::TransactionRequest;
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Any wallet interaction before validation passes is a bug.
    struct UntouchableWallet;

    #[async_trait]
    impl WalletProvider for UntouchableWallet {
        async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
            panic!("wallet touched before validation completed");
        }
        async fn request_chain_switch(&self, _chain_id: u64) -> Result<(), WalletError> {
            panic!("wallet touched before validation completed");
        }
        async fn request_chain_add(&self, _network: &Network) -> Result<(), WalletError> {
            panic!("wallet touched before validation completed");
        }
        async fn sign_and_send(&self, _tx: TransactionRequest) -> Result<B256, WalletError> {
            panic!("wallet touched before validation completed");
        }
    }

    fn orchestrator_on(chain_id: u64) -> DeploymentOrchestrator {
        let client = ChainClient::new(
            Network::resolve(chain_id).unwrap(),
            Arc::new(UntouchableWallet),
        )
        .unwrap();
        DeploymentOrchestrator::new(client, 1, Duration::from_secs(60))
    }

    fn valid_config(chain_id: u64) -> TokenConfig {
        TokenConfig {
            name: "Demo".to_string(),
            symbol: "DEM".to_string(),
            decimals: 18,
            initial_supply: "1000000".to_string(),
            max_supply: None,
            chain_id,
            features: FeatureFlags::default(),
            transfer_fees_config: None,
            vesting_config: vec![],
        }
    }

    #[tokio::test]
    async fn validation_failure_aborts_before_any_wallet_interaction() {
        let orchestrator = orchestrator_on(1);
        let mut config = valid_config(1);
        config.initial_supply = "1.5".to_string();

        match orchestrator.deploy(&config).await {
            Err(DeployError::InvalidAmount(_)) => {}
            other => panic!("expected InvalidAmount, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn vesting_validation_failure_aborts_early() {
        let orchestrator = orchestrator_on(1);
        let mut config = valid_config(1);
        config.vesting_config = vec![VestingAllocation {
            category: VestingCategory::Team,
            percentage: rust_decimal_macros::dec!(10),
            start_date: "soon".to_string(),
            duration: 12,
            enabled: true,
        }];

        match orchestrator.deploy(&config).await {
            Err(DeployError::InvalidDate(_)) => {}
            other => panic!("expected InvalidDate, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn chain_mismatch_is_rejected_in_resolving() {
        let orchestrator = orchestrator_on(1);
        let config = valid_config(137);

        match orchestrator.deploy(&config).await {
            Err(DeployError::InvalidConfig(msg)) => {
                assert!(msg.contains("chain 137"));
            }
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn timeout_failure_preserves_transaction_hash() {
        let err = DeployError::Timeout("0xdeadbeef".to_string());
        let result = failure_result(&err);
        assert!(!result.success);
        assert_eq!(result.transaction_hash.as_deref(), Some("0xdeadbeef"));
        assert!(result.error.unwrap().contains("0xdeadbeef"));
    }

    #[test]
    fn ordinary_failure_has_no_hash() {
        let result = failure_result(&DeployError::UserRejected);
        assert!(!result.success);
        assert!(result.transaction_hash.is_none());
    }

    #[test]
    fn phases_are_named_for_telemetry() {
        assert_eq!(DeploymentPhase::Validating.as_str(), "validating");
        assert_eq!(DeploymentPhase::ExtractingEvent.as_str(), "extracting_event");
        assert_eq!(DeploymentPhase::Done.as_str(), "done");
    }
}
