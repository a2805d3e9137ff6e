use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::primitives::utils::format_ether;
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::rpc::types::{Log, TransactionReceipt, TransactionRequest};
use alloy::sol_types::SolCall;
use alloy::transports::http::{Client, Http};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::contracts::{IManagedToken, ITokenFactory, TokenParams, VestingParams};
use crate::error::DeployError;
use crate::networks::Network;
use crate::types::{FeeEstimate, TokenInfo};
use crate::wallet::{WalletError, WalletProvider};

/// Conservative fixed gas limit for a factory creation call.
pub const CREATION_GAS_LIMIT: u64 = 2_500_000;

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

impl From<WalletError> for DeployError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::Unavailable => DeployError::WalletUnavailable,
            WalletError::Rejected => DeployError::UserRejected,
            WalletError::UnrecognizedChain(_) => DeployError::NetworkMismatch,
            WalletError::InsufficientFunds(msg) => DeployError::InsufficientFunds(msg),
            WalletError::Transport(msg) => DeployError::ConnectionError(msg),
        }
    }
}

/// Single authenticated channel to one network: a JSON-RPC provider for
/// reads plus a wallet capability for state-changing calls.
///
/// Construction only parses the endpoint URL; an unreachable endpoint
/// surfaces as `ConnectionError` at first use. An instance is reusable
/// across sequential operations but must not be shared across concurrent
/// submissions from the same account without external sequencing.
pub struct ChainClient {
    network: &'static Network,
    provider: RootProvider<Http<Client>>,
    wallet: Arc<dyn WalletProvider>,
}

impl ChainClient {
    pub fn new(
        network: &'static Network,
        wallet: Arc<dyn WalletProvider>,
    ) -> Result<Self, DeployError> {
        let url = network
            .rpc_url
            .parse()
            .map_err(|e| DeployError::ConnectionError(format!("Invalid RPC URL: {}", e)))?;
        let provider = ProviderBuilder::new().on_http(url);
        Ok(Self {
            network,
            provider,
            wallet,
        })
    }

    pub fn network(&self) -> &'static Network {
        self.network
    }

    /// Request authorization from the wallet and make sure it is on this
    /// client's network. If the wallet does not know the network at all,
    /// register it from the registry fields and retry the switch once.
    pub async fn authorize(&self) -> Result<Address, DeployError> {
        let accounts = self.wallet.request_accounts().await?;
        let account = accounts
            .first()
            .copied()
            .ok_or(DeployError::WalletUnavailable)?;

        match self.wallet.request_chain_switch(self.network.chain_id).await {
            Ok(()) => {}
            Err(WalletError::UnrecognizedChain(_)) => {
                info!(
                    "Wallet does not know chain {}, requesting chain add",
                    self.network.chain_id
                );
                self.wallet.request_chain_add(self.network).await?;
                self.wallet
                    .request_chain_switch(self.network.chain_id)
                    .await?;
            }
            Err(e) => return Err(e.into()),
        }

        Ok(account)
    }

    /// Read-only cost estimate. The returned `deployment_fee` is the exact
    /// protocol fee the factory currently charges; it must be attached
    /// verbatim as the value of the creation call.
    pub async fn estimate_fee(&self, factory: Address) -> Result<FeeEstimate, DeployError> {
        let contract = ITokenFactory::new(factory, &self.provider);
        let deployment_fee = contract
            .deploymentFee()
            .call()
            .await
            .map_err(|e| DeployError::ConnectionError(e.to_string()))?
            .fee;

        let gas_price = match self.provider.get_gas_price().await {
            Ok(price) => price,
            Err(e) => {
                let hint = self.network.gas_price_gwei as u128 * 1_000_000_000;
                warn!(
                    "Gas price query failed on {}, falling back to {} wei hint: {}",
                    self.network.name, hint, e
                );
                hint
            }
        };

        let gas_cost = U256::from(CREATION_GAS_LIMIT) * U256::from(gas_price);
        let total = gas_cost + deployment_fee;

        Ok(FeeEstimate {
            gas_limit: CREATION_GAS_LIMIT,
            gas_price_wei: gas_price,
            deployment_fee: format_ether(deployment_fee),
            total_cost: format_ether(total),
            deployment_fee_wei: deployment_fee,
        })
    }

    /// Send the single state-changing creation call with `fee` attached as
    /// value. Not idempotent: a resend after an ambiguous failure can mint
    /// a duplicate token, so this is never retried here.
    pub async fn submit_creation(
        &self,
        factory: Address,
        params: TokenParams,
        vesting: Vec<VestingParams>,
        fee: U256,
    ) -> Result<B256, DeployError> {
        let call = ITokenFactory::createTokenCall {
            config: params,
            vesting,
        };
        let mut tx = TransactionRequest::default()
            .to(factory)
            .input(Bytes::from(call.abi_encode()).into())
            .value(fee);
        tx.gas = Some(CREATION_GAS_LIMIT as u128);

        let tx_hash = self.wallet.sign_and_send(tx).await?;
        info!(
            "Creation transaction {} submitted on {}",
            tx_hash, self.network.name
        );
        Ok(tx_hash)
    }

    /// Poll until the transaction reaches the requested confirmation depth
    /// or `max_wait` elapses. Depth 0 (local/test networks) returns on
    /// first inclusion. On timeout the hash is preserved in the error so
    /// the caller can reconcile later: the transaction may still land.
    pub async fn await_confirmation(
        &self,
        tx_hash: B256,
        confirmations: u64,
        max_wait: Duration,
    ) -> Result<TransactionReceipt, DeployError> {
        let deadline = tokio::time::Instant::now() + max_wait;

        loop {
            match self.provider.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    if confirmations == 0 {
                        return Ok(receipt);
                    }
                    if let Some(included) = receipt.block_number {
                        let head = self
                            .provider
                            .get_block_number()
                            .await
                            .map_err(|e| DeployError::ConnectionError(e.to_string()))?;
                        if head.saturating_sub(included) + 1 >= confirmations {
                            return Ok(receipt);
                        }
                        debug!(
                            "Transaction {} at depth {}, waiting for {}",
                            tx_hash,
                            head.saturating_sub(included) + 1,
                            confirmations
                        );
                    }
                }
                Ok(None) => {}
                // Transient poll failures are tolerated until the deadline
                Err(e) => debug!("Receipt poll failed for {}: {}", tx_hash, e),
            }

            if tokio::time::Instant::now() + RECEIPT_POLL_INTERVAL > deadline {
                return Err(DeployError::Timeout(format!("{:#x}", tx_hash)));
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }

    /// Batched read of a token's public metadata. The five fields are
    /// fetched concurrently; an address without the expected interface
    /// fails as `ContractNotFound`.
    pub async fn read_token_info(&self, address: Address) -> Result<TokenInfo, DeployError> {
        let token = IManagedToken::new(address, &self.provider);

        let (name, symbol, decimals, total_supply, owner) = tokio::try_join!(
            async { token.name().call().await },
            async { token.symbol().call().await },
            async { token.decimals().call().await },
            async { token.totalSupply().call().await },
            async { token.owner().call().await },
        )
        .map_err(|e| match e {
            alloy::contract::Error::TransportError(t) => DeployError::ConnectionError(t.to_string()),
            _ => DeployError::ContractNotFound(format!("{:#x}", address)),
        })?;

        let decimals = decimals.tokenDecimals;
        Ok(TokenInfo {
            name: name.tokenName,
            symbol: symbol.tokenSymbol,
            decimals,
            total_supply: format_token_amount(total_supply.supply, decimals),
            owner: format!("{:#x}", owner.tokenOwner),
        })
    }

    /// Addresses of tokens previously created by `user`, in the order the
    /// factory returns them.
    pub async fn list_user_tokens(
        &self,
        factory: Address,
        user: Address,
    ) -> Result<Vec<Address>, DeployError> {
        let contract = ITokenFactory::new(factory, &self.provider);
        let result = contract
            .getUserTokens(user)
            .call()
            .await
            .map_err(|e| DeployError::ConnectionError(e.to_string()))?;
        Ok(result.tokens)
    }
}

/// Scan receipt logs for the factory's creation event and pull out the new
/// token address. `None` on a confirmed receipt is the inconsistent-success
/// condition the orchestrator reports distinctly.
pub fn extract_created_address(logs: &[Log], factory: Address) -> Option<Address> {
    logs.iter()
        .filter(|log| log.inner.address == factory)
        .find_map(|log| {
            log.log_decode::<ITokenFactory::TokenCreated>()
                .ok()
                .map(|decoded| decoded.inner.data.tokenAddress)
        })
}

/// Human-readable token amount: scale down by `10^decimals` and trim
/// trailing fractional zeros.
pub fn format_token_amount(amount: U256, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }

    let divisor = U256::from(10).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        return whole.to_string();
    }

    let remainder_str = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
    let trimmed = remainder_str.trim_end_matches('0');
    if trimmed.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, trimmed)
    }
}
