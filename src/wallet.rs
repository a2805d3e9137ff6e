use alloy::network::EthereumWallet;
use alloy::primitives::{Address, B256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::RwLock;
use thiserror::Error;
use tracing::info;

use crate::networks::Network;

/// Wallet-side failures. `UnrecognizedChain` is the add-then-retry trigger:
/// the chain client responds by registering the chain from registry data
/// and retrying the switch once.
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("No wallet provider available")]
    Unavailable,
    #[error("User rejected the request")]
    Rejected,
    #[error("Chain {0} is not known to the wallet")]
    UnrecognizedChain(u64),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Wallet transport failed: {0}")]
    Transport(String),
}

/// Capability interface the chain client consumes. The core never assumes a
/// concrete provider implementation, only these four operations, so it can
/// be driven by a browser wallet relay, a hardware signer, or a test fake.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;
    async fn request_chain_switch(&self, chain_id: u64) -> Result<(), WalletError>;
    async fn request_chain_add(&self, network: &Network) -> Result<(), WalletError>;
    async fn sign_and_send(&self, tx: TransactionRequest) -> Result<B256, WalletError>;
}

/// Server-side signer holding a single private key. The active chain is
/// switchable at runtime so one signer instance can serve every registered
/// network; nonce ordering for concurrent submissions is this layer's
/// responsibility, which is why the filled provider handles it per send.
pub struct LocalSigner {
    wallet: PrivateKeySigner,
    active: RwLock<&'static Network>,
}

impl LocalSigner {
    pub fn new(private_key: &str, network: &'static Network) -> Result<Self, WalletError> {
        let wallet = PrivateKeySigner::from_str(private_key.trim())
            .map_err(|e| WalletError::Transport(format!("Invalid deployer key: {}", e)))?;
        Ok(Self {
            wallet,
            active: RwLock::new(network),
        })
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    fn active_network(&self) -> &'static Network {
        *self.active.read().expect("network lock poisoned")
    }
}

#[async_trait]
impl WalletProvider for LocalSigner {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(vec![self.wallet.address()])
    }

    async fn request_chain_switch(&self, chain_id: u64) -> Result<(), WalletError> {
        if self.active_network().chain_id == chain_id {
            return Ok(());
        }
        match Network::resolve(chain_id) {
            Ok(network) => {
                *self.active.write().expect("network lock poisoned") = network;
                info!("Signer switched to {} (chain {})", network.name, chain_id);
                Ok(())
            }
            Err(_) => Err(WalletError::UnrecognizedChain(chain_id)),
        }
    }

    async fn request_chain_add(&self, network: &Network) -> Result<(), WalletError> {
        // A local key signs for any chain; adding is only bookkeeping.
        match Network::resolve(network.chain_id) {
            Ok(known) => {
                *self.active.write().expect("network lock poisoned") = known;
                Ok(())
            }
            Err(_) => Err(WalletError::UnrecognizedChain(network.chain_id)),
        }
    }

    async fn sign_and_send(&self, tx: TransactionRequest) -> Result<B256, WalletError> {
        let network = self.active_network();
        let url = network
            .rpc_url
            .parse()
            .map_err(|e| WalletError::Transport(format!("Invalid RPC URL: {}", e)))?;

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(EthereumWallet::from(self.wallet.clone()))
            .on_http(url);

        let pending = provider.send_transaction(tx).await.map_err(|e| {
            let msg = e.to_string();
            if msg.contains("insufficient funds") {
                WalletError::InsufficientFunds(msg)
            } else {
                WalletError::Transport(msg)
            }
        })?;

        Ok(*pending.tx_hash())
    }
}
