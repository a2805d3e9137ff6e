use alloy::primitives::Address;
use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

use crate::chain::ChainClient;
use crate::error::DeployError;

/// One entry in a user's token listing. Carries either live metadata or
/// the "unknown token" placeholder when that token's reads failed.
#[derive(Debug, Clone, Serialize)]
pub struct TokenSummary {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(rename = "totalSupply")]
    pub total_supply: String,
    pub owner: String,
    #[serde(rename = "explorerUrl")]
    pub explorer_url: String,
}

/// Read-only lookups against the factory and deployed tokens on one chain.
pub struct QueryService {
    client: ChainClient,
}

impl QueryService {
    pub fn new(client: ChainClient) -> Self {
        Self { client }
    }

    /// Token addresses previously created by `user`, in factory order
    /// (not independently sorted).
    pub async fn list_user_tokens(&self, user: Address) -> Result<Vec<Address>, DeployError> {
        let factory = self.client.network().factory_address()?;
        self.client.list_user_tokens(factory, user).await
    }

    /// Describe a batch of tokens concurrently. The output preserves the
    /// input order; a failure on one token never aborts the batch — that
    /// entry becomes the placeholder and the failure is logged.
    pub async fn describe_all(&self, addresses: &[Address], owner_hint: Address) -> Vec<TokenSummary> {
        let lookups = addresses.iter().map(|&address| async move {
            match self.client.read_token_info(address).await {
                Ok(info) => TokenSummary {
                    address: format!("{:#x}", address),
                    name: info.name,
                    symbol: info.symbol,
                    decimals: info.decimals,
                    total_supply: info.total_supply,
                    owner: info.owner,
                    explorer_url: self.client.network().address_url(&format!("{:#x}", address)),
                },
                Err(e) => {
                    warn!("Failed to describe token {:#x}: {}", address, e);
                    self.unknown_token(address, owner_hint)
                }
            }
        });

        join_all(lookups).await
    }

    fn unknown_token(&self, address: Address, owner_hint: Address) -> TokenSummary {
        TokenSummary {
            address: format!("{:#x}", address),
            name: "Unknown".to_string(),
            symbol: "UNKNOWN".to_string(),
            decimals: 18,
            total_supply: "0".to_string(),
            owner: format!("{:#x}", owner_hint),
            explorer_url: self.client.network().address_url(&format!("{:#x}", address)),
        }
    }
}
