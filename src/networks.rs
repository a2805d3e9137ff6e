use alloy::primitives::Address;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::str::FromStr;

use crate::error::DeployError;

/// A supported chain: immutable registry data loaded once at process start.
#[derive(Debug, Clone, Serialize)]
pub struct Network {
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    pub name: &'static str,
    pub symbol: &'static str,
    #[serde(rename = "rpcUrl")]
    pub rpc_url: &'static str,
    #[serde(rename = "explorerUrl")]
    pub explorer_url: &'static str,
    /// Native gas price hint in gwei, used when the RPC fee query fails.
    #[serde(rename = "gasPriceGwei")]
    pub gas_price_gwei: u64,
}

pub static SUPPORTED_NETWORKS: Lazy<Vec<Network>> = Lazy::new(|| {
    vec![
        Network {
            chain_id: 1,
            name: "Ethereum",
            symbol: "ETH",
            rpc_url: "https://eth.drpc.org",
            explorer_url: "https://etherscan.io",
            gas_price_gwei: 20,
        },
        Network {
            chain_id: 56,
            name: "BSC",
            symbol: "BNB",
            rpc_url: "https://bsc-dataseed.binance.org",
            explorer_url: "https://bscscan.com",
            gas_price_gwei: 5,
        },
        Network {
            chain_id: 137,
            name: "Polygon",
            symbol: "MATIC",
            rpc_url: "https://polygon-rpc.com",
            explorer_url: "https://polygonscan.com",
            gas_price_gwei: 30,
        },
        Network {
            chain_id: 42161,
            name: "Arbitrum",
            symbol: "ETH",
            rpc_url: "https://arb1.arbitrum.io/rpc",
            explorer_url: "https://arbiscan.io",
            gas_price_gwei: 1,
        },
        Network {
            chain_id: 250,
            name: "Fantom",
            symbol: "FTM",
            rpc_url: "https://rpc.ftm.tools",
            explorer_url: "https://ftmscan.com",
            gas_price_gwei: 20,
        },
    ]
});

/// Factory contract addresses per chain id.
const FACTORY_ADDRESSES: &[(u64, &str)] = &[
    (1, "0x1234567890123456789012345678901234567890"),
    (56, "0x1234567890123456789012345678901234567890"),
    (137, "0x1234567890123456789012345678901234567890"),
    (42161, "0x1234567890123456789012345678901234567890"),
    (250, "0x1234567890123456789012345678901234567890"),
];

impl Network {
    /// Look up a chain id in the registry. Every component consults this
    /// before acting on a chain id.
    pub fn resolve(chain_id: u64) -> Result<&'static Network, DeployError> {
        SUPPORTED_NETWORKS
            .iter()
            .find(|n| n.chain_id == chain_id)
            .ok_or(DeployError::UnsupportedNetwork(chain_id))
    }

    /// Token factory address for this chain. Fatal (not retryable) when the
    /// factory has not been deployed there.
    pub fn factory_address(&self) -> Result<Address, DeployError> {
        let addr = FACTORY_ADDRESSES
            .iter()
            .find(|(id, _)| *id == self.chain_id)
            .map(|(_, addr)| *addr)
            .ok_or_else(|| DeployError::FactoryNotDeployed(self.name.to_string()))?;

        Address::from_str(addr)
            .map_err(|_| DeployError::FactoryNotDeployed(self.name.to_string()))
    }

    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url, tx_hash)
    }

    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.explorer_url, address)
    }
}
