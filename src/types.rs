use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Wizard-supplied token configuration. Owned by the caller for its whole
/// lifetime; the core receives a fully populated config per call and never
/// retains it.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(rename = "initialSupply")]
    pub initial_supply: String,
    /// Optional; omitted or equal to the initial supply means "unlimited".
    #[serde(rename = "maxSupply", default)]
    pub max_supply: Option<String>,
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    pub features: FeatureFlags,
    #[serde(rename = "transferFeesConfig", default)]
    pub transfer_fees_config: Option<TransferFeeConfig>,
    #[serde(rename = "vestingConfig", default)]
    pub vesting_config: Vec<VestingAllocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureFlags {
    #[serde(default)]
    pub burnable: bool,
    #[serde(default)]
    pub mintable: bool,
    #[serde(rename = "transferFees", default)]
    pub transfer_fees: bool,
    #[serde(rename = "holderRedistribution", default)]
    pub holder_redistribution: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferFeeConfig {
    /// Buy-side fee as a percentage, 0–25.
    #[serde(rename = "buyFee")]
    pub buy_fee: Decimal,
    /// Sell-side fee as a percentage, 0–25.
    #[serde(rename = "sellFee")]
    pub sell_fee: Decimal,
    #[serde(rename = "recipientAddress")]
    pub recipient_address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VestingCategory {
    Team,
    Advertising,
    PublicSale,
    PrivateSale,
    Ecosystem,
    Marketing,
    Development,
}

impl VestingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            VestingCategory::Team => "team",
            VestingCategory::Advertising => "advertising",
            VestingCategory::PublicSale => "publicSale",
            VestingCategory::PrivateSale => "privateSale",
            VestingCategory::Ecosystem => "ecosystem",
            VestingCategory::Marketing => "marketing",
            VestingCategory::Development => "development",
        }
    }
}

/// A named bucket of supply released linearly over `duration` months
/// starting at `start_date`. Only encoded when `enabled`.
#[derive(Debug, Clone, Deserialize)]
pub struct VestingAllocation {
    pub category: VestingCategory,
    /// Percentage of total supply, 0–100 with one decimal place.
    pub percentage: Decimal,
    #[serde(rename = "startDate")]
    pub start_date: String,
    /// Vesting duration in months, 1–120.
    pub duration: u32,
    pub enabled: bool,
}

/// Outcome of a single deployment attempt. Produced exactly once and never
/// mutated after return; callers persist or discard it.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentResult {
    pub success: bool,
    #[serde(rename = "contractAddress", skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(rename = "transactionHash", skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(rename = "gasUsed", skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
    /// Native currency paid to the factory, formatted in ether units.
    #[serde(rename = "deploymentCost", skip_serializing_if = "Option::is_none")]
    pub deployment_cost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeploymentResult {
    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            contract_address: None,
            transaction_hash: None,
            gas_used: None,
            deployment_cost: None,
            error: Some(error),
        }
    }
}

/// Read-only snapshot of a deployed token's public metadata. Fetched on
/// demand; the core does not cache it.
#[derive(Debug, Clone, Serialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(rename = "totalSupply")]
    pub total_supply: String,
    pub owner: String,
}

/// Deployment cost estimate. `deployment_fee_wei` must be attached verbatim
/// as the value on the creation call.
#[derive(Debug, Clone, Serialize)]
pub struct FeeEstimate {
    #[serde(rename = "gasLimit")]
    pub gas_limit: u64,
    #[serde(rename = "gasPriceWei")]
    pub gas_price_wei: u128,
    /// Protocol fee in ether units, for display.
    #[serde(rename = "deploymentFee")]
    pub deployment_fee: String,
    #[serde(rename = "totalCost")]
    pub total_cost: String,
    #[serde(skip)]
    pub deployment_fee_wei: alloy::primitives::U256,
}
