use alloy::primitives::{Address, U256};
use chrono::{DateTime, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

use crate::contracts::{TokenParams, VestingParams};
use crate::error::DeployError;
use crate::types::{TokenConfig, VestingAllocation};

/// Maximum transfer fee the factory accepts: 25% in basis points.
pub const MAX_FEE_BPS: u32 = 2500;
/// Vesting percentages cover the whole supply.
pub const MAX_VESTING_BPS: u32 = 10_000;
pub const MAX_VESTING_ENTRIES: usize = 7;
pub const MAX_VESTING_MONTHS: u32 = 120;

/// Convert a percentage to basis points, rounding via **floor**.
///
/// Flooring means the contract is never charged more than the user asked
/// for; the fractional remainder below one basis point is dropped.
pub fn to_basis_points(percent: Decimal, max_bps: u32) -> Result<u32, DeployError> {
    let scaled = percent * dec!(100);
    if scaled.is_sign_negative() {
        return Err(DeployError::OutOfRange(format!(
            "Percentage cannot be negative: {}",
            percent
        )));
    }
    // Range-check before flooring: 25.001% scales above the cap and must
    // fail, not floor down to an accepted 2500.
    if scaled > Decimal::from(max_bps) {
        return Err(DeployError::OutOfRange(format!(
            "{}% exceeds maximum of {} basis points",
            percent, max_bps
        )));
    }
    scaled
        .floor()
        .to_u32()
        .ok_or_else(|| DeployError::OutOfRange(format!("Percentage too large: {}", percent)))
}

/// Parse a calendar date into unix seconds. Accepts RFC 3339 timestamps or
/// plain `YYYY-MM-DD` dates (interpreted as midnight UTC).
pub fn to_unix_seconds(date: &str) -> Result<u64, DeployError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        let ts = dt.timestamp();
        return u64::try_from(ts)
            .map_err(|_| DeployError::InvalidDate(format!("Date before unix epoch: {}", date)));
    }

    let naive = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| DeployError::InvalidDate(format!("Unparsable date: {}", date)))?;
    let ts = naive
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| DeployError::InvalidDate(format!("Unparsable date: {}", date)))?
        .and_utc()
        .timestamp();
    u64::try_from(ts)
        .map_err(|_| DeployError::InvalidDate(format!("Date before unix epoch: {}", date)))
}

/// Vesting duration in seconds using the fixed 30-day-month convention
/// (`months * 30 * 86400`). Intentionally not calendar-accurate: the
/// vesting contract works in flat 30-day months.
pub fn months_to_seconds(months: u32) -> u64 {
    months as u64 * 30 * 86_400
}

/// Scale a decimal supply string by `10^decimals` into a uint256.
/// The amount must be a non-negative, integer-valued decimal.
pub fn encode_supply(amount: &str, decimals: u8) -> Result<U256, DeployError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(DeployError::InvalidAmount("Empty amount".into()));
    }

    let parts: Vec<&str> = amount.split('.').collect();
    if parts.len() > 2 {
        return Err(DeployError::InvalidAmount(format!(
            "Multiple decimal points: {}",
            amount
        )));
    }

    // Whole supply units only: a fractional part must be all zeros.
    if let Some(frac) = parts.get(1) {
        if frac.is_empty() || !frac.chars().all(|c| c == '0') {
            return Err(DeployError::InvalidAmount(format!(
                "Supply must be a whole number: {}",
                amount
            )));
        }
    }

    let whole = parts[0];
    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return Err(DeployError::InvalidAmount(format!(
            "Not a non-negative integer: {}",
            amount
        )));
    }

    let base = U256::from_str(whole)
        .map_err(|_| DeployError::InvalidAmount(format!("Amount too large: {}", amount)))?;
    let scale = U256::from(10).pow(U256::from(decimals));
    base.checked_mul(scale)
        .ok_or_else(|| DeployError::InvalidAmount(format!("Amount overflows uint256: {}", amount)))
}

/// Encode the enabled vesting allocations, preserving input order. Disabled
/// entries are dropped entirely, never forwarded as zeroed placeholders.
pub fn encode_vesting_schedule(
    allocations: &[VestingAllocation],
) -> Result<Vec<VestingParams>, DeployError> {
    if allocations.len() > MAX_VESTING_ENTRIES {
        return Err(DeployError::InvalidConfig(format!(
            "At most {} vesting allocations are supported, got {}",
            MAX_VESTING_ENTRIES,
            allocations.len()
        )));
    }

    allocations
        .iter()
        .filter(|a| a.enabled)
        .map(|a| {
            if a.duration < 1 || a.duration > MAX_VESTING_MONTHS {
                return Err(DeployError::InvalidConfig(format!(
                    "Vesting duration for {} must be 1-{} months, got {}",
                    a.category.as_str(),
                    MAX_VESTING_MONTHS,
                    a.duration
                )));
            }
            let bps = to_basis_points(a.percentage, MAX_VESTING_BPS)?;
            let start = to_unix_seconds(&a.start_date)?;
            Ok(VestingParams {
                percentage: U256::from(bps),
                startTime: U256::from(start),
                duration: U256::from(months_to_seconds(a.duration)),
                enabled: true,
            })
        })
        .collect()
}

/// Sum of percentages across enabled allocations. Exceeding 100% is an
/// advisory for the orchestrator, never a hard block: the contract is the
/// final arbiter.
pub fn enabled_vesting_total(allocations: &[VestingAllocation]) -> Decimal {
    allocations
        .iter()
        .filter(|a| a.enabled)
        .map(|a| a.percentage)
        .sum()
}

/// Validate and normalize a whole config into the ABI-ready factory
/// parameters. Pure and deterministic; every failure here is a validation
/// failure, nothing has touched the network. Out-of-range values are
/// rejected, never clamped.
pub fn validate_config(config: &TokenConfig) -> Result<TokenParams, DeployError> {
    let name = config.name.trim();
    if name.is_empty() {
        return Err(DeployError::InvalidConfig("Token name is required".into()));
    }

    let symbol = config.symbol.trim().to_uppercase();
    if symbol.is_empty() || symbol.chars().count() > 10 {
        return Err(DeployError::InvalidConfig(format!(
            "Symbol must be 1-10 characters, got {:?}",
            config.symbol
        )));
    }

    if config.decimals > 18 {
        return Err(DeployError::InvalidConfig(format!(
            "Decimals must be 0-18, got {}",
            config.decimals
        )));
    }

    let initial_supply = encode_supply(&config.initial_supply, config.decimals)?;
    if initial_supply.is_zero() {
        return Err(DeployError::InvalidAmount(
            "Initial supply must be greater than zero".into(),
        ));
    }

    // Absent max supply means "capped at the initial mint".
    let max_supply = match config.max_supply.as_deref() {
        Some(raw) if !raw.trim().is_empty() => {
            let max = encode_supply(raw, config.decimals)?;
            if max < initial_supply {
                return Err(DeployError::InvalidAmount(
                    "Max supply cannot be below initial supply".into(),
                ));
            }
            max
        }
        _ => initial_supply,
    };

    let (buy_fee, sell_fee, fee_recipient) = match &config.transfer_fees_config {
        Some(fees) => {
            let buy = to_basis_points(fees.buy_fee, MAX_FEE_BPS)?;
            let sell = to_basis_points(fees.sell_fee, MAX_FEE_BPS)?;
            let recipient = if fees.recipient_address.trim().is_empty() {
                Address::ZERO
            } else {
                Address::from_str(fees.recipient_address.trim()).map_err(|_| {
                    DeployError::InvalidAddress(format!(
                        "Invalid fee recipient: {}",
                        fees.recipient_address
                    ))
                })?
            };
            (buy, sell, recipient)
        }
        None => (0, 0, Address::ZERO),
    };

    Ok(TokenParams {
        name: name.to_string(),
        symbol,
        decimals: config.decimals,
        initialSupply: initial_supply,
        maxSupply: max_supply,
        burnable: config.features.burnable,
        mintable: config.features.mintable,
        transferFees: config.features.transfer_fees,
        holderRedistribution: config.features.holder_redistribution,
        buyFee: U256::from(buy_fee),
        sellFee: U256::from(sell_fee),
        feeRecipient: fee_recipient,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FeatureFlags, TransferFeeConfig, VestingCategory};

    fn allocation(percentage: Decimal, enabled: bool) -> VestingAllocation {
        VestingAllocation {
            category: VestingCategory::Team,
            percentage,
            start_date: "2026-10-01".to_string(),
            duration: 12,
            enabled,
        }
    }

    fn base_config() -> TokenConfig {
        TokenConfig {
            name: "Demo".to_string(),
            symbol: "DEM".to_string(),
            decimals: 18,
            initial_supply: "1000000".to_string(),
            max_supply: None,
            chain_id: 1,
            features: FeatureFlags::default(),
            transfer_fees_config: None,
            vesting_config: vec![],
        }
    }

    #[test]
    fn basis_points_floor_within_range() {
        assert_eq!(to_basis_points(dec!(0), MAX_FEE_BPS).unwrap(), 0);
        assert_eq!(to_basis_points(dec!(2.5), MAX_FEE_BPS).unwrap(), 250);
        assert_eq!(to_basis_points(dec!(25), MAX_FEE_BPS).unwrap(), 2500);
        // Floor semantics: sub-bps precision is dropped, never rounded up
        assert_eq!(to_basis_points(dec!(1.239), MAX_FEE_BPS).unwrap(), 123);
        assert_eq!(to_basis_points(dec!(24.999), MAX_FEE_BPS).unwrap(), 2499);
        // Every valid percent stays at or below the cap
        for tenths in 0i64..=250 {
            let p = Decimal::new(tenths, 1);
            assert!(to_basis_points(p, MAX_FEE_BPS).unwrap() <= MAX_FEE_BPS);
        }
    }

    #[test]
    fn basis_points_rejects_out_of_range() {
        assert!(matches!(
            to_basis_points(dec!(25.001), MAX_FEE_BPS),
            Err(DeployError::OutOfRange(_))
        ));
        // Anything in (25, 25.01) floors to exactly 2500 bps; it must still
        // be rejected on the unfloored value, not slip under the cap.
        assert!(matches!(
            to_basis_points(dec!(25.009), MAX_FEE_BPS),
            Err(DeployError::OutOfRange(_))
        ));
        assert!(matches!(
            to_basis_points(dec!(-0.1), MAX_FEE_BPS),
            Err(DeployError::OutOfRange(_))
        ));
    }

    #[test]
    fn months_use_fixed_thirty_day_convention() {
        assert_eq!(months_to_seconds(12), 31_104_000);
        assert_eq!(months_to_seconds(1), 2_592_000);
        assert_eq!(months_to_seconds(120), 311_040_000);
    }

    #[test]
    fn date_parsing() {
        // 2026-10-01T00:00:00Z
        assert_eq!(to_unix_seconds("2026-10-01").unwrap(), 1_790_812_800);
        assert_eq!(
            to_unix_seconds("2026-10-01T00:00:00Z").unwrap(),
            1_790_812_800
        );
        assert!(matches!(
            to_unix_seconds("not-a-date"),
            Err(DeployError::InvalidDate(_))
        ));
        assert!(matches!(
            to_unix_seconds("1969-06-01"),
            Err(DeployError::InvalidDate(_))
        ));
    }

    #[test]
    fn supply_scales_by_decimals() {
        let expected = U256::from(1_000_000u64) * U256::from(10).pow(U256::from(18));
        assert_eq!(encode_supply("1000000", 18).unwrap(), expected);
        assert_eq!(encode_supply("42", 0).unwrap(), U256::from(42u64));
        // Integer-valued decimals are accepted
        assert_eq!(encode_supply("1000000.00", 18).unwrap(), expected);
        assert_eq!(encode_supply("0", 18).unwrap(), U256::ZERO);
    }

    #[test]
    fn supply_rejects_fractional_and_malformed() {
        for bad in ["1.5", "-5", "", "abc", "1.2.3", "1e6"] {
            assert!(
                matches!(encode_supply(bad, 18), Err(DeployError::InvalidAmount(_))),
                "expected InvalidAmount for {:?}",
                bad
            );
        }
    }

    #[test]
    fn disabled_allocations_are_dropped_entirely() {
        let allocations = vec![
            allocation(dec!(15), true),
            allocation(dec!(99), false),
            allocation(dec!(30), true),
        ];
        let encoded = encode_vesting_schedule(&allocations).unwrap();
        assert_eq!(encoded.len(), 2);
        assert_eq!(encoded[0].percentage, U256::from(1500u64));
        assert_eq!(encoded[1].percentage, U256::from(3000u64));
        assert!(encoded.iter().all(|v| v.enabled));
    }

    #[test]
    fn vesting_encoding_fields() {
        let encoded = encode_vesting_schedule(&[allocation(dec!(15), true)]).unwrap();
        assert_eq!(encoded[0].startTime, U256::from(1_790_812_800u64));
        assert_eq!(encoded[0].duration, U256::from(31_104_000u64));
    }

    #[test]
    fn vesting_rejects_too_many_entries_and_bad_durations() {
        let eight = vec![allocation(dec!(5), false); 8];
        assert!(matches!(
            encode_vesting_schedule(&eight),
            Err(DeployError::InvalidConfig(_))
        ));

        let mut bad = allocation(dec!(5), true);
        bad.duration = 0;
        assert!(matches!(
            encode_vesting_schedule(&[bad]),
            Err(DeployError::InvalidConfig(_))
        ));

        let mut long = allocation(dec!(5), true);
        long.duration = 121;
        assert!(matches!(
            encode_vesting_schedule(&[long]),
            Err(DeployError::InvalidConfig(_))
        ));
    }

    #[test]
    fn oversubscribed_vesting_is_a_total_not_an_error() {
        let allocations = vec![
            allocation(dec!(70), true),
            allocation(dec!(50), true),
            allocation(dec!(40), false),
        ];
        assert_eq!(enabled_vesting_total(&allocations), dec!(120));
        // Still encodes: the contract is the final arbiter
        assert_eq!(encode_vesting_schedule(&allocations).unwrap().len(), 2);
    }

    #[test]
    fn validate_config_normalizes_symbol_and_defaults_max_supply() {
        let mut config = base_config();
        config.symbol = " dem ".to_string();
        let params = validate_config(&config).unwrap();
        assert_eq!(params.symbol, "DEM");
        assert_eq!(params.maxSupply, params.initialSupply);
        assert_eq!(params.buyFee, U256::ZERO);
        assert_eq!(params.feeRecipient, Address::ZERO);
    }

    #[test]
    fn symbol_length_counts_characters_not_bytes() {
        let mut config = base_config();
        config.symbol = "ÄÖÜÄÖÜÄÖÜÄ".to_string(); // 10 chars, 20 bytes
        let params = validate_config(&config).unwrap();
        assert_eq!(params.symbol.chars().count(), 10);

        config.symbol = "ÄÖÜÄÖÜÄÖÜÄÖ".to_string(); // 11 chars
        assert!(matches!(
            validate_config(&config),
            Err(DeployError::InvalidConfig(_))
        ));
    }

    #[test]
    fn validate_config_rejects_bad_inputs() {
        let mut config = base_config();
        config.symbol = "TOOLONGSYMBOL".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(DeployError::InvalidConfig(_))
        ));

        let mut config = base_config();
        config.decimals = 19;
        assert!(matches!(
            validate_config(&config),
            Err(DeployError::InvalidConfig(_))
        ));

        let mut config = base_config();
        config.initial_supply = "0".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(DeployError::InvalidAmount(_))
        ));

        let mut config = base_config();
        config.max_supply = Some("500000".to_string());
        assert!(matches!(
            validate_config(&config),
            Err(DeployError::InvalidAmount(_))
        ));
    }

    #[test]
    fn validate_config_rejects_fee_above_cap_instead_of_clamping() {
        let mut config = base_config();
        config.transfer_fees_config = Some(TransferFeeConfig {
            buy_fee: dec!(25.001),
            sell_fee: dec!(1),
            recipient_address: "0x000000000000000000000000000000000000dEaD".to_string(),
        });
        assert!(matches!(
            validate_config(&config),
            Err(DeployError::OutOfRange(_))
        ));
    }

    #[test]
    fn validate_config_encodes_fees() {
        let mut config = base_config();
        config.features.transfer_fees = true;
        config.transfer_fees_config = Some(TransferFeeConfig {
            buy_fee: dec!(2.5),
            sell_fee: dec!(1),
            recipient_address: "0x000000000000000000000000000000000000dEaD".to_string(),
        });
        let params = validate_config(&config).unwrap();
        assert_eq!(params.buyFee, U256::from(250u64));
        assert_eq!(params.sellFee, U256::from(100u64));
        assert!(params.transferFees);
        assert_ne!(params.feeRecipient, Address::ZERO);
    }
}
