use std::env;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::decoding::uint256::{DEFAULT_DECIMALS, MAX_DECIMALS};
use crate::types::config::contract::{resolve_contracts, Contracts, ContractsConfigRaw};

#[derive(Debug, Deserialize)]
pub struct IndexerConfigRaw {
    pub contracts: ContractsConfigRaw,
    /// Decimals of the payment and tax tokens.
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}

#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub contracts: Contracts,
    pub decimals: u8,
}

impl IndexerConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to load config file at {}", path.display()))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let raw: IndexerConfigRaw =
            serde_json::from_str(content).context("Failed to parse config")?;
        Self::from_raw(raw)
    }

    /// Resolve every address once. A `.env` file is only consulted when a
    /// referenced variable is missing from the environment.
    pub fn from_raw(raw: IndexerConfigRaw) -> anyhow::Result<Self> {
        anyhow::ensure!(
            raw.decimals <= MAX_DECIMALS,
            "decimals must be at most {}, got {}",
            MAX_DECIMALS,
            raw.decimals
        );

        load_env_if_missing(&raw.contracts)?;

        Ok(IndexerConfig {
            contracts: resolve_contracts(&raw.contracts)?,
            decimals: raw.decimals,
        })
    }
}

fn load_env_if_missing(raw: &ContractsConfigRaw) -> anyhow::Result<()> {
    let missing = raw.missing_env_vars();
    if missing.is_empty() {
        return Ok(());
    }

    dotenvy::dotenv().with_context(|| {
        format!(
            "Missing env vars {:?} and failed to load .env file",
            missing
        )
    })?;

    let still_missing: Vec<&str> = missing
        .into_iter()
        .filter(|var| env::var(var).is_err())
        .collect();

    anyhow::ensure!(
        still_missing.is_empty(),
        "Missing required env vars after loading .env: {:?}",
        still_missing
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::felt::Felt;

    #[test]
    fn test_literal_config() {
        let config = IndexerConfig::from_json(
            r#"{
                "contracts": {
                    "naming_contract": "0x1",
                    "eth_contract": "0x2",
                    "referral_contract": "0x3",
                    "renewal_contract": "0x4",
                    "tax_contract": "0x5",
                    "token_contracts": ["0x2", "0x6"]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.decimals, 18);
        assert_eq!(config.contracts.naming, Felt::from(1u64));
        assert_eq!(config.contracts.tax, Felt::from(5u64));
        assert_eq!(
            config.contracts.tokens,
            vec![Felt::from(2u64), Felt::from(6u64)]
        );
    }

    #[test]
    fn test_env_reference() {
        env::set_var("SALES_INDEXER_TEST_NAMING_CONTRACT", "0xabc");

        let config = IndexerConfig::from_json(
            r#"{
                "contracts": {
                    "naming_contract": { "env": "SALES_INDEXER_TEST_NAMING_CONTRACT" },
                    "eth_contract": "0x2",
                    "referral_contract": "0x3",
                    "renewal_contract": "0x4",
                    "tax_contract": "0x5"
                },
                "decimals": 6
            }"#,
        )
        .unwrap();

        assert_eq!(config.contracts.naming, Felt::from(0xabcu64));
        assert_eq!(config.decimals, 6);
        assert!(config.contracts.tokens.is_empty());
    }

    #[test]
    fn test_rejects_bad_address() {
        let err = IndexerConfig::from_json(
            r#"{
                "contracts": {
                    "naming_contract": "not-a-felt",
                    "eth_contract": "0x2",
                    "referral_contract": "0x3",
                    "renewal_contract": "0x4",
                    "tax_contract": "0x5"
                }
            }"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_oversized_decimals() {
        let err = IndexerConfig::from_json(
            r#"{
                "contracts": {
                    "naming_contract": "0x1",
                    "eth_contract": "0x2",
                    "referral_contract": "0x3",
                    "renewal_contract": "0x4",
                    "tax_contract": "0x5"
                },
                "decimals": 80
            }"#,
        );
        assert!(err.is_err());
    }
}
