use std::env;

use anyhow::Context;
use serde::Deserialize;

use crate::types::felt::Felt;

/// A contract address written inline or read from an environment variable.
///
/// ```json
/// "naming_contract": "0x6ac597f8116f886fa1c97a23fa4e08299975ecaf6b598873ca6792b9bbfb678"
/// "naming_contract": { "env": "NAMING_CONTRACT" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AddressOrEnv {
    Literal(Felt),
    Env { env: String },
}

impl AddressOrEnv {
    pub fn env_var(&self) -> Option<&str> {
        match self {
            AddressOrEnv::Env { env } => Some(env),
            AddressOrEnv::Literal(_) => None,
        }
    }

    pub fn resolve(&self) -> anyhow::Result<Felt> {
        match self {
            AddressOrEnv::Literal(felt) => Ok(*felt),
            AddressOrEnv::Env { env: name } => {
                let raw = env::var(name)
                    .with_context(|| format!("Missing env var {} for contract address", name))?;
                raw.parse()
                    .with_context(|| format!("Env var {} is not a valid felt: {}", name, raw))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfigRaw {
    pub naming_contract: AddressOrEnv,
    /// Payment token whose transfers pay for domains.
    pub eth_contract: AddressOrEnv,
    pub referral_contract: AddressOrEnv,
    pub renewal_contract: AddressOrEnv,
    pub tax_contract: AddressOrEnv,
    /// Tokens whose transfers to the tax contract are recorded.
    #[serde(default)]
    pub token_contracts: Vec<AddressOrEnv>,
}

impl ContractsConfigRaw {
    fn all(&self) -> impl Iterator<Item = &AddressOrEnv> {
        [
            &self.naming_contract,
            &self.eth_contract,
            &self.referral_contract,
            &self.renewal_contract,
            &self.tax_contract,
        ]
        .into_iter()
        .chain(self.token_contracts.iter())
    }

    /// Env vars referenced by this config that are not currently set.
    pub fn missing_env_vars(&self) -> Vec<&str> {
        self.all()
            .filter_map(AddressOrEnv::env_var)
            .filter(|name| env::var(name).is_err())
            .collect()
    }
}

/// Resolved contract addresses, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contracts {
    pub naming: Felt,
    pub eth: Felt,
    pub referral: Felt,
    pub renewal: Felt,
    pub tax: Felt,
    pub tokens: Vec<Felt>,
}

pub fn resolve_contracts(raw: &ContractsConfigRaw) -> anyhow::Result<Contracts> {
    let tokens = raw
        .token_contracts
        .iter()
        .enumerate()
        .map(|(i, token)| {
            token
                .resolve()
                .with_context(|| format!("Failed to resolve token_contracts[{}]", i))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Contracts {
        naming: raw.naming_contract.resolve().context("naming_contract")?,
        eth: raw.eth_contract.resolve().context("eth_contract")?,
        referral: raw.referral_contract.resolve().context("referral_contract")?,
        renewal: raw.renewal_contract.resolve().context("renewal_contract")?,
        tax: raw.tax_contract.resolve().context("tax_contract")?,
        tokens,
    })
}
