//! Runtime policy configuration.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use till::{cod::CodPolicy, money::Amount, shipping::ShippingTable};

/// Errors that can occur while loading policies.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The policy file could not be read.
    #[error("could not read policy file {path}")]
    Read {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },

    /// The policy file is not valid YAML for [`Policies`].
    #[error(transparent)]
    Parse(#[from] serde_norway::Error),

    /// Command-line arguments did not parse.
    #[error(transparent)]
    Args(#[from] clap::Error),
}

/// Storefront policies: gateway currency, shipping rates, and
/// cash-on-delivery limits.
///
/// Policies only affect orders placed after a change; stored orders carry
/// their own frozen totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policies {
    /// ISO currency code sent to the payment gateway.
    pub currency: String,
    /// Per-state shipping surcharges.
    pub shipping: ShippingTable,
    /// Cash-on-delivery eligibility rules.
    pub cod: CodPolicy,
}

impl Default for Policies {
    fn default() -> Self {
        Self {
            currency: "INR".to_owned(),
            shipping: ShippingTable::default(),
            cod: CodPolicy::default(),
        }
    }
}

/// Overrides applied on top of the built-ins and the optional policy file.
#[derive(Debug, Parser)]
#[command(name = "till", about = "Storefront order services", long_about = None)]
pub struct PolicyArgs {
    /// Path to a YAML policy file
    #[arg(long, env = "TILL_POLICY_FILE")]
    pub policy_file: Option<PathBuf>,

    /// Cash-on-delivery ceiling, in whole currency units
    #[arg(long, env = "TILL_COD_CEILING")]
    pub cod_ceiling: Option<u64>,

    /// Shipping rate for states without a configured one
    #[arg(long, env = "TILL_DEFAULT_SHIPPING")]
    pub default_shipping: Option<u64>,

    /// ISO currency code for gateway charges
    #[arg(long, env = "TILL_CURRENCY")]
    pub currency: Option<String>,
}

impl Policies {
    /// Load policies from the environment and CLI arguments.
    ///
    /// Resolution order: built-in defaults, then the policy file (if given),
    /// then individual flag/env overrides.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when arguments do not parse or the policy
    /// file cannot be read or decoded.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::from_args(&PolicyArgs::try_parse()?)
    }

    /// Resolve policies from already-parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the policy file cannot be read or
    /// decoded.
    pub fn from_args(args: &PolicyArgs) -> Result<Self, ConfigError> {
        let mut policies = match &args.policy_file {
            Some(path) => {
                let text =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                        path: path.clone(),
                        source,
                    })?;
                Self::from_yaml(&text)?
            }
            None => Self::default(),
        };

        if let Some(ceiling) = args.cod_ceiling {
            policies.cod.ceiling = Amount::new(ceiling);
        }

        if let Some(rate) = args.default_shipping {
            policies.shipping.set_default_rate(Amount::new(rate));
        }

        if let Some(currency) = &args.currency {
            policies.currency.clone_from(currency);
        }

        Ok(policies)
    }

    /// Parse policies from YAML text.
    ///
    /// Missing keys keep their built-in values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for YAML that does not match
    /// [`Policies`].
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_norway::from_str(text)?)
    }
}
