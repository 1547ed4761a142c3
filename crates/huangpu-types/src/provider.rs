//! Provider identifiers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An independent upstream source of bar and corporate-action data.
///
/// Providers are a closed enumeration selected at construction time; there
/// is one concrete source/repository implementation per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Eastmoney daily history endpoint.
    Eastmoney,
    /// Baostock k-data endpoint.
    Baostock,
}

impl Provider {
    /// Returns the provider as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eastmoney => "eastmoney",
            Self::Baostock => "baostock",
        }
    }

    /// Returns all known providers.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Eastmoney, Self::Baostock]
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = ProviderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "eastmoney" | "em" => Ok(Self::Eastmoney),
            "baostock" | "bs" => Ok(Self::Baostock),
            _ => Err(ProviderParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown provider identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown provider: {0}")]
pub struct ProviderParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_round_trip() {
        for provider in Provider::all() {
            let parsed: Provider = provider.as_str().parse().unwrap();
            assert_eq!(parsed, *provider);
        }
    }

    #[test]
    fn test_provider_aliases() {
        assert_eq!("em".parse::<Provider>().unwrap(), Provider::Eastmoney);
        assert_eq!("BS".parse::<Provider>().unwrap(), Provider::Baostock);
    }

    #[test]
    fn test_unknown_provider() {
        assert!("akshare2".parse::<Provider>().is_err());
    }
}
