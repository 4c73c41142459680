//! Currency codes and pairs

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// The fixed set of currencies the converter offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    Usd,
    Eur,
    Gbp,
    Jpy,
    Ksh,
    Cad,
    Aud,
    Chf,
    Cny,
    Inr,
}

impl CurrencyCode {
    /// Every supported code, in presentation order.
    pub const ALL: [CurrencyCode; 10] = [
        CurrencyCode::Usd,
        CurrencyCode::Eur,
        CurrencyCode::Gbp,
        CurrencyCode::Jpy,
        CurrencyCode::Ksh,
        CurrencyCode::Cad,
        CurrencyCode::Aud,
        CurrencyCode::Chf,
        CurrencyCode::Cny,
        CurrencyCode::Inr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyCode::Usd => "USD",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Gbp => "GBP",
            CurrencyCode::Jpy => "JPY",
            CurrencyCode::Ksh => "KSH",
            CurrencyCode::Cad => "CAD",
            CurrencyCode::Aud => "AUD",
            CurrencyCode::Chf => "CHF",
            CurrencyCode::Cny => "CNY",
            CurrencyCode::Inr => "INR",
        }
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        CurrencyCode::ALL
            .into_iter()
            .find(|c| c.as_str() == code)
            .ok_or_else(|| anyhow!("Unsupported currency: {}", s.trim()))
    }
}

/// A source/target selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub source: CurrencyCode,
    pub target: CurrencyCode,
}

impl CurrencyPair {
    pub fn new(source: CurrencyCode, target: CurrencyCode) -> Self {
        Self { source, target }
    }

    pub fn swapped(&self) -> Self {
        Self {
            source: self.target,
            target: self.source,
        }
    }
}

impl Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.source, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("ksh".parse::<CurrencyCode>().unwrap(), CurrencyCode::Ksh);
        assert_eq!(" Usd ".parse::<CurrencyCode>().unwrap(), CurrencyCode::Usd);
    }

    #[test]
    fn test_parse_rejects_unknown_codes() {
        let err = "XYZ".parse::<CurrencyCode>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported currency: XYZ");
        assert!("".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for code in CurrencyCode::ALL {
            assert_eq!(code.to_string().parse::<CurrencyCode>().unwrap(), code);
        }
    }

    #[test]
    fn test_serde_uses_uppercase_codes() {
        let yaml = serde_yaml::to_string(&CurrencyCode::Ksh).unwrap();
        assert_eq!(yaml.trim(), "KSH");
        let code: CurrencyCode = serde_yaml::from_str("EUR").unwrap();
        assert_eq!(code, CurrencyCode::Eur);
    }

    #[test]
    fn test_swap_is_its_own_inverse() {
        for source in CurrencyCode::ALL {
            for target in CurrencyCode::ALL {
                let pair = CurrencyPair::new(source, target);
                assert_eq!(pair.swapped().swapped(), pair);
            }
        }
    }
}
