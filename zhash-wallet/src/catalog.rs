//! Token catalog
//!
//! The fixed set of assets the dashboard supports, with their seed balances
//! and reference prices.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Supported token symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenSymbol {
    Eth,
    Usdt,
    Usdc,
}

impl TokenSymbol {
    /// All symbols in catalog order
    pub const ALL: [TokenSymbol; 3] = [TokenSymbol::Eth, TokenSymbol::Usdt, TokenSymbol::Usdc];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenSymbol::Eth => "ETH",
            TokenSymbol::Usdt => "USDT",
            TokenSymbol::Usdc => "USDC",
        }
    }
}

impl fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TokenSymbol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "ETH" => Ok(TokenSymbol::Eth),
            "USDT" => Ok(TokenSymbol::Usdt),
            "USDC" => Ok(TokenSymbol::Usdc),
            other => Err(Error::Unknown(format!("Unsupported token: {}", other))),
        }
    }
}

/// A catalog entry together with the balances of one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Token symbol
    pub symbol: TokenSymbol,
    /// Display name
    pub name: String,
    /// Logo URI, resolved by the rendering layer
    pub logo_ref: String,
    /// Publicly visible balance
    pub public_balance: Decimal,
    /// Balance held in the shielded pool
    pub shielded_balance: Decimal,
    /// Reference price in USD
    pub unit_price: Decimal,
}

/// The supported tokens with their seed balances
pub fn supported_tokens() -> Vec<Token> {
    vec![
        Token {
            symbol: TokenSymbol::Eth,
            name: "Ethereum".to_string(),
            logo_ref: "https://cryptologos.cc/logos/ethereum-eth-logo.png".to_string(),
            public_balance: Decimal::new(124, 2),
            shielded_balance: Decimal::new(50, 2),
            unit_price: Decimal::new(245025, 2),
        },
        Token {
            symbol: TokenSymbol::Usdt,
            name: "Tether USD".to_string(),
            logo_ref: "https://cryptologos.cc/logos/tether-usdt-logo.png".to_string(),
            public_balance: Decimal::new(52000, 2),
            shielded_balance: Decimal::new(10000, 2),
            unit_price: Decimal::new(100, 2),
        },
        Token {
            symbol: TokenSymbol::Usdc,
            name: "USD Coin".to_string(),
            logo_ref: "https://cryptologos.cc/logos/usd-coin-usdc-logo.png".to_string(),
            public_balance: Decimal::new(1250, 2),
            shielded_balance: Decimal::new(250000, 2),
            unit_price: Decimal::new(100, 2),
        },
    ]
}

/// Look up a single catalog entry
pub fn find_token(symbol: TokenSymbol) -> Token {
    let mut tokens = supported_tokens();
    let index = TokenSymbol::ALL
        .iter()
        .position(|s| *s == symbol)
        .unwrap_or_default();
    tokens.swap_remove(index)
}
