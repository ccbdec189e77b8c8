use std::fmt;

use serde::{Deserialize, Serialize};

/// Token pair identified by two contract addresses.
///
/// Rendered as `"<token0>-<token1>"`, the tag format the simulation backend
/// keys its orderbooks by. Addresses are normalised to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairTag {
    pub token0: String,
    pub token1: String,
}

impl PairTag {
    pub fn new(token0: impl AsRef<str>, token1: impl AsRef<str>) -> Self {
        Self {
            token0: token0.as_ref().trim().to_ascii_lowercase(),
            token1: token1.as_ref().trim().to_ascii_lowercase(),
        }
    }

    pub fn is_valid(&self) -> bool {
        is_valid_address(&self.token0) && is_valid_address(&self.token1) && self.token0 != self.token1
    }
}

impl fmt::Display for PairTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.token0, self.token1)
    }
}

/// `0x` followed by exactly 40 hex digits.
pub fn is_valid_address(addr: &str) -> bool {
    let Some(hex) = addr.strip_prefix("0x").or_else(|| addr.strip_prefix("0X")) else {
        return false;
    };
    hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit())
}
