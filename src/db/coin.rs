use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// A coin symbol in canonical (uppercase) form.
///
/// Every place a symbol enters the ledger goes through [Coin::new], so balance entries,
/// price lookups and flow edges all agree on one spelling of e.g. `SOL`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(from = "String", into = "String")]
pub struct Coin(String);

impl Coin {
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Self(symbol.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key used in the price table
    pub fn price_key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl From<String> for Coin {
    fn from(symbol: String) -> Self {
        Self::new(symbol)
    }
}

impl From<&str> for Coin {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

impl From<Coin> for String {
    fn from(coin: Coin) -> Self {
        coin.0
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Debug for Coin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Coin({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("sol", "SOL")]
    #[case("Sol", "SOL")]
    #[case(" usdc ", "USDC")]
    #[case("BTC", "BTC")]
    fn normalizes_to_uppercase(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(expected, Coin::new(input).as_str());
    }

    #[test]
    fn price_key_is_lowercase() {
        assert_eq!("eth", Coin::new("ETH").price_key());
    }

    #[test]
    fn deserializing_normalizes() {
        let coin: Coin = serde_json::from_str("\"eth\"").unwrap();
        assert_eq!(Coin::new("ETH"), coin);
        assert_eq!("\"ETH\"", serde_json::to_string(&coin).unwrap());
    }
}
