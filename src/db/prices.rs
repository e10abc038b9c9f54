use common_macros::b_tree_map;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Coin;

/// Coins counted as "stables" in the net worth breakdown
const STABLECOINS: &[&str] = &["usdt", "usdc", "dai", "busd", "tusd", "frax", "lusd", "susd"];

/// Manually maintained USD prices, keyed by lowercase coin symbol.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct PriceTable {
    prices: BTreeMap<String, Decimal>,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            prices: b_tree_map![
                "usdc".to_string() => Decimal::new(10, 1),
                "usdt".to_string() => Decimal::new(10, 1),
            ],
        }
    }
}

impl PriceTable {
    pub fn new_empty() -> Self {
        Self {
            prices: b_tree_map![],
        }
    }

    /// Upsert. The price is not validated, negative prices are stored as given.
    pub fn set(&mut self, coin: &Coin, price: Decimal) {
        self.prices.insert(coin.price_key(), price);
    }

    pub fn get(&self, coin: &Coin) -> Option<Decimal> {
        self.prices.get(&coin.price_key()).copied()
    }

    /// USD value of `amount` of `coin`. None if the coin has no price or the value doesn't
    /// fit into a [Decimal].
    pub fn value_of(&self, coin: &Coin, amount: Decimal) -> Option<Decimal> {
        self.get(coin)?.checked_mul(amount)
    }

    /// Lowercase every key, for files written by tools that didn't. On a clash the
    /// lowercase entry wins.
    pub fn normalize_keys(&mut self) {
        let mixed: Vec<String> = self
            .prices
            .keys()
            .filter(|key| key.chars().any(char::is_uppercase))
            .cloned()
            .collect();
        for key in mixed {
            if let Some(price) = self.prices.remove(&key) {
                self.prices.entry(key.to_lowercase()).or_insert(price);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.prices.iter().map(|(coin, price)| (coin.as_str(), *price))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

pub fn is_stablecoin(coin: &Coin) -> bool {
    STABLECOINS.contains(&coin.price_key().as_str())
}

/// `$12.34`, `$5.67K`, `$8.90M`
pub fn format_usd(value: Decimal) -> String {
    let thousand = Decimal::ONE_THOUSAND;
    let million = thousand * thousand;
    if value >= million {
        format!("${:.2}M", (value / million).round_dp(2))
    } else if value >= thousand {
        format!("${:.2}K", (value / thousand).round_dp(2))
    } else {
        format!("${:.2}", value.round_dp(2))
    }
}
