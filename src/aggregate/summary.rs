use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::db::{is_stablecoin, Coin, PriceTable, Wallet};

/// Bucket for wallets without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Sum of every wallet's balance per coin. Sums saturate at the [Decimal] bounds.
pub fn total_by_coin<'a>(wallets: impl IntoIterator<Item = &'a Wallet>) -> BTreeMap<Coin, Decimal> {
    let mut totals: BTreeMap<Coin, Decimal> = BTreeMap::new();
    for wallet in wallets {
        for balance in &wallet.balances {
            let total = totals.entry(balance.coin.clone()).or_default();
            *total = total.saturating_add(balance.amount);
        }
    }
    totals
}

/// Per category, the sum of its wallets' balances per coin
pub fn balance_by_category<'a>(
    wallets: impl IntoIterator<Item = &'a Wallet>,
) -> BTreeMap<String, BTreeMap<Coin, Decimal>> {
    let mut result: BTreeMap<String, BTreeMap<Coin, Decimal>> = BTreeMap::new();
    for wallet in wallets {
        let category = wallet.category.as_deref().unwrap_or(UNCATEGORIZED);
        let coins = result.entry(category.to_string()).or_default();
        for balance in &wallet.balances {
            let total = coins.entry(balance.coin.clone()).or_default();
            *total = total.saturating_add(balance.amount);
        }
    }
    result
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetWorth {
    pub stables: Decimal,
    pub non_stables: Decimal,
}

impl NetWorth {
    pub fn total(&self) -> Decimal {
        self.stables.saturating_add(self.non_stables)
    }
}

/// USD value of the coin totals. Coins without a price don't count, and neither do
/// values too large to compute.
pub fn net_worth(totals: &BTreeMap<Coin, Decimal>, prices: &PriceTable) -> NetWorth {
    let mut net_worth = NetWorth::default();
    for (coin, amount) in totals {
        let Some(value) = prices.value_of(coin, *amount) else {
            continue;
        };
        if is_stablecoin(coin) {
            net_worth.stables = net_worth.stables.saturating_add(value);
        } else {
            net_worth.non_stables = net_worth.non_stables.saturating_add(value);
        }
    }
    net_worth
}
