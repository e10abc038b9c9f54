use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Coin;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub coin: Coin,
    pub amount: Decimal,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Wallet {
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub chain: String,
    #[serde(rename = "type")]
    pub wallet_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub balances: Vec<Balance>,
}

impl Wallet {
    pub fn new(
        name: String,
        address: String,
        chain: String,
        wallet_type: String,
        category: Option<String>,
        note: Option<String>,
    ) -> Self {
        Self {
            name,
            address,
            category: category.filter(|c| !c.is_empty()),
            chain,
            wallet_type,
            note: note.filter(|n| !n.is_empty()),
            balances: vec![],
        }
    }

    pub fn balance(&self, coin: &Coin) -> Option<Decimal> {
        self.balances
            .iter()
            .find(|balance| &balance.coin == coin)
            .map(|balance| balance.amount)
    }

    /// Overwrite the balance of `coin`, creating the entry if needed.
    pub fn set_balance(&mut self, coin: Coin, amount: Decimal) {
        match self.balances.iter_mut().find(|balance| balance.coin == coin) {
            Some(balance) => balance.amount = amount,
            None => self.balances.push(Balance { coin, amount }),
        }
    }

    /// Fold entries that name the same coin into the first of them. Files written before
    /// coins were stored uppercase can hold e.g. both `sol` and `SOL`.
    pub fn merge_duplicate_balances(&mut self) {
        let mut merged: Vec<Balance> = Vec::with_capacity(self.balances.len());
        for balance in self.balances.drain(..) {
            match merged.iter_mut().find(|entry| entry.coin == balance.coin) {
                Some(entry) => {
                    log::warn!(
                        "Merging duplicate {} balance of wallet {}",
                        balance.coin,
                        self.name
                    );
                    entry.amount = entry.amount.saturating_add(balance.amount);
                }
                None => merged.push(balance),
            }
        }
        self.balances = merged;
    }

    /// `chain-type`, e.g. `solana-hot`
    pub fn chain_type(&self) -> String {
        format!("{}-{}", self.chain, self.wallet_type)
    }
}
