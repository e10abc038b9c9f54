use common_macros::b_tree_map;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Category, Contact, PriceTable, Transactions, Wallet};

/// Everything that lives in the ledger file. Persisted as a whole after every mutation.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Ledger {
    #[serde(default)]
    pub wallets: BTreeMap<String, Wallet>,
    #[serde(default)]
    pub categories: BTreeMap<String, Category>,
    #[serde(default)]
    pub contacts: BTreeMap<String, Contact>,
    #[serde(default)]
    pub transactions: Transactions,
    #[serde(default)]
    pub prices: PriceTable,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            wallets: b_tree_map![],
            categories: b_tree_map![],
            contacts: b_tree_map![],
            transactions: Transactions::new_empty(),
            prices: PriceTable::default(),
        }
    }

    /// Bring a freshly loaded ledger in line with what the store relies on: one balance
    /// entry per coin, lowercase price keys, and a list of moved wallets on every
    /// transaction.
    pub fn repair(&mut self) {
        for wallet in self.wallets.values_mut() {
            wallet.merge_duplicate_balances();
        }
        self.prices.normalize_keys();
        self.transactions.backfill_moved_wallets(&self.wallets);
    }
}
