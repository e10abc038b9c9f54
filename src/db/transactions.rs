use chrono::{DateTime, Utc};
use common_macros::b_tree_map;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{
    collections::{btree_map::Entry, BTreeMap, BTreeSet},
    fmt::{Debug, Display, Formatter},
};

use super::Coin;

#[must_use]
pub enum InsertResult {
    Added,
    AlreadyExists,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[cfg_attr(test, derive(PartialEq, Eq))]
#[serde(transparent)]
pub struct Transactions {
    transactions: BTreeMap<TransactionId, Transaction>,
}

impl Transactions {
    pub fn new_empty() -> Self {
        Self {
            transactions: b_tree_map![],
        }
    }

    pub fn insert(&mut self, transaction: Transaction) -> InsertResult {
        match self.transactions.entry(transaction.id.clone()) {
            Entry::Occupied(_) => InsertResult::AlreadyExists,
            Entry::Vacant(entry) => {
                entry.insert(transaction);
                InsertResult::Added
            }
        }
    }

    pub fn remove(&mut self, id: &TransactionId) -> Option<Transaction> {
        self.transactions.remove(id)
    }

    pub fn get(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions.get(id)
    }

    pub fn contains(&self, id: &TransactionId) -> bool {
        self.transactions.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.values()
    }

    /// Newest first, ties broken by id so the order is stable.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &Transaction> {
        let mut transactions: Vec<&Transaction> = self.transactions.values().collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        transactions.into_iter()
    }

    /// Deleting any of these transactions no longer changes the balances of `wallet`.
    pub fn forget_wallet(&mut self, wallet: &str) {
        for transaction in self.transactions.values_mut() {
            if let Some(moved) = &mut transaction.moved_wallets {
                moved.remove(wallet);
            }
        }
    }

    /// Transactions from files that predate [Transaction::moved_wallets] are taken to have
    /// moved every wallet they name that exists now.
    pub fn backfill_moved_wallets<T>(&mut self, wallets: &BTreeMap<String, T>) {
        for transaction in self.transactions.values_mut() {
            if transaction.moved_wallets.is_none() {
                let moved = transaction
                    .kind
                    .wallet_names()
                    .into_iter()
                    .filter(|name| wallets.contains_key(*name))
                    .map(str::to_string)
                    .collect();
                transaction.moved_wallets = Some(moved);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct TransactionId(pub String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdraw,
    Transfer,
    Swap,
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdraw => "withdraw",
            TransactionType::Transfer => "transfer",
            TransactionType::Swap => "swap",
        };
        f.write_str(name)
    }
}

/// Type-specific payload. Wallet and contact references are by name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit {
        to_wallet: String,
        coin: Coin,
        amount: Decimal,
        /// Contact name or raw address the funds came from
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from_wallet: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from_address: Option<String>,
    },
    Withdraw {
        from_wallet: String,
        coin: Coin,
        amount: Decimal,
        /// Contact name or raw address the funds went to
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_wallet: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_address: Option<String>,
    },
    Transfer {
        #[serde(default)]
        from_wallet: String,
        #[serde(default)]
        to_wallet: String,
        coin: Coin,
        amount: Decimal,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from_address: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_address: Option<String>,
    },
    Swap {
        swap_wallet: String,
        sell_coin: Coin,
        sell_amount: Decimal,
        buy_coin: Coin,
        buy_amount: Decimal,
    },
}

impl TransactionKind {
    pub fn deposit(to_wallet: impl Into<String>, coin: Coin, amount: Decimal) -> Self {
        Self::Deposit {
            to_wallet: to_wallet.into(),
            coin,
            amount,
            from_wallet: None,
            from_address: None,
        }
    }

    pub fn withdraw(from_wallet: impl Into<String>, coin: Coin, amount: Decimal) -> Self {
        Self::Withdraw {
            from_wallet: from_wallet.into(),
            coin,
            amount,
            to_wallet: None,
            to_address: None,
        }
    }

    pub fn transfer(
        from_wallet: impl Into<String>,
        to_wallet: impl Into<String>,
        coin: Coin,
        amount: Decimal,
    ) -> Self {
        Self::Transfer {
            from_wallet: from_wallet.into(),
            to_wallet: to_wallet.into(),
            coin,
            amount,
            from_address: None,
            to_address: None,
        }
    }

    pub fn swap(
        swap_wallet: impl Into<String>,
        sell_coin: Coin,
        sell_amount: Decimal,
        buy_coin: Coin,
        buy_amount: Decimal,
    ) -> Self {
        Self::Swap {
            swap_wallet: swap_wallet.into(),
            sell_coin,
            sell_amount,
            buy_coin,
            buy_amount,
        }
    }

    pub fn tx_type(&self) -> TransactionType {
        match self {
            Self::Deposit { .. } => TransactionType::Deposit,
            Self::Withdraw { .. } => TransactionType::Withdraw,
            Self::Transfer { .. } => TransactionType::Transfer,
            Self::Swap { .. } => TransactionType::Swap,
        }
    }

    /// The coin a fee defaults to: the moved coin, or the sold coin for swaps.
    pub fn primary_coin(&self) -> &Coin {
        match self {
            Self::Deposit { coin, .. }
            | Self::Withdraw { coin, .. }
            | Self::Transfer { coin, .. } => coin,
            Self::Swap { sell_coin, .. } => sell_coin,
        }
    }

    /// Every name on a side that can be a wallet
    pub fn wallet_names(&self) -> Vec<&str> {
        match self {
            Self::Deposit { to_wallet, .. } => vec![to_wallet.as_str()],
            Self::Withdraw { from_wallet, .. } => vec![from_wallet.as_str()],
            Self::Transfer {
                from_wallet,
                to_wallet,
                ..
            } => vec![from_wallet.as_str(), to_wallet.as_str()],
            Self::Swap { swap_wallet, .. } => vec![swap_wallet.as_str()],
        }
    }

    /// Whether this transaction names `wallet` on either side.
    pub fn touches(&self, wallet: &str) -> bool {
        match self {
            Self::Deposit { to_wallet, .. } => to_wallet == wallet,
            Self::Withdraw { from_wallet, .. } => from_wallet == wallet,
            Self::Transfer {
                from_wallet,
                to_wallet,
                ..
            } => from_wallet == wallet || to_wallet == wallet,
            Self::Swap { swap_wallet, .. } => swap_wallet == wallet,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(flatten)]
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_coin: Option<Coin>,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Wallets whose balances were changed when the transaction was recorded. Deleting
    /// the transaction undoes the change on these wallets only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moved_wallets: Option<BTreeSet<String>>,
}

impl Transaction {
    pub fn new(id: TransactionId, kind: TransactionKind, date: DateTime<Utc>) -> Self {
        Self {
            id,
            kind,
            fee: None,
            fee_coin: None,
            date,
            note: None,
            moved_wallets: None,
        }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note.filter(|n| !n.is_empty());
        self
    }

    /// A fee without an explicit coin is charged in the transaction's primary coin.
    pub fn with_fee(mut self, amount: Decimal, coin: Option<Coin>) -> Self {
        let coin = coin
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.kind.primary_coin().clone());
        self.fee = Some(amount);
        self.fee_coin = Some(coin);
        self
    }

    pub fn tx_type(&self) -> TransactionType {
        self.kind.tx_type()
    }

    /// Whether recording this transaction changed the balances of `wallet`
    pub fn moved(&self, wallet: &str) -> bool {
        self.moved_wallets
            .as_ref()
            .map_or(true, |moved| moved.contains(wallet))
    }
}
