use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};

use crate::db::{Coin, Transaction, TransactionKind, TransactionType, Wallet};

const EXTERNAL: &str = "External";

/// One end of a flow edge
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlowNode {
    /// A wallet that currently exists in the ledger
    Wallet(String),
    /// A contact, a raw address, or a wallet that has since been deleted
    Counterparty(String),
    /// Funds entering or leaving the ledger without a named counterparty
    External,
}

impl FlowNode {
    fn named(name: &str, wallets: &BTreeMap<String, Wallet>) -> Self {
        if wallets.contains_key(name) {
            Self::Wallet(name.to_string())
        } else {
            Self::Counterparty(name.to_string())
        }
    }

    /// Node for one side of a transfer: the stored name, else the shortened address.
    fn transfer_side(
        name: &str,
        address: Option<&str>,
        wallets: &BTreeMap<String, Wallet>,
    ) -> Self {
        if !name.is_empty() {
            return Self::named(name, wallets);
        }
        match address {
            Some(address) if !address.is_empty() => {
                Self::Counterparty(truncate_address(address))
            }
            _ => Self::External,
        }
    }

    pub fn is_wallet(&self) -> bool {
        matches!(self, Self::Wallet(_))
    }
}

impl Display for FlowNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wallet(name) | Self::Counterparty(name) => f.write_str(name),
            Self::External => f.write_str(EXTERNAL),
        }
    }
}

/// `7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU` -> `7xKXtg...gAsU`
pub fn truncate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// All non-swap transactions between the same two nodes in the same coin and of the same
/// type, merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEdge {
    pub from: FlowNode,
    pub to: FlowNode,
    pub coin: Coin,
    pub tx_type: TransactionType,
    pub amount: Decimal,
    pub count: usize,
    /// Sorted ascending
    pub dates: Vec<DateTime<Utc>>,
}

impl FlowEdge {
    pub fn first_date(&self) -> Option<DateTime<Utc>> {
        self.dates.first().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapLeg {
    pub sell_amount: Decimal,
    pub buy_amount: Decimal,
    pub date: DateTime<Utc>,
}

/// Swaps in one wallet from one coin into another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapGroup {
    pub wallet: String,
    pub sell_coin: Coin,
    pub buy_coin: Coin,
    pub swaps: Vec<SwapLeg>,
}

impl SwapGroup {
    /// Summed `(sell, buy)` amounts, only shown for groups of two or more swaps
    pub fn totals(&self) -> Option<(Decimal, Decimal)> {
        if self.swaps.len() < 2 {
            return None;
        }
        Some(self.swaps.iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(sell, buy), swap| {
                (
                    sell.saturating_add(swap.sell_amount),
                    buy.saturating_add(swap.buy_amount),
                )
            },
        ))
    }

    pub fn dates(&self) -> Vec<DateTime<Utc>> {
        self.swaps.iter().map(|swap| swap.date).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowGraph {
    /// Sorted by earliest contributing date
    pub edges: Vec<FlowEdge>,
    /// Sorted by earliest swap
    pub swaps: Vec<SwapGroup>,
}

impl FlowGraph {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.swaps.is_empty()
    }

    /// Edges grouped by their source node, sources in order of their first edge
    pub fn by_source(&self) -> Vec<(&FlowNode, Vec<&FlowEdge>)> {
        let mut groups: Vec<(&FlowNode, Vec<&FlowEdge>)> = Vec::new();
        for edge in &self.edges {
            match groups.iter_mut().find(|(source, _)| *source == &edge.from) {
                Some((_, edges)) => edges.push(edge),
                None => groups.push((&edge.from, vec![edge])),
            }
        }
        groups
    }
}

/// Build the flow graph for a set of transactions, usually one month's worth.
///
/// `wallets` decides which names render as wallets; everything else is a counterparty.
pub fn build_flow_graph<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    wallets: &BTreeMap<String, Wallet>,
) -> FlowGraph {
    let mut edges: Vec<FlowEdge> = Vec::new();
    let mut edge_index: HashMap<(FlowNode, FlowNode, Coin, TransactionType), usize> =
        HashMap::new();
    let mut swaps: Vec<SwapGroup> = Vec::new();

    for transaction in transactions {
        let (from, to, coin, amount) = match &transaction.kind {
            TransactionKind::Deposit {
                to_wallet,
                coin,
                amount,
                ..
            } => (
                FlowNode::External,
                FlowNode::named(to_wallet, wallets),
                coin,
                *amount,
            ),
            TransactionKind::Withdraw {
                from_wallet,
                coin,
                amount,
                ..
            } => (
                FlowNode::named(from_wallet, wallets),
                FlowNode::External,
                coin,
                *amount,
            ),
            TransactionKind::Transfer {
                from_wallet,
                to_wallet,
                coin,
                amount,
                from_address,
                to_address,
            } => (
                FlowNode::transfer_side(from_wallet, from_address.as_deref(), wallets),
                FlowNode::transfer_side(to_wallet, to_address.as_deref(), wallets),
                coin,
                *amount,
            ),
            TransactionKind::Swap {
                swap_wallet,
                sell_coin,
                sell_amount,
                buy_coin,
                buy_amount,
            } => {
                let leg = SwapLeg {
                    sell_amount: *sell_amount,
                    buy_amount: *buy_amount,
                    date: transaction.date,
                };
                match swaps.iter_mut().find(|group| {
                    &group.wallet == swap_wallet
                        && &group.sell_coin == sell_coin
                        && &group.buy_coin == buy_coin
                }) {
                    Some(group) => group.swaps.push(leg),
                    None => swaps.push(SwapGroup {
                        wallet: swap_wallet.clone(),
                        sell_coin: sell_coin.clone(),
                        buy_coin: buy_coin.clone(),
                        swaps: vec![leg],
                    }),
                }
                continue;
            }
        };

        let key = (from, to, coin.clone(), transaction.tx_type());
        match edge_index.get(&key) {
            Some(&index) => {
                let edge = &mut edges[index];
                edge.amount = edge.amount.saturating_add(amount);
                edge.count += 1;
                edge.dates.push(transaction.date);
            }
            None => {
                let (from, to, coin, tx_type) = key.clone();
                edge_index.insert(key, edges.len());
                edges.push(FlowEdge {
                    from,
                    to,
                    coin,
                    tx_type,
                    amount,
                    count: 1,
                    dates: vec![transaction.date],
                });
            }
        }
    }

    for edge in &mut edges {
        edge.dates.sort();
    }
    edges.sort_by_key(|edge| edge.first_date());
    for group in &mut swaps {
        group.swaps.sort_by_key(|swap| swap.date);
    }
    swaps.sort_by_key(|group| group.swaps.first().map(|swap| swap.date));

    FlowGraph { edges, swaps }
}

/// `Jan 02` for a single day, `Jan 02 - Jan 31` for a range. Days are taken in `tz`.
pub fn date_range_label<Tz: TimeZone>(dates: &[DateTime<Utc>], tz: &Tz) -> String {
    let format = |date: &DateTime<Utc>| {
        date.with_timezone(tz)
            .naive_local()
            .format("%b %d")
            .to_string()
    };
    let (Some(first), Some(last)) = (dates.iter().min(), dates.iter().max()) else {
        return String::new();
    };
    let (first, last) = (format(first), format(last));
    if first == last {
        first
    } else {
        format!("{first} - {last}")
    }
}
