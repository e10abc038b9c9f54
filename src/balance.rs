//! Balance projection: which wallet balances a transaction moves, and by how much.
//!
//! Recording a transaction applies [deltas] forward, deleting it applies the same deltas
//! with the sign flipped. Both directions go through [apply_delta].

use rust_decimal::Decimal;

use crate::db::{Balance, Coin, TransactionKind, Wallet};
use crate::error::{LedgerError, Result};

/// A signed change to one coin balance of one wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceDelta<'a> {
    pub wallet: &'a str,
    pub coin: &'a Coin,
    pub delta: Decimal,
}

impl BalanceDelta<'_> {
    pub fn reversed(self) -> Self {
        Self {
            delta: -self.delta,
            ..self
        }
    }
}

/// Deltas of a transaction in forward direction.
///
/// Transfers yield a delta for both sides; it's up to the caller to drop sides that don't
/// name a wallet (e.g. a contact).
pub fn deltas(kind: &TransactionKind) -> Vec<BalanceDelta<'_>> {
    match kind {
        TransactionKind::Deposit {
            to_wallet,
            coin,
            amount,
            ..
        } => vec![BalanceDelta {
            wallet: to_wallet,
            coin,
            delta: *amount,
        }],
        TransactionKind::Withdraw {
            from_wallet,
            coin,
            amount,
            ..
        } => vec![BalanceDelta {
            wallet: from_wallet,
            coin,
            delta: -*amount,
        }],
        TransactionKind::Transfer {
            from_wallet,
            to_wallet,
            coin,
            amount,
            ..
        } => vec![
            BalanceDelta {
                wallet: from_wallet,
                coin,
                delta: -*amount,
            },
            BalanceDelta {
                wallet: to_wallet,
                coin,
                delta: *amount,
            },
        ],
        TransactionKind::Swap {
            swap_wallet,
            sell_coin,
            sell_amount,
            buy_coin,
            buy_amount,
        } => vec![
            BalanceDelta {
                wallet: swap_wallet,
                coin: sell_coin,
                delta: -*sell_amount,
            },
            BalanceDelta {
                wallet: swap_wallet,
                coin: buy_coin,
                delta: *buy_amount,
            },
        ],
    }
}

/// Add `delta` to the wallet's `coin` entry, creating the entry if there is none.
///
/// Entries are never removed, a balance may sit at zero or go negative. Fails without
/// changing the wallet if the new balance doesn't fit into a [Decimal].
pub fn apply_delta(wallet: &mut Wallet, coin: &Coin, delta: Decimal) -> Result<()> {
    match wallet
        .balances
        .iter_mut()
        .find(|balance| &balance.coin == coin)
    {
        Some(balance) => {
            balance.amount = balance.amount.checked_add(delta).ok_or_else(|| {
                LedgerError::Validation(format!(
                    "{coin} balance of wallet '{}' would overflow",
                    wallet.name
                ))
            })?;
        }
        None => wallet.balances.push(Balance {
            coin: coin.clone(),
            amount: delta,
        }),
    }
    Ok(())
}
