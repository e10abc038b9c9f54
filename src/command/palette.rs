use chrono::Utc;
use rust_decimal::Decimal;

use crate::db::{Category, Contact, Transaction, TransactionId, TransactionKind, Wallet};
use crate::error::Result;
use crate::store::{LedgerStore, Persist};

use super::history::History;
use super::parser::{self, Command, DeleteTarget};

pub const HELP: &str = "Commands:

  add wallet NAME ADDR CHAIN-TYPE (CAT) (NOTE)
  add category NAME (COLOR)
  add contact NAME ADDR (CHAIN) (NOTE)

  del wallet|category|contact|tx NAME|ID

  deposit WALLET AMOUNT COIN (NOTE)
  withdraw WALLET AMOUNT COIN (NOTE)
  transfer FROM TO AMOUNT COIN (NOTE)
  swap WALLET SELL_AMT SELL_COIN BUY_AMT BUY_COIN (NOTE)

  balance WALLET AMOUNT COIN
  price COIN USD_PRICE

  q quit

Shortcuts: a=add d=del dep=deposit wd=withdraw
           tf=transfer sw=swap b=balance p=price";

/// Outcome of one palette line. Errors never escape the palette, they end up in `message`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub message: String,
    /// Multi-line help text to show instead of a status message
    pub help: Option<String>,
    pub quit: bool,
}

impl CommandResult {
    fn ok(message: String) -> Self {
        Self {
            success: true,
            message,
            ..Self::default()
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            message,
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct CommandPalette {
    history: History,
}

impl CommandPalette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Previous history entry, for the up key
    pub fn previous(&mut self) -> &str {
        self.history.previous()
    }

    /// Next history entry, for the down key
    pub fn next(&mut self) -> &str {
        self.history.next()
    }

    /// Parse and run one line against the store.
    pub fn execute<P: Persist>(&mut self, store: &mut LedgerStore<P>, line: &str) -> CommandResult {
        let line = line.trim();
        if line.is_empty() {
            return CommandResult::failed(String::new());
        }
        self.history.push(line);

        let command = match parser::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return CommandResult::failed(String::new()),
            Err(err) => return CommandResult::failed(err.to_string()),
        };
        log::debug!("Executing {command:?}");
        match command {
            Command::Quit => CommandResult {
                success: true,
                quit: true,
                ..CommandResult::default()
            },
            Command::Help => CommandResult {
                success: true,
                help: Some(HELP.to_string()),
                ..CommandResult::default()
            },
            command => match run(store, command) {
                Ok(message) => CommandResult::ok(message),
                Err(err) => CommandResult::failed(format!("Error: {err}")),
            },
        }
    }
}

fn run<P: Persist>(store: &mut LedgerStore<P>, command: Command) -> Result<String> {
    match command {
        Command::AddWallet {
            name,
            address,
            chain,
            wallet_type,
            category,
            note,
        } => {
            let message = format!("Added wallet: {name} ({chain}-{wallet_type})");
            store.add_wallet(Wallet::new(
                name,
                address,
                chain,
                wallet_type,
                category,
                note,
            ))?;
            Ok(message)
        }
        Command::AddCategory { name, color } => {
            let category = match color {
                Some(color) => Category::new(name, color),
                None => Category::with_random_color(name),
            };
            let message = format!("Added category: {} ({})", category.name, category.color);
            store.add_category(category)?;
            Ok(message)
        }
        Command::AddContact {
            name,
            address,
            chain,
            note,
        } => {
            let message = format!("Added contact: {name}");
            store.add_contact(Contact::new(name, address, chain, note))?;
            Ok(message)
        }
        Command::Delete { target, key } => match target {
            DeleteTarget::Wallet => {
                store.delete_wallet(&key)?;
                Ok(format!("Deleted wallet: {key}"))
            }
            DeleteTarget::Category => {
                let cleared = store.delete_category(&key)?;
                if cleared > 0 {
                    Ok(format!(
                        "Deleted category: {key} ({cleared} wallets uncategorized)"
                    ))
                } else {
                    Ok(format!("Deleted category: {key}"))
                }
            }
            DeleteTarget::Contact => {
                store.delete_contact(&key)?;
                Ok(format!("Deleted contact: {key}"))
            }
            DeleteTarget::Transaction => {
                store.delete_transaction(&TransactionId::new(key.as_str()))?;
                Ok(format!("Deleted transaction: {key}"))
            }
        },
        Command::Deposit {
            wallet,
            amount,
            coin,
            note,
        } => {
            let message = format!("Deposited {} {coin} to {wallet}", two_places(amount));
            record(store, TransactionKind::deposit(wallet, coin, amount), note)?;
            Ok(message)
        }
        Command::Withdraw {
            wallet,
            amount,
            coin,
            note,
        } => {
            let message = format!("Withdrew {} {coin} from {wallet}", two_places(amount));
            record(store, TransactionKind::withdraw(wallet, coin, amount), note)?;
            Ok(message)
        }
        Command::Transfer {
            from,
            to,
            amount,
            coin,
            note,
        } => {
            let message = format!(
                "Transferred {} {coin}: {from} → {to}",
                two_places(amount)
            );
            let from_address = store.resolve_counterparty(&from).map(str::to_string);
            let to_address = store.resolve_counterparty(&to).map(str::to_string);
            let kind = TransactionKind::Transfer {
                from_wallet: from,
                to_wallet: to,
                coin,
                amount,
                from_address,
                to_address,
            };
            record(store, kind, note)?;
            Ok(message)
        }
        Command::Swap {
            wallet,
            sell_amount,
            sell_coin,
            buy_amount,
            buy_coin,
            note,
        } => {
            let message = format!(
                "Swapped {} {sell_coin} → {} {buy_coin} in {wallet}",
                two_places(sell_amount),
                two_places(buy_amount),
            );
            let kind = TransactionKind::swap(wallet, sell_coin, sell_amount, buy_coin, buy_amount);
            record(store, kind, note)?;
            Ok(message)
        }
        Command::Balance {
            wallet,
            amount,
            coin,
        } => {
            let message = format!("Set {wallet} balance: {} {coin}", two_places(amount));
            store.set_balance(&wallet, coin, amount)?;
            Ok(message)
        }
        Command::Price { coin, price } => {
            store.set_price(&coin, price)?;
            Ok(format!("Set {coin} price: ${}", two_places(price)))
        }
        Command::Help | Command::Quit => Ok(String::new()),
    }
}

fn record<P: Persist>(
    store: &mut LedgerStore<P>,
    kind: TransactionKind,
    note: Option<String>,
) -> Result<()> {
    let id = store.generate_transaction_id();
    store.add_transaction(Transaction::new(id, kind, Utc::now()).with_note(note))
}

fn two_places(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}
