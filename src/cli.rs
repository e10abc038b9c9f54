use anyhow::{anyhow, bail, Context as _, Result};
use chrono::Utc;
use console::style;

use crate::args::{
    Args, CategoryCommand, Command, ContactCommand, PriceCommand, TxAddArgs, TxCommand,
    WalletCommand,
};
use crate::config;
use crate::dashboard::{self, style_header};
use crate::db::{Category, Coin, Contact, Transaction, TransactionId, TransactionKind, Wallet};
use crate::store::{LedgerStore, Persist};
use crate::terminal::{self, BulletPointPrinter};

pub fn main(args: Args) -> Result<()> {
    let path = config::data_file(args.data_file)?;
    let mut cli = Cli {
        store: LedgerStore::open(path).context("Failed to load ledger")?,
    };
    match args.command {
        Command::Wallet { command } => cli.main_wallet(command.unwrap_or(WalletCommand::List)),
        Command::Category { command } => {
            cli.main_category(command.unwrap_or(CategoryCommand::List))
        }
        Command::Contact { command } => cli.main_contact(command.unwrap_or(ContactCommand::List)),
        Command::Tx { command } => {
            cli.main_tx(command.unwrap_or(TxCommand::List { wallet: None }))
        }
        Command::Price { command } => cli.main_price(command.unwrap_or(PriceCommand::List)),
        Command::Summary => cli.main_summary(),
        Command::Flow { month } => cli.main_flow(month),
        Command::Dashboard => dashboard::run(&mut cli.store),
    }
}

pub struct Cli {
    store: LedgerStore,
}

impl Cli {
    fn main_wallet(&mut self, command: WalletCommand) -> Result<()> {
        match command {
            WalletCommand::List => {
                println!("{}", style_header("Wallets:"));
                dashboard::print_wallets(&BulletPointPrinter::new(), self.store.ledger());
            }
            WalletCommand::Show { name } => {
                let wallet = self.store.wallet(&name)?;
                let printer = BulletPointPrinter::new();
                dashboard::print_wallet(&printer, self.store.ledger(), wallet);
                println!();
                println!("{}", style_header("Transactions:"));
                let mut any = false;
                for transaction in self.store.wallet_transactions(&name) {
                    dashboard::print_transaction(&printer, transaction);
                    any = true;
                }
                if !any {
                    printer.print_line(style("(none)").italic());
                }
            }
            WalletCommand::Add {
                name,
                address,
                chain,
                wallet_type,
                category,
                note,
            } => {
                if let Some(category) = category.as_deref().filter(|c| !c.is_empty()) {
                    ensure_category(&mut self.store, category)?;
                }
                let wallet = Wallet::new(name, address, chain, wallet_type, category, note);
                let description = format!("{} ({})", wallet.name, wallet.chain_type());
                self.store
                    .add_wallet(wallet)
                    .context("Failed to add wallet")?;
                println!("Added wallet {}", style(description).cyan());
            }
            WalletCommand::Upd {
                name,
                rename,
                address,
                chain,
                wallet_type,
                category,
                note,
            } => {
                let mut wallet = self.store.wallet(&name)?.clone();
                if let Some(rename) = rename {
                    wallet.name = rename;
                }
                if let Some(address) = address {
                    wallet.address = address;
                }
                if let Some(chain) = chain {
                    wallet.chain = chain;
                }
                if let Some(wallet_type) = wallet_type {
                    wallet.wallet_type = wallet_type;
                }
                if let Some(category) = category {
                    if category.is_empty() {
                        wallet.category = None;
                    } else {
                        ensure_category(&mut self.store, &category)?;
                        wallet.category = Some(category);
                    }
                }
                if let Some(note) = note {
                    wallet.note = Some(note).filter(|note| !note.is_empty());
                }
                self.store
                    .update_wallet(&name, wallet)
                    .context("Failed to update wallet")?;
                println!("Updated wallet {}", style(&name).cyan());
            }
            WalletCommand::Del { name, yes } => {
                self.store.wallet(&name)?;
                if !yes && !terminal::confirm(&format!("Delete wallet {name}?"))? {
                    println!("Cancelled");
                    return Ok(());
                }
                self.store.delete_wallet(&name)?;
                println!("Deleted wallet {}", style(&name).cyan());
            }
            WalletCommand::Balance { name, amount, coin } => {
                let coin = Coin::new(coin);
                self.store
                    .set_balance(&name, coin.clone(), amount)
                    .context("Failed to set balance")?;
                println!("Set {} balance: {} {}", style(&name).cyan(), amount, coin);
            }
        }
        Ok(())
    }

    fn main_category(&mut self, command: CategoryCommand) -> Result<()> {
        match command {
            CategoryCommand::List => {
                println!("{}", style_header("Categories:"));
                let printer = BulletPointPrinter::new();
                if self.store.categories().next().is_none() {
                    printer.print_line(style("(none)").italic());
                }
                for category in self.store.categories() {
                    let wallets = self
                        .store
                        .wallets()
                        .filter(|wallet| wallet.category.as_deref() == Some(category.name.as_str()))
                        .count();
                    printer.print_item(format!(
                        "{} {} {}",
                        style(&category.name).bold(),
                        style(&category.color).dim(),
                        style(format!("({wallets} wallets)")).dim(),
                    ));
                }
            }
            CategoryCommand::Add { name, color } => {
                let category = match color {
                    Some(color) => Category::new(name, color),
                    None => Category::with_random_color(name),
                };
                let description = format!("{} ({})", style(&category.name).bold(), category.color);
                self.store
                    .add_category(category)
                    .context("Failed to add category")?;
                println!("Added category {description}");
            }
            CategoryCommand::Del { name } => {
                let cleared = self
                    .store
                    .delete_category(&name)
                    .context("Failed to delete category")?;
                println!(
                    "Deleted category {}, {} wallets are now uncategorized",
                    style(&name).bold(),
                    cleared
                );
            }
        }
        Ok(())
    }

    fn main_contact(&mut self, command: ContactCommand) -> Result<()> {
        match command {
            ContactCommand::List => {
                println!("{}", style_header("Contacts:"));
                let printer = BulletPointPrinter::new();
                if self.store.contacts().next().is_none() {
                    printer.print_line(style("(none)").italic());
                }
                for contact in self.store.contacts() {
                    let chain = contact
                        .chain
                        .as_deref()
                        .map(|chain| format!(" {}", style(chain).magenta()))
                        .unwrap_or_default();
                    printer.print_item(format!(
                        "{}{} {}",
                        style(&contact.name).color256(208),
                        chain,
                        style(&contact.address).dim()
                    ));
                }
            }
            ContactCommand::Add {
                name,
                address,
                chain,
                note,
            } => {
                self.store
                    .add_contact(Contact::new(name.clone(), address, chain, note))
                    .context("Failed to add contact")?;
                println!("Added contact {}", style(&name).color256(208));
            }
            ContactCommand::Del { name } => {
                self.store
                    .delete_contact(&name)
                    .context("Failed to delete contact")?;
                println!("Deleted contact {}", style(&name).color256(208));
            }
        }
        Ok(())
    }

    fn main_tx(&mut self, command: TxCommand) -> Result<()> {
        match command {
            TxCommand::List { wallet } => {
                println!("{}", style_header("Transactions:"));
                let printer = BulletPointPrinter::new();
                let transactions: Vec<&Transaction> = match &wallet {
                    Some(wallet) => {
                        self.store.wallet(wallet)?;
                        self.store.wallet_transactions(wallet).collect()
                    }
                    None => self.store.transactions().collect(),
                };
                if transactions.is_empty() {
                    printer.print_line(style("(none)").italic());
                }
                for transaction in transactions {
                    dashboard::print_transaction(&printer, transaction);
                }
            }
            TxCommand::Add(add) => {
                let kind = transaction_kind(&self.store, &add)?;
                let id = self.store.generate_transaction_id();
                let mut transaction =
                    Transaction::new(id.clone(), kind, Utc::now()).with_note(add.note);
                if let Some(fee) = add.fee {
                    transaction = transaction.with_fee(fee, add.fee_coin.map(Coin::new));
                }
                self.store
                    .add_transaction(transaction)
                    .context("Failed to add transaction")?;
                println!("Added transaction {}", style(id).dim());
            }
            TxCommand::Del { id } => {
                let transaction = self
                    .store
                    .delete_transaction(&TransactionId::new(id))
                    .context("Failed to delete transaction")?;
                println!(
                    "Deleted {} transaction {}",
                    transaction.tx_type(),
                    style(&transaction.id).dim()
                );
            }
        }
        Ok(())
    }

    fn main_price(&mut self, command: PriceCommand) -> Result<()> {
        match command {
            PriceCommand::List => {
                println!("{}", style_header("Prices:"));
                let printer = BulletPointPrinter::new();
                for (coin, price) in self.store.prices().iter() {
                    printer.print_item(format!(
                        "{}: ${}",
                        style(coin.to_uppercase()).bold(),
                        price
                    ));
                }
            }
            PriceCommand::Set { coin, price } => {
                let coin = Coin::new(coin);
                self.store
                    .set_price(&coin, price)
                    .context("Failed to set price")?;
                println!("Set {} price: ${}", style(&coin).bold(), price);
            }
        }
        Ok(())
    }

    fn main_summary(&self) -> Result<()> {
        let printer = BulletPointPrinter::new();
        println!("{}", style_header("Total Balance"));
        dashboard::print_totals(&printer, self.store.ledger());
        println!();
        println!("{}", style_header("By Category"));
        dashboard::print_categories(&printer, self.store.ledger());
        println!();
        println!("{}", style_header("Wallets"));
        dashboard::print_wallets(&printer, self.store.ledger());
        Ok(())
    }

    fn main_flow(&self, month: Option<String>) -> Result<()> {
        let groups = crate::aggregate::group_by_month(self.store.ledger().transactions.iter());
        let month = match month {
            Some(month) => month,
            None => crate::aggregate::month_keys(&groups)
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("No transactions yet"))?,
        };
        let transactions = groups.get(&month).cloned().unwrap_or_default();
        dashboard::print_flow(
            &BulletPointPrinter::new(),
            &month,
            &transactions,
            &self.store.ledger().wallets,
        );
        Ok(())
    }
}

/// Create the category with a random colour if it doesn't exist yet.
fn ensure_category<P: Persist>(store: &mut LedgerStore<P>, name: &str) -> Result<()> {
    if store.category(name).is_err() {
        let category = Category::with_random_color(name.to_string());
        log::info!("Creating category {} ({})", category.name, category.color);
        store
            .add_category(category)
            .context("Failed to create category")?;
    }
    Ok(())
}

/// Work out the transaction type from which wallet flags are set and resolve the
/// counterparties to addresses.
fn transaction_kind<P: Persist>(
    store: &LedgerStore<P>,
    add: &TxAddArgs,
) -> Result<TransactionKind> {
    let non_empty = |value: &Option<String>| value.clone().filter(|value| !value.is_empty());
    let (from, to, swap) = (non_empty(&add.from), non_empty(&add.to), non_empty(&add.swap));

    if let Some(wallet) = swap {
        let (Some(sell_coin), Some(buy_coin)) =
            (non_empty(&add.sell_coin), non_empty(&add.buy_coin))
        else {
            bail!("For swap transactions, both --sell-coin and --buy-coin must be specified");
        };
        let (Some(sell_amount), Some(buy_amount)) = (add.sell_amount, add.buy_amount) else {
            bail!("For swap transactions, both --sell-amount and --buy-amount must be specified");
        };
        store
            .wallet(&wallet)
            .with_context(|| format!("Swap wallet '{wallet}' not found"))?;
        return Ok(TransactionKind::swap(
            wallet,
            Coin::new(sell_coin),
            sell_amount,
            Coin::new(buy_coin),
            buy_amount,
        ));
    }

    let coin = non_empty(&add.coin)
        .map(Coin::new)
        .ok_or_else(|| anyhow!("Coin must be specified with --coin"))?;
    let amount = add
        .amount
        .ok_or_else(|| anyhow!("Amount must be specified with --amount"))?;

    match (from, to) {
        (Some(from), Some(to)) => {
            let from_address = store
                .resolve_counterparty(&from)
                .ok_or_else(|| anyhow!("Source wallet or contact '{from}' not found"))?
                .to_string();
            let to_address = store
                .resolve_counterparty(&to)
                .ok_or_else(|| anyhow!("Destination wallet or contact '{to}' not found"))?
                .to_string();
            Ok(TransactionKind::Transfer {
                from_wallet: from,
                to_wallet: to,
                coin,
                amount,
                from_address: Some(from_address),
                to_address: Some(to_address),
            })
        }
        (Some(from), None) => {
            store
                .wallet(&from)
                .with_context(|| format!("Source wallet '{from}' not found"))?;
            Ok(TransactionKind::withdraw(from, coin, amount))
        }
        (None, Some(to)) => {
            store
                .wallet(&to)
                .with_context(|| format!("Destination wallet '{to}' not found"))?;
            Ok(TransactionKind::deposit(to, coin, amount))
        }
        (None, None) => bail!("Either --from, --to, or --swap wallet must be specified"),
    }
}
