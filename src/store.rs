use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::balance::{self, BalanceDelta};
use crate::db::{
    self, Category, Coin, Contact, InsertResult, Ledger, PriceTable, Transaction, TransactionId,
    TransactionKind, Wallet,
};
use crate::error::{LedgerError, RecordKind, Result, StorageError};

/// Where the ledger goes after every successful mutation.
pub trait Persist {
    fn persist(&self, ledger: &Ledger) -> Result<(), StorageError>;
}

/// The ledger as a single pretty-printed JSON document on disk
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persist for JsonFile {
    fn persist(&self, ledger: &Ledger) -> Result<(), StorageError> {
        db::save(ledger, &self.path)
    }
}

/// Owns the in-memory ledger and keeps wallet balances in step with the transactions.
///
/// Every mutating operation either fails without touching the ledger, or applies the
/// change and then persists the whole ledger. A persist failure is returned to the
/// caller but the in-memory change stays in place.
pub struct LedgerStore<P: Persist = JsonFile> {
    ledger: Ledger,
    persister: P,
    last_generated_id: i64,
}

impl LedgerStore<JsonFile> {
    /// Load the ledger file, creating it with default prices if it doesn't exist yet.
    pub fn open(path: PathBuf) -> Result<Self> {
        let file = JsonFile::new(path);
        let ledger = match db::load(file.path())? {
            Some(ledger) => ledger,
            None => {
                let ledger = Ledger::new();
                file.persist(&ledger)?;
                ledger
            }
        };
        Ok(Self::new(ledger, file))
    }

    /// Replace the in-memory ledger with what's currently on disk. Last write wins.
    pub fn reload(&mut self) -> Result<()> {
        self.ledger = db::load_or_new(self.persister.path())?;
        Ok(())
    }
}

impl<P: Persist> LedgerStore<P> {
    pub fn new(ledger: Ledger, persister: P) -> Self {
        Self {
            ledger,
            persister,
            last_generated_id: 0,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn persister(&self) -> &P {
        &self.persister
    }

    fn persist(&self) -> Result<()> {
        self.persister.persist(&self.ledger)?;
        Ok(())
    }

    // Wallets

    pub fn wallet(&self, name: &str) -> Result<&Wallet> {
        self.ledger
            .wallets
            .get(name)
            .ok_or_else(|| LedgerError::not_found(RecordKind::Wallet, name))
    }

    /// Sorted by name
    pub fn wallets(&self) -> impl Iterator<Item = &Wallet> {
        self.ledger.wallets.values()
    }

    pub fn add_wallet(&mut self, wallet: Wallet) -> Result<()> {
        if self.ledger.wallets.contains_key(&wallet.name) {
            return Err(LedgerError::duplicate(RecordKind::Wallet, wallet.name));
        }
        log::debug!("Adding wallet {}", wallet.name);
        self.ledger.wallets.insert(wallet.name.clone(), wallet);
        self.persist()
    }

    /// Replace the wallet stored under `old_name`. Renaming onto another existing wallet
    /// is rejected; merging wallets has to be done by deleting one of them.
    ///
    /// Transactions keep referring to the old name. Deleting them later doesn't touch the
    /// renamed wallet, nor a new wallet that reuses the old name.
    pub fn update_wallet(&mut self, old_name: &str, wallet: Wallet) -> Result<()> {
        if !self.ledger.wallets.contains_key(old_name) {
            return Err(LedgerError::not_found(RecordKind::Wallet, old_name));
        }
        if wallet.name != old_name {
            if self.ledger.wallets.contains_key(&wallet.name) {
                return Err(LedgerError::duplicate(RecordKind::Wallet, wallet.name));
            }
            self.ledger.transactions.forget_wallet(old_name);
        }
        log::debug!("Updating wallet {old_name}");
        self.ledger.wallets.remove(old_name);
        self.ledger.wallets.insert(wallet.name.clone(), wallet);
        self.persist()
    }

    /// Transactions referencing the wallet are kept and become orphaned. Deleting them
    /// later won't touch a new wallet of the same name.
    pub fn delete_wallet(&mut self, name: &str) -> Result<Wallet> {
        let wallet = self
            .ledger
            .wallets
            .remove(name)
            .ok_or_else(|| LedgerError::not_found(RecordKind::Wallet, name))?;
        self.ledger.transactions.forget_wallet(name);
        log::debug!("Deleted wallet {name}");
        self.persist()?;
        Ok(wallet)
    }

    /// Overwrite a balance directly, bypassing the transaction log.
    pub fn set_balance(&mut self, wallet: &str, coin: Coin, amount: Decimal) -> Result<()> {
        validate_coin(&coin)?;
        let entry = self
            .ledger
            .wallets
            .get_mut(wallet)
            .ok_or_else(|| LedgerError::not_found(RecordKind::Wallet, wallet))?;
        entry.set_balance(coin, amount);
        self.persist()
    }

    // Categories

    pub fn category(&self, name: &str) -> Result<&Category> {
        self.ledger
            .categories
            .get(name)
            .ok_or_else(|| LedgerError::not_found(RecordKind::Category, name))
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.ledger.categories.values()
    }

    pub fn add_category(&mut self, category: Category) -> Result<()> {
        if self.ledger.categories.contains_key(&category.name) {
            return Err(LedgerError::duplicate(RecordKind::Category, category.name));
        }
        self.ledger
            .categories
            .insert(category.name.clone(), category);
        self.persist()
    }

    /// Removes the category and clears it on every wallet that used it. Returns the number
    /// of wallets that were uncategorized that way.
    pub fn delete_category(&mut self, name: &str) -> Result<usize> {
        if self.ledger.categories.remove(name).is_none() {
            return Err(LedgerError::not_found(RecordKind::Category, name));
        }
        let mut cleared = 0;
        for wallet in self.ledger.wallets.values_mut() {
            if wallet.category.as_deref() == Some(name) {
                wallet.category = None;
                cleared += 1;
            }
        }
        log::debug!("Deleted category {name}, uncategorized {cleared} wallets");
        self.persist()?;
        Ok(cleared)
    }

    // Contacts

    pub fn contact(&self, name: &str) -> Result<&Contact> {
        self.ledger
            .contacts
            .get(name)
            .ok_or_else(|| LedgerError::not_found(RecordKind::Contact, name))
    }

    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.ledger.contacts.values()
    }

    pub fn add_contact(&mut self, contact: Contact) -> Result<()> {
        if self.ledger.contacts.contains_key(&contact.name) {
            return Err(LedgerError::duplicate(RecordKind::Contact, contact.name));
        }
        self.ledger.contacts.insert(contact.name.clone(), contact);
        self.persist()
    }

    pub fn delete_contact(&mut self, name: &str) -> Result<Contact> {
        let contact = self
            .ledger
            .contacts
            .remove(name)
            .ok_or_else(|| LedgerError::not_found(RecordKind::Contact, name))?;
        self.persist()?;
        Ok(contact)
    }

    /// Address of a wallet or, failing that, a contact with this name
    pub fn resolve_counterparty(&self, name: &str) -> Option<&str> {
        self.ledger
            .wallets
            .get(name)
            .map(|wallet| wallet.address.as_str())
            .or_else(|| {
                self.ledger
                    .contacts
                    .get(name)
                    .map(|contact| contact.address.as_str())
            })
    }

    // Prices

    pub fn prices(&self) -> &PriceTable {
        &self.ledger.prices
    }

    pub fn set_price(&mut self, coin: &Coin, price: Decimal) -> Result<()> {
        validate_coin(coin)?;
        self.ledger.prices.set(coin, price);
        self.persist()
    }

    // Transactions

    pub fn transaction(&self, id: &TransactionId) -> Result<&Transaction> {
        self.ledger
            .transactions
            .get(id)
            .ok_or_else(|| LedgerError::not_found(RecordKind::Transaction, id.as_str()))
    }

    /// Newest first
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.ledger.transactions.iter_newest_first()
    }

    /// Transactions naming this wallet on any side, newest first
    pub fn wallet_transactions<'a>(
        &'a self,
        wallet: &'a str,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions().filter(move |tx| tx.kind.touches(wallet))
    }

    /// `tx_<unix nanos>`, never repeating an id this store handed out or already holds.
    pub fn generate_transaction_id(&mut self) -> TransactionId {
        let now = Utc::now();
        let nanos = now
            .timestamp_nanos_opt()
            .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1000));
        let mut candidate = nanos.max(self.last_generated_id + 1);
        while self
            .ledger
            .transactions
            .contains(&TransactionId(format!("tx_{candidate}")))
        {
            candidate += 1;
        }
        self.last_generated_id = candidate;
        TransactionId(format!("tx_{candidate}"))
    }

    /// Record a transaction and move the wallet balances it affects.
    ///
    /// The wallets moved are remembered on the transaction, see [Transaction::moved].
    pub fn add_transaction(&mut self, mut transaction: Transaction) -> Result<()> {
        validate_transaction(&transaction)?;
        if self.ledger.transactions.contains(&transaction.id) {
            return Err(LedgerError::duplicate(
                RecordKind::Transaction,
                transaction.id.as_str(),
            ));
        }
        self.resolve_wallets(&transaction.kind)?;

        let (updated, moved) = self.project(balance::deltas(&transaction.kind))?;
        transaction.moved_wallets = Some(moved);
        log::debug!(
            "Added {} transaction {}",
            transaction.tx_type(),
            transaction.id
        );
        let id = transaction.id.clone();
        match self.ledger.transactions.insert(transaction) {
            InsertResult::Added => {
                self.commit(updated);
                self.persist()
            }
            InsertResult::AlreadyExists => Err(LedgerError::duplicate(
                RecordKind::Transaction,
                id.as_str(),
            )),
        }
    }

    /// Remove a transaction and undo its balance changes on the wallets it moved. Those
    /// that were deleted or renamed in the meantime are skipped.
    pub fn delete_transaction(&mut self, id: &TransactionId) -> Result<Transaction> {
        let transaction = self.transaction(id)?;
        let deltas = balance::deltas(&transaction.kind)
            .into_iter()
            .filter(|delta| transaction.moved(delta.wallet))
            .map(BalanceDelta::reversed);
        let (updated, _) = self.project(deltas)?;

        self.commit(updated);
        let transaction = self
            .ledger
            .transactions
            .remove(id)
            .ok_or_else(|| LedgerError::not_found(RecordKind::Transaction, id.as_str()))?;
        log::debug!("Deleted transaction {id}");
        self.persist()?;
        Ok(transaction)
    }

    /// Check that the wallets a transaction moves funds in exist.
    fn resolve_wallets(&self, kind: &TransactionKind) -> Result<()> {
        let require = |name: &str| self.wallet(name).map(|_| ());
        match kind {
            TransactionKind::Deposit { to_wallet, .. } => require(to_wallet),
            TransactionKind::Withdraw { from_wallet, .. } => require(from_wallet),
            TransactionKind::Swap { swap_wallet, .. } => require(swap_wallet),
            TransactionKind::Transfer {
                from_wallet,
                to_wallet,
                ..
            } => {
                if self.ledger.wallets.contains_key(from_wallet)
                    || self.ledger.wallets.contains_key(to_wallet)
                {
                    Ok(())
                } else {
                    Err(LedgerError::InvalidReference(format!(
                        "neither '{from_wallet}' nor '{to_wallet}' is a wallet"
                    )))
                }
            }
        }
    }

    /// Apply deltas to copies of the wallets they name, so an overflow anywhere leaves the
    /// ledger untouched. Returns the updated wallets and the names of the wallets moved.
    ///
    /// Sides that don't name an existing wallet (contacts, raw addresses, deleted
    /// wallets) are skipped.
    fn project<'a>(
        &self,
        deltas: impl IntoIterator<Item = BalanceDelta<'a>>,
    ) -> Result<(Vec<(String, Wallet)>, BTreeSet<String>)> {
        let mut updated: Vec<(&str, Wallet)> = Vec::new();
        for delta in deltas {
            let index = match updated.iter().position(|(name, _)| *name == delta.wallet) {
                Some(index) => index,
                None => {
                    let Some(wallet) = self.ledger.wallets.get(delta.wallet) else {
                        continue;
                    };
                    updated.push((delta.wallet, wallet.clone()));
                    updated.len() - 1
                }
            };
            balance::apply_delta(&mut updated[index].1, delta.coin, delta.delta)?;
        }
        let moved = updated.iter().map(|(name, _)| name.to_string()).collect();
        let updated = updated
            .into_iter()
            .map(|(name, wallet)| (name.to_string(), wallet))
            .collect();
        Ok((updated, moved))
    }

    fn commit(&mut self, wallets: Vec<(String, Wallet)>) {
        self.ledger.wallets.extend(wallets);
    }
}

fn validate_coin(coin: &Coin) -> Result<()> {
    if coin.is_empty() {
        return Err(LedgerError::Validation("coin must not be empty".to_string()));
    }
    Ok(())
}

fn validate_amount(what: &str, amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "{what} must be greater than zero, got {amount}"
        )));
    }
    Ok(())
}

fn validate_transaction(transaction: &Transaction) -> Result<()> {
    match &transaction.kind {
        TransactionKind::Deposit { coin, amount, .. }
        | TransactionKind::Withdraw { coin, amount, .. }
        | TransactionKind::Transfer { coin, amount, .. } => {
            validate_coin(coin)?;
            validate_amount("amount", *amount)?;
        }
        TransactionKind::Swap {
            sell_coin,
            sell_amount,
            buy_coin,
            buy_amount,
            ..
        } => {
            validate_coin(sell_coin)?;
            validate_coin(buy_coin)?;
            validate_amount("sell amount", *sell_amount)?;
            validate_amount("buy amount", *buy_amount)?;
        }
    }
    if let Some(fee) = transaction.fee {
        validate_amount("fee", fee)?;
    }
    Ok(())
}
