use chrono::{TimeZone as _, Utc};
use rust_decimal::Decimal;
use std::cell::Cell;

use wago::db::{Category, Coin, Ledger, Transaction, TransactionId, TransactionKind, Wallet};
use wago::error::{LedgerError, RecordKind, StorageError};
use wago::store::{LedgerStore, Persist};

#[derive(Default)]
struct CountingPersister {
    saves: Cell<usize>,
}

impl Persist for CountingPersister {
    fn persist(&self, _ledger: &Ledger) -> Result<(), StorageError> {
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

struct FailingPersister;

impl Persist for FailingPersister {
    fn persist(&self, _ledger: &Ledger) -> Result<(), StorageError> {
        Err(StorageError::InvalidPath("disk on fire".to_string()))
    }
}

fn wallet(name: &str, category: Option<&str>) -> Wallet {
    Wallet::new(
        name.to_string(),
        format!("{name}-address"),
        "solana".to_string(),
        "hot".to_string(),
        category.map(str::to_string),
        None,
    )
}

fn tx(id: &str, kind: TransactionKind) -> Transaction {
    Transaction::new(
        TransactionId::new(id),
        kind,
        Utc.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap(),
    )
}

fn store_with_wallets(names: &[&str]) -> LedgerStore<CountingPersister> {
    let mut store = LedgerStore::new(Ledger::new(), CountingPersister::default());
    for name in names {
        store.add_wallet(wallet(name, None)).unwrap();
    }
    store
}

fn balances(store: &LedgerStore<CountingPersister>, name: &str) -> Vec<(String, Decimal)> {
    store
        .wallet(name)
        .unwrap()
        .balances
        .iter()
        .map(|balance| (balance.coin.to_string(), balance.amount))
        .collect()
}

#[test]
fn add_then_delete_restores_balances() {
    let mut store = store_with_wallets(&["A", "B"]);
    store
        .set_balance("A", Coin::new("SOL"), Decimal::new(12345, 3))
        .unwrap();
    store
        .set_balance("B", Coin::new("USDC"), Decimal::new(50, 0))
        .unwrap();
    let before_a = balances(&store, "A");
    let before_b = balances(&store, "B");

    let kinds = [
        TransactionKind::deposit("A", Coin::new("SOL"), Decimal::new(1, 1)),
        TransactionKind::withdraw("B", Coin::new("USDC"), Decimal::new(333, 2)),
        TransactionKind::transfer("A", "B", Coin::new("SOL"), Decimal::new(7, 2)),
        TransactionKind::swap(
            "B",
            Coin::new("USDC"),
            Decimal::new(1, 0),
            Coin::new("SOL"),
            Decimal::new(6, 3),
        ),
    ];
    for (index, kind) in kinds.into_iter().enumerate() {
        let id = TransactionId::new(format!("tx_{index}"));
        store
            .add_transaction(Transaction::new(id.clone(), kind, Utc::now()))
            .unwrap();
        store.delete_transaction(&id).unwrap();
    }

    assert_eq!(before_a, balances(&store, "A"));
    // The SOL entry B got along the way is never pruned, it stays at zero
    let mut expected_b = before_b;
    expected_b.push(("SOL".to_string(), Decimal::ZERO));
    assert_eq!(expected_b, balances(&store, "B"));
    assert!(store.ledger().transactions.is_empty());
}

#[test]
fn swap_moves_both_coins_even_without_prior_balance() {
    let mut store = store_with_wallets(&["W"]);
    store
        .add_transaction(tx(
            "tx_1",
            TransactionKind::swap(
                "W",
                Coin::new("SOL"),
                Decimal::new(2, 0),
                Coin::new("USDC"),
                Decimal::new(300, 0),
            ),
        ))
        .unwrap();
    assert_eq!(
        vec![
            ("SOL".to_string(), Decimal::new(-2, 0)),
            ("USDC".to_string(), Decimal::new(300, 0)),
        ],
        balances(&store, "W")
    );
}

#[test]
fn duplicate_id_leaves_ledger_unchanged() {
    let mut store = store_with_wallets(&["W"]);
    store
        .add_transaction(tx(
            "tx_1",
            TransactionKind::deposit("W", Coin::new("SOL"), Decimal::TEN),
        ))
        .unwrap();
    let saves = store.persister().saves.get();

    let err = store
        .add_transaction(tx(
            "tx_1",
            TransactionKind::deposit("W", Coin::new("SOL"), Decimal::ONE),
        ))
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::DuplicateKey {
            kind: RecordKind::Transaction,
            ..
        }
    ));
    assert_eq!(vec![("SOL".to_string(), Decimal::TEN)], balances(&store, "W"));
    assert_eq!(1, store.ledger().transactions.len());
    assert_eq!(saves, store.persister().saves.get());
}

#[test]
fn transfer_from_contact_only_touches_wallet() {
    let mut store = store_with_wallets(&["W", "other"]);
    store
        .add_transaction(tx(
            "tx_1",
            TransactionKind::transfer("alice", "W", Coin::new("SOL"), Decimal::TEN),
        ))
        .unwrap();
    assert_eq!(vec![("SOL".to_string(), Decimal::TEN)], balances(&store, "W"));
    assert!(balances(&store, "other").is_empty());

    store.delete_transaction(&TransactionId::new("tx_1")).unwrap();
    assert_eq!(vec![("SOL".to_string(), Decimal::ZERO)], balances(&store, "W"));
}

#[test]
fn deleting_transfer_ignores_wallet_created_later() {
    let mut store = store_with_wallets(&["main"]);
    store
        .add_transaction(tx(
            "tx_1",
            TransactionKind::transfer("alice", "main", Coin::new("SOL"), Decimal::TEN),
        ))
        .unwrap();
    store.add_wallet(wallet("alice", None)).unwrap();

    store.delete_transaction(&TransactionId::new("tx_1")).unwrap();
    assert!(balances(&store, "alice").is_empty());
    assert_eq!(vec![("SOL".to_string(), Decimal::ZERO)], balances(&store, "main"));
}

#[test]
fn deleting_transaction_ignores_reused_wallet_name() {
    let mut store = store_with_wallets(&["W"]);
    store
        .add_transaction(tx(
            "tx_1",
            TransactionKind::deposit("W", Coin::new("SOL"), Decimal::TEN),
        ))
        .unwrap();
    store.delete_wallet("W").unwrap();
    store.add_wallet(wallet("W", None)).unwrap();

    store.delete_transaction(&TransactionId::new("tx_1")).unwrap();
    assert!(balances(&store, "W").is_empty());
}

#[test]
fn deleting_transaction_after_rename() {
    let mut store = store_with_wallets(&["W"]);
    store
        .add_transaction(tx(
            "tx_1",
            TransactionKind::deposit("W", Coin::new("SOL"), Decimal::TEN),
        ))
        .unwrap();
    let mut renamed = store.wallet("W").unwrap().clone();
    renamed.name = "V".to_string();
    store.update_wallet("W", renamed).unwrap();
    store.add_wallet(wallet("W", None)).unwrap();

    store.delete_transaction(&TransactionId::new("tx_1")).unwrap();
    assert_eq!(vec![("SOL".to_string(), Decimal::TEN)], balances(&store, "V"));
    assert!(balances(&store, "W").is_empty());
}

#[test]
fn overflowing_deposit_is_rejected() {
    let mut store = store_with_wallets(&["W"]);
    store
        .add_transaction(tx(
            "tx_1",
            TransactionKind::deposit("W", Coin::new("SOL"), Decimal::MAX),
        ))
        .unwrap();
    let saves = store.persister().saves.get();

    let err = store
        .add_transaction(tx(
            "tx_2",
            TransactionKind::deposit("W", Coin::new("SOL"), Decimal::ONE),
        ))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(vec![("SOL".to_string(), Decimal::MAX)], balances(&store, "W"));
    assert_eq!(1, store.ledger().transactions.len());
    assert_eq!(saves, store.persister().saves.get());
}

#[test]
fn overflowing_transfer_moves_neither_side() {
    let mut store = store_with_wallets(&["A", "B"]);
    store
        .set_balance("A", Coin::new("SOL"), Decimal::TEN)
        .unwrap();
    store
        .set_balance("B", Coin::new("SOL"), Decimal::MAX)
        .unwrap();

    let err = store
        .add_transaction(tx(
            "tx_1",
            TransactionKind::transfer("A", "B", Coin::new("SOL"), Decimal::ONE),
        ))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(vec![("SOL".to_string(), Decimal::TEN)], balances(&store, "A"));
    assert_eq!(vec![("SOL".to_string(), Decimal::MAX)], balances(&store, "B"));
    assert!(store.ledger().transactions.is_empty());
}

#[test]
fn deleting_category_keeps_wallets() {
    let mut store = LedgerStore::new(Ledger::new(), CountingPersister::default());
    store
        .add_category(Category::new("defi".to_string(), "cyan".to_string()))
        .unwrap();
    store.add_wallet(wallet("a", Some("defi"))).unwrap();
    store.add_wallet(wallet("b", Some("defi"))).unwrap();
    store.add_wallet(wallet("c", Some("cold"))).unwrap();

    assert_eq!(2, store.delete_category("defi").unwrap());
    assert_eq!(3, store.wallets().count());
    assert!(store.wallets().filter(|w| w.name != "c").all(|w| w.category.is_none()));
    assert_eq!(Some("cold"), store.wallet("c").unwrap().category.as_deref());
    assert!(matches!(
        store.delete_category("defi"),
        Err(LedgerError::NotFound { .. })
    ));
}

#[test]
fn duplicate_names_are_rejected() {
    let mut store = store_with_wallets(&["W"]);
    assert!(matches!(
        store.add_wallet(wallet("W", None)),
        Err(LedgerError::DuplicateKey {
            kind: RecordKind::Wallet,
            ..
        })
    ));
    store
        .add_category(Category::new("defi".to_string(), "red".to_string()))
        .unwrap();
    assert!(store
        .add_category(Category::new("defi".to_string(), "blue".to_string()))
        .is_err());
    assert_eq!("red", store.category("defi").unwrap().color);
}

#[test]
fn every_mutation_persists() {
    let mut store = store_with_wallets(&["W"]);
    assert_eq!(1, store.persister().saves.get());
    store
        .set_price(&Coin::new("sol"), Decimal::new(150, 0))
        .unwrap();
    store
        .add_transaction(tx(
            "tx_1",
            TransactionKind::deposit("W", Coin::new("SOL"), Decimal::ONE),
        ))
        .unwrap();
    store.delete_transaction(&TransactionId::new("tx_1")).unwrap();
    assert_eq!(4, store.persister().saves.get());
    assert_eq!(Some(Decimal::new(150, 0)), store.prices().get(&Coin::new("SOL")));
}

#[test]
fn persist_failure_is_reported_but_change_stays() {
    let mut store = LedgerStore::new(Ledger::new(), FailingPersister);
    let err = store.add_wallet(wallet("W", None)).unwrap_err();
    assert!(matches!(err, LedgerError::Storage(_)));
    assert!(store.wallet("W").is_ok());
}

#[test]
fn file_backed_store_survives_reopen() {
    let tempdir = tempfile::tempdir().unwrap();
    let path = tempdir.path().join("wago.json");

    let mut store = LedgerStore::open(path.clone()).unwrap();
    assert!(path.exists());
    store.add_wallet(wallet("W", None)).unwrap();
    store
        .add_transaction(tx(
            "tx_1",
            TransactionKind::deposit("W", Coin::new("sol"), Decimal::new(25, 1)),
        ))
        .unwrap();

    let reopened = LedgerStore::open(path).unwrap();
    assert_eq!(
        Some(Decimal::new(25, 1)),
        reopened.wallet("W").unwrap().balance(&Coin::new("SOL"))
    );
    assert!(reopened.transaction(&TransactionId::new("tx_1")).is_ok());
    assert_eq!(Some(Decimal::ONE), reopened.prices().get(&Coin::new("usdc")));
}

#[test]
fn file_backed_store_keeps_amounts_exact() {
    let tempdir = tempfile::tempdir().unwrap();
    let path = tempdir.path().join("wago.json");

    let precise: Decimal = "1234567.123456789123".parse().unwrap();
    let mut store = LedgerStore::open(path.clone()).unwrap();
    store.add_wallet(wallet("W", None)).unwrap();
    store
        .add_transaction(tx(
            "tx_1",
            TransactionKind::deposit("W", Coin::new("SOL"), precise),
        ))
        .unwrap();
    store
        .add_transaction(tx(
            "tx_2",
            TransactionKind::deposit("W", Coin::new("BONK"), Decimal::MAX),
        ))
        .unwrap();

    let reopened = LedgerStore::open(path).unwrap();
    let wallet = reopened.wallet("W").unwrap();
    assert_eq!(
        "1234567.123456789123",
        wallet.balance(&Coin::new("SOL")).unwrap().to_string()
    );
    assert_eq!(Some(Decimal::MAX), wallet.balance(&Coin::new("BONK")));
    assert_eq!(store.ledger().transactions.len(), reopened.ledger().transactions.len());
}

#[test]
fn reload_picks_up_external_changes() {
    let tempdir = tempfile::tempdir().unwrap();
    let path = tempdir.path().join("wago.json");

    let mut first = LedgerStore::open(path.clone()).unwrap();
    let mut second = LedgerStore::open(path).unwrap();
    second.add_wallet(wallet("W", None)).unwrap();

    assert!(first.wallet("W").is_err());
    first.reload().unwrap();
    assert!(first.wallet("W").is_ok());
}
