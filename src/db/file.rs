use std::path::Path;

use crate::error::StorageError;

use super::Ledger;

/// Returns Ok(None) if the ledger file doesn't exist yet
pub fn load(path: &Path) -> Result<Option<Ledger>, StorageError> {
    log::info!("Loading ledger from {}...", path.display());
    if !path.try_exists()? {
        log::info!("Loading ledger...not found");
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let mut ledger: Ledger = serde_json::from_str(&content)?;
    ledger.repair();

    log::info!("Loading ledger...done");

    Ok(Some(ledger))
}

pub fn load_or_new(path: &Path) -> Result<Ledger, StorageError> {
    Ok(load(path)?.unwrap_or_else(Ledger::new))
}

pub fn save(ledger: &Ledger, path: &Path) -> Result<(), StorageError> {
    log::debug!("Saving ledger to {}...", path.display());

    let content = serde_json::to_string_pretty(ledger)?;

    // First write to temporary file so we don't lose data if writing fails halfway
    let filename = path
        .file_name()
        .ok_or_else(|| StorageError::InvalidPath("Path has no filename".to_string()))?
        .to_str()
        .ok_or_else(|| StorageError::InvalidPath("Filename isn't valid utf-8".to_string()))?;
    let tmppath = path.with_file_name(format!("{}.temp", filename));
    std::fs::write(&tmppath, content)?;

    // Ok, writing succeeded, let's now replace the real file with the tmpfile
    std::fs::rename(&tmppath, path)?;

    log::debug!("Saving ledger...done");

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};
    use rust_decimal::Decimal;

    use crate::db::{
        Category, Coin, Contact, Transaction, TransactionId, TransactionKind, Wallet,
    };

    use super::*;

    fn some_ledger_1() -> Ledger {
        let mut ledger = Ledger::new();
        let mut wallet = Wallet::new(
            "main".to_string(),
            "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU".to_string(),
            "solana".to_string(),
            "hot".to_string(),
            Some("defi".to_string()),
            Some("daily driver".to_string()),
        );
        wallet.set_balance(Coin::new("SOL"), Decimal::new(125, 1));
        ledger.wallets.insert(wallet.name.clone(), wallet);
        ledger.categories.insert(
            "defi".to_string(),
            Category::new("defi".to_string(), "cyan".to_string()),
        );
        ledger.contacts.insert(
            "alice".to_string(),
            Contact::new("alice".to_string(), "0xabc".to_string(), None, None),
        );
        let _ = ledger.transactions.insert(Transaction::new(
            TransactionId::new("tx_1"),
            TransactionKind::deposit("main", Coin::new("SOL"), Decimal::new(125, 1)),
            Utc.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap(),
        ));
        ledger.repair();
        ledger
    }

    fn some_ledger_2() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.prices.set(&Coin::new("btc"), Decimal::new(45000, 0));
        ledger
    }

    #[test]
    fn load_nonexisting() {
        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("wago.json");

        let loaded = load(&tempfile).unwrap();
        assert_eq!(None, loaded);
    }

    #[test]
    fn load_or_new_seeds_prices() {
        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("wago.json");

        let loaded = load_or_new(&tempfile).unwrap();
        assert_eq!(Ledger::new(), loaded);
    }

    #[test]
    fn save_new_file_and_load() {
        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("wago.json");

        let ledger = some_ledger_1();

        save(&ledger, &tempfile).unwrap();
        let loaded = load(&tempfile).unwrap();
        assert_eq!(ledger, loaded.unwrap());
    }

    #[test]
    fn overwrite_existing_file_and_load() {
        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("wago.json");

        let ledger1 = some_ledger_1();
        let ledger2 = some_ledger_2();

        save(&ledger1, &tempfile).unwrap();
        save(&ledger2, &tempfile).unwrap();
        let loaded = load(&tempfile).unwrap().unwrap();
        assert_ne!(ledger1, loaded);
        assert_eq!(ledger2, loaded);
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("wago.json");

        save(&some_ledger_1(), &tempfile).unwrap();
        let entries: Vec<_> = std::fs::read_dir(tempdir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(vec![std::ffi::OsString::from("wago.json")], entries);
    }

    #[test]
    fn file_is_pretty_printed_with_all_sections() {
        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("wago.json");

        save(&Ledger::new(), &tempfile).unwrap();
        let content = std::fs::read_to_string(&tempfile).unwrap();
        assert_eq!(
            "{\n  \"wallets\": {},\n  \"categories\": {},\n  \"contacts\": {},\n  \"transactions\": {},\n  \"prices\": {\n    \"usdc\": 1.0,\n    \"usdt\": 1.0\n  }\n}",
            content
        );
    }

    #[test]
    fn keeps_amounts_exact() {
        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("wago.json");

        let mut ledger = some_ledger_1();
        let wallet = ledger.wallets.get_mut("main").unwrap();
        wallet.set_balance(Coin::new("SOL"), "1234567.123456789123".parse().unwrap());
        wallet.set_balance(Coin::new("BONK"), Decimal::MAX);

        save(&ledger, &tempfile).unwrap();
        let content = std::fs::read_to_string(&tempfile).unwrap();
        assert!(content.contains("1234567.123456789123"), "{content}");
        assert!(content.contains("79228162514264337593543950335"), "{content}");

        let loaded = load(&tempfile).unwrap().unwrap();
        let wallet = &loaded.wallets["main"];
        assert_eq!(
            "1234567.123456789123",
            wallet.balance(&Coin::new("SOL")).unwrap().to_string()
        );
        assert_eq!(Some(Decimal::MAX), wallet.balance(&Coin::new("BONK")));
    }

    #[test]
    fn loading_repairs_older_files() {
        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("wago.json");
        std::fs::write(
            &tempfile,
            r#"{
                "wallets": {
                    "main": {
                        "name": "main",
                        "address": "addr",
                        "chain": "solana",
                        "type": "hot",
                        "balances": [
                            {"coin": "sol", "amount": 1},
                            {"coin": "SOL", "amount": 2.5}
                        ]
                    }
                },
                "transactions": {
                    "tx_1": {
                        "id": "tx_1",
                        "type": "transfer",
                        "from_wallet": "alice",
                        "to_wallet": "main",
                        "coin": "sol",
                        "amount": 1.5e-7,
                        "date": "2025-01-05T12:00:00Z"
                    }
                },
                "prices": {"SOL": 150}
            }"#,
        )
        .unwrap();

        let loaded = load(&tempfile).unwrap().unwrap();
        assert_eq!(
            vec![(Coin::new("SOL"), Decimal::new(35, 1))],
            loaded.wallets["main"]
                .balances
                .iter()
                .map(|balance| (balance.coin.clone(), balance.amount))
                .collect::<Vec<_>>()
        );
        assert_eq!(Some(Decimal::new(150, 0)), loaded.prices.get(&Coin::new("SOL")));

        let tx = loaded.transactions.get(&TransactionId::new("tx_1")).unwrap();
        assert!(tx.moved("main"));
        assert!(!tx.moved("alice"));
        match &tx.kind {
            TransactionKind::Transfer { amount, .. } => {
                assert_eq!(Decimal::new(15, 8), *amount)
            }
            other => panic!("Expected a transfer, got {other:?}"),
        }
    }

    #[test]
    fn doesnt_load_garbage() {
        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("wago.json");
        std::fs::write(&tempfile, "{ not json").unwrap();

        let err = load(&tempfile).unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("missing").join("wago.json");

        let err = save(&Ledger::new(), &tempfile).unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
