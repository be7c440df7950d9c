// ═══════════════════════════════════════════════════════════════════
// Storage Tests: key/value stores, portfolio format, StorageManager
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};

use etf_dividend_core::errors::CoreError;
use etf_dividend_core::models::holding::{HoldingLedger, Portfolio};
use etf_dividend_core::models::transaction::Transaction;
use etf_dividend_core::storage::format::{self, CREDENTIAL_KEY, PORTFOLIO_KEY};
use etf_dividend_core::storage::manager::StorageManager;
use etf_dividend_core::storage::store::{FileStore, KeyValueStore, MemoryStore};

fn sample_portfolio() -> Portfolio {
    let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
    let mut ledger = HoldingLedger::new("0056", "元大高股息", Transaction::new(date, 2000, 36.2));
    ledger.transactions.push(Transaction::new(date, 1000, 35.8));
    let mut p = Portfolio::new();
    p.holdings.push(ledger);
    p.holdings.push(HoldingLedger::new("00679B", "元大美債20年", Transaction::new(date, 3000, 28.1)));
    p
}

// ═══════════════════════════════════════════════════════════════════
// MemoryStore
// ═══════════════════════════════════════════════════════════════════

mod memory_store {
    use super::*;

    #[test]
    fn set_get_remove() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.len(), 1);
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn remove_missing_is_ok() {
        let mut store = MemoryStore::new();
        assert!(store.remove("nothing").is_ok());
    }

    #[test]
    fn set_overwrites() {
        let mut store = MemoryStore::new();
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
// FileStore
// ═══════════════════════════════════════════════════════════════════

mod file_store {
    use super::*;

    #[test]
    fn creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("state");
        let store = FileStore::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(store.dir(), dir.as_path());
    }

    #[test]
    fn values_persist_across_instances() {
        let tmp = tempfile::tempdir().unwrap();
        {
            let mut store = FileStore::open(tmp.path()).unwrap();
            store.set(PORTFOLIO_KEY, "[]").unwrap();
        }
        let store = FileStore::open(tmp.path()).unwrap();
        assert_eq!(store.get(PORTFOLIO_KEY).unwrap().as_deref(), Some("[]"));
        assert!(tmp.path().join(PORTFOLIO_KEY).is_file());
    }

    #[test]
    fn missing_key_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        assert_eq!(store.get("absent").unwrap(), None);
    }

    #[test]
    fn remove_deletes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(tmp.path()).unwrap();
        store.set(CREDENTIAL_KEY, "k").unwrap();
        store.remove(CREDENTIAL_KEY).unwrap();
        assert!(!tmp.path().join(CREDENTIAL_KEY).exists());
        store.remove(CREDENTIAL_KEY).unwrap();
    }

    #[test]
    fn no_temp_file_left_behind() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(tmp.path()).unwrap();
        store.set("k", "v").unwrap();
        let names: Vec<String> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["k".to_string()]);
    }

    #[test]
    fn rejects_path_like_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(tmp.path()).unwrap();
        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(store.set(key, "x"), Err(CoreError::Storage(_))), "{key:?}");
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Portfolio format
// ═══════════════════════════════════════════════════════════════════

mod portfolio_format {
    use super::*;

    #[test]
    fn keys_are_stable() {
        assert_eq!(PORTFOLIO_KEY, "etf_portfolio_v2");
        assert_eq!(CREDENTIAL_KEY, "gemini_api_key");
    }

    #[test]
    fn encode_then_decode_preserves_ledgers() {
        let p = sample_portfolio();
        let json = format::encode_portfolio(&p).unwrap();
        assert_eq!(format::decode_portfolio(Some(&json)), p);
    }

    #[test]
    fn absent_or_blank_is_empty() {
        assert!(format::decode_portfolio(None).is_empty());
        assert!(format::decode_portfolio(Some("")).is_empty());
        assert!(format::decode_portfolio(Some("   \n")).is_empty());
    }

    #[test]
    fn garbage_is_empty() {
        assert!(format::decode_portfolio(Some("{not json")).is_empty());
        assert!(format::decode_portfolio(Some("{\"code\":\"0056\"}")).is_empty());
    }

    #[test]
    fn duplicate_codes_keep_first() {
        let p = sample_portfolio();
        let mut value = serde_json::to_value(&p).unwrap();
        let first = value[0].clone();
        let mut dup = first.clone();
        dup["name"] = serde_json::json!("duplicate");
        value.as_array_mut().unwrap().push(dup);

        let decoded = format::decode_portfolio(Some(&value.to_string()));
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.get("0056").unwrap().name, "元大高股息");
    }

    #[test]
    fn stored_codes_are_normalized() {
        let p = sample_portfolio();
        let mut value = serde_json::to_value(&p).unwrap();
        value[1]["code"] = serde_json::json!("00679b");
        let mut variant = value[0].clone();
        variant["code"] = serde_json::json!(" 0056 ");
        variant["name"] = serde_json::json!("duplicate");
        value.as_array_mut().unwrap().push(variant);

        let decoded = format::decode_portfolio(Some(&value.to_string()));
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.get("00679b").unwrap().code, "00679B");
        assert_eq!(decoded.get("0056").unwrap().name, "元大高股息");
    }

    #[test]
    fn blank_stored_code_is_dropped() {
        let mut value = serde_json::to_value(sample_portfolio()).unwrap();
        value[0]["code"] = serde_json::json!("  ");
        let decoded = format::decode_portfolio(Some(&value.to_string()));
        assert_eq!(decoded.len(), 1);
        assert!(decoded.contains("00679B"));
    }

    #[test]
    fn stored_layout_field_names() {
        let json = format::encode_portfolio(&sample_portfolio()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let t = &value[0]["transactions"][0];
        for field in ["id", "date", "shares", "price", "fee", "total_cost"] {
            assert!(t.get(field).is_some(), "missing {field}");
        }
        assert_eq!(t["date"], "2025-01-15");
    }
}

// ═══════════════════════════════════════════════════════════════════
// StorageManager
// ═══════════════════════════════════════════════════════════════════

mod storage_manager {
    use super::*;

    #[test]
    fn empty_store_loads_empty() {
        let manager = StorageManager::new(Box::new(MemoryStore::new()));
        assert!(manager.load_portfolio().unwrap().is_empty());
        assert!(manager.load_credential().unwrap().is_none());
    }

    #[test]
    fn portfolio_roundtrip() {
        let mut manager = StorageManager::new(Box::new(MemoryStore::new()));
        let p = sample_portfolio();
        manager.save_portfolio(&p).unwrap();
        assert_eq!(manager.load_portfolio().unwrap(), p);
    }

    #[test]
    fn credential_roundtrip_and_clear() {
        let mut manager = StorageManager::new(Box::new(MemoryStore::new()));
        manager
            .save_credential(&SecretString::from("AIza-test".to_string()))
            .unwrap();
        let loaded = manager.load_credential().unwrap().unwrap();
        assert_eq!(loaded.expose_secret(), "AIza-test");

        manager.clear_credential().unwrap();
        assert!(manager.load_credential().unwrap().is_none());
    }

    #[test]
    fn blank_credential_counts_as_absent() {
        let mut store = MemoryStore::new();
        store.set(CREDENTIAL_KEY, "   ").unwrap();
        let manager = StorageManager::new(Box::new(store));
        assert!(manager.load_credential().unwrap().is_none());
    }

    #[test]
    fn file_backed_manager_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let p = sample_portfolio();
        {
            let mut manager = StorageManager::new(Box::new(FileStore::open(tmp.path()).unwrap()));
            manager.save_portfolio(&p).unwrap();
        }
        let manager = StorageManager::new(Box::new(FileStore::open(tmp.path()).unwrap()));
        assert_eq!(manager.load_portfolio().unwrap(), p);
    }
}
