#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for `JsonFileStore`: named documents, collection files,
//! legacy settings layout and record deletion.

use chrono::{TimeZone, Utc};
use domain_market_app::adapters::{
    JsonFileStore, CREDENTIALS_FILE, DOMAINS_FILE, FRIENDLY_LINKS_FILE, REGISTRARS_FILE,
    SITE_SETTINGS_FILE, SOLD_DOMAINS_FILE,
};
use domain_market_core::traits::{
    CredentialRepository, DocumentStore, MarketRepository, SettingsRepository, StorageBackend,
};
use domain_market_core::types::{Credential, Domain, FriendlyLink, RecordKind, SoldDomain};
use serde_json::{json, Value};

// ===== Helpers =====

fn create_test_store() -> (JsonFileStore, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let store = JsonFileStore::new(tmp.path().join("data"));
    (store, tmp)
}

fn make_domain(id: &str, name: &str) -> Domain {
    Domain {
        id: id.to_string(),
        name: name.to_string(),
        extension: ".io".to_string(),
        price: Some("500".to_string()),
        created_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        updated_at: Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()),
        ..Domain::default()
    }
}

// ===== DocumentStore =====

#[tokio::test]
async fn write_then_read_document() {
    let (store, _tmp) = create_test_store();
    let doc = json!({"hello": "world", "n": [1, 2, 3]});

    assert!(store.write("notes.json", &doc).await);
    assert_eq!(store.read("notes.json", Value::Null).await, doc);
}

#[tokio::test]
async fn write_is_pretty_printed() {
    let (store, _tmp) = create_test_store();
    assert!(store.write("pretty.json", &json!({"a": 1})).await);
    let raw = std::fs::read_to_string(store.data_dir().join("pretty.json")).unwrap();
    assert!(raw.contains('\n'));
}

#[tokio::test]
async fn missing_document_yields_default() {
    let (store, _tmp) = create_test_store();
    let default = json!({"fallback": true});
    assert_eq!(store.read("absent.json", default.clone()).await, default);
}

#[tokio::test]
async fn unparsable_document_yields_default() {
    let (store, _tmp) = create_test_store();
    std::fs::create_dir_all(store.data_dir()).unwrap();
    std::fs::write(store.data_dir().join("broken.json"), "{ not json").unwrap();
    assert_eq!(store.read("broken.json", json!([])).await, json!([]));
}

#[tokio::test]
async fn invalid_names_are_rejected() {
    let (store, tmp) = create_test_store();
    assert!(!store.write("../escape.json", &json!(1)).await);
    assert!(!store.write("notes.txt", &json!(1)).await);
    assert!(!tmp.path().join("escape.json").exists());
    assert_eq!(store.read("../escape.json", json!("d")).await, json!("d"));
    assert!(!store.delete("../escape.json").await);
}

#[tokio::test]
async fn list_returns_sorted_json_names() {
    let (store, _tmp) = create_test_store();
    assert!(store.list().await.is_empty());

    store.write("b.json", &json!({})).await;
    store.write("a.json", &json!({})).await;
    std::fs::write(store.data_dir().join("app-data.db"), b"x").unwrap();

    assert_eq!(store.list().await, ["a.json", "b.json"]);
}

#[tokio::test]
async fn delete_absent_document_succeeds() {
    let (store, _tmp) = create_test_store();
    store.write("gone.json", &json!({})).await;
    assert!(store.delete("gone.json").await);
    assert!(store.delete("gone.json").await);
    assert!(store.list().await.is_empty());
}

// ===== StorageBackend =====

#[tokio::test]
async fn initialize_writes_empty_collections_once() {
    let (store, _tmp) = create_test_store();
    store.initialize().await.unwrap();

    for name in [DOMAINS_FILE, SOLD_DOMAINS_FILE, FRIENDLY_LINKS_FILE, REGISTRARS_FILE] {
        assert_eq!(store.read(name, Value::Null).await, json!([]), "{name}");
    }

    store.replace_domains(&[make_domain("d1", "keep")]).await.unwrap();
    store.initialize().await.unwrap();
    assert_eq!(store.find_domains().await.unwrap().len(), 1);
}

// ===== Records =====

#[tokio::test]
async fn domains_replace_then_find() {
    let (store, _tmp) = create_test_store();
    let domains = vec![make_domain("d1", "alpha"), make_domain("d2", "beta")];
    store.replace_domains(&domains).await.unwrap();
    assert_eq!(store.find_domains().await.unwrap(), domains);

    store.replace_domains(&[]).await.unwrap();
    assert!(store.find_domains().await.unwrap().is_empty());
}

#[tokio::test]
async fn collection_files_use_camel_case() {
    let (store, _tmp) = create_test_store();
    let link = FriendlyLink {
        id: "l1".to_string(),
        name: "Friend".to_string(),
        url: "https://friend.example".to_string(),
        description: "A friend".to_string(),
        ..FriendlyLink::default()
    };
    store.replace_friendly_links(&[link]).await.unwrap();
    store
        .replace_domains(&[make_domain("d1", "alpha")])
        .await
        .unwrap();

    let raw = store.read(DOMAINS_FILE, Value::Null).await;
    assert!(raw[0].get("createdAt").is_some());
    assert_eq!(store.read(FRIENDLY_LINKS_FILE, Value::Null).await[0]["url"], "https://friend.example");
}

#[tokio::test]
async fn delete_record_rewrites_collection() {
    let (store, _tmp) = create_test_store();
    store
        .replace_domains(&[make_domain("d1", "alpha"), make_domain("d2", "beta")])
        .await
        .unwrap();
    store
        .replace_sold_domains(&[SoldDomain {
            id: "s1".to_string(),
            name: "gone".to_string(),
            extension: ".com".to_string(),
            ..SoldDomain::default()
        }])
        .await
        .unwrap();

    assert!(store.delete_record(RecordKind::Domains, "d2").await.unwrap());
    assert!(!store.delete_record(RecordKind::Domains, "missing").await.unwrap());
    assert!(store.delete_record(RecordKind::SoldDomains, "s1").await.unwrap());

    assert_eq!(store.find_domains().await.unwrap(), [make_domain("d1", "alpha")]);
    assert!(store.find_sold_domains().await.unwrap().is_empty());
}

#[tokio::test]
async fn credential_file_holds_one_record() {
    let (store, _tmp) = create_test_store();
    assert!(store.get_credential().await.unwrap().is_none());

    let credential = Credential::new("pbkdf2-sha256$1000$a$b".to_string(), "initial");
    store.save_credential(&credential).await.unwrap();

    let raw = store.read(CREDENTIALS_FILE, Value::Null).await;
    assert_eq!(raw.as_array().map(Vec::len), Some(1));
    assert_eq!(raw[0]["password_hash"], "pbkdf2-sha256$1000$a$b");
    assert_eq!(store.get_credential().await.unwrap(), Some(credential));
}

#[tokio::test]
async fn legacy_plaintext_credential_is_read() {
    let (store, _tmp) = create_test_store();
    store
        .write(
            CREDENTIALS_FILE,
            &json!([{
                "id": "admin",
                "password": "admin123",
                "last_updated": "2024-01-01T00:00:00.000Z",
                "version": "1"
            }]),
        )
        .await;

    let credential = store.get_credential().await.unwrap().unwrap();
    assert_eq!(credential.password_hash, "admin123");
}

// ===== Settings =====

#[tokio::test]
async fn settings_written_as_object_and_merged() {
    let (store, _tmp) = create_test_store();
    store.set_setting("siteName", "Shop").await.unwrap();
    store.set_setting("favicon", "/f.ico").await.unwrap();

    let raw = store.read(SITE_SETTINGS_FILE, Value::Null).await;
    assert_eq!(raw, json!({"favicon": "/f.ico", "siteName": "Shop"}));
    assert_eq!(
        store.get_setting("siteName").await.unwrap().as_deref(),
        Some("Shop")
    );
    assert_eq!(store.get_setting("logoText").await.unwrap(), None);
}

#[tokio::test]
async fn legacy_settings_rows_are_read() {
    let (store, _tmp) = create_test_store();
    store
        .write(
            SITE_SETTINGS_FILE,
            &json!([
                {"id": 1, "key": "siteName", "value": "Legacy", "updated_at": "2023-01-01"},
                {"id": 2, "key": "logoType", "value": null}
            ]),
        )
        .await;

    let settings = store.get_all_settings().await.unwrap();
    assert_eq!(settings["siteName"], "Legacy");
    assert_eq!(settings["logoType"], "");

    store.set_setting("favicon", "/f.ico").await.unwrap();
    let raw = store.read(SITE_SETTINGS_FILE, Value::Null).await;
    assert!(raw.is_object());
    assert_eq!(raw["siteName"], "Legacy");
}
