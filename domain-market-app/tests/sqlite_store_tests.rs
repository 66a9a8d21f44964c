#![cfg(feature = "sqlite-store")]
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for `SqliteStore`: record traits, ordering, deletion
//! and self-heal of an unreadable database file.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use domain_market_app::adapters::{SqliteStore, DATABASE_FILE};
use domain_market_app::{SelfHealReport, StorageHooks};
use domain_market_core::error::CoreError;
use domain_market_core::traits::{
    CredentialRepository, MarketRepository, SettingsRepository, StorageBackend,
};
use domain_market_core::types::{
    Credential, Domain, DomainStatus, FriendlyLink, RecordKind, Registrar, SiteSettings,
    SoldDomain,
};
use domain_market_core::utils::datetime::file_stamp;

// ===== Helpers =====

async fn create_test_store() -> (SqliteStore, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let store = SqliteStore::new(tmp.path().join(DATABASE_FILE));
    store.initialize().await.expect("failed to initialize store");
    (store, tmp)
}

fn at(day: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
}

fn make_domain(id: &str, name: &str, featured: bool) -> Domain {
    Domain {
        id: id.to_string(),
        name: name.to_string(),
        extension: ".com".to_string(),
        status: DomainStatus::Available,
        registrar: Some("Namecheap".to_string()),
        price: Some("1200".to_string()),
        featured,
        created_at: Some(at(1)),
        updated_at: Some(at(2)),
        ..Domain::default()
    }
}

fn make_sold(id: &str, name: &str, sold_day: Option<u32>) -> SoldDomain {
    SoldDomain {
        id: id.to_string(),
        name: name.to_string(),
        extension: ".net".to_string(),
        buyer: Some("buyer".to_string()),
        sold_at: sold_day.map(at),
        created_at: Some(at(1)),
        updated_at: Some(at(1)),
        ..SoldDomain::default()
    }
}

fn make_link(id: &str, name: &str) -> FriendlyLink {
    FriendlyLink {
        id: id.to_string(),
        name: name.to_string(),
        url: format!("https://{name}.example"),
        description: format!("{name} site"),
        created_at: Some(at(1)),
        updated_at: Some(at(1)),
    }
}

/// Hooks that count recoveries.
#[derive(Default)]
struct CountingHooks {
    recovered: AtomicUsize,
}

#[async_trait]
impl StorageHooks for CountingHooks {
    async fn database_recovered(&self, _report: &SelfHealReport) {
        self.recovered.fetch_add(1, Ordering::SeqCst);
    }
}

// ===== Initialization =====

#[tokio::test]
async fn initialize_creates_file_and_is_idempotent() {
    let (store, tmp) = create_test_store().await;
    assert!(tmp.path().join(DATABASE_FILE).exists());
    store.initialize().await.unwrap();
    assert!(store.find_domains().await.unwrap().is_empty());
    assert!(store.get_credential().await.unwrap().is_none());
}

#[tokio::test]
async fn initialize_creates_missing_parent_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let store = SqliteStore::new(tmp.path().join("nested").join(DATABASE_FILE));
    store.initialize().await.unwrap();
    assert!(tmp.path().join("nested").join(DATABASE_FILE).exists());
}

// ===== CredentialRepository =====

#[tokio::test]
async fn credential_upsert_keeps_single_row() {
    let (store, _tmp) = create_test_store().await;

    let first = Credential::new("pbkdf2-sha256$1000$a$b".to_string(), "initial");
    store.save_credential(&first).await.unwrap();
    let second = Credential::new("pbkdf2-sha256$1000$c$d".to_string(), "42");
    store.save_credential(&second).await.unwrap();

    let stored = store.get_credential().await.unwrap().unwrap();
    assert_eq!(stored, second);
}

// ===== MarketRepository =====

#[tokio::test]
async fn domains_replace_then_find() {
    let (store, _tmp) = create_test_store().await;
    let domains = vec![
        make_domain("d1", "alpha", true),
        make_domain("d2", "beta", false),
        make_domain("d3", "gamma", false),
    ];

    store.replace_domains(&domains).await.unwrap();
    assert_eq!(store.find_domains().await.unwrap(), domains);
}

#[tokio::test]
async fn domains_featured_first_then_name() {
    let (store, _tmp) = create_test_store().await;
    store
        .replace_domains(&[
            make_domain("d1", "zulu", false),
            make_domain("d2", "yankee", true),
            make_domain("d3", "alpha", false),
        ])
        .await
        .unwrap();

    let names: Vec<String> = store
        .find_domains()
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, ["yankee", "alpha", "zulu"]);
}

#[tokio::test]
async fn replace_discards_previous_rows() {
    let (store, _tmp) = create_test_store().await;
    store
        .replace_domains(&[make_domain("d1", "alpha", false), make_domain("d2", "beta", false)])
        .await
        .unwrap();
    store
        .replace_domains(&[make_domain("d3", "gamma", false)])
        .await
        .unwrap();

    let domains = store.find_domains().await.unwrap();
    assert_eq!(domains.len(), 1);
    assert_eq!(domains[0].id, "d3");

    store.replace_domains(&[]).await.unwrap();
    assert!(store.find_domains().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_ids_roll_back_the_replace() {
    let (store, _tmp) = create_test_store().await;
    let original = vec![make_domain("d1", "alpha", false)];
    store.replace_domains(&original).await.unwrap();

    let result = store
        .replace_domains(&[make_domain("x", "one", false), make_domain("x", "two", false)])
        .await;
    assert!(result.is_err());
    assert_eq!(store.find_domains().await.unwrap(), original);
}

#[tokio::test]
async fn domain_status_and_dates_survive() {
    let (store, _tmp) = create_test_store().await;
    let mut domain = make_domain("d1", "sold-one", false);
    domain.status = DomainStatus::Sold;
    domain.sold_at = Some(at(20));
    domain.expires_at = Some(at(28));
    domain.buyer = Some("Acme".to_string());
    store
        .replace_domains(std::slice::from_ref(&domain))
        .await
        .unwrap();

    let stored = store.find_domains().await.unwrap().remove(0);
    assert_eq!(stored.status, DomainStatus::Sold);
    assert_eq!(stored.sold_at, Some(at(20)));
    assert_eq!(stored.expires_at, Some(at(28)));
    assert_eq!(stored.buyer.as_deref(), Some("Acme"));
}

#[tokio::test]
async fn sold_domains_newest_sale_first() {
    let (store, _tmp) = create_test_store().await;
    store
        .replace_sold_domains(&[
            make_sold("s1", "older", Some(3)),
            make_sold("s2", "undated", None),
            make_sold("s3", "newer", Some(9)),
        ])
        .await
        .unwrap();

    let ids: Vec<String> = store
        .find_sold_domains()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, ["s3", "s1", "s2"]);
}

#[tokio::test]
async fn friendly_links_keep_supplied_order() {
    let (store, _tmp) = create_test_store().await;
    let links = vec![
        make_link("l1", "zeta"),
        make_link("l2", "alpha"),
        make_link("l3", "mid"),
    ];
    store.replace_friendly_links(&links).await.unwrap();
    assert_eq!(store.find_friendly_links().await.unwrap(), links);
}

#[tokio::test]
async fn registrars_ordered_by_name() {
    let (store, _tmp) = create_test_store().await;
    let registrar = |name: &str| Registrar {
        name: name.to_string(),
        website: Some(format!("https://{name}.example")),
        created_at: Some(at(1)),
        updated_at: Some(at(1)),
        ..Registrar::default()
    };
    store
        .replace_registrars(&[registrar("Porkbun"), registrar("Dynadot")])
        .await
        .unwrap();

    let names: Vec<String> = store
        .find_registrars()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, ["Dynadot", "Porkbun"]);
}

#[tokio::test]
async fn missing_timestamps_are_stamped() {
    let (store, _tmp) = create_test_store().await;
    let mut link = make_link("l1", "plain");
    link.created_at = None;
    link.updated_at = None;
    store.replace_friendly_links(&[link]).await.unwrap();

    let stored = store.find_friendly_links().await.unwrap().remove(0);
    assert!(stored.created_at.is_some());
    assert!(stored.updated_at.is_some());
}

#[tokio::test]
async fn delete_record_by_kind() {
    let (store, _tmp) = create_test_store().await;
    store
        .replace_domains(&[make_domain("d1", "alpha", false), make_domain("d2", "beta", false)])
        .await
        .unwrap();
    store
        .replace_friendly_links(&[make_link("l1", "one")])
        .await
        .unwrap();

    assert!(store.delete_record(RecordKind::Domains, "d1").await.unwrap());
    assert!(!store.delete_record(RecordKind::Domains, "d1").await.unwrap());
    assert!(!store.delete_record(RecordKind::SoldDomains, "d2").await.unwrap());
    assert!(store
        .delete_record(RecordKind::FriendlyLinks, "l1")
        .await
        .unwrap());

    let remaining = store.find_domains().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "d2");
    assert!(store.find_friendly_links().await.unwrap().is_empty());
}

// ===== SettingsRepository =====

#[tokio::test]
async fn settings_upsert_per_key() {
    let (store, _tmp) = create_test_store().await;
    assert_eq!(store.get_setting("siteName").await.unwrap(), None);

    store.set_setting("siteName", "Domains R Us").await.unwrap();
    store.set_setting("siteName", "Domain Shop").await.unwrap();
    assert_eq!(
        store.get_setting("siteName").await.unwrap().as_deref(),
        Some("Domain Shop")
    );

    let mut batch = SiteSettings::new();
    batch.insert("logoType".to_string(), "text".to_string());
    batch.insert("favicon".to_string(), "/favicon.ico".to_string());
    store.set_all_settings(&batch).await.unwrap();

    let all = store.get_all_settings().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all["siteName"], "Domain Shop");
    assert_eq!(all["logoType"], "text");
}

// ===== Self-heal =====

#[tokio::test]
async fn garbage_file_is_copied_aside_and_recreated() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join(DATABASE_FILE);
    std::fs::write(&db_path, b"this is definitely not a database file").unwrap();

    let hooks = Arc::new(CountingHooks::default());
    let store = SqliteStore::with_hooks(&db_path, hooks.clone());
    store.initialize().await.unwrap();

    assert_eq!(hooks.recovered.load(Ordering::SeqCst), 1);
    let report = store.last_self_heal().await.expect("self-heal report");
    assert_eq!(report.database, db_path);
    let copy = report.corrupt_copy;
    assert!(copy
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("app-data-corrupt-"));
    assert_eq!(
        std::fs::read(&copy).unwrap(),
        b"this is definitely not a database file"
    );

    // The recreated database is usable and not healed again.
    store
        .replace_domains(&[make_domain("d1", "alpha", false)])
        .await
        .unwrap();
    assert_eq!(store.find_domains().await.unwrap().len(), 1);
    assert_eq!(hooks.recovered.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unreadable_file_is_kept_when_copy_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join(DATABASE_FILE);
    let garbage = b"still not a database, and cannot be copied";
    std::fs::write(&db_path, garbage).unwrap();

    // Occupy every copy-aside name for the next few seconds with a directory.
    let start = Utc::now();
    for ms in 0..5_000 {
        let stamp = file_stamp(start + chrono::Duration::milliseconds(ms));
        let _ = std::fs::create_dir(tmp.path().join(format!("app-data-corrupt-{stamp}.db")));
    }

    let hooks = Arc::new(CountingHooks::default());
    let store = SqliteStore::with_hooks(&db_path, hooks.clone());
    let err = store.initialize().await.unwrap_err();

    assert!(matches!(err, CoreError::StorageError(_)), "{err:?}");
    assert_eq!(std::fs::read(&db_path).unwrap(), garbage);
    assert_eq!(hooks.recovered.load(Ordering::SeqCst), 0);
    assert!(store.last_self_heal().await.is_none());
}

#[tokio::test]
async fn healthy_database_is_not_healed() {
    let (store, _tmp) = create_test_store().await;
    store
        .replace_domains(&[make_domain("d1", "alpha", false)])
        .await
        .unwrap();
    assert!(store.last_self_heal().await.is_none());
}
