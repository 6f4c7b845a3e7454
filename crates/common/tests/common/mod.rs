//! Shared test utilities for document integration tests
#![allow(dead_code)]

use chrono::NaiveDate;
use common::prelude::*;
use url::Url;

/// Two provisioned pods on one in-memory store.
pub struct TestEnv {
    /// Administrative handle; bypasses access control
    pub store: MemoryStore,
    pub alice: Session<MemoryStore>,
    pub bob: Session<MemoryStore>,
    pub manager: DocumentManager,
}

pub fn alice_id() -> WebId {
    WebId::parse_target("https://alice.example/profile/card#me").unwrap()
}

pub fn bob_id() -> WebId {
    WebId::parse_target("https://bob.example/profile/card#me").unwrap()
}

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn doc_type(s: &str) -> DocumentType {
    DocumentType::new(s).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Set up alice and bob, each owning a pod at the root of their host.
pub async fn setup_test_env() -> TestEnv {
    init_tracing();
    let store = MemoryStore::new();
    store
        .provision_pod(&alice_id(), &url("https://alice.example/"), Some("Alice"))
        .unwrap();
    store
        .provision_pod(&bob_id(), &url("https://bob.example/"), Some("Bob"))
        .unwrap();

    let alice = Session::connect(alice_id(), store.as_agent(&alice_id()))
        .await
        .unwrap();
    let bob = Session::connect(bob_id(), store.as_agent(&bob_id()))
        .await
        .unwrap();

    TestEnv {
        store,
        alice,
        bob,
        manager: DocumentManager::new(),
    }
}

pub fn file(
    doc_type: &str,
    name: &str,
    content: &[u8],
    end_date: NaiveDate,
    description: &str,
) -> FileObject {
    FileObject {
        doc_type: self::doc_type(doc_type),
        name: name.to_string(),
        content: Binary::new("application/pdf", content.to_vec()),
        end_date,
        description: description.to_string(),
    }
}

pub fn passport_file() -> FileObject {
    file(
        "passport",
        "passport.pdf",
        b"%PDF-1.7 passport",
        date(2024, 1, 1),
        "ID doc",
    )
}
