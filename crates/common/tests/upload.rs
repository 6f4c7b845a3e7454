//! Integration tests for document upload and container resolution

mod common;

use ::common::prelude::*;
use ::common::store::StoreOperation;

#[tokio::test]
async fn test_container_resolution_is_stable() {
    let env = common::setup_test_env().await;
    let pod = env.alice.pod();

    let first = resolve_container_url(pod, &common::doc_type("passport"), &Scope::Own).unwrap();
    let second = resolve_container_url(pod, &common::doc_type("passport"), &Scope::Own).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.as_str(), "https://alice.example/passport/");

    // resolution never touches the store
    assert!(!env.store.exists(&first));
}

#[tokio::test]
async fn test_upload_populates_container() {
    let env = common::setup_test_env().await;

    let stored = env
        .manager
        .upload_document(&env.alice, &common::passport_file())
        .await
        .unwrap();
    assert_eq!(stored.container.as_str(), "https://alice.example/passport/");
    assert_eq!(
        stored.binary.as_str(),
        "https://alice.example/passport/passport.pdf"
    );
    assert_eq!(
        stored.descriptor_url.as_str(),
        "https://alice.example/passport/passport.ttl"
    );

    // exactly one binary and one descriptor
    let under = env.store.urls_under(&stored.container);
    assert_eq!(under.len(), 3);

    let (document, content) = env
        .manager
        .read_document(&env.alice, &common::doc_type("passport"), &Scope::Own)
        .await
        .unwrap();
    assert_eq!(document.descriptor.identifier.as_str(), "passport");
    assert_eq!(document.descriptor.end_date, common::date(2024, 1, 1));
    assert_eq!(document.descriptor.description, "ID doc");
    assert_eq!(document.descriptor.subject, stored.binary);
    assert_eq!(&content.bytes[..], b"%PDF-1.7 passport");

    let fetched = env
        .manager
        .fetch_documents(&env.alice, &common::doc_type("passport"), &Scope::Own)
        .await
        .unwrap();
    assert_eq!(fetched.as_str(), "https://alice.example/passport/");
}

#[tokio::test]
async fn test_second_upload_is_rejected_and_changes_nothing() {
    let env = common::setup_test_env().await;
    env.manager
        .upload_document(&env.alice, &common::passport_file())
        .await
        .unwrap();

    let replacement = common::file(
        "passport",
        "other.pdf",
        b"something else",
        common::date(2030, 1, 1),
        "replacement",
    );
    let result = env.manager.upload_document(&env.alice, &replacement).await;
    assert!(matches!(result, Err(DocumentError::AlreadyExists(_))));

    let (document, content) = env
        .manager
        .read_document(&env.alice, &common::doc_type("passport"), &Scope::Own)
        .await
        .unwrap();
    assert_eq!(&content.bytes[..], b"%PDF-1.7 passport");
    assert_eq!(document.descriptor.name, "passport.pdf");
    assert_eq!(document.descriptor.end_date, common::date(2024, 1, 1));
    assert_eq!(
        env.store
            .urls_under(&common::url("https://alice.example/passport/"))
            .len(),
        3
    );
}

#[tokio::test]
async fn test_concurrent_uploads_create_once() {
    let env = common::setup_test_env().await;
    let first = common::passport_file();
    let second = common::file(
        "passport",
        "scan.pdf",
        b"second",
        common::date(2025, 1, 1),
        "",
    );

    let (a, b) = tokio::join!(
        env.manager.upload_document(&env.alice, &first),
        env.manager.upload_document(&env.alice, &second),
    );
    let outcomes = [a, b];
    let created = outcomes.iter().filter(|result| result.is_ok()).count();
    let rejected = outcomes
        .iter()
        .filter(|result| matches!(result, Err(DocumentError::AlreadyExists(_))))
        .count();
    assert_eq!(created, 1);
    assert_eq!(rejected, 1);
    assert_eq!(
        env.store
            .urls_under(&common::url("https://alice.example/passport/"))
            .len(),
        3
    );
}

#[tokio::test]
async fn test_losing_the_create_race_is_already_exists() {
    let env = common::setup_test_env().await;
    let container = common::url("https://alice.example/passport/");
    // another writer creates the container between our probe and create
    env.store
        .fail_next(
            StoreOperation::CreateContainer,
            StoreError::AlreadyExists(container.clone()),
        )
        .unwrap();

    let result = env.manager.upload_document(&env.alice, &common::passport_file()).await;
    assert!(matches!(result, Err(DocumentError::AlreadyExists(existing)) if existing == container));
}

#[tokio::test]
async fn test_upload_into_existing_empty_container() {
    let env = common::setup_test_env().await;
    let container = common::url("https://alice.example/passport/");
    env.alice.store().create_container(&container).await.unwrap();

    let stored = env
        .manager
        .upload_document(&env.alice, &common::passport_file())
        .await
        .unwrap();
    assert_eq!(stored.container, container);
}

#[tokio::test]
async fn test_uploaded_container_is_private_to_its_owner() {
    let env = common::setup_test_env().await;
    env.manager
        .upload_document(&env.alice, &common::passport_file())
        .await
        .unwrap();

    let grants = env
        .manager
        .list_permissions(&env.alice, &common::doc_type("passport"))
        .await
        .unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].grantee, common::alice_id());
    assert_eq!(grants[0].modes, AccessModes::full());

    let result = env
        .manager
        .locate_remote_document(&env.bob, &common::doc_type("passport"), "alice.example")
        .await;
    assert!(matches!(result, Err(DocumentError::DocumentNotFound(_))));
}

#[tokio::test]
async fn test_descriptor_names_cannot_be_uploaded() {
    let env = common::setup_test_env().await;
    let sneaky = common::file("passport", "passport.ttl", b"x", common::date(2024, 1, 1), "");

    let result = env.manager.upload_document(&env.alice, &sneaky).await;
    assert!(matches!(result, Err(DocumentError::InvalidFileName(_))));
    assert!(!env.store.exists(&common::url("https://alice.example/passport/")));
}
