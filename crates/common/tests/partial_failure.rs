//! Integration tests for failures part-way through an operation

mod common;

use ::common::prelude::*;

#[tokio::test]
async fn test_binary_without_descriptor_is_detected() {
    let env = common::setup_test_env().await;
    let passport = common::doc_type("passport");
    env.store
        .fail_next(
            StoreOperation::SaveDataset,
            StoreError::Transport("connection reset".to_string()),
        )
        .unwrap();

    let result = env
        .manager
        .upload_document(&env.alice, &common::passport_file())
        .await;
    assert!(matches!(
        result,
        Err(DocumentError::NetworkFailure(StoreError::Transport(_)))
    ));

    let binary = common::url("https://alice.example/passport/passport.pdf");
    assert!(env.store.exists(&binary));

    // the half-written container is reported, not treated as absent
    let retry = env
        .manager
        .upload_document(&env.alice, &common::passport_file())
        .await;
    match retry {
        Err(DocumentError::InconsistentContainer(container, inconsistency)) => {
            assert_eq!(container.as_str(), "https://alice.example/passport/");
            assert_eq!(inconsistency, Inconsistency::MissingDescriptor(binary.clone()));
        }
        other => panic!("expected an inconsistent container, got {:?}", other),
    }

    let read = env
        .manager
        .read_document(&env.alice, &passport, &Scope::Own)
        .await;
    assert!(matches!(
        read,
        Err(DocumentError::InconsistentContainer(_, _))
    ));
    let update = env
        .manager
        .update_document(&env.alice, &common::passport_file())
        .await;
    assert!(matches!(
        update,
        Err(DocumentError::InconsistentContainer(_, _))
    ));

    // nothing was repaired along the way
    assert_eq!(
        env.store
            .urls_under(&common::url("https://alice.example/passport/"))
            .len(),
        2
    );

    // clearing the container lets the upload through
    env.manager.delete_document(&env.alice, &passport).await.unwrap();
    env.manager
        .upload_document(&env.alice, &common::passport_file())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_descriptor_for_another_binary_is_detected() {
    let env = common::setup_test_env().await;
    let stored = env
        .manager
        .upload_document(&env.alice, &common::passport_file())
        .await
        .unwrap();

    let mut descriptor = stored.descriptor.clone();
    descriptor.subject = common::url("https://alice.example/elsewhere/passport.pdf");
    env.store
        .save_dataset(&stored.descriptor_url, &descriptor.to_dataset())
        .await
        .unwrap();

    let result = env
        .manager
        .read_document(&env.alice, &common::doc_type("passport"), &Scope::Own)
        .await;
    assert!(matches!(
        result,
        Err(DocumentError::InconsistentContainer(
            _,
            Inconsistency::Mismatch { .. }
        ))
    ));
}

#[tokio::test]
async fn test_failed_deletions_are_aggregated() {
    let env = common::setup_test_env().await;
    let passport = common::doc_type("passport");
    let stored = env
        .manager
        .upload_document(&env.alice, &common::passport_file())
        .await
        .unwrap();
    env.store
        .fail_next(
            StoreOperation::DeleteResource,
            StoreError::Timeout("deadline elapsed".to_string()),
        )
        .unwrap();

    let result = env.manager.delete_document_file(&env.alice, &passport).await;
    match result {
        Err(DocumentError::DeletionFailed { container, failures }) => {
            assert_eq!(container, stored.container);
            assert_eq!(failures.len(), 1);
            assert!(matches!(failures[0].1, StoreError::Timeout(_)));
        }
        other => panic!("expected aggregated deletion failure, got {:?}", other),
    }
    // every other deletion still ran to completion
    assert_eq!(env.store.urls_under(&stored.container).len(), 2);

    let result = env
        .manager
        .delete_document_container(&env.alice, &stored.container)
        .await;
    assert!(matches!(result, Err(DocumentError::ContainerNotEmpty(_))));

    env.manager
        .delete_document_file(&env.alice, &passport)
        .await
        .unwrap();
    env.manager
        .delete_document_container(&env.alice, &stored.container)
        .await
        .unwrap();
    assert!(env.store.urls_under(&stored.container).is_empty());
}

#[tokio::test]
async fn test_timeouts_surface_as_network_failures() {
    let env = common::setup_test_env().await;
    env.store
        .fail_next(
            StoreOperation::GetDataset,
            StoreError::Timeout("deadline elapsed".to_string()),
        )
        .unwrap();

    let result = env
        .manager
        .fetch_documents(&env.alice, &common::doc_type("passport"), &Scope::Own)
        .await;
    assert!(matches!(
        result,
        Err(DocumentError::NetworkFailure(StoreError::Timeout(_)))
    ));

    // once the store answers again the probe is an ordinary miss
    let result = env
        .manager
        .fetch_documents(&env.alice, &common::doc_type("passport"), &Scope::Own)
        .await;
    assert!(matches!(result, Err(DocumentError::DocumentNotFound(_))));
}

#[tokio::test]
async fn test_rejected_access_control_write() {
    let env = common::setup_test_env().await;
    let stored = env
        .manager
        .upload_document(&env.alice, &common::passport_file())
        .await
        .unwrap();
    env.store
        .fail_next(
            StoreOperation::SaveAccessControl,
            StoreError::Forbidden(stored.container.clone()),
        )
        .unwrap();

    let result = env
        .manager
        .set_doc_acl_permission(
            &env.alice,
            &common::doc_type("passport"),
            GrantKind::Give,
            "bob.example",
        )
        .await;
    assert!(matches!(result, Err(DocumentError::PermissionDenied(_))));

    let grants = env
        .manager
        .list_permissions(&env.alice, &common::doc_type("passport"))
        .await
        .unwrap();
    assert!(grants.iter().all(|grant| grant.grantee != common::bob_id()));
}
