//! Integration tests for granting and revoking read access

mod common;

use ::common::prelude::*;

fn entries_for(grants: &[AccessGrant], grantee: &WebId) -> Vec<AccessGrant> {
    grants
        .iter()
        .filter(|grant| &grant.grantee == grantee)
        .cloned()
        .collect()
}

#[tokio::test]
async fn test_give_then_revoke_keeps_one_entry() {
    let env = common::setup_test_env().await;
    let passport = common::doc_type("passport");
    env.manager
        .upload_document(&env.alice, &common::passport_file())
        .await
        .unwrap();

    let grant = env
        .manager
        .set_doc_acl_permission(&env.alice, &passport, GrantKind::Give, "bob.example")
        .await
        .unwrap();
    assert!(grant.read());
    assert_eq!(grant.grantee, common::bob_id());

    let grants = env
        .manager
        .list_permissions(&env.alice, &passport)
        .await
        .unwrap();
    let bob = entries_for(&grants, &common::bob_id());
    assert_eq!(bob.len(), 1);
    assert!(bob[0].read());

    // giving twice does not duplicate
    env.manager
        .set_doc_acl_permission(&env.alice, &passport, GrantKind::Give, "bob.example")
        .await
        .unwrap();
    env.manager
        .set_doc_acl_permission(
            &env.alice,
            &passport,
            GrantKind::Revoke,
            "https://bob.example/profile/card#me",
        )
        .await
        .unwrap();

    let grants = env
        .manager
        .list_permissions(&env.alice, &passport)
        .await
        .unwrap();
    let bob = entries_for(&grants, &common::bob_id());
    assert_eq!(bob.len(), 1);
    assert!(!bob[0].read());
    assert_eq!(bob[0].modes, AccessModes::NONE);

    // the owner keeps full control
    let alice = entries_for(&grants, &common::alice_id());
    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].modes, AccessModes::full());
}

#[tokio::test]
async fn test_grant_is_observed_by_the_grantee() {
    let env = common::setup_test_env().await;
    let passport = common::doc_type("passport");
    let alice_scope = Scope::Remote(common::alice_id());
    env.manager
        .upload_document(&env.alice, &common::passport_file())
        .await
        .unwrap();

    let denied = env
        .manager
        .read_document(&env.bob, &passport, &alice_scope)
        .await;
    assert!(matches!(denied, Err(DocumentError::PermissionDenied(_))));

    env.manager
        .set_doc_acl_permission(&env.alice, &passport, GrantKind::from("Give"), "bob.example")
        .await
        .unwrap();
    let (document, content) = env
        .manager
        .read_document(&env.bob, &passport, &alice_scope)
        .await
        .unwrap();
    assert_eq!(document.container.as_str(), "https://alice.example/passport/");
    assert_eq!(&content.bytes[..], b"%PDF-1.7 passport");

    // read only: bob cannot replace the file
    let overwrite = env
        .bob
        .store()
        .overwrite_binary(&document.binary, &Binary::new("text/plain", "mine"))
        .await;
    assert!(matches!(overwrite, Err(StoreError::Forbidden(_))));

    env.manager
        .set_doc_acl_permission(&env.alice, &passport, GrantKind::from("Revoke"), "bob.example")
        .await
        .unwrap();
    let denied = env
        .manager
        .read_document(&env.bob, &passport, &alice_scope)
        .await;
    assert!(matches!(denied, Err(DocumentError::PermissionDenied(_))));
}

#[tokio::test]
async fn test_unknown_grant_kinds_revoke() {
    let env = common::setup_test_env().await;
    let passport = common::doc_type("passport");
    env.manager
        .upload_document(&env.alice, &common::passport_file())
        .await
        .unwrap();
    env.manager
        .set_doc_acl_permission(&env.alice, &passport, GrantKind::Give, "bob.example")
        .await
        .unwrap();

    let grant = env
        .manager
        .set_doc_acl_permission(
            &env.alice,
            &passport,
            GrantKind::from_input(Some("share")),
            "bob.example",
        )
        .await
        .unwrap();
    assert!(!grant.read());
}

#[tokio::test]
async fn test_invalid_targets() {
    let env = common::setup_test_env().await;
    let passport = common::doc_type("passport");
    env.manager
        .upload_document(&env.alice, &common::passport_file())
        .await
        .unwrap();

    let result = env
        .manager
        .set_doc_acl_permission(&env.alice, &passport, GrantKind::Give, "not a user")
        .await;
    assert!(matches!(result, Err(DocumentError::TargetNotFound(_))));

    let result = env
        .manager
        .set_doc_acl_permission(&env.alice, &passport, GrantKind::Revoke, "alice.example")
        .await;
    assert!(matches!(result, Err(DocumentError::SelfGrant(_))));

    let grants = env
        .manager
        .list_permissions(&env.alice, &passport)
        .await
        .unwrap();
    assert_eq!(grants.len(), 1);
}

#[tokio::test]
async fn test_permission_on_missing_container() {
    let env = common::setup_test_env().await;

    let result = env
        .manager
        .set_doc_acl_permission(
            &env.alice,
            &common::doc_type("passport"),
            GrantKind::Give,
            "bob.example",
        )
        .await;
    assert!(matches!(result, Err(DocumentError::DocumentNotFound(_))));
}

#[tokio::test]
async fn test_only_the_controller_may_change_permissions() {
    let env = common::setup_test_env().await;
    env.manager
        .upload_document(&env.alice, &common::passport_file())
        .await
        .unwrap();

    // bob acting on alice's store
    let intruder = Session::new(
        common::bob_id(),
        common::url("https://alice.example/"),
        env.store.as_agent(&common::bob_id()),
    );
    let result = env
        .manager
        .set_doc_acl_permission(
            &intruder,
            &common::doc_type("passport"),
            GrantKind::Give,
            "carol.example",
        )
        .await;
    assert!(matches!(result, Err(DocumentError::PermissionDenied(_))));
}

#[tokio::test]
async fn test_first_grant_keeps_the_owner() {
    let env = common::setup_test_env().await;
    let passport = common::doc_type("passport");
    let container = common::url("https://alice.example/passport/");
    // a container that never got its own access control
    env.alice.store().create_container(&container).await.unwrap();
    assert!(env
        .manager
        .list_permissions(&env.alice, &passport)
        .await
        .unwrap()
        .is_empty());

    env.manager
        .set_doc_acl_permission(&env.alice, &passport, GrantKind::Give, "bob.example")
        .await
        .unwrap();

    let grants = env
        .manager
        .list_permissions(&env.alice, &passport)
        .await
        .unwrap();
    assert_eq!(grants.len(), 2);
    assert_eq!(
        entries_for(&grants, &common::alice_id())[0].modes,
        AccessModes::full()
    );
    // the owner can still work in the container
    env.manager
        .upload_document(&env.alice, &common::passport_file())
        .await
        .unwrap();
}
