//! Integration tests for the assignment service's write invariants.

mod common;

use std::collections::BTreeSet;

use uuid::Uuid;
use warden_core::WardenError;

fn set(codes: &[&str]) -> BTreeSet<String> {
    codes.iter().map(|c| (*c).into()).collect()
}

#[tokio::test]
async fn assignments_validate_referenced_entities_first() {
    let h = common::setup().await;
    let actor = Uuid::new_v4();
    let user = Uuid::new_v4();

    let err = h
        .service
        .assign_ability(actor, user, "no-such-domain", "manage-orders")
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::NotFound { .. }), "{err:?}");

    let err = h
        .service
        .assign_ability(actor, user, "store-a", "no-such-ability")
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::NotFound { .. }), "{err:?}");

    let err = h
        .service
        .assign_permission_override(actor, user, "store-a", "no:such-permission", true)
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::NotFound { .. }), "{err:?}");

    // Fail-fast means nothing was written.
    assert!(
        h.service
            .list_ability_codes(user, "store-a")
            .await
            .unwrap()
            .is_empty()
    );
    assert!(!h.engine.has_domain_access(user, "store-a").await.unwrap());
}

#[tokio::test]
async fn regrant_is_idempotent() {
    let h = common::setup().await;
    let actor = Uuid::new_v4();
    let user = Uuid::new_v4();

    for _ in 0..2 {
        h.service
            .assign_ability(actor, user, "store-a", "manage-orders")
            .await
            .unwrap();
    }

    assert_eq!(
        h.service.list_ability_codes(user, "store-a").await.unwrap(),
        set(&["manage-orders"])
    );
}

#[tokio::test]
async fn regrant_after_revocation_reactivates_the_row() {
    let h = common::setup().await;
    let actor = Uuid::new_v4();
    let user = Uuid::new_v4();

    h.service
        .assign_ability(actor, user, "store-a", "manage-orders")
        .await
        .unwrap();
    h.service
        .revoke_ability(actor, user, "store-a", "manage-orders")
        .await
        .unwrap();
    h.service
        .assign_ability(actor, user, "store-a", "manage-orders")
        .await
        .unwrap();

    assert!(
        h.engine
            .has_ability(user, "store-a", "manage-orders")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn set_single_role_revokes_every_other_role() {
    let h = common::setup().await;
    let actor = Uuid::new_v4();
    let user = Uuid::new_v4();

    h.service
        .assign_ability(actor, user, "store-a", "manage-customers")
        .await
        .unwrap();
    h.service
        .set_single_role(actor, user, "store-a", "manage-orders")
        .await
        .unwrap();

    assert_eq!(
        h.service.list_ability_codes(user, "store-a").await.unwrap(),
        set(&["manage-orders"])
    );

    // Roles in other domains are untouched.
    h.service
        .assign_ability(actor, user, "store-b", "manage-customers")
        .await
        .unwrap();
    h.service
        .set_single_role(actor, user, "store-a", "manage-customers")
        .await
        .unwrap();
    assert_eq!(
        h.service.list_ability_codes(user, "store-b").await.unwrap(),
        set(&["manage-customers"])
    );
}

#[tokio::test]
async fn set_single_role_is_a_noop_when_already_sole_role() {
    let h = common::setup().await;
    let actor = Uuid::new_v4();
    let user = Uuid::new_v4();

    h.service
        .assign_ability(actor, user, "store-a", "manage-orders")
        .await
        .unwrap();
    h.service
        .set_single_role(actor, user, "store-a", "manage-orders")
        .await
        .unwrap();

    assert_eq!(
        h.service.list_ability_codes(user, "store-a").await.unwrap(),
        set(&["manage-orders"])
    );
}

#[tokio::test]
async fn revoking_a_missing_grant_is_not_found() {
    let h = common::setup().await;
    let actor = Uuid::new_v4();

    let err = h
        .service
        .revoke_ability(actor, Uuid::new_v4(), "store-a", "manage-orders")
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::NotFound { .. }), "{err:?}");
}

#[tokio::test]
async fn sole_super_admin_cannot_revoke_themselves() {
    let h = common::setup().await;
    let bootstrap = Uuid::new_v4();
    let admin = Uuid::new_v4();

    h.service
        .assign_ability(bootstrap, admin, "store-a", "super-admin")
        .await
        .unwrap();

    let err = h
        .service
        .revoke_ability(admin, admin, "store-a", "super-admin")
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::InvalidState { .. }), "{err:?}");

    // Still in place.
    assert!(
        h.engine
            .has_ability(admin, "store-a", "super-admin")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn self_revocation_succeeds_with_a_second_super_admin() {
    let h = common::setup().await;
    let bootstrap = Uuid::new_v4();
    let admin = Uuid::new_v4();
    let second = Uuid::new_v4();

    h.service
        .assign_ability(bootstrap, admin, "store-a", "super-admin")
        .await
        .unwrap();
    h.service
        .assign_ability(bootstrap, second, "store-a", "super-admin")
        .await
        .unwrap();

    h.service
        .revoke_ability(admin, admin, "store-a", "super-admin")
        .await
        .unwrap();

    assert!(
        !h.engine
            .has_ability(admin, "store-a", "super-admin")
            .await
            .unwrap()
    );
    assert!(
        h.engine
            .has_ability(second, "store-a", "super-admin")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn lockout_guard_is_domain_scoped() {
    let h = common::setup().await;
    let bootstrap = Uuid::new_v4();
    let admin = Uuid::new_v4();

    h.service
        .assign_ability(bootstrap, admin, "store-a", "super-admin")
        .await
        .unwrap();
    h.service
        .assign_ability(bootstrap, admin, "store-b", "super-admin")
        .await
        .unwrap();

    // A super-admin grant in store-b does not unlock store-a.
    let err = h
        .service
        .revoke_ability(admin, admin, "store-a", "super-admin")
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::InvalidState { .. }), "{err:?}");
}

#[tokio::test]
async fn guard_does_not_apply_to_third_party_revocations() {
    let h = common::setup().await;
    let bootstrap = Uuid::new_v4();
    let admin = Uuid::new_v4();

    h.service
        .assign_ability(bootstrap, admin, "store-a", "super-admin")
        .await
        .unwrap();

    // A different actor may strip the sole super-admin.
    h.service
        .revoke_ability(bootstrap, admin, "store-a", "super-admin")
        .await
        .unwrap();
    assert!(
        !h.engine
            .has_ability(admin, "store-a", "super-admin")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn revoke_all_abilities_spans_every_domain() {
    let h = common::setup().await;
    let actor = Uuid::new_v4();
    let user = Uuid::new_v4();
    let bystander = Uuid::new_v4();

    h.service
        .assign_ability(actor, user, "store-a", "manage-orders")
        .await
        .unwrap();
    h.service
        .assign_ability(actor, user, "store-b", "manage-customers")
        .await
        .unwrap();
    h.service
        .assign_ability(actor, bystander, "store-a", "manage-orders")
        .await
        .unwrap();

    h.service.revoke_all_abilities_for_user(user).await.unwrap();

    assert!(
        h.service
            .list_ability_codes(user, "store-a")
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        h.service
            .list_ability_codes(user, "store-b")
            .await
            .unwrap()
            .is_empty()
    );
    // Other users keep their grants.
    assert_eq!(
        h.service
            .list_ability_codes(bystander, "store-a")
            .await
            .unwrap(),
        set(&["manage-orders"])
    );
}

#[tokio::test]
async fn revoke_all_catches_grants_added_after_the_first_sweep() {
    let h = common::setup().await;
    let actor = Uuid::new_v4();
    let user = Uuid::new_v4();

    h.service
        .assign_ability(actor, user, "store-a", "manage-orders")
        .await
        .unwrap();
    h.service.revoke_all_abilities_for_user(user).await.unwrap();

    // A grant written between lockouts is swept by the next call, and
    // running against an already-clean account stays a no-op.
    h.service
        .assign_ability(actor, user, "store-a", "manage-customers")
        .await
        .unwrap();
    h.service.revoke_all_abilities_for_user(user).await.unwrap();
    h.service.revoke_all_abilities_for_user(user).await.unwrap();

    assert!(
        h.service
            .list_ability_codes(user, "store-a")
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn service_performs_no_escalation_check() {
    let h = common::setup().await;
    let actor = Uuid::new_v4();
    let user = Uuid::new_v4();

    // The actor holds nothing, yet the mechanism accepts the grant.
    // The escalation policy is a caller obligation enforced through
    // the guard, not here.
    h.service
        .assign_ability(actor, user, "store-a", "manage-orders")
        .await
        .unwrap();
    assert!(
        h.engine
            .has_ability(user, "store-a", "manage-orders")
            .await
            .unwrap()
    );
}
