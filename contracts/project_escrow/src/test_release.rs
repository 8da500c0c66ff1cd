extern crate std;

use soroban_sdk::{testutils::Address as _, Address};

use crate::guard::ReentrancyGuard;
use crate::invariants::{assert_all_project_invariants, assert_valid_state_transition};
use crate::test::{Harness, UNIT};
use crate::storage::DataKey;
use crate::{Error, ProjectState, Role};

#[test]
fn test_admin_releases_milestone_to_recipient() {
    let h = Harness::new();
    let (id, recipient) = h.create(&["Wells", "Pumps"], &[UNIT, 2 * UNIT]);
    let donor = h.donor(3 * UNIT);
    h.client.donate(&id, &donor, &(3 * UNIT));

    h.client.release_milestone(&h.admin, &id, &0);

    let project = h.client.get_project(&id);
    assert!(project.milestones.get(0).unwrap().released);
    assert!(!project.milestones.get(1).unwrap().released);
    assert_eq!(project.funds_released, UNIT);
    assert_eq!(project.state, ProjectState::Active);
    assert_eq!(h.balance(&recipient), UNIT);
    assert_eq!(h.balance(&h.client.address), 2 * UNIT);
    assert_eq!(h.client.escrow_balance(&id), 2 * UNIT);
    assert_all_project_invariants(&project);
}

#[test]
fn test_releasing_every_milestone_completes_project() {
    let h = Harness::new();
    let (id, recipient) = h.create(&["Wells", "Pumps"], &[UNIT, 2 * UNIT]);
    let donor = h.donor(3 * UNIT);
    h.client.donate(&id, &donor, &(3 * UNIT));

    h.client.release_milestone(&h.admin, &id, &1);
    h.client.release_milestone(&h.admin, &id, &0);

    let project = h.client.get_project(&id);
    assert_valid_state_transition(&ProjectState::Active, &project.state);
    assert_eq!(project.state, ProjectState::Completed);
    assert_eq!(project.funds_released, 3 * UNIT);
    assert_eq!(h.balance(&recipient), 3 * UNIT);
    assert_eq!(h.balance(&h.client.address), 0);
    assert_all_project_invariants(&project);

    let late = h.donor(1);
    assert_eq!(
        h.client.try_donate(&id, &late, &1),
        Err(Ok(Error::ProjectNotActive))
    );
    assert_eq!(
        h.client.try_release_milestone(&h.admin, &id, &0),
        Err(Ok(Error::ProjectNotActive))
    );
}

#[test]
fn test_partial_funding_releases_only_covered_milestones() {
    let h = Harness::new();
    let (id, _) = h.create(&["A", "B"], &[400, 600]);
    let donor = h.donor(500);
    h.client.donate(&id, &donor, &500);

    assert_eq!(
        h.client.try_release_milestone(&h.admin, &id, &1),
        Err(Ok(Error::InsufficientEscrow))
    );
    h.client.release_milestone(&h.admin, &id, &0);
    assert_eq!(h.client.escrow_balance(&id), 100);

    let project = h.client.get_project(&id);
    assert_eq!(project.funds_released, 400);
    assert!(!project.milestones.get(1).unwrap().released);
}

#[test]
fn test_release_rejects_bad_requests() {
    let h = Harness::new();
    let (id, _) = h.create(&["A", "B"], &[100, 100]);
    let donor = h.donor(200);
    h.client.donate(&id, &donor, &200);

    assert_eq!(
        h.client.try_release_milestone(&h.admin, &7, &0),
        Err(Ok(Error::ProjectNotFound))
    );
    assert_eq!(
        h.client.try_release_milestone(&h.admin, &id, &2),
        Err(Ok(Error::MilestoneNotFound))
    );

    h.client.release_milestone(&h.admin, &id, &0);
    assert_eq!(
        h.client.try_release_milestone(&h.admin, &id, &0),
        Err(Ok(Error::MilestoneAlreadyReleased))
    );
    assert_eq!(h.client.get_project(&id).funds_released, 100);
}

#[test]
fn test_only_authorized_callers_release() {
    let h = Harness::new();
    let (id, recipient) = h.create(&["A"], &[100]);
    let donor = h.donor(100);
    h.client.donate(&id, &donor, &100);

    let stranger = Address::generate(&h.env);
    assert_eq!(
        h.client.try_release_milestone(&stranger, &id, &0),
        Err(Ok(Error::NotAuthorized))
    );
    assert_eq!(
        h.client.try_release_milestone(&recipient, &id, &0),
        Err(Ok(Error::NotAuthorized))
    );
    assert_eq!(h.client.get_project(&id).funds_released, 0);
}

#[test]
fn test_verifier_can_release_until_revoked() {
    let h = Harness::new();
    let (id, _) = h.create(&["A", "B"], &[100, 100]);
    let donor = h.donor(200);
    h.client.donate(&id, &donor, &200);

    let verifier = Address::generate(&h.env);
    h.client.set_verifier(&h.admin, &verifier);
    assert_eq!(h.client.role_of(&verifier), Some(Role::Verifier));

    h.client.release_milestone(&verifier, &id, &0);

    h.client.revoke_role(&h.admin, &verifier);
    assert_eq!(h.client.role_of(&verifier), None);
    assert_eq!(
        h.client.try_release_milestone(&verifier, &id, &1),
        Err(Ok(Error::NotAuthorized))
    );
}

#[test]
fn test_role_management_rules() {
    let h = Harness::new();
    let verifier = Address::generate(&h.env);
    let stranger = Address::generate(&h.env);

    assert_eq!(h.client.role_of(&h.admin), Some(Role::Admin));
    assert_eq!(
        h.client.try_set_verifier(&stranger, &verifier),
        Err(Ok(Error::NotAuthorized))
    );
    assert_eq!(
        h.client.try_revoke_role(&h.admin, &h.admin),
        Err(Ok(Error::NotAuthorized))
    );
    assert_eq!(
        h.client.try_set_verifier(&h.admin, &h.admin),
        Err(Ok(Error::NotAuthorized))
    );
    assert_eq!(
        h.client.try_revoke_role(&h.admin, &stranger),
        Err(Ok(Error::RoleNotFound))
    );

    h.client.set_verifier(&h.admin, &verifier);
    assert_eq!(
        h.client.try_set_verifier(&verifier, &stranger),
        Err(Ok(Error::NotAuthorized))
    );
}

#[test]
fn test_zero_amount_milestone_releases_without_transfer() {
    let h = Harness::new();
    let (id, recipient) = h.create(&["Paperwork", "Build"], &[0, 50]);

    h.client.release_milestone(&h.admin, &id, &0);
    assert_eq!(h.balance(&recipient), 0);

    let donor = h.donor(50);
    h.client.donate(&id, &donor, &50);
    h.client.release_milestone(&h.admin, &id, &1);

    let project = h.client.get_project(&id);
    assert_eq!(project.state, ProjectState::Completed);
    assert_eq!(h.balance(&recipient), 50);
    assert_all_project_invariants(&project);
}

#[test]
fn test_reentrancy_lock_is_exclusive_and_released_on_drop() {
    let h = Harness::new();
    let (id, _) = h.create(&["A"], &[100]);

    h.env.as_contract(&h.client.address, || {
        let held = ReentrancyGuard::enter(&h.env).unwrap();
        assert_eq!(ReentrancyGuard::enter(&h.env).err(), Some(Error::Reentrant));
        drop(held);
        assert!(!h.env.storage().temporary().has(&DataKey::Lock));
        assert!(ReentrancyGuard::enter(&h.env).is_ok());
    });

    let donor = h.donor(100);
    h.client.donate(&id, &donor, &100);
    h.client.release_milestone(&h.admin, &id, &0);
    let locked = h
        .env
        .as_contract(&h.client.address, || h.env.storage().temporary().has(&DataKey::Lock));
    assert!(!locked);
    assert_eq!(Error::Reentrant.kind(), crate::ErrorKind::State);
}
