#![allow(dead_code)]

extern crate std;

use crate::types::{Project, ProjectState};

/// INV-1: the goal equals the sum of the milestone amounts.
pub fn assert_total_matches_milestones(project: &Project) {
    let sum: i128 = project.milestones.iter().map(|m| m.amount).sum();
    assert_eq!(
        project.total_amount, sum,
        "INV-1 violated: project {} total {} != milestone sum {}",
        project.id, project.total_amount, sum
    );
}

/// INV-2: raised funds stay within `[0, total_amount]`.
pub fn assert_funds_within_goal(project: &Project) {
    assert!(
        project.funds_raised >= 0 && project.funds_raised <= project.total_amount,
        "INV-2 violated: project {} raised {} outside [0, {}]",
        project.id,
        project.funds_raised,
        project.total_amount
    );
}

/// INV-3: the escrow never goes negative.
pub fn assert_escrow_non_negative(project: &Project) {
    let escrowed = project.funds_raised - project.funds_released - project.funds_refunded;
    assert!(
        escrowed >= 0,
        "INV-3 violated: project {} escrow is {}",
        project.id,
        escrowed
    );
}

/// INV-4: `funds_released` is exactly the sum of released milestones.
pub fn assert_released_matches_milestones(project: &Project) {
    let released: i128 = project
        .milestones
        .iter()
        .filter(|m| m.released)
        .map(|m| m.amount)
        .sum();
    assert_eq!(
        project.funds_released, released,
        "INV-4 violated: project {} released {} != released milestone sum {}",
        project.id, project.funds_released, released
    );
}

/// INV-5: a completed project has released every milestone.
pub fn assert_completed_fully_released(project: &Project) {
    if project.state == ProjectState::Completed {
        assert!(
            project.milestones.iter().all(|m| m.released),
            "INV-5 violated: project {} completed with unreleased milestones",
            project.id
        );
    }
}

/// INV-6: after a donation of `amount`, raised funds grow by exactly `amount`.
pub fn assert_donation_invariant(raised_before: i128, raised_after: i128, amount: i128) {
    assert_eq!(
        raised_after,
        raised_before + amount,
        "INV-6 violated: donation invariant broken: {} + {} != {}",
        raised_before,
        amount,
        raised_after
    );
}

/// INV-7: project IDs are sequential starting from 0.
pub fn assert_sequential_ids(projects: &[Project]) {
    for (i, project) in projects.iter().enumerate() {
        assert_eq!(
            project.id, i as u64,
            "INV-7 violated: expected id {}, got {}",
            i, project.id
        );
    }
}

/// INV-8: only forward transitions out of `Active` are allowed.
pub fn assert_valid_state_transition(from: &ProjectState, to: &ProjectState) {
    let valid = from == to
        || matches!(
            (from, to),
            (ProjectState::Active, ProjectState::Completed)
                | (ProjectState::Active, ProjectState::Cancelled)
        );

    assert!(
        valid,
        "INV-8 violated: invalid state transition from {:?} to {:?}",
        from, to
    );
}

/// INV-9: fields fixed at creation never change.
pub fn assert_project_immutable_fields(original: &Project, current: &Project) {
    assert_eq!(original.id, current.id, "INV-9 violated: project id changed");
    assert_eq!(
        original.recipient, current.recipient,
        "INV-9 violated: project recipient changed"
    );
    assert_eq!(
        original.total_amount, current.total_amount,
        "INV-9 violated: project total_amount changed"
    );
    assert_eq!(
        original.milestones.len(),
        current.milestones.len(),
        "INV-9 violated: milestone count changed"
    );
    for (before, after) in original.milestones.iter().zip(current.milestones.iter()) {
        assert_eq!(
            before.description, after.description,
            "INV-9 violated: milestone description changed"
        );
        assert_eq!(
            before.amount, after.amount,
            "INV-9 violated: milestone amount changed"
        );
    }
}

/// Run all stateless project invariants.
pub fn assert_all_project_invariants(project: &Project) {
    assert_total_matches_milestones(project);
    assert_funds_within_goal(project);
    assert_escrow_non_negative(project);
    assert_released_matches_milestones(project);
    assert_completed_fully_released(project);
}
