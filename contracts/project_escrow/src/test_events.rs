extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events},
    vec, Address, Env, IntoVal, Symbol, TryIntoVal, Val, Vec,
};

use crate::events::{
    DonationReceived, MilestoneReleased, ProjectCancelled, ProjectCompleted, ProjectCreated,
    RefundClaimed,
};
use crate::test::{Harness, UNIT};

/// Most recent event published by the escrow contract under `topic`.
fn last_event(h: &Harness, topic: Symbol) -> Option<(Vec<Val>, Val)> {
    let mut found = None;
    for (contract, event_topics, data) in h.env.events().all().iter() {
        if contract != h.client.address {
            continue;
        }
        let first: Option<Symbol> = event_topics
            .get(0)
            .and_then(|t| t.try_into_val(&h.env).ok());
        if first == Some(topic.clone()) {
            found = Some((event_topics, data));
        }
    }
    found
}

fn topics(env: &Env, name: Symbol, project_id: u64) -> Vec<Val> {
    vec![env, name.into_val(env), project_id.into_val(env)]
}

#[test]
fn test_project_created_event() {
    let h = Harness::new();
    let (descriptions, amounts) = h.milestones(&["Milestone 1", "Milestone 2"], &[UNIT, 2 * UNIT]);
    let ngo = Address::generate(&h.env);

    let id = h.client.create_project(&ngo, &descriptions, &amounts);

    let (event_topics, data) = last_event(&h, symbol_short!("created")).expect("no created event");
    assert_eq!(event_topics, topics(&h.env, symbol_short!("created"), id));
    let event: ProjectCreated = data.try_into_val(&h.env).unwrap();
    assert_eq!(
        event,
        ProjectCreated {
            project_id: 0,
            recipient: ngo,
            descriptions,
            amounts,
        }
    );
}

#[test]
fn test_donation_received_event() {
    let h = Harness::new();
    let (id, _) = h.create(&["Milestone 1"], &[UNIT]);
    let donor = h.donor(UNIT);

    h.client.donate(&id, &donor, &(UNIT / 2));

    let (event_topics, data) =
        last_event(&h, symbol_short!("donated")).expect("no donated event");
    assert_eq!(event_topics, topics(&h.env, symbol_short!("donated"), id));
    let event: DonationReceived = data.try_into_val(&h.env).unwrap();
    assert_eq!(
        event,
        DonationReceived {
            project_id: id,
            donor,
            amount: UNIT / 2,
        }
    );
}

#[test]
fn test_milestone_released_event() {
    let h = Harness::new();
    let (id, _) = h.create(&["A", "B"], &[100, 200]);
    let donor = h.donor(300);
    h.client.donate(&id, &donor, &300);

    h.client.release_milestone(&h.admin, &id, &1);

    let (event_topics, data) =
        last_event(&h, symbol_short!("released")).expect("no released event");
    assert_eq!(event_topics, topics(&h.env, symbol_short!("released"), id));
    let event: MilestoneReleased = data.try_into_val(&h.env).unwrap();
    assert_eq!(
        event,
        MilestoneReleased {
            project_id: id,
            milestone_index: 1,
            amount: 200,
        }
    );
    assert!(last_event(&h, symbol_short!("completed")).is_none());
}

#[test]
fn test_final_release_emits_completed() {
    let h = Harness::new();
    let (id, _) = h.create(&["A"], &[100]);
    let donor = h.donor(100);
    h.client.donate(&id, &donor, &100);

    h.client.release_milestone(&h.admin, &id, &0);

    let (_, data) = last_event(&h, symbol_short!("completed")).expect("no completed event");
    let event: ProjectCompleted = data.try_into_val(&h.env).unwrap();
    assert_eq!(
        event,
        ProjectCompleted {
            project_id: id,
            total_released: 100,
        }
    );
}

#[test]
fn test_cancel_and_refund_events() {
    let h = Harness::new();
    let (id, _) = h.create(&["A"], &[100]);
    let donor = h.donor(60);
    h.client.donate(&id, &donor, &60);

    h.client.cancel_project(&h.admin, &id);
    let (_, data) = last_event(&h, symbol_short!("cancelled")).expect("no cancelled event");
    let event: ProjectCancelled = data.try_into_val(&h.env).unwrap();
    assert_eq!(
        event,
        ProjectCancelled {
            project_id: id,
            cancelled_by: h.admin.clone(),
            escrowed: 60,
        }
    );

    h.client.claim_refund(&id, &donor);
    let (_, data) = last_event(&h, symbol_short!("refunded")).expect("no refunded event");
    let event: RefundClaimed = data.try_into_val(&h.env).unwrap();
    assert_eq!(
        event,
        RefundClaimed {
            project_id: id,
            donor,
            amount: 60,
        }
    );
}

#[test]
fn test_role_events() {
    let h = Harness::new();
    let verifier = Address::generate(&h.env);

    h.client.set_verifier(&h.admin, &verifier);
    let (event_topics, data) = last_event(&h, symbol_short!("role_set")).expect("no role_set");
    let expected: Vec<Val> = vec![
        &h.env,
        symbol_short!("role_set").into_val(&h.env),
        verifier.into_val(&h.env),
    ];
    assert_eq!(event_topics, expected);
    let by: Address = data.try_into_val(&h.env).unwrap();
    assert_eq!(by, h.admin);

    h.client.revoke_role(&h.admin, &verifier);
    assert!(last_event(&h, symbol_short!("role_del")).is_some());
}
