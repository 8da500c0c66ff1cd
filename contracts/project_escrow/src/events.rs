//! # Events
//!
//! Every event is published with a `(symbol, project_id)` topic pair and a
//! typed payload:
//!
//! | Topic       | Payload              |
//! |-------------|----------------------|
//! | `created`   | [`ProjectCreated`]   |
//! | `donated`   | [`DonationReceived`] |
//! | `released`  | [`MilestoneReleased`]|
//! | `completed` | [`ProjectCompleted`] |
//! | `cancelled` | [`ProjectCancelled`] |
//! | `refunded`  | [`RefundClaimed`]    |
//!
//! Events are emitted only after all state for the call has been written.

use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Vec};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectCreated {
    pub project_id: u64,
    pub recipient: Address,
    pub descriptions: Vec<String>,
    pub amounts: Vec<i128>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DonationReceived {
    pub project_id: u64,
    pub donor: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MilestoneReleased {
    pub project_id: u64,
    pub milestone_index: u32,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectCompleted {
    pub project_id: u64,
    pub total_released: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectCancelled {
    pub project_id: u64,
    pub cancelled_by: Address,
    pub escrowed: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundClaimed {
    pub project_id: u64,
    pub donor: Address,
    pub amount: i128,
}

pub fn emit_project_created(
    env: &Env,
    project_id: u64,
    recipient: Address,
    descriptions: Vec<String>,
    amounts: Vec<i128>,
) {
    env.events().publish(
        (symbol_short!("created"), project_id),
        ProjectCreated {
            project_id,
            recipient,
            descriptions,
            amounts,
        },
    );
}

pub fn emit_donation_received(env: &Env, project_id: u64, donor: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("donated"), project_id),
        DonationReceived {
            project_id,
            donor,
            amount,
        },
    );
}

pub fn emit_milestone_released(env: &Env, project_id: u64, milestone_index: u32, amount: i128) {
    env.events().publish(
        (symbol_short!("released"), project_id),
        MilestoneReleased {
            project_id,
            milestone_index,
            amount,
        },
    );
}

pub fn emit_project_completed(env: &Env, project_id: u64, total_released: i128) {
    env.events().publish(
        (symbol_short!("completed"), project_id),
        ProjectCompleted {
            project_id,
            total_released,
        },
    );
}

pub fn emit_project_cancelled(env: &Env, project_id: u64, cancelled_by: Address, escrowed: i128) {
    env.events().publish(
        (symbol_short!("cancelled"), project_id),
        ProjectCancelled {
            project_id,
            cancelled_by,
            escrowed,
        },
    );
}

pub fn emit_refund_claimed(env: &Env, project_id: u64, donor: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("refunded"), project_id),
        RefundClaimed {
            project_id,
            donor,
            amount,
        },
    );
}
