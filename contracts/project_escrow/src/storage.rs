//! # Storage
//!
//! Typed helpers over the three Soroban storage tiers used by the escrow.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key            | Type      | Description                        |
//! |----------------|-----------|------------------------------------|
//! | `ProjectCount` | `u64`     | Auto-increment project ID counter  |
//! | `Token`        | `Address` | Token contract holding the escrow  |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                      | Type            | Description                  |
//! |--------------------------|-----------------|------------------------------|
//! | `ProjConfig(id)`         | `ProjectConfig` | Immutable project definition |
//! | `ProjFunds(id)`          | `ProjectFunds`  | Mutable accounting           |
//! | `Contribution(id, addr)` | `i128`          | Refundable donor balance     |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.
//!
//! ## Temporary storage
//!
//! `Lock` is the reentrancy flag held by [`crate::guard::ReentrancyGuard`].
//! It never outlives the invocation that set it.
//!
//! Every loader returns `Option`; callers decide which error a missing entry
//! maps to.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::types::{Milestone, Project, ProjectConfig, ProjectFunds};

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Global auto-increment counter for project IDs (Instance).
    ProjectCount,
    /// Escrow token contract (Instance).
    Token,
    /// Immutable project configuration keyed by ID (Persistent).
    ProjConfig(u64),
    /// Mutable project accounting keyed by ID (Persistent).
    ProjFunds(u64),
    /// Outstanding contribution of a donor to a project (Persistent).
    Contribution(u64, Address),
    /// Reentrancy flag (Temporary).
    Lock,
}

// ── Instance Storage Helpers ─────────────────────────────────────────

pub(crate) fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Reads, increments, and stores the project counter.
/// Returns the ID to use for the *current* project (pre-increment value).
pub fn get_and_increment_project_id(env: &Env) -> u64 {
    bump_instance(env);
    let current = project_count(env);
    env.storage()
        .instance()
        .set(&DataKey::ProjectCount, &(current + 1));
    current
}

/// Number of projects ever created.
pub fn project_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::ProjectCount)
        .unwrap_or(0)
}

pub fn set_token(env: &Env, token: &Address) {
    env.storage().instance().set(&DataKey::Token, token);
    bump_instance(env);
}

/// The escrow token, or `None` before `init`.
pub fn get_token(env: &Env) -> Option<Address> {
    bump_instance(env);
    env.storage().instance().get(&DataKey::Token)
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Save the immutable config and the initial accounting for a new project.
pub fn save_project(env: &Env, config: &ProjectConfig, funds: &ProjectFunds) {
    let config_key = DataKey::ProjConfig(config.id);
    env.storage().persistent().set(&config_key, config);
    bump_persistent(env, &config_key);
    save_project_funds(env, config.id, funds);
}

pub fn load_project_config(env: &Env, id: u64) -> Option<ProjectConfig> {
    let key = DataKey::ProjConfig(id);
    let config: ProjectConfig = env.storage().persistent().get(&key)?;
    bump_persistent(env, &key);
    Some(config)
}

pub fn load_project_funds(env: &Env, id: u64) -> Option<ProjectFunds> {
    let key = DataKey::ProjFunds(id);
    let funds: ProjectFunds = env.storage().persistent().get(&key)?;
    bump_persistent(env, &key);
    Some(funds)
}

/// Load config and accounting together.
pub fn load_project_pair(env: &Env, id: u64) -> Option<(ProjectConfig, ProjectFunds)> {
    Some((load_project_config(env, id)?, load_project_funds(env, id)?))
}

/// Save only the mutable accounting entry.
pub fn save_project_funds(env: &Env, id: u64, funds: &ProjectFunds) {
    let key = DataKey::ProjFunds(id);
    env.storage().persistent().set(&key, funds);
    bump_persistent(env, &key);
}

/// Rebuild the public `Project` view from its two storage entries.
pub fn load_project(env: &Env, id: u64) -> Option<Project> {
    let (config, funds) = load_project_pair(env, id)?;
    Some(assemble_project(env, config, funds))
}

pub fn assemble_project(env: &Env, config: ProjectConfig, funds: ProjectFunds) -> Project {
    let mut milestones = Vec::new(env);
    for (i, description) in config.descriptions.iter().enumerate() {
        let i = i as u32;
        milestones.push_back(Milestone {
            description,
            amount: config.amounts.get(i).unwrap_or(0),
            released: funds.released.get(i).unwrap_or(false),
        });
    }

    Project {
        id: config.id,
        recipient: config.recipient,
        milestones,
        total_amount: config.total_amount,
        funds_raised: funds.funds_raised,
        funds_released: funds.funds_released,
        funds_refunded: funds.funds_refunded,
        state: funds.state,
    }
}

// ── Contributions ────────────────────────────────────────────────────

pub fn get_contribution(env: &Env, project_id: u64, donor: &Address) -> i128 {
    let key = DataKey::Contribution(project_id, donor.clone());
    let amount: Option<i128> = env.storage().persistent().get(&key);
    if amount.is_some() {
        bump_persistent(env, &key);
    }
    amount.unwrap_or(0)
}

pub fn set_contribution(env: &Env, project_id: u64, donor: &Address, amount: i128) {
    let key = DataKey::Contribution(project_id, donor.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &amount);
        bump_persistent(env, &key);
    }
}
