//! # Project Escrow Contract
//!
//! Milestone-based donation escrow. Donors fund a project tied to a recipient
//! (an NGO); the goal is the sum of the project's itemized milestones, and
//! escrowed funds are paid out one milestone at a time.
//!
//! | Phase        | Entry Point(s)                                      |
//! |--------------|-----------------------------------------------------|
//! | Bootstrap    | [`ProjectEscrow::init`]                             |
//! | Role admin   | `set_verifier`, `revoke_role`                       |
//! | Registration | [`ProjectEscrow::create_project`]                   |
//! | Funding      | [`ProjectEscrow::donate`]                           |
//! | Release      | [`ProjectEscrow::release_milestone`]                |
//! | Cancellation | `cancel_project`, `claim_refund`                    |
//! | Queries      | `get_project`, `project_count`, `escrow_balance`, `contribution_of`, `role_of` |
//!
//! ## Architecture
//!
//! Authorization is delegated to [`rbac`], storage access to [`storage`].
//! Every entry point returns `Result`; on `Err` the host discards all writes
//! and events of the call, so a failed call never leaves partial effects.
//!
//! Outbound token transfers happen only after the call's accounting has been
//! written, and under a [`guard::ReentrancyGuard`].

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, token, Address, Env, String, Vec};

pub mod events;
mod guard;
pub mod rbac;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;
#[cfg(test)]
mod test_release;

use guard::ReentrancyGuard;
pub use rbac::Role;
use storage::{
    get_and_increment_project_id, get_contribution, get_token, load_project, load_project_funds,
    load_project_pair, save_project, save_project_funds, set_contribution,
};
pub use types::{Milestone, Project, ProjectConfig, ProjectFunds, ProjectState};

/// Upper bound on milestones per project; keeps a project's ledger entries small.
pub const MAX_MILESTONES: u32 = 32;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    ProjectNotActive = 1,
    ZeroDonation = 2,
    ExceedsGoal = 3,
    InvalidMilestones = 4,
    AmountOverflow = 5,
    ZeroGoal = 6,
    ProjectNotFound = 7,
    MilestoneNotFound = 8,
    MilestoneAlreadyReleased = 9,
    InsufficientEscrow = 10,
    NotAuthorized = 11,
    AlreadyInitialized = 12,
    NotInitialized = 13,
    RoleNotFound = 14,
    MilestonesReleased = 15,
    ProjectNotCancelled = 16,
    NothingToRefund = 17,
    Reentrant = 18,
}

/// Coarse classification of [`Error`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Malformed input; the request can never succeed as given.
    Validation,
    /// The project or contract is not in the state the operation needs.
    State,
    /// The caller lacks the required role.
    Authorization,
}

impl Error {
    /// Stable, human-readable reason for the failure.
    pub fn reason(&self) -> &'static str {
        match self {
            Error::ProjectNotActive => "Project is not active",
            Error::ZeroDonation => "Donation must be greater than zero",
            Error::ExceedsGoal => "Donation exceeds project goal",
            Error::InvalidMilestones => "Milestone lists are invalid",
            Error::AmountOverflow => "Milestone amounts overflow",
            Error::ZeroGoal => "Project goal must be greater than zero",
            Error::ProjectNotFound => "Project does not exist",
            Error::MilestoneNotFound => "Milestone does not exist",
            Error::MilestoneAlreadyReleased => "Milestone already released",
            Error::InsufficientEscrow => "Insufficient escrowed funds",
            Error::NotAuthorized => "Caller is not authorized",
            Error::AlreadyInitialized => "Contract already initialized",
            Error::NotInitialized => "Contract is not initialized",
            Error::RoleNotFound => "Address holds no role",
            Error::MilestonesReleased => "Project has released milestones",
            Error::ProjectNotCancelled => "Project is not cancelled",
            Error::NothingToRefund => "Nothing to refund",
            Error::Reentrant => "Reentrant call",
        }
    }

    /// Failure class of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ZeroDonation
            | Error::ExceedsGoal
            | Error::InvalidMilestones
            | Error::AmountOverflow
            | Error::ZeroGoal
            | Error::MilestoneNotFound => ErrorKind::Validation,
            Error::NotAuthorized => ErrorKind::Authorization,
            _ => ErrorKind::State,
        }
    }
}

#[contract]
pub struct ProjectEscrow;

#[contractimpl]
impl ProjectEscrow {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Set the admin and the token used for escrow transfers.
    ///
    /// Must be called exactly once after deployment; `admin` must sign.
    pub fn init(env: Env, admin: Address, token: Address) -> Result<(), Error> {
        admin.require_auth();
        rbac::init_admin(&env, &admin)?;
        storage::set_token(&env, &token);
        Ok(())
    }

    pub fn admin(env: Env) -> Option<Address> {
        rbac::admin(&env)
    }

    pub fn token(env: Env) -> Option<Address> {
        get_token(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Role management
    // ─────────────────────────────────────────────────────────

    /// Grant the `Verifier` role to `verifier`. `caller` must be the admin.
    pub fn set_verifier(env: Env, caller: Address, verifier: Address) -> Result<(), Error> {
        caller.require_auth();
        rbac::grant_verifier(&env, &caller, &verifier)
    }

    /// Revoke the role held by `target`. The admin role cannot be revoked.
    pub fn revoke_role(env: Env, caller: Address, target: Address) -> Result<(), Error> {
        caller.require_auth();
        rbac::revoke_role(&env, &caller, &target)
    }

    pub fn role_of(env: Env, address: Address) -> Option<Role> {
        rbac::role_of(&env, &address)
    }

    // ─────────────────────────────────────────────────────────
    // Registry
    // ─────────────────────────────────────────────────────────

    /// Register a project paying `recipient`, one milestone per
    /// `(descriptions[i], amounts[i])` pair. Anyone may call.
    ///
    /// Returns the new project's id.
    pub fn create_project(
        env: Env,
        recipient: Address,
        descriptions: Vec<String>,
        amounts: Vec<i128>,
    ) -> Result<u64, Error> {
        let total_amount = milestone_total(&descriptions, &amounts)?;

        let id = get_and_increment_project_id(&env);

        let mut released = Vec::new(&env);
        for _ in 0..amounts.len() {
            released.push_back(false);
        }

        let config = ProjectConfig {
            id,
            recipient: recipient.clone(),
            descriptions: descriptions.clone(),
            amounts: amounts.clone(),
            total_amount,
        };
        let funds = ProjectFunds {
            funds_raised: 0,
            funds_released: 0,
            funds_refunded: 0,
            released,
            state: ProjectState::Active,
        };
        save_project(&env, &config, &funds);

        events::emit_project_created(&env, id, recipient, descriptions, amounts);
        Ok(id)
    }

    pub fn get_project(env: Env, id: u64) -> Result<Project, Error> {
        load_project(&env, id).ok_or(Error::ProjectNotFound)
    }

    pub fn project_count(env: Env) -> u64 {
        storage::project_count(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Donations
    // ─────────────────────────────────────────────────────────

    /// Donate `amount` of the escrow token from `donor` to a project.
    ///
    /// A missing project and an inactive one both fail with
    /// `ProjectNotActive`. Donations that would push `funds_raised` past the
    /// goal are rejected whole.
    pub fn donate(env: Env, project_id: u64, donor: Address, amount: i128) -> Result<(), Error> {
        donor.require_auth();
        let _guard = ReentrancyGuard::enter(&env)?;

        let (config, mut funds) = match load_project_pair(&env, project_id) {
            Some((config, funds)) if funds.state == ProjectState::Active => (config, funds),
            _ => return Err(Error::ProjectNotActive),
        };

        if amount <= 0 {
            return Err(Error::ZeroDonation);
        }

        let raised = funds
            .funds_raised
            .checked_add(amount)
            .ok_or(Error::ExceedsGoal)?;
        if raised > config.total_amount {
            return Err(Error::ExceedsGoal);
        }

        let token = get_token(&env).ok_or(Error::NotInitialized)?;

        funds.funds_raised = raised;
        save_project_funds(&env, project_id, &funds);
        let contributed = get_contribution(&env, project_id, &donor);
        set_contribution(&env, project_id, &donor, contributed + amount);

        token::Client::new(&env, &token).transfer(
            &donor,
            &env.current_contract_address(),
            &amount,
        );

        events::emit_donation_received(&env, project_id, donor, amount);
        Ok(())
    }

    /// Outstanding contribution of `donor` to a project (zero once refunded).
    pub fn contribution_of(env: Env, project_id: u64, donor: Address) -> i128 {
        get_contribution(&env, project_id, &donor)
    }

    /// Funds currently held for a project.
    pub fn escrow_balance(env: Env, project_id: u64) -> Result<i128, Error> {
        load_project_funds(&env, project_id)
            .map(|funds| funds.escrowed())
            .ok_or(Error::ProjectNotFound)
    }

    // ─────────────────────────────────────────────────────────
    // Milestone release
    // ─────────────────────────────────────────────────────────

    /// Pay milestone `milestone_index` of a project to its recipient.
    ///
    /// `caller` must hold `Admin` or `Verifier`. The escrow must cover the
    /// milestone. When the last milestone is released the project becomes
    /// `Completed`.
    pub fn release_milestone(
        env: Env,
        caller: Address,
        project_id: u64,
        milestone_index: u32,
    ) -> Result<(), Error> {
        caller.require_auth();
        rbac::require_can_release(&env, &caller)?;
        let _guard = ReentrancyGuard::enter(&env)?;

        let (config, mut funds) =
            load_project_pair(&env, project_id).ok_or(Error::ProjectNotFound)?;
        if funds.state != ProjectState::Active {
            return Err(Error::ProjectNotActive);
        }

        let amount = config
            .amounts
            .get(milestone_index)
            .ok_or(Error::MilestoneNotFound)?;
        if funds.released.get(milestone_index).unwrap_or(false) {
            return Err(Error::MilestoneAlreadyReleased);
        }
        if funds.escrowed() < amount {
            return Err(Error::InsufficientEscrow);
        }

        let token = get_token(&env).ok_or(Error::NotInitialized)?;

        // Effects first: the transfer below must observe the milestone as released.
        funds.released.set(milestone_index, true);
        funds.funds_released += amount;
        let completed = funds.all_released();
        if completed {
            funds.state = ProjectState::Completed;
        }
        save_project_funds(&env, project_id, &funds);

        if amount > 0 {
            token::Client::new(&env, &token).transfer(
                &env.current_contract_address(),
                &config.recipient,
                &amount,
            );
        }

        events::emit_milestone_released(&env, project_id, milestone_index, amount);
        if completed {
            events::emit_project_completed(&env, project_id, funds.funds_released);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Cancellation
    // ─────────────────────────────────────────────────────────

    /// Cancel an active project. Admin only, and only before any milestone
    /// has been released, so every contribution stays refundable.
    pub fn cancel_project(env: Env, caller: Address, project_id: u64) -> Result<(), Error> {
        caller.require_auth();
        rbac::require_admin(&env, &caller)?;

        let mut funds = load_project_funds(&env, project_id).ok_or(Error::ProjectNotFound)?;
        if funds.state != ProjectState::Active {
            return Err(Error::ProjectNotActive);
        }
        if funds.any_released() {
            return Err(Error::MilestonesReleased);
        }

        funds.state = ProjectState::Cancelled;
        save_project_funds(&env, project_id, &funds);

        events::emit_project_cancelled(&env, project_id, caller, funds.escrowed());
        Ok(())
    }

    /// Return `donor`'s contribution to a cancelled project.
    pub fn claim_refund(env: Env, project_id: u64, donor: Address) -> Result<i128, Error> {
        donor.require_auth();
        let _guard = ReentrancyGuard::enter(&env)?;

        let mut funds = load_project_funds(&env, project_id).ok_or(Error::ProjectNotFound)?;
        if funds.state != ProjectState::Cancelled {
            return Err(Error::ProjectNotCancelled);
        }

        let amount = get_contribution(&env, project_id, &donor);
        if amount <= 0 {
            return Err(Error::NothingToRefund);
        }
        let token = get_token(&env).ok_or(Error::NotInitialized)?;

        set_contribution(&env, project_id, &donor, 0);
        funds.funds_refunded += amount;
        save_project_funds(&env, project_id, &funds);

        token::Client::new(&env, &token).transfer(&env.current_contract_address(), &donor, &amount);

        events::emit_refund_claimed(&env, project_id, donor, amount);
        Ok(amount)
    }
}

/// Validate the milestone lists and return their total.
fn milestone_total(descriptions: &Vec<String>, amounts: &Vec<i128>) -> Result<i128, Error> {
    let count = amounts.len();
    if count == 0 || count != descriptions.len() || count > MAX_MILESTONES {
        return Err(Error::InvalidMilestones);
    }

    let mut total: i128 = 0;
    for amount in amounts.iter() {
        if amount < 0 {
            return Err(Error::InvalidMilestones);
        }
        total = total.checked_add(amount).ok_or(Error::AmountOverflow)?;
    }

    if total == 0 {
        return Err(Error::ZeroGoal);
    }
    Ok(total)
}
