//! # Types
//!
//! Shared data structures used across all modules of the escrow contract.
//!
//! ## Config / Funds split
//!
//! A `Project` is stored as two separate ledger entries:
//!
//! - [`ProjectConfig`] — written once by `create_project`; never mutated.
//! - [`ProjectFunds`] — written on every donation, release and refund.
//!
//! The public API exposes the reconstructed [`Project`] struct.
//!
//! ## State machine
//!
//! ```text
//! Active ──► Completed   (every milestone released)
//!    └─────► Cancelled   (admin cancel, before any release)
//! ```
//!
//! `Completed` and `Cancelled` are terminal.

use soroban_sdk::{contracttype, Address, String, Vec};

/// Lifecycle state of a project.
///
/// The discriminants are part of the external encoding and must not change.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ProjectState {
    /// Accepting donations and releases.
    Active = 0,
    /// Every milestone has been released to the recipient.
    Completed = 1,
    /// Terminated by the admin; donors may reclaim their contributions.
    Cancelled = 2,
}

impl ProjectState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProjectState::Active)
    }
}

/// A named, fixed-amount portion of a project's goal.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Milestone {
    pub description: String,
    pub amount: i128,
    pub released: bool,
}

/// Immutable project configuration, written once at creation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectConfig {
    pub id: u64,
    pub recipient: Address,
    pub descriptions: Vec<String>,
    pub amounts: Vec<i128>,
    pub total_amount: i128,
}

/// Mutable accounting for a project.
///
/// `released` holds one flag per milestone, in milestone order.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectFunds {
    pub funds_raised: i128,
    pub funds_released: i128,
    pub funds_refunded: i128,
    pub released: Vec<bool>,
    pub state: ProjectState,
}

impl ProjectFunds {
    /// Funds currently held by the contract on behalf of the project.
    pub fn escrowed(&self) -> i128 {
        self.funds_raised - self.funds_released - self.funds_refunded
    }

    pub fn all_released(&self) -> bool {
        self.released.iter().all(|r| r)
    }

    pub fn any_released(&self) -> bool {
        self.released.iter().any(|r| r)
    }
}

/// Full representation of a project, as returned by `get_project`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Project {
    /// Sequential identifier, starting at 0.
    pub id: u64,
    /// Address that receives released milestone funds.
    pub recipient: Address,
    /// Milestones in creation order.
    pub milestones: Vec<Milestone>,
    /// Sum of all milestone amounts; the funding goal.
    pub total_amount: i128,
    /// Total accepted donations.
    pub funds_raised: i128,
    /// Total paid out to the recipient.
    pub funds_released: i128,
    /// Total returned to donors after cancellation.
    pub funds_refunded: i128,
    pub state: ProjectState,
}
