//! Canonical event types emitted by the project escrow contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/project_escrow/src/events.rs` and `contracts/project_escrow/src/rbac.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the escrow contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A new project was registered (`created` topic).
    ProjectCreated,
    /// A donor funded a project (`donated` topic).
    DonationReceived,
    /// A milestone was paid to the recipient (`released` topic).
    MilestoneReleased,
    /// The last milestone was released (`completed` topic).
    ProjectCompleted,
    /// The admin cancelled a project (`cancelled` topic).
    ProjectCancelled,
    /// A donor reclaimed a contribution (`refunded` topic).
    RefundClaimed,
    /// A verifier role was granted (`role_set` topic).
    RoleSet,
    /// A verifier role was revoked (`role_del` topic).
    RoleDel,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "created" => Self::ProjectCreated,
            "donated" => Self::DonationReceived,
            "released" => Self::MilestoneReleased,
            "completed" => Self::ProjectCompleted,
            "cancelled" => Self::ProjectCancelled,
            "refunded" => Self::RefundClaimed,
            "role_set" => Self::RoleSet,
            "role_del" => Self::RoleDel,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectCreated => "project_created",
            Self::DonationReceived => "donation_received",
            Self::MilestoneReleased => "milestone_released",
            Self::ProjectCompleted => "project_completed",
            Self::ProjectCancelled => "project_cancelled",
            Self::RefundClaimed => "refund_claimed",
            Self::RoleSet => "role_set",
            Self::RoleDel => "role_del",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`EventKind::as_str`].
    pub fn from_stored(s: &str) -> Self {
        match s {
            "project_created" => Self::ProjectCreated,
            "donation_received" => Self::DonationReceived,
            "milestone_released" => Self::MilestoneReleased,
            "project_completed" => Self::ProjectCompleted,
            "project_cancelled" => Self::ProjectCancelled,
            "refund_claimed" => Self::RefundClaimed,
            "role_set" => Self::RoleSet,
            "role_del" => Self::RoleDel,
            _ => Self::Unknown,
        }
    }

    /// Role events are keyed by address rather than by project.
    pub fn is_project_scoped(&self) -> bool {
        !matches!(self, Self::RoleSet | Self::RoleDel | Self::Unknown)
    }
}

/// A fully decoded escrow event, ready to be stored in the database.
///
/// Amounts are kept as decimal strings: contract amounts are `i128`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowEvent {
    /// RPC event id; unique per contract event and used for de-duplication.
    pub event_id: String,
    pub event_type: String,
    pub project_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub milestone_index: Option<i64>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub project_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub milestone_index: Option<i64>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}
