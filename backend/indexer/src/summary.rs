//! Per-project projection rebuilt from indexed events.
//!
//! Folds a project's event history (in ledger order) into the same totals the
//! contract keeps on-chain, so the API can answer without an RPC round trip.

use serde::Serialize;

use crate::events::{EventKind, EventRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectState {
    Active,
    Completed,
    Cancelled,
}

/// Amounts are decimal strings in the JSON output; they are `i128` on-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub project_id: String,
    pub recipient: Option<String>,
    #[serde(with = "decimal")]
    pub goal: i128,
    #[serde(with = "decimal")]
    pub funds_raised: i128,
    #[serde(with = "decimal")]
    pub funds_released: i128,
    #[serde(with = "decimal")]
    pub funds_refunded: i128,
    pub donation_count: usize,
    pub released_milestones: Vec<i64>,
    pub state: ProjectState,
}

impl ProjectSummary {
    /// Fold `events` into a summary. Returns `None` when the creation event
    /// has not been indexed yet.
    pub fn from_events(project_id: &str, events: &[EventRecord]) -> Option<Self> {
        let created = events
            .iter()
            .find(|e| EventKind::from_stored(&e.event_type) == EventKind::ProjectCreated)?;

        let mut summary = ProjectSummary {
            project_id: project_id.to_string(),
            recipient: created.actor.clone(),
            goal: amount_of(created),
            funds_raised: 0,
            funds_released: 0,
            funds_refunded: 0,
            donation_count: 0,
            released_milestones: Vec::new(),
            state: ProjectState::Active,
        };

        for event in events {
            match EventKind::from_stored(&event.event_type) {
                EventKind::DonationReceived => {
                    summary.funds_raised += amount_of(event);
                    summary.donation_count += 1;
                }
                EventKind::MilestoneReleased => {
                    summary.funds_released += amount_of(event);
                    if let Some(index) = event.milestone_index {
                        summary.released_milestones.push(index);
                    }
                }
                EventKind::RefundClaimed => summary.funds_refunded += amount_of(event),
                EventKind::ProjectCompleted => summary.state = ProjectState::Completed,
                EventKind::ProjectCancelled => summary.state = ProjectState::Cancelled,
                _ => {}
            }
        }

        summary.released_milestones.sort_unstable();
        Some(summary)
    }

    pub fn escrowed(&self) -> i128 {
        self.funds_raised - self.funds_released - self.funds_refunded
    }
}

fn amount_of(event: &EventRecord) -> i128 {
    event
        .amount
        .as_deref()
        .and_then(|a| a.parse().ok())
        .unwrap_or(0)
}

mod decimal {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &i128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }
}
