//! Soroban RPC client — polls `getEvents` and decodes escrow events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.
//! * JSON-RPC "invalid request" / "method not found" fail immediately.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EscrowEvent, EventKind};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

/// JSON-RPC codes that retrying cannot fix.
const HARD_ERROR_CODES: [i64; 2] = [-32600, -32601];

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

/// One event as returned with `xdrFormat: "json"`.
#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    /// Topic list, one ScVal JSON object per entry
    #[serde(rename = "topicJson", default)]
    pub topic: Vec<Value>,
    /// Event payload as ScVal JSON; contract structs arrive as `{"map": [...]}`
    #[serde(rename = "valueJson", default)]
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
}

/// One page of `getEvents` output.
#[derive(Debug)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events from the RPC.
///
/// * `start_ledger` — the ledger sequence to scan from (inclusive).
/// * `cursor`       — optional opaque pagination cursor from a previous response.
/// * `limit`        — maximum number of events to return.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventPage> {
    let mut backoff = INITIAL_BACKOFF_SECS;
    let params = build_params(contract_id, start_ledger, cursor, limit);

    loop {
        let response = client
            .post(rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getEvents",
                "params": params,
            }))
            .send()
            .await;

        let resp = match response {
            Ok(resp) => resp,
            Err(e) => {
                warn!("RPC request failed (will retry in {backoff}s): {e}");
                backoff = sleep_with_backoff(backoff).await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC (will retry in {backoff}s)");
            backoff = sleep_with_backoff(backoff).await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;

        if let Some(err) = body.error {
            if HARD_ERROR_CODES.contains(&err.code) {
                return Err(IndexerError::Rpc {
                    code: err.code,
                    message: err.message,
                });
            }
            warn!(
                "RPC soft error (will retry in {backoff}s): {} {}",
                err.code, err.message
            );
            backoff = sleep_with_backoff(backoff).await;
            continue;
        }

        let result = body
            .result
            .ok_or_else(|| IndexerError::EventDecode("Empty result from getEvents".to_string()))?;

        debug!(
            "Fetched {} events (latest_ledger={:?})",
            result.events.len(),
            result.latest_ledger
        );

        return Ok(EventPage {
            events: result.events,
            cursor: result.cursor,
            latest_ledger: result.latest_ledger,
        });
    }
}

async fn sleep_with_backoff(backoff: u64) -> u64 {
    tokio::time::sleep(Duration::from_secs(backoff)).await;
    next_backoff(backoff)
}

fn next_backoff(current: u64) -> u64 {
    (current * 2).min(MAX_BACKOFF_SECS)
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        },
        "xdrFormat": "json"
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`EscrowEvent`] structs.
///
/// Events from failed contract calls are dropped; the ledger reverted them.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<EscrowEvent> {
    raw.iter()
        .enumerate()
        .filter(|(_, e)| e.in_successful_contract_call != Some(false))
        .filter_map(|(position, e)| decode_single(e, contract_id, position))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str, position: usize) -> Option<EscrowEvent> {
    let first_topic = raw.topic.first()?;
    let kind = EventKind::from_topic(&scalar_string(first_topic)?);

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let second_topic = raw.topic.get(1).and_then(scalar_string);
    let decoded = decode_data(&raw.value, kind);

    // Role events carry the affected address, not a project id, in the second topic.
    let (project_id, actor) = if kind.is_project_scoped() {
        (second_topic, decoded.actor)
    } else {
        (None, second_topic.or(decoded.actor))
    };

    let event_id = raw.id.clone().unwrap_or_else(|| {
        format!(
            "{ledger}-{}-{position}",
            raw.tx_hash.as_deref().unwrap_or("unknown")
        )
    });

    Some(EscrowEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        project_id,
        actor,
        amount: decoded.amount,
        milestone_index: decoded.milestone_index,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

#[derive(Debug, Default, PartialEq)]
struct DecodedData {
    actor: Option<String>,
    amount: Option<String>,
    milestone_index: Option<i64>,
}

/// Pull apart the JSON `value` blob that Soroban returns for event data.
fn decode_data(value: &Value, kind: EventKind) -> DecodedData {
    match kind {
        EventKind::ProjectCreated => DecodedData {
            actor: extract_field(value, &["recipient"]),
            amount: map_field(value, "amounts").and_then(sum_amounts),
            milestone_index: None,
        },
        EventKind::DonationReceived | EventKind::RefundClaimed => DecodedData {
            actor: extract_field(value, &["donor"]),
            amount: extract_field(value, &["amount"]),
            milestone_index: None,
        },
        EventKind::MilestoneReleased => DecodedData {
            actor: None,
            amount: extract_field(value, &["amount"]),
            milestone_index: extract_field(value, &["milestone_index"])
                .and_then(|s| s.parse().ok()),
        },
        EventKind::ProjectCompleted => DecodedData {
            amount: extract_field(value, &["total_released"]),
            ..DecodedData::default()
        },
        EventKind::ProjectCancelled => DecodedData {
            actor: extract_field(value, &["cancelled_by"]),
            amount: extract_field(value, &["escrowed"]),
            milestone_index: None,
        },
        // Role payload is the acting admin.
        EventKind::RoleSet | EventKind::RoleDel => DecodedData {
            actor: scalar_string(value),
            ..DecodedData::default()
        },
        EventKind::Unknown => DecodedData::default(),
    }
}

/// Render a JSON ScVal as a plain string.
///
/// Accepts bare strings and numbers, single-entry wrappers such as
/// `{"i128": "5"}` or `{"address": "G..."}`, and 128-bit integers split into
/// `{"hi": .., "lo": ..}` parts.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => {
            if let (Some(hi), Some(lo)) = (map.get("hi"), map.get("lo")) {
                return join_parts(hi, lo);
            }
            if map.len() == 1 {
                return map.values().next().and_then(scalar_string);
            }
            None
        }
        _ => None,
    }
}

fn join_parts(hi: &Value, lo: &Value) -> Option<String> {
    let hi: i64 = scalar_string(hi)?.parse().ok()?;
    let lo: u64 = scalar_string(lo)?.parse().ok()?;
    Some((((hi as i128) << 64) | lo as i128).to_string())
}

/// Look up a struct field in an ScMap payload.
///
/// `#[contracttype]` structs are encoded as
/// `{"map": [{"key": {"symbol": "amount"}, "val": {...}}, ...]}`.
fn map_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value
        .get("map")?
        .as_array()?
        .iter()
        .find(|entry| entry.get("key").and_then(scalar_string).as_deref() == Some(key))?
        .get("val")
}

fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map_field(value, key))
        .find_map(scalar_string)
}

/// Sum a JSON array of amounts. `None` if any entry is not an integer.
fn sum_amounts(value: &Value) -> Option<String> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) if map.len() == 1 => {
            return map.values().next().and_then(sum_amounts);
        }
        _ => return None,
    };
    let mut total: i128 = 0;
    for item in items {
        let n: i128 = scalar_string(item)?.parse().ok()?;
        total = total.checked_add(n)?;
    }
    Some(total.to_string())
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
