use std::collections::{HashMap, HashSet};
use std::time::Duration;

use thiserror::Error;

use crate::api::ApiError;
use crate::models::{Instance, InstanceAction, InstanceStatus};

/// Client-perceived reconciliation phase of one row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Status was rewritten locally; waiting for the backend to confirm.
    Optimistic {
        action: InstanceAction,
        previous: InstanceStatus,
    },
    /// A refetch after the action reported a different status than before it.
    Reconciled,
    /// A refetch after the action still reported the pre-action status.
    Reverted,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("an action is already in progress for instance {0}")]
    InFlight(String),
    #[error("instance {0} is not in the current list")]
    UnknownInstance(String),
    #[error("cannot {action} instance {instance_id} while it is {status}")]
    NotOffered {
        instance_id: String,
        action: InstanceAction,
        status: InstanceStatus,
    },
}

/// Proof that an action was admitted; hand it back to `complete_action`.
#[derive(Debug, PartialEq, Eq)]
pub struct ActionTicket {
    pub instance_id: String,
    pub action: InstanceAction,
}

/// What the caller must do after an action completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowUp {
    RefetchAfter(Duration),
    RefetchNow,
}

/// Local display state of the instance list.
#[derive(Clone, Debug, Default)]
pub struct InstanceBoard {
    rows: Vec<Instance>,
    phases: HashMap<String, Phase>,
    in_flight: HashSet<String>,
    fetch_error: Option<String>,
    action_error: Option<String>,
    /// Set once the failed action's own refetch has landed.
    action_error_shown: bool,
    notice: Option<String>,
    loaded: bool,
}

impl InstanceBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Instance] {
        &self.rows
    }

    pub fn row(&self, instance_id: &str) -> Option<&Instance> {
        self.rows.iter().find(|r| r.instance_id == instance_id)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Page-level error: a failed action takes precedence over a failed fetch.
    pub fn error(&self) -> Option<&str> {
        self.action_error.as_deref().or(self.fetch_error.as_deref())
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn is_in_flight(&self, instance_id: &str) -> bool {
        self.in_flight.contains(instance_id)
    }

    pub fn phase(&self, instance_id: &str) -> Phase {
        self.phases.get(instance_id).cloned().unwrap_or(Phase::Idle)
    }

    /// The action control to render for a row, keyed off its literal status.
    pub fn available_action(&self, instance_id: &str) -> Option<InstanceAction> {
        self.row(instance_id).and_then(|r| r.status.available_action())
    }

    /// Rows whose id starts with `prefix`.
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<&Instance> {
        self.rows.iter().filter(|r| r.instance_id.starts_with(prefix)).collect()
    }

    /// A poll or refetch result. Overwrites every row unconditionally, even
    /// rows with an action still in flight.
    pub fn apply_snapshot(&mut self, rows: Vec<Instance>) {
        let mut phases = HashMap::new();
        for row in &rows {
            let phase = match self.phases.remove(&row.instance_id) {
                Some(Phase::Optimistic { action, previous }) if self.in_flight.contains(&row.instance_id) => {
                    Phase::Optimistic { action, previous }
                }
                Some(Phase::Optimistic { previous, .. }) => {
                    if row.status == previous {
                        Phase::Reverted
                    } else {
                        Phase::Reconciled
                    }
                }
                Some(settled @ (Phase::Reconciled | Phase::Reverted)) => settled,
                Some(Phase::Idle) | None => continue,
            };
            phases.insert(row.instance_id.clone(), phase);
        }
        self.phases = phases;
        self.rows = rows;
        self.fetch_error = None;
        // An action error lasts through the refetch it triggered and no longer.
        if self.action_error_shown {
            self.action_error = None;
            self.action_error_shown = false;
        } else if self.action_error.is_some() {
            self.action_error_shown = true;
        }
        self.loaded = true;
    }

    /// A failed collection fetch leaves the displayed list empty.
    pub fn apply_fetch_error(&mut self, message: String) {
        self.rows.clear();
        self.phases.clear();
        self.fetch_error = Some(message);
        self.loaded = true;
    }

    pub fn apply_fetch(&mut self, result: Result<Vec<Instance>, ApiError>) {
        match result {
            Ok(rows) => self.apply_snapshot(rows),
            Err(e) => {
                tracing::warn!(error = %e, "instance list fetch failed");
                self.apply_fetch_error(format!("Failed to load instances: {}", e.page_message()));
            }
        }
    }

    /// Admit an action: refuse duplicates and actions the current status
    /// does not offer, otherwise mark the row in flight and rewrite its
    /// status to the intermediate value before any request is made.
    pub fn begin_action(&mut self, instance_id: &str, action: InstanceAction) -> Result<ActionTicket, Rejection> {
        if self.in_flight.contains(instance_id) {
            return Err(Rejection::InFlight(instance_id.to_string()));
        }
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.instance_id == instance_id)
            .ok_or_else(|| Rejection::UnknownInstance(instance_id.to_string()))?;
        if row.status.available_action() != Some(action) {
            return Err(Rejection::NotOffered {
                instance_id: instance_id.to_string(),
                action,
                status: row.status.clone(),
            });
        }

        let previous = std::mem::replace(&mut row.status, action.optimistic_status());
        self.in_flight.insert(instance_id.to_string());
        self.phases
            .insert(instance_id.to_string(), Phase::Optimistic { action, previous });
        self.action_error = None;
        self.action_error_shown = false;
        Ok(ActionTicket {
            instance_id: instance_id.to_string(),
            action,
        })
    }

    /// Record the outcome of an admitted action. Success keeps the
    /// optimistic status and asks for a delayed refetch; failure surfaces the
    /// error and asks for an immediate one.
    pub fn complete_action(
        &mut self,
        ticket: ActionTicket,
        outcome: Result<Option<String>, ApiError>,
        settle_delay: Duration,
    ) -> FollowUp {
        self.in_flight.remove(&ticket.instance_id);
        match outcome {
            Ok(message) => {
                tracing::info!(instance_id = %ticket.instance_id, action = %ticket.action, "instance action accepted");
                self.notice = Some(message.unwrap_or_else(|| format!("Action '{}' processed.", ticket.action)));
                FollowUp::RefetchAfter(settle_delay)
            }
            Err(e) => {
                tracing::warn!(instance_id = %ticket.instance_id, action = %ticket.action, error = %e, "instance action failed");
                self.action_error = Some(e.action_message(ticket.action.as_str(), &ticket.instance_id));
                self.action_error_shown = false;
                FollowUp::RefetchNow
            }
        }
    }
}
