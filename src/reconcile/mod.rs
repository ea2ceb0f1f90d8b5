//! Instance list reconciliation.
//!
//! `board` is the synchronous state machine for optimistic rewrites and poll
//! overwrites. `controller` drives it with
//! tokio timers for long-lived views (the CLI `watch`), and `schedule` turns
//! the same follow-ups into refresh deadlines for request/response pages.

pub mod board;
pub mod controller;
pub mod schedule;

pub use board::{ActionTicket, FollowUp, InstanceBoard, Phase, Rejection};
pub use controller::InstanceListController;
pub use schedule::RefreshSchedule;
