pub mod api;
pub mod cli;
pub mod config;
pub mod forms;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod reconcile;
pub mod routes;
pub mod session;
pub mod templates;
pub mod utils;
