#![doc = "The `taskledger` library crate."]
#![doc = ""]
#![doc = "Per-user task and subtask management: domain models, the document store port and"]
#![doc = "its adapters, bearer-token authentication, the task/user services, routing and"]
#![doc = "error handling. `main.rs` only reads the configuration and runs the server."]

pub mod app;
pub mod auth;
pub mod config;
pub mod docs;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use app::{build_app, AppState};
pub use error::AppError;
