//! User record for the web application: fillable attributes, hidden
//! attributes and the `email_verified` boolean cast, plus the Postgres
//! repository and axum glue that consult them.

pub mod config;
pub mod db;
pub mod telemetry;
pub mod users;

pub use db::AppState;
pub use users::{AssignmentPolicy, Authenticatable, FillableJson, MassAssignmentError, Notifiable, User};
