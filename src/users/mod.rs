pub mod attributes;
pub mod capabilities;
mod errors;
pub mod extractors;
mod model;
pub mod repo;
pub mod repo_types;

pub use capabilities::{Authenticatable, Notifiable};
pub use errors::MassAssignmentError;
pub use extractors::FillableJson;
pub use model::{AssignmentPolicy, User};
