//! HTTP plumbing shared by every slice: state, health route and error bodies.

pub mod error;
mod health;
pub mod router;
pub mod state;

pub use error::ErrorBody;
pub use router::system_router;
pub use state::{ApiState, ApiStateBuilder, ApiStateError};
