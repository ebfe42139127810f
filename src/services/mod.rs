pub mod health;

pub use health::{HealthResponse, HealthState, HealthStatus};
