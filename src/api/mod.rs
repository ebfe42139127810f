pub mod handlers;
pub mod routes;
pub mod state;
pub mod types;

pub use routes::{create_router, serve};
pub use state::AppState;
pub use types::ErrorResponse;
