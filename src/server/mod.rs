//! HTTP server for prompt-to-crew generation.
//!
//! # Endpoints
//!
//! - `GET    /health`          : Liveness probe
//! - `POST   /generate_agents` : Run a reused or freshly synthesized crew
//! - `GET    /agents/{crew_id}`: Fetch a crew's agent definitions
//! - `DELETE /agents/{crew_id}`: Delete a crew

pub mod routes;

pub use routes::{app_router, AppState};
