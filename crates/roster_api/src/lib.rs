//! HTTP surface of the roster service.
//!
//! Exposes member lookups and paged member listings over a shared SQLite
//! connection owned by `AppState`.

pub mod bootstrap;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::Settings;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
