//! HTTP server exposing the card browser, deck list and settings
//!
//! `ServerBuilder` wires the catalog store, settings service and sync listener
//! together and produces an axum `Router`.

pub mod builder;
pub mod handlers;
pub mod router;
pub mod state;

pub use builder::ServerBuilder;
pub use router::build_routes;
pub use state::AppState;
