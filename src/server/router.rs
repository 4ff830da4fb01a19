//! Route table of the HTTP API

use crate::server::handlers::{
    create_deck, delete_deck, get_card, get_deck, get_settings, health, list_cards, list_decks,
    patch_deck, put_settings, replace_catalog, set_slot_quantity,
};
use crate::server::state::AppState;
use axum::{
    Router,
    routing::{get, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the API router
///
/// - GET /health
/// - GET /cards, GET /cards/{code}
/// - PUT /catalog - Replace the card catalog
/// - GET /decks, POST /decks
/// - GET /decks/{id}, PATCH /decks/{id}, DELETE /decks/{id}
/// - PUT /decks/{id}/slots/{code} - Set a card quantity
/// - GET /settings, PUT /settings
pub fn build_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/cards", get(list_cards))
        .route("/cards/{code}", get(get_card))
        .route("/catalog", put(replace_catalog))
        .route("/decks", get(list_decks).post(create_deck))
        .route(
            "/decks/{id}",
            get(get_deck).patch(patch_deck).delete(delete_deck),
        )
        .route("/decks/{id}/slots/{code}", put(set_slot_quantity))
        .route("/settings", get(get_settings).put(put_settings))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
