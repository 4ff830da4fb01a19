//! HTTP handlers for cards, decks and settings

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::core::card::Card;
use crate::core::deck::Deck;
use crate::core::error::{CatalogError, DeckError, DeckbuildResult, RequestError};
use crate::core::settings::Settings;
use crate::pipeline;
use crate::schema::{
    CatalogSummary, CatalogUpload, DeckImport, DeckPatch, HealthResponse, ListQuery,
    PaginatedResponse, QuantityUpdate, SettingsResponse, validated,
};
use crate::server::state::{AppState, CARDS_VIEW, DECKS_VIEW};

/// List cards matching the query's filters, sorted and paginated
pub async fn list_cards(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> DeckbuildResult<Json<PaginatedResponse<Card>>> {
    let (collator, view) = state.resolve(CARDS_VIEW, &query)?;
    let snapshot = state.catalog.snapshot()?;
    let page = pipeline::run(snapshot.catalog.cards(), &state.card_filters, &collator, &view)?;
    let total = page.total_count;

    Ok(Json(PaginatedResponse::new(
        page.cloned().items,
        view.page,
        total,
    )))
}

pub async fn get_card(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> DeckbuildResult<Json<Card>> {
    let snapshot = state.catalog.snapshot()?;
    let card = snapshot
        .catalog
        .card(&code)
        .cloned()
        .ok_or(CatalogError::CardNotFound { code })?;
    Ok(Json(card))
}

/// Replace the card catalog; decks are kept and revalidated
pub async fn replace_catalog(
    State(state): State<AppState>,
    Json(upload): Json<CatalogUpload>,
) -> DeckbuildResult<Json<CatalogSummary>> {
    let snapshot = state.catalog.replace_cards(upload.cards).await?;
    tracing::info!(
        revision = snapshot.revision,
        cards = snapshot.catalog.cards().len(),
        "card catalog replaced"
    );
    Ok(Json(CatalogSummary::from(snapshot.as_ref())))
}

pub async fn list_decks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> DeckbuildResult<Json<PaginatedResponse<Deck>>> {
    let (collator, view) = state.resolve(DECKS_VIEW, &query)?;
    let snapshot = state.catalog.snapshot()?;
    let page = pipeline::run(snapshot.catalog.decks(), &state.deck_filters, &collator, &view)?;
    let total = page.total_count;

    Ok(Json(PaginatedResponse::new(
        page.cloned().items,
        view.page,
        total,
    )))
}

pub async fn create_deck(
    State(state): State<AppState>,
    Json(body): Json<DeckImport>,
) -> DeckbuildResult<(StatusCode, Json<Deck>)> {
    let body = validated(body)?;
    let snapshot = state.catalog.snapshot()?;
    let deck = body.into_deck(&snapshot.catalog)?;
    let deck = state.catalog.save_deck(deck).await?;

    tracing::info!(deck_id = %deck.id, valid = deck.is_valid, "deck created");
    Ok((StatusCode::CREATED, Json(deck)))
}

pub async fn get_deck(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> DeckbuildResult<Json<Deck>> {
    let snapshot = state.catalog.snapshot()?;
    let deck = snapshot
        .catalog
        .deck(&id)
        .cloned()
        .ok_or(DeckError::NotFound { id })?;
    Ok(Json(deck))
}

pub async fn patch_deck(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<DeckPatch>,
) -> DeckbuildResult<Json<Deck>> {
    let patch = validated(patch)?;
    if patch.is_empty() {
        return Err(RequestError::BadRequest {
            message: "patch names no field to change".to_string(),
        }
        .into());
    }
    let deck = state
        .catalog
        .update_deck(&id, |deck, catalog| {
            patch.apply(deck, catalog);
            Ok(())
        })
        .await?;
    Ok(Json(deck))
}

pub async fn delete_deck(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> DeckbuildResult<StatusCode> {
    state.catalog.delete_deck(&id).await?;
    tracing::info!(deck_id = %id, "deck deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Set how many copies of a card the deck holds; 0 removes the card
pub async fn set_slot_quantity(
    State(state): State<AppState>,
    Path((id, code)): Path<(Uuid, String)>,
    Json(update): Json<QuantityUpdate>,
) -> DeckbuildResult<Json<Deck>> {
    let update = validated(update)?;
    let deck = state
        .catalog
        .update_deck(&id, |deck, catalog| {
            deck.set_quantity(&code, update.quantity, catalog)
        })
        .await?;
    Ok(Json(deck))
}

pub async fn get_settings(State(state): State<AppState>) -> DeckbuildResult<Json<SettingsResponse>> {
    Ok(Json(SettingsResponse {
        revision: state.settings.revision()?,
        settings: state.settings.current()?,
    }))
}

/// Validate, persist and broadcast new settings
pub async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<Settings>,
) -> DeckbuildResult<Json<SettingsResponse>> {
    settings.validate(
        state.config.pagination.max_limit,
        &state.card_filters,
        &state.deck_filters,
    )?;
    let revision = state.settings.save(settings.clone()).await?;
    Ok(Json(SettingsResponse { revision, settings }))
}

pub async fn health(State(state): State<AppState>) -> DeckbuildResult<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        service: "deckbuild".to_string(),
        revision: state.catalog.snapshot()?.revision,
    }))
}
