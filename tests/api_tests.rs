//! End-to-end tests of the HTTP API
//!
//! These tests drive the router the way a client would: list and filter
//! cards, build decks, and persist settings.

use axum::http::StatusCode;
use axum_test::TestServer;
use deckbuild::prelude::*;
use deckbuild::schema::{CatalogSummary, SettingsResponse};
use serde_json::Value;
use tempfile::tempdir;

// =============================================================================
// Helpers
// =============================================================================

fn test_cards() -> Vec<Card> {
    vec![
        Card::new("01001", "Roland Banks", Faction::Guardian, CardType::Investigator)
            .with_deck_size(30),
        Card::new("01002", "Daisy Walker", Faction::Seeker, CardType::Investigator)
            .with_deck_size(30),
        Card::new("01016", ".45 Automatic", Faction::Guardian, CardType::Asset)
            .with_cost(4)
            .with_traits(&["Item", "Weapon", "Firearm"]),
        Card::new("01018", "Beat Cop", Faction::Guardian, CardType::Asset)
            .with_cost(4)
            .with_traits(&["Ally", "Police"]),
        Card::new("01020", "Machete", Faction::Guardian, CardType::Asset)
            .with_cost(3)
            .with_traits(&["Item", "Weapon", "Melee"]),
        Card::new("01030", "Magnifying Glass", Faction::Seeker, CardType::Asset)
            .with_cost(1)
            .with_traits(&["Item", "Tool"]),
        Card::new("01087", "Flashlight", Faction::Neutral, CardType::Asset)
            .with_cost(2)
            .with_traits(&["Item", "Tool"]),
        Card::new("01088", "Emergency Cache", Faction::Neutral, CardType::Event).with_cost(0),
    ]
}

async fn create_test_server() -> TestServer {
    let app = ServerBuilder::new()
        .with_cards(test_cards())
        .build()
        .await
        .expect("Failed to build app");

    TestServer::new(app)
}

fn card_codes(body: &PaginatedResponse<Card>) -> Vec<&str> {
    body.data.iter().map(|c| c.code.as_str()).collect()
}

async fn create_deck(server: &TestServer, name: &str, investigator: &str) -> Deck {
    let response = server
        .post("/decks")
        .json(&json!({ "name": name, "investigator_code": investigator }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

// =============================================================================
// Health
// =============================================================================

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let server = create_test_server().await;

        let response = server.get("/health").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["revision"], 0);
    }
}

// =============================================================================
// Cards
// =============================================================================

mod card_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_all_cards() {
        let server = create_test_server().await;

        let response = server.get("/cards").await;
        response.assert_status_ok();

        let body: PaginatedResponse<Card> = response.json();
        assert_eq!(body.pagination.total, 8);
        assert_eq!(body.pagination.limit, 20);
        assert_eq!(body.data.len(), 8);
        assert!(!body.pagination.has_next);
    }

    #[tokio::test]
    async fn test_filter_sort_and_paginate() {
        let server = create_test_server().await;

        let response = server
            .get("/cards")
            .add_query_param("filter", r#"{"type":["asset"],"traits":["Item"]}"#)
            .add_query_param("sort", "cost:desc,name")
            .add_query_param("limit", 2)
            .await;
        response.assert_status_ok();

        let body: PaginatedResponse<Card> = response.json();
        assert_eq!(body.pagination.total, 4);
        assert_eq!(card_codes(&body), vec!["01016", "01020"]);
        assert!(body.pagination.has_next);
        assert_eq!(body.pagination.total_pages, 2);

        let response = server
            .get("/cards")
            .add_query_param("filter", r#"{"type":["asset"],"traits":["Item"]}"#)
            .add_query_param("sort", "cost:desc,name")
            .add_query_param("limit", 2)
            .add_query_param("page", 2)
            .await;
        let body: PaginatedResponse<Card> = response.json();
        assert_eq!(card_codes(&body), vec!["01087", "01030"]);
        assert!(body.pagination.has_prev);
        assert!(!body.pagination.has_next);
    }

    #[tokio::test]
    async fn test_get_card() {
        let server = create_test_server().await;

        let response = server.get("/cards/01087").await;
        response.assert_status_ok();
        let card: Card = response.json();
        assert_eq!(card.name, "Flashlight");
    }

    #[tokio::test]
    async fn test_get_unknown_card_returns_404() {
        let server = create_test_server().await;

        let response = server.get("/cards/99999").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["code"], "CARD_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_unknown_filter_returns_400() {
        let server = create_test_server().await;

        let response = server
            .get("/cards")
            .add_query_param("filter", r#"{"colour":"red"}"#)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "UNKNOWN_FILTER");
        assert_eq!(body["details"]["filter"], "colour");
    }

    #[tokio::test]
    async fn test_bad_sort_and_locale_return_400() {
        let server = create_test_server().await;

        let response = server.get("/cards").add_query_param("sort", "cost:up").await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server.get("/cards").add_query_param("sort", "flavor").await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server.get("/cards").add_query_param("locale", "klingon").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_replace_catalog_revalidates_decks() {
        let server = create_test_server().await;
        let deck = create_deck(&server, "Roland", "01001").await;

        let mut cards = test_cards();
        cards.retain(|c| c.code != "01001");
        let response = server.put("/catalog").json(&json!({ "cards": cards })).await;
        response.assert_status_ok();

        let summary: CatalogSummary = response.json();
        assert_eq!(summary.cards, 7);
        assert_eq!(summary.decks, 1);
        assert_eq!(summary.revision, 2);

        let deck: Deck = server.get(&format!("/decks/{}", deck.id)).await.json();
        assert!(!deck.is_valid);
        assert!(deck.problems.contains(&DeckProblem::UnknownInvestigator {
            code: "01001".to_string()
        }));
    }

    #[tokio::test]
    async fn test_replace_catalog_with_duplicates_is_rejected() {
        let server = create_test_server().await;
        let card = Card::new("01087", "Flashlight", Faction::Neutral, CardType::Asset);

        let response = server
            .put("/catalog")
            .json(&json!({ "cards": [card.clone(), card] }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = server.get("/health").await.json();
        assert_eq!(body["revision"], 0);
    }
}

// =============================================================================
// Decks
// =============================================================================

mod deck_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_fetch_deck() {
        let server = create_test_server().await;
        let deck = create_deck(&server, "Roland's Run", "01001").await;

        assert_eq!(deck.investigator_faction, Some(Faction::Guardian));
        assert!(!deck.is_valid);

        let fetched: Deck = server.get(&format!("/decks/{}", deck.id)).await.json();
        assert_eq!(fetched.id, deck.id);
        assert_eq!(fetched.name, "Roland's Run");
    }

    #[tokio::test]
    async fn test_create_deck_validation_failure() {
        let server = create_test_server().await;

        let response = server
            .post("/decks")
            .json(&json!({ "name": "", "investigator_code": "01001" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert_eq!(body["details"]["fields"][0]["field"], "name");
    }

    #[tokio::test]
    async fn test_set_slot_quantity() {
        let server = create_test_server().await;
        let deck = create_deck(&server, "Roland", "01001").await;

        let response = server
            .put(&format!("/decks/{}/slots/01020", deck.id))
            .json(&json!({ "quantity": 2 }))
            .await;
        response.assert_status_ok();
        let updated: Deck = response.json();
        assert_eq!(updated.slots.get("01020"), Some(&2));

        let response = server
            .put(&format!("/decks/{}/slots/01020", deck.id))
            .json(&json!({ "quantity": 0 }))
            .await;
        let updated: Deck = response.json();
        assert!(updated.slots.is_empty());
    }

    #[tokio::test]
    async fn test_slot_for_unknown_card_is_rejected() {
        let server = create_test_server().await;
        let deck = create_deck(&server, "Roland", "01001").await;

        let response = server
            .put(&format!("/decks/{}/slots/99999", deck.id))
            .json(&json!({ "quantity": 1 }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_huge_quantity_rejected_and_server_keeps_working() {
        let server = create_test_server().await;
        let deck = create_deck(&server, "Roland", "01001").await;

        for code in ["01020", "01030"] {
            let response = server
                .put(&format!("/decks/{}/slots/{}", deck.id, code))
                .json(&json!({ "quantity": 4_000_000_000u32 }))
                .await;
            response.assert_status(StatusCode::BAD_REQUEST);
        }

        let response = server.get(&format!("/decks/{}", deck.id)).await;
        response.assert_status_ok();
        let current: Deck = response.json();
        assert!(current.slots.is_empty());
        server.get("/cards").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_patch_deck() {
        let server = create_test_server().await;
        let deck = create_deck(&server, "Roland", "01001").await;

        let response = server
            .patch(&format!("/decks/{}", deck.id))
            .json(&json!({ "name": "Roland, Campaign", "tags": ["Campaign"], "xp": 5 }))
            .await;
        response.assert_status_ok();

        let patched: Deck = response.json();
        assert_eq!(patched.name, "Roland, Campaign");
        assert_eq!(patched.tags, vec!["campaign".to_string()]);
        assert_eq!(patched.xp, Some(5));

        let response = server
            .patch(&format!("/decks/{}", deck.id))
            .json(&json!({}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_deck() {
        let server = create_test_server().await;
        let deck = create_deck(&server, "Roland", "01001").await;

        server
            .delete(&format!("/decks/{}", deck.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get(&format!("/decks/{}", deck.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .delete(&format!("/decks/{}", deck.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_decks_filtered_by_faction() {
        let server = create_test_server().await;
        create_deck(&server, "Roland", "01001").await;
        create_deck(&server, "Daisy", "01002").await;
        create_deck(&server, "Another Daisy", "01002").await;

        let response = server
            .get("/decks")
            .add_query_param("filter", r#"{"faction":"seeker"}"#)
            .add_query_param("sort", "name")
            .await;
        response.assert_status_ok();

        let body: PaginatedResponse<Deck> = response.json();
        let names: Vec<&str> = body.data.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Another Daisy", "Daisy"]);
        assert_eq!(body.pagination.total, 2);
    }
}

// =============================================================================
// Settings
// =============================================================================

mod settings_tests {
    use super::*;

    #[tokio::test]
    async fn test_settings_round_trip_through_file() {
        let dir = tempdir().expect("temp dir");
        let mut config = AppConfig::default_config();
        config.storage.settings_path = Some(dir.path().join("settings.json"));

        let app = ServerBuilder::from_config(config.clone())
            .with_cards(test_cards())
            .build()
            .await
            .expect("Failed to build app");
        let server = TestServer::new(app);

        let settings = json!({
            "locale": "sv-SE",
            "page_size": 3,
            "views": {
                "cards": {
                    "filters": { "cost": [0.1, 2.75] },
                    "sort": [{ "field": "cost", "direction": "desc" }]
                }
            }
        });
        let response = server.put("/settings").json(&settings).await;
        response.assert_status_ok();
        let saved: SettingsResponse = response.json();
        assert_eq!(saved.revision, 1);

        // a fresh server on the same file sees the saved view
        let app = ServerBuilder::from_config(config)
            .with_cards(test_cards())
            .build()
            .await
            .expect("Failed to build app");
        let server = TestServer::new(app);

        let loaded: SettingsResponse = server.get("/settings").await.json();
        assert_eq!(loaded.settings, saved.settings);
        assert_eq!(
            loaded.settings.views["cards"].filters["cost"],
            json!([0.1, 2.75])
        );

        // the saved view applies when the request names no filter or sort
        let body: PaginatedResponse<Card> = server.get("/cards").await.json();
        assert_eq!(card_codes(&body), vec!["01087", "01030"]);
        assert_eq!(body.pagination.limit, 3);
    }

    #[tokio::test]
    async fn test_invalid_settings_rejected() {
        let server = create_test_server().await;

        let response = server
            .put("/settings")
            .json(&json!({ "page_size": 0 }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .put("/settings")
            .json(&json!({ "views": { "cards": { "filters": { "colour": "red" } } } }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let current: SettingsResponse = server.get("/settings").await.json();
        assert_eq!(current.revision, 0);
    }

    #[tokio::test]
    async fn test_saved_sort_on_unknown_field_rejected() {
        let server = create_test_server().await;

        let response = server
            .put("/settings")
            .json(&json!({ "views": { "cards": { "sort": [{ "field": "flavor" }] } } }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "UNKNOWN_SORT_FIELD");

        server.get("/cards").await.assert_status_ok();
        let current: SettingsResponse = server.get("/settings").await.json();
        assert_eq!(current.revision, 0);
    }
}
