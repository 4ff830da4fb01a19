//! Properties of the filter, sort and paginate pipeline over a card catalog

use deckbuild::prelude::*;

// =============================================================================
// Fixtures
// =============================================================================

fn card(code: &str, name: &str, faction: Faction, cost: Option<i64>, traits: &[&str]) -> Card {
    let mut card = Card::new(code, name, faction, CardType::Asset).with_traits(traits);
    card.cost = cost;
    card
}

fn catalog() -> Vec<Card> {
    vec![
        card("01016", ".45 Automatic", Faction::Guardian, Some(4), &["Item", "Weapon", "Firearm"]),
        card("01017", "Physical Training", Faction::Guardian, Some(2), &["Talent"]),
        card("01018", "Beat Cop", Faction::Guardian, Some(4), &["Ally", "Police"]),
        card("01030", "Magnifying Glass", Faction::Seeker, Some(1), &["Item", "Tool"]),
        card("01031", "Old Book of Lore", Faction::Seeker, Some(3), &["Item", "Tome"]),
        card("01032", "Research Librarian", Faction::Seeker, Some(2), &["Ally", "Miskatonic"]),
        card("01045", "Switchblade", Faction::Rogue, Some(1), &["Item", "Weapon", "Melee"]),
        card("01046", "Burglary", Faction::Rogue, Some(1), &["Talent", "Illicit"]),
        card("01059", "Holy Rosary", Faction::Mystic, Some(2), &["Item", "Charm"]),
        card("01060", "Shrivelling", Faction::Mystic, Some(3), &["Spell"]),
        card("01073", "Baseball Bat", Faction::Survivor, Some(2), &["Item", "Weapon", "Melee"]),
        card("01087", "Flashlight", Faction::Neutral, Some(2), &["Item", "Tool"]),
        card("01088", "Emergency Cache", Faction::Neutral, Some(0), &[]),
        card("01093", "Knife", Faction::Neutral, None, &["Item", "Weapon", "Melee"]),
    ]
}

fn en() -> Collator {
    Collator::new(Locale::default())
}

fn codes(items: &[&Card]) -> Vec<String> {
    items.iter().map(|c| c.code.clone()).collect()
}

// =============================================================================
// Properties
// =============================================================================

mod property_tests {
    use super::*;

    #[test]
    fn test_no_filters_matches_whole_catalog() {
        let cards = catalog();
        let page = pipeline::run(&cards, &FilterRegistry::cards(), &en(), &ViewQuery::new())
            .expect("valid query");

        assert_eq!(page.total_count, cards.len());
        assert_eq!(page.items.len(), cards.len());
    }

    #[test]
    fn test_every_item_satisfies_the_filter() {
        let cards = catalog();
        let query = ViewQuery::new()
            .filter("traits", json!(["Weapon"]))
            .filter("cost", json!([1, 3]));

        let page = pipeline::run(&cards, &FilterRegistry::cards(), &en(), &query)
            .expect("valid query");

        assert_eq!(codes(&page.items), vec!["01045", "01073"]);
        for card in &page.items {
            assert!(card.traits.iter().any(|t| t == "Weapon"));
            let cost = card.cost.expect("range filter excludes missing cost");
            assert!((1..=3).contains(&cost));
        }
    }

    #[test]
    fn test_sorting_is_deterministic() {
        let cards = catalog();
        let query = ViewQuery::new().sort("cost:desc".parse().expect("valid sort"));

        let first = pipeline::run(&cards, &FilterRegistry::cards(), &en(), &query)
            .expect("valid query");
        let second = pipeline::run(&cards, &FilterRegistry::cards(), &en(), &query)
            .expect("valid query");
        assert_eq!(codes(&first.items), codes(&second.items));

        // reversed input still orders identically
        let mut reversed = cards.clone();
        reversed.reverse();
        let third = pipeline::run(&reversed, &FilterRegistry::cards(), &en(), &query)
            .expect("valid query");
        assert_eq!(codes(&first.items), codes(&third.items));
    }

    #[test]
    fn test_pages_concatenate_to_full_list() {
        let cards = catalog();
        let registry = FilterRegistry::cards();
        let sort: SortSpec = "faction,name".parse().expect("valid sort");

        let full = pipeline::run(&cards, &registry, &en(), &ViewQuery::new().sort(sort.clone()))
            .expect("valid query");

        for limit in 1..=cards.len() + 1 {
            let mut collected = Vec::new();
            let mut offset = 0;
            loop {
                let query = ViewQuery::new()
                    .sort(sort.clone())
                    .page(PageRequest::new(offset, limit));
                let page = pipeline::run(&cards, &registry, &en(), &query).expect("valid query");
                assert!(page.items.len() <= limit);
                assert_eq!(page.total_count, cards.len());
                if page.items.is_empty() {
                    break;
                }
                collected.extend(codes(&page.items));
                offset += limit;
            }
            assert_eq!(collected, codes(&full.items), "limit {}", limit);
        }
    }

    #[test]
    fn test_offset_past_end_is_empty() {
        let cards = catalog();
        let query = ViewQuery::new().page(PageRequest::new(500, 20));
        let page = pipeline::run(&cards, &FilterRegistry::cards(), &en(), &query)
            .expect("valid query");
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, cards.len());
    }
}

// =============================================================================
// Scenarios
// =============================================================================

mod scenario_tests {
    use super::*;

    #[test]
    fn test_faction_filter_selects_single_card() {
        let cards = vec![
            card("A", "Alpha", Faction::Guardian, Some(1), &[]),
            card("B", "Bravo", Faction::Seeker, Some(1), &[]),
            card("C", "Charlie", Faction::Mystic, Some(1), &[]),
        ];
        let query = ViewQuery::new().filter("faction", json!(["mystic"]));

        let page = pipeline::run(&cards, &FilterRegistry::cards(), &en(), &query)
            .expect("valid query");

        assert_eq!(page.total_count, 1);
        assert_eq!(codes(&page.items), vec!["C"]);
    }

    #[test]
    fn test_name_breaks_cost_tie() {
        let cards = vec![
            card("1", "Zoey's Cross", Faction::Guardian, Some(1), &[]),
            card("2", "Machete", Faction::Guardian, Some(3), &[]),
            card("3", "Guard Dog", Faction::Guardian, Some(3), &[]),
        ];
        let query = ViewQuery::new().sort("cost:asc,name".parse().expect("valid sort"));

        let page = pipeline::run(&cards, &FilterRegistry::cards(), &en(), &query)
            .expect("valid query");

        assert_eq!(codes(&page.items), vec!["1", "3", "2"]);
    }

    #[test]
    fn test_missing_cost_sorts_last_both_directions() {
        let cards = catalog();
        for sort in ["cost:asc", "cost:desc"] {
            let query = ViewQuery::new().sort(sort.parse().expect("valid sort"));
            let page = pipeline::run(&cards, &FilterRegistry::cards(), &en(), &query)
                .expect("valid query");
            assert_eq!(page.items.last().map(|c| c.code.as_str()), Some("01093"), "{}", sort);
        }
    }

    #[test]
    fn test_search_ignores_case_and_accents() {
        let mut cards = catalog();
        cards.push(card("99001", "Café Wanderer", Faction::Rogue, Some(2), &[]));

        let query = ViewQuery::new().filter("search", json!("CAFE"));
        let page = pipeline::run(&cards, &FilterRegistry::cards(), &en(), &query)
            .expect("valid query");
        assert_eq!(codes(&page.items), vec!["99001"]);
    }

    #[test]
    fn test_identity_values_are_inactive() {
        let cards = catalog();
        let query = ViewQuery::new()
            .filter("search", json!(""))
            .filter("faction", json!([]))
            .filter("cost", json!({}))
            .filter("unique", json!(null));

        let page = pipeline::run(&cards, &FilterRegistry::cards(), &en(), &query)
            .expect("valid query");
        assert_eq!(page.total_count, cards.len());
    }
}

// =============================================================================
// Configuration errors
// =============================================================================

mod config_error_tests {
    use super::*;

    #[test]
    fn test_unknown_filter_key() {
        let cards = catalog();
        let query = ViewQuery::new().filter("colour", json!(["red"]));
        assert_eq!(
            pipeline::run(&cards, &FilterRegistry::cards(), &en(), &query)
                .expect_err("unknown key"),
            ConfigError::UnknownFilter {
                key: "colour".to_string()
            }
        );
    }

    #[test]
    fn test_inverted_range() {
        let cards = catalog();
        let query = ViewQuery::new().filter("cost", json!([4, 1]));
        assert!(matches!(
            pipeline::run(&cards, &FilterRegistry::cards(), &en(), &query),
            Err(ConfigError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_unknown_sort_field() {
        let cards = catalog();
        let query = ViewQuery::new().sort("flavor".parse().expect("parses"));
        assert_eq!(
            pipeline::run(&cards, &FilterRegistry::cards(), &en(), &query)
                .expect_err("unknown field"),
            ConfigError::UnknownSortField {
                field: "flavor".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_sort_direction() {
        assert!(matches!(
            "cost:sideways".parse::<SortSpec>(),
            Err(ConfigError::MalformedSort { .. })
        ));
    }
}
