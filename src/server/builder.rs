//! ServerBuilder for fluent API to build HTTP servers

use super::router::build_routes;
use super::state::AppState;
use crate::catalog::{Catalog, CatalogStore, ListenerGuard, SyncListener};
use crate::config::AppConfig;
use crate::core::card::Card;
use crate::core::deck::Deck;
use crate::core::events::SyncBus;
use crate::core::settings::Settings;
use crate::storage::{InMemoryStateStore, JsonFileStore, SettingsService, StateStore};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for creating the deckbuild HTTP server
///
/// Storage defaults follow the configuration: a configured path selects a
/// JSON file store, otherwise state stays in memory.
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::from_config(AppConfig::from_yaml_file("deckbuild.yaml")?)
///     .with_cards(cards)
///     .build()
///     .await?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    cards: Vec<Card>,
    decks: Option<Vec<Deck>>,
    settings_store: Option<Arc<dyn StateStore<Settings>>>,
    deck_store: Option<Arc<dyn StateStore<Vec<Deck>>>>,
    sync_bus: Option<SyncBus>,
}

impl ServerBuilder {
    /// Create a builder with the default configuration
    pub fn new() -> Self {
        Self::from_config(AppConfig::default_config())
    }

    pub fn from_config(config: AppConfig) -> Self {
        Self {
            config,
            cards: Vec::new(),
            decks: None,
            settings_store: None,
            deck_store: None,
            sync_bus: None,
        }
    }

    /// Initial card catalog
    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.cards = cards;
        self
    }

    /// Initial decks, replacing whatever the deck store holds
    pub fn with_decks(mut self, decks: Vec<Deck>) -> Self {
        self.decks = Some(decks);
        self
    }

    pub fn with_settings_store(mut self, store: impl StateStore<Settings> + 'static) -> Self {
        self.settings_store = Some(Arc::new(store));
        self
    }

    pub fn with_deck_store(mut self, store: impl StateStore<Vec<Deck>> + 'static) -> Self {
        self.deck_store = Some(Arc::new(store));
        self
    }

    /// Join an existing sync bus
    ///
    /// Servers built on the same bus behave as sessions of one user: every
    /// commit in one is applied by the others.
    pub fn with_sync_bus(mut self, bus: SyncBus) -> Self {
        self.sync_bus = Some(bus);
        self
    }

    fn settings_store(&mut self) -> Arc<dyn StateStore<Settings>> {
        match (self.settings_store.take(), &self.config.storage.settings_path) {
            (Some(store), _) => store,
            (None, Some(path)) => Arc::new(JsonFileStore::new(path.clone())),
            (None, None) => Arc::new(InMemoryStateStore::new()),
        }
    }

    fn deck_store(&mut self) -> Arc<dyn StateStore<Vec<Deck>>> {
        match (self.deck_store.take(), &self.config.storage.decks_path) {
            (Some(store), _) => store,
            (None, Some(path)) => Arc::new(JsonFileStore::new(path.clone())),
            (None, None) => Arc::new(InMemoryStateStore::new()),
        }
    }

    /// Build the handler state and start the sync listener
    ///
    /// Must be called from within a tokio runtime. The listener stops when the
    /// last clone of the returned state is dropped.
    pub async fn build_state(mut self) -> Result<AppState> {
        self.config.validate()?;
        let card_filters = Arc::new(self.config.card_registry()?);
        let deck_filters = Arc::new(self.config.deck_registry()?);

        let settings_store = self.settings_store();
        let deck_store = self.deck_store();
        let bus = self
            .sync_bus
            .take()
            .unwrap_or_else(|| SyncBus::new(self.config.sync.capacity));

        let decks = match self.decks.take() {
            Some(decks) => decks,
            None => deck_store.load().await?.unwrap_or_default(),
        };
        let catalog = Catalog::new(std::mem::take(&mut self.cards), decks)?;
        tracing::info!(
            cards = catalog.cards().len(),
            decks = catalog.decks().len(),
            "catalog loaded"
        );

        let catalog = Arc::new(
            CatalogStore::new(catalog)
                .with_bus(bus.clone())
                .with_deck_store(deck_store),
        );

        let defaults = Settings {
            locale: self.config.locale.clone(),
            page_size: self.config.pagination.default_limit,
            ..Default::default()
        };
        let settings = Arc::new(
            SettingsService::load_or(settings_store, defaults)
                .await?
                .with_bus(bus.clone()),
        );

        let listener = SyncListener::new(Arc::clone(&catalog))
            .with_settings(Arc::clone(&settings))
            .spawn(&bus);

        Ok(AppState {
            config: Arc::new(self.config),
            catalog,
            settings,
            card_filters,
            deck_filters,
            sync_listener: Arc::new(ListenerGuard::new(listener)),
        })
    }

    /// Build the final REST router
    pub async fn build(self) -> Result<Router> {
        Ok(build_routes(self.build_state().await?))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the configured address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_address();
        let app = self.build().await?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
