//! Typed error handling for deckbuild
//!
//! Errors are grouped by category so callers can match on what went wrong
//! instead of inspecting strings.
//!
//! # Error Categories
//!
//! - [`ConfigError`]: malformed filter, sort, locale or pagination configuration
//! - [`CatalogError`]: catalog snapshots that violate the loader contract
//! - [`DeckError`]: deck lookups and mutations
//! - [`StorageError`]: persistence and lock failures
//! - [`RequestError`]: malformed HTTP payloads
//!
//! # Example
//!
//! ```rust,ignore
//! match pipeline::run(catalog.cards(), &registry, &collator, &query) {
//!     Ok(page) => render(page),
//!     Err(ConfigError::UnknownFilter { key }) => warn_user(&key),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Result alias using [`DeckbuildError`]
pub type DeckbuildResult<T> = Result<T, DeckbuildError>;

/// The main error type
#[derive(Debug, Error)]
pub enum DeckbuildError {
    /// Filter, sort, locale or pagination configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Catalog snapshot errors
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Deck errors
    #[error(transparent)]
    Deck(#[from] DeckError),

    /// Persistence errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// HTTP/Request errors
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Internal errors (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl DeckbuildError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeckbuildError::Config(_) => StatusCode::BAD_REQUEST,
            DeckbuildError::Catalog(e) => e.status_code(),
            DeckbuildError::Deck(e) => e.status_code(),
            DeckbuildError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DeckbuildError::Request(_) => StatusCode::BAD_REQUEST,
            DeckbuildError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DeckbuildError::Config(e) => e.error_code(),
            DeckbuildError::Catalog(e) => e.error_code(),
            DeckbuildError::Deck(e) => e.error_code(),
            DeckbuildError::Storage(_) => "STORAGE_ERROR",
            DeckbuildError::Request(e) => e.error_code(),
            DeckbuildError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            DeckbuildError::Config(ConfigError::UnknownFilter { key })
            | DeckbuildError::Config(ConfigError::MalformedFilter { key, .. }) => {
                Some(serde_json::json!({ "filter": key }))
            }
            DeckbuildError::Config(ConfigError::UnknownSortField { field }) => {
                Some(serde_json::json!({ "sort_field": field }))
            }
            DeckbuildError::Deck(DeckError::NotFound { id }) => {
                Some(serde_json::json!({ "deck_id": id.to_string() }))
            }
            DeckbuildError::Request(RequestError::ValidationFailed { fields }) => {
                Some(serde_json::json!({ "fields": fields }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for DeckbuildError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors in filter, sort, locale or pagination configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Unknown filter '{key}'")]
    UnknownFilter { key: String },

    #[error("Malformed value for filter '{key}': {message}")]
    MalformedFilter { key: String, message: String },

    #[error("Invalid range for filter '{key}': min {min} is greater than max {max}")]
    InvalidRange { key: String, min: f64, max: f64 },

    #[error("Field '{field}' cannot be used for sorting")]
    UnknownSortField { field: String },

    #[error("Malformed sort expression '{expression}': {message}")]
    MalformedSort { expression: String, message: String },

    #[error("Invalid locale '{locale}'")]
    InvalidLocale { locale: String },

    #[error("Invalid pagination: {message}")]
    InvalidPagination { message: String },

    #[error("Invalid filter definition '{key}': {message}")]
    InvalidDefinition { key: String, message: String },
}

impl ConfigError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::UnknownFilter { .. } => "UNKNOWN_FILTER",
            ConfigError::MalformedFilter { .. } => "MALFORMED_FILTER",
            ConfigError::InvalidRange { .. } => "INVALID_RANGE",
            ConfigError::UnknownSortField { .. } => "UNKNOWN_SORT_FIELD",
            ConfigError::MalformedSort { .. } => "MALFORMED_SORT",
            ConfigError::InvalidLocale { .. } => "INVALID_LOCALE",
            ConfigError::InvalidPagination { .. } => "INVALID_PAGINATION",
            ConfigError::InvalidDefinition { .. } => "INVALID_FILTER_DEFINITION",
        }
    }
}

// =============================================================================
// Catalog Errors
// =============================================================================

/// Errors raised while building or reading a catalog snapshot
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("Duplicate card code '{code}' in catalog")]
    DuplicateCardCode { code: String },

    #[error("Duplicate deck id '{id}' in catalog")]
    DuplicateDeckId { id: Uuid },

    #[error("Card '{code}' not found")]
    CardNotFound { code: String },
}

impl CatalogError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::DuplicateCardCode { .. } | CatalogError::DuplicateDeckId { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            CatalogError::CardNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            CatalogError::DuplicateCardCode { .. } => "DUPLICATE_CARD_CODE",
            CatalogError::DuplicateDeckId { .. } => "DUPLICATE_DECK_ID",
            CatalogError::CardNotFound { .. } => "CARD_NOT_FOUND",
        }
    }
}

// =============================================================================
// Deck Errors
// =============================================================================

/// Errors related to deck operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeckError {
    #[error("Deck with id '{id}' not found")]
    NotFound { id: Uuid },

    #[error("Card '{code}' is not in the catalog")]
    UnknownCard { code: String },

    #[error("Quantity {quantity} of card '{code}' exceeds the maximum of {max}")]
    QuantityTooLarge { code: String, quantity: u32, max: u32 },
}

impl DeckError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeckError::NotFound { .. } => StatusCode::NOT_FOUND,
            DeckError::UnknownCard { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            DeckError::QuantityTooLarge { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            DeckError::NotFound { .. } => "DECK_NOT_FOUND",
            DeckError::UnknownCard { .. } => "UNKNOWN_CARD",
            DeckError::QuantityTooLarge { .. } => "QUANTITY_TOO_LARGE",
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to persistence and shared state
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to acquire {0} lock")]
    LockPoisoned(&'static str),
}

// =============================================================================
// Request Errors
// =============================================================================

/// A single field validation failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Errors related to HTTP payloads
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Validation failed for {} field(s)", fields.len())]
    ValidationFailed { fields: Vec<FieldError> },
}

impl RequestError {
    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::BadRequest { .. } => "BAD_REQUEST",
            RequestError::ValidationFailed { .. } => "VALIDATION_FAILED",
        }
    }
}

impl From<validator::ValidationErrors> for RequestError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| FieldError {
                    field: field.to_string(),
                    message: err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        RequestError::ValidationFailed { fields }
    }
}
