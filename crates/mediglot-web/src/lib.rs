//! HTTP server for the mediglot healthcare translation service.
//!
//! Thin orchestrator over the core crates: detection + translation via
//! [`mediglot_clients`], suggestions via [`mediglot_core`], persistence via
//! [`mediglot_store`]. The vocabulary is loaded once at startup and shared
//! behind an [`arc_swap::ArcSwap`] so a future hot reload is an atomic
//! pointer swap.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use mediglot_clients::MyMemoryClient;
use mediglot_core::{MatchConfig, MedicalVocabulary};
use mediglot_store::{Store, StoreError};

mod auth;
mod error;
mod extract;
mod handlers;

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub vocab: Arc<ArcSwap<MedicalVocabulary>>,
    store: Arc<Mutex<Store>>,
    pub translator: MyMemoryClient,
    pub match_config: MatchConfig,
}

impl AppState {
    pub fn new(vocab: MedicalVocabulary, store: Store, translator: MyMemoryClient) -> Self {
        Self {
            vocab: Arc::new(ArcSwap::from_pointee(vocab)),
            store: Arc::new(Mutex::new(store)),
            translator,
            match_config: MatchConfig::default(),
        }
    }

    /// Run a store operation on the blocking pool.
    ///
    /// rusqlite calls block, so they never run directly on an async worker
    /// thread.
    pub(crate) async fn with_store<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Store) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let store = store.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            f(&store)
        })
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("store task failed: {e}")))?
        .map_err(ApiError::from)
    }
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/profile", get(auth::get_profile).put(auth::update_profile))
        .route("/api/translate", post(handlers::translate))
        .route("/api/translations", get(handlers::list_translations))
        .route("/api/translations/{id}", delete(handlers::delete_translation))
        .route(
            "/api/translations/{id}/toggle_favorite",
            post(handlers::toggle_favorite),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
