//! Translation orchestration and history endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use mediglot_store::{NewTranslation, TranslationRecord};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::extract::Json;
use crate::AppState;

#[derive(Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    source_lang: Option<String>,
    #[serde(default)]
    target_lang: Option<String>,
}

#[derive(Serialize)]
pub struct TranslateResponse {
    translated_text: String,
    detected_language: String,
    medical_suggestions: Vec<String>,
}

/// `POST /api/translate`
///
/// Detection and suggestion failures never fail the request; only the
/// translation provider itself is allowed to, and that surfaces as 503.
pub async fn translate(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let text = req.text.unwrap_or_default();
    let target_lang = req.target_lang.unwrap_or_default();
    if text.is_empty() || target_lang.is_empty() {
        return Err(ApiError::BadRequest(
            "Please provide text and target language".into(),
        ));
    }

    let source_lang = match req.source_lang.as_deref() {
        Some(lang) if lang != "auto" && !lang.is_empty() => lang.to_string(),
        _ => state.translator.detect(&text).await.0,
    };

    let medical_suggestions = suggest_isolated(&state, &text).await;

    let translated_text = state
        .translator
        .translate(&text, &source_lang, &target_lang)
        .await?;

    let record = NewTranslation {
        original_text: text,
        translated_text: translated_text.clone(),
        source_language: source_lang.clone(),
        target_language: target_lang,
        medical_suggestions: medical_suggestions.clone(),
    };
    state
        .with_store(move |s| s.insert_translation(user.id, &record).map(|_| ()))
        .await?;

    Ok(Json(TranslateResponse {
        translated_text,
        detected_language: source_lang,
        medical_suggestions,
    }))
}

/// Run the suggestion engine off the async worker thread, degrading to no
/// suggestions if the task fails for any reason (including a panic).
async fn suggest_isolated(state: &AppState, text: &str) -> Vec<String> {
    let vocab = state.vocab.load_full();
    let config = state.match_config.clone();
    let text = text.to_string();
    let result = tokio::task::spawn_blocking(move || {
        mediglot_core::suggest_with_config(&text, &vocab, &config)
    })
    .await;

    match result {
        Ok(set) => set.into_iter().collect(),
        Err(e) => {
            tracing::warn!(error = %e, "suggestion engine failed, continuing without suggestions");
            Vec::new()
        }
    }
}

/// `GET /api/translations`
pub async fn list_translations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<TranslationRecord>>, ApiError> {
    let records = state
        .with_store(move |s| s.list_translations(user.id))
        .await?;
    Ok(Json(records))
}

/// `DELETE /api/translations/{id}`
pub async fn delete_translation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .with_store(move |s| s.delete_translation(id, user.id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/translations/{id}/toggle_favorite`
pub async fn toggle_favorite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<TranslationRecord>, ApiError> {
    let record = state
        .with_store(move |s| s.toggle_favorite(id, user.id))
        .await?;
    Ok(Json(record))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let vocab = state.vocab.load();
    Json(json!({
        "status": "ok",
        "vocabulary_terms": vocab.len(),
    }))
}
