//! Translation endpoints
//!
//! - GET /api/v1/i18n - Supported languages
//! - GET /api/v1/i18n/{lang} - Full table; unknown languages get the default

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::api::middleware::AppState;

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub default_language: String,
    pub languages: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct TranslationsResponse {
    pub language: String,
    pub translations: BTreeMap<&'static str, &'static str>,
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/i18n", get(languages))
        .route("/i18n/{lang}", get(translations))
}

async fn languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        default_language: state.i18n.default_language().to_string(),
        languages: state.i18n.supported_languages().to_vec(),
    })
}

async fn translations(
    State(state): State<AppState>,
    Path(lang): Path<String>,
) -> Json<TranslationsResponse> {
    let language = state.i18n.resolve(&lang).to_string();
    Json(TranslationsResponse {
        translations: state.i18n.translations(&language).clone(),
        language,
    })
}
