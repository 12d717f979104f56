use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::content::{Lesson, LessonSummary};
use crate::response::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LangQuery {
    lang: Option<String>,
}

// Bilingual manifests ship a Spanish default plus optional English fields;
// `?lang=en` swaps them in.
fn localize_lesson(lesson: &mut Lesson, lang: Option<&str>) {
    if lang == Some("en") && !lesson.title_en.is_empty() {
        lesson.title = lesson.title_en.clone();
        lesson.description = lesson.description_en.clone();
        lesson.explanation = lesson.explanation_en.clone();
    }
}

fn localize_summary(summary: &mut LessonSummary, lang: Option<&str>) {
    if lang == Some("en") && !summary.title_en.is_empty() {
        summary.title = summary.title_en.clone();
        summary.description = summary.description_en.clone();
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> impl IntoResponse {
    let summaries: Vec<LessonSummary> = state
        .content()
        .list_all()
        .iter()
        .map(|lesson| {
            let mut summary = lesson.to_summary();
            localize_summary(&mut summary, query.lang.as_deref());
            summary
        })
        .collect();

    Json(summaries)
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LangQuery>,
) -> Result<impl IntoResponse, AppError> {
    let lesson = state
        .content()
        .get(&id)
        .ok_or_else(|| AppError::not_found("Lesson not found"))?;

    let mut lesson = (*lesson).clone();
    localize_lesson(&mut lesson, query.lang.as_deref());

    Ok(Json(lesson))
}

pub async fn by_language(
    State(state): State<AppState>,
    Path(language): Path<String>,
    Query(query): Query<LangQuery>,
) -> impl IntoResponse {
    let summaries: Vec<LessonSummary> = state
        .content()
        .list_by_language(&language)
        .iter()
        .map(|lesson| {
            let mut summary = lesson.to_summary();
            localize_summary(&mut summary, query.lang.as_deref());
            summary
        })
        .collect();

    Json(summaries)
}

pub async fn languages(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.content().languages())
}
