//! Comparison tray endpoints.

use super::AppState;
use crate::{
    core::{
        comparison::{AddOutcome, MAX_COMPARISON_ITEMS},
        property,
    },
    errors::{Error, Result},
    models::Property,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ComparisonView {
    pub items: Vec<Property>,
    pub capacity: usize,
}

impl ComparisonView {
    fn of(items: &[Property]) -> Self {
        Self {
            items: items.to_vec(),
            capacity: MAX_COMPARISON_ITEMS,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub property_id: String,
}

pub async fn list(State(state): State<AppState>) -> Json<ComparisonView> {
    let set = state.comparison.lock().await;
    Json(ComparisonView::of(set.items()))
}

/// Snapshots the current state of the listing into the tray. A full tray answers 409.
pub async fn add(
    State(state): State<AppState>,
    Json(request): Json<AddRequest>,
) -> Result<(StatusCode, Json<ComparisonView>)> {
    let property = property::get_property(&state.db, &request.property_id)
        .await?
        .ok_or_else(|| Error::PropertyNotFound {
            id: request.property_id.clone(),
        })?;

    let mut set = state.comparison.lock().await;
    let status = match set.add(&property).await? {
        AddOutcome::Added => StatusCode::CREATED,
        AddOutcome::AlreadyPresent => StatusCode::OK,
    };
    Ok((status, Json(ComparisonView::of(set.items()))))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ComparisonView>> {
    let mut set = state.comparison.lock().await;
    set.remove(&id).await?;
    Ok(Json(ComparisonView::of(set.items())))
}

pub async fn clear(State(state): State<AppState>) -> Result<StatusCode> {
    state.comparison.lock().await.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}
