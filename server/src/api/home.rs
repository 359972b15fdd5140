use axum::{extract::State, Json};
use serde::Serialize;

use super::{AppState, Error};
use crate::query::{list_recent, EntityKind, Named};

#[derive(Debug, Serialize)]
pub struct Home {
    pub artists: Vec<Named>,
    pub venues: Vec<Named>,
}

pub async fn home(State(state): State<AppState>) -> Result<Json<Home>, Error> {
    let artists = list_recent(&state.db, EntityKind::Artist, state.recent_limit).await?;
    let venues = list_recent(&state.db, EntityKind::Venue, state.recent_limit).await?;
    Ok(Json(Home { artists, venues }))
}
