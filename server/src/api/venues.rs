use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Form, Json,
};
use entity::Venue;

use super::{AppState, Created, Error, SearchForm};
use crate::query::{self, venues, EntityKind, Fields, SearchResult};

pub async fn venues(State(state): State<AppState>) -> Result<Json<Vec<venues::Area>>, Error> {
    Ok(Json(venues::list_grouped_by_location(&state.db).await?))
}

pub async fn search(
    State(state): State<AppState>,
    form: Result<Form<SearchForm>, FormRejection>,
) -> Result<Json<SearchResult>, Error> {
    let Form(form) = form?;
    Ok(Json(
        query::search_by_name(&state.db, EntityKind::Venue, &form.search_term).await?,
    ))
}

pub async fn venue(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<venues::VenueDetail>, Error> {
    let Path(id) = id?;
    Ok(Json(venues::detail(&state.db, id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<(StatusCode, Json<Created>), Error> {
    let Form(pairs) = form?;
    let id = venues::create(&state.db, &Fields::from(pairs)).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn edit(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Venue>, Error> {
    let Path(id) = id?;
    Ok(Json(venues::find(&state.db, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Json<Venue>, Error> {
    let Path(id) = id?;
    let Form(pairs) = form?;
    venues::update(&state.db, id, &Fields::from(pairs)).await?;
    Ok(Json(venues::find(&state.db, id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, Error> {
    let Path(id) = id?;
    venues::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
