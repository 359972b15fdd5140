use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Form, Json,
};
use entity::Artist;

use super::{AppState, Created, Error, SearchForm};
use crate::query::{self, artists, EntityKind, Fields, Named, SearchResult};

pub async fn artists(State(state): State<AppState>) -> Result<Json<Vec<Named>>, Error> {
    Ok(Json(artists::list(&state.db).await?))
}

pub async fn search(
    State(state): State<AppState>,
    form: Result<Form<SearchForm>, FormRejection>,
) -> Result<Json<SearchResult>, Error> {
    let Form(form) = form?;
    Ok(Json(
        query::search_by_name(&state.db, EntityKind::Artist, &form.search_term).await?,
    ))
}

pub async fn artist(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<artists::ArtistDetail>, Error> {
    let Path(id) = id?;
    Ok(Json(artists::detail(&state.db, id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<(StatusCode, Json<Created>), Error> {
    let Form(pairs) = form?;
    let id = artists::create(&state.db, &Fields::from(pairs)).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn edit(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Artist>, Error> {
    let Path(id) = id?;
    Ok(Json(artists::find(&state.db, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Json<Artist>, Error> {
    let Path(id) = id?;
    let Form(pairs) = form?;
    artists::update(&state.db, id, &Fields::from(pairs)).await?;
    Ok(Json(artists::find(&state.db, id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, Error> {
    let Path(id) = id?;
    artists::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
