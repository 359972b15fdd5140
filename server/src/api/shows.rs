use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    Form, Json,
};

use super::{AppState, Created, Error};
use crate::query::{
    shows::{self, NewShow, ShowListing},
    Fields,
};

pub async fn shows(State(state): State<AppState>) -> Result<Json<Vec<ShowListing>>, Error> {
    Ok(Json(shows::list(&state.db).await?))
}

pub async fn create(
    State(state): State<AppState>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<(StatusCode, Json<Created>), Error> {
    let Form(pairs) = form?;
    let show = NewShow::try_from(&Fields::from(pairs))?;
    let id = shows::create(&state.db, show).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}
