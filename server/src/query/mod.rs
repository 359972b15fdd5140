//! Data access for venues, artists and shows.
//!
//! Every function takes the connection it runs against. Reads accept any
//! [`ConnectionTrait`] so they can share a caller's transaction, writes open
//! their own transaction and only commit once every statement succeeded.

pub mod artists;
pub mod fields;
pub mod shows;
pub mod venues;

#[cfg(test)]
pub(crate) mod testing;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use thiserror::Error;
use time::OffsetDateTime;

use entity::{ArtistColumn, ArtistEntity, ShowColumn, ShowEntity, VenueColumn, VenueEntity};

pub use fields::Fields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Venue,
    Artist,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Venue => write!(f, "Venue"),
            EntityKind::Artist => write!(f, "Artist"),
        }
    }
}

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i32 },

    #[error("Database operation failed: {0}")]
    OperationFailed(#[from] DbErr),
}

impl QueryError {
    pub(crate) fn validation<R: Into<String>>(field: &'static str, reason: R) -> Self {
        QueryError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// The instant shows are classified against.
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// A show starting exactly at `now` counts as upcoming.
pub fn is_upcoming(start_time: OffsetDateTime, now: OffsetDateTime) -> bool {
    start_time >= now
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct Named {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchItem {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub count: usize,
    pub data: Vec<SearchItem>,
}

#[derive(Debug, FromQueryResult)]
struct ShowCount {
    id: i32,
    count: i64,
}

/// Case-insensitive substring test, folding Unicode the same way on both
/// sides. `%` and `_` in the term are plain characters.
fn name_matches(name: &str, term: &str) -> bool {
    name.to_lowercase().contains(&term.to_lowercase())
}

async fn find_named<E, C>(
    db: &C,
    id: E::Column,
    name: E::Column,
    term: Option<&str>,
    limit: Option<u64>,
) -> Result<Vec<Named>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let select = E::find()
        .select_only()
        .column(id)
        .column(name)
        .order_by_asc(name)
        .order_by_asc(id);
    let Some(term) = term else {
        return match limit {
            Some(limit) => select.limit(limit),
            None => select,
        }
        .into_model::<Named>()
        .all(db)
        .await;
    };
    // SQLite's lower() only folds ASCII, so names are matched here
    let named = select.into_model::<Named>().all(db).await?;
    Ok(named
        .into_iter()
        .filter(|n| name_matches(&n.name, term))
        .take(limit.map_or(usize::MAX, |l| l as usize))
        .collect())
}

/// Number of upcoming shows keyed by venue or artist id. Ids without
/// upcoming shows are absent from the map.
pub(crate) async fn upcoming_counts<C>(
    db: &C,
    kind: EntityKind,
    now: OffsetDateTime,
) -> Result<HashMap<i32, i64>, DbErr>
where
    C: ConnectionTrait,
{
    let column = match kind {
        EntityKind::Venue => ShowColumn::VenueId,
        EntityKind::Artist => ShowColumn::ArtistId,
    };
    let counts = ShowEntity::find()
        .select_only()
        .column_as(column, "id")
        .column_as(ShowColumn::Id.count(), "count")
        .filter(ShowColumn::StartTime.gte(now))
        .group_by(column)
        .into_model::<ShowCount>()
        .all(db)
        .await?;
    Ok(counts.into_iter().map(|c| (c.id, c.count)).collect())
}

/// Up to `limit` records of the given kind, by name, for the landing page.
pub async fn list_recent<C>(db: &C, kind: EntityKind, limit: u64) -> Result<Vec<Named>, QueryError>
where
    C: ConnectionTrait,
{
    let named = match kind {
        EntityKind::Venue => {
            find_named::<VenueEntity, _>(db, VenueColumn::Id, VenueColumn::Name, None, Some(limit))
                .await?
        }
        EntityKind::Artist => {
            find_named::<ArtistEntity, _>(
                db,
                ArtistColumn::Id,
                ArtistColumn::Name,
                None,
                Some(limit),
            )
            .await?
        }
    };
    Ok(named)
}

/// Case-insensitive substring search on the name. An empty term matches
/// every record. The term is used as submitted, surrounding spaces included.
pub async fn search_by_name<C>(
    db: &C,
    kind: EntityKind,
    term: &str,
) -> Result<SearchResult, QueryError>
where
    C: ConnectionTrait,
{
    let named = match kind {
        EntityKind::Venue => {
            find_named::<VenueEntity, _>(db, VenueColumn::Id, VenueColumn::Name, Some(term), None)
                .await?
        }
        EntityKind::Artist => {
            find_named::<ArtistEntity, _>(
                db,
                ArtistColumn::Id,
                ArtistColumn::Name,
                Some(term),
                None,
            )
            .await?
        }
    };
    let counts = upcoming_counts(db, kind, now()).await?;
    let data: Vec<SearchItem> = named
        .into_iter()
        .map(|Named { id, name }| SearchItem {
            num_upcoming_shows: counts.get(&id).copied().unwrap_or(0),
            id,
            name,
        })
        .collect();
    tracing::debug! {%kind, %term, count = data.len(), "Searched by name"};
    Ok(SearchResult {
        count: data.len(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::testing::{artist, database, show, venue};
    use super::*;
    use time::Duration;

    #[test]
    fn exact_now_is_upcoming() {
        let now = now();
        assert!(is_upcoming(now, now));
        assert!(is_upcoming(now + Duration::seconds(1), now));
        assert!(!is_upcoming(now - Duration::seconds(1), now));
    }

    #[tokio::test]
    async fn recent_is_ordered_by_name_and_limited() {
        let db = database().await;
        for name in ["Gamma", "Alpha", "Delta", "Beta"] {
            artist(&db, name).await;
        }
        let recent = list_recent(&db, EntityKind::Artist, 3).await.unwrap();
        let names: Vec<&str> = recent.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["Alpha", "Beta", "Delta"]);

        let venues = list_recent(&db, EntityKind::Venue, 10).await.unwrap();
        assert!(venues.is_empty());
    }

    #[tokio::test]
    async fn search_ignores_case() {
        let db = database().await;
        let hop = venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        venue(&db, "The Dueling Pianos Bar", "New York", "NY").await;
        venue(&db, "Park Square Live Music & Coffee", "San Francisco", "CA").await;

        for term in ["hop", "HOP", "Hop"] {
            let result = search_by_name(&db, EntityKind::Venue, term).await.unwrap();
            assert_eq!(result.count, 1);
            assert_eq!(result.data[0].id, hop);
            assert_eq!(result.data[0].name, "The Musical Hop");
        }

        let result = search_by_name(&db, EntityKind::Venue, "Music").await.unwrap();
        let names: Vec<&str> = result.data.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Park Square Live Music & Coffee", "The Musical Hop"]);
    }

    #[test]
    fn matching_folds_unicode() {
        assert!(name_matches("CAFÉ OTTO", "café"));
        assert!(!name_matches("100% Jazz", "_"));
        assert!(name_matches("100% Jazz", "0% j"));
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let db = database().await;
        let otto = venue(&db, "CAFÉ OTTO", "Berlin", "BE").await;
        venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        for term in ["café", "Café", "CAFÉ", "é o"] {
            let result = search_by_name(&db, EntityKind::Venue, term).await.unwrap();
            assert_eq!(result.count, 1, "{}", term);
            assert_eq!(result.data[0].id, otto);
        }
    }

    #[tokio::test]
    async fn term_spaces_are_kept() {
        let db = database().await;
        venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let result = search_by_name(&db, EntityKind::Venue, " hop").await.unwrap();
        assert_eq!(result.count, 1);
        let result = search_by_name(&db, EntityKind::Venue, "hop ").await.unwrap();
        assert_eq!(result.count, 0);
    }

    #[tokio::test]
    async fn empty_term_matches_everything() {
        let db = database().await;
        artist(&db, "Guns N Petals").await;
        artist(&db, "Matt Quevedo").await;
        artist(&db, "The Wild Sax Band").await;

        let result = search_by_name(&db, EntityKind::Artist, "").await.unwrap();
        assert_eq!(result.count, 3);
        let result = search_by_name(&db, EntityKind::Artist, "band").await.unwrap();
        assert_eq!(result.count, 1);
        assert_eq!(result.data[0].name, "The Wild Sax Band");
    }

    #[tokio::test]
    async fn search_counts_upcoming_shows_for_both_kinds() {
        let db = database().await;
        let hop = venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let sax = artist(&db, "The Wild Sax Band").await;
        show(&db, sax, hop, Duration::days(7)).await;
        show(&db, sax, hop, Duration::days(14)).await;
        show(&db, sax, hop, -Duration::days(7)).await;

        let venues = search_by_name(&db, EntityKind::Venue, "hop").await.unwrap();
        assert_eq!(venues.data[0].num_upcoming_shows, 2);
        let artists = search_by_name(&db, EntityKind::Artist, "sax").await.unwrap();
        assert_eq!(artists.data[0].num_upcoming_shows, 2);
    }
}
