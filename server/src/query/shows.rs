use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, EntityTrait, LoaderTrait,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use time::{OffsetDateTime, UtcOffset};

use super::{Fields, QueryError};
use entity::{ArtistEntity, ShowActive, ShowColumn, ShowEntity, VenueEntity};

/// A booking as submitted, before the artist and venue are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewShow {
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: OffsetDateTime,
}

impl TryFrom<&Fields> for NewShow {
    type Error = QueryError;

    fn try_from(fields: &Fields) -> Result<Self, Self::Error> {
        Ok(NewShow {
            artist_id: fields.id("artist_id")?,
            venue_id: fields.id("venue_id")?,
            start_time: fields.timestamp("start_time")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowListing {
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
}

/// Books `show`, failing with a validation error when either side of the
/// booking doesn't exist.
pub async fn create<C>(db: &C, show: NewShow) -> Result<i32, QueryError>
where
    C: TransactionTrait,
{
    let tx = db.begin().await?;
    if ArtistEntity::find_by_id(show.artist_id).one(&tx).await?.is_none() {
        return Err(QueryError::validation(
            "artist_id",
            format!("no artist with id {}", show.artist_id),
        ));
    }
    if VenueEntity::find_by_id(show.venue_id).one(&tx).await?.is_none() {
        return Err(QueryError::validation(
            "venue_id",
            format!("no venue with id {}", show.venue_id),
        ));
    }
    let created = ShowActive {
        id: NotSet,
        artist_id: Set(show.artist_id),
        venue_id: Set(show.venue_id),
        start_time: Set(show.start_time.to_offset(UtcOffset::UTC)),
    }
    .insert(&tx)
    .await?;
    tx.commit().await?;
    tracing::info! {
        id = created.id,
        artist_id = created.artist_id,
        venue_id = created.venue_id,
        start_time = %created.start_time,
        "Show listed"
    };
    Ok(created.id)
}

/// Every show, past and upcoming, by start time.
pub async fn list<C>(db: &C) -> Result<Vec<ShowListing>, QueryError>
where
    C: ConnectionTrait,
{
    let shows = ShowEntity::find()
        .order_by_asc(ShowColumn::StartTime)
        .order_by_asc(ShowColumn::Id)
        .all(db)
        .await?;
    let artists = shows.load_one(ArtistEntity, db).await?;
    let venues = shows.load_one(VenueEntity, db).await?;

    Ok(shows
        .into_iter()
        .zip(artists.into_iter().zip(venues))
        .filter_map(|(show, pair)| match pair {
            (Some(artist), Some(venue)) => Some(ShowListing {
                venue_id: venue.id,
                venue_name: venue.name,
                artist_id: artist.id,
                artist_name: artist.name,
                artist_image_link: artist.image_link,
                start_time: show.start_time,
            }),
            _ => None,
        })
        .collect())
}
