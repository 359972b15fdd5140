use itertools::Itertools;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    LoaderTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use time::OffsetDateTime;

use super::{is_upcoming, now, upcoming_counts, EntityKind, Fields, QueryError};
use entity::{
    ArtistEntity, Genres, ShowColumn, ShowEntity, Venue, VenueActive, VenueColumn, VenueEntity,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<AreaVenue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaVenue {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: i64,
}

/// A show at a venue, with the performing artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistShow {
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueDetail {
    #[serde(flatten)]
    pub venue: Venue,
    pub past_shows: Vec<ArtistShow>,
    pub upcoming_shows: Vec<ArtistShow>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

/// The editable fields of a venue, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueForm {
    pub name: String,
    pub genres: Genres,
    pub city: String,
    pub state: String,
    pub address: Option<String>,
    pub phone: String,
    pub website: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

impl TryFrom<&Fields> for VenueForm {
    type Error = QueryError;

    fn try_from(fields: &Fields) -> Result<Self, Self::Error> {
        Ok(VenueForm {
            name: fields.required("name")?,
            genres: fields.genres(),
            city: fields.required("city")?,
            state: fields.required("state")?,
            address: fields.optional("address"),
            phone: fields.required("phone")?,
            website: fields.website()?,
            image_link: fields.link("image_link")?,
            facebook_link: fields.link("facebook_link")?,
            seeking_talent: fields.checkbox("seeking_talent"),
            seeking_description: fields.optional("seeking_description"),
        })
    }
}

impl VenueForm {
    pub fn into_active_model(self) -> VenueActive {
        VenueActive {
            id: NotSet,
            name: Set(self.name),
            genres: Set(self.genres),
            city: Set(self.city),
            state: Set(self.state),
            address: Set(self.address),
            phone: Set(self.phone),
            website: Set(self.website),
            image_link: Set(self.image_link),
            facebook_link: Set(self.facebook_link),
            seeking_talent: Set(self.seeking_talent),
            seeking_description: Set(self.seeking_description),
        }
    }
}

fn not_found(id: i32) -> QueryError {
    QueryError::NotFound {
        kind: EntityKind::Venue,
        id,
    }
}

/// Venues grouped by city and state, ordered by state then city.
pub async fn list_grouped_by_location<C>(db: &C) -> Result<Vec<Area>, QueryError>
where
    C: ConnectionTrait,
{
    let venues = VenueEntity::find()
        .order_by_asc(VenueColumn::State)
        .order_by_asc(VenueColumn::City)
        .order_by_asc(VenueColumn::Name)
        .order_by_asc(VenueColumn::Id)
        .all(db)
        .await?;
    let counts = upcoming_counts(db, EntityKind::Venue, now()).await?;

    let mut areas = Vec::new();
    for ((city, state), group) in &venues
        .into_iter()
        .group_by(|v| (v.city.to_owned(), v.state.to_owned()))
    {
        areas.push(Area {
            city,
            state,
            venues: group
                .map(|v| AreaVenue {
                    num_upcoming_shows: counts.get(&v.id).copied().unwrap_or(0),
                    id: v.id,
                    name: v.name,
                })
                .collect(),
        });
    }
    Ok(areas)
}

pub async fn find<C>(db: &C, id: i32) -> Result<Venue, QueryError>
where
    C: ConnectionTrait,
{
    VenueEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found(id))
}

/// The venue with its shows split into past and upcoming, each list by
/// start time.
pub async fn detail<C>(db: &C, id: i32) -> Result<VenueDetail, QueryError>
where
    C: ConnectionTrait,
{
    let venue = find(db, id).await?;
    let shows = ShowEntity::find()
        .filter(ShowColumn::VenueId.eq(id))
        .order_by_asc(ShowColumn::StartTime)
        .order_by_asc(ShowColumn::Id)
        .all(db)
        .await?;
    let artists = shows.load_one(ArtistEntity, db).await?;

    let now = now();
    let (upcoming_shows, past_shows): (Vec<_>, Vec<_>) = shows
        .into_iter()
        .zip(artists)
        .filter_map(|(show, artist)| {
            artist.map(|artist| ArtistShow {
                artist_id: artist.id,
                artist_name: artist.name,
                artist_image_link: artist.image_link,
                start_time: show.start_time,
            })
        })
        .partition(|show| is_upcoming(show.start_time, now));

    Ok(VenueDetail {
        venue,
        past_shows_count: past_shows.len(),
        upcoming_shows_count: upcoming_shows.len(),
        past_shows,
        upcoming_shows,
    })
}

pub async fn create<C>(db: &C, fields: &Fields) -> Result<i32, QueryError>
where
    C: TransactionTrait,
{
    let venue: VenueActive = VenueForm::try_from(fields)?.into_active_model();
    let tx = db.begin().await?;
    let venue = venue.insert(&tx).await?;
    tx.commit().await?;
    tracing::info! {id = venue.id, name = %venue.name, "Venue listed"};
    Ok(venue.id)
}

/// Overwrites every editable field of an existing venue.
pub async fn update<C>(db: &C, id: i32, fields: &Fields) -> Result<(), QueryError>
where
    C: TransactionTrait,
{
    let mut venue: VenueActive = VenueForm::try_from(fields)?.into_active_model();
    venue.id = Set(id);
    let tx = db.begin().await?;
    find(&tx, id).await?;
    venue.update(&tx).await?;
    tx.commit().await?;
    tracing::info! {id, "Venue updated"};
    Ok(())
}

/// Removes the venue together with every show it hosts.
pub async fn delete<C>(db: &C, id: i32) -> Result<(), QueryError>
where
    C: TransactionTrait,
{
    let tx = db.begin().await?;
    find(&tx, id).await?;
    let shows = ShowEntity::delete_many()
        .filter(ShowColumn::VenueId.eq(id))
        .exec(&tx)
        .await?;
    VenueEntity::delete_by_id(id).exec(&tx).await?;
    tx.commit().await?;
    tracing::info! {id, shows = shows.rows_affected, "Venue deleted"};
    Ok(())
}
