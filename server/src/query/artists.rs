use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    LoaderTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use time::OffsetDateTime;

use super::{find_named, is_upcoming, now, EntityKind, Fields, Named, QueryError};
use entity::{
    Artist, ArtistActive, ArtistColumn, ArtistEntity, Genres, ShowColumn, ShowEntity,
    VenueEntity,
};

/// A show by an artist, with the hosting venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueShow {
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistDetail {
    #[serde(flatten)]
    pub artist: Artist,
    pub past_shows: Vec<VenueShow>,
    pub upcoming_shows: Vec<VenueShow>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistForm {
    pub name: String,
    pub genres: Genres,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub looking_for_venues: bool,
    pub looking_for_description: Option<String>,
}

impl TryFrom<&Fields> for ArtistForm {
    type Error = QueryError;

    fn try_from(fields: &Fields) -> Result<Self, Self::Error> {
        Ok(ArtistForm {
            name: fields.required("name")?,
            genres: fields.genres(),
            city: fields.required("city")?,
            state: fields.required("state")?,
            phone: fields.required("phone")?,
            website: fields.website()?,
            image_link: fields.link("image_link")?,
            facebook_link: fields.link("facebook_link")?,
            looking_for_venues: fields.checkbox("seeking_venue"),
            looking_for_description: fields.optional("seeking_description"),
        })
    }
}

impl ArtistForm {
    pub fn into_active_model(self) -> ArtistActive {
        ArtistActive {
            id: NotSet,
            name: Set(self.name),
            genres: Set(self.genres),
            city: Set(self.city),
            state: Set(self.state),
            phone: Set(self.phone),
            website: Set(self.website),
            image_link: Set(self.image_link),
            facebook_link: Set(self.facebook_link),
            looking_for_venues: Set(self.looking_for_venues),
            looking_for_description: Set(self.looking_for_description),
        }
    }
}

fn not_found(id: i32) -> QueryError {
    QueryError::NotFound {
        kind: EntityKind::Artist,
        id,
    }
}

/// Every artist, by name.
pub async fn list<C>(db: &C) -> Result<Vec<Named>, QueryError>
where
    C: ConnectionTrait,
{
    Ok(find_named::<ArtistEntity, _>(db, ArtistColumn::Id, ArtistColumn::Name, None, None).await?)
}

pub async fn find<C>(db: &C, id: i32) -> Result<Artist, QueryError>
where
    C: ConnectionTrait,
{
    ArtistEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn detail<C>(db: &C, id: i32) -> Result<ArtistDetail, QueryError>
where
    C: ConnectionTrait,
{
    let artist = find(db, id).await?;
    let shows = ShowEntity::find()
        .filter(ShowColumn::ArtistId.eq(id))
        .order_by_asc(ShowColumn::StartTime)
        .order_by_asc(ShowColumn::Id)
        .all(db)
        .await?;
    let venues = shows.load_one(VenueEntity, db).await?;

    let now = now();
    let (upcoming_shows, past_shows): (Vec<_>, Vec<_>) = shows
        .into_iter()
        .zip(venues)
        .filter_map(|(show, venue)| {
            venue.map(|venue| VenueShow {
                venue_id: venue.id,
                venue_name: venue.name,
                venue_image_link: venue.image_link,
                start_time: show.start_time,
            })
        })
        .partition(|show| is_upcoming(show.start_time, now));

    Ok(ArtistDetail {
        artist,
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
    let artist: ArtistActive = ArtistForm::try_from(fields)?.into_active_model();
    let tx = db.begin().await?;
    let artist = artist.insert(&tx).await?;
    tx.commit().await?;
    tracing::info! {id = artist.id, name = %artist.name, "Artist listed"};
    Ok(artist.id)
}

pub async fn update<C>(db: &C, id: i32, fields: &Fields) -> Result<(), QueryError>
where
    C: TransactionTrait,
{
    let mut artist: ArtistActive = ArtistForm::try_from(fields)?.into_active_model();
    artist.id = Set(id);
    let tx = db.begin().await?;
    find(&tx, id).await?;
    artist.update(&tx).await?;
    tx.commit().await?;
    tracing::info! {id, "Artist updated"};
    Ok(())
}

pub async fn delete<C>(db: &C, id: i32) -> Result<(), QueryError>
where
    C: TransactionTrait,
{
    let tx = db.begin().await?;
    find(&tx, id).await?;
    let shows = ShowEntity::delete_many()
        .filter(ShowColumn::ArtistId.eq(id))
        .exec(&tx)
        .await?;
    ArtistEntity::delete_by_id(id).exec(&tx).await?;
    tx.commit().await?;
    tracing::info! {id, shows = shows.rows_affected, "Artist deleted"};
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::testing::{artist, database, fields, show, venue};
    use super::super::shows;
    use super::*;
    use time::Duration;

    fn petals_fields() -> Fields {
        fields(&[
            ("name", "Guns N Petals"),
            ("city", "San Francisco"),
            ("state", "CA"),
            ("phone", "326-123-5000"),
            ("genres", "Rock n Roll"),
            ("website_link", "https://www.gunsnpetalsband.com"),
            ("facebook_link", "https://www.facebook.com/GunsNPetals"),
            ("seeking_venue", "y"),
            (
                "seeking_description",
                "Looking for shows to perform at in the San Francisco Bay Area!",
            ),
        ])
    }

    #[test]
    fn form_becomes_an_insertable_model() {
        let artist: ArtistActive = ArtistForm::try_from(&petals_fields())
            .unwrap()
            .into_active_model();
        assert_eq!(artist.id, NotSet);
        assert_eq!(artist.looking_for_venues, Set(true));
        assert_eq!(
            artist.genres,
            Set(Genres(vec!["Rock n Roll".to_string()]))
        );
    }

    #[tokio::test]
    async fn create_then_detail_round_trips() {
        let db = database().await;
        let id = create(&db, &petals_fields()).await.unwrap();
        let detail = detail(&db, id).await.unwrap();
        assert_eq!(
            detail.artist,
            Artist {
                id,
                name: "Guns N Petals".to_string(),
                genres: Genres(vec!["Rock n Roll".to_string()]),
                city: "San Francisco".to_string(),
                state: "CA".to_string(),
                phone: "326-123-5000".to_string(),
                website: Some("https://www.gunsnpetalsband.com".to_string()),
                image_link: None,
                facebook_link: Some("https://www.facebook.com/GunsNPetals".to_string()),
                looking_for_venues: true,
                looking_for_description: Some(
                    "Looking for shows to perform at in the San Francisco Bay Area!".to_string()
                ),
            }
        );
        assert_eq!(detail.past_shows_count, 0);
        assert_eq!(detail.upcoming_shows_count, 0);
    }

    #[tokio::test]
    async fn invalid_link_is_rejected() {
        let db = database().await;
        let mut pairs = vec![("name", "Matt Quevedo"), ("city", "New York")];
        pairs.extend([("state", "NY"), ("phone", "300-400-5000")]);
        pairs.push(("image_link", "not a link"));
        assert!(matches!(
            create(&db, &fields(&pairs)).await,
            Err(QueryError::Validation {
                field: "image_link",
                ..
            })
        ));
        assert!(list(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_is_ordered_by_name() {
        let db = database().await;
        let sax = artist(&db, "The Wild Sax Band").await;
        let petals = artist(&db, "Guns N Petals").await;
        let matt = artist(&db, "Matt Quevedo").await;
        let ids: Vec<i32> = list(&db).await.unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, [petals, matt, sax]);
    }

    #[tokio::test]
    async fn detail_joins_venues() {
        let db = database().await;
        let sax = artist(&db, "The Wild Sax Band").await;
        let park = venue(&db, "Park Square Live Music & Coffee", "San Francisco", "CA").await;
        show(&db, sax, park, Duration::days(30)).await;
        show(&db, sax, park, -Duration::days(30)).await;
        show(&db, sax, park, -Duration::days(60)).await;

        let detail = detail(&db, sax).await.unwrap();
        assert_eq!(detail.upcoming_shows_count, 1);
        assert_eq!(detail.past_shows_count, 2);
        assert_eq!(detail.upcoming_shows[0].venue_id, park);
        assert_eq!(
            detail.upcoming_shows[0].venue_name,
            "Park Square Live Music & Coffee"
        );
        assert!(detail.past_shows[0].start_time < detail.past_shows[1].start_time);
    }

    #[tokio::test]
    async fn missing_artist_is_not_found() {
        let db = database().await;
        assert!(matches!(
            detail(&db, 5).await,
            Err(QueryError::NotFound {
                kind: EntityKind::Artist,
                id: 5
            })
        ));
        assert!(matches!(
            update(&db, 5, &petals_fields()).await,
            Err(QueryError::NotFound { id: 5, .. })
        ));
        assert!(matches!(
            delete(&db, 5).await,
            Err(QueryError::NotFound { id: 5, .. })
        ));
    }

    #[tokio::test]
    async fn update_clears_unchecked_checkbox() {
        let db = database().await;
        let id = create(&db, &petals_fields()).await.unwrap();
        update(
            &db,
            id,
            &fields(&[
                ("name", "Guns N Petals"),
                ("city", "San Francisco"),
                ("state", "CA"),
                ("phone", "326-123-5000"),
                ("genres", "Rock n Roll"),
                ("genres", "Punk"),
            ]),
        )
        .await
        .unwrap();
        let artist = find(&db, id).await.unwrap();
        assert!(!artist.looking_for_venues);
        assert_eq!(artist.looking_for_description, None);
        assert_eq!(
            artist.genres,
            Genres(vec!["Rock n Roll".to_string(), "Punk".to_string()])
        );
    }

    #[tokio::test]
    async fn delete_cascades_to_shows() {
        let db = database().await;
        let sax = artist(&db, "The Wild Sax Band").await;
        let matt = artist(&db, "Matt Quevedo").await;
        let park = venue(&db, "Park Square Live Music & Coffee", "San Francisco", "CA").await;
        show(&db, sax, park, Duration::days(1)).await;
        show(&db, matt, park, Duration::days(2)).await;

        delete(&db, sax).await.unwrap();

        let listed = shows::list(&db).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].artist_id, matt);
    }
}
