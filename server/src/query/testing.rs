use migration::Migrator;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use time::{Duration, OffsetDateTime};

use super::{artists, shows, venues, Fields};

/// A fresh, migrated in-memory database. The pool holds a single
/// connection, otherwise every connection would see its own empty database.
pub async fn database() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
    opt.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn fields(pairs: &[(&str, &str)]) -> Fields {
    pairs.iter().copied().collect()
}

pub async fn venue(db: &DatabaseConnection, name: &str, city: &str, state: &str) -> i32 {
    venues::create(
        db,
        &fields(&[
            ("name", name),
            ("city", city),
            ("state", state),
            ("address", "1015 Folsom Street"),
            ("phone", "123-123-1234"),
            ("genres", "Jazz"),
        ]),
    )
    .await
    .unwrap()
}

pub async fn artist(db: &DatabaseConnection, name: &str) -> i32 {
    artists::create(
        db,
        &fields(&[
            ("name", name),
            ("city", "San Francisco"),
            ("state", "CA"),
            ("phone", "326-123-5000"),
            ("genres", "Rock n Roll"),
        ]),
    )
    .await
    .unwrap()
}

/// A show starting `offset` away from now, rounded to whole seconds.
pub async fn show(db: &DatabaseConnection, artist_id: i32, venue_id: i32, offset: Duration) -> i32 {
    let start_time = OffsetDateTime::now_utc() + offset;
    shows::create(
        db,
        shows::NewShow {
            artist_id,
            venue_id,
            start_time: start_time.replace_nanosecond(0).unwrap(),
        },
    )
    .await
    .unwrap()
}
