use crate::setting::Settings;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Error while connecting to the database: {0}")]
    Database(#[from] DbErr),
}

pub async fn open_database(settings: &Settings) -> Result<DatabaseConnection, DatabaseError> {
    let url = &settings.db;
    let pool = &settings.pool;
    tracing::trace! {%url, "Connecting to database"};
    let timeout = Duration::from_secs(pool.timeout);
    let mut opt = ConnectOptions::new(url.to_owned());
    opt.max_connections(pool.max_connections)
        .min_connections(pool.min_connections)
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .idle_timeout(timeout)
        .sqlx_logging(true);
    Database::connect(opt)
        .await
        .map_err(DatabaseError::Database)
}
