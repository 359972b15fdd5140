use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

use entity::{ArtistEntity, ShowColumn, ShowEntity, VenueEntity};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        manager
            .create_table(schema.create_table_from_entity(VenueEntity).if_not_exists().to_owned())
            .await?;
        manager
            .create_table(schema.create_table_from_entity(ArtistEntity).if_not_exists().to_owned())
            .await?;
        // the show table carries the cascading foreign keys to venue and artist
        manager
            .create_table(schema.create_table_from_entity(ShowEntity).if_not_exists().to_owned())
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-show-venue_id")
                    .table(ShowEntity)
                    .col(ShowColumn::VenueId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-show-artist_id")
                    .table(ShowEntity)
                    .col(ShowColumn::ArtistId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShowEntity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ArtistEntity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VenueEntity).to_owned())
            .await
    }
}
