use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlayerHunts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlayerHunts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PlayerHunts::PlayerId).uuid().not_null())
                    .col(ColumnDef::new(PlayerHunts::HuntId).uuid().not_null())
                    .col(ColumnDef::new(PlayerHunts::Status).string().not_null())
                    .col(
                        ColumnDef::new(PlayerHunts::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlayerHunts::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One participation record per (player, hunt); closes the concurrent start race
        manager
            .create_index(
                Index::create()
                    .name("idx_player_hunts_player_hunt")
                    .table(PlayerHunts::Table)
                    .col(PlayerHunts::PlayerId)
                    .col(PlayerHunts::HuntId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CheckIns::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CheckIns::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(CheckIns::PlayerId).uuid().not_null())
                    .col(ColumnDef::new(CheckIns::HuntId).uuid().not_null())
                    .col(ColumnDef::new(CheckIns::CheckpointId).uuid().not_null())
                    .col(
                        ColumnDef::new(CheckIns::CheckedInAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Natural key of a check-in; closes the concurrent check-in race
        manager
            .create_index(
                Index::create()
                    .name("idx_check_ins_player_hunt_checkpoint")
                    .table(CheckIns::Table)
                    .col(CheckIns::PlayerId)
                    .col(CheckIns::HuntId)
                    .col(CheckIns::CheckpointId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CheckIns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlayerHunts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PlayerHunts {
    Table,
    Id,
    PlayerId,
    HuntId,
    Status,
    StartedAt,
    CompletedAt,
}

#[derive(DeriveIden)]
enum CheckIns {
    Table,
    Id,
    PlayerId,
    HuntId,
    CheckpointId,
    CheckedInAt,
}
