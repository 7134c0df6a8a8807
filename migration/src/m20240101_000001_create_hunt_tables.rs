use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Hunts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Hunts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Hunts::Name).string().not_null())
                    .col(ColumnDef::new(Hunts::OwnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Hunts::IsPublic)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Hunts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Hunt names are unique per owner
        manager
            .create_index(
                Index::create()
                    .name("idx_hunts_owner_name")
                    .table(Hunts::Table)
                    .col(Hunts::OwnerId)
                    .col(Hunts::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_hunts_is_public")
                    .table(Hunts::Table)
                    .col(Hunts::IsPublic)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Checkpoints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Checkpoints::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Checkpoints::HuntId).uuid().not_null())
                    .col(ColumnDef::new(Checkpoints::Name).string().not_null())
                    .col(
                        ColumnDef::new(Checkpoints::Clue)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Checkpoints::Latitude).double().not_null())
                    .col(ColumnDef::new(Checkpoints::Longitude).double().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_checkpoints_hunt")
                            .from(Checkpoints::Table, Checkpoints::HuntId)
                            .to(Hunts::Table, Hunts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_checkpoints_hunt_id")
                    .table(Checkpoints::Table)
                    .col(Checkpoints::HuntId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Conditions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Conditions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Conditions::CheckpointId).uuid().not_null())
                    .col(ColumnDef::new(Conditions::Kind).string().not_null())
                    .col(ColumnDef::new(Conditions::RequiredCheckpointId).uuid().null())
                    .col(ColumnDef::new(Conditions::WindowStart).string().null())
                    .col(ColumnDef::new(Conditions::WindowEnd).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_conditions_checkpoint")
                            .from(Conditions::Table, Conditions::CheckpointId)
                            .to(Checkpoints::Table, Checkpoints::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_conditions_checkpoint_id")
                    .table(Conditions::Table)
                    .col(Conditions::CheckpointId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Conditions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Checkpoints::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Hunts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Hunts {
    Table,
    Id,
    Name,
    OwnerId,
    IsPublic,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Checkpoints {
    Table,
    Id,
    HuntId,
    Name,
    Clue,
    Latitude,
    Longitude,
}

#[derive(DeriveIden)]
enum Conditions {
    Table,
    Id,
    CheckpointId,
    Kind,
    RequiredCheckpointId,
    WindowStart,
    WindowEnd,
}
