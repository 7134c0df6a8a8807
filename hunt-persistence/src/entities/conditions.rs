use sea_orm::entity::prelude::*;

pub const KIND_REQUIRED_LOCATION: &str = "REQUIRED_LOCATION";
pub const KIND_TIME_WINDOW: &str = "TIME_WINDOW";

/// One row per condition; which optional columns are set depends on `kind`.
/// Window times are stored as UTC "HH:MM".
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "conditions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub checkpoint_id: Uuid,
    pub kind: String,
    pub required_checkpoint_id: Option<Uuid>,
    pub window_start: Option<String>,
    pub window_end: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::checkpoints::Entity",
        from = "Column::CheckpointId",
        to = "super::checkpoints::Column::Id",
        on_delete = "Cascade"
    )]
    Checkpoints,
}

impl Related<super::checkpoints::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Checkpoints.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
