use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "checkpoints")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub hunt_id: Uuid,
    pub name: String,
    pub clue: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hunts::Entity",
        from = "Column::HuntId",
        to = "super::hunts::Column::Id",
        on_delete = "Cascade"
    )]
    Hunts,
    #[sea_orm(has_many = "super::conditions::Entity")]
    Conditions,
}

impl Related<super::hunts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hunts.def()
    }
}

impl Related<super::conditions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Conditions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
