use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hunt_core::{HuntStore, StoreError};
use hunt_types::{
    CheckIn, CheckInId, Checkpoint, CheckpointId, Condition, Hunt, HuntId, PlayerHunt,
    PlayerHuntId, PlayerHuntStatus, UserId,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use super::{
    model_to_check_in, model_to_checkpoint, model_to_condition, model_to_hunt,
    model_to_player_hunt, store_error,
};
use crate::entities::{check_ins, checkpoints, conditions, player_hunts, prelude::*};

/// [`HuntStore`] backed by the sea-orm schema in the `migration` crate.
/// Uniqueness of check-ins and player hunts is enforced by unique indexes.
#[derive(Clone)]
pub struct SeaOrmHuntStore {
    db: DatabaseConnection,
}

impl SeaOrmHuntStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HuntStore for SeaOrmHuntStore {
    async fn find_hunt(&self, hunt_id: HuntId) -> Result<Option<Hunt>, StoreError> {
        let model = Hunts::find_by_id(hunt_id)
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.map(model_to_hunt))
    }

    async fn load_checkpoints(&self, hunt_id: HuntId) -> Result<Vec<Checkpoint>, StoreError> {
        let models = Checkpoints::find()
            .filter(checkpoints::Column::HuntId.eq(hunt_id))
            .order_by_asc(checkpoints::Column::Name)
            .all(&self.db)
            .await
            .map_err(store_error)?;
        Ok(models.into_iter().map(model_to_checkpoint).collect())
    }

    async fn load_conditions(
        &self,
        checkpoint_id: CheckpointId,
    ) -> Result<Vec<Condition>, StoreError> {
        Conditions::find()
            .filter(conditions::Column::CheckpointId.eq(checkpoint_id))
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(model_to_condition)
            .collect()
    }

    async fn load_check_ins(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
    ) -> Result<Vec<CheckIn>, StoreError> {
        let models = CheckIns::find()
            .filter(check_ins::Column::PlayerId.eq(player_id))
            .filter(check_ins::Column::HuntId.eq(hunt_id))
            .order_by_asc(check_ins::Column::CheckedInAt)
            .all(&self.db)
            .await
            .map_err(store_error)?;
        Ok(models.into_iter().map(model_to_check_in).collect())
    }

    async fn find_check_in(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
        checkpoint_id: CheckpointId,
    ) -> Result<Option<CheckIn>, StoreError> {
        let model = CheckIns::find()
            .filter(check_ins::Column::PlayerId.eq(player_id))
            .filter(check_ins::Column::HuntId.eq(hunt_id))
            .filter(check_ins::Column::CheckpointId.eq(checkpoint_id))
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.map(model_to_check_in))
    }

    async fn create_check_in(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
        checkpoint_id: CheckpointId,
        timestamp: DateTime<Utc>,
    ) -> Result<CheckInId, StoreError> {
        let check_in = check_ins::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            player_id: ActiveValue::Set(player_id),
            hunt_id: ActiveValue::Set(hunt_id),
            checkpoint_id: ActiveValue::Set(checkpoint_id),
            checked_in_at: ActiveValue::Set(timestamp),
        };

        let saved = check_in.insert(&self.db).await.map_err(store_error)?;
        Ok(saved.id)
    }

    async fn find_player_hunt(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
    ) -> Result<Option<PlayerHunt>, StoreError> {
        PlayerHunts::find()
            .filter(player_hunts::Column::PlayerId.eq(player_id))
            .filter(player_hunts::Column::HuntId.eq(hunt_id))
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(model_to_player_hunt)
            .transpose()
    }

    async fn find_player_hunt_by_id(
        &self,
        player_hunt_id: PlayerHuntId,
    ) -> Result<Option<PlayerHunt>, StoreError> {
        PlayerHunts::find_by_id(player_hunt_id)
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(model_to_player_hunt)
            .transpose()
    }

    async fn create_player_hunt(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
        timestamp: DateTime<Utc>,
    ) -> Result<PlayerHuntId, StoreError> {
        let record = player_hunts::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            player_id: ActiveValue::Set(player_id),
            hunt_id: ActiveValue::Set(hunt_id),
            status: ActiveValue::Set(PlayerHuntStatus::Started.as_str().to_string()),
            started_at: ActiveValue::Set(timestamp),
            completed_at: ActiveValue::Set(None),
        };

        let saved = record.insert(&self.db).await.map_err(store_error)?;
        Ok(saved.id)
    }

    async fn update_player_hunt_status(
        &self,
        player_hunt_id: PlayerHuntId,
        status: PlayerHuntStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        let result = PlayerHunts::update_many()
            .col_expr(player_hunts::Column::Status, Expr::value(status.as_str()))
            .col_expr(player_hunts::Column::CompletedAt, Expr::value(completed_at))
            .filter(player_hunts::Column::Id.eq(player_hunt_id))
            .filter(player_hunts::Column::Status.eq(PlayerHuntStatus::Started.as_str()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        if result.rows_affected > 0 {
            return Ok(());
        }
        match self.find_player_hunt_by_id(player_hunt_id).await? {
            Some(record) => Err(StoreError::Conflict(format!(
                "player hunt {} is already {}",
                player_hunt_id,
                record.status.as_str()
            ))),
            None => Err(StoreError::NotFound(format!("player hunt {}", player_hunt_id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use crate::repositories::HuntRepository;
    use chrono::FixedOffset;
    use hunt_core::HuntEngine;
    use hunt_types::{ConditionKind, Coordinate, HuntError};
    use migration::{Migrator, MigratorTrait};
    use std::sync::Arc;

    async fn setup_test_db() -> (HuntRepository, SeaOrmHuntStore) {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        (HuntRepository::new(db.clone()), SeaOrmHuntStore::new(db))
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[tokio::test]
    async fn test_check_in_uniqueness_is_enforced_by_schema() {
        let (_, store) = setup_test_db().await;
        let (player, hunt, checkpoint) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        store
            .create_check_in(player, hunt, checkpoint, Utc::now())
            .await
            .unwrap();
        let duplicate = store
            .create_check_in(player, hunt, checkpoint, Utc::now())
            .await;

        assert!(matches!(duplicate, Err(StoreError::Conflict(_))));
        assert_eq!(store.load_check_ins(player, hunt).await.unwrap().len(), 1);
        assert!(store
            .find_check_in(player, hunt, checkpoint)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_player_hunt_uniqueness_is_enforced_by_schema() {
        let (_, store) = setup_test_db().await;
        let (player, hunt) = (Uuid::new_v4(), Uuid::new_v4());

        let id = store
            .create_player_hunt(player, hunt, Utc::now())
            .await
            .unwrap();
        assert!(matches!(
            store.create_player_hunt(player, hunt, Utc::now()).await,
            Err(StoreError::Conflict(_))
        ));

        let record = store.find_player_hunt(player, hunt).await.unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.status, PlayerHuntStatus::Started);
    }

    #[tokio::test]
    async fn test_status_update_round_trips() {
        let (_, store) = setup_test_db().await;
        let id = store
            .create_player_hunt(Uuid::new_v4(), Uuid::new_v4(), Utc::now())
            .await
            .unwrap();
        let finished = Utc::now();

        store
            .update_player_hunt_status(id, PlayerHuntStatus::Completed, Some(finished))
            .await
            .unwrap();

        let record = store.find_player_hunt_by_id(id).await.unwrap().unwrap();
        assert_eq!(record.status, PlayerHuntStatus::Completed);
        assert!(record.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_terminal_status_is_not_overwritten() {
        let (_, store) = setup_test_db().await;
        let id = store
            .create_player_hunt(Uuid::new_v4(), Uuid::new_v4(), Utc::now())
            .await
            .unwrap();

        store
            .update_player_hunt_status(id, PlayerHuntStatus::Abandoned, None)
            .await
            .unwrap();
        let late = store
            .update_player_hunt_status(id, PlayerHuntStatus::Completed, Some(Utc::now()))
            .await;

        assert!(matches!(late, Err(StoreError::Conflict(_))));
        let record = store.find_player_hunt_by_id(id).await.unwrap().unwrap();
        assert_eq!(record.status, PlayerHuntStatus::Abandoned);
        assert_eq!(record.completed_at, None);
    }

    #[tokio::test]
    async fn test_status_update_of_missing_record() {
        let (_, store) = setup_test_db().await;

        assert!(matches!(
            store
                .update_player_hunt_status(Uuid::new_v4(), PlayerHuntStatus::Abandoned, None)
                .await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_engine_over_database() {
        let (repo, store) = setup_test_db().await;
        let owner = Uuid::new_v4();
        let player = Uuid::new_v4();

        let hunt = repo
            .create_hunt(owner, "Downtown Adventure", true)
            .await
            .unwrap();
        let fountain = repo
            .add_checkpoint(
                owner,
                hunt.id,
                "Fountain",
                "Where the water sings",
                Coordinate {
                    latitude: 39.9982,
                    longitude: -81.7346,
                },
            )
            .await
            .unwrap();
        let library = repo
            .add_checkpoint(
                owner,
                hunt.id,
                "Library",
                "Quiet please",
                Coordinate {
                    latitude: 39.9990,
                    longitude: -81.7350,
                },
            )
            .await
            .unwrap();
        repo.add_condition(
            owner,
            library.id,
            ConditionKind::RequiredLocation {
                required_checkpoint_id: fountain.id,
            },
            utc(),
        )
        .await
        .unwrap();

        let engine = HuntEngine::new(Arc::new(store));
        let now = Utc::now().with_timezone(&utc());
        engine.start_hunt(player, hunt.id, Utc::now()).await.unwrap();

        assert_eq!(
            engine
                .attempt_check_in(player, hunt.id, library.id, library.location, now)
                .await,
            Err(HuntError::CheckpointLocked)
        );

        let first = engine
            .attempt_check_in(player, hunt.id, fountain.id, fountain.location, now)
            .await
            .unwrap();
        assert_eq!(first.progress.percentage, 50);

        let second = engine
            .attempt_check_in(player, hunt.id, library.id, library.location, now)
            .await
            .unwrap();
        assert_eq!(second.progress.percentage, 100);
        assert!(second.hunt_completed);

        let record = engine
            .store()
            .find_player_hunt(player, hunt.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, PlayerHuntStatus::Completed);
    }
}
