use chrono::{FixedOffset, Utc};
use hunt_core::authoring::{validate_condition, validate_location};
use hunt_core::time_window::{kind_to_utc, localize_conditions};
use hunt_core::StoreError;
use hunt_types::{
    Checkpoint, CheckpointId, Condition, ConditionId, ConditionKind, Coordinate, Hunt, HuntError,
    HuntId, UserId,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use super::{
    condition_to_model, model_to_checkpoint, model_to_condition, model_to_hunt, store_error,
};
use crate::entities::{checkpoints, conditions, hunts, prelude::*};

fn db_error(err: DbErr) -> HuntError {
    store_error(err).into()
}

/// Owner-facing edits to a hunt's structure: hunts, their checkpoints and the
/// conditions that gate them. Every mutation checks that the caller owns the
/// hunt being changed.
pub struct HuntRepository {
    db: DatabaseConnection,
}

impl HuntRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn owned_hunt(&self, owner_id: UserId, hunt_id: HuntId) -> Result<hunts::Model, HuntError> {
        let hunt = Hunts::find_by_id(hunt_id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(HuntError::HuntNotFound)?;

        if hunt.owner_id != owner_id {
            return Err(HuntError::NotHuntOwner);
        }
        Ok(hunt)
    }

    async fn owned_checkpoint(
        &self,
        owner_id: UserId,
        checkpoint_id: CheckpointId,
    ) -> Result<checkpoints::Model, HuntError> {
        let checkpoint = Checkpoints::find_by_id(checkpoint_id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(HuntError::CheckpointNotFound)?;

        self.owned_hunt(owner_id, checkpoint.hunt_id).await?;
        Ok(checkpoint)
    }

    pub async fn create_hunt(
        &self,
        owner_id: UserId,
        name: &str,
        is_public: bool,
    ) -> Result<Hunt, HuntError> {
        let hunt = hunts::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(name.to_string()),
            owner_id: ActiveValue::Set(owner_id),
            is_public: ActiveValue::Set(is_public),
            created_at: ActiveValue::Set(Utc::now()),
        };

        let saved = hunt
            .insert(&self.db)
            .await
            .map_err(|err| match store_error(err) {
                StoreError::Conflict(_) => HuntError::DuplicateHuntName {
                    name: name.to_string(),
                },
                other => other.into(),
            })?;

        info!("Owner {} created hunt '{}'", owner_id, name);
        Ok(model_to_hunt(saved))
    }

    pub async fn find_hunt(&self, hunt_id: HuntId) -> Result<Option<Hunt>, HuntError> {
        let hunt = Hunts::find_by_id(hunt_id)
            .one(&self.db)
            .await
            .map_err(db_error)?;
        Ok(hunt.map(model_to_hunt))
    }

    pub async fn list_public_hunts(&self) -> Result<Vec<Hunt>, HuntError> {
        let hunts = Hunts::find()
            .filter(hunts::Column::IsPublic.eq(true))
            .order_by_desc(hunts::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_error)?;
        Ok(hunts.into_iter().map(model_to_hunt).collect())
    }

    pub async fn list_owned_hunts(&self, owner_id: UserId) -> Result<Vec<Hunt>, HuntError> {
        let hunts = Hunts::find()
            .filter(hunts::Column::OwnerId.eq(owner_id))
            .order_by_asc(hunts::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_error)?;
        Ok(hunts.into_iter().map(model_to_hunt).collect())
    }

    pub async fn set_visibility(
        &self,
        owner_id: UserId,
        hunt_id: HuntId,
        is_public: bool,
    ) -> Result<Hunt, HuntError> {
        let mut hunt: hunts::ActiveModel = self.owned_hunt(owner_id, hunt_id).await?.into();
        hunt.is_public = ActiveValue::Set(is_public);

        let updated = hunt.update(&self.db).await.map_err(db_error)?;
        Ok(model_to_hunt(updated))
    }

    /// Checkpoints and their conditions go with the hunt through the
    /// schema's cascading foreign keys. Player records reference the hunt by
    /// id only and are left in place.
    pub async fn delete_hunt(&self, owner_id: UserId, hunt_id: HuntId) -> Result<(), HuntError> {
        self.owned_hunt(owner_id, hunt_id).await?;

        Hunts::delete_by_id(hunt_id)
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        info!("Owner {} deleted hunt {}", owner_id, hunt_id);
        Ok(())
    }

    pub async fn list_checkpoints(&self, hunt_id: HuntId) -> Result<Vec<Checkpoint>, HuntError> {
        let checkpoints = Checkpoints::find()
            .filter(checkpoints::Column::HuntId.eq(hunt_id))
            .order_by_asc(checkpoints::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_error)?;
        Ok(checkpoints.into_iter().map(model_to_checkpoint).collect())
    }

    pub async fn add_checkpoint(
        &self,
        owner_id: UserId,
        hunt_id: HuntId,
        name: &str,
        clue: &str,
        location: Coordinate,
    ) -> Result<Checkpoint, HuntError> {
        self.owned_hunt(owner_id, hunt_id).await?;
        validate_location(&location)?;

        let checkpoint = checkpoints::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            hunt_id: ActiveValue::Set(hunt_id),
            name: ActiveValue::Set(name.to_string()),
            clue: ActiveValue::Set(clue.to_string()),
            latitude: ActiveValue::Set(location.latitude),
            longitude: ActiveValue::Set(location.longitude),
        };

        let saved = checkpoint.insert(&self.db).await.map_err(db_error)?;
        Ok(model_to_checkpoint(saved))
    }

    pub async fn update_checkpoint(
        &self,
        owner_id: UserId,
        checkpoint_id: CheckpointId,
        name: &str,
        clue: &str,
        location: Coordinate,
    ) -> Result<Checkpoint, HuntError> {
        let existing = self.owned_checkpoint(owner_id, checkpoint_id).await?;
        validate_location(&location)?;

        let mut checkpoint: checkpoints::ActiveModel = existing.into();
        checkpoint.name = ActiveValue::Set(name.to_string());
        checkpoint.clue = ActiveValue::Set(clue.to_string());
        checkpoint.latitude = ActiveValue::Set(location.latitude);
        checkpoint.longitude = ActiveValue::Set(location.longitude);

        let updated = checkpoint.update(&self.db).await.map_err(db_error)?;
        Ok(model_to_checkpoint(updated))
    }

    /// Removes the checkpoint, its own conditions, and every condition in the
    /// hunt that required it. A requirement on a checkpoint that no longer
    /// exists could never be met.
    pub async fn delete_checkpoint(
        &self,
        owner_id: UserId,
        checkpoint_id: CheckpointId,
    ) -> Result<(), HuntError> {
        self.owned_checkpoint(owner_id, checkpoint_id).await?;

        let txn = self.db.begin().await.map_err(db_error)?;
        Conditions::delete_many()
            .filter(conditions::Column::RequiredCheckpointId.eq(checkpoint_id))
            .exec(&txn)
            .await
            .map_err(db_error)?;
        Checkpoints::delete_by_id(checkpoint_id)
            .exec(&txn)
            .await
            .map_err(db_error)?;
        txn.commit().await.map_err(db_error)?;

        Ok(())
    }

    async fn hunt_conditions(&self, hunt_checkpoints: &[Checkpoint]) -> Result<Vec<Condition>, HuntError> {
        let ids: Vec<CheckpointId> = hunt_checkpoints.iter().map(|checkpoint| checkpoint.id).collect();

        Conditions::find()
            .filter(conditions::Column::CheckpointId.is_in(ids))
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|model| model_to_condition(model).map_err(HuntError::from))
            .collect()
    }

    /// Attach a condition to a checkpoint. Time windows are given on the
    /// owner's clock (`offset`) and stored in UTC; the returned condition is
    /// the stored form.
    pub async fn add_condition(
        &self,
        owner_id: UserId,
        checkpoint_id: CheckpointId,
        kind: ConditionKind,
        offset: FixedOffset,
    ) -> Result<Condition, HuntError> {
        let checkpoint = model_to_checkpoint(self.owned_checkpoint(owner_id, checkpoint_id).await?);
        let hunt_checkpoints = self.list_checkpoints(checkpoint.hunt_id).await?;
        let hunt_conditions = self.hunt_conditions(&hunt_checkpoints).await?;

        validate_condition(&checkpoint, &kind, &hunt_checkpoints, &hunt_conditions)?;

        let condition = Condition {
            id: Uuid::new_v4(),
            checkpoint_id,
            kind: kind_to_utc(&kind, offset)?,
        };
        condition_to_model(&condition)
            .insert(&self.db)
            .await
            .map_err(db_error)?;

        Ok(condition)
    }

    pub async fn remove_condition(
        &self,
        owner_id: UserId,
        condition_id: ConditionId,
    ) -> Result<(), HuntError> {
        let condition = Conditions::find_by_id(condition_id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(HuntError::ConditionNotFound)?;
        self.owned_checkpoint(owner_id, condition.checkpoint_id)
            .await?;

        Conditions::delete_by_id(condition_id)
            .exec(&self.db)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    /// A checkpoint's conditions with time windows shown on the viewer's clock.
    pub async fn conditions_for_viewer(
        &self,
        checkpoint_id: CheckpointId,
        offset: FixedOffset,
    ) -> Result<Vec<Condition>, HuntError> {
        let stored = Conditions::find()
            .filter(conditions::Column::CheckpointId.eq(checkpoint_id))
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|model| model_to_condition(model).map_err(HuntError::from))
            .collect::<Result<Vec<_>, _>>()?;

        localize_conditions(&stored, offset)
    }
}
