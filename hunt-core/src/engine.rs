use crate::check_in::{CheckInAttempt, PROXIMITY_THRESHOLD_METERS};
use crate::geodesy::{bearing_degrees, compass_direction, distance_meters, format_distance};
use crate::lifecycle;
use crate::progress::{checkpoint_status, compute_progress};
use crate::storage::{HuntStore, StoreError};
use crate::time_window::{local_clock, localize_conditions};
use chrono::{DateTime, FixedOffset, Utc};
use hunt_types::{
    CheckIn, CheckInReceipt, Checkpoint, CheckpointId, CheckpointStatus, CheckpointView, Condition,
    Coordinate, HuntError, HuntId, PlayerHunt, PlayerHuntId, PlayerHuntStatus, Progress, UserId,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub proximity_threshold_meters: f64,
    /// Upper bound on any single store call.
    pub storage_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            proximity_threshold_meters: PROXIMITY_THRESHOLD_METERS,
            storage_timeout: Duration::from_secs(5),
        }
    }
}

/// Hunt progression rules over an injected [`HuntStore`].
///
/// The engine holds no mutable state of its own. Every operation reads what it
/// needs, decides, and performs at most the writes described on the method, so
/// it can be shared freely between request handlers. Instants passed as
/// `DateTime<FixedOffset>` carry the viewer's clock, which is what daily time
/// windows are evaluated against.
pub struct HuntEngine<S: ?Sized> {
    store: Arc<S>,
    config: EngineConfig,
}

impl<S: ?Sized> Clone for HuntEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: HuntStore + ?Sized> HuntEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    async fn call<T>(
        &self,
        operation: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.config.storage_timeout, operation)
            .await
            .unwrap_or(Err(StoreError::Timeout))
    }

    async fn local_conditions(
        &self,
        checkpoint_id: CheckpointId,
        offset: FixedOffset,
    ) -> Result<Vec<Condition>, HuntError> {
        let stored = self.call(self.store.load_conditions(checkpoint_id)).await?;
        localize_conditions(&stored, offset)
    }

    /// Write a terminal status through the store's compare-and-set. Losing to
    /// another terminal write surfaces as a transition out of whatever status
    /// won.
    async fn finish(
        &self,
        record: &PlayerHunt,
        status: PlayerHuntStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), HuntError> {
        match self
            .call(
                self.store
                    .update_player_hunt_status(record.id, status, completed_at),
            )
            .await
        {
            Ok(()) => Ok(()),
            Err(StoreError::Conflict(detail)) => {
                let current = self
                    .call(self.store.find_player_hunt_by_id(record.id))
                    .await?;
                warn!("Lost status write on player hunt {}: {}", record.id, detail);
                Err(HuntError::InvalidTransition {
                    from: lifecycle::status_of(current.as_ref()),
                    to: status,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Mark a STARTED record COMPLETED once its check-ins cover every
    /// checkpoint, stamped with the latest check-in. Repeatable: a record
    /// that is already COMPLETED counts as done.
    async fn reconcile_completion(
        &self,
        record: &PlayerHunt,
        progress: &Progress,
        check_ins: &[CheckIn],
    ) -> Result<bool, HuntError> {
        let status = match record.status {
            PlayerHuntStatus::Completed => return Ok(true),
            PlayerHuntStatus::Started => lifecycle::completion_for(record, progress)?,
            _ => None,
        };
        let Some(status) = status else {
            return Ok(false);
        };

        let completed_at = check_ins.iter().map(|check_in| check_in.checked_in_at).max();
        match self.finish(record, status, completed_at).await {
            Ok(()) => {
                info!("Player {} completed hunt {}", record.player_id, record.hunt_id);
                Ok(true)
            }
            Err(HuntError::InvalidTransition {
                from: PlayerHuntStatus::Completed,
                ..
            }) => Ok(true),
            Err(err) => Err(err),
        }
    }

    /// A repeated check-in still owes the hunt its completion if the write
    /// that should have recorded it never landed.
    async fn settle_repeat_check_in(
        &self,
        record: &PlayerHunt,
        checkpoints: &[Checkpoint],
    ) -> HuntError {
        let settled: Result<bool, HuntError> = async {
            let check_ins = self
                .call(self.store.load_check_ins(record.player_id, record.hunt_id))
                .await?;
            let progress = compute_progress(checkpoints, &check_ins);
            self.reconcile_completion(record, &progress, &check_ins).await
        }
        .await;
        if let Err(err) = settled {
            warn!(
                "Could not settle completion of player hunt {}: {}",
                record.id, err
            );
        }
        HuntError::AlreadyCheckedIn
    }

    /// True when the checkpoint's conditions pass for this player right now and
    /// the player has not checked in there yet.
    pub async fn is_checkpoint_available(
        &self,
        player_id: UserId,
        checkpoint: &Checkpoint,
        now: DateTime<FixedOffset>,
    ) -> Result<bool, HuntError> {
        let conditions = self.local_conditions(checkpoint.id, *now.offset()).await?;
        let check_ins = self
            .call(self.store.load_check_ins(player_id, checkpoint.hunt_id))
            .await?;

        let status = checkpoint_status(checkpoint, &conditions, &check_ins, &local_clock(&now));
        debug!("Checkpoint {} is {:?} for player {}", checkpoint.id, status, player_id);
        Ok(status == CheckpointStatus::Available)
    }

    /// Validate and record a check-in.
    ///
    /// Preconditions are checked in order against data read before any write:
    /// started hunt, reachable checkpoint, no earlier check-in, within the
    /// proximity threshold. On success exactly one check-in is written, and the
    /// player hunt is marked completed if that check-in was the last one. A
    /// repeated check-in is still rejected, but first completes the hunt if
    /// an earlier completion write was lost.
    pub async fn attempt_check_in(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
        checkpoint_id: CheckpointId,
        location: Coordinate,
        now: DateTime<FixedOffset>,
    ) -> Result<CheckInReceipt, HuntError> {
        let player_hunt = self
            .call(self.store.find_player_hunt(player_id, hunt_id))
            .await?;
        let Some(player_hunt) =
            player_hunt.filter(|record| record.status == PlayerHuntStatus::Started)
        else {
            warn!("Player {} checked in to hunt {} without starting it", player_id, hunt_id);
            return Err(HuntError::HuntNotStarted);
        };

        let checkpoints = self.call(self.store.load_checkpoints(hunt_id)).await?;
        let checkpoint = checkpoints
            .iter()
            .find(|checkpoint| checkpoint.id == checkpoint_id)
            .ok_or(HuntError::CheckpointNotFound)?;

        let conditions = self.local_conditions(checkpoint_id, *now.offset()).await?;
        let check_ins = self
            .call(self.store.load_check_ins(player_id, hunt_id))
            .await?;
        let existing = self
            .call(self.store.find_check_in(player_id, hunt_id, checkpoint_id))
            .await?;
        let now_local = local_clock(&now);

        let attempt = CheckInAttempt {
            player_hunt: Some(&player_hunt),
            checkpoint,
            conditions: &conditions,
            check_ins: &check_ins,
            existing: existing.as_ref(),
            location,
            now_local: &now_local,
            threshold_meters: self.config.proximity_threshold_meters,
        };
        let distance = match attempt.authorize() {
            Ok(distance) => distance,
            Err(HuntError::AlreadyCheckedIn) => {
                debug!("Player {} repeated checkpoint {}", player_id, checkpoint_id);
                return Err(self.settle_repeat_check_in(&player_hunt, &checkpoints).await);
            }
            Err(err) => {
                warn!(
                    "Rejected check-in by {} at checkpoint {}: {}",
                    player_id, checkpoint_id, err
                );
                return Err(err);
            }
        };

        let timestamp = now.with_timezone(&Utc);
        let check_in_id = match self
            .call(
                self.store
                    .create_check_in(player_id, hunt_id, checkpoint_id, timestamp),
            )
            .await
        {
            Ok(check_in_id) => check_in_id,
            Err(StoreError::Conflict(detail)) => {
                warn!("Concurrent duplicate check-in rejected by store: {}", detail);
                return Err(self.settle_repeat_check_in(&player_hunt, &checkpoints).await);
            }
            Err(err) => return Err(err.into()),
        };
        info!(
            "Player {} checked in at {} ({:.1}m away)",
            player_id, checkpoint.name, distance
        );

        // Recount from what is persisted, not from the pre-write snapshot
        let check_ins = self
            .call(self.store.load_check_ins(player_id, hunt_id))
            .await?;
        let progress = compute_progress(&checkpoints, &check_ins);
        let hunt_completed = self
            .reconcile_completion(&player_hunt, &progress, &check_ins)
            .await?;

        Ok(CheckInReceipt {
            check_in_id,
            progress,
            hunt_completed,
        })
    }

    /// Progress over the hunt's current checkpoints. A STARTED record whose
    /// progress reads complete, for instance after its last unvisited
    /// checkpoint was deleted, is completed on the way.
    pub async fn get_progress(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
    ) -> Result<Progress, HuntError> {
        let checkpoints = self.call(self.store.load_checkpoints(hunt_id)).await?;
        let check_ins = self
            .call(self.store.load_check_ins(player_id, hunt_id))
            .await?;
        let progress = compute_progress(&checkpoints, &check_ins);

        if progress.is_complete() {
            let record = self
                .call(self.store.find_player_hunt(player_id, hunt_id))
                .await?;
            if let Some(record) = record.filter(|record| record.status == PlayerHuntStatus::Started) {
                if let Err(err) = self.reconcile_completion(&record, &progress, &check_ins).await {
                    warn!("Could not complete player hunt {}: {}", record.id, err);
                }
            }
        }

        Ok(progress)
    }

    /// Every checkpoint of the hunt with its status for this player and,
    /// when the player's position is known, distance and direction to it.
    pub async fn checkpoint_statuses(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
        position: Option<Coordinate>,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<CheckpointView>, HuntError> {
        let checkpoints = self.call(self.store.load_checkpoints(hunt_id)).await?;
        let check_ins = self
            .call(self.store.load_check_ins(player_id, hunt_id))
            .await?;
        let now_local = local_clock(&now);

        let mut views = Vec::with_capacity(checkpoints.len());
        for checkpoint in checkpoints {
            let conditions = self.local_conditions(checkpoint.id, *now.offset()).await?;
            let status = checkpoint_status(&checkpoint, &conditions, &check_ins, &now_local);

            let (distance, bearing) = match position {
                Some(position) => (
                    Some(distance_meters(&position, &checkpoint.location)),
                    Some(bearing_degrees(&position, &checkpoint.location)),
                ),
                None => (None, None),
            };

            views.push(CheckpointView {
                checkpoint,
                status,
                distance_meters: distance,
                distance_label: distance.map(format_distance),
                bearing_degrees: bearing,
                direction: bearing.map(|b| compass_direction(b).to_string()),
            });
        }

        Ok(views)
    }

    /// Create the player's STARTED record for a hunt.
    pub async fn start_hunt(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
        now: DateTime<Utc>,
    ) -> Result<PlayerHuntId, HuntError> {
        self.call(self.store.find_hunt(hunt_id))
            .await?
            .ok_or(HuntError::HuntNotFound)?;

        let existing = self
            .call(self.store.find_player_hunt(player_id, hunt_id))
            .await?;
        lifecycle::ensure_can_start(existing.as_ref())?;

        let player_hunt_id = self
            .call(self.store.create_player_hunt(player_id, hunt_id, now))
            .await
            .map_err(|err| match err {
                StoreError::Conflict(_) => HuntError::DuplicateStart,
                other => other.into(),
            })?;

        info!("Player {} started hunt {}", player_id, hunt_id);
        Ok(player_hunt_id)
    }

    pub async fn player_hunt(&self, player_hunt_id: PlayerHuntId) -> Result<PlayerHunt, HuntError> {
        self.call(self.store.find_player_hunt_by_id(player_hunt_id))
            .await?
            .ok_or(HuntError::PlayerHuntNotFound)
    }

    pub async fn abandon_hunt(&self, player_hunt_id: PlayerHuntId) -> Result<(), HuntError> {
        let record = self.player_hunt(player_hunt_id).await?;

        let status = lifecycle::abandon(&record)?;
        self.finish(&record, status, None).await?;

        info!("Player {} abandoned hunt {}", record.player_id, record.hunt_id);
        Ok(())
    }
}
