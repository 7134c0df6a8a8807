pub mod errors;
pub mod hunt;
pub mod progress;

use uuid::Uuid;

pub type UserId = Uuid;
pub type HuntId = Uuid;
pub type CheckpointId = Uuid;
pub type ConditionId = Uuid;
pub type PlayerHuntId = Uuid;
pub type CheckInId = Uuid;

// Re-export all types
pub use errors::*;
pub use hunt::*;
pub use progress::*;
