pub use super::check_ins::Entity as CheckIns;
pub use super::checkpoints::Entity as Checkpoints;
pub use super::conditions::Entity as Conditions;
pub use super::hunts::Entity as Hunts;
pub use super::player_hunts::Entity as PlayerHunts;
