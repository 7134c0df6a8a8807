pub mod prelude;

pub mod check_ins;
pub mod checkpoints;
pub mod conditions;
pub mod hunts;
pub mod player_hunts;
